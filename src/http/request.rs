use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Head,
}

impl Method {
    pub fn from_str(s: &str) -> Option<Method> {
        match s {
            "GET" => Some(Method::Get),
            "POST" => Some(Method::Post),
            "HEAD" => Some(Method::Head),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Head => "HEAD",
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub version: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    pub query_string: Option<String>,
}

impl HttpRequest {
    pub fn new() -> Self {
        HttpRequest {
            method: Method::Get,
            path: String::from("/"),
            version: String::from("HTTP/1.1"),
            headers: HashMap::new(),
            body: Vec::new(),
            query_string: None,
        }
    }

    /// Case-insensitive header lookup.
    pub fn get_header(&self, name: &str) -> Option<&String> {
        let name_lower = name.to_lowercase();
        self.headers
            .iter()
            .find(|(key, _)| key.to_lowercase() == name_lower)
            .map(|(_, value)| value)
    }

    pub fn content_length(&self) -> Option<usize> {
        self.get_header("content-length").and_then(|v| v.parse().ok())
    }

    /// Boundary parameter of a `multipart/form-data` content type, if the
    /// request carries one.
    pub fn multipart_boundary(&self) -> Option<String> {
        let content_type = self.get_header("content-type")?;
        if !content_type
            .to_lowercase()
            .starts_with("multipart/form-data")
        {
            return None;
        }

        for param in content_type.split(';').skip(1) {
            let param = param.trim();
            if let Some(value) = param.strip_prefix("boundary=") {
                let value = value.trim_matches('"');
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
        None
    }

    /// First line of the request, as received.
    pub fn request_line(&self) -> String {
        match &self.query_string {
            Some(query) => format!("{} {}?{} {}", self.method.as_str(), self.path, query, self.version),
            None => format!("{} {} {}", self.method.as_str(), self.path, self.version),
        }
    }
}
