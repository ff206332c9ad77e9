use std::collections::HashMap;
use std::path::Path;

/// Extension to MIME type table used when serving static files.
pub struct MimeTypes {
    types: HashMap<String, &'static str>,
}

impl MimeTypes {
    pub fn new() -> Self {
        let mut types = HashMap::new();

        // Text types
        types.insert("html".to_string(), "text/html");
        types.insert("htm".to_string(), "text/html");
        types.insert("css".to_string(), "text/css");
        types.insert("json".to_string(), "application/json");
        types.insert("xml".to_string(), "application/xml");
        types.insert("txt".to_string(), "text/plain");
        types.insert("md".to_string(), "text/plain");

        // Image types
        types.insert("png".to_string(), "image/png");
        types.insert("jpg".to_string(), "image/jpeg");
        types.insert("jpeg".to_string(), "image/jpeg");
        types.insert("gif".to_string(), "image/gif");
        types.insert("ico".to_string(), "image/x-icon");
        types.insert("webp".to_string(), "image/webp");

        // Historically missing from default server tables; registered
        // explicitly so scripts and vector images render in browsers.
        types.insert("js".to_string(), "application/javascript");
        types.insert("svg".to_string(), "image/svg+xml");

        // Font types
        types.insert("woff".to_string(), "font/woff");
        types.insert("woff2".to_string(), "font/woff2");
        types.insert("ttf".to_string(), "font/ttf");

        // Application types
        types.insert("pdf".to_string(), "application/pdf");
        types.insert("zip".to_string(), "application/zip");
        types.insert("gz".to_string(), "application/gzip");

        // Media types
        types.insert("mp4".to_string(), "video/mp4");
        types.insert("webm".to_string(), "video/webm");
        types.insert("mp3".to_string(), "audio/mpeg");
        types.insert("wav".to_string(), "audio/wav");

        MimeTypes { types }
    }

    pub fn get_mime_type(&self, path: &Path) -> &'static str {
        if let Some(extension) = path.extension() {
            if let Some(ext_str) = extension.to_str() {
                let ext_lower = ext_str.to_lowercase();
                return self.types.get(&ext_lower).copied().unwrap_or("application/octet-stream");
            }
        }
        "application/octet-stream"
    }
}
