use crate::handlers::Handler;
use crate::http::request::{HttpRequest, Method};
use crate::http::response::HttpResponse;
use crate::pages;
use std::io;

/// Handler for the informational page: program name, version and, when the
/// server was started from a command line, its usage text.
pub struct Info {
    program: String,
    usage: Option<String>,
}

impl Info {
    pub fn new(program: String, usage: Option<String>) -> Self {
        Info { program, usage }
    }

    fn info_page(&self) -> String {
        let mut html = vec![
            format!("<h2>{}</h2>", pages::html_escape(&self.program)),
            format!("<p>Version: <strong>{}</strong></p>", pages::VERSION),
        ];
        if let Some(ref usage) = self.usage {
            html.push(format!("<pre>{}</pre>", usage));
        }
        pages::page(&html, "Info")
    }
}

impl Handler for Info {
    fn handle(&self, request: &HttpRequest) -> io::Result<HttpResponse> {
        match request.method {
            Method::Get => Ok(HttpResponse::html(self.info_page())),
            _ => Ok(HttpResponse::method_not_allowed()),
        }
    }

    fn name(&self) -> &'static str {
        "Info"
    }
}
