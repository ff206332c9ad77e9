use crate::fs::path_utils::safe_path_join;
use crate::http::response::HttpResponse;
use crate::mime::MimeTypes;
use crate::pages;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

const INDEX_FILE: &str = "index.html";

/// Serves files from the configured server root for every path outside the
/// upload and info pages.
pub struct StaticFileServer {
    document_root: PathBuf,
    mime_types: MimeTypes,
}

impl StaticFileServer {
    pub fn new<P: AsRef<Path>>(document_root: P) -> io::Result<Self> {
        let root = document_root.as_ref().to_path_buf();

        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Server root is not a directory: {}", root.display()),
            ));
        }

        Ok(StaticFileServer {
            document_root: root,
            mime_types: MimeTypes::new(),
        })
    }

    /// Serve the file or directory the request path points at. Missing
    /// files and traversal attempts surface as io errors for the caller to
    /// map onto HTTP statuses.
    pub fn serve_file(&self, request_path: &str) -> io::Result<HttpResponse> {
        let file_path = safe_path_join(&self.document_root, request_path)?;

        if file_path.is_dir() {
            let index_path = file_path.join(INDEX_FILE);
            if index_path.is_file() {
                return self.file_response(&index_path);
            }
            return self.listing_response(&file_path, request_path);
        }

        self.file_response(&file_path)
    }

    fn file_response(&self, path: &Path) -> io::Result<HttpResponse> {
        let mut file = File::open(path)?;
        let mut content = Vec::new();
        file.read_to_end(&mut content)?;

        let mut response = HttpResponse::ok();
        response.set_body(&content);
        response.set_header("Content-Type", self.mime_types.get_mime_type(path));
        Ok(response)
    }

    /// Directory index page for directories without an index file.
    fn listing_response(&self, dir_path: &Path, request_path: &str) -> io::Result<HttpResponse> {
        let mut directories = Vec::new();
        let mut files = Vec::new();

        for entry in fs::read_dir(dir_path)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            if entry.path().is_dir() {
                directories.push(name);
            } else {
                files.push(name);
            }
        }
        directories.sort_by_key(|name| name.to_lowercase());
        files.sort_by_key(|name| name.to_lowercase());

        let base = if request_path.ends_with('/') {
            request_path.to_string()
        } else {
            format!("{}/", request_path)
        };

        let mut html = vec![
            format!("<h2>Index of {}</h2>", pages::html_escape(request_path)),
            "<ul>".to_string(),
        ];
        if request_path != "/" {
            html.push(format!("<li><a href=\"{}..\">../</a></li>", base));
        }
        for name in &directories {
            html.push(format!(
                "<li><a href=\"{}{}\">{}/</a></li>",
                base,
                name,
                pages::html_escape(name)
            ));
        }
        for name in &files {
            html.push(format!(
                "<li><a href=\"{}{}\">{}</a></li>",
                base,
                name,
                pages::html_escape(name)
            ));
        }
        html.push("</ul>".to_string());

        Ok(HttpResponse::html(pages::page(&html, "Index")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_serve_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("test.txt"), "Hello, World!").unwrap();

        let server = StaticFileServer::new(temp_dir.path()).unwrap();
        let response = server.serve_file("/test.txt").unwrap();

        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, b"Hello, World!");
        assert_eq!(response.get_header("Content-Type").map(String::as_str), Some("text/plain"));
    }

    #[test]
    fn test_serve_missing_file_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let server = StaticFileServer::new(temp_dir.path()).unwrap();

        let err = server.serve_file("/nonexistent.txt").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_serve_directory_with_index() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("index.html"), "<p>Index Page</p>").unwrap();

        let server = StaticFileServer::new(temp_dir.path()).unwrap();
        let response = server.serve_file("/").unwrap();

        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, b"<p>Index Page</p>");
        assert_eq!(response.get_header("Content-Type").map(String::as_str), Some("text/html"));
    }

    #[test]
    fn test_serve_directory_listing() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("b.txt"), "b").unwrap();
        fs::create_dir(temp_dir.path().join("sub")).unwrap();

        let server = StaticFileServer::new(temp_dir.path()).unwrap();
        let response = server.serve_file("/").unwrap();
        let html = String::from_utf8(response.body).unwrap();

        assert!(html.contains("<title>OJ Index</title>"));
        assert!(html.contains("href=\"/sub\""));
        assert!(html.contains("href=\"/b.txt\""));
        // Directories are listed before files.
        assert!(html.find("sub/").unwrap() < html.find("b.txt").unwrap());
    }

    #[test]
    fn test_traversal_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let server = StaticFileServer::new(temp_dir.path()).unwrap();

        let err = server.serve_file("/../etc/passwd").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_missing_root_rejected_at_construction() {
        let temp_dir = TempDir::new().unwrap();
        assert!(StaticFileServer::new(temp_dir.path().join("nope")).is_err());
    }
}
