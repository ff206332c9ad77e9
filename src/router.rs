use crate::config::ServerConfig;
use crate::fs::static_files::StaticFileServer;
use crate::handlers::{FileUpload, Handler, Info};
use crate::http::request::{HttpRequest, Method};
use crate::http::response::HttpResponse;
use std::io::{self, ErrorKind};

/// Path the upload form and POST endpoint are mounted on.
pub const UPLOAD_PATH: &str = "/oj_upload";
/// Path the informational page is mounted on.
pub const INFO_PATH: &str = "/oj_info";

/// Dispatches requests to the mounted handlers, falling back to static file
/// serving for every other path.
pub struct Router {
    upload: FileUpload,
    info: Info,
    static_files: StaticFileServer,
}

impl Router {
    pub fn new(config: &ServerConfig, program: String) -> io::Result<Self> {
        Ok(Router {
            upload: FileUpload::new(config.network_delay, config.save_directory.clone()),
            info: Info::new(program, config.usage_message.clone()),
            static_files: StaticFileServer::new(&config.server_root)?,
        })
    }

    #[cfg(test)]
    fn with_handlers(upload: FileUpload, info: Info, static_files: StaticFileServer) -> Self {
        Router {
            upload,
            info,
            static_files,
        }
    }

    /// Route a request and produce the response to send. Handler faults are
    /// mapped onto the generic error pages here; this never fails.
    pub fn route(&self, request: &HttpRequest) -> HttpResponse {
        let (handler_name, result) = match request.path.as_str() {
            UPLOAD_PATH => (self.upload.name(), self.upload.handle(request)),
            INFO_PATH => (self.info.name(), self.info.handle(request)),
            _ => ("StaticFiles", self.serve_static(request)),
        };

        let mut response = match result {
            Ok(response) => response,
            Err(e) => {
                log::warn!(
                    "{} failed on {} {}: {}",
                    handler_name,
                    request.method.as_str(),
                    request.path,
                    e
                );
                Self::fault_response(&e)
            }
        };

        if request.method == Method::Head {
            response.clear_body();
        }
        response
    }

    fn serve_static(&self, request: &HttpRequest) -> io::Result<HttpResponse> {
        match request.method {
            Method::Get | Method::Head => self.static_files.serve_file(&request.path),
            _ => Ok(HttpResponse::method_not_allowed()),
        }
    }

    fn fault_response(error: &io::Error) -> HttpResponse {
        match error.kind() {
            ErrorKind::NotFound => HttpResponse::not_found(),
            ErrorKind::PermissionDenied => HttpResponse::forbidden(),
            _ => HttpResponse::internal_server_error(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn router_for(root: &TempDir) -> Router {
        Router::with_handlers(
            FileUpload::with_echo(0, None, Box::new(io::sink())),
            Info::new("oddjob".to_string(), None),
            StaticFileServer::new(root.path()).unwrap(),
        )
    }

    fn get(path: &str) -> HttpRequest {
        let mut request = HttpRequest::new();
        request.path = path.to_string();
        request
    }

    #[test]
    fn test_routes_to_mounted_handlers() {
        let temp_dir = TempDir::new().unwrap();
        let router = router_for(&temp_dir);

        let info = router.route(&get(INFO_PATH));
        assert!(String::from_utf8(info.body).unwrap().contains("<title>OJ Info</title>"));

        let form = router.route(&get(UPLOAD_PATH));
        assert!(String::from_utf8(form.body).unwrap().contains("<title>OJ Uploader</title>"));
    }

    #[test]
    fn test_routes_other_paths_to_static_files() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("hello.txt"), "hi").unwrap();
        let router = router_for(&temp_dir);

        let response = router.route(&get("/hello.txt"));
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, b"hi");
    }

    #[test]
    fn test_missing_static_file_is_404() {
        let temp_dir = TempDir::new().unwrap();
        let router = router_for(&temp_dir);

        assert_eq!(router.route(&get("/missing.txt")).status_code, 404);
    }

    #[test]
    fn test_traversal_is_403() {
        let temp_dir = TempDir::new().unwrap();
        let router = router_for(&temp_dir);

        assert_eq!(router.route(&get("/../secret")).status_code, 403);
    }

    #[test]
    fn test_post_to_static_path_not_allowed() {
        let temp_dir = TempDir::new().unwrap();
        let router = router_for(&temp_dir);

        let mut request = get("/hello.txt");
        request.method = Method::Post;
        assert_eq!(router.route(&request).status_code, 405);
    }

    #[test]
    fn test_head_drops_body() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("hello.txt"), "hi").unwrap();
        let router = router_for(&temp_dir);

        let mut request = get("/hello.txt");
        request.method = Method::Head;
        let response = router.route(&request);

        assert_eq!(response.status_code, 200);
        assert!(response.body.is_empty());
        assert_eq!(response.get_header("Content-Length").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_malformed_upload_post_is_500() {
        let temp_dir = TempDir::new().unwrap();
        let router = router_for(&temp_dir);

        let mut request = get(UPLOAD_PATH);
        request.method = Method::Post;
        request.body = b"not multipart at all".to_vec();

        assert_eq!(router.route(&request).status_code, 500);
    }
}
