pub mod info;
pub mod upload;

pub use info::Info;
pub use upload::FileUpload;

use crate::http::request::HttpRequest;
use crate::http::response::HttpResponse;
use std::io;

/// Trait for request handlers mounted on a fixed path.
pub trait Handler: Send + Sync {
    /// Handle an HTTP request and produce a response. An `Err` is surfaced
    /// to the client as the generic fault page for its error kind.
    fn handle(&self, request: &HttpRequest) -> io::Result<HttpResponse>;

    /// Name of this handler for logging.
    fn name(&self) -> &'static str;
}
