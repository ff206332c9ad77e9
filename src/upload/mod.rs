pub mod multipart;
pub mod storage;

pub use multipart::{MultipartField, MultipartParser};
pub use storage::{save_file, unique_path};
