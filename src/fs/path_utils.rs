use std::io;
use std::path::{Path, PathBuf};

/// Resolve a request path against a document root, refusing directory
/// traversal.
///
/// Empty and `.` components are dropped; any `..` component or NUL byte
/// rejects the whole path.
pub fn safe_path_join(document_root: &Path, request_path: &str) -> io::Result<PathBuf> {
    let clean_path = request_path.trim_start_matches('/');

    let mut result = document_root.to_path_buf();
    for component in clean_path.split('/') {
        match component {
            "" | "." => continue,
            ".." => {
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    "Directory traversal not allowed",
                ));
            }
            comp if comp.contains('\0') => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "Null bytes in path not allowed",
                ));
            }
            comp => result.push(comp),
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_normal_paths() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        assert_eq!(safe_path_join(root, "/index.html").unwrap(), root.join("index.html"));
        assert_eq!(
            safe_path_join(root, "/css/style.css").unwrap(),
            root.join("css").join("style.css")
        );
        assert_eq!(safe_path_join(root, "js/./app.js").unwrap(), root.join("js").join("app.js"));
        assert_eq!(safe_path_join(root, "/").unwrap(), root);
    }

    #[test]
    fn test_directory_traversal_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        assert!(safe_path_join(root, "/../etc/passwd").is_err());
        assert!(safe_path_join(root, "/css/../../../etc/passwd").is_err());
        assert!(safe_path_join(root, "/./../secret").is_err());
    }

    #[test]
    fn test_null_bytes_rejected() {
        let temp_dir = TempDir::new().unwrap();
        assert!(safe_path_join(temp_dir.path(), "/index.html\0").is_err());
    }
}
