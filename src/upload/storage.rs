//! Collision-safe persistence of uploaded files.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Find a path in `directory` for `desired_name` that does not collide with
/// an existing file.
///
/// If the desired name is taken, an index number is added to the file's base
/// name until a free name is found: `test.txt` becomes `test_1.txt`, then
/// `test_2.txt`, and so on. Uniqueness is checked against the directory
/// contents at call time; there is no upper bound on the index.
pub fn unique_path(desired_name: &str, directory: &Path) -> PathBuf {
    // Only the final path component counts; browsers may submit full paths.
    let name = Path::new(desired_name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let (base, ext) = split_extension(&name);

    let mut candidate = directory.join(format!("{}{}", base, ext));
    let mut i = 1;
    while candidate.exists() {
        candidate = directory.join(format!("{}_{}{}", base, i, ext));
        i += 1;
    }
    candidate
}

/// Write `data` to a collision-safe path for `desired_name` under
/// `directory`, returning the absolute path of the written file.
pub fn save_file(data: &[u8], desired_name: &str, directory: &Path) -> io::Result<PathBuf> {
    let path = unique_path(desired_name, directory);

    let mut file = File::create(&path)?;
    file.write_all(data)?;

    fs::canonicalize(&path)
}

/// Split a filename into base and extension, the extension keeping its
/// leading dot. A name without a dot, or with only a leading dot, has no
/// extension.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(pos) if pos > 0 => name.split_at(pos),
        _ => (name, ""),
    }
}
