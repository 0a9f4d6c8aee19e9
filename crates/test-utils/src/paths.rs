//! Temporary file helpers.

use std::fs;
use std::path::PathBuf;

/// Creates a temporary directory that is removed when dropped.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix("dap-convert-test-")
        .tempdir()
        .expect("Failed to create temp directory")
}

/// Writes `contents` to `name` inside `dir` and returns the full path.
pub fn write_temp_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("Failed to write temp file");
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_temp_file() {
        let dir = temp_test_dir();
        let path = write_temp_file(&dir, "config.yaml", "a: 1\n");
        assert_eq!(fs::read_to_string(path).unwrap(), "a: 1\n");
    }
}
