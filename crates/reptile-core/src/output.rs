//! Joining extracted items and writing the result file.

use std::path::Path;

use crate::error::{ReptileError, ReptileResult};

/// Join extracted items with `separator`. No trailing separator is added.
pub fn join_items<S: AsRef<str>>(items: &[S], separator: &str) -> String {
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(separator);
        }
        out.push_str(item.as_ref());
    }
    out
}

/// Write `content` to `path` as UTF-8, replacing any existing file.
///
/// Parent directories are not created. The write is a single call and is not
/// atomic: a failure part-way may leave a truncated file behind.
pub fn write_output(path: &Path, content: &str) -> ReptileResult<()> {
    std::fs::write(path, content.as_bytes()).map_err(|e| ReptileError::io(path, e))?;
    tracing::info!("Content saved to {} ({} bytes)", path.display(), content.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_with_custom_separator() {
        assert_eq!(join_items(&["a", "b", "c"], "|"), "a|b|c");
    }

    #[test]
    fn test_join_empty_and_single() {
        let empty: [&str; 0] = [];
        assert_eq!(join_items(&empty, "\n\n"), "");
        assert_eq!(join_items(&["only"], "\n\n"), "only");
    }

    #[test]
    fn test_write_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        std::fs::write(&path, "old content that is longer").unwrap();

        write_output(&path, "new").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_write_keeps_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("utf8.txt");
        write_output(&path, "héllo 世界").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "héllo 世界");
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.txt");

        let err = write_output(&path, "x").unwrap_err();
        assert!(matches!(err, ReptileError::Io { .. }));
        assert!(!path.exists());
    }
}
