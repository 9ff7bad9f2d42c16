//! Sibling file lookup.

use std::path::{Path, PathBuf};

/// Returns `path` if it exists, else an entry of its directory whose
/// name matches case-insensitively.
pub fn find_case_insensitive(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }

    let wanted = path.file_name()?.to_string_lossy().to_lowercase();
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    std::fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .find(|candidate| {
            candidate.is_file()
                && candidate
                    .file_name()
                    .map(|n| n.to_string_lossy().to_lowercase() == wanted)
                    .unwrap_or(false)
        })
}

/// Finds the memo file next to a table, trying `extension` in any case.
pub fn memo_sibling(table: &Path, extension: &str) -> Option<PathBuf> {
    find_case_insensitive(&table.with_extension(extension))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_exact_match() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("orders.fpt");
        File::create(&path).unwrap();
        assert_eq!(find_case_insensitive(&path), Some(path));
    }

    #[test]
    fn test_case_insensitive_match() {
        let dir = tempdir().unwrap();
        let actual = dir.path().join("ORDERS.FPT");
        File::create(&actual).unwrap();

        let found = memo_sibling(&dir.path().join("orders.dbf"), "fpt").unwrap();
        assert_eq!(
            found.file_name().unwrap().to_string_lossy().to_lowercase(),
            "orders.fpt"
        );
        assert!(found.is_file());
    }

    #[test]
    fn test_no_match() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("other.dbt")).unwrap();
        assert!(memo_sibling(&dir.path().join("orders.dbf"), "dbt").is_none());
    }
}
