//! Versioned changelog: a UTF-8 document of run summaries, most recent
//! first. The next version derives from the trailing integer of the top
//! entry's header; anything unparseable falls back to version 0.

use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

/// Compute the next changelog version from the existing document contents.
/// Expected top line: `## 0.0.<n>`; a missing or malformed header yields 0.
pub fn next_version(contents: &str) -> u32 {
    let first_line = match contents.lines().next() {
        Some(line) if !line.trim().is_empty() => line.trim(),
        _ => return 0,
    };

    first_line
        .split_whitespace()
        .last()
        .and_then(|version| version.split('.').next_back())
        .and_then(|segment| segment.parse::<u32>().ok())
        .map(|v| v + 1)
        .unwrap_or(0)
}

/// Render one entry block in the changelog format.
pub fn render_entry(version: u32, rows_added: usize, rows_quarantined: usize) -> String {
    format!(
        "## 0.0.{version}\n### Added\n- {rows_added} cleansed rows added\n- {rows_quarantined} missing rows recorded\n\n"
    )
}

/// Prepend a new entry to the changelog document, creating it if absent.
/// Returns the version that was written.
pub fn prepend_entry(
    path: &Path,
    rows_added: usize,
    rows_quarantined: usize,
) -> io::Result<u32> {
    let existing = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e),
    };

    let version = next_version(&existing);
    debug!(version, rows_added, rows_quarantined, "writing changelog entry");

    let entry = render_entry(version, rows_added, rows_quarantined);
    fs::write(path, entry + &existing)?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_changelog_starts_at_zero() {
        assert_eq!(next_version(""), 0);
        assert_eq!(next_version("\n\n"), 0);
    }

    #[test]
    fn version_derives_from_top_entry() {
        let doc = "## 0.0.5\n### Added\n- 10 cleansed rows added\n- 1 missing rows recorded\n\n";
        assert_eq!(next_version(doc), 6);
    }

    #[test]
    fn unparseable_header_falls_back_to_zero() {
        assert_eq!(next_version("release notes, draft\n"), 0);
        assert_eq!(next_version("## v-next\n"), 0);
    }

    #[test]
    fn entry_block_matches_contract() {
        let entry = render_entry(3, 12, 2);
        assert_eq!(
            entry,
            "## 0.0.3\n### Added\n- 12 cleansed rows added\n- 2 missing rows recorded\n\n"
        );
    }

    #[test]
    fn entries_are_prepended_most_recent_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("changelog.md");

        let first = prepend_entry(&path, 4, 1).unwrap();
        let second = prepend_entry(&path, 2, 0).unwrap();
        assert_eq!((first, second), (0, 1));

        let doc = fs::read_to_string(&path).unwrap();
        assert!(doc.starts_with("## 0.0.1\n"));
        assert!(doc.contains("## 0.0.0\n"));
        assert_eq!(next_version(&doc), 2);
    }
}
