//! Persistent build state: the date ledger and rendered-page hashes.
//!
//! Stored as `state.json` in the domain directory — next to the section
//! definitions, **not** in the build directory, so `build --fresh` never
//! touches it.
//!
//! # The date ledger
//!
//! Auto-blog URLs are calendar dates, and a URL must never silently change
//! what it shows. Recomputing dates from a live catalog search every build
//! would do exactly that whenever photos are discovered out of arrival
//! order. So the first time a photo appears in a search result, the date it
//! was assigned is recorded here permanently; every later build groups by
//! the recorded date. The URL set only ever grows — an existing page can
//! gain a late-discovered photo from the same calendar day, but it never
//! loses or swaps photos.
//!
//! # Page hashes
//!
//! Rendering is deterministic, so the builder can skip writing a page whose
//! SHA-256 matches the recorded hash and whose file still exists. Hashes
//! are keyed by build-relative path. A missing, corrupt, or version-bumped
//! state file loads as empty: the build still works, it just rewrites
//! everything and re-records dates from the current catalog.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::io;
use std::path::Path;

/// Name of the state file within the domain directory.
const STATE_FILENAME: &str = "state.json";

/// Bump to discard all existing state when the format changes.
const STATE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildState {
    pub version: u32,
    /// Photo id → the calendar date its page was assigned at first sight.
    /// Keys are strings because JSON object keys must be.
    dates: BTreeMap<String, NaiveDate>,
    /// Build-relative output path → SHA-256 hex of the last written content.
    pages: BTreeMap<String, String>,
}

impl BuildState {
    pub fn empty() -> Self {
        Self {
            version: STATE_VERSION,
            dates: BTreeMap::new(),
            pages: BTreeMap::new(),
        }
    }

    /// Load from the domain directory. Missing, unparsable, or
    /// version-mismatched files all load as empty.
    pub fn load(domain_dir: &Path) -> Self {
        let path = domain_dir.join(STATE_FILENAME);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        let state: Self = match serde_json::from_str(&content) {
            Ok(s) => s,
            Err(_) => return Self::empty(),
        };
        if state.version != STATE_VERSION {
            return Self::empty();
        }
        state
    }

    /// Save to the domain directory.
    pub fn save(&self, domain_dir: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(domain_dir.join(STATE_FILENAME), json)
    }

    /// The recorded date for a photo, if it has been seen before.
    pub fn assigned_date(&self, photo_id: i64) -> Option<NaiveDate> {
        self.dates.get(&photo_id.to_string()).copied()
    }

    /// Record a photo's assigned date if it hasn't one already, returning
    /// the date that governs (recorded wins over the candidate).
    pub fn assign_date(&mut self, photo_id: i64, candidate: NaiveDate) -> NaiveDate {
        *self.dates.entry(photo_id.to_string()).or_insert(candidate)
    }

    /// Whether the page at `relative` already holds exactly `content`.
    pub fn page_unchanged(&self, relative: &str, content: &str) -> bool {
        self.pages
            .get(relative)
            .is_some_and(|recorded| *recorded == content_hash(content))
    }

    /// Record a page's content hash after writing it.
    pub fn record_page(&mut self, relative: &str, content: &str) {
        self.pages
            .insert(relative.to_string(), content_hash(content));
    }

    /// Forget all page hashes (the files are gone after `--fresh`).
    /// The date ledger is deliberately untouched.
    pub fn clear_pages(&mut self) {
        self.pages.clear();
    }
}

/// SHA-256 of rendered content, hex-encoded.
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn first_assignment_records_candidate() {
        let mut state = BuildState::empty();
        assert_eq!(state.assigned_date(7), None);
        assert_eq!(state.assign_date(7, date(5)), date(5));
        assert_eq!(state.assigned_date(7), Some(date(5)));
    }

    #[test]
    fn recorded_date_wins_over_later_candidate() {
        let mut state = BuildState::empty();
        state.assign_date(7, date(5));
        // Capture metadata changed upstream: the URL must not move
        assert_eq!(state.assign_date(7, date(9)), date(5));
    }

    #[test]
    fn save_load_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let mut state = BuildState::empty();
        state.assign_date(7, date(5));
        state.record_page("birds/2024-01-05.html", "<html>");
        state.save(tmp.path()).unwrap();

        let loaded = BuildState::load(tmp.path());
        assert_eq!(loaded.assigned_date(7), Some(date(5)));
        assert!(loaded.page_unchanged("birds/2024-01-05.html", "<html>"));
    }

    #[test]
    fn missing_file_loads_empty() {
        let tmp = TempDir::new().unwrap();
        let state = BuildState::load(tmp.path());
        assert_eq!(state.assigned_date(1), None);
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(STATE_FILENAME), "{not json").unwrap();
        let state = BuildState::load(tmp.path());
        assert_eq!(state.assigned_date(1), None);
    }

    #[test]
    fn version_mismatch_loads_empty() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join(STATE_FILENAME),
            r#"{"version": 99, "dates": {"1": "2024-01-05"}, "pages": {}}"#,
        )
        .unwrap();
        let state = BuildState::load(tmp.path());
        assert_eq!(state.assigned_date(1), None);
    }

    #[test]
    fn page_unchanged_requires_exact_content() {
        let mut state = BuildState::empty();
        state.record_page("index.html", "one");
        assert!(state.page_unchanged("index.html", "one"));
        assert!(!state.page_unchanged("index.html", "two"));
        assert!(!state.page_unchanged("other.html", "one"));
    }

    #[test]
    fn clear_pages_keeps_ledger() {
        let mut state = BuildState::empty();
        state.assign_date(7, date(5));
        state.record_page("index.html", "one");
        state.clear_pages();
        assert!(!state.page_unchanged("index.html", "one"));
        assert_eq!(state.assigned_date(7), Some(date(5)));
    }
}
