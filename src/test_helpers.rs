//! Shared fixtures for unit tests. Compiled only under `cfg(test)`.

use crate::catalog::PhotoRecord;
use crate::config::SiteConfig;
use crate::registry::Registry;
use chrono::{NaiveDate, NaiveDateTime};
use std::path::Path;
use tempfile::TempDir;

/// A fixed timestamp for tests that only need "some moment".
pub(crate) fn noon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

/// A bare photo record taken at noon on the given day. The path points at
/// a file that does not exist; use [`materialized_photo`] when the build
/// needs to copy it.
pub(crate) fn photo(id: i64, year: i32, month: u32, day: u32) -> PhotoRecord {
    photo_at(id, year, month, day, 12, 0)
}

/// Like [`photo`] but with an explicit capture time.
pub(crate) fn photo_at(
    id: i64,
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
) -> PhotoRecord {
    PhotoRecord {
        id,
        path: format!("/photos/{id}.jpg").into(),
        taken: NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap(),
        creator: None,
        title: None,
        alt: None,
        caption: None,
        tags: Vec::new(),
    }
}

/// A photo whose file actually exists on disk, under `dir/library/`.
pub(crate) fn materialized_photo(
    dir: &Path,
    id: i64,
    year: i32,
    month: u32,
    day: u32,
) -> PhotoRecord {
    let library = dir.join("library");
    std::fs::create_dir_all(&library).unwrap();
    let path = library.join(format!("{id}.jpg"));
    std::fs::write(&path, format!("jpeg-bytes-{id}")).unwrap();
    let mut record = photo(id, year, month, day);
    record.path = path;
    record
}

/// An empty domain directory with a registry rooted in it.
pub(crate) fn registry_fixture() -> (TempDir, Registry) {
    let tmp = TempDir::new().unwrap();
    let registry = Registry::new(tmp.path());
    (tmp, registry)
}

/// An empty domain directory plus a config whose build directory lives
/// alongside it.
pub(crate) fn domain_fixture() -> (TempDir, SiteConfig) {
    let tmp = TempDir::new().unwrap();
    let config = SiteConfig::new(
        "Test Site".into(),
        "https://test.example".into(),
        tmp.path().join("build"),
    );
    (tmp, config)
}
