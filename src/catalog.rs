//! Read-only client for the external photo catalog.
//!
//! The photo library owns the actual catalog — indexing, tagging, metadata
//! extraction all happen over there. This tool only ever reads two things
//! from its `catalog.db`: photo records and their tags.
//!
//! ```text
//! images(id, path, taken, creator, title, alt, caption)
//! image_tags(image, tag)
//! ```
//!
//! [`Catalog`] is the seam the planner and builder work against:
//! [`SqliteCatalog`] is the real implementation, [`MemoryCatalog`] backs
//! unit tests. Search results come back ordered by `(taken, id)` ascending —
//! the catalog's native order, which the planner relies on for within-day
//! tie-breaking.
//!
//! Filtering deliberately happens in Rust after an ordered full read. Local
//! catalogs are a few thousand rows at most and this keeps the
//! [`SearchFilter`] semantics in one tested place instead of spread across
//! SQL strings.

use chrono::NaiveDateTime;
use rusqlite::Connection;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Filename of the external library's database under the config root.
pub const CATALOG_DB_FILENAME: &str = "catalog.db";

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("photo catalog unavailable: {0}")]
    Unavailable(PathBuf),
    #[error("catalog query failed: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("unknown photo: {0}")]
    UnknownPhoto(i64),
}

/// A photo as the external catalog describes it. Immutable on our side.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoRecord {
    pub id: i64,
    /// Absolute path to the original file in the library's storage.
    pub path: PathBuf,
    /// Capture timestamp in the local time zone of the capture metadata.
    pub taken: NaiveDateTime,
    pub creator: Option<String>,
    pub title: Option<String>,
    pub alt: Option<String>,
    pub caption: Option<String>,
    pub tags: Vec<String>,
}

/// Criteria for a saved search backing an auto-blog.
///
/// - `creators`: match any listed creator (empty = everyone)
/// - `all_tags`: photo must carry every listed tag
/// - `no_tags`: photo must carry none of the listed tags
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchFilter {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub creators: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub all_tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub no_tags: Vec<String>,
}

impl SearchFilter {
    pub fn matches(&self, photo: &PhotoRecord) -> bool {
        if !self.creators.is_empty() {
            let Some(creator) = &photo.creator else {
                return false;
            };
            if !self.creators.contains(creator) {
                return false;
            }
        }
        if !self.all_tags.iter().all(|tag| photo.tags.contains(tag)) {
            return false;
        }
        if self.no_tags.iter().any(|tag| photo.tags.contains(tag)) {
            return false;
        }
        true
    }
}

/// The catalog operations this tool needs from the external library.
pub trait Catalog {
    /// All photos matching `filter`, ordered by `(taken, id)` ascending.
    fn search(&self, filter: &SearchFilter) -> Result<Vec<PhotoRecord>, CatalogError>;

    /// Look up photos by id, in the requested order.
    ///
    /// Fails with [`CatalogError::UnknownPhoto`] if any id doesn't resolve.
    fn get(&self, ids: &[i64]) -> Result<Vec<PhotoRecord>, CatalogError>;
}

/// Catalog client reading the external library's sqlite database.
pub struct SqliteCatalog {
    connection: Connection,
}

impl SqliteCatalog {
    /// Open `catalog.db` under the library's config root.
    ///
    /// A missing database means the library isn't set up (or the wrong
    /// `--config` was passed) — surfaced as [`CatalogError::Unavailable`].
    pub fn open(config_root: &Path) -> Result<Self, CatalogError> {
        let db_path = config_root.join(CATALOG_DB_FILENAME);
        if !db_path.is_file() {
            return Err(CatalogError::Unavailable(db_path));
        }
        let connection = Connection::open(&db_path)
            .map_err(|_| CatalogError::Unavailable(db_path))?;
        Ok(Self { connection })
    }

    /// Every photo in the catalog, tags attached, in native order.
    fn load_all(&self) -> Result<Vec<PhotoRecord>, CatalogError> {
        let mut tags_by_photo: HashMap<i64, Vec<String>> = HashMap::new();
        {
            let mut statement = self
                .connection
                .prepare("SELECT image, tag FROM image_tags ORDER BY image, tag")?;
            let rows = statement.query_map([], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })?;
            for row in rows {
                let (image, tag) = row?;
                tags_by_photo.entry(image).or_default().push(tag);
            }
        }

        let mut statement = self.connection.prepare(
            "SELECT id, path, taken, creator, title, alt, caption
             FROM images ORDER BY taken, id",
        )?;
        let rows = statement.query_map([], |row| {
            Ok(PhotoRecord {
                id: row.get(0)?,
                path: PathBuf::from(row.get::<_, String>(1)?),
                taken: row.get(2)?,
                creator: row.get(3)?,
                title: row.get(4)?,
                alt: row.get(5)?,
                caption: row.get(6)?,
                tags: Vec::new(),
            })
        })?;

        let mut photos = Vec::new();
        for row in rows {
            let mut photo = row?;
            if let Some(tags) = tags_by_photo.remove(&photo.id) {
                photo.tags = tags;
            }
            photos.push(photo);
        }
        Ok(photos)
    }
}

impl Catalog for SqliteCatalog {
    fn search(&self, filter: &SearchFilter) -> Result<Vec<PhotoRecord>, CatalogError> {
        let mut photos = self.load_all()?;
        photos.retain(|photo| filter.matches(photo));
        Ok(photos)
    }

    fn get(&self, ids: &[i64]) -> Result<Vec<PhotoRecord>, CatalogError> {
        let all = self.load_all()?;
        let by_id: HashMap<i64, PhotoRecord> =
            all.into_iter().map(|photo| (photo.id, photo)).collect();
        ids.iter()
            .map(|id| {
                by_id
                    .get(id)
                    .cloned()
                    .ok_or(CatalogError::UnknownPhoto(*id))
            })
            .collect()
    }
}

/// In-memory catalog for tests and library embedders.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    photos: Vec<PhotoRecord>,
}

impl MemoryCatalog {
    pub fn new(mut photos: Vec<PhotoRecord>) -> Self {
        photos.sort_by(|a, b| (a.taken, a.id).cmp(&(b.taken, b.id)));
        Self { photos }
    }
}

impl Catalog for MemoryCatalog {
    fn search(&self, filter: &SearchFilter) -> Result<Vec<PhotoRecord>, CatalogError> {
        Ok(self
            .photos
            .iter()
            .filter(|photo| filter.matches(photo))
            .cloned()
            .collect())
    }

    fn get(&self, ids: &[i64]) -> Result<Vec<PhotoRecord>, CatalogError> {
        ids.iter()
            .map(|id| {
                self.photos
                    .iter()
                    .find(|photo| photo.id == *id)
                    .cloned()
                    .ok_or(CatalogError::UnknownPhoto(*id))
            })
            .collect()
    }
}

/// Create the catalog schema in an empty database.
///
/// The real schema belongs to the external library; this exists so tests and
/// fixtures can fabricate a catalog without it installed. Not part of the
/// public surface.
#[doc(hidden)]
pub fn create_catalog_db(config_root: &Path) -> Result<Connection, CatalogError> {
    let connection = Connection::open(config_root.join(CATALOG_DB_FILENAME))?;
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS images (
            id INTEGER PRIMARY KEY,
            path TEXT NOT NULL,
            taken TEXT NOT NULL,
            creator TEXT,
            title TEXT,
            alt TEXT,
            caption TEXT
        );
        CREATE TABLE IF NOT EXISTS image_tags (
            image INTEGER NOT NULL REFERENCES images (id),
            tag TEXT NOT NULL,
            PRIMARY KEY (image, tag)
        );",
    )?;
    Ok(connection)
}

/// Insert a photo row (plus tags) into a fabricated catalog.
#[doc(hidden)]
pub fn insert_photo(connection: &Connection, photo: &PhotoRecord) -> Result<(), CatalogError> {
    connection.execute(
        "INSERT INTO images (id, path, taken, creator, title, alt, caption)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            photo.id,
            photo.path.to_string_lossy(),
            photo.taken,
            photo.creator,
            photo.title,
            photo.alt,
            photo.caption,
        ],
    )?;
    for tag in &photo.tags {
        connection.execute(
            "INSERT INTO image_tags (image, tag) VALUES (?1, ?2)",
            rusqlite::params![photo.id, tag],
        )?;
    }
    Ok(())
}
