//! The section registry: persisted definitions of what the site contains.
//!
//! Sections live as TOML files inside the domain directory:
//!
//! - **Auto-blogs** — `section-<slug>.toml`: a saved catalog search plus
//!   display metadata. Pages come from photo capture dates at build time.
//! - **Manual blogs** — `blog-<slug>/section.toml`: display metadata only.
//!   Each post is its own `blog-<slug>/post-<slug>.toml`.
//!
//! Slugs are unique across both kinds — they become top-level URL segments.
//! Creation checks for collisions before writing anything, so a failed
//! `create` leaves the registry untouched. There is no update command;
//! definitions are edited in place or not at all.
//!
//! Single local user, sequential CLI invocations: no locking.

use crate::catalog::SearchFilter;
use crate::slug::{self, SlugError};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error in {0}: {1}")]
    Toml(PathBuf, toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error(transparent)]
    Slug(#[from] SlugError),
    #[error("a section with slug '{0}' already exists")]
    DuplicateSlug(String),
    #[error("a post with slug '{1}' already exists in blog '{0}'")]
    DuplicatePost(String, String),
    #[error("no section with slug '{0}'")]
    NotFound(String),
    #[error("no blog with slug '{0}'")]
    BlogNotFound(String),
    #[error("invalid date '{0}' (expected 'YYYY-MM-DD HH:MM' or 'YYYY-MM-DD')")]
    InvalidDate(String),
}

/// Display metadata shared by both section kinds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Display {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Symbol shown next to the title in the navbar (e.g. an emoji).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// What kind of section a slug names, and its kind-specific payload.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionKind {
    /// Pages derive from a saved catalog search, one page per capture date.
    Auto { filter: SearchFilter },
    /// Pages are explicit author-created posts.
    Blog { posts: Vec<Post> },
}

/// A registered section.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionDefinition {
    pub slug: String,
    pub display: Display,
    pub created: NaiveDateTime,
    pub kind: SectionKind,
}

/// A manual blog post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Post {
    pub slug: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Catalog ids of the attached photos, in display order.
    #[serde(default)]
    pub images: Vec<i64>,
    pub date: NaiveDateTime,
}

impl Post {
    pub fn day(&self) -> NaiveDate {
        self.date.date()
    }
}

/// On-disk form of `section-<slug>.toml`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct AutoSectionFile {
    slug: String,
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    icon: Option<String>,
    created: NaiveDateTime,
    #[serde(default)]
    filter: SearchFilter,
}

impl AutoSectionFile {
    fn display(&self) -> Display {
        Display {
            title: self.title.clone(),
            description: self.description.clone(),
            icon: self.icon.clone(),
        }
    }
}

/// On-disk form of `blog-<slug>/section.toml`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct BlogSectionFile {
    slug: String,
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    icon: Option<String>,
    created: NaiveDateTime,
}

impl BlogSectionFile {
    fn display(&self) -> Display {
        Display {
            title: self.title.clone(),
            description: self.description.clone(),
            icon: self.icon.clone(),
        }
    }
}

/// Handle on a domain directory's sections.
pub struct Registry {
    dir: PathBuf,
}

impl Registry {
    pub fn new(domain_dir: &Path) -> Self {
        Self {
            dir: domain_dir.to_path_buf(),
        }
    }

    fn auto_path(&self, slug: &str) -> PathBuf {
        self.dir.join(format!("section-{slug}.toml"))
    }

    fn blog_dir(&self, slug: &str) -> PathBuf {
        self.dir.join(format!("blog-{slug}"))
    }

    fn slug_taken(&self, slug: &str) -> bool {
        self.auto_path(slug).exists() || self.blog_dir(slug).exists()
    }

    /// Register an auto-blog. The slug is derived from the title when not
    /// given explicitly.
    pub fn create_auto(
        &self,
        title: &str,
        explicit_slug: Option<&str>,
        description: Option<String>,
        icon: Option<String>,
        filter: SearchFilter,
        now: NaiveDateTime,
    ) -> Result<SectionDefinition, RegistryError> {
        let slug = slug::resolve(explicit_slug, title)?;
        if self.slug_taken(&slug) {
            return Err(RegistryError::DuplicateSlug(slug));
        }

        let file = AutoSectionFile {
            slug: slug.clone(),
            title: title.to_string(),
            description,
            icon,
            created: now,
            filter: filter.clone(),
        };
        fs::write(self.auto_path(&slug), toml::to_string_pretty(&file)?)?;

        Ok(SectionDefinition {
            slug,
            display: file.display(),
            created: now,
            kind: SectionKind::Auto { filter },
        })
    }

    /// Register a manual blog (initially empty).
    pub fn create_blog(
        &self,
        title: &str,
        explicit_slug: Option<&str>,
        description: Option<String>,
        icon: Option<String>,
        now: NaiveDateTime,
    ) -> Result<SectionDefinition, RegistryError> {
        let slug = slug::resolve(explicit_slug, title)?;
        if self.slug_taken(&slug) {
            return Err(RegistryError::DuplicateSlug(slug));
        }

        let file = BlogSectionFile {
            slug: slug.clone(),
            title: title.to_string(),
            description,
            icon,
            created: now,
        };
        let blog_dir = self.blog_dir(&slug);
        fs::create_dir(&blog_dir)?;
        fs::write(blog_dir.join("section.toml"), toml::to_string_pretty(&file)?)?;

        Ok(SectionDefinition {
            slug,
            display: file.display(),
            created: now,
            kind: SectionKind::Blog { posts: Vec::new() },
        })
    }

    /// Add a post to an existing manual blog.
    ///
    /// Photo ids should already be resolved against the catalog — the
    /// registry only records them.
    pub fn create_post(
        &self,
        blog_slug: &str,
        title: &str,
        explicit_slug: Option<&str>,
        description: Option<String>,
        images: Vec<i64>,
        date: NaiveDateTime,
    ) -> Result<Post, RegistryError> {
        let blog_dir = self.blog_dir(blog_slug);
        if !blog_dir.is_dir() {
            return Err(RegistryError::BlogNotFound(blog_slug.to_string()));
        }

        let slug = slug::resolve(explicit_slug, title)?;
        let post_path = blog_dir.join(format!("post-{slug}.toml"));
        if post_path.exists() {
            return Err(RegistryError::DuplicatePost(blog_slug.to_string(), slug));
        }

        let post = Post {
            slug,
            title: title.to_string(),
            description,
            images,
            date,
        };
        fs::write(post_path, toml::to_string_pretty(&post)?)?;
        Ok(post)
    }

    /// Load one section by slug.
    pub fn get(&self, slug: &str) -> Result<SectionDefinition, RegistryError> {
        let auto_path = self.auto_path(slug);
        if auto_path.is_file() {
            return self.load_auto(&auto_path);
        }
        let blog_dir = self.blog_dir(slug);
        if blog_dir.is_dir() {
            return self.load_blog(&blog_dir);
        }
        Err(RegistryError::NotFound(slug.to_string()))
    }

    /// All registered sections, ordered by slug.
    pub fn list(&self) -> Result<Vec<SectionDefinition>, RegistryError> {
        let mut sections = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            let path = entry.path();
            if path.is_file()
                && name.starts_with("section-")
                && name.ends_with(".toml")
            {
                sections.push(self.load_auto(&path)?);
            } else if path.is_dir() && name.starts_with("blog-") {
                sections.push(self.load_blog(&path)?);
            }
        }
        sections.sort_by(|a, b| a.slug.cmp(&b.slug));
        Ok(sections)
    }

    fn load_auto(&self, path: &Path) -> Result<SectionDefinition, RegistryError> {
        let file: AutoSectionFile = read_toml(path)?;
        Ok(SectionDefinition {
            display: file.display(),
            slug: file.slug,
            created: file.created,
            kind: SectionKind::Auto {
                filter: file.filter,
            },
        })
    }

    fn load_blog(&self, blog_dir: &Path) -> Result<SectionDefinition, RegistryError> {
        let file: BlogSectionFile = read_toml(&blog_dir.join("section.toml"))?;

        let mut posts = Vec::new();
        for entry in fs::read_dir(blog_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with("post-") && name.ends_with(".toml") {
                posts.push(read_toml::<Post>(&entry.path())?);
            }
        }
        // Stable load order; the planner decides display order
        posts.sort_by(|a, b| (a.date, &a.slug).cmp(&(b.date, &b.slug)));

        Ok(SectionDefinition {
            display: file.display(),
            slug: file.slug,
            created: file.created,
            kind: SectionKind::Blog { posts },
        })
    }
}

fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, RegistryError> {
    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| RegistryError::Toml(path.to_path_buf(), e))
}

/// Parse a `--date` argument: `YYYY-MM-DD HH:MM` or bare `YYYY-MM-DD`.
pub fn parse_date(value: &str) -> Result<NaiveDateTime, RegistryError> {
    let parsed = if value.contains(' ') {
        NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M")
    } else {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").map(|d| d.and_hms_opt(0, 0, 0).unwrap())
    };
    parsed.map_err(|_| RegistryError::InvalidDate(value.to_string()))
}
