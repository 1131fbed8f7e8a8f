//! The page planner: from a section definition to concrete pages.
//!
//! Pure apart from reading the catalog: given the same registry snapshot,
//! catalog state, and date ledger, planning twice yields identical plans.
//! No files are written here — the builder does that.
//!
//! # Auto-blogs
//!
//! A fresh catalog search, grouped by calendar date, one page per date,
//! pages ordered by date ascending. The date that governs a photo is the
//! one recorded in the ledger ([`BuildState::assign_date`]) — its capture
//! date the first time it was ever seen — so existing URLs stay stable when
//! photos arrive out of order or capture metadata shifts. Within a day the
//! catalog's native `(taken, id)` order is preserved, never re-sorted.
//!
//! # Manual blogs
//!
//! Posts already carry their identity (slug + date). Planning resolves
//! their photo ids against the catalog and orders pages newest-first, which
//! is also the index display order.

use crate::catalog::{Catalog, CatalogError, PhotoRecord};
use crate::registry::{SectionDefinition, SectionKind};
use crate::state::BuildState;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// What identifies a page within its section's URL space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageIdentity {
    /// Auto-blog page: `<section>/<YYYY-MM-DD>.html`
    Dated(NaiveDate),
    /// Manual post: `<section>/<post-slug>.html`
    Slugged(String),
}

impl PageIdentity {
    /// The page's filename within the section directory.
    pub fn file_name(&self) -> String {
        match self {
            PageIdentity::Dated(date) => format!("{}.html", date.format("%Y-%m-%d")),
            PageIdentity::Slugged(slug) => format!("{slug}.html"),
        }
    }
}

/// One planned page: identity, display metadata, and its photos.
#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan {
    pub identity: PageIdentity,
    pub title: String,
    pub description: Option<String>,
    /// The day shown on the page and used for index ordering.
    pub date: NaiveDate,
    pub photos: Vec<PhotoRecord>,
}

/// All pages for one section, in page-emission order.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionPlan {
    pub section: SectionDefinition,
    /// Auto-blogs: date ascending. Manual blogs: date descending.
    pub pages: Vec<PagePlan>,
}

impl SectionPlan {
    /// Pages in index display order (newest first) regardless of kind.
    pub fn index_entries(&self) -> Vec<&PagePlan> {
        let mut entries: Vec<&PagePlan> = self.pages.iter().collect();
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        entries
    }
}

/// Plan one section against the current catalog and ledger.
///
/// Records first-sight dates into `state`; that is its only side effect.
pub fn plan_section(
    section: &SectionDefinition,
    catalog: &dyn Catalog,
    state: &mut BuildState,
) -> Result<SectionPlan, PlanError> {
    let pages = match &section.kind {
        SectionKind::Auto { filter } => {
            let photos = catalog.search(filter)?;
            plan_auto_pages(section, photos, state)
        }
        SectionKind::Blog { posts } => {
            let mut pages = Vec::with_capacity(posts.len());
            for post in posts {
                pages.push(PagePlan {
                    identity: PageIdentity::Slugged(post.slug.clone()),
                    title: post.title.clone(),
                    description: post.description.clone(),
                    date: post.day(),
                    photos: catalog.get(&post.images)?,
                });
            }
            // Newest first; slug breaks date ties stably
            pages.sort_by(|a, b| {
                b.date
                    .cmp(&a.date)
                    .then_with(|| a.identity.file_name().cmp(&b.identity.file_name()))
            });
            pages
        }
    };
    Ok(SectionPlan {
        section: section.clone(),
        pages,
    })
}

/// Group searched photos into dated pages, honoring the ledger.
fn plan_auto_pages(
    section: &SectionDefinition,
    photos: Vec<PhotoRecord>,
    state: &mut BuildState,
) -> Vec<PagePlan> {
    // BTreeMap gives date-ascending pages; pushing preserves catalog order
    // within each day.
    let mut groups: BTreeMap<NaiveDate, Vec<PhotoRecord>> = BTreeMap::new();
    for photo in photos {
        let date = state.assign_date(photo.id, photo.taken.date());
        groups.entry(date).or_default().push(photo);
    }

    groups
        .into_iter()
        .map(|(date, photos)| {
            // A day's page takes the first photo's title when it has one
            let title = photos
                .iter()
                .find_map(|p| p.title.clone())
                .unwrap_or_else(|| section.display.title.clone());
            PagePlan {
                identity: PageIdentity::Dated(date),
                title,
                description: None,
                date,
                photos,
            }
        })
        .collect()
}
