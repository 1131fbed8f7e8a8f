//! The site builder: registry → planner → renderer → build directory.
//!
//! For every registered section this plans pages, renders them, and writes
//! the result under the configured build directory:
//!
//! ```text
//! build/
//! ├── index.html                 # Home page
//! ├── style.css                  # Theme variables + static rules
//! ├── favicon.png                # If configured
//! ├── images/
//! │   ├── 17.jpg                 # Photos copied from the library
//! │   └── 17.html                # Photo detail pages
//! ├── atom.xml                   # Home feeds, all sections combined
//! ├── rss.xml
//! ├── birds/                     # Auto-blog
//! │   ├── index.html
//! │   ├── atom.xml               # Per-section feeds
//! │   ├── rss.xml
//! │   └── 2024-01-01.html
//! └── trips/                     # Manual blog
//!     ├── index.html
//!     ├── atom.xml
//!     ├── rss.xml
//!     └── kyoto.html
//! ```
//!
//! Failure semantics: the first error aborts the whole build — there is no
//! partial-publish guarantee, and nothing is retried. A missing catalog or
//! a post photo that no longer resolves is fatal.
//!
//! Incremental by default: pages whose content hash matches the recorded
//! build state and whose file still exists are skipped, photos already
//! copied are not copied again. `fresh` deletes the build directory first
//! and forgets the page hashes (the date ledger survives — see `state`).

use crate::catalog::Catalog;
use crate::config::SiteConfig;
use crate::feed::{self, Enclosure, FeedChannel, FeedEntry};
use crate::planner::{self, PagePlan, PlanError, SectionPlan};
use crate::registry::{Registry, RegistryError};
use crate::render::{self, NavEntry, Site};
use crate::state::BuildState;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error("photo file missing from the library: {0}")]
    MissingPhotoFile(PathBuf),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Delete and recreate the build directory before writing.
    pub fresh: bool,
}

/// What a build did, for CLI reporting.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Build-relative paths written this run.
    pub written: Vec<String>,
    /// Pages skipped because content and file were already current.
    pub skipped: usize,
    /// Photos newly copied into `images/`.
    pub photos_copied: usize,
    /// Page count per section slug.
    pub sections: Vec<(String, usize)>,
}

/// Build the whole site for one domain.
pub fn build(
    domain_dir: &Path,
    config: &SiteConfig,
    catalog: &dyn Catalog,
    options: BuildOptions,
) -> Result<BuildReport, BuildError> {
    let registry = Registry::new(domain_dir);
    let sections = registry.list()?;
    let mut state = BuildState::load(domain_dir);

    let build_dir = &config.build;
    if options.fresh && build_dir.exists() {
        fs::remove_dir_all(build_dir)?;
        state.clear_pages();
    }
    fs::create_dir_all(build_dir.join("images"))?;

    let mut plans = Vec::with_capacity(sections.len());
    for section in &sections {
        let plan = planner::plan_section(section, catalog, &mut state)?;
        plans.push(plan);
    }

    let nav: Vec<NavEntry> = plans
        .iter()
        .map(|plan| NavEntry::from_display(&plan.section.slug, &plan.section.display))
        .collect();
    let site = Site {
        name: &config.name,
        favicon: config.favicon.as_deref(),
        nav: &nav,
    };

    let mut report = BuildReport::default();

    // The stylesheet goes through the same change tracking as pages
    let css = render::site_css(&config.colours);
    write_tracked(build_dir, "style.css", &css, &mut state, &mut report)?;

    if let Some(favicon) = &config.favicon {
        let destination = build_dir.join(favicon);
        if !destination.exists() {
            fs::copy(domain_dir.join(favicon), destination)?;
        }
    }

    let home = render::render_home(&site, &plans).into_string();
    write_tracked(build_dir, "index.html", &home, &mut state, &mut report)?;

    for plan in &plans {
        build_section(build_dir, plan, &site, &mut state, &mut report)?;
        write_section_feeds(build_dir, plan, config, &mut state, &mut report)?;
    }
    write_home_feeds(build_dir, &plans, config, &mut state, &mut report)?;

    copy_and_render_photos(build_dir, &plans, &site, &mut state, &mut report)?;

    state.save(domain_dir)?;
    Ok(report)
}

/// Write a section's index and entry pages.
fn build_section(
    build_dir: &Path,
    plan: &SectionPlan,
    site: &Site,
    state: &mut BuildState,
    report: &mut BuildReport,
) -> Result<(), BuildError> {
    let slug = &plan.section.slug;

    let index = render::render_section_index(plan, site).into_string();
    write_tracked(build_dir, &format!("{slug}/index.html"), &index, state, report)?;

    for (position, page) in plan.pages.iter().enumerate() {
        let previous = position.checked_sub(1).and_then(|p| plan.pages.get(p));
        let next = plan.pages.get(position + 1);
        let html = render::render_entry(page, previous, next, site).into_string();
        let relative = format!("{slug}/{}", page.identity.file_name());
        write_tracked(build_dir, &relative, &html, state, report)?;
    }

    report
        .sections
        .push((slug.clone(), plan.pages.len()));
    Ok(())
}

/// Write a section's `atom.xml` and `rss.xml` next to its index page.
fn write_section_feeds(
    build_dir: &Path,
    plan: &SectionPlan,
    config: &SiteConfig,
    state: &mut BuildState,
    report: &mut BuildReport,
) -> Result<(), BuildError> {
    let base = config.base_url();
    let slug = &plan.section.slug;
    let channel = FeedChannel {
        title: &plan.section.display.title,
        description: plan.section.display.description.as_deref(),
        author: &config.name,
        base_url: base,
        link: format!("{base}/{slug}/"),
        self_url: format!("{base}/{slug}/atom.xml"),
    };
    let entries: Vec<FeedEntry> = plan
        .pages
        .iter()
        .map(|page| feed_entry(slug, page, base))
        .collect();
    // An empty section still gets a valid feed, pinned to its creation date
    let fallback = plan.section.created.date();

    let atom = feed::atom(&channel, entries.clone(), fallback);
    write_tracked(build_dir, &format!("{slug}/atom.xml"), &atom, state, report)?;
    let rss = feed::rss(&channel, entries, fallback);
    write_tracked(build_dir, &format!("{slug}/rss.xml"), &rss, state, report)?;
    Ok(())
}

/// Write root-level feeds covering every section's pages.
fn write_home_feeds(
    build_dir: &Path,
    plans: &[SectionPlan],
    config: &SiteConfig,
    state: &mut BuildState,
    report: &mut BuildReport,
) -> Result<(), BuildError> {
    let base = config.base_url();
    let channel = FeedChannel {
        title: &config.name,
        description: None,
        author: &config.name,
        base_url: base,
        link: format!("{base}/"),
        self_url: format!("{base}/atom.xml"),
    };
    let entries: Vec<FeedEntry> = plans
        .iter()
        .flat_map(|plan| {
            plan.pages
                .iter()
                .map(move |page| feed_entry(&plan.section.slug, page, base))
        })
        .collect();
    let fallback = plans
        .iter()
        .map(|plan| plan.section.created.date())
        .max()
        .unwrap_or_default();

    let atom = feed::atom(&channel, entries.clone(), fallback);
    write_tracked(build_dir, "atom.xml", &atom, state, report)?;
    let rss = feed::rss(&channel, entries, fallback);
    write_tracked(build_dir, "rss.xml", &rss, state, report)?;
    Ok(())
}

fn feed_entry<'a>(slug: &str, page: &'a PagePlan, base: &str) -> FeedEntry<'a> {
    let enclosure = page.photos.first().and_then(|photo| {
        // A missing source file aborts the build at the copy step anyway
        let length = fs::metadata(&photo.path).ok()?.len();
        Some(Enclosure {
            url: format!("{base}/images/{}", render::photo_file_name(photo)),
            length,
            mime: feed::mime_for(&photo.path),
        })
    });
    FeedEntry {
        url: format!("{base}/{slug}/{}", page.identity.file_name()),
        title: &page.title,
        description: page.description.as_deref(),
        date: page.date,
        photos: &page.photos,
        enclosure,
    }
}

/// Copy every referenced photo into `images/` and give it a detail page.
///
/// Photos are deduplicated by id across sections; BTreeMap keeps the
/// emission order deterministic.
fn copy_and_render_photos(
    build_dir: &Path,
    plans: &[SectionPlan],
    site: &Site,
    state: &mut BuildState,
    report: &mut BuildReport,
) -> Result<(), BuildError> {
    let mut photos = BTreeMap::new();
    for plan in plans {
        for page in &plan.pages {
            for photo in &page.photos {
                photos.entry(photo.id).or_insert_with(|| photo.clone());
            }
        }
    }

    for photo in photos.values() {
        let destination = build_dir.join("images").join(render::photo_file_name(photo));
        if !destination.exists() {
            if !photo.path.is_file() {
                return Err(BuildError::MissingPhotoFile(photo.path.clone()));
            }
            fs::copy(&photo.path, &destination)?;
            report.photos_copied += 1;
        }

        let html = render::render_photo_page(photo, site).into_string();
        let relative = format!("images/{}.html", photo.id);
        write_tracked(build_dir, &relative, &html, state, report)?;
    }
    Ok(())
}

/// Write `content` at `relative` unless the recorded hash says the file is
/// already current.
fn write_tracked(
    build_dir: &Path,
    relative: &str,
    content: &str,
    state: &mut BuildState,
    report: &mut BuildReport,
) -> Result<(), BuildError> {
    let path = build_dir.join(relative);
    if state.page_unchanged(relative, content) && path.exists() {
        report.skipped += 1;
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, content)?;
    state.record_page(relative, content);
    report.written.push(relative.to_string());
    Ok(())
}
