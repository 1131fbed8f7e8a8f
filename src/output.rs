//! CLI output formatting.
//!
//! Output is information-centric: each entity leads with its semantic
//! identity (slug, title, date) and filesystem paths appear as indented
//! context lines. Every command has a `format_*` function returning
//! `Vec<String>` for testability and a `print_*` wrapper that writes to
//! stdout. Format functions are pure — no I/O, no side effects.
//!
//! ```text
//! birds (auto-blog)
//!     Title: Birds
//!     Source: section-birds.toml
//!
//! kyoto in trips
//!     Title: Kyoto
//!     Date: 2024-06-01 12:00
//!     Source: blog-trips/post-kyoto.toml
//!
//! birds: 12 pages
//! trips: 3 pages
//! Wrote 17 files, skipped 2, copied 14 photos
//! ```

use crate::build::BuildReport;
use crate::registry::{Post, SectionDefinition, SectionKind};
use std::path::Path;

/// Format the result of `initialize`.
pub fn format_initialized(domain: &str, domain_dir: &Path) -> Vec<String> {
    vec![
        format!("Initialized {}", domain),
        format!("    Config: {}", domain_dir.display()),
    ]
}

pub fn print_initialized(domain: &str, domain_dir: &Path) {
    for line in format_initialized(domain, domain_dir) {
        println!("{}", line);
    }
}

/// Format a newly created section: slug, kind, title, backing file.
pub fn format_section_created(section: &SectionDefinition) -> Vec<String> {
    let (kind, source) = match &section.kind {
        SectionKind::Auto { .. } => ("auto-blog", format!("section-{}.toml", section.slug)),
        SectionKind::Blog { .. } => ("blog", format!("blog-{}/section.toml", section.slug)),
    };
    let mut lines = vec![
        format!("{} ({})", section.slug, kind),
        format!("    Title: {}", section.display.title),
    ];
    if let Some(description) = &section.display.description {
        lines.push(format!("    Description: {}", description));
    }
    lines.push(format!("    Source: {}", source));
    lines
}

pub fn print_section_created(section: &SectionDefinition) {
    for line in format_section_created(section) {
        println!("{}", line);
    }
}

/// Format a newly created post: slug, date, backing file.
pub fn format_post_created(blog_slug: &str, post: &Post) -> Vec<String> {
    vec![
        format!("{} in {}", post.slug, blog_slug),
        format!("    Title: {}", post.title),
        format!("    Date: {}", post.date.format("%Y-%m-%d %H:%M")),
        format!("    Photos: {}", post.images.len()),
        format!("    Source: blog-{}/post-{}.toml", blog_slug, post.slug),
    ]
}

pub fn print_post_created(blog_slug: &str, post: &Post) {
    for line in format_post_created(blog_slug, post) {
        println!("{}", line);
    }
}

/// Format a build report: per-section page counts and the write summary.
pub fn format_build_report(report: &BuildReport) -> Vec<String> {
    let mut lines = Vec::new();
    for (slug, pages) in &report.sections {
        let noun = if *pages == 1 { "page" } else { "pages" };
        lines.push(format!("{}: {} {}", slug, pages, noun));
    }
    lines.push(format!(
        "Wrote {} files, skipped {}, copied {} photos",
        report.written.len(),
        report.skipped,
        report.photos_copied
    ));
    lines
}

pub fn print_build_report(report: &BuildReport) {
    for line in format_build_report(report) {
        println!("{}", line);
    }
}
