//! HTML rendering with maud.
//!
//! Every page shares one skeleton: a header with the site name and a navbar
//! of sections, then the page body. Four page shapes:
//!
//! - **Home** (`/index.html`): the site's sections with descriptions
//! - **Section index** (`/{slug}/index.html`): entries newest-first
//! - **Entry page** (`/{slug}/{page}.html`): a day's photos or a post,
//!   with previous/next links
//! - **Photo page** (`/images/{id}.html`): one photo with its metadata
//!
//! Rendering is pure and deterministic — no timestamps, no randomness — so
//! the builder can compare output byte-for-byte across runs. Post and
//! section descriptions are markdown, converted with pulldown-cmark. All
//! interpolation is escaped by maud; the only [`PreEscaped`] content is the
//! markdown converter's output.
//!
//! The stylesheet is the theme's CSS custom properties followed by the
//! static rules embedded at compile time from `static/style.css`.

use crate::catalog::PhotoRecord;
use crate::config::{self, ColourConfig};
use crate::planner::{PagePlan, SectionPlan};
use crate::registry::Display;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};

const CSS_STATIC: &str = include_str!("../static/style.css");

/// Site-wide context shared by every rendered page.
#[derive(Debug, Clone)]
pub struct Site<'a> {
    pub name: &'a str,
    /// Favicon filename at the build root, when one was configured.
    pub favicon: Option<&'a str>,
    pub nav: &'a [NavEntry],
}

/// One navbar entry: a section's link and its decorated label.
#[derive(Debug, Clone, PartialEq)]
pub struct NavEntry {
    pub slug: String,
    pub label: String,
}

impl NavEntry {
    /// Label is `icon title` when the section has an icon, else the title.
    pub fn from_display(slug: &str, display: &Display) -> Self {
        let label = match &display.icon {
            Some(icon) => format!("{icon} {}", display.title),
            None => display.title.clone(),
        };
        Self {
            slug: slug.to_string(),
            label,
        }
    }
}

/// The complete stylesheet: theme variables plus the static rules.
pub fn site_css(colours: &ColourConfig) -> String {
    format!("{}\n\n{}", config::generate_colour_css(colours), CSS_STATIC)
}

/// Filename a photo gets under `/images/` in the build: `<id>.<ext>`.
///
/// An `html`/`htm` extension is dropped: `images/<id>.html` is the photo's
/// detail page, and a copied file there would clobber it.
pub fn photo_file_name(photo: &PhotoRecord) -> String {
    match photo.path.extension() {
        Some(ext) => {
            let ext = ext.to_string_lossy().to_lowercase();
            if ext == "html" || ext == "htm" {
                photo.id.to_string()
            } else {
                format!("{}.{ext}", photo.id)
            }
        }
        None => photo.id.to_string(),
    }
}

fn markdown(source: &str) -> Markup {
    let mut rendered = String::new();
    md_html::push_html(&mut rendered, Parser::new(source));
    PreEscaped(rendered)
}

// ============================================================================
// Shared components
// ============================================================================

/// The base HTML document: head, site header with navbar, page content.
fn base_document(page_title: &str, site: &Site, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (page_title) }
                link rel="stylesheet" href="/style.css";
                @if let Some(favicon) = site.favicon {
                    link rel="icon" href={ "/" (favicon) };
                }
            }
            body {
                header.site-header {
                    a.site-name href="/" { (site.name) }
                    (render_nav(site.nav))
                }
                main {
                    (content)
                }
            }
        }
    }
}

fn render_nav(entries: &[NavEntry]) -> Markup {
    html! {
        nav.site-nav {
            ul {
                @for entry in entries {
                    li {
                        a href={ "/" (entry.slug) "/" } { (entry.label) }
                    }
                }
            }
        }
    }
}

/// One photo figure: image, alt text, caption.
fn render_photo(photo: &PhotoRecord) -> Markup {
    let src = format!("/images/{}", photo_file_name(photo));
    let alt = photo
        .alt
        .as_deref()
        .or(photo.title.as_deref())
        .unwrap_or("photo");
    html! {
        figure.photo {
            a href={ "/images/" (photo.id) ".html" } {
                img src=(src) alt=(alt) loading="lazy";
            }
            @if let Some(caption) = &photo.caption {
                figcaption { (caption) }
            }
        }
    }
}

/// A page's lead block: title, date, optional markdown description.
fn entry_header(page: &PagePlan) -> Markup {
    html! {
        header.entry-header {
            h1 { (page.title) }
            time datetime=(page.date.format("%Y-%m-%d")) {
                (page.date.format("%Y-%m-%d"))
            }
            @if let Some(description) = &page.description {
                div.entry-description { (markdown(description)) }
            }
        }
    }
}

// ============================================================================
// Page renderers
// ============================================================================

/// The home page: every section with its description.
pub fn render_home(site: &Site, plans: &[SectionPlan]) -> Markup {
    let content = html! {
        div.section-list {
            @for plan in plans {
                article.section-card {
                    h2 {
                        a href={ "/" (plan.section.slug) "/" } {
                            @if let Some(icon) = &plan.section.display.icon {
                                (icon) " "
                            }
                            (plan.section.display.title)
                        }
                    }
                    @if let Some(description) = &plan.section.display.description {
                        div.section-description { (markdown(description)) }
                    }
                    p.section-count {
                        (plan.pages.len())
                        @if plan.pages.len() == 1 { " entry" } @else { " entries" }
                    }
                }
            }
        }
    };
    base_document(site.name, site, content)
}

/// A section's index: entries newest-first.
pub fn render_section_index(plan: &SectionPlan, site: &Site) -> Markup {
    let display = &plan.section.display;
    let content = html! {
        header.entry-header {
            h1 { (display.title) }
            @if let Some(description) = &display.description {
                div.section-description { (markdown(description)) }
            }
        }
        ul.entry-list {
            @for page in plan.index_entries() {
                li {
                    a href=(page.identity.file_name()) { (page.title) }
                    " "
                    time datetime=(page.date.format("%Y-%m-%d")) {
                        (page.date.format("%Y-%m-%d"))
                    }
                }
            }
        }
    };
    base_document(&display.title, site, content)
}

/// A single entry page (a dated auto-blog page or a manual post), with
/// previous/next links following the section's page order.
pub fn render_entry(
    page: &PagePlan,
    previous: Option<&PagePlan>,
    next: Option<&PagePlan>,
    site: &Site,
) -> Markup {
    let content = html! {
        article.entry {
            (entry_header(page))
            @for photo in &page.photos {
                (render_photo(photo))
            }
            nav.entry-nav {
                @if let Some(previous) = previous {
                    a.previous href=(previous.identity.file_name()) { "← " (previous.title) }
                }
                a.up href="index.html" { "index" }
                @if let Some(next) = next {
                    a.next href=(next.identity.file_name()) { (next.title) " →" }
                }
            }
        }
    };
    base_document(&page.title, site, content)
}

/// A photo's own page: the image at full size with all its metadata.
pub fn render_photo_page(photo: &PhotoRecord, site: &Site) -> Markup {
    let title = photo.title.as_deref().unwrap_or("Untitled");
    let src = format!("/images/{}", photo_file_name(photo));
    let alt = photo
        .alt
        .as_deref()
        .or(photo.title.as_deref())
        .unwrap_or("photo");
    let content = html! {
        article.entry {
            header.entry-header {
                h1 { (title) }
                time datetime=(photo.taken.format("%Y-%m-%d")) {
                    (photo.taken.format("%Y-%m-%d"))
                }
            }
            figure.photo {
                img src=(src) alt=(alt);
                @if let Some(caption) = &photo.caption {
                    figcaption { (caption) }
                }
            }
            @if let Some(creator) = &photo.creator {
                p.photo-creator { "by " (creator) }
            }
            @if !photo.tags.is_empty() {
                ul.photo-tags {
                    @for tag in &photo.tags {
                        li { "#" (tag) }
                    }
                }
            }
        }
    };
    base_document(title, site, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SearchFilter;
    use crate::planner::{PageIdentity, PagePlan};
    use crate::registry::{SectionDefinition, SectionKind};
    use crate::test_helpers::{noon, photo};
    use chrono::NaiveDate;

    fn nav() -> Vec<NavEntry> {
        vec![
            NavEntry {
                slug: "birds".to_string(),
                label: "🐦 Birds".to_string(),
            },
            NavEntry {
                slug: "trips".to_string(),
                label: "Trips".to_string(),
            },
        ]
    }

    fn page(day: u32) -> PagePlan {
        let date = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        PagePlan {
            identity: PageIdentity::Dated(date),
            title: format!("Day {day}"),
            description: None,
            date,
            photos: vec![photo(day as i64, 2024, 1, day)],
        }
    }

    fn plan() -> SectionPlan {
        SectionPlan {
            section: SectionDefinition {
                slug: "birds".to_string(),
                display: Display {
                    title: "Birds".to_string(),
                    description: Some("Photos of **birds**".to_string()),
                    icon: Some("🐦".to_string()),
                },
                created: noon(),
                kind: SectionKind::Auto {
                    filter: SearchFilter::default(),
                },
            },
            pages: vec![page(1), page(2)],
        }
    }

    fn site<'a>(nav: &'a [NavEntry]) -> Site<'a> {
        Site {
            name: "My Photos",
            favicon: Some("favicon.png"),
            nav,
        }
    }

    #[test]
    fn nav_entry_label_includes_icon() {
        let display = Display {
            title: "Birds".to_string(),
            description: None,
            icon: Some("🐦".to_string()),
        };
        assert_eq!(NavEntry::from_display("birds", &display).label, "🐦 Birds");
    }

    #[test]
    fn nav_entry_label_without_icon() {
        let display = Display {
            title: "Trips".to_string(),
            description: None,
            icon: None,
        };
        assert_eq!(NavEntry::from_display("trips", &display).label, "Trips");
    }

    #[test]
    fn photo_file_name_uses_id_and_lowercased_extension() {
        let mut p = photo(7, 2024, 1, 1);
        p.path = "/photos/IMG_0007.JPG".into();
        assert_eq!(photo_file_name(&p), "7.jpg");
    }

    #[test]
    fn photo_file_name_never_collides_with_detail_page() {
        // images/7.html is the detail page, so an html "photo" loses its
        // extension instead of landing on top of it
        let mut p = photo(7, 2024, 1, 1);
        p.path = "/photos/weird.html".into();
        assert_eq!(photo_file_name(&p), "7");
        p.path = "/photos/weird.HTM".into();
        assert_eq!(photo_file_name(&p), "7");
    }

    #[test]
    fn home_lists_sections_with_counts() {
        let nav = nav();
        let html = render_home(&site(&nav), &[plan()]).into_string();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("🐦"));
        assert!(html.contains(r#"href="/birds/""#));
        assert!(html.contains("2 entries"));
        // Markdown description converted
        assert!(html.contains("<strong>birds</strong>"));
    }

    #[test]
    fn favicon_link_only_when_configured() {
        let nav = nav();
        let with = render_home(&site(&nav), &[]).into_string();
        assert!(with.contains(r#"href="/favicon.png""#));

        let bare = Site {
            name: "My Photos",
            favicon: None,
            nav: &nav,
        };
        let without = render_home(&bare, &[]).into_string();
        assert!(!without.contains("rel=\"icon\""));
    }

    #[test]
    fn section_index_lists_entries_newest_first() {
        let nav = nav();
        let html = render_section_index(&plan(), &site(&nav)).into_string();
        let newer = html.find("2024-01-02.html").unwrap();
        let older = html.find("2024-01-01.html").unwrap();
        assert!(newer < older);
    }

    #[test]
    fn entry_page_has_prev_next_links() {
        let nav = nav();
        let pages = plan().pages;
        let html = render_entry(&pages[1], Some(&pages[0]), None, &site(&nav)).into_string();
        assert!(html.contains(r#"href="2024-01-01.html""#));
        assert!(html.contains(r#"href="index.html""#));
        assert!(!html.contains(r#"class="next""#));
    }

    #[test]
    fn entry_page_renders_photos() {
        let nav = nav();
        let pages = plan().pages;
        let html = render_entry(&pages[0], None, None, &site(&nav)).into_string();
        assert!(html.contains(r#"src="/images/1.jpg""#));
        assert!(html.contains(r#"href="/images/1.html""#));
    }

    #[test]
    fn entry_date_is_machine_readable() {
        let nav = nav();
        let pages = plan().pages;
        let html = render_entry(&pages[0], None, None, &site(&nav)).into_string();
        assert!(html.contains(r#"datetime="2024-01-01""#));
    }

    #[test]
    fn photo_page_shows_metadata() {
        let nav = nav();
        let mut p = photo(7, 2024, 1, 1);
        p.title = Some("Heron".to_string());
        p.caption = Some("A heron at dawn".to_string());
        p.creator = Some("ana".to_string());
        p.tags = vec!["birds".to_string()];
        let html = render_photo_page(&p, &site(&nav)).into_string();
        assert!(html.contains("<title>Heron</title>"));
        assert!(html.contains("A heron at dawn"));
        assert!(html.contains("by ana"));
        assert!(html.contains("#birds"));
    }

    #[test]
    fn interpolation_is_escaped() {
        let nav = nav();
        let mut p = page(1);
        p.title = "<script>alert('xss')</script>".to_string();
        let html = render_entry(&p, None, None, &site(&nav)).into_string();
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn css_includes_theme_and_static_rules() {
        let css = site_css(&ColourConfig::default());
        assert!(css.contains("--bg-page: #397367"));
        assert!(css.contains("body"));
    }
}
