//! Atom and RSS feeds for sections and the home page.
//!
//! Every section index gets a sibling `atom.xml` and `rss.xml`, and the
//! build root gets the same pair covering all sections combined. Entries
//! are the section's pages, newest first; entry content is a minimal HTML
//! fragment of the page's photos with absolute URLs, since feed readers
//! resolve nothing against the site.
//!
//! Feeds are deterministic like everything else the builder writes: the
//! feed-level `updated` / `lastBuildDate` is the newest entry's date (the
//! channel fallback when there are no entries), never the build time, so
//! rebuilding unchanged inputs yields byte-identical XML and the page-hash
//! skip logic applies to feeds too.
//!
//! The XML is assembled by hand with a local escape helper — the element
//! set is small and fixed, and maud only speaks HTML.

use crate::catalog::PhotoRecord;
use crate::render;
use chrono::NaiveDate;
use std::path::Path;

/// Channel-level metadata shared by both feed formats.
#[derive(Debug, Clone)]
pub struct FeedChannel<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    /// Author name (Atom requires one; the site name serves).
    pub author: &'a str,
    /// Site base URL, no trailing slash.
    pub base_url: &'a str,
    /// Absolute URL of the page this feed mirrors.
    pub link: String,
    /// Absolute URL of the Atom feed itself (`rel="self"`; RSS has no
    /// equivalent element).
    pub self_url: String,
}

/// One feed entry, borrowed from a planned page.
#[derive(Debug, Clone)]
pub struct FeedEntry<'a> {
    /// Absolute URL of the page.
    pub url: String,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub date: NaiveDate,
    pub photos: &'a [PhotoRecord],
    /// RSS enclosure for the entry's first photo, when its size is known.
    pub enclosure: Option<Enclosure>,
}

/// An RSS `<enclosure>`: the entry's lead photo as a media attachment.
#[derive(Debug, Clone)]
pub struct Enclosure {
    pub url: String,
    pub length: u64,
    pub mime: &'static str,
}

/// MIME type for a photo file, by extension.
pub fn mime_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase());
    match extension.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        _ => "application/octet-stream",
    }
}

/// Render the Atom feed. Entries are sorted here, so caller order never
/// leaks into the output.
pub fn atom(channel: &FeedChannel, mut entries: Vec<FeedEntry>, fallback: NaiveDate) -> String {
    sort_newest_first(&mut entries);
    let updated = entries.first().map(|entry| entry.date).unwrap_or(fallback);

    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<feed xmlns=\"http://www.w3.org/2005/Atom\">\n");
    push_tag(&mut xml, 1, "id", &channel.link);
    push_tag(&mut xml, 1, "title", channel.title);
    push_tag(&mut xml, 1, "updated", &atom_date(updated));
    xml.push_str(&format!(
        "  <author><name>{}</name></author>\n",
        escape(channel.author)
    ));
    xml.push_str(&format!(
        "  <link rel=\"self\" href=\"{}\"/>\n",
        escape(&channel.self_url)
    ));
    xml.push_str(&format!(
        "  <link rel=\"alternate\" href=\"{}\"/>\n",
        escape(&channel.link)
    ));
    if let Some(description) = channel.description {
        push_tag(&mut xml, 1, "subtitle", description);
    }
    for entry in &entries {
        xml.push_str("  <entry>\n");
        push_tag(&mut xml, 2, "id", &entry.url);
        push_tag(&mut xml, 2, "title", entry.title);
        push_tag(&mut xml, 2, "published", &atom_date(entry.date));
        push_tag(&mut xml, 2, "updated", &atom_date(entry.date));
        xml.push_str(&format!(
            "    <link rel=\"alternate\" href=\"{}\"/>\n",
            escape(&entry.url)
        ));
        if let Some(description) = entry.description {
            push_tag(&mut xml, 2, "summary", description);
        }
        xml.push_str(&format!(
            "    <content type=\"html\">{}</content>\n",
            escape(&entry_html(entry, channel.base_url))
        ));
        xml.push_str("  </entry>\n");
    }
    xml.push_str("</feed>\n");
    xml
}

/// Render the RSS 2.0 feed.
pub fn rss(channel: &FeedChannel, mut entries: Vec<FeedEntry>, fallback: NaiveDate) -> String {
    sort_newest_first(&mut entries);
    let updated = entries.first().map(|entry| entry.date).unwrap_or(fallback);

    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<rss version=\"2.0\">\n");
    xml.push_str("  <channel>\n");
    push_tag(&mut xml, 2, "title", channel.title);
    push_tag(&mut xml, 2, "link", &channel.link);
    push_tag(&mut xml, 2, "description", channel.description.unwrap_or("..."));
    push_tag(&mut xml, 2, "lastBuildDate", &rss_date(updated));
    for entry in &entries {
        xml.push_str("    <item>\n");
        push_tag(&mut xml, 3, "guid", &entry.url);
        let title = if entry.photos.len() > 1 {
            format!("{} ({} images)", entry.title, entry.photos.len())
        } else {
            entry.title.to_string()
        };
        push_tag(&mut xml, 3, "title", &title);
        push_tag(&mut xml, 3, "pubDate", &rss_date(entry.date));
        push_tag(&mut xml, 3, "link", &entry.url);
        push_tag(&mut xml, 3, "description", entry.description.unwrap_or(""));
        if let Some(enclosure) = &entry.enclosure {
            xml.push_str(&format!(
                "      <enclosure url=\"{}\" length=\"{}\" type=\"{}\"/>\n",
                escape(&enclosure.url),
                enclosure.length,
                enclosure.mime
            ));
        }
        xml.push_str("    </item>\n");
    }
    xml.push_str("  </channel>\n");
    xml.push_str("</rss>\n");
    xml
}

fn sort_newest_first(entries: &mut [FeedEntry]) {
    entries.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.url.cmp(&b.url)));
}

/// The entry's photos as a self-contained HTML fragment.
fn entry_html(entry: &FeedEntry, base_url: &str) -> String {
    let mut html = String::new();
    for photo in entry.photos {
        let alt = photo
            .alt
            .as_deref()
            .or(photo.title.as_deref())
            .unwrap_or("photo");
        html.push_str(&format!(
            "<p><img src=\"{}/images/{}\" alt=\"{}\"/></p>",
            base_url,
            render::photo_file_name(photo),
            escape(alt)
        ));
        if let Some(caption) = &photo.caption {
            html.push_str(&format!("<p>{}</p>", escape(caption)));
        }
    }
    html
}

fn push_tag(xml: &mut String, depth: usize, tag: &str, value: &str) {
    for _ in 0..depth {
        xml.push_str("  ");
    }
    xml.push_str(&format!("<{tag}>{}</{tag}>\n", escape(value)));
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for symbol in value.chars() {
        match symbol {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(symbol),
        }
    }
    out
}

fn atom_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%dT00:00:00Z").to_string()
}

fn rss_date(date: NaiveDate) -> String {
    date.format("%a, %d %b %Y 00:00:00 +0000").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::photo;

    fn channel() -> FeedChannel<'static> {
        FeedChannel {
            title: "Birds",
            description: Some("Local sightings"),
            author: "Example",
            base_url: "https://example.com",
            link: "https://example.com/birds/".to_string(),
            self_url: "https://example.com/birds/atom.xml".to_string(),
        }
    }

    fn entry(day: u32, title: &'static str, photos: &'static [PhotoRecord]) -> FeedEntry<'static> {
        FeedEntry {
            url: format!("https://example.com/birds/2024-01-{day:02}.html"),
            title,
            description: None,
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            photos,
            enclosure: None,
        }
    }

    fn fallback() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
    }

    #[test]
    fn updated_is_newest_entry_date_not_build_time() {
        let xml = atom(
            &channel(),
            vec![entry(1, "Older", &[]), entry(9, "Newer", &[])],
            fallback(),
        );
        assert!(xml.contains("<updated>2024-01-09T00:00:00Z</updated>"));
        assert!(!xml.contains("2020-01-01"));
    }

    #[test]
    fn output_is_independent_of_entry_order() {
        let forward = atom(
            &channel(),
            vec![entry(1, "Older", &[]), entry(9, "Newer", &[])],
            fallback(),
        );
        let reversed = atom(
            &channel(),
            vec![entry(9, "Newer", &[]), entry(1, "Older", &[])],
            fallback(),
        );
        assert_eq!(forward, reversed);

        let newer = forward.find("Newer").unwrap();
        let older = forward.find("Older").unwrap();
        assert!(newer < older);
    }

    #[test]
    fn empty_feed_falls_back_to_channel_date() {
        let xml = atom(&channel(), Vec::new(), fallback());
        assert!(xml.contains("<updated>2020-01-01T00:00:00Z</updated>"));

        let xml = rss(&channel(), Vec::new(), fallback());
        assert!(xml.contains("<lastBuildDate>Wed, 01 Jan 2020 00:00:00 +0000</lastBuildDate>"));
    }

    #[test]
    fn titles_are_escaped() {
        let xml = atom(&channel(), vec![entry(1, "Bees & Birds", &[])], fallback());
        assert!(xml.contains("<title>Bees &amp; Birds</title>"));
        assert!(!xml.contains("Bees & Birds"));
    }

    #[test]
    fn atom_content_embeds_absolute_image_urls() {
        let photos = vec![photo(7, 2024, 1, 1)];
        let photos: &'static [PhotoRecord] = Box::leak(photos.into_boxed_slice());
        let xml = atom(&channel(), vec![entry(1, "Day", photos)], fallback());
        assert!(xml.contains("https://example.com/images/7.jpg"));
        // The HTML fragment itself is escaped inside <content>
        assert!(xml.contains("&lt;p&gt;&lt;img"));
    }

    #[test]
    fn rss_item_title_counts_multiple_images() {
        let photos = vec![photo(1, 2024, 1, 1), photo(2, 2024, 1, 1)];
        let photos: &'static [PhotoRecord] = Box::leak(photos.into_boxed_slice());
        let xml = rss(&channel(), vec![entry(1, "Day", photos)], fallback());
        assert!(xml.contains("<title>Day (2 images)</title>"));
    }

    #[test]
    fn rss_enclosure_describes_lead_photo() {
        let mut item = entry(1, "Day", &[]);
        item.enclosure = Some(Enclosure {
            url: "https://example.com/images/7.jpg".to_string(),
            length: 1234,
            mime: "image/jpeg",
        });
        let xml = rss(&channel(), vec![item], fallback());
        assert!(xml.contains(
            r#"<enclosure url="https://example.com/images/7.jpg" length="1234" type="image/jpeg"/>"#
        ));
    }

    #[test]
    fn missing_description_has_rss_placeholder() {
        let mut bare = channel();
        bare.description = None;
        let xml = rss(&bare, Vec::new(), fallback());
        assert!(xml.contains("<description>...</description>"));
    }

    #[test]
    fn mime_types_by_extension() {
        assert_eq!(mime_for(Path::new("/p/1.JPG")), "image/jpeg");
        assert_eq!(mime_for(Path::new("/p/1.png")), "image/png");
        assert_eq!(mime_for(Path::new("/p/1.avif")), "image/avif");
        assert_eq!(mime_for(Path::new("/p/1")), "application/octet-stream");
    }
}
