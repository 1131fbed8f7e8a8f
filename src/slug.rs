//! Slug derivation and validation.
//!
//! Sections and posts are addressed by a URL-safe slug. When the user doesn't
//! supply one, it is derived from the title: ASCII letters are lowercased,
//! everything else collapses to a single `-`. Both derived and user-supplied
//! slugs go through the same validation so a bad `--slug` fails up front
//! rather than producing a broken URL at build time.
//!
//! A few slugs are reserved because the builder claims those names at the
//! build root: `images/` for copied photos and photo pages, `index.html`
//! and `style.css` as files. A section with one of those slugs would
//! collide with them.

use thiserror::Error;

/// Names the site builder owns at the build root.
pub const RESERVED_SLUGS: &[&str] = &["images", "index.html", "style.css"];

#[derive(Error, Debug, PartialEq)]
pub enum SlugError {
    #[error("slug is empty (title '{0}' has no ASCII letters)")]
    Empty(String),
    #[error("slug '{0}' is reserved")]
    Reserved(String),
    #[error("slug '{0}' contains characters outside [a-z0-9.-]")]
    InvalidCharacters(String),
}

/// Derive a slug from a title.
///
/// - `"Bird Photos"` → `"bird-photos"`
/// - `"Bird  &  Bug Photos!"` → `"bird-bug-photos"`
/// - `"2024 favourites"` → `"favourites"` (digits count as separators)
///
/// Leading and trailing separators are trimmed. The result still needs
/// [`validate`] — a title with no ASCII letters derives to an empty slug.
pub fn derive(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for symbol in title.chars() {
        if symbol.is_ascii_alphabetic() {
            slug.push(symbol.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

/// Check that a slug is non-empty, not reserved, and URL-safe.
pub fn validate(slug: &str) -> Result<(), SlugError> {
    if slug.is_empty() {
        return Err(SlugError::Empty(slug.to_string()));
    }
    if RESERVED_SLUGS.contains(&slug) {
        return Err(SlugError::Reserved(slug.to_string()));
    }
    let ok = slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.');
    if !ok {
        return Err(SlugError::InvalidCharacters(slug.to_string()));
    }
    Ok(())
}

/// Resolve the slug for a new section or post: use the explicit one if given,
/// otherwise derive from the title. Either way, validate.
pub fn resolve(explicit: Option<&str>, title: &str) -> Result<String, SlugError> {
    let slug = match explicit {
        Some(s) => s.to_string(),
        None => derive(title),
    };
    validate(&slug)?;
    Ok(slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_title() {
        assert_eq!(derive("Bird Photos"), "bird-photos");
    }

    #[test]
    fn punctuation_collapses() {
        assert_eq!(derive("Bird  &  Bug Photos!"), "bird-bug-photos");
    }

    #[test]
    fn single_word_lowercased() {
        assert_eq!(derive("Landscapes"), "landscapes");
    }

    #[test]
    fn digits_are_separators() {
        assert_eq!(derive("2024 favourites"), "favourites");
    }

    #[test]
    fn trailing_separator_trimmed() {
        assert_eq!(derive("hello!"), "hello");
    }

    #[test]
    fn no_ascii_letters_derives_empty() {
        assert_eq!(derive("日々の写真"), "");
    }

    #[test]
    fn validate_accepts_derived() {
        assert!(validate(&derive("Bird Photos")).is_ok());
    }

    #[test]
    fn validate_rejects_empty() {
        assert_eq!(validate(""), Err(SlugError::Empty(String::new())));
    }

    #[test]
    fn validate_rejects_reserved() {
        assert_eq!(
            validate("images"),
            Err(SlugError::Reserved("images".to_string()))
        );
        assert_eq!(
            validate("style.css"),
            Err(SlugError::Reserved("style.css".to_string()))
        );
    }

    #[test]
    fn validate_rejects_uppercase() {
        assert!(matches!(
            validate("Birds"),
            Err(SlugError::InvalidCharacters(_))
        ));
    }

    #[test]
    fn validate_rejects_spaces() {
        assert!(matches!(
            validate("bird photos"),
            Err(SlugError::InvalidCharacters(_))
        ));
    }

    #[test]
    fn validate_accepts_digits_dots_dashes() {
        assert!(validate("best-of-2024.1").is_ok());
    }

    #[test]
    fn resolve_prefers_explicit() {
        assert_eq!(
            resolve(Some("my-slug"), "Some Title").unwrap(),
            "my-slug".to_string()
        );
    }

    #[test]
    fn resolve_derives_when_absent() {
        assert_eq!(resolve(None, "Some Title").unwrap(), "some-title");
    }

    #[test]
    fn resolve_validates_explicit() {
        assert!(resolve(Some("Bad Slug"), "whatever").is_err());
    }
}
