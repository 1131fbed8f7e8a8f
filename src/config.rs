//! Per-domain site configuration.
//!
//! Each domain the tool manages gets its own directory under the external
//! photo library's config root:
//!
//! ```text
//! ~/.config/photo-catalog/
//! ├── catalog.db                   # The external library's photo catalog
//! └── site-example.com/            # One directory per domain
//!     ├── site.toml                # This module: build dir, name, theme
//!     ├── state.json               # Build state (see `state`)
//!     ├── favicon.png              # Copied in by `initialize`
//!     ├── section-birds.toml       # Auto-blog definitions (see `registry`)
//!     └── blog-trips/              # Manual blog directories
//!         ├── section.toml
//!         └── post-kyoto.toml
//! ```
//!
//! `site.toml` is written once by `initialize` and read on every build. It
//! carries the build directory, the site name, the public base URL (feeds
//! need absolute links), an optional favicon, and the
//! theme colors consumed by the stylesheet: a nested light/dark ×
//! background/text mapping.
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Filename of the site config within a domain directory.
pub const SITE_CONFIG_FILENAME: &str = "site.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("No site configured for this domain (missing {0})")]
    Missing(PathBuf),
}

/// The per-domain directory under the catalog config root.
pub fn domain_dir(config_root: &Path, domain: &str) -> PathBuf {
    config_root.join(format!("site-{domain}"))
}

/// Site configuration stored as `site.toml` in the domain directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Display name of the site (defaults to the domain at initialize time).
    pub name: String,
    /// Public base URL of the site, e.g. `https://example.com`. Feeds need
    /// absolute links, so this is required.
    pub url: String,
    /// Where `build` writes the generated site.
    pub build: PathBuf,
    /// Favicon filename within the domain directory, if one was supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    /// Theme colors for light and dark modes.
    #[serde(default)]
    pub colours: ColourConfig,
}

impl SiteConfig {
    pub fn new(name: String, url: String, build: PathBuf) -> Self {
        Self {
            name,
            url,
            build,
            favicon: None,
            colours: ColourConfig::default(),
        }
    }

    /// Validate config values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Validation("name must not be empty".into()));
        }
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "url: '{}' must start with http:// or https://",
                self.url
            )));
        }
        if self.build.as_os_str().is_empty() {
            return Err(ConfigError::Validation("build must not be empty".into()));
        }
        self.colours.validate()?;
        Ok(())
    }

    /// The public URL without a trailing slash, ready for path joining.
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColourConfig {
    pub light: ColourScheme,
    pub dark: ColourScheme,
}

impl Default for ColourConfig {
    fn default() -> Self {
        Self {
            light: ColourScheme::default_light(),
            dark: ColourScheme::default_dark(),
        }
    }
}

impl ColourConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.light.validate("colours.light")?;
        self.dark.validate("colours.dark")?;
        Ok(())
    }
}

/// One mode's colors, split by role.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColourScheme {
    pub background: BackgroundColours,
    pub text: TextColours,
}

/// Background colors: the page itself and article cards on top of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackgroundColours {
    pub page: String,
    pub article: String,
}

/// Text colors: body text, accents (titles, icons), and links.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TextColours {
    pub text: String,
    pub accent: String,
    pub link: String,
}

impl ColourScheme {
    pub fn default_light() -> Self {
        Self {
            background: BackgroundColours {
                page: "#397367".to_string(),
                article: "#C1DCEB".to_string(),
            },
            text: TextColours {
                text: "#0E1B18".to_string(),
                accent: "#613F75".to_string(),
                link: "#4D053D".to_string(),
            },
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: BackgroundColours {
                page: "#0E1B18".to_string(),
                article: "#142F3E".to_string(),
            },
            text: TextColours {
                text: "#FDD8F5".to_string(),
                accent: "#F7D3A1".to_string(),
                link: "#D7EADF".to_string(),
            },
        }
    }

    fn validate(&self, context: &str) -> Result<(), ConfigError> {
        for (role, value) in [
            ("background.page", &self.background.page),
            ("background.article", &self.background.article),
            ("text.text", &self.text.text),
            ("text.accent", &self.text.accent),
            ("text.link", &self.text.link),
        ] {
            if !is_css_colour(value) {
                return Err(ConfigError::Validation(format!(
                    "{context}.{role}: '{value}' is not a #rgb/#rrggbb colour"
                )));
            }
        }
        Ok(())
    }
}

/// Accepts `#rgb`, `#rrggbb`, and `#rrggbbaa` hex colors.
fn is_css_colour(value: &str) -> bool {
    let Some(hex) = value.strip_prefix('#') else {
        return false;
    };
    matches!(hex.len(), 3 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit())
}

/// Load `site.toml` from a domain directory.
///
/// A missing file is [`ConfigError::Missing`] — distinct from a parse error
/// so the CLI can tell the user to run `initialize` first.
pub fn load_config(domain_dir: &Path) -> Result<SiteConfig, ConfigError> {
    let path = domain_dir.join(SITE_CONFIG_FILENAME);
    if !path.exists() {
        return Err(ConfigError::Missing(path));
    }
    let content = fs::read_to_string(&path)?;
    let config: SiteConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Write `site.toml` into a domain directory.
pub fn store_config(domain_dir: &Path, config: &SiteConfig) -> Result<(), ConfigError> {
    config.validate()?;
    let content = toml::to_string_pretty(config)?;
    fs::write(domain_dir.join(SITE_CONFIG_FILENAME), content)?;
    Ok(())
}

/// Generate CSS custom properties from the theme colors.
///
/// Prepended to the static stylesheet at build time; dark mode follows the
/// visitor's `prefers-color-scheme`.
pub fn generate_colour_css(colours: &ColourConfig) -> String {
    format!(
        r#":root {{
    --bg-page: {light_page};
    --bg-article: {light_article};
    --text: {light_text};
    --accent: {light_accent};
    --link: {light_link};
}}

@media (prefers-color-scheme: dark) {{
    :root {{
        --bg-page: {dark_page};
        --bg-article: {dark_article};
        --text: {dark_text};
        --accent: {dark_accent};
        --link: {dark_link};
    }}
}}"#,
        light_page = colours.light.background.page,
        light_article = colours.light.background.article,
        light_text = colours.light.text.text,
        light_accent = colours.light.text.accent,
        light_link = colours.light.text.link,
        dark_page = colours.dark.background.page,
        dark_article = colours.dark.background.article,
        dark_text = colours.dark.text.text,
        dark_accent = colours.dark.text.accent,
        dark_link = colours.dark.text.link,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_colours() {
        let config = ColourConfig::default();
        assert_eq!(config.light.background.page, "#397367");
        assert_eq!(config.dark.background.page, "#0E1B18");
    }

    #[test]
    fn domain_dir_layout() {
        let dir = domain_dir(Path::new("/tmp/catalog"), "example.com");
        assert_eq!(dir, PathBuf::from("/tmp/catalog/site-example.com"));
    }

    #[test]
    fn store_then_load_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let config = SiteConfig::new(
            "My Photos".to_string(),
            "https://example.com".to_string(),
            PathBuf::from("/srv/www"),
        );
        store_config(tmp.path(), &config).unwrap();

        let loaded = load_config(tmp.path()).unwrap();
        assert_eq!(loaded.name, "My Photos");
        assert_eq!(loaded.url, "https://example.com");
        assert_eq!(loaded.build, PathBuf::from("/srv/www"));
        assert!(loaded.favicon.is_none());
        assert_eq!(loaded.colours.light.text.link, "#4D053D");
    }

    #[test]
    fn load_missing_is_distinct_error() {
        let tmp = TempDir::new().unwrap();
        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Missing(_))));
    }

    #[test]
    fn load_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(SITE_CONFIG_FILENAME), "not toml [[[").unwrap();
        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected() {
        let toml_str = r##"
name = "site"
url = "https://example.com"
build = "/srv/www"
favicn = "f.png"
"##;
        let result: Result<SiteConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());
    }

    #[test]
    fn partial_colours_use_defaults() {
        let toml_str = r##"
name = "site"
url = "https://example.com"
build = "/srv/www"
"##;
        let config: SiteConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.colours.light.background.article, "#C1DCEB");
    }

    #[test]
    fn validate_rejects_empty_name() {
        let config = SiteConfig::new(
            "  ".to_string(),
            "https://example.com".to_string(),
            PathBuf::from("/srv/www"),
        );
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_non_http_url() {
        let config = SiteConfig::new(
            "site".to_string(),
            "example.com".to_string(),
            PathBuf::from("/srv/www"),
        );
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("url"));
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let config = SiteConfig::new(
            "site".to_string(),
            "https://example.com/".to_string(),
            PathBuf::from("/srv/www"),
        );
        assert_eq!(config.base_url(), "https://example.com");
    }

    #[test]
    fn validate_rejects_bad_colour() {
        let mut config = SiteConfig::new(
            "site".to_string(),
            "https://example.com".to_string(),
            PathBuf::from("/srv/www"),
        );
        config.colours.light.text.link = "blue".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("text.link"));
    }

    #[test]
    fn short_and_alpha_hex_accepted() {
        assert!(is_css_colour("#fff"));
        assert!(is_css_colour("#0E1B18"));
        assert!(is_css_colour("#0E1B1880"));
        assert!(!is_css_colour("#0E1B1"));
        assert!(!is_css_colour("397367"));
    }

    #[test]
    fn colour_css_covers_both_modes() {
        let css = generate_colour_css(&ColourConfig::default());
        assert!(css.contains("--bg-page: #397367"));
        assert!(css.contains("@media (prefers-color-scheme: dark)"));
        assert!(css.contains("--bg-page: #0E1B18"));
        assert!(css.contains("--accent:"));
        assert!(css.contains("--link:"));
    }
}
