//! # Photolog
//!
//! A static photo-blog generator layered over a photo-management catalog.
//! The catalog is the data source: you register *sections* (auto-blogs fed
//! by a saved search, or manual blogs fed by explicit posts), and `build`
//! renders them into a plain HTML site.
//!
//! # Architecture
//!
//! One config root holds the shared catalog and any number of site
//! *domains*, each an independent site:
//!
//! ```text
//! ~/.config/photo-catalog/
//! ├── catalog.db               ← shared photo catalog (read-only here)
//! ├── site-example.com/        ← one domain
//! │   ├── site.toml            ← name, build dir, theme colours
//! │   ├── state.json           ← date ledger + page hashes
//! │   ├── section-birds.toml   ← an auto-blog
//! │   └── blog-trips/          ← a manual blog
//! │       ├── section.toml
//! │       └── post-kyoto.toml
//! └── site-other.org/
//! ```
//!
//! A build runs registry → planner → renderer:
//!
//! ```text
//! 1. Registry   domain dir  →  sections      (TOML files → definitions)
//! 2. Planner    sections    →  page plans    (catalog search + date ledger)
//! 3. Builder    page plans  →  build dir     (Maud HTML + copied photos)
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | Per-domain `site.toml` loading, validation, theme CSS generation |
//! | [`catalog`] | Read-only access to the photo catalog: the [`catalog::Catalog`] trait and its SQLite backend |
//! | [`slug`] | Slug derivation from titles and validation of explicit slugs |
//! | [`registry`] | Section and post definitions on disk: create, get, list |
//! | [`state`] | Build state: the permanent photo→date ledger and per-page content hashes |
//! | [`planner`] | Turns a section plus the catalog into an ordered page plan |
//! | [`render`] | Maud HTML renderers and theme stylesheet assembly |
//! | [`feed`] | Atom and RSS feeds for sections and the home page |
//! | [`build`] | Orchestrates a full site build into the build directory |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Dates Are Assigned Once
//!
//! An auto-blog page's URL is its calendar date. The first build that sees
//! a photo records its date in the ledger ([`state::BuildState`]), and
//! every later build reuses the recorded date — even if the catalog's
//! capture metadata is corrected afterwards. Published URLs never move.
//!
//! ## Deterministic Output
//!
//! Rendered HTML and feeds contain no timestamps, counters, or other
//! run-dependent data — feed `updated` elements carry the newest entry's
//! date, never the build time. Building twice from the same inputs
//! produces byte-identical files, which is what makes the page-hash skip
//! logic in [`build`] sound and makes `build --fresh` safe to run at any
//! time.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/): malformed
//! markup is a compile error, interpolation is auto-escaped, and there is
//! no template directory to ship.

pub mod build;
pub mod catalog;
pub mod config;
pub mod feed;
pub mod output;
pub mod planner;
pub mod registry;
pub mod render;
pub mod slug;
pub mod state;

#[cfg(test)]
pub(crate) mod test_helpers;
