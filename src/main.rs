use clap::{Args, Parser, Subcommand};
use photolog::catalog::{Catalog, SearchFilter, SqliteCatalog};
use photolog::registry::Registry;
use photolog::{build, config, output, registry};
use std::path::PathBuf;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, clap wants a 'static str
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "photolog")]
#[command(about = "Photo-blog site generator backed by a photo catalog")]
#[command(long_about = "\
Photo-blog site generator backed by a photo catalog

The catalog is the data source. Each site is a 'domain' living under the
config root next to the catalog database:

  ~/.config/photo-catalog/
  ├── catalog.db                   # Photo catalog (read-only)
  └── site-example.com/            # One domain
      ├── site.toml                # Name, build dir, theme colours
      ├── state.json               # Date ledger + page hashes
      ├── section-birds.toml       # Auto-blog: pages from a saved search
      └── blog-trips/              # Manual blog: explicit posts
          ├── section.toml
          └── post-kyoto.toml

Sections come in two kinds:

  Auto-blog:    'create-auto' saves a catalog search; every build turns its
                results into one page per capture date, oldest first.
  Manual blog:  'create-blog' plus 'post' attach chosen photos to dated
                posts; the index lists them newest first.

A page's date is assigned the first time a build sees its photos and never
changes afterwards, so published URLs stay stable even when catalog
metadata is corrected. 'build --fresh' deletes the output directory first
but keeps those assignments.")]
#[command(version = version_string())]
struct Cli {
    /// Config root holding the catalog database and site domains
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Site domain (selects site-<domain>/ under the config root)
    domain: String,

    #[command(subcommand)]
    command: Command,
}

/// Shared flags for commands that create a section.
#[derive(Args, Clone)]
struct DisplayArgs {
    /// Explicit slug (derived from the title otherwise)
    #[arg(long)]
    slug: Option<String>,

    /// Markdown description shown on the index page
    #[arg(long)]
    description: Option<String>,

    /// Symbol shown next to the title in the navbar (e.g. an emoji)
    #[arg(long)]
    icon: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new site domain
    Initialize {
        /// Where builds write the generated site
        build_dir: PathBuf,

        /// Site display name (defaults to the domain)
        #[arg(long)]
        name: Option<String>,

        /// Public base URL (defaults to https://<domain>)
        #[arg(long)]
        url: Option<String>,

        /// Favicon file, copied into the domain directory
        #[arg(long)]
        favicon: Option<PathBuf>,
    },
    /// Register an auto-blog fed by a saved catalog search
    CreateAuto {
        /// Section title
        title: String,

        #[command(flatten)]
        display: DisplayArgs,

        /// Only photos by this creator (repeatable)
        #[arg(long = "creator")]
        creators: Vec<String>,

        /// Require this tag (repeatable)
        #[arg(long = "all-tag")]
        all_tags: Vec<String>,

        /// Exclude photos carrying this tag (repeatable)
        #[arg(long = "no-tag")]
        no_tags: Vec<String>,
    },
    /// Register a manual blog
    CreateBlog {
        /// Section title
        title: String,

        #[command(flatten)]
        display: DisplayArgs,
    },
    /// Add a post to a manual blog
    Post {
        /// Slug of the blog to post to
        blog_slug: String,

        /// Post title
        title: String,

        /// Explicit slug (derived from the title otherwise)
        #[arg(long)]
        slug: Option<String>,

        /// Markdown description shown above the photos
        #[arg(long)]
        description: Option<String>,

        /// Catalog id of an attached photo (repeatable, display order)
        #[arg(long = "image", required = true)]
        images: Vec<i64>,

        /// Post date, "YYYY-MM-DD HH:MM" or "YYYY-MM-DD" (default: now)
        #[arg(long)]
        date: Option<String>,
    },
    /// Render the site into its build directory
    Build {
        /// Delete the build directory and rebuild everything
        #[arg(long)]
        fresh: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_root = match cli.config {
        Some(root) => root,
        None => dirs::config_dir()
            .ok_or("could not determine the user config directory; pass --config")?
            .join("photo-catalog"),
    };
    let domain_dir = config::domain_dir(&config_root, &cli.domain);

    match cli.command {
        Command::Initialize {
            build_dir,
            name,
            url,
            favicon,
        } => {
            if domain_dir.exists() {
                return Err(format!("domain already initialized: {}", domain_dir.display()).into());
            }
            std::fs::create_dir_all(&domain_dir)?;
            std::fs::create_dir_all(&build_dir)?;

            let name = name.unwrap_or_else(|| cli.domain.clone());
            let url = url.unwrap_or_else(|| format!("https://{}", cli.domain));
            let mut site_config = config::SiteConfig::new(name, url, build_dir);
            if let Some(favicon) = favicon {
                let file_name = favicon
                    .file_name()
                    .ok_or("favicon path has no file name")?
                    .to_string_lossy()
                    .into_owned();
                std::fs::copy(&favicon, domain_dir.join(&file_name))?;
                site_config.favicon = Some(file_name);
            }
            config::store_config(&domain_dir, &site_config)?;
            output::print_initialized(&cli.domain, &domain_dir);
        }
        Command::CreateAuto {
            title,
            display,
            creators,
            all_tags,
            no_tags,
        } => {
            require_initialized(&domain_dir)?;
            let filter = SearchFilter {
                creators,
                all_tags,
                no_tags,
            };
            let section = Registry::new(&domain_dir).create_auto(
                &title,
                display.slug.as_deref(),
                display.description,
                display.icon,
                filter,
                now(),
            )?;
            output::print_section_created(&section);
        }
        Command::CreateBlog { title, display } => {
            require_initialized(&domain_dir)?;
            let section = Registry::new(&domain_dir).create_blog(
                &title,
                display.slug.as_deref(),
                display.description,
                display.icon,
                now(),
            )?;
            output::print_section_created(&section);
        }
        Command::Post {
            blog_slug,
            title,
            slug,
            description,
            images,
            date,
        } => {
            require_initialized(&domain_dir)?;
            let date = match date {
                Some(value) => registry::parse_date(&value)?,
                None => now(),
            };
            // Reject unknown photo ids before anything lands on disk
            let catalog = SqliteCatalog::open(&config_root)?;
            catalog.get(&images)?;
            let post = Registry::new(&domain_dir).create_post(
                &blog_slug,
                &title,
                slug.as_deref(),
                description,
                images,
                date,
            )?;
            output::print_post_created(&blog_slug, &post);
        }
        Command::Build { fresh } => {
            let site_config = config::load_config(&domain_dir)?;
            let catalog = SqliteCatalog::open(&config_root)?;
            let report = build::build(
                &domain_dir,
                &site_config,
                &catalog,
                build::BuildOptions { fresh },
            )?;
            output::print_build_report(&report);
            println!("Build complete: {}", site_config.build.display());
        }
    }

    Ok(())
}

fn now() -> chrono::NaiveDateTime {
    chrono::Local::now().naive_local()
}

fn require_initialized(domain_dir: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
    if domain_dir.is_dir() {
        Ok(())
    } else {
        Err(format!(
            "domain not initialized: {} (run 'initialize' first)",
            domain_dir.display()
        )
        .into())
    }
}
