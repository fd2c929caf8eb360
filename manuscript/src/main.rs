//! Manuscript authoring driver.
//!
//! A line-oriented interface over a single manuscript: build the outline,
//! walk it section by section, record authoring metadata and save as you go.
//!
//! ```bash
//! cargo run -p manuscript -- --title "The Perceptron" --schema research
//! ```
//!
//! Settings come from command-line flags, then an optional TOML file, then
//! built-in defaults.

mod headless;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use manuscript_core::{metadata::Author, Manuscript, ManuscriptConfig, SchemaPreset};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "manuscript", version, about = "Headless manuscript authoring driver")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Manuscript title (also names the snapshot file)
    #[arg(short, long)]
    title: Option<String>,

    #[arg(long)]
    subtitle: Option<String>,

    /// Author name
    #[arg(long)]
    author: Option<String>,

    /// Directory for snapshots and rendered markdown
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Metadata schema preset (story, research, keyword_index or a research genre)
    #[arg(short, long)]
    schema: Option<SchemaPreset>,

    /// Do not save after each mutating command
    #[arg(long)]
    no_autosave: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    /// Layer flags over the file config (or defaults).
    fn into_config(self) -> anyhow::Result<ManuscriptConfig> {
        let mut config = match &self.config {
            Some(path) => ManuscriptConfig::from_toml_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => ManuscriptConfig::default(),
        };

        if let Some(title) = self.title {
            config = config.with_title(title);
        }
        if let Some(subtitle) = self.subtitle {
            config = config.with_subtitle(subtitle);
        }
        if let Some(author) = self.author {
            config = config.with_author(Author::new(author));
        }
        if let Some(dir) = self.output_dir {
            config = config.with_output_dir(dir);
        }
        if let Some(schema) = self.schema {
            config = config.with_schema(schema);
        }
        if self.no_autosave {
            config = config.with_autosave(false);
        }

        if config.title.trim().is_empty() {
            anyhow::bail!("a title is required (--title or `title` in the config file)");
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the command protocol.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = args.into_config()?;
    info!(title = %config.title, schema = %config.schema, output_dir = %config.output_dir.display(), "opening manuscript");

    let manuscript = Manuscript::open(&config)
        .await
        .with_context(|| format!("opening manuscript '{}'", config.title))?;

    headless::run_headless(manuscript, config.autosave).await
}
