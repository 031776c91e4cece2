//! `basho` command-line storefront.
//!
//! Reads `basho.toml` (or the path given with `--config`), opens the SQLite
//! store, and either runs a one-shot command or starts the interactive shell.
//! The shell is one browsing context: its session ends when it exits.

mod render;
mod settings;
mod shell;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context as _, anyhow};
use basho_assistant::{Assistant, AssistantConfig, ChatMessage, ReferenceImage};
use basho_core::{
  catalog::{self, Category},
  checkout::Storefront,
};
use basho_store_sqlite::SqliteStore;
use clap::{Parser, Subcommand};
use secrecy::SecretString;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{
  settings::{Settings, expand_tilde},
  shell::{GREETING, Shell},
};

#[derive(Parser)]
#[command(author, version, about = "Basho pottery studio")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "basho.toml")]
  config: PathBuf,

  /// SQLite database path; overrides `store_path` from the config.
  #[arg(long)]
  store: Option<PathBuf>,

  /// Key for the generative assistant.
  #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
  api_key: Option<String>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// List the collection.
  Catalog {
    /// Only show one category (Tableware, Decor, Tea Sets).
    #[arg(long)]
    category:  Option<String>,
    /// List workshops instead of products.
    #[arg(long)]
    workshops: bool,
  },
  /// Ask the studio assistant a single question.
  Chat {
    #[arg(required = true, trailing_var_arg = true)]
    message: Vec<String>,
  },
  /// Turn a custom-order idea into a haiku and a brief for the potter.
  Commission {
    description: String,
    /// Reference photo to send along.
    #[arg(long)]
    image:       Option<PathBuf>,
  },
  /// Start an interactive shopping session (the default).
  Shell,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(&cli.config)?;
  tracing::debug!(?settings, "settings loaded");

  let assistant = build_assistant(&settings, cli.api_key.clone())?;
  let mut stdout = std::io::stdout();

  match cli.command.unwrap_or(Command::Shell) {
    Command::Catalog {
      category,
      workshops,
    } => {
      if workshops {
        render::workshops(&mut stdout, catalog::workshops())?;
      } else {
        let filter = category
          .as_deref()
          .map(|label| {
            Category::from_label(label).ok_or_else(|| anyhow!("unknown category {label:?}"))
          })
          .transpose()?;
        render::products(&mut stdout, catalog::products_in(filter))?;
      }
    }

    Command::Chat { message } => {
      let assistant = require_assistant(assistant)?;
      let history = [ChatMessage::model(GREETING)];
      println!("{}", assistant.reply(&history, &message.join(" ")).await);
    }

    Command::Commission { description, image } => {
      let assistant = require_assistant(assistant)?;
      let image = image.map(|path| read_image(&path)).transpose()?;
      let brief = assistant
        .commission_brief(&description, image.as_ref())
        .await;
      render::brief(&mut stdout, &brief)?;
    }

    Command::Shell => {
      let store_path = expand_tilde(cli.store.as_ref().unwrap_or(&settings.store_path));
      let store = SqliteStore::open(&store_path)
        .await
        .with_context(|| format!("failed to open store at {}", store_path.display()))?;
      tracing::info!(path = %store_path.display(), "store opened");

      let mut shell = Shell::new(Storefront::new(Arc::new(store)), assistant);
      shell.run().await?;
    }
  }

  Ok(())
}

/// The flag (or `GEMINI_API_KEY`) wins over the config file. No key means no
/// assistant; the storefront works without one.
fn build_assistant(settings: &Settings, flag: Option<String>) -> anyhow::Result<Option<Assistant>> {
  let Some(key) = flag.or_else(|| settings.api_key.clone()) else {
    return Ok(None);
  };
  let config = AssistantConfig {
    api_key:  SecretString::from(key),
    model:    settings.model.clone(),
    base_url: settings.api_base_url.clone(),
  };
  Ok(Some(Assistant::new(config).context("failed to build HTTP client")?))
}

fn require_assistant(assistant: Option<Assistant>) -> anyhow::Result<Assistant> {
  assistant.ok_or_else(|| anyhow!("no API key; set GEMINI_API_KEY or `api_key` in the config"))
}

fn read_image(path: &std::path::Path) -> anyhow::Result<ReferenceImage> {
  let mime_type = path
    .extension()
    .and_then(|ext| ext.to_str())
    .and_then(ReferenceImage::mime_for_extension)
    .ok_or_else(|| anyhow!("{} is not a supported image type", path.display()))?;
  let bytes =
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
  Ok(ReferenceImage {
    bytes,
    mime_type: mime_type.to_owned(),
  })
}
