use anyhow::{Context, Result};
use clap::Parser;
use std::{fs::OpenOptions, path::PathBuf, sync::Mutex};
use tracing_subscriber::EnvFilter;

use listrender::{
    api::HttpFeedClient,
    db::SqliteDriver,
    store::MemoryStore,
    utils, Collaborators, RenderRequest, RenderSettings, Renderer, YamlSettings,
};

/// Render a formatted list from a content tree, a query or a feed
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable debug logging to the temp-dir debug log
    #[arg(short, long)]
    debug: bool,

    /// YAML site description backing the content tree
    #[arg(long)]
    site: Option<PathBuf>,

    /// Override the context item of the site file
    #[arg(long)]
    context: Option<String>,

    /// Item id or path, feed URL, or the breadcrumb key
    #[arg(long, default_value = "")]
    data_source: String,

    /// URL-encoded rendering parameters
    #[arg(short, long, default_value = "")]
    params: String,

    #[arg(long, default_value = "")]
    css_class: String,

    /// Instance id used in log lines
    #[arg(long, default_value = "listrender")]
    unique_id: String,

    /// Path to settings file (default: config dir, then ./settings.yaml)
    #[arg(short, long)]
    settings: Option<PathBuf>,
}

fn init_logging(debug: bool) -> Result<()> {
    if debug {
        let path = utils::get_debug_log_path();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open debug log {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

/// Load settings with fallback logic; missing files mean built-in defaults
fn load_settings(cli_path: Option<PathBuf>) -> Result<RenderSettings> {
    if let Some(path) = cli_path {
        if !path.exists() {
            anyhow::bail!("Settings file not found at specified path: {}", path.display());
        }
        return Ok(RenderSettings::from_store(&YamlSettings::load(&path)?));
    }

    for path in utils::settings_search_paths() {
        if path.exists() {
            tracing::debug!("Loading settings from: {:?}", path);
            return Ok(RenderSettings::from_store(&YamlSettings::load(&path)?));
        }
    }

    Ok(RenderSettings::default())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug)?;

    let settings = load_settings(args.settings)?;

    let mut store = match &args.site {
        Some(path) => MemoryStore::load(path)?,
        None => MemoryStore::default(),
    };
    if let Some(context) = args.context {
        store.set_context(context);
    }

    let driver = SqliteDriver::new();
    let feeds = HttpFeedClient::new()?;
    let renderer = Renderer::new(
        settings,
        Collaborators {
            store: &store,
            links: &store,
            media: &store,
            driver: &driver,
            feeds: &feeds,
        },
    );

    let output = renderer.render(&RenderRequest {
        unique_id: args.unique_id,
        parameters: args.params,
        data_source: args.data_source,
        css_class: args.css_class,
    });
    println!("{}", output);

    Ok(())
}
