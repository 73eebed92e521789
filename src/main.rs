//! eqpad - A terminal equation editor with a live preview.
//!
//! # Usage
//!
//! ```bash
//! eqpad
//! eqpad notes.tex
//! eqpad --category chem --export-dir out
//! eqpad --render notes.tex
//! ```

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;

use eqpad::app::{App, DEFAULT_SEED};
use eqpad::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    parse_flag_tokens, save_config_flags,
};
use eqpad::render::{FormulaSummary, RenderOptions, UnicodePreview, render_source};
use eqpad::snippets::{Category, SnippetCatalog};

/// A terminal equation editor with typing assistance
#[derive(Parser, Debug)]
#[command(name = "eqpad", version, about, long_about = None)]
struct Cli {
    /// File whose contents seed the buffer (never written back)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Print the preview of the seed to stdout and exit
    #[arg(long)]
    render: bool,

    /// Snippet category active at startup
    #[arg(long, value_enum)]
    category: Option<Category>,

    /// Hide the live preview pane
    #[arg(long)]
    no_preview: bool,

    /// Do not let macros emit raw markup such as structure diagrams
    #[arg(long)]
    no_trust: bool,

    /// Directory that receives exported images
    #[arg(long, value_name = "PATH")]
    export_dir: Option<PathBuf>,

    /// JSON file with extra snippets
    #[arg(long, value_name = "PATH")]
    snippets: Option<PathBuf>,

    /// Write log output to a file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    Ok(())
}

fn read_seed(file: Option<&PathBuf>) -> Result<String> {
    let Some(path) = file else {
        return Ok(DEFAULT_SEED.to_string());
    };
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn print_preview(seed: &str, trust: bool) -> Result<()> {
    let options = RenderOptions::default().with_trust(trust);
    let tree = render_source(&UnicodePreview, &FormulaSummary, seed, &options)
        .context("Failed to render seed")?;
    for line in tree.lines() {
        println!("{}", line.text);
    }
    Ok(())
}

fn main() -> Result<()> {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    init_logging(effective.log_file.as_ref())?;

    let seed = read_seed(cli.file.as_ref())?;
    if cli.render {
        return print_preview(&seed, !effective.no_trust);
    }

    let catalog = SnippetCatalog::load(effective.snippets.as_deref())?;
    tracing::debug!(snippets = catalog.len(), "loaded snippet catalog");

    let mut app = App::new(seed)
        .with_category(effective.category.unwrap_or_default())
        .with_catalog(catalog)
        .with_preview(!effective.no_preview)
        .with_trust(!effective.no_trust)
        .with_export_dir(effective.export_dir.unwrap_or_else(|| PathBuf::from(".")))
        .with_config_paths(
            Some(global_path.clone()),
            if local_path.exists() {
                Some(local_path.clone())
            } else {
                None
            },
        );

    app.run().context("Application error")
}
