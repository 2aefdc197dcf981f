//! spherexlander CLI - extract landing-page metadata from a SPHEREx LaTeX document

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{debug, info, Level};

use spherexlander::{BuildSettings, CiMetadata, TexDocument};

#[derive(Parser)]
#[command(name = "spherexlander")]
#[command(version)]
#[command(about = "Extract metadata from SPHEREx LaTeX documents", long_about = None)]
struct Cli {
    /// LaTeX source file (defaults to `source_path` from the settings file)
    source: Option<PathBuf>,

    /// Document-class parser, e.g. spherex-ssdc-tr
    #[arg(long)]
    parser: Option<String>,

    /// YAML build settings file
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Canonical URL of the landing page
    #[arg(long)]
    canonical_url: Option<String>,

    /// Ignore CI environment variables
    #[arg(long)]
    no_ci: bool,

    /// Output file path (writes to stdout if not provided)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty print the JSON output
    #[arg(short, long)]
    pretty: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    let mut settings = match cli.settings {
        Some(ref path) => BuildSettings::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => BuildSettings::default(),
    };
    if let Some(parser) = cli.parser {
        settings = settings.with_parser(parser);
    }
    if let Some(url) = cli.canonical_url {
        settings = settings.with_canonical_url(url);
    }
    let class = settings.document_class()?;

    let Some(source_path) = cli.source.or_else(|| settings.source_path.clone()) else {
        bail!("no LaTeX source given; pass SOURCE or set source_path in the settings");
    };
    let raw = fs::read_to_string(&source_path)
        .with_context(|| format!("failed to read {}", source_path.display()))?;
    let document = TexDocument::new(&raw);

    let ci = if cli.no_ci {
        CiMetadata::null()
    } else {
        CiMetadata::from_env()
    };
    if ci.is_detected() {
        info!("detected CI platform {:?}", ci.platform);
    }

    debug!("parsing {} as {}", source_path.display(), class.name());
    let output = class.extract_json(&document, &ci, &settings)?;
    for warning in &output.warnings {
        eprintln!("warning: {}", warning);
    }

    let json = if cli.pretty {
        serde_json::to_string_pretty(&output.metadata)?
    } else {
        serde_json::to_string(&output.metadata)?
    };

    match cli.output {
        Some(ref path) => {
            fs::write(path, format!("{}\n", json))
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("wrote {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", json)?;
        }
    }

    Ok(())
}
