//! `jsonscrub` command line: scrub JSON documents from files or stdin.
use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use jsonscrub::{EscapeMode, SafelistPreset, ScrubConfig, ScrubReader, SourceEncoding, XssSanitizer};
use tracing::{info, warn};

/// Streaming XSS scrubber for JSON documents.
#[derive(Parser, Debug)]
#[command(name = "jsonscrub", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sanitize every string literal of a JSON document
    Scrub(ScrubArgs),
    /// Validate a config file and print the effective settings
    CheckConfig {
        /// Config file (TOML)
        #[arg(long)]
        config: PathBuf,
    },
}

#[derive(Args, Debug)]
struct ScrubArgs {
    /// Input file, or `-` for stdin
    #[arg(long, default_value = "-")]
    input: PathBuf,

    /// Output file, or `-` for stdout
    #[arg(long, default_value = "-")]
    output: PathBuf,

    /// Config file (TOML); flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Input encoding
    #[arg(long, value_enum)]
    encoding: Option<EncodingArg>,

    /// Escape detection rule inside string literals
    #[arg(long, value_enum)]
    escape: Option<EscapeArg>,

    /// Markup allowed to survive in string literals
    #[arg(long, value_enum)]
    safelist: Option<SafelistArg>,

    /// Emit cleaned literals without re-escaping them for JSON
    #[arg(long)]
    no_json_escape: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum EncodingArg {
    Utf8,
    Latin1,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum EscapeArg {
    Counted,
    Lookback,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SafelistArg {
    None,
    Simple,
    Basic,
    Relaxed,
}

impl From<EncodingArg> for SourceEncoding {
    fn from(arg: EncodingArg) -> Self {
        match arg {
            EncodingArg::Utf8 => SourceEncoding::Utf8,
            EncodingArg::Latin1 => SourceEncoding::Latin1,
        }
    }
}

impl From<EscapeArg> for EscapeMode {
    fn from(arg: EscapeArg) -> Self {
        match arg {
            EscapeArg::Counted => EscapeMode::Counted,
            EscapeArg::Lookback => EscapeMode::Lookback,
        }
    }
}

impl From<SafelistArg> for SafelistPreset {
    fn from(arg: SafelistArg) -> Self {
        match arg {
            SafelistArg::None => SafelistPreset::None,
            SafelistArg::Simple => SafelistPreset::SimpleText,
            SafelistArg::Basic => SafelistPreset::Basic,
            SafelistArg::Relaxed => SafelistPreset::Relaxed,
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Scrub(args) => scrub(&args)?,
        Commands::CheckConfig { config } => {
            let config = ScrubConfig::load(&config)
                .with_context(|| format!("load config {}", config.display()))?;
            print!("{}", config.to_toml().context("render config")?);
        }
    }

    Ok(())
}

fn scrub(args: &ScrubArgs) -> Result<()> {
    let config = effective_config(args)?;
    info!(input = ?args.input, output = ?args.output, "starting scrub");

    let sanitizer = XssSanitizer::from_config(&config.sanitize);
    let mut reader = ScrubReader::new(open_input(&args.input)?, &sanitizer, config.scan);
    let mut out = open_output(&args.output)?;
    let written = io::copy(&mut reader, &mut out).context("scrub input")?;
    out.flush().context("flush output")?;

    let summary = reader.summary().unwrap_or_default();
    info!(
        bytes_written = written,
        literals_sanitized = summary.literals_sanitized,
        chars_consumed = summary.chars_consumed,
        "scrub finished"
    );
    if let Some(dropped) = summary.dropped_literal_chars {
        warn!(dropped_chars = dropped, "input ended inside a string literal; it was dropped");
    }
    Ok(())
}

fn effective_config(args: &ScrubArgs) -> Result<ScrubConfig> {
    let mut config = match &args.config {
        Some(path) => ScrubConfig::load(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => ScrubConfig::default(),
    };
    if let Some(encoding) = args.encoding {
        config.scan.encoding = encoding.into();
    }
    if let Some(escape) = args.escape {
        config.scan.escape_mode = escape.into();
    }
    if let Some(safelist) = args.safelist {
        config.sanitize.safelist = safelist.into();
    }
    if args.no_json_escape {
        config.sanitize.json_escape = false;
    }
    Ok(config)
}

fn open_input(path: &Path) -> Result<Box<dyn Read>> {
    if path == Path::new("-") {
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(path).with_context(|| format!("open input {}", path.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

fn open_output(path: &Path) -> Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout().lock())));
    }
    let file = File::create(path).with_context(|| format!("create output {}", path.display()))?;
    Ok(Box::new(BufWriter::new(file)))
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    // RUST_LOG overrides the level, e.g. RUST_LOG=jsonscrub=trace
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
