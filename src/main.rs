//! tim CLI
//!
//! Usage:
//!   tim [OPTIONS] [FILE]
//!
//! Options:
//!   -d, --data <FILE>     Data for dot-path tokens (JSON, or TOML by extension)
//!   -c, --config <FILE>   Engine configuration (TOML format)
//!       --open <MARKER>   Open marker, overrides the config
//!       --close <MARKER>  Close marker, overrides the config
//!   -l, --lenient         Replace unresolved tokens with nothing
//!       --flat            Don't resolve tokens nested inside other tokens
//!       --debug           Log every substitution to stderr
//!   -h, --help            Print help

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::Parser;
use serde_json::Value;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use tim::{CatchAll, Delimiters, DotPath, Engine, EngineConfig, InnerTokens, TimError};

#[derive(Parser)]
#[command(name = "tim")]
#[command(about = "Resolve {{tokens}} in a template through plugins")]
struct Cli {
    /// Template file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Data file for dot-path tokens (JSON, or TOML when the extension is .toml)
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Engine configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Open marker
    #[arg(long)]
    open: Option<String>,

    /// Close marker
    #[arg(long)]
    close: Option<String>,

    /// Replace tokens no plugin resolves with nothing instead of failing
    #[arg(short, long)]
    lenient: bool,

    /// Hand nested tokens to plugins raw instead of resolving them first
    #[arg(long)]
    flat: bool,

    /// Log every substitution to stderr
    #[arg(long)]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.debug { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(io::stderr)
        .init();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => fail(format!("Error loading config: {}", e)),
    };

    let data = match &cli.data {
        Some(path) => match load_data(path) {
            Ok(data) => data,
            Err(e) => fail(format!("Error loading data '{}': {}", path.display(), e)),
        },
        None => Value::Object(Default::default()),
    };

    let source = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => fail(format!("Error reading file '{}': {}", path.display(), e)),
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => buffer,
                Err(e) => fail(format!("Error reading from stdin: {}", e)),
            }
        }
    };

    let engine = match build_engine(config, data, &cli) {
        Ok(engine) => engine,
        Err(e) => fail(format!("Error: {}", e)),
    };

    let filename = cli
        .input
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<stdin>".to_string());

    match engine.run(&source) {
        Ok(output) => print!("{}", output),
        Err(e) => fail(e.report(&filename)),
    }
}

fn fail(message: String) -> ! {
    eprintln!("{}", message.trim_end());
    std::process::exit(1);
}

fn load_config(cli: &Cli) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };

    if cli.open.is_some() || cli.close.is_some() {
        let open = cli
            .open
            .clone()
            .unwrap_or_else(|| config.delimiters.open().to_string());
        let close = cli
            .close
            .clone()
            .unwrap_or_else(|| config.delimiters.close().to_string());
        config.delimiters = Delimiters::new(open, close)?;
    }

    Ok(config)
}

fn load_data(path: &Path) -> Result<Value, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    if is_toml {
        Ok(toml::from_str(&content)?)
    } else {
        Ok(serde_json::from_str(&content)?)
    }
}

fn build_engine(config: EngineConfig, data: Value, cli: &Cli) -> Result<Engine, TimError> {
    let mut engine = Engine::with_config(config);
    if !cli.flat {
        engine.install(InnerTokens)?;
    }
    engine.install(DotPath::new(data))?;
    if cli.lenient {
        engine.install(CatchAll::empty())?;
    }
    Ok(engine)
}
