//! Covenant Server CLI
//!
//! `covenant-server [--config <file>]`. Without a config file the server
//! runs against the offline mock provider.

use covenant_server::{config::ServerConfig, init_tracing, start_server, ServerError};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};

const USAGE: &str = "\
Covenant Server - Credit Agreement Extraction

USAGE:
    covenant-server [--config <path-to-config.toml>]

OPTIONS:
    -c, --config <file>    Load configuration from TOML file
    -h, --help             Print this help message

CONFIGURATION:
    bind_address, bind_port    Listen address (e.g. '127.0.0.1', 8080)
    [extractor]                chunk sizes, map-reduce threshold, attempts, timeout
    [validation]               borrower role keyword, evaluation date
    [provider]                 kind ('openai' or 'mock'), endpoint, model, api_key_env

ENVIRONMENT:
    OPENAI_API_KEY    API key (variable name set by provider.api_key_env)
    RUST_LOG          Log filter (default: info)
";

#[derive(Debug, PartialEq)]
enum Command {
    Help,
    Serve(Option<PathBuf>),
}

fn parse_args<I>(args: I) -> Result<Command, String>
where
    I: IntoIterator<Item = String>,
{
    let mut config = None;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "-c" | "--config" => {
                let path = args
                    .next()
                    .ok_or_else(|| format!("{} requires a file path", arg))?;
                config = Some(PathBuf::from(path));
            }
            other => match other.strip_prefix("--config=") {
                Some(path) if !path.is_empty() => config = Some(PathBuf::from(path)),
                _ => return Err(format!("Unexpected argument '{}'", other)),
            },
        }
    }

    Ok(Command::Serve(config))
}

fn load_config(path: Option<PathBuf>) -> Result<ServerConfig, ServerError> {
    match path {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            Ok(ServerConfig::from_file(&path)?)
        }
        None => {
            warn!("No config file specified, using offline mock configuration");
            Ok(ServerConfig::default_test_config())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let path = match parse_args(std::env::args().skip(1)) {
        Ok(Command::Help) => {
            print!("{}", USAGE);
            return ExitCode::SUCCESS;
        }
        Ok(Command::Serve(path)) => path,
        Err(message) => {
            eprintln!("{}\n\n{}", message, USAGE);
            return ExitCode::from(2);
        }
    };

    let result = match load_config(path) {
        Ok(config) => start_server(config).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
