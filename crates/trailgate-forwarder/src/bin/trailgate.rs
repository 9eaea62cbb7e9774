//! Command-line host: reads one JSON-lines batch and flushes it.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use trailgate_common_config::{load_params, Environment, ForwarderConfig, PluginParams};
use trailgate_common_log::LogConfig;
use trailgate_forwarder::{FlushStatus, Forwarder};
use trailgate_record::JsonBatchDecoder;

/// Forward a batch of log records to an audit ingestion channel.
#[derive(Debug, Parser)]
#[command(name = "trailgate", version, about)]
struct Args {
    /// YAML file of plugin parameters (ChannelArn, Endpoint, ...).
    #[arg(long, short = 'p')]
    params: Option<PathBuf>,

    /// Plugin parameter as KEY=VALUE, taking precedence over the file.
    #[arg(long = "set", short = 's', value_name = "KEY=VALUE", value_parser = parse_param)]
    set: Vec<(String, String)>,

    /// Source tag of the batch.
    #[arg(long, short = 't', default_value = "trailgate")]
    tag: String,

    /// Batch file of `[timestamp, record]` lines; stdin when omitted.
    input: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(status) => status.exit_code(),
        Err(e) => {
            eprintln!("trailgate: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<FlushStatus> {
    Environment::load_dotenv()?;

    let params = plugin_params(&args)?;
    let config = ForwarderConfig::from_params(&params)?;

    trailgate_common_log::init(LogConfig::from_env().with_level(config.log_level))?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        channel = %config.channel,
        "trailgate starting"
    );

    let data = read_input(args.input.as_ref())?;
    let forwarder = Forwarder::http(config)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building runtime")?;
    let result = runtime.block_on(forwarder.run_flush(JsonBatchDecoder::new(&data), &args.tag));

    Ok(FlushStatus::from(&result))
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}

/// Command-line parameters, then whatever the parameters file adds.
fn plugin_params(args: &Args) -> Result<PluginParams> {
    let mut params: PluginParams = args.set.iter().cloned().collect();
    if let Some(path) = &args.params {
        let file = load_params(path)
            .with_context(|| format!("loading parameters from {}", path.display()))?;
        params.merge_missing(file);
    }
    Ok(params)
}

fn read_input(path: Option<&PathBuf>) -> Result<Vec<u8>> {
    match path {
        Some(path) => {
            std::fs::read(path).with_context(|| format!("reading batch from {}", path.display()))
        }
        None => {
            let mut data = Vec::new();
            std::io::stdin()
                .read_to_end(&mut data)
                .context("reading batch from stdin")?;
            Ok(data)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["trailgate"]).unwrap();
        assert_eq!(args.tag, "trailgate");
        assert!(args.params.is_none());
        assert!(args.set.is_empty());
        assert!(args.input.is_none());
    }

    #[test]
    fn test_set_params() {
        let args = Args::try_parse_from([
            "trailgate",
            "-s",
            "ChannelArn=arn:channel",
            "--set",
            "Endpoint=http://localhost:4566/?a=b",
        ])
        .unwrap();
        let params = plugin_params(&args).unwrap();
        assert_eq!(params.get("channelarn"), Some("arn:channel"));
        assert_eq!(params.get("Endpoint"), Some("http://localhost:4566/?a=b"));
    }

    #[test]
    fn test_malformed_set_param() {
        assert!(Args::try_parse_from(["trailgate", "-s", "ChannelArn"]).is_err());
        assert!(Args::try_parse_from(["trailgate", "-s", "=value"]).is_err());
    }

    #[test]
    fn test_missing_params_file() {
        let args = Args::try_parse_from(["trailgate", "-p", "/nonexistent/trailgate.yaml"]).unwrap();
        let err = plugin_params(&args).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/trailgate.yaml"));
    }

    #[test]
    fn test_args_full() {
        let args =
            Args::try_parse_from(["trailgate", "-p", "params.yaml", "--tag", "app.access", "batch.jsonl"])
                .unwrap();
        assert_eq!(args.params, Some(PathBuf::from("params.yaml")));
        assert_eq!(args.tag, "app.access");
        assert_eq!(args.input, Some(PathBuf::from("batch.jsonl")));
    }
}
