use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use settle_core::{
    LineWeight, LoggingConfig, SettleConfig, SettleError, merge_json, prorate_checked,
    split_adjustment,
};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Parser, Debug)]
#[command(name = "settle", version, about = "Order allocation and entity-graph merge helpers")]
struct Cli {
    /// Configuration file (overrides SETTLE_CONFIG_PATH)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Split an amount across weights; prints the allocation as JSON
    Prorate {
        /// Comma separated non-negative weights
        #[arg(short, long, value_delimiter = ',', required = true)]
        weights: Vec<f64>,

        /// Amount in minor currency units, may be negative
        #[arg(short, long, allow_hyphen_values = true)]
        amount: i64,
    },
    /// Split an order adjustment across lines, then across each line's units
    Adjust {
        /// Comma separated `weight:quantity` pairs, one per line
        #[arg(short, long, value_delimiter = ',', required = true, value_parser = parse_line)]
        lines: Vec<LineWeight>,

        /// Amount in minor currency units, may be negative
        #[arg(short, long, allow_hyphen_values = true)]
        amount: i64,
    },
    /// Merge a freshly hydrated JSON entity into a previously loaded one
    Merge {
        /// Previously loaded entity
        existing: PathBuf,

        /// Freshly hydrated entity
        incoming: PathBuf,
    },
}

fn parse_line(s: &str) -> Result<LineWeight, String> {
    let (weight, quantity) =
        s.split_once(':').ok_or_else(|| format!("expected weight:quantity, got '{s}'"))?;
    let weight = weight.trim().parse::<f64>().map_err(|e| format!("bad weight '{weight}': {e}"))?;
    let quantity =
        quantity.trim().parse::<u32>().map_err(|e| format!("bad quantity '{quantity}': {e}"))?;
    Ok(LineWeight { weight, quantity })
}

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

fn init_tracing(logging: &LoggingConfig) {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter(&logging.filter))
        .with_target(false)
        .with_writer(std::io::stderr);
    if logging.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

fn load_config(path: Option<&Path>) -> Result<SettleConfig> {
    let config = match path {
        Some(path) => SettleConfig::load_from(path)?.apply_env_overrides().validated()?,
        None => SettleConfig::load()?,
    };
    Ok(config)
}

/// Load the configuration under a default-filtered subscriber, so fallback
/// warnings are visible before the configured subscriber exists.
fn load_config_logged<W>(path: Option<&Path>, writer: W) -> Result<SettleConfig>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(env_filter(&LoggingConfig::default().filter))
        .with_target(false)
        .with_writer(writer)
        .finish();
    tracing::subscriber::with_default(bootstrap, || load_config(path))
}

fn log_failure(err: SettleError) -> SettleError {
    error!(category = err.category(), recoverable = err.is_recoverable(), "{err}");
    err
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config_logged(cli.config.as_deref(), std::io::stderr)?;
    init_tracing(&config.logging);

    let output = match cli.command {
        Command::Prorate { weights, amount } => {
            info!(buckets = weights.len(), amount, "prorating");
            serde_json::to_value(prorate_checked(&weights, amount).map_err(log_failure)?)?
        }
        Command::Adjust { lines, amount } => {
            info!(lines = lines.len(), amount, "splitting adjustment");
            serde_json::to_value(split_adjustment(&lines, amount).map_err(log_failure)?)?
        }
        Command::Merge { existing, incoming } => {
            let existing = read_json(&existing)?;
            let incoming = read_json(&incoming)?;
            info!(identity_key = %config.merge.identity_key, "merging entity trees");
            merge_json(Some(&existing), &incoming, &config.merge).map_err(log_failure)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_negative_amounts() {
        let cli = Cli::parse_from(["settle", "prorate", "--weights", "4000,2000,2000", "--amount", "-300"]);
        let Command::Prorate { weights, amount } = cli.command else {
            panic!("expected prorate");
        };
        assert_eq!(weights, vec![4000.0, 2000.0, 2000.0]);
        assert_eq!(amount, -300);
    }

    #[test]
    fn test_parses_line_weights() {
        assert_eq!(parse_line("4000:2").unwrap(), LineWeight { weight: 4000.0, quantity: 2 });
        assert!(parse_line("4000").is_err());
        assert!(parse_line("4000:-1").is_err());
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_missing_config_warning_reaches_the_log() {
        let logs = CapturedLogs::default();
        let config =
            load_config_logged(Some(Path::new("/nonexistent/settle.toml")), logs.clone()).unwrap();
        assert_eq!(config.merge.identity_key, "id");

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("WARN"), "{output}");
        assert!(output.contains("not found. Using default configuration."), "{output}");
    }
}
