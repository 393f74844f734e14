use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use reqres_core::{config, run_scenario, Config, RequestRunner, ScenarioOptions, UsersClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Walk through GET, POST, PUT, PATCH and DELETE against the reqres users API.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// API base URL; paths such as `users/1` are appended to it.
    #[arg(long, env = "REQRES_BASE_URL", default_value = config::DEFAULT_BASE_URL)]
    base_url: String,

    /// Per-request timeout in seconds.
    #[arg(
        long,
        env = "REQRES_TIMEOUT_SECS",
        default_value_t = config::DEFAULT_TIMEOUT.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    timeout_secs: u64,

    /// File the raw user list is written to.
    #[arg(short, long, env = "REQRES_OUTPUT", default_value = config::DEFAULT_OUTPUT)]
    output: PathBuf,

    /// User targeted by the get, update, patch and delete calls.
    #[arg(long, env = "REQRES_USER_ID", default_value_t = config::DEFAULT_USER_ID)]
    user_id: u64,
}

impl Args {
    fn into_config(self) -> Result<Config> {
        Ok(Config {
            base_url: Config::parse_base_url(&self.base_url)?,
            timeout: Duration::from_secs(self.timeout_secs),
            output: self.output,
            user_id: self.user_id,
        })
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reqres=info,reqres_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Args::parse().into_config()?;
    tracing::info!(base_url = %config.base_url, timeout = ?config.timeout, "starting walkthrough");

    let runner = RequestRunner::builder().timeout(config.timeout).build()?;
    let client = UsersClient::new(config.base_url.clone());
    let options = ScenarioOptions::from(&config);

    let reports = run_scenario(&runner, &client, &options).await;

    let mut failed = 0;
    for report in &reports {
        match &report.outcome {
            Ok(line) => println!("{line}"),
            Err(err) => {
                failed += 1;
                eprintln!("error in {}: {err}", report.operation);
            }
        }
    }

    if failed > 0 {
        tracing::warn!(failed, total = reports.len(), "walkthrough finished with errors");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_config_defaults() {
        let config = Args::try_parse_from(["reqres"]).unwrap().into_config().unwrap();
        let defaults = Config::defaults().unwrap();
        assert_eq!(config.base_url, defaults.base_url);
        assert_eq!(config.timeout, defaults.timeout);
        assert_eq!(config.output, defaults.output);
        assert_eq!(config.user_id, defaults.user_id);
    }

    #[test]
    fn flags_override_defaults() {
        let config = Args::try_parse_from([
            "reqres",
            "--base-url",
            "http://127.0.0.1:3000/api",
            "--timeout-secs",
            "5",
            "--output",
            "out.json",
            "--user-id",
            "7",
        ])
        .unwrap()
        .into_config()
        .unwrap();
        assert_eq!(config.base_url.as_str(), "http://127.0.0.1:3000/api");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.output, PathBuf::from("out.json"));
        assert_eq!(config.user_id, 7);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = Args::try_parse_from(["reqres", "--timeout-secs", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn bad_base_url_is_rejected() {
        let args = Args::try_parse_from(["reqres", "--base-url", "not a url"]).unwrap();
        assert!(args.into_config().is_err());
    }

    #[test]
    fn args_are_well_formed() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
