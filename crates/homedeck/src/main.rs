use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use homedeck::ActionContext;
use homedeck::ActionRegistry;
use homedeck::Config;
use homedeck::ControlClient;
use homedeck::HttpControlClient;
use homedeck::Plugin;
use homedeck::PluginArgs;
use homedeck::client::http_factory;
use tracing::debug;
use tracing::info;
use tracing::warn;
use tracing_subscriber::prelude::*;

/// Home automation actions for Stream Deck keys.
#[derive(Debug, Parser)]
#[command(name = "homedeck", version, about)]
struct Cli {
    /// WebSocket port the host listens on
    #[arg(long = "port")]
    port: u16,

    /// Identifier to register with
    #[arg(long = "pluginUUID")]
    plugin_uuid: String,

    /// Event name of the registration message
    #[arg(long = "registerEvent")]
    register_event: String,

    /// Host and device description (JSON)
    #[arg(long = "info")]
    info: Option<String>,

    /// Path to a TOML config file
    #[arg(long = "config")]
    config: Option<PathBuf>,
}

const LONG_FLAGS: &[&str] = &["port", "pluginUUID", "registerEvent", "info", "config"];

/// The host launches plugins with single-dash long flags (`-port 28196`).
fn normalize_args(args: impl IntoIterator<Item = String>) -> Vec<String> {
    args.into_iter()
        .map(|arg| {
            let host_flag = arg
                .strip_prefix('-')
                .is_some_and(|name| LONG_FLAGS.contains(&name));
            if host_flag { format!("-{}", arg) } else { arg }
        })
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_from(normalize_args(std::env::args()));
    let config = Config::load(cli.config.as_deref())?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(config.logging.filter())
        .init();

    info!("homedeck {} starting", env!("CARGO_PKG_VERSION"));
    if let Some(path) = &cli.config {
        info!("Loaded config from: {}", path.display());
    }
    if let Some(host_info) = &cli.info {
        debug!("Host info: {}", host_info);
    }

    let ctx = ActionContext {
        factory: http_factory(),
        endpoint: config.endpoint(),
        timing: config.timing(),
    };

    // Registration must not wait on the control server.
    let probe = HttpControlClient::new(ctx.endpoint.clone())
        .context("failed to build control client")?;
    let endpoint = ctx.endpoint.clone();
    tokio::spawn(async move {
        if probe.is_available().await {
            info!("Control server reachable at {}", endpoint);
        } else {
            warn!(
                "Control server not reachable at {}, buttons update once it is",
                endpoint
            );
        }
    });

    let plugin = Plugin::new(ActionRegistry::from_context(&ctx));
    let args = PluginArgs {
        port: cli.port,
        plugin_uuid: cli.plugin_uuid,
        register_event: cli.register_event,
    };

    tokio::select! {
        result = plugin.run(args) => result.context("host connection failed")?,
        _ = tokio::signal::ctrl_c() => info!("Interrupted, shutting down"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_normalize_host_flags() {
        let normalized = normalize_args(args(
            "homedeck -port 28196 -pluginUUID com.homedeck -registerEvent registerPlugin -info {}",
        ));
        assert_eq!(
            normalized,
            args("homedeck --port 28196 --pluginUUID com.homedeck --registerEvent registerPlugin --info {}")
        );

        let cli = Cli::parse_from(normalized);
        assert_eq!(cli.port, 28196);
        assert_eq!(cli.plugin_uuid, "com.homedeck");
        assert_eq!(cli.register_event, "registerPlugin");
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_unknown_flags_are_left_alone() {
        let normalized = normalize_args(args("homedeck --port 1 -v -portal"));
        assert_eq!(normalized, args("homedeck --port 1 -v -portal"));
    }
}
