//! ymdeck - Stream Deck plugin for the Yandex Music desktop client.
//!
//! Started by the Stream Deck host with `-port -pluginUUID -registerEvent
//! -info`; drives the player page over the client's DevTools endpoint.

mod cli;
mod cmd_inspect;
mod instance;
mod logging;

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use ymdeck_config::{Config, ConfigLoader, ConfigValidator};
use ymdeck_plugin::{HostSettings, PluginOptions, run_plugin};
use ymdeck_protocols::LaunchInfo;

use crate::cli::{Cli, Commands, normalize_args};
use crate::cmd_inspect::handle_inspect_command;
use crate::instance::{InstanceLock, default_pid_path};
use crate::logging::init_tracing;

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let cwd = std::env::current_dir().context("no working directory")?;
    let config = ConfigLoader::load_or_default(cli.config.as_deref(), &cwd)?;
    Ok(config)
}

/// The directory holding `static/img`: explicit, else next to the executable.
fn plugin_dir(cli: &Cli) -> anyhow::Result<PathBuf> {
    if let Some(dir) = &cli.plugin_dir {
        return Ok(dir.clone());
    }
    let exe = std::env::current_exe().context("cannot locate the executable")?;
    match exe.parent() {
        Some(dir) => Ok(dir.to_path_buf()),
        None => Ok(std::env::current_dir()?),
    }
}

/// Cancel `token` on Ctrl+C or, on unix, SIGTERM.
fn spawn_signal_handler(token: CancellationToken) {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => info!("Received Ctrl+C"),
                        _ = sigterm.recv() => info!("Received SIGTERM"),
                    }
                }
                Err(e) => {
                    warn!(error = %e, "SIGTERM handler unavailable");
                    let _ = tokio::signal::ctrl_c().await;
                    info!("Received Ctrl+C");
                }
            }
        }
        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
            info!("Received Ctrl+C");
        }
        token.cancel();
    });
}

async fn run_as_plugin(cli: Cli, config: Config) -> anyhow::Result<()> {
    let (Some(port), Some(plugin_uuid), Some(register_event)) =
        (cli.port, cli.plugin_uuid.as_deref(), cli.register_event.as_deref())
    else {
        bail!("missing host arguments: -port, -pluginUUID and -registerEvent are required");
    };

    let launch = LaunchInfo::parse(cli.info.as_deref().unwrap_or_default()).unwrap_or_else(|e| {
        warn!(error = %e, "Ignoring malformed -info");
        LaunchInfo::default()
    });
    info!(
        version = env!("CARGO_PKG_VERSION"),
        host_version = %launch.application.version,
        platform = %launch.application.platform,
        port,
        "Starting ymdeck plugin"
    );

    let _lock = match InstanceLock::acquire(&default_pid_path()) {
        Ok(lock) => Some(lock),
        Err(e) => {
            warn!(error = %e, "Running without instance lock");
            None
        }
    };

    let options = PluginOptions {
        host: HostSettings::from_config(port, register_event, plugin_uuid, &config.host),
        plugin_dir: plugin_dir(&cli)?,
        config,
    };

    let cancel = CancellationToken::new();
    spawn_signal_handler(cancel.clone());
    run_plugin(options, cancel).await?;
    info!("ymdeck stopped");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));
    let config = load_config(&cli)?;
    init_tracing(&config.logging)?;

    match ConfigValidator::validate(&config)?.into_result() {
        Ok(warnings) => {
            for warning in warnings {
                warn!(path = %warning.path, "{}", warning.message);
            }
        }
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    }

    match cli.command {
        Some(Commands::Inspect(args)) => handle_inspect_command(args, &config).await,
        None => run_as_plugin(cli, config).await,
    }
}
