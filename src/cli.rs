//! CLI definitions for ymdeck.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Flags the Stream Deck host passes with a single dash.
const HOST_FLAGS: [&str; 6] = [
    "port",
    "pluginUUID",
    "registerEvent",
    "info",
    "propertyInspectorUUID",
    "actionInfo",
];

/// ymdeck CLI.
///
/// Without a subcommand the process runs as the plugin; the host supplies
/// the connection arguments.
#[derive(Parser, Debug)]
#[command(name = "ymdeck")]
#[command(about = "Stream Deck plugin for the Yandex Music desktop client")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: ymdeck.toml in the working directory, if present)
    #[arg(short, long, global = true, env = "YMDECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Host WebSocket port
    #[arg(long)]
    pub port: Option<u16>,

    /// Plugin instance uuid assigned by the host
    #[arg(long = "pluginUUID")]
    pub plugin_uuid: Option<String>,

    /// Registration event name
    #[arg(long = "registerEvent")]
    pub register_event: Option<String>,

    /// Host and device info (JSON)
    #[arg(long)]
    pub info: Option<String>,

    /// Plugin directory holding static/img (default: the executable's directory)
    #[arg(long, env = "YMDECK_PLUGIN_DIR")]
    pub plugin_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Run a headless property inspector session against the host
    Inspect(InspectArgs),
}

#[derive(clap::Args, Debug)]
pub(crate) struct InspectArgs {
    /// Host WebSocket port
    #[arg(long)]
    pub port: u16,

    /// Property inspector uuid
    #[arg(long = "propertyInspectorUUID")]
    pub uuid: String,

    /// Registration event name
    #[arg(long = "registerEvent", default_value = "registerPropertyInspector")]
    pub register_event: String,

    /// Host info (JSON, must carry pluginUUID)
    #[arg(long, default_value = "")]
    pub info: String,

    /// The inspected action (JSON)
    #[arg(long = "actionInfo")]
    pub action_info: String,

    /// Change a button setting; VALUE is parsed as JSON, else taken as text
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub set: Vec<(String, String)>,

    /// Validate a token and save it if accepted
    #[arg(long)]
    pub token: Option<String>,

    /// Save the local player port
    #[arg(long)]
    pub local_port: Option<String>,

    /// Copy this button's control mode to every button
    #[arg(long)]
    pub apply_mode_to_all: bool,

    /// How long to listen for host messages, in milliseconds
    #[arg(long, default_value_t = 1500)]
    pub wait_ms: u64,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got `{}`", raw)),
    }
}

/// Rewrite `-port` style host flags to `--port` so clap accepts them.
pub(crate) fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| match arg.to_str().and_then(|s| s.strip_prefix('-')) {
            Some(name) if HOST_FLAGS.contains(&name) => OsString::from(format!("--{}", name)),
            _ => arg,
        })
        .collect()
}
