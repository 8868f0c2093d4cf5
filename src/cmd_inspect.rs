//! `ymdeck inspect`: a property inspector session without the HTML panel.

use std::time::Duration;

use anyhow::Context;
use serde_json::Value;
use tokio::time::Instant;
use tracing::{info, warn};
use ymdeck_config::Config;
use ymdeck_inspector::{
    InspectorLaunch, InspectorSession, InspectorState, InspectorUpdate, StatusTarget, TokenValidator,
    mode_description,
};
use ymdeck_protocols::{ActionInfo, LaunchInfo};

use crate::cli::InspectArgs;

/// Setting values are JSON when they parse as JSON, plain text otherwise.
fn setting_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

pub(crate) async fn handle_inspect_command(args: InspectArgs, config: &Config) -> anyhow::Result<()> {
    let launch = InspectorLaunch {
        port: args.port,
        uuid: args.uuid,
        register_event: args.register_event,
        info: LaunchInfo::parse(&args.info).context("invalid --info")?,
        action_info: ActionInfo::parse(&args.action_info).context("invalid --actionInfo")?,
    };
    let session = InspectorSession::connect(launch)
        .await
        .context("cannot reach the Stream Deck host")?;
    let mut updates = session.subscribe();

    if let Some(panel) = session.panel() {
        println!("Panel: {:?} ({})", panel, panel.keys().join(", "));
    }

    for (key, raw) in &args.set {
        session.set_setting(key, setting_value(raw))?;
        println!("Set {} = {}", key, raw);
    }
    if let Some(port) = &args.local_port {
        session.update_local_port(port.trim())?;
        println!("Local port saved: {}", port.trim());
    }
    if args.apply_mode_to_all {
        session.apply_mode_to_all()?;
        println!("Mode sent to every button");
    }
    if let Some(token) = &args.token {
        let validator = TokenValidator::new(&config.token.check_url, config.token.timeout())?;
        let check = session.save_token(&validator, token).await?;
        println!("{}", check.message());
    }

    let deadline = Instant::now() + Duration::from_millis(args.wait_ms);
    loop {
        let update = tokio::select! {
            _ = tokio::time::sleep_until(deadline) => break,
            update = updates.recv() => update,
        };
        match update {
            Ok(InspectorUpdate::Settings(_)) => info!("Settings updated"),
            Ok(InspectorUpdate::GlobalSettings(_)) => info!("Global settings updated"),
            Ok(InspectorUpdate::Status { target, status }) => {
                info!(?target, %status, "Status updated");
            }
            Err(e) => {
                warn!(error = %e, "Update stream ended");
                break;
            }
        }
    }

    print_state(&session.state());
    session.close().await?;
    Ok(())
}

fn print_state(state: &InspectorState) {
    println!("Mode: {} ({})", state.control_mode(), mode_description(state.control_mode()));
    println!(
        "Settings: {}",
        serde_json::to_string_pretty(&state.settings).unwrap_or_default()
    );
    println!("Global settings: {}", state.global.to_value());
    for (target, indicator) in [
        (StatusTarget::Local, state.local_indicator()),
        (StatusTarget::Token, state.token_indicator()),
    ] {
        if let Some(indicator) = indicator {
            println!("{:?} status: {}", target, indicator.text);
        }
    }
}
