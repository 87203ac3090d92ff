// SPDX-FileCopyrightText: 2026 Polling SDK Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `polling run` and `polling log-event`.
//!
//! `run` keeps the SDK alive until SIGINT/SIGTERM. Each stdin line is one
//! host command:
//!
//! ```text
//! {"origin": "https://app.polling.com", "data": {...}}   frame message
//! close                                                  user closed the popup
//! show <survey-id>                                       show a survey
//! embed                                                  show the embed view
//! event <name> [value]                                   log an event
//! status                                                 print SDK state
//! ```

use std::sync::Arc;

use polling_config::PollingConfig;
use polling_core::{PollingError, VisibilityState};
use polling_sdk::{Callbacks, FrameMessage, InitOptions, PollingSdk};
use polling_storage::SqliteKeyValueStore;
use serde::Deserialize;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::surface::TerminalSurface;

#[derive(Debug, Clone, PartialEq)]
enum HostCommand {
    Frame(FrameMessage),
    Dismiss,
    Show(String),
    Embed,
    Event { name: String, value: String },
    Status,
}

#[derive(Deserialize)]
struct FrameLine {
    origin: String,
    data: serde_json::Value,
}

fn parse_command(line: &str) -> Result<Option<HostCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    if line.starts_with('{') {
        let frame: FrameLine =
            serde_json::from_str(line).map_err(|e| format!("invalid frame message: {e}"))?;
        return Ok(Some(HostCommand::Frame(FrameMessage::new(frame.origin, frame.data))));
    }

    let mut words = line.split_whitespace();
    let command = match (words.next(), words.next()) {
        (Some("close" | "dismiss"), None) => HostCommand::Dismiss,
        (Some("embed"), None) => HostCommand::Embed,
        (Some("status"), None) => HostCommand::Status,
        (Some("show"), Some(id)) => HostCommand::Show(id.to_string()),
        (Some("event"), Some(name)) => HostCommand::Event {
            name: name.to_string(),
            value: words.collect::<Vec<_>>().join(" "),
        },
        _ => return Err(format!("unknown command: {line}")),
    };
    Ok(Some(command))
}

fn print_line(value: serde_json::Value) {
    println!("{value}");
}

fn host_callbacks() -> Callbacks {
    Callbacks::new()
        .on_success(|data| print_line(json!({"callback": "success", "data": data})))
        .on_failure(|message| print_line(json!({"callback": "failure", "message": message})))
        .on_reward(|reward| {
            print_line(json!({
                "callback": "reward",
                "amount": reward.amount,
                "name": reward.name,
                "session_id": reward.session_id,
                "completed_at": reward.completed_at.to_rfc3339(),
            }))
        })
        .on_survey_available(|| print_line(json!({"callback": "survey_available"})))
}

async fn build_sdk(config: &PollingConfig) -> Result<PollingSdk, PollingError> {
    let kv = Arc::new(SqliteKeyValueStore::open(&config.storage).await?);
    let surface = Arc::new(TerminalSurface::stdout());
    PollingSdk::from_config(config, kv, surface)
}

/// Cancels the returned token on SIGINT or SIGTERM.
fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => info!("received SIGINT, shutting down"),
                        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
                    }
                }
                Err(e) => {
                    warn!(error = %e, "failed to install SIGTERM handler");
                    let _ = tokio::signal::ctrl_c().await;
                    info!("received SIGINT, shutting down");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
            info!("received Ctrl+C, shutting down");
        }

        token_clone.cancel();
    });

    token
}

pub async fn run(config: &PollingConfig) -> Result<(), PollingError> {
    let sdk = build_sdk(config).await?;
    let cancel = install_signal_handler();

    sdk.initialize(InitOptions {
        callbacks: host_callbacks(),
        ..Default::default()
    })
    .await;
    let bridge = sdk.bridge_sender();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.next_line() => match line {
                Ok(Some(line)) => match parse_command(&line) {
                    Ok(Some(command)) => execute(&sdk, &bridge, command).await,
                    Ok(None) => {}
                    Err(message) => warn!(%message, "ignoring input line"),
                },
                Ok(None) => {
                    debug!("stdin closed, waiting for shutdown signal");
                    cancel.cancelled().await;
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "failed to read stdin");
                    cancel.cancelled().await;
                    break;
                }
            },
        }
    }

    sdk.shutdown().await;
    Ok(())
}

async fn execute(sdk: &PollingSdk, bridge: &mpsc::Sender<FrameMessage>, command: HostCommand) {
    match command {
        HostCommand::Frame(message) => {
            if bridge.send(message).await.is_err() {
                warn!("bridge listener is not running");
            }
        }
        HostCommand::Dismiss => {
            sdk.dismiss().await;
        }
        HostCommand::Show(id) => {
            let _ = sdk.show_survey(id);
        }
        HostCommand::Embed => {
            let _ = sdk.show_embed_view();
        }
        HostCommand::Event { name, value } => {
            // Failures already reached the failure callback.
            let _ = sdk.log_event(&name, &value).await;
        }
        HostCommand::Status => {
            let visibility = match sdk.visibility() {
                VisibilityState::Idle => "idle".to_string(),
                VisibilityState::Displaying(target) => target.to_string(),
            };
            print_line(json!({
                "status": {
                    "visibility": visibility,
                    "available_surveys": sdk.available_surveys().count(),
                    "triggered_surveys": sdk.triggered_surveys().await.len(),
                }
            }));
        }
    }
}

pub async fn log_event(config: &PollingConfig, name: &str, value: &str) -> Result<(), PollingError> {
    if config.credentials().is_none() {
        return Err(PollingError::Config(
            "account.customer_id and account.api_key must be set".into(),
        ));
    }
    let sdk = build_sdk(config).await?;
    let outcome = sdk.log_event(name, value).await?;
    for trigger in outcome.triggers() {
        print_line(json!({
            "triggered": trigger.survey.survey_uuid,
            "name": trigger.survey.name,
            "due_at": trigger.delayed_timestamp,
        }));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_frame_message_lines() {
        let line = r#"{"origin": "https://app.polling.com", "data": {"event": "survey.empty", "surveyUuid": "a"}}"#;
        let Some(HostCommand::Frame(message)) = parse_command(line).unwrap() else {
            panic!("expected frame message");
        };
        assert_eq!(message.origin, "https://app.polling.com");
        assert_eq!(message.data["surveyUuid"], "a");
    }

    #[test]
    fn parses_word_commands() {
        assert_eq!(parse_command("close").unwrap(), Some(HostCommand::Dismiss));
        assert_eq!(parse_command("  dismiss ").unwrap(), Some(HostCommand::Dismiss));
        assert_eq!(parse_command("embed").unwrap(), Some(HostCommand::Embed));
        assert_eq!(parse_command("status").unwrap(), Some(HostCommand::Status));
        assert_eq!(
            parse_command("show abc-123").unwrap(),
            Some(HostCommand::Show("abc-123".into()))
        );
        assert_eq!(
            parse_command("event Purchase 1299").unwrap(),
            Some(HostCommand::Event {
                name: "Purchase".into(),
                value: "1299".into()
            })
        );
        assert_eq!(
            parse_command("event Session").unwrap(),
            Some(HostCommand::Event {
                name: "Session".into(),
                value: String::new()
            })
        );
    }

    #[test]
    fn blank_and_unknown_lines() {
        assert_eq!(parse_command("   ").unwrap(), None);
        assert!(parse_command("show").is_err());
        assert!(parse_command("close now").is_err());
        assert!(parse_command("reboot").is_err());
        assert!(parse_command("{not json").is_err());
    }

    #[tokio::test]
    async fn log_event_requires_credentials() {
        let err = log_event(&PollingConfig::default(), "Session", "")
            .await
            .unwrap_err();
        assert!(matches!(err, PollingError::Config(_)));
    }
}
