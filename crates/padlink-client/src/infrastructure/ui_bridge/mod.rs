//! Command bridge between the link and a front end.
//!
//! A front end (tray menu, webview, CLI prompt) never talks to the link
//! session directly.  It reads [`AppState`], which
//! [`spawn_state_updater`] keeps current from the link's notifications, and
//! it issues the command functions below.
//!
//! # `CommandResult<T>`
//!
//! All commands return `CommandResult<T>`, a unified envelope:
//! ```json
//! { "success": true,  "data": {...}, "error": null  }
//! { "success": false, "data": null,  "error": "..."  }
//! ```
//!
//! `AppState` uses `tokio::sync::Mutex` because the command handlers are
//! `async` and may hold a guard across an `.await`.

use std::collections::VecDeque;
use std::sync::Arc;

use padlink_core::ButtonEvent;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::application::notify::{LinkNotification, LinkState, LogEntry, Notifier};
use crate::infrastructure::link::LinkHandle;
use crate::infrastructure::storage::SettingsStore;

/// How many log entries the UI keeps.
pub const LOG_HISTORY: usize = 200;

// ── Shared application state ──────────────────────────────────────────────────

/// What the UI shows, derived from link notifications.
pub struct AppState {
    pub link_state: Mutex<LinkState>,
    /// Why the link last went down, if it did.
    pub last_reason: Mutex<Option<String>>,
    /// Most recent log entries, oldest first, at most [`LOG_HISTORY`].
    pub recent_logs: Mutex<VecDeque<LogEntry>>,
    pub last_button: Mutex<Option<ButtonEvent>>,
}

impl AppState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Folds one notification into the state.
    pub async fn apply(&self, notification: LinkNotification) {
        match notification {
            LinkNotification::Status { state, reason } => {
                *self.link_state.lock().await = state;
                if state == LinkState::Disconnected {
                    *self.last_reason.lock().await = reason;
                }
            }
            LinkNotification::Log(entry) => {
                let mut logs = self.recent_logs.lock().await;
                if logs.len() == LOG_HISTORY {
                    logs.pop_front();
                }
                logs.push_back(entry);
            }
            LinkNotification::ButtonPressed { event, .. } => {
                *self.last_button.lock().await = Some(event);
            }
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            link_state: Mutex::new(LinkState::Disconnected),
            last_reason: Mutex::new(None),
            recent_logs: Mutex::new(VecDeque::with_capacity(LOG_HISTORY)),
            last_button: Mutex::new(None),
        }
    }
}

/// Keeps `state` in sync with the link until the notifier is dropped.
pub fn spawn_state_updater(
    state: Arc<AppState>,
    mut rx: broadcast::Receiver<LinkNotification>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(notification) => state.apply(notification).await,
                Err(RecvError::Lagged(missed)) => {
                    warn!(missed, "UI state fell behind link notifications");
                }
                Err(RecvError::Closed) => break,
            }
        }
        debug!("UI state updater stopped");
    })
}

// ── DTOs ──────────────────────────────────────────────────────────────────────

/// Status snapshot for the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkStatusDto {
    /// `"disconnected"`, `"connecting"` or `"connected"`.
    pub state: String,
    pub reason: Option<String>,
    pub controller_host: String,
    pub last_button: Option<ButtonEvent>,
}

/// Settings that can be read and written from the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsDto {
    pub controller_host: String,
    pub autostart: bool,
}

/// Unified response wrapper for commands.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResult<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> CommandResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

/// Returns the current link status.
pub async fn get_link_status(
    state: Arc<AppState>,
    store: Arc<SettingsStore>,
) -> CommandResult<LinkStatusDto> {
    let link_state = *state.link_state.lock().await;
    let reason = state.last_reason.lock().await.clone();
    let last_button = *state.last_button.lock().await;

    CommandResult::ok(LinkStatusDto {
        state: link_state.to_string(),
        reason,
        controller_host: store.controller_host(),
        last_button,
    })
}

/// Returns the retained log history, oldest first.
pub async fn get_recent_logs(state: Arc<AppState>) -> CommandResult<Vec<LogEntry>> {
    let logs = state.recent_logs.lock().await;
    CommandResult::ok(logs.iter().cloned().collect())
}

/// Returns the editable settings.
pub async fn get_settings(store: Arc<SettingsStore>) -> CommandResult<SettingsDto> {
    CommandResult::ok(SettingsDto {
        controller_host: store.controller_host(),
        autostart: store.autostart(),
    })
}

/// Applies and persists new settings.
///
/// A new controller host takes effect on the next connection attempt; an
/// established connection is left alone.
pub async fn update_settings(
    store: Arc<SettingsStore>,
    notifier: Notifier,
    settings: SettingsDto,
) -> CommandResult<()> {
    let host = settings.controller_host.trim();
    if host.is_empty() {
        return CommandResult::err("controller_host must not be empty");
    }
    if host.contains(char::is_whitespace) || host.contains('/') {
        return CommandResult::err("controller_host must be a bare hostname or IP address");
    }

    if host != store.controller_host() {
        if let Err(e) = store.set_controller_host(host) {
            return CommandResult::err(e.to_string());
        }
        notifier.info(format!("controller address changed to {host}"));
    }
    if settings.autostart != store.autostart() {
        if let Err(e) = store.set_autostart(settings.autostart) {
            return CommandResult::err(e.to_string());
        }
        let verb = if settings.autostart { "enabled" } else { "disabled" };
        notifier.info(format!("autostart {verb}"));
    }

    CommandResult::ok(())
}

/// Asks the link to connect.
pub async fn connect_link(link: LinkHandle) -> CommandResult<()> {
    match link.connect().await {
        Ok(()) => CommandResult::ok(()),
        Err(e) => CommandResult::err(e.to_string()),
    }
}

/// Asks the link to disconnect and stop retrying.
pub async fn disconnect_link(link: LinkHandle) -> CommandResult<()> {
    match link.disconnect().await {
        Ok(()) => CommandResult::ok(()),
        Err(e) => CommandResult::err(e.to_string()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::input_injection::RecordingInjector;
    use crate::infrastructure::link::{DeviceLink, Endpoint, LinkConfig, WsConnector};
    use crate::infrastructure::storage::config::AppConfig;

    fn make_store() -> Arc<SettingsStore> {
        Arc::new(SettingsStore::in_memory(AppConfig::default()))
    }

    fn spawn_idle_link() -> LinkHandle {
        let (handle, _task) = DeviceLink::spawn(
            LinkConfig::default(),
            Arc::new(WsConnector),
            Arc::new(Endpoint::new("127.0.0.1")),
            Arc::new(RecordingInjector::new()),
            Notifier::default(),
        );
        handle
    }

    #[tokio::test]
    async fn test_status_is_disconnected_initially() {
        // Arrange
        let state = AppState::new();

        // Act
        let result = get_link_status(state, make_store()).await;

        // Assert
        assert!(result.success);
        let dto = result.data.unwrap();
        assert_eq!(dto.state, "disconnected");
        assert_eq!(dto.controller_host, "192.168.2.235");
        assert!(dto.last_button.is_none());
    }

    #[tokio::test]
    async fn test_apply_tracks_status_reason_and_button() {
        // Arrange
        let state = AppState::new();

        // Act
        state
            .apply(LinkNotification::Status {
                state: LinkState::Disconnected,
                reason: Some("connection refused".to_string()),
            })
            .await;
        state
            .apply(LinkNotification::ButtonPressed {
                raw: "{}".to_string(),
                event: ButtonEvent { key: 4, modifier: 1 },
            })
            .await;

        // Assert
        let dto = get_link_status(Arc::clone(&state), make_store())
            .await
            .data
            .unwrap();
        assert_eq!(dto.reason.as_deref(), Some("connection refused"));
        assert_eq!(dto.last_button, Some(ButtonEvent { key: 4, modifier: 1 }));
    }

    #[tokio::test]
    async fn test_log_history_is_bounded() {
        // Arrange
        let state = AppState::new();

        // Act
        for i in 0..(LOG_HISTORY + 25) {
            state
                .apply(LinkNotification::Log(LogEntry::now(format!("line {i}"))))
                .await;
        }

        // Assert
        let logs = get_recent_logs(state).await.data.unwrap();
        assert_eq!(logs.len(), LOG_HISTORY);
        assert_eq!(logs[0].message, "line 25");
        assert_eq!(logs[LOG_HISTORY - 1].message, format!("line {}", LOG_HISTORY + 24));
    }

    #[tokio::test]
    async fn test_state_updater_follows_notifier() {
        // Arrange
        let notifier = Notifier::new(16);
        let state = AppState::new();
        let updater = spawn_state_updater(Arc::clone(&state), notifier.subscribe());

        // Act
        notifier.status(LinkState::Connecting, None);
        drop(notifier);
        updater.await.unwrap();

        // Assert
        assert_eq!(*state.link_state.lock().await, LinkState::Connecting);
    }

    #[tokio::test]
    async fn test_update_settings_changes_host_and_logs() {
        // Arrange
        let store = make_store();
        let notifier = Notifier::new(16);
        let mut rx = notifier.subscribe();

        // Act
        let result = update_settings(
            Arc::clone(&store),
            notifier,
            SettingsDto {
                controller_host: " 10.0.0.9 ".to_string(),
                autostart: true,
            },
        )
        .await;

        // Assert
        assert!(result.success);
        assert_eq!(store.controller_host(), "10.0.0.9");
        match rx.recv().await.unwrap() {
            LinkNotification::Log(entry) => {
                assert_eq!(entry.message, "controller address changed to 10.0.0.9")
            }
            other => panic!("unexpected notification {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_settings_rejects_empty_host() {
        // Arrange
        let store = make_store();

        // Act
        let result = update_settings(
            Arc::clone(&store),
            Notifier::default(),
            SettingsDto {
                controller_host: "   ".to_string(),
                autostart: true,
            },
        )
        .await;

        // Assert
        assert!(!result.success);
        assert!(result.error.is_some());
        assert_eq!(store.controller_host(), "192.168.2.235");
    }

    #[tokio::test]
    async fn test_update_settings_rejects_url_as_host() {
        let result = update_settings(
            make_store(),
            Notifier::default(),
            SettingsDto {
                controller_host: "ws://10.0.0.9:8081".to_string(),
                autostart: true,
            },
        )
        .await;
        assert!(!result.success);
    }

    #[tokio::test]
    async fn test_get_settings_reflects_autostart_change() {
        // Arrange
        let store = make_store();
        let dto = SettingsDto {
            controller_host: "192.168.2.235".to_string(),
            autostart: false,
        };

        // Act
        update_settings(Arc::clone(&store), Notifier::default(), dto).await;
        let settings = get_settings(store).await.data.unwrap();

        // Assert
        assert!(!settings.autostart);
    }

    #[tokio::test]
    async fn test_disconnect_command_succeeds_on_idle_link() {
        let link = spawn_idle_link();
        assert!(disconnect_link(link).await.success);
    }

    #[tokio::test]
    async fn test_connect_command_reports_stopped_link() {
        // Arrange
        let link = spawn_idle_link();
        link.shutdown().await.unwrap();
        tokio::task::yield_now().await;

        // Act – the session may need a moment to drop its queue
        let mut result = connect_link(link.clone()).await;
        for _ in 0..100 {
            if !result.success {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            result = connect_link(link.clone()).await;
        }

        // Assert
        assert!(!result.success);
        assert_eq!(result.error.unwrap(), "link session has stopped");
    }

    #[test]
    fn test_command_result_ok_and_err() {
        let ok: CommandResult<u32> = CommandResult::ok(7);
        assert!(ok.success);
        assert_eq!(ok.data, Some(7));

        let err: CommandResult<u32> = CommandResult::err("nope");
        assert!(!err.success);
        assert_eq!(err.error.as_deref(), Some("nope"));
    }
}
