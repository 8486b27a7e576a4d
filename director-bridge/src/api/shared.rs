//! Shared state between the API server and the scene bridge
//!
//! API handlers never talk to the master themselves: they queue
//! [`BridgeCommand`]s for the bridge task and read the snapshot it publishes.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::{broadcast, mpsc};

use crate::scene::SceneOutcome;

/// Commands queued for the scene bridge
#[derive(Debug, Clone)]
pub enum BridgeCommand {
    /// A message arrived on a bus channel
    Input { channel: String, message: serde_json::Value },
    /// Forget the cached group listing
    RefreshGroups,
}

/// Running totals kept by the bridge
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BridgeStats {
    pub scenes_handled: u64,
    /// Messages on channels other than `scene`
    pub messages_ignored: u64,
    /// Scene messages that could not be decoded
    pub messages_dropped: u64,
    pub group_commands_ok: u64,
    pub group_commands_failed: u64,
}

impl BridgeStats {
    /// Fold one routed scene into the totals
    pub fn record_scene(&mut self, outcome: &SceneOutcome) {
        self.scenes_handled += 1;
        let failed = outcome.failures().count() as u64;
        self.group_commands_failed += failed;
        self.group_commands_ok += outcome.groups.len() as u64 - failed;
    }
}

/// Snapshot of bridge state for API reads
#[derive(Debug, Clone, Default, Serialize)]
pub struct BridgeSnapshot {
    pub stats: BridgeStats,
    pub last_scene: Option<SceneOutcome>,
}

/// WebSocket event types sent to connected clients
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum WsEvent {
    /// Full state snapshot (sent on connect)
    #[serde(rename = "snapshot")]
    Snapshot(BridgeSnapshot),
    /// A scene was routed
    #[serde(rename = "scene_handled")]
    SceneHandled(SceneOutcome),
    /// A scene message could not be decoded
    #[serde(rename = "message_dropped")]
    MessageDropped { channel: String, reason: String },
}

/// Shared state accessible by API handlers
pub struct SharedState {
    /// Published by the bridge after each message
    pub snapshot: RwLock<BridgeSnapshot>,
    /// Channel to queue commands for the bridge
    pub command_tx: mpsc::Sender<BridgeCommand>,
    /// Broadcast channel for WebSocket events
    pub ws_tx: broadcast::Sender<WsEvent>,
    started_at: Instant,
}

impl SharedState {
    /// Create new shared state with a command channel sender
    pub fn new(command_tx: mpsc::Sender<BridgeCommand>) -> Self {
        let (ws_tx, _) = broadcast::channel(64);
        Self {
            snapshot: RwLock::new(BridgeSnapshot::default()),
            command_tx,
            ws_tx,
            started_at: Instant::now(),
        }
    }

    /// Get a clone of the current snapshot
    pub fn get_snapshot(&self) -> BridgeSnapshot {
        self.snapshot.read().clone()
    }

    /// Modify the snapshot in place
    pub fn update_snapshot(&self, f: impl FnOnce(&mut BridgeSnapshot)) {
        f(&mut self.snapshot.write());
    }

    /// Queue a command for the bridge without waiting for room
    pub fn send_command(&self, cmd: BridgeCommand) -> Result<(), mpsc::error::TrySendError<BridgeCommand>> {
        self.command_tx.try_send(cmd)
    }

    /// Subscribe to WebSocket events
    pub fn subscribe(&self) -> broadcast::Receiver<WsEvent> {
        self.ws_tx.subscribe()
    }

    /// Broadcast an event to all WebSocket clients
    pub fn broadcast(&self, event: WsEvent) {
        // No subscribers is fine
        let _ = self.ws_tx.send(event);
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

/// Type alias for the shared state handle used by API handlers
pub type SharedStateHandle = Arc<SharedState>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::master::GroupCommand;
    use crate::scene::{GroupOutcome, SceneApp};

    fn outcome(failed: usize) -> SceneOutcome {
        SceneOutcome {
            scene: "s".to_string(),
            app: SceneApp::Earth,
            groups: (0..3)
                .map(|i| GroupOutcome {
                    group: format!("g{}", i),
                    command: if i == 0 { GroupCommand::Activate } else { GroupCommand::Deactivate },
                    error: (i < failed).then(|| "boom".to_string()),
                })
                .collect(),
        }
    }

    #[test]
    fn test_record_scene_counts_commands() {
        let mut stats = BridgeStats::default();
        stats.record_scene(&outcome(0));
        stats.record_scene(&outcome(2));
        assert_eq!(stats.scenes_handled, 2);
        assert_eq!(stats.group_commands_ok, 4);
        assert_eq!(stats.group_commands_failed, 2);
    }

    #[test]
    fn test_ws_event_shape() {
        let event = WsEvent::MessageDropped {
            channel: "scene".to_string(),
            reason: "bad".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "message_dropped");
        assert_eq!(json["data"]["channel"], "scene");
    }

    #[test]
    fn test_update_snapshot() {
        let (tx, _rx) = mpsc::channel(4);
        let state = SharedState::new(tx);
        state.update_snapshot(|snap| snap.stats.messages_ignored += 1);
        assert_eq!(state.get_snapshot().stats.messages_ignored, 1);
    }
}
