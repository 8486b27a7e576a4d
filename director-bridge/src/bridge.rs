//! Scene bridge
//!
//! Drains the command queue one message at a time: `scene` messages are
//! decoded and routed, everything else is logged and ignored.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::api::{BridgeCommand, SharedStateHandle, WsEvent};
use crate::master::GroupControl;
use crate::scene::{Scene, SceneGroups, SceneOutcome, SceneRouter};

/// Channel carrying director scene changes
pub const SCENE_CHANNEL: &str = "scene";

/// What happened to one inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    Routed(SceneOutcome),
    /// Not the scene channel
    Ignored,
    /// Scene payload could not be decoded
    Dropped(String),
}

pub struct SceneBridge<C: ?Sized> {
    router: SceneRouter<C>,
    state: SharedStateHandle,
}

impl<C: GroupControl + ?Sized> SceneBridge<C> {
    pub fn new(control: Arc<C>, groups: SceneGroups, state: SharedStateHandle) -> Self {
        Self {
            router: SceneRouter::new(control, groups),
            state,
        }
    }

    /// Process queued commands until every sender is gone
    pub async fn run(self, mut commands: mpsc::Receiver<BridgeCommand>) {
        tracing::info!(
            earth = %self.router.groups().earth,
            streetview = %self.router.groups().streetview,
            panoviewer = %self.router.groups().panoviewer,
            "Scene bridge running"
        );

        while let Some(cmd) = commands.recv().await {
            self.handle_command(cmd).await;
        }

        tracing::info!("Scene bridge stopped");
    }

    pub async fn handle_command(&self, cmd: BridgeCommand) {
        match cmd {
            BridgeCommand::Input { channel, message } => {
                self.handle_input(&channel, message).await;
            }
            BridgeCommand::RefreshGroups => {
                self.router.control().refresh_groups().await;
            }
        }
    }

    /// Handle one message from the bus
    pub async fn handle_input(&self, channel: &str, message: serde_json::Value) -> InputOutcome {
        tracing::info!(channel, "Got a message");
        tracing::debug!(channel, message = %message, "Message body");

        if channel != SCENE_CHANNEL {
            self.state.update_snapshot(|snap| snap.stats.messages_ignored += 1);
            return InputOutcome::Ignored;
        }

        let scene = match Scene::from_json(message) {
            Ok(scene) => scene,
            Err(e) => {
                tracing::error!(error = %e, "Error while parsing scene message");
                let reason = e.to_string();
                self.state.update_snapshot(|snap| snap.stats.messages_dropped += 1);
                self.state.broadcast(WsEvent::MessageDropped {
                    channel: channel.to_string(),
                    reason: reason.clone(),
                });
                return InputOutcome::Dropped(reason);
            }
        };

        tracing::info!(scene = %scene.name, windows = scene.windows.len(), "Handling scene");
        let outcome = self.router.route(&scene).await;

        self.state.update_snapshot(|snap| {
            snap.stats.record_scene(&outcome);
            snap.last_scene = Some(outcome.clone());
        });
        self.state.broadcast(WsEvent::SceneHandled(outcome.clone()));

        InputOutcome::Routed(outcome)
    }
}
