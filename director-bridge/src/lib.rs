//! Director Bridge Library
//!
//! Listens for director scene messages and switches the Earth, Street View
//! and panorama live activity groups on an Interactive Spaces master so that
//! exactly one viewer is active per scene.

pub mod api;
pub mod bridge;
pub mod master;
pub mod scene;
pub mod settings;
pub mod telemetry;

pub use bridge::{InputOutcome, SceneBridge, SCENE_CHANNEL};
pub use master::{GroupCommand, GroupControl, MasterApi, MasterApiConfig, MasterError};
pub use scene::{Scene, SceneApp, SceneGroups, SceneOutcome, SceneRouter};
pub use settings::{BridgeSettings, SettingsError};
