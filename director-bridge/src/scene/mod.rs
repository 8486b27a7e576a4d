//! Director scenes and how they map onto viewer applications

pub mod router;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use router::{GroupOutcome, SceneGroups, SceneOutcome, SceneRouter};

/// Activity name the director uses for Street View windows
pub const ACTIVITY_STREETVIEW: &str = "streetview";
/// Activity name the director uses for panorama windows
pub const ACTIVITY_PANO: &str = "pano";

/// A scene published by the director
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub windows: Vec<Window>,
}

/// A single window of a scene
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Window {
    pub activity: String,
}

impl Scene {
    /// Decode a scene from a bus message
    pub fn from_json(message: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(message)
    }
}

/// Viewer application that should own the display for a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneApp {
    Earth,
    Streetview,
    Panoviewer,
}

impl SceneApp {
    pub const ALL: [SceneApp; 3] = [SceneApp::Earth, SceneApp::Streetview, SceneApp::Panoviewer];

    /// Pick the application for a scene.
    ///
    /// Any Street View window wins, then any panorama window; everything
    /// else is Earth.
    pub fn for_scene(scene: &Scene) -> Self {
        if scene.windows.iter().any(|w| w.activity == ACTIVITY_STREETVIEW) {
            SceneApp::Streetview
        } else if scene.windows.iter().any(|w| w.activity == ACTIVITY_PANO) {
            SceneApp::Panoviewer
        } else {
            SceneApp::Earth
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SceneApp::Earth => "Earth",
            SceneApp::Streetview => "Street View",
            SceneApp::Panoviewer => "Pano Viewer",
        }
    }
}

impl fmt::Display for SceneApp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
