//! Scene routing: one group up, the other two down

use std::sync::Arc;

use serde::Serialize;

use super::{Scene, SceneApp};
use crate::master::{GroupCommand, GroupControl};

/// Live activity group names for each viewer application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneGroups {
    pub earth: String,
    pub streetview: String,
    pub panoviewer: String,
}

impl SceneGroups {
    pub fn group_for(&self, app: SceneApp) -> &str {
        match app {
            SceneApp::Earth => &self.earth,
            SceneApp::Streetview => &self.streetview,
            SceneApp::Panoviewer => &self.panoviewer,
        }
    }
}

/// Result of one group command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupOutcome {
    pub group: String,
    pub command: GroupCommand,
    /// Error text if the command failed
    pub error: Option<String>,
}

impl GroupOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// What routing a scene did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SceneOutcome {
    pub scene: String,
    pub app: SceneApp,
    pub groups: Vec<GroupOutcome>,
}

impl SceneOutcome {
    pub fn failures(&self) -> impl Iterator<Item = &GroupOutcome> {
        self.groups.iter().filter(|g| !g.succeeded())
    }
}

/// Commands for a scene: target activated first, then the others
/// deactivated in fixed order
pub fn plan(app: SceneApp) -> [(SceneApp, GroupCommand); 3] {
    let mut plan = [(app, GroupCommand::Activate); 3];
    let others = SceneApp::ALL.into_iter().filter(|other| *other != app);
    for (step, other) in plan.iter_mut().skip(1).zip(others) {
        *step = (other, GroupCommand::Deactivate);
    }
    plan
}

/// Activates the group for a scene's application and deactivates the rest
pub struct SceneRouter<C: ?Sized> {
    control: Arc<C>,
    groups: SceneGroups,
}

impl<C: GroupControl + ?Sized> SceneRouter<C> {
    pub fn new(control: Arc<C>, groups: SceneGroups) -> Self {
        Self { control, groups }
    }

    pub fn control(&self) -> &Arc<C> {
        &self.control
    }

    pub fn groups(&self) -> &SceneGroups {
        &self.groups
    }

    /// Route a scene. Every planned command is attempted even if earlier
    /// ones fail.
    pub async fn route(&self, scene: &Scene) -> SceneOutcome {
        let app = SceneApp::for_scene(scene);
        tracing::info!(scene = %scene.name, %app, "{} scene", app);

        let mut outcomes = Vec::with_capacity(3);
        for (target, command) in plan(app) {
            let group = self.groups.group_for(target);
            let error = match self.control.set_group_state(group, command).await {
                Ok(()) => None,
                Err(e) => {
                    tracing::error!(%command, group, error = %e, "Could not {} a live activity group", command);
                    Some(e.to_string())
                }
            };
            outcomes.push(GroupOutcome {
                group: group.to_string(),
                command,
                error,
            });
        }

        SceneOutcome {
            scene: scene.name.clone(),
            app,
            groups: outcomes,
        }
    }
}
