//! Master API client
//!
//! Resolves live activity group names to ids and activates/deactivates them
//! through the Interactive Spaces master's JSON endpoints.

pub mod cache;
pub mod client;
pub mod error;
pub mod listing;

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;

pub use cache::GroupCache;
pub use client::{MasterApi, MasterApiConfig};
pub use error::{LookupError, MasterError, TransportError};
pub use listing::{GroupListing, LiveActivityGroup};

/// Entity path segment for live activity groups
pub const ENTITY_LIVE_ACTIVITY_GROUP: &str = "liveactivitygroup";
/// Command segment for the full group listing
pub const COMMAND_LIST: &str = "all";
/// Extension appended to every master request
pub const REQUEST_EXT: &str = ".json";

/// Command applied to a live activity group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupCommand {
    Activate,
    Deactivate,
}

impl GroupCommand {
    /// URL segment understood by the master
    pub fn segment(&self) -> &'static str {
        match self {
            GroupCommand::Activate => "activate",
            GroupCommand::Deactivate => "deactivate",
        }
    }
}

impl fmt::Display for GroupCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

/// Anything that can switch live activity groups on and off by name
#[async_trait]
pub trait GroupControl: Send + Sync {
    async fn set_group_state(&self, name: &str, command: GroupCommand) -> Result<(), MasterError>;

    /// Drop any cached name lookups
    async fn refresh_groups(&self) {}
}
