//! Live activity group listing as returned by `liveactivitygroup/all.json`

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of the master's group listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiveActivityGroup {
    pub id: i64,
    pub name: String,
}

/// The master sends ids as strings, older builds as numbers
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

#[derive(Deserialize)]
struct RawGroup {
    id: RawId,
    name: String,
}

impl RawGroup {
    fn into_group(self) -> Option<LiveActivityGroup> {
        let id = match self.id {
            RawId::Number(id) => id,
            RawId::Text(text) => text.trim().parse().ok()?,
        };
        Some(LiveActivityGroup { id, name: self.name })
    }
}

/// Full group listing, in the order the master returned it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupListing {
    groups: Vec<LiveActivityGroup>,
}

impl GroupListing {
    pub fn new(groups: Vec<LiveActivityGroup>) -> Self {
        Self { groups }
    }

    /// Build a listing from the `data` field of a listing response.
    ///
    /// Returns `None` if `data` is not an array. Entries without a usable
    /// id or name are skipped.
    pub fn from_data(data: &Value) -> Option<Self> {
        let entries = data.as_array()?;
        let mut groups = Vec::with_capacity(entries.len());
        for entry in entries {
            match RawGroup::deserialize(entry).ok().and_then(RawGroup::into_group) {
                Some(group) => groups.push(group),
                None => tracing::warn!(entry = %entry, "Skipping unusable live activity group entry"),
            }
        }
        Some(Self { groups })
    }

    /// Id of the first group named exactly `name` with a positive id
    pub fn find_id(&self, name: &str) -> Option<i64> {
        self.groups
            .iter()
            .find(|group| group.id > 0 && group.name == name)
            .map(|group| group.id)
    }

    pub fn groups(&self) -> &[LiveActivityGroup] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_string_and_numeric_ids() {
        let data = json!([
            { "id": "3", "name": "Earth" },
            { "id": 7, "name": "StreetView" },
        ]);
        let listing = GroupListing::from_data(&data).unwrap();
        assert_eq!(listing.len(), 2);
        assert_eq!(listing.find_id("Earth"), Some(3));
        assert_eq!(listing.find_id("StreetView"), Some(7));
    }

    #[test]
    fn test_non_array_data_is_rejected() {
        assert!(GroupListing::from_data(&json!({ "id": 1 })).is_none());
        assert!(GroupListing::from_data(&Value::Null).is_none());
    }

    #[test]
    fn test_unusable_entries_are_skipped() {
        let data = json!([
            { "id": "abc", "name": "Broken" },
            { "name": "NoId" },
            { "id": 4 },
            { "id": "5", "name": "Pano" },
        ]);
        let listing = GroupListing::from_data(&data).unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing.find_id("Pano"), Some(5));
    }

    #[test]
    fn test_first_positive_exact_match_wins() {
        let listing = GroupListing::new(vec![
            LiveActivityGroup { id: 0, name: "Earth".to_string() },
            LiveActivityGroup { id: -4, name: "Earth".to_string() },
            LiveActivityGroup { id: 9, name: "earth".to_string() },
            LiveActivityGroup { id: 12, name: "Earth".to_string() },
            LiveActivityGroup { id: 15, name: "Earth".to_string() },
        ]);
        assert_eq!(listing.find_id("Earth"), Some(12));
        assert_eq!(listing.find_id("earth"), Some(9));
        assert_eq!(listing.find_id("EARTH"), None);
    }

    #[test]
    fn test_non_positive_ids_never_match() {
        let listing = GroupListing::new(vec![LiveActivityGroup { id: 0, name: "Pano".to_string() }]);
        assert_eq!(listing.find_id("Pano"), None);
    }
}
