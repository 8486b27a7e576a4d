//! Master API error types

use reqwest::StatusCode;

use super::GroupCommand;

/// A request to the Master API produced no usable response.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("master returned HTTP {status} for {url}")]
    Status { url: String, status: StatusCode },
    #[error("could not read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("response from {url} is not a JSON object")]
    NotAnObject { url: String },
}

/// Failure to map a group name onto a live activity group id
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// The group listing could not be fetched
    #[error("no response while fetching live activity groups: {0}")]
    NoResponse(#[from] TransportError),
    /// The listing came back but had no `data` array
    #[error("live activity group listing from {url} has no data array")]
    MalformedListing { url: String },
    /// The listing was fetched and the name is not in it
    #[error("not present in the live activity group listing")]
    NotFound,
}

impl LookupError {
    /// True when the master could not be reached or gave nothing usable,
    /// as opposed to a name that is simply unknown.
    pub fn is_no_response(&self) -> bool {
        !matches!(self, LookupError::NotFound)
    }
}

/// Errors returned by [`super::MasterApi`] group operations
#[derive(Debug, thiserror::Error)]
pub enum MasterError {
    #[error("could not resolve live activity group `{name}`: {source}")]
    Resolution {
        name: String,
        #[source]
        source: LookupError,
    },
    #[error("no response to {command} of live activity group `{name}` (id {id}): {source}")]
    RemoteCall {
        name: String,
        id: i64,
        command: GroupCommand,
        #[source]
        source: TransportError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_distinct_from_no_response() {
        assert!(!LookupError::NotFound.is_no_response());
        let malformed = LookupError::MalformedListing { url: "http://master/x".to_string() };
        assert!(malformed.is_no_response());
    }

    #[test]
    fn test_resolution_message_names_group() {
        let err = MasterError::Resolution {
            name: "Earth".to_string(),
            source: LookupError::NotFound,
        };
        let msg = err.to_string();
        assert!(msg.contains("`Earth`"));
        assert!(msg.contains("not present"));
    }
}
