//! Stable string ids for editor entities.
//!
//! The server is the id authority: loaded graphs may carry ids the client
//! never minted, including bare integers in older payloads. Ids are
//! therefore stored as strings and deserialized leniently (a JSON number
//! is stringified on the way in). Entities created in the editor get a
//! `<prefix>_<ulid>` id: the ULID gives a time-sortable component plus a
//! random suffix.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use ulid::Ulid;

/// Macro to generate a string-backed id wrapper.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generates a fresh id with a time-sortable ULID suffix.
            ///
            /// Uniqueness within a collection is the owning store's job;
            /// it re-rolls on the (vanishingly rare) collision.
            #[must_use]
            pub fn generate() -> Self {
                Self(format!(concat!($prefix, "_{}"), Ulid::new()))
            }

            /// Returns the id text.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                coerce_id(deserializer).map(Self)
            }
        }
    };
}

/// Accepts a JSON string or number and yields the id text.
///
/// Downstream equality checks assume string ids, so numeric ids are
/// stringified here rather than at every call site.
fn coerce_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "expected a string or number id, got {other}"
        ))),
    }
}

define_id!(
    /// Unique identifier for a node within a graph.
    NodeId,
    "node"
);

define_id!(
    /// Unique identifier for an edge within a graph.
    EdgeId,
    "edge"
);

define_id!(
    /// Unique identifier for one execution (run) of a workflow.
    RunId,
    "run"
);

define_id!(
    /// Unique identifier for a saved workflow.
    WorkflowId,
    "wf"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_node_id_carries_prefix() {
        let id = NodeId::generate();
        assert!(id.as_str().starts_with("node_"));
    }

    #[test]
    fn generated_ids_differ() {
        assert_ne!(EdgeId::generate(), EdgeId::generate());
    }

    #[test]
    fn deserializes_from_string() {
        let id: NodeId = serde_json::from_str("\"abc\"").expect("deserialize");
        assert_eq!(id.as_str(), "abc");
    }

    #[test]
    fn deserializes_from_number() {
        let id: NodeId = serde_json::from_str("1").expect("deserialize");
        assert_eq!(id.as_str(), "1");
    }

    #[test]
    fn rejects_other_json_shapes() {
        let result: Result<RunId, _> = serde_json::from_str("[1]");
        assert!(result.is_err());
    }

    #[test]
    fn serde_roundtrip_is_transparent() {
        let id = WorkflowId::from("wf_test");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"wf_test\"");
        let parsed: WorkflowId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(id, parsed);
    }

    #[test]
    fn ids_hash_by_text() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(NodeId::from("1"));
        set.insert(NodeId::from("1"));
        set.insert(NodeId::from("2"));
        assert_eq!(set.len(), 2);
    }
}
