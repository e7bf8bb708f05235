//! Segment Tags
//!
//! Bounded label values attached to datastore segments. Keeping these as
//! enums rather than free strings keeps exported metric cardinality fixed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Datastore product a segment talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatastoreProduct {
    Redis,
    Memcached,
    Postgres,
    MySql,
    MongoDb,
}

impl DatastoreProduct {
    /// Get string representation for span fields and metric labels
    pub fn as_str(&self) -> &'static str {
        match self {
            DatastoreProduct::Redis => "redis",
            DatastoreProduct::Memcached => "memcached",
            DatastoreProduct::Postgres => "postgresql",
            DatastoreProduct::MySql => "mysql",
            DatastoreProduct::MongoDb => "mongodb",
        }
    }
}

impl fmt::Display for DatastoreProduct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
