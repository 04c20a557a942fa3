//! Node and edge type keys for heterogeneous link data.
//!
//! An [`EdgeType`] is the canonical `(src_type, relation, dst_type)` triple
//! used to key per-relation batches. Its string form is `"src:rel:dst"`.
//!
//! # Example
//!
//! ```rust
//! use lattix_link::hetero::EdgeType;
//!
//! let follows: EdgeType = "user:follows:user".parse().unwrap();
//! assert_eq!(follows.relation, "follows");
//! assert_eq!(follows.to_string(), "user:follows:user");
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const SEPARATOR: char = ':';

/// A node type identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeType(pub String);

impl NodeType {
    /// Create a new node type.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the type name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S: Into<String>> From<S> for NodeType {
    fn from(s: S) -> Self {
        Self(s.into())
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An edge type identifier, represented as (src_type, relation, dst_type).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeType {
    /// Source node type.
    pub src_type: NodeType,
    /// Relation name.
    pub relation: String,
    /// Destination node type.
    pub dst_type: NodeType,
}

impl EdgeType {
    /// Create a new edge type.
    pub fn new(
        src_type: impl Into<NodeType>,
        relation: impl Into<String>,
        dst_type: impl Into<NodeType>,
    ) -> Self {
        Self {
            src_type: src_type.into(),
            relation: relation.into(),
            dst_type: dst_type.into(),
        }
    }

    /// The single edge type a homogeneous graph is stored under.
    pub fn homogeneous() -> Self {
        Self::new("_N", "_E", "_N")
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{SEPARATOR}{}{SEPARATOR}{}",
            self.src_type, self.relation, self.dst_type
        )
    }
}

impl FromStr for EdgeType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(SEPARATOR).collect();
        match parts.as_slice() {
            [src, rel, dst] if !src.is_empty() && !rel.is_empty() && !dst.is_empty() => {
                Ok(Self::new(*src, *rel, *dst))
            }
            _ => Err(Error::InvalidArgument(format!(
                "edge type must look like 'src{SEPARATOR}relation{SEPARATOR}dst', got '{s}'"
            ))),
        }
    }
}
