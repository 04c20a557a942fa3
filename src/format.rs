//! Output layouts for sampled link batches.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Layout of the link batches a [`crate::LinkNeighborSampler`] produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkedDataFormat {
    /// `(u, v, neg_u, neg_v)`: each positive edge carries its own row of
    /// `R` negative heads and tails.
    Conditioned,
    /// `(u, v, label)`: positives and negatives share one labeled stream.
    Independent,
}

impl LinkedDataFormat {
    /// Lowercase name, as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conditioned => "conditioned",
            Self::Independent => "independent",
        }
    }
}

impl fmt::Display for LinkedDataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkedDataFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "conditioned" => Ok(Self::Conditioned),
            "independent" => Ok(Self::Independent),
            _ => Err(Error::InvalidArgument(format!(
                "Unsupported data format: {s}."
            ))),
        }
    }
}
