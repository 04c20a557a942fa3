//! Link sampler configuration.
//!
//! # Example
//!
//! ```rust
//! use lattix_link::{LinkSamplerConfig, LinkedDataFormat};
//!
//! let config = LinkSamplerConfig::from_json(r#"{"negative_ratio": 3, "format": "independent"}"#)
//!     .unwrap();
//! assert_eq!(config.negative_ratio, 3);
//! assert_eq!(config.parsed_format().unwrap(), LinkedDataFormat::Independent);
//! ```

use crate::error::Result;
use crate::format::LinkedDataFormat;
use serde::{Deserialize, Serialize};

/// Configuration for [`crate::LinkNeighborSampler::from_config`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkSamplerConfig {
    /// Negative edges per positive edge; 0 means the data carries no
    /// negatives (default: 1).
    pub negative_ratio: usize,
    /// Output layout name, `conditioned` or `independent`
    /// (default: `conditioned`).
    pub format: String,
}

impl Default for LinkSamplerConfig {
    fn default() -> Self {
        Self {
            negative_ratio: 1,
            format: LinkedDataFormat::Conditioned.to_string(),
        }
    }
}

impl LinkSamplerConfig {
    /// Parse a JSON config. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_negative_ratio(mut self, ratio: usize) -> Self {
        self.negative_ratio = ratio;
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// The configured format, validated.
    pub fn parsed_format(&self) -> Result<LinkedDataFormat> {
        self.format.parse()
    }
}
