// Allow minor clippy style warnings at crate level
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_truncation)]

//! Negative-edge link sampling for link-prediction training.
//!
//! Given positive node pairs (edges known to exist) plus materialized
//! negatives, [`LinkNeighborSampler`] asks a graph to sample a neighborhood
//! around every endpoint, then hands back the same links renumbered into the
//! subgraph's local index space, together with the subgraph split per edge
//! type.
//!
//! - [`LinkNeighborSampler`] - The collect / sample / dispatch transform
//! - [`LinkedDataFormat`] - Conditioned `(u, v, neg_u, neg_v)` or
//!   independent `(u, v, label)` batches
//! - [`LinkData`] - One [`LinkBatch`] for a homogeneous graph, or one per
//!   [`EdgeType`] for a heterogeneous graph
//! - [`GraphSamplingProvider`] - The storage seam: neighbor sampling and
//!   per-edge-type splitting
//! - [`FusedHeteroGraph`] - An in-memory provider over a fused CSC graph
//! - [`compact`] - Unique-and-compact ID renumbering
//!
//! # Example
//!
//! ```rust
//! use lattix_link::{EdgeType, FusedHeteroGraph, LinkBatch, LinkData,
//!     LinkNeighborSampler, LinkedDataFormat, NodePairs};
//! use ndarray::array;
//!
//! let follows = EdgeType::new("user", "follows", "user");
//! let graph = FusedHeteroGraph::builder()
//!     .node_type("user", 4)
//!     .edge_type(follows.clone())
//!     .edge(&follows, 0, 1)
//!     .build()
//!     .unwrap();
//!
//! let sampler = LinkNeighborSampler::new(&graph, 1, LinkedDataFormat::Independent);
//! let batch = LinkBatch::from_pairs(NodePairs::from_vecs(vec![0, 3], vec![1, 2]).unwrap())
//!     .with_field(array![1, 0]);
//! let input: LinkData<LinkBatch> = [(follows.clone(), batch)].into_iter().collect();
//!
//! let (out, subgraph) = sampler.sample(&input).unwrap();
//! let out = out.get(&follows).unwrap();
//! assert_eq!(out.vector(0).unwrap(), array![0, 3]);
//! assert_eq!(out.vector(2).unwrap(), array![1, 0]);
//! assert_eq!(subgraph.num_edges(), 2);
//! ```

pub mod batch;
pub mod compact;
mod config;
mod error;
pub mod format;
pub mod fused;
pub mod hetero;
pub mod provider;
mod sampler;

pub use batch::{field, Field, LinkBatch, LinkData, NodePairs};
pub use config::LinkSamplerConfig;
pub use error::{Error, Result};
pub use format::LinkedDataFormat;
pub use fused::{FusedHeteroGraph, FusedHeteroGraphBuilder, FusedSubgraph, SampledSubgraph};
pub use hetero::{EdgeType, NodeType};
pub use provider::GraphSamplingProvider;
pub use sampler::LinkNeighborSampler;
