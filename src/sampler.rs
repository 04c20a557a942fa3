//! Link sampling: merge negatives into the seed pairs, sample a
//! neighborhood, then rebuild the requested layout from compacted indices.
//!
//! For the conditioned layout with ratio `R`, the `P` positive pairs and
//! the `P x R` negative matrices are flattened into one stream
//! `[u_0..u_P, neg_u[0,0..R], neg_u[1,0..R], ...]` before sampling, and cut
//! back at `len / (R + 1)` afterwards. Both directions use row-major order.
//!
//! # Example
//!
//! ```rust
//! use lattix_link::{FusedHeteroGraph, LinkBatch, LinkData, LinkNeighborSampler,
//!     LinkedDataFormat, NodePairs};
//! use ndarray::array;
//!
//! let graph = FusedHeteroGraph::homogeneous(10, &[(0, 1), (1, 2), (2, 3)]).unwrap();
//! let sampler = LinkNeighborSampler::new(&graph, 1, LinkedDataFormat::Conditioned);
//!
//! let batch = LinkBatch::from_pairs(NodePairs::from_vecs(vec![7, 3], vec![3, 9]).unwrap())
//!     .with_field(array![[7], [7]])
//!     .with_field(array![[1], [2]]);
//!
//! let (out, _subgraph) = sampler.sample(&LinkData::Homogeneous(batch)).unwrap();
//! let out = out.as_homogeneous().unwrap();
//! // Seeds {1, 2, 3, 7, 9} are renumbered 0..5.
//! assert_eq!(out.vector(0).unwrap(), array![3, 2]);
//! assert_eq!(out.matrix(3).unwrap(), array![[0], [1]]);
//! ```

use crate::batch::{field, LinkBatch, LinkData, NodePairs};
use crate::config::LinkSamplerConfig;
use crate::error::{Error, Result};
use crate::format::LinkedDataFormat;
use crate::hetero::EdgeType;
use crate::provider::GraphSamplingProvider;
use ndarray::{s, Array1, Array2};
use tracing::{debug, instrument, trace};

/// Number of leading fields rewritten in the conditioned layout.
const CONDITIONED_FIELDS: usize = 4;
/// Number of leading fields rewritten otherwise.
const PAIR_FIELDS: usize = 2;

/// Produces compacted positive + negative link batches and the sampled
/// subgraph for link-prediction training.
#[derive(Debug, Clone)]
pub struct LinkNeighborSampler<G> {
    graph: G,
    negative_ratio: usize,
    format: LinkedDataFormat,
}

impl<G: GraphSamplingProvider> LinkNeighborSampler<G> {
    /// Create a sampler.
    ///
    /// # Arguments
    /// * `graph` - Storage that samples neighborhoods and splits subgraphs
    /// * `negative_ratio` - Negatives per positive edge; 0 means the input
    ///   carries no negatives
    /// * `format` - Output layout
    pub fn new(graph: G, negative_ratio: usize, format: LinkedDataFormat) -> Self {
        Self {
            graph,
            negative_ratio,
            format,
        }
    }

    /// Create a sampler from a config; fails with
    /// [`Error::InvalidArgument`] on an unknown format name.
    pub fn from_config(graph: G, config: &LinkSamplerConfig) -> Result<Self> {
        Ok(Self::new(graph, config.negative_ratio, config.parsed_format()?))
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    pub fn negative_ratio(&self) -> usize {
        self.negative_ratio
    }

    pub fn format(&self) -> LinkedDataFormat {
        self.format
    }

    /// Whether input batches carry per-edge negative matrices that must be
    /// merged into the seed pairs.
    pub fn has_conditioned_negative(&self) -> bool {
        self.format == LinkedDataFormat::Conditioned && self.negative_ratio > 0
    }

    /// Sample a neighborhood for `link_data` and return the batches
    /// rewritten in local indices, together with the per-edge-type
    /// subgraph.
    ///
    /// The output has the same layout and keys as the input. Fields past
    /// the rewritten prefix are shared with the input, not copied.
    #[instrument(
        level = "debug",
        skip(self, link_data),
        fields(format = %self.format, negative_ratio = self.negative_ratio)
    )]
    pub fn sample(
        &self,
        link_data: &LinkData<LinkBatch>,
    ) -> Result<(LinkData<LinkBatch>, G::SplitSubgraph)> {
        let conditioned = self.has_conditioned_negative();
        debug!(
            heterogeneous = link_data.is_heterogeneous(),
            batches = link_data.num_batches(),
            conditioned,
            "sampling link batch"
        );

        let node_pairs = link_data.try_map(|etype, batch| {
            if conditioned {
                self.collect(etype, batch)
            } else {
                seed_pairs(batch)
            }
        })?;

        let (compacted, sub_graph) = self.graph.sample_neighbors_for_pairs(node_pairs)?;

        let output = link_data.try_zip_map(compacted, |etype, batch, pairs| {
            if conditioned {
                self.dispatch(etype, batch, pairs)
            } else {
                let mut out = LinkBatch::from_pairs(pairs);
                for extra in batch.tail(PAIR_FIELDS) {
                    out.push_shared(extra.clone());
                }
                Ok(out)
            }
        })?;

        let split = self.graph.split_fused_homogeneous_graph(sub_graph)?;
        Ok((output, split))
    }

    /// Flatten `(u, v, neg_u, neg_v)` into one pair stream of length
    /// `P * (R + 1)`.
    fn collect(&self, etype: Option<&EdgeType>, batch: &LinkBatch) -> Result<NodePairs> {
        batch.require_len(CONDITIONED_FIELDS)?;
        let (u, v) = (batch.vector(0)?, batch.vector(1)?);
        if u.len() != v.len() {
            return Err(Error::shape("positive pairs", u.len(), v.len()));
        }
        let expected = (u.len(), self.negative_ratio);
        let (neg_u, neg_v) = (batch.matrix(2)?, batch.matrix(3)?);
        for neg in [&neg_u, &neg_v] {
            if neg.dim() != expected {
                return Err(Error::shape(
                    "negative matrix",
                    format!("{expected:?}"),
                    format!("{:?}", neg.dim()),
                ));
            }
        }
        trace!(
            edge_type = ?etype,
            positives = u.len(),
            negatives = neg_u.len(),
            "merging negatives into seed pairs"
        );

        let src: Array1<i64> = u.iter().chain(neg_u.iter()).copied().collect();
        let dst: Array1<i64> = v.iter().chain(neg_v.iter()).copied().collect();
        NodePairs::new(src, dst)
    }

    /// Cut compacted pairs back into `(u, v, neg_u, neg_v)` and reattach
    /// the trailing fields of `batch`.
    fn dispatch(
        &self,
        etype: Option<&EdgeType>,
        batch: &LinkBatch,
        pairs: NodePairs,
    ) -> Result<LinkBatch> {
        let ratio = self.negative_ratio;
        let total = pairs.len();
        if total % (ratio + 1) != 0 {
            return Err(Error::shape(
                "compacted pairs",
                format!("a multiple of {}", ratio + 1),
                total,
            ));
        }
        let positives = total / (ratio + 1);
        let expected = batch.vector(0)?.len();
        if positives != expected {
            return Err(Error::shape("compacted positive pairs", expected, positives));
        }
        trace!(edge_type = ?etype, positives, "splitting compacted pairs");

        let (src, dst) = pairs.into_parts();
        let u = src.slice(s![..positives]).to_owned();
        let v = dst.slice(s![..positives]).to_owned();
        let neg_u =
            Array2::from_shape_vec((positives, ratio), src.slice(s![positives..]).to_vec())?;
        let neg_v =
            Array2::from_shape_vec((positives, ratio), dst.slice(s![positives..]).to_vec())?;

        let mut out = LinkBatch::new(vec![field(u), field(v), field(neg_u), field(neg_v)]);
        for extra in batch.tail(CONDITIONED_FIELDS) {
            out.push_shared(extra.clone());
        }
        Ok(out)
    }
}

/// Leading `(u, v)` fields as node pairs.
fn seed_pairs(batch: &LinkBatch) -> Result<NodePairs> {
    batch.require_len(PAIR_FIELDS)?;
    NodePairs::new(batch.vector(0)?.to_owned(), batch.vector(1)?.to_owned())
}
