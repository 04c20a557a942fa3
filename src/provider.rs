//! The graph-storage seam used by [`crate::LinkNeighborSampler`].

use crate::batch::{LinkData, NodePairs};
use crate::error::Result;
use std::sync::Arc;

/// A graph that can sample a neighborhood around seed node pairs.
///
/// Implementations own storage and the sampling algorithm; the link sampler
/// only reshapes what goes in and out.
pub trait GraphSamplingProvider {
    /// Subgraph spanning all edge types, as returned by sampling.
    type Subgraph;
    /// Subgraph decomposed per edge type.
    type SplitSubgraph;

    /// Sample a local neighborhood around the endpoints of `node_pairs`.
    ///
    /// Returns the same pairs with their indices renumbered into the local
    /// index space of the sampled subgraph, along with the subgraph itself.
    /// The returned pairs must have the same layout, keys and lengths as
    /// the input.
    fn sample_neighbors_for_pairs(
        &self,
        node_pairs: LinkData<NodePairs>,
    ) -> Result<(LinkData<NodePairs>, Self::Subgraph)>;

    /// Split a fused subgraph into one subgraph per edge type.
    fn split_fused_homogeneous_graph(
        &self,
        sub_graph: Self::Subgraph,
    ) -> Result<Self::SplitSubgraph>;
}

impl<P: GraphSamplingProvider + ?Sized> GraphSamplingProvider for &P {
    type Subgraph = P::Subgraph;
    type SplitSubgraph = P::SplitSubgraph;

    fn sample_neighbors_for_pairs(
        &self,
        node_pairs: LinkData<NodePairs>,
    ) -> Result<(LinkData<NodePairs>, Self::Subgraph)> {
        (**self).sample_neighbors_for_pairs(node_pairs)
    }

    fn split_fused_homogeneous_graph(
        &self,
        sub_graph: Self::Subgraph,
    ) -> Result<Self::SplitSubgraph> {
        (**self).split_fused_homogeneous_graph(sub_graph)
    }
}

impl<P: GraphSamplingProvider + ?Sized> GraphSamplingProvider for Arc<P> {
    type Subgraph = P::Subgraph;
    type SplitSubgraph = P::SplitSubgraph;

    fn sample_neighbors_for_pairs(
        &self,
        node_pairs: LinkData<NodePairs>,
    ) -> Result<(LinkData<NodePairs>, Self::Subgraph)> {
        (**self).sample_neighbors_for_pairs(node_pairs)
    }

    fn split_fused_homogeneous_graph(
        &self,
        sub_graph: Self::Subgraph,
    ) -> Result<Self::SplitSubgraph> {
        (**self).split_fused_homogeneous_graph(sub_graph)
    }
}
