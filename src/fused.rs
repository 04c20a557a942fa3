//! In-memory fused heterogeneous graph.
//!
//! All node types share one global ID space: node `i` of type `t` has the
//! global ID `node_type_offset[t] + i`. Edges of every type live in a single
//! CSC adjacency (incoming edges grouped by destination), tagged with their
//! edge-type ID. This is the layout [`crate::LinkNeighborSampler`] expects
//! from a [`GraphSamplingProvider`]:
//!
//! - seed pairs are compacted per node type (sorted unique IDs, each ID
//!   replaced by its rank);
//! - the sampled subgraph spans every edge type at once and is split per
//!   edge type afterwards.
//!
//! # Example
//!
//! ```rust
//! use lattix_link::{EdgeType, FusedHeteroGraph};
//!
//! let writes = EdgeType::new("author", "writes", "paper");
//! let graph = FusedHeteroGraph::builder()
//!     .node_type("author", 2)
//!     .node_type("paper", 3)
//!     .edge_type(writes.clone())
//!     .edge(&writes, 0, 2)
//!     .edge(&writes, 1, 2)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(graph.node_type_offset(), &[0, 2, 5]);
//! assert_eq!(graph.num_edges(), 2);
//! ```

use crate::batch::{LinkData, NodePairs};
use crate::compact::{unique_and_compact, unique_inverse};
use crate::error::{Error, Result};
use crate::hetero::{EdgeType, NodeType};
use crate::provider::GraphSamplingProvider;
use rand::prelude::*;
use rand_xorshift::XorShiftRng;
use std::collections::HashMap;
use tracing::debug;

/// A fused heterogeneous graph in CSC layout.
#[derive(Debug, Clone)]
pub struct FusedHeteroGraph {
    node_types: Vec<NodeType>,
    node_type_ids: HashMap<NodeType, usize>,
    /// Global ID of the first node of each type, plus the total node count.
    node_type_offset: Vec<i64>,
    edge_types: Vec<EdgeType>,
    edge_type_ids: HashMap<EdgeType, usize>,
    /// (src node type, dst node type) per edge type.
    endpoint_types: Vec<(usize, usize)>,
    indptr: Vec<usize>,
    indices: Vec<i64>,
    type_per_edge: Vec<usize>,
    homogeneous: bool,
    fanout: usize,
    seed: u64,
}

impl FusedHeteroGraph {
    /// Start building a heterogeneous graph.
    pub fn builder() -> FusedHeteroGraphBuilder {
        FusedHeteroGraphBuilder::new()
    }

    /// A graph with a single node type and a single edge type.
    ///
    /// Link data for it must be [`LinkData::Homogeneous`].
    pub fn homogeneous(num_nodes: usize, edges: &[(i64, i64)]) -> Result<Self> {
        let etype = EdgeType::homogeneous();
        let mut builder = Self::builder()
            .node_type(etype.src_type.clone(), num_nodes)
            .edge_type(etype.clone());
        for &(src, dst) in edges {
            builder.add_edge(&etype, src, dst);
        }
        let mut graph = builder.build()?;
        graph.homogeneous = true;
        Ok(graph)
    }

    /// Incoming neighbors sampled per seed node (default: 0, the subgraph
    /// holds only the seed pairs).
    pub fn with_fanout(mut self, fanout: usize) -> Self {
        self.fanout = fanout;
        self
    }

    /// Random seed for neighbor sampling (default: 42).
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn is_homogeneous(&self) -> bool {
        self.homogeneous
    }

    pub fn fanout(&self) -> usize {
        self.fanout
    }

    /// Total number of nodes across all types.
    pub fn num_nodes(&self) -> usize {
        self.indptr.len() - 1
    }

    /// Total number of edges across all types.
    pub fn num_edges(&self) -> usize {
        self.indices.len()
    }

    /// Offsets of each node type in the global ID space, followed by the
    /// total node count.
    pub fn node_type_offset(&self) -> &[i64] {
        &self.node_type_offset
    }

    /// Node types in ID order.
    pub fn node_types(&self) -> &[NodeType] {
        &self.node_types
    }

    /// Edge types in ID order.
    pub fn edge_types(&self) -> &[EdgeType] {
        &self.edge_types
    }

    pub fn node_type_id(&self, node_type: &NodeType) -> Option<usize> {
        self.node_type_ids.get(node_type).copied()
    }

    pub fn edge_type_id(&self, edge_type: &EdgeType) -> Option<usize> {
        self.edge_type_ids.get(edge_type).copied()
    }

    /// Incoming edges of a global node as `(global src, edge type)`.
    pub fn in_edges(&self, node: i64) -> Result<impl Iterator<Item = (i64, &EdgeType)> + '_> {
        self.to_local(node)?;
        let dst = node as usize;
        let range = self.indptr[dst]..self.indptr[dst + 1];
        Ok(range.map(move |e| (self.indices[e], &self.edge_types[self.type_per_edge[e]])))
    }

    /// Global ID of node `local` of type `node_type`.
    pub fn to_global(&self, node_type: usize, local: i64) -> Result<i64> {
        let start = self.node_type_offset[node_type];
        let end = self.node_type_offset[node_type + 1];
        if local < 0 || local >= end - start {
            return Err(Error::NodeNotFound(local));
        }
        Ok(start + local)
    }

    /// Node type ID and per-type ID of a global node.
    pub fn to_local(&self, global: i64) -> Result<(usize, i64)> {
        let total = self.node_type_offset[self.node_types.len()];
        if global < 0 || global >= total {
            return Err(Error::NodeNotFound(global));
        }
        let node_type = self.node_type_offset.partition_point(|&offset| offset <= global) - 1;
        Ok((node_type, global - self.node_type_offset[node_type]))
    }

    fn keyed_pairs(&self, node_pairs: LinkData<NodePairs>) -> Result<Vec<(EdgeType, NodePairs)>> {
        match (node_pairs, self.homogeneous) {
            (LinkData::Homogeneous(pairs), true) => Ok(vec![(EdgeType::homogeneous(), pairs)]),
            (LinkData::Heterogeneous(map), false) => {
                let mut keyed: Vec<_> = map.into_iter().collect();
                keyed.sort_by(|a, b| a.0.cmp(&b.0));
                Ok(keyed)
            }
            (LinkData::Homogeneous(_), false) => Err(Error::LayoutMismatch(
                "graph is heterogeneous; node pairs must be keyed by edge type".into(),
            )),
            (LinkData::Heterogeneous(_), true) => Err(Error::LayoutMismatch(
                "graph is homogeneous; node pairs must not be keyed by edge type".into(),
            )),
        }
    }

    /// Add up to `fanout` incoming edges per seed and compact the new
    /// neighbors after the seeds.
    fn sample_fanout(
        &self,
        seeds: Vec<i64>,
        mut src: Vec<i64>,
        mut dst: Vec<i64>,
        mut edge_types: Vec<usize>,
    ) -> Result<FusedSubgraph> {
        let num_seeds = seeds.len();
        if self.fanout == 0 {
            return Ok(FusedSubgraph {
                original_node_ids: seeds,
                num_seeds,
                src,
                dst,
                edge_types,
            });
        }

        let mut rng = XorShiftRng::seed_from_u64(self.seed);
        let mut neighbor_src = Vec::new();
        let mut neighbor_dst = Vec::new();
        for &node in &seeds {
            let node_idx = node as usize;
            let edges: Vec<usize> = (self.indptr[node_idx]..self.indptr[node_idx + 1]).collect();
            let picked: Vec<usize> = if edges.len() <= self.fanout {
                edges
            } else {
                edges.choose_multiple(&mut rng, self.fanout).copied().collect()
            };
            for e in picked {
                neighbor_src.push(self.indices[e]);
                neighbor_dst.push(node);
                edge_types.push(self.type_per_edge[e]);
            }
        }

        let compacted = unique_and_compact(&neighbor_src, &neighbor_dst, &seeds)?;
        debug!(
            seeds = num_seeds,
            sampled_edges = neighbor_src.len(),
            nodes = compacted.unique_ids.len(),
            "sampled incoming neighbors"
        );
        src.extend(compacted.compacted_src);
        dst.extend(compacted.compacted_dst);

        Ok(FusedSubgraph {
            original_node_ids: compacted.unique_ids,
            num_seeds,
            src,
            dst,
            edge_types,
        })
    }
}

/// Where one edge type's pairs sit in the per-node-type ID lists.
struct PairSpan {
    edge_type: usize,
    src_start: usize,
    dst_start: usize,
    len: usize,
}

impl GraphSamplingProvider for FusedHeteroGraph {
    type Subgraph = FusedSubgraph;
    type SplitSubgraph = SampledSubgraph;

    fn sample_neighbors_for_pairs(
        &self,
        node_pairs: LinkData<NodePairs>,
    ) -> Result<(LinkData<NodePairs>, FusedSubgraph)> {
        let keyed = self.keyed_pairs(node_pairs)?;

        // Gather every endpoint by node type.
        let mut occurrences: Vec<Vec<i64>> = vec![Vec::new(); self.node_types.len()];
        let mut spans = Vec::with_capacity(keyed.len());
        for (etype, pairs) in &keyed {
            let edge_type = self
                .edge_type_id(etype)
                .ok_or_else(|| Error::UnknownEdgeType(etype.to_string()))?;
            let (src_type, dst_type) = self.endpoint_types[edge_type];
            for (s, d) in pairs.iter() {
                self.to_global(src_type, s)?;
                self.to_global(dst_type, d)?;
            }
            let src_start = occurrences[src_type].len();
            occurrences[src_type].extend(pairs.src().iter().copied());
            let dst_start = occurrences[dst_type].len();
            occurrences[dst_type].extend(pairs.dst().iter().copied());
            spans.push(PairSpan {
                edge_type,
                src_start,
                dst_start,
                len: pairs.len(),
            });
        }

        // Compact per node type; seeds of type t occupy a contiguous block
        // of the fused index space starting at base[t].
        let mut seeds = Vec::new();
        let mut base = Vec::with_capacity(self.node_types.len());
        let mut compacted = Vec::with_capacity(self.node_types.len());
        for (node_type, ids) in occurrences.iter().enumerate() {
            let (unique, inverse) = unique_inverse(ids);
            base.push(seeds.len() as i64);
            seeds.extend(unique.iter().map(|id| id + self.node_type_offset[node_type]));
            compacted.push(inverse);
        }

        let total: usize = spans.iter().map(|span| span.len).sum();
        let mut fused_src = Vec::with_capacity(total);
        let mut fused_dst = Vec::with_capacity(total);
        let mut fused_types = Vec::with_capacity(total);
        let mut renumbered = Vec::with_capacity(keyed.len());
        for ((etype, _), span) in keyed.into_iter().zip(&spans) {
            let (src_type, dst_type) = self.endpoint_types[span.edge_type];
            let u = compacted[src_type][span.src_start..span.src_start + span.len].to_vec();
            let v = compacted[dst_type][span.dst_start..span.dst_start + span.len].to_vec();
            fused_src.extend(u.iter().map(|id| id + base[src_type]));
            fused_dst.extend(v.iter().map(|id| id + base[dst_type]));
            fused_types.extend(std::iter::repeat(span.edge_type).take(span.len));
            renumbered.push((etype, NodePairs::from_vecs(u, v)?));
        }
        debug!(
            edge_types = renumbered.len(),
            pairs = total,
            seeds = seeds.len(),
            "compacted seed pairs"
        );

        let sub_graph = self.sample_fanout(seeds, fused_src, fused_dst, fused_types)?;
        let compacted_pairs = if self.homogeneous {
            let (_, pairs) = renumbered
                .pop()
                .ok_or_else(|| Error::LayoutMismatch("no homogeneous node pairs".into()))?;
            LinkData::Homogeneous(pairs)
        } else {
            renumbered.into_iter().collect()
        };
        Ok((compacted_pairs, sub_graph))
    }

    fn split_fused_homogeneous_graph(&self, sub_graph: FusedSubgraph) -> Result<SampledSubgraph> {
        let node_id = |local: i64| -> Result<i64> {
            usize::try_from(local)
                .ok()
                .and_then(|idx| sub_graph.original_node_ids.get(idx).copied())
                .ok_or(Error::NodeNotFound(local))
        };

        let mut per_type: HashMap<EdgeType, (Vec<i64>, Vec<i64>)> = HashMap::new();
        for ((&s, &d), &t) in sub_graph.src.iter().zip(&sub_graph.dst).zip(&sub_graph.edge_types) {
            let etype = self
                .edge_types
                .get(t)
                .ok_or_else(|| Error::UnknownEdgeType(t.to_string()))?;
            let (src_type, dst_type) = self.endpoint_types[t];
            let entry = per_type.entry(etype.clone()).or_default();
            entry.0.push(node_id(s)? - self.node_type_offset[src_type]);
            entry.1.push(node_id(d)? - self.node_type_offset[dst_type]);
        }
        let node_pairs = per_type
            .into_iter()
            .map(|(etype, (src, dst))| Ok((etype, NodePairs::from_vecs(src, dst)?)))
            .collect::<Result<HashMap<_, _>>>()?;

        let mut seed_nodes: HashMap<NodeType, Vec<i64>> = HashMap::new();
        let mut nodes: HashMap<NodeType, Vec<i64>> = HashMap::new();
        for (i, &global) in sub_graph.original_node_ids.iter().enumerate() {
            let (node_type, local) = self.to_local(global)?;
            let name = &self.node_types[node_type];
            if i < sub_graph.num_seeds {
                seed_nodes.entry(name.clone()).or_default().push(local);
            }
            nodes.entry(name.clone()).or_default().push(local);
        }

        Ok(SampledSubgraph {
            node_pairs,
            seed_nodes,
            nodes,
        })
    }
}

/// A sampled subgraph spanning all edge types, in subgraph-local indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FusedSubgraph {
    /// Global IDs by local index; the seed nodes come first, sorted.
    pub original_node_ids: Vec<i64>,
    /// Number of seed nodes at the front of `original_node_ids`.
    pub num_seeds: usize,
    /// Local source index per edge.
    pub src: Vec<i64>,
    /// Local destination index per edge.
    pub dst: Vec<i64>,
    /// Edge-type ID per edge.
    pub edge_types: Vec<usize>,
}

impl FusedSubgraph {
    pub fn num_edges(&self) -> usize {
        self.src.len()
    }

    pub fn num_nodes(&self) -> usize {
        self.original_node_ids.len()
    }
}

/// A sampled subgraph split per edge type, in per-node-type IDs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SampledSubgraph {
    /// Sampled edges per edge type.
    pub node_pairs: HashMap<EdgeType, NodePairs>,
    /// Seed nodes per node type, sorted.
    pub seed_nodes: HashMap<NodeType, Vec<i64>>,
    /// Every node of the subgraph per node type, seeds first.
    pub nodes: HashMap<NodeType, Vec<i64>>,
}

impl SampledSubgraph {
    /// Total number of edges across all types.
    pub fn num_edges(&self) -> usize {
        self.node_pairs.values().map(NodePairs::len).sum()
    }
}

/// Builder for [`FusedHeteroGraph`].
///
/// Node and edge types get IDs in registration order.
#[derive(Debug, Clone, Default)]
pub struct FusedHeteroGraphBuilder {
    node_types: Vec<(NodeType, usize)>,
    edge_types: Vec<EdgeType>,
    edges: HashMap<EdgeType, Vec<(i64, i64)>>,
}

impl FusedHeteroGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node type with `num_nodes` nodes.
    pub fn node_type(mut self, node_type: impl Into<NodeType>, num_nodes: usize) -> Self {
        self.node_types.push((node_type.into(), num_nodes));
        self
    }

    /// Register an edge type.
    pub fn edge_type(mut self, edge_type: EdgeType) -> Self {
        self.edge_types.push(edge_type);
        self
    }

    /// Add an edge between per-type node IDs.
    pub fn edge(mut self, edge_type: &EdgeType, src: i64, dst: i64) -> Self {
        self.add_edge(edge_type, src, dst);
        self
    }

    /// Add an edge in place.
    pub fn add_edge(&mut self, edge_type: &EdgeType, src: i64, dst: i64) {
        self.edges.entry(edge_type.clone()).or_default().push((src, dst));
    }

    /// Validate types and IDs and build the CSC adjacency.
    pub fn build(self) -> Result<FusedHeteroGraph> {
        let mut node_type_ids = HashMap::with_capacity(self.node_types.len());
        let mut node_type_offset = Vec::with_capacity(self.node_types.len() + 1);
        let mut total = 0i64;
        for (id, (node_type, count)) in self.node_types.iter().enumerate() {
            if node_type_ids.insert(node_type.clone(), id).is_some() {
                return Err(Error::InvalidArgument(format!("duplicate node type {node_type}")));
            }
            node_type_offset.push(total);
            total = i64::try_from(*count)
                .ok()
                .and_then(|count| total.checked_add(count))
                .ok_or_else(|| {
                    Error::InvalidArgument(format!("too many nodes of type {node_type}: {count}"))
                })?;
        }
        node_type_offset.push(total);

        let mut edge_type_ids = HashMap::with_capacity(self.edge_types.len());
        let mut endpoint_types = Vec::with_capacity(self.edge_types.len());
        for (id, etype) in self.edge_types.iter().enumerate() {
            if edge_type_ids.insert(etype.clone(), id).is_some() {
                return Err(Error::InvalidArgument(format!("duplicate edge type {etype}")));
            }
            let lookup = |node_type: &NodeType| {
                node_type_ids
                    .get(node_type)
                    .copied()
                    .ok_or_else(|| Error::UnknownNodeType(node_type.to_string()))
            };
            endpoint_types.push((lookup(&etype.src_type)?, lookup(&etype.dst_type)?));
        }

        let mut graph = FusedHeteroGraph {
            node_types: self.node_types.into_iter().map(|(node_type, _)| node_type).collect(),
            node_type_ids,
            node_type_offset,
            edge_types: self.edge_types,
            edge_type_ids,
            endpoint_types,
            indptr: Vec::new(),
            indices: Vec::new(),
            type_per_edge: Vec::new(),
            homogeneous: false,
            fanout: 0,
            seed: 42,
        };

        // Global (src, dst, type) triples, sorted by destination for CSC.
        let mut global_edges = Vec::with_capacity(self.edges.values().map(Vec::len).sum());
        for (etype, edges) in &self.edges {
            let edge_type = graph
                .edge_type_id(etype)
                .ok_or_else(|| Error::UnknownEdgeType(etype.to_string()))?;
            let (src_type, dst_type) = graph.endpoint_types[edge_type];
            for &(src, dst) in edges {
                global_edges.push((
                    graph.to_global(src_type, src)?,
                    graph.to_global(dst_type, dst)?,
                    edge_type,
                ));
            }
        }
        global_edges.sort_unstable_by_key(|&(src, dst, edge_type)| (dst, edge_type, src));

        let num_nodes = total as usize;
        let mut indptr = vec![0usize; num_nodes + 1];
        for &(_, dst, _) in &global_edges {
            indptr[dst as usize + 1] += 1;
        }
        for i in 0..num_nodes {
            indptr[i + 1] += indptr[i];
        }
        graph.indptr = indptr;
        graph.indices = global_edges.iter().map(|&(src, _, _)| src).collect();
        graph.type_per_edge = global_edges.iter().map(|&(_, _, edge_type)| edge_type).collect();
        Ok(graph)
    }
}
