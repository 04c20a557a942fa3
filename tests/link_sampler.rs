//! Integration tests for link sampling over a random heterogeneous graph.
//!
//! The graph has three node types and three edge types:
//!
//! ```text
//!   n1 -e1-> n2
//!   n1 -e2-> n3
//!   n3 -e3-> n1
//! ```
//!
//! Seed node IDs are drawn from `[0, 33)` so they are valid for every type.

use lattix_link::{
    EdgeType, FusedHeteroGraph, GraphSamplingProvider, LinkBatch, LinkData, LinkNeighborSampler,
    LinkSamplerConfig, LinkedDataFormat, NodePairs, SampledSubgraph,
};
use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_xorshift::XorShiftRng;
use std::collections::HashMap;
use tracing_subscriber::{fmt, EnvFilter};

/// Route sampler events to the test output; filter with `RUST_LOG`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt().with_env_filter(filter).with_test_writer().try_init();
}

fn e1() -> EdgeType {
    EdgeType::new("n1", "e1", "n2")
}

fn e2() -> EdgeType {
    EdgeType::new("n1", "e2", "n3")
}

fn e3() -> EdgeType {
    EdgeType::new("n3", "e3", "n1")
}

/// Random graph with `num_nodes` nodes split over three types, keeping each
/// possible edge of each type with probability `density`.
fn rand_graph(num_nodes: usize, density: f64, seed: u64) -> FusedHeteroGraph {
    let mut rng = XorShiftRng::seed_from_u64(seed);
    let counts = [33usize, 33, num_nodes - 66];
    let mut builder = FusedHeteroGraph::builder()
        .node_type("n1", counts[0])
        .node_type("n2", counts[1])
        .node_type("n3", counts[2]);
    for (etype, src_count, dst_count) in [(e1(), 0, 1), (e2(), 0, 2), (e3(), 2, 0)] {
        builder = builder.edge_type(etype.clone());
        for src in 0..counts[src_count] {
            for dst in 0..counts[dst_count] {
                if rng.gen_bool(density) {
                    builder.add_edge(&etype, src as i64, dst as i64);
                }
            }
        }
    }
    builder.build().unwrap()
}

fn randint(rng: &mut XorShiftRng, high: i64, len: usize) -> Vec<i64> {
    (0..len).map(|_| rng.gen_range(0..high)).collect()
}

/// Sorted unique IDs and the rank of each input ID among them.
fn unique_inverse(ids: &[i64]) -> (Vec<i64>, Vec<i64>) {
    let mut unique = ids.to_vec();
    unique.sort_unstable();
    unique.dedup();
    let inverse = ids
        .iter()
        .map(|id| unique.iter().position(|u| u == id).unwrap() as i64)
        .collect();
    (unique, inverse)
}

/// Sorted unique global IDs of every endpoint in the split subgraph.
fn collect_nodes(graph: &FusedHeteroGraph, sub_graph: &SampledSubgraph) -> Vec<i64> {
    let offsets = graph.node_type_offset();
    let mut nodes = Vec::new();
    for (etype, pairs) in &sub_graph.node_pairs {
        let u_offset = offsets[graph.node_type_id(&etype.src_type).unwrap()];
        let v_offset = offsets[graph.node_type_id(&etype.dst_type).unwrap()];
        nodes.extend(pairs.src().iter().map(|u| u + u_offset));
        nodes.extend(pairs.dst().iter().map(|v| v + v_offset));
    }
    nodes.sort_unstable();
    nodes.dedup();
    nodes
}

fn expected_unique_nodes(graph: &FusedHeteroGraph, uniques: [&[i64]; 3]) -> Vec<i64> {
    let offsets = graph.node_type_offset();
    let mut nodes: Vec<i64> = uniques
        .iter()
        .enumerate()
        .flat_map(|(t, unique)| unique.iter().map(move |id| id + offsets[t]))
        .collect();
    nodes.sort_unstable();
    nodes
}

fn column(ids: &[i64]) -> Array2<i64> {
    Array2::from_shape_vec((ids.len(), 1), ids.to_vec()).unwrap()
}

#[test]
fn test_link_sampler_independent_format() {
    init_tracing();
    let graph = rand_graph(100, 0.05, 7);
    let mut rng = XorShiftRng::seed_from_u64(1);
    let n1 = randint(&mut rng, 33, 15);
    let n2 = randint(&mut rng, 33, 5);
    let n3 = randint(&mut rng, 33, 10);
    let (unique_n1, compacted_n1) = unique_inverse(&n1);
    let (unique_n2, compacted_n2) = unique_inverse(&n2);
    let (unique_n3, compacted_n3) = unique_inverse(&n3);
    let expected_nodes =
        expected_unique_nodes(&graph, [&unique_n1[..], &unique_n2[..], &unique_n3[..]]);

    let expected_pairs: HashMap<EdgeType, (Vec<i64>, Vec<i64>)> = HashMap::from([
        (e1(), (compacted_n1[..5].to_vec(), compacted_n2[..5].to_vec())),
        (e2(), (compacted_n1[5..10].to_vec(), compacted_n3[..5].to_vec())),
        (e3(), (compacted_n3[5..10].to_vec(), compacted_n1[10..15].to_vec())),
    ]);

    let labeled = |u: &[i64], v: &[i64], rng: &mut XorShiftRng| {
        LinkBatch::from_pairs(NodePairs::from_vecs(u.to_vec(), v.to_vec()).unwrap())
            .with_field(Array1::from(randint(rng, 2, 5)))
    };
    let input: LinkData<LinkBatch> = [
        (e1(), labeled(&n1[..5], &n2[..5], &mut rng)),
        (e2(), labeled(&n1[5..10], &n3[..5], &mut rng)),
        (e3(), labeled(&n3[5..10], &n1[10..15], &mut rng)),
    ]
    .into_iter()
    .collect();

    let sampler = LinkNeighborSampler::new(&graph, 1, LinkedDataFormat::Independent);
    let (output, sub_graph) = sampler.sample(&input).unwrap();

    assert_eq!(collect_nodes(&graph, &sub_graph), expected_nodes);
    assert_eq!(output.num_batches(), expected_pairs.len());
    for (etype, batch) in output.as_heterogeneous().unwrap() {
        let (expected_u, expected_v) = &expected_pairs[etype];
        let original = input.get(etype).unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.vector(0).unwrap().to_vec(), *expected_u);
        assert_eq!(batch.vector(1).unwrap().to_vec(), *expected_v);
        assert_eq!(batch.fields()[2], original.fields()[2]);
        assert_eq!(batch.fields()[2].as_ptr(), original.fields()[2].as_ptr());
    }
}

#[test]
fn test_link_sampler_conditioned_format() {
    init_tracing();
    let graph = rand_graph(100, 0.05, 11);
    let mut rng = XorShiftRng::seed_from_u64(2);
    let n1 = randint(&mut rng, 33, 15);
    let n2 = randint(&mut rng, 33, 8);
    let n3 = randint(&mut rng, 33, 10);
    let (unique_n1, c1) = unique_inverse(&n1);
    let (unique_n2, c2) = unique_inverse(&n2);
    let (unique_n3, c3) = unique_inverse(&n3);
    let expected_nodes =
        expected_unique_nodes(&graph, [&unique_n1[..], &unique_n2[..], &unique_n3[..]]);

    let quad = |u: &[i64], v: &[i64], neg_u: &[i64], neg_v: &[i64]| {
        LinkBatch::from_pairs(NodePairs::from_vecs(u.to_vec(), v.to_vec()).unwrap())
            .with_field(column(neg_u))
            .with_field(column(neg_v))
    };
    // Each edge type also carries a per-edge weight past the four rewritten fields.
    let weight = |rng: &mut XorShiftRng| Array1::from(randint(rng, 10, 5));
    let input: LinkData<LinkBatch> = [
        (e1(), quad(&n1[..5], &n2[..5], &n1[..5], &n2[3..8]).with_field(weight(&mut rng))),
        (e2(), quad(&n1[5..10], &n3[..5], &n1[5..10], &n3[4..9]).with_field(weight(&mut rng))),
        (e3(), quad(&n3[5..10], &n1[10..15], &n3[5..10], &n1[2..7]).with_field(weight(&mut rng))),
    ]
    .into_iter()
    .collect();
    let expected: HashMap<EdgeType, LinkBatch> = HashMap::from([
        (e1(), quad(&c1[..5], &c2[..5], &c1[..5], &c2[3..8])),
        (e2(), quad(&c1[5..10], &c3[..5], &c1[5..10], &c3[4..9])),
        (e3(), quad(&c3[5..10], &c1[10..15], &c3[5..10], &c1[2..7])),
    ]);

    let sampler = LinkNeighborSampler::new(&graph, 1, LinkedDataFormat::Conditioned);
    let (output, sub_graph) = sampler.sample(&input).unwrap();

    assert_eq!(collect_nodes(&graph, &sub_graph), expected_nodes);
    assert_eq!(output.num_batches(), expected.len());
    for (etype, batch) in output.as_heterogeneous().unwrap() {
        let original = input.get(etype).unwrap();
        assert_eq!(batch.len(), 5);
        assert_eq!(batch.matrix(2).unwrap().dim(), (5, 1));
        assert_eq!(batch.matrix(3).unwrap().dim(), (5, 1));
        assert_eq!(&batch.fields()[..4], expected[etype].fields());
        assert_eq!(batch.fields()[4], original.fields()[4]);
        assert_eq!(batch.fields()[4].as_ptr(), original.fields()[4].as_ptr());
    }
}

#[test]
fn test_homogeneous_round_trip_through_seed_nodes() {
    init_tracing();
    let graph = FusedHeteroGraph::homogeneous(50, &[(0, 1), (2, 3), (4, 5)])
        .unwrap()
        .with_fanout(3);
    let mut rng = XorShiftRng::seed_from_u64(3);
    let (positives, ratio) = (6, 3);
    let u = randint(&mut rng, 50, positives);
    let v = randint(&mut rng, 50, positives);
    let mut negatives = || {
        Array2::from_shape_vec((positives, ratio), randint(&mut rng, 50, positives * ratio))
            .unwrap()
    };
    let (neg_u, neg_v) = (negatives(), negatives());
    let batch = LinkBatch::from_pairs(NodePairs::from_vecs(u.clone(), v.clone()).unwrap())
        .with_field(neg_u.clone())
        .with_field(neg_v.clone());

    let sampler = LinkNeighborSampler::new(&graph, ratio, LinkedDataFormat::Conditioned);
    let (output, sub_graph) = sampler.sample(&LinkData::Homogeneous(batch)).unwrap();
    let output = output.as_homogeneous().unwrap();

    let seeds = &sub_graph.seed_nodes[&EdgeType::homogeneous().src_type];
    let restore = |ids: Vec<i64>| -> Vec<i64> { ids.iter().map(|&i| seeds[i as usize]).collect() };
    assert_eq!(restore(output.vector(0).unwrap().to_vec()), u);
    assert_eq!(restore(output.vector(1).unwrap().to_vec()), v);
    assert_eq!(
        restore(output.matrix(2).unwrap().iter().copied().collect()),
        neg_u.iter().copied().collect::<Vec<_>>()
    );
    assert_eq!(
        restore(output.matrix(3).unwrap().iter().copied().collect()),
        neg_v.iter().copied().collect::<Vec<_>>()
    );
}

#[test]
fn test_config_driven_sampler() {
    let graph = rand_graph(100, 0.05, 5);
    let config =
        LinkSamplerConfig::from_json(r#"{"negative_ratio": 2, "format": "Conditioned"}"#)
            .unwrap();
    let sampler = LinkNeighborSampler::from_config(&graph, &config).unwrap();
    assert!(sampler.has_conditioned_negative());

    let batch = LinkBatch::from_pairs(NodePairs::from_vecs(vec![1, 2], vec![3, 4]).unwrap())
        .with_field(Array2::from_shape_vec((2, 2), vec![5, 6, 7, 8]).unwrap())
        .with_field(Array2::from_shape_vec((2, 2), vec![9, 10, 11, 12]).unwrap());
    let input: LinkData<LinkBatch> = [(e3(), batch)].into_iter().collect();

    let (output, sub_graph) = sampler.sample(&input).unwrap();
    assert_eq!(output.get(&e3()).unwrap().matrix(2).unwrap().dim(), (2, 2));
    assert_eq!(sub_graph.num_edges(), 6);
    assert_eq!(sub_graph.node_pairs.len(), 1);

    let bad = config.with_format("pairwise");
    assert!(LinkNeighborSampler::from_config(&graph, &bad).is_err());
}

#[test]
fn test_sampler_through_shared_graph() {
    let graph = std::sync::Arc::new(FusedHeteroGraph::homogeneous(4, &[(0, 1)]).unwrap());
    let sampler = LinkNeighborSampler::new(graph.clone(), 0, LinkedDataFormat::Conditioned);
    let batch = LinkBatch::from_pairs(NodePairs::from_vecs(vec![3], vec![1]).unwrap());

    let (output, _) = sampler.sample(&LinkData::Homogeneous(batch)).unwrap();
    assert_eq!(output.as_homogeneous().unwrap().vector(0).unwrap().to_vec(), vec![1]);

    let seed = LinkData::Homogeneous(NodePairs::from_vecs(vec![2], vec![2]).unwrap());
    let (pairs, sub_graph) = graph.sample_neighbors_for_pairs(seed).unwrap();
    assert_eq!(pairs.as_homogeneous().unwrap().src().to_vec(), vec![0]);
    assert_eq!(sub_graph.original_node_ids, vec![2]);
}
