use super::*;
use crate::graph::{GraphEdge, LinkGraph, MemoryLinkGraph, OpenTriangle, TRIANGLE_PROVENANCE};
use crate::kinds::birth;
use crate::measure::{Aggregation, CompositeMeasure, Jaccard, MeasureConfig, RecordMeasure};
use crate::types::{Record, RecordId, RecordKind, RecordSet};
use crate::LinkageError;
use std::sync::Arc;

const SIB: &str = "SIBLING";

fn create_test_graph(edges: &[(RecordId, RecordId, f64)]) -> MemoryLinkGraph {
    let mut graph = MemoryLinkGraph::new();
    for &(a, b, d) in edges {
        graph.add_edge(GraphEdge::new(a, b, SIB, d, "test")).unwrap();
    }
    graph
}

fn resolver() -> TriangleResolver {
    TriangleResolver::new(TriangleResolverConfig::default()).unwrap()
}

fn resolve_one(
    resolver: &TriangleResolver,
    graph: &mut MemoryLinkGraph,
    triangle: OpenTriangle,
) -> (Resolution, ResolutionTally) {
    let mut tally = ResolutionTally::new();
    let resolution = resolver.resolve_triangle(graph, &triangle, &mut tally).unwrap();
    (resolution, tally)
}

#[test]
fn test_low_distance_closes_triangle() {
    let mut graph = create_test_graph(&[(1, 2, 0.05), (2, 3, 0.05)]);
    let tally = resolver().resolve(&mut graph).unwrap();

    assert_eq!(tally.triangles_examined, 1);
    assert_eq!(tally.established_low_distance, 1);
    let added = graph
        .edges(SIB)
        .into_iter()
        .find(|e| e.connects(1, 3))
        .unwrap();
    assert!((added.distance - 0.1).abs() < 1e-12);
    assert_eq!(added.provenance, TRIANGLE_PROVENANCE);
    assert!(graph.open_triangles(SIB).unwrap().is_empty());
}

#[test]
fn test_high_distance_without_support_cuts_larger_edge() {
    let r = resolver();

    // equal distances cut x - y
    let mut graph = create_test_graph(&[(1, 2, 0.4), (2, 3, 0.4)]);
    let (resolution, tally) = resolve_one(&r, &mut graph, OpenTriangle::new(1, 2, 3, 0.4, 0.4));
    assert_eq!(resolution, Resolution::Cut(vec![(1, 2)]));
    assert_eq!(tally.edges_cut, 1);
    assert!(!graph.has_edge(1, 2, SIB).unwrap());
    assert!(graph.has_edge(2, 3, SIB).unwrap());
    assert!(graph.is_deleted(1, 2, SIB).unwrap());
    assert_eq!(
        graph.deleted_edges(SIB),
        vec![GraphEdge::new(1, 2, SIB, 0.4, TRIANGLE_PROVENANCE)]
    );

    // the cut pair stays cut
    assert!(!graph.add_edge(GraphEdge::new(2, 1, SIB, 0.1, "relinked")).unwrap());
    assert!(!graph.has_edge(1, 2, SIB).unwrap());

    let mut graph = create_test_graph(&[(1, 2, 0.3), (2, 3, 0.45)]);
    let (resolution, _) = resolve_one(&r, &mut graph, OpenTriangle::new(1, 2, 3, 0.3, 0.45));
    assert_eq!(resolution, Resolution::Cut(vec![(2, 3)]));
    assert!(graph.has_edge(1, 2, SIB).unwrap());
}

#[test]
fn test_strict_variant_cuts_both_edges() {
    let r = TriangleResolver::new(TriangleResolverConfig::new().with_cut_policy(CutPolicy::Both)).unwrap();
    let mut graph = create_test_graph(&[(1, 2, 0.4), (2, 3, 0.4)]);
    let tally = r.resolve(&mut graph).unwrap();
    assert_eq!(tally.edges_cut, 2);
    assert_eq!(graph.edge_count(SIB), 0);
}

#[test]
fn test_middle_band_is_left_alone() {
    let mut graph = create_test_graph(&[(1, 2, 0.15), (2, 3, 0.15)]);
    let tally = resolver().resolve(&mut graph).unwrap();
    assert_eq!(tally.left_as_is, 1);
    assert_eq!(graph.edge_count(SIB), 2);
}

#[test]
fn test_shared_neighbours_close_triangle() {
    // 1 and 3 both know 2 and 4
    let mut graph = create_test_graph(&[(1, 2, 0.3), (2, 3, 0.3), (1, 4, 0.3), (4, 3, 0.3)]);
    let (resolution, tally) = resolve_one(&resolver(), &mut graph, OpenTriangle::new(1, 2, 3, 0.3, 0.3));
    assert_eq!(resolution, Resolution::Established(Establishment::SharedNeighbours(2)));
    assert_eq!(tally.established_shared_support, 1);
    assert!(graph.has_edge(1, 3, SIB).unwrap());

    // a higher support requirement falls through to the cut rule
    let strict = TriangleResolver::new(TriangleResolverConfig::new().with_support_threshold(3)).unwrap();
    let mut graph = create_test_graph(&[(1, 2, 0.3), (2, 3, 0.3), (1, 4, 0.3), (4, 3, 0.3)]);
    let (resolution, _) = resolve_one(&strict, &mut graph, OpenTriangle::new(1, 2, 3, 0.3, 0.3));
    assert_eq!(resolution, Resolution::Cut(vec![(1, 2)]));
}

#[test]
fn test_degenerate_triangle_is_counted() {
    let mut graph = create_test_graph(&[(1, 2, 0.05)]);
    let (resolution, tally) = resolve_one(&resolver(), &mut graph, OpenTriangle::new(1, 2, 1, 0.05, 0.05));
    assert_eq!(resolution, Resolution::Degenerate);
    assert_eq!(tally.degenerate, 1);
    assert_eq!(graph.edge_count(SIB), 1);
}

#[test]
fn test_resolution_is_idempotent() {
    let r = resolver();
    let mut graph = create_test_graph(&[(1, 2, 0.05), (2, 3, 0.05), (4, 5, 0.4), (5, 6, 0.4)]);
    let first = r.resolve(&mut graph).unwrap();
    assert_eq!(first.established(), 1);
    assert_eq!(first.edges_cut, 1);
    let after_first = graph.edges(SIB);

    let second = r.resolve(&mut graph).unwrap();
    assert_eq!(second.triangles_examined, 0);
    assert_eq!(graph.edges(SIB), after_first);

    // replaying an already closed triangle changes nothing
    let (resolution, tally) = resolve_one(&r, &mut graph, OpenTriangle::new(1, 2, 3, 0.05, 0.05));
    assert_eq!(resolution, Resolution::AlreadyConsistent);
    assert_eq!(tally.already_consistent, 1);
    assert_eq!(graph.edges(SIB), after_first);
}

#[test]
fn test_triangles_broken_earlier_in_the_pass_are_stale() {
    // star around 2: (1,2,3), (1,2,4), (3,2,4)
    let mut graph = create_test_graph(&[(1, 2, 0.4), (2, 3, 0.4), (2, 4, 0.4)]);
    let tally = resolver().resolve(&mut graph).unwrap();
    assert_eq!(tally.triangles_examined, 3);
    assert_eq!(tally.stale, 1);
    assert_eq!(tally.edges_cut, 2);
    assert_eq!(graph.edges(SIB).len(), 1);
    assert!(graph.has_edge(2, 4, SIB).unwrap());
}

#[test]
fn test_implausible_triangle_skips_closing_rules() {
    let r = resolver().with_plausibility(|_: RecordId, _: RecordId, _: RecordId| false);

    let mut graph = create_test_graph(&[(1, 2, 0.05), (2, 3, 0.05)]);
    let (resolution, tally) = resolve_one(&r, &mut graph, OpenTriangle::new(1, 2, 3, 0.05, 0.05));
    assert_eq!(resolution, Resolution::LeftAsIs);
    assert_eq!(tally.implausible, 1);
    assert!(!graph.has_edge(1, 3, SIB).unwrap());

    let mut graph = create_test_graph(&[(1, 2, 0.4), (2, 3, 0.4)]);
    let (resolution, _) = resolve_one(&r, &mut graph, OpenTriangle::new(1, 2, 3, 0.4, 0.4));
    assert_eq!(resolution, Resolution::Cut(vec![(1, 2)]));
}

#[test]
fn test_birth_year_plausibility_in_resolver() {
    let records: RecordSet = [(1, "1850"), (2, "1860"), (3, "1899")]
        .into_iter()
        .map(|(id, year)| Record::with_fields(id, RecordKind::Birth, &[(birth::BIRTH_YEAR, year)]).unwrap())
        .collect();
    let r = resolver().with_plausibility(BirthYearSpread::new(records, 40));

    let mut graph = create_test_graph(&[(1, 2, 0.05), (2, 3, 0.05)]);
    let tally = r.resolve(&mut graph).unwrap();
    assert_eq!(tally.implausible, 1);
    assert_eq!(tally.established(), 0);
}

fn group_record(id: RecordId, forename: &str, surname: &str) -> Record {
    Record::with_fields(id, RecordKind::Birth, &[(birth::FORENAME, forename), (birth::SURNAME, surname)]).unwrap()
}

fn name_measure() -> Arc<dyn RecordMeasure> {
    Arc::new(
        CompositeMeasure::new(
            Arc::new(Jaccard),
            vec![birth::FORENAME, birth::SURNAME],
            MeasureConfig::new().with_aggregation(Aggregation::Mean),
        )
        .unwrap(),
    )
}

/// Five identical Mary Smiths around 1, four identical Jonathan Blackwoods
/// around 6, and one bridging edge 1 - 6.
fn bridged_families() -> (MemoryLinkGraph, RecordSet) {
    let records: RecordSet = (1..=9)
        .map(|id| {
            if id <= 5 {
                group_record(id, "mary", "smith")
            } else {
                group_record(id, "jonathan", "blackwood")
            }
        })
        .collect();
    let graph = create_test_graph(&[
        (1, 2, 0.0),
        (1, 3, 0.0),
        (1, 4, 0.0),
        (1, 5, 0.0),
        (6, 7, 0.0),
        (6, 8, 0.0),
        (6, 9, 0.0),
        (1, 6, 0.3),
    ]);
    (graph, records)
}

#[test]
fn test_cluster_repair_cuts_bridge_between_families() {
    let (mut graph, records) = bridged_families();
    let cluster = ClusterRepair::new(ClusterRepairConfig::default(), name_measure(), records).unwrap();
    let r = resolver().with_cluster_repair(cluster);

    let (resolution, tally) = resolve_one(&r, &mut graph, OpenTriangle::new(2, 1, 6, 0.0, 0.3));
    assert_eq!(resolution, Resolution::ClusterRepaired(1));
    assert_eq!(tally.clusters_examined, 1);
    assert_eq!(tally.clusters_split, 1);
    assert_eq!(tally.cluster_edges_cut, 1);
    assert!(!graph.has_edge(1, 6, SIB).unwrap());
    assert!(graph.is_deleted(1, 6, SIB).unwrap());
    assert_eq!(graph.edge_count(SIB), 7);
}

#[test]
fn test_small_neighbourhood_uses_pairwise_rules() {
    let (mut graph, records) = bridged_families();
    let config = ClusterRepairConfig::new().with_neighbourhood_size(20);
    let cluster = ClusterRepair::new(config, name_measure(), records).unwrap();
    let r = resolver().with_cluster_repair(cluster);

    let (resolution, tally) = resolve_one(&r, &mut graph, OpenTriangle::new(2, 1, 6, 0.0, 0.3));
    assert_eq!(resolution, Resolution::LeftAsIs);
    assert_eq!(tally.clusters_examined, 0);
    assert!(graph.has_edge(1, 6, SIB).unwrap());
}

#[test]
fn test_cluster_repair_needs_every_record() {
    let (mut graph, _) = bridged_families();
    let partial: RecordSet = (1..=5).map(|id| group_record(id, "mary", "smith")).collect();
    let cluster = ClusterRepair::new(ClusterRepairConfig::default(), name_measure(), partial).unwrap();
    let r = resolver().with_cluster_repair(cluster);

    let mut tally = ResolutionTally::new();
    let err = r
        .resolve_triangle(&mut graph, &OpenTriangle::new(2, 1, 6, 0.0, 0.3), &mut tally)
        .unwrap_err();
    assert!(matches!(err, LinkageError::RecordNotFound(6)));
}

#[test]
fn test_neighbourhood_collects_short_walks() {
    let (graph, records) = bridged_families();
    let cluster = ClusterRepair::new(ClusterRepairConfig::default(), name_measure(), records).unwrap();
    let hood = cluster
        .neighbourhood(&graph, &OpenTriangle::new(2, 1, 6, 0.0, 0.3), SIB)
        .unwrap();
    assert_eq!(hood.records, (1..=9).collect::<Vec<_>>());
    assert_eq!(hood.edges.len(), 8);
    assert!(cluster.applies(&hood));
}

#[test]
fn test_tally_merge_and_summary() {
    let mut total = ResolutionTally::new();
    let mut one = ResolutionTally::new();
    one.triangles_examined = 2;
    one.edges_cut = 1;
    total.merge(&one);
    total.merge(&one);
    assert_eq!(total.triangles_examined, 4);
    assert!(total.summary().contains("cut 2"));
}
