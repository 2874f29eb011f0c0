//! End-to-end linkage scenarios over small hand-built registers.

#![allow(clippy::unwrap_used)]

use kinlink_core::kinds::{birth, death};
use kinlink_core::*;
use std::collections::BTreeSet;
use std::sync::Arc;

fn birth_record(id: RecordId, forename: &str, surname: &str) -> Record {
    Record::with_fields(id, RecordKind::Birth, &[(birth::FORENAME, forename), (birth::SURNAME, surname)]).unwrap()
}

fn quiet(config: LinkerConfig) -> LinkerConfig {
    config.with_progress_updates(0)
}

fn pivot_factory() -> PivotIndexFactory {
    PivotIndexFactory::new(SearchConfig::new().with_min_reference_points(1))
}

fn unordered_pairs<S: CandidateStrategy>(linker: &mut Linker<S>, set1: &RecordSet, set2: &RecordSet) -> BTreeSet<(RecordId, RecordId)> {
    linker.add_records(set1.clone(), set2.clone()).unwrap();
    linker
        .get_links()
        .unwrap()
        .map(|link| link.unwrap().unordered_key())
        .collect()
}

#[test]
fn test_jaccard_forename_variants() {
    let births: RecordSet = [(1, "anna"), (2, "anne"), (3, "anny")]
        .into_iter()
        .map(|(id, f)| birth_record(id, f, "smith"))
        .collect();
    let measure: Arc<dyn RecordMeasure> = Arc::new(
        CompositeMeasure::new(
            Arc::new(Jaccard),
            vec![birth::FORENAME, birth::SURNAME],
            MeasureConfig::new().with_aggregation(Aggregation::Mean),
        )
        .unwrap(),
    );

    let all: BTreeSet<_> = [(1, 2), (1, 3), (2, 3)].into_iter().collect();
    for (threshold, expected) in [(0.5, all), (0.05, BTreeSet::new())] {
        let config = quiet(LinkerConfig::new().with_threshold(threshold));
        let mut brute = Linker::new(BruteForceStrategy::new(measure.clone()), config.clone()).unwrap();
        assert_eq!(unordered_pairs(&mut brute, &births, &births), expected);

        let strategy = SimilaritySearchStrategy::new(pivot_factory(), measure.clone());
        let mut search = Linker::new(strategy, config).unwrap();
        assert_eq!(unordered_pairs(&mut search, &births, &births), expected);
    }
}

/// Squared length difference; "a" -> "aa" -> "aaa" costs 1 + 1 but
/// "a" -> "aaa" costs 4.
#[derive(Debug)]
struct SquaredLengthGap;

impl StringMeasure for SquaredLengthGap {
    fn name(&self) -> &'static str {
        "squared length gap"
    }

    fn distance(&self, a: &str, b: &str) -> f64 {
        let gap = a.chars().count() as f64 - b.chars().count() as f64;
        gap * gap
    }

    fn max_distance_is_one(&self) -> bool {
        false
    }

    fn is_metric(&self) -> bool {
        false
    }
}

#[test]
fn test_triangle_inequality_is_not_assumed() {
    let records: RecordSet = [(1, "a"), (2, "aa"), (3, "aaa")]
        .into_iter()
        .map(|(id, f)| birth_record(id, f, ""))
        .collect();
    let measure = CompositeMeasure::new(
        Arc::new(SquaredLengthGap),
        vec![birth::FORENAME],
        MeasureConfig::new().with_missing_cap(100.0),
    )
    .unwrap();
    assert!(!measure.is_metric());

    let (a, b, c) = (records.get(1).unwrap(), records.get(2).unwrap(), records.get(3).unwrap());
    assert!(measure.distance(a, b) + measure.distance(b, c) < measure.distance(a, c));

    let measure: Arc<dyn RecordMeasure> = Arc::new(measure);
    let index = PivotIndex::with_config(
        measure.clone(),
        records.records().to_vec(),
        SearchConfig::new().with_reference_points(1).with_min_reference_points(1),
    )
    .unwrap();
    let found: Vec<(RecordId, f64)> = index
        .find_within_threshold(a, 4.0)
        .unwrap()
        .iter()
        .map(|hit| (hit.record.id(), hit.distance))
        .collect();
    assert_eq!(found, vec![(1, 0.0), (2, 1.0), (3, 4.0)]);

    let config = quiet(LinkerConfig::new().with_threshold(4.0));
    let mut brute = Linker::new(BruteForceStrategy::new(measure.clone()), config.clone()).unwrap();
    let mut search = Linker::new(SimilaritySearchStrategy::new(pivot_factory(), measure), config).unwrap();
    let brute_pairs = unordered_pairs(&mut brute, &records, &records);
    assert!(brute_pairs.contains(&(1, 3)));
    assert_eq!(brute_pairs, unordered_pairs(&mut search, &records, &records));
}

fn normalised_levenshtein(cut_off: f64) -> Arc<dyn RecordMeasure> {
    Arc::new(
        CompositeMeasure::new(
            Arc::new(Levenshtein),
            vec![birth::FORENAME],
            MeasureConfig::new().with_cut_off(cut_off).with_normalise(true),
        )
        .unwrap(),
    )
}

#[test]
fn test_pipeline_closes_low_distance_triangle() {
    // ab - abc - abcd at 0.05 each; ab - abcd at 0.1 is over the threshold
    let births: RecordSet = [(1, "ab"), (2, "abc"), (3, "abcd")]
        .into_iter()
        .map(|(id, f)| birth_record(id, f, ""))
        .collect();
    let linker = Linker::new(
        BruteForceStrategy::new(normalised_levenshtein(20.0)),
        quiet(LinkerConfig::new().with_threshold(0.06)),
    )
    .unwrap();
    let resolver = TriangleResolver::new(TriangleResolverConfig::default()).unwrap();

    let mut graph = MemoryLinkGraph::new();
    let report = LinkagePipeline::new(linker)
        .with_resolver(resolver)
        .run(births.clone(), births, &mut graph)
        .unwrap();

    assert_eq!(report.linkage.links_emitted, 4);
    assert_eq!(report.edges_inserted, 2);
    assert_eq!(report.edges_existing, 2);
    let resolution = report.resolution.unwrap();
    assert_eq!(resolution.established_low_distance, 1);

    assert_eq!(graph.edge_count("SIBLING"), 3);
    let closing = graph.edges("SIBLING").into_iter().find(|e| e.connects(1, 3)).unwrap();
    assert_eq!(closing.provenance, TRIANGLE_PROVENANCE);
    assert!((closing.distance - 0.1).abs() < 1e-12);
}

#[test]
fn test_pipeline_cuts_unsupported_high_distance_triangle() {
    // aa - aabb - bbbb at 0.4 each; aa - bbbb at 0.8 is over the threshold
    let births: RecordSet = [(1, "aa"), (2, "aabb"), (3, "bbbb")]
        .into_iter()
        .map(|(id, f)| birth_record(id, f, ""))
        .collect();
    let strategy = SimilaritySearchStrategy::new(pivot_factory(), normalised_levenshtein(5.0));
    let linker = Linker::new(strategy, quiet(LinkerConfig::new().with_threshold(0.5))).unwrap();
    let resolver = TriangleResolver::new(TriangleResolverConfig::default()).unwrap();

    let mut graph = MemoryLinkGraph::new();
    let report = LinkagePipeline::new(linker)
        .with_resolver(resolver)
        .run(births.clone(), births.clone(), &mut graph)
        .unwrap();

    assert_eq!(report.resolution.unwrap().edges_cut, 1);
    assert_eq!(graph.edge_count("SIBLING"), 1);
    assert!(!graph.has_edge(1, 3, "SIBLING").unwrap());
    assert!(graph.has_edge(1, 2, "SIBLING").unwrap() ^ graph.has_edge(2, 3, "SIBLING").unwrap());

    let cut = graph.deleted_edges("SIBLING");
    assert_eq!(cut.len(), 1);
    assert_eq!(cut[0].provenance, TRIANGLE_PROVENANCE);

    // linking again finds the same pairs but the cut one stays out
    let strategy = SimilaritySearchStrategy::new(pivot_factory(), normalised_levenshtein(5.0));
    let linker = Linker::new(strategy, quiet(LinkerConfig::new().with_threshold(0.5))).unwrap();
    let resolver = TriangleResolver::new(TriangleResolverConfig::default()).unwrap();
    let again = LinkagePipeline::new(linker)
        .with_resolver(resolver)
        .run(births.clone(), births, &mut graph)
        .unwrap();
    assert_eq!((again.edges_inserted, again.edges_existing, again.edges_refused), (0, 2, 2));
    assert_eq!(again.resolution.unwrap().triangles_examined, 0);
    assert_eq!(graph.edge_count("SIBLING"), 1);
    assert!(!graph.has_edge(cut[0].a, cut[0].b, "SIBLING").unwrap());
}

fn identity_births() -> RecordSet {
    [(1, "jessie", "1850"), (2, "john", "1852")]
        .into_iter()
        .map(|(id, f, year)| {
            Record::with_fields(
                id,
                RecordKind::Birth,
                &[(birth::FORENAME, f), (birth::SURNAME, "gray"), (birth::BIRTH_YEAR, year)],
            )
            .unwrap()
        })
        .collect()
}

fn identity_deaths() -> RecordSet {
    [
        (11, "jessie", "grey", "1910", "60"),
        (12, "jessie", "gray", "1840", ""),
        (13, "john", "gray", "1900", "48"),
    ]
    .into_iter()
    .map(|(id, f, s, year, age)| {
        Record::with_fields(
            id,
            RecordKind::Death,
            &[
                (death::FORENAME, f),
                (death::SURNAME, s),
                (death::DEATH_YEAR, year),
                (death::AGE_AT_DEATH, age),
            ],
        )
        .unwrap()
    })
    .collect()
}

#[test]
fn test_birth_death_identity_recipe() {
    let recipe = LinkageRecipe::birth_death_identity();
    let measure_config = MeasureConfig::new()
        .with_cut_off(5.0)
        .with_normalise(true)
        .with_aggregation(Aggregation::Mean);
    let config = quiet(recipe.linker_config(0.1));
    let viability = recipe.viability(&LinkageConstraints::default());
    let (births, deaths) = (identity_births(), identity_deaths());

    let brute = recipe.brute_force_strategy(Arc::new(Levenshtein), measure_config.clone()).unwrap();
    let mut brute = Linker::new(brute, config.clone())
        .unwrap()
        .with_shared_viability(viability.clone());
    brute.add_records(births.clone(), deaths.clone()).unwrap();
    let brute_links: Vec<Link> = brute.get_links().unwrap().map(|l| l.unwrap()).collect();

    let search = recipe
        .search_strategy(pivot_factory(), Arc::new(Levenshtein), measure_config)
        .unwrap();
    let mut search = Linker::new(search, config).unwrap().with_shared_viability(viability);
    search.add_records(births, deaths).unwrap();
    let search_links: Vec<Link> = search.get_links().unwrap().map(|l| l.unwrap()).collect();

    let keys = |links: &[Link]| links.iter().map(Link::key).collect::<BTreeSet<_>>();
    let expected: BTreeSet<_> = [(1, 11), (2, 13)].into_iter().collect();
    assert_eq!(keys(&brute_links), expected);
    assert_eq!(keys(&search_links), expected);

    let link = brute_links.iter().find(|l| l.key() == (1, 11)).unwrap();
    assert_eq!(link.link_type, "IDENTITY");
    assert_eq!((link.role1.as_str(), link.role2.as_str()), ("baby", "deceased"));
    assert!(link.provenance.starts_with("birth-death-identity, distance: "));
}

#[test]
fn test_pipeline_terminates_linker_on_error() {
    // a mapping that expects death records rejects the birth queries
    let mapping = FieldMapping::new(
        RecordKind::Death,
        vec![death::FORENAME],
        RecordKind::Birth,
        vec![birth::FORENAME],
    )
    .unwrap();
    let strategy = SimilaritySearchStrategy::new(pivot_factory(), normalised_levenshtein(5.0)).with_mapping(mapping);
    let linker = Linker::new(strategy, quiet(LinkerConfig::new())).unwrap();
    let births: RecordSet = [birth_record(1, "ann", "")].into_iter().collect();

    let mut graph = MemoryLinkGraph::new();
    let err = LinkagePipeline::new(linker)
        .run(births.clone(), births, &mut graph)
        .unwrap_err();
    assert!(matches!(err, LinkageError::Validation(_)));
    assert_eq!(graph.edge_count("SIBLING"), 0);
}

#[test]
fn test_pipeline_rejects_ids_shared_between_collections() {
    let births: RecordSet = [birth_record(1, "ann", "reid")].into_iter().collect();
    let deaths: RecordSet = [Record::with_fields(1, RecordKind::Death, &[(death::FORENAME, "ann")]).unwrap()]
        .into_iter()
        .collect();
    let recipe = LinkageRecipe::birth_death_identity();
    let strategy = recipe
        .brute_force_strategy(Arc::new(Levenshtein), MeasureConfig::new().with_cut_off(5.0))
        .unwrap();
    let linker = Linker::new(strategy, quiet(recipe.linker_config(1.0))).unwrap();

    let mut graph = MemoryLinkGraph::new();
    let err = LinkagePipeline::new(linker).run(births, deaths, &mut graph).unwrap_err();
    assert!(matches!(err, LinkageError::Validation(ref msg) if msg.contains("record id 1")));
    assert_eq!(graph.node_count(), 0);
}
