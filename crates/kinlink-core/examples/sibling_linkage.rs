//! Link a small parish register's births into sibling groups, then repair
//! the resulting graph.
//!
//! Run with `RUST_LOG=info cargo run --example sibling_linkage`.

use anyhow::Context;
use kinlink_core::kinds::birth;
use kinlink_core::*;
use std::sync::Arc;

/// (id, forename, birth year, father, mother, mother's maiden name, place of marriage)
const REGISTER: &[(u64, &str, &str, &str, &str, &str, &str)] = &[
    (1, "margaret", "1861", "alexander", "janet", "reid", "kilmany"),
    (2, "john", "1863", "alexander", "janet", "reid", "kilmany"),
    (3, "alexander", "1866", "alexr", "janet", "reid", "kilmany"),
    (4, "helen", "1868", "alexander", "jessie", "reid", "kilmany"),
    (5, "william", "1862", "david", "isabella", "brown", "cupar"),
    (6, "isabella", "1865", "david", "isabella", "broun", "cupar"),
    (7, "david", "1867", "david", "isabella", "brown", "cupar"),
    (8, "agnes", "1864", "thomas", "agnes", "white", "leuchars"),
];

fn register() -> anyhow::Result<RecordSet> {
    REGISTER
        .iter()
        .map(|&(id, forename, year, father, mother, maiden, place)| {
            Record::with_fields(
                id,
                RecordKind::Birth,
                &[
                    (birth::FORENAME, forename),
                    (birth::SURNAME, "unknown"),
                    (birth::BIRTH_YEAR, year),
                    (birth::FATHER_FORENAME, father),
                    (birth::MOTHER_FORENAME, mother),
                    (birth::MOTHER_MAIDEN_SURNAME, maiden),
                    (birth::PARENTS_PLACE_OF_MARRIAGE, place),
                ],
            )
            .with_context(|| format!("building birth record {id}"))
        })
        .collect()
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let births = register()?;
    let recipe = LinkageRecipe::birth_sibling();
    let measure_config = MeasureConfig::new().with_aggregation(Aggregation::Mean);

    let strategy = recipe.search_strategy(
        PivotIndexFactory::new(SearchConfig::default()),
        Arc::new(Jaccard),
        measure_config,
    )?;
    let linker = Linker::new(strategy, recipe.linker_config(0.12))?
        .with_shared_viability(recipe.viability(&LinkageConstraints::default()));
    let resolver = TriangleResolver::new(TriangleResolverConfig::default())?
        .with_plausibility(BirthYearSpread::new(births.clone(), 40));

    let mut graph = MemoryLinkGraph::new();
    let report = LinkagePipeline::new(linker)
        .with_resolver(resolver)
        .run(births.clone(), births, &mut graph)?;

    println!("{}", report.summary());
    for edge in graph.edges(recipe.link_type) {
        println!("{} - {}  {:.3}  ({})", edge.a, edge.b, edge.distance, edge.provenance);
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
