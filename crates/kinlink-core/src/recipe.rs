//! Ready-made linkage setups for the common record pairings.

use crate::error::Result;
use crate::kinds::{birth, death};
use crate::linker::{
    BirthDeathIdentity, BruteForceStrategy, FieldMapping, LinkViability, LinkageConstraints,
    LinkerConfig, ParentAgeAtBirth, SiblingAgeGap, SimilaritySearchStrategy,
};
use crate::measure::{CompositeMeasure, MeasureConfig, StringMeasure};
use crate::relations::{link_types, roles};
use crate::search::SearchStructureFactory;
use crate::types::RecordKind;
use std::sync::Arc;

const SIBLING_FIELDS: &[usize] = &[
    birth::FATHER_FORENAME,
    birth::FATHER_SURNAME,
    birth::MOTHER_FORENAME,
    birth::MOTHER_MAIDEN_SURNAME,
    birth::PARENTS_PLACE_OF_MARRIAGE,
    birth::PARENTS_DAY_OF_MARRIAGE,
    birth::PARENTS_MONTH_OF_MARRIAGE,
    birth::PARENTS_YEAR_OF_MARRIAGE,
];

const BIRTH_IDENTITY_FIELDS: &[usize] = &[
    birth::FORENAME,
    birth::SURNAME,
    birth::FATHER_FORENAME,
    birth::FATHER_SURNAME,
    birth::MOTHER_FORENAME,
    birth::MOTHER_MAIDEN_SURNAME,
];

const DEATH_IDENTITY_FIELDS: &[usize] = &[
    death::FORENAME,
    death::SURNAME,
    death::FATHER_FORENAME,
    death::FATHER_SURNAME,
    death::MOTHER_FORENAME,
    death::MOTHER_MAIDEN_SURNAME,
];

const PARENT_OWN_FIELDS: &[usize] = &[birth::FORENAME, birth::SURNAME];
const CHILD_FATHER_FIELDS: &[usize] = &[birth::FATHER_FORENAME, birth::FATHER_SURNAME];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Check {
    SiblingAgeGap,
    BirthDeathIdentity,
    ParentAgeAtBirth,
}

/// Everything that varies between kinds of linkage: which records are
/// compared on which fields, what the link means, and which pairs are
/// impossible regardless of distance.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkageRecipe {
    pub name: &'static str,
    pub link_type: &'static str,
    pub stored_kind: RecordKind,
    pub stored_role: &'static str,
    pub stored_fields: &'static [usize],
    pub query_kind: RecordKind,
    pub query_role: &'static str,
    pub query_fields: &'static [usize],
    check: Check,
}

impl LinkageRecipe {
    /// Births sharing parents.
    pub fn birth_sibling() -> Self {
        Self {
            name: "birth-birth-sibling",
            link_type: link_types::SIBLING,
            stored_kind: RecordKind::Birth,
            stored_role: roles::BABY,
            stored_fields: SIBLING_FIELDS,
            query_kind: RecordKind::Birth,
            query_role: roles::BABY,
            query_fields: SIBLING_FIELDS,
            check: Check::SiblingAgeGap,
        }
    }

    /// A birth and the death of the same person.
    pub fn birth_death_identity() -> Self {
        Self {
            name: "birth-death-identity",
            link_type: link_types::IDENTITY,
            stored_kind: RecordKind::Birth,
            stored_role: roles::BABY,
            stored_fields: BIRTH_IDENTITY_FIELDS,
            query_kind: RecordKind::Death,
            query_role: roles::DECEASED,
            query_fields: DEATH_IDENTITY_FIELDS,
            check: Check::BirthDeathIdentity,
        }
    }

    /// A father's own birth and the birth of his child.
    pub fn birth_father() -> Self {
        Self {
            name: "birth-birth-father",
            link_type: link_types::PARENT,
            stored_kind: RecordKind::Birth,
            stored_role: roles::FATHER,
            stored_fields: PARENT_OWN_FIELDS,
            query_kind: RecordKind::Birth,
            query_role: roles::BABY,
            query_fields: CHILD_FATHER_FIELDS,
            check: Check::ParentAgeAtBirth,
        }
    }

    /// Same kind and same fields on both sides.
    pub fn is_symmetric(&self) -> bool {
        self.stored_kind == self.query_kind && self.stored_fields == self.query_fields
    }

    /// Stored records against query records, field lists checked against
    /// both kinds.
    pub fn measure(&self, base: Arc<dyn StringMeasure>, config: MeasureConfig) -> Result<CompositeMeasure> {
        CompositeMeasure::between(
            base,
            self.stored_fields.to_vec(),
            self.query_fields.to_vec(),
            config,
        )?
        .for_kinds(self.stored_kind, self.query_kind)
    }

    /// Conversion of query records into the stored layout, when they differ.
    pub fn mapping(&self) -> Result<Option<FieldMapping>> {
        if self.is_symmetric() {
            return Ok(None);
        }
        FieldMapping::new(
            self.query_kind,
            self.query_fields.to_vec(),
            self.stored_kind,
            self.stored_fields.to_vec(),
        )
        .map(Some)
    }

    pub fn linker_config(&self, threshold: f64) -> LinkerConfig {
        LinkerConfig::new()
            .with_threshold(threshold)
            .with_link_type(self.link_type)
            .with_roles(self.stored_role, self.query_role)
            .with_provenance(self.name)
    }

    pub fn viability(&self, constraints: &LinkageConstraints) -> Arc<dyn LinkViability> {
        match self.check {
            Check::SiblingAgeGap => Arc::new(SiblingAgeGap::new(constraints)),
            Check::BirthDeathIdentity => Arc::new(BirthDeathIdentity::new(constraints)),
            Check::ParentAgeAtBirth => Arc::new(ParentAgeAtBirth::new(constraints)),
        }
    }

    pub fn brute_force_strategy(
        &self,
        base: Arc<dyn StringMeasure>,
        config: MeasureConfig,
    ) -> Result<BruteForceStrategy> {
        Ok(BruteForceStrategy::new(Arc::new(self.measure(base, config)?)))
    }

    /// An index over the stored records under their own fields; query
    /// records are remapped first when the two sides differ.
    pub fn search_strategy<F: SearchStructureFactory>(
        &self,
        factory: F,
        base: Arc<dyn StringMeasure>,
        config: MeasureConfig,
    ) -> Result<SimilaritySearchStrategy<F>> {
        let index_measure = self.measure(base, config)?.homogeneous();
        let strategy = SimilaritySearchStrategy::new(factory, Arc::new(index_measure));
        Ok(match self.mapping()? {
            Some(mapping) => strategy.with_mapping(mapping),
            None => strategy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::{Aggregation, Levenshtein, RecordMeasure};
    use crate::types::{Record, RecordPair};

    fn mean() -> MeasureConfig {
        MeasureConfig::new().with_aggregation(Aggregation::Mean)
    }

    #[test]
    fn test_sibling_recipe_is_symmetric() {
        let recipe = LinkageRecipe::birth_sibling();
        assert!(recipe.is_symmetric());
        assert!(recipe.mapping().unwrap().is_none());

        let config = recipe.linker_config(0.3);
        assert_eq!(config.link_type, "SIBLING");
        assert_eq!(config.provenance, "birth-birth-sibling");
        assert_eq!(config.threshold, 0.3);
    }

    #[test]
    fn test_identity_recipe_maps_deaths_onto_births() {
        let recipe = LinkageRecipe::birth_death_identity();
        let mapping = recipe.mapping().unwrap().unwrap();
        assert_eq!(mapping.from_kind(), RecordKind::Death);
        assert_eq!(mapping.to_kind(), RecordKind::Birth);

        let died = Record::with_fields(
            9,
            RecordKind::Death,
            &[(death::FORENAME, "jessie"), (death::MOTHER_MAIDEN_SURNAME, "reid")],
        )
        .unwrap();
        let converted = mapping.convert(&died).unwrap();
        assert_eq!(converted.id(), 9);
        assert_eq!(converted.field(birth::FORENAME), "jessie");
        assert_eq!(converted.field(birth::MOTHER_MAIDEN_SURNAME), "reid");

        let config = recipe.linker_config(0.5);
        assert_eq!((config.stored_role.as_str(), config.query_role.as_str()), ("baby", "deceased"));
    }

    #[test]
    fn test_identity_measure_compares_across_kinds() {
        let recipe = LinkageRecipe::birth_death_identity();
        let measure = recipe.measure(Arc::new(Levenshtein), mean().with_cut_off(4.0)).unwrap();
        let born = Record::with_fields(
            1,
            RecordKind::Birth,
            &[(birth::FORENAME, "jessie"), (birth::SURNAME, "gray")],
        )
        .unwrap();
        let died = Record::with_fields(
            2,
            RecordKind::Death,
            &[(death::FORENAME, "jessie"), (death::SURNAME, "grey")],
        )
        .unwrap();
        // one substitution in one of six fields, the rest both empty
        assert!((measure.distance(&born, &died) - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_father_recipe_checks_parent_age() {
        let recipe = LinkageRecipe::birth_father();
        let viability = recipe.viability(&LinkageConstraints::default());
        let year = |id, y: &str| Arc::new(Record::with_fields(id, RecordKind::Birth, &[(birth::BIRTH_YEAR, y)]).unwrap());

        assert!(viability.is_viable(&RecordPair::new(year(1, "1840"), year(2, "1870"), 0.0)));
        assert!(!viability.is_viable(&RecordPair::new(year(1, "1860"), year(2, "1870"), 0.0)));
        assert_eq!(recipe.link_type, "PARENT");
        assert!(!recipe.is_symmetric());
    }

    #[test]
    fn test_recipes_use_known_link_types() {
        let known = link_types::all();
        for recipe in [
            LinkageRecipe::birth_sibling(),
            LinkageRecipe::birth_death_identity(),
            LinkageRecipe::birth_father(),
        ] {
            assert!(known.contains(&recipe.link_type), "{}", recipe.name);
            assert!(recipe.measure(Arc::new(Levenshtein), mean().with_cut_off(3.0)).is_ok());
        }
    }
}
