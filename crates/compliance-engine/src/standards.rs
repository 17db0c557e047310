//! Standard registry
//!
//! The catalog of labeling standards a document can be checked against.
//! Each entry carries the criteria text that is handed to the vision
//! analyzer verbatim, so new standards are added here (or through the
//! `[[standards]]` section of the configuration file) without touching the
//! prompt builder or the aggregation code.
//!
//! The registry is built once and shared read-only (`Arc<StandardRegistry>`).

use std::collections::HashMap;
use std::sync::Arc;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::error::ComplianceError;

pub const UNIFORM_LAW_LABELS: &str = "uniform_law_labels";
pub const CALIFORNIA_FLAMMABILITY: &str = "california_flammability";
pub const LABELLING_REVIEW: &str = "labelling_review";
pub const FLAMMABILITY_TEST: &str = "flammability_test";

/// What compliance means for one standard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardDefinition {
    pub id: String,
    pub name: String,
    pub criteria: String,
}

impl StandardDefinition {
    pub fn new(id: &str, name: &str, criteria: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            criteria: criteria.to_string(),
        }
    }
}

lazy_static! {
    static ref BUILTIN: Arc<StandardRegistry> = Arc::new(StandardRegistry::builtin());
}

fn builtin_definitions() -> Vec<StandardDefinition> {
    vec![
        StandardDefinition::new(
            UNIFORM_LAW_LABELS,
            "Uniform Law Labels",
            "Verify that the document carries a proper Uniform Law Label. The label should include:\n\
             1. The filling materials used in the product\n\
             2. Manufacturer information\n\
             3. Warning text such as \"DO NOT REMOVE THIS TAG\"\n\
             4. Material composition percentages\n\
             5. A registration number (REG. NO.)",
        ),
        StandardDefinition::new(
            CALIFORNIA_FLAMMABILITY,
            "California Flammability Notice (TB117)",
            "Verify that the document carries a proper California Flammability Notice (TB117). The notice should include:\n\
             1. The product's flammability performance\n\
             2. Whether flame retardant chemicals are used\n\
             3. A product safety statement\n\
             4. A California compliance declaration",
        ),
        StandardDefinition::new(
            LABELLING_REVIEW,
            "Labelling Review (16 CFR Part 1640)",
            "Verify compliance with the labelling review of 16 CFR Part 1640. Check for:\n\
             1. Flammability labeling for upholstered furniture\n\
             2. The compliance information the label must include\n\
             3. Conformance with U.S. Consumer Product Safety Commission (CPSC) requirements\n\
             4. Applicability to furniture with filling materials, excluding bedding\n\
             5. The exemption for thin products (under 0.5 inches)",
        ),
        StandardDefinition::new(
            FLAMMABILITY_TEST,
            "Flammability Test (16 CFR Part 1631)",
            "Check compliance with the flammability test standard of 16 CFR Part 1631. The label should include:\n\
             1. Basic identification\n\
             \x20  - Product name and model\n\
             \x20  - Manufacturer information\n\
             \x20  - Flammability test date\n\
             2. Test results\n\
             \x20  - A clear pass/fail status\n\
             \x20  - Conformance with the 16 CFR Part 1631 test method\n\
             \x20  - Test result validity period\n\
             3. Warning information\n\
             \x20  - A special notice if no flame retardants are used\n\
             \x20  - Safety precautions\n\
             \x20  - Required warning symbols\n\
             4. Compliance declaration\n\
             \x20  - CPSC compliance statement\n\
             \x20  - Product category\n\
             \x20  - Certification number, if applicable\n\
             5. Label requirements\n\
             \x20  - Clearly legible\n\
             \x20  - Durable material\n\
             \x20  - Securely attached to the product",
        ),
    ]
}

/// Read-only catalog of standards, in registration order.
#[derive(Debug, Clone)]
pub struct StandardRegistry {
    standards: Vec<StandardDefinition>,
    index: HashMap<String, usize>,
}

impl StandardRegistry {
    /// The built-in catalog.
    pub fn builtin() -> Self {
        // The built-in table has unique, non-empty ids (see tests).
        let standards = builtin_definitions();
        let index = standards
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.clone(), i))
            .collect();
        Self { standards, index }
    }

    /// Process-wide handle to the built-in catalog.
    pub fn shared() -> Arc<Self> {
        Arc::clone(&BUILTIN)
    }

    pub fn from_definitions(
        definitions: impl IntoIterator<Item = StandardDefinition>,
    ) -> Result<Self, ComplianceError> {
        let mut registry = Self {
            standards: Vec::new(),
            index: HashMap::new(),
        };
        for definition in definitions {
            registry.insert(definition)?;
        }
        Ok(registry)
    }

    /// Extend this catalog with more definitions. Ids must stay unique.
    pub fn with_additional(
        mut self,
        definitions: impl IntoIterator<Item = StandardDefinition>,
    ) -> Result<Self, ComplianceError> {
        for definition in definitions {
            self.insert(definition)?;
        }
        Ok(self)
    }

    fn insert(&mut self, definition: StandardDefinition) -> Result<(), ComplianceError> {
        if definition.id.trim().is_empty() {
            return Err(ComplianceError::EmptyStandardId);
        }
        if self.index.contains_key(&definition.id) {
            return Err(ComplianceError::DuplicateStandard(definition.id));
        }
        self.index
            .insert(definition.id.clone(), self.standards.len());
        self.standards.push(definition);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<&StandardDefinition, ComplianceError> {
        self.index
            .get(id)
            .map(|&i| &self.standards[i])
            .ok_or_else(|| ComplianceError::UnknownStandard(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn all(&self) -> &[StandardDefinition] {
        &self.standards
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.standards.iter().map(|s| s.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.standards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.standards.is_empty()
    }
}

impl Default for StandardRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_ids_are_unique_and_ordered() {
        let registry = StandardRegistry::builtin();
        let ids: Vec<_> = registry.ids().collect();
        assert_eq!(
            ids,
            vec![
                UNIFORM_LAW_LABELS,
                CALIFORNIA_FLAMMABILITY,
                LABELLING_REVIEW,
                FLAMMABILITY_TEST
            ]
        );

        // Rebuilding through the checked path must succeed
        let rebuilt = StandardRegistry::from_definitions(builtin_definitions()).unwrap();
        assert_eq!(rebuilt.len(), registry.len());
    }

    #[test]
    fn test_get_known_standard() {
        let registry = StandardRegistry::builtin();
        let standard = registry.get(CALIFORNIA_FLAMMABILITY).unwrap();
        assert!(standard.name.contains("TB117"));
        assert!(standard.criteria.contains("flame retardant"));
    }

    #[test]
    fn test_get_unknown_standard() {
        let registry = StandardRegistry::builtin();
        assert_eq!(
            registry.get("fire_code").unwrap_err(),
            ComplianceError::UnknownStandard("fire_code".to_string())
        );
        assert!(!registry.contains("fire_code"));
    }

    #[test]
    fn test_with_additional_appends() {
        let registry = StandardRegistry::builtin()
            .with_additional(vec![StandardDefinition::new(
                "care_label",
                "Care Label",
                "Washing instructions present",
            )])
            .unwrap();

        assert_eq!(registry.len(), 5);
        assert_eq!(registry.all().last().unwrap().id, "care_label");
    }

    #[test]
    fn test_duplicate_and_empty_ids_rejected() {
        let duplicate = StandardRegistry::builtin().with_additional(vec![
            StandardDefinition::new(UNIFORM_LAW_LABELS, "Again", "x"),
        ]);
        assert_eq!(
            duplicate.unwrap_err(),
            ComplianceError::DuplicateStandard(UNIFORM_LAW_LABELS.to_string())
        );

        let empty = StandardRegistry::from_definitions(vec![StandardDefinition::new(" ", "", "")]);
        assert_eq!(empty.unwrap_err(), ComplianceError::EmptyStandardId);
    }

    #[test]
    fn test_shared_is_same_instance() {
        let a = StandardRegistry::shared();
        let b = StandardRegistry::shared();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
