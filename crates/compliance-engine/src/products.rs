//! Product type catalog
//!
//! Which standards apply to which kind of textile product. The catalog is
//! used to pick the standard selection for a run when the caller knows the
//! product but not the regulations.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::error::ComplianceError;
use crate::standards::{
    CALIFORNIA_FLAMMABILITY, FLAMMABILITY_TEST, LABELLING_REVIEW, UNIFORM_LAW_LABELS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementStatus {
    Required,
    NotRequired,
}

impl RequirementStatus {
    pub fn is_required(self) -> bool {
        matches!(self, RequirementStatus::Required)
    }
}

/// Display name in the two languages the labels are reviewed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedName {
    pub en: String,
    pub ja: String,
}

/// Physical characteristics that drive which standards apply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductCriteria {
    pub has_filling: bool,
    /// Inches. Upholstery labelling exempts thinner products.
    pub thickness_threshold: Option<f64>,
    pub is_bedding: bool,
    pub is_furniture: bool,
    pub is_floor_covering: bool,
    pub requires_flame_resistance: bool,
    pub is_fabric_only: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductType {
    pub key: String,
    pub name: LocalizedName,
    /// Label category, e.g. "Type 1"
    pub category: String,
    /// Standard id and status, in registry order.
    pub requirements: Vec<(String, RequirementStatus)>,
    pub criteria: ProductCriteria,
}

impl ProductType {
    pub fn is_required(&self, standard: &str) -> bool {
        self.requirements
            .iter()
            .any(|(id, status)| id == standard && status.is_required())
    }

    /// Ids of the standards this product must satisfy.
    pub fn required_standards(&self) -> Vec<&str> {
        self.requirements
            .iter()
            .filter(|(_, status)| status.is_required())
            .map(|(id, _)| id.as_str())
            .collect()
    }
}

lazy_static! {
    static ref CATALOG: Vec<ProductType> = builtin_products();
}

fn product(
    key: &str,
    en: &str,
    ja: &str,
    category: &str,
    required: &[&str],
    criteria: ProductCriteria,
) -> ProductType {
    let all = [
        UNIFORM_LAW_LABELS,
        CALIFORNIA_FLAMMABILITY,
        LABELLING_REVIEW,
        FLAMMABILITY_TEST,
    ];
    ProductType {
        key: key.to_string(),
        name: LocalizedName {
            en: en.to_string(),
            ja: ja.to_string(),
        },
        category: category.to_string(),
        requirements: all
            .iter()
            .map(|id| {
                let status = if required.contains(id) {
                    RequirementStatus::Required
                } else {
                    RequirementStatus::NotRequired
                };
                (id.to_string(), status)
            })
            .collect(),
        criteria,
    }
}

fn bedding() -> ProductCriteria {
    ProductCriteria {
        has_filling: true,
        thickness_threshold: Some(0.5),
        is_bedding: true,
        ..Default::default()
    }
}

fn builtin_products() -> Vec<ProductType> {
    vec![
        product(
            "cushion",
            "Cushion",
            "クッション",
            "Type 1",
            &[UNIFORM_LAW_LABELS, CALIFORNIA_FLAMMABILITY, LABELLING_REVIEW],
            ProductCriteria {
                has_filling: true,
                thickness_threshold: Some(0.5),
                is_furniture: true,
                ..Default::default()
            },
        ),
        product(
            "mattress_pad",
            "Mattress Pad",
            "敷きパッド",
            "Type 2",
            &[UNIFORM_LAW_LABELS],
            bedding(),
        ),
        product(
            "pillow_pad",
            "Pillow Pad",
            "枕パッド",
            "Type 2",
            &[UNIFORM_LAW_LABELS],
            bedding(),
        ),
        product(
            "quilt_mat",
            "Quilt Mat",
            "キルトマット",
            "Type 2",
            &[UNIFORM_LAW_LABELS],
            bedding(),
        ),
        product(
            "nap_mat",
            "Nap Mat",
            "お昼寝マット",
            "Type 2",
            &[UNIFORM_LAW_LABELS],
            bedding(),
        ),
        product(
            "floor_mat",
            "Floor Mat",
            "マット（床に敷く）",
            "Type 3",
            &[UNIFORM_LAW_LABELS, FLAMMABILITY_TEST],
            ProductCriteria {
                has_filling: true,
                thickness_threshold: Some(0.5),
                is_floor_covering: true,
                requires_flame_resistance: true,
                ..Default::default()
            },
        ),
        product(
            "towel_blanket",
            "Towel/Blanket",
            "タオルケット・ブランケット",
            "Type 4",
            &[],
            ProductCriteria {
                is_bedding: true,
                is_fabric_only: true,
                ..Default::default()
            },
        ),
    ]
}

/// Read-only view over the built-in product types.
pub struct ProductCatalog;

impl ProductCatalog {
    pub fn all() -> &'static [ProductType] {
        &CATALOG
    }

    pub fn get(key: &str) -> Result<&'static ProductType, ComplianceError> {
        CATALOG
            .iter()
            .find(|p| p.key == key)
            .ok_or_else(|| ComplianceError::UnknownProductType(key.to_string()))
    }
}
