//! Polymorphic expense relations.
//!
//! An expense may point at a vehicle or an employee. The pair
//! `(related_id, related_model)` is stored on the expense and resolved after
//! the expense query with one batched lookup per target table.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tally_shared::AppError;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

/// Errors raised when validating a relation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RelationError {
    /// Only one half of the pair was supplied.
    #[error("relatedId and relatedModel must be provided together")]
    Incomplete,

    /// The discriminator names no known table.
    #[error("relatedModel must be 'Vehicle' or 'Employee', got '{0}'")]
    UnknownModel(String),
}

impl From<RelationError> for AppError {
    fn from(err: RelationError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Table an expense relation points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum RelatedModel {
    /// `vehicles` table.
    Vehicle,
    /// `employees` table.
    Employee,
}

impl RelatedModel {
    /// Wire and storage discriminator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Vehicle => "Vehicle",
            Self::Employee => "Employee",
        }
    }
}

impl std::fmt::Display for RelatedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RelatedModel {
    type Err = RelationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Vehicle" => Ok(Self::Vehicle),
            "Employee" => Ok(Self::Employee),
            other => Err(RelationError::UnknownModel(other.to_string())),
        }
    }
}

/// A validated reference from an expense to another record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RelationRef {
    /// Target record id.
    pub id: Uuid,
    /// Target table.
    pub model: RelatedModel,
}

impl RelationRef {
    /// Pairs up the optional halves of a relation.
    ///
    /// Both absent is a valid "no relation"; exactly one present is an error.
    pub fn from_parts(
        id: Option<Uuid>,
        model: Option<RelatedModel>,
    ) -> Result<Option<Self>, RelationError> {
        match (id, model) {
            (Some(id), Some(model)) => Ok(Some(Self { id, model })),
            (None, None) => Ok(None),
            _ => Err(RelationError::Incomplete),
        }
    }
}

/// Projection of a related record spliced into expense responses.
///
/// Serializes to exactly one key: `plateNumber` or `fullName`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum RelatedEntity {
    /// Vehicle projection.
    Vehicle {
        /// Licence plate of the vehicle.
        #[serde(rename = "plateNumber")]
        plate_number: String,
    },
    /// Employee projection.
    Employee {
        /// Full name of the employee.
        #[serde(rename = "fullName")]
        full_name: String,
    },
}

/// Ids to fetch, grouped by target table.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RelationBatch {
    /// Vehicle ids, deduplicated.
    pub vehicle_ids: Vec<Uuid>,
    /// Employee ids, deduplicated.
    pub employee_ids: Vec<Uuid>,
}

impl RelationBatch {
    /// Groups relation references by discriminator.
    pub fn collect<'a>(refs: impl IntoIterator<Item = &'a RelationRef>) -> Self {
        let mut batch = Self::default();
        for r in refs {
            let ids = match r.model {
                RelatedModel::Vehicle => &mut batch.vehicle_ids,
                RelatedModel::Employee => &mut batch.employee_ids,
            };
            if !ids.contains(&r.id) {
                ids.push(r.id);
            }
        }
        batch
    }
}

/// Projections fetched for one batch.
#[derive(Debug, Default, Clone)]
pub struct RelationLookup {
    plates: HashMap<Uuid, String>,
    names: HashMap<Uuid, String>,
}

impl RelationLookup {
    /// Builds a lookup from `(id, plate_number)` and `(id, full_name)` rows.
    pub fn new(
        vehicles: impl IntoIterator<Item = (Uuid, String)>,
        employees: impl IntoIterator<Item = (Uuid, String)>,
    ) -> Self {
        Self {
            plates: vehicles.into_iter().collect(),
            names: employees.into_iter().collect(),
        }
    }

    /// Projection for a reference, or `None` when the target is gone.
    #[must_use]
    pub fn resolve(&self, relation: &RelationRef) -> Option<RelatedEntity> {
        match relation.model {
            RelatedModel::Vehicle => {
                self.plates
                    .get(&relation.id)
                    .map(|plate| RelatedEntity::Vehicle {
                        plate_number: plate.clone(),
                    })
            }
            RelatedModel::Employee => {
                self.names
                    .get(&relation.id)
                    .map(|name| RelatedEntity::Employee {
                        full_name: name.clone(),
                    })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts() {
        let id = Uuid::new_v4();
        assert_eq!(RelationRef::from_parts(None, None), Ok(None));
        assert_eq!(
            RelationRef::from_parts(Some(id), Some(RelatedModel::Employee)),
            Ok(Some(RelationRef {
                id,
                model: RelatedModel::Employee
            }))
        );
        assert_eq!(
            RelationRef::from_parts(Some(id), None),
            Err(RelationError::Incomplete)
        );
        assert_eq!(
            RelationRef::from_parts(None, Some(RelatedModel::Vehicle)),
            Err(RelationError::Incomplete)
        );
    }

    #[test]
    fn test_model_parsing_is_exact() {
        assert_eq!("Vehicle".parse::<RelatedModel>(), Ok(RelatedModel::Vehicle));
        assert_eq!("Employee".parse::<RelatedModel>(), Ok(RelatedModel::Employee));
        assert!("vehicle".parse::<RelatedModel>().is_err());
        assert!("Customer".parse::<RelatedModel>().is_err());
    }

    #[test]
    fn test_batch_groups_and_dedups() {
        let v = Uuid::new_v4();
        let e = Uuid::new_v4();
        let refs = [
            RelationRef { id: v, model: RelatedModel::Vehicle },
            RelationRef { id: e, model: RelatedModel::Employee },
            RelationRef { id: v, model: RelatedModel::Vehicle },
        ];
        let batch = RelationBatch::collect(&refs);
        assert_eq!(batch.vehicle_ids, vec![v]);
        assert_eq!(batch.employee_ids, vec![e]);
    }

    #[test]
    fn test_projection_has_exactly_one_key() {
        let v = Uuid::new_v4();
        let e = Uuid::new_v4();
        let lookup = RelationLookup::new(
            [(v, "34 ABC 123".to_string())],
            [(e, "Ayse Yilmaz".to_string())],
        );

        let vehicle = lookup
            .resolve(&RelationRef { id: v, model: RelatedModel::Vehicle })
            .unwrap();
        let json = serde_json::to_value(&vehicle).unwrap();
        assert_eq!(json, serde_json::json!({ "plateNumber": "34 ABC 123" }));

        let employee = lookup
            .resolve(&RelationRef { id: e, model: RelatedModel::Employee })
            .unwrap();
        let json = serde_json::to_value(&employee).unwrap();
        assert_eq!(json, serde_json::json!({ "fullName": "Ayse Yilmaz" }));
    }

    #[test]
    fn test_dangling_reference_resolves_to_none() {
        let lookup = RelationLookup::default();
        let missing = RelationRef {
            id: Uuid::new_v4(),
            model: RelatedModel::Vehicle,
        };
        assert!(lookup.resolve(&missing).is_none());
    }

    #[test]
    fn test_model_id_mismatch_does_not_cross_tables() {
        let id = Uuid::new_v4();
        let lookup = RelationLookup::new([(id, "34 ABC 123".to_string())], []);
        let as_employee = RelationRef {
            id,
            model: RelatedModel::Employee,
        };
        assert!(lookup.resolve(&as_employee).is_none());
    }
}
