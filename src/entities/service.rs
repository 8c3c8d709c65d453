//! Service entity - Repair offerings listed in the catalog.
//!
//! `estimated_days` drives the estimated delivery date of repair orders.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Service database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "services")]
pub struct Model {
    /// Opaque identifier (`s_...`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Short title (e.g. "Hem adjustment")
    pub title: String,
    /// Longer description shown to customers
    pub description: String,
    /// Price of the repair
    pub price: f64,
    /// Working days the repair usually takes
    pub estimated_days: i32,
}

/// `Service` has no enforced relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
