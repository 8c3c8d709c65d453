//! Cart entry entity - The persisted half of a shopping cart.
//!
//! Only `(item_id, quantity)` pairs are stored, grouped by `cart_id`. The
//! auto-increment `id` doubles as the display order of the lines.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Cart entry database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cart_entries")]
pub struct Model {
    /// Insertion-ordered identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Cart this line belongs to (one per session)
    pub cart_id: String,
    /// Referenced store item; may point at a deleted item
    pub item_id: String,
    /// Requested units, always positive
    pub quantity: i32,
}

/// `CartEntry` has no enforced relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
