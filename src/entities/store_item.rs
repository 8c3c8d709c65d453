//! Store item entity - Products sold through the storefront cart.
//!
//! Items are referenced by cart entries and purchase order lines without a
//! foreign key, so deleting an item leaves those references dangling on purpose.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product category, used to group sales on the dashboard
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    /// Embroidered or felt keychains
    #[sea_orm(string_value = "keychain")]
    Keychain,
    /// Kitchen dishcloths
    #[sea_orm(string_value = "dishcloth")]
    Dishcloth,
    /// Pouches and small bags
    #[sea_orm(string_value = "pouch")]
    Pouch,
    /// Anything else
    #[sea_orm(string_value = "other")]
    Other,
}

impl ItemType {
    /// Lowercase label used in reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Keychain => "keychain",
            Self::Dishcloth => "dishcloth",
            Self::Pouch => "pouch",
            Self::Other => "other",
        }
    }
}

/// Store item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "store_items")]
pub struct Model {
    /// Opaque identifier (`i_...`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Product name
    pub name: String,
    /// Product category
    pub item_type: ItemType,
    /// Longer description shown to customers
    pub description: String,
    /// Unit price; always read live, carts never freeze it
    pub price: f64,
    /// Units on hand. Purchases do not decrement it.
    pub stock: i32,
    /// Optional image reference
    pub image: Option<String>,
}

/// `StoreItem` has no enforced relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
