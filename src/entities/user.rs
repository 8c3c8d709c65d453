//! User entity - Customers and the shop administrator.
//!
//! Users are created at registration and referenced by `orders.user_id` as a
//! logical key only; there is no foreign key and no cascade.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Opaque identifier (`u_...`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Display name
    pub name: String,
    /// Email address, unique by convention only
    pub email: String,
    /// Contact phone number
    pub phone: String,
    /// Whether this user may manage the catalog and orders
    pub is_admin: bool,
}

/// `User` has no enforced relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
