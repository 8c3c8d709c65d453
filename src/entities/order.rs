//! Order entity - Repair requests, special (custom-made) orders and purchases.
//!
//! The table is flat: every type-specific field is a nullable column. The
//! typed view with one payload per order type lives in [`crate::core::order`],
//! which is the only code that should build or read these rows.

use sea_orm::{FromJsonQueryResult, entity::prelude::*};
use serde::{Deserialize, Serialize};

/// Kind of order. Fixed at creation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    /// Repair of a customer garment against a catalog service
    #[sea_orm(string_value = "repair")]
    Repair,
    /// Custom-made piece that the shop may accept or reject
    #[sea_orm(string_value = "special_order")]
    SpecialOrder,
    /// Store purchase placed through the cart
    #[sea_orm(string_value = "purchase")]
    Purchase,
}

/// Order progress. Any status may be set from any other.
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
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Received, work not begun
    #[sea_orm(string_value = "not_started")]
    NotStarted,
    /// Work under way
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    /// Finished and waiting for the customer
    #[sea_orm(string_value = "awaiting_pickup")]
    AwaitingPickup,
    /// Delivered (purchases start here)
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Abandoned or rejected
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl OrderStatus {
    /// All five statuses in track order, `Cancelled` last.
    pub const ALL: [Self; 5] = [
        Self::NotStarted,
        Self::InProgress,
        Self::AwaitingPickup,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::InProgress => "In Progress",
            Self::AwaitingPickup => "Awaiting Pickup",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Position on the `Not Started → In Progress → Awaiting Pickup → Completed`
    /// track. `Cancelled` is off the track and returns `None`.
    #[must_use]
    pub const fn timeline_index(self) -> Option<usize> {
        match self {
            Self::NotStarted => Some(0),
            Self::InProgress => Some(1),
            Self::AwaitingPickup => Some(2),
            Self::Completed => Some(3),
            Self::Cancelled => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// How soon the customer needs a repair back
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    /// No rush
    #[sea_orm(string_value = "low")]
    Low,
    /// Default
    #[sea_orm(string_value = "medium")]
    Medium,
    /// As soon as possible
    #[sea_orm(string_value = "high")]
    High,
}

/// Stored form of a special order's acceptance decision. The rejection reason
/// lives in its own column.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "snake_case")]
pub enum AcceptanceState {
    /// No decision yet
    #[sea_orm(string_value = "pending")]
    Pending,
    /// The shop will make the piece
    #[sea_orm(string_value = "accepted")]
    Accepted,
    /// The shop declined; the order is cancelled
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Photo references attached to an order, stored as a JSON array.
/// Upload is not supported, so this is always empty for new orders.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Photos(pub Vec<String>);

/// Order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Opaque identifier (`o_...`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Owner of the order (logical reference to `users.id`)
    pub user_id: String,
    /// Repair, special order or purchase
    pub order_type: OrderType,
    /// Current progress
    pub status: OrderStatus,
    /// Free-form notes from the customer
    pub notes: String,
    /// Attached photo references
    #[sea_orm(column_type = "Json")]
    pub photos: Photos,
    /// What needs doing (repair and special order)
    pub description: Option<String>,
    /// Catalog service being ordered (repair)
    pub service_id: Option<String>,
    /// Requested turnaround (repair)
    pub urgency: Option<Urgency>,
    /// Date the customer would like to drop off or collect (repair)
    pub preferred_date: Option<Date>,
    /// `created_at` plus the service's estimated days (repair)
    pub estimated_delivery: Option<DateTimeUtc>,
    /// Body measurements (special order)
    pub measurements: Option<String>,
    /// Desired fabric (special order)
    pub fabric: Option<String>,
    /// Model or style reference (special order)
    pub reference: Option<String>,
    /// Customer agreed to be contacted over `WhatsApp` (special order)
    pub accepts_whatsapp: Option<bool>,
    /// Shop decision (special order)
    pub acceptance: Option<AcceptanceState>,
    /// Why the shop declined (special order, rejected only)
    pub rejection_reason: Option<String>,
    /// Cart total at checkout (purchase)
    pub total_price: Option<f64>,
    /// When the order was placed
    pub created_at: DateTimeUtc,
    /// Refreshed on every mutation
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A purchase has many lines
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
