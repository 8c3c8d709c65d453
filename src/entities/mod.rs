//! `SeaORM` entities for the storefront tables.
//!
//! Orders own their purchase lines; every other reference between tables is a
//! plain id column, so catalog deletes never cascade.

pub mod cart_entry;
pub mod order;
pub mod order_item;
pub mod service;
pub mod store_item;
pub mod user;

// Re-export specific types to avoid conflicts
pub use cart_entry::{Column as CartEntryColumn, Entity as CartEntry, Model as CartEntryModel};
pub use order::{
    AcceptanceState, Column as OrderColumn, Entity as Order, Model as OrderModel, OrderStatus,
    OrderType, Photos, Urgency,
};
pub use order_item::{Column as OrderItemColumn, Entity as OrderItem, Model as OrderItemModel};
pub use service::{Column as ServiceColumn, Entity as Service, Model as ServiceModel};
pub use store_item::{
    Column as StoreItemColumn, Entity as StoreItem, ItemType, Model as StoreItemModel,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
