//! Shared test utilities.
//!
//! Helpers for setting up an in-memory database and creating users, catalog
//! entries and order payloads with sensible defaults.

use crate::{
    core::{
        order::{NewOrder, NewOrderDetails, NewPurchase, NewRepair, NewSpecialOrder, OrderLine},
        service::{self, NewService},
        session::Session,
        store_item::{self, NewStoreItem},
    },
    entities::{self, ItemType, Order, Urgency, order},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Inserts a customer directly, bypassing registration.
pub async fn create_test_user(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
) -> Result<entities::UserModel> {
    insert_user(db, name, email, false).await
}

/// Inserts an administrator with the given email.
pub async fn create_admin_user(db: &DatabaseConnection, email: &str) -> Result<entities::UserModel> {
    insert_user(db, "Administrator", email, true).await
}

async fn insert_user(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
    is_admin: bool,
) -> Result<entities::UserModel> {
    entities::user::ActiveModel {
        id: Set(crate::core::ids::next_id(crate::core::ids::USER_PREFIX)),
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        phone: Set("+55 11 90000-0000".to_string()),
        is_admin: Set(is_admin),
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Creates a service with the given turnaround.
///
/// # Defaults
/// * title: "Hem repair"
/// * price: 25.0
pub async fn create_test_service(
    db: &DatabaseConnection,
    estimated_days: i32,
) -> Result<entities::ServiceModel> {
    service::create_service(
        db,
        NewService {
            title: "Hem repair".to_string(),
            description: "Hem adjustment".to_string(),
            price: 25.0,
            estimated_days,
        },
    )
    .await
}

/// Creates a store item with 10 units in stock.
pub async fn create_custom_item(
    db: &DatabaseConnection,
    name: &str,
    item_type: ItemType,
    price: f64,
) -> Result<entities::StoreItemModel> {
    store_item::create_store_item(
        db,
        NewStoreItem {
            name: name.to_string(),
            item_type,
            description: format!("{name} for tests"),
            price,
            stock: 10,
            image: None,
        },
    )
    .await
}

/// A session logged in as `user` with its own cart.
pub fn session_for(user: &entities::UserModel) -> Session {
    let mut session = Session::new(format!("cart_{}", user.id));
    session.set_current(user.clone());
    session
}

/// Sets up a test database with one customer.
pub async fn setup_with_user() -> Result<(DatabaseConnection, entities::UserModel)> {
    let db = setup_test_db().await?;
    let user = create_test_user(&db, "Maria", "maria@example.com").await?;
    Ok((db, user))
}

/// Sets up a test database with one customer and one service.
pub async fn setup_with_service(
    estimated_days: i32,
) -> Result<(DatabaseConnection, entities::UserModel, entities::ServiceModel)> {
    let (db, user) = setup_with_user().await?;
    let service = create_test_service(&db, estimated_days).await?;
    Ok((db, user, service))
}

/// Repair payload for `service_id`.
pub fn repair_payload(user_id: &str, service_id: &str) -> NewOrder {
    NewOrder {
        user_id: user_id.to_string(),
        notes: "3cm shorter".to_string(),
        details: NewOrderDetails::Repair(NewRepair {
            service_id: service_id.to_string(),
            description: "Jeans hem needs adjusting".to_string(),
            urgency: Urgency::Medium,
            preferred_date: None,
        }),
    }
}

/// Special order payload for a navy dress.
pub fn special_payload(user_id: &str) -> NewOrder {
    NewOrder {
        user_id: user_id.to_string(),
        notes: "Wedding party dress".to_string(),
        details: NewOrderDetails::SpecialOrder(NewSpecialOrder {
            description: "Long dress in navy blue".to_string(),
            measurements: "Bust 90cm, waist 70cm".to_string(),
            fabric: "Crepe".to_string(),
            reference: "Mermaid cut, long sleeves".to_string(),
            accepts_whatsapp: true,
        }),
    }
}

/// Purchase payload with the given lines and total.
pub fn purchase_payload(user_id: &str, lines: Vec<OrderLine>, total_price: f64) -> NewOrder {
    NewOrder {
        user_id: user_id.to_string(),
        notes: String::new(),
        details: NewOrderDetails::Purchase(NewPurchase { lines, total_price }),
    }
}

/// Rewrites an order's timestamps. `updated_at` defaults to `created_at`.
pub async fn backdate_order(
    db: &DatabaseConnection,
    order_id: &str,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
) -> Result<()> {
    let mut row: order::ActiveModel = Order::find_by_id(order_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("order", order_id))?
        .into();
    row.created_at = Set(created_at);
    row.updated_at = Set(updated_at.unwrap_or(created_at));
    row.update(db).await?;
    Ok(())
}
