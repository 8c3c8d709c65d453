//! Catalog seed loading from catalog.toml
//!
//! The seed file lists the initial users, repair services and store items with
//! fixed ids. Each table is seeded only while it is empty, so edits made through
//! the catalog operations survive restarts.

use crate::{
    core::{service, store_item},
    entities::{
        ItemType, Service, StoreItem, User, service as service_entity, store_item as item_entity,
        user,
    },
    errors::{Error, Result},
};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Set, TransactionTrait,
};
use serde::Deserialize;
use std::{env, path::Path};
use tracing::{debug, info};

/// Default seed file, relative to the working directory.
pub const DEFAULT_CATALOG_PATH: &str = "catalog.toml";

/// Contents of catalog.toml
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogConfig {
    /// Accounts to create
    #[serde(default)]
    pub users: Vec<UserSeed>,
    /// Repair services offered
    #[serde(default)]
    pub services: Vec<ServiceSeed>,
    /// Products for sale
    #[serde(default)]
    pub items: Vec<ItemSeed>,
}

/// One `[[users]]` entry
#[derive(Debug, Clone, Deserialize)]
pub struct UserSeed {
    /// Fixed id, e.g. `u_001`
    pub id: String,
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
    /// Contact phone
    pub phone: String,
    /// Grants the admin area
    #[serde(default)]
    pub is_admin: bool,
}

/// One `[[services]]` entry
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceSeed {
    /// Fixed id, e.g. `s_001`
    pub id: String,
    /// Service name
    pub title: String,
    /// What the service covers
    pub description: String,
    /// Price charged
    pub price: f64,
    /// Turnaround in calendar days
    pub estimated_days: i32,
}

/// One `[[items]]` entry
#[derive(Debug, Clone, Deserialize)]
pub struct ItemSeed {
    /// Fixed id, e.g. `i_001`
    pub id: String,
    /// Product name
    pub name: String,
    /// Category, written as `type` in the file
    #[serde(rename = "type")]
    pub item_type: ItemType,
    /// Longer description
    pub description: String,
    /// Unit price
    pub price: f64,
    /// Units on hand
    pub stock: i32,
    /// Optional image reference
    #[serde(default)]
    pub image: Option<String>,
}

/// How many rows [`seed_catalog`] inserted per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct SeedSummary {
    pub users: usize,
    pub services: usize,
    pub items: usize,
}

/// Loads the catalog seed from a TOML file.
///
/// # Errors
/// Returns [`Error::Config`] if the file cannot be read or parsed.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<CatalogConfig> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read {}: {e}", path.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path.display()),
    })
}

/// Loads the catalog seed from `CATALOG_PATH`, or ./catalog.toml when unset.
///
/// # Errors
/// Returns [`Error::Config`] if the file cannot be read or parsed.
pub fn load_default_catalog() -> Result<CatalogConfig> {
    let path = env::var("CATALOG_PATH").unwrap_or_else(|_| DEFAULT_CATALOG_PATH.to_string());
    debug!(%path, "Loading catalog seed");
    load_catalog(path)
}

fn validate(config: &CatalogConfig) -> Result<()> {
    for seed in &config.services {
        service::validate_title(&seed.title)?;
        service::validate_price(seed.price)?;
        service::validate_estimated_days(seed.estimated_days)?;
    }
    for seed in &config.items {
        store_item::validate_name(&seed.name)?;
        service::validate_price(seed.price)?;
        store_item::validate_stock(seed.stock)?;
    }
    Ok(())
}

/// Inserts seed rows into every table that is still empty.
///
/// # Errors
/// Returns a validation error for an invalid seed entry (nothing is written in
/// that case), or [`Error::Database`] if an insert fails.
pub async fn seed_catalog(db: &DatabaseConnection, config: &CatalogConfig) -> Result<SeedSummary> {
    validate(config)?;

    let txn = db.begin().await?;
    let mut summary = SeedSummary::default();

    if User::find().count(&txn).await? == 0 {
        for seed in &config.users {
            user::ActiveModel {
                id: Set(seed.id.clone()),
                name: Set(seed.name.clone()),
                email: Set(seed.email.trim().to_string()),
                phone: Set(seed.phone.clone()),
                is_admin: Set(seed.is_admin),
            }
            .insert(&txn)
            .await?;
            summary.users += 1;
        }
    }

    if Service::find().count(&txn).await? == 0 {
        for seed in &config.services {
            service_entity::ActiveModel {
                id: Set(seed.id.clone()),
                title: Set(seed.title.trim().to_string()),
                description: Set(seed.description.clone()),
                price: Set(seed.price),
                estimated_days: Set(seed.estimated_days),
            }
            .insert(&txn)
            .await?;
            summary.services += 1;
        }
    }

    if StoreItem::find().count(&txn).await? == 0 {
        for seed in &config.items {
            item_entity::ActiveModel {
                id: Set(seed.id.clone()),
                name: Set(seed.name.trim().to_string()),
                item_type: Set(seed.item_type),
                description: Set(seed.description.clone()),
                price: Set(seed.price),
                stock: Set(seed.stock),
                image: Set(seed.image.clone()),
            }
            .insert(&txn)
            .await?;
            summary.items += 1;
        }
    }

    txn.commit().await?;
    info!(
        users = summary.users,
        services = summary.services,
        items = summary.items,
        "Catalog seeded"
    );
    Ok(summary)
}
