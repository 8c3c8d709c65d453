//! Store item catalog - Products sold through the cart.
//!
//! Deleting an item never cascades: cart entries and purchase lines that point
//! at it stay in place and are skipped when read (see [`crate::core::cart`] and
//! [`crate::core::dashboard`]).

use crate::{
    core::{ids, service::validate_price},
    entities::{ItemType, StoreItem, store_item},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use std::collections::HashMap;
use tracing::info;

/// Fields needed to create a store item.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStoreItem {
    /// Product name
    pub name: String,
    /// Product category
    pub item_type: ItemType,
    /// Longer description
    pub description: String,
    /// Unit price
    pub price: f64,
    /// Units on hand
    pub stock: i32,
    /// Optional image reference
    pub image: Option<String>,
}

/// Partial update of a store item. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreItemUpdate {
    /// New name
    pub name: Option<String>,
    /// New category
    pub item_type: Option<ItemType>,
    /// New description
    pub description: Option<String>,
    /// New unit price
    pub price: Option<f64>,
    /// New stock level
    pub stock: Option<i32>,
    /// New image reference; `Some(None)` removes it
    pub image: Option<Option<String>>,
}

pub(crate) fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::validation("Item name cannot be empty"));
    }
    Ok(())
}

pub(crate) fn validate_stock(stock: i32) -> Result<()> {
    if stock < 0 {
        return Err(Error::validation(format!(
            "Stock cannot be negative, got {stock}"
        )));
    }
    Ok(())
}

/// Retrieves every store item in creation order.
pub async fn get_all_store_items<C>(db: &C) -> Result<Vec<store_item::Model>>
where
    C: ConnectionTrait,
{
    StoreItem::find()
        .order_by_asc(store_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the whole catalog keyed by item id.
///
/// # Errors
/// Returns [`Error::Database`] if the query fails.
pub async fn get_catalog<C>(db: &C) -> Result<HashMap<String, store_item::Model>>
where
    C: ConnectionTrait,
{
    let items = get_all_store_items(db).await?;
    Ok(items.into_iter().map(|item| (item.id.clone(), item)).collect())
}

/// Retrieves a store item by id, `None` when it does not exist.
pub async fn get_store_item_by_id(
    db: &DatabaseConnection,
    item_id: &str,
) -> Result<Option<store_item::Model>> {
    StoreItem::find_by_id(item_id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a store item with a generated `i_...` id.
///
/// # Errors
/// Returns an error if the name is empty, the price is negative or not finite,
/// the stock is negative, or the database insert fails.
pub async fn create_store_item(
    db: &DatabaseConnection,
    new: NewStoreItem,
) -> Result<store_item::Model> {
    validate_name(&new.name)?;
    validate_price(new.price)?;
    validate_stock(new.stock)?;

    let item = store_item::ActiveModel {
        id: Set(ids::next_id(ids::ITEM_PREFIX)),
        name: Set(new.name.trim().to_string()),
        item_type: Set(new.item_type),
        description: Set(new.description),
        price: Set(new.price),
        stock: Set(new.stock),
        image: Set(new.image),
    };

    let created = item.insert(db).await?;
    info!(item_id = %created.id, name = %created.name, "Store item created");
    Ok(created)
}

/// Applies a partial update to a store item.
///
/// A price change takes effect in every cart immediately, since carts read
/// prices from the catalog.
///
/// # Errors
/// Returns [`Error::NotFound`] if the item does not exist, or a validation
/// error for any provided field that is invalid.
pub async fn update_store_item(
    db: &DatabaseConnection,
    item_id: &str,
    changes: StoreItemUpdate,
) -> Result<store_item::Model> {
    if let Some(name) = &changes.name {
        validate_name(name)?;
    }
    if let Some(price) = changes.price {
        validate_price(price)?;
    }
    if let Some(stock) = changes.stock {
        validate_stock(stock)?;
    }

    let mut item: store_item::ActiveModel = StoreItem::find_by_id(item_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("store item", item_id))?
        .into();

    if let Some(name) = changes.name {
        item.name = Set(name.trim().to_string());
    }
    if let Some(item_type) = changes.item_type {
        item.item_type = Set(item_type);
    }
    if let Some(description) = changes.description {
        item.description = Set(description);
    }
    if let Some(price) = changes.price {
        item.price = Set(price);
    }
    if let Some(stock) = changes.stock {
        item.stock = Set(stock);
    }
    if let Some(image) = changes.image {
        item.image = Set(image);
    }

    item.update(db).await.map_err(Into::into)
}

/// Deletes a store item. Cart entries and order lines that reference it are
/// left in place.
///
/// # Errors
/// Returns [`Error::NotFound`] if the item does not exist.
pub async fn delete_store_item(db: &DatabaseConnection, item_id: &str) -> Result<()> {
    let result = StoreItem::delete_by_id(item_id.to_string()).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("store item", item_id));
    }

    info!(%item_id, "Store item deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn keychain() -> NewStoreItem {
        NewStoreItem {
            name: "Embroidered keychain".to_string(),
            item_type: ItemType::Keychain,
            description: "Handmade keychain".to_string(),
            price: 10.0,
            stock: 20,
            image: None,
        }
    }

    #[tokio::test]
    async fn test_create_store_item_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_store_item(
            &db,
            NewStoreItem {
                name: String::new(),
                ..keychain()
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let result = create_store_item(
            &db,
            NewStoreItem {
                price: f64::INFINITY,
                ..keychain()
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { .. }));

        let result = create_store_item(
            &db,
            NewStoreItem {
                stock: -1,
                ..keychain()
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_store_item_integration() -> Result<()> {
        let db = setup_test_db().await?;

        let item = create_store_item(&db, keychain()).await?;
        assert!(item.id.starts_with("i_"));
        assert_eq!(item.item_type, ItemType::Keychain);
        assert_eq!(item.stock, 20);

        let found = get_store_item_by_id(&db, &item.id).await?.unwrap();
        assert_eq!(found, item);
        Ok(())
    }

    #[tokio::test]
    async fn test_get_catalog_keys_by_id() -> Result<()> {
        let db = setup_test_db().await?;
        let a = create_store_item(&db, keychain()).await?;
        let b = create_custom_item(&db, "Dishcloth", ItemType::Dishcloth, 15.0).await?;

        let catalog = get_catalog(&db).await?;
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[&a.id], a);
        assert_eq!(catalog[&b.id], b);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_store_item() -> Result<()> {
        let db = setup_test_db().await?;
        let item = create_store_item(&db, keychain()).await?;

        let updated = update_store_item(
            &db,
            &item.id,
            StoreItemUpdate {
                item_type: Some(ItemType::Other),
                stock: Some(0),
                image: Some(Some("keychain.png".to_string())),
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(updated.item_type, ItemType::Other);
        assert_eq!(updated.stock, 0);
        assert_eq!(updated.image.as_deref(), Some("keychain.png"));
        assert_eq!(updated.price, 10.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_item() -> Result<()> {
        let db = setup_test_db().await?;

        let result = update_store_item(&db, "i_missing", StoreItemUpdate::default()).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound { entity: "store item", .. }
        ));

        let result = delete_store_item(&db, "i_missing").await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_store_item() -> Result<()> {
        let db = setup_test_db().await?;
        let item = create_store_item(&db, keychain()).await?;

        delete_store_item(&db, &item.id).await?;
        assert!(get_all_store_items(&db).await?.is_empty());
        Ok(())
    }
}
