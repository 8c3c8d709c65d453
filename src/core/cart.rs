//! Shopping cart - persisted `(item_id, quantity)` entries and their
//! reconciliation against the live catalog.
//!
//! Entries are only ever stored with a positive quantity. Reading a cart goes
//! through [`reconcile`], which drops entries whose item no longer exists and
//! always uses the catalog's current price.

use crate::{
    core::store_item::get_catalog,
    entities::{CartEntry, cart_entry, store_item},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::Expr};
use std::collections::HashMap;
use tracing::{debug, info};

/// A cart entry joined with its live catalog item.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    /// Current catalog record
    pub item: store_item::Model,
    /// Requested units
    pub quantity: i32,
}

impl CartLine {
    /// Line price at the current catalog price.
    #[must_use]
    pub fn subtotal(&self) -> f64 {
        self.item.price * f64::from(self.quantity)
    }
}

/// Raw entries of a cart, oldest first.
///
/// # Errors
/// Returns [`Error::Database`] if the query fails.
pub async fn get_cart_entries<C>(db: &C, cart_id: &str) -> Result<Vec<cart_entry::Model>>
where
    C: ConnectionTrait,
{
    CartEntry::find()
        .filter(cart_entry::Column::CartId.eq(cart_id))
        .order_by_asc(cart_entry::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

async fn find_entry<C>(db: &C, cart_id: &str, item_id: &str) -> Result<Option<cart_entry::Model>>
where
    C: ConnectionTrait,
{
    CartEntry::find()
        .filter(cart_entry::Column::CartId.eq(cart_id))
        .filter(cart_entry::Column::ItemId.eq(item_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Adds `quantity` units of `item`, incrementing an existing line in place.
///
/// # Errors
/// Returns [`Error::InvalidQuantity`] for a non-positive quantity and
/// [`Error::OutOfStock`] when the item has no stock.
pub async fn add_to_cart(
    db: &DatabaseConnection,
    cart_id: &str,
    item: &store_item::Model,
    quantity: i32,
) -> Result<()> {
    if quantity <= 0 {
        return Err(Error::InvalidQuantity { quantity });
    }
    if item.stock <= 0 {
        return Err(Error::OutOfStock {
            item_id: item.id.clone(),
        });
    }

    if let Some(entry) = find_entry(db, cart_id, &item.id).await? {
        CartEntry::update_many()
            .col_expr(
                cart_entry::Column::Quantity,
                Expr::col(cart_entry::Column::Quantity).add(quantity),
            )
            .filter(cart_entry::Column::Id.eq(entry.id))
            .exec(db)
            .await?;
    } else {
        cart_entry::ActiveModel {
            cart_id: Set(cart_id.to_string()),
            item_id: Set(item.id.clone()),
            quantity: Set(quantity),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    info!(%cart_id, item_id = %item.id, quantity, "Added to cart");
    Ok(())
}

/// Sets the quantity of a line. A quantity of zero or less removes it; an item
/// not in the cart is left alone.
///
/// # Errors
/// Returns [`Error::Database`] if the update or removal fails.
pub async fn update_cart_item(
    db: &DatabaseConnection,
    cart_id: &str,
    item_id: &str,
    quantity: i32,
) -> Result<()> {
    if quantity <= 0 {
        return remove_from_cart(db, cart_id, item_id).await;
    }

    let result = CartEntry::update_many()
        .col_expr(cart_entry::Column::Quantity, Expr::value(quantity))
        .filter(cart_entry::Column::CartId.eq(cart_id))
        .filter(cart_entry::Column::ItemId.eq(item_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        debug!(%cart_id, %item_id, "Quantity update for item not in cart ignored");
    }
    Ok(())
}

/// Removes a line from the cart. Absent lines are ignored.
///
/// # Errors
/// Returns [`Error::Database`] if the delete fails.
pub async fn remove_from_cart(db: &DatabaseConnection, cart_id: &str, item_id: &str) -> Result<()> {
    CartEntry::delete_many()
        .filter(cart_entry::Column::CartId.eq(cart_id))
        .filter(cart_entry::Column::ItemId.eq(item_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Empties a cart.
///
/// # Errors
/// Returns [`Error::Database`] if the delete fails.
pub async fn clear_cart<C>(db: &C, cart_id: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = CartEntry::delete_many()
        .filter(cart_entry::Column::CartId.eq(cart_id))
        .exec(db)
        .await?;
    debug!(%cart_id, removed = result.rows_affected, "Cart cleared");
    Ok(())
}

/// Joins cart entries with the catalog, preserving entry order and dropping
/// entries whose item no longer exists.
#[must_use]
pub fn reconcile(
    entries: &[cart_entry::Model],
    catalog: &HashMap<String, store_item::Model>,
) -> Vec<CartLine> {
    entries
        .iter()
        .filter_map(|entry| {
            let Some(item) = catalog.get(&entry.item_id) else {
                debug!(item_id = %entry.item_id, "Dropping cart entry for missing item");
                return None;
            };
            Some(CartLine {
                item: item.clone(),
                quantity: entry.quantity,
            })
        })
        .collect()
}

/// Sum of line subtotals.
#[must_use]
pub fn cart_total(lines: &[CartLine]) -> f64 {
    lines.iter().map(CartLine::subtotal).sum()
}

/// Loads and reconciles a cart against the current catalog.
///
/// # Errors
/// Returns [`Error::Database`] if the entries or the catalog cannot be read.
pub async fn load_cart<C>(db: &C, cart_id: &str) -> Result<Vec<CartLine>>
where
    C: ConnectionTrait,
{
    let entries = get_cart_entries(db, cart_id).await?;
    let catalog = get_catalog(db).await?;
    Ok(reconcile(&entries, &catalog))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::store_item::{StoreItemUpdate, delete_store_item, update_store_item};
    use crate::entities::ItemType;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    const CART: &str = "cart_test";

    fn entry(id: i64, item_id: &str, quantity: i32) -> cart_entry::Model {
        cart_entry::Model {
            id,
            cart_id: CART.to_string(),
            item_id: item_id.to_string(),
            quantity,
        }
    }

    fn item(id: &str, price: f64) -> store_item::Model {
        store_item::Model {
            id: id.to_string(),
            name: id.to_string(),
            item_type: ItemType::Other,
            description: String::new(),
            price,
            stock: 3,
            image: None,
        }
    }

    #[test]
    fn test_reconcile_keeps_order_and_drops_missing() {
        let catalog: HashMap<String, store_item::Model> = [item("i_a", 10.0), item("i_b", 4.5)]
            .into_iter()
            .map(|i| (i.id.clone(), i))
            .collect();
        let entries = vec![entry(1, "i_b", 2), entry(2, "i_gone", 5), entry(3, "i_a", 1)];

        let lines = reconcile(&entries, &catalog);

        let ids: Vec<&str> = lines.iter().map(|l| l.item.id.as_str()).collect();
        assert_eq!(ids, vec!["i_b", "i_a"]);
        assert_eq!(cart_total(&lines), 19.0);
    }

    #[test]
    fn test_cart_total_empty() {
        assert_eq!(cart_total(&[]), 0.0);
    }

    #[tokio::test]
    async fn test_add_to_cart_rejects_bad_quantity_and_stock() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = add_to_cart(&db, CART, &item("i_a", 1.0), 0).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidQuantity { quantity: 0 }
        ));

        let mut sold_out = item("i_a", 1.0);
        sold_out.stock = 0;
        let result = add_to_cart(&db, CART, &sold_out, 1).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::OutOfStock { item_id } if item_id == "i_a"
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_add_increments_existing_line() -> Result<()> {
        let db = setup_test_db().await?;
        let pouch = create_custom_item(&db, "Pouch", ItemType::Pouch, 25.0).await?;
        let keychain = create_custom_item(&db, "Keychain", ItemType::Keychain, 10.0).await?;

        add_to_cart(&db, CART, &pouch, 1).await?;
        add_to_cart(&db, CART, &keychain, 2).await?;
        add_to_cart(&db, CART, &pouch, 2).await?;

        let entries = get_cart_entries(&db, CART).await?;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].item_id, pouch.id);
        assert_eq!(entries[0].quantity, 3);
        assert_eq!(entries[1].quantity, 2);

        let lines = load_cart(&db, CART).await?;
        assert_eq!(cart_total(&lines), 95.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_cart_item() -> Result<()> {
        let db = setup_test_db().await?;
        let pouch = create_custom_item(&db, "Pouch", ItemType::Pouch, 25.0).await?;
        add_to_cart(&db, CART, &pouch, 1).await?;

        update_cart_item(&db, CART, &pouch.id, 4).await?;
        assert_eq!(get_cart_entries(&db, CART).await?[0].quantity, 4);

        // Not in the cart: nothing happens
        update_cart_item(&db, CART, "i_other", 2).await?;
        assert_eq!(get_cart_entries(&db, CART).await?.len(), 1);

        update_cart_item(&db, CART, &pouch.id, 0).await?;
        assert!(get_cart_entries(&db, CART).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_negative_quantity_removes_line() -> Result<()> {
        let db = setup_test_db().await?;
        let pouch = create_custom_item(&db, "Pouch", ItemType::Pouch, 25.0).await?;
        let keychain = create_custom_item(&db, "Keychain", ItemType::Keychain, 10.0).await?;
        add_to_cart(&db, CART, &pouch, 2).await?;
        add_to_cart(&db, CART, &keychain, 1).await?;

        update_cart_item(&db, CART, &pouch.id, -1).await?;

        let entries = get_cart_entries(&db, CART).await?;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].item_id, keychain.id);
        assert!(entries.iter().all(|e| e.quantity > 0));
        Ok(())
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let catalog: HashMap<String, store_item::Model> = [item("i_a", 10.0), item("i_b", 4.5)]
            .into_iter()
            .map(|i| (i.id.clone(), i))
            .collect();
        let entries = vec![entry(1, "i_a", 2), entry(2, "i_gone", 1), entry(3, "i_b", 3)];

        let first = reconcile(&entries, &catalog);
        let second = reconcile(&entries, &catalog);

        assert_eq!(first, second);
        assert_eq!(cart_total(&first), cart_total(&second));
    }

    #[tokio::test]
    async fn test_load_cart_twice_is_stable() -> Result<()> {
        let db = setup_test_db().await?;
        let pouch = create_custom_item(&db, "Pouch", ItemType::Pouch, 25.0).await?;
        let keychain = create_custom_item(&db, "Keychain", ItemType::Keychain, 10.0).await?;
        add_to_cart(&db, CART, &keychain, 1).await?;
        add_to_cart(&db, CART, &pouch, 2).await?;
        delete_store_item(&db, &keychain.id).await?;

        let first = load_cart(&db, CART).await?;
        let second = load_cart(&db, CART).await?;

        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
        assert_eq!(get_cart_entries(&db, CART).await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_carts_are_isolated() -> Result<()> {
        let db = setup_test_db().await?;
        let pouch = create_custom_item(&db, "Pouch", ItemType::Pouch, 25.0).await?;
        add_to_cart(&db, CART, &pouch, 1).await?;
        add_to_cart(&db, "cart_other", &pouch, 5).await?;

        remove_from_cart(&db, CART, &pouch.id).await?;

        assert!(get_cart_entries(&db, CART).await?.is_empty());
        assert_eq!(get_cart_entries(&db, "cart_other").await?[0].quantity, 5);
        Ok(())
    }

    #[tokio::test]
    async fn test_load_cart_uses_live_price_and_skips_deleted() -> Result<()> {
        let db = setup_test_db().await?;
        let pouch = create_custom_item(&db, "Pouch", ItemType::Pouch, 25.0).await?;
        let keychain = create_custom_item(&db, "Keychain", ItemType::Keychain, 10.0).await?;
        add_to_cart(&db, CART, &pouch, 2).await?;
        add_to_cart(&db, CART, &keychain, 1).await?;

        update_store_item(
            &db,
            &pouch.id,
            StoreItemUpdate {
                price: Some(20.0),
                ..StoreItemUpdate::default()
            },
        )
        .await?;
        delete_store_item(&db, &keychain.id).await?;

        let lines = load_cart(&db, CART).await?;
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].subtotal(), 40.0);

        // The stale entry is still stored, only hidden
        assert_eq!(get_cart_entries(&db, CART).await?.len(), 2);
        Ok(())
    }
}
