//! Checkout - turns the session's cart into a completed purchase order.

use crate::{
    core::{
        cart::{self, CartLine},
        order::{self, NewOrder, NewOrderDetails, NewPurchase, Order, OrderFilter, OrderLine},
        session::Session,
    },
    errors::{Error, Result},
};
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::{info, instrument};

const PURCHASE_NOTES: &str = "Purchase placed through the cart";

/// Outcome of a successful checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutReceipt {
    /// The purchase order just created
    pub order: Order,
    /// Amount charged
    pub total: f64,
    /// The customer's orders after checkout, newest first
    pub orders: Vec<Order>,
}

/// Places the session's cart as a purchase.
///
/// Both guards run before any write. The order insert and the cart clear share
/// one transaction, so a failed insert leaves the cart untouched.
///
/// # Errors
/// Returns [`Error::Unauthenticated`] without a user, [`Error::EmptyCart`] when
/// no cart line survives reconciliation, or [`Error::Database`] if a write fails.
#[instrument(skip(db, session), fields(cart_id = %session.cart_id()))]
pub async fn checkout(db: &DatabaseConnection, session: &Session) -> Result<CheckoutReceipt> {
    let user = session.require_user()?;

    let lines = cart::load_cart(db, session.cart_id()).await?;
    if lines.is_empty() {
        return Err(Error::EmptyCart);
    }
    let total = cart::cart_total(&lines);

    let txn = db.begin().await?;
    let order = order::create_order(
        &txn,
        NewOrder {
            user_id: user.id.clone(),
            notes: PURCHASE_NOTES.to_string(),
            details: NewOrderDetails::Purchase(NewPurchase {
                lines: lines.iter().map(order_line).collect(),
                total_price: total,
            }),
        },
    )
    .await?;
    cart::clear_cart(&txn, session.cart_id()).await?;
    txn.commit().await?;

    info!(order_id = %order.id, user_id = %user.id, total, "Checkout completed");

    let orders = order::get_all_orders(db, &OrderFilter::for_user(&user.id)).await?;
    Ok(CheckoutReceipt {
        order,
        total,
        orders,
    })
}

fn order_line(line: &CartLine) -> OrderLine {
    OrderLine {
        item_id: line.item.id.clone(),
        quantity: line.quantity,
    }
}
