//! Order lifecycle - creation, lookup, status changes and special-order decisions.
//!
//! Rows in the `orders` table are flat; this module exposes them as [`Order`],
//! whose [`OrderDetails`] holds exactly the fields that belong to its type. Row
//! shapes that do not fit their type are reported as [`Error::Corrupt`].
//!
//! Status transitions are unconstrained: any status may be set from any other,
//! including re-opening `Completed` or `Cancelled` orders. The only coupled write
//! is rejecting a special order, which cancels it in the same update.

use crate::{
    core::ids,
    entities::{
        AcceptanceState, Order as OrderEntity, OrderItem, OrderStatus, OrderType, Photos,
        Service, Urgency, order, order_item,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Days, NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

/// One purchased item and how many units were bought.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    /// Store item id
    pub item_id: String,
    /// Units bought
    pub quantity: i32,
}

/// The shop's decision on a special order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acceptance {
    /// No decision yet
    Pending,
    /// The shop will make the piece
    Accepted,
    /// The shop declined, for the given reason
    Rejected {
        /// Why the request was declined; never empty
        reason: String,
    },
}

/// Repair-only fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairDetails {
    /// Catalog service being ordered
    pub service_id: String,
    /// What needs fixing
    pub description: String,
    /// Requested turnaround
    pub urgency: Urgency,
    /// Date the customer would like
    pub preferred_date: Option<NaiveDate>,
    /// Creation time plus the service's estimated days
    pub estimated_delivery: DateTime<Utc>,
}

/// Special-order-only fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialOrderDetails {
    /// What the customer wants made
    pub description: String,
    /// Body measurements
    pub measurements: String,
    /// Desired fabric, may be empty
    pub fabric: String,
    /// Style reference, may be empty
    pub reference: String,
    /// Customer agreed to `WhatsApp` contact
    pub accepts_whatsapp: bool,
    /// Shop decision
    pub acceptance: Acceptance,
}

/// Purchase-only fields.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseDetails {
    /// Items bought, in cart order
    pub lines: Vec<OrderLine>,
    /// Cart total at checkout
    pub total_price: f64,
}

/// Type-specific part of an order.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderDetails {
    /// A garment repair
    Repair(RepairDetails),
    /// A custom-made piece
    SpecialOrder(SpecialOrderDetails),
    /// A store purchase
    Purchase(PurchaseDetails),
}

/// An order with its type-specific details.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    /// Opaque identifier (`o_...`)
    pub id: String,
    /// Owner
    pub user_id: String,
    /// Current progress
    pub status: OrderStatus,
    /// Customer notes
    pub notes: String,
    /// Photo references, currently always empty
    pub photos: Vec<String>,
    /// When the order was placed
    pub created_at: DateTime<Utc>,
    /// Last mutation
    pub updated_at: DateTime<Utc>,
    /// Type-specific fields
    pub details: OrderDetails,
}

impl Order {
    /// The order's type, derived from its details.
    #[must_use]
    pub const fn order_type(&self) -> OrderType {
        match self.details {
            OrderDetails::Repair(_) => OrderType::Repair,
            OrderDetails::SpecialOrder(_) => OrderType::SpecialOrder,
            OrderDetails::Purchase(_) => OrderType::Purchase,
        }
    }

    /// Free-text description for repairs and special orders.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        match &self.details {
            OrderDetails::Repair(r) => Some(&r.description),
            OrderDetails::SpecialOrder(s) => Some(&s.description),
            OrderDetails::Purchase(_) => None,
        }
    }

    /// Purchase lines, empty for other order types.
    #[must_use]
    pub fn lines(&self) -> &[OrderLine] {
        match &self.details {
            OrderDetails::Purchase(p) => &p.lines,
            _ => &[],
        }
    }

    /// Builds the typed view from an `orders` row and its `order_items` rows.
    ///
    /// # Errors
    /// Returns [`Error::Corrupt`] when a field required by the order type is missing.
    pub fn from_rows(row: order::Model, items: Vec<order_item::Model>) -> Result<Self> {
        let corrupt = |message: &str| Error::Corrupt {
            id: row.id.clone(),
            message: message.to_string(),
        };

        let details = match row.order_type {
            OrderType::Repair => OrderDetails::Repair(RepairDetails {
                service_id: row
                    .service_id
                    .clone()
                    .ok_or_else(|| corrupt("repair without service_id"))?,
                description: row.description.clone().unwrap_or_default(),
                urgency: row.urgency.unwrap_or(Urgency::Medium),
                preferred_date: row.preferred_date,
                estimated_delivery: row
                    .estimated_delivery
                    .ok_or_else(|| corrupt("repair without estimated_delivery"))?,
            }),
            OrderType::SpecialOrder => {
                let acceptance = match row.acceptance {
                    None | Some(AcceptanceState::Pending) => Acceptance::Pending,
                    Some(AcceptanceState::Accepted) => Acceptance::Accepted,
                    Some(AcceptanceState::Rejected) => Acceptance::Rejected {
                        reason: row
                            .rejection_reason
                            .clone()
                            .filter(|r| !r.trim().is_empty())
                            .ok_or_else(|| corrupt("rejected without a reason"))?,
                    },
                };
                OrderDetails::SpecialOrder(SpecialOrderDetails {
                    description: row.description.clone().unwrap_or_default(),
                    measurements: row.measurements.clone().unwrap_or_default(),
                    fabric: row.fabric.clone().unwrap_or_default(),
                    reference: row.reference.clone().unwrap_or_default(),
                    accepts_whatsapp: row.accepts_whatsapp.unwrap_or(false),
                    acceptance,
                })
            }
            OrderType::Purchase => OrderDetails::Purchase(PurchaseDetails {
                lines: items
                    .into_iter()
                    .map(|item| OrderLine {
                        item_id: item.item_id,
                        quantity: item.quantity,
                    })
                    .collect(),
                total_price: row.total_price.unwrap_or_default(),
            }),
        };

        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            status: row.status,
            notes: row.notes,
            photos: row.photos.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
            details,
        })
    }
}

/// Repair payload for [`create_order`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRepair {
    /// Catalog service to book; must exist at creation time
    pub service_id: String,
    /// What needs fixing
    pub description: String,
    /// Requested turnaround
    pub urgency: Urgency,
    /// Date the customer would like
    pub preferred_date: Option<NaiveDate>,
}

/// Special order payload for [`create_order`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSpecialOrder {
    /// What the customer wants made
    pub description: String,
    /// Body measurements
    pub measurements: String,
    /// Desired fabric
    pub fabric: String,
    /// Style reference
    pub reference: String,
    /// Customer agreed to `WhatsApp` contact
    pub accepts_whatsapp: bool,
}

/// Purchase payload for [`create_order`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewPurchase {
    /// Items bought
    pub lines: Vec<OrderLine>,
    /// Total charged
    pub total_price: f64,
}

/// Type-specific payload of a new order.
#[derive(Debug, Clone, PartialEq)]
pub enum NewOrderDetails {
    /// Book a repair
    Repair(NewRepair),
    /// Request a custom-made piece
    SpecialOrder(NewSpecialOrder),
    /// Record a completed purchase
    Purchase(NewPurchase),
}

/// Everything [`create_order`] needs. Required fields are expected to be
/// validated by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    /// Owner
    pub user_id: String,
    /// Customer notes
    pub notes: String,
    /// Type-specific payload
    pub details: NewOrderDetails,
}

/// Filters for [`get_all_orders`]. Empty filter returns every order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    /// Only orders owned by this user
    pub user_id: Option<String>,
    /// Only orders with this status
    pub status: Option<OrderStatus>,
    /// Only orders of this type
    pub order_type: Option<OrderType>,
    /// Case-insensitive match on order id or description
    pub search: Option<String>,
}

impl OrderFilter {
    /// Filter for one user's orders.
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    fn matches_search(&self, order: &Order) -> bool {
        let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
            return true;
        };
        let term = term.to_lowercase();

        order.id.to_lowercase().contains(&term)
            || order
                .description()
                .is_some_and(|d| d.to_lowercase().contains(&term))
    }
}

/// Partial update for [`update_order`]. `None` leaves the field unchanged.
///
/// The order type cannot change. Setting a field that does not belong to the
/// order's type is a validation error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderUpdate {
    /// New status
    pub status: Option<OrderStatus>,
    /// New notes
    pub notes: Option<String>,
    /// New description (repair, special order)
    pub description: Option<String>,
    /// New urgency (repair)
    pub urgency: Option<Urgency>,
    /// New preferred date (repair); `Some(None)` clears it
    pub preferred_date: Option<Option<NaiveDate>>,
    /// New estimated delivery (repair)
    pub estimated_delivery: Option<DateTime<Utc>>,
    /// New measurements (special order)
    pub measurements: Option<String>,
    /// New fabric (special order)
    pub fabric: Option<String>,
    /// New reference (special order)
    pub reference: Option<String>,
    /// New contact preference (special order)
    pub accepts_whatsapp: Option<bool>,
    /// New decision (special order). A rejection also cancels the order.
    pub acceptance: Option<Acceptance>,
}

impl OrderUpdate {
    fn touches_repair_fields(&self) -> bool {
        self.urgency.is_some() || self.preferred_date.is_some() || self.estimated_delivery.is_some()
    }

    fn touches_special_fields(&self) -> bool {
        self.measurements.is_some()
            || self.fabric.is_some()
            || self.reference.is_some()
            || self.accepts_whatsapp.is_some()
            || self.acceptance.is_some()
    }
}

/// Creates an order with a fresh id, `created_at == updated_at == now` and the
/// initial status for its type (`Completed` for purchases, `Not Started`
/// otherwise).
///
/// For repairs the service is looked up to compute the estimated delivery as
/// `created_at + estimated_days`; the order row and its purchase lines are
/// written in one database transaction.
///
/// # Errors
/// Returns [`Error::ServiceNotFound`] when a repair names a missing service,
/// [`Error::Validation`] when the service's estimate does not yield a delivery
/// date, or [`Error::Database`] when the store rejects a write. Nothing is
/// persisted in any of these cases.
#[instrument(skip(db, new), fields(user_id = %new.user_id))]
pub async fn create_order<C>(db: &C, new: NewOrder) -> Result<Order>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;
    let now = Utc::now();
    let id = ids::next_id(ids::ORDER_PREFIX);

    let mut row = order::ActiveModel {
        id: Set(id.clone()),
        user_id: Set(new.user_id),
        notes: Set(new.notes),
        photos: Set(Photos::default()),
        created_at: Set(now),
        updated_at: Set(now),
        description: Set(None),
        service_id: Set(None),
        urgency: Set(None),
        preferred_date: Set(None),
        estimated_delivery: Set(None),
        measurements: Set(None),
        fabric: Set(None),
        reference: Set(None),
        accepts_whatsapp: Set(None),
        acceptance: Set(None),
        rejection_reason: Set(None),
        total_price: Set(None),
        ..Default::default()
    };

    let mut lines = Vec::new();
    match new.details {
        NewOrderDetails::Repair(repair) => {
            let service = Service::find_by_id(repair.service_id.clone())
                .one(&txn)
                .await?
                .ok_or_else(|| Error::ServiceNotFound {
                    id: repair.service_id.clone(),
                })?;
            let estimated_delivery = u64::try_from(service.estimated_days)
                .ok()
                .and_then(|days| now.checked_add_days(Days::new(days)))
                .ok_or_else(|| {
                    Error::validation(format!(
                        "Service {} has an unusable estimate of {} days",
                        service.id, service.estimated_days
                    ))
                })?;

            row.order_type = Set(OrderType::Repair);
            row.status = Set(OrderStatus::NotStarted);
            row.service_id = Set(Some(repair.service_id));
            row.description = Set(Some(repair.description));
            row.urgency = Set(Some(repair.urgency));
            row.preferred_date = Set(repair.preferred_date);
            row.estimated_delivery = Set(Some(estimated_delivery));
        }
        NewOrderDetails::SpecialOrder(special) => {
            row.order_type = Set(OrderType::SpecialOrder);
            row.status = Set(OrderStatus::NotStarted);
            row.description = Set(Some(special.description));
            row.measurements = Set(Some(special.measurements));
            row.fabric = Set(Some(special.fabric));
            row.reference = Set(Some(special.reference));
            row.accepts_whatsapp = Set(Some(special.accepts_whatsapp));
            row.acceptance = Set(Some(AcceptanceState::Pending));
        }
        NewOrderDetails::Purchase(purchase) => {
            row.order_type = Set(OrderType::Purchase);
            row.status = Set(OrderStatus::Completed);
            row.total_price = Set(Some(purchase.total_price));
            lines = purchase.lines;
        }
    }

    let row = row.insert(&txn).await?;

    if !lines.is_empty() {
        let items = lines.iter().map(|line| order_item::ActiveModel {
            order_id: Set(id.clone()),
            item_id: Set(line.item_id.clone()),
            quantity: Set(line.quantity),
            ..Default::default()
        });
        OrderItem::insert_many(items).exec(&txn).await?;
    }

    let items = load_items(&txn, std::slice::from_ref(&id))
        .await?
        .remove(&id)
        .unwrap_or_default();

    txn.commit().await?;

    let order = Order::from_rows(row, items)?;
    info!(
        order_id = %order.id,
        order_type = ?order.order_type(),
        status = %order.status,
        "Order created"
    );
    Ok(order)
}

/// Loads purchase lines for the given orders, grouped by order id in line order.
async fn load_items<C>(db: &C, order_ids: &[String]) -> Result<HashMap<String, Vec<order_item::Model>>>
where
    C: ConnectionTrait,
{
    if order_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = OrderItem::find()
        .filter(order_item::Column::OrderId.is_in(order_ids.iter().cloned()))
        .order_by_asc(order_item::Column::Id)
        .all(db)
        .await?;

    let mut grouped: HashMap<String, Vec<order_item::Model>> = HashMap::new();
    for row in rows {
        grouped.entry(row.order_id.clone()).or_default().push(row);
    }
    Ok(grouped)
}

async fn hydrate<C>(db: &C, rows: Vec<order::Model>) -> Result<Vec<Order>>
where
    C: ConnectionTrait,
{
    let ids: Vec<String> = rows.iter().map(|row| row.id.clone()).collect();
    let mut items = load_items(db, &ids).await?;

    rows.into_iter()
        .map(|row| {
            let lines = items.remove(&row.id).unwrap_or_default();
            Order::from_rows(row, lines)
        })
        .collect()
}

/// Retrieves orders matching `filter`, newest first.
///
/// # Errors
/// Returns [`Error::Database`] if a query fails, or [`Error::Corrupt`] for a
/// stored order that does not fit its type.
pub async fn get_all_orders<C>(db: &C, filter: &OrderFilter) -> Result<Vec<Order>>
where
    C: ConnectionTrait,
{
    let mut query = OrderEntity::find();
    if let Some(user_id) = &filter.user_id {
        query = query.filter(order::Column::UserId.eq(user_id.as_str()));
    }
    if let Some(status) = filter.status {
        query = query.filter(order::Column::Status.eq(status));
    }
    if let Some(order_type) = filter.order_type {
        query = query.filter(order::Column::OrderType.eq(order_type));
    }

    let rows = query
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .all(db)
        .await?;

    let mut orders: Vec<Order> = hydrate(db, rows)
        .await?
        .into_iter()
        .filter(|order| filter.matches_search(order))
        .collect();
    orders.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });

    debug!(count = orders.len(), ?filter, "Loaded orders");
    Ok(orders)
}

/// Retrieves an order by id, `None` when it does not exist.
///
/// # Errors
/// Returns [`Error::Database`] if a query fails, or [`Error::Corrupt`] if the
/// stored order does not fit its type.
pub async fn get_order_by_id<C>(db: &C, order_id: &str) -> Result<Option<Order>>
where
    C: ConnectionTrait,
{
    let Some(row) = OrderEntity::find_by_id(order_id.to_string()).one(db).await? else {
        return Ok(None);
    };
    let mut orders = hydrate(db, vec![row]).await?;
    Ok(orders.pop())
}

/// Looks up an order from a customer-typed id (surrounding whitespace ignored).
///
/// # Errors
/// Returns [`Error::Validation`] for a blank id and [`Error::NotFound`] when no
/// order has that id.
pub async fn track_order(db: &DatabaseConnection, raw_order_id: &str) -> Result<Order> {
    let order_id = raw_order_id.trim();
    if order_id.is_empty() {
        return Err(Error::validation("Order id is required"));
    }

    get_order_by_id(db, order_id)
        .await?
        .ok_or_else(|| Error::not_found("order", order_id))
}

async fn find_row(db: &DatabaseConnection, order_id: &str) -> Result<order::Model> {
    OrderEntity::find_by_id(order_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("order", order_id))
}

async fn save(db: &DatabaseConnection, order_id: &str, row: order::ActiveModel) -> Result<Order> {
    let row = row.update(db).await?;
    let mut orders = hydrate(db, vec![row]).await?;
    orders.pop().ok_or_else(|| Error::not_found("order", order_id))
}

/// Sets an order's status and refreshes `updated_at`. No other field changes.
///
/// # Errors
/// Returns [`Error::NotFound`] if the order does not exist.
#[instrument(skip(db))]
pub async fn update_order_status(
    db: &DatabaseConnection,
    order_id: &str,
    status: OrderStatus,
) -> Result<Order> {
    let row = find_row(db, order_id).await?;
    let previous = row.status;

    let mut row: order::ActiveModel = row.into();
    row.status = Set(status);
    row.updated_at = Set(Utc::now());

    let order = save(db, order_id, row).await?;
    info!(%order_id, from = %previous, to = %status, "Order status changed");
    Ok(order)
}

/// Applies a partial update and refreshes `updated_at`, whether or not any
/// field actually changed.
///
/// A rejection in `changes.acceptance` must carry a non-empty reason and forces
/// `status = Cancelled` in the same write, overriding `changes.status`.
///
/// # Errors
/// Returns [`Error::NotFound`] if the order does not exist, or
/// [`Error::Validation`] when a field does not belong to the order's type or a
/// rejection has no reason.
#[instrument(skip(db, changes))]
pub async fn update_order(
    db: &DatabaseConnection,
    order_id: &str,
    changes: OrderUpdate,
) -> Result<Order> {
    let row = find_row(db, order_id).await?;

    match row.order_type {
        OrderType::Repair if changes.touches_special_fields() => {
            return Err(Error::validation("Special order fields set on a repair"));
        }
        OrderType::SpecialOrder if changes.touches_repair_fields() => {
            return Err(Error::validation("Repair fields set on a special order"));
        }
        OrderType::Purchase
            if changes.touches_repair_fields()
                || changes.touches_special_fields()
                || changes.description.is_some() =>
        {
            return Err(Error::validation("Purchases only accept status and notes"));
        }
        _ => {}
    }

    let mut row: order::ActiveModel = row.into();

    if let Some(status) = changes.status {
        row.status = Set(status);
    }
    if let Some(notes) = changes.notes {
        row.notes = Set(notes);
    }
    if let Some(description) = changes.description {
        row.description = Set(Some(description));
    }
    if let Some(urgency) = changes.urgency {
        row.urgency = Set(Some(urgency));
    }
    if let Some(preferred_date) = changes.preferred_date {
        row.preferred_date = Set(preferred_date);
    }
    if let Some(estimated_delivery) = changes.estimated_delivery {
        row.estimated_delivery = Set(Some(estimated_delivery));
    }
    if let Some(measurements) = changes.measurements {
        row.measurements = Set(Some(measurements));
    }
    if let Some(fabric) = changes.fabric {
        row.fabric = Set(Some(fabric));
    }
    if let Some(reference) = changes.reference {
        row.reference = Set(Some(reference));
    }
    if let Some(accepts_whatsapp) = changes.accepts_whatsapp {
        row.accepts_whatsapp = Set(Some(accepts_whatsapp));
    }
    if let Some(acceptance) = changes.acceptance {
        apply_acceptance(&mut row, acceptance)?;
    }
    row.updated_at = Set(Utc::now());

    save(db, order_id, row).await
}

fn apply_acceptance(row: &mut order::ActiveModel, acceptance: Acceptance) -> Result<()> {
    match acceptance {
        Acceptance::Pending => {
            row.acceptance = Set(Some(AcceptanceState::Pending));
            row.rejection_reason = Set(None);
        }
        Acceptance::Accepted => {
            row.acceptance = Set(Some(AcceptanceState::Accepted));
            row.rejection_reason = Set(None);
        }
        Acceptance::Rejected { reason } => {
            let reason = reason.trim();
            if reason.is_empty() {
                return Err(Error::validation("A rejection needs a reason"));
            }
            row.acceptance = Set(Some(AcceptanceState::Rejected));
            row.rejection_reason = Set(Some(reason.to_string()));
            row.status = Set(OrderStatus::Cancelled);
        }
    }
    Ok(())
}

async fn pending_special_order(db: &DatabaseConnection, order_id: &str) -> Result<()> {
    let row = find_row(db, order_id).await?;
    if row.order_type != OrderType::SpecialOrder {
        return Err(Error::validation(format!(
            "Order {order_id} is not a special order"
        )));
    }
    if !matches!(row.acceptance, None | Some(AcceptanceState::Pending)) {
        return Err(Error::validation(format!(
            "Order {order_id} has already been decided"
        )));
    }
    Ok(())
}

/// Accepts a pending special order. Nothing but the decision changes.
///
/// # Errors
/// Returns [`Error::NotFound`] for an unknown id and [`Error::Validation`] when
/// the order is not a special order or was already decided.
pub async fn accept_special_order(db: &DatabaseConnection, order_id: &str) -> Result<Order> {
    pending_special_order(db, order_id).await?;

    let order = update_order(
        db,
        order_id,
        OrderUpdate {
            acceptance: Some(Acceptance::Accepted),
            ..OrderUpdate::default()
        },
    )
    .await?;
    info!(%order_id, "Special order accepted");
    Ok(order)
}

/// Rejects a pending special order and cancels it in the same write.
///
/// # Errors
/// Returns [`Error::NotFound`] for an unknown id and [`Error::Validation`] when
/// the reason is blank, the order is not a special order, or it was already
/// decided.
pub async fn reject_special_order(
    db: &DatabaseConnection,
    order_id: &str,
    reason: &str,
) -> Result<Order> {
    if reason.trim().is_empty() {
        return Err(Error::validation("A rejection needs a reason"));
    }
    pending_special_order(db, order_id).await?;

    let order = update_order(
        db,
        order_id,
        OrderUpdate {
            acceptance: Some(Acceptance::Rejected {
                reason: reason.to_string(),
            }),
            ..OrderUpdate::default()
        },
    )
    .await?;
    info!(%order_id, "Special order rejected");
    Ok(order)
}
