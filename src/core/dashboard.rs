//! Admin dashboard statistics.
//!
//! Two of the figures are scoped to the selected period (`repairs_completed`,
//! `items_sold`); the others always cover the whole order history. Consumers
//! rely on that split, so it must not be made uniform.

use crate::{
    core::{
        order::{Order, OrderDetails, OrderFilter, get_all_orders},
        session::Session,
        store_item::get_catalog,
    },
    entities::{ItemType, OrderStatus, OrderType, store_item},
    errors::{Error, Result},
};
use chrono::{DateTime, Duration, Months, Utc};
use sea_orm::DatabaseConnection;
use std::{
    collections::{BTreeMap, HashMap},
    fmt::Write as _,
    str::FromStr,
};
use tracing::debug;

/// Number of orders listed in [`DashboardStats::recent_orders`].
pub const RECENT_ORDER_COUNT: usize = 5;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Rolling window for the period-scoped statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DashboardPeriod {
    /// Last 24 hours
    Day,
    /// Last 7 days
    Week,
    /// Since the same time one calendar month ago
    #[default]
    Month,
}

impl DashboardPeriod {
    /// Start of the window ending at `now`.
    ///
    /// A month back from a day the previous month lacks (e.g. 31 March) lands
    /// on that month's last day.
    #[must_use]
    pub fn window_start(self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::Day => now - Duration::days(1),
            Self::Week => now - Duration::days(7),
            Self::Month => now
                .checked_sub_months(Months::new(1))
                .unwrap_or(now - Duration::days(30)),
        }
    }

    /// Lowercase name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

impl FromStr for DashboardPeriod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            other => Err(Error::validation(format!(
                "Unknown period '{other}', expected day, week or month"
            ))),
        }
    }
}

/// Aggregated figures for the admin dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    /// Period the scoped figures were computed for
    pub period: DashboardPeriod,
    /// Completed repairs and special orders created within the period
    pub repairs_completed: usize,
    /// Units sold within the period, by current item category
    pub items_sold: BTreeMap<ItemType, i64>,
    /// Every order by status; all five statuses are present
    pub orders_by_status: BTreeMap<OrderStatus, usize>,
    /// Newest orders overall
    pub recent_orders: Vec<Order>,
    /// Mean days from creation to last update over all completed orders,
    /// one decimal; 0 when none are completed
    pub avg_completion_time: f64,
}

impl DashboardStats {
    /// Total units across all categories.
    #[must_use]
    pub fn total_items_sold(&self) -> i64 {
        self.items_sold.values().sum()
    }
}

/// Computes dashboard statistics from a snapshot of orders and the catalog.
///
/// Purchase lines whose item is no longer in the catalog are skipped.
#[must_use]
pub fn compute_dashboard_stats(
    orders: &[Order],
    catalog: &HashMap<String, store_item::Model>,
    period: DashboardPeriod,
    now: DateTime<Utc>,
) -> DashboardStats {
    let start = period.window_start(now);
    let in_period: Vec<&Order> = orders.iter().filter(|o| o.created_at >= start).collect();

    let repairs_completed = in_period
        .iter()
        .filter(|o| {
            matches!(o.order_type(), OrderType::Repair | OrderType::SpecialOrder)
                && o.status == OrderStatus::Completed
        })
        .count();

    let mut items_sold = BTreeMap::new();
    for line in in_period
        .iter()
        .copied()
        .filter(|o| o.order_type() == OrderType::Purchase)
        .flat_map(Order::lines)
    {
        let Some(item) = catalog.get(&line.item_id) else {
            debug!(item_id = %line.item_id, "Skipping sold line for missing item");
            continue;
        };
        *items_sold.entry(item.item_type).or_insert(0) += i64::from(line.quantity);
    }

    let mut orders_by_status: BTreeMap<OrderStatus, usize> =
        OrderStatus::ALL.iter().map(|s| (*s, 0)).collect();
    for order in orders {
        *orders_by_status.entry(order.status).or_insert(0) += 1;
    }

    let mut recent_orders = orders.to_vec();
    recent_orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    recent_orders.truncate(RECENT_ORDER_COUNT);

    DashboardStats {
        period,
        repairs_completed,
        items_sold,
        orders_by_status,
        recent_orders,
        avg_completion_time: average_completion_days(orders),
    }
}

#[allow(clippy::cast_precision_loss)]
fn average_completion_days(orders: &[Order]) -> f64 {
    let durations: Vec<f64> = orders
        .iter()
        .filter(|o| o.status == OrderStatus::Completed)
        .map(|o| (o.updated_at - o.created_at).num_milliseconds() as f64 / MILLIS_PER_DAY)
        .collect();

    if durations.is_empty() {
        return 0.0;
    }

    let mean = durations.iter().sum::<f64>() / durations.len() as f64;
    (mean * 10.0).round() / 10.0
}

/// Loads orders and catalog and computes the dashboard for `period`.
///
/// # Errors
/// Returns an error if orders or the catalog cannot be loaded, including
/// [`Error::Corrupt`] for a malformed order row.
pub async fn get_dashboard_stats(
    db: &DatabaseConnection,
    period: DashboardPeriod,
) -> Result<DashboardStats> {
    let orders = get_all_orders(db, &OrderFilter::default()).await?;
    let catalog = get_catalog(db).await?;
    Ok(compute_dashboard_stats(&orders, &catalog, period, Utc::now()))
}

/// Dashboard entry point for the admin area.
///
/// # Errors
/// Returns [`Error::Unauthenticated`] or [`Error::Forbidden`] unless the
/// session holds an administrator.
pub async fn get_admin_dashboard(
    db: &DatabaseConnection,
    session: &Session,
    period: DashboardPeriod,
) -> Result<DashboardStats> {
    session.require_admin()?;
    get_dashboard_stats(db, period).await
}

/// Formats an amount as currency, e.g. `R$ 35.00`.
#[must_use]
pub fn format_currency(amount: f64) -> String {
    if amount < 0.0 {
        format!("-R$ {:.2}", amount.abs())
    } else {
        format!("R$ {amount:.2}")
    }
}

/// Plain-text rendering of the dashboard, one figure per line.
#[must_use]
pub fn format_dashboard_summary(stats: &DashboardStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Dashboard ({})", stats.period.as_str());
    let _ = writeln!(out, "Repairs completed: {}", stats.repairs_completed);
    let _ = writeln!(out, "Items sold: {}", stats.total_items_sold());
    for (item_type, count) in &stats.items_sold {
        let _ = writeln!(out, "  {}: {count}", item_type.label());
    }
    let _ = writeln!(out, "Average completion: {:.1} days", stats.avg_completion_time);
    let _ = writeln!(out, "Orders by status:");
    for (status, count) in &stats.orders_by_status {
        let _ = writeln!(out, "  {status}: {count}");
    }
    let _ = writeln!(out, "Recent orders:");
    for order in &stats.recent_orders {
        let _ = write!(out, "  {} | {}", order.id, order.status);
        if let OrderDetails::Purchase(purchase) = &order.details {
            let _ = write!(out, " | {}", format_currency(purchase.total_price));
        }
        out.push('\n');
    }
    out
}
