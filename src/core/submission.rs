//! Customer-facing order submission - repair bookings and special-order requests.
//!
//! Required fields are checked here, before anything touches the store, so a
//! rejected submission never leaves a partial order behind.

use crate::{
    core::{
        order::{self, NewOrder, NewOrderDetails, NewRepair, NewSpecialOrder, Order},
        session::Session,
    },
    entities::Urgency,
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use tracing::instrument;

/// A repair booking as typed by the customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairRequest {
    /// Catalog service to book
    pub service_id: String,
    /// What needs fixing
    pub description: String,
    /// Requested turnaround, `Medium` when not chosen
    pub urgency: Option<Urgency>,
    /// Date the customer would like
    pub preferred_date: Option<NaiveDate>,
    /// Extra notes
    pub notes: String,
}

/// A special-order request as typed by the customer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecialOrderRequest {
    /// What the customer wants made
    pub description: String,
    /// Body measurements
    pub measurements: String,
    /// Desired fabric
    pub fabric: String,
    /// Style reference
    pub reference: String,
    /// Extra notes
    pub notes: String,
    /// Customer agreed to `WhatsApp` contact
    pub accepts_whatsapp: bool,
}

fn required(value: &str, field: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

/// Books a repair for the session's user.
///
/// # Errors
/// Returns [`Error::Unauthenticated`] without a user, [`Error::Validation`] for
/// a blank service or description, and [`Error::ServiceNotFound`] when the
/// service does not exist.
#[instrument(skip(db, session, request))]
pub async fn submit_repair(
    db: &DatabaseConnection,
    session: &Session,
    request: RepairRequest,
) -> Result<Order> {
    let user = session.require_user()?;
    let service_id = required(&request.service_id, "Service")?;
    let description = required(&request.description, "Description")?;

    order::create_order(
        db,
        NewOrder {
            user_id: user.id.clone(),
            notes: request.notes.trim().to_string(),
            details: NewOrderDetails::Repair(NewRepair {
                service_id,
                description,
                urgency: request.urgency.unwrap_or(Urgency::Medium),
                preferred_date: request.preferred_date,
            }),
        },
    )
    .await
}

/// Submits a special-order request for the session's user. The order starts
/// as `Not Started` with a pending decision.
///
/// # Errors
/// Returns [`Error::Unauthenticated`] without a user and [`Error::Validation`]
/// for a blank description or blank measurements.
#[instrument(skip(db, session, request))]
pub async fn submit_special_order(
    db: &DatabaseConnection,
    session: &Session,
    request: SpecialOrderRequest,
) -> Result<Order> {
    let user = session.require_user()?;
    let description = required(&request.description, "Description")?;
    let measurements = required(&request.measurements, "Measurements")?;

    order::create_order(
        db,
        NewOrder {
            user_id: user.id.clone(),
            notes: request.notes.trim().to_string(),
            details: NewOrderDetails::SpecialOrder(NewSpecialOrder {
                description,
                measurements,
                fabric: request.fabric.trim().to_string(),
                reference: request.reference.trim().to_string(),
                accepts_whatsapp: request.accepts_whatsapp,
            }),
        },
    )
    .await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::order::{Acceptance, OrderDetails, OrderFilter, get_all_orders};
    use crate::entities::OrderStatus;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn hem_request(service_id: &str) -> RepairRequest {
        RepairRequest {
            service_id: service_id.to_string(),
            description: "  Shorten trousers by 3cm ".to_string(),
            urgency: None,
            preferred_date: NaiveDate::from_ymd_opt(2026, 3, 14),
            notes: String::new(),
        }
    }

    #[tokio::test]
    async fn test_submit_requires_user() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let session = Session::anonymous();

        let result = submit_repair(&db, &session, hem_request("s_001")).await;
        assert!(matches!(result.unwrap_err(), Error::Unauthenticated));

        let result = submit_special_order(&db, &session, SpecialOrderRequest::default()).await;
        assert!(matches!(result.unwrap_err(), Error::Unauthenticated));
        Ok(())
    }

    #[tokio::test]
    async fn test_blank_fields_fail_before_any_write() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let session = session_for(&user);

        let mut request = hem_request("s_001");
        request.description = "   ".to_string();
        let result = submit_repair(&db, &session, request).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let result = submit_special_order(
            &db,
            &session,
            SpecialOrderRequest {
                description: "Linen dress".to_string(),
                ..SpecialOrderRequest::default()
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        assert!(get_all_orders(&db, &OrderFilter::default()).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_submit_repair_defaults_urgency() -> Result<()> {
        let (db, user, service) = setup_with_service(4).await?;
        let session = session_for(&user);

        let order = submit_repair(&db, &session, hem_request(&service.id)).await?;

        assert_eq!(order.user_id, user.id);
        assert_eq!(order.status, OrderStatus::NotStarted);
        let OrderDetails::Repair(details) = &order.details else {
            panic!("expected repair details");
        };
        assert_eq!(details.urgency, Urgency::Medium);
        assert_eq!(details.description, "Shorten trousers by 3cm");
        Ok(())
    }

    #[tokio::test]
    async fn test_submit_repair_unknown_service() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let session = session_for(&user);

        let result = submit_repair(&db, &session, hem_request("s_missing")).await;
        assert!(matches!(result.unwrap_err(), Error::ServiceNotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_submit_special_order() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let session = session_for(&user);

        let order = submit_special_order(
            &db,
            &session,
            SpecialOrderRequest {
                description: "Linen dress".to_string(),
                measurements: "Bust 88cm".to_string(),
                accepts_whatsapp: true,
                ..SpecialOrderRequest::default()
            },
        )
        .await?;

        let OrderDetails::SpecialOrder(details) = &order.details else {
            panic!("expected special order details");
        };
        assert_eq!(details.acceptance, Acceptance::Pending);
        assert!(details.fabric.is_empty());
        assert!(details.accepts_whatsapp);
        Ok(())
    }
}
