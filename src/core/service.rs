//! Service catalog - Repair offerings managed by the administrator.
//!
//! Services are referenced by repair orders through `service_id`. Deleting a
//! service does not touch existing orders, but new repair requests against it
//! fail with [`Error::ServiceNotFound`].

use crate::{
    core::ids,
    entities::{Service, service},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// Longest turnaround a service may advertise.
pub const MAX_ESTIMATED_DAYS: i32 = 365;

/// Fields needed to create a service.
#[derive(Debug, Clone, PartialEq)]
pub struct NewService {
    /// Short title
    pub title: String,
    /// Longer description
    pub description: String,
    /// Price of the repair
    pub price: f64,
    /// Working days the repair usually takes
    pub estimated_days: i32,
}

/// Partial update of a service. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceUpdate {
    /// New title
    pub title: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New price
    pub price: Option<f64>,
    /// New estimated days
    pub estimated_days: Option<i32>,
}

pub(crate) fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::validation("Service title cannot be empty"));
    }
    Ok(())
}

pub(crate) fn validate_price(price: f64) -> Result<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(Error::InvalidAmount { amount: price });
    }
    Ok(())
}

pub(crate) fn validate_estimated_days(days: i32) -> Result<()> {
    if days <= 0 {
        return Err(Error::validation(format!(
            "Estimated days must be positive, got {days}"
        )));
    }
    if days > MAX_ESTIMATED_DAYS {
        return Err(Error::validation(format!(
            "Estimated days cannot exceed {MAX_ESTIMATED_DAYS}, got {days}"
        )));
    }
    Ok(())
}

/// Retrieves every service in creation order.
///
/// # Errors
/// Returns [`Error::Database`] if the query fails.
pub async fn get_all_services(db: &DatabaseConnection) -> Result<Vec<service::Model>> {
    Service::find()
        .order_by_asc(service::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a service by id, `None` when it does not exist.
pub async fn get_service_by_id<C>(db: &C, service_id: &str) -> Result<Option<service::Model>>
where
    C: ConnectionTrait,
{
    Service::find_by_id(service_id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a service with a generated `s_...` id.
///
/// # Errors
/// Returns an error if:
/// - The title is empty or whitespace-only
/// - The price is negative or not finite
/// - The estimated days are not positive
/// - The database insert fails
pub async fn create_service(db: &DatabaseConnection, new: NewService) -> Result<service::Model> {
    validate_title(&new.title)?;
    validate_price(new.price)?;
    validate_estimated_days(new.estimated_days)?;

    let service = service::ActiveModel {
        id: Set(ids::next_id(ids::SERVICE_PREFIX)),
        title: Set(new.title.trim().to_string()),
        description: Set(new.description),
        price: Set(new.price),
        estimated_days: Set(new.estimated_days),
    };

    let created = service.insert(db).await?;
    info!(service_id = %created.id, title = %created.title, "Service created");
    Ok(created)
}

/// Applies a partial update to a service.
///
/// # Errors
/// Returns [`Error::NotFound`] if the service does not exist, or a validation
/// error for any provided field that is invalid.
pub async fn update_service(
    db: &DatabaseConnection,
    service_id: &str,
    changes: ServiceUpdate,
) -> Result<service::Model> {
    if let Some(title) = &changes.title {
        validate_title(title)?;
    }
    if let Some(price) = changes.price {
        validate_price(price)?;
    }
    if let Some(days) = changes.estimated_days {
        validate_estimated_days(days)?;
    }

    let mut service: service::ActiveModel = Service::find_by_id(service_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("service", service_id))?
        .into();

    if let Some(title) = changes.title {
        service.title = Set(title.trim().to_string());
    }
    if let Some(description) = changes.description {
        service.description = Set(description);
    }
    if let Some(price) = changes.price {
        service.price = Set(price);
    }
    if let Some(days) = changes.estimated_days {
        service.estimated_days = Set(days);
    }

    service.update(db).await.map_err(Into::into)
}

/// Deletes a service. Orders that reference it are left as they are.
///
/// # Errors
/// Returns [`Error::NotFound`] if the service does not exist.
pub async fn delete_service(db: &DatabaseConnection, service_id: &str) -> Result<()> {
    let result = Service::delete_by_id(service_id.to_string()).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("service", service_id));
    }

    info!(%service_id, "Service deleted");
    Ok(())
}
