//! Unified error type for the storefront core.
//!
//! Every fallible operation in [`crate::core`] and [`crate::config`] returns
//! [`Result`]. Storage failures from `SeaORM` are carried unchanged in
//! [`Error::Database`] so callers can tell them apart from domain failures.

use thiserror::Error;

/// All errors the storefront core can produce.
#[derive(Debug, Error)]
pub enum Error {
    /// A record with the given id does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Collection the lookup ran against (e.g. `"order"`)
        entity: &'static str,
        /// The id that was looked up
        id: String,
    },

    /// Input rejected before any store call
    #[error("Validation failed: {message}")]
    Validation {
        /// What was wrong with the input
        message: String,
    },

    /// A repair order referenced a service that does not exist
    #[error("Service not found: {id}")]
    ServiceNotFound {
        /// The missing service id
        id: String,
    },

    /// The operation needs a logged-in user and the session has none
    #[error("No authenticated user in session")]
    Unauthenticated,

    /// The operation needs an administrator
    #[error("User {user_id} is not an administrator")]
    Forbidden {
        /// The non-admin user that attempted the operation
        user_id: String,
    },

    /// Checkout was attempted with no reconciled cart lines
    #[error("Cart is empty")]
    EmptyCart,

    /// The item cannot be added to a cart because none are in stock
    #[error("Item out of stock: {item_id}")]
    OutOfStock {
        /// The store item id
        item_id: String,
    },

    /// A price was negative or not finite
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// A quantity that must be positive was not
    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity {
        /// The rejected quantity
        quantity: i32,
    },

    /// A persisted order row does not match the shape its type requires
    #[error("Corrupt order record {id}: {message}")]
    Corrupt {
        /// The order id
        id: String,
        /// Which field is missing or inconsistent
        message: String,
    },

    /// Configuration could not be loaded or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },

    /// The persistence layer rejected a read or write
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Reading a configuration or seed file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A required environment variable was missing or not unicode
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Shorthand for [`Error::NotFound`].
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Shorthand for [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}
