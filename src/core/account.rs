//! Customer accounts - registration, login and logout.
//!
//! There is no password store: the administrator authenticates against
//! [`AdminCredentials`], every other user logs in by email alone. Each function
//! updates the [`Session`] it is given.

use crate::{
    config::admin::AdminCredentials,
    core::{cart, ids, session::Session},
    entities::{User, user},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};
use tracing::{debug, info};

/// Checks for a `local@domain.tld` shape with no whitespace.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .rsplit_once('.')
        .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}

/// Accepts an optional leading `+` followed by digits, spaces, `-`, `(` and `)`.
#[must_use]
pub fn is_valid_phone(phone: &str) -> bool {
    let rest = phone.strip_prefix('+').unwrap_or(phone);
    !rest.is_empty()
        && rest
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')'))
}

/// Finds a user by email (exact match).
pub async fn get_user_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a user by id.
pub async fn get_user_by_id(db: &DatabaseConnection, user_id: &str) -> Result<Option<user::Model>> {
    User::find_by_id(user_id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Registers a customer and logs them in.
///
/// # Errors
/// Returns [`Error::Validation`] when a field is empty, the email is malformed
/// or the phone contains unexpected characters.
pub async fn register(
    db: &DatabaseConnection,
    session: &mut Session,
    name: &str,
    email: &str,
    phone: &str,
) -> Result<user::Model> {
    let (name, email, phone) = (name.trim(), email.trim(), phone.trim());

    if name.is_empty() || email.is_empty() || phone.is_empty() {
        return Err(Error::validation("Name, email and phone are required"));
    }
    if !is_valid_email(email) {
        return Err(Error::validation(format!("Invalid email: {email}")));
    }
    if !is_valid_phone(phone) {
        return Err(Error::validation(format!("Invalid phone: {phone}")));
    }

    let user = user::ActiveModel {
        id: Set(ids::next_id(ids::USER_PREFIX)),
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        phone: Set(phone.to_string()),
        is_admin: Set(false),
    };
    let user = user.insert(db).await?;

    info!(user_id = %user.id, "User registered");
    session.set_current(user.clone());
    Ok(user)
}

/// Logs a user in. Returns `None` when the credentials do not match anyone.
///
/// The admin email only authenticates with the admin password; any other
/// registered email authenticates on its own.
///
/// # Errors
/// Returns [`Error::Validation`] when either field is empty.
pub async fn login(
    db: &DatabaseConnection,
    session: &mut Session,
    admin: &AdminCredentials,
    email: &str,
    password: &str,
) -> Result<Option<user::Model>> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(Error::validation("Email and password are required"));
    }

    if admin.is_admin_email(email) && !admin.matches(email, password) {
        debug!("Rejected admin login with wrong password");
        return Ok(None);
    }

    let Some(user) = get_user_by_email(db, email).await? else {
        debug!(%email, "Login for unknown email");
        return Ok(None);
    };

    info!(user_id = %user.id, is_admin = user.is_admin, "User logged in");
    session.set_current(user.clone());
    Ok(Some(user))
}

/// Logs out: forgets the current user and empties the session's cart.
///
/// # Errors
/// Returns [`Error::Database`] if the cart cannot be cleared, in which case the
/// session is left logged in.
pub async fn logout(db: &DatabaseConnection, session: &mut Session) -> Result<()> {
    cart::clear_cart(db, session.cart_id()).await?;
    if let Some(user) = session.current() {
        info!(user_id = %user.id, "User logged out");
    }
    session.clear();
    Ok(())
}
