//! Session context - who is logged in and which cart belongs to them.
//!
//! A [`Session`] is created by the caller (one per browser session, bot
//! conversation, HTTP cookie, ...) and passed explicitly to every operation
//! that needs an identity. The core never keeps a global current user.

use crate::{
    core::ids,
    entities::user,
    errors::{Error, Result},
};

/// Explicit per-session state: the current user slot and the cart key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    current_user: Option<user::Model>,
    cart_id: String,
}

impl Session {
    /// Creates a session with no user and the given cart key.
    pub fn new(cart_id: impl Into<String>) -> Self {
        Self {
            current_user: None,
            cart_id: cart_id.into(),
        }
    }

    /// Creates a session with no user and a freshly generated cart key.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::new(ids::next_id(ids::CART_PREFIX))
    }

    /// The logged-in user, if any.
    #[must_use]
    pub const fn current(&self) -> Option<&user::Model> {
        self.current_user.as_ref()
    }

    /// Stores `user` as the logged-in user.
    pub fn set_current(&mut self, user: user::Model) {
        self.current_user = Some(user);
    }

    /// Forgets the logged-in user. The cart key is kept.
    pub fn clear(&mut self) {
        self.current_user = None;
    }

    /// Key of the cart owned by this session.
    #[must_use]
    pub fn cart_id(&self) -> &str {
        &self.cart_id
    }

    /// Whether the logged-in user is an administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.current_user.as_ref().is_some_and(|u| u.is_admin)
    }

    /// Returns the logged-in user or [`Error::Unauthenticated`].
    pub fn require_user(&self) -> Result<&user::Model> {
        self.current_user.as_ref().ok_or(Error::Unauthenticated)
    }

    /// Returns the logged-in administrator, [`Error::Unauthenticated`] when nobody
    /// is logged in, or [`Error::Forbidden`] for a regular customer.
    pub fn require_admin(&self) -> Result<&user::Model> {
        let user = self.require_user()?;
        if user.is_admin {
            Ok(user)
        } else {
            Err(Error::Forbidden {
                user_id: user.id.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer() -> user::Model {
        user::Model {
            id: "u_001".to_string(),
            name: "Maria".to_string(),
            email: "maria@example.com".to_string(),
            phone: "+55 11 91234-5678".to_string(),
            is_admin: false,
        }
    }

    #[test]
    fn test_new_session_has_no_user() {
        let session = Session::new("cart_1");
        assert!(session.current().is_none());
        assert_eq!(session.cart_id(), "cart_1");
        assert!(matches!(session.require_user(), Err(Error::Unauthenticated)));
    }

    #[test]
    fn test_set_and_clear_current() {
        let mut session = Session::anonymous();
        let cart_id = session.cart_id().to_string();

        session.set_current(customer());
        assert_eq!(session.current().map(|u| u.id.as_str()), Some("u_001"));

        session.clear();
        assert!(session.current().is_none());
        assert_eq!(session.cart_id(), cart_id);
    }

    #[test]
    fn test_require_admin() {
        let mut session = Session::new("cart_1");
        assert!(matches!(session.require_admin(), Err(Error::Unauthenticated)));

        session.set_current(customer());
        assert!(!session.is_admin());
        assert!(matches!(
            session.require_admin(),
            Err(Error::Forbidden { user_id }) if user_id == "u_001"
        ));

        let mut admin = customer();
        admin.is_admin = true;
        session.set_current(admin);
        assert!(session.is_admin());
        assert!(session.require_admin().is_ok());
    }
}
