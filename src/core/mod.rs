//! Core business logic - framework-agnostic operations over the record store.
//!
//! Every operation takes a connection (or transaction) explicitly, and the ones
//! that need an identity take a [`session::Session`].

pub mod account;
pub mod cart;
pub mod checkout;
pub mod dashboard;
pub mod ids;
pub mod order;
pub mod service;
pub mod session;
pub mod store_item;
pub mod submission;
