//! Core types for the event-sourced account ledger.
//!
//! Account history is an append-only sequence of [`event::Event`]s ordered by
//! position. Current state is never stored; it is derived on demand by
//! [`account::project`]. Storage backends implement [`store::EventStore`].
//!
//! This crate is free of HTTP and database dependencies.

pub mod account;
pub mod error;
pub mod event;
pub mod position;
pub mod store;

pub use error::{Error, ErrorKind, Result};
