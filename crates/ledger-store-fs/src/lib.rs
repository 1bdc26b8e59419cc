//! Filesystem backend for the account ledger.
//!
//! One directory per account under a configured root; one file per event,
//! named by its position:
//!
//! ```text
//! <root>/<account_id>/0.json
//! <root>/<account_id>/1.json
//! ...
//! ```
//!
//! Files are created exactly once and never modified or removed.

mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::FsStore;
