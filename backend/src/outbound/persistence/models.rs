//! Internal Diesel row structs.
//!
//! Rows never leave the persistence layer; each submodule converts its rows
//! to and from domain types.

pub(crate) mod account_rows;
pub(crate) mod catalog_rows;
pub(crate) mod commerce_rows;
pub(crate) mod order_rows;
