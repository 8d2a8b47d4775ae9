//! Error shared by every repository port.

use serde_json::json;

use crate::domain::Error;

use super::define_port_error;

define_port_error! {
    /// Failures raised by repository adapters.
    pub enum PersistenceError {
        /// The pool could not hand out a connection.
        Connection { message: String } => "repository connection failed: {message}",
        /// A query or mutation failed while executing.
        Query { message: String } => "repository query failed: {message}",
        /// A unique constraint rejected the write.
        Duplicate { message: String } => "duplicate record: {message}",
        /// A guarded stock decrement found too few units.
        InsufficientStock { product: String, size: String } =>
            "insufficient stock for {product} size {size}",
        /// A guarded wallet debit found too little balance.
        InsufficientBalance => "wallet balance is too low",
        /// The row no longer satisfies the state the write expected.
        Stale { message: String } => "record changed concurrently: {message}",
    }
}

impl From<PersistenceError> for Error {
    fn from(error: PersistenceError) -> Self {
        match error {
            PersistenceError::Connection { message } => {
                tracing::warn!(%message, "repository unavailable");
                Self::service_unavailable("storage is temporarily unavailable")
            }
            PersistenceError::Query { message } => Self::internal(message),
            PersistenceError::Duplicate { message } => Self::conflict(message),
            PersistenceError::InsufficientStock { product, size } => Self::invalid_request(format!(
                "{product} in size {size} does not have enough stock"
            ))
            .with_details(json!({
                "code": "insufficient_stock",
                "product": product,
                "size": size,
            })),
            PersistenceError::InsufficientBalance => {
                Self::invalid_request("insufficient wallet balance")
                    .with_details(json!({ "code": "insufficient_balance" }))
            }
            PersistenceError::Stale { message } => Self::conflict(message),
        }
    }
}
