//! Storefront backend library modules.
//!
//! The crate follows a hexagonal layout: [`domain`] holds entities, pricing
//! rules, ports and services; [`inbound`] exposes them over HTTP; and
//! [`outbound`] implements the ports against PostgreSQL, the payment gateway,
//! the mail API and the credential primitives.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
