//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL repositories using Diesel
//! - **payment**: the online payment gateway over REST
//! - **mail**: transactional email over a JSON API
//! - **security**: password hashing and signed tokens
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod mail;
pub mod payment;
pub mod persistence;
pub mod security;
