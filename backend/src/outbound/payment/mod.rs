//! Payment gateway outbound adapters.
//!
//! [`RazorpayGateway`] talks to the gateway's REST API; [`UnconfiguredGateway`]
//! stands in when no credentials are configured so online payment endpoints
//! answer `service_unavailable` instead of failing at startup.

mod dto;
mod razorpay;

pub use razorpay::{
    DEFAULT_RAZORPAY_BASE_URL, RazorpayCredentials, RazorpayGateway, UnconfiguredGateway,
};
