//! HTTP server configuration object and helpers.

use actix_web::web;
use std::net::SocketAddr;

use storefront::inbound::http::session_config::SessionSettings;
use storefront::inbound::http::state::HttpState;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) sessions: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) http_state: web::Data<HttpState>,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Construct a server configuration around assembled handler state.
    #[must_use]
    pub fn new(
        sessions: SessionSettings,
        bind_addr: SocketAddr,
        http_state: web::Data<HttpState>,
    ) -> Self {
        Self {
            sessions,
            bind_addr,
            http_state,
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}
