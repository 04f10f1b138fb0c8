//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transactions)
//! 2. Request ID (context, Sentry tag, response header)
//! 3. Access log (`http_request` span, one event per request)
//! 4. Timeout envelope (the bare 408 below becomes an envelope)
//! 5. Request timeout (`app.request_timeout_secs`)
//! 6. Panic catcher (a panicking handler becomes a 500 envelope)

pub mod access_log;
pub mod client_ip;
pub mod request_id;

pub use access_log::access_log_middleware;
pub use client_ip::{ClientIp, resolve_client_ip};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
