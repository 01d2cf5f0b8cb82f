//! Observability - request identification and tracing helpers.

pub mod request_id;

pub use request_id::RequestIdMiddleware;
