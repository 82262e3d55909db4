// HTTP transport: the eight LMQ routes plus the IP allowlist, compression,
// and request tracing middleware.

pub mod handlers;
pub mod middleware;
pub mod server;

pub use server::{AppState, HttpServer};
