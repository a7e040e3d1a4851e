//! HTTP surface of XControl.
//!
//! - `logging`: tracing subscriber setup
//! - `response`: JSON response helpers
//! - `router`: request dispatch onto the application services
//! - `server`: TCP accept loop serving HTTP/1.1 via hyper

pub mod logging;
pub mod response;
pub mod router;
pub mod server;

pub use router::route;
pub use server::HttpServer;
