//! TinyApp: a URL shortener with accounts, sessions and server-rendered views
//!
//! The modules are exposed for the binary and the integration tests.

pub mod config;
pub mod database;
pub mod error;
pub mod handler;
pub mod id;
pub mod links;
pub mod model;
pub mod password;
pub mod route;
pub mod session;
pub mod users;
pub mod view;
