#![doc = "The `tasknest` library crate."]
#![doc = ""]
#![doc = "Account registration and login, stateless bearer-token sessions, and a task"]
#![doc = "gateway that scopes every read and write to the requesting account. The binary"]
#![doc = "(`main.rs`) wires these into an actix-web server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
pub mod tasks;

pub use crate::error::AppError;
pub use crate::state::AppState;
