#![doc = "The `taskgate` library crate."]
#![doc = ""]
#![doc = "A task-tracking backend with authenticated, role-gated access: entity validation,"]
#![doc = "repository ports with PostgreSQL and in-memory backends, password hashing, bearer"]
#![doc = "token issuance and validation, business usecases, and the access gate that protects"]
#![doc = "mutating operations. The binary (`main.rs`) wires these into an actix-web server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod routes;
pub mod usecases;

pub use crate::error::AppError;
