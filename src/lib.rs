//! Junior Joy HR Pro backend.
//!
//! Employee records, leave requests and balances, and training administration
//! behind an actix-web JSON API backed by MySQL.

pub mod api;
pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod model;
pub mod routes;
pub mod seed;
pub mod service;
pub mod telemetry;
pub mod utils;
