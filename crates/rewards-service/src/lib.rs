//! HTTP API service for the rewards coin ledger.
//!
//! The service is a thin facade over [`rewards_ledger::CoinLedger`]: the
//! platform's activity services (mining, quiz, spin wheel, tasks,
//! redemption) call it to register users, apply coin changes, and read
//! wallet state. Authentication is a shared service API key; end users
//! never talk to this service directly.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::ServiceConfig;
pub use routes::create_router;
pub use state::AppState;
