//! Request handlers.

pub mod coins;
pub mod health;
pub mod wallets;
