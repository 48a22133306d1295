//! API Route Handlers

pub mod analysis;
pub mod health;
