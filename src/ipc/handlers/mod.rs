//! Per-service IPC handlers.

pub mod health;
pub mod tools;
