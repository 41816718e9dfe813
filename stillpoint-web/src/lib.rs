//! Stillpoint web server
//!
//! JSON API and range-aware audio delivery endpoints over axum.

pub mod handlers;
pub mod server;

pub use server::{AppState, router, run_server};
