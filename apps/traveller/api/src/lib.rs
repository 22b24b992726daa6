//! Traveller API
//!
//! HTTP service for travel destination ingest and AI-assisted search.

pub mod config;
pub mod openapi;
pub mod server;

pub use server::{app, run};
