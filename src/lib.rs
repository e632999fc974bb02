//! Spot Chat Library
//!
//! Route layer for a chat assistant: picks the model for each request from
//! cookies and provider configuration, loads the model catalog, and hands
//! requests to streaming responders.

pub mod auth;
pub mod config;
pub mod cookies;
pub mod error;
pub mod models;
pub mod server;
pub mod streaming;
