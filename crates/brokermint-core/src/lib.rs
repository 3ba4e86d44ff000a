//! Core library for the BrokerMint compliance console.
//!
//! This crate contains everything below the terminal UI:
//!
//! - `api`: the request gateway through which every remote call flows,
//!   plus typed wrappers for the compliance service endpoints
//! - `auth`: the session model, durable session storage, and the
//!   `SessionController` state machine that owns "who is logged in"
//! - `navigation`: the authenticated/anonymous view graphs and route guard
//! - `models`: wire types for the compliance service
//! - `config`: user configuration loaded from disk and the environment

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod navigation;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{ApiError, Gateway, GatewayEvent, GatewayLink};
pub use auth::{Credential, Session, SessionController, SessionError, SessionState, UserProfile};
pub use config::Config;
pub use navigation::{Partition, View};
