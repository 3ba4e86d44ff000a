//! Request gateway for the BrokerMint compliance service.
//!
//! Every outbound call in the console goes through [`Gateway`]. It attaches
//! the current bearer credential, decodes JSON responses, and reports
//! authorization failures to the session controller as [`GatewayEvent`]s.
//!
//! Typed endpoint wrappers (`fetch_dashboard`, `detect_anomalies`, ...) live
//! in `endpoints` as additional methods on the same gateway.

pub mod endpoints;
pub mod error;
pub mod gateway;

pub use error::ApiError;
pub use gateway::{Gateway, GatewayEvent, GatewayLink, Method};
