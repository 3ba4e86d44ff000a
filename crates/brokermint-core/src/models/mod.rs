//! Wire types for the BrokerMint compliance service.
//!
//! - `auth`: login/registration requests and the `{token, user}` response
//! - `dashboard`: headline stats, alerts, and recent anomalies
//! - `anomaly`: per-ticker anomaly scores and the `RiskLevel` scale
//! - `ekyc`: identity-verification requests and results
//! - `audit`: audit trail entries
//! - `report`: generated compliance reports

pub mod anomaly;
pub mod audit;
pub mod auth;
pub mod dashboard;
pub mod ekyc;
pub mod report;

pub use anomaly::{parse_tickers, AnomalyResult, DetectRequest, RiskLevel, DEFAULT_TICKERS};
pub use audit::{AuditEntry, AuditTrail, DEFAULT_AUDIT_LIMIT};
pub use auth::{AuthResponse, LoginRequest, RegisterRequest};
pub use dashboard::{Alert, AnomalySummary, Dashboard, DashboardStats};
pub use ekyc::{DocumentData, DocumentType, VerificationRequest, VerificationResult};
pub use report::ComplianceReport;
