//! Typed calls for each compliance service endpoint.

use tracing::debug;

use crate::models::{
    AnomalyResult, AuditTrail, AuthResponse, ComplianceReport, Dashboard, DetectRequest,
    LoginRequest, RegisterRequest, VerificationRequest, VerificationResult,
};

use super::{ApiError, Gateway};

pub const LOGIN_PATH: &str = "/auth/login";
pub const REGISTER_PATH: &str = "/auth/register";
pub const DASHBOARD_PATH: &str = "/dashboard";
pub const DETECT_PATH: &str = "/anomalies/detect";
pub const VERIFY_PATH: &str = "/ekyc/verify";
pub const AUDIT_TRAIL_PATH: &str = "/audit/trail";
pub const REPORT_PATH: &str = "/reports/compliance";

impl Gateway {
    /// Exchange username/password for a credential. Called by the session
    /// controller; screens use `SessionController::login` instead.
    pub async fn authenticate(&self, credentials: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.post(LOGIN_PATH, credentials).await
    }

    pub async fn register_account(
        &self,
        profile: &RegisterRequest,
    ) -> Result<AuthResponse, ApiError> {
        self.post(REGISTER_PATH, profile).await
    }

    pub async fn fetch_dashboard(&self) -> Result<Dashboard, ApiError> {
        self.get(DASHBOARD_PATH).await
    }

    pub async fn detect_anomalies(&self, tickers: &[String]) -> Result<Vec<AnomalyResult>, ApiError> {
        let results: Vec<AnomalyResult> = self.post(DETECT_PATH, &DetectRequest { tickers }).await?;
        debug!(requested = tickers.len(), flagged = results.len(), "Anomaly detection complete");
        Ok(results)
    }

    pub async fn verify_identity(
        &self,
        request: &VerificationRequest,
    ) -> Result<VerificationResult, ApiError> {
        self.post(VERIFY_PATH, request).await
    }

    pub async fn fetch_audit_trail(&self, limit: u32) -> Result<AuditTrail, ApiError> {
        self.get(&format!("{}?limit={}", AUDIT_TRAIL_PATH, limit)).await
    }

    pub async fn generate_report(&self) -> Result<ComplianceReport, ApiError> {
        self.get(REPORT_PATH).await
    }
}
