use serde::{Deserialize, Serialize};

use super::anomaly::RiskLevel;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub total_checks: u64,
    #[serde(default)]
    pub anomalies_found: u64,
    #[serde(default)]
    pub high_risk_count: u64,
}

/// A compliance deadline or notice shown on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(default)]
    pub id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub deadline: Option<String>,
}

impl Alert {
    pub fn is_high_severity(&self) -> bool {
        self.severity.eq_ignore_ascii_case("high")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalySummary {
    pub ticker: String,
    pub anomaly_score: f64,
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    #[serde(default)]
    pub stats: DashboardStats,
    #[serde(default)]
    pub alerts: Vec<Alert>,
    #[serde(default)]
    pub anomalies: Vec<AnomalySummary>,
}
