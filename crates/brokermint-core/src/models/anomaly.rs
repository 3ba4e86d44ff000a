use std::fmt;

use serde::{Deserialize, Serialize};

/// Ticker list pre-filled on the anomaly detection screen
pub const DEFAULT_TICKERS: &str = "AAPL,GOOGL,MSFT,TSLA";

/// Risk classification assigned by the service.
///
/// Always taken verbatim from the response; the console never derives it
/// from the score. Levels the console does not know are kept as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
    Other(String),
}

impl RiskLevel {
    pub fn label(&self) -> &str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Critical => "Critical",
            RiskLevel::Other(s) => s,
        }
    }

    /// Score band the service documents for this level
    pub fn description(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Score < 0.3 - Normal trading activity",
            RiskLevel::Medium => "Score 0.3-0.6 - Moderate anomaly",
            RiskLevel::High => "Score 0.6-0.8 - Significant anomaly",
            RiskLevel::Critical => "Score > 0.8 - Critical anomaly",
            RiskLevel::Other(_) => "Unclassified",
        }
    }

    pub fn is_high_risk(&self) -> bool {
        matches!(self, RiskLevel::High | RiskLevel::Critical)
    }

    pub fn known() -> [RiskLevel; 4] {
        [
            RiskLevel::Low,
            RiskLevel::Medium,
            RiskLevel::High,
            RiskLevel::Critical,
        ]
    }
}

impl From<String> for RiskLevel {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Low" => RiskLevel::Low,
            "Medium" => RiskLevel::Medium,
            "High" => RiskLevel::High,
            "Critical" => RiskLevel::Critical,
            _ => RiskLevel::Other(s),
        }
    }
}

impl From<RiskLevel> for String {
    fn from(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Other(s) => s,
            known => known.label().to_string(),
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DetectRequest<'a> {
    pub tickers: &'a [String],
}

/// One row of `/anomalies/detect` output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyResult {
    pub ticker: String,
    pub anomaly_score: f64,
    pub risk_level: RiskLevel,
    pub price: f64,
    pub volume: f64,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Split comma-separated ticker input, trimming whitespace and dropping
/// empty entries.
pub fn parse_tickers(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tickers() {
        assert_eq!(
            parse_tickers(DEFAULT_TICKERS),
            vec!["AAPL", "GOOGL", "MSFT", "TSLA"]
        );
        assert_eq!(parse_tickers(" aapl , ,MSFT,"), vec!["aapl", "MSFT"]);
        assert!(parse_tickers(" , ").is_empty());
    }

    #[test]
    fn test_risk_level_is_verbatim() {
        // A low score with a Critical label stays Critical
        let json = r#"{"ticker":"AAPL","anomaly_score":0.12,"risk_level":"Critical","price":190.12,"volume":1000000}"#;
        let result: AnomalyResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.risk_level, RiskLevel::Critical);
        assert!(result.risk_level.is_high_risk());
    }

    #[test]
    fn test_unknown_risk_level_preserved() {
        let level: RiskLevel = serde_json::from_str(r#""Severe""#).unwrap();
        assert_eq!(level, RiskLevel::Other("Severe".to_string()));
        assert_eq!(serde_json::to_string(&level).unwrap(), r#""Severe""#);
        assert!(!level.is_high_risk());
    }
}
