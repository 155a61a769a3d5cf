//! Response envelope: `{"response": ..., "alerts": [{"level", "text"}]}`.

use serde::{Deserialize, Serialize};

/// Severity of a server alert. Unknown levels deserialize as `Info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Success,
    Warning,
    Error,
    #[serde(other)]
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub text: String,
}

/// Top-level reply wrapper used by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    #[serde(default)]
    pub response: Option<T>,
    #[serde(default)]
    pub alerts: Vec<Alert>,
}

impl<T> Default for Envelope<T> {
    fn default() -> Self {
        Self {
            response: None,
            alerts: Vec::new(),
        }
    }
}

/// Alerts-only view of a reply; ignores `response` entirely.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Alerts {
    #[serde(default)]
    pub alerts: Vec<Alert>,
}

impl Alerts {
    /// Parse alerts from a raw body; anything that is not an envelope yields none.
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    pub fn has_success(&self) -> bool {
        self.alerts.iter().any(|a| a.level == AlertLevel::Success)
    }

    /// Texts of error and warning alerts, joined for error messages.
    pub fn error_text(&self) -> String {
        self.join(|l| matches!(l, AlertLevel::Error | AlertLevel::Warning))
    }

    /// All alert texts, joined.
    pub fn summary(&self) -> String {
        self.join(|_| true)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter().filter(|a| a.level == AlertLevel::Warning)
    }

    fn join(&self, keep: impl Fn(AlertLevel) -> bool) -> String {
        self.alerts
            .iter()
            .filter(|a| keep(a.level))
            .map(|a| a.text.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }
}
