use serde::Serialize;
use serde_json::Value;

use crate::env::Settings;
use crate::http::{join_url, JsonSource};

/// Successful payloads longer than this are truncated in the log.
pub const LOG_PAYLOAD_LIMIT: usize = 1200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub name: &'static str,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub url: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate verdict of a verification pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyOutcome {
    Healthy,
    Degraded,
}

impl VerifyOutcome {
    pub fn is_healthy(self) -> bool {
        self == VerifyOutcome::Healthy
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub outcome: VerifyOutcome,
    pub checks: Vec<HealthCheck>,
}

impl HealthReport {
    pub fn failed_names(&self) -> Vec<String> {
        self.checks
            .iter()
            .filter(|c| !c.passed)
            .map(|c| c.name.clone())
            .collect()
    }
}

/// Endpoints to probe for the configured API bases. Unconfigured bases
/// contribute nothing.
pub fn endpoints(settings: &Settings) -> Vec<Endpoint> {
    let groups: [(&str, [(&'static str, &str); 2]); 3] = [
        (
            settings.forecast_api_base.as_str(),
            [("forecast health", "/health"), ("forecast status", "/public/status")],
        ),
        (
            settings.monte_api_base.as_str(),
            [("monte health", "/health"), ("monte status", "/public/status")],
        ),
        (
            settings.portfolio_api_base.as_str(),
            [("portfolio tiles", "/tiles"), ("portfolio status", "/status")],
        ),
    ];

    groups
        .into_iter()
        .filter(|(base, _)| !base.is_empty())
        .flat_map(|(base, paths)| {
            paths.into_iter().map(move |(name, path)| Endpoint {
                name,
                url: join_url(base, path),
            })
        })
        .collect()
}

/// Probe every configured endpoint. Individual failures are recorded, never
/// propagated.
pub fn verify(settings: &Settings, source: &dyn JsonSource) -> HealthReport {
    let checks: Vec<HealthCheck> = endpoints(settings)
        .into_iter()
        .map(|endpoint| match source.get_json(&endpoint.url) {
            Ok(payload) => HealthCheck {
                name: endpoint.name.to_string(),
                url: endpoint.url,
                passed: true,
                payload: Some(payload),
                error: None,
            },
            Err(e) => HealthCheck {
                name: endpoint.name.to_string(),
                url: endpoint.url,
                passed: false,
                payload: None,
                error: Some(e.to_string()),
            },
        })
        .collect();

    for check in &checks {
        log_check(check);
    }

    let outcome = if checks.iter().all(|c| c.passed) {
        VerifyOutcome::Healthy
    } else {
        VerifyOutcome::Degraded
    };

    HealthReport { outcome, checks }
}

fn log_check(check: &HealthCheck) {
    let tag = if check.passed { "OK" } else { "ERR" };
    crate::log_status!("verify", "[{}] {}", tag, check.name);

    match (&check.payload, &check.error) {
        (Some(payload), _) => {
            crate::log_status!("verify", "{}", render_payload(payload));
        }
        (None, Some(error)) => {
            crate::log_status!("verify", "  -> {}", error);
        }
        (None, None) => {}
    }
}

/// Pretty-print a payload for the log, bounded to [`LOG_PAYLOAD_LIMIT`] characters.
pub fn render_payload(payload: &Value) -> String {
    let pretty = serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
    truncate(&pretty, LOG_PAYLOAD_LIMIT)
}

fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}\n...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn endpoints_skip_unconfigured_bases() {
        let settings = Settings {
            monte_api_base: "https://monte.example.com/".to_string(),
            ..Settings::default()
        };

        let urls: Vec<String> = endpoints(&settings).into_iter().map(|e| e.url).collect();
        assert_eq!(
            urls,
            vec![
                "https://monte.example.com/health".to_string(),
                "https://monte.example.com/public/status".to_string(),
            ]
        );
    }

    #[test]
    fn endpoints_cover_all_six_checks_in_order() {
        let settings = Settings {
            forecast_api_base: "http://f".to_string(),
            monte_api_base: "http://m".to_string(),
            portfolio_api_base: "http://p".to_string(),
            ..Settings::default()
        };

        let names: Vec<&str> = endpoints(&settings).iter().map(|e| e.name).collect();
        assert_eq!(
            names,
            vec![
                "forecast health",
                "forecast status",
                "monte health",
                "monte status",
                "portfolio tiles",
                "portfolio status",
            ]
        );
    }

    #[test]
    fn render_payload_truncates_long_bodies() {
        let long = json!({ "blob": "x".repeat(5000) });
        let rendered = render_payload(&long);
        assert!(rendered.ends_with("\n..."));
        assert_eq!(rendered.chars().count(), LOG_PAYLOAD_LIMIT + 4);

        let short = json!({ "ok": true });
        assert!(!render_payload(&short).ends_with("..."));
    }
}
