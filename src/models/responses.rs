//! Response DTOs for the clinical notes API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::dose::DoseState;

/// Response body for POST /sanitize and POST /medications/chart
#[derive(Debug, Clone, Serialize)]
pub struct HtmlResponse {
    pub html: String,
}

impl HtmlResponse {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }
}

/// Response body for POST /doses/cycle
#[derive(Debug, Clone, Serialize)]
pub struct CycleDoseResponse {
    /// Next state, serialized as its label
    pub state: DoseState,
    /// Number of pills, 0 for an empty cell
    pub quantity: f32,
}

impl CycleDoseResponse {
    pub fn new(state: DoseState) -> Self {
        Self {
            state,
            quantity: state.quantity(),
        }
    }
}

/// Response body for POST /rut/validate
#[derive(Debug, Clone, Serialize)]
pub struct RutResponse {
    pub valid: bool,
    /// Canonical `12.345.678-5` form when the input is valid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
}

/// Response body for POST /records/validate
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResponse {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResponse {
    pub fn new(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Response body for POST /ai/complete
#[derive(Debug, Clone, Serialize)]
pub struct CompleteResponse {
    pub text: String,
    pub model: String,
}

/// Response body for PUT/DELETE /auth/session
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub signed_in: bool,
}

/// Response body for the cache stats endpoint (GET /cache/stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of listings served from the cache
    pub hits: u64,
    /// Number of listings fetched from Drive
    pub misses: u64,
    /// Number of entries dropped because their TTL elapsed
    pub expirations: u64,
    /// Number of entries dropped by folder invalidation
    pub invalidations: u64,
    /// Current number of cached listings
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            expirations: stats.expirations,
            invalidations: stats.invalidations,
            total_entries: stats.total_entries,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    /// Whether a Drive access token is held
    pub drive_signed_in: bool,
    /// Whether the writing assistant is configured
    pub ai_enabled: bool,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(drive_signed_in: bool, ai_enabled: bool) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            drive_signed_in,
            ai_enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_response_serializes_label() {
        let resp = CycleDoseResponse::new(DoseState::OneAndHalf);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["state"], "1 ½");
        assert_eq!(json["quantity"], 1.5);
    }

    #[test]
    fn test_validation_response() {
        assert!(ValidationResponse::new(vec![]).valid);
        let resp = ValidationResponse::new(vec!["x".into()]);
        assert!(!resp.valid);
    }

    #[test]
    fn test_rut_response_omits_missing_format() {
        let resp = RutResponse { valid: false, formatted: None };
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(json, r#"{"valid":false}"#);
    }

    #[test]
    fn test_stats_response_hit_rate() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            ..CacheStats::default()
        };
        let resp = StatsResponse::from(stats);
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
    }

    #[test]
    fn test_stats_response_zero_requests() {
        let resp = StatsResponse::from(CacheStats::default());
        assert_eq!(resp.hit_rate, 0.0);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy(false, true);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
        assert!(json.contains(r#""ai_enabled":true"#));
    }
}
