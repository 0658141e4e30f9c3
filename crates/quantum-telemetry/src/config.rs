//! Telemetry configuration from environment variables.

use std::env;
use std::str::FromStr;

use crate::TelemetryError;

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, ANSI colored
    Pretty,
    /// One JSON object per line
    Json,
    /// Filter installed, nothing printed
    Off,
}

impl FromStr for LogFormat {
    type Err = TelemetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "off" | "none" => Ok(Self::Off),
            other => Err(TelemetryError::Config(format!("unknown log format '{other}'"))),
        }
    }
}

/// Configuration for structured logging.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to the startup log line
    pub service_name: String,

    /// Subsystem identifier (e.g. "17"); "00" for the node as a whole
    pub subsystem_id: String,

    /// Filter directive used when `RUST_LOG` is unset
    pub log_level: String,

    /// Output format
    pub format: LogFormat,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "quantum-chain".to_string(),
            subsystem_id: "00".to_string(),
            log_level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `QC_SERVICE_NAME`: Service name (default: quantum-chain)
    /// - `QC_SUBSYSTEM_ID`: Subsystem ID (default: 00)
    /// - `QC_LOG_LEVEL`: Filter directive (default: info)
    /// - `QC_LOG_FORMAT`: pretty, json or off (default: pretty)
    /// - `QC_JSON_LOGS`: legacy switch, `true` selects json
    pub fn from_env() -> Result<Self, TelemetryError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, TelemetryError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let format = match lookup("QC_LOG_FORMAT") {
            Some(value) => value.parse()?,
            None => match lookup("QC_JSON_LOGS") {
                Some(v) if v.eq_ignore_ascii_case("true") || v == "1" => LogFormat::Json,
                _ => defaults.format,
            },
        };

        Ok(Self {
            service_name: lookup("QC_SERVICE_NAME").unwrap_or(defaults.service_name),
            subsystem_id: lookup("QC_SUBSYSTEM_ID").unwrap_or(defaults.subsystem_id),
            log_level: lookup("QC_LOG_LEVEL").unwrap_or(defaults.log_level),
            format,
        })
    }

    /// Create configuration for a specific subsystem.
    pub fn for_subsystem(subsystem_id: &str, subsystem_name: &str) -> Result<Self, TelemetryError> {
        let mut config = Self::from_env()?;
        config.subsystem_id = subsystem_id.to_string();
        config.service_name = format!("qc-{}-{}", subsystem_id, subsystem_name);
        Ok(config)
    }

    /// Service name qualified by subsystem, unless it already is.
    pub fn full_service_name(&self) -> String {
        if self.subsystem_id == "00" || self.service_name.starts_with("qc-") {
            self.service_name.clone()
        } else {
            format!("{}-{}", self.service_name, self.subsystem_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = TelemetryConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.service_name, "quantum-chain");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.format, LogFormat::Pretty);
    }

    #[test]
    fn test_format_selection() {
        let json = TelemetryConfig::from_lookup(lookup(&[("QC_JSON_LOGS", "1")])).unwrap();
        assert_eq!(json.format, LogFormat::Json);

        // Explicit format wins over the legacy switch
        let off = TelemetryConfig::from_lookup(lookup(&[
            ("QC_LOG_FORMAT", "OFF"),
            ("QC_JSON_LOGS", "true"),
        ]))
        .unwrap();
        assert_eq!(off.format, LogFormat::Off);

        let err = TelemetryConfig::from_lookup(lookup(&[("QC_LOG_FORMAT", "xml")]));
        assert!(matches!(err, Err(TelemetryError::Config(_))));
    }

    #[test]
    fn test_full_service_name() {
        let mut config = TelemetryConfig::default();
        assert_eq!(config.full_service_name(), "quantum-chain");

        config.subsystem_id = "17".to_string();
        assert_eq!(config.full_service_name(), "quantum-chain-17");

        config.service_name = "qc-17-block-stream".to_string();
        assert_eq!(config.full_service_name(), "qc-17-block-stream");
    }
}
