//! Logging for the CareLink MCP Server
//!
//! All log output goes to stderr so it never corrupts the MCP stdio stream.
//! Dynamic text must pass through [`sanitize`] before being logged: patient
//! identifiers and phone numbers are masked so no PHI reaches the log sink.

use lazy_static::lazy_static;
use regex::Regex;

use crate::config::Config;

lazy_static! {
    static ref PATIENT_ID_REGEX: Regex = Regex::new(r"PT-\d+").unwrap();
    static ref PHONE_REGEX: Regex =
        Regex::new(r"\b\d{3}[-.\s]\d{3}[-.\s]\d{4}\b|\b\d{3}[-.\s]\d{4}\b|\b\d{10}\b").unwrap();
}

/// Initialize the global tracing subscriber.
///
/// Verbosity comes from the config; `RUST_LOG` can still override per-module.
pub fn init(config: &Config) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new(config.log_level.as_filter())
                }),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Mask identifiable fragments in free text before it is logged.
///
/// Patient ids keep their prefix for correlation; phone-number digit runs are
/// replaced entirely.
pub fn sanitize(text: &str) -> String {
    let masked = PATIENT_ID_REGEX.replace_all(text, "PT-[REDACTED]");
    PHONE_REGEX.replace_all(&masked, "[PHONE]").to_string()
}

/// Emit a payload-free audit line: operation name, outcome, elapsed time.
pub fn audit(operation: &str, success: bool, duration_ms: u128) {
    tracing::info!(
        "AUDIT: {} - {} ({}ms)",
        operation,
        if success { "SUCCESS" } else { "FAILURE" },
        duration_ms
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_masks_patient_ids() {
        let out = sanitize("lookup failed for PT-10001 and PT-20345");
        assert_eq!(out, "lookup failed for PT-[REDACTED] and PT-[REDACTED]");
    }

    #[test]
    fn test_sanitize_masks_phone_numbers() {
        let out = sanitize("callback 555-0101 requested");
        assert!(!out.contains("555"));
        assert!(out.contains("[PHONE]"));

        let out = sanitize("cell 555-010-0101");
        assert!(out.contains("[PHONE]"));
    }

    #[test]
    fn test_sanitize_leaves_dates_alone() {
        assert_eq!(sanitize("visit on 2024-12-20"), "visit on 2024-12-20");
    }

    #[test]
    fn test_sanitize_leaves_plain_text() {
        let text = "visit note created";
        assert_eq!(sanitize(text), text);
    }
}
