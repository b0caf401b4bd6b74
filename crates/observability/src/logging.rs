//! Structured Logging Setup via tracing-subscriber
//!
//! Konfigurierbar per Umgebungsvariable:
//! - `KF_LOG_LEVEL`: Log-Level (trace/debug/info/warn/error) oder ein
//!   vollstaendiger EnvFilter-Ausdruck, Standard: Wert aus der Konfiguration
//! - `KF_LOG_FORMAT`: Format (text/json), Standard: Wert aus der Konfiguration
//!
//! Kanaele loggen mit dem Feld `kanal`, damit sich die Ereignisse eines
//! Kanals im JSON-Format filtern lassen.

use anyhow::anyhow;
use konferenz_core::config::LoggingEinstellungen;
use tracing_subscriber::{fmt, EnvFilter};

pub const LEVEL_VARIABLE: &str = "KF_LOG_LEVEL";
pub const FORMAT_VARIABLE: &str = "KF_LOG_FORMAT";

/// Initialisiert das Logging-System.
///
/// Liest `KF_LOG_LEVEL` und `KF_LOG_FORMAT` aus der Umgebung und faellt auf
/// `level` / `format` zurueck. Ein ungueltiger Level endet bei `info`.
/// Fehler nur, wenn bereits ein globaler Subscriber gesetzt ist.
pub fn logging_initialisieren(level: &str, format: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_env(LEVEL_VARIABLE)
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // Unbekannte Formate landen bei text
    let format = log_format_aus_env(format);

    let ergebnis = match format.as_str() {
        "json" => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .with_current_span(true)
            .try_init(),
        _ => fmt().with_env_filter(filter).with_target(true).try_init(),
    };
    ergebnis.map_err(|e| anyhow!("Logging bereits initialisiert: {e}"))?;

    tracing::debug!(format = %format, "Logging initialisiert");
    Ok(())
}

/// Initialisiert das Logging aus dem `[logging]`-Abschnitt der Konfiguration
pub fn logging_aus_config(einstellungen: &LoggingEinstellungen) -> anyhow::Result<()> {
    logging_initialisieren(&einstellungen.level, &einstellungen.format)
}

/// Log-Level aus der Umgebung, sonst `standard`
pub fn log_level_aus_env(standard: &str) -> String {
    std::env::var(LEVEL_VARIABLE).unwrap_or_else(|_| standard.to_string())
}

/// Log-Format aus der Umgebung, sonst `standard`
pub fn log_format_aus_env(standard: &str) -> String {
    std::env::var(FORMAT_VARIABLE).unwrap_or_else(|_| standard.to_string())
}

/// Validiert ob ein Log-Level-String gueltig ist.
pub fn log_level_gueltig(level: &str) -> bool {
    matches!(level, "trace" | "debug" | "info" | "warn" | "error")
}

/// Validiert ob ein Log-Format-String gueltig ist.
pub fn log_format_gueltig(format: &str) -> bool {
    matches!(format, "text" | "json")
}
