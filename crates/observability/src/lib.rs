//! # konferenz-observability
//!
//! Structured Logging via tracing-subscriber. Level und Format kommen aus
//! dem `[logging]`-Abschnitt der Konfiguration und lassen sich per
//! Umgebungsvariable ueberschreiben.

pub mod logging;

pub use logging::{logging_aus_config, logging_initialisieren};
