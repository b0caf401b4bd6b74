//! Stream-Events und Steuerbefehle

use serde::{Deserialize, Serialize};

/// Abbau-Ereignisse, die an den Server gemeldet werden
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamEvent {
    Unpublish,
    Unsubscribe,
}

impl StreamEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unpublish => "unpublish",
            Self::Unsubscribe => "unsubscribe",
        }
    }
}

/// Welche Spur(en) ein Steuerbefehl betrifft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SteuerAktion {
    Av,
    Audio,
    Video,
}

impl SteuerAktion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Av => "av",
            Self::Audio => "audio",
            Self::Video => "video",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SteuerOperation {
    Play,
    Pause,
}

impl SteuerOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Play => "play",
            Self::Pause => "pause",
        }
    }
}
