//! Offer/Answer/Kandidaten-Umschlag
//!
//! Jede ausgehende SDP- oder Kandidaten-Nachricht hat die Form
//! `{ "id": <sessionId>, "signaling": { "type": ..., ... } }`.

use serde::{Deserialize, Serialize};

/// Typ einer Session-Description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpTyp {
    Offer,
    Answer,
    Pranswer,
}

impl SdpTyp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Offer => "offer",
            Self::Answer => "answer",
            Self::Pranswer => "pranswer",
        }
    }
}

impl std::fmt::Display for SdpTyp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ein getrickelter ICE-Kandidat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateInfo {
    #[serde(rename = "sdpMLineIndex")]
    pub sdp_m_line_index: u32,
    #[serde(rename = "sdpMid")]
    pub sdp_mid: String,
    /// Kandidaten-Zeile inklusive `a=`-Praefix
    pub candidate: String,
}

/// Eintrag in einer `removed-candidates`-Liste
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovedCandidate {
    pub candidate: String,
}

/// Inhalt des `signaling`-Feldes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SignalingPayload {
    Offer { sdp: String },
    Answer { sdp: String },
    Pranswer { sdp: String },
    Candidate { candidate: CandidateInfo },
    RemovedCandidates { candidates: Vec<RemovedCandidate> },
}

impl SignalingPayload {
    /// Baut die Nutzlast fuer eine lokale Description
    pub fn beschreibung(typ: SdpTyp, sdp: impl Into<String>) -> Self {
        let sdp = sdp.into();
        match typ {
            SdpTyp::Offer => Self::Offer { sdp },
            SdpTyp::Answer => Self::Answer { sdp },
            SdpTyp::Pranswer => Self::Pranswer { sdp },
        }
    }
}

/// Vollstaendige ausgehende SDP-/Kandidaten-Nachricht
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalingEnvelope {
    /// Session-ID des Kanals
    pub id: String,
    pub signaling: SignalingPayload,
}

impl SignalingEnvelope {
    pub fn neu(session_id: impl Into<String>, signaling: SignalingPayload) -> Self {
        Self {
            id: session_id.into(),
            signaling,
        }
    }

    /// Kandidaten-Nachricht; die Kandidaten-Zeile bekommt das `a=`-Praefix
    pub fn kandidat(
        session_id: impl Into<String>,
        sdp_mid: impl Into<String>,
        sdp_m_line_index: u32,
        kandidat: &str,
    ) -> Self {
        Self::neu(
            session_id,
            SignalingPayload::Candidate {
                candidate: CandidateInfo {
                    sdp_m_line_index,
                    sdp_mid: sdp_mid.into(),
                    candidate: format!("a={kandidat}"),
                },
            },
        )
    }

    /// Nachricht ueber entfernte Kandidaten (je mit `a=`-Praefix)
    pub fn entfernte_kandidaten<'a>(
        session_id: impl Into<String>,
        kandidaten: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let candidates = kandidaten
            .into_iter()
            .map(|k| RemovedCandidate {
                candidate: format!("a={k}"),
            })
            .collect();
        Self::neu(session_id, SignalingPayload::RemovedCandidates { candidates })
    }
}
