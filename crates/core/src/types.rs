//! Gemeinsame Identifikations- und Wertetypen fuer Konferenz
//!
//! IDs verwenden das Newtype-Pattern um Verwechslungen zwischen der
//! serverseitigen Session-ID und der lokalen Kanal-ID auszuschliessen.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lokale Kennung einer Kanal-Instanz (nur fuer Log-Korrelation)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KanalId(pub Uuid);

impl KanalId {
    /// Erstellt eine neue zufaellige KanalId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for KanalId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for KanalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "kanal:{}", self.0)
    }
}

/// Vom Server beim Handshake vergebene Session-ID
///
/// Leer bis der Server den Initialisierungs-Handshake bestaetigt hat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// Leere Session-ID (Ausgangszustand eines Kanals)
    pub fn leer() -> Self {
        Self(String::new())
    }

    pub fn ist_leer(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Videoaufloesung; `0x0` bedeutet "nicht angefordert"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn neu(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Beide Dimensionen gesetzt
    pub fn ist_gesetzt(&self) -> bool {
        self.width != 0 && self.height != 0
    }

    /// Keine Dimension gesetzt (Sentinel fuer "egal")
    pub fn ist_leer(&self) -> bool {
        self.width == 0 && self.height == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kanal_id_eindeutig() {
        let a = KanalId::new();
        let b = KanalId::new();
        assert_ne!(a, b, "Zwei neue KanalIds muessen verschieden sein");
    }

    #[test]
    fn kanal_id_display() {
        let id = KanalId(Uuid::nil());
        assert!(id.to_string().starts_with("kanal:"));
    }

    #[test]
    fn session_id_ist_transparent() {
        let id = SessionId::from("abc123");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc123\"");
        assert!(SessionId::leer().ist_leer());
    }

    #[test]
    fn aufloesung_sentinel() {
        assert!(Resolution::default().ist_leer());
        assert!(!Resolution::neu(640, 0).ist_gesetzt());
        assert!(!Resolution::neu(640, 0).ist_leer());
        assert!(Resolution::neu(640, 480).ist_gesetzt());
    }
}
