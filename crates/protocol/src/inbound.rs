//! Interpretation eingehender Servernachrichten
//!
//! Der Server liefert entweder einen blanken Status-String
//! (`"success"` / `"failure"`) oder ein Objekt mit `type`-Feld. Trickle-ICE
//! vom Server wird nicht unterstuetzt, Objekte werden daher nur als
//! Offer/Answer gelesen.

use serde_json::Value;

/// Klassifizierte Servernachricht
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerNachricht {
    /// `"success"`
    Erfolg,
    /// `"failure"`
    Fehlschlag,
    /// Anderer Status-String
    UnbekannterStatus(String),
    /// Objekt mit `type` und `sdp`
    Beschreibung { typ: String, sdp: String },
    /// Objekt ohne `type`
    OhneTyp,
    /// `type` oder `sdp` fehlen bzw. sind keine Strings
    Ungueltig,
    /// Weder String noch Objekt (oder `null`)
    Leer,
}

impl ServerNachricht {
    pub fn aus_json(wert: &Value) -> Self {
        match wert {
            Value::String(status) => match status.as_str() {
                "success" => Self::Erfolg,
                "failure" => Self::Fehlschlag,
                anders => Self::UnbekannterStatus(anders.to_string()),
            },
            Value::Object(map) => {
                let Some(typ) = map.get("type") else {
                    return Self::OhneTyp;
                };
                match (typ.as_str(), map.get("sdp").and_then(Value::as_str)) {
                    (Some(typ), Some(sdp)) => Self::Beschreibung {
                        typ: typ.to_string(),
                        sdp: sdp.to_string(),
                    },
                    _ => Self::Ungueltig,
                }
            }
            _ => Self::Leer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_strings() {
        assert_eq!(ServerNachricht::aus_json(&json!("success")), ServerNachricht::Erfolg);
        assert_eq!(ServerNachricht::aus_json(&json!("failure")), ServerNachricht::Fehlschlag);
        assert_eq!(
            ServerNachricht::aus_json(&json!("ready")),
            ServerNachricht::UnbekannterStatus("ready".into())
        );
    }

    #[test]
    fn answer_objekt() {
        let msg = ServerNachricht::aus_json(&json!({ "type": "answer", "sdp": "v=0" }));
        assert_eq!(
            msg,
            ServerNachricht::Beschreibung { typ: "answer".into(), sdp: "v=0".into() }
        );
    }

    #[test]
    fn ungueltige_objekte() {
        assert_eq!(ServerNachricht::aus_json(&json!({ "sdp": "v=0" })), ServerNachricht::OhneTyp);
        assert_eq!(ServerNachricht::aus_json(&json!({ "type": "answer" })), ServerNachricht::Ungueltig);
        assert_eq!(
            ServerNachricht::aus_json(&json!({ "type": 3, "sdp": "v=0" })),
            ServerNachricht::Ungueltig
        );
        assert_eq!(ServerNachricht::aus_json(&Value::Null), ServerNachricht::Leer);
        assert_eq!(ServerNachricht::aus_json(&json!(42)), ServerNachricht::Leer);
    }
}
