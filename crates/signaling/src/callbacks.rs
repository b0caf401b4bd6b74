//! Callback-Registry und Subscribe-Latch
//!
//! Pro Kanal ist hoechstens eine Erfolgs- und eine Fehler-Fortsetzung
//! registriert. Wer eine Fortsetzung entnimmt, setzt beide zurueck, damit
//! keine zweimal feuern kann.
//!
//! Subscribe-Erfolg braucht zwei unabhaengige Signale:
//!
//! ```text
//!   Engine: Stream hinzugefuegt ──┐
//!                                 ├──► beide gesetzt? ──► Erfolg (einmal), Latch zuruecksetzen
//!   Server: "success"          ───┘
//! ```
//!
//! Beide Flags liegen unter EINEM Lock; das zweite eintreffende Signal
//! feuert.

use konferenz_core::KonferenzError;
use parking_lot::Mutex;

/// Erfolgs-Fortsetzung fuer Publish/Subscribe (Session-ID)
pub type ErfolgCallback = Box<dyn FnOnce(String) + Send + 'static>;
/// Fehler-Fortsetzung
pub type FehlerCallback = Box<dyn FnOnce(KonferenzError) + Send + 'static>;
/// Erfolgs-Fortsetzung ohne Wert (Teardown, Steuerbefehle)
pub type FertigCallback = Box<dyn FnOnce() + Send + 'static>;

#[derive(Default)]
struct Ausstehend {
    publish_erfolg: Option<ErfolgCallback>,
    subscribe_erfolg: Option<ErfolgCallback>,
    fehler: Option<FehlerCallback>,
}

impl Ausstehend {
    fn leeren(&mut self) {
        self.publish_erfolg = None;
        self.subscribe_erfolg = None;
        self.fehler = None;
    }
}

/// Zustand des Subscribe-Latches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubscribeLatch {
    pub stream_hinzugefuegt: bool,
    pub server_bereit: bool,
}

/// Registry der ausstehenden Fortsetzungen
#[derive(Default)]
pub struct CallbackRegistry {
    ausstehend: Mutex<Ausstehend>,
    latch: Mutex<SubscribeLatch>,
}

impl CallbackRegistry {
    pub fn neu() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Fortsetzungen
    // ------------------------------------------------------------------

    pub fn publish_registrieren(&self, erfolg: ErfolgCallback, fehler: FehlerCallback) {
        let mut a = self.ausstehend.lock();
        a.publish_erfolg = Some(erfolg);
        a.fehler = Some(fehler);
    }

    pub fn subscribe_registrieren(&self, erfolg: ErfolgCallback, fehler: FehlerCallback) {
        let mut a = self.ausstehend.lock();
        a.subscribe_erfolg = Some(erfolg);
        a.fehler = Some(fehler);
    }

    pub fn publish_ausstehend(&self) -> bool {
        self.ausstehend.lock().publish_erfolg.is_some()
    }

    pub fn subscribe_ausstehend(&self) -> bool {
        self.ausstehend.lock().subscribe_erfolg.is_some()
    }

    pub fn fehler_ausstehend(&self) -> bool {
        self.ausstehend.lock().fehler.is_some()
    }

    /// Entnimmt den Publish-Erfolg; leert dabei alle Fortsetzungen
    pub fn publish_erfolg_nehmen(&self) -> Option<ErfolgCallback> {
        let mut a = self.ausstehend.lock();
        let erfolg = a.publish_erfolg.take()?;
        a.leeren();
        Some(erfolg)
    }

    /// Entnimmt den Subscribe-Erfolg; leert dabei alle Fortsetzungen
    pub fn subscribe_erfolg_nehmen(&self) -> Option<ErfolgCallback> {
        let mut a = self.ausstehend.lock();
        let erfolg = a.subscribe_erfolg.take()?;
        a.leeren();
        Some(erfolg)
    }

    /// Entnimmt die Fehler-Fortsetzung; leert dabei alle Fortsetzungen
    pub fn fehler_nehmen(&self) -> Option<FehlerCallback> {
        let mut a = self.ausstehend.lock();
        let fehler = a.fehler.take();
        a.leeren();
        fehler
    }

    // ------------------------------------------------------------------
    // Latch
    // ------------------------------------------------------------------

    /// Engine meldet den entfernten Stream; true wenn jetzt beide Flags gesetzt sind
    pub fn medien_eingetroffen(&self) -> bool {
        let mut l = self.latch.lock();
        l.stream_hinzugefuegt = true;
        Self::pruefen_und_zuruecksetzen(&mut l)
    }

    /// Server bestaetigt das Abo; true wenn jetzt beide Flags gesetzt sind
    pub fn server_bestaetigt(&self) -> bool {
        let mut l = self.latch.lock();
        l.server_bereit = true;
        Self::pruefen_und_zuruecksetzen(&mut l)
    }

    fn pruefen_und_zuruecksetzen(l: &mut SubscribeLatch) -> bool {
        if l.stream_hinzugefuegt && l.server_bereit {
            *l = SubscribeLatch::default();
            true
        } else {
            false
        }
    }

    pub fn latch_zuruecksetzen(&self) {
        *self.latch.lock() = SubscribeLatch::default();
    }

    pub fn latch(&self) -> SubscribeLatch {
        *self.latch.lock()
    }
}
