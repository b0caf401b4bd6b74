//! Kandidaten-Puffer
//!
//! Lokal gefundene ICE-Kandidaten werden gepuffert, solange die
//! Signaling-Verhandlung nicht stabil ist. Der Puffer fuehrt die Stabilitaet
//! selbst unter seinem Lock. Die Entscheidung "senden oder puffern" und das
//! Entleeren beim Wechsel nach stabil schliessen sich damit gegenseitig aus,
//! und ein spaeter Kandidat ueberholt keinen gepufferten.

use konferenz_protocol::SignalingEnvelope;
use parking_lot::Mutex;

struct PufferZustand {
    stabil: bool,
    wartend: Vec<SignalingEnvelope>,
}

/// Puffer fuer getrickelte Kandidaten-Nachrichten (FIFO)
pub struct CandidateBuffer {
    inner: Mutex<PufferZustand>,
}

impl Default for CandidateBuffer {
    fn default() -> Self {
        // Signaling startet im Zustand stable
        Self {
            inner: Mutex::new(PufferZustand {
                stabil: true,
                wartend: Vec::new(),
            }),
        }
    }
}

impl CandidateBuffer {
    pub fn neu() -> Self {
        Self::default()
    }

    /// Sendet die Nachricht sofort wenn stabil, sonst wird gepuffert
    ///
    /// `senden` laeuft unter dem Puffer-Lock und darf nur einreihen.
    /// Gibt true zurueck wenn gesendet wurde.
    pub fn anbieten<F>(&self, nachricht: SignalingEnvelope, senden: F) -> bool
    where
        F: FnOnce(SignalingEnvelope),
    {
        let mut inner = self.inner.lock();
        if inner.stabil {
            senden(nachricht);
            true
        } else {
            inner.wartend.push(nachricht);
            false
        }
    }

    /// Meldet einen Signaling-Wechsel
    ///
    /// Beim Wechsel nach stabil werden alle gepufferten Nachrichten in
    /// Ankunftsreihenfolge gesendet, oder mit `verwerfen` (ICE-Restart
    /// ausstehend) ungesendet geloescht. Gibt die Anzahl betroffener
    /// Nachrichten zurueck.
    pub fn stabilitaet_melden<F>(&self, stabil: bool, verwerfen: bool, mut senden: F) -> usize
    where
        F: FnMut(SignalingEnvelope),
    {
        let mut inner = self.inner.lock();
        inner.stabil = stabil;
        if !stabil {
            return 0;
        }
        let anzahl = inner.wartend.len();
        if verwerfen {
            inner.wartend.clear();
        } else {
            for nachricht in inner.wartend.drain(..) {
                senden(nachricht);
            }
        }
        anzahl
    }

    /// Verwirft alle gepufferten Nachrichten
    pub fn leeren(&self) -> usize {
        let mut inner = self.inner.lock();
        let anzahl = inner.wartend.len();
        inner.wartend.clear();
        anzahl
    }

    pub fn ist_stabil(&self) -> bool {
        self.inner.lock().stabil
    }

    pub fn laenge(&self) -> usize {
        self.inner.lock().wartend.len()
    }

    pub fn ist_leer(&self) -> bool {
        self.inner.lock().wartend.is_empty()
    }
}
