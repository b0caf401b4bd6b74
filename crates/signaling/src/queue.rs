//! Serielle Event-Queue
//!
//! Alle nach aussen sichtbaren Erfolgs- und Fehler-Callbacks laufen
//! ausschliesslich auf dieser Queue, nie direkt im Kontext eines
//! Engine-Callbacks. Ein einzelner tokio-Task arbeitet die Aufgaben in
//! Einreihungsreihenfolge ab; Callbacks duerfen den Kanal re-entrant
//! abbauen.

use tokio::runtime::Handle;
use tokio::sync::mpsc;

type Aufgabe = Box<dyn FnOnce() + Send + 'static>;

/// Handle auf die Event-Queue; Clone teilt denselben Task
#[derive(Clone)]
pub struct EventQueue {
    tx: mpsc::UnboundedSender<Aufgabe>,
}

impl EventQueue {
    /// Startet die Queue auf der aktuellen tokio-Laufzeit
    ///
    /// Muss innerhalb einer Laufzeit aufgerufen werden.
    pub fn neu() -> Self {
        Self::mit_laufzeit(&Handle::current())
    }

    pub fn mit_laufzeit(laufzeit: &Handle) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Aufgabe>();
        laufzeit.spawn(async move {
            while let Some(aufgabe) = rx.recv().await {
                aufgabe();
            }
            tracing::debug!("Event-Queue beendet");
        });
        Self { tx }
    }

    /// Reiht eine Aufgabe ein
    pub fn posten<F>(&self, aufgabe: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.tx.send(Box::new(aufgabe)).is_err() {
            tracing::warn!("Event-Queue geschlossen – Aufgabe verworfen");
        }
    }
}
