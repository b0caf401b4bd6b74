//! Zustandsautomaten des Kanals
//!
//! Zwei getrennte Achsen: der Verhandlungszustand (Handshake mit dem
//! Server) und der Neuverhandlungszustand (laufende Renegotiation). Dazu
//! kommen die von der Engine gemeldeten Signaling- und ICE-Zustaende.
//!
//! ## Verhandlung
//! ```text
//! Ready --EinladungGesendet--> Offered --HandshakeBestaetigt--> Matched
//! Ready --EinladungEmpfangen--> Pending --Angenommen----------> Matched
//! Matched --BeschreibungGesendet--> Connecting --Verbunden--> Connected
//! (jeder Zustand) --Beendet--> Ready
//! ```
//!
//! ## Neuverhandlung
//! ```text
//! None --Gesendet--> Sent --Abgeschlossen--> None
//! None --Empfangen--> Received --Akzeptiert--> Accepted --Abgeschlossen--> None
//! (jeder Zustand) --Zurueckgesetzt--> None
//! ```

// ---------------------------------------------------------------------------
// Engine-Zustaende
// ---------------------------------------------------------------------------

/// Signaling-Zustand der Engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalingState {
    Stable,
    HaveLocalOffer,
    HaveRemoteOffer,
    HaveLocalPranswer,
    HaveRemotePranswer,
    Closed,
}

impl SignalingState {
    /// Kein Offer/Answer-Austausch laeuft
    pub fn ist_stabil(&self) -> bool {
        *self == Self::Stable
    }
}

/// ICE-Verbindungszustand der Engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IceConnectionState {
    New,
    Checking,
    Connected,
    Completed,
    Failed,
    Disconnected,
    Closed,
}

/// ICE-Sammelzustand der Engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IceGatheringState {
    New,
    Gathering,
    Complete,
}

// ---------------------------------------------------------------------------
// Verhandlung
// ---------------------------------------------------------------------------

/// Zustand der Verhandlung mit dem Server
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NegotiationState {
    /// Ausgangszustand
    #[default]
    Ready,
    /// Einladung (Initialisierungs-Anfrage) gesendet, warte auf Bestaetigung
    Offered,
    /// Einladung empfangen, warte auf Entscheidung
    Pending,
    /// Beide Seiten einig, ein Offer folgt
    Matched,
    /// Offer/Answer laeuft, ICE verbindet
    Connecting,
    /// PeerConnection steht
    Connected,
}

/// Ereignisse, die den Verhandlungszustand treiben
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerhandlungsEreignis {
    EinladungGesendet,
    EinladungEmpfangen,
    Angenommen,
    HandshakeBestaetigt,
    BeschreibungGesendet,
    Verbunden,
    Beendet,
}

impl NegotiationState {
    /// Uebergangstabelle; `None` bei unzulaessigem Uebergang
    pub fn uebergang(self, ereignis: VerhandlungsEreignis) -> Option<Self> {
        use NegotiationState as Z;
        use VerhandlungsEreignis as E;
        match (self, ereignis) {
            (_, E::Beendet) => Some(Z::Ready),
            (Z::Ready, E::EinladungGesendet) => Some(Z::Offered),
            (Z::Ready, E::EinladungEmpfangen) => Some(Z::Pending),
            (Z::Pending, E::Angenommen) => Some(Z::Matched),
            (Z::Offered, E::HandshakeBestaetigt) => Some(Z::Matched),
            (Z::Matched | Z::Connecting, E::BeschreibungGesendet) => Some(Z::Connecting),
            // ICE-Restart auf stehender Verbindung
            (Z::Connected, E::BeschreibungGesendet) => Some(Z::Connected),
            (Z::Matched | Z::Connecting | Z::Connected, E::Verbunden) => Some(Z::Connected),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Neuverhandlung
// ---------------------------------------------------------------------------

/// Zustand einer laufenden Neuverhandlung
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenegotiationState {
    /// Keine Neuverhandlung
    #[default]
    None,
    /// Anfrage an die Gegenseite gesendet
    Sent,
    /// Anfrage der Gegenseite empfangen
    Received,
    /// Anfrage der Gegenseite angenommen
    Accepted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeuverhandlungsEreignis {
    Gesendet,
    Empfangen,
    Akzeptiert,
    Abgeschlossen,
    Zurueckgesetzt,
}

impl RenegotiationState {
    pub fn uebergang(self, ereignis: NeuverhandlungsEreignis) -> Option<Self> {
        use NeuverhandlungsEreignis as E;
        match (self, ereignis) {
            (_, E::Zurueckgesetzt) => Some(Self::None),
            (Self::None, E::Gesendet) => Some(Self::Sent),
            (Self::None, E::Empfangen) => Some(Self::Received),
            (Self::Received, E::Akzeptiert) => Some(Self::Accepted),
            (Self::Sent | Self::Accepted, E::Abgeschlossen) => Some(Self::None),
            _ => None,
        }
    }
}
