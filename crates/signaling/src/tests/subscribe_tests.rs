//! Tests fuer Subscribe und den Subscribe-Latch

use konferenz_core::stream::{MediaKind, MediaStream, SubscribeOptions};
use konferenz_core::Resolution;
use serde_json::json;

use super::mocks::*;
use crate::engine::{PeerConnectionEvents, TransceiverDirection};

#[tokio::test]
async fn subscribe_ohne_stream_wird_abgelehnt() {
    let a = aufbau();
    let e = Ergebnisse::default();

    a.kanal.abonnieren(None, SubscribeOptions::default(), e.erfolg(), e.fehler());
    abwarten(&a.queue).await;

    assert_eq!(e.fehlermeldungen(), vec!["Nullptr is not allowed.".to_string()]);
    assert_eq!(a.transport.init_anzahl(), 0);
}

#[tokio::test]
async fn subscribe_unbekannte_rid_fuegt_keinen_transceiver_hinzu() {
    let a = aufbau();
    let e = Ergebnisse::default();
    let mut optionen = SubscribeOptions::default();
    optionen.video.rid = "mittel".into();

    a.kanal.abonnieren(Some(entfernter_stream()), optionen, e.erfolg(), e.fehler());
    abwarten(&a.queue).await;

    assert_eq!(e.fehler_liste(), vec![(true, "Unsupported subscribe option.".to_string())]);
    assert!(a.engine.transceiver.lock().is_empty());
    assert_eq!(a.transport.init_anzahl(), 0);
    assert!(a.kanal.subscribed_stream().is_none());
}

#[tokio::test]
async fn subscribe_unbekannter_multiplikator_ist_verhandlungsfehler() {
    let a = aufbau();
    let e = Ergebnisse::default();
    let mut optionen = SubscribeOptions::default();
    optionen.video.bitrate_multiplier = 1.5;

    a.kanal.abonnieren(Some(entfernter_stream()), optionen, e.erfolg(), e.fehler());
    abwarten(&a.queue).await;

    let fehler = e.fehler_liste();
    assert_eq!(fehler.len(), 1);
    assert!(fehler[0].0, "erwartet generischen Verhandlungsfehler");
    assert_eq!(a.transport.init_anzahl(), 0);
}

#[tokio::test]
async fn subscribe_ablauf_medien_vor_server() {
    let a = aufbau();
    let e = Ergebnisse::default();

    abonniert(&a, &e).await;

    // RecvOnly je Medienart, Init mit entfernter Stream-ID
    {
        let transceiver = a.engine.transceiver.lock();
        assert_eq!(transceiver.len(), 2);
        assert!(transceiver
            .iter()
            .all(|t| t.init.direction == TransceiverDirection::RecvOnly && t.track_id.is_none()));
        let inits = a.transport.inits.lock();
        assert_eq!(inits[0].1, "");
        assert_eq!(inits[0].2, "entfernt-1");
    }
    assert!(a.kanal.subscribed_stream().is_some());
    assert_eq!(a.kanal.session_id().as_str(), SESSION_ID);

    a.kanal.bei_stream_hinzugefuegt(MediaStream::neu("medien-1"));
    abwarten(&a.queue).await;
    assert!(e.erfolge().is_empty());
    assert_eq!(
        a.kanal.subscribed_stream().and_then(|s| s.media()).map(|m| m.id),
        Some("medien-1".to_string())
    );

    a.kanal.bei_signaling_nachricht(&json!("success"));
    assert!(warten_bis(|| e.erfolge().len() == 1).await);
    assert_eq!(e.erfolge(), vec![SESSION_ID.to_string()]);

    // Zweite Bestaetigung ohne neues Subscribe feuert nicht
    a.kanal.bei_signaling_nachricht(&json!("success"));
    abwarten(&a.queue).await;
    assert_eq!(e.erfolge().len(), 1);
}

#[tokio::test]
async fn subscribe_ablauf_server_vor_medien() {
    let a = aufbau();
    let e = Ergebnisse::default();

    abonniert(&a, &e).await;

    a.kanal.bei_signaling_nachricht(&json!("success"));
    abwarten(&a.queue).await;
    assert!(e.erfolge().is_empty());

    a.kanal.bei_stream_hinzugefuegt(MediaStream::neu("medien-1"));
    assert!(warten_bis(|| e.erfolge().len() == 1).await);

    a.kanal.bei_stream_hinzugefuegt(MediaStream::neu("medien-2"));
    abwarten(&a.queue).await;
    assert_eq!(e.erfolge().len(), 1);
}

#[tokio::test]
async fn zweites_subscribe_wird_abgelehnt() {
    let a = aufbau();
    let erstes = Ergebnisse::default();
    let zweites = Ergebnisse::default();

    abonniert(&a, &erstes).await;
    a.kanal.abonnieren(
        Some(entfernter_stream()),
        SubscribeOptions::default(),
        zweites.erfolg(),
        zweites.fehler(),
    );
    abwarten(&a.queue).await;

    assert_eq!(zweites.fehlermeldungen(), vec!["Subscribing this stream.".to_string()]);
    assert_eq!(a.transport.init_anzahl(), 1);

    // Das laufende Abo bleibt intakt
    a.kanal.bei_stream_hinzugefuegt(MediaStream::neu("medien-1"));
    a.kanal.bei_signaling_nachricht(&json!("success"));
    assert!(warten_bis(|| erstes.erfolge().len() == 1).await);
    assert!(zweites.erfolge().is_empty());
}

#[tokio::test]
async fn subscribe_mit_rid_und_deaktiviertem_audio() {
    let a = aufbau();
    let e = Ergebnisse::default();
    let mut optionen = SubscribeOptions::default();
    optionen.audio.disabled = true;
    optionen.video.rid = "niedrig".into();
    optionen.video.bitrate_multiplier = 0.8;

    a.kanal.abonnieren(Some(entfernter_stream()), optionen, e.erfolg(), e.fehler());
    assert!(warten_bis(|| a.transport.init_anzahl() == 1).await);

    let transceiver = a.engine.transceiver.lock();
    assert_eq!(transceiver.len(), 1);
    assert_eq!(transceiver[0].kind, MediaKind::Video);

    let inits = a.transport.inits.lock();
    let json = serde_json::to_value(&inits[0].0).unwrap();
    assert_eq!(
        json["media"]["tracks"],
        json!([{
            "type": "video",
            "mid": "0",
            "from": "track-niedrig",
            "parameters": { "bitrate": "x0.8" },
            "simulcastRid": "niedrig"
        }])
    );
}

#[tokio::test]
async fn subscribe_parameter_werden_uebertragen() {
    let a = aufbau();
    let e = Ergebnisse::default();
    let mut stream = entfernter_stream_roh();
    stream.capabilities.video.resolutions = vec![Resolution::neu(640, 360)];
    stream.capabilities.video.frame_rates = vec![15.0];
    stream.capabilities.video.keyframe_intervals = vec![60];

    let mut optionen = SubscribeOptions::default();
    optionen.video.resolution = Resolution::neu(640, 360);
    optionen.video.frame_rate = 15.0;
    optionen.video.key_frame_interval = 60;
    optionen.video.bitrate_multiplier = 0.5;

    a.kanal.abonnieren(Some(std::sync::Arc::new(stream)), optionen, e.erfolg(), e.fehler());
    assert!(warten_bis(|| a.transport.init_anzahl() == 1).await);

    let inits = a.transport.inits.lock();
    let json = serde_json::to_value(&inits[0].0).unwrap();
    assert_eq!(
        json["media"]["tracks"][1]["parameters"],
        json!({
            "resolution": { "width": 640, "height": 360 },
            "bitrate": "x0.5",
            "keyFrameInterval": 60,
            "framerate": 15
        })
    );
}
