//! Tests fuer Publish

use konferenz_core::config::{AudioEncodingParameters, RtpEncodingKonfig, VideoEncodingParameters};
use konferenz_core::stream::{LocalStream, MediaKind, MediaStream, StreamSourceInfo};
use konferenz_core::ChannelConfig;
use konferenz_protocol::SignalingPayload;
use serde_json::json;
use std::sync::Arc;

use super::mocks::*;
use crate::engine::TransceiverDirection;
use crate::state::NegotiationState;

#[tokio::test]
async fn publish_ohne_stream_wird_abgelehnt() {
    let a = aufbau();
    let e = Ergebnisse::default();

    a.kanal.publizieren(None, e.erfolg(), e.fehler());
    abwarten(&a.queue).await;

    assert_eq!(e.fehlermeldungen(), vec!["Nullptr is not allowed.".to_string()]);
    assert_eq!(a.transport.init_anzahl(), 0);
}

#[tokio::test]
async fn publish_ohne_media_handle_wird_abgelehnt() {
    let a = aufbau();
    let e = Ergebnisse::default();
    let stream = LocalStream {
        media: None,
        ..Default::default()
    };

    a.kanal.publizieren(Some(Arc::new(stream)), e.erfolg(), e.fehler());
    abwarten(&a.queue).await;

    assert_eq!(e.fehlermeldungen(), vec!["Nullptr is not allowed.".to_string()]);
    assert!(a.kanal.published_stream().is_none());
}

#[tokio::test]
async fn publish_ohne_tracks_sendet_keine_init() {
    let a = aufbau();
    let e = Ergebnisse::default();
    let leer = Arc::new(LocalStream::neu(MediaStream::neu("leer"), StreamSourceInfo::default()));

    a.kanal.publizieren(Some(leer), e.erfolg(), e.fehler());
    abwarten(&a.queue).await;

    assert_eq!(
        e.fehler_liste(),
        vec![(true, "Cannot publish media stream without any tracks.".to_string())]
    );
    assert_eq!(a.transport.init_anzahl(), 0);
    assert!(e.erfolge().is_empty());
}

#[tokio::test]
async fn publish_beendeter_stream_wird_abgelehnt() {
    let a = aufbau();
    let e = Ergebnisse::default();

    a.kanal.publizieren(Some(beendeter_stream()), e.erfolg(), e.fehler());
    abwarten(&a.queue).await;

    assert_eq!(e.fehlermeldungen(), vec!["Cannot publish ended stream.".to_string()]);
    assert_eq!(a.transport.init_anzahl(), 0);
}

#[tokio::test]
async fn publish_ablauf_bis_erfolg() {
    let a = aufbau();
    let e = Ergebnisse::default();

    publiziert(&a, &e).await;

    // Init-Anfrage mit lokaler Stream-ID
    {
        let inits = a.transport.inits.lock();
        assert_eq!(inits.len(), 1);
        let (optionen, lokal, entfernt) = &inits[0];
        assert_eq!(lokal, "lokal-1");
        assert_eq!(entfernt, "");
        let json = serde_json::to_value(optionen).unwrap();
        assert_eq!(json["media"]["tracks"][0], json!({ "type": "audio", "mid": "0", "source": "mic" }));
        assert_eq!(json["media"]["tracks"][1], json!({ "type": "video", "mid": "1", "source": "camera" }));
        assert_eq!(json["attributes"], json!({ "name": "test" }));
    }

    // Transceiver je Track, SendOnly mit Stream-ID
    {
        let transceiver = a.engine.transceiver.lock();
        assert_eq!(transceiver.len(), 2);
        assert!(transceiver
            .iter()
            .all(|t| t.init.direction == TransceiverDirection::SendOnly
                && t.init.stream_ids == vec!["lokal-1".to_string()]));
        assert_eq!(transceiver[0].track_id.as_deref(), Some("mikro"));
        assert_eq!(transceiver[1].track_id.as_deref(), Some("kamera"));
    }

    // Offer mit Session-ID an den Server
    let offer = a.transport.beschreibungen().remove(0);
    assert_eq!(offer.id, SESSION_ID);
    assert!(matches!(offer.signaling, SignalingPayload::Offer { .. }));
    assert_eq!(a.kanal.session_id().as_str(), SESSION_ID);
    assert_eq!(a.kanal.verhandlungs_zustand(), NegotiationState::Connecting);
    assert_eq!(a.kanal.richtungen().audio, TransceiverDirection::SendOnly);

    // Erfolg erst mit "success" des Servers
    abwarten(&a.queue).await;
    assert!(e.erfolge().is_empty());

    a.kanal.bei_signaling_nachricht(&json!("success"));
    assert!(warten_bis(|| e.erfolge().len() == 1).await);
    assert_eq!(e.erfolge(), vec![SESSION_ID.to_string()]);

    // Zweites "success" feuert nicht erneut
    a.kanal.bei_signaling_nachricht(&json!("success"));
    abwarten(&a.queue).await;
    assert_eq!(e.erfolge().len(), 1);
    assert!(e.fehler_liste().is_empty());
}

#[tokio::test]
async fn publish_nur_video_bekommt_mid_null() {
    let a = aufbau();
    let e = Ergebnisse::default();

    a.kanal.publizieren(Some(lokaler_stream(false, true)), e.erfolg(), e.fehler());
    assert!(warten_bis(|| a.transport.init_anzahl() == 1).await);

    let inits = a.transport.inits.lock();
    let video = inits[0].0.track(MediaKind::Video).unwrap();
    assert_eq!(video.mid, "0");
}

#[tokio::test]
async fn publish_init_abgelehnt_meldet_fehler() {
    let a = aufbau();
    let e = Ergebnisse::default();
    a.transport.init_ablehnen.store(true, std::sync::atomic::Ordering::SeqCst);

    a.kanal.publizieren(Some(lokaler_stream(true, false)), e.erfolg(), e.fehler());
    assert!(warten_bis(|| e.fehler_liste().len() == 1).await);

    let (verhandlung, meldung) = e.fehler_liste().remove(0);
    assert!(!verhandlung);
    assert!(meldung.contains("Raum voll"));
    assert_eq!(a.engine.offer_anzahl(), 0);
    assert_eq!(a.kanal.verhandlungs_zustand(), NegotiationState::Ready);
}

#[tokio::test]
async fn publish_video_encodings_aus_konfiguration() {
    let config = ChannelConfig {
        video: vec![VideoEncodingParameters {
            codec: "VP8".into(),
            max_bitrate_kbps: 0,
            rtp_encoding_parameters: vec![
                RtpEncodingKonfig {
                    rid: "h".into(),
                    max_bitrate_bps: 1_000_000,
                    ..Default::default()
                },
                RtpEncodingKonfig {
                    rid: "l".into(),
                    scale_resolution_down_by: 2.0,
                    num_temporal_layers: 9,
                    ..Default::default()
                },
            ],
        }],
        ..Default::default()
    };
    let a = aufbau_mit(config);
    let e = Ergebnisse::default();

    publiziert(&a, &e).await;

    let transceiver = a.engine.transceiver.lock();
    let video = transceiver.iter().find(|t| t.kind == MediaKind::Video).unwrap();
    let encodings = &video.init.send_encodings;
    assert_eq!(encodings.len(), 2);
    assert_eq!(encodings[0].rid.as_deref(), Some("h"));
    assert_eq!(encodings[0].max_bitrate_bps, Some(1_000_000));
    assert_eq!(encodings[1].scale_resolution_down_by, Some(2.0));
    assert_eq!(encodings[1].num_temporal_layers, None);

    let audio = transceiver.iter().find(|t| t.kind == MediaKind::Audio).unwrap();
    assert!(audio.init.send_encodings.is_empty());
}

#[tokio::test]
async fn bitrate_nach_lokaler_description() {
    let config = ChannelConfig {
        audio: vec![AudioEncodingParameters {
            codec: "opus".into(),
            max_bitrate_kbps: 64,
        }],
        video: vec![VideoEncodingParameters {
            codec: "H264".into(),
            max_bitrate_kbps: 0,
            rtp_encoding_parameters: vec![],
        }],
        ..Default::default()
    };
    let a = aufbau_mit(config);
    let e = Ergebnisse::default();

    publiziert(&a, &e).await;

    // Video ohne Grenze wird nicht gesetzt
    assert_eq!(*a.engine.bitraten.lock(), vec![(MediaKind::Audio, 64_000)]);

    // Codec-Praeferenz: H264 vor VP8
    let lokal = a.engine.lokal.lock().clone().unwrap();
    assert!(lokal.sdp.contains("m=video 9 UDP/TLS/RTP/SAVPF 100 96 97\r\n"));
}
