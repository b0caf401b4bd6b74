//! Pruefung der Subscribe-Optionen
//!
//! Abgleich der gewuenschten Videoqualitaet gegen die vom Publisher
//! angebotenen Varianten (`PublicationSettings`) und die vom Server
//! angebotenen Abo-Varianten (`SubscriptionCapabilities`).
//!
//! Regeln:
//! - Ist eine Simulcast-RID angegeben, entscheidet allein ihr Vorkommen in
//!   den Publication-Settings.
//! - Sonst ist jede Groesse (Aufloesung, Framerate, Keyframe-Intervall,
//!   Bitrate-Multiplikator) erlaubt, wenn sie nicht angefragt wurde (Null-Wert)
//!   oder in den Settings bzw. Capabilities vorkommt. Der Multiplikator wird
//!   nur gegen die Capabilities geprueft.
//!
//! Audio-Vorgaben werden nicht geprueft.

use konferenz_core::stream::{
    PublicationSettings, SubscribeOptions, SubscriptionCapabilities, VideoPublicationSettings,
};

/// Gibt true zurueck wenn die Optionen mit dem Stream vereinbar sind
pub fn option_erlaubt(
    optionen: &SubscribeOptions,
    settings: &PublicationSettings,
    capabilities: &SubscriptionCapabilities,
) -> bool {
    let video = &optionen.video;

    if !video.rid.is_empty() {
        return simulcast_variante(settings, &video.rid).is_some();
    }

    let caps = &capabilities.video;

    // Halb gesetzte Aufloesung (nur Breite oder nur Hoehe) passt nie
    let aufloesung_ok = video.resolution.ist_leer()
        || (video.resolution.ist_gesetzt()
            && (settings.video.iter().any(|v| v.resolution == video.resolution)
                || caps.resolutions.contains(&video.resolution)));

    let framerate_ok = video.frame_rate == 0.0
        || settings.video.iter().any(|v| v.frame_rate == video.frame_rate)
        || caps.frame_rates.contains(&video.frame_rate);

    let keyframe_ok = video.key_frame_interval == 0
        || settings
            .video
            .iter()
            .any(|v| v.keyframe_interval == video.key_frame_interval)
        || caps.keyframe_intervals.contains(&video.key_frame_interval);

    let multiplikator_ok = video.bitrate_multiplier == 0.0
        || caps.bitrate_multipliers.contains(&video.bitrate_multiplier);

    aufloesung_ok && framerate_ok && keyframe_ok && multiplikator_ok
}

/// Sucht die Simulcast-Variante mit der angegebenen RID
pub fn simulcast_variante<'a>(
    settings: &'a PublicationSettings,
    rid: &str,
) -> Option<&'a VideoPublicationSettings> {
    settings.video.iter().find(|v| v.rid == rid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use konferenz_core::stream::VideoSubscriptionCapabilities;
    use konferenz_core::Resolution;

    fn settings() -> PublicationSettings {
        PublicationSettings {
            audio: vec![],
            video: vec![
                VideoPublicationSettings {
                    codec: "vp8".into(),
                    resolution: Resolution::neu(1280, 720),
                    frame_rate: 30.0,
                    bitrate_kbps: 1500,
                    keyframe_interval: 100,
                    rid: "h".into(),
                    track_id: "track-h".into(),
                },
                VideoPublicationSettings {
                    codec: "vp8".into(),
                    resolution: Resolution::neu(640, 360),
                    frame_rate: 15.0,
                    bitrate_kbps: 500,
                    keyframe_interval: 100,
                    rid: "l".into(),
                    track_id: "track-l".into(),
                },
            ],
        }
    }

    fn caps() -> SubscriptionCapabilities {
        SubscriptionCapabilities {
            video: VideoSubscriptionCapabilities {
                codecs: vec!["vp8".into()],
                resolutions: vec![Resolution::neu(320, 180)],
                frame_rates: vec![24.0],
                bitrate_multipliers: vec![0.5, 0.8],
                keyframe_intervals: vec![30],
            },
            ..Default::default()
        }
    }

    #[test]
    fn leere_optionen_passen_immer() {
        let optionen = SubscribeOptions::default();
        assert!(option_erlaubt(&optionen, &settings(), &caps()));
        assert!(option_erlaubt(
            &optionen,
            &PublicationSettings::default(),
            &SubscriptionCapabilities::default()
        ));
    }

    #[test]
    fn rid_entscheidet_allein() {
        let mut optionen = SubscribeOptions::default();
        optionen.video.rid = "l".into();
        // Unpassender Multiplikator wird bei gefundener RID ignoriert
        optionen.video.bitrate_multiplier = 7.0;
        assert!(option_erlaubt(&optionen, &settings(), &caps()));

        optionen.video.rid = "x".into();
        optionen.video.bitrate_multiplier = 0.0;
        assert!(!option_erlaubt(&optionen, &settings(), &caps()));
    }

    #[test]
    fn aufloesung_aus_settings_oder_caps() {
        let mut optionen = SubscribeOptions::default();
        optionen.video.resolution = Resolution::neu(640, 360);
        assert!(option_erlaubt(&optionen, &settings(), &caps()));

        optionen.video.resolution = Resolution::neu(320, 180);
        assert!(option_erlaubt(&optionen, &settings(), &caps()));

        optionen.video.resolution = Resolution::neu(1920, 1080);
        assert!(!option_erlaubt(&optionen, &settings(), &caps()));
    }

    #[test]
    fn halbe_aufloesung_wird_abgelehnt() {
        let mut optionen = SubscribeOptions::default();
        optionen.video.resolution = Resolution::neu(640, 0);
        assert!(!option_erlaubt(&optionen, &settings(), &caps()));
    }

    #[test]
    fn framerate_und_keyframe() {
        let mut optionen = SubscribeOptions::default();
        optionen.video.frame_rate = 24.0;
        optionen.video.key_frame_interval = 100;
        assert!(option_erlaubt(&optionen, &settings(), &caps()));

        optionen.video.frame_rate = 60.0;
        assert!(!option_erlaubt(&optionen, &settings(), &caps()));
    }

    #[test]
    fn multiplikator_nur_gegen_capabilities() {
        let mut optionen = SubscribeOptions::default();
        optionen.video.bitrate_multiplier = 0.8;
        assert!(option_erlaubt(&optionen, &settings(), &caps()));

        optionen.video.bitrate_multiplier = 1.5;
        assert!(!option_erlaubt(&optionen, &settings(), &caps()));
    }

    #[test]
    fn variante_per_rid() {
        let s = settings();
        assert_eq!(simulcast_variante(&s, "h").map(|v| v.track_id.as_str()), Some("track-h"));
        assert!(simulcast_variante(&s, "m").is_none());
    }
}
