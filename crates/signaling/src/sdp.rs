//! Codec-Praeferenz im SDP
//!
//! Sortiert die Payload-Typen der `m=`-Zeilen einer Medienart so um, dass
//! die konfigurierten Codecs (in Konfigurationsreihenfolge) vorne stehen.
//! Zugehoerige RTX-Payloads (`a=fmtp:<pt> apt=<codec-pt>`) folgen direkt
//! ihrem Codec. Alle anderen Payloads behalten ihre Reihenfolge.

use konferenz_core::stream::MediaKind;

/// Setzt die bevorzugten Codecs fuer alle `m=`-Abschnitte der Medienart
///
/// Bei leerer Codec-Liste bleibt das SDP unveraendert.
pub fn bevorzugte_codecs_setzen(sdp: &str, kind: MediaKind, codecs: &[String]) -> String {
    if codecs.is_empty() {
        return sdp.to_string();
    }

    let mit_abschluss = sdp.ends_with('\n');
    let mut zeilen: Vec<String> = sdp
        .lines()
        .map(|z| z.trim_end_matches('\r').to_string())
        .collect();

    let praefix = format!("m={} ", kind.as_str());
    let mut start = 0;
    while let Some(offset) = zeilen[start..].iter().position(|z| z.starts_with(&praefix)) {
        let m_index = start + offset;
        let ende = zeilen[m_index + 1..]
            .iter()
            .position(|z| z.starts_with("m="))
            .map(|o| m_index + 1 + o)
            .unwrap_or(zeilen.len());

        if let Some(neu) = m_zeile_umsortieren(&zeilen[m_index], &zeilen[m_index + 1..ende], codecs) {
            zeilen[m_index] = neu;
        }
        start = ende;
    }

    let mut ergebnis = zeilen.join("\r\n");
    if mit_abschluss {
        ergebnis.push_str("\r\n");
    }
    ergebnis
}

/// Liefert die umsortierte `m=`-Zeile oder None wenn nichts zu tun ist
fn m_zeile_umsortieren(m_zeile: &str, abschnitt: &[String], codecs: &[String]) -> Option<String> {
    let teile: Vec<&str> = m_zeile.split(' ').collect();
    if teile.len() <= 3 {
        return None;
    }
    let (kopf, payloads) = teile.split_at(3);

    // rtpmap: pt -> Codec-Name, fmtp apt: rtx-pt -> codec-pt
    let mut namen: Vec<(&str, &str)> = Vec::new();
    let mut rtx: Vec<(&str, &str)> = Vec::new();
    for zeile in abschnitt {
        if let Some(rest) = zeile.strip_prefix("a=rtpmap:") {
            if let Some((pt, codec)) = rest.split_once(' ') {
                let name = codec.split('/').next().unwrap_or_default();
                namen.push((pt, name));
            }
        } else if let Some(rest) = zeile.strip_prefix("a=fmtp:") {
            if let Some((pt, parameter)) = rest.split_once(' ') {
                if let Some(apt) = parameter
                    .split(';')
                    .find_map(|p| p.trim().strip_prefix("apt="))
                {
                    rtx.push((pt, apt));
                }
            }
        }
    }

    let mut sortiert: Vec<&str> = Vec::with_capacity(payloads.len());
    for codec in codecs {
        for pt in payloads {
            let passt = namen
                .iter()
                .any(|(p, name)| p == pt && name.eq_ignore_ascii_case(codec));
            if !passt || sortiert.contains(pt) {
                continue;
            }
            sortiert.push(*pt);
            for (rtx_pt, apt) in &rtx {
                if apt == pt && payloads.contains(rtx_pt) && !sortiert.contains(rtx_pt) {
                    sortiert.push(*rtx_pt);
                }
            }
        }
    }
    if sortiert.is_empty() {
        return None;
    }
    for pt in payloads {
        if !sortiert.contains(pt) {
            sortiert.push(*pt);
        }
    }

    Some(format!("{} {}", kopf.join(" "), sortiert.join(" ")))
}
