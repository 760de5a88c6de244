//! Renders an [`Icon`] as an SVG data URI for the host's `setImage`.

use crate::presentation::Glyph;
use crate::presentation::Icon;

const BACKGROUND: &str = "#1C1C1E";

fn glyph_body(glyph: Glyph) -> &'static str {
    match glyph {
        Glyph::Lightbulb => r#"<circle cx="72" cy="60" r="28"/><path d="M60 96h24M62 110h20"/>"#,
        Glyph::Power => r#"<path d="M72 36v36"/><path d="M50 50a32 32 0 1 0 44 0"/>"#,
        Glyph::Fan => {
            r#"<circle cx="72" cy="72" r="8"/><path d="M72 64c-4-20 4-30 16-28s10 20-8 30M80 76c20 2 28 12 22 22s-20 6-26-12M64 78c-14 14-26 14-30 4s8-18 26-12"/>"#
        }
        Glyph::Droplet => r#"<path d="M72 34c16 22 26 36 26 50a26 26 0 0 1-52 0c0-14 10-28 26-50z"/>"#,
        Glyph::Lock => {
            r#"<rect x="44" y="66" width="56" height="44" rx="6"/><path d="M54 66V52a18 18 0 0 1 36 0v14"/>"#
        }
        Glyph::LockOpen => {
            r#"<rect x="44" y="66" width="56" height="44" rx="6"/><path d="M54 66V52a18 18 0 0 1 35-6"/>"#
        }
        Glyph::GarageOpen => r#"<path d="M32 60l40-26 40 26v52H32z"/><path d="M46 72h52"/>"#,
        Glyph::GarageClosed => {
            r#"<path d="M32 60l40-26 40 26v52H32z"/><path d="M46 72h52M46 86h52M46 100h52"/>"#
        }
        Glyph::Thermometer => r#"<path d="M64 84V40a8 8 0 0 1 16 0v44a18 18 0 1 1-16 0z"/>"#,
        Glyph::BlindsOpen => r#"<path d="M36 36h72M44 36v18h56V36"/><path d="M72 108V70M58 84l14-14 14 14"/>"#,
        Glyph::BlindsClosed => r#"<path d="M36 36h72"/><path d="M44 36v72h56V36M44 54h56M44 72h56M44 90h56"/>"#,
        Glyph::Shield => r#"<path d="M72 32l34 12v26c0 22-14 36-34 44-20-8-34-22-34-44V44z"/>"#,
        Glyph::ShieldAlert => {
            r#"<path d="M72 32l34 12v26c0 22-14 36-34 44-20-8-34-22-34-44V44z"/><path d="M72 56v22M72 92v2"/>"#
        }
        Glyph::Group => {
            r#"<circle cx="52" cy="60" r="12"/><circle cx="92" cy="60" r="12"/><circle cx="72" cy="94" r="12"/>"#
        }
        Glyph::Play => r#"<path d="M56 40l44 32-44 32z"/>"#,
        Glyph::Gauge => r#"<path d="M36 96a36 36 0 1 1 72 0"/><path d="M72 96l18-22"/>"#,
    }
}

/// Raw SVG markup for an icon.
///
/// `icon.color` must already be a validated hex colour; see
/// [`crate::presentation::tint`].
pub fn svg(icon: &Icon) -> String {
    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="144" height="144" viewBox="0 0 144 144">"#,
            r#"<rect width="144" height="144" rx="24" fill="{background}"/>"#,
            r#"<g fill="none" stroke="{color}" stroke-width="8" stroke-linecap="round" stroke-linejoin="round">{body}</g>"#,
            "</svg>"
        ),
        background = BACKGROUND,
        color = icon.color,
        body = glyph_body(icon.glyph),
    )
}

/// `data:` URI accepted by the host's `setImage`.
pub fn data_uri(icon: &Icon) -> String {
    format!(
        "data:image/svg+xml;charset=utf8,{}",
        urlencoding::encode(&svg(icon))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_svg_is_tinted() {
        let markup = svg(&Icon::new(Glyph::Lock, "#4CAF50"));
        assert!(markup.starts_with("<svg "));
        assert!(markup.contains(r##"stroke="#4CAF50""##));
        assert!(markup.contains("<rect x=\"44\""));
    }

    #[test]
    fn test_data_uri_round_trip() {
        let icon = Icon::new(Glyph::Play, "#FFC107");
        let uri = data_uri(&icon);
        let encoded = uri
            .strip_prefix("data:image/svg+xml;charset=utf8,")
            .unwrap();
        assert!(!encoded.contains('<'));
        assert_eq!(urlencoding::decode(encoded).unwrap(), svg(&icon));
    }
}
