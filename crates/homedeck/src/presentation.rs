//! Pure mapping from device state and button settings to what a key shows.
//!
//! Nothing here touches the network or the host; controllers call these
//! functions and hand the resulting [`Visual`] to the button.

use strum::Display;
use strum::EnumString;

use crate::host::ButtonSettings;

/// Everything a key displays.
#[derive(Debug, Clone, PartialEq)]
pub struct Visual {
    pub icon: Icon,
    pub title: String,
    /// Integer state for keys that support it (0 or 1).
    pub state: u8,
}

/// A glyph tinted with a CSS hex colour.
#[derive(Debug, Clone, PartialEq)]
pub struct Icon {
    pub glyph: Glyph,
    pub color: String,
}

impl Icon {
    pub fn new(glyph: Glyph, color: impl Into<String>) -> Self {
        Self {
            glyph,
            color: color.into(),
        }
    }
}

/// Glyphs the icon renderer knows how to draw.
///
/// Parsing accepts the icon hints the control server reports for devices and
/// scenes, case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Glyph {
    #[strum(to_string = "lightbulb", serialize = "light", serialize = "bulb", serialize = "lamp")]
    Lightbulb,
    #[strum(to_string = "power", serialize = "switch", serialize = "outlet", serialize = "plug")]
    Power,
    Fan,
    #[strum(to_string = "droplet", serialize = "humidifier", serialize = "water")]
    Droplet,
    Lock,
    LockOpen,
    GarageOpen,
    #[strum(to_string = "garage-closed", serialize = "garage")]
    GarageClosed,
    #[strum(to_string = "thermometer", serialize = "thermostat", serialize = "temperature")]
    Thermometer,
    BlindsOpen,
    #[strum(to_string = "blinds-closed", serialize = "blinds")]
    BlindsClosed,
    #[strum(to_string = "shield", serialize = "security")]
    Shield,
    ShieldAlert,
    Group,
    #[strum(to_string = "play", serialize = "scene")]
    Play,
    #[strum(to_string = "gauge", serialize = "sensor")]
    Gauge,
}

impl Glyph {
    /// Resolve a server-provided icon hint, if it names a known glyph.
    pub fn from_hint(hint: &str) -> Option<Self> {
        hint.trim().parse().ok()
    }
}

/// Default tints for a capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub on: &'static str,
    pub off: &'static str,
}

pub const AMBER: Palette = Palette {
    on: "#FFC107",
    off: "#5F6368",
};

pub const GREEN: Palette = Palette {
    on: "#4CAF50",
    off: "#5F6368",
};

pub const BLUE: Palette = Palette {
    on: "#2196F3",
    off: "#5F6368",
};

pub const ORANGE: Palette = Palette {
    on: "#FF7043",
    off: "#5F6368",
};

pub const ALARM_RED: &str = "#F44336";

/// Accepts `#rgb`, `#rrggbb` and `#rrggbbaa`.
fn is_hex_color(color: &str) -> bool {
    let Some(digits) = color.strip_prefix('#') else {
        return false;
    };
    matches!(digits.len(), 3 | 6 | 8) && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// Pick the tint for an on/off state, honouring the user's colour overrides.
///
/// Overrides that are not hex colours are ignored.
pub fn tint(settings: &ButtonSettings, on: bool, palette: Palette) -> String {
    let (custom, fallback) = if on {
        (settings.on_color.as_deref(), palette.on)
    } else {
        (settings.off_color.as_deref(), palette.off)
    };

    custom
        .map(str::trim)
        .filter(|c| is_hex_color(c))
        .unwrap_or(fallback)
        .to_string()
}

/// Join a configured label and a value string into a key title.
pub fn compose_title(label: &str, value: &str) -> String {
    match (label.is_empty(), value.is_empty()) {
        (false, false) => format!("{}\n{}", label, value),
        (false, true) => label.to_string(),
        (true, false) => value.to_string(),
        (true, true) => String::new(),
    }
}

/// `42.4` -> `"42%"`
pub fn percent(value: f64) -> String {
    format!("{}%", value.round() as i64)
}

/// `22.5` -> `"23°"`. Rounds half away from zero.
pub fn degrees(value: f64) -> String {
    format!("{}°", value.round() as i64)
}

/// `21.46` -> `"21.5°"`, `21.0` -> `"21°"`.
pub fn degrees_one_decimal(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    format!("{}°", rounded)
}
