use std::collections::HashMap;
use std::sync::Arc;
use std::sync::RwLock;

use serde::Deserialize;

/// Deserialize a number the settings pages may send as a JSON number or as a
/// string. Anything unparsable, including arrays and objects, becomes `None`
/// rather than failing the whole settings object.
fn deserialize_lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de;

    struct LenientNumber;

    impl<'de> de::Visitor<'de> for LenientNumber {
        type Value = Option<f64>;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            f.write_str("number, numeric string, or null")
        }

        fn visit_none<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            deserializer.deserialize_any(LenientNumber)
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E> {
            Ok(Some(v).filter(|v| v.is_finite()))
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
            Ok(v.trim().parse::<f64>().ok().filter(|v| v.is_finite()))
        }

        fn visit_bool<E>(self, _v: bool) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: de::SeqAccess<'de>,
        {
            while seq.next_element::<de::IgnoredAny>()?.is_some() {}
            Ok(None)
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: de::MapAccess<'de>,
        {
            while map.next_entry::<de::IgnoredAny, de::IgnoredAny>()?.is_some() {}
            Ok(None)
        }
    }

    deserializer.deserialize_any(LenientNumber)
}

fn deserialize_port<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(deserialize_lenient_number(deserializer)?
        .map(f64::round)
        .filter(|p| *p >= 1.0 && *p <= f64::from(u16::MAX))
        .map(|p| p as u16))
}

fn deserialize_percent<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(deserialize_lenient_number(deserializer)?
        .filter(|v| *v >= 0.0)
        .map(|v| v.round().min(100.0) as u8))
}

/// Deserialize a string field, tolerating the wrong JSON type. Numbers keep
/// their textual form; anything else becomes `None` rather than failing the
/// whole settings object.
fn deserialize_lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de;

    struct LenientString;

    impl<'de> de::Visitor<'de> for LenientString {
        type Value = Option<String>;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            f.write_str("string or null")
        }

        fn visit_none<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            deserializer.deserialize_any(LenientString)
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_bool<E>(self, _v: bool) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: de::SeqAccess<'de>,
        {
            while seq.next_element::<de::IgnoredAny>()?.is_some() {}
            Ok(None)
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: de::MapAccess<'de>,
        {
            while map.next_entry::<de::IgnoredAny, de::IgnoredAny>()?.is_some() {}
            Ok(None)
        }
    }

    deserializer.deserialize_any(LenientString)
}

/// Identifiers and labels are kept exactly as written; whitespace-only
/// values count as unset.
fn deserialize_exact<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(deserialize_lenient_string(deserializer)?.filter(|s| !s.trim().is_empty()))
}

/// Option values such as modes and colours, trimmed.
fn deserialize_trimmed<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(deserialize_lenient_string(deserializer)?
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

/// Per-button configuration written by the settings pages.
///
/// Every field is optional; each action reads the subset it understands.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ButtonSettings {
    /// Device or group identifier, e.g. `"Office/Lamp"` or `"group.Downstairs"`.
    #[serde(deserialize_with = "deserialize_exact")]
    pub target: Option<String>,

    /// Control server port override.
    #[serde(deserialize_with = "deserialize_port")]
    pub port: Option<u16>,

    #[serde(deserialize_with = "deserialize_exact")]
    pub label: Option<String>,

    /// Thermostat display mode: `current-target`, `current` or `target`.
    #[serde(deserialize_with = "deserialize_trimmed")]
    pub display: Option<String>,

    /// Blinds direction: `open` or `close`.
    #[serde(deserialize_with = "deserialize_trimmed")]
    pub direction: Option<String>,

    /// Blinds position to move to (0-100).
    #[serde(deserialize_with = "deserialize_percent")]
    pub position: Option<u8>,

    /// Brightness level to set (0-100).
    #[serde(deserialize_with = "deserialize_percent")]
    pub brightness: Option<u8>,

    /// Security arm mode (0 stay, 1 away, 2 night).
    #[serde(deserialize_with = "deserialize_percent")]
    pub mode: Option<u8>,

    /// Status sensor: `temperature` or `humidity`.
    #[serde(deserialize_with = "deserialize_trimmed")]
    pub sensor: Option<String>,

    /// Scene name for scene buttons.
    #[serde(deserialize_with = "deserialize_exact")]
    pub scene: Option<String>,

    #[serde(deserialize_with = "deserialize_trimmed")]
    pub on_color: Option<String>,

    #[serde(deserialize_with = "deserialize_trimmed")]
    pub off_color: Option<String>,
}

impl ButtonSettings {
    /// Parse the raw settings object delivered by the host.
    ///
    /// A malformed object yields the defaults (nothing configured).
    pub fn from_json(value: &serde_json::Value) -> Self {
        if value.is_null() {
            return Self::default();
        }
        match Self::deserialize(value) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::debug!("ignoring malformed button settings: {}", e);
                Self::default()
            }
        }
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or("")
    }

    /// Settings that only name a target.
    pub fn for_target(target: &str) -> Self {
        Self {
            target: Some(target.to_string()),
            ..Self::default()
        }
    }
}

/// Latest settings per button context.
///
/// The host delivers settings with lifecycle events; buttons read them back
/// live so every poll sees the current configuration.
#[derive(Debug, Clone, Default)]
pub struct SettingsStore {
    inner: Arc<RwLock<HashMap<String, ButtonSettings>>>,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&self, context: &str, settings: ButtonSettings) {
        let mut map = self.inner.write().unwrap_or_else(|e| e.into_inner());
        map.insert(context.to_string(), settings);
    }

    pub fn get(&self, context: &str) -> ButtonSettings {
        let map = self.inner.read().unwrap_or_else(|e| e.into_inner());
        map.get(context).cloned().unwrap_or_default()
    }

    pub fn remove(&self, context: &str) {
        let mut map = self.inner.write().unwrap_or_else(|e| e.into_inner());
        map.remove(context);
    }
}
