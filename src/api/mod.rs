//! Request payloads accepted by the HTTP API, with their validation rules

pub mod empresas;
pub mod geografia;
pub mod tickets;
pub mod usuarios;

use serde::{Deserialize, Deserializer};

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`)
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Trim and drop empty strings from optional text fields
pub fn clean(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        tecnico_id: Option<Option<i32>>,
    }

    #[test]
    fn double_option_tracks_presence() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        let null: Patch = serde_json::from_str(r#"{"tecnico_id": null}"#).unwrap();
        let set: Patch = serde_json::from_str(r#"{"tecnico_id": 7}"#).unwrap();
        assert_eq!(absent.tecnico_id, None);
        assert_eq!(null.tecnico_id, Some(None));
        assert_eq!(set.tecnico_id, Some(Some(7)));
    }

    #[test]
    fn clean_drops_blank_text() {
        assert_eq!(clean(&Some("  ".into())), None);
        assert_eq!(clean(&Some(" x ".into())), Some("x".into()));
        assert_eq!(clean(&None), None);
    }
}
