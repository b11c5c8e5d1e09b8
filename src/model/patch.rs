//! Serde support for partial updates.
//!
//! Nullable fields in update bodies are modelled as `Option<Option<T>>`: an absent key
//! leaves the stored value alone, an explicit `null` clears it, and a value sets it.

use serde::{Deserialize, Deserializer};

/// Deserializes a present key into `Some(..)` so `null` becomes `Some(None)`.
///
/// Pair with `#[serde(default)]` so a missing key stays `None`.
pub fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Body {
        #[serde(default, deserialize_with = "present")]
        note: Option<Option<String>>,
    }

    #[test]
    fn distinguishes_absent_null_and_value() {
        let absent: Body = serde_json::from_str("{}").unwrap();
        let null: Body = serde_json::from_str(r#"{"note":null}"#).unwrap();
        let value: Body = serde_json::from_str(r#"{"note":"hi"}"#).unwrap();

        assert_eq!(absent.note, None);
        assert_eq!(null.note, Some(None));
        assert_eq!(value.note, Some(Some("hi".to_string())));
    }
}
