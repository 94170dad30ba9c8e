use crate::error::{Error, Result as E6Result};

use serde::{
    de::{self, DeserializeOwned, Visitor},
    Deserialize, Deserializer,
};

use serde_json::Value as JsonValue;

/// Maps a payload into `T`, turning serde failures into [`Error::Mapping`].
pub(crate) fn from_payload<T: DeserializeOwned>(value: JsonValue) -> E6Result<T> {
    serde_json::from_value(value).map_err(Error::Mapping)
}

/// Like [`from_payload`], but for list endpoints. A missing payload (`204`) is an empty list.
pub(crate) fn list_from_payload<T: DeserializeOwned>(value: Option<JsonValue>) -> E6Result<Vec<T>> {
    match value {
        None => Ok(Vec::new()),
        Some(v) => Ok(from_payload::<MaybeList<T>>(v)?.into_vec()),
    }
}

/// Fails with [`Error::Mapping`] on a `204 No Content` where a payload was expected.
pub(crate) fn require(value: Option<JsonValue>) -> E6Result<JsonValue> {
    value.ok_or_else(|| Error::Mapping(de::Error::custom("expected a payload, got no content")))
}

/// Takes `key` out of an object payload, e.g. `posts` in `{"posts": [...]}`.
pub(crate) fn take_key(value: Option<JsonValue>, key: &str) -> Option<JsonValue> {
    value.map(|mut v| v.get_mut(key).map(JsonValue::take).unwrap_or(JsonValue::Null))
}

/// Some list endpoints return `{ "<name>": [] }` instead of the empty array when there are no
/// results.
#[derive(Deserialize)]
#[serde(untagged)]
enum MaybeList<T> {
    Items(Vec<T>),
    #[allow(dead_code)]
    Empty(std::collections::BTreeMap<String, [(); 0]>),
}

impl<T> MaybeList<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            MaybeList::Items(v) => v,
            MaybeList::Empty(_) => Vec::new(),
        }
    }
}

/// Deserializes `null` as `false`.
pub(crate) fn nullable_bool<'de, D>(de: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    struct NullableBoolVisitor;

    impl<'de> Visitor<'de> for NullableBoolVisitor {
        type Value = bool;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("null or bool")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
            Ok(v)
        }

        fn visit_unit<E: de::Error>(self) -> Result<bool, E> {
            Ok(false)
        }

        fn visit_none<E: de::Error>(self) -> Result<bool, E> {
            Ok(false)
        }
    }

    de.deserialize_any(NullableBoolVisitor)
}

/// Deserializes `null` as the default value.
pub(crate) fn nullable<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_object_is_an_empty_list() {
        let list: Vec<u64> = list_from_payload(Some(json!({ "notes": [] }))).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn array_is_a_list() {
        let list: Vec<u64> = list_from_payload(Some(json!([1, 2, 3]))).unwrap();
        assert_eq!(list, vec![1, 2, 3]);
    }

    #[test]
    fn no_content_is_an_empty_list() {
        let list: Vec<u64> = list_from_payload(None).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn missing_payload_is_a_mapping_error() {
        assert!(matches!(require(None), Err(Error::Mapping(_))));
    }

    #[test]
    fn unexpected_shape_is_a_mapping_error() {
        let res = list_from_payload::<u64>(Some(json!({ "notes": [1] })));
        assert!(matches!(res, Err(Error::Mapping(_))));
    }
}
