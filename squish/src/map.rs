//! Keyed maps, stored as a sequence of `{key, value}` records.

use crate::array::array_of_type;
use crate::codec::{Codec, RawCodec, Scope};
use crate::error::{Error, Rejection, Result};
use crate::object::object_of;
use crate::value::{Object, Value, ValueType};

struct MapCodec {
    entries: Codec,
}

impl RawCodec for MapCodec {
    fn encode(&self, value: &Value, out: &mut String, scope: &mut Scope) -> Result<()> {
        let Value::Object(map) = value else {
            return Err(Rejection::WrongKind {
                expected: ValueType::Object,
                found: value.value_type(),
            }
            .into());
        };
        let entries = map
            .iter()
            .map(|(key, value)| {
                let mut entry = Object::with_capacity(2);
                entry.insert("key".to_owned(), Value::String(key.clone()));
                entry.insert("value".to_owned(), value.clone());
                Value::Object(entry)
            })
            .collect();
        self.entries.encode_part(&Value::Array(entries), out, scope)
    }

    fn decode(&self, input: &str, scope: &mut Scope) -> Result<(Value, usize)> {
        let (entries, consumed) = self.entries.decode_part(input, scope)?;
        let Value::Array(entries) = entries else {
            return Err(Error::malformed("map entries did not decode to a sequence"));
        };
        let mut map = Object::with_capacity(entries.len());
        for entry in entries {
            let Value::Object(mut entry) = entry else {
                return Err(Error::malformed("map entry did not decode to a record"));
            };
            let key = match entry.swap_remove("key") {
                Some(Value::String(key)) => key,
                _ => return Err(Error::malformed("map key did not decode to text")),
            };
            let value = entry.swap_remove("value").unwrap_or_default();
            // later duplicates win
            map.insert(key, value);
        }
        Ok((Value::Object(map), consumed))
    }
}

/// Keyed map codec.
///
/// Entries are written in the map's insertion order as a variable-length
/// sequence of `{key, value}` records. A key codec that only accepts some
/// keys (say a [`one_of_type`](crate::one_of_type) of constants) makes the
/// map reject any other key.
pub fn map_of(key: Codec, value: Codec) -> Codec {
    Codec::new(MapCodec {
        entries: array_of_type(object_of([("key", key), ("value", value)]), None),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{constant, integer_type, one_of_type, string_type};

    fn enum_keys() -> Codec {
        map_of(
            one_of_type([constant("a"), constant("bb"), constant("ccc")]),
            integer_type(None),
        )
    }

    #[test]
    fn maps_round_trip() {
        squish_testhelpers::setup();
        let codec = map_of(string_type(None), integer_type(None));
        let v = value!({ "a": 1, "bb": 22, "ccc": 333 });
        let text = codec.serialize(&v).unwrap();
        assert_eq!(text, "a$1$bb$m$ccc$99");
        assert_eq!(codec.deserialize(&text).unwrap(), v);
    }

    #[test]
    fn enumerated_keys_are_shorter() {
        squish_testhelpers::setup();
        let v = value!({ "a": 1, "bb": 22, "ccc": 333 });
        let plain = map_of(string_type(None), integer_type(None));
        let text = enum_keys().serialize(&v).unwrap();
        assert_eq!(text, "01$1m$299");
        assert_eq!(enum_keys().deserialize(&text).unwrap(), v);
        assert!(text.len() < plain.serialize(&v).unwrap().len());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        squish_testhelpers::setup();
        let v = value!({ "a": 1, "bb": 22, "ccc": 333, "dddd": 4444 });
        assert!(enum_keys().serialize(&v).unwrap_err().is_rejection());
    }

    #[test]
    fn later_duplicates_overwrite_earlier_ones() {
        squish_testhelpers::setup();
        let codec = map_of(string_type(None), integer_type(None));
        assert_eq!(codec.deserialize("k$1$k$2").unwrap(), value!({ "k": 2 }));
    }

    #[test]
    fn empty_map_is_empty_text() {
        squish_testhelpers::setup();
        let codec = map_of(string_type(None), integer_type(None));
        assert_eq!(codec.serialize(&value!({})).unwrap(), "");
        assert_eq!(codec.deserialize("").unwrap(), value!({}));
    }

    #[test]
    fn zero_width_entries_cannot_stall_decoding() {
        squish_testhelpers::setup();
        let codec = map_of(constant("k"), constant(true));
        assert!(matches!(codec.deserialize("x"), Err(Error::Malformed(_))));
        assert_eq!(codec.deserialize("").unwrap(), value!({}));
    }

    #[test]
    fn non_text_keys_are_malformed() {
        squish_testhelpers::setup();
        let codec = map_of(integer_type(None), integer_type(None));
        assert!(matches!(
            codec.deserialize("1$2"),
            Err(Error::Malformed(_))
        ));
    }
}
