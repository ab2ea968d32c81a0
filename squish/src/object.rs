//! Fixed-shape records.

use crate::codec::{Codec, RawCodec, Scope, rest};
use crate::error::{Rejection, Result};
use crate::value::{Object, Value, ValueType};

struct ObjectCodec {
    fields: Vec<(String, Codec)>,
}

impl RawCodec for ObjectCodec {
    fn encode(&self, value: &Value, out: &mut String, scope: &mut Scope) -> Result<()> {
        let Value::Object(object) = value else {
            return Err(Rejection::WrongKind {
                expected: ValueType::Object,
                found: value.value_type(),
            }
            .into());
        };
        for (name, codec) in &self.fields {
            let field = object
                .get(name)
                .ok_or_else(|| Rejection::MissingField(name.clone()))?;
            codec.encode_part(field, out, scope)?;
        }
        Ok(())
    }

    fn decode(&self, input: &str, scope: &mut Scope) -> Result<(Value, usize)> {
        let mut object = Object::with_capacity(self.fields.len());
        let mut consumed = 0;
        for (name, codec) in &self.fields {
            let (field, taken) = codec.decode_part(rest(input, consumed)?, scope)?;
            object.insert(name.clone(), field);
            consumed += taken;
        }
        Ok((Value::Object(object), consumed))
    }
}

/// Record codec: each field's encoding, in schema order, with no separators.
///
/// Every schema field must be present in the value (null counts as present);
/// fields the schema does not name are ignored.
///
/// ```
/// use squish::{constant, object_of, string_type, value};
///
/// let codec = object_of([
///     ("a", constant("a")),
///     ("b", string_type(3)),
///     ("c", string_type(None)),
/// ]);
/// let v = value!({ "a": "a", "b": "bbb", "c": "qwer" });
/// assert_eq!(codec.serialize(&v)?, "bbbqwer");
/// assert_eq!(codec.deserialize("bbbqwer")?, v);
/// # Ok::<(), squish::Error>(())
/// ```
pub fn object_of<K: Into<String>>(schema: impl IntoIterator<Item = (K, Codec)>) -> Codec {
    Codec::new(ObjectCodec {
        fields: schema
            .into_iter()
            .map(|(name, codec)| (name.into(), codec))
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{constant, integer_type, string_type};

    fn simple() -> Codec {
        object_of([
            ("a", constant("a")),
            ("b", string_type(3)),
            ("c", string_type(None)),
            ("d", string_type(None)),
        ])
    }

    #[test]
    fn records_round_trip() {
        squish_testhelpers::setup();
        let v = value!({ "a": "a", "b": "bbb", "c": "qwer", "d": "asdf" });
        let text = simple().serialize(&v).unwrap();
        assert_eq!(text, "bbbqwer$asdf");
        assert_eq!(simple().deserialize(&text).unwrap(), v);
    }

    #[test]
    fn a_field_the_schema_refuses_fails_the_record() {
        squish_testhelpers::setup();
        let v = value!({ "a": "aa", "b": "bbb", "c": "qwer", "d": "asdf" });
        assert!(simple().serialize(&v).unwrap_err().is_rejection());
    }

    #[test]
    fn missing_fields_are_rejected() {
        squish_testhelpers::setup();
        let err = simple()
            .serialize(&value!({ "a": "a", "b": "bbb", "c": "qwer" }))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "unable to serialize value: missing field `d`"
        );
    }

    #[test]
    fn extra_fields_are_ignored() {
        squish_testhelpers::setup();
        let codec = object_of([("n", integer_type(None))]);
        let text = codec.serialize(&value!({ "n": 7, "junk": true })).unwrap();
        assert_eq!(codec.deserialize(&text).unwrap(), value!({ "n": 7 }));
    }

    #[test]
    fn non_records_are_rejected() {
        squish_testhelpers::setup();
        assert!(simple().serialize(&value!(["a"])).unwrap_err().is_rejection());
    }

    #[test]
    fn truncated_tail_fields_decode_as_empty() {
        squish_testhelpers::setup();
        let codec = object_of([("x", string_type(None)), ("y", string_type(None))]);
        let v = value!({ "x": "", "y": "" });
        assert_eq!(codec.serialize(&v).unwrap(), "");
        assert_eq!(codec.deserialize("").unwrap(), v);
    }
}
