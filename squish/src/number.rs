//! Arbitrary numbers as variable-length text.

use crate::codec::{Codec, RawCodec, Scope};
use crate::error::{Rejection, Result};
use crate::string::StringCodec;
use crate::value::{Value, ValueType};

struct NumberCodec;

impl RawCodec for NumberCodec {
    fn encode(&self, value: &Value, out: &mut String, scope: &mut Scope) -> Result<()> {
        let Value::Number(n) = *value else {
            return Err(Rejection::WrongKind {
                expected: ValueType::Number,
                found: value.value_type(),
            }
            .into());
        };
        let text = scope.config().number_to_text(n);
        StringCodec::new(None).encode_text(&text, out, scope)
    }

    fn decode(&self, input: &str, scope: &mut Scope) -> Result<(Value, usize)> {
        let (text, consumed) = StringCodec::new(None).decode_text(input, scope)?;
        Ok((Value::Number(scope.config().text_to_number(&text)?), consumed))
    }
}

/// Codec for any number: negative, fractional, or in exponent form.
///
/// Prefer [`integer_type`](crate::integer_type) for whole numbers; it is
/// shorter.
pub fn number_type() -> Codec {
    Codec::new(NumberCodec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integer_type;

    #[test]
    fn numbers_round_trip() {
        squish_testhelpers::setup();
        let codec = number_type();
        for n in [-1.2345e67, 0.0, 1234.0, -0.5, 0.1 + 0.2, 5e-324, f64::MAX] {
            let text = codec.serialize(&value!(n)).unwrap();
            assert_eq!(codec.deserialize(&text).unwrap(), value!(n), "{text}");
        }
    }

    #[test]
    fn numeric_text_is_rejected() {
        squish_testhelpers::setup();
        let err = number_type().serialize(&value!("1234567")).unwrap_err();
        assert!(err.is_rejection());
    }

    #[test]
    fn integers_are_shorter_than_numbers() {
        squish_testhelpers::setup();
        let n = value!(1234567);
        let as_integer = integer_type(None).serialize(&n).unwrap();
        let as_number = number_type().serialize(&n).unwrap();
        assert_eq!(as_integer, "qglj");
        assert_eq!(as_number, "1234567");
        assert!(as_integer.len() < as_number.len());
    }

    #[test]
    fn exponent_form_survives_escaping() {
        squish_testhelpers::setup();
        assert_eq!(
            number_type().serialize(&value!(-1.2345e67)).unwrap(),
            "-1.2345e67"
        );
    }
}
