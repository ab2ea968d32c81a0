//! Non-negative whole numbers in the configured radix.

use crate::codec::{Codec, RawCodec, Scope};
use crate::error::{Rejection, Result};
use crate::string::StringCodec;
use crate::value::{Value, ValueType};

/// Largest `f64` below 2^64; every whole `f64` up to it converts to `u64` exactly.
const MAX_EXACT: f64 = 18_446_744_073_709_549_568.0;

pub(crate) struct IntegerCodec {
    max: Option<u64>,
}

impl IntegerCodec {
    pub(crate) fn new(max: Option<u64>) -> Self {
        Self { max }
    }

    /// Width of the fixed encoding under the scope's configuration.
    fn width(&self, scope: &Scope) -> Option<usize> {
        self.max
            .map(|max| scope.config().integer_to_text(max).chars().count())
    }

    fn check(&self, value: &Value) -> Result<u64> {
        let Value::Number(n) = *value else {
            return Err(Rejection::WrongKind {
                expected: ValueType::Number,
                found: value.value_type(),
            }
            .into());
        };
        let out_of_range = Rejection::OutOfRange {
            value: n,
            max: self.max,
        };
        if n < 0.0 || n.fract() != 0.0 || n > MAX_EXACT {
            return Err(out_of_range.into());
        }
        let n = n as u64;
        match self.max {
            Some(max) if n > max => Err(out_of_range.into()),
            _ => Ok(n),
        }
    }

    pub(crate) fn encode_integer(&self, n: u64, out: &mut String, scope: &Scope) -> Result<()> {
        let width = self.width(scope);
        let mut text = scope.config().integer_to_text(n);
        if let Some(width) = width {
            let digits = text.chars().count();
            if digits < width {
                text = scope.config().integer_to_text(0).repeat(width - digits) + &text;
            }
        }
        StringCodec::new(width).encode_text(&text, out, scope)
    }

    pub(crate) fn decode_integer(&self, input: &str, scope: &Scope) -> Result<(u64, usize)> {
        let (text, consumed) = StringCodec::new(self.width(scope)).decode_text(input, scope)?;
        Ok((scope.config().text_to_integer(&text)?, consumed))
    }
}

impl RawCodec for IntegerCodec {
    fn encode(&self, value: &Value, out: &mut String, scope: &mut Scope) -> Result<()> {
        let n = self.check(value)?;
        self.encode_integer(n, out, scope)
    }

    fn decode(&self, input: &str, scope: &mut Scope) -> Result<(Value, usize)> {
        let (n, consumed) = self.decode_integer(input, scope)?;
        Ok((Value::from(n), consumed))
    }
}

/// Whole-number codec.
///
/// With a `max`, every value in `0..=max` is left-padded with the zero digit
/// to the width of `max` and stored without a terminator; larger values are
/// rejected. Without one, values are stored as variable-length text.
///
/// ```
/// use squish::{integer_type, value};
///
/// let fixed = integer_type(100);
/// assert_eq!(fixed.serialize(&value!(1))?, "01");
/// assert_eq!(fixed.serialize(&value!(100))?, "2s");
/// assert!(fixed.serialize(&value!(101)).is_err());
/// # Ok::<(), squish::Error>(())
/// ```
pub fn integer_type(max: impl Into<Option<u64>>) -> Codec {
    Codec::new(IntegerCodec::new(max.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spring(codec: &Codec, value: &Value) -> Result<Value> {
        codec.deserialize(&codec.serialize(value)?)
    }

    #[test]
    fn fluid_integers_round_trip() {
        squish_testhelpers::setup();
        let fluid = integer_type(None);
        for n in [0u64, 1, 35, 36, 1234, 1 << 53] {
            assert_eq!(spring(&fluid, &value!(n)).unwrap(), value!(n));
        }
        assert_eq!(fluid.serialize(&value!(1234)).unwrap(), "ya");
    }

    #[test]
    fn fixed_integers_have_constant_width() {
        squish_testhelpers::setup();
        let fixed = integer_type(100);
        assert_eq!(spring(&fixed, &value!(1.0)).unwrap(), value!(1));
        assert_eq!(spring(&fixed, &value!(100)).unwrap(), value!(100));
        assert_eq!(
            fixed.serialize(&value!(1)).unwrap().len(),
            fixed.serialize(&value!(100)).unwrap().len()
        );
        assert!(fixed.serialize(&value!(1234)).unwrap_err().is_rejection());
    }

    #[test]
    fn fluid_width_varies_with_magnitude() {
        squish_testhelpers::setup();
        let fluid = integer_type(None);
        assert_eq!(fluid.serialize(&value!(1)).unwrap(), "1");
        assert_eq!(fluid.serialize(&value!(100)).unwrap(), "2s");
    }

    #[test]
    fn fractions_negatives_and_text_are_rejected() {
        squish_testhelpers::setup();
        let fluid = integer_type(None);
        for value in [value!(0.1), value!((-1)), value!("12"), value!(null)] {
            assert!(fluid.serialize(&value).unwrap_err().is_rejection());
        }
        assert!(fluid.serialize(&value!(f64::NAN)).is_err());
        assert!(fluid.serialize(&value!(1e30)).is_err());
    }

    #[test]
    fn zero_max_is_one_digit_wide() {
        squish_testhelpers::setup();
        let codec = integer_type(0);
        let mut scope = Scope::new();
        let mut out = String::new();
        codec.encode_part(&value!(0), &mut out, &mut scope).unwrap();
        assert_eq!(out, "0");
        assert!(codec.serialize(&value!(1)).is_err());
    }

    #[test]
    fn garbage_digits_are_a_hook_error() {
        squish_testhelpers::setup();
        let err = integer_type(None).deserialize("!!").unwrap_err();
        assert!(!err.is_rejection());
    }
}
