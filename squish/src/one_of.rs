//! Discriminated unions.

use crate::codec::{Codec, RawCodec, Scope, rest};
use crate::error::{Error, Rejection, Result};
use crate::integer::IntegerCodec;
use crate::value::Value;

struct OneOfCodec {
    alternatives: Vec<Codec>,
    discriminator: IntegerCodec,
}

impl RawCodec for OneOfCodec {
    fn encode(&self, value: &Value, out: &mut String, scope: &mut Scope) -> Result<()> {
        for (index, alternative) in self.alternatives.iter().enumerate() {
            let mark = out.len();
            self.discriminator.encode_integer(index as u64, out, scope)?;
            match alternative.encode_part(value, out, scope) {
                Ok(()) => return Ok(()),
                Err(Error::Rejected(_)) => {
                    trace!(index, "alternative rejected value");
                    out.truncate(mark);
                }
                Err(err) => return Err(err),
            }
        }
        Err(Rejection::NoAlternative.into())
    }

    fn decode(&self, input: &str, scope: &mut Scope) -> Result<(Value, usize)> {
        let (index, width) = self.discriminator.decode_integer(input, scope)?;
        let alternative = usize::try_from(index)
            .ok()
            .and_then(|index| self.alternatives.get(index))
            .ok_or_else(|| {
                Error::malformed(format!(
                    "discriminator {index} out of range for {} alternatives",
                    self.alternatives.len()
                ))
            })?;
        let (value, consumed) = alternative.decode_part(rest(input, width)?, scope)?;
        Ok((value, width + consumed))
    }
}

/// Union codec: the first alternative that accepts the value wins.
///
/// The output is the winner's index as a fixed-width integer (wide enough for
/// the last index) followed by the winner's own encoding. Alternatives are
/// tried strictly in order, so list overlapping alternatives from the one you
/// want preferred to the one you want as a fallback.
///
/// ```
/// use squish::{Value, constant, one_of_type, string_type, value};
///
/// let codec = one_of_type([constant(Value::Null), string_type(None)]);
/// assert_eq!(codec.serialize(&Value::Null)?, "0");
/// assert_eq!(codec.serialize(&value!("hi"))?, "1hi");
/// # Ok::<(), squish::Error>(())
/// ```
pub fn one_of_type(alternatives: impl IntoIterator<Item = Codec>) -> Codec {
    let alternatives: Vec<Codec> = alternatives.into_iter().collect();
    let max = alternatives.len().saturating_sub(1) as u64;
    Codec::new(OneOfCodec {
        alternatives,
        discriminator: IntegerCodec::new(Some(max)),
    })
}
