//! Fixed- and variable-length text.

use crate::codec::{Codec, RawCodec, Scope};
use crate::error::{Rejection, Result};
use crate::value::{Value, ValueType};

pub(crate) struct StringCodec {
    length: Option<usize>,
}

impl StringCodec {
    pub(crate) fn new(length: Option<usize>) -> Self {
        Self { length }
    }

    /// Escape and append `text`, checking the fixed length.
    pub(crate) fn encode_text(&self, text: &str, out: &mut String, scope: &Scope) -> Result<()> {
        let escaped = scope.config().escape(text);
        match self.length {
            Some(length) => {
                let found = escaped.chars().count();
                if found != length {
                    return Err(Rejection::LengthMismatch {
                        expected: length,
                        found,
                    }
                    .into());
                }
                out.push_str(&escaped);
            }
            None => {
                out.push_str(&escaped);
                out.push(scope.config().terminator());
            }
        }
        Ok(())
    }

    /// Decode the text at the head of `input`, before unescaping.
    ///
    /// Never fails: a short or unterminated input yields whatever is there.
    pub(crate) fn decode_raw<'a>(&self, input: &'a str, scope: &Scope) -> (&'a str, usize) {
        match self.length {
            Some(length) => {
                let end = input
                    .char_indices()
                    .nth(length)
                    .map_or(input.len(), |(i, _)| i);
                (&input[..end], end)
            }
            None => {
                let terminator = scope.config().terminator();
                match input.find(terminator) {
                    Some(end) => (&input[..end], end + terminator.len_utf8()),
                    None => (input, input.len()),
                }
            }
        }
    }

    pub(crate) fn decode_text(&self, input: &str, scope: &Scope) -> Result<(String, usize)> {
        let (body, consumed) = self.decode_raw(input, scope);
        Ok((scope.config().unescape(body)?, consumed))
    }
}

impl RawCodec for StringCodec {
    fn encode(&self, value: &Value, out: &mut String, scope: &mut Scope) -> Result<()> {
        let Value::String(text) = value else {
            return Err(Rejection::WrongKind {
                expected: ValueType::String,
                found: value.value_type(),
            }
            .into());
        };
        self.encode_text(text, out, scope)
    }

    fn decode(&self, input: &str, scope: &mut Scope) -> Result<(Value, usize)> {
        let (text, consumed) = self.decode_text(input, scope)?;
        Ok((Value::String(text), consumed))
    }
}

/// Text codec.
///
/// With a `length`, the escaped text must be exactly that many characters and
/// is stored as-is. Without one, the escaped text is followed by the
/// terminator.
///
/// ```
/// use squish::{string_type, value};
///
/// let fixed = string_type(4);
/// assert_eq!(fixed.serialize(&value!("qwer"))?, "qwer");
/// assert!(fixed.serialize(&value!("qwer asdf")).is_err());
///
/// let fluid = string_type(None);
/// assert_eq!(fluid.serialize(&value!("qwer asdf"))?, "qwer%20asdf");
/// # Ok::<(), squish::Error>(())
/// ```
pub fn string_type(length: impl Into<Option<usize>>) -> Codec {
    Codec::new(StringCodec::new(length.into()))
}
