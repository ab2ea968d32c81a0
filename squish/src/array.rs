//! Homogeneous sequences.

use crate::codec::{Codec, RawCodec, Scope, rest};
use crate::error::{Error, Rejection, Result};
use crate::value::{Value, ValueType};

struct ArrayCodec {
    element: Codec,
    length: Option<usize>,
}

impl RawCodec for ArrayCodec {
    fn encode(&self, value: &Value, out: &mut String, scope: &mut Scope) -> Result<()> {
        let Value::Array(items) = value else {
            return Err(Rejection::WrongKind {
                expected: ValueType::Array,
                found: value.value_type(),
            }
            .into());
        };
        if let Some(length) = self.length
            && items.len() != length
        {
            return Err(Rejection::LengthMismatch {
                expected: length,
                found: items.len(),
            }
            .into());
        }
        for item in items {
            self.element.encode_part(item, out, scope)?;
        }
        if self.length.is_none() {
            out.push(scope.config().terminator());
        }
        Ok(())
    }

    fn decode(&self, input: &str, scope: &mut Scope) -> Result<(Value, usize)> {
        let mut items = Vec::new();
        let mut consumed = 0;
        match self.length {
            Some(length) => {
                for _ in 0..length {
                    let (item, taken) = self.element.decode_part(rest(input, consumed)?, scope)?;
                    items.push(item);
                    consumed += taken;
                }
            }
            None => {
                let terminator = scope.config().terminator();
                loop {
                    let tail = rest(input, consumed)?;
                    if tail.is_empty() {
                        break;
                    }
                    if tail.starts_with(terminator) {
                        consumed += terminator.len_utf8();
                        break;
                    }
                    let (item, taken) = self.element.decode_part(tail, scope)?;
                    if taken == 0 {
                        return Err(Error::malformed(
                            "sequence element consumed no input before the terminator",
                        ));
                    }
                    items.push(item);
                    consumed += taken;
                }
            }
        }
        Ok((Value::Array(items), consumed))
    }
}

/// Sequence codec: the elements' encodings back to back.
///
/// With a `length`, the sequence must have exactly that many elements and no
/// terminator is written. Without one, the terminator follows the last
/// element.
///
/// An element whose encoding is empty or starts with the terminator cannot be
/// told apart from the end of a variable-length sequence; pick element codecs
/// that always write something else first. Decoding a variable-length
/// sequence whose element reads nothing from non-terminator input fails as
/// malformed.
pub fn array_of_type(element: Codec, length: impl Into<Option<usize>>) -> Codec {
    Codec::new(ArrayCodec {
        element,
        length: length.into(),
    })
}
