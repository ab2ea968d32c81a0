//! Values encoded by presence alone.

use crate::codec::{Codec, RawCodec, Scope};
use crate::error::{Rejection, Result};
use crate::value::Value;

struct ConstantCodec {
    value: Value,
}

impl RawCodec for ConstantCodec {
    fn encode(&self, value: &Value, _out: &mut String, scope: &mut Scope) -> Result<()> {
        if scope.config().equals(&self.value, value) {
            Ok(())
        } else {
            Err(Rejection::NotEqual.into())
        }
    }

    fn decode(&self, _input: &str, _scope: &mut Scope) -> Result<(Value, usize)> {
        Ok((self.value.clone(), 0))
    }
}

/// Codec accepting exactly one value, encoded as zero characters.
///
/// Equality is the configured predicate. Mostly useful as an alternative of
/// [`one_of_type`](crate::one_of_type), where the discriminator alone then
/// identifies the value.
pub fn constant(value: impl Into<Value>) -> Codec {
    Codec::new(ConstantCodec {
        value: value.into(),
    })
}
