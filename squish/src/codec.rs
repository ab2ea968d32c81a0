//! The codec handle and the raw, composable codec interface behind it.

use core::fmt;
use std::sync::Arc;

use crate::config::{self, Config};
use crate::error::{Error, Result};
use crate::value::Value;

/// The composable half of a codec.
///
/// `encode` appends this codec's segment to `out`. `decode` reads a
/// self-describing prefix of `input` and reports how many bytes it consumed,
/// which must equal the length of the segment `encode` produced for the same
/// value. A decoder that scans for the terminator must treat running out of
/// input exactly like finding the terminator at the end of it.
pub trait RawCodec: Send + Sync {
    /// Append the encoding of `value` to `out`.
    fn encode(&self, value: &Value, out: &mut String, scope: &mut Scope) -> Result<()>;

    /// Decode a value from the head of `input`, returning it with the number
    /// of bytes consumed.
    fn decode(&self, input: &str, scope: &mut Scope) -> Result<(Value, usize)>;
}

struct Binding {
    owner: usize,
    value: Option<Value>,
}

/// How many templates and recursive schemas one call may nest.
///
/// Deeper input fails with [`Error::TooDeep`] instead of exhausting the stack.
pub const MAX_DEPTH: usize = 4096;

// Stack kept free before growing, and the size of each new segment.
#[cfg(feature = "stacker")]
const RED_ZONE: usize = 64 * 1024;
#[cfg(feature = "stacker")]
const STACK_SEGMENT: usize = 1024 * 1024;

/// State for one top-level `serialize` or `deserialize` call.
///
/// Holds the configuration snapshot the call runs under and the values
/// captured for dependent fields. A fresh scope is created per call and never
/// shared between calls.
pub struct Scope {
    config: Arc<Config>,
    bindings: Vec<Binding>,
    depth: usize,
}

impl Scope {
    /// A scope running under the current global configuration.
    pub fn new() -> Self {
        Self::with_config(config::current())
    }

    /// A scope running under an explicit configuration.
    pub fn with_config(config: Arc<Config>) -> Self {
        Self {
            config,
            bindings: Vec::new(),
            depth: 0,
        }
    }

    /// The configuration this call runs under.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run `f` one nesting level deeper.
    pub(crate) fn nested<T>(&mut self, f: impl FnOnce(&mut Scope) -> Result<T>) -> Result<T> {
        if self.depth >= MAX_DEPTH {
            debug!(limit = MAX_DEPTH, "nesting limit reached");
            return Err(Error::TooDeep(MAX_DEPTH));
        }
        self.depth += 1;
        let result = grow_stack(|| f(self));
        self.depth -= 1;
        result
    }

    pub(crate) fn open_binding(&mut self, owner: usize) {
        self.bindings.push(Binding { owner, value: None });
    }

    pub(crate) fn close_binding(&mut self, owner: usize) {
        let closed = self.bindings.pop();
        debug_assert!(closed.is_some_and(|b| b.owner == owner));
    }

    pub(crate) fn bind(&mut self, owner: usize, value: Value) {
        if let Some(binding) = self.bindings.iter_mut().rev().find(|b| b.owner == owner) {
            binding.value = Some(value);
        }
    }

    pub(crate) fn bound(&self, owner: usize) -> Option<&Value> {
        self.bindings
            .iter()
            .rev()
            .find(|b| b.owner == owner)
            .and_then(|b| b.value.as_ref())
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

/// A codec for one schema node.
///
/// Cloning is cheap; clones share the same underlying codec.
#[derive(Clone)]
pub struct Codec(Arc<dyn RawCodec>);

impl Codec {
    /// Wrap a raw codec.
    pub fn new(raw: impl RawCodec + 'static) -> Self {
        Codec(Arc::new(raw))
    }

    pub(crate) fn from_arc(raw: Arc<dyn RawCodec>) -> Self {
        Codec(raw)
    }

    /// Encode `value` as text.
    ///
    /// Trailing terminators are stripped, so the result may be empty.
    pub fn serialize(&self, value: &Value) -> Result<String> {
        let mut scope = Scope::new();
        let mut out = String::new();
        self.encode_part(value, &mut out, &mut scope)?;
        let terminator = scope.config().terminator();
        let kept = out.trim_end_matches(terminator).len();
        trace!(
            encoded = out.len(),
            trimmed = out.len() - kept,
            "serialized value"
        );
        out.truncate(kept);
        Ok(out)
    }

    /// Decode a value from `text`. Text left over after the value is ignored.
    #[cfg_attr(not(any(test, feature = "tracing")), allow(unused_variables))]
    pub fn deserialize(&self, text: &str) -> Result<Value> {
        let mut scope = Scope::new();
        let (value, consumed) = self.decode_part(text, &mut scope)?;
        trace!(
            consumed,
            ignored = text.len().saturating_sub(consumed),
            "deserialized value"
        );
        Ok(value)
    }

    /// Composable serialize: append this codec's segment to `out`.
    pub fn encode_part(&self, value: &Value, out: &mut String, scope: &mut Scope) -> Result<()> {
        self.0.encode(value, out, scope)
    }

    /// Composable deserialize: decode from the head of `input` and report the
    /// number of bytes consumed.
    pub fn decode_part(&self, input: &str, scope: &mut Scope) -> Result<(Value, usize)> {
        self.0.decode(input, scope)
    }
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Codec(..)")
    }
}

#[cfg(feature = "stacker")]
fn grow_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, f)
}

#[cfg(not(feature = "stacker"))]
fn grow_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// The input left after `consumed` bytes.
pub(crate) fn rest(input: &str, consumed: usize) -> Result<&str> {
    input
        .get(consumed..)
        .ok_or_else(|| Error::malformed(format!("consumed {consumed} of {} bytes", input.len())))
}

/// Turn a raw codec constructor into a codec constructor.
///
/// ```
/// use squish::{Codec, RawCodec, Rejection, Result, Scope, Value, ValueType, create_type};
///
/// struct Flag;
///
/// impl RawCodec for Flag {
///     fn encode(&self, value: &Value, out: &mut String, _: &mut Scope) -> Result<()> {
///         let b = value.as_bool().ok_or(Rejection::WrongKind {
///             expected: ValueType::Bool,
///             found: value.value_type(),
///         })?;
///         out.push(if b { '1' } else { '0' });
///         Ok(())
///     }
///
///     fn decode(&self, input: &str, _: &mut Scope) -> Result<(Value, usize)> {
///         Ok((Value::Bool(input.starts_with('1')), input.len().min(1)))
///     }
/// }
///
/// let flag = create_type(|()| Flag);
/// let codec: Codec = flag(());
/// assert_eq!(codec.serialize(&Value::Bool(true))?, "1");
/// # Ok::<(), squish::Error>(())
/// ```
pub fn create_type<P, R, F>(factory: F) -> impl Fn(P) -> Codec
where
    F: Fn(P) -> R,
    R: RawCodec + 'static,
{
    move |params| Codec::new(factory(params))
}
