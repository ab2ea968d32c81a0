//! Fields whose codec depends on the value of another field.
//!
//! The determining value travels through the call's [`Scope`]: the dependent
//! codec opens a binding frame on entry, the bound source field fills it, and
//! the derived field reads it. Frames are keyed by the dependent codec that
//! opened them, so nested and recursive uses each see their own value.

use core::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::codec::{Codec, RawCodec, Scope};
use crate::error::{Error, Rejection, Result};
use crate::value::Value;

type Selector = Arc<dyn Fn(&Value) -> Codec + Send + Sync>;

static NEXT_OWNER: AtomicUsize = AtomicUsize::new(0);

struct CalculatedCodec {
    owner: usize,
    body: Codec,
}

impl RawCodec for CalculatedCodec {
    fn encode(&self, value: &Value, out: &mut String, scope: &mut Scope) -> Result<()> {
        scope.open_binding(self.owner);
        let result = self.body.encode_part(value, out, scope);
        scope.close_binding(self.owner);
        result
    }

    fn decode(&self, input: &str, scope: &mut Scope) -> Result<(Value, usize)> {
        scope.open_binding(self.owner);
        let result = self.body.decode_part(input, scope);
        scope.close_binding(self.owner);
        result
    }
}

struct BoundCodec {
    owner: usize,
    inner: Codec,
}

impl RawCodec for BoundCodec {
    fn encode(&self, value: &Value, out: &mut String, scope: &mut Scope) -> Result<()> {
        scope.bind(self.owner, value.clone());
        self.inner.encode_part(value, out, scope)
    }

    fn decode(&self, input: &str, scope: &mut Scope) -> Result<(Value, usize)> {
        let (value, consumed) = self.inner.decode_part(input, scope)?;
        scope.bind(self.owner, value.clone());
        Ok((value, consumed))
    }
}

struct DerivedCodec {
    owner: usize,
    selector: Selector,
}

impl DerivedCodec {
    fn select(&self, scope: &Scope) -> Option<Codec> {
        scope.bound(self.owner).map(|bound| (self.selector)(bound))
    }
}

impl RawCodec for DerivedCodec {
    fn encode(&self, value: &Value, out: &mut String, scope: &mut Scope) -> Result<()> {
        let codec = self.select(scope).ok_or(Rejection::UnboundDependency)?;
        codec.encode_part(value, out, scope)
    }

    fn decode(&self, input: &str, scope: &mut Scope) -> Result<(Value, usize)> {
        let codec = self
            .select(scope)
            .ok_or_else(|| Error::malformed("dependent field decoded before its source"))?;
        codec.decode_part(input, scope)
    }
}

/// Marks the field whose value selects the dependent field's codec.
///
/// Handed to the `build` closure of [`with_calculated_type`].
pub struct Binder {
    owner: usize,
}

impl Binder {
    /// Wrap `inner` so the value it processes becomes the selector's input.
    ///
    /// When encoding, the value is bound before `inner` runs, so a derived
    /// codec nested inside `inner` already sees it. When decoding, the value
    /// only exists once `inner` returns; a derived codec inside `inner` then
    /// finds nothing bound and the call fails.
    pub fn bind(&self, inner: Codec) -> Codec {
        Codec::new(BoundCodec {
            owner: self.owner,
            inner,
        })
    }
}

/// Codec with a dependent field.
///
/// `build` receives a [`Binder`] and the derived codec, and composes them:
/// typically a record whose first field is `binder.bind(tag_codec)` and whose
/// later field is the derived codec. When the derived codec runs it calls
/// `selector` with the most recently bound value and delegates to the codec it
/// returns. The bound field must come before the derived field; if it does
/// not, the call fails.
///
/// ```
/// use squish::{integer_type, object_of, string_type, value, with_calculated_type};
///
/// let codec = with_calculated_type(
///     |kind| match kind.as_str() {
///         Some("int") => integer_type(None),
///         _ => string_type(None),
///     },
///     |binder, derived| {
///         object_of([("kind", binder.bind(string_type(None))), ("value", derived)])
///     },
/// );
/// let v = value!({ "kind": "int", "value": 1234 });
/// assert_eq!(codec.serialize(&v)?, "int$ya");
/// assert_eq!(codec.deserialize("int$ya")?, v);
/// # Ok::<(), squish::Error>(())
/// ```
pub fn with_calculated_type(
    selector: impl Fn(&Value) -> Codec + Send + Sync + 'static,
    build: impl FnOnce(&Binder, Codec) -> Codec,
) -> Codec {
    let owner = NEXT_OWNER.fetch_add(1, Ordering::Relaxed);
    let derived = Codec::new(DerivedCodec {
        owner,
        selector: Arc::new(selector),
    });
    let body = build(&Binder { owner }, derived);
    Codec::new(CalculatedCodec { owner, body })
}
