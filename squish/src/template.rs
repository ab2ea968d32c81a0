//! Deferred resolution for parameterised and self-referential schemas.
//!
//! A [`Template`] does not build its codec when applied. The tokens it was
//! applied to are resolved, and the template's `build` function run, on every
//! encode and decode; a schema that mentions itself is therefore expanded one
//! level at a time and stops wherever the value stops.
//!
//! Every applied template and every pass through a [`recursive`] schema counts
//! as one nesting level of the call, up to [`MAX_DEPTH`](crate::MAX_DEPTH).
//! With the `stacker` feature (on by default) the stack grows as needed below
//! that limit.

use core::fmt;
use std::sync::{Arc, Weak};

use crate::codec::{Codec, RawCodec, Scope};
use crate::error::{Error, Result};
use crate::value::Value;

type Producer = Arc<dyn Fn() -> Codec + Send + Sync>;
type Build = Arc<dyn Fn(&[Codec]) -> Codec + Send + Sync>;

/// An argument to [`Template::apply`].
#[derive(Clone)]
pub enum Token {
    /// A codec known when the template is applied.
    Codec(Codec),
    /// A producer asked for the codec each time the template runs.
    Lazy(Producer),
}

impl Token {
    /// A token resolved by calling `producer` on every use.
    pub fn lazy(producer: impl Fn() -> Codec + Send + Sync + 'static) -> Self {
        Token::Lazy(Arc::new(producer))
    }

    fn resolve(&self) -> Codec {
        match self {
            Token::Codec(codec) => codec.clone(),
            Token::Lazy(producer) => producer(),
        }
    }
}

impl From<Codec> for Token {
    fn from(codec: Codec) -> Self {
        Token::Codec(codec)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Codec(codec) => f.debug_tuple("Codec").field(codec).finish(),
            Token::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

/// A codec constructor whose arguments are resolved at call time.
///
/// Created by [`template`].
#[derive(Clone)]
pub struct Template(Build);

impl Template {
    /// Apply the template to `tokens`.
    pub fn apply<T: Into<Token>>(&self, tokens: impl IntoIterator<Item = T>) -> Codec {
        Codec::new(Applied {
            build: self.0.clone(),
            tokens: tokens.into_iter().map(Into::into).collect(),
        })
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Template(..)")
    }
}

struct Applied {
    build: Build,
    tokens: Vec<Token>,
}

impl Applied {
    fn resolve(&self) -> Codec {
        let args: Vec<Codec> = self.tokens.iter().map(Token::resolve).collect();
        (self.build)(&args)
    }
}

impl RawCodec for Applied {
    fn encode(&self, value: &Value, out: &mut String, scope: &mut Scope) -> Result<()> {
        scope.nested(|scope| self.resolve().encode_part(value, out, scope))
    }

    fn decode(&self, input: &str, scope: &mut Scope) -> Result<(Value, usize)> {
        scope.nested(|scope| self.resolve().decode_part(input, scope))
    }
}

/// Define a codec constructor that runs `build` on every call.
///
/// `build` receives the resolved tokens in the order they were passed to
/// [`Template::apply`].
///
/// ```
/// use squish::{Codec, Value, constant, one_of_type, string_type, template, value};
///
/// let nullable = template(|args: &[Codec]| {
///     one_of_type([constant(Value::Null), args[0].clone()])
/// });
/// let codec = nullable.apply([string_type(None)]);
/// assert_eq!(codec.serialize(&Value::Null)?, "0");
/// assert_eq!(codec.deserialize("1hi")?, value!("hi"));
/// # Ok::<(), squish::Error>(())
/// ```
pub fn template(build: impl Fn(&[Codec]) -> Codec + Send + Sync + 'static) -> Template {
    Template(Arc::new(build))
}

struct Recursive {
    body: Codec,
}

impl RawCodec for Recursive {
    fn encode(&self, value: &Value, out: &mut String, scope: &mut Scope) -> Result<()> {
        scope.nested(|scope| self.body.encode_part(value, out, scope))
    }

    fn decode(&self, input: &str, scope: &mut Scope) -> Result<(Value, usize)> {
        scope.nested(|scope| self.body.decode_part(input, scope))
    }
}

struct SelfRef(Weak<Recursive>);

impl SelfRef {
    fn upgrade(&self) -> Result<Arc<Recursive>> {
        self.0
            .upgrade()
            .ok_or_else(|| Error::malformed("recursive schema used after it was dropped"))
    }
}

impl RawCodec for SelfRef {
    fn encode(&self, value: &Value, out: &mut String, scope: &mut Scope) -> Result<()> {
        self.upgrade()?.encode(value, out, scope)
    }

    fn decode(&self, input: &str, scope: &mut Scope) -> Result<(Value, usize)> {
        self.upgrade()?.decode(input, scope)
    }
}

/// Build a schema that contains itself.
///
/// `build` receives a handle standing for the schema being built and returns
/// the schema. The handle holds no strong reference, so the returned codec
/// owns the whole graph. As with any recursion, `build` must give the value a
/// way out (a null alternative, an empty sequence) or encoding never ends.
///
/// ```
/// use squish::{Value, constant, object_of, one_of_type, recursive, string_type, value};
///
/// let list = recursive(|list| {
///     object_of([
///         ("head", string_type(None)),
///         ("tail", one_of_type([constant(Value::Null), list])),
///     ])
/// });
/// let v = value!({ "head": "a", "tail": { "head": "b", "tail": null } });
/// assert_eq!(list.serialize(&v)?, "a$1b$0");
/// assert_eq!(list.deserialize("a$1b$0")?, v);
/// # Ok::<(), squish::Error>(())
/// ```
pub fn recursive(build: impl FnOnce(Codec) -> Codec) -> Codec {
    let node: Arc<Recursive> = Arc::new_cyclic(|weak| Recursive {
        body: build(Codec::new(SelfRef(weak.clone()))),
    });
    Codec::from_arc(node)
}

#[cfg(test)]
mod tests {
    use core::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::LazyLock;

    use super::*;
    use crate::{MAX_DEPTH, constant, integer_type, object_of, one_of_type, string_type};

    fn nullable() -> Template {
        template(|args| one_of_type([constant(Value::Null), args[0].clone()]))
    }

    fn chain() -> Codec {
        recursive(|node| {
            object_of([
                ("val", integer_type(None)),
                ("obj", nullable().apply([node])),
            ])
        })
    }

    fn chain_value(depth: u64) -> Value {
        (0..depth).rev().fold(Value::Null, |next, n| {
            value!({ "val": n, "obj": next })
        })
    }

    #[test]
    fn recursive_chain_round_trips() {
        squish_testhelpers::setup();
        let codec = chain();
        let v = chain_value(3);
        let text = codec.serialize(&v).unwrap();
        assert_eq!(text, "0$11$12$0");
        assert_eq!(codec.deserialize(&text).unwrap(), v);
    }

    #[test]
    fn thousand_level_chain_round_trips() {
        squish_testhelpers::setup();
        let codec = chain();
        let v = chain_value(1000);
        let text = codec.serialize(&v).unwrap();
        assert_eq!(codec.deserialize(&text).unwrap(), v);
    }

    #[test]
    fn nesting_past_the_limit_is_an_error() {
        squish_testhelpers::setup();
        // two levels per link: the template and the recursive schema
        let text = "0$1".repeat(MAX_DEPTH) + "0$0";
        assert!(matches!(chain().deserialize(&text), Err(Error::TooDeep(_))));
    }

    #[test]
    fn schema_that_never_reaches_a_base_case_fails() {
        squish_testhelpers::setup();
        let endless = recursive(|node| object_of([("next", node)]));
        assert!(matches!(endless.deserialize("abc"), Err(Error::TooDeep(_))));
        assert!(matches!(
            endless.serialize(&value!({ "next": null })),
            Err(Error::Rejected(_))
        ));
    }

    #[test]
    fn a_value_without_base_case_is_rejected() {
        squish_testhelpers::setup();
        let v = value!({ "val": 1, "obj": { "val": 2 } });
        assert!(chain().serialize(&v).unwrap_err().is_rejection());
    }

    #[test]
    fn self_handle_outliving_its_schema_is_malformed() {
        squish_testhelpers::setup();
        let mut escaped = None;
        drop(recursive(|node| {
            escaped = Some(node.clone());
            one_of_type([constant(Value::Null), node])
        }));
        let handle = escaped.unwrap();
        assert!(matches!(
            handle.serialize(&Value::Null),
            Err(Error::Malformed(_))
        ));
    }

    #[test]
    fn lazy_tokens_are_resolved_on_every_call() {
        squish_testhelpers::setup();
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        let codec = nullable().apply([Token::lazy(|| {
            CALLS.fetch_add(1, Ordering::SeqCst);
            string_type(None)
        })]);
        assert_eq!(CALLS.load(Ordering::SeqCst), 0);
        codec.serialize(&value!("x")).unwrap();
        codec.deserialize("1x").unwrap();
        assert_eq!(CALLS.load(Ordering::SeqCst), 2);
    }

    static NODE: LazyLock<Codec> = LazyLock::new(|| {
        object_of([
            ("name", string_type(None)),
            ("child", nullable().apply([Token::lazy(|| NODE.clone())])),
        ])
    });

    #[test]
    fn lazy_token_can_name_its_own_schema() {
        squish_testhelpers::setup();
        let v = value!({ "name": "a", "child": { "name": "b", "child": null } });
        let text = NODE.serialize(&v).unwrap();
        assert_eq!(text, "a$1b$0");
        assert_eq!(NODE.deserialize(&text).unwrap(), v);
    }
}
