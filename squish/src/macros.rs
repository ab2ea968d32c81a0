/// Build a [`Value`](crate::Value) with JSON-like syntax.
///
/// Object keys are string literals. Nested arrays and objects are written
/// inline; any other element is a single token tree converted with
/// `Value::from`, so compound expressions (negative numbers, calls) need
/// parentheses.
///
/// ```
/// use squish::{Value, value};
///
/// let v = value!({
///     "from": 15,
///     "tags": ["a", null, (-1.5)],
///     "nested": { "ok": true }
/// });
/// assert_eq!(v.as_object().unwrap()["from"], Value::Number(15.0));
/// ```
#[macro_export]
macro_rules! value {
    (null) => {
        $crate::Value::Null
    };
    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Array(::std::vec![ $( $crate::value!($elem) ),* ])
    };
    ({ $($key:literal : $val:tt),* $(,)? }) => {{
        #[allow(unused_mut)]
        let mut object = $crate::Object::new();
        $( object.insert(::std::string::String::from($key), $crate::value!($val)); )*
        $crate::Value::Object(object)
    }};
    ($other:expr) => {
        $crate::Value::from($other)
    };
}
