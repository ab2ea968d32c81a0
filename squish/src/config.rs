//! The process-wide configuration registry.
//!
//! Every codec consults the registry when it is *called*, not when it is
//! built, so reconfiguring changes the behavior of codecs that already exist.
//! Configure once, before any codec is used; two threads working under two
//! different configurations is not supported.
//!
//! Each top-level `serialize`/`deserialize` call takes one snapshot of the
//! registry, so a single call never observes a configuration change halfway.

use std::borrow::Cow;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

use crate::error::{ConfigError, Error, HookError, Result};
use crate::value::Value;

type EscapeFn = Arc<dyn Fn(&str) -> String + Send + Sync>;
type UnescapeFn = Arc<dyn Fn(&str) -> Result<String, HookError> + Send + Sync>;
type IntegerToTextFn = Arc<dyn Fn(u64) -> String + Send + Sync>;
type TextToIntegerFn = Arc<dyn Fn(&str) -> Result<u64, HookError> + Send + Sync>;
type NumberToTextFn = Arc<dyn Fn(f64) -> String + Send + Sync>;
type TextToNumberFn = Arc<dyn Fn(&str) -> Result<f64, HookError> + Send + Sync>;
type EqualsFn = Arc<dyn Fn(&Value, &Value) -> bool + Send + Sync>;

/// Characters `encodeURIComponent` leaves untouched.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const RADIX: u32 = 36;

/// A complete set of codec settings.
#[derive(Clone)]
pub struct Config {
    terminator: char,
    escape: EscapeFn,
    unescape: UnescapeFn,
    integer_to_text: IntegerToTextFn,
    text_to_integer: TextToIntegerFn,
    number_to_text: NumberToTextFn,
    text_to_number: TextToNumberFn,
    equals: EqualsFn,
}

impl Config {
    /// The character that ends variable-length runs.
    pub fn terminator(&self) -> char {
        self.terminator
    }

    /// Escape text so it is safe to embed.
    pub fn escape(&self, text: &str) -> String {
        (self.escape)(text)
    }

    /// Undo [`Config::escape`].
    pub fn unescape(&self, text: &str) -> Result<String> {
        (self.unescape)(text).map_err(Error::Hook)
    }

    /// Render a whole number in the configured radix.
    pub fn integer_to_text(&self, n: u64) -> String {
        (self.integer_to_text)(n)
    }

    /// Parse a whole number in the configured radix.
    pub fn text_to_integer(&self, text: &str) -> Result<u64> {
        (self.text_to_integer)(text).map_err(Error::Hook)
    }

    /// Render any number as text.
    pub fn number_to_text(&self, n: f64) -> String {
        (self.number_to_text)(n)
    }

    /// Parse text produced by [`Config::number_to_text`].
    pub fn text_to_number(&self, text: &str) -> Result<f64> {
        (self.text_to_number)(text).map_err(Error::Hook)
    }

    /// The configured equality predicate.
    pub fn equals(&self, a: &Value, b: &Value) -> bool {
        (self.equals)(a, b)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let terminator = self.terminator;
        if self.escape(&terminator.to_string()).contains(terminator) {
            return Err(ConfigError::UnescapedTerminator(terminator));
        }
        if self.integer_to_text(0).contains(terminator) {
            return Err(ConfigError::TerminatorIsDigit(terminator));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            terminator: '$',
            escape: Arc::new(|text| utf8_percent_encode(text, URI_COMPONENT).to_string()),
            unescape: Arc::new(|text| {
                percent_decode_str(text)
                    .decode_utf8()
                    .map(Cow::into_owned)
                    .map_err(|e| Box::new(e) as HookError)
            }),
            integer_to_text: Arc::new(to_radix),
            text_to_integer: Arc::new(|text| {
                u64::from_str_radix(text, RADIX).map_err(|e| Box::new(e) as HookError)
            }),
            number_to_text: Arc::new(format_number),
            text_to_number: Arc::new(parse_number),
            equals: Arc::new(|a, b| a == b),
        }
    }
}

impl core::fmt::Debug for Config {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Config")
            .field("terminator", &self.terminator)
            .finish_non_exhaustive()
    }
}

fn to_radix(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut buf = Vec::new();
    loop {
        buf.push(DIGITS[(n % RADIX as u64) as usize]);
        n /= RADIX as u64;
        if n == 0 {
            break;
        }
    }
    buf.reverse();
    buf.into_iter().map(char::from).collect()
}

/// Shortest round-trip decimal, exponent form outside `1e-6..1e21`.
fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_owned();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }
    let magnitude = n.abs();
    if magnitude != 0.0 && !(1e-6..1e21).contains(&magnitude) {
        format!("{n:e}")
    } else {
        format!("{n}")
    }
}

fn parse_number(text: &str) -> Result<f64, HookError> {
    match text {
        "NaN" => Ok(f64::NAN),
        "Infinity" => Ok(f64::INFINITY),
        "-Infinity" => Ok(f64::NEG_INFINITY),
        _ => text.parse::<f64>().map_err(|e| Box::new(e) as HookError),
    }
}

/// A partial configuration: unset settings keep their current value.
#[derive(Default)]
pub struct ConfigOptions {
    terminator: Option<char>,
    escape: Option<EscapeFn>,
    unescape: Option<UnescapeFn>,
    integer_to_text: Option<IntegerToTextFn>,
    text_to_integer: Option<TextToIntegerFn>,
    number_to_text: Option<NumberToTextFn>,
    text_to_number: Option<TextToNumberFn>,
    equals: Option<EqualsFn>,
}

impl ConfigOptions {
    /// Options that change nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the terminator character.
    pub fn terminator(mut self, terminator: char) -> Self {
        self.terminator = Some(terminator);
        self
    }

    /// Set the escape function.
    pub fn escape(mut self, f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.escape = Some(Arc::new(f));
        self
    }

    /// Set the unescape function; it must invert `escape`.
    pub fn unescape(
        mut self,
        f: impl Fn(&str) -> Result<String, HookError> + Send + Sync + 'static,
    ) -> Self {
        self.unescape = Some(Arc::new(f));
        self
    }

    /// Set the whole-number-to-text function.
    pub fn integer_to_text(mut self, f: impl Fn(u64) -> String + Send + Sync + 'static) -> Self {
        self.integer_to_text = Some(Arc::new(f));
        self
    }

    /// Set the text-to-whole-number function.
    pub fn text_to_integer(
        mut self,
        f: impl Fn(&str) -> Result<u64, HookError> + Send + Sync + 'static,
    ) -> Self {
        self.text_to_integer = Some(Arc::new(f));
        self
    }

    /// Set the number-to-text function.
    pub fn number_to_text(mut self, f: impl Fn(f64) -> String + Send + Sync + 'static) -> Self {
        self.number_to_text = Some(Arc::new(f));
        self
    }

    /// Set the text-to-number function.
    pub fn text_to_number(
        mut self,
        f: impl Fn(&str) -> Result<f64, HookError> + Send + Sync + 'static,
    ) -> Self {
        self.text_to_number = Some(Arc::new(f));
        self
    }

    /// Set the equality predicate used by `constant`.
    pub fn equals(mut self, f: impl Fn(&Value, &Value) -> bool + Send + Sync + 'static) -> Self {
        self.equals = Some(Arc::new(f));
        self
    }

    fn apply(self, config: &mut Config) {
        if let Some(terminator) = self.terminator {
            config.terminator = terminator;
        }
        if let Some(f) = self.escape {
            config.escape = f;
        }
        if let Some(f) = self.unescape {
            config.unescape = f;
        }
        if let Some(f) = self.integer_to_text {
            config.integer_to_text = f;
        }
        if let Some(f) = self.text_to_integer {
            config.text_to_integer = f;
        }
        if let Some(f) = self.number_to_text {
            config.number_to_text = f;
        }
        if let Some(f) = self.text_to_number {
            config.text_to_number = f;
        }
        if let Some(f) = self.equals {
            config.equals = f;
        }
    }
}

static REGISTRY: LazyLock<RwLock<Arc<Config>>> =
    LazyLock::new(|| RwLock::new(Arc::new(Config::default())));

/// The configuration codecs currently use.
pub fn current() -> Arc<Config> {
    REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Change the global configuration.
///
/// The new configuration is checked first; if it would make encodings
/// ambiguous the registry is left untouched and an error is returned.
pub fn configure(options: ConfigOptions) -> Result<(), ConfigError> {
    let mut registry = REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
    let mut next = Config::clone(&registry);
    options.apply(&mut next);
    next.validate()?;
    debug!(terminator = %next.terminator, "reconfigured codec registry");
    *registry = Arc::new(next);
    Ok(())
}

/// Restore the default configuration.
pub fn reset() {
    *REGISTRY.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(Config::default());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_escape_matches_uri_component() {
        squish_testhelpers::setup();
        let config = Config::default();
        assert_eq!(config.escape("qwer asdf"), "qwer%20asdf");
        assert_eq!(config.escape("a-b_c.d!e~f*g'h(i)j"), "a-b_c.d!e~f*g'h(i)j");
        assert_eq!(config.escape("$"), "%24");
        assert_eq!(config.escape("é"), "%C3%A9");
        assert_eq!(config.unescape("%C3%A9%24").unwrap(), "é$");
    }

    #[test]
    fn malformed_percent_sequence_is_a_hook_error() {
        squish_testhelpers::setup();
        let err = Config::default().unescape("%FF").unwrap_err();
        assert!(matches!(err, Error::Hook(_)));
    }

    #[test]
    fn base36_round_trips() {
        squish_testhelpers::setup();
        let config = Config::default();
        for n in [0, 1, 35, 36, 100, 1234567, u64::MAX] {
            let text = config.integer_to_text(n);
            assert_eq!(config.text_to_integer(&text).unwrap(), n);
        }
        assert_eq!(config.integer_to_text(100), "2s");
        assert_eq!(config.integer_to_text(1234567), "qglj");
        assert!(config.text_to_integer("").is_err());
    }

    #[test]
    fn numbers_use_exponent_only_at_the_extremes() {
        squish_testhelpers::setup();
        let config = Config::default();
        assert_eq!(config.number_to_text(1234567.0), "1234567");
        assert_eq!(config.number_to_text(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(config.number_to_text(-1.2345e67), "-1.2345e67");
        assert_eq!(config.number_to_text(1e-7), "1e-7");
        assert_eq!(config.number_to_text(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(config.text_to_number("-1.2345e67").unwrap(), -1.2345e67);
        assert!(config.text_to_number("NaN").unwrap().is_nan());
    }

    #[test]
    fn default_configuration_is_valid() {
        squish_testhelpers::setup();
        assert_eq!(Config::default().validate(), Ok(()));
    }

    #[test]
    fn terminator_the_escape_keeps_is_refused() {
        squish_testhelpers::setup();
        let mut config = Config::default();
        ConfigOptions::new().terminator('~').apply(&mut config);
        assert_eq!(config.validate(), Err(ConfigError::UnescapedTerminator('~')));

        let mut config = Config::default();
        ConfigOptions::new()
            .terminator('+')
            .escape(|s| s.replace('+', "%2B"))
            .integer_to_text(|_| "+".to_owned())
            .apply(&mut config);
        assert_eq!(config.validate(), Err(ConfigError::TerminatorIsDigit('+')));
    }
}
