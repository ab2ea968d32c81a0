#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

#[macro_use]
mod tracing_macros;

#[macro_use]
mod macros;

mod error;
pub use error::{ConfigError, Error, HookError, Rejection, Result};

mod value;
pub use value::{Object, Value, ValueType};

pub mod config;
pub use config::{Config, ConfigOptions, configure};

mod codec;
pub use codec::{Codec, MAX_DEPTH, RawCodec, Scope, create_type};

mod string;
pub use string::string_type;

mod integer;
pub use integer::integer_type;

mod number;
pub use number::number_type;

mod constant;
pub use constant::constant;

mod object;
pub use object::object_of;

mod array;
pub use array::array_of_type;

mod map;
pub use map::map_of;

mod one_of;
pub use one_of::one_of_type;

mod calculated;
pub use calculated::{Binder, with_calculated_type};

mod template;
pub use template::{Template, Token, recursive, template};
