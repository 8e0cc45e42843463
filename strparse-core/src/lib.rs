//! Serialize value types that know how to parse themselves as plain JSON
//! strings, both as values and as map keys.
//!
//! A type implements [`Parsable`] either by naming a single-string
//! constructor (resolved once per type and cached for the process) or by
//! overriding [`Parsable::try_parse`]. [`StringConverter`] then bridges it to
//! serde; [`impl_string_serde!`] and [`string_enum!`] wire that up.

#[macro_use]
mod macros;

pub mod converter;
pub mod error;
pub mod factory;
pub mod parsable;

pub use converter::{serde_str, StringConverter};
pub use error::{BoxError, ConfigurationError, DocumentFormatError, FormatError, TokenPosition};
pub use factory::{Factory, FactoryState};
pub use parsable::{from_str_constructor, Parsable, StringConstructor};

#[doc(hidden)]
pub mod __private {
    pub use serde;
}
