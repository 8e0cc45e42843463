use std::fmt;
use std::str::FromStr;

use crate::error::{BoxError, FormatError};
use crate::factory::{self, FactoryState};

/// Constructor taking exactly one string argument. An `Err` means the input
/// was rejected by the type.
pub type StringConstructor<T> = fn(&str) -> Result<T, BoxError>;

/// A plain value type that can be parsed from, and formatted to, a string.
///
/// Implementors pick one of two strategies:
///
/// - provide [`Parsable::string_constructor`] and inherit `try_parse`/`parse`,
///   which then go through the process-wide factory cache;
/// - override [`Parsable::try_parse`] with their own grammar.
///
/// A type that does neither fails with a
/// [`ConfigurationError`](crate::ConfigurationError) on first use.
///
/// ```
/// use strparse_core::{from_str_constructor, Parsable, StringConstructor};
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Port(u16);
///
/// impl std::str::FromStr for Port {
///     type Err = std::num::ParseIntError;
///     fn from_str(s: &str) -> Result<Self, Self::Err> {
///         s.parse().map(Port)
///     }
/// }
///
/// impl std::fmt::Display for Port {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
///         write!(f, "{}", self.0)
///     }
/// }
///
/// impl Parsable for Port {
///     fn string_constructor() -> Option<StringConstructor<Self>> {
///         Some(from_str_constructor::<Self>())
///     }
/// }
///
/// assert_eq!(Port::try_parse("8080"), Some(Port(8080)));
/// assert_eq!(Port::try_parse("   "), None);
/// assert!(Port::parse("http").is_err());
/// ```
pub trait Parsable: Sized + Clone + PartialEq + fmt::Display + fmt::Debug + Send + Sync + 'static {
    /// The single-string constructor used by the factory cache.
    fn string_constructor() -> Option<StringConstructor<Self>> {
        None
    }

    /// Parse `input`, returning `None` when it does not describe a value.
    ///
    /// # Panics
    ///
    /// The default implementation panics when the type has no string
    /// constructor. Use [`factory::resolve`] to check this up front.
    fn try_parse(input: &str) -> Option<Self> {
        factory::try_parse::<Self>(input)
    }

    /// Parse `input`, failing with a [`FormatError`] naming the type and input.
    ///
    /// For a constructor-backed type the error is the one from
    /// [`factory::parse`], so the constructor's own error is its source.
    fn parse(input: &str) -> Result<Self, FormatError> {
        if let Some(value) = Self::try_parse(input) {
            return Ok(value);
        }
        let from_factory = match factory::state::<Self>() {
            FactoryState::Resolved => factory::parse::<Self>(input).err(),
            FactoryState::Unresolved | FactoryState::Failed => None,
        };
        Err(from_factory.unwrap_or_else(|| FormatError::new::<Self>(input)))
    }

    /// String form written to documents. Must round-trip through `try_parse`.
    fn format(&self) -> String {
        self.to_string()
    }
}

/// Adapt a [`FromStr`] implementation into a [`StringConstructor`].
pub fn from_str_constructor<T>() -> StringConstructor<T>
where
    T: FromStr,
    T::Err: Into<BoxError>,
{
    |input| input.parse::<T>().map_err(Into::into)
}
