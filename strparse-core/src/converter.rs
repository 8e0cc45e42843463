use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, Deserializer, Visitor};
use serde::Serializer;
use tracing::trace;

use crate::error::{DocumentFormatError, TokenPosition};
use crate::parsable::Parsable;

/// Bridges a [`Parsable`] type to serde as a JSON string.
///
/// Stateless and zero-sized; one instance can be shared freely across calls
/// and threads. The converter only ever calls `T::try_parse` and
/// `T::format`, so it works the same whether `T` parses itself or goes
/// through the factory cache.
pub struct StringConverter<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> StringConverter<T> {
    pub const fn new() -> Self {
        StringConverter {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for StringConverter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for StringConverter<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for StringConverter<T> {}

impl<T> fmt::Debug for StringConverter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringConverter")
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T: Parsable> StringConverter<T> {
    /// Read a value-position token. `null` and strings rejected by
    /// `T::try_parse` fail with a [`DocumentFormatError`].
    pub fn read<'de, D>(&self, deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_option(TokenVisitor::<T>::new(TokenPosition::Value))
    }

    /// Read a map-key token. Same grammar as [`StringConverter::read`].
    ///
    /// serde deserializes map keys through the key type's ordinary
    /// `Deserialize` impl, so types wired up with `impl_string_serde!` reach
    /// [`StringConverter::read`] for keys too, and a rejected key is reported
    /// as a value. Call this directly when the caller knows it holds a key.
    pub fn read_as_key<'de, D>(&self, deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(TokenVisitor::<T>::new(TokenPosition::Key))
    }

    pub fn write<S>(&self, value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format())
    }

    pub fn write_as_key<S>(&self, value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format())
    }

    /// Parse a token that has already been pulled out of a document.
    pub fn convert(&self, token: Option<&str>, position: TokenPosition) -> Result<T, DocumentFormatError> {
        let token = token.ok_or_else(|| DocumentFormatError::missing::<T>(position))?;
        T::try_parse(token).ok_or_else(|| {
            trace!(type_name = std::any::type_name::<T>(), token, %position, "Rejected token");
            DocumentFormatError::invalid::<T>(token, position)
        })
    }
}

struct TokenVisitor<T> {
    position: TokenPosition,
    _marker: PhantomData<fn() -> T>,
}

impl<T> TokenVisitor<T> {
    fn new(position: TokenPosition) -> Self {
        TokenVisitor {
            position,
            _marker: PhantomData,
        }
    }
}

impl<'de, T: Parsable> Visitor<'de> for TokenVisitor<T> {
    type Value = T;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(
            formatter,
            "a string {} representing {}",
            self.position,
            std::any::type_name::<T>()
        )
    }

    fn visit_str<E>(self, v: &str) -> Result<T, E>
    where
        E: de::Error,
    {
        StringConverter::<T>::new()
            .convert(Some(v), self.position)
            .map_err(E::custom)
    }

    fn visit_none<E>(self) -> Result<T, E>
    where
        E: de::Error,
    {
        Err(E::custom(DocumentFormatError::missing::<T>(self.position)))
    }

    fn visit_unit<E>(self) -> Result<T, E>
    where
        E: de::Error,
    {
        self.visit_none()
    }

    fn visit_some<D>(self, deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(self)
    }
}

/// Field adapter for `#[serde(with = "strparse_core::serde_str")]`.
pub mod serde_str {
    use super::*;

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Parsable,
        S: Serializer,
    {
        StringConverter::<T>::new().write(value, serializer)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: Parsable,
        D: Deserializer<'de>,
    {
        StringConverter::<T>::new().read(deserializer)
    }

    /// Same as the parent module for `Option<T>` fields; `null` is `None`.
    pub mod option {
        use super::*;

        pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
        where
            T: Parsable,
            S: Serializer,
        {
            match value {
                Some(value) => serializer.serialize_some(&value.format()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
        where
            T: Parsable,
            D: Deserializer<'de>,
        {
            deserializer.deserialize_option(OptionalVisitor::<T>(PhantomData))
        }

        struct OptionalVisitor<T>(PhantomData<fn() -> T>);

        impl<'de, T: Parsable> Visitor<'de> for OptionalVisitor<T> {
            type Value = Option<T>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                write!(formatter, "null or a string representing {}", std::any::type_name::<T>())
            }

            fn visit_none<E>(self) -> Result<Option<T>, E>
            where
                E: de::Error,
            {
                Ok(None)
            }

            fn visit_unit<E>(self) -> Result<Option<T>, E>
            where
                E: de::Error,
            {
                Ok(None)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Option<T>, D::Error>
            where
                D: Deserializer<'de>,
            {
                StringConverter::<T>::new().read(deserializer).map(Some)
            }
        }
    }
}
