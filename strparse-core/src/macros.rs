/// Implement `Serialize` and `Deserialize` for one or more [`Parsable`]
/// types by routing them through [`StringConverter`].
///
/// The resulting types serialize as JSON strings and can be used as map keys.
/// Keys go through the same value path, so a rejected key is reported as an
/// invalid value.
///
/// [`Parsable`]: crate::Parsable
/// [`StringConverter`]: crate::StringConverter
#[macro_export]
macro_rules! impl_string_serde {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::__private::serde::Serialize for $ty {
                fn serialize<S>(&self, serializer: S) -> ::core::result::Result<S::Ok, S::Error>
                where
                    S: $crate::__private::serde::Serializer,
                {
                    $crate::StringConverter::<$ty>::new().write(self, serializer)
                }
            }

            impl<'de> $crate::__private::serde::Deserialize<'de> for $ty {
                fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
                where
                    D: $crate::__private::serde::Deserializer<'de>,
                {
                    $crate::StringConverter::<$ty>::new().read(deserializer)
                }
            }
        )+
    };
}

/// Declare an enum-like wrapper whose members map to fixed strings.
///
/// ```
/// strparse_core::string_enum! {
///     /// Tenor of a rate.
///     pub enum Tenor {
///         OneDay => "1D",
///         OneWeek => "1W",
///     }
/// }
///
/// use strparse_core::Parsable;
///
/// assert_eq!(Tenor::OneDay.format(), "1D");
/// assert_eq!(Tenor::parse("1W").unwrap(), Tenor::OneWeek);
/// assert_eq!(serde_json::to_string(&Tenor::OneDay).unwrap(), "\"1D\"");
/// ```
#[macro_export]
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $text:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub const fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::FormatError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                <$name as $crate::Parsable>::parse(s)
            }
        }

        impl $crate::Parsable for $name {
            fn try_parse(input: &str) -> ::core::option::Option<Self> {
                if input.trim().is_empty() {
                    return ::core::option::Option::None;
                }
                match input {
                    $($text => ::core::option::Option::Some($name::$variant),)+
                    _ => ::core::option::Option::None,
                }
            }
        }

        $crate::impl_string_serde!($name);
    };
}
