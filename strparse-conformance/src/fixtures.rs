use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use strparse_core::{impl_string_serde, string_enum, BoxError, Parsable, StringConstructor};

string_enum! {
    /// Length of a rate period.
    pub enum Tenor {
        OneDay => "1D",
        OneWeek => "1W",
        OneMonth => "1M",
        ThreeMonths => "3M",
        OneYear => "1Y",
    }
}

string_enum! {
    /// Scheme a security identifier belongs to.
    pub enum IdentifierType {
        Isin => "Isin",
        Cusip => "Cusip",
        Sedol => "Sedol",
        Figi => "Figi",
    }
}

/// Identifier written as `<id>|<type>`.
///
/// Parsing splits on the last `|`, so the id part may itself contain the
/// delimiter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SecurityIdentifier {
    pub id: String,
    pub id_type: IdentifierType,
}

impl SecurityIdentifier {
    pub fn new(id: impl Into<String>, id_type: IdentifierType) -> Self {
        SecurityIdentifier {
            id: id.into(),
            id_type,
        }
    }
}

impl fmt::Display for SecurityIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.id, self.id_type)
    }
}

impl Parsable for SecurityIdentifier {
    fn try_parse(input: &str) -> Option<Self> {
        let (id, id_type) = input.rsplit_once('|')?;
        if id.trim().is_empty() {
            return None;
        }
        Some(SecurityIdentifier::new(id, IdentifierType::try_parse(id_type)?))
    }
}

impl_string_serde!(SecurityIdentifier);

/// Three-letter ISO 4217 currency code, built by its string constructor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: &str) -> Result<Self, BoxError> {
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(format!("'{code}' is not a three letter upper-case code").into());
        }
        Ok(CurrencyCode(code.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Parsable for CurrencyCode {
    fn string_constructor() -> Option<StringConstructor<Self>> {
        Some(CurrencyCode::new)
    }
}

impl_string_serde!(CurrencyCode);

/// Opts into parsing without a constructor or custom grammar.
#[derive(Debug, Clone, PartialEq)]
pub struct Unconfigured(pub String);

impl fmt::Display for Unconfigured {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Parsable for Unconfigured {}

/// Type a fixture token is decoded as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FixtureTarget {
    Tenor,
    SecurityIdentifier,
    CurrencyCode,
}

/// Position of the token inside the fixture document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FixturePosition {
    Value,
    Key,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentFixture {
    pub name: String,
    pub description: String,
    pub target: FixtureTarget,
    pub position: FixturePosition,
    /// Raw JSON token as it would appear in a document.
    pub token: serde_json::Value,
    /// Canonical string form after a successful read, `None` when the token
    /// must be rejected.
    pub expected: Option<String>,
}

impl DocumentFixture {
    fn accept(name: &str, description: &str, target: FixtureTarget, position: FixturePosition, token: &str, expected: &str) -> Self {
        DocumentFixture {
            name: name.to_string(),
            description: description.to_string(),
            target,
            position,
            token: json!(token),
            expected: Some(expected.to_string()),
        }
    }

    fn reject(name: &str, description: &str, target: FixtureTarget, position: FixturePosition, token: serde_json::Value) -> Self {
        DocumentFixture {
            name: name.to_string(),
            description: description.to_string(),
            target,
            position,
            token,
            expected: None,
        }
    }
}

/// Load the document fixtures used by the conformance runner
pub fn load_fixtures() -> Vec<DocumentFixture> {
    use FixturePosition::{Key, Value};
    use FixtureTarget as T;

    vec![
        DocumentFixture::accept("tenor_value", "Enum-like member read as a value", T::Tenor, Value, "1D", "1D"),
        DocumentFixture::accept("tenor_key", "Enum-like member read as a map key", T::Tenor, Key, "3M", "3M"),
        DocumentFixture::reject("tenor_unknown", "Unknown member text", T::Tenor, Value, json!("2W")),
        DocumentFixture::reject("tenor_case", "Member text is case sensitive", T::Tenor, Value, json!("1d")),
        DocumentFixture::accept(
            "identifier_value",
            "Composite identifier read as a value",
            T::SecurityIdentifier,
            Value,
            "ABC|Isin",
            "ABC|Isin",
        ),
        DocumentFixture::accept(
            "identifier_nested_delimiter",
            "Id part containing the delimiter",
            T::SecurityIdentifier,
            Key,
            "A|B|Cusip",
            "A|B|Cusip",
        ),
        DocumentFixture::reject(
            "identifier_unknown_type",
            "Unrecognized type part",
            T::SecurityIdentifier,
            Value,
            json!("ABC|Unknown"),
        ),
        DocumentFixture::reject("identifier_no_delimiter", "Missing type part", T::SecurityIdentifier, Key, json!("ABC")),
        DocumentFixture::accept("currency_value", "Constructor-backed code", T::CurrencyCode, Value, "USD", "USD"),
        DocumentFixture::accept("currency_key", "Constructor-backed code as a key", T::CurrencyCode, Key, "EUR", "EUR"),
        DocumentFixture::reject("currency_lowercase", "Constructor rejects input", T::CurrencyCode, Value, json!("usd")),
        DocumentFixture::reject("currency_blank", "Blank input", T::CurrencyCode, Value, json!("   ")),
        DocumentFixture::reject("currency_null", "Null token", T::CurrencyCode, Value, serde_json::Value::Null),
        DocumentFixture::reject("currency_number", "Non-string token", T::CurrencyCode, Value, json!(840)),
    ]
}
