use std::collections::HashMap;
use std::fmt;

use proptest::prelude::*;
use strparse_core::{from_str_constructor, impl_string_serde, Parsable, StringConstructor};

/// Account number with a fixed prefix, parsed through `FromStr`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct AccountNumber(u32);

#[derive(Debug, thiserror::Error)]
#[error("account numbers look like ACC-<digits>")]
struct AccountNumberError;

impl std::str::FromStr for AccountNumber {
    type Err = AccountNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("ACC-").ok_or(AccountNumberError)?;
        digits.parse().map(AccountNumber).map_err(|_| AccountNumberError)
    }
}

impl fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ACC-{}", self.0)
    }
}

impl Parsable for AccountNumber {
    fn string_constructor() -> Option<StringConstructor<Self>> {
        Some(from_str_constructor::<Self>())
    }
}

impl_string_serde!(AccountNumber);

/// Free-form label; the only rule is that it is not blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Label(String);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Parsable for Label {
    fn string_constructor() -> Option<StringConstructor<Self>> {
        Some(|input| Ok(Label(input.to_string())))
    }
}

impl_string_serde!(Label);

proptest! {
    #[test]
    fn test_account_number_string_roundtrip(n in any::<u32>()) {
        let account = AccountNumber(n);
        prop_assert_eq!(AccountNumber::parse(&account.format()).unwrap(), account);
    }

    #[test]
    fn test_account_number_document_roundtrip(n in any::<u32>(), balance in any::<i64>()) {
        let account = AccountNumber(n);
        let json = serde_json::to_string(&account).unwrap();
        prop_assert_eq!(json.clone(), format!("\"ACC-{}\"", n));
        prop_assert_eq!(serde_json::from_str::<AccountNumber>(&json).unwrap(), account.clone());

        let mut balances = HashMap::new();
        balances.insert(account, balance);
        let json = serde_json::to_string(&balances).unwrap();
        let back: HashMap<AccountNumber, i64> = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, balances);
    }

    #[test]
    fn test_label_roundtrip(text in "[^\\s]{1}.{0,24}") {
        let label = Label(text);
        prop_assert_eq!(Label::parse(&label.format()).unwrap(), label.clone());

        let json = serde_json::to_string(&label).unwrap();
        prop_assert_eq!(serde_json::from_str::<Label>(&json).unwrap(), label);
    }

    #[test]
    fn test_whitespace_is_always_rejected(blank in "[ \\t\\r\\n\\u{a0}\\u{2003}]{0,8}") {
        prop_assert!(Label::try_parse(&blank).is_none());
        prop_assert!(AccountNumber::try_parse(&blank).is_none());
        prop_assert!(serde_json::from_value::<Label>(serde_json::Value::String(blank)).is_err());
    }

    #[test]
    fn test_garbage_never_panics(input in ".{0,32}") {
        let parsed = AccountNumber::try_parse(&input);
        if let Some(account) = parsed {
            prop_assert_eq!(AccountNumber::parse(&account.format()).unwrap(), account);
        }
    }
}
