//! Conformance checks for string-parsable types and their JSON form

use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use strparse_core::{factory, FactoryState, Parsable, StringConverter};
use tracing::{debug, info, warn};

use crate::config::ConformanceConfig;
use crate::fixtures::{
    load_fixtures, CurrencyCode, DocumentFixture, FixturePosition, FixtureTarget, IdentifierType,
    SecurityIdentifier, Tenor, Unconfigured,
};

#[derive(Debug, thiserror::Error)]
pub enum ConformanceError {
    #[error("Check '{check}' failed: {reason}")]
    CheckFailed { check: String, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConformanceError {
    fn failed(check: &str, reason: impl Into<String>) -> Self {
        ConformanceError::CheckFailed {
            check: check.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result of a single named check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub name: String,
    pub passed: bool,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ConformanceReport {
    pub outcomes: Vec<CheckOutcome>,
}

impl ConformanceReport {
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.outcomes.iter().filter(|o| !o.passed)
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.passed)
    }
}

type Check = Box<dyn FnOnce() -> Result<(), ConformanceError>>;

fn boxed(check: impl FnOnce() -> Result<(), ConformanceError> + 'static) -> Check {
    Box::new(check)
}

fn ensure(check: &str, condition: bool, reason: impl FnOnce() -> String) -> Result<(), ConformanceError> {
    if condition {
        Ok(())
    } else {
        Err(ConformanceError::failed(check, reason()))
    }
}

/// `parse(format(v)) == v` for every sample value
pub fn check_string_roundtrip<T: Parsable>(check: &str, samples: &[T]) -> Result<(), ConformanceError> {
    for sample in samples {
        let text = sample.format();
        let parsed = T::parse(&text).map_err(|e| ConformanceError::failed(check, e.to_string()))?;
        ensure(check, &parsed == sample, || format!("'{text}' parsed as {parsed:?}, expected {sample:?}"))?;
    }
    Ok(())
}

/// Values survive a JSON round trip both as values and as map keys
pub fn check_document_roundtrip<T>(check: &str, samples: &[T]) -> Result<(), ConformanceError>
where
    T: Parsable + Serialize + DeserializeOwned + Ord,
{
    for sample in samples {
        let json = serde_json::to_string(sample)?;
        ensure(check, json == format!("\"{}\"", sample.format()), || {
            format!("{sample:?} serialized as {json}, expected a plain string")
        })?;
        let back: T = serde_json::from_str(&json)?;
        ensure(check, &back == sample, || format!("{json} read back as {back:?}"))?;
    }

    let keyed: BTreeMap<T, usize> = samples.iter().cloned().zip(0..).collect();
    let json = serde_json::to_string(&keyed)?;
    let back: BTreeMap<T, usize> = serde_json::from_str(&json)?;
    ensure(check, back == keyed, || format!("map keys did not survive: {json}"))
}

/// Blank input is rejected whatever the parsing strategy
pub fn check_blank_rejection() -> Result<(), ConformanceError> {
    const CHECK: &str = "blank_rejection";
    for blank in ["", " ", "\t", "\n", "\u{a0}", " \r\n "] {
        ensure(CHECK, Tenor::try_parse(blank).is_none(), || format!("Tenor accepted {blank:?}"))?;
        ensure(CHECK, SecurityIdentifier::try_parse(blank).is_none(), || {
            format!("SecurityIdentifier accepted {blank:?}")
        })?;
        ensure(CHECK, CurrencyCode::try_parse(blank).is_none(), || {
            format!("CurrencyCode accepted {blank:?}")
        })?;
    }
    Ok(())
}

/// Concurrent first use converges on one cached factory
pub fn check_cache_stability() -> Result<(), ConformanceError> {
    const CHECK: &str = "cache_stability";
    let handles: Vec<_> = (0..8)
        .map(|_| thread::spawn(factory::resolve::<CurrencyCode>))
        .collect();

    let mut factories = Vec::with_capacity(handles.len());
    for handle in handles {
        let resolved = handle
            .join()
            .map_err(|_| ConformanceError::failed(CHECK, "resolver thread panicked"))?
            .map_err(|e| ConformanceError::failed(CHECK, e.to_string()))?;
        factories.push(resolved);
    }

    let first = &factories[0];
    ensure(CHECK, factories.iter().all(|f| Arc::ptr_eq(first, f)), || {
        "threads observed different factories".to_string()
    })?;
    ensure(CHECK, factory::state::<CurrencyCode>() == FactoryState::Resolved, || {
        "factory not marked resolved".to_string()
    })?;

    let code = CurrencyCode::try_parse("JPY");
    ensure(CHECK, code.is_some(), || "cached factory rejected JPY".to_string())
}

/// A type with neither grammar nor constructor fails at resolution, every time
pub fn check_configuration_error() -> Result<(), ConformanceError> {
    const CHECK: &str = "configuration_error";

    let first = factory::resolve::<Unconfigured>()
        .err()
        .ok_or_else(|| ConformanceError::failed(CHECK, "resolution unexpectedly succeeded"))?;
    debug!(error = %first, "Resolution failed as expected");

    let again = factory::resolve::<Unconfigured>().err();
    ensure(CHECK, again.as_ref() == Some(&first), || format!("second resolution returned {again:?}"))?;
    ensure(CHECK, factory::state::<Unconfigured>() == FactoryState::Failed, || {
        "failure was not cached".to_string()
    })
}

/// Decode a fixture token and compare with its expectation
pub fn run_fixture(fixture: &DocumentFixture) -> Result<(), ConformanceError> {
    let decoded = match fixture.target {
        FixtureTarget::Tenor => decode::<Tenor>(fixture),
        FixtureTarget::SecurityIdentifier => decode::<SecurityIdentifier>(fixture),
        FixtureTarget::CurrencyCode => decode::<CurrencyCode>(fixture),
    };

    match (&fixture.expected, decoded) {
        (Some(expected), Ok(actual)) if *expected == actual => Ok(()),
        (Some(expected), Ok(actual)) => Err(ConformanceError::failed(
            &fixture.name,
            format!("decoded as '{actual}', expected '{expected}'"),
        )),
        (Some(_), Err(e)) => Err(ConformanceError::failed(&fixture.name, e.to_string())),
        (None, Ok(actual)) => Err(ConformanceError::failed(
            &fixture.name,
            format!("expected rejection, decoded as '{actual}'"),
        )),
        (None, Err(e)) => {
            debug!(fixture = %fixture.name, error = %e, "Rejected as expected");
            Ok(())
        }
    }
}

fn decode<T: Parsable>(fixture: &DocumentFixture) -> Result<String, serde_json::Error> {
    let converter = StringConverter::<T>::new();
    let token = fixture.token.clone();
    let value = match fixture.position {
        FixturePosition::Value => converter.read(token)?,
        FixturePosition::Key => converter.read_as_key(token)?,
    };
    Ok(value.format())
}

/// Run every check and fixture, collecting one outcome per check
pub fn run_all_checks(config: &ConformanceConfig) -> Result<ConformanceReport, ConformanceError> {
    info!("Running string-parsable conformance checks");

    let tenors = Tenor::ALL.to_vec();
    let identifiers = vec![
        SecurityIdentifier::new("ABC", IdentifierType::Isin),
        SecurityIdentifier::new("US0378331005", IdentifierType::Isin),
        SecurityIdentifier::new("A|B", IdentifierType::Cusip),
        SecurityIdentifier::new("0263494", IdentifierType::Sedol),
    ];
    let currencies = ["USD", "EUR", "GBP", "CHF"]
        .iter()
        .map(|code| CurrencyCode::try_parse(code))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| ConformanceError::failed("setup", "sample currency rejected"))?;

    let mut checks: Vec<(String, Check)> = vec![
        ("tenor_string_roundtrip".to_string(), boxed({
            let tenors = tenors.clone();
            move || check_string_roundtrip("tenor_string_roundtrip", &tenors)
        })),
        ("tenor_document_roundtrip".to_string(), boxed(move || {
            check_document_roundtrip("tenor_document_roundtrip", &tenors)
        })),
        ("identifier_string_roundtrip".to_string(), boxed({
            let identifiers = identifiers.clone();
            move || check_string_roundtrip("identifier_string_roundtrip", &identifiers)
        })),
        ("identifier_document_roundtrip".to_string(), boxed(move || {
            check_document_roundtrip("identifier_document_roundtrip", &identifiers)
        })),
        ("currency_document_roundtrip".to_string(), boxed(move || {
            check_document_roundtrip("currency_document_roundtrip", &currencies)
        })),
        ("blank_rejection".to_string(), boxed(check_blank_rejection)),
        ("cache_stability".to_string(), boxed(check_cache_stability)),
        ("configuration_error".to_string(), boxed(check_configuration_error)),
        ("scenario_document_text".to_string(), boxed(check_scenario_text)),
    ];

    for fixture in load_fixtures() {
        let name = format!("fixture:{}", fixture.name);
        checks.push((name, boxed(move || run_fixture(&fixture))));
    }

    let mut report = ConformanceReport::default();
    for (name, check) in checks {
        match check() {
            Ok(()) => {
                debug!(check = %name, "Check passed");
                report.outcomes.push(CheckOutcome { name, passed: true, detail: None });
            }
            Err(e) => {
                warn!(check = %name, error = %e, "Check failed");
                if config.fail_fast {
                    return Err(e);
                }
                report.outcomes.push(CheckOutcome {
                    name,
                    passed: false,
                    detail: Some(e.to_string()),
                });
            }
        }
    }

    info!(
        passed = report.passed(),
        total = report.outcomes.len(),
        "Conformance run complete"
    );
    Ok(report)
}

/// Exact document text for the enum-like and composite scenarios
fn check_scenario_text() -> Result<(), ConformanceError> {
    const CHECK: &str = "scenario_document_text";

    let value = serde_json::to_value(Tenor::OneDay)?;
    ensure(CHECK, value == json!("1D"), || format!("OneDay serialized as {value}"))?;

    let id: SecurityIdentifier = serde_json::from_value(json!("ABC|Isin"))?;
    ensure(CHECK, id.id == "ABC" && id.id_type == IdentifierType::Isin, || format!("read {id:?}"))?;

    let err = serde_json::from_value::<SecurityIdentifier>(json!("ABC|Unknown"))
        .err()
        .ok_or_else(|| ConformanceError::failed(CHECK, "unknown identifier type accepted"))?;
    ensure(CHECK, err.to_string().contains("SecurityIdentifier"), || {
        format!("error does not name the type: {err}")
    })
}
