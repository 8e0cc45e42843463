// Process-wide cache of string constructors, keyed by type.
// Each type is resolved once on first use; the outcome (including a
// configuration failure) is kept for the lifetime of the process.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::{Arc, LazyLock, OnceLock};

use dashmap::DashMap;
use tracing::{debug, trace, warn};

use crate::error::{BoxError, ConfigurationError, FormatError};
use crate::parsable::{Parsable, StringConstructor};

type Resolution = Result<Arc<dyn Any + Send + Sync>, ConfigurationError>;

// One slot per type. The map shard is only locked to find or insert the
// slot; the resolution itself runs on the slot, so a constructor hook may
// resolve or parse other types.
type Slot = Arc<OnceLock<Resolution>>;

static FACTORIES: LazyLock<DashMap<TypeId, Slot>> = LazyLock::new(DashMap::new);

/// Resolution state of a type in the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactoryState {
    Unresolved,
    Resolved,
    Failed,
}

/// Resolved string constructor for `T`.
pub struct Factory<T> {
    type_name: &'static str,
    construct: StringConstructor<T>,
}

impl<T: Parsable> Factory<T> {
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Run the constructor on `input` as-is. Blank input is not filtered here.
    pub fn invoke(&self, input: &str) -> Result<T, BoxError> {
        (self.construct)(input)
    }
}

impl<T> fmt::Debug for Factory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Look up, or resolve and cache, the factory for `T`.
///
/// Concurrent first calls resolve exactly once; every caller receives the same
/// `Arc`. A failed resolution is cached and returned on every later call.
///
/// A `string_constructor` hook may itself resolve or parse other types, but
/// must not resolve its own type.
pub fn resolve<T: Parsable>() -> Result<Arc<Factory<T>>, ConfigurationError> {
    let slot = slot::<T>();
    downcast::<T>(slot.get_or_init(resolve_uncached::<T>))
}

fn slot<T: Parsable>() -> Slot {
    let key = TypeId::of::<T>();
    let existing = FACTORIES.get(&key).map(|entry| Arc::clone(entry.value()));
    match existing {
        Some(slot) => slot,
        None => Arc::clone(FACTORIES.entry(key).or_default().value()),
    }
}

fn resolve_uncached<T: Parsable>() -> Resolution {
    let type_name = std::any::type_name::<T>();
    match T::string_constructor() {
        Some(construct) => {
            debug!(type_name, "Resolved string constructor");
            let factory: Arc<dyn Any + Send + Sync> = Arc::new(Factory { type_name, construct });
            Ok(factory)
        }
        None => {
            let err = ConfigurationError::new::<T>();
            warn!(type_name, error = %err, "No string constructor available");
            Err(err)
        }
    }
}

fn downcast<T: Parsable>(resolution: &Resolution) -> Result<Arc<Factory<T>>, ConfigurationError> {
    match resolution {
        Ok(factory) => Arc::clone(factory)
            .downcast::<Factory<T>>()
            .map_err(|_| ConfigurationError::new::<T>()),
        Err(err) => Err(err.clone()),
    }
}

/// Current cache state for `T`. Does not trigger resolution; a type whose
/// resolution is still running reports `Unresolved`.
pub fn state<T: Parsable>() -> FactoryState {
    let slot = FACTORIES.get(&TypeId::of::<T>()).map(|entry| Arc::clone(entry.value()));
    match slot.as_deref().and_then(OnceLock::get) {
        None => FactoryState::Unresolved,
        Some(Ok(_)) => FactoryState::Resolved,
        Some(Err(_)) => FactoryState::Failed,
    }
}

/// Number of types with a finished resolution, successful or not.
pub fn resolved_count() -> usize {
    FACTORIES
        .iter()
        .filter(|entry| entry.value().get().is_some())
        .count()
}

/// Parse through the cached constructor, returning `None` on any failure.
///
/// Blank input (empty or whitespace only) is rejected before the constructor
/// runs, whatever the constructor would have done with it.
/// The factory is resolved first, so a missing constructor is reported even
/// for blank input.
///
/// # Panics
///
/// Panics if `T` provides no string constructor.
pub fn try_parse<T: Parsable>(input: &str) -> Option<T> {
    construct::<T>(input).ok()
}

/// Parse through the cached constructor. The returned [`FormatError`] carries
/// the constructor's own error as its source when there was one.
///
/// # Panics
///
/// Panics if `T` provides no string constructor.
pub fn parse<T: Parsable>(input: &str) -> Result<T, FormatError> {
    construct::<T>(input)
}

#[allow(clippy::panic)]
fn construct<T: Parsable>(input: &str) -> Result<T, FormatError> {
    let factory = match resolve::<T>() {
        Ok(factory) => factory,
        Err(err) => panic!("{err}"),
    };

    if input.trim().is_empty() {
        trace!(type_name = factory.type_name(), "Rejected blank input");
        return Err(FormatError::new::<T>(input));
    }

    factory.invoke(input).map_err(|cause| {
        debug!(
            type_name = factory.type_name(),
            input,
            error = %cause,
            "String constructor rejected input"
        );
        FormatError::new::<T>(input).with_source(cause)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    static CODE_RESOLUTIONS: AtomicUsize = AtomicUsize::new(0);

    #[derive(Debug, Clone, PartialEq)]
    struct Code(String);

    impl Code {
        fn new(value: &str) -> Result<Self, BoxError> {
            if value.len() != 3 || !value.chars().all(|c| c.is_ascii_uppercase()) {
                return Err(format!("'{value}' is not a three letter code").into());
            }
            Ok(Code(value.to_string()))
        }
    }

    impl fmt::Display for Code {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    impl Parsable for Code {
        fn string_constructor() -> Option<StringConstructor<Self>> {
            CODE_RESOLUTIONS.fetch_add(1, Ordering::SeqCst);
            Some(Code::new)
        }
    }

    /// Accepts anything, including whitespace, when called directly.
    #[derive(Debug, Clone, PartialEq)]
    struct Anything(String);

    impl fmt::Display for Anything {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    impl Parsable for Anything {
        fn string_constructor() -> Option<StringConstructor<Self>> {
            Some(|input| Ok(Anything(input.to_string())))
        }
    }

    static ORPHAN_RESOLUTIONS: AtomicUsize = AtomicUsize::new(0);

    #[derive(Debug, Clone, PartialEq)]
    struct Orphan;

    impl fmt::Display for Orphan {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "orphan")
        }
    }

    impl Parsable for Orphan {
        fn string_constructor() -> Option<StringConstructor<Self>> {
            ORPHAN_RESOLUTIONS.fetch_add(1, Ordering::SeqCst);
            None
        }
    }

    macro_rules! inner_types {
        ($($name:ident),+) => {
            $(
                #[derive(Debug, Clone, PartialEq)]
                struct $name(String);

                impl fmt::Display for $name {
                    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                        write!(f, "{}", self.0)
                    }
                }

                impl Parsable for $name {
                    fn string_constructor() -> Option<StringConstructor<Self>> {
                        Some(|input| Ok($name(input.to_string())))
                    }
                }
            )+

            fn resolve_inner_types() -> bool {
                true $(&& resolve::<$name>().is_ok())+
            }
        };
    }

    inner_types!(
        Inner0, Inner1, Inner2, Inner3, Inner4, Inner5, Inner6, Inner7, Inner8, Inner9,
        Inner10, Inner11, Inner12, Inner13, Inner14, Inner15, Inner16, Inner17, Inner18,
        Inner19, Inner20, Inner21, Inner22, Inner23, Inner24, Inner25, Inner26, Inner27,
        Inner28, Inner29, Inner30, Inner31, Inner32, Inner33, Inner34, Inner35, Inner36,
        Inner37, Inner38, Inner39
    );

    /// Resolves and parses other types from inside its own hook.
    #[derive(Debug, Clone, PartialEq)]
    struct Outer(String);

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    impl Parsable for Outer {
        fn string_constructor() -> Option<StringConstructor<Self>> {
            if !resolve_inner_types() || try_parse::<Code>("USD").is_none() {
                return None;
            }
            Some(|input| Ok(Outer(input.to_string())))
        }
    }

    #[test]
    fn test_parse_through_cache() {
        assert_eq!(try_parse::<Code>("EUR"), Some(Code("EUR".to_string())));
        assert_eq!(try_parse::<Code>("eur"), None);
        assert_eq!(state::<Code>(), FactoryState::Resolved);
    }

    #[test]
    fn test_blank_input_never_reaches_constructor() {
        let factory = resolve::<Anything>().unwrap();
        assert_eq!(factory.invoke("  ").unwrap(), Anything("  ".to_string()));

        assert_eq!(try_parse::<Anything>(""), None);
        assert_eq!(try_parse::<Anything>("   "), None);
        assert_eq!(try_parse::<Anything>("\t\n"), None);
        assert_eq!(try_parse::<Anything>("\u{2003}"), None);
        assert_eq!(try_parse::<Anything>(" x "), Some(Anything(" x ".to_string())));
    }

    #[test]
    fn test_parse_keeps_constructor_error() {
        use std::error::Error as _;

        let err = parse::<Code>("EURO").unwrap_err();
        assert_eq!(err.input, "EURO");
        let source = err.source().expect("constructor error should be kept");
        assert!(source.to_string().contains("three letter code"));

        let err = parse::<Code>(" ").unwrap_err();
        assert!(err.source().is_none());
    }

    #[test]
    fn test_resolution_is_shared() {
        let first = resolve::<Code>().unwrap();
        let second = resolve::<Code>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(first.type_name().ends_with("Code"));
    }

    #[test]
    fn test_concurrent_first_use_resolves_once() {
        let handles: Vec<_> = (0..16)
            .map(|_| thread::spawn(|| resolve::<Code>().unwrap()))
            .collect();

        let factories: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for factory in &factories[1..] {
            assert!(Arc::ptr_eq(&factories[0], factory));
        }
        assert_eq!(CODE_RESOLUTIONS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_hook_may_resolve_other_types() {
        let (tx, rx) = std::sync::mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send(try_parse::<Outer>("x"));
        });

        let parsed = rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .expect("nested resolution should not block");
        assert_eq!(parsed, Some(Outer("x".to_string())));
        assert_eq!(state::<Outer>(), FactoryState::Resolved);
        assert_eq!(state::<Inner39>(), FactoryState::Resolved);
        assert!(resolved_count() >= 42);
    }

    #[test]
    fn test_missing_constructor_fails_once() {
        let first = resolve::<Orphan>().unwrap_err();
        let second = resolve::<Orphan>().unwrap_err();
        assert_eq!(first, second);
        assert_eq!(state::<Orphan>(), FactoryState::Failed);

        let result = panic::catch_unwind(|| try_parse::<Orphan>("orphan"));
        assert!(result.is_err());
        let result = panic::catch_unwind(|| parse::<Orphan>("orphan"));
        assert!(result.is_err());
        let result = panic::catch_unwind(|| try_parse::<Orphan>(""));
        assert!(result.is_err());

        assert_eq!(ORPHAN_RESOLUTIONS.load(Ordering::SeqCst), 1);
        assert!(resolved_count() >= 1);
    }
}
