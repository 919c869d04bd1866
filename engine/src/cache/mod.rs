//! Coercion cache - build and reuse per-type field setters
//!
//! For each record type the cache holds one [`CoercionEntry`]: a map from field
//! name to the function that writes that field from a row. Entries are built on
//! first use and never change afterwards.
//!
//! # Concurrency
//!
//! Slots are keyed by `TypeId`. The slot map lock is only held to fetch or
//! insert a slot; the entry itself is built inside the slot's `OnceCell`, so
//! callers racing on the same new type build it once while other types build
//! in parallel. No lock is held while a coercion function runs.

use once_cell::sync::OnceCell;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::{EngineError, EngineResult, MappingResult};
use crate::logs::{log_error, log_info};
use crate::mapping::{Branch, Leaf, MappingNode};
use crate::reflect::Record;

/// Writes a scalar field from a row and a leaf.
pub(crate) type LeafFn<R> = Arc<dyn Fn(&[String], &mut R, &Leaf) -> MappingResult<()> + Send + Sync>;

/// Writes a nested record field from a row and a branch.
pub(crate) type BranchFn<R> =
    Arc<dyn Fn(&CoercionCache, &[String], &mut R, &Branch) -> MappingResult<()> + Send + Sync>;

/// Validates a branch's children against the nested record type.
pub(crate) type CheckFn = fn(&CoercionCache, &[MappingNode]) -> MappingResult<()>;

/// Builds the nested record type's entry.
pub(crate) type PrepareFn = fn(&CoercionCache) -> EngineResult<()>;

/// Coercion function for one field.
pub(crate) enum Coercer<R> {
    Scalar(LeafFn<R>),
    Nested {
        write: BranchFn<R>,
        check: CheckFn,
        prepare: PrepareFn,
    },
}

/// Field name to coercion function, for record type `R`.
pub struct CoercionEntry<R> {
    record: &'static str,
    coercers: HashMap<&'static str, Coercer<R>>,
}

impl<R> CoercionEntry<R> {
    /// Record type name.
    pub fn record(&self) -> &'static str {
        self.record
    }

    /// Whether a field with this name is coercible.
    pub fn contains(&self, field: &str) -> bool {
        self.coercers.contains_key(field)
    }

    /// Number of coercible fields.
    pub fn len(&self) -> usize {
        self.coercers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coercers.is_empty()
    }

    pub(crate) fn coercer(&self, field: &str) -> Option<&Coercer<R>> {
        self.coercers.get(field)
    }
}

type Built = EngineResult<Arc<dyn Any + Send + Sync>>;
type Slot = Arc<OnceCell<Built>>;

/// Cache of coercion entries, one per record type.
///
/// Pass it by reference to [`fill`](CoercionCache::fill) and
/// [`check`](CoercionCache::check); share it across threads with `Arc`.
pub struct CoercionCache {
    slots: RwLock<HashMap<TypeId, Slot>>,
    builds: AtomicUsize,
}

impl CoercionCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            builds: AtomicUsize::new(0),
        }
    }

    /// Get the entry for `R`, building it (and every nested record type's
    /// entry) on first request.
    ///
    /// Build failures are cached: a type that failed once fails the same way
    /// on every later call.
    pub fn entry<R: Record>(&self) -> EngineResult<Arc<CoercionEntry<R>>> {
        let slot = self.slot(TypeId::of::<R>());
        let built = slot.get_or_init(|| {
            self.builds.fetch_add(1, Ordering::SeqCst);
            match self.build::<R>() {
                Ok(entry) => {
                    log_info(format!(
                        "Built coercion entry for {} ({} fields)",
                        R::NAME,
                        entry.len()
                    ));
                    Ok(Arc::new(entry) as Arc<dyn Any + Send + Sync>)
                }
                Err(err) => {
                    log_error(format!("Cannot build coercion entry: {}", err));
                    Err(err)
                }
            }
        });

        match built {
            Ok(any) => Arc::clone(any)
                .downcast::<CoercionEntry<R>>()
                .map_err(|_| EngineError::SlotMismatch(R::NAME)),
            Err(err) => Err(err.clone()),
        }
    }

    fn slot(&self, id: TypeId) -> Slot {
        if let Some(slot) = self
            .slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
        {
            return Arc::clone(slot);
        }

        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(id).or_default())
    }

    fn build<R: Record>(&self) -> EngineResult<CoercionEntry<R>> {
        let mut coercers = HashMap::new();

        for field in R::fields() {
            let coercer = field
                .coercer
                .ok_or_else(|| EngineError::UnsupportedFieldKind {
                    record: R::NAME,
                    field: field.name,
                    kind: field.shape.describe(),
                })?;

            if let Coercer::Nested { prepare, .. } = &coercer {
                prepare(self)?;
            }

            if coercers.insert(field.name, coercer).is_some() {
                return Err(EngineError::DuplicateField {
                    record: R::NAME,
                    field: field.name,
                });
            }
        }

        Ok(CoercionEntry {
            record: R::NAME,
            coercers,
        })
    }

    /// Number of entries built so far, successful or not.
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    /// Whether `R` already has an entry (or a cached build failure).
    pub fn is_cached<R: Record>(&self) -> bool {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&TypeId::of::<R>())
            .is_some_and(|slot| slot.get().is_some())
    }
}

impl Default for CoercionCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::{example_mapping, Customer, SubCustomer, Subs};

    #[derive(Debug, Default)]
    struct Tagged {
        label: String,
        tags: Vec<String>,
    }

    crate::impl_record!(Tagged { label, tags });

    #[derive(Debug, Default)]
    struct HoldsTagged {
        inner: Tagged,
    }

    crate::impl_record!(HoldsTagged { inner });

    #[derive(Debug, Default)]
    struct Clash {
        first: String,
        second: i64,
    }

    crate::impl_record!(Clash {
        first => "Value",
        second => "Value",
    });

    #[test]
    fn test_entry_builds_nested_types() {
        let cache = CoercionCache::new();
        let entry = cache.entry::<Customer>().unwrap();

        assert_eq!(entry.record(), "Customer");
        assert_eq!(entry.len(), 5);
        assert!(entry.contains("Join"));
        assert!(!entry.contains("Website"));
        assert!(cache.is_cached::<SubCustomer>());
        assert!(cache.is_cached::<Subs>());
        assert_eq!(cache.builds(), 3);
    }

    #[test]
    fn test_entry_is_reused() {
        let cache = CoercionCache::new();
        let first = cache.entry::<Subs>().unwrap();
        let second = cache.entry::<Subs>().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.builds(), 1);
    }

    #[test]
    fn test_unsupported_kind_fails_at_build() {
        let cache = CoercionCache::new();
        let err = cache.entry::<Tagged>().err().unwrap();
        assert_eq!(
            err,
            EngineError::UnsupportedFieldKind {
                record: "Tagged",
                field: "tags",
                kind: "array of String".into(),
            }
        );

        // Cached: same failure, no rebuild
        assert_eq!(cache.entry::<Tagged>().err(), Some(err));
        assert_eq!(cache.builds(), 1);
    }

    #[test]
    fn test_nested_failure_propagates_to_parent() {
        let cache = CoercionCache::new();
        let err = cache.entry::<HoldsTagged>().err().unwrap();
        assert!(matches!(
            err,
            EngineError::UnsupportedFieldKind { record: "Tagged", .. }
        ));
    }

    #[test]
    fn test_duplicate_field_names_rejected() {
        let cache = CoercionCache::new();
        assert_eq!(
            cache.entry::<Clash>().err(),
            Some(EngineError::DuplicateField {
                record: "Clash",
                field: "Value",
            })
        );
    }

    #[test]
    fn test_concurrent_first_fill_builds_once() {
        let cache = CoercionCache::new();
        let mapping = example_mapping();
        let row: Vec<String> = [
            "2011-04-11",
            "Clementine",
            "8305025573",
            "person",
            "abc.com",
            "10000.53",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..50 {
                        let mut customer = Customer::default();
                        cache.fill(&row, &mapping, &mut customer).unwrap();
                        assert_eq!(customer.sub.sub.website, "abc.com");
                    }
                });
            }
        });

        assert_eq!(cache.builds(), 3);
        assert!(cache.is_cached::<Subs>());
    }
}
