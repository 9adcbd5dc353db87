//! Per-mutation optimistic state machine.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CartError;
use crate::ids::ProductId;
use crate::query::{CartQueryCache, DataOrigin};
use crate::wire::CartSnapshot;

/// The three cart mutation flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MutationKind {
    Add,
    Remove,
    UpdateQuantity,
}

impl MutationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationKind::Add => "add",
            MutationKind::Remove => "remove",
            MutationKind::UpdateQuantity => "update-quantity",
        }
    }
}

impl std::fmt::Display for MutationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of one mutation.
///
/// `Idle -> OptimisticallyApplied -> Committed | RolledBack`. A flow that
/// writes nothing optimistically may settle straight from `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MutationPhase {
    Idle,
    OptimisticallyApplied,
    Committed,
    RolledBack,
}

impl MutationPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationPhase::Idle => "idle",
            MutationPhase::OptimisticallyApplied => "optimistically-applied",
            MutationPhase::Committed => "committed",
            MutationPhase::RolledBack => "rolled-back",
        }
    }

    /// Check if the mutation has settled.
    pub fn is_settled(&self) -> bool {
        matches!(self, MutationPhase::Committed | MutationPhase::RolledBack)
    }
}

impl std::fmt::Display for MutationPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a rollback did to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RollbackOutcome {
    /// The pre-mutation snapshot was written back.
    Restored,
    /// Another write landed after ours; the snapshot was not written back.
    Superseded { current_version: u64 },
    /// The cache held no data when the mutation applied.
    NothingToRestore,
}

/// One in-flight cart mutation.
///
/// The pre-mutation snapshot is captured on entry to
/// [`MutationPhase::OptimisticallyApplied`] together with the cache version
/// the optimistic write produced. A rollback restores the snapshot only while
/// that version is still current.
#[derive(Debug, Clone)]
pub struct OptimisticMutation {
    kind: MutationKind,
    product_id: ProductId,
    phase: MutationPhase,
    snapshot: Option<CartSnapshot>,
    applied_version: Option<u64>,
}

impl OptimisticMutation {
    /// Create an idle mutation.
    pub fn new(kind: MutationKind, product_id: ProductId) -> Self {
        Self {
            kind,
            product_id,
            phase: MutationPhase::Idle,
            snapshot: None,
            applied_version: None,
        }
    }

    pub fn kind(&self) -> MutationKind {
        self.kind
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn phase(&self) -> MutationPhase {
        self.phase
    }

    /// Pre-mutation snapshot, once applied.
    pub fn snapshot(&self) -> Option<&CartSnapshot> {
        self.snapshot.as_ref()
    }

    /// Cache version written by the optimistic apply.
    pub fn applied_version(&self) -> Option<u64> {
        self.applied_version
    }

    /// Cancel reads in flight, snapshot the cache and write the edited copy.
    ///
    /// With no data in the cache nothing is written and the later rollback
    /// reports [`RollbackOutcome::NothingToRestore`].
    pub fn apply(
        &mut self,
        cache: &CartQueryCache,
        edit: impl FnOnce(&mut CartSnapshot),
    ) -> Result<(), CartError> {
        self.transition(MutationPhase::OptimisticallyApplied)?;
        cache.cancel_fetches();

        if let Some(before) = cache.data() {
            let mut next = before.clone();
            edit(&mut next);
            let version = cache.overwrite(next, DataOrigin::Optimistic);
            self.snapshot = Some(before);
            self.applied_version = Some(version);
            debug!(kind = %self.kind, product_id = %self.product_id, version, "optimistic write applied");
        }
        Ok(())
    }

    /// The backend accepted the mutation.
    pub fn commit(&mut self) -> Result<(), CartError> {
        self.transition(MutationPhase::Committed)
    }

    /// The backend rejected the mutation; undo the optimistic write.
    pub fn rollback(&mut self, cache: &CartQueryCache) -> Result<RollbackOutcome, CartError> {
        self.transition(MutationPhase::RolledBack)?;

        let (snapshot, version) = match (self.snapshot.take(), self.applied_version) {
            (Some(snapshot), Some(version)) => (snapshot, version),
            _ => return Ok(RollbackOutcome::NothingToRestore),
        };

        if cache.overwrite_if_version(version, snapshot) {
            Ok(RollbackOutcome::Restored)
        } else {
            Ok(RollbackOutcome::Superseded {
                current_version: cache.version(),
            })
        }
    }

    fn transition(&mut self, to: MutationPhase) -> Result<(), CartError> {
        let allowed = matches!(
            (self.phase, to),
            (MutationPhase::Idle, MutationPhase::OptimisticallyApplied)
                | (MutationPhase::Idle, MutationPhase::Committed)
                | (MutationPhase::Idle, MutationPhase::RolledBack)
                | (MutationPhase::OptimisticallyApplied, MutationPhase::Committed)
                | (MutationPhase::OptimisticallyApplied, MutationPhase::RolledBack)
        );
        if !allowed {
            return Err(CartError::InvalidMutationTransition {
                from: self.phase,
                to,
            });
        }
        self.phase = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::wire::CartLine;
    use std::time::Duration;

    fn cache_with_temaki() -> CartQueryCache {
        let cache = CartQueryCache::new(Duration::from_secs(10));
        cache.overwrite(
            CartSnapshot {
                lines: vec![CartLine {
                    id: ProductId::new(1),
                    name: "Temaki".to_string(),
                    image: String::new(),
                    price: Money::from_decimal(40.0),
                    quantity: 2,
                    notes: None,
                }],
                subtotal: Money::from_decimal(40.0),
                total_with_shipping: Money::from_decimal(50.0),
            },
            DataOrigin::Server,
        );
        cache
    }

    // === Transition Tests ===

    #[test]
    fn test_apply_then_commit() {
        let cache = cache_with_temaki();
        let before = cache.data().unwrap();
        let mut mutation = OptimisticMutation::new(MutationKind::Remove, ProductId::new(1));

        mutation
            .apply(&cache, |data| {
                data.remove_line(ProductId::new(1));
            })
            .unwrap();
        assert_eq!(mutation.phase(), MutationPhase::OptimisticallyApplied);
        assert_eq!(mutation.snapshot(), Some(&before));
        assert!(cache.data().unwrap().lines.is_empty());

        mutation.commit().unwrap();
        assert!(mutation.phase().is_settled());
    }

    #[test]
    fn test_invalid_transitions() {
        let cache = cache_with_temaki();
        let mut mutation = OptimisticMutation::new(MutationKind::Remove, ProductId::new(1));
        mutation.apply(&cache, |_| {}).unwrap();

        let err = mutation.apply(&cache, |_| {}).unwrap_err();
        assert!(matches!(
            err,
            CartError::InvalidMutationTransition {
                from: MutationPhase::OptimisticallyApplied,
                to: MutationPhase::OptimisticallyApplied,
            }
        ));

        mutation.commit().unwrap();
        assert!(mutation.rollback(&cache).is_err());
        assert!(mutation.commit().is_err());
    }

    // === Rollback Tests ===

    #[test]
    fn test_rollback_restores_snapshot() {
        let cache = cache_with_temaki();
        let before = cache.data().unwrap();
        let mut mutation = OptimisticMutation::new(MutationKind::UpdateQuantity, ProductId::new(1));

        mutation
            .apply(&cache, |data| {
                data.set_line_quantity(ProductId::new(1), 3, Money::from_decimal(60.0));
            })
            .unwrap();
        assert_eq!(cache.data().unwrap().lines[0].quantity, 3);

        assert_eq!(mutation.rollback(&cache).unwrap(), RollbackOutcome::Restored);
        assert_eq!(cache.data(), Some(before));
        assert_eq!(mutation.phase(), MutationPhase::RolledBack);
    }

    #[test]
    fn test_rollback_superseded_by_later_write() {
        let cache = cache_with_temaki();
        let mut first = OptimisticMutation::new(MutationKind::UpdateQuantity, ProductId::new(1));
        let mut second = OptimisticMutation::new(MutationKind::Remove, ProductId::new(1));

        first
            .apply(&cache, |data| {
                data.set_line_quantity(ProductId::new(1), 3, Money::from_decimal(60.0));
            })
            .unwrap();
        second
            .apply(&cache, |data| {
                data.remove_line(ProductId::new(1));
            })
            .unwrap();

        let outcome = first.rollback(&cache).unwrap();
        assert_eq!(
            outcome,
            RollbackOutcome::Superseded {
                current_version: cache.version()
            }
        );
        assert!(cache.data().unwrap().lines.is_empty());
    }

    #[test]
    fn test_rollback_without_data() {
        let cache = CartQueryCache::new(Duration::from_secs(10));
        let mut mutation = OptimisticMutation::new(MutationKind::Remove, ProductId::new(1));

        mutation.apply(&cache, |_| {}).unwrap();
        assert!(cache.data().is_none());
        assert_eq!(
            mutation.rollback(&cache).unwrap(),
            RollbackOutcome::NothingToRestore
        );
    }

    #[test]
    fn test_apply_cancels_reads() {
        let cache = cache_with_temaki();
        let ticket = cache.begin_fetch().unwrap();
        let mut mutation = OptimisticMutation::new(MutationKind::Remove, ProductId::new(1));

        mutation
            .apply(&cache, |data| {
                data.remove_line(ProductId::new(1));
            })
            .unwrap();

        assert!(!cache.finish_fetch(ticket, Ok(CartSnapshot::empty())));
        assert_eq!(cache.state().origin, Some(DataOrigin::Optimistic));
    }
}
