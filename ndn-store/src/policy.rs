//! Pluggable content-store eviction policies.
//!
//! Each policy is a hook set invoked by [`crate::store::InMemoryStorage`]
//! around insertion, access, and erasure, the same shape as ndn-cxx's
//! `InMemoryStorage` subclasses (`InMemoryStorageFifo`,
//! `InMemoryStorageLru`, `InMemoryStorageLfu`,
//! `InMemoryStoragePersistent`): the store owns the entries themselves,
//! while a policy only maintains whatever secondary ordering it needs to
//! pick an eviction victim.

use std::collections::{HashMap, VecDeque};

/// Opaque handle a policy uses to refer to a store entry. Stable for the
/// entry's lifetime; never reused while the entry is live.
pub type EntryId = u64;

/// A cache-replacement strategy for [`crate::store::InMemoryStorage`].
pub trait EvictionPolicy {
    /// Called once, right after a new entry is inserted.
    fn after_insert(&mut self, id: EntryId);

    /// Called whenever an entry is read, e.g. by a lookup that returns it
    /// to a matching Interest. Policies that don't care about access
    /// recency (FIFO, Persistent) can leave this a no-op.
    fn after_access(&mut self, _id: EntryId) {}

    /// Called right before an entry is removed, whether by explicit
    /// erasure or as the result of [`EvictionPolicy::evict_item`].
    fn before_erase(&mut self, id: EntryId);

    /// Picks and reports a victim to remove to make room for a new
    /// entry. Returns `None` if there is nothing left to evict (e.g. the
    /// store is empty, or the policy never evicts).
    fn evict_item(&mut self) -> Option<EntryId>;

    /// Whether a full store should grow its capacity (up to the
    /// configured hard limit) rather than evict to make room for a new
    /// entry. [`Persistent`] overrides this to `true`, since it cannot
    /// evict on its own; the bounded policies leave the default `false`
    /// and evict instead.
    fn supports_growth(&self) -> bool {
        false
    }
}

/// Evicts whichever entry was inserted least recently, regardless of how
/// often it has since been read.
#[derive(Debug, Default)]
pub struct Fifo {
    arrival: VecDeque<EntryId>,
}

impl EvictionPolicy for Fifo {
    fn after_insert(&mut self, id: EntryId) {
        self.arrival.push_back(id);
    }

    fn before_erase(&mut self, id: EntryId) {
        self.arrival.retain(|&x| x != id);
    }

    fn evict_item(&mut self) -> Option<EntryId> {
        self.arrival.pop_front()
    }
}

/// Evicts whichever entry was read least recently; an entry that has
/// never been read ranks as if inserted-but-never-touched (i.e. by
/// insertion order, same as FIFO, until its first access).
#[derive(Debug, Default)]
pub struct Lru {
    order: VecDeque<EntryId>,
}

impl EvictionPolicy for Lru {
    fn after_insert(&mut self, id: EntryId) {
        self.order.push_back(id);
    }

    fn after_access(&mut self, id: EntryId) {
        self.order.retain(|&x| x != id);
        self.order.push_back(id);
    }

    fn before_erase(&mut self, id: EntryId) {
        self.order.retain(|&x| x != id);
    }

    fn evict_item(&mut self) -> Option<EntryId> {
        self.order.pop_front()
    }
}

/// Evicts whichever entry has been read least often, counting the
/// insertion itself as zero reads.
#[derive(Debug, Default)]
pub struct Lfu {
    frequency: HashMap<EntryId, u64>,
}

impl EvictionPolicy for Lfu {
    fn after_insert(&mut self, id: EntryId) {
        self.frequency.insert(id, 0);
    }

    fn after_access(&mut self, id: EntryId) {
        *self.frequency.entry(id).or_insert(0) += 1;
    }

    fn before_erase(&mut self, id: EntryId) {
        self.frequency.remove(&id);
    }

    fn evict_item(&mut self) -> Option<EntryId> {
        let victim = self.frequency.iter().min_by_key(|(_, &count)| count).map(|(&id, _)| id)?;
        // Unlike Fifo/Lru's `pop_front`, reading the minimum doesn't
        // remove it on its own; without this the same id keeps winning
        // every subsequent `evict_item` call after it's already gone from
        // the store, so the caller's eviction ends up a no-op.
        self.frequency.remove(&victim);
        Some(victim)
    }
}

/// Never evicts. A store using this policy grows without bound unless
/// the application erases entries itself; [`crate::store::InMemoryStorage::insert`]
/// returns an error rather than silently dropping an entry when at
/// capacity.
#[derive(Debug, Default)]
pub struct Persistent;

impl EvictionPolicy for Persistent {
    fn after_insert(&mut self, _id: EntryId) {}
    fn before_erase(&mut self, _id: EntryId) {}
    fn evict_item(&mut self) -> Option<EntryId> {
        None
    }
    fn supports_growth(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_evicts_oldest_regardless_of_access() {
        let mut p = Fifo::default();
        p.after_insert(1);
        p.after_insert(2);
        p.after_access(1); // FIFO ignores access
        assert_eq!(p.evict_item(), Some(1));
        assert_eq!(p.evict_item(), Some(2));
        assert_eq!(p.evict_item(), None);
    }

    #[test]
    fn lru_promotes_on_access() {
        let mut p = Lru::default();
        p.after_insert(1);
        p.after_insert(2);
        p.after_access(1); // 1 is now most-recently-used
        assert_eq!(p.evict_item(), Some(2));
        assert_eq!(p.evict_item(), Some(1));
    }

    #[test]
    fn lfu_evicts_least_frequently_read() {
        let mut p = Lfu::default();
        p.after_insert(1);
        p.after_insert(2);
        p.after_access(2);
        p.after_access(2);
        assert_eq!(p.evict_item(), Some(1));
    }

    #[test]
    fn lfu_evict_item_does_not_return_the_same_victim_twice() {
        let mut p = Lfu::default();
        p.after_insert(1);
        p.after_insert(2);
        assert_eq!(p.evict_item(), Some(1));
        // 1 is gone; a second call must not hand it back again, and must
        // not hand back nothing just because 1 still looked like the
        // minimum.
        assert_eq!(p.evict_item(), Some(2));
        assert_eq!(p.evict_item(), None);
    }

    #[test]
    fn persistent_never_evicts() {
        let mut p = Persistent;
        p.after_insert(1);
        assert_eq!(p.evict_item(), None);
    }

    #[test]
    fn only_persistent_supports_growth() {
        assert!(!Fifo::default().supports_growth());
        assert!(!Lru::default().supports_growth());
        assert!(!Lfu::default().supports_growth());
        assert!(Persistent.supports_growth());
    }
}
