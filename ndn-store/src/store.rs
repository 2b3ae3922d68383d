//! `InMemoryStorage`: a content store indexed by full name, with
//! capacity enforcement delegated to a pluggable [`crate::policy::EvictionPolicy`].

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use ndn_core::{Data, Interest, Name};

use crate::error::{Result, StoreError};
use crate::policy::{EntryId, EvictionPolicy};

struct Entry {
    data: Data,
    full_name: Name,
    inserted_at: Instant,
    fresh_until: Instant,
    access_count: u64,
    last_access: Instant,
}

/// An in-memory Data cache keyed by full name (name plus implicit
/// digest), with a bounded capacity enforced by an [`EvictionPolicy`].
///
/// Lookups against an `Interest` scan the `full_name`-ordered index
/// starting at the Interest's name, which both bounds the scan to
/// plausible matches and gives a natural leftmost/rightmost ordering for
/// `ChildSelector`.
pub struct InMemoryStorage<P: EvictionPolicy> {
    entries: HashMap<EntryId, Entry>,
    by_full_name: BTreeMap<Name, EntryId>,
    next_id: EntryId,
    capacity: usize,
    hard_limit: usize,
    policy: P,
}

impl<P: EvictionPolicy> InMemoryStorage<P> {
    pub fn new(capacity: usize, policy: P) -> Self {
        Self::with_hard_limit(capacity, capacity, policy)
    }

    /// Like [`InMemoryStorage::new`], but lets the store's capacity grow
    /// past `capacity` (doubling each time it fills) up to `hard_limit`
    /// for policies that report [`EvictionPolicy::supports_growth`].
    /// Policies that evict instead of growing ignore `hard_limit`.
    pub fn with_hard_limit(capacity: usize, hard_limit: usize, policy: P) -> Self {
        Self {
            entries: HashMap::new(),
            by_full_name: BTreeMap::new(),
            next_id: 0,
            capacity,
            hard_limit: hard_limit.max(capacity),
            policy,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Changes the capacity, evicting entries immediately if the new
    /// capacity is smaller than the current size.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.hard_limit = self.hard_limit.max(capacity);
        while self.entries.len() > self.capacity {
            if !self.evict_one() {
                break;
            }
        }
    }

    /// Inserts `data` with an unbounded freshness window, computing its
    /// full name (requires `data` to have already been [`Data::encode`]d).
    pub fn insert(&mut self, data: Data) -> Result<EntryId> {
        self.insert_with_freshness(data, None)
    }

    /// Inserts `data`, marking it fresh until `now + min(fresh_window,
    /// data.freshness_period)` (§4.5), or indefinitely bounded by just
    /// `data.freshness_period` if `fresh_window` is `None`. A Data with no
    /// `FreshnessPeriod` (or one of zero) is therefore never fresh,
    /// regardless of `fresh_window`. If the store is at capacity, a
    /// policy that reports [`EvictionPolicy::supports_growth`] doubles
    /// the capacity (up to the configured hard limit) instead of
    /// evicting; otherwise the eviction policy is asked for a victim, and
    /// the insert is refused if it can't free a slot.
    pub fn insert_with_freshness(&mut self, data: Data, fresh_window: Option<Duration>) -> Result<EntryId> {
        let full_name = data.full_name()?;
        if self.entries.len() >= self.capacity {
            if self.policy.supports_growth() && self.capacity < self.hard_limit {
                self.capacity = (self.capacity.max(1) * 2).min(self.hard_limit);
            } else if !self.evict_one() {
                return Err(StoreError::AtCapacity(self.capacity));
            }
        }
        let now = Instant::now();
        let declared_freshness = Duration::from_millis(data.meta_info().freshness_period.unwrap_or(0));
        let fresh_window = match fresh_window {
            Some(window) => window.min(declared_freshness),
            None => declared_freshness,
        };
        let id = self.next_id;
        self.next_id += 1;
        self.by_full_name.insert(full_name.clone(), id);
        self.entries.insert(
            id,
            Entry {
                data,
                full_name,
                inserted_at: now,
                fresh_until: now + fresh_window,
                access_count: 0,
                last_access: now,
            },
        );
        self.policy.after_insert(id);
        Ok(id)
    }

    fn evict_one(&mut self) -> bool {
        let Some(victim) = self.policy.evict_item() else { return false };
        self.remove_entry(victim);
        true
    }

    fn remove_entry(&mut self, id: EntryId) {
        if let Some(entry) = self.entries.remove(&id) {
            self.by_full_name.remove(&entry.full_name);
        }
    }

    /// Removes the entry named exactly `name` (`is_prefix = false`), or
    /// every entry whose full name starts with `name` (`is_prefix =
    /// true`). Returns the number of entries removed.
    pub fn erase(&mut self, name: &Name, is_prefix: bool) -> usize {
        let victims: Vec<EntryId> = if is_prefix {
            self.by_full_name
                .range(name.clone()..)
                .take_while(|(full_name, _)| name.is_prefix_of(full_name))
                .map(|(_, &id)| id)
                .collect()
        } else {
            self.by_full_name.get(name).copied().into_iter().collect()
        };
        for id in &victims {
            self.policy.before_erase(*id);
            self.remove_entry(*id);
        }
        victims.len()
    }

    /// Exact lookup by full name (name plus implicit digest), bypassing
    /// Interest-selector matching.
    pub fn find_by_name(&mut self, full_name: &Name) -> Option<&Data> {
        let &id = self.by_full_name.get(full_name)?;
        self.touch(id);
        self.entries.get(&id).map(|e| &e.data)
    }

    /// Looks up `name`, returning an exact match if present, and
    /// otherwise the leftmost entry under `name` as a prefix.
    pub fn find(&mut self, name: &Name) -> Option<&Data> {
        if let Some(&id) = self.by_full_name.get(name) {
            self.touch(id);
            return self.entries.get(&id).map(|e| &e.data);
        }
        let id = *self
            .by_full_name
            .range(name.clone()..)
            .take_while(|(full_name, _)| name.is_prefix_of(full_name))
            .map(|(_, id)| id)
            .next()?;
        self.touch(id);
        self.entries.get(&id).map(|e| &e.data)
    }

    fn touch(&mut self, id: EntryId) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.access_count += 1;
            entry.last_access = Instant::now();
        }
        self.policy.after_access(id);
    }

    /// Finds the best Data satisfying `interest`, honoring
    /// `MustBeFresh`/suffix-length/`Exclude` selectors and the
    /// `ChildSelector`'s leftmost/rightmost preference among the
    /// remaining candidates.
    ///
    /// An Interest naming a full name exactly (i.e. including the
    /// implicit digest) bypasses the freshness check even if the entry
    /// has since gone stale, matching ndn-cxx's `InMemoryStorageEntry`
    /// contract: an exact full-name match is assumed to come from a
    /// forwarder that already decided it wants that specific Data.
    ///
    /// Candidates are found by a full scan rather than a prefix-bounded
    /// index range: `Name`'s canonical order places a name's children
    /// immediately after it, but an Interest naming the full name plus an
    /// implicit digest breaks that adjacency, so a range scan would need
    /// to special-case it. A store sized for demonstration and testing
    /// does not need the range optimization to be correct.
    pub fn find_matching(&mut self, interest: &Interest) -> Option<&Data> {
        let rightmost = matches!(
            interest.selectors().and_then(|s| s.child_selector),
            Some(ndn_core::packet::ChildSelector::Rightmost)
        );
        let must_be_fresh = interest.must_be_fresh();
        let now = Instant::now();

        let matching = self.by_full_name.iter().filter_map(|(name, &id)| {
            let entry = self.entries.get(&id)?;
            if !interest.matches_data(&entry.data) {
                return None;
            }
            if must_be_fresh {
                let exact_full_name_match = name == &entry.full_name && interest.name() == &entry.full_name;
                let stale = now >= entry.fresh_until;
                if stale && !exact_full_name_match {
                    return None;
                }
            }
            Some((name, id))
        });

        let chosen = if rightmost { matching.max_by_key(|(name, _)| (*name).clone()) } else { matching.min_by_key(|(name, _)| (*name).clone()) };
        let id = chosen.map(|(_, id)| id)?;
        self.touch(id);
        self.entries.get(&id).map(|e| &e.data)
    }

    /// How many times the entry named `full_name` has been read, or
    /// `None` if no such entry exists.
    pub fn access_count(&self, full_name: &Name) -> Option<u64> {
        let &id = self.by_full_name.get(full_name)?;
        self.entries.get(&id).map(|e| e.access_count)
    }

    /// How long the entry named `full_name` has been in the store.
    pub fn age(&self, full_name: &Name) -> Option<Duration> {
        let &id = self.by_full_name.get(full_name)?;
        self.entries.get(&id).map(|e| e.inserted_at.elapsed())
    }

    pub fn entries(&self) -> impl Iterator<Item = &Data> {
        self.entries.values().map(|e| &e.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{Fifo, Lru, Persistent};
    use ndn_core::packet::{ChildSelector, Selectors};
    use ndn_core::ContentType;
    use bytes::Bytes;

    fn make_data(uri: &str, content: &[u8]) -> Data {
        let mut data = Data::new(Name::from_uri(uri).unwrap());
        data.set_content(Bytes::copy_from_slice(content));
        data.set_content_type(ContentType::Blob);
        data.sign_digest_sha256().unwrap();
        data.encode().unwrap();
        data
    }

    fn make_data_with_freshness(uri: &str, content: &[u8], freshness_ms: u64) -> Data {
        let mut data = Data::new(Name::from_uri(uri).unwrap());
        data.set_content(Bytes::copy_from_slice(content));
        data.set_content_type(ContentType::Blob);
        data.set_freshness_period(freshness_ms);
        data.sign_digest_sha256().unwrap();
        data.encode().unwrap();
        data
    }

    #[test]
    fn insert_and_find_by_name() {
        let mut store = InMemoryStorage::new(4, Fifo::default());
        let data = make_data("/a/b", b"hello");
        let full_name = data.full_name().unwrap();
        store.insert(data).unwrap();
        assert!(store.find_by_name(&full_name).is_some());
    }

    #[test]
    fn capacity_is_enforced_by_eviction() {
        let mut store = InMemoryStorage::new(2, Fifo::default());
        store.insert(make_data("/a/1", b"1")).unwrap();
        store.insert(make_data("/a/2", b"2")).unwrap();
        assert_eq!(store.len(), 2);
        store.insert(make_data("/a/3", b"3")).unwrap();
        assert_eq!(store.len(), 2);
        // /a/1 was the oldest under FIFO and should be gone
        let first_full_name = make_data("/a/1", b"1").full_name().unwrap();
        assert!(store.find_by_name(&first_full_name).is_none());
    }

    #[test]
    fn lru_keeps_recently_read_entries() {
        let mut store = InMemoryStorage::new(2, Lru::default());
        let d1 = make_data("/a/1", b"1");
        let full1 = d1.full_name().unwrap();
        store.insert(d1).unwrap();
        store.insert(make_data("/a/2", b"2")).unwrap();
        // touch /a/1 so it becomes most-recently-used
        store.find_by_name(&full1);
        store.insert(make_data("/a/3", b"3")).unwrap();
        assert!(store.find_by_name(&full1).is_some());
        let full2 = make_data("/a/2", b"2").full_name().unwrap();
        assert!(store.find_by_name(&full2).is_none());
    }

    #[test]
    fn find_respects_must_be_fresh() {
        let mut store = InMemoryStorage::new(4, Fifo::default());
        store.insert_with_freshness(make_data("/a/b", b"stale"), Some(Duration::from_secs(0))).unwrap();

        let mut interest = Interest::new(Name::from_uri("/a/b").unwrap());
        interest.set_selectors(Selectors { must_be_fresh: true, ..Default::default() });
        assert!(store.find_matching(&interest).is_none());
    }

    #[test]
    fn zero_or_absent_freshness_period_is_never_fresh_even_with_an_unbounded_window() {
        let mut store = InMemoryStorage::new(4, Fifo::default());
        // `insert` passes an unbounded (`None`) fresh_window; a Data that
        // declares no FreshnessPeriod of its own must still never satisfy
        // MustBeFresh (spec §4.5.1 rule 3).
        store.insert(make_data("/a/b", b"no-freshness-declared")).unwrap();

        let mut interest = Interest::new(Name::from_uri("/a/b").unwrap());
        interest.set_selectors(Selectors { must_be_fresh: true, ..Default::default() });
        assert!(store.find_matching(&interest).is_none());
    }

    #[test]
    fn fresh_until_is_bounded_by_the_data_s_own_freshness_period() {
        let mut store = InMemoryStorage::new(4, Fifo::default());
        // fresh_window requests an hour, but the Data only claims 1ms of
        // freshness; fresh_until must take the smaller of the two.
        store
            .insert_with_freshness(
                make_data_with_freshness("/a/b", b"barely-fresh", 1),
                Some(Duration::from_secs(3600)),
            )
            .unwrap();
        std::thread::sleep(Duration::from_millis(20));

        let mut interest = Interest::new(Name::from_uri("/a/b").unwrap());
        interest.set_selectors(Selectors { must_be_fresh: true, ..Default::default() });
        assert!(store.find_matching(&interest).is_none());
    }

    #[test]
    fn exact_full_name_match_bypasses_freshness() {
        let mut store = InMemoryStorage::new(4, Fifo::default());
        let data = make_data("/a/b", b"stale");
        let full_name = data.full_name().unwrap();
        store.insert_with_freshness(data, Some(Duration::from_secs(0))).unwrap();

        let mut interest = Interest::new(full_name);
        interest.set_selectors(Selectors { must_be_fresh: true, ..Default::default() });
        assert!(store.find_matching(&interest).is_some());
    }

    #[test]
    fn child_selector_picks_rightmost_when_requested() {
        let mut store = InMemoryStorage::new(8, Fifo::default());
        store.insert(make_data("/a/1", b"1")).unwrap();
        store.insert(make_data("/a/2", b"2")).unwrap();

        let mut interest = Interest::new(Name::from_uri("/a").unwrap());
        interest.set_selectors(Selectors {
            child_selector: Some(ChildSelector::Rightmost),
            ..Default::default()
        });
        let found = store.find_matching(&interest).unwrap();
        assert_eq!(found.name(), &Name::from_uri("/a/2").unwrap());
    }

    #[test]
    fn find_falls_back_to_leftmost_prefix_match() {
        let mut store = InMemoryStorage::new(8, Fifo::default());
        store.insert(make_data("/a/1", b"1")).unwrap();
        store.insert(make_data("/a/2", b"2")).unwrap();

        let found = store.find(&Name::from_uri("/a").unwrap()).unwrap();
        assert_eq!(found.name(), &Name::from_uri("/a/1").unwrap());
    }

    #[test]
    fn erase_by_prefix_removes_every_matching_entry() {
        let mut store = InMemoryStorage::new(8, Fifo::default());
        store.insert(make_data("/a/1", b"1")).unwrap();
        store.insert(make_data("/a/2", b"2")).unwrap();
        store.insert(make_data("/b/1", b"1")).unwrap();

        let removed = store.erase(&Name::from_uri("/a").unwrap(), true);
        assert_eq!(removed, 2);
        assert_eq!(store.len(), 1);
        assert!(store.find(&Name::from_uri("/a").unwrap()).is_none());
    }

    #[test]
    fn persistent_store_grows_instead_of_evicting() {
        let mut store = InMemoryStorage::with_hard_limit(1, 8, Persistent);
        store.insert(make_data("/a/1", b"1")).unwrap();
        store.insert(make_data("/a/2", b"2")).unwrap();
        assert_eq!(store.len(), 2);
        assert!(store.capacity() >= 2);
    }

    #[test]
    fn persistent_store_refuses_insert_past_hard_limit() {
        let mut store = InMemoryStorage::with_hard_limit(1, 1, Persistent);
        store.insert(make_data("/a/1", b"1")).unwrap();
        assert!(store.insert(make_data("/a/2", b"2")).is_err());
    }
}
