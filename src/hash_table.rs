//! A fixed-capacity hash table using coalesced hashing.
//!
//! Colliding values are stored in the same backing array as everything else
//! and linked into chains. Chains that start at different home addresses may
//! merge when they overflow into the same free slot, which is the
//! "coalescence" the scheme is named after.
//!
//! Like the rest of the raw-table API, callers supply the hash of each value
//! together with an equality predicate. See
//! [`CoalescedSet`](crate::CoalescedSet) for a front end that hashes values
//! itself.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::config::Config;
use crate::config::Insertion;
use crate::error::Error;
use crate::lookup::Lookup;

#[inline]
fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    if n < 4 {
        return true;
    }
    if n % 2 == 0 {
        return false;
    }

    let mut divisor = 3;
    while divisor <= n / divisor {
        if n % divisor == 0 {
            return false;
        }
        divisor += 2;
    }
    true
}

/// Smallest prime greater than or equal to `n`, or `None` if it does not fit
/// in a `usize`.
pub(crate) fn next_prime(n: usize) -> Option<usize> {
    if n <= 2 {
        return Some(2);
    }

    // Even candidates other than 2 are never prime.
    let mut candidate = n | 1;
    while !is_prime(candidate) {
        candidate = candidate.checked_add(2)?;
    }
    Some(candidate)
}

#[derive(Clone)]
pub(crate) struct Entry<V> {
    pub(crate) hash: u64,
    pub(crate) value: V,
}

#[derive(Clone)]
pub(crate) struct Slot<V> {
    /// `None` while the slot is empty.
    pub(crate) entry: Option<Entry<V>>,
    pub(crate) link: Option<usize>,
}

impl<V> Slot<V> {
    const fn empty() -> Self {
        Slot {
            entry: None,
            link: None,
        }
    }

    #[inline(always)]
    fn is_empty(&self) -> bool {
        self.entry.is_none()
    }
}

impl<V: Debug> Debug for Slot<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match (&self.entry, self.link) {
            (None, _) => f.write_str(".."),
            (Some(entry), Some(link)) => write!(f, "{:?} -> {link}", entry.value),
            (Some(entry), None) => write!(f, "{:?}", entry.value),
        }
    }
}

/// Result of walking a probe chain.
///
/// A miss doubles as the insertion hint: either the home slot is free, or
/// the chain ends at `Tail::index` and a new record must be spliced in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Probe {
    Found { index: usize, probes: usize },
    Vacant,
    Tail { index: usize, probes: usize },
}

/// Where an insert will store its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
    /// The home slot is free.
    Home(usize),
    /// The value goes to `free` and is spliced into the chain through `home`
    /// that ends at `tail`.
    Overflow { home: usize, tail: usize, free: usize },
}

/// A fixed-capacity hash table using coalesced hashing.
///
/// `CoalescedTable<V>` stores values of type `V` in a single slot array whose
/// length is the smallest prime not below the requested capacity. The table
/// never grows; once every slot is used further inserts fail with
/// [`Error::TableFull`].
///
/// Four variants are available through [`Config`]: early or late insertion,
/// each with or without a cellar. The variant only changes where overflowing
/// records are spliced into their chain and which slots may act as home
/// addresses; lookups behave identically.
///
/// Values cannot be removed.
///
/// ## Example
///
/// ```rust
/// use coalesced_hash::CoalescedTable;
/// use coalesced_hash::Config;
/// use coalesced_hash::Error;
/// use coalesced_hash::Insertion;
///
/// let mut table = CoalescedTable::new(10, Config::standard(Insertion::Early)).unwrap();
/// assert_eq!(table.size(), 11);
///
/// // 3 and 14 share home address 3.
/// table.insert(3, 3u64, |&v| v == 3).unwrap();
/// table.insert(14, 14u64, |&v| v == 14).unwrap();
/// assert_eq!(table.insert(14, 14u64, |&v| v == 14), Err(Error::DuplicateKey));
///
/// assert_eq!(table.find(3, |&v| v == 3).probes(), 1);
/// assert_eq!(table.find(14, |&v| v == 14).probes(), 2);
/// assert_eq!(table.elements(), 2);
/// ```
#[derive(Clone)]
pub struct CoalescedTable<V> {
    pub(crate) slots: Vec<Slot<V>>,

    occupied: usize,
    insertion: Insertion,
    address_factor: Option<f64>,
    home_range: usize,

    /// Slots at or above this index have been passed by the free-slot scan
    /// and are never examined again.
    free_cursor: usize,
}

impl<V: Debug> Debug for CoalescedTable<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CoalescedTable")
            .field("insertion", &self.insertion)
            .field("address_factor", &self.address_factor)
            .field("home_range", &self.home_range)
            .field("occupied", &self.occupied)
            .field("free_cursor", &self.free_cursor)
            .field("slots", &self.slots)
            .finish()
    }
}

impl<V> CoalescedTable<V> {
    /// Creates a table with at least `capacity` slots.
    ///
    /// The actual size is the smallest prime greater than or equal to
    /// `capacity`. An address factor outside `(0, 1]` in `config` is replaced
    /// with [`DEFAULT_ADDRESS_FACTOR`](crate::DEFAULT_ADDRESS_FACTOR).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if `capacity` is zero or if the next
    /// prime does not fit in a `usize`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use coalesced_hash::CoalescedTable;
    /// # use coalesced_hash::Config;
    /// # use coalesced_hash::Error;
    /// # use coalesced_hash::Insertion;
    /// #
    /// let table: CoalescedTable<u64> =
    ///     CoalescedTable::new(10, Config::cellar(Insertion::Late, 0.86)).unwrap();
    /// assert_eq!(table.size(), 11);
    /// assert_eq!(table.home_range(), 9);
    ///
    /// let err = CoalescedTable::<u64>::new(0, Config::default()).unwrap_err();
    /// assert_eq!(err, Error::InvalidCapacity { requested: 0 });
    /// ```
    pub fn new(capacity: usize, config: Config) -> Result<Self, Error> {
        if capacity == 0 {
            return Err(Error::InvalidCapacity {
                requested: capacity,
            });
        }
        let size = next_prime(capacity).ok_or(Error::InvalidCapacity {
            requested: capacity,
        })?;

        let address_factor = config.effective_address_factor();
        let home_range = match address_factor {
            Some(factor) => ((factor * size as f64) as usize).clamp(1, size),
            None => size,
        };

        let mut slots = Vec::new();
        slots.resize_with(size, Slot::empty);

        log::debug!(
            "coalesced table: requested {capacity}, size {size}, home range {home_range}, {:?} insertion",
            config.insertion
        );

        Ok(Self {
            slots,
            occupied: 0,
            insertion: config.insertion,
            address_factor,
            home_range,
            free_cursor: size,
        })
    }

    /// Returns the number of slots in the table.
    pub fn size(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of values stored in the table.
    pub fn elements(&self) -> usize {
        self.occupied
    }

    /// Returns the number of values stored in the table.
    ///
    /// Same as [`elements`](Self::elements).
    pub fn len(&self) -> usize {
        self.occupied
    }

    /// Returns `true` if the table contains no values.
    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    /// Returns the number of values the table can hold.
    ///
    /// Same as [`size`](Self::size): a coalesced table can fill every slot.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the chain splicing strategy.
    pub fn insertion(&self) -> Insertion {
        self.insertion
    }

    /// Returns the address factor in use, or `None` if the table has no
    /// cellar.
    pub fn address_factor(&self) -> Option<f64> {
        self.address_factor
    }

    /// Returns the number of slots that can be home addresses.
    ///
    /// Slots `home_range()..size()` form the cellar.
    pub fn home_range(&self) -> usize {
        self.home_range
    }

    /// Returns the home address for `hash`.
    #[inline]
    pub fn home_address(&self, hash: u64) -> usize {
        (hash % self.home_range as u64) as usize
    }

    fn probe_chain(&self, hash: u64, start: usize, eq: impl Fn(&V) -> bool) -> Probe {
        let mut index = start;
        let mut probes = 0;
        loop {
            probes += 1;
            debug_assert!(probes <= self.slots.len(), "cycle in probe chain");

            let slot = &self.slots[index];
            if let Some(entry) = &slot.entry
                && entry.hash == hash
                && eq(&entry.value)
            {
                return Probe::Found { index, probes };
            }

            match slot.link {
                Some(next) => index = next,
                None => break,
            }
        }

        if probes == 1 && self.slots[index].is_empty() {
            Probe::Vacant
        } else {
            Probe::Tail { index, probes }
        }
    }

    /// Moves the free cursor down to the highest empty slot it has not yet
    /// passed.
    fn next_free_slot(&mut self) -> Option<usize> {
        while self.free_cursor > 0 {
            let index = self.free_cursor - 1;
            if self.slots[index].is_empty() {
                return Some(index);
            }
            self.free_cursor = index;
        }
        None
    }

    #[inline]
    fn occupy(&mut self, index: usize, hash: u64, value: V, link: Option<usize>) {
        let slot = &mut self.slots[index];
        debug_assert!(slot.is_empty());
        slot.entry = Some(Entry { hash, value });
        slot.link = link;
        self.occupied += 1;
        debug_assert!(self.occupied <= self.slots.len());
    }

    /// Inserts `value` under `hash`.
    ///
    /// If the home slot is free the value is stored there. Otherwise it is
    /// placed in the highest free slot and linked into the chain: at the tail
    /// for late insertion, directly after the home slot for early insertion.
    ///
    /// # Arguments
    ///
    /// * `hash` - The hash value of `value`
    /// * `value` - The value to store
    /// * `eq` - A predicate returning `true` for values equal to `value`
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateKey`] if a value matching `eq` is already
    /// stored, and [`Error::TableFull`] if no free slot is left. The table is
    /// unchanged in both cases.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use coalesced_hash::CoalescedTable;
    /// # use coalesced_hash::Config;
    /// # use coalesced_hash::Error;
    /// #
    /// let mut table = CoalescedTable::new(2, Config::default()).unwrap();
    /// assert_eq!(table.size(), 2);
    ///
    /// table.insert(0, 0u64, |&v| v == 0).unwrap();
    /// table.insert(1, 1u64, |&v| v == 1).unwrap();
    /// assert_eq!(
    ///     table.insert(2, 2u64, |&v| v == 2),
    ///     Err(Error::TableFull { capacity: 2 })
    /// );
    /// assert_eq!(table.elements(), 2);
    /// ```
    pub fn insert(&mut self, hash: u64, value: V, eq: impl Fn(&V) -> bool) -> Result<(), Error> {
        let placement = self.placement(hash, eq)?;
        self.place(placement, hash, value);
        Ok(())
    }

    /// Decides where a value with `hash` goes without storing it.
    ///
    /// The only state this may touch is the free cursor, which only moves past
    /// occupied slots.
    pub(crate) fn placement(
        &mut self,
        hash: u64,
        eq: impl Fn(&V) -> bool,
    ) -> Result<Placement, Error> {
        let home = self.home_address(hash);
        match self.probe_chain(hash, home, eq) {
            Probe::Found { index, probes } => {
                log::trace!("duplicate value at slot {index} after {probes} probes");
                Err(Error::DuplicateKey)
            }
            Probe::Vacant => Ok(Placement::Home(home)),
            Probe::Tail { index: tail, .. } => match self.next_free_slot() {
                Some(free) => Ok(Placement::Overflow { home, tail, free }),
                None => {
                    log::warn!(
                        "coalesced table full: {} of {} slots used",
                        self.occupied,
                        self.slots.len()
                    );
                    Err(Error::TableFull {
                        capacity: self.slots.len(),
                    })
                }
            },
        }
    }

    /// Stores `value` where [`placement`](Self::placement) decided.
    pub(crate) fn place(&mut self, placement: Placement, hash: u64, value: V) {
        match placement {
            Placement::Home(home) => {
                log::trace!("placing value at home slot {home}");
                self.occupy(home, hash, value, None);
            }
            Placement::Overflow { home, tail, free } => match self.insertion {
                Insertion::Late => {
                    self.occupy(free, hash, value, None);
                    self.slots[tail].link = Some(free);
                    log::trace!("late insert: slot {free} linked after tail {tail}");
                }
                Insertion::Early => {
                    let previous = self.slots[home].link.replace(free);
                    self.occupy(free, hash, value, previous);
                    log::trace!("early insert: slot {free} linked after home {home}");
                }
            },
        }
    }

    /// Finds a value by hash and equality predicate.
    ///
    /// Returns a [`Lookup`] carrying the value, its slot, its chain link and
    /// the number of probes used, or [`Lookup::Absent`]. Never fails.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use coalesced_hash::CoalescedTable;
    /// # use coalesced_hash::Config;
    /// # use coalesced_hash::Insertion;
    /// #
    /// let mut table = CoalescedTable::new(11, Config::standard(Insertion::Late)).unwrap();
    /// table.insert(5, 5u64, |&v| v == 5).unwrap();
    /// table.insert(16, 16u64, |&v| v == 16).unwrap();
    ///
    /// let found = table.find(5, |&v| v == 5);
    /// assert_eq!(found.slot(), Some(5));
    /// assert_eq!(found.link(), Some(10));
    ///
    /// let overflow = table.find(16, |&v| v == 16);
    /// assert_eq!(overflow.slot(), Some(10));
    /// assert_eq!(overflow.probes(), 2);
    ///
    /// assert!(table.find(27, |&v| v == 27).is_absent());
    /// ```
    #[inline]
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Lookup<'_, V> {
        if self.occupied == 0 {
            return Lookup::Absent;
        }

        let home = self.home_address(hash);
        let Probe::Found { index, probes } = self.probe_chain(hash, home, eq) else {
            return Lookup::Absent;
        };

        let slot = &self.slots[index];
        match &slot.entry {
            Some(entry) => Lookup::Found {
                value: &entry.value,
                slot: index,
                link: slot.link,
                probes,
            },
            None => Lookup::Absent,
        }
    }

    /// Returns `true` if a value matching `eq` is stored under `hash`.
    pub fn contains(&self, hash: u64, eq: impl Fn(&V) -> bool) -> bool {
        self.find(hash, eq).is_found()
    }

    /// Removal is not supported by coalesced tables.
    ///
    /// Always returns [`Error::Unsupported`] and leaves the table untouched.
    pub fn remove(&mut self, _hash: u64, _eq: impl Fn(&V) -> bool) -> Result<V, Error> {
        Err(Error::Unsupported)
    }

    /// Removes all values from the table.
    ///
    /// Every slot is marked empty and unlinked. The slot array is kept.
    ///
    /// The free-slot scan is not restarted: slots it has already moved past
    /// can only be filled again as home addresses, so overflowing inserts may
    /// report [`Error::TableFull`] on a table that is far from full.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use coalesced_hash::CoalescedTable;
    /// # use coalesced_hash::Config;
    /// # use coalesced_hash::Error;
    /// #
    /// let mut table = CoalescedTable::new(2, Config::default()).unwrap();
    /// table.insert(0, 0u64, |&v| v == 0).unwrap();
    /// table.insert(2, 2u64, |&v| v == 2).unwrap();
    /// assert!(table.insert(4, 4u64, |&v| v == 4).is_err());
    /// table.clear();
    ///
    /// table.insert(0, 0u64, |&v| v == 0).unwrap();
    /// assert_eq!(
    ///     table.insert(2, 2u64, |&v| v == 2),
    ///     Err(Error::TableFull { capacity: 2 })
    /// );
    /// ```
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = Slot::empty();
        }
        self.occupied = 0;
    }

    /// Returns an iterator over all values in slot order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            slots: self.slots.iter(),
            remaining: self.occupied,
        }
    }

    /// Returns an iterator over the chain starting at the home address of
    /// `hash`, yielding each slot index and the value stored there.
    ///
    /// The chain may contain values with other home addresses once chains
    /// have coalesced.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use coalesced_hash::CoalescedTable;
    /// # use coalesced_hash::Config;
    /// # use coalesced_hash::Insertion;
    /// #
    /// let mut table = CoalescedTable::new(11, Config::standard(Insertion::Early)).unwrap();
    /// for key in [1u64, 12, 23] {
    ///     table.insert(key, key, |&v| v == key).unwrap();
    /// }
    ///
    /// // Early insertion puts the newest overflow record right after home.
    /// let order: Vec<u64> = table.chain(1).map(|(_, &v)| v).collect();
    /// assert_eq!(order, [1, 23, 12]);
    /// ```
    pub fn chain(&self, hash: u64) -> Chain<'_, V> {
        let home = self.home_address(hash);
        Chain {
            table: self,
            next: if self.slots[home].is_empty() {
                None
            } else {
                Some(home)
            },
            steps: 0,
        }
    }
}

/// An iterator over the values of a [`CoalescedTable`].
pub struct Iter<'a, V> {
    slots: core::slice::Iter<'a, Slot<V>>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        for slot in self.slots.by_ref() {
            if let Some(entry) = &slot.entry {
                self.remaining -= 1;
                return Some(&entry.value);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<'a, V> IntoIterator for &'a CoalescedTable<V> {
    type IntoIter = Iter<'a, V>;
    type Item = &'a V;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator following one collision chain of a [`CoalescedTable`].
pub struct Chain<'a, V> {
    table: &'a CoalescedTable<V>,
    next: Option<usize>,
    steps: usize,
}

impl<'a, V> Iterator for Chain<'a, V> {
    type Item = (usize, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        // Links only ever point at occupied slots, and no chain is longer than
        // the table.
        let index = self.next?;
        if self.steps == self.table.slots.len() {
            self.next = None;
            return None;
        }
        self.steps += 1;

        let slot = &self.table.slots[index];
        self.next = slot.link;
        slot.entry.as_ref().map(|entry| (index, &entry.value))
    }
}
