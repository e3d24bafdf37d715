use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use crate::config::Config;
use crate::error::Error;
use crate::hash_table::CoalescedTable;
use crate::hasher::DefaultHashBuilder;
use crate::lookup::Lookup;

/// A fixed-capacity hash set using a [`CoalescedTable`] as the underlying
/// storage.
///
/// `CoalescedSet<T, S>` stores values of type `T` where `T` implements
/// `Hash + Eq`, hashing them with the hasher builder `S`. Use
/// [`IdentityState`](crate::IdentityState) to reproduce the classic
/// `key mod size` home addresses for integer keys.
///
/// # Examples
///
/// ```rust
/// use coalesced_hash::CoalescedSet;
/// use coalesced_hash::Config;
/// use coalesced_hash::Error;
/// use coalesced_hash::IdentityState;
/// use coalesced_hash::Insertion;
///
/// let mut set =
///     CoalescedSet::with_hasher(10, Config::standard(Insertion::Early), IdentityState).unwrap();
/// set.insert(4u32).unwrap();
/// set.insert(15u32).unwrap();
/// assert_eq!(set.insert(15u32), Err(Error::DuplicateKey));
///
/// assert_eq!(set.find(&4).probes(), 1);
/// assert_eq!(set.find(&15).probes(), 2);
/// assert!(set.find(&26).is_absent());
/// ```
#[derive(Clone)]
pub struct CoalescedSet<T, S = DefaultHashBuilder> {
    table: CoalescedTable<T>,
    hash_builder: S,
}

impl<T, S> Debug for CoalescedSet<T, S>
where
    T: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.table.iter()).finish()
    }
}

impl<T, S> CoalescedSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    /// Creates a set with at least `capacity` slots and the given hasher
    /// builder.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if `capacity` is zero or too large.
    pub fn with_hasher(capacity: usize, config: Config, hash_builder: S) -> Result<Self, Error> {
        Ok(Self {
            table: CoalescedTable::new(capacity, config)?,
            hash_builder,
        })
    }

    /// Adds a value to the set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateKey`] if the value is already present and
    /// [`Error::TableFull`] if no slot is left.
    pub fn insert(&mut self, value: T) -> Result<(), Error> {
        let hash = self.hash_builder.hash_one(&value);
        let placement = self.table.placement(hash, |v| v == &value)?;
        self.table.place(placement, hash, value);
        Ok(())
    }

    /// Looks up a value, reporting where it was found and how many probes
    /// the search took.
    pub fn find(&self, value: &T) -> Lookup<'_, T> {
        let hash = self.hash_builder.hash_one(value);
        self.table.find(hash, |v| v == value)
    }

    /// Returns `true` if the set contains a value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use coalesced_hash::CoalescedSet;
    /// # use coalesced_hash::Config;
    /// # use coalesced_hash::IdentityState;
    /// #
    /// let mut set = CoalescedSet::with_hasher(8, Config::default(), IdentityState).unwrap();
    /// set.insert(1u64).unwrap();
    /// assert!(set.contains(&1));
    /// assert!(!set.contains(&2));
    /// ```
    pub fn contains(&self, value: &T) -> bool {
        self.find(value).is_found()
    }

    /// Removal is not supported; always returns [`Error::Unsupported`].
    pub fn remove(&mut self, value: &T) -> Result<T, Error> {
        let hash = self.hash_builder.hash_one(value);
        self.table.remove(hash, |v| v == value)
    }

    /// Inserts every value from `iter`, stopping at the first failure.
    ///
    /// Values inserted before the failure stay in the set.
    pub fn try_extend(&mut self, iter: impl IntoIterator<Item = T>) -> Result<(), Error> {
        for value in iter {
            self.insert(value)?;
        }
        Ok(())
    }
}

impl<T, S> CoalescedSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Creates a set with at least `capacity` slots using the default hasher
    /// builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use coalesced_hash::CoalescedSet;
    /// use coalesced_hash::Config;
    ///
    /// let set: CoalescedSet<i32> = CoalescedSet::new(100, Config::default()).unwrap();
    /// assert_eq!(set.size(), 101);
    /// assert!(set.is_empty());
    /// # }
    /// ```
    pub fn new(capacity: usize, config: Config) -> Result<Self, Error> {
        Self::with_hasher(capacity, config, S::default())
    }
}

impl<T, S> CoalescedSet<T, S> {
    /// Returns the number of slots in the set.
    pub fn size(&self) -> usize {
        self.table.size()
    }

    /// Returns the number of values in the set.
    pub fn elements(&self) -> usize {
        self.table.elements()
    }

    /// Returns the number of values in the set.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set contains no values.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Removes all values, keeping the slot array.
    ///
    /// See [`CoalescedTable::clear`] for how this limits later overflow
    /// inserts.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Returns an iterator over the values in slot order.
    pub fn iter(&self) -> crate::hash_table::Iter<'_, T> {
        self.table.iter()
    }

    /// Returns a reference to the set's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Returns the underlying table.
    pub fn table(&self) -> &CoalescedTable<T> {
        &self.table
    }
}

impl<'a, T, S> IntoIterator for &'a CoalescedSet<T, S> {
    type IntoIter = crate::hash_table::Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec::Vec;

    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use siphasher::sip::SipHasher;

    use super::*;
    use crate::config::Insertion;
    use crate::config::Variant;
    use crate::hasher::IdentityState;

    #[derive(Clone)]
    struct SipHashBuilder {
        k1: u64,
        k2: u64,
    }

    impl BuildHasher for SipHashBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(self.k1, self.k2)
        }
    }

    impl Default for SipHashBuilder {
        fn default() -> Self {
            Self {
                k1: OsRng.try_next_u64().unwrap_or(0),
                k2: OsRng.try_next_u64().unwrap_or(0),
            }
        }
    }

    #[test]
    fn test_new_and_with_hasher() {
        let set: CoalescedSet<i32, SipHashBuilder> =
            CoalescedSet::new(20, Config::default()).unwrap();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
        assert_eq!(set.size(), 23);

        let err = CoalescedSet::<i32, _>::with_hasher(0, Config::default(), IdentityState)
            .unwrap_err();
        assert_eq!(err, Error::InvalidCapacity { requested: 0 });
    }

    #[test]
    fn test_insert_find_contains() {
        for variant in Variant::ALL {
            let mut set = CoalescedSet::with_hasher(
                64,
                variant.config(0.86),
                SipHashBuilder::default(),
            )
            .unwrap();
            for i in 0..50 {
                set.insert(i).unwrap();
            }
            assert_eq!(set.elements(), 50);
            for i in 0..50 {
                assert!(set.contains(&i));
                assert_eq!(set.find(&i).value(), Ok(&i));
                assert_eq!(set.insert(i), Err(Error::DuplicateKey));
            }
            assert!(!set.contains(&50));
            assert_eq!(set.elements(), 50);
        }
    }

    #[test]
    fn test_identity_collision() {
        let mut set =
            CoalescedSet::with_hasher(10, Config::standard(Insertion::Late), IdentityState)
                .unwrap();
        set.insert(3u64).unwrap();
        set.insert(14u64).unwrap();
        set.insert(25u64).unwrap();
        assert_eq!(set.find(&3).probes(), 1);
        assert_eq!(set.find(&14).probes(), 2);
        assert_eq!(set.find(&25).probes(), 3);
        assert_eq!(set.table().chain(3).count(), 3);
    }

    #[test]
    fn test_string_values() {
        let mut set = CoalescedSet::with_hasher(
            16,
            Config::cellar(Insertion::Early, 0.86),
            SipHashBuilder::default(),
        )
        .unwrap();
        for word in ["hello", "world", "rust"] {
            set.insert(word.to_string()).unwrap();
        }
        assert!(set.contains(&"hello".to_string()));
        assert!(set.contains(&"rust".to_string()));
        assert!(!set.contains(&"missing".to_string()));

        let mut words: Vec<&String> = set.iter().collect();
        words.sort();
        assert_eq!(words, ["hello", "rust", "world"]);
    }

    #[test]
    fn test_fill_and_overflow() {
        let mut set =
            CoalescedSet::with_hasher(5, Config::cellar(Insertion::Late, 0.5), IdentityState)
                .unwrap();
        set.try_extend([10u64, 20, 30, 40, 50]).unwrap();
        assert_eq!(set.len(), set.size());
        assert_eq!(set.insert(60), Err(Error::TableFull { capacity: 5 }));
        assert_eq!(set.try_extend([70u64]), Err(Error::TableFull { capacity: 5 }));
        assert_eq!(set.len(), 5);
    }

    #[test]
    fn test_remove_unsupported() {
        let mut set = CoalescedSet::with_hasher(7, Config::default(), IdentityState).unwrap();
        set.insert(1u32).unwrap();
        assert_eq!(set.remove(&1), Err(Error::Unsupported));
        assert!(set.contains(&1));
    }

    #[test]
    fn test_clear() {
        let mut set = CoalescedSet::with_hasher(7, Config::default(), IdentityState).unwrap();
        set.try_extend(0..7u8).unwrap();
        assert_eq!(set.insert(7), Err(Error::TableFull { capacity: 7 }));

        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.size(), 7);
        assert!((0..7u8).all(|i| !set.contains(&i)));

        // Home slots can be reused, overflow slots cannot.
        set.insert(0).unwrap();
        assert_eq!(set.insert(7), Err(Error::TableFull { capacity: 7 }));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_debug_and_iter() {
        let mut set = CoalescedSet::with_hasher(3, Config::default(), IdentityState).unwrap();
        set.insert(1u8).unwrap();
        assert_eq!(alloc::format!("{set:?}"), "{1}");
        assert_eq!((&set).into_iter().count(), 1);
        assert_eq!(set.hasher().hash_one(42u8), 42);
    }
}
