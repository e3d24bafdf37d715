use crate::error::Error;

/// The outcome of searching a coalesced table for a value.
///
/// A `Lookup` either references the stored value together with where it was
/// found, or records that the value is absent. It never aliases absence with a
/// valid reference, so dereferencing is checked through [`Lookup::value`].
///
/// # Examples
///
/// ```rust
/// use coalesced_hash::CoalescedTable;
/// use coalesced_hash::Config;
///
/// let mut table = CoalescedTable::new(10, Config::default()).unwrap();
/// table.insert(42, 42u64, |&v| v == 42).unwrap();
///
/// let found = table.find(42, |&v| v == 42);
/// assert_eq!(found.value(), Ok(&42));
/// assert_eq!(found.probes(), 1);
///
/// let missing = table.find(7, |&v| v == 7);
/// assert!(missing.is_absent());
/// assert_eq!(missing.probes(), 0);
/// ```
#[derive(Debug, PartialEq, Eq)]
pub enum Lookup<'a, V> {
    /// The value is stored in the table.
    Found {
        /// The stored value.
        value: &'a V,
        /// Slot index holding the value.
        slot: usize,
        /// Next slot in the value's collision chain.
        link: Option<usize>,
        /// Number of slots visited to reach the value, at least 1.
        probes: usize,
    },
    /// The value is not stored in the table.
    Absent,
}

impl<V> Clone for Lookup<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for Lookup<'_, V> {}

impl<'a, V> Lookup<'a, V> {
    /// Returns `true` if the value was not found.
    pub fn is_absent(&self) -> bool {
        matches!(self, Lookup::Absent)
    }

    /// Returns `true` if the value was found.
    pub fn is_found(&self) -> bool {
        !self.is_absent()
    }

    /// Returns the referenced value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AbsentValue`] if the lookup denotes absence.
    pub fn value(&self) -> Result<&'a V, Error> {
        match *self {
            Lookup::Found { value, .. } => Ok(value),
            Lookup::Absent => Err(Error::AbsentValue),
        }
    }

    /// Number of probes the search took, or 0 if the value is absent.
    pub fn probes(&self) -> usize {
        match *self {
            Lookup::Found { probes, .. } => probes,
            Lookup::Absent => 0,
        }
    }

    /// Link stored alongside the found value: the next slot of its chain.
    ///
    /// `None` when the value is absent or sits at the tail of its chain.
    pub fn link(&self) -> Option<usize> {
        match *self {
            Lookup::Found { link, .. } => link,
            Lookup::Absent => None,
        }
    }

    /// Slot index holding the found value.
    pub fn slot(&self) -> Option<usize> {
        match *self {
            Lookup::Found { slot, .. } => Some(slot),
            Lookup::Absent => None,
        }
    }

    /// Converts the lookup into an `Option`, discarding chain details.
    pub fn into_option(self) -> Option<&'a V> {
        self.value().ok()
    }
}

impl<'a, V> From<Lookup<'a, V>> for Option<&'a V> {
    fn from(lookup: Lookup<'a, V>) -> Self {
        lookup.into_option()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_reports_defaults() {
        let lookup: Lookup<'_, u32> = Lookup::Absent;
        assert!(lookup.is_absent());
        assert!(!lookup.is_found());
        assert_eq!(lookup.value(), Err(Error::AbsentValue));
        assert_eq!(lookup.probes(), 0);
        assert_eq!(lookup.link(), None);
        assert_eq!(lookup.slot(), None);
        assert_eq!(lookup.into_option(), None);
    }

    #[test]
    fn found_exposes_details() {
        let stored = 17u32;
        let lookup = Lookup::Found {
            value: &stored,
            slot: 6,
            link: Some(10),
            probes: 2,
        };
        assert!(lookup.is_found());
        assert_eq!(lookup.value(), Ok(&17));
        assert_eq!(lookup.probes(), 2);
        assert_eq!(lookup.link(), Some(10));
        assert_eq!(lookup.slot(), Some(6));

        let copy = lookup;
        assert_eq!(copy, lookup);
        assert_eq!(Option::<&u32>::from(copy), Some(&17));
    }

    #[test]
    fn copies_do_not_require_copy_values() {
        let stored = alloc::string::String::from("key");
        let lookup = Lookup::Found {
            value: &stored,
            slot: 0,
            link: None,
            probes: 1,
        };
        let first = lookup;
        let second = lookup;
        assert_eq!(first.value(), second.value());
    }
}
