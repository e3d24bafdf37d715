//! Chain and probe statistics for [`CoalescedTable`].

use alloc::collections::BTreeSet;
use alloc::vec::Vec;

use crate::hash_table::CoalescedTable;

/// Summary of how values are spread over a table's chains.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainStats {
    /// Number of slots in the table.
    pub size: usize,
    /// Number of values stored.
    pub elements: usize,
    /// Number of slots that can be home addresses.
    pub home_range: usize,
    /// Number of distinct home addresses among the stored values.
    pub home_slots: usize,
    /// Number of values stored in the cellar.
    pub cellar_occupied: usize,
    /// Largest probe count of any stored value.
    pub longest_probe: usize,
    /// Mean probe count over all stored values.
    pub mean_probes: f64,
    /// Fraction of slots in use.
    pub load_factor: f64,
}

impl ChainStats {
    /// Pretty-print the statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Coalesced Table Statistics ===");
        println!(
            "Population: {}/{} ({:.2}% load factor)",
            self.elements,
            self.size,
            self.load_factor * 100.0
        );
        println!(
            "Home addresses: {} in use of {} ({} cellar slots, {} occupied)",
            self.home_slots,
            self.home_range,
            self.size - self.home_range,
            self.cellar_occupied
        );
        println!(
            "Probes: {:.4} mean, {} longest",
            self.mean_probes, self.longest_probe
        );
    }
}

impl<V> CoalescedTable<V> {
    /// Number of probes a successful lookup of the value in slot `target`
    /// takes.
    fn probes_to(&self, target: usize, hash: u64) -> usize {
        let mut index = self.home_address(hash);
        let mut probes = 1;
        while index != target {
            match self.slots[index].link {
                Some(next) => {
                    index = next;
                    probes += 1;
                }
                None => break,
            }
        }
        debug_assert_eq!(index, target, "value unreachable from its home address");
        probes
    }

    fn stored_probes(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.entry
                .as_ref()
                .map(|entry| self.probes_to(index, entry.hash))
        })
    }

    /// Computes a histogram of successful-lookup probe counts.
    ///
    /// Index `p` of the result holds the number of stored values that
    /// [`find`](Self::find) reaches after exactly `p` probes. Index 0 is
    /// always 0.
    pub fn probe_histogram(&self) -> Vec<usize> {
        let mut hist = alloc::vec![0usize; 1];
        for probes in self.stored_probes() {
            if hist.len() <= probes {
                hist.resize(probes + 1, 0);
            }
            hist[probes] += 1;
        }
        hist
    }

    /// Mean number of probes over successful lookups of every stored value,
    /// or 0 for an empty table.
    pub fn mean_probes(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.stored_probes().sum::<usize>() as f64 / self.len() as f64
    }

    /// Returns chain and probe statistics for the current table state.
    pub fn chain_stats(&self) -> ChainStats {
        let homes: BTreeSet<usize> = self
            .slots
            .iter()
            .filter_map(|slot| slot.entry.as_ref())
            .map(|entry| self.home_address(entry.hash))
            .collect();
        let cellar_occupied = self.slots[self.home_range()..]
            .iter()
            .filter(|slot| slot.entry.is_some())
            .count();

        ChainStats {
            size: self.size(),
            elements: self.len(),
            home_range: self.home_range(),
            home_slots: homes.len(),
            cellar_occupied,
            longest_probe: self.stored_probes().max().unwrap_or(0),
            mean_probes: self.mean_probes(),
            load_factor: self.len() as f64 / self.size() as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::config::Insertion;
    use crate::config::Variant;
    use crate::hash_table::CoalescedTable;

    fn filled(config: Config, keys: &[u64]) -> CoalescedTable<u64> {
        let mut table = CoalescedTable::new(11, config).unwrap();
        for &key in keys {
            table.insert(key, key, |&v| v == key).unwrap();
        }
        table
    }

    #[test]
    fn histogram_matches_find() {
        let keys = [2u64, 13, 24, 35, 5];
        for variant in Variant::ALL {
            let table = filled(variant.config(0.86), &keys);
            let hist = table.probe_histogram();
            assert_eq!(hist[0], 0);
            assert_eq!(hist.iter().sum::<usize>(), keys.len());

            let mut expected = alloc::vec![0usize; hist.len()];
            for &key in &keys {
                expected[table.find(key, |&v| v == key).probes()] += 1;
            }
            assert_eq!(hist, expected, "{variant}");
        }
    }

    #[test]
    fn late_chain_stats() {
        let table = filled(Config::standard(Insertion::Late), &[2, 13, 24, 35]);
        assert_eq!(table.probe_histogram(), [0, 1, 1, 1, 1]);
        assert_eq!(table.mean_probes(), 2.5);

        let stats = table.chain_stats();
        assert_eq!(stats.elements, 4);
        assert_eq!(stats.home_slots, 1);
        assert_eq!(stats.longest_probe, 4);
        assert_eq!(stats.cellar_occupied, 0);
        assert_eq!(stats.home_range, 11);
    }

    #[test]
    fn cellar_occupancy() {
        let table = filled(Config::cellar(Insertion::Early, 0.86), &[0, 9, 18]);
        let stats = table.chain_stats();
        assert_eq!(stats.home_range, 9);
        assert_eq!(stats.cellar_occupied, 2);
        assert_eq!(stats.home_slots, 1);
    }

    #[test]
    fn empty_table_stats() {
        let table: CoalescedTable<u64> = CoalescedTable::new(5, Config::default()).unwrap();
        assert_eq!(table.probe_histogram(), [0]);
        assert_eq!(table.mean_probes(), 0.0);
        assert_eq!(table.chain_stats().longest_probe, 0);
    }

    #[test]
    #[cfg(feature = "std")]
    fn stats_output() {
        filled(Config::default(), &[1, 12, 23]).chain_stats().print();
    }
}
