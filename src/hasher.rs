use core::hash::BuildHasher;
use core::hash::Hasher;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hasher builder used by [`CoalescedSet`](crate::CoalescedSet)
        /// when none is specified.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// The hasher builder used by [`CoalescedSet`](crate::CoalescedSet)
        /// when none is specified.
        pub type DefaultHashBuilder = std::hash::RandomState;
    } else {
        /// The hasher builder used by [`CoalescedSet`](crate::CoalescedSet)
        /// when none is specified.
        pub type DefaultHashBuilder = IdentityState;
    }
}

/// A hasher that returns integer keys unchanged.
///
/// This is the classic hash for coalesced hashing experiments: the home
/// address of an integer key is the key modulo the address range. Signed
/// integers hash by their two's-complement bit pattern. Arbitrary byte
/// input is folded little-endian into the state, so any key still hashes by
/// value.
///
/// # Examples
///
/// ```rust
/// use core::hash::BuildHasher;
///
/// use coalesced_hash::IdentityState;
///
/// assert_eq!(IdentityState.hash_one(25u32), 25);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityHasher {
    state: u64,
}

impl IdentityHasher {
    // A single integer write on a fresh hasher leaves the integer unchanged.
    #[inline]
    fn fold(&mut self, word: u64) {
        self.state = self.state.rotate_left(5) ^ word;
    }
}

impl Hasher for IdentityHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for chunk in bytes.chunks(8) {
            let mut word = [0u8; 8];
            word[..chunk.len()].copy_from_slice(chunk);
            self.fold(u64::from_le_bytes(word));
        }
    }

    fn write_u8(&mut self, i: u8) {
        self.fold(i as u64);
    }

    fn write_u16(&mut self, i: u16) {
        self.fold(i as u64);
    }

    fn write_u32(&mut self, i: u32) {
        self.fold(i as u64);
    }

    fn write_u64(&mut self, i: u64) {
        self.fold(i);
    }

    fn write_usize(&mut self, i: usize) {
        self.fold(i as u64);
    }

    fn write_i8(&mut self, i: i8) {
        self.write_u8(i as u8);
    }

    fn write_i16(&mut self, i: i16) {
        self.write_u16(i as u16);
    }

    fn write_i32(&mut self, i: i32) {
        self.write_u32(i as u32);
    }

    fn write_i64(&mut self, i: i64) {
        self.write_u64(i as u64);
    }

    fn write_isize(&mut self, i: isize) {
        self.write_usize(i as usize);
    }
}

/// Builds [`IdentityHasher`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityState;

impl BuildHasher for IdentityState {
    type Hasher = IdentityHasher;

    fn build_hasher(&self) -> Self::Hasher {
        IdentityHasher::default()
    }
}
