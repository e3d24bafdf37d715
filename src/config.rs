use core::fmt;
use core::str::FromStr;

use thiserror::Error;

/// Fraction of the table used for home addresses when a cellar is requested
/// with an out-of-range factor.
pub const DEFAULT_ADDRESS_FACTOR: f64 = 0.86;

/// Where an overflowing record is spliced into its collision chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Insertion {
    /// Append the new record at the tail of the chain.
    #[default]
    Late,
    /// Splice the new record in directly after the home slot.
    Early,
}

/// Construction parameters for a coalesced table.
///
/// A table either uses its whole address space for home addresses
/// (`address_factor == None`) or reserves a trailing cellar that only ever
/// receives overflow records.
///
/// # Examples
///
/// ```rust
/// use coalesced_hash::Config;
/// use coalesced_hash::Insertion;
///
/// let standard = Config::standard(Insertion::Late);
/// assert_eq!(standard.address_factor, None);
///
/// let cellar = Config::cellar(Insertion::Early, 0.86);
/// assert_eq!(cellar.address_factor, Some(0.86));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Config {
    /// Chain splicing strategy.
    pub insertion: Insertion,
    /// Fraction of the table eligible as home addresses. `None` disables the
    /// cellar.
    pub address_factor: Option<f64>,
}

impl Config {
    /// Standard coalesced hashing: every slot may be a home address.
    pub const fn standard(insertion: Insertion) -> Self {
        Self {
            insertion,
            address_factor: None,
        }
    }

    /// Coalesced hashing with a cellar covering `1 - address_factor` of the
    /// table.
    ///
    /// Factors outside `(0, 1]` are replaced with [`DEFAULT_ADDRESS_FACTOR`]
    /// when the table is built.
    pub const fn cellar(insertion: Insertion, address_factor: f64) -> Self {
        Self {
            insertion,
            address_factor: Some(address_factor),
        }
    }

    /// Returns the address factor the table will actually use, if any.
    pub(crate) fn effective_address_factor(&self) -> Option<f64> {
        self.address_factor.map(|factor| {
            if factor > 0.0 && factor <= 1.0 {
                factor
            } else {
                log::warn!(
                    "address factor {factor} outside (0, 1], using {DEFAULT_ADDRESS_FACTOR}"
                );
                DEFAULT_ADDRESS_FACTOR
            }
        })
    }
}

/// The four classic coalesced hashing variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Early-insertion standard coalesced hashing.
    Eisch,
    /// Late-insertion standard coalesced hashing.
    Lisch,
    /// Early-insertion coalesced hashing with a cellar.
    Eich,
    /// Late-insertion coalesced hashing with a cellar.
    Lich,
}

impl Variant {
    /// All variants, in report order.
    pub const ALL: [Variant; 4] = [Variant::Eisch, Variant::Lisch, Variant::Eich, Variant::Lich];

    /// Builds the configuration for this variant. `address_factor` is only
    /// used by the cellar variants.
    pub const fn config(self, address_factor: f64) -> Config {
        match self {
            Variant::Eisch => Config::standard(Insertion::Early),
            Variant::Lisch => Config::standard(Insertion::Late),
            Variant::Eich => Config::cellar(Insertion::Early, address_factor),
            Variant::Lich => Config::cellar(Insertion::Late, address_factor),
        }
    }

    /// Short upper-case name used in reports.
    pub const fn name(self) -> &'static str {
        match self {
            Variant::Eisch => "EISCH",
            Variant::Lisch => "LISCH",
            Variant::Eich => "EICH",
            Variant::Lich => "LICH",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown [`Variant`] name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown variant {0:?}, expected one of EISCH, LISCH, EICH, LICH")]
pub struct ParseVariantError(alloc::string::String);

impl FromStr for Variant {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variant::ALL
            .into_iter()
            .find(|variant| variant.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseVariantError(s.into()))
    }
}
