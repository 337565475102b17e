//! Prime capacity planning.
//!
//! Slot arrays are always sized to a prime from [`PRIMES`]. Each prime is
//! roughly double the previous one, so growing by "current capacity plus one"
//! doubles the table. Requests beyond the largest prime that fits in a `usize`
//! are used unchanged.

use crate::error::Result;
use crate::error::TableError;

/// The capacity ladder. Entries that do not fit in the target's `usize` are
/// skipped by [`calculate_size`].
pub const PRIMES: [u64; 59] = [
    53,
    97,
    191,
    383,
    769,
    1_531,
    3_067,
    6_143,
    12_289,
    24_571,
    49_157,
    98_299,
    196_613,
    393_209,
    786_431,
    1_572_869,
    3_145_721,
    6_291_449,
    12_582_917,
    25_165_813,
    50_331_653,
    100_663_291,
    201_326_611,
    402_653_189,
    805_306_357,
    1_610_612_741,
    3_221_225_473,
    6_442_450_939,
    12_884_901_893,
    25_769_803_799,
    51_539_607_551,
    103_079_215_111,
    206_158_430_209,
    412_316_860_441,
    824_633_720_831,
    1_649_267_441_651,
    3_298_534_883_309,
    6_597_069_766_657,
    13_194_139_533_299,
    26_388_279_066_623,
    52_776_558_133_303,
    105_553_116_266_489,
    211_106_232_532_969,
    422_212_465_066_001,
    844_424_930_131_963,
    1_688_849_860_263_953,
    3_377_699_720_527_861,
    6_755_399_441_055_731,
    13_510_798_882_111_483,
    27_021_597_764_222_939,
    54_043_195_528_445_957,
    108_086_391_056_891_903,
    216_172_782_113_783_773,
    432_345_564_227_567_621,
    864_691_128_455_135_207,
    1_729_382_256_910_270_481,
    3_458_764_513_820_540_933,
    6_917_529_027_641_081_903,
    13_835_058_055_282_163_729,
];

/// Returns the smallest tabulated prime that is at least `required`.
///
/// When `required` exceeds every prime representable as a `usize`, `required`
/// itself is returned.
///
/// ```rust
/// use robin_hash::capacity::calculate_size;
///
/// assert_eq!(calculate_size(0), 53);
/// assert_eq!(calculate_size(53), 53);
/// assert_eq!(calculate_size(54), 97);
/// assert_eq!(calculate_size(usize::MAX), usize::MAX);
/// ```
pub fn calculate_size(required: usize) -> usize {
    PRIMES
        .iter()
        .filter_map(|&p| usize::try_from(p).ok())
        .find(|&p| p >= required)
        .unwrap_or(required)
}

/// Checks that `load` lies strictly between zero and one.
pub fn validate_load(load: f64) -> Result<()> {
    if load > 0.0 && load < 1.0 {
        Ok(())
    } else {
        Err(TableError::Invalid("load factor must lie strictly between 0 and 1"))
    }
}

/// Returns `true` when `capacity` entries cannot be addressed at `load`.
#[inline]
pub fn overflows(capacity: usize, load: f64) -> bool {
    capacity as f64 >= usize::MAX as f64 * load
}

/// Plans the slot count for a table that must hold `capacity` entries at the
/// given load factor.
///
/// # Errors
///
/// - [`TableError::Invalid`] if `capacity` is zero or `load` is outside
///   `(0, 1)`.
/// - [`TableError::Overflow`] if `capacity / load` does not fit in a `usize`.
pub fn plan(capacity: usize, load: f64) -> Result<usize> {
    if capacity == 0 {
        return Err(TableError::Invalid("capacity must be non-zero"));
    }
    validate_load(load)?;
    if overflows(capacity, load) {
        return Err(TableError::Overflow(capacity));
    }

    Ok(calculate_size((capacity as f64 / load) as usize))
}
