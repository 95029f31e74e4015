//! Deterministic notification ids.
//!
//! An id is recomputed from `(band, key, day_offset)` on every rebuild, so the
//! dispatcher can always address the same logical slot without remembering
//! previously scheduled ids.
//!
//! Layout: `band base + day slot * 10_000 + hash(key) % 10_000`, every band
//! being 100_000 wide. All ids are positive and fit in an `i32`.

const BAND_WIDTH: i32 = 100_000;
const DAY_STRIDE: i32 = 10_000;
const DAY_SLOTS: u32 = (BAND_WIDTH / DAY_STRIDE) as u32;
const KEY_RANGE: u32 = DAY_STRIDE as u32;

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Disjoint id range of an alert category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IdBand {
    MainPrayer,
    /// Pre-alerts and iqama alerts
    PrePrayer,
    /// Athkar and the derived special timings (duha, last third)
    Athkar,
    Reminder,
    Custom,
}

impl IdBand {
    fn base(self) -> i32 {
        let index = match self {
            IdBand::MainPrayer => 1,
            IdBand::PrePrayer => 2,
            IdBand::Athkar => 3,
            IdBand::Reminder => 4,
            IdBand::Custom => 5,
        };
        index * BAND_WIDTH
    }
}

/// 32-bit FNV-1a hash.
///
/// Stable across processes and compiler versions, unlike `DefaultHasher`.
pub fn fnv1a(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u32::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Allocates the id of `key` in `band` for the day `day_offset` days from today.
///
/// Pure and total. Day offsets wrap every 10 days.
pub fn allocate(band: IdBand, key: &str, day_offset: u32) -> i32 {
    let day_slot = (day_offset % DAY_SLOTS) as i32;
    let key_slot = (fnv1a(key.as_bytes()) % KEY_RANGE) as i32;
    band.base() + day_slot * DAY_STRIDE + key_slot
}
