//! Feature-dispatch table (C1).
//!
//! A process-wide, lazily initialized table of function pointers for the
//! three SIMD-accelerated primitives, selected once from a CPU feature
//! bitmask and stable for the rest of the process's lifetime.
//!
//! The table is published through a [`std::sync::OnceLock`], the same
//! lazily-initialized-global idiom this codebase already uses for its own
//! cross-thread registries: readers always observe either nothing or a
//! fully-populated table, never a partially-written one.

use crate::simd::scalar;
use std::sync::OnceLock;

/// Which implementation tier the dispatch table selected. Exposed mainly so
/// tests and diagnostics can assert on it; ordinary callers only ever see
/// the dispatched function pointers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Scalar,
    Sse42,
    Avx2,
    Neon,
}

type ScanStringFn = fn(&[u8]) -> usize;
type FindStructuralFn = fn(&[u8]) -> (u64, usize);
type ParseIntLaneFn = fn(&[u8], usize) -> (i64, usize);
type ParseFloatFn = fn(&[u8]) -> Option<f64>;

struct DispatchTable {
    tier: Tier,
    scan_string: ScanStringFn,
    find_structural: FindStructuralFn,
    parse_int_lane: ParseIntLaneFn,
}

static TABLE: OnceLock<DispatchTable> = OnceLock::new();

#[cfg(target_arch = "x86_64")]
fn select_x86(bitmask: u32) -> DispatchTable {
    use crate::simd::x86;

    const HAS_AVX2: u32 = 1 << 1;
    const HAS_SSE42: u32 = 1 << 0;

    if bitmask & HAS_AVX2 != 0 && is_x86_feature_detected!("avx2") {
        return DispatchTable {
            tier: Tier::Avx2,
            scan_string: |b| unsafe { x86::scan_string_avx2(b) },
            find_structural: |b| unsafe { x86::find_structural_avx2(b) },
            parse_int_lane: scalar::parse_int_lane,
        };
    }
    if bitmask & HAS_SSE42 != 0 && is_x86_feature_detected!("sse4.2") {
        return DispatchTable {
            tier: Tier::Sse42,
            scan_string: |b| unsafe { x86::scan_string_sse42(b) },
            find_structural: scalar::find_structural,
            parse_int_lane: scalar::parse_int_lane,
        };
    }
    scalar_table()
}

#[cfg(target_arch = "aarch64")]
fn select_aarch64(_bitmask: u32) -> DispatchTable {
    use crate::simd::neon;
    DispatchTable {
        tier: Tier::Neon,
        scan_string: neon::scan_string_neon,
        find_structural: scalar::find_structural,
        parse_int_lane: scalar::parse_int_lane,
    }
}

fn scalar_table() -> DispatchTable {
    DispatchTable {
        tier: Tier::Scalar,
        scan_string: scalar::scan_string,
        find_structural: scalar::find_structural,
        parse_int_lane: scalar::parse_int_lane,
    }
}

/// CPU feature bits this crate cares about. The core does not interpret
/// feature *names* beyond these flags: bit 0 = SSE4.2, bit 1 = AVX2. A
/// caller on a platform without its own feature-detection story can pass
/// `u32::MAX` to request "use whatever this process can prove it has" (the
/// table only trusts bits that `is_x86_feature_detected!`/target-arch also
/// confirm, so an over-broad bitmask can't select an unsupported tier).
fn init(bitmask: u32) -> DispatchTable {
    #[cfg(target_arch = "x86_64")]
    {
        select_x86(bitmask)
    }
    #[cfg(target_arch = "aarch64")]
    {
        select_aarch64(bitmask)
    }
    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        let _ = bitmask;
        scalar_table()
    }
}

fn table() -> &'static DispatchTable {
    TABLE.get_or_init(|| {
        let t = init(u32::MAX);
        tracing::debug!(tier = ?t.tier, "vjson-core: selected SIMD dispatch tier");
        t
    })
}

/// The tier selected for this process. Initializes the dispatch table on
/// first call.
pub fn current_tier() -> Tier {
    table().tier
}

#[inline]
pub fn scan_string(bytes: &[u8]) -> usize {
    (table().scan_string)(bytes)
}

#[inline]
pub fn find_structural(bytes: &[u8]) -> (u64, usize) {
    (table().find_structural)(bytes)
}

#[inline]
pub fn parse_int_lane(bytes: &[u8], max_len: usize) -> (i64, usize) {
    (table().parse_int_lane)(bytes, max_len)
}

#[inline]
pub fn parse_float(bytes: &[u8]) -> Option<f64> {
    scalar::parse_float(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_is_idempotent_and_stable() {
        let t1 = current_tier();
        let t2 = current_tier();
        assert_eq!(t1, t2);
    }

    #[test]
    fn dispatched_scan_string_matches_scalar() {
        let input = b"hello \"world\" escape\\here";
        assert_eq!(scan_string(input), scalar::scan_string(input));
    }

    #[test]
    fn dispatched_find_structural_matches_scalar() {
        let input = b"{\"a\":[1,2]}";
        assert_eq!(find_structural(input), scalar::find_structural(input));
    }

    #[test]
    fn dispatched_parse_int_lane_matches_scalar() {
        assert_eq!(parse_int_lane(b"98765", 19), scalar::parse_int_lane(b"98765", 19));
    }
}
