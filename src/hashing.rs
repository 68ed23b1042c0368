// 🎲 Deterministic Hasher - Stable seeds, reproducible randomness
//
// Same (seed, salt) → same value, in every session, on every machine.
// Synthetic data is never stored as truth: it is recomputed from its seed.

// ============================================================================
// CONSTANTS
// ============================================================================

/// Park–Miller modulus (2^31 - 1)
pub const LCG_MODULUS: u64 = 2_147_483_647;

/// Park–Miller multiplier (MINSTD revision)
pub const LCG_MULTIPLIER: u64 = 48_271;

// ============================================================================
// STRING HASH
// ============================================================================

/// Polynomial string hash with wrap-around 32-bit signed arithmetic.
///
/// `h = h * 31 + unit` over the UTF-16 code units of `text`.
pub fn hash_i32(text: &str) -> i32 {
    text.encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// Canonical hash: absolute value of [`hash_i32`].
///
/// `i32::MIN` maps to 2147483648, hence the `u32` result.
pub fn hash(text: &str) -> u32 {
    hash_i32(text).unsigned_abs()
}

/// Deterministic sample in `[0, 1)` with three decimal places of resolution.
pub fn unit_random(seed: &str, salt: &str) -> f64 {
    let h = hash(&format!("{}-{}", seed, salt));
    f64::from(h % 1000) / 1000.0
}

/// Pick one element of `items` by hashing `key`.
pub fn pick<'a, T>(items: &'a [T], key: &str) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(hash(key) as usize % items.len())
}

// ============================================================================
// LCG STREAM
// ============================================================================

/// Park–Miller linear congruential generator.
///
/// Used where several successive values are needed (digits of an account
/// number, a phone tail). Build one per synthesis task; never share a stream
/// between independent tasks.
#[derive(Debug, Clone)]
pub struct LcgStream {
    state: u64,
}

impl LcgStream {
    pub fn new(seed: u64) -> Self {
        let mut state = seed % LCG_MODULUS;
        if state == 0 {
            state = LCG_MODULUS - 1;
        }
        LcgStream { state }
    }

    /// Seed the stream from the hash of a string key
    pub fn from_key(key: &str) -> Self {
        Self::new(u64::from(hash(key)))
    }

    /// Advance and return the new state
    pub fn next_value(&mut self) -> u64 {
        self.state = self.state * LCG_MULTIPLIER % LCG_MODULUS;
        self.state
    }

    /// Advance and return the last decimal digit of the new state
    pub fn next_digit(&mut self) -> char {
        char::from(b'0' + (self.next_value() % 10) as u8)
    }

    /// Append `count` digits to a string
    pub fn digits(&mut self, count: usize) -> String {
        (0..count).map(|_| self.next_digit()).collect()
    }
}

impl Iterator for LcgStream {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        Some(self.next_value())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_known_values() {
        assert_eq!(hash(""), 0);
        assert_eq!(hash("a"), 97);
        assert_eq!(hash("ab"), 97 * 31 + 98);
    }

    #[test]
    fn test_hash_wraps_like_32_bit_signed() {
        let text = "a fairly long seed string that overflows 32 bits";
        let mut expected: i64 = 0;
        for unit in text.encode_utf16() {
            expected = (expected * 31 + i64::from(unit)) as i32 as i64;
        }
        assert_eq!(hash_i32(text) as i64, expected);
        assert_eq!(hash(text), (expected as i32).unsigned_abs());
    }

    #[test]
    fn test_hash_uses_utf16_units() {
        // 济 is a single UTF-16 unit (U+6D4E)
        assert_eq!(hash("济"), 0x6D4E);
    }

    #[test]
    fn test_unit_random_is_deterministic() {
        for seed in ["S-1001", "S-1002", "123", ""] {
            for salt in ["onTime", "quality", "main-0"] {
                let a = unit_random(seed, salt);
                let b = unit_random(seed, salt);
                assert_eq!(a, b);
                assert!((0.0..1.0).contains(&a), "{} out of range", a);
            }
        }
    }

    #[test]
    fn test_unit_random_matches_hash_formula() {
        let expected = f64::from(hash("S-1001-onTime") % 1000) / 1000.0;
        assert_eq!(unit_random("S-1001", "onTime"), expected);
    }

    #[test]
    fn test_pick() {
        let items = ["a", "b", "c"];
        let chosen = pick(&items, "key").unwrap();
        assert_eq!(*chosen, items[hash("key") as usize % 3]);

        let empty: [&str; 0] = [];
        assert!(pick(&empty, "key").is_none());
    }

    #[test]
    fn test_lcg_known_sequence() {
        let mut rng = LcgStream::new(1);
        assert_eq!(rng.next_value(), 48_271);
        assert_eq!(rng.next_value(), 182_605_794);
    }

    #[test]
    fn test_lcg_zero_seed_is_remapped() {
        let mut rng = LcgStream::new(0);
        // (M - 1) * a ≡ -a (mod M)
        assert_eq!(rng.next_value(), LCG_MODULUS - LCG_MULTIPLIER);

        let mut same = LcgStream::new(LCG_MODULUS);
        assert_eq!(same.next_value(), LCG_MODULUS - LCG_MULTIPLIER);
    }

    #[test]
    fn test_lcg_streams_are_independent() {
        let mut a = LcgStream::from_key("acct-7");
        let mut b = LcgStream::from_key("acct-7");
        let first: Vec<u64> = a.by_ref().take(5).collect();
        let second: Vec<u64> = b.by_ref().take(5).collect();
        assert_eq!(first, second);

        let digits = LcgStream::from_key("acct-7").digits(8);
        assert_eq!(digits.len(), 8);
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
    }
}
