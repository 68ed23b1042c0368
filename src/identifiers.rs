// 🪪 Identifier Synthesizer - Checksum-valid codes from stable seeds
//
// Three synthetic identifiers, all pure functions of (seed, city):
// - Unified registration identifier (18 chars, mod-31 check character)
// - Payment account number (card-style with Luhn check digit, or corporate)
// - Contact phone (mobile or landline)

use crate::entities::bank::BankRegistry;
use crate::entities::region::RegionTable;
use crate::error::SynthesisError;
use crate::hashing::{self, unit_random, LcgStream};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Registration department: market supervision
const REG_DEPT: char = '9';

/// Organization type: enterprise
const ORG_TYPE: char = '1';

pub const PREFIX_LENGTH: usize = 17;
pub const IDENTIFIER_LENGTH: usize = 18;

/// Positional weights applied to the first 17 characters
pub const CHECK_WEIGHTS: [u32; PREFIX_LENGTH] =
    [1, 3, 9, 27, 19, 26, 16, 17, 20, 29, 25, 13, 8, 24, 10, 30, 28];

/// Check character alphabet (no I, O, S, V, Z)
pub const CHECK_ALPHABET: &[u8; 31] = b"0123456789ABCDEFGHJKLMNPQRTUWXY";

/// Placeholder returned when synthesis breaks a structural invariant.
/// Its check character verifies under [`compute_check_char`].
pub const FALLBACK_IDENTIFIER: &str = "91370100MA3K2B4C50";

/// Share of accounts generated as card-style numbers
const CARD_ACCOUNT_RATIO: f64 = 0.7;

/// Share of phones generated as mobile numbers
const MOBILE_PHONE_RATIO: f64 = 0.8;

const CMCC_PREFIXES: &[&str] = &[
    "134", "135", "136", "137", "138", "139", "147", "148", "150", "151", "152", "157", "158",
    "159", "172", "178", "182", "183", "184", "187", "188", "198",
];
const CUCC_PREFIXES: &[&str] = &[
    "130", "131", "132", "145", "146", "155", "156", "166", "175", "176", "185", "186",
];
const CTC_PREFIXES: &[&str] = &[
    "133", "149", "153", "173", "174", "177", "180", "181", "189", "199",
];

// ============================================================================
// CHECK CHARACTER
// ============================================================================

/// Numeric value of an identifier character: digits 0-9, letters A=10 … Z=35
fn char_value(c: char) -> Option<u32> {
    match c {
        '0'..='9' => Some(c as u32 - '0' as u32),
        'A'..='Z' => Some(c as u32 - 'A' as u32 + 10),
        _ => None,
    }
}

/// Inverse of [`char_value`] over 0..36
fn value_char(value: u32) -> char {
    if value < 10 {
        char::from(b'0' + value as u8)
    } else {
        char::from(b'A' + (value - 10) as u8)
    }
}

/// Compute the 18th character of a unified registration identifier.
pub fn compute_check_char(prefix17: &str) -> Result<char, SynthesisError> {
    let chars: Vec<char> = prefix17.chars().collect();
    if chars.len() != PREFIX_LENGTH {
        return Err(SynthesisError::PrefixLength {
            expected: PREFIX_LENGTH,
            actual: chars.len(),
        });
    }

    let mut sum = 0u32;
    for (position, (&character, weight)) in chars.iter().zip(CHECK_WEIGHTS.iter()).enumerate() {
        let value = char_value(character).ok_or(SynthesisError::InvalidCharacter {
            position,
            character,
        })?;
        sum += value * weight;
    }

    let index = (31 - sum % 31) % 31;
    Ok(char::from(CHECK_ALPHABET[index as usize]))
}

fn is_usable_bin(bin: &str, account_len: usize) -> bool {
    !bin.is_empty() && bin.len() < account_len && bin.chars().all(|c| c.is_ascii_digit())
}

/// True when `code` is 18 characters and its check character verifies
pub fn verify_identifier(code: &str) -> bool {
    let chars: Vec<char> = code.chars().collect();
    if chars.len() != IDENTIFIER_LENGTH {
        return false;
    }
    let prefix: String = chars[..PREFIX_LENGTH].iter().collect();
    matches!(compute_check_char(&prefix), Ok(c) if c == chars[PREFIX_LENGTH])
}

/// 8-character organization segment derived from the seed
fn main_code(seed: &str) -> String {
    (0..8)
        .map(|i| {
            let value = (unit_random(seed, &format!("main-{}", i)) * 36.0) as u32;
            value_char(value.min(35))
        })
        .collect()
}

// ============================================================================
// LUHN
// ============================================================================

/// Luhn checksum (mod 10) of a digit string; `None` if it contains a non-digit.
///
/// Every second digit from the right is doubled, 9 subtracted when above 9.
pub fn luhn_checksum(digits: &str) -> Option<u32> {
    let mut sum = 0u32;
    for (i, c) in digits.chars().rev().enumerate() {
        let mut n = c.to_digit(10)?;
        if i % 2 == 1 {
            n *= 2;
            if n > 9 {
                n -= 9;
            }
        }
        sum += n;
    }
    Some(sum % 10)
}

pub fn is_luhn_valid(digits: &str) -> bool {
    !digits.is_empty() && luhn_checksum(digits) == Some(0)
}

/// Append the check digit that makes `body` Luhn-valid
pub fn luhn_complete(body: &str) -> String {
    for d in 0..=9u8 {
        let candidate = format!("{}{}", body, char::from(b'0' + d));
        if luhn_checksum(&candidate) == Some(0) {
            return candidate;
        }
    }
    format!("{}0", body)
}

// ============================================================================
// ACCOUNT TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccountKind {
    /// 16 or 19 digits, BIN prefix, Luhn check digit
    Card,

    /// 12-16 digits, no checksum
    Corporate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankAccount {
    pub bank_name: String,
    pub branch: String,
    pub account_no: String,
    pub kind: AccountKind,
}

// ============================================================================
// IDENTIFIER SYNTHESIZER
// ============================================================================

pub struct IdentifierSynthesizer {
    regions: RegionTable,
    banks: BankRegistry,
}

impl IdentifierSynthesizer {
    /// Synthesizer over the built-in region and bank tables
    pub fn new() -> Self {
        IdentifierSynthesizer {
            regions: RegionTable::new(),
            banks: BankRegistry::new(),
        }
    }

    pub fn with_tables(regions: RegionTable, banks: BankRegistry) -> Self {
        IdentifierSynthesizer { regions, banks }
    }

    pub fn regions(&self) -> &RegionTable {
        &self.regions
    }

    pub fn banks(&self) -> &BankRegistry {
        &self.banks
    }

    /// Build a unified registration identifier, reporting structural failures.
    pub fn try_synthesize_identifier(&self, seed: &str, city: &str) -> Result<String, SynthesisError> {
        let region = self.regions.admin_code(city);
        let prefix = format!("{}{}{}{}", REG_DEPT, ORG_TYPE, region, main_code(seed));

        let prefix_len = prefix.chars().count();
        if prefix_len != PREFIX_LENGTH {
            return Err(SynthesisError::PrefixLength {
                expected: PREFIX_LENGTH,
                actual: prefix_len,
            });
        }

        let check = compute_check_char(&prefix)?;
        let code = format!("{}{}", prefix, check);

        let code_len = code.chars().count();
        if code_len != IDENTIFIER_LENGTH {
            return Err(SynthesisError::CodeLength {
                expected: IDENTIFIER_LENGTH,
                actual: code_len,
            });
        }

        Ok(code)
    }

    /// Build a unified registration identifier; structural failures yield
    /// [`FALLBACK_IDENTIFIER`].
    pub fn synthesize_identifier(&self, seed: &str, city: &str) -> String {
        match self.try_synthesize_identifier(seed, city) {
            Ok(code) => code,
            Err(e) => {
                warn!(seed, city, error = %e, "identifier synthesis failed, using placeholder");
                FALLBACK_IDENTIFIER.to_string()
            }
        }
    }

    /// Synthesize a bank account: card-style (Luhn-valid) ~70% of the time,
    /// corporate otherwise.
    pub fn synthesize_account_number(&self, seed: &str, city: &str) -> BankAccount {
        let branch = format!("{}分行营业部", city);
        let bank = self.banks.pick(&format!("bankName-{}", seed));
        let bank_name = bank.map(|b| b.name.clone()).unwrap_or_default();

        let wants_card = unit_random(seed, "acctType") < CARD_ACCOUNT_RATIO;
        let len = 16 + (hashing::hash(&format!("len-{}", seed)) % 2) as usize * 3;
        // a BIN must be digits and leave room for at least the check digit
        let bin = bank
            .and_then(|b| b.pick_bin(&format!("bin-{}", seed)))
            .filter(|bin| is_usable_bin(bin, len));

        if let (true, Some(bin)) = (wants_card, bin) {
            let mut rng = LcgStream::from_key(&format!("acct-{}", seed));
            let mut body = bin.to_string();
            while body.len() < len - 1 {
                body.push(rng.next_digit());
            }
            debug!(seed, bank = %bank_name, len, "card account synthesized");
            return BankAccount {
                bank_name,
                branch,
                account_no: luhn_complete(&body),
                kind: AccountKind::Card,
            };
        }

        if wants_card {
            warn!(seed, bank = %bank_name, "no usable bank BIN, falling back to corporate account");
        }

        let mut rng = LcgStream::from_key(&format!("corp-{}", seed));
        let len = 12 + (rng.next_value() % 5) as usize;
        BankAccount {
            bank_name,
            branch,
            account_no: rng.digits(len),
            kind: AccountKind::Corporate,
        }
    }

    /// Synthesize a contact phone: 11-digit mobile ~80% of the time,
    /// `{dialing}-{7|8 digits}` landline otherwise.
    pub fn synthesize_phone(&self, seed: &str, city: &str) -> String {
        let city_key = format!("{}-{}", seed, city);
        let roll = f64::from(hashing::hash(&city_key) % 100) / 100.0;

        if roll < MOBILE_PHONE_RATIO {
            let pools: [&[&str]; 3] = [CMCC_PREFIXES, CUCC_PREFIXES, CTC_PREFIXES];
            let pool = pools[hashing::hash(seed) as usize % pools.len()];
            let prefix = pool[hashing::hash(&city_key) as usize % pool.len()];
            let mut rng = LcgStream::from_key(&format!("{}-{}", prefix, seed));
            return format!("{}{}", prefix, rng.digits(8));
        }

        let code = self.regions.dialing_code(city);
        let mut rng = LcgStream::from_key(&format!("{}-land-{}", seed, city));
        let len = 7 + (rng.next_value() % 2) as usize;
        format!("{}-{}", code, rng.digits(len))
    }
}

impl Default for IdentifierSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
