// 🏦 Bank Entity - Bank names + card BIN ranges
//
// Card-style account numbers start with a bank-specific BIN (issuer
// identification number). The registry is plain data: synthesis picks a bank
// and a BIN deterministically from the seed.

use crate::hashing;
use serde::{Deserialize, Serialize};

// ============================================================================
// BANK ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bank {
    /// Display name (e.g. "工商银行")
    pub name: String,

    /// Card number prefixes issued by this bank
    #[serde(default)]
    pub bins: Vec<String>,
}

impl Bank {
    pub fn new(name: &str, bins: &[&str]) -> Self {
        Bank {
            name: name.to_string(),
            bins: bins.iter().map(|b| b.to_string()).collect(),
        }
    }

    /// Pick one BIN by hashing `key`
    pub fn pick_bin(&self, key: &str) -> Option<&str> {
        hashing::pick(&self.bins, key).map(String::as_str)
    }
}

// ============================================================================
// BANK REGISTRY
// ============================================================================

/// Ordered registry of banks. Order matters: picks index into it.
#[derive(Debug, Clone)]
pub struct BankRegistry {
    banks: Vec<Bank>,
}

impl BankRegistry {
    /// Registry with the ten major domestic banks
    pub fn new() -> Self {
        BankRegistry {
            banks: vec![
                Bank::new("中国银行", &["621661", "621660", "621663"]),
                Bank::new("工商银行", &["622202", "622208", "621226"]),
                Bank::new("建设银行", &["621700", "621284", "623668"]),
                Bank::new("农业银行", &["622848", "621282", "621336"]),
                Bank::new("交通银行", &["622260", "621069"]),
                Bank::new("招商银行", &["622588", "621486"]),
                Bank::new("中信银行", &["622696", "622690"]),
                Bank::new("光大银行", &["622666", "621003"]),
                Bank::new("民生银行", &["622622", "622600"]),
                Bank::new("浦发银行", &["622521", "621792"]),
            ],
        }
    }

    pub fn from_banks(banks: Vec<Bank>) -> Self {
        BankRegistry { banks }
    }

    pub fn get(&self, name: &str) -> Option<&Bank> {
        self.banks.iter().find(|b| b.name == name)
    }

    /// Pick one bank by hashing `key`
    pub fn pick(&self, key: &str) -> Option<&Bank> {
        hashing::pick(&self.banks, key)
    }

    pub fn banks(&self) -> &[Bank] {
        &self.banks
    }

    pub fn len(&self) -> usize {
        self.banks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.banks.is_empty()
    }
}

impl Default for BankRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry() {
        let registry = BankRegistry::new();
        assert_eq!(registry.len(), 10);
        assert!(registry.banks().iter().all(|b| !b.bins.is_empty()));
        assert!(registry
            .banks()
            .iter()
            .flat_map(|b| b.bins.iter())
            .all(|bin| bin.len() == 6 && bin.chars().all(|c| c.is_ascii_digit())));
    }

    #[test]
    fn test_pick_is_stable() {
        let registry = BankRegistry::new();
        let a = registry.pick("bankName-42").unwrap();
        let b = registry.pick("bankName-42").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.pick_bin("bin-42"), b.pick_bin("bin-42"));
    }

    #[test]
    fn test_empty_registry() {
        let registry = BankRegistry::from_banks(Vec::new());
        assert!(registry.is_empty());
        assert!(registry.pick("anything").is_none());
        assert!(Bank::new("空", &[]).pick_bin("x").is_none());
    }
}
