// 📜 Qualification Synthesizer - Certificates with a realistic expiry mix
//
// Distribution of generated expiry dates:
// - 15% already expired (1-30 days ago)
// - 20% expiring soon (within 1-30 days)
// - 65% valid (31-365 days ahead)

use crate::hashing::unit_random;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Days ahead within which a qualification counts as expiring
pub const EXPIRING_WINDOW_DAYS: i64 = 30;

pub const QUALIFICATION_TYPES: [&str; 6] = [
    "营业执照",
    "药品经营许可证",
    "医疗器械经营许可证",
    "GSP认证",
    "开户许可证",
    "一般纳税人资格",
];

const ISSUER: &str = "市场监管局";
const REVIEW_REMARK: &str = "年审资料不全";
const SEED_REMARK: &str = "年审待提交";

// ============================================================================
// STATUS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualificationStatus {
    Valid,
    Expiring,
    Expired,
}

impl QualificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualificationStatus::Valid => "有效",
            QualificationStatus::Expiring => "即将到期",
            QualificationStatus::Expired => "已过期",
        }
    }
}

/// Status and signed days left until `expiry`
pub fn expiry_status(expiry: NaiveDate, today: NaiveDate) -> (QualificationStatus, i64) {
    let days = (expiry - today).num_days();
    let status = if days < 0 {
        QualificationStatus::Expired
    } else if days <= EXPIRING_WINDOW_DAYS {
        QualificationStatus::Expiring
    } else {
        QualificationStatus::Valid
    };
    (status, days)
}

// ============================================================================
// QUALIFICATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Qualification {
    pub id: String,
    #[serde(rename = "type")]
    pub qualification_type: String,
    pub number: String,
    pub issue_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub issuer: String,
    #[serde(default)]
    pub remark: String,
}

impl Qualification {
    pub fn status(&self, today: NaiveDate) -> (QualificationStatus, i64) {
        expiry_status(self.expiry_date, today)
    }
}

/// Expiry offset in days for the `k`-th qualification of `seed`
pub fn sample_expiry_offset(seed: &str, k: u64) -> i64 {
    let r = unit_random(seed, &k.to_string());
    if r < 0.15 {
        return -1 - (unit_random(seed, &(k + 7).to_string()) * 30.0).floor() as i64;
    }
    if r < 0.35 {
        return 1 + (unit_random(seed, &(k + 19).to_string()) * 30.0).floor() as i64;
    }
    31 + (unit_random(seed, &(k + 37).to_string()) * 335.0).floor() as i64
}

/// Qualifications written when the `idx`-th supplier of a seeding run is
/// seeded: `10 + idx % 7` certificates numbered from `idx * 11 + 1`, with
/// ids counting from 1 per supplier.
pub fn seed_qualifications(supplier_id: &str, idx: usize, today: NaiveDate) -> Vec<Qualification> {
    let count = 10 + idx % 7;
    (0..count)
        .map(|i| {
            let n = idx * 11 + i + 1;
            let offset = sample_expiry_offset(supplier_id, n as u64);
            Qualification {
                id: format!("Q-{}-{}", supplier_id, i + 1),
                qualification_type: QUALIFICATION_TYPES[n % QUALIFICATION_TYPES.len()].to_string(),
                number: format!("NO-{}", 100_000 + n),
                issue_date: today - Duration::days(365 + (n % 500) as i64),
                expiry_date: today + Duration::days(offset),
                issuer: ISSUER.to_string(),
                remark: if n % 11 == 0 {
                    SEED_REMARK.to_string()
                } else {
                    String::new()
                },
            }
        })
        .collect()
}

/// Generate `count` qualifications for a supplier, numbered after `start`
/// existing records.
pub fn synthesize_qualifications(
    supplier_id: &str,
    start: usize,
    count: usize,
    today: NaiveDate,
) -> Vec<Qualification> {
    (0..count)
        .map(|i| {
            let n = start + i + 1;
            let offset = sample_expiry_offset(supplier_id, n as u64);
            Qualification {
                id: format!("Q-{}-{}", supplier_id, n),
                qualification_type: QUALIFICATION_TYPES[(i + n) % QUALIFICATION_TYPES.len()]
                    .to_string(),
                number: format!("NO-{}", 100_000 + n),
                issue_date: today - Duration::days(365 + (n % 500) as i64),
                expiry_date: today + Duration::days(offset),
                issuer: ISSUER.to_string(),
                remark: if n % 11 == 0 {
                    REVIEW_REMARK.to_string()
                } else {
                    String::new()
                },
            }
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn test_expiry_status_boundaries() {
        let t = today();
        assert_eq!(expiry_status(t - Duration::days(1), t), (QualificationStatus::Expired, -1));
        assert_eq!(expiry_status(t, t), (QualificationStatus::Expiring, 0));
        assert_eq!(expiry_status(t + Duration::days(30), t), (QualificationStatus::Expiring, 30));
        assert_eq!(expiry_status(t + Duration::days(31), t), (QualificationStatus::Valid, 31));
    }

    #[test]
    fn test_offset_ranges() {
        for k in 0..500 {
            let offset = sample_expiry_offset("S-1001", k);
            assert!(
                (-30..=-1).contains(&offset) || (1..=30).contains(&offset) || (31..=365).contains(&offset),
                "offset {} out of range",
                offset
            );
        }
    }

    #[test]
    fn test_distribution_has_every_status() {
        let quals = synthesize_qualifications("S-1003", 0, 200, today());
        let count = |s: QualificationStatus| quals.iter().filter(|q| q.status(today()).0 == s).count();

        println!(
            "valid={} expiring={} expired={}",
            count(QualificationStatus::Valid),
            count(QualificationStatus::Expiring),
            count(QualificationStatus::Expired)
        );
        assert!(count(QualificationStatus::Valid) > count(QualificationStatus::Expired));
        assert!(count(QualificationStatus::Expiring) > 0);
        assert!(count(QualificationStatus::Expired) > 0);
    }

    #[test]
    fn test_synthesis_fields() {
        let quals = synthesize_qualifications("S-1001", 10, 3, today());
        assert_eq!(quals.len(), 3);
        assert_eq!(quals[0].id, "Q-S-1001-11");
        assert_eq!(quals[0].number, "NO-100011");
        assert_eq!(quals[0].remark, REVIEW_REMARK);
        assert_eq!(quals[1].remark, "");
        assert!(quals.iter().all(|q| q.issue_date < today()));
        assert_eq!(quals, synthesize_qualifications("S-1001", 10, 3, today()));
    }

    #[test]
    fn test_seed_variant_fields() {
        // idx 1: n runs 12..=22, ids restart at 1
        let quals = seed_qualifications("S-1002", 1, today());
        assert_eq!(quals.len(), 11);
        assert_eq!(quals[0].id, "Q-S-1002-1");
        assert_eq!(quals[0].number, "NO-100012");
        assert_eq!(quals[0].qualification_type, QUALIFICATION_TYPES[0]);
        assert_eq!(quals[1].qualification_type, QUALIFICATION_TYPES[1]);
        assert_eq!(quals[10].id, "Q-S-1002-11");
        assert_eq!(quals[10].remark, SEED_REMARK);
        assert!(quals[..10].iter().all(|q| q.remark.is_empty()));

        // same expiry sampling as generated certificates with the same n
        let generated = synthesize_qualifications("S-1002", 11, 11, today());
        for (seeded, appended) in quals.iter().zip(&generated) {
            assert_eq!(seeded.number, appended.number);
            assert_eq!(seeded.expiry_date, appended.expiry_date);
        }
        assert_ne!(quals[0].id, generated[0].id);
        assert_ne!(quals[1].qualification_type, generated[1].qualification_type);
    }

    #[test]
    fn test_serializes_type_field() {
        let q = &synthesize_qualifications("S-1", 0, 1, today())[0];
        let json = serde_json::to_value(q).unwrap();
        assert!(json.get("type").is_some());
        assert!(json.get("expiryDate").is_some());
    }
}
