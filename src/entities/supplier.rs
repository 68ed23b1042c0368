// 🏭 Supplier Entity - Supplier master records + deterministic seeding
//
// A seeded supplier is a pure function of its ordinal n (1-based) and the
// reference date: names, identifier, account and phone all derive from n.

use crate::attributes::SyntheticMetricSet;
use crate::identifiers::IdentifierSynthesizer;
use crate::scoring::Grade;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

// ============================================================================
// SUPPLIER
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    /// Stable identity (e.g. "S-1001")
    pub id: String,
    pub supplier_name: String,
    pub social_credit_code: String,
    pub supplier_type: String,
    pub province: String,
    pub city: String,
    pub registered_address: String,
    pub is_active: bool,
    pub legal_person: String,

    /// Registered capital in units of 10k CNY
    pub registered_capital: u32,
    pub business_scope: String,

    // Contact
    pub contact_name: String,
    pub contact_title: String,
    pub contact_phone: String,
    pub contact_email: String,

    // Settlement
    pub bank_name: String,
    pub bank_branch: String,
    pub bank_account_name: String,
    pub bank_account_no: String,

    // Invoicing
    pub invoice_title: String,
    pub invoice_type: String,
    pub tax_rate: u32,

    pub established_date: NaiveDate,

    /// Base rating the synthetic metrics are derived from
    #[serde(default)]
    pub rating_score: Option<f64>,

    /// Cached synthetic metrics, if computed before
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<SyntheticMetricSet>,
}

/// Grading outcome for one supplier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedSupplier {
    pub supplier_id: String,
    pub supplier_name: String,
    pub metrics: SyntheticMetricSet,
    pub total_score: f64,
    pub category: String,
}

impl GradedSupplier {
    pub fn grade(&self) -> Grade {
        Grade {
            total_score: self.total_score,
            category: self.category.clone(),
        }
    }
}

// ============================================================================
// QUERY
// ============================================================================

/// Supplier list filter with 1-based pagination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SupplierQuery {
    /// Case-insensitive match on name, credit code, contact name or phone
    pub keyword: String,
    pub supplier_type: Option<String>,
    pub active: Option<bool>,
    pub page: usize,
    pub page_size: usize,
}

impl Default for SupplierQuery {
    fn default() -> Self {
        SupplierQuery {
            keyword: String::new(),
            supplier_type: None,
            active: None,
            page: 1,
            page_size: 10,
        }
    }
}

impl SupplierQuery {
    pub fn matches(&self, supplier: &Supplier) -> bool {
        let keyword = self.keyword.trim().to_lowercase();
        let keyword_ok = keyword.is_empty()
            || [
                &supplier.supplier_name,
                &supplier.social_credit_code,
                &supplier.contact_name,
                &supplier.contact_phone,
            ]
            .iter()
            .any(|f| f.to_lowercase().contains(&keyword));

        let type_ok = match &self.supplier_type {
            Some(t) if !t.is_empty() => &supplier.supplier_type == t,
            _ => true,
        };

        let active_ok = self.active.map_or(true, |a| supplier.is_active == a);

        keyword_ok && type_ok && active_ok
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

// ============================================================================
// SEEDING TABLES
// ============================================================================

pub const SUPPLIER_TYPES: [&str; 3] = ["生产厂家", "经销商", "服务商"];

const PROVINCE: &str = "山东省";

const SEED_CITIES: [&str; 14] = [
    "济南市", "青岛市", "烟台市", "潍坊市", "淄博市", "泰安市", "临沂市", "德州市", "威海市",
    "日照市", "枣庄市", "聊城市", "滨州市", "菏泽市",
];

const NAME_PARTS: [&str; 20] = [
    "益安", "泉泰", "泰宁", "新济", "惠民", "德康", "鲁信", "泉成", "安泰", "和康", "博济", "盛泉",
    "远景", "恒瑞", "广济", "瑞宁", "华康", "安成", "京鲁", "康泽",
];

const NAME_SUFFIXES: [&str; 5] = [
    "医药有限公司",
    "医药贸易有限公司",
    "药业有限公司",
    "医疗器械有限公司",
    "生物科技有限公司",
];

const FIRST_SUPPLIER_NAME: &str = "枣庄和康医药有限公司";

const SURNAMES: [&str; 20] = [
    "王", "李", "张", "刘", "陈", "杨", "赵", "黄", "周", "吴", "徐", "孙", "马", "朱", "胡", "郭",
    "何", "高", "林", "罗",
];
const GIVEN_FIRST: [&str; 20] = [
    "伟", "磊", "敏", "静", "婷", "秀", "强", "丽", "军", "芳", "勇", "杰", "娜", "艳", "超", "明",
    "霞", "平", "刚", "玲",
];
const GIVEN_SECOND: [&str; 19] = [
    "华", "娟", "峰", "丹", "楠", "梅", "琳", "波", "琪", "莹", "龙", "凯", "瑞", "倩", "旭", "博",
    "鑫", "宇", "晨",
];
const CONTACT_TITLES: [&str; 5] = ["采购经理", "商务经理", "销售代表", "渠道经理", "客户经理"];

const BUSINESS_SCOPE: &str = "药品、医疗器械批发；消杀用品；中成药、化学药制剂";

/// Person name; every third seed gets a single-character given name
pub fn build_person_name(seed: usize) -> String {
    let surname = SURNAMES[seed % SURNAMES.len()];
    let first = GIVEN_FIRST[seed % GIVEN_FIRST.len()];
    let second = if seed % 3 == 0 {
        ""
    } else {
        GIVEN_SECOND[seed % GIVEN_SECOND.len()]
    };
    format!("{}{}{}", surname, first, second)
}

/// Company name for the i-th (0-based) seeded supplier
pub fn build_supplier_name(i: usize) -> String {
    if i == 0 {
        return FIRST_SUPPLIER_NAME.to_string();
    }
    let city = SEED_CITIES[i % SEED_CITIES.len()].trim_end_matches('市');
    let part = NAME_PARTS[i % NAME_PARTS.len()];
    let suffix = NAME_SUFFIXES[i % NAME_SUFFIXES.len()];
    format!("{}{}{}", city, part, suffix)
}

// ============================================================================
// SUPPLIER SEEDER
// ============================================================================

pub struct SupplierSeeder<'a> {
    synthesizer: &'a IdentifierSynthesizer,
    today: NaiveDate,
}

impl<'a> SupplierSeeder<'a> {
    pub fn new(synthesizer: &'a IdentifierSynthesizer, today: NaiveDate) -> Self {
        SupplierSeeder { synthesizer, today }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// The i-th (0-based) seeded supplier
    pub fn build(&self, i: usize) -> Supplier {
        let n = i + 1;
        let city = SEED_CITIES[i % SEED_CITIES.len()];
        let name = build_supplier_name(i);
        let account = self
            .synthesizer
            .synthesize_account_number(&(n * 31 + i).to_string(), city);

        Supplier {
            id: format!("S-{}", 1000 + n),
            supplier_name: name.clone(),
            social_credit_code: self
                .synthesizer
                .synthesize_identifier(&(n * 123 + i).to_string(), city),
            supplier_type: SUPPLIER_TYPES[n % SUPPLIER_TYPES.len()].to_string(),
            province: PROVINCE.to_string(),
            city: city.to_string(),
            registered_address: format!("{}{}历下区示例路{}号", PROVINCE, city, n),
            is_active: n % 7 != 0,
            legal_person: build_person_name(n * 13 + 5),
            registered_capital: 1000 + (n % 50) as u32 * 100,
            business_scope: BUSINESS_SCOPE.to_string(),
            contact_name: build_person_name(n * 7 + i),
            contact_title: CONTACT_TITLES[(n + i) % CONTACT_TITLES.len()].to_string(),
            contact_phone: self.synthesizer.synthesize_phone(&(n * 17 + i).to_string(), city),
            contact_email: format!("contact{}@corp.local", n),
            bank_name: account.bank_name,
            bank_branch: account.branch,
            bank_account_name: name.clone(),
            bank_account_no: account.account_no,
            invoice_title: name,
            invoice_type: if n % 3 == 0 { "普通发票" } else { "专用发票" }.to_string(),
            tax_rate: if n % 4 == 0 { 6 } else { 13 },
            established_date: self.today - Duration::days(365 * ((n % 10) as i64 + 1)),
            rating_score: Some(60.0 + (n % 40) as f64),
            metrics: None,
        }
    }

    pub fn generate(&self, count: usize) -> Vec<Supplier> {
        (0..count).map(|i| self.build(i)).collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
