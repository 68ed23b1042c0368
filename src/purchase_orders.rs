// 🧾 Purchase Orders - Seeded orders, derived line items, status flow
//
// Orders are seeded round-robin over the supplier list. Line items are not
// stored by the seeder: an order without items gets them derived from its
// order number, so the same order always shows the same lines.

use crate::entities::Supplier;
use crate::hashing::hash;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Orders written by a seeding run
pub const SEEDED_ORDER_COUNT: usize = 120;

pub const DEFAULT_CURRENCY: &str = "CNY";

/// Upper bound (inclusive) on derived line items per order
pub const MAX_LINE_ITEMS: u32 = 5;

pub const DRUG_NAMES: [&str; 20] = [
    "注射用头孢曲松钠 1g*10支/盒",
    "阿莫西林胶囊 0.25g*24粒/盒",
    "甲硝唑注射液 100ml*10支/盒",
    "复方丹参滴丸 27mg*180丸/瓶",
    "板蓝根颗粒 10g*20袋/盒",
    "氨茶碱注射液 250mg*10支/盒",
    "维生素C注射液 500mg*10支/盒",
    "生理氯化钠注射液 500ml*20袋/箱",
    "葡萄糖注射液 250ml*20袋/箱",
    "碘伏消毒液 500ml*12瓶/箱",
    "一次性注射器 5ml*100支/盒",
    "医用口罩 50个/盒",
    "红霉素软膏 10g*10支/盒",
    "布洛芬缓释胶囊 0.3g*20粒/盒",
    "奥美拉唑肠溶胶囊 20mg*14粒/盒",
    "硝苯地平缓释片 30mg*7片/盒",
    "阿司匹林肠溶片 25mg*30片/盒",
    "胰岛素注射液 300IU*3ml/支",
    "肝素钠注射液 12500IU*2ml/支",
    "地塞米松注射液 5mg*10支/盒",
];

// ============================================================================
// STATUS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoStatus {
    Draft,
    Submitted,
    Received,
    Reconciled,
}

impl PoStatus {
    /// Seeding order: the n-th order gets `ALL[n % 4]`
    pub const ALL: [PoStatus; 4] = [
        PoStatus::Draft,
        PoStatus::Submitted,
        PoStatus::Received,
        PoStatus::Reconciled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PoStatus::Draft => "draft",
            PoStatus::Submitted => "submitted",
            PoStatus::Received => "received",
            PoStatus::Reconciled => "reconciled",
        }
    }
}

impl fmt::Display for PoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status transition requested by a user.
///
/// Each action moves the order straight to its target status; the current
/// status is not checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoAction {
    Submit,
    Receive,
    Reconcile,
}

impl PoAction {
    pub fn target(&self) -> PoStatus {
        match self {
            PoAction::Submit => PoStatus::Submitted,
            PoAction::Receive => PoStatus::Received,
            PoAction::Reconcile => PoStatus::Reconciled,
        }
    }
}

impl FromStr for PoAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submit" => Ok(PoAction::Submit),
            "receive" => Ok(PoAction::Receive),
            "reconcile" => Ok(PoAction::Reconcile),
            other => Err(format!("Unknown purchase order action: {}", other)),
        }
    }
}

// ============================================================================
// ORDERS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub sku: String,
    pub name: String,
    pub qty: u32,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrder {
    pub po_no: String,
    pub supplier_id: String,
    pub supplier_name: String,
    pub po_date: NaiveDate,
    pub currency: String,
    pub amount: f64,
    pub status: PoStatus,
    #[serde(default)]
    pub items: Vec<LineItem>,
}

impl PurchaseOrder {
    pub fn apply(&mut self, action: PoAction) {
        self.status = action.target();
    }

    /// Fill in derived line items when the order has none
    pub fn ensure_line_items(&mut self) {
        if self.items.is_empty() {
            self.items = synthesize_line_items(&self.po_no);
        }
    }
}

/// Amount of the n-th seeded order (1-based)
pub fn seed_amount(n: usize) -> f64 {
    let base = 200_000 + (n % 300) as u64 * 28_888;
    let jitter = u64::from(hash(&n.to_string()) % 100) * 10_000;
    (base + jitter) as f64
}

/// Seeded orders: `PO2025{10000 + n}` for n in 1..=120, supplier
/// `suppliers[n % len]`, dated n days before `today`.
pub fn seed_purchase_orders(suppliers: &[Supplier], today: NaiveDate) -> Vec<PurchaseOrder> {
    if suppliers.is_empty() {
        return Vec::new();
    }

    (1..=SEEDED_ORDER_COUNT)
        .map(|n| {
            let supplier = &suppliers[n % suppliers.len()];
            PurchaseOrder {
                po_no: format!("PO2025{}", 10_000 + n),
                supplier_id: supplier.id.clone(),
                supplier_name: supplier.supplier_name.clone(),
                po_date: today - Duration::days(n as i64),
                currency: DEFAULT_CURRENCY.to_string(),
                amount: seed_amount(n),
                status: PoStatus::ALL[n % PoStatus::ALL.len()],
                items: Vec::new(),
            }
        })
        .collect()
}

/// Derive 1 to 5 line items from an order number.
///
/// Prices fall in 5000..=100000 (steps of 100), quantities in 50..=500.
pub fn synthesize_line_items(po_no: &str) -> Vec<LineItem> {
    let count = 1 + hash(po_no) % MAX_LINE_ITEMS;

    (1..=count)
        .map(|n| {
            let price = 5_000 + (hash(&format!("{}-{}-price", po_no, n)) % 951) * 100;
            let qty = 50 + hash(&format!("{}-{}-qty", po_no, n)) % 451;

            // last five digits, so the SKU is always SKU + 5 digits
            let sku_seed = (10_000 + u64::from(hash(&format!("{}{}", po_no, n)))).to_string();
            let sku = format!("SKU{}", &sku_seed[sku_seed.len() - 5..]);

            let name = DRUG_NAMES[hash(&format!("{}-{}-name", po_no, n)) as usize % DRUG_NAMES.len()];

            LineItem {
                sku,
                name: name.to_string(),
                qty,
                price: f64::from(price),
            }
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
