// Entity Models
//
// Reference tables the synthesizers draw from (regions, banks) and the
// supplier master record the workflows persist.

pub mod bank;
pub mod region;
pub mod supplier;

pub use bank::{Bank, BankRegistry};
pub use region::{Region, RegionTable};
pub use supplier::{GradedSupplier, Page, Supplier, SupplierQuery, SupplierSeeder};
