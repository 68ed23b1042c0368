// 🗺️ Region Entity - City → administrative code + dialing code
//
// Administrative codes feed the 6-digit region segment of registration
// identifiers; dialing codes feed synthetic landline numbers.

use serde::{Deserialize, Serialize};

/// Region segment used when a city is not in the table
pub const DEFAULT_ADMIN_CODE: &str = "370100";

/// Landline prefix used when a city has no dialing code
pub const DEFAULT_DIALING_CODE: &str = "0531";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    /// City name as it appears on supplier records (e.g. "济南市")
    pub city: String,

    /// 6-digit administrative division code
    pub admin_code: String,

    /// Telephone area code, if known
    #[serde(default)]
    pub dialing_code: Option<String>,
}

impl Region {
    pub fn new(city: &str, admin_code: &str, dialing_code: Option<&str>) -> Self {
        Region {
            city: city.to_string(),
            admin_code: admin_code.to_string(),
            dialing_code: dialing_code.map(str::to_string),
        }
    }
}

/// Lookup table of known regions
#[derive(Debug, Clone)]
pub struct RegionTable {
    regions: Vec<Region>,
}

impl RegionTable {
    /// Table of Shandong prefecture-level cities
    pub fn new() -> Self {
        RegionTable {
            regions: vec![
                Region::new("济南市", "370100", Some("0531")),
                Region::new("青岛市", "370200", Some("0532")),
                Region::new("淄博市", "370300", Some("0533")),
                Region::new("枣庄市", "370400", Some("0632")),
                Region::new("东营市", "370500", None),
                Region::new("烟台市", "370600", Some("0535")),
                Region::new("潍坊市", "370700", Some("0536")),
                Region::new("济宁市", "370800", None),
                Region::new("泰安市", "370900", Some("0538")),
                Region::new("威海市", "371000", Some("0631")),
                Region::new("日照市", "371100", Some("0633")),
                Region::new("临沂市", "371300", Some("0539")),
                Region::new("德州市", "371400", Some("0534")),
                Region::new("聊城市", "371500", Some("0635")),
                Region::new("滨州市", "371600", Some("0543")),
                Region::new("菏泽市", "371700", Some("0530")),
            ],
        }
    }

    pub fn from_regions(regions: Vec<Region>) -> Self {
        RegionTable { regions }
    }

    pub fn get(&self, city: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.city == city)
    }

    /// Administrative code for a city, falling back to [`DEFAULT_ADMIN_CODE`]
    pub fn admin_code(&self, city: &str) -> &str {
        self.get(city)
            .map(|r| r.admin_code.as_str())
            .unwrap_or(DEFAULT_ADMIN_CODE)
    }

    /// Dialing code for a city, falling back to [`DEFAULT_DIALING_CODE`]
    pub fn dialing_code(&self, city: &str) -> &str {
        self.get(city)
            .and_then(|r| r.dialing_code.as_deref())
            .unwrap_or(DEFAULT_DIALING_CODE)
    }

    /// Cities in declaration order
    pub fn cities(&self) -> Vec<&str> {
        self.regions.iter().map(|r| r.city.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

impl Default for RegionTable {
    fn default() -> Self {
        Self::new()
    }
}
