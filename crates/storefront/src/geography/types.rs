//! Division types.

use std::fmt;

use serde::{Deserialize, Serialize};

use milk_shop_core::DivisionCode;

/// A province, district or ward.
///
/// The lookup API returns more fields (`division_type`, `codename`, ...);
/// only the code and display name are kept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Division {
    pub code: DivisionCode,
    pub name: String,
}

impl Division {
    #[must_use]
    pub fn new(code: u32, name: impl Into<String>) -> Self {
        Self {
            code: DivisionCode::new(code),
            name: name.into(),
        }
    }
}

/// Level in the province > district > ward hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Province,
    District,
    Ward,
}

impl Level {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Province => "province",
            Self::District => "district",
            Self::Ward => "ward",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `GET /p/{code}?depth=2` response.
#[derive(Debug, Deserialize)]
pub(crate) struct ProvinceDetail {
    #[serde(default)]
    pub districts: Vec<Division>,
}

/// `GET /d/{code}?depth=2` response.
#[derive(Debug, Deserialize)]
pub(crate) struct DistrictDetail {
    #[serde(default)]
    pub wards: Vec<Division>,
}
