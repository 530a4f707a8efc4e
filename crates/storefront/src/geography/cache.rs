//! Cache keys for geography responses.

use milk_shop_core::DivisionCode;

/// One cached list of divisions.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Provinces,
    /// Districts of a province.
    Districts(DivisionCode),
    /// Wards of a district.
    Wards(DivisionCode),
}
