//! Administrative division codes.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Code of a province, district or ward as issued by the geography service.
///
/// Codes are opaque: they are only compared for equality and echoed back to
/// the geography service. A code is unique within its level, not across
/// levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DivisionCode(u32);

impl DivisionCode {
    /// Create a division code.
    #[must_use]
    pub const fn new(code: u32) -> Self {
        Self(code)
    }

    /// Get the raw code.
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for DivisionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DivisionCode {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl From<u32> for DivisionCode {
    fn from(code: u32) -> Self {
        Self(code)
    }
}
