//! Cascading province > district > ward selection.
//!
//! [`AddressSelection`] is a three-level dependent-selection state machine:
//!
//! ```text
//!   select_province(p)  -> province = p, district = None, ward = None, revision += 1
//!   select_district(d)  -> district = d, ward = None, revision += 1   (requires province)
//!   select_ward(w)      -> ward = w                                   (requires district)
//! ```
//!
//! Selecting a parent hands back a [`SelectionTicket`] naming the child list
//! that now has to be loaded. Options fetched with a ticket are only accepted
//! while the ticket's revision is still current, so the response for a
//! superseded province or district can never be shown against a newer
//! selection.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use milk_shop_core::DivisionCode;

use crate::geography::{Division, Level};

/// Errors raised by invalid selection transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// A district was chosen before any province.
    #[error("Please select a province first")]
    ProvinceRequired,

    /// A ward was chosen before any district.
    #[error("Please select a district first")]
    DistrictRequired,

    /// The code is not among the options for the current parent.
    #[error("Unknown {level} code {code}")]
    UnknownOption { level: Level, code: DivisionCode },

    /// The options were requested for a selection that has since changed.
    #[error("The {0} list was loaded for an earlier selection")]
    Stale(Level),
}

/// Receipt for a child option list that must be loaded after a parent change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionTicket {
    level: Level,
    parent: DivisionCode,
    revision: u64,
}

impl SelectionTicket {
    /// The level whose options should be fetched.
    #[must_use]
    pub const fn level(&self) -> Level {
        self.level
    }

    /// The parent division the options belong to.
    #[must_use]
    pub const fn parent(&self) -> DivisionCode {
        self.parent
    }
}

/// The shipping address being entered at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressSelection {
    province: Option<Division>,
    district: Option<Division>,
    ward: Option<Division>,
    /// House number and street name, typed freely.
    pub street: String,
    revision: u64,
}

impl AddressSelection {
    #[must_use]
    pub const fn province(&self) -> Option<&Division> {
        self.province.as_ref()
    }

    #[must_use]
    pub const fn district(&self) -> Option<&Division> {
        self.district.as_ref()
    }

    #[must_use]
    pub const fn ward(&self) -> Option<&Division> {
        self.ward.as_ref()
    }

    /// The selection at `level`.
    #[must_use]
    pub const fn at(&self, level: Level) -> Option<&Division> {
        match level {
            Level::Province => self.province(),
            Level::District => self.district(),
            Level::Ward => self.ward(),
        }
    }

    /// Choose a province. Clears district and ward.
    pub fn select_province(&mut self, province: Division) -> SelectionTicket {
        let parent = province.code;
        self.province = Some(province);
        self.district = None;
        self.ward = None;
        self.revision += 1;

        SelectionTicket {
            level: Level::District,
            parent,
            revision: self.revision,
        }
    }

    /// Choose a district of the selected province. Clears ward.
    ///
    /// # Errors
    ///
    /// Returns `SelectionError::ProvinceRequired` if no province is selected;
    /// the selection is left untouched.
    pub fn select_district(&mut self, district: Division) -> Result<SelectionTicket, SelectionError> {
        if self.province.is_none() {
            return Err(SelectionError::ProvinceRequired);
        }

        let parent = district.code;
        self.district = Some(district);
        self.ward = None;
        self.revision += 1;

        Ok(SelectionTicket {
            level: Level::Ward,
            parent,
            revision: self.revision,
        })
    }

    /// Choose a ward of the selected district.
    ///
    /// # Errors
    ///
    /// Returns `SelectionError::DistrictRequired` if no district is selected.
    pub fn select_ward(&mut self, ward: Division) -> Result<(), SelectionError> {
        if self.district.is_none() {
            return Err(SelectionError::DistrictRequired);
        }

        self.ward = Some(ward);
        Ok(())
    }

    /// Whether `ticket` still describes the current selection.
    #[must_use]
    pub const fn is_current(&self, ticket: &SelectionTicket) -> bool {
        ticket.revision == self.revision
    }

    /// Accept a child option list loaded for `ticket`.
    ///
    /// # Errors
    ///
    /// Returns `SelectionError::Stale` if the selection changed after the
    /// ticket was issued.
    pub fn accept_options<T>(
        &self,
        ticket: &SelectionTicket,
        options: T,
    ) -> Result<T, SelectionError> {
        if self.is_current(ticket) {
            Ok(options)
        } else {
            Err(SelectionError::Stale(ticket.level))
        }
    }

    /// The ticket for the `level` option list the current selection needs.
    ///
    /// Used when re-rendering: a selected district needs its wards, a
    /// selected province its districts. `None` when the parent is unset.
    #[must_use]
    pub fn pending_ticket(&self, level: Level) -> Option<SelectionTicket> {
        let parent = match level {
            Level::Province => return None,
            Level::District => self.province.as_ref()?,
            Level::Ward => self.district.as_ref()?,
        };

        Some(SelectionTicket {
            level,
            parent: parent.code,
            revision: self.revision,
        })
    }

    /// `street, ward, district, province`.
    ///
    /// Missing parts render as empty strings; callers validate first.
    #[must_use]
    pub fn formatted(&self) -> String {
        fn name(division: Option<&Division>) -> &str {
            division.map_or("", |d| d.name.as_str())
        }

        format!(
            "{}, {}, {}, {}",
            self.street.trim(),
            name(self.ward()),
            name(self.district()),
            name(self.province()),
        )
    }
}

/// Look up `code` among `options`.
///
/// # Errors
///
/// Returns `SelectionError::UnknownOption` when the code is not offered.
pub fn find_option(
    options: &[Division],
    level: Level,
    code: DivisionCode,
) -> Result<Division, SelectionError> {
    options
        .iter()
        .find(|d| d.code == code)
        .cloned()
        .ok_or(SelectionError::UnknownOption { level, code })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn hcm() -> Division {
        Division::new(79, "Thành phố Hồ Chí Minh")
    }

    fn hanoi() -> Division {
        Division::new(1, "Thành phố Hà Nội")
    }

    fn district_1() -> Division {
        Division::new(760, "Quận 1")
    }

    fn ben_nghe() -> Division {
        Division::new(26740, "Phường Bến Nghé")
    }

    fn complete() -> AddressSelection {
        let mut address = AddressSelection::default();
        address.select_province(hcm());
        address.select_district(district_1()).unwrap();
        address.select_ward(ben_nghe()).unwrap();
        address
    }

    #[test]
    fn test_changing_province_clears_district_and_ward() {
        let mut address = complete();

        let ticket = address.select_province(hanoi());

        assert_eq!(address.province(), Some(&hanoi()));
        assert_eq!(address.district(), None);
        assert_eq!(address.ward(), None);
        assert_eq!(ticket.level(), Level::District);
        assert_eq!(ticket.parent(), DivisionCode::new(1));
    }

    #[test]
    fn test_reselecting_same_province_still_clears_children() {
        let mut address = complete();
        address.select_province(hcm());
        assert!(address.district().is_none());
        assert!(address.ward().is_none());
    }

    #[test]
    fn test_changing_district_clears_ward_only() {
        let mut address = complete();

        let ticket = address
            .select_district(Division::new(770, "Quận 3"))
            .unwrap();

        assert_eq!(address.province(), Some(&hcm()));
        assert_eq!(address.district().unwrap().code, DivisionCode::new(770));
        assert_eq!(address.ward(), None);
        assert_eq!(ticket.level(), Level::Ward);
    }

    #[test]
    fn test_district_requires_province() {
        let mut address = AddressSelection::default();
        let before = address.clone();

        assert_eq!(
            address.select_district(district_1()),
            Err(SelectionError::ProvinceRequired)
        );
        assert_eq!(address, before);
    }

    #[test]
    fn test_ward_requires_district() {
        let mut address = AddressSelection::default();
        address.select_province(hcm());
        let before = address.clone();

        assert_eq!(
            address.select_ward(ben_nghe()),
            Err(SelectionError::DistrictRequired)
        );
        assert_eq!(address, before);
    }

    #[test]
    fn test_stale_ticket_is_rejected() {
        let mut address = AddressSelection::default();
        let first = address.select_province(hanoi());
        let second = address.select_province(hcm());

        let late = address.accept_options(&first, vec![Division::new(1, "Quận Ba Đình")]);
        assert_eq!(late, Err(SelectionError::Stale(Level::District)));

        let fresh = address.accept_options(&second, vec![district_1()]).unwrap();
        assert_eq!(fresh, vec![district_1()]);
    }

    #[test]
    fn test_district_ticket_goes_stale_when_province_changes() {
        let mut address = AddressSelection::default();
        address.select_province(hcm());
        let wards_ticket = address.select_district(district_1()).unwrap();

        address.select_province(hanoi());

        assert!(!address.is_current(&wards_ticket));
    }

    #[test]
    fn test_ward_selection_keeps_tickets_current() {
        let mut address = AddressSelection::default();
        address.select_province(hcm());
        let ticket = address.select_district(district_1()).unwrap();
        address.select_ward(ben_nghe()).unwrap();
        assert!(address.is_current(&ticket));
    }

    #[test]
    fn test_pending_ticket_follows_selection() {
        let mut address = AddressSelection::default();
        assert!(address.pending_ticket(Level::District).is_none());

        address.select_province(hcm());
        let ticket = address.pending_ticket(Level::District).unwrap();
        assert_eq!(ticket.parent(), hcm().code);
        assert!(address.pending_ticket(Level::Ward).is_none());
        assert!(address.pending_ticket(Level::Province).is_none());
    }

    #[test]
    fn test_formatted_address_order() {
        let mut address = complete();
        address.street = "12 Lê Lợi".to_string();

        assert_eq!(
            address.formatted(),
            "12 Lê Lợi, Phường Bến Nghé, Quận 1, Thành phố Hồ Chí Minh"
        );
    }

    #[test]
    fn test_find_option() {
        let options = vec![hanoi(), hcm()];
        assert_eq!(
            find_option(&options, Level::Province, DivisionCode::new(79)),
            Ok(hcm())
        );
        assert_eq!(
            find_option(&options, Level::Province, DivisionCode::new(48)),
            Err(SelectionError::UnknownOption {
                level: Level::Province,
                code: DivisionCode::new(48)
            })
        );
    }

    #[test]
    fn test_serde_roundtrip_keeps_revision() {
        let mut address = AddressSelection::default();
        let ticket = address.select_province(hcm());

        let json = serde_json::to_string(&address).unwrap();
        let restored: AddressSelection = serde_json::from_str(&json).unwrap();

        assert!(restored.is_current(&ticket));
    }
}
