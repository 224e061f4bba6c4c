//! Load filter: how many more streams the service will take.

use omm_core::codec::{Data, ElementListEncoder};
use omm_core::FilterEntryAction;

use super::info::merge_option;
use super::{FilterCodec, FilterMerge};
use crate::error::DirectoryError;
use crate::rdm::{element, FilterId};
use crate::wire;

/// Open limit and open window when not advertised: unlimited.
pub const UNLIMITED: u64 = u64::MAX;
/// Load factor when not advertised.
pub const DEFAULT_LOAD_FACTOR: u64 = 65_535;

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceLoad {
    pub action: FilterEntryAction,
    /// Maximum number of streams the consumer should open.
    pub open_limit: Option<u64>,
    /// Maximum number of outstanding requests.
    pub open_window: Option<u64>,
    /// Relative load; lower is less loaded.
    pub load_factor: Option<u64>,
}

impl Default for ServiceLoad {
    fn default() -> Self {
        Self {
            action: FilterEntryAction::Set,
            open_limit: None,
            open_window: None,
            load_factor: None,
        }
    }
}

impl ServiceLoad {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn open_limit_or_default(&self) -> u64 {
        self.open_limit.unwrap_or(UNLIMITED)
    }

    #[must_use]
    pub fn open_window_or_default(&self) -> u64 {
        self.open_window.unwrap_or(UNLIMITED)
    }

    #[must_use]
    pub fn load_factor_or_default(&self) -> u64 {
        self.load_factor.unwrap_or(DEFAULT_LOAD_FACTOR)
    }
}

impl FilterMerge for ServiceLoad {
    fn merge_into(&self, dest: &mut Self) {
        dest.action = self.action;
        merge_option(self.open_limit.as_ref(), &mut dest.open_limit);
        merge_option(self.open_window.as_ref(), &mut dest.open_window);
        merge_option(self.load_factor.as_ref(), &mut dest.load_factor);
    }
}

impl FilterCodec for ServiceLoad {
    const ID: FilterId = FilterId::Load;

    fn action(&self) -> FilterEntryAction {
        self.action
    }

    fn set_action(&mut self, action: FilterEntryAction) {
        self.action = action;
    }

    fn encode_payload(&self) -> Result<Data, DirectoryError> {
        let mut elements = ElementListEncoder::new();
        if let Some(limit) = self.open_limit {
            elements.add_uint(element::OPEN_LIMIT, limit);
        }
        if let Some(window) = self.open_window {
            elements.add_uint(element::OPEN_WINDOW, window);
        }
        if let Some(factor) = self.load_factor {
            elements.add_uint(element::LOAD_FACTOR, factor);
        }
        Ok(elements.complete())
    }

    fn decode_payload(&mut self, payload: &Data) -> Result<(), DirectoryError> {
        for entry in payload.as_element_list()?.entries() {
            match entry.name.as_str() {
                element::OPEN_LIMIT => self.open_limit = wire::uint(&entry.data)?,
                element::OPEN_WINDOW => self.open_window = wire::uint(&entry.data)?,
                element::LOAD_FACTOR => self.load_factor = wire::uint(&entry.data)?,
                _ => {}
            }
        }
        Ok(())
    }
}
