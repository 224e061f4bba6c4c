//! Group filter: item-group status changes. A service may announce several
//! groups in one message, one filter entry each.

use omm_core::codec::{Data, ElementListEncoder};
use omm_core::{FilterEntryAction, State};

use super::info::merge_option;
use super::{FilterCodec, FilterMerge};
use crate::error::DirectoryError;
use crate::rdm::{element, FilterId};
use crate::wire;

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceGroup {
    pub action: FilterEntryAction,
    /// Opaque group id.
    pub group: Vec<u8>,
    /// Items of `group` now belong to this group.
    pub merged_to_group: Option<Vec<u8>>,
    /// New state of every item in `group`.
    pub status: Option<State>,
}

impl Default for ServiceGroup {
    fn default() -> Self {
        Self {
            action: FilterEntryAction::Set,
            group: Vec::new(),
            merged_to_group: None,
            status: None,
        }
    }
}

impl ServiceGroup {
    #[must_use]
    pub fn new(group: impl Into<Vec<u8>>) -> Self {
        Self {
            group: group.into(),
            ..Self::default()
        }
    }

    pub fn clear(&mut self) {
        self.action = FilterEntryAction::Set;
        self.group.clear();
        self.merged_to_group = None;
        self.status = None;
    }
}

impl FilterMerge for ServiceGroup {
    fn merge_into(&self, dest: &mut Self) {
        dest.action = self.action;
        dest.group.clone_from(&self.group);
        merge_option(self.merged_to_group.as_ref(), &mut dest.merged_to_group);
        merge_option(self.status.as_ref(), &mut dest.status);
    }
}

impl FilterCodec for ServiceGroup {
    const ID: FilterId = FilterId::Group;

    fn action(&self) -> FilterEntryAction {
        self.action
    }

    fn set_action(&mut self, action: FilterEntryAction) {
        self.action = action;
    }

    fn encode_payload(&self) -> Result<Data, DirectoryError> {
        let mut elements = ElementListEncoder::new();
        elements.add_buffer(element::GROUP, self.group.clone());
        if let Some(merged) = &self.merged_to_group {
            elements.add_buffer(element::MERGED_TO_GROUP, merged.clone());
        }
        if let Some(status) = &self.status {
            elements.add(element::STATUS, Data::State(status.clone()));
        }
        Ok(elements.complete())
    }

    fn decode_payload(&mut self, payload: &Data) -> Result<(), DirectoryError> {
        let mut group = None;
        for entry in payload.as_element_list()?.entries() {
            match entry.name.as_str() {
                element::GROUP => group = wire::bytes(&entry.data)?,
                element::MERGED_TO_GROUP => self.merged_to_group = wire::bytes(&entry.data)?,
                element::STATUS => self.status = wire::state(&entry.data)?,
                _ => {}
            }
        }
        self.group = wire::required(group, "Group", element::GROUP)?;
        Ok(())
    }
}
