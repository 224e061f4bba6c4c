//! Data filter: a typed payload broadcast to every consumer of the service.

use omm_core::codec::{Data, ElementListEncoder};
use omm_core::{DataType, FilterEntryAction};

use super::{FilterCodec, FilterMerge};
use crate::error::DirectoryError;
use crate::rdm::{element, DataFilterType, FilterId};
use crate::wire;

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceData {
    pub action: FilterEntryAction,
    /// What the payload means. See [`DataFilterType`] for the standard codes.
    pub data_type: u64,
    /// The payload; it carries its own [`DataType`].
    pub data: Option<Data>,
}

impl Default for ServiceData {
    fn default() -> Self {
        Self {
            action: FilterEntryAction::Set,
            data_type: DataFilterType::None.as_uint(),
            data: None,
        }
    }
}

impl ServiceData {
    #[must_use]
    pub fn new(data_type: DataFilterType, data: Data) -> Self {
        Self {
            action: FilterEntryAction::Set,
            data_type: data_type.as_uint(),
            data: Some(data),
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Type code of the payload, `NoData` when there is none.
    #[must_use]
    pub fn payload_type(&self) -> DataType {
        self.data.as_ref().map_or(DataType::NoData, Data::data_type)
    }
}

impl FilterMerge for ServiceData {
    fn merge_into(&self, dest: &mut Self) {
        dest.action = self.action;
        dest.data_type = self.data_type;
        if let Some(data) = &self.data {
            dest.data = Some(data.clone());
        }
    }
}

impl FilterCodec for ServiceData {
    const ID: FilterId = FilterId::Data;

    fn action(&self) -> FilterEntryAction {
        self.action
    }

    fn set_action(&mut self, action: FilterEntryAction) {
        self.action = action;
    }

    fn encode_payload(&self) -> Result<Data, DirectoryError> {
        let mut elements = ElementListEncoder::new();
        elements.add_uint(element::TYPE, self.data_type);
        if let Some(data) = &self.data {
            elements.add(element::DATA, data.clone());
        }
        Ok(elements.complete())
    }

    fn decode_payload(&mut self, payload: &Data) -> Result<(), DirectoryError> {
        let mut data_type = None;
        for entry in payload.as_element_list()?.entries() {
            match entry.name.as_str() {
                element::TYPE => data_type = wire::uint(&entry.data)?,
                element::DATA => self.data = Some(entry.data.clone()),
                _ => {}
            }
        }
        match data_type {
            Some(code) => self.data_type = code,
            // A payload is meaningless without its type.
            None if self.data.is_some() => {
                return Err(DirectoryError::MissingElement {
                    filter: "Data",
                    element: element::TYPE,
                });
            }
            None => {}
        }
        Ok(())
    }
}
