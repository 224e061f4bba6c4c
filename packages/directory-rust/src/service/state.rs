//! State filter: whether the service is up and accepting requests.

use omm_core::codec::{Data, ElementListEncoder};
use omm_core::{FilterEntryAction, State};

use super::info::merge_option;
use super::{FilterCodec, FilterMerge};
use crate::error::DirectoryError;
use crate::rdm::{element, FilterId, ServiceStateValue};
use crate::wire;

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceState {
    pub action: FilterEntryAction,
    /// Mandatory on the wire.
    pub service_state: ServiceStateValue,
    pub accepting_requests: Option<bool>,
    /// Applies to every item stream of the service.
    pub status: Option<State>,
}

impl Default for ServiceState {
    fn default() -> Self {
        Self {
            action: FilterEntryAction::Set,
            service_state: ServiceStateValue::Up,
            accepting_requests: None,
            status: None,
        }
    }
}

impl ServiceState {
    #[must_use]
    pub fn new(service_state: ServiceStateValue) -> Self {
        Self {
            service_state,
            ..Self::default()
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Defaults to `true` when not advertised.
    #[must_use]
    pub fn is_accepting_requests(&self) -> bool {
        self.accepting_requests.unwrap_or(true)
    }

    /// The advertised status, or Open/Ok/None.
    #[must_use]
    pub fn status_or_default(&self) -> State {
        self.status.clone().unwrap_or_default()
    }
}

impl FilterMerge for ServiceState {
    fn merge_into(&self, dest: &mut Self) {
        dest.action = self.action;
        dest.service_state = self.service_state;
        merge_option(self.accepting_requests.as_ref(), &mut dest.accepting_requests);
        merge_option(self.status.as_ref(), &mut dest.status);
    }
}

impl FilterCodec for ServiceState {
    const ID: FilterId = FilterId::State;

    fn action(&self) -> FilterEntryAction {
        self.action
    }

    fn set_action(&mut self, action: FilterEntryAction) {
        self.action = action;
    }

    fn encode_payload(&self) -> Result<Data, DirectoryError> {
        let mut elements = ElementListEncoder::new();
        elements.add_uint(element::SERVICE_STATE, self.service_state.as_uint());
        if let Some(accepting) = self.accepting_requests {
            elements.add_bool(element::ACCEPTING_REQUESTS, accepting);
        }
        if let Some(status) = &self.status {
            elements.add(element::STATUS, Data::State(status.clone()));
        }
        Ok(elements.complete())
    }

    fn decode_payload(&mut self, payload: &Data) -> Result<(), DirectoryError> {
        let mut service_state = None;
        for entry in payload.as_element_list()?.entries() {
            match entry.name.as_str() {
                element::SERVICE_STATE => {
                    service_state = wire::enumerated(&entry.data, ServiceStateValue::from_uint)?;
                }
                element::ACCEPTING_REQUESTS => {
                    self.accepting_requests = wire::flag(&entry.data)?;
                }
                element::STATUS => self.status = wire::state(&entry.data)?,
                _ => {}
            }
        }
        self.service_state = wire::required(service_state, "State", element::SERVICE_STATE)?;
        Ok(())
    }
}
