use omm_core::{DomainType, Msg, MsgClass, MsgFlags, State};
use tracing::trace;

use super::{build_key, decode_cleared, decode_services, key_service_id};
use crate::error::DirectoryError;
use crate::rdm::FilterMask;
use crate::service::{encode_service_list, Service};
use crate::wire;

/// Full snapshot of the directory, or of one service when `service_id` is
/// set.
///
/// Always encoded as a complete single-part refresh. `clear_cache` tells the
/// receiver to drop everything it holds for the stream before applying the
/// services.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DirectoryRefresh {
    pub stream_id: i32,
    pub state: State,
    /// Filters the services are populated with.
    pub filter: FilterMask,
    pub solicited: bool,
    pub clear_cache: bool,
    pub seq_num: Option<u32>,
    pub service_id: Option<u32>,
    pub services: Vec<Service>,
}

impl DirectoryRefresh {
    #[must_use]
    pub fn new(stream_id: i32, filter: FilterMask) -> Self {
        Self {
            stream_id,
            filter,
            ..Self::default()
        }
    }

    /// Resets every field, keeping the service list's allocation.
    pub fn clear(&mut self) {
        self.stream_id = 0;
        self.state = State::default();
        self.filter = FilterMask::NONE;
        self.solicited = false;
        self.clear_cache = false;
        self.seq_num = None;
        self.service_id = None;
        self.services.clear();
    }

    #[must_use]
    pub fn flags(&self) -> MsgFlags {
        MsgFlags {
            solicited: self.solicited,
            clear_cache: self.clear_cache,
            refresh_complete: true,
            ..MsgFlags::default()
        }
    }

    #[must_use]
    pub fn service(&self, service_id: u32) -> Option<&Service> {
        self.services.iter().find(|s| s.service_id == service_id)
    }

    /// # Errors
    ///
    /// Returns [`DirectoryError::ServiceIdOutOfRange`] for a service id above
    /// 65535, or a codec error when a filter payload cannot be built.
    pub fn encode(&self) -> Result<Msg, DirectoryError> {
        trace!(
            stream_id = self.stream_id,
            filter = %self.filter,
            services = self.services.len(),
            "encoding directory refresh"
        );
        let mut msg = Msg::new(MsgClass::Refresh, DomainType::Source, self.stream_id);
        msg.key = build_key(Some(self.filter), self.service_id)?;
        msg.flags = self.flags();
        msg.state = Some(self.state.clone());
        msg.seq_num = self.seq_num;
        msg.payload = encode_service_list(&self.services)?;
        Ok(msg)
    }

    /// Resets `self`, then fills it from `msg`.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::WrongMsgClass`] or
    /// [`DirectoryError::WrongDomain`] when `msg` is not a Source-domain
    /// refresh, and a decode error when the key or service map is malformed. `self` is left cleared on failure.
    pub fn decode(&mut self, msg: &Msg) -> Result<(), DirectoryError> {
        trace!(stream_id = msg.stream_id, "decoding directory refresh");
        decode_cleared(self, Self::clear, |this| {
            wire::expect_message(msg, MsgClass::Refresh)?;
            this.stream_id = msg.stream_id;
            this.state = msg.state.clone().unwrap_or_default();
            this.solicited = msg.flags.solicited;
            this.clear_cache = msg.flags.clear_cache;
            this.seq_num = msg.seq_num;
            if let Some(key) = &msg.key {
                this.filter = key.filter.map_or(FilterMask::NONE, FilterMask::from_bits);
                this.service_id = key_service_id(key)?;
            }
            decode_services(msg, &mut this.services)
        })
    }
}
