use omm_core::{DomainType, Msg, MsgClass, MsgFlags};
use tracing::trace;

use super::{build_key, decode_cleared, decode_services, key_service_id};
use crate::error::DirectoryError;
use crate::rdm::FilterMask;
use crate::service::{encode_service_list, Service};
use crate::wire;

/// Changes to services since the last refresh or update. Always sent with
/// the do-not-conflate flag.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DirectoryUpdate {
    pub stream_id: i32,
    pub filter: Option<FilterMask>,
    pub service_id: Option<u32>,
    pub seq_num: Option<u32>,
    pub services: Vec<Service>,
}

impl DirectoryUpdate {
    #[must_use]
    pub fn new(stream_id: i32) -> Self {
        Self {
            stream_id,
            ..Self::default()
        }
    }

    pub fn clear(&mut self) {
        self.stream_id = 0;
        self.filter = None;
        self.service_id = None;
        self.seq_num = None;
        self.services.clear();
    }

    #[must_use]
    pub fn flags(&self) -> MsgFlags {
        MsgFlags {
            do_not_conflate: true,
            ..MsgFlags::default()
        }
    }

    /// # Errors
    ///
    /// Returns [`DirectoryError::ServiceIdOutOfRange`] for a service id above
    /// 65535, or a codec error when a filter payload cannot be built.
    pub fn encode(&self) -> Result<Msg, DirectoryError> {
        trace!(
            stream_id = self.stream_id,
            services = self.services.len(),
            "encoding directory update"
        );
        let mut msg = Msg::new(MsgClass::Update, DomainType::Source, self.stream_id);
        msg.key = build_key(self.filter, self.service_id)?;
        msg.flags = self.flags();
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
    /// update, and a decode error when the key or service map is malformed. `self` is left cleared on failure.
    pub fn decode(&mut self, msg: &Msg) -> Result<(), DirectoryError> {
        trace!(stream_id = msg.stream_id, "decoding directory update");
        decode_cleared(self, Self::clear, |this| {
            wire::expect_message(msg, MsgClass::Update)?;
            this.stream_id = msg.stream_id;
            this.seq_num = msg.seq_num;
            if let Some(key) = &msg.key {
                this.filter = key.filter.map(FilterMask::from_bits);
                this.service_id = key_service_id(key)?;
            }
            decode_services(msg, &mut this.services)
        })
    }
}
