use omm_core::{DomainType, Msg, MsgClass, MsgFlags};
use tracing::trace;

use super::{build_key, decode_cleared, key_service_id};
use crate::error::DirectoryError;
use crate::rdm::FilterMask;
use crate::wire;

/// Opens a directory stream, optionally scoped to one service.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DirectoryRequest {
    pub stream_id: i32,
    /// Keep the stream open for updates after the refresh.
    pub streaming: bool,
    pub service_id: Option<u32>,
    /// Filters the requester wants.
    pub filter: FilterMask,
}

impl DirectoryRequest {
    /// A streaming request for `filter` across all services.
    #[must_use]
    pub fn new(stream_id: i32, filter: FilterMask) -> Self {
        Self {
            stream_id,
            streaming: true,
            service_id: None,
            filter,
        }
    }

    /// A streaming request for Info, State and Group across all services.
    #[must_use]
    pub fn new_default(stream_id: i32) -> Self {
        Self::new(stream_id, FilterMask::DEFAULT_REQUEST)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn flags(&self) -> MsgFlags {
        MsgFlags {
            streaming: self.streaming,
            ..MsgFlags::default()
        }
    }

    /// # Errors
    ///
    /// Returns [`DirectoryError::ServiceIdOutOfRange`] when the key's service
    /// id is above 65535.
    pub fn encode(&self) -> Result<Msg, DirectoryError> {
        trace!(stream_id = self.stream_id, filter = %self.filter, "encoding directory request");
        let mut msg = Msg::new(MsgClass::Request, DomainType::Source, self.stream_id);
        msg.key = build_key(Some(self.filter), self.service_id)?;
        msg.flags = self.flags();
        Ok(msg)
    }

    /// Resets `self`, then fills it from `msg`. The key must carry a filter.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::MissingKey`] or
    /// [`DirectoryError::MissingKeyField`] when the key or its filter is
    /// absent, and [`DirectoryError::InvalidValue`] for a key service id above
    /// 65535. `self` is left cleared on failure.
    pub fn decode(&mut self, msg: &Msg) -> Result<(), DirectoryError> {
        trace!(stream_id = msg.stream_id, "decoding directory request");
        decode_cleared(self, Self::clear, |this| {
            wire::expect_message(msg, MsgClass::Request)?;
            let key = msg.key.as_ref().ok_or(DirectoryError::MissingKey)?;
            let filter = key
                .filter
                .ok_or(DirectoryError::MissingKeyField { field: "filter" })?;

            this.stream_id = msg.stream_id;
            this.streaming = msg.flags.streaming;
            this.service_id = key_service_id(key)?;
            this.filter = FilterMask::from_bits(filter);
            Ok(())
        })
    }
}
