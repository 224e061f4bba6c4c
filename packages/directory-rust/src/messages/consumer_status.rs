//! Consumer status: a generic message on the directory stream in which a
//! consumer tells the provider how it is using each service's source, for
//! example as the active or the standby side of a mirrored pair.

use omm_core::codec::{Data, ElementListEncoder, MapEncoder, MapKey};
use omm_core::{DataType, DomainType, MapEntryAction, Msg, MsgClass, MsgKey};
use tracing::trace;

use super::decode_cleared;
use crate::error::DirectoryError;
use crate::rdm::{element, SourceMirroringMode, CONSUMER_STATUS_NAME};
use crate::wire;

/// One service entry of a consumer status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConsumerStatusService {
    pub service_id: u32,
    pub action: MapEntryAction,
    /// Not encoded for Delete entries.
    pub source_mirroring_mode: SourceMirroringMode,
}

impl ConsumerStatusService {
    #[must_use]
    pub fn new(service_id: u32, source_mirroring_mode: SourceMirroringMode) -> Self {
        Self {
            service_id,
            action: MapEntryAction::Add,
            source_mirroring_mode,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DirectoryConsumerStatus {
    pub stream_id: i32,
    pub services: Vec<ConsumerStatusService>,
}

impl DirectoryConsumerStatus {
    #[must_use]
    pub fn new(stream_id: i32) -> Self {
        Self {
            stream_id,
            services: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.stream_id = 0;
        self.services.clear();
    }

    /// # Errors
    ///
    /// Returns [`DirectoryError::ServiceIdOutOfRange`] for a service id above
    /// 65535.
    pub fn encode(&self) -> Result<Msg, DirectoryError> {
        trace!(
            stream_id = self.stream_id,
            services = self.services.len(),
            "encoding consumer status"
        );
        let mut map = MapEncoder::new(DataType::UInt, DataType::ElementList);
        for service in &self.services {
            let key = MapKey::UInt(wire::checked_service_id(service.service_id)?);
            let payload = if service.action == MapEntryAction::Delete {
                None
            } else {
                let mut elements = ElementListEncoder::new();
                elements.add_uint(
                    element::SOURCE_MIRRORING_MODE,
                    service.source_mirroring_mode.as_uint(),
                );
                Some(elements.complete())
            };
            map.add_entry(service.action, key, payload)?;
        }

        let mut msg = Msg::new(MsgClass::Generic, DomainType::Source, self.stream_id);
        msg.key = Some(MsgKey {
            name: Some(CONSUMER_STATUS_NAME.to_owned()),
            ..MsgKey::default()
        });
        msg.payload = map.complete();
        Ok(msg)
    }

    /// Fails with [`DirectoryError::UnknownGenericName`] for any generic
    /// message other than consumer status.
    ///
    /// # Errors
    ///
    /// Also fails with [`DirectoryError::UnexpectedContainer`] unless the
    /// payload is a map, and with a decode error for a malformed entry.
    /// `self` is left cleared on failure.
    pub fn decode(&mut self, msg: &Msg) -> Result<(), DirectoryError> {
        trace!(stream_id = msg.stream_id, "decoding consumer status");
        decode_cleared(self, Self::clear, |this| {
            wire::expect_message(msg, MsgClass::Generic)?;
            let key = msg.key.as_ref().ok_or(DirectoryError::MissingKey)?;
            let name = key
                .name
                .as_deref()
                .ok_or(DirectoryError::MissingKeyField { field: "name" })?;
            if name != CONSUMER_STATUS_NAME {
                return Err(DirectoryError::UnknownGenericName {
                    name: name.to_owned(),
                });
            }
            wire::expect_container(
                "consumer status payload",
                DataType::Map,
                msg.container_type(),
            )?;
            this.stream_id = msg.stream_id;
            decode_services(&msg.payload, &mut this.services)
        })
    }
}

fn decode_services(
    payload: &Data,
    services: &mut Vec<ConsumerStatusService>,
) -> Result<(), DirectoryError> {
    let map = payload.as_map()?;
    wire::expect_container("consumer status key", DataType::UInt, map.key_type())?;
    wire::expect_container("consumer status", DataType::ElementList, map.container_type())?;

    services.reserve(map.len());
    for entry in map.entries() {
        let entry = entry?;
        let mut service = ConsumerStatusService {
            service_id: wire::service_id_from_uint(entry.key.as_uint()?)?,
            action: entry.action,
            ..ConsumerStatusService::default()
        };
        if entry.action != MapEntryAction::Delete {
            let mut mode = None;
            if let Some(payload) = &entry.payload {
                if let Some(data) = payload.as_element_list()?.get(element::SOURCE_MIRRORING_MODE) {
                    mode = wire::enumerated(data, SourceMirroringMode::from_uint)?;
                }
            }
            service.source_mirroring_mode =
                wire::required(mode, "ConsumerStatus", element::SOURCE_MIRRORING_MODE)?;
        }
        services.push(service);
    }
    Ok(())
}
