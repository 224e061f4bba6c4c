//! The six directory message variants.
//!
//! Each variant converts to and from a transport [`Msg`](omm_core::Msg) on
//! the Source domain. `decode` always starts by clearing the target and
//! clears it again on failure, so a pooled instance never carries state from
//! an earlier or a rejected message.

pub mod close;
pub mod consumer_status;
pub mod refresh;
pub mod request;
pub mod status;
pub mod update;

pub use close::DirectoryClose;
pub use consumer_status::{ConsumerStatusService, DirectoryConsumerStatus};
pub use refresh::DirectoryRefresh;
pub use request::DirectoryRequest;
pub use status::DirectoryStatus;
pub use update::DirectoryUpdate;

use omm_core::{DataType, Msg, MsgKey};

use crate::error::DirectoryError;
use crate::rdm::FilterMask;
use crate::service::{self, Service};
use crate::wire;

/// Reads the service map of a refresh or update. An empty payload carries no
/// services.
fn decode_services(msg: &Msg, services: &mut Vec<Service>) -> Result<(), DirectoryError> {
    match msg.container_type() {
        DataType::NoData => Ok(()),
        DataType::Map => service::decode_service_list(&msg.payload, services),
        found => Err(DirectoryError::UnexpectedContainer {
            context: "directory payload",
            expected: DataType::Map,
            found,
        }),
    }
}

/// Builds a message key from the optional filter and service id, or `None`
/// when neither is set.
fn build_key(
    filter: Option<FilterMask>,
    service_id: Option<u32>,
) -> Result<Option<MsgKey>, DirectoryError> {
    if let Some(service_id) = service_id {
        wire::checked_service_id(service_id)?;
    }
    if filter.is_none() && service_id.is_none() {
        return Ok(None);
    }
    Ok(Some(MsgKey {
        service_id,
        name: None,
        filter: filter.map(FilterMask::bits),
    }))
}

/// Reads the key's service id, rejecting ids wider than the 16-bit wire
/// field.
fn key_service_id(key: &MsgKey) -> Result<Option<u32>, DirectoryError> {
    key.service_id
        .map(|id| wire::service_id_from_uint(u64::from(id)))
        .transpose()
}

/// Runs `decode` on a freshly cleared target, clearing it again on error.
fn decode_cleared<T>(
    target: &mut T,
    clear: fn(&mut T),
    decode: impl FnOnce(&mut T) -> Result<(), DirectoryError>,
) -> Result<(), DirectoryError> {
    clear(target);
    let result = decode(target);
    if result.is_err() {
        clear(target);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_omitted_when_empty() {
        assert_eq!(build_key(None, None).unwrap(), None);
        let key = build_key(Some(FilterMask::INFO), Some(3)).unwrap().unwrap();
        assert_eq!(key.filter, Some(0x01));
        assert_eq!(key.service_id, Some(3));
        assert!(build_key(None, Some(0x1_0000)).is_err());
    }

    #[test]
    fn key_service_id_must_fit_sixteen_bits() {
        let mut key = MsgKey {
            service_id: Some(0xFFFF),
            ..MsgKey::default()
        };
        assert_eq!(key_service_id(&key).unwrap(), Some(0xFFFF));
        key.service_id = Some(0x1_0000);
        assert!(matches!(
            key_service_id(&key),
            Err(DirectoryError::InvalidValue {
                kind: "service id",
                value: 0x1_0000
            })
        ));
        key.service_id = None;
        assert_eq!(key_service_id(&key).unwrap(), None);
    }
}
