//! Errors surfaced while encoding or decoding directory messages.

use omm_core::{CodecError, DataType, DomainType, MsgClass};

/// A directory message could not be produced or consumed.
///
/// Every decode starts from a cleared target, so on error the target holds
/// nothing from the failed message beyond its reset state.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("expected a {expected:?} message, found {found:?}")]
    WrongMsgClass { expected: MsgClass, found: MsgClass },
    #[error("expected the Source domain, found {found:?}")]
    WrongDomain { found: DomainType },
    #[error("message has no key")]
    MissingKey,
    #[error("message key has no {field}")]
    MissingKeyField { field: &'static str },
    #[error("{context}: expected {expected:?} container, found {found:?}")]
    UnexpectedContainer {
        context: &'static str,
        expected: DataType,
        found: DataType,
    },
    #[error("unknown filter id {id}")]
    UnknownFilterId { id: u8 },
    #[error("unknown generic msg name {name:?}")]
    UnknownGenericName { name: String },
    #[error("{filter} filter is missing required element {element}")]
    MissingElement {
        filter: &'static str,
        element: &'static str,
    },
    #[error("service id {service_id} does not fit in 16 bits")]
    ServiceIdOutOfRange { service_id: u32 },
    #[error("invalid {kind} value: {value}")]
    InvalidValue { kind: &'static str, value: u64 },
    #[error(transparent)]
    Codec(#[from] CodecError),
}
