//! Thin adapter between directory types and the `omm-core` container codec.
//!
//! Element payloads carry scalars tagged by name. The helpers here read those
//! scalars with the directory's rules (blank means absent, strings may arrive
//! as ASCII or buffer) and build the primitive arrays the Info filter uses.

use omm_core::codec::{ArrayEncoder, Data};
use omm_core::{CodecError, DataType, DomainType, Msg, MsgClass, Qos};

use crate::error::DirectoryError;

/// Largest service id representable on the wire.
pub(crate) const MAX_SERVICE_ID: u32 = 0xFFFF;

pub(crate) fn expect_message(msg: &Msg, expected: MsgClass) -> Result<(), DirectoryError> {
    if msg.msg_class != expected {
        return Err(DirectoryError::WrongMsgClass {
            expected,
            found: msg.msg_class,
        });
    }
    if msg.domain != DomainType::Source {
        return Err(DirectoryError::WrongDomain { found: msg.domain });
    }
    Ok(())
}

pub(crate) fn expect_container(
    context: &'static str,
    expected: DataType,
    found: DataType,
) -> Result<(), DirectoryError> {
    if expected == found {
        Ok(())
    } else {
        Err(DirectoryError::UnexpectedContainer {
            context,
            expected,
            found,
        })
    }
}

pub(crate) fn required<T>(
    value: Option<T>,
    filter: &'static str,
    element: &'static str,
) -> Result<T, DirectoryError> {
    value.ok_or(DirectoryError::MissingElement { filter, element })
}

/// Rejects ids that do not fit the 16-bit wire field.
pub(crate) fn checked_service_id(service_id: u32) -> Result<u64, DirectoryError> {
    if service_id > MAX_SERVICE_ID {
        return Err(DirectoryError::ServiceIdOutOfRange { service_id });
    }
    Ok(u64::from(service_id))
}

pub(crate) fn service_id_from_uint(value: u64) -> Result<u32, DirectoryError> {
    u32::try_from(value)
        .ok()
        .filter(|id| *id <= MAX_SERVICE_ID)
        .ok_or(DirectoryError::InvalidValue {
            kind: "service id",
            value,
        })
}

/// Surfaces an unknown enumeration code as a directory-level error.
pub(crate) fn value_error(err: CodecError) -> DirectoryError {
    match err {
        CodecError::InvalidValue { kind, value } => DirectoryError::InvalidValue { kind, value },
        other => DirectoryError::Codec(other),
    }
}

// ---- Scalar reads ----

pub(crate) fn uint(data: &Data) -> Result<Option<u64>, DirectoryError> {
    Ok(data.as_uint()?)
}

pub(crate) fn flag(data: &Data) -> Result<Option<bool>, DirectoryError> {
    Ok(data.as_uint()?.map(|value| value != 0))
}

pub(crate) fn enumerated<T>(
    data: &Data,
    parse: fn(u64) -> Result<T, CodecError>,
) -> Result<Option<T>, DirectoryError> {
    match data.as_uint()? {
        Some(value) => parse(value).map(Some).map_err(value_error),
        None => Ok(None),
    }
}

/// Reads a string that may be encoded as ASCII or as a buffer.
pub(crate) fn text(data: &Data) -> Result<Option<String>, DirectoryError> {
    Ok(match data {
        Data::Ascii(value) => Some(value.clone()),
        other => other
            .as_buffer()?
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned()),
    })
}

pub(crate) fn bytes(data: &Data) -> Result<Option<Vec<u8>>, DirectoryError> {
    Ok(data.as_buffer()?.map(<[u8]>::to_vec))
}

pub(crate) fn state(data: &Data) -> Result<Option<omm_core::State>, DirectoryError> {
    Ok(data.as_state()?.cloned())
}

// ---- Arrays ----

pub(crate) fn uint_list(data: &Data) -> Result<Vec<u64>, DirectoryError> {
    let array = data.as_array()?;
    expect_container("array", DataType::UInt, array.primitive_type())?;
    let mut values = Vec::with_capacity(array.len());
    for item in array.items() {
        if let Some(value) = item?.as_uint()? {
            values.push(value);
        }
    }
    Ok(values)
}

pub(crate) fn text_list(data: &Data) -> Result<Vec<String>, DirectoryError> {
    let array = data.as_array()?;
    if !matches!(
        array.primitive_type(),
        DataType::AsciiString | DataType::Buffer
    ) {
        return Err(DirectoryError::UnexpectedContainer {
            context: "array",
            expected: DataType::AsciiString,
            found: array.primitive_type(),
        });
    }
    let mut values = Vec::with_capacity(array.len());
    for item in array.items() {
        if let Some(value) = text(item?)? {
            values.push(value);
        }
    }
    Ok(values)
}

pub(crate) fn qos_list(data: &Data) -> Result<Vec<Qos>, DirectoryError> {
    let array = data.as_array()?;
    expect_container("array", DataType::Qos, array.primitive_type())?;
    let mut values = Vec::with_capacity(array.len());
    for item in array.items() {
        if let Some(qos) = item?.as_qos()? {
            values.push(*qos);
        }
    }
    Ok(values)
}

pub(crate) fn encode_uint_list(values: &[u64]) -> Result<Data, DirectoryError> {
    let mut array = ArrayEncoder::new(DataType::UInt)?;
    for value in values {
        array.add(Data::UInt(*value))?;
    }
    Ok(array.complete())
}

pub(crate) fn encode_text_list(values: &[String]) -> Result<Data, DirectoryError> {
    let mut array = ArrayEncoder::new(DataType::AsciiString)?;
    for value in values {
        array.add(Data::Ascii(value.clone()))?;
    }
    Ok(array.complete())
}

pub(crate) fn encode_qos_list(values: &[Qos]) -> Result<Data, DirectoryError> {
    let mut array = ArrayEncoder::new(DataType::Qos)?;
    for value in values {
        array.add(Data::Qos(*value))?;
    }
    Ok(array.complete())
}
