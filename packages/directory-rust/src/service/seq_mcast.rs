//! Sequenced-multicast filter: where a multicast consumer finds snapshots,
//! gap recovery, reference data and the multicast channels themselves.

use omm_core::codec::{Data, ElementList, ElementListEncoder, VectorEncoder};
use omm_core::{DataType, FilterEntryAction, VectorEntryAction};

use super::info::merge_option;
use super::{FilterCodec, FilterMerge};
use crate::error::DirectoryError;
use crate::rdm::{element, FilterId};
use crate::wire;

/// A unicast server endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServerEndpoint {
    pub host: String,
    pub port: u64,
}

/// A multicast channel and the domain it carries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct McastChannel {
    pub group: String,
    pub port: u64,
    pub domain: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSeqMcastInfo {
    pub action: FilterEntryAction,
    pub snapshot_server: Option<ServerEndpoint>,
    pub gap_recovery_server: Option<ServerEndpoint>,
    pub reference_data_server: Option<ServerEndpoint>,
    pub streaming_channels: Option<Vec<McastChannel>>,
    pub gap_channels: Option<Vec<McastChannel>>,
}

impl Default for ServiceSeqMcastInfo {
    fn default() -> Self {
        Self {
            action: FilterEntryAction::Set,
            snapshot_server: None,
            gap_recovery_server: None,
            reference_data_server: None,
            streaming_channels: None,
            gap_channels: None,
        }
    }
}

impl ServiceSeqMcastInfo {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl FilterMerge for ServiceSeqMcastInfo {
    fn merge_into(&self, dest: &mut Self) {
        dest.action = self.action;
        merge_option(self.snapshot_server.as_ref(), &mut dest.snapshot_server);
        merge_option(self.gap_recovery_server.as_ref(), &mut dest.gap_recovery_server);
        merge_option(self.reference_data_server.as_ref(), &mut dest.reference_data_server);
        merge_option(self.streaming_channels.as_ref(), &mut dest.streaming_channels);
        merge_option(self.gap_channels.as_ref(), &mut dest.gap_channels);
    }
}

fn add_endpoint(
    elements: &mut ElementListEncoder,
    endpoint: Option<&ServerEndpoint>,
    host_name: &'static str,
    port_name: &'static str,
) {
    if let Some(endpoint) = endpoint {
        elements
            .add_ascii(host_name, endpoint.host.as_str())
            .add_uint(port_name, endpoint.port);
    }
}

fn encode_channels(channels: &[McastChannel]) -> Result<Data, DirectoryError> {
    let mut vector = VectorEncoder::new(DataType::ElementList);
    for (index, channel) in (0_u32..).zip(channels) {
        let mut elements = ElementListEncoder::new();
        elements
            .add_ascii(element::MULTICAST_GROUP, channel.group.as_str())
            .add_uint(element::PORT, channel.port)
            .add_uint(element::DOMAIN, channel.domain);
        vector.add_entry(index, VectorEntryAction::Set, Some(elements.complete()))?;
    }
    Ok(vector.complete())
}

fn decode_channel(list: &ElementList) -> Result<McastChannel, DirectoryError> {
    let (mut group, mut port, mut domain) = (None, None, None);
    for entry in list.entries() {
        match entry.name.as_str() {
            element::MULTICAST_GROUP => group = wire::text(&entry.data)?,
            element::PORT => port = wire::uint(&entry.data)?,
            element::DOMAIN => domain = wire::uint(&entry.data)?,
            _ => {}
        }
    }
    Ok(McastChannel {
        group: wire::required(group, "SeqMcast", element::MULTICAST_GROUP)?,
        port: wire::required(port, "SeqMcast", element::PORT)?,
        domain: wire::required(domain, "SeqMcast", element::DOMAIN)?,
    })
}

fn decode_channels(data: &Data) -> Result<Vec<McastChannel>, DirectoryError> {
    let vector = data.as_vector()?;
    wire::expect_container("multicast channels", DataType::ElementList, vector.container_type())?;
    let mut channels = Vec::with_capacity(vector.len());
    for entry in vector.entries() {
        if let Some(payload) = &entry?.payload {
            channels.push(decode_channel(payload.as_element_list()?)?);
        }
    }
    Ok(channels)
}

/// Pairs a host and port read from separate elements.
fn endpoint(
    host: Option<String>,
    port: Option<u64>,
    host_name: &'static str,
    port_name: &'static str,
) -> Result<Option<ServerEndpoint>, DirectoryError> {
    match (host, port) {
        (Some(host), Some(port)) => Ok(Some(ServerEndpoint { host, port })),
        (None, None) => Ok(None),
        (Some(_), None) => Err(DirectoryError::MissingElement {
            filter: "SeqMcast",
            element: port_name,
        }),
        (None, Some(_)) => Err(DirectoryError::MissingElement {
            filter: "SeqMcast",
            element: host_name,
        }),
    }
}

impl FilterCodec for ServiceSeqMcastInfo {
    const ID: FilterId = FilterId::SeqMcast;

    fn action(&self) -> FilterEntryAction {
        self.action
    }

    fn set_action(&mut self, action: FilterEntryAction) {
        self.action = action;
    }

    fn encode_payload(&self) -> Result<Data, DirectoryError> {
        let mut elements = ElementListEncoder::new();
        add_endpoint(
            &mut elements,
            self.snapshot_server.as_ref(),
            element::SNAPSHOT_SERVER_HOST,
            element::SNAPSHOT_SERVER_PORT,
        );
        add_endpoint(
            &mut elements,
            self.gap_recovery_server.as_ref(),
            element::GAP_RECOVERY_SERVER_HOST,
            element::GAP_RECOVERY_SERVER_PORT,
        );
        add_endpoint(
            &mut elements,
            self.reference_data_server.as_ref(),
            element::REFERENCE_DATA_SERVER_HOST,
            element::REFERENCE_DATA_SERVER_PORT,
        );
        if let Some(channels) = &self.streaming_channels {
            elements.add(element::STREAMING_MCAST_CHANNELS, encode_channels(channels)?);
        }
        if let Some(channels) = &self.gap_channels {
            elements.add(element::GAP_MCAST_CHANNELS, encode_channels(channels)?);
        }
        Ok(elements.complete())
    }

    fn decode_payload(&mut self, payload: &Data) -> Result<(), DirectoryError> {
        let (mut snapshot_host, mut snapshot_port) = (None, None);
        let (mut gap_host, mut gap_port) = (None, None);
        let (mut ref_host, mut ref_port) = (None, None);

        for entry in payload.as_element_list()?.entries() {
            let data = &entry.data;
            match entry.name.as_str() {
                element::SNAPSHOT_SERVER_HOST => snapshot_host = wire::text(data)?,
                element::SNAPSHOT_SERVER_PORT => snapshot_port = wire::uint(data)?,
                element::GAP_RECOVERY_SERVER_HOST => gap_host = wire::text(data)?,
                element::GAP_RECOVERY_SERVER_PORT => gap_port = wire::uint(data)?,
                element::REFERENCE_DATA_SERVER_HOST => ref_host = wire::text(data)?,
                element::REFERENCE_DATA_SERVER_PORT => ref_port = wire::uint(data)?,
                element::STREAMING_MCAST_CHANNELS => {
                    self.streaming_channels = Some(decode_channels(data)?);
                }
                element::GAP_MCAST_CHANNELS => self.gap_channels = Some(decode_channels(data)?),
                _ => {}
            }
        }

        self.snapshot_server = endpoint(
            snapshot_host,
            snapshot_port,
            element::SNAPSHOT_SERVER_HOST,
            element::SNAPSHOT_SERVER_PORT,
        )?;
        self.gap_recovery_server = endpoint(
            gap_host,
            gap_port,
            element::GAP_RECOVERY_SERVER_HOST,
            element::GAP_RECOVERY_SERVER_PORT,
        )?;
        self.reference_data_server = endpoint(
            ref_host,
            ref_port,
            element::REFERENCE_DATA_SERVER_HOST,
            element::REFERENCE_DATA_SERVER_PORT,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(group: &str, port: u64) -> McastChannel {
        McastChannel {
            group: group.into(),
            port,
            domain: 6,
        }
    }

    #[test]
    fn roundtrip_endpoints_and_channels() {
        let info = ServiceSeqMcastInfo {
            snapshot_server: Some(ServerEndpoint {
                host: "snap.local".into(),
                port: 14_002,
            }),
            reference_data_server: Some(ServerEndpoint {
                host: "ref.local".into(),
                port: 14_003,
            }),
            streaming_channels: Some(vec![channel("235.1.1.1", 30_001), channel("235.1.1.2", 30_002)]),
            gap_channels: Some(vec![]),
            ..ServiceSeqMcastInfo::default()
        };
        let mut decoded = ServiceSeqMcastInfo::default();
        decoded.decode_payload(&info.encode_payload().unwrap()).unwrap();
        assert_eq!(decoded, info);
        assert!(decoded.gap_recovery_server.is_none());
    }

    #[test]
    fn host_without_port_is_rejected() {
        let mut elements = ElementListEncoder::new();
        elements.add_ascii(element::GAP_RECOVERY_SERVER_HOST, "gap.local");
        assert!(matches!(
            ServiceSeqMcastInfo::default().decode_payload(&elements.complete()),
            Err(DirectoryError::MissingElement {
                element: element::GAP_RECOVERY_SERVER_PORT,
                ..
            })
        ));
    }
}
