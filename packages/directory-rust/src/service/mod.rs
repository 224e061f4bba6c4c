//! Services and their filters.
//!
//! A [`Service`] owns one optional value per singleton filter (Info, State,
//! Load, Data, Link, SeqMcast) plus an ordered list of Group entries. A filter
//! is present exactly when its `Option` is `Some`; there is no separate flag to
//! keep in sync.
//!
//! Every filter implements [`FilterMerge`]:
//! - [`FilterMerge::replace_into`] overwrites the destination completely, the
//!   way a cache entry is rebuilt after an Add or a clear-cache refresh.
//! - [`FilterMerge::merge_into`] copies only what the source carries, the way
//!   an Update is applied to a cached entry.

pub mod data;
pub mod group;
pub mod info;
pub mod link;
pub mod load;
pub mod seq_mcast;
pub mod state;

use omm_core::codec::{Data, FilterEntry, FilterList, FilterListEncoder, MapEncoder, MapKey};
use omm_core::{CodecError, DataType, FilterEntryAction, MapEntryAction};

use crate::error::DirectoryError;
use crate::rdm::{FilterId, FilterMask};
use crate::wire;

pub use data::ServiceData;
pub use group::ServiceGroup;
pub use info::ServiceInfo;
pub use link::{ServiceLink, ServiceLinkInfo};
pub use load::ServiceLoad;
pub use seq_mcast::{McastChannel, ServerEndpoint, ServiceSeqMcastInfo};
pub use state::ServiceState;

/// Full-replace and selective-merge of one value into another of its kind.
pub trait FilterMerge: Clone {
    /// Makes `dest` an exact copy of `self`, reusing its allocations.
    fn replace_into(&self, dest: &mut Self) {
        dest.clone_from(self);
    }

    /// Copies into `dest` only the fields present on `self`.
    fn merge_into(&self, dest: &mut Self);
}

/// Wire mapping of one filter kind to its filter-list entry.
pub(crate) trait FilterCodec: Default {
    const ID: FilterId;
    /// Container of the entry payload.
    const CONTAINER: DataType = DataType::ElementList;

    fn action(&self) -> FilterEntryAction;
    fn set_action(&mut self, action: FilterEntryAction);
    fn encode_payload(&self) -> Result<Data, DirectoryError>;
    /// Fills a freshly reset filter from its entry payload.
    fn decode_payload(&mut self, payload: &Data) -> Result<(), DirectoryError>;
}

fn encode_filter<F: FilterCodec>(
    list: &mut FilterListEncoder,
    filter: &F,
) -> Result<(), DirectoryError> {
    let id = u8::from(F::ID);
    let action = filter.action();
    let payload = match action {
        FilterEntryAction::Clear => None,
        _ => Some(filter.encode_payload()?),
    };
    if F::CONTAINER == DataType::ElementList {
        list.add_entry(id, action, payload)?;
    } else {
        list.add_entry_with_type(id, action, F::CONTAINER, payload)?;
    }
    Ok(())
}

fn decode_filter<F: FilterCodec>(
    list: &FilterList,
    entry: &FilterEntry,
) -> Result<F, DirectoryError> {
    let mut filter = F::default();
    filter.set_action(entry.action);
    if entry.action == FilterEntryAction::Clear {
        return Ok(filter);
    }
    wire::expect_container(F::ID.name(), F::CONTAINER, list.entry_container_type(entry))?;
    let payload = entry.payload.as_ref().ok_or(CodecError::MissingPayload)?;
    filter.decode_payload(payload)?;
    Ok(filter)
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// One service of the directory, keyed by `service_id`.
///
/// When `action` is [`MapEntryAction::Delete`] the service carries no filters
/// on the wire; any filters set locally are not encoded.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Service {
    pub service_id: u32,
    pub action: MapEntryAction,
    pub info: Option<ServiceInfo>,
    pub state: Option<ServiceState>,
    pub load: Option<ServiceLoad>,
    pub data: Option<ServiceData>,
    pub link: Option<ServiceLinkInfo>,
    /// Appended to, never matched by name, when merged.
    pub groups: Vec<ServiceGroup>,
    pub seq_mcast: Option<ServiceSeqMcastInfo>,
}

impl Service {
    /// An Add entry with no filters.
    #[must_use]
    pub fn new(service_id: u32) -> Self {
        Self {
            service_id,
            ..Self::default()
        }
    }

    /// A Delete entry.
    #[must_use]
    pub fn deleted(service_id: u32) -> Self {
        Self {
            service_id,
            action: MapEntryAction::Delete,
            ..Self::default()
        }
    }

    /// Resets to an Add entry with id 0 and no filters, keeping the group
    /// list's allocation.
    pub fn clear(&mut self) {
        self.service_id = 0;
        self.action = MapEntryAction::Add;
        self.info = None;
        self.state = None;
        self.load = None;
        self.data = None;
        self.link = None;
        self.groups.clear();
        self.seq_mcast = None;
    }

    #[must_use]
    pub fn is_delete(&self) -> bool {
        self.action == MapEntryAction::Delete
    }

    /// The filters this service carries.
    #[must_use]
    pub fn filter_mask(&self) -> FilterMask {
        let mut mask = FilterMask::NONE;
        let present = [
            (self.info.is_some(), FilterMask::INFO),
            (self.state.is_some(), FilterMask::STATE),
            (!self.groups.is_empty(), FilterMask::GROUP),
            (self.load.is_some(), FilterMask::LOAD),
            (self.data.is_some(), FilterMask::DATA),
            (self.link.is_some(), FilterMask::LINK),
            (self.seq_mcast.is_some(), FilterMask::SEQ_MCAST),
        ];
        for (is_present, bit) in present {
            if is_present {
                mask |= bit;
            }
        }
        mask
    }

    /// Merges every singleton filter present on `self` into `dest`, leaving
    /// groups alone. A present filter whose action is Clear replaces the one
    /// on `dest` with its cleared defaults.
    pub(crate) fn merge_filters_into(&self, dest: &mut Self) {
        merge_filter(self.info.as_ref(), &mut dest.info);
        merge_filter(self.state.as_ref(), &mut dest.state);
        merge_filter(self.load.as_ref(), &mut dest.load);
        merge_filter(self.data.as_ref(), &mut dest.data);
        merge_filter(self.link.as_ref(), &mut dest.link);
        merge_filter(self.seq_mcast.as_ref(), &mut dest.seq_mcast);
    }

    /// The filter list for this service, or `None` for a Delete entry.
    pub(crate) fn encode_filters(&self) -> Result<Option<Data>, DirectoryError> {
        if self.is_delete() {
            return Ok(None);
        }
        let mut list = FilterListEncoder::new(DataType::ElementList);
        if let Some(info) = &self.info {
            encode_filter(&mut list, info)?;
        }
        if let Some(data) = &self.data {
            encode_filter(&mut list, data)?;
        }
        if let Some(link) = &self.link {
            encode_filter(&mut list, link)?;
        }
        if let Some(load) = &self.load {
            encode_filter(&mut list, load)?;
        }
        if let Some(state) = &self.state {
            encode_filter(&mut list, state)?;
        }
        for group in &self.groups {
            encode_filter(&mut list, group)?;
        }
        if let Some(seq_mcast) = &self.seq_mcast {
            encode_filter(&mut list, seq_mcast)?;
        }
        Ok(Some(list.complete()))
    }

    /// Fills the filters of a cleared service from its filter list. Entries
    /// are dispatched on filter id, in any order.
    pub(crate) fn decode_filters(&mut self, payload: &Data) -> Result<(), DirectoryError> {
        let list = payload.as_filter_list()?;
        for entry in list.entries() {
            let entry = entry?;
            let id = FilterId::try_from(entry.id)
                .map_err(|_| DirectoryError::UnknownFilterId { id: entry.id })?;
            match id {
                FilterId::Info => self.info = Some(decode_filter(list, entry)?),
                FilterId::State => self.state = Some(decode_filter(list, entry)?),
                FilterId::Group => self.groups.push(decode_filter(list, entry)?),
                FilterId::Load => self.load = Some(decode_filter(list, entry)?),
                FilterId::Data => self.data = Some(decode_filter(list, entry)?),
                FilterId::Link => self.link = Some(decode_filter(list, entry)?),
                FilterId::SeqMcast => self.seq_mcast = Some(decode_filter(list, entry)?),
            }
        }
        Ok(())
    }
}

fn merge_filter<F: FilterCodec + FilterMerge>(src: Option<&F>, dest: &mut Option<F>) {
    let Some(src) = src else {
        return;
    };
    match dest {
        Some(existing) if src.action() == FilterEntryAction::Clear => existing.clone_from(src),
        Some(existing) => src.merge_into(existing),
        None => *dest = Some(src.clone()),
    }
}

impl FilterMerge for Service {
    /// Merges present filters and appends groups. The destination keeps its
    /// own id and action.
    fn merge_into(&self, dest: &mut Self) {
        self.merge_filters_into(dest);
        dest.groups.extend(self.groups.iter().cloned());
    }
}

// ---------------------------------------------------------------------------
// Service list
// ---------------------------------------------------------------------------

/// Encodes services as a map keyed by service id whose values are filter
/// lists. Delete entries carry no filter list.
pub(crate) fn encode_service_list(services: &[Service]) -> Result<Data, DirectoryError> {
    let mut map = MapEncoder::new(DataType::UInt, DataType::FilterList);
    for service in services {
        let key = MapKey::UInt(wire::checked_service_id(service.service_id)?);
        map.add_entry(service.action, key, service.encode_filters()?)?;
    }
    Ok(map.complete())
}

/// Appends the services carried by a service map to `services`.
pub(crate) fn decode_service_list(
    payload: &Data,
    services: &mut Vec<Service>,
) -> Result<(), DirectoryError> {
    let map = payload.as_map()?;
    wire::expect_container("service map key", DataType::UInt, map.key_type())?;
    wire::expect_container("service map", DataType::FilterList, map.container_type())?;

    services.reserve(map.len());
    for entry in map.entries() {
        let entry = entry?;
        let mut service = Service {
            service_id: wire::service_id_from_uint(entry.key.as_uint()?)?,
            action: entry.action,
            ..Service::default()
        };
        if let Some(filters) = &entry.payload {
            service.decode_filters(filters)?;
        }
        services.push(service);
    }
    Ok(())
}
