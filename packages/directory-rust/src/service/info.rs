//! Info filter: the service's name, capabilities, dictionaries and QoS.

use omm_core::codec::{Data, ElementListEncoder};
use omm_core::{FilterEntryAction, Qos};

use super::{FilterCodec, FilterMerge};
use crate::error::DirectoryError;
use crate::rdm::{element, FilterId};
use crate::wire;

/// Static description of a service.
///
/// `service_name` and `capabilities` are always encoded; every `Option`
/// field is omitted from the wire when `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceInfo {
    pub action: FilterEntryAction,
    pub service_name: String,
    pub vendor: Option<String>,
    pub is_source: Option<bool>,
    /// Domain-type codes this service can provide.
    pub capabilities: Vec<u64>,
    pub dictionaries_provided: Option<Vec<String>>,
    pub dictionaries_used: Option<Vec<String>>,
    pub qos: Option<Vec<Qos>>,
    pub supports_qos_range: Option<bool>,
    pub item_list: Option<String>,
    pub supports_oob_snapshots: Option<bool>,
    pub accepting_consumer_status: Option<bool>,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            action: FilterEntryAction::Set,
            service_name: String::new(),
            vendor: None,
            is_source: None,
            capabilities: Vec::new(),
            dictionaries_provided: None,
            dictionaries_used: None,
            qos: None,
            supports_qos_range: None,
            item_list: None,
            supports_oob_snapshots: None,
            accepting_consumer_status: None,
        }
    }
}

impl ServiceInfo {
    /// A Set entry with the two mandatory fields filled in.
    #[must_use]
    pub fn new(service_name: impl Into<String>, capabilities: Vec<u64>) -> Self {
        Self {
            service_name: service_name.into(),
            capabilities,
            ..Self::default()
        }
    }

    /// Resets every field, keeping the name and capability allocations.
    pub fn clear(&mut self) {
        self.action = FilterEntryAction::Set;
        self.service_name.clear();
        self.vendor = None;
        self.is_source = None;
        self.capabilities.clear();
        self.dictionaries_provided = None;
        self.dictionaries_used = None;
        self.qos = None;
        self.supports_qos_range = None;
        self.item_list = None;
        self.supports_oob_snapshots = None;
        self.accepting_consumer_status = None;
    }

    /// Snapshot requests may be made outside a streaming request. Defaults to
    /// `true` when not advertised.
    #[must_use]
    pub fn supports_out_of_band_snapshots(&self) -> bool {
        self.supports_oob_snapshots.unwrap_or(true)
    }

    /// Defaults to `true` when not advertised.
    #[must_use]
    pub fn accepts_consumer_status(&self) -> bool {
        self.accepting_consumer_status.unwrap_or(true)
    }

    /// The best advertised QoS. A service that advertises no QoS list
    /// provides realtime tick-by-tick data.
    #[must_use]
    pub fn best_qos(&self) -> Qos {
        self.qos
            .as_deref()
            .and_then(|list| list.iter().max_by(|a, b| a.quality_cmp(b)))
            .copied()
            .unwrap_or_else(Qos::realtime_tick_by_tick)
    }
}

impl FilterMerge for ServiceInfo {
    fn merge_into(&self, dest: &mut Self) {
        dest.action = self.action;
        dest.service_name.clone_from(&self.service_name);
        dest.capabilities.clone_from(&self.capabilities);
        merge_option(self.vendor.as_ref(), &mut dest.vendor);
        merge_option(self.is_source.as_ref(), &mut dest.is_source);
        merge_option(self.dictionaries_provided.as_ref(), &mut dest.dictionaries_provided);
        merge_option(self.dictionaries_used.as_ref(), &mut dest.dictionaries_used);
        merge_option(self.qos.as_ref(), &mut dest.qos);
        merge_option(self.supports_qos_range.as_ref(), &mut dest.supports_qos_range);
        merge_option(self.item_list.as_ref(), &mut dest.item_list);
        merge_option(self.supports_oob_snapshots.as_ref(), &mut dest.supports_oob_snapshots);
        merge_option(
            self.accepting_consumer_status.as_ref(),
            &mut dest.accepting_consumer_status,
        );
    }
}

/// Overwrites `dest` only when `src` carries a value.
pub(super) fn merge_option<T: Clone>(src: Option<&T>, dest: &mut Option<T>) {
    if let Some(value) = src {
        match dest {
            Some(existing) => existing.clone_from(value),
            None => *dest = Some(value.clone()),
        }
    }
}

impl FilterCodec for ServiceInfo {
    const ID: FilterId = FilterId::Info;

    fn action(&self) -> FilterEntryAction {
        self.action
    }

    fn set_action(&mut self, action: FilterEntryAction) {
        self.action = action;
    }

    fn encode_payload(&self) -> Result<Data, DirectoryError> {
        let mut elements = ElementListEncoder::new();
        elements.add_ascii(element::NAME, self.service_name.as_str());
        if let Some(vendor) = &self.vendor {
            elements.add_ascii(element::VENDOR, vendor.as_str());
        }
        if let Some(is_source) = self.is_source {
            elements.add_bool(element::IS_SOURCE, is_source);
        }
        elements.add(element::CAPABILITIES, wire::encode_uint_list(&self.capabilities)?);
        if let Some(dicts) = &self.dictionaries_provided {
            elements.add(element::DICTIONARIES_PROVIDED, wire::encode_text_list(dicts)?);
        }
        if let Some(dicts) = &self.dictionaries_used {
            elements.add(element::DICTIONARIES_USED, wire::encode_text_list(dicts)?);
        }
        if let Some(qos) = &self.qos {
            elements.add(element::QOS, wire::encode_qos_list(qos)?);
        }
        if let Some(range) = self.supports_qos_range {
            elements.add_bool(element::SUPPORTS_QOS_RANGE, range);
        }
        if let Some(item_list) = &self.item_list {
            elements.add_ascii(element::ITEM_LIST, item_list.as_str());
        }
        if let Some(oob) = self.supports_oob_snapshots {
            elements.add_bool(element::SUPPORTS_OOB_SNAPSHOTS, oob);
        }
        if let Some(accepting) = self.accepting_consumer_status {
            elements.add_bool(element::ACCEPTING_CONSUMER_STATUS, accepting);
        }
        Ok(elements.complete())
    }

    fn decode_payload(&mut self, payload: &Data) -> Result<(), DirectoryError> {
        let mut name = None;
        let mut capabilities = None;

        for entry in payload.as_element_list()?.entries() {
            let data = &entry.data;
            match entry.name.as_str() {
                element::NAME => name = wire::text(data)?,
                element::VENDOR => self.vendor = wire::text(data)?,
                element::IS_SOURCE => self.is_source = wire::flag(data)?,
                element::CAPABILITIES => capabilities = Some(wire::uint_list(data)?),
                element::DICTIONARIES_PROVIDED => {
                    self.dictionaries_provided = Some(wire::text_list(data)?);
                }
                element::DICTIONARIES_USED => {
                    self.dictionaries_used = Some(wire::text_list(data)?);
                }
                element::QOS => self.qos = Some(wire::qos_list(data)?),
                element::SUPPORTS_QOS_RANGE => self.supports_qos_range = wire::flag(data)?,
                element::ITEM_LIST => self.item_list = wire::text(data)?,
                element::SUPPORTS_OOB_SNAPSHOTS => {
                    self.supports_oob_snapshots = wire::flag(data)?;
                }
                element::ACCEPTING_CONSUMER_STATUS => {
                    self.accepting_consumer_status = wire::flag(data)?;
                }
                _ => {}
            }
        }

        self.service_name = wire::required(name, "Info", element::NAME)?;
        self.capabilities = wire::required(capabilities, "Info", element::CAPABILITIES)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use omm_core::{QosRate, QosTimeliness};

    fn delayed(seconds: u16) -> Qos {
        Qos {
            timeliness: QosTimeliness::Delayed,
            rate: QosRate::TickByTick,
            time_info: seconds,
            ..Qos::default()
        }
    }

    fn full_info() -> ServiceInfo {
        ServiceInfo {
            vendor: Some("ACME".into()),
            is_source: Some(true),
            dictionaries_provided: Some(vec!["RWFFld".into(), "RWFEnum".into()]),
            dictionaries_used: Some(vec!["RWFFld".into()]),
            qos: Some(vec![delayed(5), Qos::realtime_tick_by_tick()]),
            supports_qos_range: Some(false),
            item_list: Some("_ITEM_LIST".into()),
            supports_oob_snapshots: Some(false),
            accepting_consumer_status: Some(true),
            ..ServiceInfo::new("DIRECT_FEED", vec![5, 6])
        }
    }

    #[test]
    fn encode_decode_preserves_every_field() {
        let info = full_info();
        let payload = info.encode_payload().unwrap();
        let mut decoded = ServiceInfo::default();
        decoded.decode_payload(&payload).unwrap();
        assert_eq!(decoded, info);
    }

    #[test]
    fn absent_options_are_not_encoded() {
        let payload = ServiceInfo::new("FEED", vec![6]).encode_payload().unwrap();
        let list = payload.as_element_list().unwrap();
        let names: Vec<&str> = list.entries().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec![element::NAME, element::CAPABILITIES]);
    }

    #[test]
    fn name_and_capabilities_are_required() {
        let mut elements = ElementListEncoder::new();
        elements.add_ascii(element::NAME, "FEED");
        let mut info = ServiceInfo::default();
        let err = info.decode_payload(&elements.complete()).unwrap_err();
        assert!(matches!(
            err,
            DirectoryError::MissingElement {
                element: element::CAPABILITIES,
                ..
            }
        ));

        let mut elements = ElementListEncoder::new();
        elements.add(element::CAPABILITIES, wire::encode_uint_list(&[6]).unwrap());
        let err = info.decode_payload(&elements.complete()).unwrap_err();
        assert!(matches!(
            err,
            DirectoryError::MissingElement {
                element: element::NAME,
                ..
            }
        ));
    }

    #[test]
    fn defaults_when_not_advertised() {
        let info = ServiceInfo::new("FEED", vec![6]);
        assert!(info.supports_out_of_band_snapshots());
        assert!(info.accepts_consumer_status());
        assert_eq!(info.best_qos(), Qos::realtime_tick_by_tick());
    }

    #[test]
    fn best_qos_picks_highest_quality() {
        let mut info = ServiceInfo::new("FEED", vec![6]);
        info.qos = Some(vec![delayed(10), delayed(2)]);
        assert_eq!(info.best_qos(), delayed(2));
    }

    #[test]
    fn merge_keeps_fields_absent_from_update() {
        let mut cached = full_info();
        let mut update = ServiceInfo::new("RENAMED", vec![6]);
        update.action = FilterEntryAction::Update;
        update.qos = Some(vec![delayed(1)]);

        update.merge_into(&mut cached);
        assert_eq!(cached.action, FilterEntryAction::Update);
        assert_eq!(cached.service_name, "RENAMED");
        assert_eq!(cached.capabilities, vec![6]);
        assert_eq!(cached.qos, Some(vec![delayed(1)]));
        assert_eq!(cached.vendor.as_deref(), Some("ACME"));
        assert_eq!(cached.dictionaries_used, Some(vec!["RWFFld".to_string()]));
    }

    #[test]
    fn replace_drops_fields_absent_from_source() {
        let mut cached = full_info();
        ServiceInfo::new("FEED", vec![6]).replace_into(&mut cached);
        assert_eq!(cached, ServiceInfo::new("FEED", vec![6]));
    }

    #[test]
    fn clear_resets_to_default() {
        let mut info = full_info();
        info.clear();
        assert_eq!(info, ServiceInfo::default());
    }
}
