//! Link filter: the upstream links feeding a service, keyed by link name.

use omm_core::codec::{Data, ElementListEncoder, MapEncoder, MapKey};
use omm_core::{DataType, FilterEntryAction, MapEntryAction};

use super::{FilterCodec, FilterMerge};
use crate::error::DirectoryError;
use crate::rdm::{element, FilterId, LinkCode, LinkState, LinkType};
use crate::wire;

/// One upstream link. `action` decides whether it is added, updated or
/// removed on the receiving side.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ServiceLink {
    pub name: String,
    pub action: MapEntryAction,
    pub link_type: Option<LinkType>,
    pub link_state: LinkState,
    pub link_code: Option<LinkCode>,
    pub text: Option<String>,
}

impl ServiceLink {
    #[must_use]
    pub fn new(name: impl Into<String>, link_state: LinkState) -> Self {
        Self {
            name: name.into(),
            link_state,
            ..Self::default()
        }
    }

    /// Interactive unless stated otherwise.
    #[must_use]
    pub fn link_type_or_default(&self) -> LinkType {
        self.link_type.unwrap_or_default()
    }

    fn encode_elements(&self) -> Data {
        let mut elements = ElementListEncoder::new();
        if let Some(link_type) = self.link_type {
            elements.add_uint(element::TYPE, link_type.as_uint());
        }
        elements.add_uint(element::LINK_STATE, self.link_state.as_uint());
        if let Some(code) = self.link_code {
            elements.add_uint(element::LINK_CODE, code.as_uint());
        }
        if let Some(text) = &self.text {
            elements.add_ascii(element::TEXT, text.as_str());
        }
        elements.complete()
    }

    fn decode_elements(&mut self, payload: &Data) -> Result<(), DirectoryError> {
        let mut link_state = None;
        for entry in payload.as_element_list()?.entries() {
            match entry.name.as_str() {
                element::TYPE => {
                    self.link_type = wire::enumerated(&entry.data, LinkType::from_uint)?;
                }
                element::LINK_STATE => {
                    link_state = wire::enumerated(&entry.data, LinkState::from_uint)?;
                }
                element::LINK_CODE => {
                    self.link_code = wire::enumerated(&entry.data, LinkCode::from_uint)?;
                }
                element::TEXT => self.text = wire::text(&entry.data)?,
                _ => {}
            }
        }
        self.link_state = wire::required(link_state, "Link", element::LINK_STATE)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceLinkInfo {
    pub action: FilterEntryAction,
    pub links: Vec<ServiceLink>,
}

impl Default for ServiceLinkInfo {
    fn default() -> Self {
        Self {
            action: FilterEntryAction::Set,
            links: Vec::new(),
        }
    }
}

impl ServiceLinkInfo {
    pub fn clear(&mut self) {
        self.action = FilterEntryAction::Set;
        self.links.clear();
    }

    #[must_use]
    pub fn link(&self, name: &str) -> Option<&ServiceLink> {
        self.links.iter().find(|link| link.name == name)
    }
}

impl FilterMerge for ServiceLinkInfo {
    /// Applies each incoming link by name: Add and Update replace or insert
    /// the link, Delete removes it.
    fn merge_into(&self, dest: &mut Self) {
        dest.action = self.action;
        for link in &self.links {
            let existing = dest.links.iter().position(|l| l.name == link.name);
            match (link.action, existing) {
                (MapEntryAction::Delete, Some(index)) => {
                    dest.links.remove(index);
                }
                (MapEntryAction::Delete, None) => {}
                (_, Some(index)) => dest.links[index].clone_from(link),
                (_, None) => dest.links.push(link.clone()),
            }
        }
    }
}

impl FilterCodec for ServiceLinkInfo {
    const ID: FilterId = FilterId::Link;
    const CONTAINER: DataType = DataType::Map;

    fn action(&self) -> FilterEntryAction {
        self.action
    }

    fn set_action(&mut self, action: FilterEntryAction) {
        self.action = action;
    }

    fn encode_payload(&self) -> Result<Data, DirectoryError> {
        let mut map = MapEncoder::new(DataType::AsciiString, DataType::ElementList);
        for link in &self.links {
            let payload = (link.action != MapEntryAction::Delete).then(|| link.encode_elements());
            map.add_entry(link.action, MapKey::Ascii(link.name.clone()), payload)?;
        }
        Ok(map.complete())
    }

    fn decode_payload(&mut self, payload: &Data) -> Result<(), DirectoryError> {
        let map = payload.as_map()?;
        wire::expect_container("link map key", DataType::AsciiString, map.key_type())?;
        wire::expect_container("link map", DataType::ElementList, map.container_type())?;

        for entry in map.entries() {
            let entry = entry?;
            let mut link = ServiceLink {
                name: entry.key.as_ascii()?.to_owned(),
                action: entry.action,
                ..ServiceLink::default()
            };
            if let Some(elements) = &entry.payload {
                link.decode_elements(elements)?;
            }
            self.links.push(link);
        }
        Ok(())
    }
}
