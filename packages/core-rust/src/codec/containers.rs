//! Container types with their encoders and decode iterators.

use serde::{Deserialize, Serialize};

use super::{check_payload, Data};
use crate::error::CodecError;
use crate::types::{DataType, FilterEntryAction, MapEntryAction, VectorEntryAction};

// ---------------------------------------------------------------------------
// Map
// ---------------------------------------------------------------------------

/// Key of a map entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MapKey {
    UInt(u64),
    Ascii(String),
}

impl MapKey {
    #[must_use]
    pub fn data_type(&self) -> DataType {
        match self {
            Self::UInt(_) => DataType::UInt,
            Self::Ascii(_) => DataType::AsciiString,
        }
    }

    /// # Errors
    ///
    /// Returns [`CodecError::UnexpectedType`] when the key holds the other type.
    pub fn as_uint(&self) -> Result<u64, CodecError> {
        match self {
            Self::UInt(value) => Ok(*value),
            Self::Ascii(_) => Err(CodecError::mismatch(DataType::UInt, DataType::AsciiString)),
        }
    }

    /// # Errors
    ///
    /// Returns [`CodecError::UnexpectedType`] when the key holds the other type.
    pub fn as_ascii(&self) -> Result<&str, CodecError> {
        match self {
            Self::Ascii(value) => Ok(value),
            Self::UInt(_) => Err(CodecError::mismatch(DataType::AsciiString, DataType::UInt)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapEntry {
    pub action: MapEntryAction,
    pub key: MapKey,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub payload: Option<Data>,
}

/// Keyed entries, each carrying an add/update/delete action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Map {
    key_type: DataType,
    container_type: DataType,
    #[serde(default)]
    entries: Vec<MapEntry>,
}

impl Map {
    #[must_use]
    pub fn key_type(&self) -> DataType {
        self.key_type
    }

    #[must_use]
    pub fn container_type(&self) -> DataType {
        self.container_type
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fails unless the map declares exactly this key and entry type.
    pub fn expect_layout(
        &self,
        key_type: DataType,
        container_type: DataType,
    ) -> Result<(), CodecError> {
        if self.key_type != key_type {
            return Err(CodecError::mismatch(key_type, self.key_type));
        }
        if self.container_type != container_type {
            return Err(CodecError::mismatch(container_type, self.container_type));
        }
        Ok(())
    }

    /// Walks the entries in wire order, validating each one.
    #[must_use]
    pub fn entries(&self) -> MapEntries<'_> {
        MapEntries {
            map: self,
            inner: self.entries.iter(),
        }
    }
}

/// Decode iterator over a [`Map`].
pub struct MapEntries<'a> {
    map: &'a Map,
    inner: std::slice::Iter<'a, MapEntry>,
}

impl<'a> Iterator for MapEntries<'a> {
    type Item = Result<&'a MapEntry, CodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.inner.next()?;
        Some(validate_map_entry(self.map.key_type, self.map.container_type, entry).map(|()| entry))
    }
}

fn validate_map_entry(
    key_type: DataType,
    container_type: DataType,
    entry: &MapEntry,
) -> Result<(), CodecError> {
    if entry.key.data_type() != key_type {
        return Err(CodecError::mismatch(key_type, entry.key.data_type()));
    }
    check_payload(
        entry.action != MapEntryAction::Delete,
        entry.payload.as_ref(),
        container_type,
    )
}

/// Builds a [`Map`] entry by entry.
#[derive(Debug)]
pub struct MapEncoder {
    map: Map,
}

impl MapEncoder {
    /// Begins a map whose keys are `key_type` and whose entry payloads are
    /// `container_type`.
    #[must_use]
    pub fn new(key_type: DataType, container_type: DataType) -> Self {
        Self {
            map: Map {
                key_type,
                container_type,
                entries: Vec::new(),
            },
        }
    }

    /// Appends an entry. Delete entries must not carry a payload; all other
    /// actions must carry one of the declared container type.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnexpectedPayload`],
    /// [`CodecError::MissingPayload`] or [`CodecError::UnexpectedType`] when
    /// the entry breaks those rules or its key has the wrong type.
    pub fn add_entry(
        &mut self,
        action: MapEntryAction,
        key: MapKey,
        payload: Option<Data>,
    ) -> Result<&mut Self, CodecError> {
        let entry = MapEntry {
            action,
            key,
            payload,
        };
        validate_map_entry(self.map.key_type, self.map.container_type, &entry)?;
        self.map.entries.push(entry);
        Ok(self)
    }

    /// Ends the map.
    #[must_use]
    pub fn complete(self) -> Data {
        Data::Map(self.map)
    }
}

// ---------------------------------------------------------------------------
// Filter list
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterEntry {
    pub id: u8,
    pub action: FilterEntryAction,
    /// Overrides the list's container type for this entry.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub container_type: Option<DataType>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub payload: Option<Data>,
}

/// Entries identified by a small integer id, each with a set/update/clear action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterList {
    container_type: DataType,
    #[serde(default)]
    entries: Vec<FilterEntry>,
}

impl FilterList {
    #[must_use]
    pub fn container_type(&self) -> DataType {
        self.container_type
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The container type an entry's payload must have.
    #[must_use]
    pub fn entry_container_type(&self, entry: &FilterEntry) -> DataType {
        entry.container_type.unwrap_or(self.container_type)
    }

    #[must_use]
    pub fn entries(&self) -> FilterEntries<'_> {
        FilterEntries {
            list: self,
            inner: self.entries.iter(),
        }
    }
}

/// Decode iterator over a [`FilterList`].
pub struct FilterEntries<'a> {
    list: &'a FilterList,
    inner: std::slice::Iter<'a, FilterEntry>,
}

impl<'a> Iterator for FilterEntries<'a> {
    type Item = Result<&'a FilterEntry, CodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.inner.next()?;
        Some(validate_filter_entry(self.list.container_type, entry).map(|()| entry))
    }
}

fn validate_filter_entry(list_type: DataType, entry: &FilterEntry) -> Result<(), CodecError> {
    check_payload(
        entry.action != FilterEntryAction::Clear,
        entry.payload.as_ref(),
        entry.container_type.unwrap_or(list_type),
    )
}

/// Builds a [`FilterList`] entry by entry.
#[derive(Debug)]
pub struct FilterListEncoder {
    list: FilterList,
}

impl FilterListEncoder {
    #[must_use]
    pub fn new(container_type: DataType) -> Self {
        Self {
            list: FilterList {
                container_type,
                entries: Vec::new(),
            },
        }
    }

    /// Appends an entry whose payload has the list's container type.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnexpectedPayload`] for a Clear entry with a
    /// payload, [`CodecError::MissingPayload`] for any other entry without
    /// one, or [`CodecError::UnexpectedType`] for a mismatched payload.
    pub fn add_entry(
        &mut self,
        id: u8,
        action: FilterEntryAction,
        payload: Option<Data>,
    ) -> Result<&mut Self, CodecError> {
        self.push(FilterEntry {
            id,
            action,
            container_type: None,
            payload,
        })
    }

    /// Appends an entry whose payload has its own container type.
    ///
    /// # Errors
    ///
    /// Same as [`FilterListEncoder::add_entry`].
    pub fn add_entry_with_type(
        &mut self,
        id: u8,
        action: FilterEntryAction,
        container_type: DataType,
        payload: Option<Data>,
    ) -> Result<&mut Self, CodecError> {
        self.push(FilterEntry {
            id,
            action,
            container_type: Some(container_type),
            payload,
        })
    }

    fn push(&mut self, entry: FilterEntry) -> Result<&mut Self, CodecError> {
        validate_filter_entry(self.list.container_type, &entry)?;
        self.list.entries.push(entry);
        Ok(self)
    }

    #[must_use]
    pub fn complete(self) -> Data {
        Data::FilterList(self.list)
    }
}

// ---------------------------------------------------------------------------
// Element list
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementEntry {
    pub name: String,
    pub data: Data,
}

/// Named, self-typed entries.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementList {
    #[serde(default)]
    entries: Vec<ElementEntry>,
}

impl ElementList {
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in wire order. Element entries are self-describing, so there is
    /// nothing to validate at this level.
    pub fn entries(&self) -> std::slice::Iter<'_, ElementEntry> {
        self.entries.iter()
    }

    /// First entry with the given name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Data> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.data)
    }
}

/// Builds an [`ElementList`].
#[derive(Debug, Default)]
pub struct ElementListEncoder {
    list: ElementList,
}

impl ElementListEncoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, data: Data) -> &mut Self {
        self.list.entries.push(ElementEntry {
            name: name.into(),
            data,
        });
        self
    }

    pub fn add_uint(&mut self, name: impl Into<String>, value: u64) -> &mut Self {
        self.add(name, Data::UInt(value))
    }

    pub fn add_bool(&mut self, name: impl Into<String>, value: bool) -> &mut Self {
        self.add(name, Data::UInt(u64::from(value)))
    }

    pub fn add_ascii(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.add(name, Data::Ascii(value.into()))
    }

    pub fn add_buffer(&mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) -> &mut Self {
        self.add(name, Data::Buffer(value.into()))
    }

    #[must_use]
    pub fn complete(self) -> Data {
        Data::ElementList(self.list)
    }
}

// ---------------------------------------------------------------------------
// Array
// ---------------------------------------------------------------------------

/// A homogeneous sequence of primitives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OmmArray {
    primitive_type: DataType,
    #[serde(default)]
    items: Vec<Data>,
}

impl OmmArray {
    #[must_use]
    pub fn primitive_type(&self) -> DataType {
        self.primitive_type
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in order; an item of the wrong type yields an error.
    pub fn items(&self) -> impl Iterator<Item = Result<&Data, CodecError>> + '_ {
        let primitive_type = self.primitive_type;
        self.items.iter().map(move |item| {
            if item.is_blank() || item.data_type() == primitive_type {
                Ok(item)
            } else {
                Err(CodecError::mismatch(primitive_type, item.data_type()))
            }
        })
    }
}

/// Builds an [`OmmArray`].
#[derive(Debug)]
pub struct ArrayEncoder {
    array: OmmArray,
}

impl ArrayEncoder {
    /// Begins an array of `primitive_type`; containers are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnexpectedType`] for a container type.
    pub fn new(primitive_type: DataType) -> Result<Self, CodecError> {
        if primitive_type.is_container() {
            return Err(CodecError::mismatch(DataType::Unknown, primitive_type));
        }
        Ok(Self {
            array: OmmArray {
                primitive_type,
                items: Vec::new(),
            },
        })
    }

    /// # Errors
    ///
    /// Returns [`CodecError::UnexpectedType`] when `item` is not of the array's type.
    pub fn add(&mut self, item: Data) -> Result<&mut Self, CodecError> {
        if item.data_type() != self.array.primitive_type {
            return Err(CodecError::mismatch(
                self.array.primitive_type,
                item.data_type(),
            ));
        }
        self.array.items.push(item);
        Ok(self)
    }

    #[must_use]
    pub fn complete(self) -> Data {
        Data::Array(self.array)
    }
}

// ---------------------------------------------------------------------------
// Vector
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorEntry {
    pub index: u32,
    pub action: VectorEntryAction,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub payload: Option<Data>,
}

/// Index-addressed entries of a single container type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vector {
    container_type: DataType,
    #[serde(default)]
    entries: Vec<VectorEntry>,
}

impl Vector {
    #[must_use]
    pub fn container_type(&self) -> DataType {
        self.container_type
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> VectorEntries<'_> {
        VectorEntries {
            container_type: self.container_type,
            inner: self.entries.iter(),
        }
    }
}

/// Decode iterator over a [`Vector`].
pub struct VectorEntries<'a> {
    container_type: DataType,
    inner: std::slice::Iter<'a, VectorEntry>,
}

impl<'a> Iterator for VectorEntries<'a> {
    type Item = Result<&'a VectorEntry, CodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.inner.next()?;
        Some(
            check_payload(
                entry.action.has_payload(),
                entry.payload.as_ref(),
                self.container_type,
            )
            .map(|()| entry),
        )
    }
}

/// Builds a [`Vector`].
#[derive(Debug)]
pub struct VectorEncoder {
    vector: Vector,
}

impl VectorEncoder {
    #[must_use]
    pub fn new(container_type: DataType) -> Self {
        Self {
            vector: Vector {
                container_type,
                entries: Vec::new(),
            },
        }
    }

    /// # Errors
    ///
    /// Returns a payload error when the entry's payload does not match its
    /// action or the vector's container type.
    pub fn add_entry(
        &mut self,
        index: u32,
        action: VectorEntryAction,
        payload: Option<Data>,
    ) -> Result<&mut Self, CodecError> {
        check_payload(action.has_payload(), payload.as_ref(), self.vector.container_type)?;
        self.vector.entries.push(VectorEntry {
            index,
            action,
            payload,
        });
        Ok(self)
    }

    #[must_use]
    pub fn complete(self) -> Data {
        Data::Vector(self.vector)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn element_list(name: &str, value: u64) -> Data {
        let mut elements = ElementListEncoder::new();
        elements.add_uint(name, value);
        elements.complete()
    }

    fn roundtrip(data: &Data) -> Data {
        let bytes = rmp_serde::to_vec_named(data).expect("serialize");
        rmp_serde::from_slice(&bytes).expect("deserialize")
    }

    #[test]
    fn map_delete_entry_has_no_payload() {
        let mut map = MapEncoder::new(DataType::UInt, DataType::ElementList);
        map.add_entry(MapEntryAction::Add, MapKey::UInt(1), Some(element_list("A", 1)))
            .unwrap()
            .add_entry(MapEntryAction::Delete, MapKey::UInt(2), None)
            .unwrap();
        let data = roundtrip(&map.complete());

        let map = data.as_map().unwrap();
        let entries: Vec<_> = map.entries().collect::<Result<_, _>>().unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].payload.is_some());
        assert_eq!(entries[1].action, MapEntryAction::Delete);
        assert!(entries[1].payload.is_none());
    }

    #[test]
    fn map_encoder_rejects_bad_entries() {
        let mut map = MapEncoder::new(DataType::UInt, DataType::ElementList);
        assert!(matches!(
            map.add_entry(MapEntryAction::Add, MapKey::UInt(1), None),
            Err(CodecError::MissingPayload)
        ));
        assert!(matches!(
            map.add_entry(
                MapEntryAction::Delete,
                MapKey::UInt(1),
                Some(element_list("A", 1))
            ),
            Err(CodecError::UnexpectedPayload)
        ));
        assert!(matches!(
            map.add_entry(
                MapEntryAction::Add,
                MapKey::Ascii("x".into()),
                Some(element_list("A", 1))
            ),
            Err(CodecError::UnexpectedType { .. })
        ));
        assert!(map.add_entry(MapEntryAction::Update, MapKey::UInt(1), Some(Data::UInt(3))).is_err());
    }

    #[test]
    fn map_iterator_reports_malformed_entry() {
        // Built by hand to bypass encoder validation, as a peer might send it.
        let map = Map {
            key_type: DataType::UInt,
            container_type: DataType::FilterList,
            entries: vec![MapEntry {
                action: MapEntryAction::Add,
                key: MapKey::UInt(4),
                payload: None,
            }],
        };
        let mut entries = map.entries();
        assert!(matches!(entries.next(), Some(Err(CodecError::MissingPayload))));
        assert!(entries.next().is_none());
    }

    #[test]
    fn expect_layout_checks_key_and_container() {
        let map = match MapEncoder::new(DataType::UInt, DataType::FilterList).complete() {
            Data::Map(map) => map,
            _ => unreachable!(),
        };
        assert!(map.expect_layout(DataType::UInt, DataType::FilterList).is_ok());
        assert!(map.expect_layout(DataType::AsciiString, DataType::FilterList).is_err());
        assert!(map.expect_layout(DataType::UInt, DataType::ElementList).is_err());
    }

    #[test]
    fn filter_clear_entry_has_no_payload() {
        let mut list = FilterListEncoder::new(DataType::ElementList);
        list.add_entry(1, FilterEntryAction::Set, Some(element_list("A", 1)))
            .unwrap()
            .add_entry(2, FilterEntryAction::Clear, None)
            .unwrap();
        assert!(matches!(
            list.add_entry(3, FilterEntryAction::Clear, Some(element_list("B", 2))),
            Err(CodecError::UnexpectedPayload)
        ));

        let data = roundtrip(&list.complete());
        let list = data.as_filter_list().unwrap();
        let ids: Vec<u8> = list.entries().map(|e| e.unwrap().id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn filter_entry_container_override() {
        let inner = || MapEncoder::new(DataType::AsciiString, DataType::ElementList).complete();
        let mut list = FilterListEncoder::new(DataType::ElementList);
        list.add_entry_with_type(6, FilterEntryAction::Set, DataType::Map, Some(inner()))
            .unwrap();
        assert!(list
            .add_entry(6, FilterEntryAction::Set, Some(inner()))
            .is_err());

        let data = list.complete();
        let list = data.as_filter_list().unwrap();
        let entry = list.entries().next().unwrap().unwrap();
        assert_eq!(list.entry_container_type(entry), DataType::Map);
    }

    #[test]
    fn element_list_lookup_by_name() {
        let mut elements = ElementListEncoder::new();
        elements
            .add_ascii("Name", "FEED")
            .add_uint("Port", 14002)
            .add_bool("Flag", true)
            .add("Blank", Data::Blank(DataType::UInt));
        let data = roundtrip(&elements.complete());
        let list = data.as_element_list().unwrap();
        assert_eq!(list.len(), 4);
        assert_eq!(list.get("Name").unwrap().as_ascii().unwrap(), Some("FEED"));
        assert_eq!(list.get("Port").unwrap().as_uint().unwrap(), Some(14002));
        assert_eq!(list.get("Flag").unwrap().as_uint().unwrap(), Some(1));
        assert_eq!(list.get("Blank").unwrap().as_uint().unwrap(), None);
        assert!(list.get("Missing").is_none());
    }

    #[test]
    fn array_is_homogeneous() {
        let mut array = ArrayEncoder::new(DataType::UInt).unwrap();
        array.add(Data::UInt(6)).unwrap().add(Data::UInt(7)).unwrap();
        assert!(array.add(Data::Ascii("x".into())).is_err());
        let data = roundtrip(&array.complete());
        let values: Vec<u64> = data
            .as_array()
            .unwrap()
            .items()
            .map(|item| item.unwrap().as_uint().unwrap().unwrap())
            .collect();
        assert_eq!(values, vec![6, 7]);
        assert!(ArrayEncoder::new(DataType::Map).is_err());
    }

    #[test]
    fn vector_entries_follow_action_rules() {
        let mut vector = VectorEncoder::new(DataType::ElementList);
        vector
            .add_entry(0, VectorEntryAction::Set, Some(element_list("Port", 1)))
            .unwrap()
            .add_entry(1, VectorEntryAction::Delete, None)
            .unwrap();
        assert!(vector.add_entry(2, VectorEntryAction::Set, None).is_err());
        let data = roundtrip(&vector.complete());
        let entries: Vec<_> = data
            .as_vector()
            .unwrap()
            .entries()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].index, 1);
    }
}
