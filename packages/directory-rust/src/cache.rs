//! Consumer-side directory cache.
//!
//! Applies refreshes, updates and status messages to a per-service store
//! using the [`FilterMerge`] primitives. One cache serves one directory
//! stream and is not shared across threads.

use std::collections::BTreeMap;

use omm_core::{FilterEntryAction, MapEntryAction, State};
use tracing::{debug, trace, warn};

use crate::messages::{DirectoryRefresh, DirectoryStatus, DirectoryUpdate};
use crate::msg::DirectoryMsg;
use crate::service::{FilterCodec, FilterMerge, Service, ServiceGroup};

/// How incoming Group filter entries combine with cached ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupMergePolicy {
    /// Append every incoming group to the cached list.
    #[default]
    Append,
    /// Replace the cached group with the same name, appending new names.
    ReplaceByName,
}

#[derive(Debug, Clone, Default)]
pub struct CacheConfig {
    pub group_merge: GroupMergePolicy,
    /// Oldest groups beyond this many are dropped from a cached service.
    pub max_groups_per_service: Option<usize>,
}

/// Services known on one directory stream, keyed by service id.
#[derive(Debug, Default)]
pub struct DirectoryCache {
    config: CacheConfig,
    services: BTreeMap<u32, Service>,
    state: Option<State>,
}

impl DirectoryCache {
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            services: BTreeMap::new(),
            state: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    #[must_use]
    pub fn service(&self, service_id: u32) -> Option<&Service> {
        self.services.get(&service_id)
    }

    /// Cached services in ascending id order.
    pub fn services(&self) -> impl Iterator<Item = &Service> + '_ {
        self.services.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Last stream state seen on a refresh or status.
    #[must_use]
    pub fn stream_state(&self) -> Option<&State> {
        self.state.as_ref()
    }

    pub fn clear(&mut self) {
        debug!(services = self.services.len(), "clearing directory cache");
        self.services.clear();
        self.state = None;
    }

    /// Applies any message that changes the cache. Requests, closes and
    /// consumer status leave it untouched.
    pub fn apply(&mut self, msg: &DirectoryMsg) {
        match msg {
            DirectoryMsg::Refresh(refresh) => self.apply_refresh(refresh),
            DirectoryMsg::Update(update) => self.apply_update(update),
            DirectoryMsg::Status(status) => self.apply_status(status),
            other => trace!(msg_type = ?other.msg_type(), "message does not affect the cache"),
        }
    }

    pub fn apply_refresh(&mut self, refresh: &DirectoryRefresh) {
        if refresh.clear_cache {
            self.clear();
        }
        self.state = Some(refresh.state.clone());
        for service in &refresh.services {
            self.apply_service(service);
        }
    }

    pub fn apply_update(&mut self, update: &DirectoryUpdate) {
        for service in &update.services {
            self.apply_service(service);
        }
    }

    pub fn apply_status(&mut self, status: &DirectoryStatus) {
        if status.clear_cache {
            self.clear();
        }
        if let Some(state) = &status.state {
            self.state = Some(state.clone());
        }
    }

    fn apply_service(&mut self, service: &Service) {
        let service_id = service.service_id;
        match service.action {
            MapEntryAction::Delete => {
                if self.services.remove(&service_id).is_some() {
                    debug!(service_id, "deleted service");
                } else {
                    debug!(service_id, "delete for a service that is not cached");
                }
            }
            MapEntryAction::Add => {
                let cached = self.services.entry(service_id).or_default();
                service.replace_into(cached);
                cached.action = MapEntryAction::Add;
                prune_cleared(cached);
                self.cap_groups(service_id);
                debug!(service_id, filters = %service.filter_mask(), "replaced service");
            }
            MapEntryAction::Update => {
                let Some(cached) = self.services.get_mut(&service_id) else {
                    warn!(service_id, "update for a service that is not cached, adding it");
                    let mut added = service.clone();
                    added.action = MapEntryAction::Add;
                    prune_cleared(&mut added);
                    self.services.insert(service_id, added);
                    self.cap_groups(service_id);
                    return;
                };
                service.merge_filters_into(cached);
                merge_groups(self.config.group_merge, &service.groups, &mut cached.groups);
                prune_cleared(cached);
                self.cap_groups(service_id);
                debug!(service_id, filters = %service.filter_mask(), "merged service update");
            }
        }
    }

    fn cap_groups(&mut self, service_id: u32) {
        let (Some(max), Some(cached)) = (
            self.config.max_groups_per_service,
            self.services.get_mut(&service_id),
        ) else {
            return;
        };
        if cached.groups.len() > max {
            let excess = cached.groups.len() - max;
            cached.groups.drain(..excess);
            debug!(service_id, dropped = excess, "dropped oldest groups");
        }
    }
}

/// A Clear group entry empties the cached group list.
fn merge_groups(policy: GroupMergePolicy, incoming: &[ServiceGroup], cached: &mut Vec<ServiceGroup>) {
    for group in incoming {
        if group.action == FilterEntryAction::Clear {
            cached.clear();
            continue;
        }
        match policy {
            GroupMergePolicy::Append => cached.push(group.clone()),
            GroupMergePolicy::ReplaceByName => {
                match cached.iter_mut().find(|g| g.group == group.group) {
                    Some(existing) => group.merge_into(existing),
                    None => cached.push(group.clone()),
                }
            }
        }
    }
}

fn prune<F: FilterCodec>(filter: &mut Option<F>) {
    if filter
        .as_ref()
        .is_some_and(|f| f.action() == FilterEntryAction::Clear)
    {
        *filter = None;
    }
}

/// Drops filters whose entry action is Clear, and link entries whose action
/// is Delete, from a stored service.
fn prune_cleared(service: &mut Service) {
    prune(&mut service.info);
    prune(&mut service.state);
    prune(&mut service.load);
    prune(&mut service.data);
    prune(&mut service.link);
    prune(&mut service.seq_mcast);
    if let Some(link) = &mut service.link {
        link.links.retain(|l| l.action != MapEntryAction::Delete);
    }
    // A Clear group entry also drops every group listed before it.
    if let Some(last_clear) = service
        .groups
        .iter()
        .rposition(|g| g.action == FilterEntryAction::Clear)
    {
        service.groups.drain(..=last_clear);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdm::{FilterMask, LinkState, ServiceStateValue};
    use crate::service::{ServiceInfo, ServiceLink, ServiceLinkInfo, ServiceLoad, ServiceState};

    fn feed(service_id: u32) -> Service {
        Service {
            info: Some(ServiceInfo::new("DIRECT_FEED", vec![6])),
            state: Some(ServiceState::new(ServiceStateValue::Up)),
            ..Service::new(service_id)
        }
    }

    fn refresh(services: Vec<Service>, clear_cache: bool) -> DirectoryRefresh {
        DirectoryRefresh {
            clear_cache,
            services,
            ..DirectoryRefresh::new(2, FilterMask::INFO | FilterMask::STATE)
        }
    }

    fn update(services: Vec<Service>) -> DirectoryUpdate {
        DirectoryUpdate {
            services,
            ..DirectoryUpdate::new(2)
        }
    }

    fn state_change(service_id: u32, value: ServiceStateValue) -> Service {
        Service {
            action: MapEntryAction::Update,
            state: Some(ServiceState::new(value)),
            ..Service::new(service_id)
        }
    }

    #[test]
    fn refresh_populates_and_clear_cache_resets() {
        let mut cache = DirectoryCache::default();
        cache.apply_refresh(&refresh(vec![feed(1), feed(2)], false));
        assert_eq!(cache.len(), 2);

        cache.apply_refresh(&refresh(vec![feed(3)], true));
        assert_eq!(cache.services().map(|s| s.service_id).collect::<Vec<_>>(), vec![3]);
        assert!(cache.stream_state().is_some());
    }

    #[test]
    fn update_merges_only_present_filters() {
        let mut cache = DirectoryCache::default();
        cache.apply_refresh(&refresh(vec![feed(1)], true));
        cache.apply_update(&update(vec![state_change(1, ServiceStateValue::Down)]));

        let cached = cache.service(1).unwrap();
        assert_eq!(cached.info.as_ref().map(|i| i.service_name.as_str()), Some("DIRECT_FEED"));
        assert_eq!(
            cached.state.as_ref().map(|s| s.service_state),
            Some(ServiceStateValue::Down)
        );
        assert_eq!(cached.action, MapEntryAction::Add);
    }

    #[test]
    fn delete_and_filter_clear() {
        let mut cache = DirectoryCache::default();
        let mut loaded = feed(1);
        loaded.load = Some(ServiceLoad::default());
        cache.apply_refresh(&refresh(vec![loaded, feed(2)], true));

        let mut clear_load = Service::new(1);
        clear_load.action = MapEntryAction::Update;
        clear_load.load = Some(ServiceLoad {
            action: FilterEntryAction::Clear,
            ..ServiceLoad::default()
        });
        cache.apply_update(&update(vec![clear_load, Service::deleted(2)]));

        assert!(cache.service(1).unwrap().load.is_none());
        assert!(cache.service(2).is_none());
    }

    #[test]
    fn cleared_info_update_removes_cached_info() {
        let mut cache = DirectoryCache::default();
        cache.apply_refresh(&refresh(vec![feed(1)], true));

        let clear_info = Service {
            action: MapEntryAction::Update,
            info: Some(ServiceInfo {
                action: FilterEntryAction::Clear,
                ..ServiceInfo::default()
            }),
            ..Service::new(1)
        };
        cache.apply_update(&update(vec![clear_info]));

        let cached = cache.service(1).unwrap();
        assert!(cached.info.is_none());
        assert!(cached.state.is_some());
        assert!(!cached.filter_mask().contains(FilterMask::INFO));
    }

    #[test]
    fn update_for_unknown_service_adds_it() {
        let mut cache = DirectoryCache::default();
        cache.apply_update(&update(vec![state_change(7, ServiceStateValue::Up)]));
        let cached = cache.service(7).unwrap();
        assert_eq!(cached.action, MapEntryAction::Add);
        assert!(cached.state.is_some());
    }

    #[test]
    fn links_merge_by_name() {
        let mut cache = DirectoryCache::default();
        let mut service = feed(1);
        service.link = Some(ServiceLinkInfo {
            links: vec![
                ServiceLink::new("a", LinkState::Up),
                ServiceLink::new("b", LinkState::Up),
            ],
            ..ServiceLinkInfo::default()
        });
        cache.apply_refresh(&refresh(vec![service], true));

        let mut change = Service::new(1);
        change.action = MapEntryAction::Update;
        change.link = Some(ServiceLinkInfo {
            links: vec![
                ServiceLink {
                    action: MapEntryAction::Update,
                    ..ServiceLink::new("a", LinkState::Down)
                },
                ServiceLink {
                    action: MapEntryAction::Delete,
                    ..ServiceLink::new("b", LinkState::Down)
                },
            ],
            ..ServiceLinkInfo::default()
        });
        cache.apply_update(&update(vec![change]));

        let links = &cache.service(1).unwrap().link.as_ref().unwrap().links;
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].name, "a");
        assert_eq!(links[0].link_state, LinkState::Down);
    }

    #[test]
    fn deleted_link_is_not_stored_as_live() {
        let mut cache = DirectoryCache::default();
        cache.apply_refresh(&refresh(vec![feed(1)], true));

        let mut change = Service::new(1);
        change.action = MapEntryAction::Update;
        change.link = Some(ServiceLinkInfo {
            links: vec![
                ServiceLink::new("kept", LinkState::Up),
                ServiceLink {
                    action: MapEntryAction::Delete,
                    ..ServiceLink::new("gone", LinkState::Down)
                },
            ],
            ..ServiceLinkInfo::default()
        });
        cache.apply_update(&update(vec![change.clone()]));

        let names = |cache: &DirectoryCache, id: u32| -> Vec<String> {
            cache
                .service(id)
                .and_then(|s| s.link.as_ref())
                .map(|l| l.links.iter().map(|link| link.name.clone()).collect())
                .unwrap_or_default()
        };
        assert_eq!(names(&cache, 1), vec!["kept".to_owned()]);

        change.service_id = 2;
        change.action = MapEntryAction::Add;
        cache.apply_refresh(&refresh(vec![change], false));
        assert_eq!(names(&cache, 2), vec!["kept".to_owned()]);
    }

    fn group_update(service_id: u32, names: &[&str]) -> Service {
        Service {
            action: MapEntryAction::Update,
            groups: names
                .iter()
                .map(|n| ServiceGroup::new(n.as_bytes().to_vec()))
                .collect(),
            ..Service::new(service_id)
        }
    }

    #[test]
    fn groups_append_by_default() {
        let mut cache = DirectoryCache::default();
        cache.apply_refresh(&refresh(vec![feed(1)], true));
        cache.apply_update(&update(vec![group_update(1, &["g1"])]));
        cache.apply_update(&update(vec![group_update(1, &["g1"])]));
        assert_eq!(cache.service(1).unwrap().groups.len(), 2);
    }

    #[test]
    fn groups_replace_by_name_and_cap() {
        let mut cache = DirectoryCache::new(CacheConfig {
            group_merge: GroupMergePolicy::ReplaceByName,
            max_groups_per_service: Some(2),
        });
        cache.apply_refresh(&refresh(vec![feed(1)], true));
        cache.apply_update(&update(vec![group_update(1, &["g1", "g2"])]));
        cache.apply_update(&update(vec![group_update(1, &["g1"])]));
        assert_eq!(cache.service(1).unwrap().groups.len(), 2);

        cache.apply_update(&update(vec![group_update(1, &["g3"])]));
        let names: Vec<Vec<u8>> = cache
            .service(1)
            .unwrap()
            .groups
            .iter()
            .map(|g| g.group.clone())
            .collect();
        assert_eq!(names, vec![b"g2".to_vec(), b"g3".to_vec()]);
    }

    #[test]
    fn status_clear_cache_empties() {
        let mut cache = DirectoryCache::default();
        cache.apply_refresh(&refresh(vec![feed(1)], true));
        cache.apply(&DirectoryMsg::Status(DirectoryStatus {
            clear_cache: true,
            ..DirectoryStatus::default()
        }));
        assert!(cache.is_empty());
    }
}
