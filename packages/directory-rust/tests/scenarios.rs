//! End-to-end directory exchanges between a provider and a consumer.

mod common;

use common::{init_tracing, over_the_wire};
use omm_core::{DataType, DomainType, FilterEntryAction, MapEntryAction, Msg, MsgClass};
use omm_directory::rdm::{ServiceStateValue, SourceMirroringMode};
use omm_directory::service::{ServiceInfo, ServiceState};
use omm_directory::{
    ConsumerStatusService, DirectoryCache, DirectoryClose, DirectoryConsumerStatus, DirectoryError,
    DirectoryMsg, DirectoryMsgType, DirectoryRefresh, DirectoryRequest, DirectoryUpdate,
    FilterMask, FilterMerge, Service,
};

fn direct_feed() -> Service {
    Service {
        info: Some(ServiceInfo::new("DIRECT_FEED", vec![6])),
        state: Some(ServiceState {
            accepting_requests: Some(true),
            ..ServiceState::new(ServiceStateValue::Up)
        }),
        ..Service::new(1)
    }
}

#[test]
fn solicited_refresh() {
    init_tracing();
    let refresh = DirectoryRefresh {
        solicited: true,
        clear_cache: true,
        services: vec![direct_feed()],
        ..DirectoryRefresh::new(2, FilterMask::INFO | FilterMask::STATE)
    };

    let mut decoded = DirectoryRefresh::default();
    decoded
        .decode(&over_the_wire(&refresh.encode().unwrap()))
        .unwrap();

    assert_eq!(decoded.stream_id, 2);
    assert_eq!(decoded.filter, FilterMask::INFO | FilterMask::STATE);
    assert!(decoded.solicited);
    assert!(decoded.clear_cache);
    assert_eq!(decoded.services.len(), 1);
    let service = &decoded.services[0];
    assert_eq!(service.service_id, 1);
    assert_eq!(
        service.info.as_ref().map(|i| i.service_name.as_str()),
        Some("DIRECT_FEED")
    );
    assert_eq!(
        service.state.as_ref().map(|s| s.service_state),
        Some(ServiceStateValue::Up)
    );
    assert_eq!(decoded, refresh);
}

#[test]
fn delete_delta() {
    init_tracing();
    let update = DirectoryUpdate {
        filter: Some(FilterMask::INFO),
        services: vec![Service::deleted(5)],
        ..DirectoryUpdate::new(2)
    };
    let msg = over_the_wire(&update.encode().unwrap());

    let mut decoded = DirectoryUpdate::default();
    decoded.decode(&msg).unwrap();
    assert_eq!(decoded.services.len(), 1);
    let service = &decoded.services[0];
    assert_eq!(service.action, MapEntryAction::Delete);
    assert!(service.info.is_none());
    assert!(service.filter_mask().is_empty());
}

#[test]
fn scoped_request() {
    init_tracing();
    let request = DirectoryRequest {
        stream_id: 2,
        streaming: true,
        service_id: Some(7),
        filter: FilterMask::STATE | FilterMask::LOAD,
    };
    let mut decoded = DirectoryRequest::default();
    decoded
        .decode(&over_the_wire(&request.encode().unwrap()))
        .unwrap();
    assert_eq!(decoded, request);
}

#[test]
fn consumer_status() {
    init_tracing();
    let status = DirectoryConsumerStatus {
        services: vec![
            ConsumerStatusService::new(1, SourceMirroringMode::ActiveNoStandby),
            ConsumerStatusService {
                action: MapEntryAction::Delete,
                ..ConsumerStatusService::new(2, SourceMirroringMode::ActiveNoStandby)
            },
        ],
        ..DirectoryConsumerStatus::new(2)
    };
    let msg = over_the_wire(&status.encode().unwrap());

    let map = msg.payload.as_map().unwrap();
    let entries: Vec<_> = map.entries().map(Result::unwrap).collect();
    assert!(entries[0].payload.is_some());
    assert!(entries[1].payload.is_none());

    let decoded = DirectoryMsg::decode(&msg).unwrap();
    assert_eq!(decoded.as_consumer_status(), Some(&status));
}

#[test]
fn close_through_refresh_decoder_is_rejected() {
    init_tracing();
    let close = DirectoryClose::new(2).encode().unwrap();
    let mut target = DirectoryRefresh {
        services: vec![direct_feed()],
        ..DirectoryRefresh::new(8, FilterMask::INFO)
    };
    let err = target.decode(&close).unwrap_err();
    assert!(matches!(
        err,
        DirectoryError::WrongMsgClass {
            expected: MsgClass::Refresh,
            found: MsgClass::Close
        }
    ));
    assert_eq!(target, DirectoryRefresh::default());
}

#[test]
fn dispatcher_variant_isolation() {
    let mut msg = DirectoryMsg::new(DirectoryMsgType::Request);
    msg.set_msg_type(DirectoryMsgType::Refresh);
    assert!(msg.as_request().is_none());
    assert!(msg.as_refresh().is_some());
}

#[test]
fn clear_filter_and_delete_entries_carry_no_body() {
    let mut cleared = Service::new(3);
    cleared.action = MapEntryAction::Update;
    cleared.info = Some(ServiceInfo {
        action: FilterEntryAction::Clear,
        ..ServiceInfo::default()
    });
    let update = DirectoryUpdate {
        services: vec![cleared, Service::deleted(4)],
        ..DirectoryUpdate::new(2)
    };
    let msg = update.encode().unwrap();

    let map = msg.payload.as_map().unwrap();
    let entries: Vec<_> = map.entries().map(Result::unwrap).collect();
    let filters = entries[0].payload.as_ref().unwrap().as_filter_list().unwrap();
    let info = filters.entries().next().unwrap().unwrap();
    assert_eq!(info.action, FilterEntryAction::Clear);
    assert!(info.payload.is_none());
    assert!(entries[1].payload.is_none());

    let mut decoded = DirectoryUpdate::default();
    decoded.decode(&msg).unwrap();
    let info = decoded.services[0].info.as_ref().unwrap();
    assert_eq!(
        info,
        &ServiceInfo {
            action: FilterEntryAction::Clear,
            ..ServiceInfo::default()
        }
    );
}

#[test]
fn selective_merge_versus_replace() {
    let mut cached = Service::new(1);
    cached.info = Some(ServiceInfo::new("DIRECT_FEED", vec![6]));

    let mut update = Service::new(1);
    update.state = Some(ServiceState::new(ServiceStateValue::Down));

    let mut rebuilt = cached.clone();
    update.merge_into(&mut cached);
    assert_eq!(cached.info, Some(ServiceInfo::new("DIRECT_FEED", vec![6])));
    assert_eq!(cached.state, update.state);

    update.replace_into(&mut rebuilt);
    assert!(rebuilt.info.is_none());
}

#[test]
fn consumer_session_builds_cache() {
    init_tracing();
    let mut cache = DirectoryCache::default();
    let mut inbound = DirectoryMsg::default();

    let refresh = DirectoryRefresh {
        solicited: true,
        clear_cache: true,
        services: vec![direct_feed(), Service {
            info: Some(ServiceInfo::new("BACKUP_FEED", vec![6, 7])),
            ..Service::new(2)
        }],
        ..DirectoryRefresh::new(2, FilterMask::DEFAULT_REQUEST)
    };
    inbound
        .decode_into(&over_the_wire(&refresh.encode().unwrap()))
        .unwrap();
    cache.apply(&inbound);
    assert_eq!(cache.len(), 2);

    let mut down = Service::new(1);
    down.action = MapEntryAction::Update;
    down.state = Some(ServiceState::new(ServiceStateValue::Down));
    let update = DirectoryUpdate {
        services: vec![down, Service::deleted(2)],
        ..DirectoryUpdate::new(2)
    };
    inbound
        .decode_into(&over_the_wire(&update.encode().unwrap()))
        .unwrap();
    cache.apply(&inbound);

    assert_eq!(cache.len(), 1);
    let feed = cache.service(1).unwrap();
    assert_eq!(
        feed.info.as_ref().map(|i| i.service_name.as_str()),
        Some("DIRECT_FEED")
    );
    assert_eq!(
        feed.state.as_ref().map(|s| s.service_state),
        Some(ServiceStateValue::Down)
    );
}

#[test]
fn message_from_another_domain_is_rejected() {
    let mut msg = DirectoryUpdate::new(2).encode().unwrap();
    msg.domain = DomainType::MarketPrice;
    assert!(matches!(
        DirectoryMsg::decode(&msg),
        Err(DirectoryError::WrongDomain {
            found: DomainType::MarketPrice
        })
    ));
}

#[test]
fn generic_message_needs_a_key() {
    let msg = Msg::new(MsgClass::Generic, DomainType::Source, 2);
    assert!(matches!(
        DirectoryMsg::decode(&msg),
        Err(DirectoryError::MissingKey)
    ));
    assert_eq!(msg.container_type(), DataType::NoData);
}
