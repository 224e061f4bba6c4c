//! Property tests for encode/decode fidelity and reuse of decode targets.

mod common;

use common::over_the_wire;
use omm_directory::rdm::ServiceStateValue;
use omm_directory::service::{ServiceGroup, ServiceInfo, ServiceLoad, ServiceState};
use omm_directory::{DirectoryRefresh, DirectoryUpdate, FilterMask, Service};
use proptest::prelude::*;

fn arb_info() -> impl Strategy<Value = ServiceInfo> {
    (
        "[A-Z_]{1,12}",
        prop::collection::vec(1_u64..=12, 0..5),
        prop::option::of("[A-Za-z ]{1,16}"),
        prop::option::of(any::<bool>()),
    )
        .prop_map(|(name, caps, vendor, is_source)| ServiceInfo {
            vendor,
            is_source,
            ..ServiceInfo::new(name, caps)
        })
}

fn arb_state() -> impl Strategy<Value = ServiceState> {
    (any::<bool>(), prop::option::of(any::<bool>())).prop_map(|(up, accepting_requests)| {
        let value = if up {
            ServiceStateValue::Up
        } else {
            ServiceStateValue::Down
        };
        ServiceState {
            accepting_requests,
            ..ServiceState::new(value)
        }
    })
}

fn arb_load() -> impl Strategy<Value = ServiceLoad> {
    (
        prop::option::of(any::<u64>()),
        prop::option::of(any::<u64>()),
        prop::option::of(0_u64..=65_535),
    )
        .prop_map(|(open_limit, open_window, load_factor)| ServiceLoad {
            open_limit,
            open_window,
            load_factor,
            ..ServiceLoad::default()
        })
}

fn arb_service() -> impl Strategy<Value = Service> {
    (
        0_u32..=0xFFFF,
        prop::option::of(arb_info()),
        prop::option::of(arb_state()),
        prop::option::of(arb_load()),
        prop::collection::vec(prop::collection::vec(any::<u8>(), 1..4), 0..3),
    )
        .prop_map(|(service_id, info, state, load, groups)| Service {
            info,
            state,
            load,
            groups: groups.into_iter().map(ServiceGroup::new).collect(),
            ..Service::new(service_id)
        })
}

proptest! {
    #[test]
    fn refresh_roundtrips(services in prop::collection::vec(arb_service(), 0..6), solicited: bool) {
        let refresh = DirectoryRefresh {
            solicited,
            services,
            ..DirectoryRefresh::new(3, FilterMask::INFO | FilterMask::STATE | FilterMask::LOAD)
        };
        let mut decoded = DirectoryRefresh::default();
        decoded.decode(&over_the_wire(&refresh.encode().unwrap())).unwrap();
        prop_assert_eq!(decoded, refresh);
    }

    #[test]
    fn reused_target_keeps_nothing_from_earlier_message(
        first in prop::collection::vec(arb_service(), 1..8),
        keep in 0_usize..8,
    ) {
        let second: Vec<Service> = first.iter().take(keep.min(first.len() - 1)).cloned().collect();
        let make = |services: Vec<Service>| DirectoryUpdate {
            services,
            ..DirectoryUpdate::new(5)
        };
        let first = make(first);
        let second = make(second);

        let mut target = DirectoryUpdate::default();
        target.decode(&first.encode().unwrap()).unwrap();
        target.clear();
        target.decode(&second.encode().unwrap()).unwrap();
        prop_assert_eq!(target.services.len(), second.services.len());
        prop_assert_eq!(target, second);
    }
}
