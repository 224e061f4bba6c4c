#![allow(dead_code)]

use omm_core::Msg;
use tracing_subscriber::EnvFilter;

/// Installs a test subscriber once; `RUST_LOG` controls the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Sends a message through its byte encoding, as a transport would.
pub fn over_the_wire(msg: &Msg) -> Msg {
    let bytes = msg.encode().expect("encode envelope");
    Msg::decode(&bytes).expect("decode envelope")
}
