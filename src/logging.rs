//! Console logging for the replay binary. Records go to stderr so that stdout
//! carries only snapshots.

use env_logger::{Builder, Env};

/// Level used when `RUST_LOG` is unset.
pub fn default_filter(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "info"
    }
}

pub fn init(debug: bool) {
    Builder::from_env(Env::default().default_filter_or(default_filter(debug)))
        .format_timestamp_millis()
        .init();
}
