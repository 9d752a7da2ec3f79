//! Terminal front-end for the Krubik solver: the editable cube store, the
//! client for the remote solve endpoint, and timed solution playback.

pub mod api;
pub mod config;
pub mod csrf;
pub mod i18n;
pub mod playback;
pub mod render;
pub mod session;
pub mod store;

#[cfg(test)]
mod test_server;

pub use api::{SolveClient, SolveError};
pub use config::{Config, ConfigError, RuntimeConfig};
pub use i18n::{Language, Text};
pub use playback::{Playback, PlaybackSnapshot, PlaybackState};
pub use session::{SolveSession, SubmitError};
pub use store::{Changes, CubeStore, StoreError, StoreSnapshot, Subscription};

/// Set up for testing -- enables logging.
#[cfg(test)]
pub(crate) fn setup() {
    let _ = env_logger::builder().is_test(true).try_init();
}
