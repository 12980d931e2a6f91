#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![cfg_attr(test, deny(warnings))]

/// Implements component-specific facades.
mod facade {
    /// Implements the application configuration facades.
    pub mod config {
        /// Implements the [`AppConfig`] facade.
        pub mod initial;

        /// Implements the [`AppLiveConfig`] facade.
        #[cfg(feature = "config-live")]
        pub mod live;

        /// Implements the custom [`AppConfigError`] type.
        pub mod error;
    }

    /// Implements the [`DotEnv`] facade.
    pub mod dotenv;

    /// Implements the [`Bus`] facade.
    #[cfg(feature = "bus")]
    pub mod bus;
}

/// Re-exports the [`AppConfig`]-related types.
pub use self::facade::config::error::AppConfigError;
pub use self::facade::config::initial::AppConfig;
#[cfg(feature = "config-live")]
pub use self::facade::config::live::AppLiveConfig;


/// Re-exports the [`DotEnv`] facade.
pub use self::facade::dotenv::DotEnv;


/// Re-exports the [`Bus`] facade.
#[cfg(feature = "bus")]
pub use self::facade::bus::Bus;


/// Re-exports the public API of `relay-core` in the root of this crate for
/// convenience.
pub use relay_core::*;


/// Re-exports the public API of `tokio` for convenience.
pub use tokio;


/// Re-exports the public API of `relay-config` for convenience.
pub use relay_config as config;


/// Partly re-exports the public API of `tracing` for convenience.
#[cfg(feature = "tracing")]
pub use tracing;


/// Re-exports the public API of `relay-message` for convenience.
#[cfg(feature = "bus")]
pub use relay_message as message;


/// Re-exports the public API of `relay-routing` for convenience.
#[cfg(feature = "bus")]
pub use relay_routing as routing;


/// Re-exports the public API of `relay-dispatch` for convenience.
#[cfg(feature = "bus")]
pub use relay_dispatch as dispatch;


/// Re-exports the public API of `relay-transport` for convenience.
#[cfg(feature = "bus")]
pub use relay_transport as transport;


/// Re-exports the public API of `relay-pubsub` for convenience.
#[cfg(feature = "pubsub")]
pub use relay_pubsub as pubsub;


/// Re-exports the public API of `relay-queue` for convenience.
#[cfg(feature = "queue")]
pub use relay_queue as queue;


/// Implements the [`Launchpad`] utility for building an [`App`].
mod launchpad;
pub use self::launchpad::wiring::configuration::ConfigurationWiring;
pub use self::launchpad::wiring::preflight::PreflightWiring;
pub use self::launchpad::wiring::runtime::RuntimeWiring;
pub use self::launchpad::Launchpad;

/// Implements the [`App`] facade.
mod app;
pub use self::app::App;

/// Re-exports the `#[relay::main]` attribute macro.
pub use relay_factory::main;
