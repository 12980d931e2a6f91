use crate::AppConfig;
use tokio::runtime::{Builder, Runtime};

/// Defines the **runtime wiring** stage of a Relay application.
///
/// This trait is responsible for the second phase of startup: taking the
/// now-resolved [`AppConfig`] and constructing the Tokio [`Runtime`] that will
/// drive the rest of the application, including the `async_main` future and
/// any [`Dispatcher`](relay_dispatch::Dispatcher) worker pools.
///
/// The default implementation builds a multi-threaded runtime with all Tokio
/// drivers enabled, which is appropriate for the vast majority of
/// applications.
///
/// ## Customization example
///
/// You can replace the default wiring to build a differently shaped runtime,
/// for instance a single-threaded one for a strictly I/O-bound workload.
///
/// ```
/// use relay::{App, AppConfig, RuntimeWiring};
/// use tokio::runtime::{Builder, Runtime};
///
/// fn main() {
///     App::launchpad(async_main())
///         .with_runtime_wiring(CurrentThreadRuntimeWiring)
///         .boot();
/// }
///
/// async fn async_main() {
///     println!("Executing the main logic");
/// }
///
/// struct CurrentThreadRuntimeWiring;
///
/// impl RuntimeWiring for CurrentThreadRuntimeWiring {
///     fn make_runtime_builder(&self, _config: &'static AppConfig) -> Builder {
///         let mut builder = Builder::new_current_thread();
///         builder.enable_all();
///         builder
///     }
/// }
/// ```
pub trait RuntimeWiring {
    /// Runs the runtime wiring stage.
    ///
    /// This is the entry point for the stage. It is not typically necessary to
    /// override this method directly; override [`make_runtime_builder`]
    /// instead.
    ///
    /// [`make_runtime_builder`]: RuntimeWiring::make_runtime_builder
    fn run(&self, config: &'static AppConfig) -> Runtime {
        self.make_runtime_builder(config)
            .build()
            .expect("it should be possible to build the application's tokio runtime")
    }

    /// Creates the `Builder` used to construct the application's Tokio
    /// [`Runtime`].
    ///
    /// The default implementation builds a multi-threaded runtime with all
    /// drivers enabled and, when the `bus` feature is active, sizes the worker
    /// thread pool after [`DispatcherConfig::worker_count`], since the
    /// dispatcher's worker pool (§4.4) and the runtime's own worker threads
    /// share the same process.
    ///
    /// [`DispatcherConfig::worker_count`]: relay_dispatch::DispatcherConfig::worker_count
    fn make_runtime_builder(&self, _config: &'static AppConfig) -> Builder {
        let mut builder = Builder::new_multi_thread();
        builder.enable_all();

        #[cfg(feature = "bus")]
        builder.worker_threads(_config.dispatcher().worker_count());

        builder
    }
}

/// The default `RuntimeWiring` implementation used by Relay.
///
/// This struct simply uses the default behavior provided by the
/// `RuntimeWiring` trait methods.
pub(crate) struct DefaultRuntimeWiring;

impl RuntimeWiring for DefaultRuntimeWiring {}
