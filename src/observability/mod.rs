//! Logging for harness runs.
//!
//! Every component logs through `tracing` with structured fields (`config`,
//! `endpoint`, `status`, `code`). Binaries that drive a harness install a
//! subscriber once at startup:
//!
//! ```rust,ignore
//! let settings = HarnessSettings::load(&EnvConfigProvider::new()).await?;
//! exchange_harness::observability::init_logging(settings.verbose).ok();
//! ```

mod spans;

pub use spans::EndpointSpan;

#[cfg(feature = "subscriber")]
pub use subscriber::{default_directive, init_logging};

#[cfg(feature = "subscriber")]
mod subscriber {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

    /// Filter used when `RUST_LOG` is unset.
    pub fn default_directive(verbose: bool) -> &'static str {
        if verbose { "debug" } else { "info" }
    }

    /// Install a fmt subscriber. `RUST_LOG` takes precedence over `verbose`.
    ///
    /// Fails if a global subscriber is already set.
    pub fn init_logging(verbose: bool) -> Result<(), TryInitError> {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(verbose)
            .with_thread_ids(false)
            .with_file(false);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
    }
}
