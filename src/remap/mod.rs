/// Monotonic time source used to stamp output events and measure tap intervals
pub mod clock;

/// Timing knobs, with environment overrides for bring-up
pub mod config;

/// Applies the back double-tap and the delayed home release policies
pub mod dispatcher;

/// Synthesized output events and the sink they are delivered to
pub mod inject;

/// The fixed set of sensor buttons and the classification of raw events against them
pub mod registry;

/// Deferred callbacks with at most one pending callback per token
pub mod timer;

#[cfg(test)]
pub(crate) mod mock;

pub use self::config::RemapConfig;
pub use self::dispatcher::DebounceDispatcher;
pub use self::inject::{EventSource, InjectionSink, KeyFlags, OutputKeyEvent};
pub use self::registry::{Button, KeyRegistry};
