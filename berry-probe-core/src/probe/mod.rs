pub mod classifier;
pub mod dispatcher;
pub mod types;

pub use dispatcher::{
    ConcurrencyMode, NullReporter, ProbeDispatcher, ProbeOptions, ProbeReporter,
    DEFAULT_PARALLEL_PROBES,
};
pub use types::{truncate_chars, ProbeResult, ProbeStatus, Round};
