//! Faultline core
//!
//! Fault routines used by the Faultline daemon:
//! - Resource exhausters (memory, CPU, threads)
//! - External fault simulators (SNAT churn, downgraded TLS, slow call)
//! - The process-terminating bad-write fault
//!
//! Every routine returns a [`FaultResult`] and handles its own expected
//! failures. Nothing here keeps state between invocations.

pub mod crash;
pub mod error;
pub mod exhaust;
pub mod result;
pub mod simulate;

pub use crash::CrashConfig;
pub use error::{AllocationError, ClientBuildError, ErrorType};
pub use exhaust::{CpuConfig, MemoryConfig, ThreadConfig};
pub use result::{FaultKind, FaultResult, MetricValue, Outcome, UnknownFault};
pub use simulate::{SlowCallConfig, SnatConfig, TlsConfig, TlsVersion, TransportProfile};
