//! OpenCL platform and device capability reporting.
//!
//! Enumerates every platform the OpenCL ICD loader exposes, then every
//! device of each platform, and writes a fixed, human-readable capability
//! report. The loader is opened at runtime; nothing links against OpenCL.
//!
//! # Pipeline
//!
//! ```text
//! ComputeDriver (OpenClDriver | MockDriver)
//!   -> InfoQuery         typed attribute queries, shared scratch buffer
//!   -> attributes        data-driven report rows
//!   -> platform / device reporters
//!   -> ReportSession     platform pass, then device pass
//! ```
//!
//! # Quick start
//!
//! ```no_run
//! use clinfo_driver::{OpenClDriver, ReportSession};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let driver = OpenClDriver::load()?;
//! let mut session = ReportSession::new(&driver, std::io::stdout().lock());
//! let summary = session.run()?;
//! eprintln!("{} platform(s), {} device(s)", summary.platforms.len(), summary.device_count);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

pub mod attributes;
mod device;
mod driver;
mod error;
pub mod format;
pub mod mock;
pub mod opencl;
mod platform;
mod query;
mod session;

pub use attributes::{Attribute, DeviceKind, Row, DEVICE_ATTRIBUTES, PLATFORM_ATTRIBUTES};
pub use device::report_device;
pub use driver::{ComputeDriver, DeviceId, InfoTarget, PlatformId};
pub use error::{ClInfoError, EntityKind, QueryStage, Result};
pub use format::format_bytes;
pub use mock::MockDriver;
pub use opencl::{LibraryConfig, OpenClDriver};
pub use platform::{report_platform, Platform, PlatformSummary};
pub use query::{InfoQuery, InfoScalar, ScratchBuffer, DEFAULT_SCRATCH_CAPACITY};
pub use session::{ReportSession, RunSummary};

/// Commonly used types.
pub mod prelude {
    pub use crate::{
        ClInfoError, ComputeDriver, LibraryConfig, MockDriver, OpenClDriver, ReportSession,
        Result, RunSummary,
    };
}
