//! Report session
//!
//! A [`ReportSession`] drives one full report: count and describe every
//! platform, then list each platform's devices and describe them.
//!
//! ```text
//! Number of platforms                             : 2
//!
//!   Platform Name                                 : Acme OpenCL      platform pass,
//!   ...                                                              one section per platform
//!
//!   Platform Name                                 : Acme OpenCL      device pass,
//! Number of devices                               : 1                one section per platform
//!   Device Name                                   : Acme GPU
//!   ...
//! ```
//!
//! Every failure aborts the run. Whatever was written before the failure
//! stays in the output.

use crate::device::report_device;
use crate::driver::{ComputeDriver, DeviceId};
use crate::error::{ClInfoError, EntityKind, QueryStage, Result};
use crate::format::{attribute_line, header_line};
use crate::platform::{report_platform, Platform, PlatformSummary};
use crate::query::{InfoQuery, DEFAULT_SCRATCH_CAPACITY};
use std::io::Write;

/// Outcome of a successful run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Every platform, with the devices it owns
    pub platforms: Vec<Platform>,
    /// Sum of the per-platform device counts
    pub device_count: usize,
    /// Device sections written
    pub device_reports: usize,
}

/// One report run over a driver, writing to `W`
#[derive(Debug)]
pub struct ReportSession<'d, W: Write> {
    query: InfoQuery<'d>,
    out: W,
}

impl<'d, W: Write> ReportSession<'d, W> {
    /// Create a session with the default scratch buffer size
    pub fn new(driver: &'d dyn ComputeDriver, out: W) -> Self {
        Self::with_scratch_capacity(driver, out, DEFAULT_SCRATCH_CAPACITY)
    }

    /// Create a session with an explicit initial scratch buffer size
    pub fn with_scratch_capacity(driver: &'d dyn ComputeDriver, out: W, capacity: usize) -> Self {
        Self {
            query: InfoQuery::with_scratch_capacity(driver, capacity),
            out,
        }
    }

    /// Current scratch buffer size
    pub fn scratch_capacity(&self) -> usize {
        self.query.scratch_capacity()
    }

    /// Output written so far
    pub fn output(&self) -> &W {
        &self.out
    }

    /// Consume the session and return its output
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Write the full report
    ///
    /// # Errors
    ///
    /// Returns the first failed driver call, allocation, decode or write.
    pub fn run(&mut self) -> Result<RunSummary> {
        let driver = self.query.driver();

        let count = driver.platform_count().map_err(|status| {
            ClInfoError::query_failed("platforms", EntityKind::Driver, QueryStage::Count, status)
        })?;
        writeln!(self.out, "{}", header_line("Number of platforms", count))?;
        tracing::info!("Found {count} platform(s)");

        if count == 0 {
            return Ok(RunSummary::default());
        }

        let ids = driver.platform_ids(count).map_err(|status| {
            ClInfoError::query_failed("platforms", EntityKind::Driver, QueryStage::Handles, status)
        })?;

        let mut summaries: Vec<PlatformSummary> = reserve("platform list", ids.len())?;
        for id in ids {
            summaries.push(report_platform(&mut self.query, id, &mut self.out)?);
        }

        let device_count: usize = summaries.iter().map(|s| s.device_count as usize).sum();
        tracing::info!("Found {device_count} device(s) in total");

        let mut platforms: Vec<Platform> = reserve("platform list", summaries.len())?;

        let mut device_reports = 0;
        for summary in summaries {
            let devices = self.devices_of(&summary)?;

            writeln!(self.out)?;
            writeln!(self.out, "{}", attribute_line("Platform Name", &summary.name))?;
            writeln!(
                self.out,
                "{}",
                header_line("Number of devices", summary.device_count)
            )?;

            for &device in &devices {
                report_device(&mut self.query, device, &mut self.out)?;
                device_reports += 1;
            }

            platforms.push(Platform { summary, devices });
        }

        self.out.flush()?;

        Ok(RunSummary {
            platforms,
            device_count,
            device_reports,
        })
    }

    fn devices_of(&self, summary: &PlatformSummary) -> Result<Vec<DeviceId>> {
        let wanted = summary.device_count as usize;
        let mut devices: Vec<DeviceId> = reserve("device IDs", wanted)?;

        let ids = self
            .query
            .driver()
            .device_ids(summary.id, summary.device_count)
            .map_err(|status| {
                ClInfoError::query_failed("devices", EntityKind::Platform, QueryStage::Handles, status)
            })?;

        if ids.len() != wanted {
            tracing::warn!(
                "Platform {:?} listed {} device(s), expected {wanted}",
                summary.name,
                ids.len()
            );
        }
        devices.extend(ids.into_iter().take(wanted));
        Ok(devices)
    }
}

/// Empty vector with room for exactly `len` elements
///
/// Failures report the size in bytes.
fn reserve<T>(purpose: &'static str, len: usize) -> Result<Vec<T>> {
    let mut list = Vec::new();
    list.try_reserve_exact(len).map_err(|_| {
        ClInfoError::allocation_failed(purpose, len.saturating_mul(std::mem::size_of::<T>()))
    })?;
    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockDevice, MockDriver, MockPlatform};
    use clinfo_abi::status;

    #[test]
    fn test_zero_platforms_prints_single_line() {
        let driver = MockDriver::new();
        let mut session = ReportSession::new(&driver, Vec::new());

        let summary = session.run().unwrap();
        assert_eq!(summary, RunSummary::default());

        let text = String::from_utf8(session.into_inner()).unwrap();
        assert_eq!(text, format!("Number of platforms{}: 0\n", " ".repeat(29)));
    }

    #[test]
    fn test_platform_count_failure_prints_nothing() {
        let driver = MockDriver::new().failing_platform_count(status::OUT_OF_HOST_MEMORY);
        let mut session = ReportSession::new(&driver, Vec::new());

        let err = session.run().unwrap_err();
        assert!(err.to_string().starts_with("count platforms (driver)"));
        assert!(session.output().is_empty());
    }

    #[test]
    fn test_devices_are_owned_by_their_platform() {
        let driver = MockDriver::new()
            .with_platform(MockPlatform::new("A").with_device(MockDevice::new("a0")))
            .with_platform(MockPlatform::new("Empty"))
            .with_platform(
                MockPlatform::new("B")
                    .with_device(MockDevice::new("b0"))
                    .with_device(MockDevice::new("b1")),
            );
        let mut session = ReportSession::new(&driver, Vec::new());

        let summary = session.run().unwrap();
        let owned: Vec<usize> = summary.platforms.iter().map(|p| p.devices.len()).collect();
        assert_eq!(owned, [1, 0, 2]);
        assert_eq!(summary.device_count, 3);
        assert_eq!(summary.device_reports, 3);
    }

    #[test]
    fn test_device_list_failure_is_fatal() {
        let driver = MockDriver::new().with_platform(
            MockPlatform::new("A")
                .with_device(MockDevice::new("a0"))
                .failing_device_ids(status::INVALID_PLATFORM),
        );
        let mut session = ReportSession::new(&driver, Vec::new());

        let err = session.run().unwrap_err();
        assert_eq!(
            err.to_string(),
            "list devices (platform): error -32 (CL_INVALID_PLATFORM)"
        );
        let text = String::from_utf8(session.into_inner()).unwrap();
        assert!(!text.contains("Number of devices"));
    }

    #[test]
    fn test_scratch_capacity_is_configurable() {
        let driver = MockDriver::new()
            .with_platform(MockPlatform::new("A").with_device(MockDevice::new("a0")));
        let mut session = ReportSession::with_scratch_capacity(&driver, Vec::new(), 8);
        assert_eq!(session.scratch_capacity(), 8);

        session.run().unwrap();
        // the extensions string is the longest value
        assert_eq!(session.scratch_capacity(), "cl_khr_icd cl_khr_fp64".len() + 1);
    }

    #[test]
    fn test_list_reservation_failure_reports_bytes() {
        let len = usize::MAX / std::mem::size_of::<PlatformSummary>();
        match reserve::<PlatformSummary>("platform list", len) {
            Err(ClInfoError::AllocationFailed { purpose, size }) => {
                assert_eq!(purpose, "platform list");
                assert_eq!(size, len * std::mem::size_of::<PlatformSummary>());
            }
            other => panic!("expected AllocationFailed, got {other:?}"),
        }

        match reserve::<DeviceId>("device IDs", usize::MAX) {
            Err(ClInfoError::AllocationFailed { size, .. }) => assert_eq!(size, usize::MAX),
            other => panic!("expected AllocationFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_list_reservation_starts_empty() {
        let list = reserve::<Platform>("platform list", 3).unwrap();
        assert!(list.is_empty());
        assert!(list.capacity() >= 3);
    }
}
