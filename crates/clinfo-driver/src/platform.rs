//! Platform reporter

use crate::attributes::{self, Row, PLATFORM_ATTRIBUTES};
use crate::driver::{DeviceId, InfoTarget, PlatformId};
use crate::error::{ClInfoError, EntityKind, QueryStage, Result};
use crate::query::InfoQuery;
use clinfo_abi::info::platform as p;
use std::io::Write;

/// What the device pass needs to know about a reported platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformSummary {
    /// Driver handle
    pub id: PlatformId,
    /// `CL_PLATFORM_NAME`, repeated above the platform's device reports
    pub name: String,
    /// Devices of any type
    pub device_count: u32,
}

/// A platform together with the devices it owns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    /// Result of the platform pass
    pub summary: PlatformSummary,
    /// Device handles, in driver order
    pub devices: Vec<DeviceId>,
}

/// Print the platform section and count its devices
///
/// Writes a blank separator line, then the name, vendor, version, profile
/// and extensions of the platform.
///
/// # Errors
///
/// Returns the first failed query or write, or a failed device count.
pub fn report_platform<W: Write>(
    query: &mut InfoQuery<'_>,
    id: PlatformId,
    out: &mut W,
) -> Result<PlatformSummary> {
    let target = InfoTarget::Platform(id);
    writeln!(out)?;

    let mut name = String::new();
    for attribute in PLATFORM_ATTRIBUTES {
        let value = attributes::render(query, target, attribute, out)?;
        if let (Row::Text(param), Some(value)) = (attribute.row, value) {
            if param == p::NAME {
                name = value;
            }
        }
    }

    let device_count = query.driver().device_count(id).map_err(|status| {
        ClInfoError::query_failed("devices", EntityKind::Platform, QueryStage::Count, status)
    })?;
    tracing::debug!("Platform {name:?}: {device_count} device(s)");

    Ok(PlatformSummary {
        id,
        name,
        device_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::ComputeDriver;
    use crate::mock::{MockDevice, MockDriver, MockPlatform};
    use clinfo_abi::{status, Status};

    #[test]
    fn test_platform_section_layout() {
        let driver = MockDriver::new().with_platform(
            MockPlatform::new("Acme OpenCL")
                .with_device(MockDevice::new("a"))
                .with_device(MockDevice::new("b")),
        );
        let id = driver.platform_ids(1).unwrap()[0];
        let mut query = InfoQuery::new(&driver);
        let mut out = Vec::new();

        let summary = report_platform(&mut query, id, &mut out).unwrap();
        assert_eq!(summary.name, "Acme OpenCL");
        assert_eq!(summary.device_count, 2);

        let text = String::from_utf8(out).unwrap();
        let labels: Vec<&str> = text
            .lines()
            .map(|l| l.split(':').next().unwrap().trim())
            .collect();
        assert_eq!(
            labels,
            [
                "",
                "Platform Name",
                "Platform Vendor",
                "Platform Version",
                "Platform Profile",
                "Platform Extensions"
            ]
        );
    }

    #[test]
    fn test_device_count_failure() {
        let driver = MockDriver::new().with_platform(
            MockPlatform::new("Acme OpenCL").failing_device_count(status::OUT_OF_HOST_MEMORY),
        );
        let id = driver.platform_ids(1).unwrap()[0];
        let mut query = InfoQuery::new(&driver);

        let err = report_platform(&mut query, id, &mut Vec::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "count devices (platform): error -6 (CL_OUT_OF_HOST_MEMORY)"
        );
        assert_eq!(err.status(), Some(Status(status::OUT_OF_HOST_MEMORY)));
    }
}
