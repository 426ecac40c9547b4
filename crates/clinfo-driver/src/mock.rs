//! In-memory driver
//!
//! Implements [`ComputeDriver`] over a fixed set of platforms and devices
//! held in memory. No OpenCL installation is required, so the whole report
//! pipeline can run in CI:
//!
//! ```
//! use clinfo_driver::mock::{MockDevice, MockDriver, MockPlatform};
//! use clinfo_driver::ReportSession;
//!
//! let driver = MockDriver::new()
//!     .with_platform(MockPlatform::new("Acme OpenCL").with_device(MockDevice::new("Acme GPU")));
//!
//! let mut session = ReportSession::new(&driver, Vec::new());
//! let summary = session.run().unwrap();
//! assert_eq!(summary.device_reports, 1);
//! ```
//!
//! Attribute values are stored as the raw bytes a driver would return.
//! Faults can be injected per attribute or per enumeration call.

use crate::driver::{ComputeDriver, DeviceId, InfoTarget, PlatformId};
use clinfo_abi::info::{self, cache_type, device_type, local_mem_type, InfoParam};
use clinfo_abi::{status, Status};
use std::cell::RefCell;
use std::collections::BTreeMap;

/// When an injected fault fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FaultOn {
    /// Size queries and value fetches
    Always,
    /// Value fetches only
    Fetch,
}

#[derive(Debug, Clone, Default)]
struct Attributes {
    values: BTreeMap<u32, Vec<u8>>,
    faults: BTreeMap<u32, (FaultOn, i32)>,
}

impl Attributes {
    fn set(&mut self, param: InfoParam, bytes: Vec<u8>) {
        self.values.insert(param.code, bytes);
    }

    fn string(&mut self, param: InfoParam, value: &str) {
        let mut bytes = value.as_bytes().to_vec();
        bytes.push(0);
        self.set(param, bytes);
    }

    fn read(&self, param: u32, out: Option<&mut [u8]>) -> Result<usize, Status> {
        if let Some(&(on, code)) = self.faults.get(&param) {
            if on == FaultOn::Always || out.is_some() {
                return Err(Status(code));
            }
        }

        let value = self
            .values
            .get(&param)
            .ok_or(Status(status::INVALID_VALUE))?;

        if let Some(buf) = out {
            if buf.len() < value.len() {
                return Err(Status(status::INVALID_VALUE));
            }
            buf[..value.len()].copy_from_slice(value);
        }
        Ok(value.len())
    }
}

/// In-memory device
#[derive(Debug, Clone)]
pub struct MockDevice {
    attributes: Attributes,
}

impl MockDevice {
    /// A discrete GPU with a read/write cache and dedicated local memory
    pub fn new(name: &str) -> Self {
        use info::device as d;

        let device = Self {
            attributes: Attributes::default(),
        };

        device
            .with_string(d::NAME, name)
            .with_string(d::VENDOR, "Mock Vendor")
            .with_string(d::VERSION, "OpenCL 1.2 mock")
            .with_string(d::DRIVER_VERSION, "1.0.0-mock")
            .with_bitfield(d::TYPE, device_type::GPU)
            .with_uint(d::MAX_COMPUTE_UNITS, 32)
            .with_uint(d::MAX_CLOCK_FREQUENCY, 1500)
            .with_work_item_sizes(&[1024, 1024, 64])
            .with_size(d::MAX_WORK_GROUP_SIZE, 1024)
            .with_vector_widths(VectorWidths::default())
            .with_uint(d::ADDRESS_BITS, 64)
            .with_uint(d::ENDIAN_LITTLE, 1)
            .with_ulong(d::GLOBAL_MEM_SIZE, 8 * 1024 * 1024 * 1024)
            .with_ulong(d::MAX_MEM_ALLOC_SIZE, 2 * 1024 * 1024 * 1024)
            .with_uint(d::HOST_UNIFIED_MEMORY, 0)
            .with_uint(d::GLOBAL_MEM_CACHE_TYPE, cache_type::READ_WRITE)
            .with_ulong(d::GLOBAL_MEM_CACHE_SIZE, 512 * 1024)
            .with_uint(d::GLOBAL_MEM_CACHELINE_SIZE, 64)
            .with_uint(d::MIN_DATA_TYPE_ALIGN_SIZE, 128)
            .with_uint(d::MEM_BASE_ADDR_ALIGN, 1024)
            .with_uint(d::LOCAL_MEM_TYPE, local_mem_type::LOCAL)
            .with_ulong(d::LOCAL_MEM_SIZE, 64 * 1024)
            .with_ulong(d::MAX_CONSTANT_BUFFER_SIZE, 64 * 1024)
            .with_uint(d::MAX_CONSTANT_ARGS, 8)
            .with_size(d::MAX_PARAMETER_SIZE, 4096)
    }

    /// Set a string attribute (stored NUL terminated)
    #[must_use]
    pub fn with_string(mut self, param: InfoParam, value: &str) -> Self {
        self.attributes.string(param, value);
        self
    }

    /// Set a `cl_uint` or `cl_bool` attribute
    #[must_use]
    pub fn with_uint(mut self, param: InfoParam, value: u32) -> Self {
        self.attributes.set(param, value.to_ne_bytes().to_vec());
        self
    }

    /// Set a `cl_ulong` attribute
    #[must_use]
    pub fn with_ulong(mut self, param: InfoParam, value: u64) -> Self {
        self.attributes.set(param, value.to_ne_bytes().to_vec());
        self
    }

    /// Set a `cl_bitfield` attribute
    #[must_use]
    pub fn with_bitfield(self, param: InfoParam, value: u64) -> Self {
        self.with_ulong(param, value)
    }

    /// Set a `size_t` attribute
    #[must_use]
    pub fn with_size(mut self, param: InfoParam, value: usize) -> Self {
        self.attributes.set(param, value.to_ne_bytes().to_vec());
        self
    }

    /// Set the work-item dimension count and per-dimension sizes together
    #[must_use]
    pub fn with_work_item_sizes(mut self, sizes: &[usize]) -> Self {
        let dims = u32::try_from(sizes.len()).unwrap_or(u32::MAX);
        let bytes = sizes.iter().flat_map(|s| s.to_ne_bytes()).collect();
        self.attributes.set(info::device::MAX_WORK_ITEM_SIZES, bytes);
        self.with_uint(info::device::MAX_WORK_ITEM_DIMENSIONS, dims)
    }

    /// Set all preferred and native vector widths
    #[must_use]
    pub fn with_vector_widths(self, widths: VectorWidths) -> Self {
        use info::device as d;

        self.with_uint(d::PREFERRED_VECTOR_WIDTH_CHAR, widths.preferred[0])
            .with_uint(d::PREFERRED_VECTOR_WIDTH_SHORT, widths.preferred[1])
            .with_uint(d::PREFERRED_VECTOR_WIDTH_INT, widths.preferred[2])
            .with_uint(d::PREFERRED_VECTOR_WIDTH_LONG, widths.preferred[3])
            .with_uint(d::PREFERRED_VECTOR_WIDTH_HALF, widths.preferred[4])
            .with_uint(d::PREFERRED_VECTOR_WIDTH_FLOAT, widths.preferred[5])
            .with_uint(d::PREFERRED_VECTOR_WIDTH_DOUBLE, widths.preferred[6])
            .with_uint(d::NATIVE_VECTOR_WIDTH_CHAR, widths.native[0])
            .with_uint(d::NATIVE_VECTOR_WIDTH_SHORT, widths.native[1])
            .with_uint(d::NATIVE_VECTOR_WIDTH_INT, widths.native[2])
            .with_uint(d::NATIVE_VECTOR_WIDTH_LONG, widths.native[3])
            .with_uint(d::NATIVE_VECTOR_WIDTH_HALF, widths.native[4])
            .with_uint(d::NATIVE_VECTOR_WIDTH_FLOAT, widths.native[5])
            .with_uint(d::NATIVE_VECTOR_WIDTH_DOUBLE, widths.native[6])
    }

    /// Remove an attribute; querying it then fails with `CL_INVALID_VALUE`
    #[must_use]
    pub fn without(mut self, param: InfoParam) -> Self {
        self.attributes.values.remove(&param.code);
        self
    }

    /// Make every query of `param` fail with `code`
    #[must_use]
    pub fn failing(mut self, param: InfoParam, code: i32) -> Self {
        self.attributes.faults.insert(param.code, (FaultOn::Always, code));
        self
    }

    /// Make value fetches of `param` fail with `code`; size queries succeed
    #[must_use]
    pub fn failing_fetch(mut self, param: InfoParam, code: i32) -> Self {
        self.attributes.faults.insert(param.code, (FaultOn::Fetch, code));
        self
    }
}

/// Preferred and native vector widths, in char, short, int, long, half,
/// float, double order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorWidths {
    /// `CL_DEVICE_PREFERRED_VECTOR_WIDTH_*`
    pub preferred: [u32; 7],
    /// `CL_DEVICE_NATIVE_VECTOR_WIDTH_*`
    pub native: [u32; 7],
}

impl Default for VectorWidths {
    fn default() -> Self {
        Self {
            preferred: [16, 8, 4, 2, 8, 4, 2],
            native: [16, 8, 4, 2, 8, 4, 2],
        }
    }
}

/// In-memory platform
#[derive(Debug, Clone)]
pub struct MockPlatform {
    attributes: Attributes,
    devices: Vec<MockDevice>,
    device_count_fault: Option<i32>,
    device_ids_fault: Option<i32>,
}

impl MockPlatform {
    /// A full-profile OpenCL 1.2 platform with no devices
    pub fn new(name: &str) -> Self {
        use info::platform as p;

        let mut attributes = Attributes::default();
        attributes.string(p::NAME, name);
        attributes.string(p::VENDOR, "Mock Vendor");
        attributes.string(p::VERSION, "OpenCL 1.2 mock");
        attributes.string(p::PROFILE, "FULL_PROFILE");
        attributes.string(p::EXTENSIONS, "cl_khr_icd cl_khr_fp64");

        Self {
            attributes,
            devices: Vec::new(),
            device_count_fault: None,
            device_ids_fault: None,
        }
    }

    /// Add a device
    #[must_use]
    pub fn with_device(mut self, device: MockDevice) -> Self {
        self.devices.push(device);
        self
    }

    /// Set a string attribute (stored NUL terminated)
    #[must_use]
    pub fn with_string(mut self, param: InfoParam, value: &str) -> Self {
        self.attributes.string(param, value);
        self
    }

    /// Make every query of `param` fail with `code`
    #[must_use]
    pub fn failing(mut self, param: InfoParam, code: i32) -> Self {
        self.attributes.faults.insert(param.code, (FaultOn::Always, code));
        self
    }

    /// Make the device count query fail with `code`
    #[must_use]
    pub fn failing_device_count(mut self, code: i32) -> Self {
        self.device_count_fault = Some(code);
        self
    }

    /// Make the device handle query fail with `code`
    #[must_use]
    pub fn failing_device_ids(mut self, code: i32) -> Self {
        self.device_ids_fault = Some(code);
        self
    }
}

/// In-memory driver
#[derive(Debug, Default)]
pub struct MockDriver {
    platforms: Vec<MockPlatform>,
    platform_count_fault: Option<i32>,
    queries: RefCell<Vec<(InfoTarget, u32)>>,
}

impl MockDriver {
    /// A driver with no platforms
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a platform
    #[must_use]
    pub fn with_platform(mut self, platform: MockPlatform) -> Self {
        self.platforms.push(platform);
        self
    }

    /// Make the platform count query fail with `code`
    #[must_use]
    pub fn failing_platform_count(mut self, code: i32) -> Self {
        self.platform_count_fault = Some(code);
        self
    }

    /// Whether `param` was ever queried on any device
    pub fn device_queried(&self, param: InfoParam) -> bool {
        self.queries
            .borrow()
            .iter()
            .any(|(target, code)| matches!(target, InfoTarget::Device(_)) && *code == param.code)
    }

    // Handles encode the 1-based platform index in the high half and the
    // 1-based device index in the low half, so zero is never a valid handle.
    const fn platform_handle(index: usize) -> PlatformId {
        PlatformId::from_raw((index + 1) << 16)
    }

    const fn device_handle(platform: usize, device: usize) -> DeviceId {
        DeviceId::from_raw(((platform + 1) << 16) | (device + 1))
    }

    fn platform(&self, id: PlatformId) -> Result<&MockPlatform, Status> {
        let raw = id.as_raw();
        if raw & 0xFFFF != 0 {
            return Err(Status(status::INVALID_PLATFORM));
        }
        (raw >> 16)
            .checked_sub(1)
            .and_then(|index| self.platforms.get(index))
            .ok_or(Status(status::INVALID_PLATFORM))
    }

    fn device(&self, id: DeviceId) -> Result<&MockDevice, Status> {
        let raw = id.as_raw();
        let platform = (raw >> 16).checked_sub(1);
        let device = (raw & 0xFFFF).checked_sub(1);
        platform
            .zip(device)
            .and_then(|(p, d)| self.platforms.get(p)?.devices.get(d))
            .ok_or(Status(status::INVALID_DEVICE))
    }
}

impl ComputeDriver for MockDriver {
    fn platform_count(&self) -> Result<u32, Status> {
        if let Some(code) = self.platform_count_fault {
            return Err(Status(code));
        }
        Ok(u32::try_from(self.platforms.len()).unwrap_or(u32::MAX))
    }

    fn platform_ids(&self, count: u32) -> Result<Vec<PlatformId>, Status> {
        Ok((0..self.platforms.len().min(count as usize))
            .map(Self::platform_handle)
            .collect())
    }

    fn device_count(&self, platform: PlatformId) -> Result<u32, Status> {
        let p = self.platform(platform)?;
        if let Some(code) = p.device_count_fault {
            return Err(Status(code));
        }
        Ok(u32::try_from(p.devices.len()).unwrap_or(u32::MAX))
    }

    fn device_ids(&self, platform: PlatformId, count: u32) -> Result<Vec<DeviceId>, Status> {
        let p = self.platform(platform)?;
        if let Some(code) = p.device_ids_fault {
            return Err(Status(code));
        }
        let platform_index = (platform.as_raw() >> 16) - 1;
        Ok((0..p.devices.len().min(count as usize))
            .map(|d| Self::device_handle(platform_index, d))
            .collect())
    }

    fn info(
        &self,
        target: InfoTarget,
        param: u32,
        out: Option<&mut [u8]>,
    ) -> Result<usize, Status> {
        self.queries.borrow_mut().push((target, param));
        match target {
            InfoTarget::Platform(id) => self.platform(id)?.attributes.read(param, out),
            InfoTarget::Device(id) => self.device(id)?.attributes.read(param, out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinfo_abi::info::{device as d, platform as p};

    #[test]
    fn test_handles_round_trip_to_entities() {
        let driver = MockDriver::new()
            .with_platform(MockPlatform::new("A").with_device(MockDevice::new("a0")))
            .with_platform(
                MockPlatform::new("B")
                    .with_device(MockDevice::new("b0"))
                    .with_device(MockDevice::new("b1")),
            );

        let platforms = driver.platform_ids(2).unwrap();
        assert_eq!(platforms.len(), 2);
        assert_eq!(driver.device_count(platforms[1]).unwrap(), 2);

        let devices = driver.device_ids(platforms[1], 2).unwrap();
        let mut buf = [0u8; 8];
        let len = driver
            .info(InfoTarget::Device(devices[1]), d::NAME.code, Some(&mut buf))
            .unwrap();
        assert_eq!(&buf[..len], b"b1\0");
    }

    #[test]
    fn test_size_query_and_short_buffer() {
        let driver = MockDriver::new().with_platform(MockPlatform::new("Acme OpenCL"));
        let id = driver.platform_ids(1).unwrap()[0];
        let target = InfoTarget::Platform(id);

        assert_eq!(driver.info(target, p::NAME.code, None), Ok(12));
        let mut short = [0u8; 4];
        assert_eq!(
            driver.info(target, p::NAME.code, Some(&mut short)),
            Err(Status(status::INVALID_VALUE))
        );
    }

    #[test]
    fn test_fetch_fault_lets_size_query_through() {
        let driver = MockDriver::new().with_platform(
            MockPlatform::new("P")
                .with_device(MockDevice::new("D").failing_fetch(d::NAME, status::OUT_OF_RESOURCES)),
        );
        let platform = driver.platform_ids(1).unwrap()[0];
        let device = InfoTarget::Device(driver.device_ids(platform, 1).unwrap()[0]);

        assert!(driver.info(device, d::NAME.code, None).is_ok());
        let mut buf = [0u8; 16];
        assert_eq!(
            driver.info(device, d::NAME.code, Some(&mut buf)),
            Err(Status(status::OUT_OF_RESOURCES))
        );
        assert!(driver.device_queried(d::NAME));
    }

    #[test]
    fn test_invalid_handles_are_rejected() {
        let driver = MockDriver::new();
        assert_eq!(
            driver.device_count(PlatformId::from_raw(0)),
            Err(Status(status::INVALID_PLATFORM))
        );
        assert_eq!(
            driver.info(InfoTarget::Device(DeviceId::from_raw(0x1_0001)), d::NAME.code, None),
            Err(Status(status::INVALID_DEVICE))
        );
    }
}
