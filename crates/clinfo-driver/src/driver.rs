//! Driver abstraction for platform and device queries
//!
//! [`ComputeDriver`] is the seam between the report and the native driver
//! stack. The OpenCL implementation lives in [`crate::opencl`]; an in-memory
//! implementation for tests lives in [`crate::mock`].

use crate::error::EntityKind;
use clinfo_abi::Status;
use std::fmt::Debug;

/// Opaque platform handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlatformId(usize);

/// Opaque device handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId(usize);

impl PlatformId {
    /// Wrap a raw driver handle
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    /// Raw driver handle
    pub const fn as_raw(self) -> usize {
        self.0
    }
}

impl DeviceId {
    /// Wrap a raw driver handle
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    /// Raw driver handle
    pub const fn as_raw(self) -> usize {
        self.0
    }
}

/// Entity an info query is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfoTarget {
    /// `clGetPlatformInfo`
    Platform(PlatformId),
    /// `clGetDeviceInfo`
    Device(DeviceId),
}

impl InfoTarget {
    /// Entity kind, for diagnostics
    pub const fn kind(self) -> EntityKind {
        match self {
            Self::Platform(_) => EntityKind::Platform,
            Self::Device(_) => EntityKind::Device,
        }
    }
}

/// Native compute driver
///
/// Every call is blocking and returns the driver's status on failure. The
/// report never retries a call.
pub trait ComputeDriver: Debug {
    /// Number of platforms
    ///
    /// # Errors
    ///
    /// Returns the driver status if enumeration fails.
    fn platform_count(&self) -> Result<u32, Status>;

    /// Handles of the first `count` platforms
    ///
    /// # Errors
    ///
    /// Returns the driver status if enumeration fails.
    fn platform_ids(&self, count: u32) -> Result<Vec<PlatformId>, Status>;

    /// Number of devices of any type on `platform`
    ///
    /// # Errors
    ///
    /// Returns the driver status if enumeration fails.
    fn device_count(&self, platform: PlatformId) -> Result<u32, Status>;

    /// Handles of the first `count` devices on `platform`
    ///
    /// # Errors
    ///
    /// Returns the driver status if enumeration fails.
    fn device_ids(&self, platform: PlatformId, count: u32) -> Result<Vec<DeviceId>, Status>;

    /// Query attribute `param` of `target`
    ///
    /// With `out == None` this is a size query. With a buffer, the value is
    /// written into it and the buffer must be at least as large as the value.
    /// Returns the value's size in bytes either way.
    ///
    /// # Errors
    ///
    /// Returns the driver status if the query fails.
    fn info(&self, target: InfoTarget, param: u32, out: Option<&mut [u8]>)
        -> Result<usize, Status>;
}
