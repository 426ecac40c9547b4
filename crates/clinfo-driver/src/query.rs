//! Typed attribute queries
//!
//! [`InfoQuery`] wraps a [`ComputeDriver`] and decodes the raw bytes of
//! platform and device attributes. It owns the scratch buffer shared by all
//! string queries of a run.
//!
//! ## Query shapes
//!
//! ```text
//! string  : size query (no buffer) -> grow scratch if needed -> fetch -> cut at NUL
//! scalar  : one fetch into a buffer of the native width
//! array   : caller supplies the element count (from another attribute) -> one fetch
//! ```

use crate::driver::{ComputeDriver, InfoTarget};
use crate::error::{ClInfoError, QueryStage, Result};
use clinfo_abi::InfoParam;

/// Initial scratch buffer size in bytes
pub const DEFAULT_SCRATCH_CAPACITY: usize = 1024;

/// A fixed-width value the driver writes in native byte order
pub trait InfoScalar: Copy {
    /// Width in bytes of the native type
    const WIDTH: usize;

    /// Decode from exactly `WIDTH` native-endian bytes
    fn from_ne_slice(bytes: &[u8]) -> Self;
}

macro_rules! impl_info_scalar {
    ($($ty:ty),*) => {
        $(
            impl InfoScalar for $ty {
                const WIDTH: usize = std::mem::size_of::<$ty>();

                fn from_ne_slice(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(&bytes[..Self::WIDTH]);
                    <$ty>::from_ne_bytes(raw)
                }
            }
        )*
    };
}

// cl_uint / cl_bool, cl_ulong / cl_bitfield, size_t
impl_info_scalar!(u32, u64, usize);

/// Growable byte buffer reused across string queries
///
/// Grows to exactly the requested length and never shrinks.
#[derive(Debug)]
pub struct ScratchBuffer {
    bytes: Vec<u8>,
}

impl ScratchBuffer {
    /// Create a buffer of `capacity` zeroed bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: vec![0; capacity],
        }
    }

    /// Current usable length
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Make at least `len` bytes available
    ///
    /// # Errors
    ///
    /// Returns `AllocationFailed` if the buffer cannot grow.
    pub fn ensure(&mut self, len: usize) -> Result<()> {
        if len <= self.bytes.len() {
            return Ok(());
        }

        let additional = len - self.bytes.len();
        self.bytes
            .try_reserve_exact(additional)
            .map_err(|_| ClInfoError::allocation_failed("string buffer", len))?;
        self.bytes.resize(len, 0);
        tracing::trace!("Scratch buffer grown to {len} bytes");
        Ok(())
    }

    /// Whole buffer
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Text up to the first NUL within the first `len` bytes
    pub fn text(&self, len: usize) -> String {
        let filled = &self.bytes[..len.min(self.bytes.len())];
        let end = filled.iter().position(|&b| b == 0).unwrap_or(filled.len());
        String::from_utf8_lossy(&filled[..end]).into_owned()
    }
}

impl Default for ScratchBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_SCRATCH_CAPACITY)
    }
}

/// Attribute query adapter
#[derive(Debug)]
pub struct InfoQuery<'d> {
    driver: &'d dyn ComputeDriver,
    scratch: ScratchBuffer,
}

impl<'d> InfoQuery<'d> {
    /// Create an adapter with the default scratch size
    pub fn new(driver: &'d dyn ComputeDriver) -> Self {
        Self::with_scratch_capacity(driver, DEFAULT_SCRATCH_CAPACITY)
    }

    /// Create an adapter with an explicit initial scratch size
    pub fn with_scratch_capacity(driver: &'d dyn ComputeDriver, capacity: usize) -> Self {
        Self {
            driver,
            scratch: ScratchBuffer::with_capacity(capacity),
        }
    }

    /// Underlying driver
    pub fn driver(&self) -> &'d dyn ComputeDriver {
        self.driver
    }

    /// Current scratch buffer size
    pub fn scratch_capacity(&self) -> usize {
        self.scratch.capacity()
    }

    /// Query a variable-length string attribute
    ///
    /// # Errors
    ///
    /// Returns `QueryFailed` if the size query or the fetch fails, or
    /// `AllocationFailed` if the scratch buffer cannot grow.
    pub fn string(&mut self, target: InfoTarget, param: InfoParam) -> Result<String> {
        let needed = self
            .driver
            .info(target, param.code, None)
            .map_err(|status| {
                ClInfoError::query_failed(param.name, target.kind(), QueryStage::SizeQuery, status)
            })?;

        self.scratch.ensure(needed)?;

        let written = self
            .driver
            .info(target, param.code, Some(self.scratch.as_mut_slice()))
            .map_err(|status| {
                ClInfoError::query_failed(param.name, target.kind(), QueryStage::ValueFetch, status)
            })?;

        Ok(self.scratch.text(written))
    }

    /// Query a fixed-width scalar attribute
    ///
    /// # Errors
    ///
    /// Returns `QueryFailed` if the fetch fails.
    pub fn scalar<T: InfoScalar>(&mut self, target: InfoTarget, param: InfoParam) -> Result<T> {
        let mut raw = [0u8; 8];
        let buf = &mut raw[..T::WIDTH];
        self.driver
            .info(target, param.code, Some(buf))
            .map_err(|status| {
                ClInfoError::query_failed(param.name, target.kind(), QueryStage::ValueFetch, status)
            })?;
        Ok(T::from_ne_slice(&raw))
    }

    /// Query an array attribute of exactly `len` elements
    ///
    /// # Errors
    ///
    /// Returns `AllocationFailed` if the array cannot be allocated, or
    /// `QueryFailed` if the fetch fails.
    pub fn array<T: InfoScalar>(
        &mut self,
        target: InfoTarget,
        param: InfoParam,
        len: usize,
    ) -> Result<Vec<T>> {
        let size = len
            .checked_mul(T::WIDTH)
            .ok_or(ClInfoError::allocation_failed(param.name, usize::MAX))?;

        let mut raw = Vec::new();
        raw.try_reserve_exact(size)
            .map_err(|_| ClInfoError::allocation_failed(param.name, size))?;
        raw.resize(size, 0);

        self.driver
            .info(target, param.code, Some(raw.as_mut_slice()))
            .map_err(|status| {
                ClInfoError::query_failed(param.name, target.kind(), QueryStage::ValueFetch, status)
            })?;

        Ok(raw.chunks_exact(T::WIDTH).map(T::from_ne_slice).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::ComputeDriver;
    use crate::error::EntityKind;
    use crate::mock::{MockDevice, MockDriver, MockPlatform};
    use clinfo_abi::info::{device as d, platform as p};
    use clinfo_abi::{status, Status};

    fn single_device(device: MockDevice) -> (MockDriver, InfoTarget, InfoTarget) {
        let driver = MockDriver::new().with_platform(MockPlatform::new("Acme OpenCL").with_device(device));
        let platform = driver.platform_ids(1).unwrap()[0];
        let dev = driver.device_ids(platform, 1).unwrap()[0];
        (driver, InfoTarget::Platform(platform), InfoTarget::Device(dev))
    }

    #[test]
    fn test_string_query_strips_terminator() {
        let (driver, platform, _) = single_device(MockDevice::new("GPU"));
        let mut query = InfoQuery::new(&driver);
        assert_eq!(query.string(platform, p::NAME).unwrap(), "Acme OpenCL");
    }

    #[test]
    fn test_scratch_grows_to_exact_length_and_never_shrinks() {
        let long = "x".repeat(100);
        let (driver, platform, device) = single_device(MockDevice::new(&long));
        let mut query = InfoQuery::with_scratch_capacity(&driver, 16);

        assert_eq!(query.string(device, d::NAME).unwrap(), long);
        assert_eq!(query.scratch_capacity(), 101);

        assert_eq!(query.string(platform, p::NAME).unwrap(), "Acme OpenCL");
        assert_eq!(query.scratch_capacity(), 101);
    }

    #[test]
    fn test_scalar_widths() {
        let (driver, _, device) = single_device(MockDevice::new("GPU"));
        let mut query = InfoQuery::new(&driver);

        assert_eq!(query.scalar::<u32>(device, d::MAX_COMPUTE_UNITS).unwrap(), 32);
        assert_eq!(
            query.scalar::<u64>(device, d::GLOBAL_MEM_SIZE).unwrap(),
            8 * 1024 * 1024 * 1024
        );
        assert_eq!(query.scalar::<usize>(device, d::MAX_WORK_GROUP_SIZE).unwrap(), 1024);
    }

    #[test]
    fn test_array_query() {
        let (driver, _, device) =
            single_device(MockDevice::new("GPU").with_work_item_sizes(&[256, 128]));
        let mut query = InfoQuery::new(&driver);

        let sizes = query.array::<usize>(device, d::MAX_WORK_ITEM_SIZES, 2).unwrap();
        assert_eq!(sizes, vec![256, 128]);
    }

    #[test]
    fn test_size_query_failure_reports_size_stage() {
        let (driver, _, device) =
            single_device(MockDevice::new("GPU").failing(d::VENDOR, status::INVALID_VALUE));
        let mut query = InfoQuery::new(&driver);

        match query.string(device, d::VENDOR) {
            Err(ClInfoError::QueryFailed {
                operation,
                entity,
                stage,
                status: code,
            }) => {
                assert_eq!(operation, "CL_DEVICE_VENDOR");
                assert_eq!(entity, EntityKind::Device);
                assert_eq!(stage, QueryStage::SizeQuery);
                assert_eq!(code, Status(status::INVALID_VALUE));
            }
            other => panic!("expected QueryFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_fetch_failure_reports_fetch_stage() {
        let (driver, _, device) = single_device(
            MockDevice::new("GPU").failing_fetch(d::VERSION, status::OUT_OF_HOST_MEMORY),
        );
        let mut query = InfoQuery::new(&driver);

        let err = query.string(device, d::VERSION).unwrap_err();
        assert!(matches!(
            err,
            ClInfoError::QueryFailed {
                stage: QueryStage::ValueFetch,
                ..
            }
        ));
        assert_eq!(err.status(), Some(Status(status::OUT_OF_HOST_MEMORY)));
    }

    #[test]
    fn test_missing_scalar_is_a_query_failure() {
        let (driver, _, device) = single_device(MockDevice::new("GPU").without(d::ADDRESS_BITS));
        let mut query = InfoQuery::new(&driver);

        let err = query.scalar::<u32>(device, d::ADDRESS_BITS).unwrap_err();
        assert!(err.to_string().contains("CL_DEVICE_ADDRESS_BITS"));
    }

    #[test]
    fn test_scratch_text_without_terminator() {
        let mut scratch = ScratchBuffer::with_capacity(4);
        scratch.as_mut_slice().copy_from_slice(b"abcd");
        assert_eq!(scratch.text(4), "abcd");
        assert_eq!(scratch.text(10), "abcd");
        assert_eq!(scratch.text(2), "ab");
    }

    #[test]
    fn test_scratch_growth_failure_keeps_capacity() {
        let mut scratch = ScratchBuffer::default();
        let err = scratch.ensure(usize::MAX).unwrap_err();

        assert!(matches!(
            err,
            ClInfoError::AllocationFailed {
                purpose: "string buffer",
                size: usize::MAX,
            }
        ));
        assert_eq!(scratch.capacity(), DEFAULT_SCRATCH_CAPACITY);
        assert!(err.status().is_none());
    }

    #[test]
    fn test_array_size_overflow_is_allocation_failure() {
        let (driver, _, device) = single_device(MockDevice::new("GPU"));
        let mut query = InfoQuery::new(&driver);

        let err = query.array::<usize>(device, d::MAX_WORK_ITEM_SIZES, usize::MAX).unwrap_err();
        assert!(matches!(
            err,
            ClInfoError::AllocationFailed {
                purpose: "CL_DEVICE_MAX_WORK_ITEM_SIZES",
                size: usize::MAX,
            }
        ));
        assert!(!driver.device_queried(d::MAX_WORK_ITEM_SIZES));
    }

    #[test]
    fn test_array_reserve_failure_reports_byte_size() {
        let (driver, _, device) = single_device(MockDevice::new("GPU"));
        let mut query = InfoQuery::new(&driver);

        let len = usize::MAX / 4;
        let err = query.array::<u32>(device, d::MAX_WORK_ITEM_SIZES, len).unwrap_err();
        match err {
            ClInfoError::AllocationFailed { purpose, size } => {
                assert_eq!(purpose, "CL_DEVICE_MAX_WORK_ITEM_SIZES");
                assert_eq!(size, len * 4);
            }
            other => panic!("expected AllocationFailed, got {other:?}"),
        }
    }
}
