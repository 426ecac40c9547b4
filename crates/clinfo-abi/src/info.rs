//! Info-query keys.
//!
//! Values are the `cl_platform_info` / `cl_device_info` codes from the
//! Khronos `cl.h` header (OpenCL 1.2). Each key carries its symbolic name so
//! that diagnostics can say which attribute failed.

/// A query key together with its symbolic `cl.h` name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InfoParam {
    /// Numeric key passed to the driver.
    pub code: u32,
    /// Symbolic name, e.g. `CL_DEVICE_NAME`.
    pub name: &'static str,
}

impl InfoParam {
    /// Create a key.
    #[must_use]
    pub const fn new(code: u32, name: &'static str) -> Self {
        Self { code, name }
    }
}

impl std::fmt::Display for InfoParam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// `clGetPlatformInfo` keys.
pub mod platform {
    use super::InfoParam;

    /// `CL_PLATFORM_PROFILE`
    pub const PROFILE: InfoParam = InfoParam::new(0x0900, "CL_PLATFORM_PROFILE");
    /// `CL_PLATFORM_VERSION`
    pub const VERSION: InfoParam = InfoParam::new(0x0901, "CL_PLATFORM_VERSION");
    /// `CL_PLATFORM_NAME`
    pub const NAME: InfoParam = InfoParam::new(0x0902, "CL_PLATFORM_NAME");
    /// `CL_PLATFORM_VENDOR`
    pub const VENDOR: InfoParam = InfoParam::new(0x0903, "CL_PLATFORM_VENDOR");
    /// `CL_PLATFORM_EXTENSIONS`
    pub const EXTENSIONS: InfoParam = InfoParam::new(0x0904, "CL_PLATFORM_EXTENSIONS");
}

/// `clGetDeviceInfo` keys.
#[allow(missing_docs)]
pub mod device {
    use super::InfoParam;

    pub const TYPE: InfoParam = InfoParam::new(0x1000, "CL_DEVICE_TYPE");
    pub const MAX_COMPUTE_UNITS: InfoParam = InfoParam::new(0x1002, "CL_DEVICE_MAX_COMPUTE_UNITS");
    pub const MAX_WORK_ITEM_DIMENSIONS: InfoParam =
        InfoParam::new(0x1003, "CL_DEVICE_MAX_WORK_ITEM_DIMENSIONS");
    pub const MAX_WORK_GROUP_SIZE: InfoParam =
        InfoParam::new(0x1004, "CL_DEVICE_MAX_WORK_GROUP_SIZE");
    pub const MAX_WORK_ITEM_SIZES: InfoParam =
        InfoParam::new(0x1005, "CL_DEVICE_MAX_WORK_ITEM_SIZES");

    pub const PREFERRED_VECTOR_WIDTH_CHAR: InfoParam =
        InfoParam::new(0x1006, "CL_DEVICE_PREFERRED_VECTOR_WIDTH_CHAR");
    pub const PREFERRED_VECTOR_WIDTH_SHORT: InfoParam =
        InfoParam::new(0x1007, "CL_DEVICE_PREFERRED_VECTOR_WIDTH_SHORT");
    pub const PREFERRED_VECTOR_WIDTH_INT: InfoParam =
        InfoParam::new(0x1008, "CL_DEVICE_PREFERRED_VECTOR_WIDTH_INT");
    pub const PREFERRED_VECTOR_WIDTH_LONG: InfoParam =
        InfoParam::new(0x1009, "CL_DEVICE_PREFERRED_VECTOR_WIDTH_LONG");
    pub const PREFERRED_VECTOR_WIDTH_FLOAT: InfoParam =
        InfoParam::new(0x100A, "CL_DEVICE_PREFERRED_VECTOR_WIDTH_FLOAT");
    pub const PREFERRED_VECTOR_WIDTH_DOUBLE: InfoParam =
        InfoParam::new(0x100B, "CL_DEVICE_PREFERRED_VECTOR_WIDTH_DOUBLE");

    pub const MAX_CLOCK_FREQUENCY: InfoParam =
        InfoParam::new(0x100C, "CL_DEVICE_MAX_CLOCK_FREQUENCY");
    pub const ADDRESS_BITS: InfoParam = InfoParam::new(0x100D, "CL_DEVICE_ADDRESS_BITS");
    pub const MAX_MEM_ALLOC_SIZE: InfoParam =
        InfoParam::new(0x1010, "CL_DEVICE_MAX_MEM_ALLOC_SIZE");
    pub const MAX_PARAMETER_SIZE: InfoParam =
        InfoParam::new(0x1017, "CL_DEVICE_MAX_PARAMETER_SIZE");
    pub const MEM_BASE_ADDR_ALIGN: InfoParam =
        InfoParam::new(0x1019, "CL_DEVICE_MEM_BASE_ADDR_ALIGN");
    pub const MIN_DATA_TYPE_ALIGN_SIZE: InfoParam =
        InfoParam::new(0x101A, "CL_DEVICE_MIN_DATA_TYPE_ALIGN_SIZE");
    pub const GLOBAL_MEM_CACHE_TYPE: InfoParam =
        InfoParam::new(0x101C, "CL_DEVICE_GLOBAL_MEM_CACHE_TYPE");
    pub const GLOBAL_MEM_CACHELINE_SIZE: InfoParam =
        InfoParam::new(0x101D, "CL_DEVICE_GLOBAL_MEM_CACHELINE_SIZE");
    pub const GLOBAL_MEM_CACHE_SIZE: InfoParam =
        InfoParam::new(0x101E, "CL_DEVICE_GLOBAL_MEM_CACHE_SIZE");
    pub const GLOBAL_MEM_SIZE: InfoParam = InfoParam::new(0x101F, "CL_DEVICE_GLOBAL_MEM_SIZE");
    pub const MAX_CONSTANT_BUFFER_SIZE: InfoParam =
        InfoParam::new(0x1020, "CL_DEVICE_MAX_CONSTANT_BUFFER_SIZE");
    pub const MAX_CONSTANT_ARGS: InfoParam = InfoParam::new(0x1021, "CL_DEVICE_MAX_CONSTANT_ARGS");
    pub const LOCAL_MEM_TYPE: InfoParam = InfoParam::new(0x1022, "CL_DEVICE_LOCAL_MEM_TYPE");
    pub const LOCAL_MEM_SIZE: InfoParam = InfoParam::new(0x1023, "CL_DEVICE_LOCAL_MEM_SIZE");
    pub const ENDIAN_LITTLE: InfoParam = InfoParam::new(0x1026, "CL_DEVICE_ENDIAN_LITTLE");

    pub const NAME: InfoParam = InfoParam::new(0x102B, "CL_DEVICE_NAME");
    pub const VENDOR: InfoParam = InfoParam::new(0x102C, "CL_DEVICE_VENDOR");
    pub const DRIVER_VERSION: InfoParam = InfoParam::new(0x102D, "CL_DRIVER_VERSION");
    pub const VERSION: InfoParam = InfoParam::new(0x102F, "CL_DEVICE_VERSION");

    pub const PREFERRED_VECTOR_WIDTH_HALF: InfoParam =
        InfoParam::new(0x1034, "CL_DEVICE_PREFERRED_VECTOR_WIDTH_HALF");
    pub const HOST_UNIFIED_MEMORY: InfoParam =
        InfoParam::new(0x1035, "CL_DEVICE_HOST_UNIFIED_MEMORY");
    pub const NATIVE_VECTOR_WIDTH_CHAR: InfoParam =
        InfoParam::new(0x1036, "CL_DEVICE_NATIVE_VECTOR_WIDTH_CHAR");
    pub const NATIVE_VECTOR_WIDTH_SHORT: InfoParam =
        InfoParam::new(0x1037, "CL_DEVICE_NATIVE_VECTOR_WIDTH_SHORT");
    pub const NATIVE_VECTOR_WIDTH_INT: InfoParam =
        InfoParam::new(0x1038, "CL_DEVICE_NATIVE_VECTOR_WIDTH_INT");
    pub const NATIVE_VECTOR_WIDTH_LONG: InfoParam =
        InfoParam::new(0x1039, "CL_DEVICE_NATIVE_VECTOR_WIDTH_LONG");
    pub const NATIVE_VECTOR_WIDTH_FLOAT: InfoParam =
        InfoParam::new(0x103A, "CL_DEVICE_NATIVE_VECTOR_WIDTH_FLOAT");
    pub const NATIVE_VECTOR_WIDTH_DOUBLE: InfoParam =
        InfoParam::new(0x103B, "CL_DEVICE_NATIVE_VECTOR_WIDTH_DOUBLE");
    pub const NATIVE_VECTOR_WIDTH_HALF: InfoParam =
        InfoParam::new(0x103C, "CL_DEVICE_NATIVE_VECTOR_WIDTH_HALF");
}

/// `cl_device_type` bits.
pub mod device_type {
    /// `CL_DEVICE_TYPE_DEFAULT`
    pub const DEFAULT: u64 = 1 << 0;
    /// `CL_DEVICE_TYPE_CPU`
    pub const CPU: u64 = 1 << 1;
    /// `CL_DEVICE_TYPE_GPU`
    pub const GPU: u64 = 1 << 2;
    /// `CL_DEVICE_TYPE_ACCELERATOR`
    pub const ACCELERATOR: u64 = 1 << 3;
    /// `CL_DEVICE_TYPE_CUSTOM`
    pub const CUSTOM: u64 = 1 << 4;
    /// `CL_DEVICE_TYPE_ALL`, used to count and list every device of a platform.
    pub const ALL: u64 = 0xFFFF_FFFF;
}

/// `CL_NONE`: no cache, or no dedicated local memory.
pub const CL_NONE: u32 = 0;

/// `cl_device_mem_cache_type` codes.
pub mod cache_type {
    pub use super::CL_NONE as NONE;
    /// `CL_READ_ONLY_CACHE`
    pub const READ_ONLY: u32 = 1;
    /// `CL_READ_WRITE_CACHE`
    pub const READ_WRITE: u32 = 2;
}

/// `cl_device_local_mem_type` codes.
pub mod local_mem_type {
    pub use super::CL_NONE as NONE;
    /// `CL_LOCAL`: dedicated local memory.
    pub const LOCAL: u32 = 1;
    /// `CL_GLOBAL`: local memory carved out of global memory.
    pub const GLOBAL: u32 = 2;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_display_their_symbolic_name() {
        assert_eq!(device::NAME.to_string(), "CL_DEVICE_NAME");
        assert_eq!(platform::EXTENSIONS.to_string(), "CL_PLATFORM_EXTENSIONS");
    }

    #[test]
    fn test_device_type_bits_are_distinct() {
        let bits = [
            device_type::DEFAULT,
            device_type::CPU,
            device_type::GPU,
            device_type::ACCELERATOR,
            device_type::CUSTOM,
        ];
        let combined = bits.iter().fold(0, |acc, b| acc | b);
        assert_eq!(combined.count_ones() as usize, bits.len());
        assert_eq!(device_type::ALL & combined, combined);
    }
}
