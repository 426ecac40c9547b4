//! OpenCL driver loaded from the system ICD loader
//!
//! The loader is opened at runtime with `libloading`, so the binary builds
//! and its tests run on machines without any OpenCL installation. Only the
//! four query entry points are resolved.

use crate::driver::{ComputeDriver, DeviceId, InfoTarget, PlatformId};
use crate::error::{ClInfoError, Result};
use clinfo_abi::info::device_type;
use clinfo_abi::{status, Status};
use libc::{c_void, size_t};
use libloading::Library;
use std::fmt;
use std::path::PathBuf;
use std::ptr;

#[allow(non_camel_case_types)]
type cl_platform_id = *mut c_void;
#[allow(non_camel_case_types)]
type cl_device_id = *mut c_void;

type GetPlatformIds = unsafe extern "system" fn(u32, *mut cl_platform_id, *mut u32) -> i32;
type GetPlatformInfo =
    unsafe extern "system" fn(cl_platform_id, u32, size_t, *mut c_void, *mut size_t) -> i32;
type GetDeviceIds =
    unsafe extern "system" fn(cl_platform_id, u64, u32, *mut cl_device_id, *mut u32) -> i32;
type GetDeviceInfo =
    unsafe extern "system" fn(cl_device_id, u32, size_t, *mut c_void, *mut size_t) -> i32;

/// Where to look for the ICD loader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryConfig {
    /// Library names or paths, tried in order
    pub candidates: Vec<PathBuf>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        let names: &[&str] = if cfg!(target_os = "macos") {
            &["/System/Library/Frameworks/OpenCL.framework/OpenCL"]
        } else if cfg!(target_os = "windows") {
            &["OpenCL.dll"]
        } else {
            &["libOpenCL.so.1", "libOpenCL.so"]
        };

        Self {
            candidates: names.iter().map(PathBuf::from).collect(),
        }
    }
}

/// Driver backed by the system OpenCL ICD loader
pub struct OpenClDriver {
    path: PathBuf,
    get_platform_ids: GetPlatformIds,
    get_platform_info: GetPlatformInfo,
    get_device_ids: GetDeviceIds,
    get_device_info: GetDeviceInfo,
    // Keeps the entry points above mapped.
    _library: Library,
}

impl OpenClDriver {
    /// Open the ICD loader from the default locations
    ///
    /// # Errors
    ///
    /// Returns an error if no loader can be opened or an entry point is missing.
    pub fn load() -> Result<Self> {
        Self::load_with(&LibraryConfig::default())
    }

    /// Open the ICD loader from the configured locations
    ///
    /// # Errors
    ///
    /// Returns an error if no candidate can be opened or an entry point is missing.
    pub fn load_with(config: &LibraryConfig) -> Result<Self> {
        for candidate in &config.candidates {
            // SAFETY: the ICD loader's initialisers have no preconditions on the caller.
            match unsafe { Library::new(candidate) } {
                Ok(library) => {
                    tracing::info!("Loaded OpenCL library {}", candidate.display());
                    return Self::from_library(library, candidate.clone());
                }
                Err(e) => {
                    tracing::debug!("Cannot open {}: {e}", candidate.display());
                }
            }
        }

        let tried = config
            .candidates
            .iter()
            .map(|c| c.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        tracing::error!("No OpenCL library found");
        Err(ClInfoError::LibraryNotFound { tried })
    }

    fn from_library(library: Library, path: PathBuf) -> Result<Self> {
        // SAFETY: each type alias matches the cl.h prototype of the named symbol.
        unsafe {
            Ok(Self {
                get_platform_ids: resolve(&library, &path, b"clGetPlatformIDs\0")?,
                get_platform_info: resolve(&library, &path, b"clGetPlatformInfo\0")?,
                get_device_ids: resolve(&library, &path, b"clGetDeviceIDs\0")?,
                get_device_info: resolve(&library, &path, b"clGetDeviceInfo\0")?,
                path,
                _library: library,
            })
        }
    }

    /// Path of the loaded library
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

/// Look up `symbol` (NUL terminated) as a function pointer of type `T`.
///
/// # Safety
///
/// `T` must be the exact function pointer type of the symbol.
unsafe fn resolve<T: Copy>(library: &Library, path: &std::path::Path, symbol: &[u8]) -> Result<T> {
    library.get::<T>(symbol).map(|f| *f).map_err(|_| {
        let name = String::from_utf8_lossy(symbol.strip_suffix(b"\0").unwrap_or(symbol));
        ClInfoError::MissingSymbol {
            library: path.display().to_string(),
            symbol: name.into_owned(),
        }
    })
}

const fn check(code: i32) -> std::result::Result<(), Status> {
    if code == status::SUCCESS {
        Ok(())
    } else {
        Err(Status(code))
    }
}

impl ComputeDriver for OpenClDriver {
    fn platform_count(&self) -> std::result::Result<u32, Status> {
        let mut count = 0u32;
        // SAFETY: a null list with zero entries is the documented count query.
        let code = unsafe { (self.get_platform_ids)(0, ptr::null_mut(), &mut count) };

        // ICD loaders with no vendor driver installed report this instead of zero.
        if code == status::PLATFORM_NOT_FOUND_KHR {
            tracing::debug!("ICD loader has no platforms registered");
            return Ok(0);
        }
        check(code)?;
        Ok(count)
    }

    fn platform_ids(&self, count: u32) -> std::result::Result<Vec<PlatformId>, Status> {
        let mut ids: Vec<cl_platform_id> = vec![ptr::null_mut(); count as usize];
        // SAFETY: `ids` holds exactly `count` entries.
        let code = unsafe { (self.get_platform_ids)(count, ids.as_mut_ptr(), ptr::null_mut()) };
        check(code)?;
        Ok(ids.into_iter().map(|id| PlatformId::from_raw(id as usize)).collect())
    }

    fn device_count(&self, platform: PlatformId) -> std::result::Result<u32, Status> {
        let mut count = 0u32;
        // SAFETY: a null list with zero entries is the documented count query.
        let code = unsafe {
            (self.get_device_ids)(
                platform.as_raw() as cl_platform_id,
                device_type::ALL,
                0,
                ptr::null_mut(),
                &mut count,
            )
        };

        // A platform with no devices reports CL_DEVICE_NOT_FOUND.
        if code == status::DEVICE_NOT_FOUND {
            tracing::debug!("Platform {:#x} has no devices", platform.as_raw());
            return Ok(0);
        }
        check(code)?;
        Ok(count)
    }

    fn device_ids(
        &self,
        platform: PlatformId,
        count: u32,
    ) -> std::result::Result<Vec<DeviceId>, Status> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let mut ids: Vec<cl_device_id> = vec![ptr::null_mut(); count as usize];
        // SAFETY: `ids` holds exactly `count` entries.
        let code = unsafe {
            (self.get_device_ids)(
                platform.as_raw() as cl_platform_id,
                device_type::ALL,
                count,
                ids.as_mut_ptr(),
                ptr::null_mut(),
            )
        };
        check(code)?;
        Ok(ids.into_iter().map(|id| DeviceId::from_raw(id as usize)).collect())
    }

    fn info(
        &self,
        target: InfoTarget,
        param: u32,
        out: Option<&mut [u8]>,
    ) -> std::result::Result<usize, Status> {
        let (size, value) = match out {
            Some(buf) => (buf.len(), buf.as_mut_ptr().cast::<c_void>()),
            None => (0, ptr::null_mut()),
        };
        let mut size_ret: size_t = 0;

        // SAFETY: `value` is either null with size 0 or points to `size` writable bytes.
        let code = unsafe {
            match target {
                InfoTarget::Platform(id) => (self.get_platform_info)(
                    id.as_raw() as cl_platform_id,
                    param,
                    size,
                    value,
                    &mut size_ret,
                ),
                InfoTarget::Device(id) => (self.get_device_info)(
                    id.as_raw() as cl_device_id,
                    param,
                    size,
                    value,
                    &mut size_ret,
                ),
            }
        };
        check(code)?;
        Ok(size_ret)
    }
}

impl fmt::Debug for OpenClDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenClDriver").field("path", &self.path).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_candidates_are_not_empty() {
        let config = LibraryConfig::default();
        assert!(!config.candidates.is_empty());
    }

    #[test]
    fn test_missing_library_lists_candidates() {
        let config = LibraryConfig {
            candidates: vec![PathBuf::from("/nonexistent/libOpenCL-test.so")],
        };
        match OpenClDriver::load_with(&config) {
            Err(ClInfoError::LibraryNotFound { tried }) => {
                assert!(tried.contains("libOpenCL-test.so"));
            }
            other => panic!("expected LibraryNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_check_maps_status() {
        assert!(check(status::SUCCESS).is_ok());
        assert_eq!(check(status::INVALID_VALUE), Err(Status(status::INVALID_VALUE)));
    }
}
