//! OpenCL host ABI model for the `clinfo` report.
//!
//! This crate has **no dependencies** and **no driver access**. It is a pure
//! model of the parts of the OpenCL 1.2 host API the report consumes: the
//! info-query keys, the status codes a driver may return, and the label
//! tables used to turn small integer codes into display text.
//!
//! # Crate organisation
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`info`] | `clGetPlatformInfo` / `clGetDeviceInfo` keys, device type bits, cache and local memory codes |
//! | [`status`] | `cl_int` status codes and their symbolic names |
//! | [`labels`] | Code-to-label tables (bool, endianness, device type, cache, local memory) |

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod info;
pub mod labels;
pub mod status;

pub use info::InfoParam;
pub use labels::LabelTable;
pub use status::Status;
