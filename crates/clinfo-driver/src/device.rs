//! Device reporter

use crate::attributes::{self, DEVICE_ATTRIBUTES};
use crate::driver::{DeviceId, InfoTarget};
use crate::error::Result;
use crate::query::InfoQuery;
use std::io::Write;

/// Print every device attribute, in report order
///
/// Cache size and cache line are skipped when the device has no global
/// memory cache, and local memory size when it has no local memory.
///
/// # Errors
///
/// Returns the first failed query, decode or write. Lines already written
/// stay written.
pub fn report_device<W: Write>(query: &mut InfoQuery<'_>, id: DeviceId, out: &mut W) -> Result<()> {
    tracing::debug!("Reporting device {:#x}", id.as_raw());
    attributes::render_all(query, InfoTarget::Device(id), DEVICE_ATTRIBUTES, out)
}
