//! Print a report for an in-memory system
//!
//! Shows the report layout without any OpenCL installation: one platform
//! with a discrete GPU and a CPU device that has no local memory.

use clinfo_abi::info::{device as d, device_type, local_mem_type};
use clinfo_driver::mock::{MockDevice, MockDriver, MockPlatform, VectorWidths};
use clinfo_driver::{ReportSession, Result};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("clinfo_driver=debug")
        .with_writer(std::io::stderr)
        .init();

    let cpu = MockDevice::new("Acme Host CPU")
        .with_bitfield(d::TYPE, device_type::CPU)
        .with_uint(d::MAX_COMPUTE_UNITS, 16)
        .with_uint(d::HOST_UNIFIED_MEMORY, 1)
        .with_uint(d::LOCAL_MEM_TYPE, local_mem_type::GLOBAL)
        .with_work_item_sizes(&[8192, 8192, 8192])
        .with_vector_widths(VectorWidths {
            preferred: [1, 1, 1, 1, 0, 1, 1],
            native: [32, 16, 8, 4, 0, 8, 4],
        });

    let driver = MockDriver::new().with_platform(
        MockPlatform::new("Acme OpenCL")
            .with_device(MockDevice::new("Acme GPU"))
            .with_device(cpu),
    );

    let mut session = ReportSession::new(&driver, std::io::stdout().lock());
    let summary = session.run()?;

    eprintln!(
        "{} platform(s), {} device(s) reported",
        summary.platforms.len(),
        summary.device_reports
    );

    Ok(())
}
