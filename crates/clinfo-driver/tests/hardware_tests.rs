//! Tests against the system OpenCL ICD loader

use clinfo_driver::{ComputeDriver, OpenClDriver, ReportSession};

#[test]
#[ignore] // Requires an OpenCL ICD loader
fn test_platform_count() {
    let driver = OpenClDriver::load().expect("OpenCL loader");
    let count = driver.platform_count().expect("platform count");
    println!("{}: {count} platform(s)", driver.path().display());
}

#[test]
#[ignore] // Requires an OpenCL ICD loader
fn test_full_report() {
    let driver = OpenClDriver::load().expect("OpenCL loader");
    let mut session = ReportSession::new(&driver, Vec::new());
    let summary = session.run().expect("report succeeds");

    assert_eq!(summary.device_reports, summary.device_count);
    let text = String::from_utf8_lossy(session.output()).into_owned();
    assert!(text.starts_with("Number of platforms"));
    println!("{text}");
}

#[test]
#[ignore] // Requires an OpenCL device
fn test_every_device_has_a_name() {
    let driver = OpenClDriver::load().expect("OpenCL loader");
    let mut session = ReportSession::new(&driver, Vec::new());
    let summary = session.run().expect("report succeeds");

    let text = String::from_utf8_lossy(session.output()).into_owned();
    let names = text.lines().filter(|l| l.starts_with("  Device Name")).count();
    assert_eq!(names, summary.device_reports);
    assert!(summary.device_reports > 0, "no OpenCL devices found");
}
