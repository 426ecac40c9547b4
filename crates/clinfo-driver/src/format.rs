//! Unit conversion and line layout
//!
//! ## Line layout
//!
//! ```text
//! Number of platforms                             : 1            header_line
//!   Platform Name                                 : Acme OpenCL  attribute_line
//!     Max work item size[0]                       : 1024         indexed_line
//!                                         char    :       16 / 16        vector_line
//! ```

use crate::error::{ClInfoError, Result};
use clinfo_abi::LabelTable;
use std::fmt::Display;

/// Label width of top-level lines
pub const HEADER_WIDTH: usize = 48;
/// Label width of attribute lines (after a two-space indent)
pub const LABEL_WIDTH: usize = 46;
/// Label width of indexed sub-items (after a four-space indent)
pub const SUB_LABEL_WIDTH: usize = 44;

/// Significant digits of the human-readable byte quantity
pub const BYTE_SIGNIFICANT_DIGITS: usize = 4;

const KB: u64 = 1024;
const MB: u64 = KB * KB;
const GB: u64 = MB * KB;
const TB: u64 = GB * KB;

const UNITS: [(u64, &str); 4] = [(TB, "TB"), (GB, "GB"), (MB, "MB"), (KB, "KB")];

/// `Number of platforms                             : 3`
pub fn header_line(label: &str, value: impl Display) -> String {
    format!("{label:<HEADER_WIDTH$}: {value}")
}

/// `  Device Name                                   : Acme GPU`
pub fn attribute_line(label: &str, value: impl Display) -> String {
    format!("  {label:<LABEL_WIDTH$}: {value}")
}

/// Attribute label with no value, introducing the lines below it
pub fn section_line(label: &str) -> String {
    format!("  {label:<LABEL_WIDTH$}:")
}

/// `    Max work item size[1]                       : 1024`
pub fn indexed_line(label: &str, index: impl Display, value: impl Display) -> String {
    let label = format!("{label}[{index}]");
    format!("    {label:<SUB_LABEL_WIDTH$}: {value}")
}

/// One preferred / native vector width row, right-aligned under its header
pub fn vector_line(type_name: &str, preferred: u32, native: u32) -> String {
    format!("{type_name:>SUB_LABEL_WIDTH$}    : {preferred:>8} / {native:<8}")
}

/// Parenthesised human-readable size, `None` for `bytes <= 1 KB`
///
/// The unit is the largest of TB, GB, MB, KB that `bytes` strictly exceeds.
pub fn byte_suffix(bytes: u64) -> Option<String> {
    if bytes <= KB {
        return None;
    }

    let (size, unit) = UNITS
        .iter()
        .copied()
        .find(|&(size, _)| bytes > size)
        .unwrap_or((KB, "KB"));

    #[allow(clippy::cast_precision_loss)]
    let quantity = bytes as f64 / size as f64;
    Some(format!(
        "({}{unit})",
        format_significant(quantity, BYTE_SIGNIFICANT_DIGITS)
    ))
}

/// Raw byte count, followed by the human-readable size when above 1 KB
///
/// `format_bytes(2147483648) == "2147483648 (2GB)"`
pub fn format_bytes(bytes: u64) -> String {
    match byte_suffix(bytes) {
        Some(suffix) => format!("{bytes} {suffix}"),
        None => bytes.to_string(),
    }
}

/// Render `value` with `digits` significant digits, printf `%g` style
///
/// Fixed notation unless the decimal exponent is below -4 or at least
/// `digits`; trailing zeros and a trailing decimal point are removed.
pub fn format_significant(value: f64, digits: usize) -> String {
    let digits = digits.max(1);
    if value == 0.0 || !value.is_finite() {
        return value.to_string();
    }

    // Rounding to `digits` first decides the exponent, as printf does.
    let scientific = format!("{:.*e}", digits - 1, value);
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let precision = i32::try_from(digits).unwrap_or(i32::MAX);

    if exponent < -4 || exponent >= precision {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{sign}{:02}",
            trim_fraction(mantissa),
            exponent.unsigned_abs()
        )
    } else {
        let decimals = usize::try_from(precision - 1 - exponent).unwrap_or(0);
        trim_fraction(&format!("{value:.decimals$}")).to_owned()
    }
}

fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

/// Label of `code` in `table`
///
/// # Errors
///
/// Returns `Decode` naming `attribute` when the code is outside the table.
pub fn lookup(table: &LabelTable, code: u64, attribute: &'static str) -> Result<&'static str> {
    table
        .get(code)
        .ok_or(ClInfoError::decode(attribute, code, table.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinfo_abi::labels;

    #[test]
    fn test_no_suffix_up_to_one_kilobyte() {
        assert_eq!(format_bytes(0), "0");
        assert_eq!(format_bytes(512), "512");
        assert_eq!(format_bytes(1024), "1024");
    }

    #[test]
    fn test_units_use_strict_threshold() {
        assert_eq!(format_bytes(1025), "1025 (1.001KB)");
        assert_eq!(format_bytes(64 * 1024), "65536 (64KB)");
        // exactly 1 MB does not exceed MB, so it stays in KB
        assert_eq!(format_bytes(MB), "1048576 (1024KB)");
        assert_eq!(format_bytes(GB), "1073741824 (1024MB)");
        assert_eq!(format_bytes(2 * GB), "2147483648 (2GB)");
        assert_eq!(format_bytes(3 * TB / 2), "1649267441664 (1.5TB)");
    }

    #[test]
    fn test_significant_digits() {
        assert_eq!(format_significant(2.0, 4), "2");
        assert_eq!(format_significant(1.5, 4), "1.5");
        assert_eq!(format_significant(3.999_755_859_375, 4), "4");
        assert_eq!(format_significant(1023.9, 4), "1024");
        assert_eq!(format_significant(16384.0, 4), "1.638e+04");
        assert_eq!(format_significant(0.000_012_5, 4), "1.25e-05");
        assert_eq!(format_significant(0.5, 4), "0.5");
        assert_eq!(format_significant(0.0, 4), "0");
    }

    #[test]
    fn test_line_layout() {
        assert_eq!(
            header_line("Number of platforms", 0),
            format!("Number of platforms{}: 0", " ".repeat(29))
        );
        let line = attribute_line("Device Name", "Acme GPU");
        assert!(line.starts_with("  Device Name "));
        assert_eq!(line.find(':'), Some(2 + LABEL_WIDTH));

        let line = indexed_line("Max work item size", 2, 64);
        assert_eq!(line, format!("    Max work item size[2]{}: 64", " ".repeat(23)));

        assert!(section_line("Preferred / native vector sizes").ends_with("  :"));

        let line = vector_line("char", 16, 4);
        assert_eq!(line.find(':'), Some(SUB_LABEL_WIDTH + 4));
        assert!(line.ends_with(":       16 / 4       "));
    }

    #[test]
    fn test_lookup_guards_table_bounds() {
        assert_eq!(lookup(&labels::CACHE_TYPE, 2, "CL_DEVICE_GLOBAL_MEM_CACHE_TYPE").unwrap(), "Read/Write");
        let err = lookup(&labels::BOOL, 2, "CL_DEVICE_HOST_UNIFIED_MEMORY").unwrap_err();
        assert!(matches!(
            err,
            ClInfoError::Decode {
                value: 2,
                table: "bool",
                ..
            }
        ));
    }
}
