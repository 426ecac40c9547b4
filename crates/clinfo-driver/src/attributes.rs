//! Report rows
//!
//! The platform and device reports are tables of [`Attribute`] rows. Each
//! row names the attribute key(s) it reads and how the value is decoded and
//! laid out; the reporters walk the tables in order.
//!
//! ```text
//! Row::Text        string            "Acme GPU"
//! Row::Uint        cl_uint + suffix  "1500MHz", "64 bytes"
//! Row::Bytes       cl_ulong          "2147483648 (2GB)"
//! Row::Label       code -> table     "Read/Write"
//! Row::Gated       code -> table, then nested rows unless CL_NONE
//! ```

use crate::driver::InfoTarget;
use crate::error::Result;
use crate::format::{self, attribute_line, indexed_line, section_line, vector_line};
use crate::query::InfoQuery;
use clinfo_abi::info::{device as d, platform as p, CL_NONE};
use clinfo_abi::labels::{self, LabelTable};
use clinfo_abi::InfoParam;
use std::io::Write;

/// A labelled report row
#[derive(Debug, Clone, Copy)]
pub struct Attribute {
    /// Text left of the colon
    pub label: &'static str,
    /// Keys and decoding
    pub row: Row,
}

/// How an attribute is queried and printed
#[derive(Debug, Clone, Copy)]
pub enum Row {
    /// Variable-length string
    Text(InfoParam),
    /// `cl_uint`, printed with a unit suffix
    Uint(InfoParam, &'static str),
    /// `size_t`
    Size(InfoParam),
    /// `cl_ulong` byte count
    Bytes(InfoParam),
    /// `size_t` byte count
    SizeBytes(InfoParam),
    /// `cl_uint` code decoded through a label table
    Label(InfoParam, LabelTable),
    /// `cl_device_type` mask, see [`DeviceKind`]
    DeviceType(InfoParam),
    /// Dimension count, then one indexed line per dimension
    WorkItems {
        /// `cl_uint` dimension count
        dims: InfoParam,
        /// `size_t[dims]`
        sizes: InfoParam,
        /// Label of the indexed lines
        item_label: &'static str,
    },
    /// Address width and byte order on one line
    AddressBits {
        /// `cl_uint` width in bits
        bits: InfoParam,
        /// `cl_bool` little-endian flag
        endian: InfoParam,
    },
    /// `cl_uint` alignment in bits, with its byte equivalent
    Alignment(InfoParam),
    /// Kind code; `then` is queried and printed only when it is not `CL_NONE`
    Gated {
        /// `cl_uint` kind code
        kind: InfoParam,
        /// Labels of the kind codes
        table: LabelTable,
        /// Rows that depend on the kind
        then: &'static [Attribute],
    },
    /// Header line, then one preferred / native row per type
    VectorWidths(&'static [VectorWidth]),
}

/// Preferred and native vector width keys of one scalar type
#[derive(Debug, Clone, Copy)]
pub struct VectorWidth {
    /// OpenCL C type name
    pub type_name: &'static str,
    /// `CL_DEVICE_PREFERRED_VECTOR_WIDTH_*`
    pub preferred: InfoParam,
    /// `CL_DEVICE_NATIVE_VECTOR_WIDTH_*`
    pub native: InfoParam,
}

/// Device type as reported
///
/// Only the lowest set bit of the mask is labelled, so a device that is
/// both CPU and GPU shows as "CPU". The full mask is kept in `mask`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceKind {
    /// Raw `cl_device_type` bits
    pub mask: u64,
    /// Label of the lowest set bit
    pub label: &'static str,
}

impl DeviceKind {
    /// Decode a `cl_device_type` mask
    ///
    /// # Errors
    ///
    /// Returns `Decode` if the lowest set bit has no label.
    pub fn from_mask(mask: u64) -> Result<Self> {
        let index = u64::from(labels::lowest_set_bit(mask));
        let label = format::lookup(&labels::DEVICE_TYPE, index, d::TYPE.name)?;
        if mask.count_ones() > 1 {
            tracing::debug!("Device type mask {mask:#x} has several kinds, reporting {label}");
        }
        Ok(Self { mask, label })
    }
}

const fn row(label: &'static str, row: Row) -> Attribute {
    Attribute { label, row }
}

/// Platform report rows
pub static PLATFORM_ATTRIBUTES: &[Attribute] = &[
    row("Platform Name", Row::Text(p::NAME)),
    row("Platform Vendor", Row::Text(p::VENDOR)),
    row("Platform Version", Row::Text(p::VERSION)),
    row("Platform Profile", Row::Text(p::PROFILE)),
    row("Platform Extensions", Row::Text(p::EXTENSIONS)),
];

const VECTOR_WIDTHS: &[VectorWidth] = &[
    VectorWidth {
        type_name: "char",
        preferred: d::PREFERRED_VECTOR_WIDTH_CHAR,
        native: d::NATIVE_VECTOR_WIDTH_CHAR,
    },
    VectorWidth {
        type_name: "short",
        preferred: d::PREFERRED_VECTOR_WIDTH_SHORT,
        native: d::NATIVE_VECTOR_WIDTH_SHORT,
    },
    VectorWidth {
        type_name: "int",
        preferred: d::PREFERRED_VECTOR_WIDTH_INT,
        native: d::NATIVE_VECTOR_WIDTH_INT,
    },
    VectorWidth {
        type_name: "long",
        preferred: d::PREFERRED_VECTOR_WIDTH_LONG,
        native: d::NATIVE_VECTOR_WIDTH_LONG,
    },
    VectorWidth {
        type_name: "half",
        preferred: d::PREFERRED_VECTOR_WIDTH_HALF,
        native: d::NATIVE_VECTOR_WIDTH_HALF,
    },
    VectorWidth {
        type_name: "float",
        preferred: d::PREFERRED_VECTOR_WIDTH_FLOAT,
        native: d::NATIVE_VECTOR_WIDTH_FLOAT,
    },
    VectorWidth {
        type_name: "double",
        preferred: d::PREFERRED_VECTOR_WIDTH_DOUBLE,
        native: d::NATIVE_VECTOR_WIDTH_DOUBLE,
    },
];

const CACHE_ROWS: &[Attribute] = &[
    row("Global Memory cache size", Row::Bytes(d::GLOBAL_MEM_CACHE_SIZE)),
    row(
        "Global Memory cache line",
        Row::Uint(d::GLOBAL_MEM_CACHELINE_SIZE, " bytes"),
    ),
];

const LOCAL_MEMORY_ROWS: &[Attribute] = &[row("Local Memory size", Row::Bytes(d::LOCAL_MEM_SIZE))];

/// Device report rows
pub static DEVICE_ATTRIBUTES: &[Attribute] = &[
    row("Device Name", Row::Text(d::NAME)),
    row("Device Vendor", Row::Text(d::VENDOR)),
    row("Device Version", Row::Text(d::VERSION)),
    row("Driver Version", Row::Text(d::DRIVER_VERSION)),
    row("Device Type", Row::DeviceType(d::TYPE)),
    row("Max compute units", Row::Uint(d::MAX_COMPUTE_UNITS, "")),
    row("Max clock frequency", Row::Uint(d::MAX_CLOCK_FREQUENCY, "MHz")),
    row(
        "Max work item dimensions",
        Row::WorkItems {
            dims: d::MAX_WORK_ITEM_DIMENSIONS,
            sizes: d::MAX_WORK_ITEM_SIZES,
            item_label: "Max work item size",
        },
    ),
    row("Max work group size", Row::Size(d::MAX_WORK_GROUP_SIZE)),
    row("Preferred / native vector sizes", Row::VectorWidths(VECTOR_WIDTHS)),
    row(
        "Address bits",
        Row::AddressBits {
            bits: d::ADDRESS_BITS,
            endian: d::ENDIAN_LITTLE,
        },
    ),
    row("Global memory size", Row::Bytes(d::GLOBAL_MEM_SIZE)),
    row("Max memory allocation", Row::Bytes(d::MAX_MEM_ALLOC_SIZE)),
    row(
        "Unified memory for Host and Device",
        Row::Label(d::HOST_UNIFIED_MEMORY, labels::BOOL),
    ),
    row(
        "Global Memory cache type",
        Row::Gated {
            kind: d::GLOBAL_MEM_CACHE_TYPE,
            table: labels::CACHE_TYPE,
            then: CACHE_ROWS,
        },
    ),
    row(
        "Minimum alignment for any data type",
        Row::Uint(d::MIN_DATA_TYPE_ALIGN_SIZE, " bytes"),
    ),
    row("Alignment of base address", Row::Alignment(d::MEM_BASE_ADDR_ALIGN)),
    row(
        "Local Memory type",
        Row::Gated {
            kind: d::LOCAL_MEM_TYPE,
            table: labels::LOCAL_MEM_TYPE,
            then: LOCAL_MEMORY_ROWS,
        },
    ),
    row("Max constant buffer size", Row::Bytes(d::MAX_CONSTANT_BUFFER_SIZE)),
    row("Max number of constant args", Row::Uint(d::MAX_CONSTANT_ARGS, "")),
    row("Max size of kernel argument", Row::SizeBytes(d::MAX_PARAMETER_SIZE)),
];

/// Query and print every row of `attributes` in order
///
/// # Errors
///
/// Stops at the first failed query, decode or write.
pub fn render_all<W: Write>(
    query: &mut InfoQuery<'_>,
    target: InfoTarget,
    attributes: &[Attribute],
    out: &mut W,
) -> Result<()> {
    for attribute in attributes {
        render(query, target, attribute, out)?;
    }
    Ok(())
}

/// Query and print one row
///
/// Returns the value of `Text` rows so callers can keep it.
///
/// # Errors
///
/// Returns the first failed query, decode or write.
pub fn render<W: Write>(
    query: &mut InfoQuery<'_>,
    target: InfoTarget,
    attribute: &Attribute,
    out: &mut W,
) -> Result<Option<String>> {
    let label = attribute.label;

    match attribute.row {
        Row::Text(param) => {
            let text = query.string(target, param)?;
            writeln!(out, "{}", attribute_line(label, &text))?;
            return Ok(Some(text));
        }
        Row::Uint(param, suffix) => {
            let value: u32 = query.scalar(target, param)?;
            writeln!(out, "{}", attribute_line(label, format_args!("{value}{suffix}")))?;
        }
        Row::Size(param) => {
            let value: usize = query.scalar(target, param)?;
            writeln!(out, "{}", attribute_line(label, value))?;
        }
        Row::Bytes(param) => {
            let value: u64 = query.scalar(target, param)?;
            writeln!(out, "{}", attribute_line(label, format::format_bytes(value)))?;
        }
        Row::SizeBytes(param) => {
            let value: usize = query.scalar(target, param)?;
            let value = u64::try_from(value).unwrap_or(u64::MAX);
            writeln!(out, "{}", attribute_line(label, format::format_bytes(value)))?;
        }
        Row::Label(param, table) => {
            let code: u32 = query.scalar(target, param)?;
            let text = format::lookup(&table, u64::from(code), param.name)?;
            writeln!(out, "{}", attribute_line(label, text))?;
        }
        Row::DeviceType(param) => {
            let mask: u64 = query.scalar(target, param)?;
            let kind = DeviceKind::from_mask(mask)?;
            writeln!(out, "{}", attribute_line(label, kind.label))?;
        }
        Row::WorkItems {
            dims,
            sizes,
            item_label,
        } => {
            let count: u32 = query.scalar(target, dims)?;
            writeln!(out, "{}", attribute_line(label, count))?;
            let sizes = query.array::<usize>(target, sizes, count as usize)?;
            for (index, size) in sizes.iter().enumerate() {
                writeln!(out, "{}", indexed_line(item_label, index, size))?;
            }
        }
        Row::AddressBits { bits, endian } => {
            let width: u32 = query.scalar(target, bits)?;
            let little: u32 = query.scalar(target, endian)?;
            let order = format::lookup(&labels::ENDIANNESS, u64::from(little), endian.name)?;
            writeln!(out, "{}", attribute_line(label, format_args!("{width}, {order}")))?;
        }
        Row::Alignment(param) => {
            let bits: u32 = query.scalar(target, param)?;
            let bytes = bits / 8;
            writeln!(
                out,
                "{}",
                attribute_line(label, format_args!("{bits} bits ({bytes} bytes)"))
            )?;
        }
        Row::Gated { kind, table, then } => {
            let code: u32 = query.scalar(target, kind)?;
            let text = format::lookup(&table, u64::from(code), kind.name)?;
            writeln!(out, "{}", attribute_line(label, text))?;
            if code == CL_NONE {
                tracing::debug!("{} is {text}, skipping {} dependent rows", kind, then.len());
            } else {
                render_all(query, target, then, out)?;
            }
        }
        Row::VectorWidths(widths) => {
            writeln!(out, "{}", section_line(label))?;
            for width in widths {
                let preferred: u32 = query.scalar(target, width.preferred)?;
                let native: u32 = query.scalar(target, width.native)?;
                writeln!(out, "{}", vector_line(width.type_name, preferred, native))?;
            }
        }
    }

    Ok(None)
}
