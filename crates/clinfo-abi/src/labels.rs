//! Code-to-label tables.
//!
//! Each table maps a small integer reported by the driver to the text the
//! report prints. Lookups are bounds-checked: a code past the end of a table
//! yields `None` and the caller decides how to fail.

/// A named, fixed mapping from `0..len` to display labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelTable {
    /// Table name used in decode diagnostics.
    pub name: &'static str,
    /// Labels indexed by code.
    pub labels: &'static [&'static str],
}

impl LabelTable {
    /// Label for `code`, or `None` when the code is outside the table.
    #[must_use]
    pub fn get(&self, code: u64) -> Option<&'static str> {
        usize::try_from(code)
            .ok()
            .and_then(|index| self.labels.get(index))
            .copied()
    }

    /// Number of codes the table covers.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the table has no labels.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// `cl_bool`: `CL_FALSE`, `CL_TRUE`.
pub const BOOL: LabelTable = LabelTable {
    name: "bool",
    labels: &["No", "Yes"],
};

/// `CL_DEVICE_ENDIAN_LITTLE`, indexed by the boolean.
pub const ENDIANNESS: LabelTable = LabelTable {
    name: "endianness",
    labels: &["Big-Endian", "Little-Endian"],
};

/// Device type, indexed by [`lowest_set_bit`] of the `cl_device_type` mask.
pub const DEVICE_TYPE: LabelTable = LabelTable {
    name: "device type",
    labels: &["Unknown", "Default", "CPU", "GPU", "Accelerator", "Custom"],
};

/// `cl_device_local_mem_type`.
pub const LOCAL_MEM_TYPE: LabelTable = LabelTable {
    name: "local memory type",
    labels: &["None", "Local", "Global"],
};

/// `cl_device_mem_cache_type`.
pub const CACHE_TYPE: LabelTable = LabelTable {
    name: "cache type",
    labels: &["None", "Read-Only", "Read/Write"],
};

/// 1-based position of the lowest set bit, `0` for an empty mask (C `ffs`).
///
/// A device type mask with several bits set only reports its lowest one.
#[must_use]
pub const fn lowest_set_bit(mask: u64) -> u32 {
    if mask == 0 {
        0
    } else {
        mask.trailing_zeros() + 1
    }
}
