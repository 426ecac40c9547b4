//! Error types for platform and device reporting

use clinfo_abi::Status;
use std::fmt;
use thiserror::Error;

/// Result type alias for report operations
pub type Result<T> = std::result::Result<T, ClInfoError>;

/// Which kind of entity a failed call was made against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// The driver itself (platform enumeration)
    Driver,
    /// A platform handle
    Platform,
    /// A device handle
    Device,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Driver => write!(f, "driver"),
            Self::Platform => write!(f, "platform"),
            Self::Device => write!(f, "device"),
        }
    }
}

/// Step of a driver call that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStage {
    /// Counting platforms or devices
    Count,
    /// Fetching platform or device handles
    Handles,
    /// Querying the byte length of a variable-length attribute
    SizeQuery,
    /// Fetching an attribute value
    ValueFetch,
}

impl fmt::Display for QueryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count => write!(f, "count"),
            Self::Handles => write!(f, "list"),
            Self::SizeQuery => write!(f, "get size of"),
            Self::ValueFetch => write!(f, "get"),
        }
    }
}

/// Errors that abort a report run
#[derive(Debug, Error)]
pub enum ClInfoError {
    /// No OpenCL ICD loader could be opened
    #[error("OpenCL library not found (tried: {tried})")]
    LibraryNotFound {
        /// Candidate paths, comma separated
        tried: String,
    },

    /// The ICD loader lacks a required entry point
    #[error("OpenCL library {library} has no symbol {symbol}")]
    MissingSymbol {
        /// Library that was opened
        library: String,
        /// Entry point that could not be resolved
        symbol: String,
    },

    /// A driver call returned a non-success status
    #[error("{stage} {operation} ({entity}): error {status}")]
    QueryFailed {
        /// Attribute or enumeration that was requested
        operation: &'static str,
        /// Entity kind the call was made against
        entity: EntityKind,
        /// Step that failed
        stage: QueryStage,
        /// Status returned by the driver
        status: Status,
    },

    /// Storage for query results could not be reserved
    #[error("cannot allocate {size} bytes for {purpose}")]
    AllocationFailed {
        /// What the storage was for
        purpose: &'static str,
        /// Requested size in bytes
        size: usize,
    },

    /// A code reported by the driver has no label
    #[error("DecodeError: attribute value out of range for label table ({attribute} = {value}, {table} table)")]
    Decode {
        /// Attribute whose value was decoded
        attribute: &'static str,
        /// Offending value
        value: u64,
        /// Label table name
        table: &'static str,
    },

    /// Writing the report failed
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error
        #[from]
        source: std::io::Error,
    },
}

impl ClInfoError {
    /// Create a query failed error
    pub const fn query_failed(
        operation: &'static str,
        entity: EntityKind,
        stage: QueryStage,
        status: Status,
    ) -> Self {
        Self::QueryFailed {
            operation,
            entity,
            stage,
            status,
        }
    }

    /// Create an allocation failed error
    pub const fn allocation_failed(purpose: &'static str, size: usize) -> Self {
        Self::AllocationFailed { purpose, size }
    }

    /// Create a decode error
    pub const fn decode(attribute: &'static str, value: u64, table: &'static str) -> Self {
        Self::Decode {
            attribute,
            value,
            table,
        }
    }

    /// Driver status behind this error, if it came from a driver call
    pub const fn status(&self) -> Option<Status> {
        match self {
            Self::QueryFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinfo_abi::status;

    #[test]
    fn test_query_failed_names_attribute_entity_and_status() {
        let err = ClInfoError::query_failed(
            "CL_DEVICE_NAME",
            EntityKind::Device,
            QueryStage::SizeQuery,
            Status(status::INVALID_VALUE),
        );
        assert_eq!(
            err.to_string(),
            "get size of CL_DEVICE_NAME (device): error -30 (CL_INVALID_VALUE)"
        );
        assert_eq!(err.status(), Some(Status(status::INVALID_VALUE)));
    }

    #[test]
    fn test_decode_error_message() {
        let err = ClInfoError::decode("CL_DEVICE_HOST_UNIFIED_MEMORY", 2, "bool");
        assert!(err
            .to_string()
            .starts_with("DecodeError: attribute value out of range for label table"));
        assert_eq!(err.status(), None);
    }
}
