//! Process-wide error taxonomy.
//!
//! Every error the bridge produces on its own (as opposed to codes reported by a
//! remote envelope or legacy token) comes from this table. The classifier only
//! ever names an [`ErrorCategory`]; the code and description live here, so a new
//! category is one enum variant plus one table row.

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Symbolic fault category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    /// Remote call timed out; the service is treated as busy.
    BusyService,
    /// Remote endpoint could not be reached.
    NetworkConnectFailed,
    /// Request or response could not be (de)serialised.
    SerializationException,
    /// Remote side refused the call.
    ForbiddenException,
    /// Any other transport-level failure.
    RpcCallException,
    /// Unrecognised local or remote failure.
    SysError,
    /// Remote service reported an error without a usable code.
    RemoteService,
    /// HTTP request returned an error status.
    HttpRequestError,
}

/// One row of the [`TAXONOMY`] table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxonomyEntry {
    /// Category this row describes.
    pub category: ErrorCategory,
    /// Stable numeric code, as text, reported to callers.
    pub code: &'static str,
    /// Default description used when no more specific text is available.
    pub description: &'static str,
}

const SYS_ERROR: TaxonomyEntry = TaxonomyEntry {
    category: ErrorCategory::SysError,
    code: "1000",
    description: "system error, please try again later",
};

const BUSY_SERVICE: TaxonomyEntry = TaxonomyEntry {
    category: ErrorCategory::BusyService,
    code: "1001",
    description: "service is busy, please try again later",
};

const NETWORK_CONNECT_FAILED: TaxonomyEntry = TaxonomyEntry {
    category: ErrorCategory::NetworkConnectFailed,
    code: "1002",
    description: "network connection failed",
};

const SERIALIZATION_EXCEPTION: TaxonomyEntry = TaxonomyEntry {
    category: ErrorCategory::SerializationException,
    code: "1003",
    description: "data serialization failed",
};

const FORBIDDEN_EXCEPTION: TaxonomyEntry = TaxonomyEntry {
    category: ErrorCategory::ForbiddenException,
    code: "1004",
    description: "remote call forbidden",
};

const RPC_CALL_EXCEPTION: TaxonomyEntry = TaxonomyEntry {
    category: ErrorCategory::RpcCallException,
    code: "1005",
    description: "remote call failed",
};

const REMOTE_SERVICE: TaxonomyEntry = TaxonomyEntry {
    category: ErrorCategory::RemoteService,
    code: "1006",
    description: "remote service error",
};

const HTTP_REQUEST_ERROR: TaxonomyEntry = TaxonomyEntry {
    category: ErrorCategory::HttpRequestError,
    code: "1007",
    description: "http request failed",
};

/// The taxonomy table. Read-only for the lifetime of the process.
pub static TAXONOMY: &[TaxonomyEntry] = &[
    SYS_ERROR,
    BUSY_SERVICE,
    NETWORK_CONNECT_FAILED,
    SERIALIZATION_EXCEPTION,
    FORBIDDEN_EXCEPTION,
    RPC_CALL_EXCEPTION,
    REMOTE_SERVICE,
    HTTP_REQUEST_ERROR,
];

impl ErrorCategory {
    /// Returns the table row for this category.
    pub fn entry(self) -> &'static TaxonomyEntry {
        match self {
            Self::SysError => &SYS_ERROR,
            Self::BusyService => &BUSY_SERVICE,
            Self::NetworkConnectFailed => &NETWORK_CONNECT_FAILED,
            Self::SerializationException => &SERIALIZATION_EXCEPTION,
            Self::ForbiddenException => &FORBIDDEN_EXCEPTION,
            Self::RpcCallException => &RPC_CALL_EXCEPTION,
            Self::RemoteService => &REMOTE_SERVICE,
            Self::HttpRequestError => &HTTP_REQUEST_ERROR,
        }
    }

    /// Returns the stable code for this category.
    pub fn code(self) -> &'static str {
        self.entry().code
    }

    /// Returns the default human-readable description for this category.
    pub fn description(self) -> &'static str {
        self.entry().description
    }

    /// Builds a [`DomainError`] carrying this category's code and description.
    pub fn to_error(self) -> DomainError {
        let entry = self.entry();
        DomainError::new(entry.code, entry.description)
    }

    /// Builds a [`DomainError`] with this category's code but a caller-supplied
    /// description.
    pub fn with_description(self, description: impl Into<String>) -> DomainError {
        DomainError::new(self.code(), description)
    }
}
