//! Response envelopes and the normaliser that unwraps them.
//!
//! A completed call delivers one of three shapes:
//!
//! - a bare value (legacy services returning their payload directly),
//! - a [`SingleResult`] envelope (`success`, `code`, `description`, `data`),
//! - a paged envelope (the same flags plus page contents and metadata).
//!
//! [`normalize`] turns any of them into either a payload or a [`FailureInfo`].
//! Paged results are returned whole and untouched on success because page
//! metadata (total count, page index, whatever else the service adds) is part
//! of the caller's contract. Callers usually decode that payload as a
//! [`PagedResult`].

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{DomainError, FailureInfo};

/// Key whose presence marks an envelope as paged.
pub const PAGED_MARKER_KEY: &str = "totalCount";

/// Key whose boolean value marks an object as an envelope.
pub const SUCCESS_KEY: &str = "success";

const CODE_KEY: &str = "code";
const DESCRIPTION_KEY: &str = "description";
const DATA_KEY: &str = "data";

// ---------------------------------------------------------------------------
// Envelope types
// ---------------------------------------------------------------------------

/// Envelope carrying one payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleResult<T = Value> {
    pub success: bool,
    #[serde(default, deserialize_with = "lenient_text")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
}

impl<T> SingleResult<T> {
    /// A successful envelope around `data`.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            code: None,
            description: None,
            data: Some(data),
        }
    }

    /// A failed envelope.
    pub fn failed(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(code.into()),
            description: Some(description.into()),
            data: None,
        }
    }

    fn failure(&self) -> FailureInfo {
        FailureInfo::new(self.code.clone(), self.description.clone())
    }
}

/// Typed view of one page of results, for callers decoding a paged payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T = Value> {
    pub success: bool,
    #[serde(default, deserialize_with = "lenient_text")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
    /// Page contents. An absent or `null` list is an empty page.
    #[serde(
        default = "Vec::new",
        deserialize_with = "null_as_empty",
        bound(deserialize = "T: Deserialize<'de>")
    )]
    pub data: Vec<T>,
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub page_no: u32,
    #[serde(default)]
    pub page_size: u32,
}

/// A paged envelope exactly as the transport delivered it.
///
/// Only the status flags are read; the object itself is kept so a successful
/// page reaches the caller with every key the service sent.
#[derive(Debug, Clone, PartialEq)]
pub struct PagedEnvelope {
    /// Value of the envelope's `success` flag.
    pub success: bool,
    /// `code`, read as text.
    pub code: Option<String>,
    /// `description`, read as text.
    pub description: Option<String>,
    /// The whole envelope object.
    pub page: Value,
}

impl PagedEnvelope {
    fn failure(&self) -> FailureInfo {
        FailureInfo::new(self.code.clone(), self.description.clone())
    }
}

/// Envelope codes arrive as strings from most services and as numbers from a
/// few. Descriptions are just as loose. Anything that is not `null` is kept as
/// text.
fn text_of(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(text_of(Option::<Value>::deserialize(deserializer)?.as_ref()))
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Completion outcome
// ---------------------------------------------------------------------------

/// The raw value a transport delivers on its success entry point.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionOutcome {
    Value(Value),
    Single(SingleResult),
    Paged(PagedEnvelope),
}

impl CompletionOutcome {
    /// Detects the shape of a decoded response.
    ///
    /// Shapes are tried in a fixed order: paged, then single, then bare. An
    /// object is an envelope when it has a boolean `success`; it is paged when it
    /// also has `totalCount`, whatever its `data` holds. Once `success` is a
    /// boolean the object is an envelope for good: `code` and `description` are
    /// read as text whatever their JSON type, so a failure can never turn into
    /// a bare success.
    pub fn from_value(value: Value) -> Self {
        let Some(success) = value.get(SUCCESS_KEY).and_then(Value::as_bool) else {
            return Self::Value(value);
        };
        let code = text_of(value.get(CODE_KEY));
        let description = text_of(value.get(DESCRIPTION_KEY));

        if value.get(PAGED_MARKER_KEY).is_some() {
            return Self::Paged(PagedEnvelope {
                success,
                code,
                description,
                page: value,
            });
        }

        let data = match value {
            Value::Object(mut fields) => fields.remove(DATA_KEY).filter(|data| !data.is_null()),
            _ => None,
        };
        Self::Single(SingleResult {
            success,
            code,
            description,
            data,
        })
    }
}

impl From<Value> for CompletionOutcome {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

// ---------------------------------------------------------------------------
// Normalisation
// ---------------------------------------------------------------------------

/// Unwraps a completion outcome into its payload or its failure.
///
/// `Ok(None)` means the call succeeded without a payload (JSON `null`, or a
/// successful single-result envelope without `data`).
pub fn normalize(outcome: CompletionOutcome) -> Result<Option<Value>, FailureInfo> {
    match outcome {
        CompletionOutcome::Value(Value::Null) => Ok(None),
        CompletionOutcome::Value(value) => Ok(Some(value)),
        CompletionOutcome::Single(single) if !single.success => Err(single.failure()),
        CompletionOutcome::Single(single) => Ok(single.data.filter(|data| !data.is_null())),
        CompletionOutcome::Paged(page) if !page.success => Err(page.failure()),
        CompletionOutcome::Paged(page) => Ok(Some(page.page)),
    }
}

/// Passes a successful envelope through and turns a failed one into a
/// [`DomainError`].
pub fn ensure_success<T>(result: SingleResult<T>) -> Result<SingleResult<T>, DomainError> {
    if result.success {
        Ok(result)
    } else {
        Err(DomainError::from(result.failure()))
    }
}
