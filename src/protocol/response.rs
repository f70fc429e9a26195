//! Response definitions
//!
//! `Response` is what the server encodes; `Reply` and `RecordView` are what a
//! client decodes.

use chrono::NaiveDate;

use crate::error::PatientDbError;
use crate::model::Patient;

/// Message sent in place of any fault a client should not see
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Message sent for every `NotFound`
pub const NOT_FOUND_MESSAGE: &str = "Patient not found";

/// A response to send to a client
#[derive(Debug, Clone)]
pub enum Response {
    /// `SUCCESS|id|name|email`
    Created(Patient),

    /// `SUCCESS|<formatted record>`
    Record(Patient),

    /// `SUCCESS|Patient deleted`
    Deleted,

    /// `SUCCESS|count|<record>|<record>...` or `SUCCESS|0|<empty_message>`
    Listing {
        patients: Vec<Patient>,
        empty_message: &'static str,
    },

    /// `SUCCESS|count`
    Count(u64),

    /// `ERROR|message`
    Error(String),
}

impl Response {
    /// Build the error reply for `err`.
    ///
    /// Not-found errors share one message, client-facing errors keep theirs,
    /// and anything else becomes a generic internal error. The message is
    /// sanitized so it cannot break framing.
    pub fn error(err: &PatientDbError) -> Self {
        let message = match err {
            PatientDbError::NotFound(_) => NOT_FOUND_MESSAGE.to_string(),
            e if e.is_client_facing() => e.to_string(),
            _ => INTERNAL_ERROR_MESSAGE.to_string(),
        };
        Response::Error(sanitize(&message))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error(_))
    }
}

/// Replace every character that would break a reply line (`|`, CR, LF)
pub fn sanitize(message: &str) -> String {
    message
        .chars()
        .map(|c| match c {
            '|' | '\r' | '\n' => ' ',
            c => c,
        })
        .collect()
}

/// A decoded reply line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Fields after `SUCCESS|`
    Success(Vec<String>),

    /// Message after `ERROR|`
    Error(String),
}

impl Reply {
    pub fn is_success(&self) -> bool {
        matches!(self, Reply::Success(_))
    }
}

/// A formatted record as seen by a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordView {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub birth_date: NaiveDate,
    pub age: u32,
}
