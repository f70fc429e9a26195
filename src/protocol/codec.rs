//! Protocol codec
//!
//! Pure translation between wire lines and typed values. No I/O.
//!
//! ## Wire Format
//!
//! ### Request
//! ```text
//! KEYWORD|field1|field2|...\n
//! ```
//!
//! ### Response
//! ```text
//! SUCCESS|field1|field2|...\n
//! ERROR|message\n
//! ```
//!
//! ### Formatted Record
//! ```text
//! id:name:email:phone:yyyy-MM-dd:age
//! ```
//!
//! Lines passed in here carry no trailing `\n`; a trailing `\r` is trimmed.

use chrono::NaiveDate;

use super::{Command, CommandType, RecordView, Reply, Response};
use crate::error::{PatientDbError, Result};
use crate::model::{today, Patient, PatientFields, DATE_FORMAT};

/// Separates fields of a command or reply
pub const FIELD_SEPARATOR: char = '|';

/// Separates the parts of a formatted record
pub const RECORD_SEPARATOR: char = ':';

const SUCCESS_PREFIX: &str = "SUCCESS|";
const ERROR_PREFIX: &str = "ERROR|";

/// Shown after the zero count of an empty LIST
pub const EMPTY_LIST_MESSAGE: &str = "No patients";

/// Shown after the zero count of an empty SEARCH
pub const EMPTY_SEARCH_MESSAGE: &str = "No results";

// =============================================================================
// Command Decoding
// =============================================================================

/// Decode one command line
///
/// Shape problems (empty line, unknown keyword, wrong field count) are
/// `MalformedCommand`; unparsable ids and dates are `InvalidArgument`.
pub fn decode_command(line: &str) -> Result<Command> {
    let line = trim_line_end(line);
    if line.trim().is_empty() {
        return Err(PatientDbError::MalformedCommand(
            "Empty command".to_string(),
        ));
    }

    let parts: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    let keyword = parts[0].trim().to_uppercase();
    let command_type = CommandType::from_keyword(&keyword).ok_or_else(|| {
        PatientDbError::MalformedCommand(format!("Unknown command: {}", keyword))
    })?;

    let args = &parts[1..];
    if command_type.strict_arity() && args.len() != command_type.parameters().len() {
        return Err(PatientDbError::MalformedCommand(
            command_type.arity_message(),
        ));
    }

    match command_type {
        CommandType::Create => Ok(Command::Create(decode_fields(args)?)),
        CommandType::Get => Ok(Command::Get {
            id: parse_id(args[0])?,
        }),
        CommandType::Update => {
            let id = parse_id(args[0])?;
            let fields = decode_fields(&args[1..])?;
            Ok(Command::Update { id, fields })
        }
        CommandType::Delete => Ok(Command::Delete {
            id: parse_id(args[0])?,
        }),
        CommandType::List => Ok(Command::List),
        CommandType::Search => Ok(Command::Search {
            fragment: args[0].to_string(),
        }),
        CommandType::Count => Ok(Command::Count),
        CommandType::Exit => Ok(Command::Exit),
    }
}

/// Decode `name|email|phone|birthDate`
fn decode_fields(args: &[&str]) -> Result<PatientFields> {
    let phone = match args[2] {
        "" => None,
        phone => Some(phone.to_string()),
    };

    Ok(PatientFields {
        name: args[0].to_string(),
        email: args[1].to_string(),
        phone,
        birth_date: parse_date(args[3])?,
    })
}

/// Parse a signed 64-bit id
///
/// Negative ids are well-formed but match no record; they become 0, which is
/// never assigned, so the service answers `NotFound`.
fn parse_id(field: &str) -> Result<u64> {
    let id: i64 = field
        .trim()
        .parse()
        .map_err(|_| PatientDbError::InvalidArgument("Invalid ID format".to_string()))?;
    Ok(u64::try_from(id).unwrap_or(0))
}

/// Parse a strict `yyyy-MM-dd` date
///
/// chrono alone accepts unpadded fields and signed years, so the shape is
/// checked first.
fn parse_date(field: &str) -> Result<NaiveDate> {
    let field = field.trim();
    let invalid =
        || PatientDbError::InvalidArgument("Invalid date format. Use yyyy-MM-dd".to_string());

    if !is_date_shaped(field) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(field, DATE_FORMAT).map_err(|_| invalid())
}

fn is_date_shaped(field: &str) -> bool {
    field.len() == 10
        && field.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        })
}

// =============================================================================
// Response Encoding
// =============================================================================

/// Encode a response, computing ages against today
pub fn encode_response(response: &Response) -> String {
    encode_response_on(response, today())
}

/// Encode a response, computing ages against `today`
pub fn encode_response_on(response: &Response, today: NaiveDate) -> String {
    match response {
        Response::Created(patient) => format!(
            "{}{}{sep}{}{sep}{}",
            SUCCESS_PREFIX,
            format_id(patient),
            patient.name(),
            patient.email(),
            sep = FIELD_SEPARATOR
        ),
        Response::Record(patient) => {
            format!("{}{}", SUCCESS_PREFIX, format_record(patient, today))
        }
        Response::Deleted => format!("{}Patient deleted", SUCCESS_PREFIX),
        Response::Listing {
            patients,
            empty_message,
        } => {
            if patients.is_empty() {
                return format!("{}0{}{}", SUCCESS_PREFIX, FIELD_SEPARATOR, empty_message);
            }
            let mut line = format!("{}{}", SUCCESS_PREFIX, patients.len());
            for patient in patients {
                line.push(FIELD_SEPARATOR);
                line.push_str(&format_record(patient, today));
            }
            line
        }
        Response::Count(count) => format!("{}{}", SUCCESS_PREFIX, count),
        Response::Error(message) => format!("{}{}", ERROR_PREFIX, message),
    }
}

/// `id:name:email:phone:yyyy-MM-dd:age`, phone empty when absent
pub fn format_record(patient: &Patient, today: NaiveDate) -> String {
    format!(
        "{id}{sep}{name}{sep}{email}{sep}{phone}{sep}{birth}{sep}{age}",
        id = format_id(patient),
        name = patient.name(),
        email = patient.email(),
        phone = patient.phone().unwrap_or(""),
        birth = patient.birth_date().format(DATE_FORMAT),
        age = patient.age_on(today),
        sep = RECORD_SEPARATOR
    )
}

fn format_id(patient: &Patient) -> String {
    patient.id().map(|id| id.to_string()).unwrap_or_default()
}

// =============================================================================
// Reply Decoding (client side)
// =============================================================================

/// Decode one reply line into its status and fields
pub fn decode_reply(line: &str) -> Result<Reply> {
    let line = trim_line_end(line);

    if let Some(rest) = line.strip_prefix(SUCCESS_PREFIX) {
        return Ok(Reply::Success(
            rest.split(FIELD_SEPARATOR).map(str::to_string).collect(),
        ));
    }
    if let Some(message) = line.strip_prefix(ERROR_PREFIX) {
        return Ok(Reply::Error(message.to_string()));
    }

    Err(PatientDbError::Protocol(format!("Unexpected reply: {}", line)))
}

/// Parse a formatted record
pub fn parse_record(field: &str) -> Result<RecordView> {
    let parts: Vec<&str> = field.split(RECORD_SEPARATOR).collect();
    if parts.len() != 6 {
        return Err(PatientDbError::Protocol(format!(
            "Malformed record: {}",
            field
        )));
    }

    let malformed =
        |what: &str| PatientDbError::Protocol(format!("Malformed record {}: {}", what, field));

    Ok(RecordView {
        id: parts[0].parse().map_err(|_| malformed("id"))?,
        name: parts[1].to_string(),
        email: parts[2].to_string(),
        phone: match parts[3] {
            "" => None,
            phone => Some(phone.to_string()),
        },
        birth_date: Some(parts[4])
            .filter(|d| is_date_shaped(d))
            .and_then(|d| NaiveDate::parse_from_str(d, DATE_FORMAT).ok())
            .ok_or_else(|| malformed("birth date"))?,
        age: parts[5].parse().map_err(|_| malformed("age"))?,
    })
}

/// Parse the fields of a LIST or SEARCH success reply
///
/// `["0", "No patients"]` yields an empty list.
pub fn parse_listing(fields: &[String]) -> Result<Vec<RecordView>> {
    let (count, records) = fields
        .split_first()
        .ok_or_else(|| PatientDbError::Protocol("Empty listing".to_string()))?;

    let count: usize = count
        .parse()
        .map_err(|_| PatientDbError::Protocol(format!("Invalid listing count: {}", count)))?;
    if count == 0 {
        return Ok(Vec::new());
    }
    if records.len() != count {
        return Err(PatientDbError::Protocol(format!(
            "Listing announced {} records, got {}",
            count,
            records.len()
        )));
    }

    records.iter().map(|r| parse_record(r)).collect()
}

fn trim_line_end(line: &str) -> &str {
    line.trim_end_matches(['\r', '\n'])
}
