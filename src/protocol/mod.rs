//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format (single version, plain text)
//!
//! One UTF-8 line per message, `\n` terminated (a trailing `\r` is
//! tolerated). Fields are separated by `|`; there is no escaping, so field
//! values containing `|` are outside the grammar.
//!
//! ### Commands
//! ```text
//! CREATE|name|email|phone|yyyy-MM-dd
//! GET|id
//! UPDATE|id|name|email|phone|yyyy-MM-dd
//! DELETE|id
//! LIST
//! SEARCH|fragment
//! COUNT
//! EXIT
//! ```
//! Keywords are case-insensitive; field values are case-sensitive.
//!
//! ### Replies
//! ```text
//! SUCCESS|id|name|email            (CREATE)
//! SUCCESS|<record>                 (GET, UPDATE)
//! SUCCESS|Patient deleted          (DELETE)
//! SUCCESS|n|<record>|...           (LIST, SEARCH; `SUCCESS|0|No patients` when empty)
//! SUCCESS|n                        (COUNT)
//! ERROR|message
//! ```
//! `EXIT` gets no reply; the server closes the connection.

mod command;
mod response;
mod codec;

pub use command::{Command, CommandType};
pub use response::{
    sanitize, RecordView, Reply, Response, INTERNAL_ERROR_MESSAGE, NOT_FOUND_MESSAGE,
};
pub use codec::{
    decode_command, decode_reply, encode_response, encode_response_on, format_record,
    parse_listing, parse_record, EMPTY_LIST_MESSAGE, EMPTY_SEARCH_MESSAGE, FIELD_SEPARATOR,
    RECORD_SEPARATOR,
};
