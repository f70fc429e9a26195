//! Command definitions
//!
//! Represents commands from clients.

use crate::model::PatientFields;

/// Command keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandType {
    Create,
    Get,
    Update,
    Delete,
    List,
    Search,
    Count,
    Exit,
}

impl CommandType {
    /// Every keyword of the protocol
    pub const ALL: [CommandType; 8] = [
        CommandType::Create,
        CommandType::Get,
        CommandType::Update,
        CommandType::Delete,
        CommandType::List,
        CommandType::Search,
        CommandType::Count,
        CommandType::Exit,
    ];

    /// Upper-case wire keyword
    pub fn keyword(self) -> &'static str {
        match self {
            CommandType::Create => "CREATE",
            CommandType::Get => "GET",
            CommandType::Update => "UPDATE",
            CommandType::Delete => "DELETE",
            CommandType::List => "LIST",
            CommandType::Search => "SEARCH",
            CommandType::Count => "COUNT",
            CommandType::Exit => "EXIT",
        }
    }

    /// Case-insensitive keyword lookup
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.keyword().eq_ignore_ascii_case(keyword))
    }

    /// Names of the fields following the keyword
    pub fn parameters(self) -> &'static [&'static str] {
        match self {
            CommandType::Create => &["name", "email", "phone", "birthDate"],
            CommandType::Get | CommandType::Delete => &["id"],
            CommandType::Update => &["id", "name", "email", "phone", "birthDate"],
            CommandType::Search => &["name"],
            CommandType::List | CommandType::Count | CommandType::Exit => &[],
        }
    }

    /// Whether the field count must match `parameters()` exactly.
    ///
    /// Parameterless commands ignore trailing fields.
    pub fn strict_arity(self) -> bool {
        !self.parameters().is_empty()
    }

    /// Error message for a wrong field count,
    /// e.g. `GET requires 1 parameter: id`
    pub fn arity_message(self) -> String {
        let params = self.parameters();
        format!(
            "{} requires {} parameter{}: {}",
            self.keyword(),
            params.len(),
            if params.len() == 1 { "" } else { "s" },
            params.join("|")
        )
    }
}

/// A decoded command with typed arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create a record
    Create(PatientFields),

    /// Fetch one record by id
    Get { id: u64 },

    /// Replace the mutable fields of a record
    Update { id: u64, fields: PatientFields },

    /// Delete a record by id
    Delete { id: u64 },

    /// List every record
    List,

    /// Case-insensitive name search
    Search { fragment: String },

    /// Number of stored records
    Count,

    /// Close the connection
    Exit,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Create(_) => CommandType::Create,
            Command::Get { .. } => CommandType::Get,
            Command::Update { .. } => CommandType::Update,
            Command::Delete { .. } => CommandType::Delete,
            Command::List => CommandType::List,
            Command::Search { .. } => CommandType::Search,
            Command::Count => CommandType::Count,
            Command::Exit => CommandType::Exit,
        }
    }
}
