//! Interactive shell logic
//!
//! Turns human input (`CREATE "John Doe" john@test.com 555-1234 1990-05-15`)
//! into wire lines, catching argument-count mistakes locally, and renders
//! replies for display.

use crate::protocol::{
    parse_listing, parse_record, CommandType, RecordView, Reply, FIELD_SEPARATOR,
};

pub const HELP_TEXT: &str = r#"Available Commands:

CREATE <name> <email> <phone> <birthDate>
  Example: CREATE "John Doe" john@test.com 555-1234 1990-05-15

GET <id>
  Example: GET 1

UPDATE <id> <name> <email> <phone> <birthDate>
  Example: UPDATE 1 "John Smith" john.new@test.com 555-9999 1990-05-15

DELETE <id>
  Example: DELETE 1

LIST
  Display all patients

SEARCH <name>
  Example: SEARCH John

COUNT
  Get total patient count

HELP
  Show this help message

EXIT
  Close connection and exit

Quote values containing spaces; "" sends an empty value."#;

/// What the shell should do with one input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellAction {
    /// Send `line` to the server
    Send { command: CommandType, line: String },

    /// Print the help text (no wire traffic)
    Help,

    /// Send `EXIT` and quit
    Exit,

    /// Locally detected mistake, with a usage hint
    Usage(String),

    /// Unrecognized keyword
    Unknown(String),

    /// Blank input
    Empty,
}

/// Parse one line of user input
pub fn parse_input(input: &str) -> ShellAction {
    let input = input.trim();
    if input.is_empty() {
        return ShellAction::Empty;
    }

    let (keyword, rest) = match input.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword.to_uppercase(), rest.trim()),
        None => (input.to_uppercase(), ""),
    };

    match keyword.as_str() {
        "HELP" => return ShellAction::Help,
        "EXIT" => return ShellAction::Exit,
        _ => {}
    }

    let command = match CommandType::from_keyword(&keyword) {
        Some(CommandType::Exit) | None => return ShellAction::Unknown(keyword),
        Some(command) => command,
    };

    let args = split_args(rest);
    if args.iter().any(|a| a.contains(FIELD_SEPARATOR)) {
        return ShellAction::Usage(format!(
            "Arguments must not contain '{}'",
            FIELD_SEPARATOR
        ));
    }

    let args = match command {
        // The whole remainder is the name fragment
        CommandType::Search if !args.is_empty() => vec![args.join(" ")],
        _ => args,
    };

    if args.len() != command.parameters().len() {
        return ShellAction::Usage(usage(command));
    }

    let mut line = command.keyword().to_string();
    for arg in &args {
        line.push(FIELD_SEPARATOR);
        line.push_str(arg);
    }
    ShellAction::Send { command, line }
}

/// Split on spaces, grouping double-quoted text; quotes are stripped
///
/// `""` yields an empty argument.
pub fn split_args(input: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quoted = false;

    for c in input.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                quoted = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() || quoted {
                    args.push(std::mem::take(&mut current));
                }
                quoted = false;
            }
            c => current.push(c),
        }
    }

    if !current.is_empty() || quoted {
        args.push(current);
    }
    args
}

fn usage(command: CommandType) -> String {
    let mut hint = format!("Usage: {}", command.keyword());
    for param in command.parameters() {
        hint.push(' ');
        hint.push_str(param);
    }
    hint
}

/// Render a reply to `command` for display
pub fn render_reply(command: CommandType, reply: &Reply) -> String {
    let fields = match reply {
        Reply::Error(message) => return format!("✗ Error: {}", message),
        Reply::Success(fields) => fields,
    };

    let rendered = match command {
        CommandType::Create => match fields.as_slice() {
            [id, name, email] => Ok(format!(
                "✓ Patient created:\n  ID: {}\n  Name: {}\n  Email: {}",
                id, name, email
            )),
            _ => Err(fields.join("|")),
        },
        CommandType::Get | CommandType::Update => match fields.as_slice() {
            [record] => parse_record(record)
                .map(|r| format!("✓ Patient:\n{}", render_record(&r)))
                .map_err(|e| e.to_string()),
            _ => Err(fields.join("|")),
        },
        CommandType::List | CommandType::Search => match parse_listing(fields) {
            Ok(records) if records.is_empty() => Ok("✓ No results".to_string()),
            Ok(records) => {
                let mut out = format!("✓ Found {} patient(s):\n", records.len());
                for (i, record) in records.iter().enumerate() {
                    out.push_str(&format!("\n  Patient #{}:\n{}\n", i + 1, render_record(record)));
                }
                Ok(out)
            }
            Err(e) => Err(e.to_string()),
        },
        CommandType::Count => match fields.as_slice() {
            [count] => Ok(format!("✓ Count: {}", count)),
            _ => Err(fields.join("|")),
        },
        CommandType::Delete | CommandType::Exit => Ok(format!("✓ {}", fields.join(" "))),
    };

    rendered.unwrap_or_else(|raw| format!("✗ Malformed reply: {}", raw))
}

fn render_record(record: &RecordView) -> String {
    format!(
        "    ID: {}\n    Name: {}\n    Email: {}\n    Phone: {}\n    Birth Date: {}\n    Age: {}",
        record.id,
        record.name,
        record.email,
        record.phone.as_deref().unwrap_or("-"),
        record.birth_date,
        record.age
    )
}
