//! Codec Tests
//!
//! Tests for command decoding, response encoding and reply parsing.

use chrono::NaiveDate;
use patientdb::protocol::{
    decode_command, decode_reply, encode_response_on, format_record, parse_listing,
    parse_record, sanitize, Command, Reply, Response, EMPTY_LIST_MESSAGE,
    EMPTY_SEARCH_MESSAGE, INTERNAL_ERROR_MESSAGE,
};
use patientdb::{Patient, PatientDbError, PatientFields};

// =============================================================================
// Helper Functions
// =============================================================================

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn saved(id: u64, name: &str, email: &str, phone: Option<&str>, birth: NaiveDate) -> Patient {
    Patient::new(PatientFields {
        name: name.to_string(),
        email: email.to_string(),
        phone: phone.map(str::to_string),
        birth_date: birth,
    })
    .unwrap()
    .with_id(id)
}

fn malformed_message(line: &str) -> String {
    match decode_command(line) {
        Err(PatientDbError::MalformedCommand(msg)) => msg,
        other => panic!("Expected malformed command for {:?}, got {:?}", line, other),
    }
}

fn invalid_argument_message(line: &str) -> String {
    match decode_command(line) {
        Err(PatientDbError::InvalidArgument(msg)) => msg,
        other => panic!("Expected invalid argument for {:?}, got {:?}", line, other),
    }
}

// =============================================================================
// Command Decoding Tests
// =============================================================================

#[test]
fn test_decode_create() {
    let command = decode_command("CREATE|John Doe|john@test.com|555-1234|1990-05-15").unwrap();

    assert_eq!(
        command,
        Command::Create(PatientFields {
            name: "John Doe".to_string(),
            email: "john@test.com".to_string(),
            phone: Some("555-1234".to_string()),
            birth_date: date(1990, 5, 15),
        })
    );
}

#[test]
fn test_decode_create_empty_phone() {
    match decode_command("CREATE|John|john@test.com||1990-05-15").unwrap() {
        Command::Create(fields) => assert_eq!(fields.phone, None),
        other => panic!("Expected CREATE, got {:?}", other),
    }
}

#[test]
fn test_decode_keyword_is_case_insensitive() {
    assert_eq!(decode_command("get|3").unwrap(), Command::Get { id: 3 });
    assert_eq!(decode_command("Count").unwrap(), Command::Count);
    assert_eq!(decode_command("list").unwrap(), Command::List);
    assert_eq!(decode_command("exit").unwrap(), Command::Exit);
}

#[test]
fn test_decode_field_values_are_case_sensitive() {
    match decode_command("search|WoNdEr").unwrap() {
        Command::Search { fragment } => assert_eq!(fragment, "WoNdEr"),
        other => panic!("Expected SEARCH, got {:?}", other),
    }
}

#[test]
fn test_decode_trims_carriage_return() {
    assert_eq!(decode_command("GET|12\r").unwrap(), Command::Get { id: 12 });
    assert_eq!(decode_command("COUNT\r\n").unwrap(), Command::Count);
}

#[test]
fn test_decode_update() {
    let command = decode_command("UPDATE|4|Bob|bob@test.com|555-2222|1985-01-10").unwrap();
    match command {
        Command::Update { id, fields } => {
            assert_eq!(id, 4);
            assert_eq!(fields.name, "Bob");
            assert_eq!(fields.birth_date, date(1985, 1, 10));
        }
        other => panic!("Expected UPDATE, got {:?}", other),
    }
}

#[test]
fn test_decode_delete() {
    assert_eq!(decode_command("DELETE|9").unwrap(), Command::Delete { id: 9 });
}

#[test]
fn test_decode_parameterless_commands_ignore_extra_fields() {
    assert_eq!(decode_command("LIST|extra").unwrap(), Command::List);
    assert_eq!(decode_command("COUNT|").unwrap(), Command::Count);
}

#[test]
fn test_decode_empty_line() {
    assert_eq!(malformed_message(""), "Empty command");
    assert_eq!(malformed_message("   "), "Empty command");
    assert_eq!(malformed_message("\r"), "Empty command");
}

#[test]
fn test_decode_unknown_command() {
    assert_eq!(malformed_message("FOO"), "Unknown command: FOO");
    assert_eq!(malformed_message("foo|bar"), "Unknown command: FOO");
}

#[test]
fn test_decode_wrong_field_counts() {
    assert_eq!(
        malformed_message("CREATE|OnlyOneParam"),
        "CREATE requires 4 parameters: name|email|phone|birthDate"
    );
    assert_eq!(malformed_message("GET"), "GET requires 1 parameter: id");
    assert_eq!(malformed_message("GET|1|2"), "GET requires 1 parameter: id");
    assert_eq!(
        malformed_message("UPDATE|1|Bob"),
        "UPDATE requires 5 parameters: id|name|email|phone|birthDate"
    );
    assert_eq!(malformed_message("DELETE"), "DELETE requires 1 parameter: id");
    assert_eq!(malformed_message("SEARCH"), "SEARCH requires 1 parameter: name");
}

#[test]
fn test_decode_invalid_id() {
    assert_eq!(invalid_argument_message("GET|abc"), "Invalid ID format");
    assert_eq!(invalid_argument_message("DELETE|1.5"), "Invalid ID format");
    assert_eq!(
        invalid_argument_message("GET|9223372036854775808"),
        "Invalid ID format"
    );
    assert_eq!(
        invalid_argument_message("UPDATE|x|Bob|bob@test.com|555|1985-01-10"),
        "Invalid ID format"
    );
}

#[test]
fn test_decode_negative_id_matches_no_record() {
    assert_eq!(decode_command("GET|-1").unwrap(), Command::Get { id: 0 });
    assert_eq!(decode_command("DELETE| -7 ").unwrap(), Command::Delete { id: 0 });
}

#[test]
fn test_decode_rejects_non_padded_date() {
    for date in ["1990-5-15", "1990-05-5", "+1990-05-15", "90-05-15", "1990-05-15T00"] {
        assert_eq!(
            invalid_argument_message(&format!("CREATE|John|john@test.com|555|{}", date)),
            "Invalid date format. Use yyyy-MM-dd",
            "date {:?} should be rejected",
            date
        );
    }

    match decode_command("CREATE|John|john@test.com|555| 1990-05-15 ").unwrap() {
        Command::Create(fields) => assert_eq!(fields.birth_date, date(1990, 5, 15)),
        other => panic!("Expected CREATE, got {:?}", other),
    }
}

#[test]
fn test_decode_invalid_date() {
    assert_eq!(
        invalid_argument_message("CREATE|John|john@test.com|555|15/05/1990"),
        "Invalid date format. Use yyyy-MM-dd"
    );
    assert_eq!(
        invalid_argument_message("UPDATE|1|John|john@test.com|555|1990-13-01"),
        "Invalid date format. Use yyyy-MM-dd"
    );
}

// =============================================================================
// Response Encoding Tests
// =============================================================================

#[test]
fn test_encode_created() {
    let patient = saved(1, "John Doe", "john@test.com", Some("555-1234"), date(1990, 5, 15));
    let line = encode_response_on(&Response::Created(patient), date(2024, 1, 1));
    assert_eq!(line, "SUCCESS|1|John Doe|john@test.com");
}

#[test]
fn test_encode_record() {
    let patient = saved(2, "Jane", "jane@test.com", Some("555-5678"), date(1992, 3, 20));
    let line = encode_response_on(&Response::Record(patient), date(2024, 3, 19));
    assert_eq!(line, "SUCCESS|2:Jane:jane@test.com:555-5678:1992-03-20:31");
}

#[test]
fn test_encode_record_without_phone() {
    let patient = saved(3, "Jim", "jim@test.com", None, date(2000, 1, 1));
    assert_eq!(
        format_record(&patient, date(2024, 6, 1)),
        "3:Jim:jim@test.com::2000-01-01:24"
    );
}

#[test]
fn test_encode_deleted_and_count() {
    assert_eq!(
        encode_response_on(&Response::Deleted, date(2024, 1, 1)),
        "SUCCESS|Patient deleted"
    );
    assert_eq!(
        encode_response_on(&Response::Count(7), date(2024, 1, 1)),
        "SUCCESS|7"
    );
}

#[test]
fn test_encode_listing() {
    let today = date(2024, 1, 1);
    let patients = vec![
        saved(1, "Patient 1", "p1@test.com", Some("555-1111"), date(1990, 1, 1)),
        saved(2, "Patient 2", "p2@test.com", Some("555-2222"), date(1991, 1, 1)),
    ];
    let line = encode_response_on(
        &Response::Listing {
            patients,
            empty_message: EMPTY_LIST_MESSAGE,
        },
        today,
    );
    assert_eq!(
        line,
        "SUCCESS|2|1:Patient 1:p1@test.com:555-1111:1990-01-01:34|2:Patient 2:p2@test.com:555-2222:1991-01-01:33"
    );
}

#[test]
fn test_encode_empty_listings() {
    let today = date(2024, 1, 1);
    let list = Response::Listing {
        patients: vec![],
        empty_message: EMPTY_LIST_MESSAGE,
    };
    let search = Response::Listing {
        patients: vec![],
        empty_message: EMPTY_SEARCH_MESSAGE,
    };
    assert_eq!(encode_response_on(&list, today), "SUCCESS|0|No patients");
    assert_eq!(encode_response_on(&search, today), "SUCCESS|0|No results");
}

// =============================================================================
// Error Encoding Tests
// =============================================================================

#[test]
fn test_error_not_found_message() {
    let response = Response::error(&PatientDbError::NotFound(999));
    assert_eq!(
        encode_response_on(&response, date(2024, 1, 1)),
        "ERROR|Patient not found"
    );
}

#[test]
fn test_error_client_facing_messages_pass_through() {
    let response = Response::error(&PatientDbError::Validation(
        "Email already exists: john@test.com".to_string(),
    ));
    assert_eq!(
        encode_response_on(&response, date(2024, 1, 1)),
        "ERROR|Email already exists: john@test.com"
    );
}

#[test]
fn test_error_internal_faults_are_not_leaked() {
    let storage = PatientDbError::Storage("disk /var/db|corrupt\nrow 7".to_string());
    let internal = PatientDbError::Internal("boom".to_string());

    assert!(matches!(
        Response::error(&storage),
        Response::Error(msg) if msg == INTERNAL_ERROR_MESSAGE
    ));
    assert!(matches!(
        Response::error(&internal),
        Response::Error(msg) if msg == INTERNAL_ERROR_MESSAGE
    ));
}

#[test]
fn test_error_messages_are_sanitized() {
    let response = Response::error(&PatientDbError::MalformedCommand(
        "bad|line\r\nbreak".to_string(),
    ));
    let line = encode_response_on(&response, date(2024, 1, 1));
    assert_eq!(line, "ERROR|bad line  break");
    assert_eq!(sanitize("a|b\nc"), "a b c");
}

// =============================================================================
// Reply Decoding Tests
// =============================================================================

#[test]
fn test_decode_reply() {
    assert_eq!(
        decode_reply("SUCCESS|1|John Doe|john@test.com\n").unwrap(),
        Reply::Success(vec![
            "1".to_string(),
            "John Doe".to_string(),
            "john@test.com".to_string()
        ])
    );
    assert_eq!(
        decode_reply("ERROR|Patient not found\r\n").unwrap(),
        Reply::Error("Patient not found".to_string())
    );
    assert!(matches!(
        decode_reply("HELLO"),
        Err(PatientDbError::Protocol(_))
    ));
}

#[test]
fn test_record_round_trip() {
    let today = date(2024, 5, 14);
    let patient = saved(5, "John Doe", "john@test.com", Some("555-1234"), date(1990, 5, 15));

    let line = encode_response_on(&Response::Record(patient.clone()), today);
    let fields = match decode_reply(&line).unwrap() {
        Reply::Success(fields) => fields,
        other => panic!("Expected success, got {:?}", other),
    };
    let view = parse_record(&fields[0]).unwrap();

    assert_eq!(view.id, 5);
    assert_eq!(view.name, patient.name());
    assert_eq!(view.email, patient.email());
    assert_eq!(view.phone.as_deref(), patient.phone());
    assert_eq!(view.birth_date, patient.birth_date());
    assert_eq!(view.age, patient.age_on(today));
    assert_eq!(view.age, 33);
}

#[test]
fn test_parse_record_rejects_malformed() {
    assert!(parse_record("1:John:john@test.com").is_err());
    assert!(parse_record("x:John:john@test.com:555:1990-05-15:30").is_err());
    assert!(parse_record("1:John:john@test.com:555:1990/05/15:30").is_err());
    assert!(parse_record("1:John:john@test.com:555:1990-5-15:30").is_err());
}

#[test]
fn test_parse_listing() {
    let empty = parse_listing(&["0".to_string(), "No patients".to_string()]).unwrap();
    assert!(empty.is_empty());

    let records = parse_listing(&[
        "2".to_string(),
        "1:A:a@test.com::1990-01-01:34".to_string(),
        "2:B:b@test.com:555:1991-01-01:33".to_string(),
    ])
    .unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].phone.as_deref(), Some("555"));

    assert!(parse_listing(&["3".to_string(), "1:A:a@test.com::1990-01-01:34".to_string()]).is_err());
}
