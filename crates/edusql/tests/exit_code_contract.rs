use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;

const EXIT_SUCCESS: i32 = 0;
const EXIT_RUNTIME_FAILURE: i32 = 1;
const EXIT_UNANSWERED: i32 = 2;
const EXIT_USAGE_ERROR: i32 = 64;

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("{prefix}-{nanos}"))
}

fn edusql(home_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_edusql"))
        .env_remove("GEMINI_API_KEY")
        .env_remove("EDUSQL_DB")
        .env_remove("EDUSQL_MODEL")
        .env("RUST_LOG", "warn")
        .arg("--home-dir")
        .arg(home_dir)
        .args(args)
        .output()
        .expect("command should execute")
}

fn seeded_home(prefix: &str) -> PathBuf {
    let home_dir = unique_temp_dir(prefix);
    std::fs::create_dir_all(&home_dir).expect("home dir should be creatable");
    let output = edusql(&home_dir, &["init-db", "--seed"]);
    assert_eq!(output.status.code(), Some(EXIT_SUCCESS));
    assert!(home_dir.join(".edusql/school.sqlite").exists());
    home_dir
}

#[test]
fn missing_question_exits_with_usage_code() {
    let status = Command::new(env!("CARGO_BIN_EXE_edusql"))
        .arg("ask")
        .status()
        .expect("command should execute");

    assert_eq!(status.code(), Some(EXIT_USAGE_ERROR));
}

#[test]
fn relative_home_dir_exits_with_runtime_code() {
    let output = edusql(Path::new("relative"), &["ask", "top student"]);
    assert_eq!(output.status.code(), Some(EXIT_RUNTIME_FAILURE));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("edusql: failed `ask` (exit_code=1)"));
}

#[test]
fn answered_question_prints_reply_and_exits_cleanly() {
    let home_dir = seeded_home("edusql-exit-answer");
    let output = edusql(&home_dir, &["ask", "top", "student"]);

    assert_eq!(output.status.code(), Some(EXIT_SUCCESS));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("edusql: starting `ask`"));
    assert!(stdout.contains("Asha (5): 95"));
    assert!(stdout.contains("edusql: completed `ask` (exit_code=0)"));
}

#[test]
fn unanswerable_question_exits_with_unanswered_code() {
    let home_dir = seeded_home("edusql-exit-unanswered");
    let output = edusql(&home_dir, &["ask", "what is the weather"]);

    assert_eq!(output.status.code(), Some(EXIT_UNANSWERED));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Sorry, I couldn’t understand your request"));
}

#[test]
fn json_envelope_reports_query_and_chunks() {
    let home_dir = seeded_home("edusql-exit-json");
    let output = edusql(&home_dir, &["ask", "--json", "students in class 4"]);
    assert_eq!(output.status.code(), Some(EXIT_SUCCESS));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let envelope: Value =
        serde_json::from_str(&stdout).expect("stdout should be a single json document");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("edusql: starting `ask`"));
    assert!(stderr.contains("edusql: completed `ask` (exit_code=0)"));

    assert_eq!(envelope.get("ok"), Some(&Value::Bool(true)));
    assert_eq!(envelope.get("reply_kind").and_then(Value::as_str), Some("answer"));
    assert_eq!(envelope.get("origin").and_then(Value::as_str), Some("fallback"));
    assert_eq!(envelope.get("row_count").and_then(Value::as_u64), Some(2));
    assert_eq!(
        envelope.pointer("/params/0").and_then(Value::as_i64),
        Some(4)
    );
    assert_eq!(
        envelope.pointer("/meta/model_configured"),
        Some(&Value::Bool(false))
    );
}

#[test]
fn missing_database_is_a_runtime_failure() {
    let home_dir = unique_temp_dir("edusql-exit-nodb");
    std::fs::create_dir_all(&home_dir).expect("home dir should be creatable");
    let output = edusql(&home_dir, &["ask", "top student"]);

    assert_eq!(output.status.code(), Some(EXIT_RUNTIME_FAILURE));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("There was an error fetching data"));
    assert!(!home_dir.join(".edusql/school.sqlite").exists());
}

#[test]
fn schema_command_needs_no_database() {
    let home_dir = unique_temp_dir("edusql-exit-schema");
    let output = edusql(&home_dir, &["schema"]);
    assert_eq!(output.status.code(), Some(EXIT_SUCCESS));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1. Students(StudentID, Name, Age, ClassID"));

    let output = edusql(&home_dir, &["schema", "--wire"]);
    assert_eq!(output.status.code(), Some(EXIT_SUCCESS));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let wire: Value =
        serde_json::from_str(&stdout).expect("wire schema stdout should be a single json document");
    assert!(wire.get("inbound").is_some());
    assert!(stdout.contains("\"chat_id\""));
}
