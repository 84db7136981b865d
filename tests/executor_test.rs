mod helpers;

use dontforget::query::{GuardedExecutor, QueryExecutor, QueryOutcome, Refusal, NO_RESULTS, READ_ONLY_ERROR};
use helpers::{seed, temp_store};
use serde_json::Value;

fn rows(outcome: QueryOutcome) -> Vec<serde_json::Map<String, Value>> {
    let QueryOutcome::Rows(json) = outcome else {
        panic!("expected rows, got {outcome:?}");
    };
    serde_json::from_str(&json).unwrap()
}

#[test]
fn appended_note_is_found_with_exact_text_and_tags() {
    let (_tmp, path, store) = temp_store();
    seed(&store, "Dentist appointment next Tuesday", "health,appointment", "2024-05-01 09:00:00");
    seed(&store, "Buy oat milk", "shopping", "2024-05-02 10:30:00");

    let exec = GuardedExecutor::open(&path).unwrap();
    let found = rows(exec.execute("SELECT * FROM memory WHERE memory MATCH 'dentist'"));

    assert_eq!(found.len(), 1);
    let keys: Vec<&str> = found[0].keys().map(String::as_str).collect();
    assert_eq!(keys, ["text", "tags", "timestamp"]);
    assert_eq!(found[0]["text"], "Dentist appointment next Tuesday");
    assert_eq!(found[0]["tags"], "health,appointment");
    assert_eq!(found[0]["timestamp"], "2024-05-01 09:00:00");
}

#[test]
fn notes_appended_after_open_are_visible() {
    let (_tmp, path, store) = temp_store();
    let exec = GuardedExecutor::open(&path).unwrap();
    assert_eq!(exec.execute("SELECT * FROM memory").to_string(), NO_RESULTS);

    seed(&store, "Renew passport", "admin", "2024-06-01 12:00:00");
    let found = rows(exec.execute("SELECT text FROM memory"));
    assert_eq!(found[0]["text"], "Renew passport");
}

#[test]
fn tag_and_timestamp_filters() {
    let (_tmp, path, store) = temp_store();
    seed(&store, "Dentist appointment", "health,appointment", "2024-05-01 09:00:00");
    seed(&store, "Gym at 7", "health", "2024-05-03 07:00:00");
    seed(&store, "Pay rent", "finance", "2024-06-01 08:00:00");

    let exec = GuardedExecutor::open(&path).unwrap();

    let health = rows(exec.execute("SELECT text FROM memory WHERE tags LIKE '%health%' ORDER BY timestamp"));
    assert_eq!(health.len(), 2);
    assert_eq!(health[1]["text"], "Gym at 7");

    let may = rows(exec.execute("SELECT text FROM memory WHERE timestamp LIKE '2024-05-%'"));
    assert_eq!(may.len(), 2);
}

#[test]
fn empty_match_is_sentinel_text() {
    let (_tmp, path, store) = temp_store();
    seed(&store, "Something", "general", "2024-05-01 09:00:00");

    let exec = GuardedExecutor::open(&path).unwrap();
    let out = exec.execute("SELECT * FROM memory WHERE memory MATCH 'zebra'");
    assert_eq!(out, QueryOutcome::Empty);
    assert_eq!(out.to_string(), "No results found.");
}

#[test]
fn mutation_keywords_are_refused_and_store_untouched() {
    let (_tmp, path, store) = temp_store();
    seed(&store, "Keep me", "general", "2024-05-01 09:00:00");
    let exec = GuardedExecutor::open(&path).unwrap();

    for sql in [
        "DELETE FROM memory",
        "drop table memory",
        "UPDATE memory SET text = 'x'",
        "insert into memory (text, tags, timestamp) values ('a', 'b', 'c')",
        "SELECT * FROM memory; DELETE FROM memory",
    ] {
        let out = exec.execute(sql);
        assert!(out.is_error(), "{sql}");
        assert_eq!(out.to_string(), READ_ONLY_ERROR, "{sql}");
    }

    assert_eq!(store.count().unwrap(), 1);
    assert_eq!(store.all().unwrap()[0].text, "Keep me");
}

#[test]
fn keyword_match_is_a_plain_substring_check() {
    let (_tmp, path, store) = temp_store();
    seed(&store, "Package was deleted by mistake", "general", "2024-05-01 09:00:00");
    let exec = GuardedExecutor::open(&path).unwrap();

    // Refused even though the word only appears inside a search term
    let out = exec.execute("SELECT * FROM memory WHERE memory MATCH 'deleted'");
    assert_eq!(out, QueryOutcome::Refused(Refusal::MutationKeyword("DELETE")));
}

#[test]
fn writes_without_a_listed_keyword_are_still_refused() {
    let (_tmp, path, store) = temp_store();
    seed(&store, "Keep me", "general", "2024-05-01 09:00:00");
    let exec = GuardedExecutor::open(&path).unwrap();

    for sql in [
        "REPLACE INTO memory (text, tags, timestamp) VALUES ('a', 'b', 'c')",
        "WITH x AS (SELECT 1) REPLACE INTO memory (text, tags, timestamp) VALUES ('a', 'b', 'c')",
        "PRAGMA journal_mode = DELETE",
        "ATTACH DATABASE 'other.db' AS other",
        "CREATE TABLE t (x)",
    ] {
        let out = exec.execute(sql);
        assert!(out.is_error(), "{sql} => {out:?}");
        assert!(matches!(out, QueryOutcome::Refused(_) | QueryOutcome::Failed(_)));
    }

    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn multiple_statements_are_refused() {
    let (_tmp, path, _store) = temp_store();
    let exec = GuardedExecutor::open(&path).unwrap();

    let out = exec.execute("SELECT 1; SELECT 2");
    assert_eq!(out, QueryOutcome::Refused(Refusal::MultipleStatements));

    // A trailing semicolon or one inside a literal is fine
    assert!(!exec.execute("SELECT 1;").is_error());
    assert!(!exec.execute("SELECT 'a;b' AS s").is_error());
}

#[test]
fn syntax_errors_are_reported_as_text() {
    let (_tmp, path, _store) = temp_store();
    let exec = GuardedExecutor::open(&path).unwrap();

    let out = exec.execute("SELECT FROM WHERE");
    assert!(matches!(out, QueryOutcome::Failed(_)));
    assert!(out.to_string().starts_with("SQL Error: "));
}
