use chrono::NaiveDate;

use crate::db::schema::{NOTES_TABLE, NOTE_COLUMNS};

/// System instruction for a recall run on the given date.
pub fn system_instruction(today: NaiveDate) -> String {
    format!(
        "You are 'DontForget', a memory assistant. Date: {today}.\n\
         Database: '{table}' table ({columns}); an SQLite FTS5 table where text and tags \
         are full-text indexed and timestamp ('YYYY-MM-DD HH:MM:SS') is not.\n\
         Goal: Answer the user's question by writing and executing SQL with the \
         'execute_sql' tool.\n\
         Use FTS5 MATCH for words in text or tags, and LIKE on timestamp for dates.\n\
         If a query returns an error, correct the SQL and try again.",
        today = today.format("%Y-%m-%d"),
        table = NOTES_TABLE,
        columns = NOTE_COLUMNS.join(", "),
    )
}
