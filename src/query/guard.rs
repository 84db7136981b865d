//! Syntactic read-only policy applied before a query reaches SQLite.
//!
//! The keyword scan is the first line only. The executor additionally checks
//! `sqlite3_stmt_readonly` on the prepared statement and runs on a connection
//! opened read-only, so a query that slips past these text checks still cannot
//! write.

use std::fmt;

/// Statements containing any of these (case-insensitive, anywhere) are refused.
pub const MUTATION_KEYWORDS: [&str; 4] = ["DELETE", "DROP", "UPDATE", "INSERT"];

/// Text returned to the agent for any write attempt.
pub const READ_ONLY_ERROR: &str = "Error: Read-only access allowed.";

/// Leading keywords a read query may start with.
const READ_VERBS: [&str; 3] = ["SELECT", "WITH", "VALUES"];

/// Why a query was refused without being executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refusal {
    /// The text mentions a mutation keyword.
    MutationKeyword(&'static str),
    /// The text does not start with a read verb.
    NotARead,
    /// SQLite reports the prepared statement may write.
    NotReadOnly,
    /// More than one statement was supplied.
    MultipleStatements,
    /// Nothing but whitespace or comments.
    EmptyQuery,
}

impl fmt::Display for Refusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MutationKeyword(_) | Self::NotARead | Self::NotReadOnly => {
                f.write_str(READ_ONLY_ERROR)
            }
            Self::MultipleStatements => {
                f.write_str("Error: Only one SQL statement per query is allowed.")
            }
            Self::EmptyQuery => f.write_str("Error: Empty query."),
        }
    }
}

/// Run every text-level check. `Ok(())` means the query may be prepared.
pub fn check(sql: &str) -> Result<(), Refusal> {
    if let Some(keyword) = find_mutation_keyword(sql) {
        return Err(Refusal::MutationKeyword(keyword));
    }

    let Some(verb) = leading_keyword(sql) else {
        return Err(Refusal::EmptyQuery);
    };
    if !READ_VERBS.iter().any(|v| verb.eq_ignore_ascii_case(v)) {
        return Err(Refusal::NotARead);
    }

    if has_multiple_statements(sql) {
        return Err(Refusal::MultipleStatements);
    }

    Ok(())
}

/// First mutation keyword found anywhere in `sql`, ignoring case.
pub fn find_mutation_keyword(sql: &str) -> Option<&'static str> {
    let upper = sql.to_uppercase();
    MUTATION_KEYWORDS
        .iter()
        .copied()
        .find(|keyword| upper.contains(keyword))
}

/// The first word of the statement after leading whitespace, comments and `(`.
fn leading_keyword(sql: &str) -> Option<&str> {
    let mut rest = sql;
    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == '(');
        if let Some(after) = rest.strip_prefix("--") {
            rest = after.split_once('\n').map(|(_, tail)| tail).unwrap_or("");
        } else if let Some(after) = rest.strip_prefix("/*") {
            rest = after.split_once("*/").map(|(_, tail)| tail).unwrap_or("");
        } else {
            break;
        }
    }

    let end = rest
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(rest.len());
    (end > 0).then(|| &rest[..end])
}

/// True if anything other than whitespace, comments or `;` follows a `;`
/// that sits outside quotes and comments.
fn has_multiple_statements(sql: &str) -> bool {
    #[derive(Clone, Copy)]
    enum Scan {
        Code,
        Quoted(char),
        LineComment,
        BlockComment,
    }

    let mut state = Scan::Code;
    let mut terminated = false;
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            Scan::Code => match c {
                '-' if chars.peek() == Some(&'-') => {
                    chars.next();
                    state = Scan::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state = Scan::BlockComment;
                }
                ';' => terminated = true,
                c if c.is_whitespace() => {}
                _ if terminated => return true,
                '\'' | '"' | '`' => state = Scan::Quoted(c),
                '[' => state = Scan::Quoted(']'),
                _ => {}
            },
            Scan::Quoted(close) => {
                if c == close {
                    state = Scan::Code;
                }
            }
            Scan::LineComment => {
                if c == '\n' {
                    state = Scan::Code;
                }
            }
            Scan::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = Scan::Code;
                }
            }
        }
    }

    false
}
