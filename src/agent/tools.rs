//! The closed set of capabilities the agent may call.

use serde::Deserialize;
use serde_json::json;

use crate::llm::{ToolDeclaration, ToolInvocation};

pub const EXECUTE_SQL: &str = "execute_sql";

/// A validated tool request. Adding a capability means adding a variant here,
/// its declaration in [`AgentTool::declarations`], and its parse arm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentTool {
    ExecuteSql { sql_query: String },
}

#[derive(Debug, Deserialize)]
struct ExecuteSqlArgs {
    sql_query: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolParseError {
    #[error("unknown tool `{0}`")]
    UnknownTool(String),
    #[error("invalid arguments for `{tool}`: {reason}")]
    InvalidArguments { tool: String, reason: String },
}

impl AgentTool {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ExecuteSql { .. } => EXECUTE_SQL,
        }
    }

    /// Declarations advertised to the model.
    pub fn declarations() -> Vec<ToolDeclaration> {
        vec![ToolDeclaration {
            name: EXECUTE_SQL.to_string(),
            description: "Executes a read-only SQL query on the 'memory' table and returns \
                          the matching rows as JSON, or an error message."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "sql_query": {
                        "type": "string",
                        "description": "A single SQLite SELECT statement."
                    }
                },
                "required": ["sql_query"]
            }),
        }]
    }

    /// Validate a raw invocation into a typed tool request.
    pub fn from_invocation(invocation: &ToolInvocation) -> Result<Self, ToolParseError> {
        match invocation.name.as_str() {
            EXECUTE_SQL => {
                let args: ExecuteSqlArgs = serde_json::from_value(invocation.args.clone())
                    .map_err(|e| ToolParseError::InvalidArguments {
                        tool: EXECUTE_SQL.to_string(),
                        reason: e.to_string(),
                    })?;
                Ok(Self::ExecuteSql {
                    sql_query: args.sql_query,
                })
            }
            other => Err(ToolParseError::UnknownTool(other.to_string())),
        }
    }
}
