//! Message classification and command execution.
//!
//! The dispatcher is the only place that knows the three message forms and
//! the three response shapes. It never fails: every outcome, including an
//! engine error, is rendered as a plain text response so the connection
//! stays open.

use crate::store::{Store, StoreError};
use tracing::error;

/// Response sent after a REPORT command.
pub const REPORT_ACK: &str = "Report printed on server console";

/// Response sent after a successful mutating statement.
pub const EXECUTE_ACK: &str = "done";

/// Prefix of every error response.
const SQL_ERROR_PREFIX: &str = "SQL ERROR: ";

/// What an incoming message asks the server to do.
///
/// `Query` and `Execute` borrow the original message text: classification
/// looks at a normalized copy, but the statement handed to the store keeps
/// its literal case and content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// Dump the tables to the operator console.
    Report,
    /// Row-returning statement.
    Query(&'a str),
    /// Mutating statement.
    Execute(&'a str),
}

/// Classifies a raw message by its leading keyword.
///
/// The keyword match is case-insensitive and ignores surrounding
/// whitespace: `"  report  "` is a report request and `"select 1"` is a
/// query. Everything that is neither goes down the execute path.
pub fn classify(message: &str) -> Command<'_> {
    let normalized = message.trim().to_uppercase();

    if normalized == "REPORT" {
        Command::Report
    } else if normalized.starts_with("SELECT") {
        Command::Query(message)
    } else {
        Command::Execute(message)
    }
}

/// Executes classified messages against the store and renders responses.
#[derive(Debug, Clone)]
pub struct CommandHandler {
    /// The SQLite-backed store
    store: Store,
    /// Whether raw SQL passthrough is enabled. On by default; turning it
    /// off is a programmatic hardening switch, not reachable from the CLI,
    /// so the documented wire contract is unchanged.
    raw_sql: bool,
}

impl CommandHandler {
    /// Creates a handler with raw SQL passthrough enabled.
    pub fn new(store: Store) -> Self {
        Self {
            store,
            raw_sql: true,
        }
    }

    /// Enables or disables raw statement execution. With passthrough
    /// disabled only REPORT still works; both SQL paths answer with an
    /// error response.
    pub fn with_raw_sql(mut self, enabled: bool) -> Self {
        self.raw_sql = enabled;
        self
    }

    /// Handles one message and returns the response text to send back.
    pub async fn dispatch(&self, message: &str) -> String {
        match classify(message) {
            Command::Report => self.report().await,
            Command::Query(statement) => {
                if !self.raw_sql {
                    return Self::disabled_response();
                }
                match self.store.query(statement).await {
                    Ok(rows) => rows,
                    Err(err) => Self::sql_error(&err),
                }
            }
            Command::Execute(statement) => {
                if !self.raw_sql {
                    return Self::disabled_response();
                }
                match self.store.execute(statement).await {
                    Ok(()) => EXECUTE_ACK.to_owned(),
                    Err(err) => Self::sql_error(&err),
                }
            }
        }
    }

    /// Prints the report to the operator console and acknowledges.
    ///
    /// The acknowledgment is fixed: a failure to assemble the report is an
    /// operator-side problem and is logged, never sent to the client.
    async fn report(&self) -> String {
        match self.store.report().await {
            Ok(report) => println!("\n{report}\n"),
            Err(err) => error!(error = %err, "Failed to assemble server report"),
        }
        REPORT_ACK.to_owned()
    }

    fn sql_error(err: &StoreError) -> String {
        format!("{SQL_ERROR_PREFIX}{err}")
    }

    fn disabled_response() -> String {
        format!("{SQL_ERROR_PREFIX}raw statement execution is disabled")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_handler() -> (CommandHandler, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("test.db"));
        store.init_schema().await.unwrap();
        (CommandHandler::new(store), dir)
    }

    #[test]
    fn test_classify_report_is_case_and_whitespace_insensitive() {
        assert_eq!(classify("REPORT"), Command::Report);
        assert_eq!(classify("report"), Command::Report);
        assert_eq!(classify("  Report  "), Command::Report);
    }

    #[test]
    fn test_classify_report_with_trailing_text_is_not_report() {
        assert_eq!(
            classify("REPORT EXTRA"),
            Command::Execute("REPORT EXTRA")
        );
    }

    #[test]
    fn test_classify_select_routes_to_query() {
        assert_eq!(
            classify("select * from Users"),
            Command::Query("select * from Users")
        );
        assert_eq!(
            classify("  SELECT 1  "),
            Command::Query("  SELECT 1  ")
        );
    }

    #[test]
    fn test_classify_other_routes_to_execute() {
        assert_eq!(
            classify("INSERT INTO Users VALUES ('x','y')"),
            Command::Execute("INSERT INTO Users VALUES ('x','y')")
        );
        assert_eq!(classify(""), Command::Execute(""));
    }

    #[test]
    fn test_classify_preserves_original_text() {
        // The statement must keep literal case even though the keyword
        // match is case-insensitive.
        let message = "select password FROM Users WHERE username = 'Alice'";
        assert_eq!(classify(message), Command::Query(message));
    }

    #[tokio::test]
    async fn test_dispatch_execute_returns_done() {
        let (handler, _dir) = create_handler().await;

        let response = handler
            .dispatch("INSERT INTO Users VALUES ('alice', 'secret')")
            .await;
        assert_eq!(response, "done");
    }

    #[tokio::test]
    async fn test_dispatch_select_returns_rows() {
        let (handler, _dir) = create_handler().await;

        handler
            .dispatch("INSERT INTO Users VALUES ('alice', 'secret')")
            .await;

        let response = handler.dispatch("select username from Users").await;
        assert_eq!(response, "alice");
    }

    #[tokio::test]
    async fn test_dispatch_select_zero_rows_is_empty() {
        let (handler, _dir) = create_handler().await;

        let response = handler.dispatch("SELECT * FROM Users").await;
        assert_eq!(response, "");
    }

    #[tokio::test]
    async fn test_dispatch_error_has_sql_error_prefix() {
        let (handler, _dir) = create_handler().await;

        let response = handler.dispatch("DROP TABLE missing_table").await;
        assert!(response.starts_with("SQL ERROR: "), "got: {response}");

        let response = handler.dispatch("SELECT * FROM missing_table").await;
        assert!(response.starts_with("SQL ERROR: "), "got: {response}");
    }

    #[tokio::test]
    async fn test_dispatch_report_returns_fixed_ack() {
        let (handler, _dir) = create_handler().await;

        // Empty tables must not make REPORT fail.
        assert_eq!(handler.dispatch("REPORT").await, REPORT_ACK);
        assert_eq!(handler.dispatch("  report  ").await, REPORT_ACK);
    }

    #[tokio::test]
    async fn test_raw_sql_disabled_blocks_both_sql_paths() {
        let (handler, _dir) = create_handler().await;
        let handler = handler.with_raw_sql(false);

        let response = handler
            .dispatch("INSERT INTO Users VALUES ('alice', 'secret')")
            .await;
        assert_eq!(response, "SQL ERROR: raw statement execution is disabled");

        let response = handler.dispatch("SELECT * FROM Users").await;
        assert_eq!(response, "SQL ERROR: raw statement execution is disabled");

        // REPORT is still served.
        assert_eq!(handler.dispatch("REPORT").await, REPORT_ACK);
    }
}
