//! Operator-facing server report.
//!
//! The report is a console-only dump of the three tables. Clients never see
//! it; they only receive a fixed acknowledgment string. The `Display`
//! rendering is the exact listing printed on the operator console.

use std::fmt;

/// One row of login history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginEntry {
    pub username: String,
    pub login_time: String,
    /// `None` means the session is still active.
    pub logout_time: Option<String>,
}

/// One uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub username: String,
    pub filename: String,
}

/// Snapshot of the three tables, taken for the REPORT command.
#[derive(Debug, Clone, Default)]
pub struct ServerReport {
    pub users: Vec<String>,
    pub logins: Vec<LoginEntry>,
    pub files: Vec<FileEntry>,
}

impl fmt::Display for ServerReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- SERVER REPORT ---")?;

        writeln!(f, "1. Registered Users:")?;
        if self.users.is_empty() {
            writeln!(f, "   (None)")?;
        }
        for username in &self.users {
            writeln!(f, "   - {username}")?;
        }

        writeln!(f)?;
        writeln!(f, "2. Login History:")?;
        if self.logins.is_empty() {
            writeln!(f, "   (None)")?;
        }
        for login in &self.logins {
            let logout = login.logout_time.as_deref().unwrap_or("Active");
            writeln!(
                f,
                "   - User: {}, Login: {}, Logout: {}",
                login.username, login.login_time, logout
            )?;
        }

        writeln!(f)?;
        writeln!(f, "3. Uploaded Files:")?;
        if self.files.is_empty() {
            writeln!(f, "   (None)")?;
        }
        for file in &self.files {
            writeln!(f, "   - User: {}, File: {}", file.username, file.filename)?;
        }

        write!(f, "---------------------")
    }
}
