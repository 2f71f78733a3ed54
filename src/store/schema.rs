//! SQL DDL for initializing the persistent tables.

/// SQLite schema with the three tables the gateway guarantees:
/// - `Users`: one row per registered user, username is the key
/// - `Logins`: session history, NULL `logout_time` means still active
/// - `Files`: upload history
///
/// `username` on Logins/Files is a logical reference to Users, not a
/// foreign key - clients run arbitrary SQL, so referential integrity
/// cannot be enforced here anyway.
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS Users (
    username TEXT PRIMARY KEY,
    password TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS Logins (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL,
    login_time TEXT NOT NULL,
    logout_time TEXT
);

CREATE TABLE IF NOT EXISTS Files (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL,
    filename TEXT NOT NULL,
    upload_time TEXT
);
"#;
