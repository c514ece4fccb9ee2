//! DuckDB store implementation

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use duckdb::{params, Connection};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{BalanceAggregate, BalancePatch, EntryKind, LedgerEntry, Session, User};
use crate::ports::WalletStore;
use crate::services::MigrationService;

/// Maximum number of retries when the database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400, 800ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows error messages
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS error messages
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("file is already open")
}

/// Map a DuckDB error onto the domain taxonomy.
///
/// Unique-constraint violations surface as `Conflict` (this is what makes
/// concurrent same-email registration admit at most one winner); foreign-key
/// violations mean the referenced user row is missing.
fn map_db_error(e: duckdb::Error) -> Error {
    let msg = e.to_string();
    let lower = msg.to_lowercase();
    if lower.contains("duplicate key") || lower.contains("unique constraint") {
        Error::conflict(msg)
    } else if lower.contains("foreign key") {
        Error::not_found("referenced user does not exist")
    } else {
        Error::storage(msg)
    }
}

/// Collapse a single-row query into an Option, keeping real storage errors
fn optional<T>(result: duckdb::Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(map_db_error(e)),
    }
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn parse_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap_or_default()
}

fn parse_decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap_or_default()
}

/// DuckDB store implementation
///
/// A single connection guarded by a mutex; every request shares this handle
/// through the `WalletStore` trait rather than a process-wide global.
pub struct DuckDbStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl DuckDbStore {
    /// Open (or create) the database file.
    ///
    /// Includes retry logic with exponential backoff for file locking
    /// errors, so a busy file fails with a bounded `Storage` error instead
    /// of blocking indefinitely.
    pub fn new(db_path: &Path) -> Result<Self> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    return Ok(Self {
                        conn: Mutex::new(conn),
                        db_path: db_path.to_path_buf(),
                    });
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        let delay =
                            Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        eprintln!(
                            "[mywallet] Database busy, retrying in {}ms (attempt {}/{}): {}",
                            delay.as_millis(),
                            attempt + 1,
                            MAX_RETRIES,
                            err_msg
                        );
                        thread::sleep(delay);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(Error::storage(err_msg));
                }
            }
        }

        Err(last_error
            .map(|e| Error::storage(e.to_string()))
            .unwrap_or_else(|| {
                Error::storage(format!("Failed to open database after {} retries", MAX_RETRIES))
            }))
    }

    fn try_open_connection(db_path: &Path) -> duckdb::Result<Connection> {
        // Disable extension autoloading to avoid macOS code signing issues
        // with cached extensions in ~/.duckdb/extensions
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Connection::open_with_flags(db_path, config)
    }

    /// Run database migrations using the MigrationService
    pub fn run_migrations(&self) -> Result<crate::services::MigrationResult> {
        let conn = self.conn.lock().unwrap();
        let migration_service = MigrationService::new(&conn);
        migration_service.run_pending()
    }

    /// Ensure database schema exists (runs pending migrations)
    pub fn ensure_schema(&self) -> Result<()> {
        self.run_migrations()?;
        Ok(())
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn row_to_user(&self, row: &duckdb::Row) -> User {
        // 0: user_id, 1: display_name, 2: email, 3: password_hash, 4: created_at
        let id_str: String = row.get(0).unwrap_or_default();
        let created_str: String = row.get(4).unwrap_or_default();
        User {
            id: Uuid::parse_str(&id_str).unwrap_or_default(),
            display_name: row.get(1).unwrap_or_default(),
            email: row.get(2).unwrap_or_default(),
            password_hash: row.get(3).unwrap_or_default(),
            created_at: parse_timestamp(&created_str),
        }
    }

    fn row_to_session(&self, row: &duckdb::Row) -> Session {
        // 0: token, 1: user_id, 2: created_at, 3: expires_at
        let user_id_str: String = row.get(1).unwrap_or_default();
        let created_str: String = row.get(2).unwrap_or_default();
        let expires_str: String = row.get(3).unwrap_or_default();
        Session {
            token: row.get(0).unwrap_or_default(),
            user_id: Uuid::parse_str(&user_id_str).unwrap_or_default(),
            created_at: parse_timestamp(&created_str),
            expires_at: parse_timestamp(&expires_str),
        }
    }

    fn row_to_entry(&self, row: &duckdb::Row) -> LedgerEntry {
        // 0: entry_id, 1: user_id, 2: position, 3: amount, 4: description,
        // 5: entry_date, 6: kind, 7: created_at
        let id_str: String = row.get(0).unwrap_or_default();
        let user_id_str: String = row.get(1).unwrap_or_default();
        let amount_str: String = row.get(3).unwrap_or_default();
        let date_str: String = row.get(5).unwrap_or_default();
        let kind_str: String = row.get(6).unwrap_or_default();
        let created_str: String = row.get(7).unwrap_or_default();
        LedgerEntry {
            id: Uuid::parse_str(&id_str).unwrap_or_default(),
            user_id: Uuid::parse_str(&user_id_str).unwrap_or_default(),
            position: row.get(2).ok(),
            amount: parse_decimal(&amount_str),
            description: row.get(4).unwrap_or_default(),
            entry_date: parse_date(&date_str),
            kind: EntryKind::parse(&kind_str).unwrap_or(EntryKind::Income),
            created_at: parse_timestamp(&created_str),
        }
    }

    fn row_to_aggregate(&self, row: &duckdb::Row) -> BalanceAggregate {
        // 0: user_id, 1: balance, 2: income, 3: expense, 4: created_at, 5: updated_at
        let user_id_str: String = row.get(0).unwrap_or_default();
        let balance_str: String = row.get(1).unwrap_or_default();
        let income_str: String = row.get(2).unwrap_or_default();
        let expense_str: String = row.get(3).unwrap_or_default();
        let created_str: String = row.get(4).unwrap_or_default();
        let updated_str: String = row.get(5).unwrap_or_default();
        BalanceAggregate {
            user_id: Uuid::parse_str(&user_id_str).unwrap_or_default(),
            balance: parse_decimal(&balance_str),
            income: parse_decimal(&income_str),
            expense: parse_decimal(&expense_str),
            created_at: parse_timestamp(&created_str),
            updated_at: parse_timestamp(&updated_str),
        }
    }
}

impl WalletStore for DuckDbStore {
    // === Users ===

    fn insert_user(&self, user: &User) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO sys_users (user_id, display_name, email, password_hash, created_at)
             VALUES (?, ?, ?, ?, ?)",
            params![
                user.id.to_string(),
                user.display_name,
                user.email,
                user.password_hash,
                user.created_at.to_rfc3339(),
            ],
        )
        .map_err(map_db_error)?;
        Ok(())
    }

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT user_id, display_name, email, password_hash, created_at
                 FROM sys_users WHERE email = ?",
            )
            .map_err(map_db_error)?;
        optional(stmt.query_row([email], |row| Ok(self.row_to_user(row))))
    }

    fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT user_id, display_name, email, password_hash, created_at
                 FROM sys_users WHERE user_id = ?",
            )
            .map_err(map_db_error)?;
        optional(stmt.query_row([id.to_string()], |row| Ok(self.row_to_user(row))))
    }

    // === Sessions ===

    fn insert_session(&self, session: &Session) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO sys_sessions (token, user_id, created_at, expires_at)
             VALUES (?, ?, ?, ?)",
            params![
                session.token,
                session.user_id.to_string(),
                session.created_at.to_rfc3339(),
                session.expires_at.to_rfc3339(),
            ],
        )
        .map_err(map_db_error)?;
        Ok(())
    }

    fn get_session_by_token(&self, token: &str) -> Result<Option<Session>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT token, user_id, created_at, expires_at
                 FROM sys_sessions WHERE token = ?",
            )
            .map_err(map_db_error)?;
        optional(stmt.query_row([token], |row| Ok(self.row_to_session(row))))
    }

    fn delete_session(&self, token: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let removed = conn
            .execute("DELETE FROM sys_sessions WHERE token = ?", params![token])
            .map_err(map_db_error)?;
        Ok(removed > 0)
    }

    // === Ledger entries ===

    fn insert_entry(&self, entry: &LedgerEntry) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO sys_ledger_entries
                 (entry_id, user_id, position, amount, description, entry_date, kind, created_at)
             VALUES (?, ?, nextval('seq_ledger_position'), CAST(? AS DECIMAL(18,2)), ?, ?, ?, ?)",
            params![
                entry.id.to_string(),
                entry.user_id.to_string(),
                entry.amount.to_string(),
                entry.description,
                entry.entry_date.to_string(),
                entry.kind.as_str(),
                entry.created_at.to_rfc3339(),
            ],
        )
        .map_err(map_db_error)?;
        Ok(())
    }

    fn list_entries_by_user(&self, user_id: Uuid) -> Result<Vec<LedgerEntry>> {
        let conn = self.conn.lock().unwrap();
        // Cast DECIMAL and DATE to VARCHAR so they can be read back with
        // full precision; ordering is by insertion position, not entry_date
        let mut stmt = conn
            .prepare(
                "SELECT entry_id, user_id, position, amount::VARCHAR, description,
                        entry_date::VARCHAR, kind, created_at
                 FROM sys_ledger_entries
                 WHERE user_id = ?
                 ORDER BY position",
            )
            .map_err(map_db_error)?;

        let entries = stmt
            .query_map([user_id.to_string()], |row| Ok(self.row_to_entry(row)))
            .map_err(map_db_error)?
            .filter_map(|r| r.ok())
            .collect();

        Ok(entries)
    }

    // === Balance aggregates ===

    fn insert_aggregate(&self, aggregate: &BalanceAggregate) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO sys_balance_aggregates
                 (user_id, balance, income, expense, created_at, updated_at)
             VALUES (?, CAST(? AS DECIMAL(18,2)), CAST(? AS DECIMAL(18,2)),
                     CAST(? AS DECIMAL(18,2)), ?, ?)",
            params![
                aggregate.user_id.to_string(),
                aggregate.balance.to_string(),
                aggregate.income.to_string(),
                aggregate.expense.to_string(),
                aggregate.created_at.to_rfc3339(),
                aggregate.updated_at.to_rfc3339(),
            ],
        )
        .map_err(map_db_error)?;
        Ok(())
    }

    fn get_aggregate(&self, user_id: Uuid) -> Result<Option<BalanceAggregate>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT user_id, balance::VARCHAR, income::VARCHAR, expense::VARCHAR,
                        created_at, updated_at
                 FROM sys_balance_aggregates WHERE user_id = ?",
            )
            .map_err(map_db_error)?;
        optional(stmt.query_row([user_id.to_string()], |row| Ok(self.row_to_aggregate(row))))
    }

    fn merge_aggregate(&self, user_id: Uuid, patch: &BalancePatch) -> Result<BalanceAggregate> {
        // Hold the connection lock across the read and the update so
        // concurrent merges for the same user serialize and cannot lose
        // field updates.
        let conn = self.conn.lock().unwrap();

        let prior = {
            let mut stmt = conn
                .prepare(
                    "SELECT user_id, balance::VARCHAR, income::VARCHAR, expense::VARCHAR,
                            created_at, updated_at
                     FROM sys_balance_aggregates WHERE user_id = ?",
                )
                .map_err(map_db_error)?;
            optional(stmt.query_row([user_id.to_string()], |row| Ok(self.row_to_aggregate(row))))?
                .ok_or_else(|| Error::not_found(format!("No balance aggregate for user {}", user_id)))?
        };

        // COALESCE keeps any field the patch does not mention
        conn.execute(
            "UPDATE sys_balance_aggregates SET
                balance = COALESCE(CAST(? AS DECIMAL(18,2)), balance),
                income = COALESCE(CAST(? AS DECIMAL(18,2)), income),
                expense = COALESCE(CAST(? AS DECIMAL(18,2)), expense),
                updated_at = ?
             WHERE user_id = ?",
            params![
                patch.balance.map(|d| d.to_string()),
                patch.income.map(|d| d.to_string()),
                patch.expense.map(|d| d.to_string()),
                Utc::now().to_rfc3339(),
                user_id.to_string(),
            ],
        )
        .map_err(map_db_error)?;

        Ok(prior)
    }
}
