//! Quote persistence
//!
//! Every successful calculation is stored as one immutable row holding the
//! submitted request and the full-precision result.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::QuoteError;
use crate::models::quote::{QuoteFilter, QuoteId, QuoteRequest, QuoteResult, StoredQuote};

mod queries;

/// Storage seam used by the HTTP layer. Implementations must accept
/// concurrent `save` calls.
pub trait QuoteRepository: Send + Sync {
    fn save(&self, request: &QuoteRequest, result: &QuoteResult) -> Result<QuoteId, QuoteError>;
    fn get(&self, id: QuoteId) -> Result<Option<StoredQuote>, QuoteError>;
    /// Newest first.
    fn list(&self, filter: &QuoteFilter) -> Result<Vec<StoredQuote>, QuoteError>;
    fn count(&self) -> Result<u64, QuoteError>;
}

/// SQLite-backed quote store
#[derive(Clone)]
pub struct SqliteQuoteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteQuoteStore {
    /// Open the database at `database_url` (`sqlite:<path>` or `sqlite::memory:`)
    pub fn connect(database_url: &str) -> anyhow::Result<Self> {
        info!("Connecting to database at {}", database_url);

        let path = database_url.strip_prefix("sqlite:").unwrap_or(database_url);

        let conn = if path == ":memory:" {
            Connection::open_in_memory()?
        } else {
            if let Some(parent) = Path::new(path).parent() {
                std::fs::create_dir_all(parent)?;
            }
            Connection::open(path)?
        };

        Self::run_migrations(&conn)?;

        info!("Database connected successfully");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn run_migrations(conn: &Connection) -> rusqlite::Result<()> {
        debug!("Running database migrations...");

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS solar_quotes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                zip_code TEXT NOT NULL,
                monthly_bill REAL NOT NULL,
                roof_size REAL NOT NULL,
                roof_type TEXT NOT NULL,
                sun_exposure TEXT NOT NULL,
                electricity_rate REAL NOT NULL,
                email TEXT,
                system_size_kw REAL NOT NULL,
                annual_production_kwh REAL NOT NULL,
                coverage_percent REAL NOT NULL,
                system_cost REAL NOT NULL,
                tax_credit REAL NOT NULL,
                net_cost REAL NOT NULL,
                annual_savings REAL NOT NULL,
                payback_years REAL NOT NULL,
                lifetime_savings REAL NOT NULL,
                co2_offset_lbs REAL NOT NULL,
                trees_equivalent INTEGER NOT NULL,
                cars_off_road REAL NOT NULL,
                lifetime_energy_mwh REAL NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_quotes_created_at ON solar_quotes(created_at);
            CREATE INDEX IF NOT EXISTS idx_quotes_sun_exposure ON solar_quotes(sun_exposure);
            CREATE INDEX IF NOT EXISTS idx_quotes_roof_type ON solar_quotes(roof_type);
            "#,
        )?;

        debug!("Database migrations completed");
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, QuoteError> {
        self.conn.lock().map_err(|_| QuoteError::LockPoisoned)
    }
}

impl QuoteRepository for SqliteQuoteStore {
    fn save(&self, request: &QuoteRequest, result: &QuoteResult) -> Result<QuoteId, QuoteError> {
        let conn = self.lock()?;
        Ok(queries::insert_quote(&conn, request, result)?)
    }

    fn get(&self, id: QuoteId) -> Result<Option<StoredQuote>, QuoteError> {
        let conn = self.lock()?;
        Ok(queries::find_quote(&conn, id)?)
    }

    fn list(&self, filter: &QuoteFilter) -> Result<Vec<StoredQuote>, QuoteError> {
        let conn = self.lock()?;
        Ok(queries::list_quotes(&conn, filter)?)
    }

    fn count(&self) -> Result<u64, QuoteError> {
        let conn = self.lock()?;
        Ok(queries::count_quotes(&conn)?)
    }
}
