//! CSV-backed sample ledger
//!
//! One row per sample slot, one column per username, cells holding the
//! absolute path of a recorded sample. The table is created lazily, read
//! fully, mutated in memory, and rewritten fully on every update. There is
//! no locking: single-user, single-process usage is assumed, and concurrent
//! writers would race (last writer wins).

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Maximum recorded samples per username.
pub const MAX_SAMPLES: usize = 5;

/// Header label of the slot-name column.
const SLOT_COLUMN: &str = "Sample";

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{user} has already recorded the maximum of {max} audio samples", max = MAX_SAMPLES)]
    QuotaExceeded { user: String },
    #[error("ledger {path} is malformed: {reason}")]
    Malformed { path: PathBuf, reason: String },
    #[error("ledger read/write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("ledger read/write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// In-memory image of the ledger table. Rows are kept at header width.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Table {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    fn empty() -> Self {
        Self {
            header: vec![SLOT_COLUMN.to_string()],
            rows: Vec::new(),
        }
    }

    fn user_column(&self, user: &str) -> Option<usize> {
        self.header.iter().skip(1).position(|h| h == user).map(|i| i + 1)
    }

    /// Column index for `user`, appending a new column (and padding every
    /// row) on first appearance.
    fn ensure_user_column(&mut self, user: &str) -> usize {
        if let Some(index) = self.user_column(user) {
            return index;
        }
        self.header.push(user.to_string());
        for row in &mut self.rows {
            row.push(String::new());
        }
        self.header.len() - 1
    }

    fn count_in_column(&self, column: usize) -> usize {
        self.rows.iter().filter(|row| !row[column].is_empty()).count()
    }

    /// Row index for the slot `label`, appending a blank row if absent.
    fn ensure_slot_row(&mut self, label: &str) -> usize {
        if let Some(index) = self.rows.iter().position(|row| row[0] == label) {
            return index;
        }
        let mut row = vec![String::new(); self.header.len()];
        row[0] = label.to_string();
        self.rows.push(row);
        self.rows.len() - 1
    }
}

/// Row label for a zero-based sample slot.
pub fn slot_label(slot: usize) -> String {
    format!("audio_sample_{}", slot + 1)
}

/// Handle to the ledger file. Stateless between calls: every operation
/// re-reads the table from disk.
pub struct SampleLedger {
    path: PathBuf,
}

impl SampleLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the backing file with its header row if it does not exist.
    pub fn ensure_initialized(&self) -> Result<(), LedgerError> {
        if self.path.exists() {
            return Ok(());
        }
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }
        self.store(&Table::empty())
    }

    /// Register `audio_path` under (`user`, `slot`).
    ///
    /// Overwriting an already-filled cell is allowed while the user is
    /// under quota and leaves the sample count unchanged. Once the user's
    /// column holds [`MAX_SAMPLES`] paths, any further write fails with
    /// `QuotaExceeded` and leaves the file on disk untouched.
    pub fn record_path(&self, user: &str, slot: usize, audio_path: &Path) -> Result<(), LedgerError> {
        self.ensure_initialized()?;
        let mut table = self.load()?;

        let column = table.ensure_user_column(user);
        if slot >= MAX_SAMPLES || table.count_in_column(column) >= MAX_SAMPLES {
            return Err(LedgerError::QuotaExceeded { user: user.to_string() });
        }

        let row = table.ensure_slot_row(&slot_label(slot));
        table.rows[row][column] = audio_path.display().to_string();
        self.store(&table)?;

        tracing::debug!(user, slot, path = %audio_path.display(), "ledger updated");
        Ok(())
    }

    /// Number of non-empty cells in the user's column. Zero when the user
    /// or the backing file is absent.
    pub fn count_for_user(&self, user: &str) -> Result<usize, LedgerError> {
        if !self.path.exists() {
            return Ok(0);
        }
        let table = self.load()?;
        Ok(table
            .user_column(user)
            .map(|column| table.count_in_column(column))
            .unwrap_or(0))
    }

    /// Path stored under (`user`, `slot`), if any.
    pub fn path_for(&self, user: &str, slot: usize) -> Result<Option<PathBuf>, LedgerError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let table = self.load()?;
        let Some(column) = table.user_column(user) else {
            return Ok(None);
        };
        let label = slot_label(slot);
        Ok(table
            .rows
            .iter()
            .find(|row| row[0] == label)
            .map(|row| row[column].clone())
            .filter(|cell| !cell.is_empty())
            .map(PathBuf::from))
    }

    fn load(&self) -> Result<Table, LedgerError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)?;

        let mut records = reader.records();
        let header: Vec<String> = match records.next() {
            Some(record) => record?.iter().map(str::to_string).collect(),
            // File exists but is empty: treat as freshly initialized.
            None => return Ok(Table::empty()),
        };

        if header.first().map(String::as_str) != Some(SLOT_COLUMN) {
            return Err(LedgerError::Malformed {
                path: self.path.clone(),
                reason: format!("first column must be \"{}\"", SLOT_COLUMN),
            });
        }

        let width = header.len();
        let mut rows = Vec::new();
        for record in records {
            let mut row: Vec<String> = record?.iter().map(str::to_string).collect();
            if row.len() > width {
                return Err(LedgerError::Malformed {
                    path: self.path.clone(),
                    reason: format!("row has {} cells but header has {}", row.len(), width),
                });
            }
            // Tolerate ragged growth: pad short rows to header width.
            row.resize(width, String::new());
            rows.push(row);
        }

        Ok(Table { header, rows })
    }

    fn store(&self, table: &Table) -> Result<(), LedgerError> {
        let mut writer = csv::WriterBuilder::new().from_path(&self.path)?;
        writer.write_record(&table.header)?;
        for row in &table.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}
