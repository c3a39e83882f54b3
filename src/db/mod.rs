//! CSV-backed tabular store.
//!
//! Each registered table lives in `<data_dir>/<name>.csv`: a header row with
//! the schema columns followed by data rows in the same order. Destructive
//! writes go through a temp file in the same directory that is fsynced and
//! then renamed over the table file, so readers only ever see a complete
//! file. Every operation holds the table's lock for its duration, which
//! serialises read-modify-write cycles within this process.

pub mod row;
pub mod tables;

pub use row::Row;
pub use tables::{TableSchema, TABLES};

use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use uuid::Uuid;

/// Store error type
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to replace table file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Handle to the table files under one data directory (cheap to clone)
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    data_dir: PathBuf,
    locks: HashMap<&'static str, Mutex<()>>,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("data_dir", &self.inner.data_dir)
            .finish()
    }
}

/// Open the store rooted at `path`, creating the directory if needed
pub fn open_store(path: impl AsRef<Path>) -> StoreResult<Store> {
    let path = path.as_ref();
    tracing::info!("Opening data directory at: {:?}", path);

    fs::create_dir_all(path).map_err(|e| {
        tracing::error!("Failed to create data directory: {}", e);
        e
    })?;

    Ok(Store::new(path))
}

/// Fresh row identifier: a random (v4) UUID in canonical hyphenated form
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

impl Store {
    /// Build a store over `data_dir` without touching the filesystem
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let locks = TABLES
            .iter()
            .map(|table| (table.name, Mutex::new(())))
            .collect();

        Self {
            inner: Arc::new(StoreInner {
                data_dir: data_dir.into(),
                locks,
            }),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.inner.data_dir
    }

    /// Location of a table's backing file
    pub fn table_path(&self, name: &str) -> StoreResult<PathBuf> {
        let schema = lookup(name)?;
        Ok(self.inner.data_dir.join(schema.file_name()))
    }

    /// All rows of `name`, in file order
    pub fn read_table(&self, name: &str) -> StoreResult<Vec<Row>> {
        let table = self.open_table(name)?;
        table.read()
    }

    /// Replace the table's contents with exactly `rows`
    pub fn write_table(&self, name: &str, rows: &[Row]) -> StoreResult<()> {
        let table = self.open_table(name)?;
        table.write(rows)
    }

    /// Append one row without rewriting existing content.
    ///
    /// Tables with an `id` column get a generated id when the row has none.
    /// Returns the row as written.
    pub fn append_row(&self, name: &str, row: Row) -> StoreResult<Row> {
        let table = self.open_table(name)?;
        table.ensure_header()?;

        let mut row = row.project(table.schema.columns);
        if table.schema.has_column("id") && row.value("id").is_empty() {
            row.set("id", generate_id());
        }

        let mut file = OpenOptions::new().read(true).append(true).open(&table.path)?;
        terminate_last_record(&mut file)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(row.iter().map(|(_, value)| value))?;
        writer.flush()?;

        Ok(row)
    }

    /// Overwrite the schema columns in `updates` on the first row whose
    /// `id_field` equals `id_value`. Returns false when no row matches.
    pub fn update_row(
        &self,
        name: &str,
        id_field: &str,
        id_value: impl fmt::Display,
        updates: &Row,
    ) -> StoreResult<bool> {
        let table = self.open_table(name)?;
        let id_value = id_value.to_string();

        let mut rows = table.read()?;
        let Some(target) = rows.iter_mut().find(|row| row.value(id_field) == id_value) else {
            return Ok(false);
        };

        for (column, value) in updates.iter() {
            if table.schema.has_column(column) {
                target.set(column, value);
            }
        }

        table.write(&rows)?;
        Ok(true)
    }

    /// Remove the first row whose `id_field` equals `id_value`.
    /// Returns false (and leaves the file untouched) when none matches.
    pub fn delete_row(
        &self,
        name: &str,
        id_field: &str,
        id_value: impl fmt::Display,
    ) -> StoreResult<bool> {
        let table = self.open_table(name)?;
        let id_value = id_value.to_string();

        let mut rows = table.read()?;
        let Some(index) = rows.iter().position(|row| row.value(id_field) == id_value) else {
            return Ok(false);
        };

        rows.remove(index);
        table.write(&rows)?;
        Ok(true)
    }

    /// Remove every row matching `predicate` in a single rewrite
    pub fn delete_where<F>(&self, name: &str, mut predicate: F) -> StoreResult<usize>
    where
        F: FnMut(&Row) -> bool,
    {
        let table = self.open_table(name)?;

        let mut rows = table.read()?;
        let before = rows.len();
        rows.retain(|row| !predicate(row));
        let removed = before - rows.len();

        if removed > 0 {
            table.write(&rows)?;
        }
        Ok(removed)
    }

    /// Read, mutate and rewrite a table without another writer interleaving
    pub fn modify_table<T, F>(&self, name: &str, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Vec<Row>) -> T,
    {
        let table = self.open_table(name)?;

        let mut rows = table.read()?;
        let result = f(&mut rows);
        table.write(&rows)?;
        Ok(result)
    }

    /// Rows whose `user_id` equals `owner_id`, in file order
    pub fn get_by_owner(&self, name: &str, owner_id: &str) -> StoreResult<Vec<Row>> {
        let mut rows = self.read_table(name)?;
        rows.retain(|row| row.get("user_id") == Some(owner_id));
        Ok(rows)
    }

    fn open_table(&self, name: &str) -> StoreResult<OpenTable<'_>> {
        let schema = lookup(name)?;
        let guard = self
            .inner
            .locks
            .get(schema.name)
            .ok_or_else(|| StoreError::UnknownTable(name.to_string()))?
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        Ok(OpenTable {
            schema,
            path: self.inner.data_dir.join(schema.file_name()),
            dir: &self.inner.data_dir,
            _guard: guard,
        })
    }
}

fn lookup(name: &str) -> StoreResult<&'static TableSchema> {
    tables::schema(name).ok_or_else(|| StoreError::UnknownTable(name.to_string()))
}

/// A table whose lock is held for as long as this value lives
struct OpenTable<'a> {
    schema: &'static TableSchema,
    path: PathBuf,
    dir: &'a Path,
    _guard: MutexGuard<'a, ()>,
}

impl OpenTable<'_> {
    /// Write just the header if the file is absent or empty
    fn ensure_header(&self) -> StoreResult<()> {
        let empty = match fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => return Err(e.into()),
        };

        if empty {
            tracing::debug!("Initializing table {}", self.schema.name);
            self.write(&[])?;
        }
        Ok(())
    }

    fn read(&self) -> StoreResult<Vec<Row>> {
        self.ensure_header()?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let row: Row = self
                .schema
                .columns
                .iter()
                .enumerate()
                .map(|(i, column)| (*column, record.get(i).unwrap_or("")))
                .collect();

            if row.has_data() {
                rows.push(row);
            }
        }
        Ok(rows)
    }

    fn write(&self, rows: &[Row]) -> StoreResult<()> {
        let columns = self.schema.columns;
        replace_file(self.dir, &self.path, self.schema.name, |writer| {
            writer.write_record(columns)?;
            for row in rows {
                writer.write_record(columns.iter().map(|column| row.value(column)))?;
            }
            Ok(())
        })?;

        tracing::debug!("Rewrote table {} ({} rows)", self.schema.name, rows.len());
        Ok(())
    }
}

/// Make sure the file ends with a record terminator before appending.
///
/// Files edited by hand often lose their trailing newline; without this the
/// next record would be glued onto the last field.
fn terminate_last_record(file: &mut File) -> StoreResult<()> {
    if file.metadata()?.len() == 0 {
        return Ok(());
    }

    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    if last[0] != b'\n' {
        file.write_all(b"\n")?;
    }
    Ok(())
}

/// Fill a temp file next to `path` via `fill`, then rename it over `path`.
///
/// If `fill` or any step before the rename fails, the temp file is removed
/// and `path` keeps its previous contents.
fn replace_file<F>(dir: &Path, path: &Path, table: &str, fill: F) -> StoreResult<()>
where
    F: FnOnce(&mut csv::Writer<&mut File>) -> StoreResult<()>,
{
    fs::create_dir_all(dir)?;

    let mut tmp = tempfile::Builder::new()
        .prefix(&format!(".{table}."))
        .suffix(".tmp")
        .tempfile_in(dir)?;

    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(tmp.as_file_mut());
        fill(&mut writer)?;
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;

    tmp.persist(path).map_err(|e| {
        tracing::error!("Failed to replace {:?}: {}", path, e.error);
        e
    })?;

    sync_dir(dir);
    Ok(())
}

#[cfg(unix)]
fn sync_dir(dir: &Path) {
    // Best effort; the rename itself is already atomic.
    if let Ok(handle) = File::open(dir) {
        let _ = handle.sync_all();
    }
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) {}
