use anyhow::{Context, Result};
use rusqlite::{types::ValueRef, Connection, OpenFlags};

/// Receives a query result as it is read
pub trait RowSink {
    fn columns(&mut self, names: &[String]);
    fn row(&mut self, values: &[String]);
}

pub trait RelationalDriver {
    /// Open `connection_string`, run `query` and stream the result into `sink`
    ///
    /// The connection is released before this returns, on success and on
    /// error alike. Rows delivered before a failure stay delivered.
    fn execute(&self, connection_string: &str, query: &str, sink: &mut dyn RowSink) -> Result<()>;
}

/// SQLite driver; the connection string is a database path or URI
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDriver;

impl SqliteDriver {
    pub fn new() -> Self {
        SqliteDriver
    }

    fn open(connection_string: &str) -> Result<Connection> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI;
        Connection::open_with_flags(connection_string, flags)
            .with_context(|| format!("Failed to open database {}", connection_string))
    }

    fn coerce(value: ValueRef<'_>) -> String {
        match value {
            ValueRef::Null => String::new(),
            ValueRef::Integer(i) => i.to_string(),
            ValueRef::Real(f) => f.to_string(),
            ValueRef::Text(t) => String::from_utf8_lossy(t).to_string(),
            ValueRef::Blob(b) => String::from_utf8_lossy(b).to_string(),
        }
    }
}

impl RelationalDriver for SqliteDriver {
    fn execute(&self, connection_string: &str, query: &str, sink: &mut dyn RowSink) -> Result<()> {
        let conn = Self::open(connection_string)?;
        let mut stmt = conn.prepare(query).context("Failed to prepare query")?;

        let columns: Vec<String> = stmt.column_names().into_iter().map(str::to_string).collect();
        sink.columns(&columns);

        let mut rows = stmt.query([]).context("Failed to execute query")?;
        let mut values = Vec::with_capacity(columns.len());
        while let Some(row) = rows.next().context("Failed to read row")? {
            values.clear();
            for index in 0..columns.len() {
                values.push(Self::coerce(row.get_ref(index)?));
            }
            sink.row(&values);
        }

        Ok(())
    }
}
