use anyhow::{anyhow, Context, Result};
use tracing::{debug, error};

use super::RenderPass;
use crate::db::{RelationalDriver, RowSink};
use crate::fields::FieldResolver;
use crate::logic::errors::{classify_error, format_error_message};
use crate::logic::filters::{fields_or_default, SourceKind};
use crate::logic::format::format_positional;
use crate::model::{Item, QueryRow, Record};
use crate::store::ContentStore;

pub const FIELDS_TOKEN: &str = "{Fields}";
const ROW_LIMIT: &str = "TOP 50";
const CLAMPED_ROW_LIMIT: &str = "TOP 15";

/// Expand `{Fields}` and clamp the row limit
///
/// # Examples
/// ```
/// use listrender::sources::query::prepare_query;
///
/// let fields = vec!["Name".to_string(), "Age".to_string()];
/// assert_eq!(
///     prepare_query("SELECT TOP 50 {Fields} FROM People", &fields),
///     "SELECT TOP 15 Name,Age FROM People"
/// );
/// ```
pub fn prepare_query(query: &str, fields: &[String]) -> String {
    query
        .replace(FIELDS_TOKEN, &fields.join(","))
        .replace(ROW_LIMIT, CLAMPED_ROW_LIMIT)
}

/// Per-row template: one copy of the item format per column, inside `<tr>`
pub fn row_template(item_format: &str, column_count: usize) -> Result<String> {
    if column_count == 0 {
        return Ok(String::new());
    }

    let mut cells = String::new();
    for index in 0..column_count {
        let placeholder = format!("{{{}}}", index);
        cells.push_str(
            &format_positional(item_format, &[placeholder]).context("Failed to build row template")?,
        );
    }
    Ok(format!("<tr>{}</tr>", cells))
}

/// List format for tables; the default is a bare `<table>`
///
/// `{Fields}` expands to a header row built from the column names.
pub fn table_list_format(list_format: &str, data_token: &str, columns: &[String]) -> String {
    if list_format.is_empty() || list_format == data_token {
        return format!("<table>{}</table>", data_token);
    }
    if !list_format.contains(FIELDS_TOKEN) {
        return list_format.to_string();
    }

    let header: String = columns
        .iter()
        .map(|c| format!("<th style=\"vertical-align: top;\">{}</th>", c))
        .collect();
    list_format.replace(FIELDS_TOKEN, &format!("<tr>{}</tr>", header))
}

struct TableSink<'p, 'r> {
    pass: &'p RenderPass,
    resolver: &'p FieldResolver<'r>,
    columns: Vec<String>,
    ordinals: Vec<String>,
    row_format: Option<String>,
    template_error: Option<anyhow::Error>,
    pending_separator: Option<String>,
    body: String,
    rows: usize,
}

impl<'p, 'r> TableSink<'p, 'r> {
    fn new(pass: &'p RenderPass, resolver: &'p FieldResolver<'r>) -> Self {
        Self {
            pass,
            resolver,
            columns: Vec::new(),
            ordinals: Vec::new(),
            row_format: None,
            template_error: None,
            pending_separator: None,
            body: String::new(),
            rows: 0,
        }
    }

    fn format_row(&self, row_format: &str, values: &[String]) -> Result<(String, Option<String>)> {
        let markup = format_positional(row_format, values).context("Failed to format row")?;
        let separator = if self.pass.template.separator.is_empty() {
            None
        } else {
            Some(
                format_positional(&self.pass.template.separator, values)
                    .context("Failed to format separator")?,
            )
        };
        Ok((markup, separator))
    }
}

impl RowSink for TableSink<'_, '_> {
    fn columns(&mut self, names: &[String]) {
        self.columns = names.to_vec();
        self.ordinals = (0..names.len()).map(|i| i.to_string()).collect();
        match row_template(&self.pass.template.item_format, names.len()) {
            Ok(format) => self.row_format = Some(format),
            Err(e) => self.template_error = Some(e),
        }
    }

    fn row(&mut self, values: &[String]) {
        self.rows += 1;
        let Some(row_format) = self.row_format.as_deref() else {
            return;
        };

        let row = QueryRow {
            columns: self.columns.clone(),
            values: values.to_vec(),
        };
        let values = self.resolver.resolve_all(Record::Row(&row), &self.ordinals);

        match self.format_row(row_format, &values) {
            Ok((markup, separator)) => {
                if let Some(previous) = self.pending_separator.take() {
                    self.body.push_str(&previous);
                }
                self.body.push_str(&markup);
                self.pending_separator = separator;
            }
            Err(e) => log_failure("format_row", &e),
        }
    }
}

fn log_failure(operation: &str, e: &anyhow::Error) {
    error!(
        operation,
        error_type = classify_error(e).as_str(),
        "{}",
        format_error_message(e)
    );
}

/// Connection string and query text of a data source item
fn data_source_query(acting: &Item, store: &dyn ContentStore) -> Result<(String, String)> {
    let connection = acting.raw_field("Connection");
    let query = acting.raw_field("Query");
    if connection.is_empty() || query.is_empty() {
        return Err(anyhow!("Data source item '{}' lacks Connection or Query", acting.id));
    }

    let connection_item = store
        .item(connection)
        .ok_or_else(|| anyhow!("Connection item '{}' not found", connection))?;
    let connection_string = connection_item.raw_field("ConnectionString");
    if connection_string.is_empty() {
        return Err(anyhow!("Connection item '{}' has no ConnectionString", connection_item.id));
    }

    Ok((connection_string.to_string(), query.to_string()))
}

/// Render the rows of the query described by `acting` as table markup
///
/// A failure while executing keeps the rows already formatted, unwrapped.
pub fn render(
    pass: &RenderPass,
    acting: &Item,
    store: &dyn ContentStore,
    driver: &dyn RelationalDriver,
    resolver: &FieldResolver<'_>,
) -> String {
    let (connection_string, query) = match data_source_query(acting, store) {
        Ok(found) => found,
        Err(e) => {
            debug!(item = %acting.id, "render_query: {}", e);
            return String::new();
        }
    };

    let fields = fields_or_default(pass.fields.clone(), SourceKind::Query);
    let query = prepare_query(&query, &fields);
    debug!(item = %acting.id, query = %query, "render_query");

    let mut sink = TableSink::new(pass, resolver);
    if let Err(e) = driver.execute(&connection_string, &query, &mut sink) {
        log_failure("execute_query", &e);
        return sink.body;
    }
    if let Some(e) = &sink.template_error {
        log_failure("row_template", e);
        return sink.body;
    }
    debug!(item = %acting.id, rows = sink.rows, "render_query: done");

    if sink.body.is_empty() {
        return String::new();
    }
    let list_format = table_list_format(&pass.template.list_format, &pass.template.data_token, &sink.columns);
    list_format.replace(&pass.template.data_token, &sink.body)
}
