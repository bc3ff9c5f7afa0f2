//! Template engine
//!
//! Builds list markup from three templates: the item format applied once per
//! record, the separator placed between records, and the list format that
//! wraps the whole body at the data token.

use anyhow::{Context, Result};
use tracing::error;

use crate::fields::FieldResolver;
use crate::logic::errors::{classify_error, format_error_message};
use crate::logic::format::format_positional;
use crate::logic::tokens::TokenContext;
use crate::model::Record;

pub const LINK_TOKEN: &str = "{Link}";

/// Normalise a list format so it always carries the data token
///
/// Named tokens are substituted, attributes left empty by that substitution
/// (` id=""`, ` class=""`) are dropped, and the data token is appended when
/// missing. An absent format becomes just the token.
///
/// # Examples
/// ```
/// use listrender::logic::tokens::TokenContext;
/// use listrender::template::normalize_list_format;
///
/// let tokens = TokenContext::new("nav", "");
/// assert_eq!(
///     normalize_list_format(Some("<ul id=\"{Id}\" class=\"{CssClass}\">"), &tokens, "{Data}"),
///     "<ul id=\"nav\">{Data}"
/// );
/// assert_eq!(normalize_list_format(None, &tokens, "{Data}"), "{Data}");
/// ```
pub fn normalize_list_format(raw: Option<&str>, tokens: &TokenContext, data_token: &str) -> String {
    let mut list_format = tokens
        .substitute_tokens(raw.unwrap_or(""))
        .replace(" id=\"\"", "")
        .replace(" class=\"\"", "");

    if !list_format.contains(data_token) {
        list_format.push_str(data_token);
    }
    list_format
}

/// The three templates of one render pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListTemplate {
    pub item_format: String,
    pub separator: String,
    pub list_format: String,
    pub data_token: String,
}

impl ListTemplate {
    /// Format every record, skipping (and logging) records that fail
    ///
    /// A record's separator is held back until the next record renders, so it
    /// only ever sits between rendered records. With `trailing_separator` the
    /// last rendered record keeps its separator too.
    pub fn render_items(
        &self,
        records: &[Record<'_>],
        fields: &[String],
        resolver: &FieldResolver<'_>,
        trailing_separator: bool,
    ) -> String {
        let mut body = String::new();
        let mut pending_separator = String::new();

        for (index, record) in records.iter().enumerate() {
            match self.render_record(*record, fields, resolver) {
                Ok((markup, separator)) => {
                    body.push_str(&pending_separator);
                    body.push_str(&markup);
                    pending_separator = separator;
                }
                Err(e) => {
                    error!(
                        operation = "render_record",
                        index,
                        error_type = classify_error(&e).as_str(),
                        "{}",
                        format_error_message(&e)
                    );
                }
            }
        }

        if trailing_separator {
            body.push_str(&pending_separator);
        }
        body
    }

    /// Item markup and its separator, formatted together so a bad separator
    /// drops the whole record
    fn render_record(
        &self,
        record: Record<'_>,
        fields: &[String],
        resolver: &FieldResolver<'_>,
    ) -> Result<(String, String)> {
        let values = resolver.resolve_all(record, fields);

        let mut item_format = self.item_format.clone();
        if item_format.contains(LINK_TOKEN) {
            if let Some(url) = resolver.navigable_url(record) {
                item_format = item_format.replace(LINK_TOKEN, &url);
            }
        }

        let markup = format_positional(&item_format, &values).context("Failed to format item")?;
        let separator = if self.separator.is_empty() {
            String::new()
        } else {
            format_positional(&self.separator, &values).context("Failed to format separator")?
        };

        Ok((markup, separator))
    }

    /// Place `body` into the list format; no content means no wrapper
    pub fn wrap(&self, body: &str) -> String {
        if body.is_empty() {
            return String::new();
        }
        self.list_format.replace(&self.data_token, body)
    }

    pub fn render_list(
        &self,
        records: &[Record<'_>],
        fields: &[String],
        resolver: &FieldResolver<'_>,
        trailing_separator: bool,
    ) -> String {
        self.wrap(&self.render_items(records, fields, resolver, trailing_separator))
    }
}
