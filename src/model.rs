//! Record types
//!
//! Every rendered entry is one of three shapes: an item from the content
//! tree, a row from a relational query, or an `<item>` element from a feed.
//! `Record` is the closed union the field resolver dispatches on.

use serde::Deserialize;
use std::collections::BTreeMap;

/// Typed value of a content item field
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    /// Link to another item by id, resolved through the link resolver
    InternalLink(String),
    /// Literal URL
    ExternalLink(String),
    /// Media library reference, `None` when the media item is missing
    Image(Option<String>),
}

impl FieldValue {
    /// Raw stored value: text, link target id or URL, media id
    pub fn raw(&self) -> &str {
        match self {
            FieldValue::Text(text) => text,
            FieldValue::InternalLink(id) => id,
            FieldValue::ExternalLink(url) => url,
            FieldValue::Image(media) => media.as_deref().unwrap_or(""),
        }
    }
}

/// A node in the content tree
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub template_id: String,
    pub template_name: String,
    /// Explicit navigable URL, overriding the derived one
    pub url: Option<String>,
    pub fields: BTreeMap<String, FieldValue>,
    pub parent: Option<String>,
    pub children: Vec<String>,
}

impl Item {
    /// Lower-cased name, used to detect the `content` root
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Raw text of a field, empty when the field is absent
    pub fn raw_field(&self, name: &str) -> &str {
        self.field(name).map(FieldValue::raw).unwrap_or("")
    }
}

/// One row of a query result, values already coerced to strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRow {
    pub columns: Vec<String>,
    pub values: Vec<String>,
}

impl QueryRow {
    /// Value by ordinal (`"2"`) or by column name
    pub fn get(&self, field: &str) -> Option<&str> {
        let ordinal = field
            .parse::<usize>()
            .ok()
            .or_else(|| self.columns.iter().position(|c| c == field))?;
        self.values.get(ordinal).map(String::as_str)
    }
}

/// A direct child element of a feed `<item>`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedElement {
    pub name: String,
    pub text: String,
    pub attributes: BTreeMap<String, String>,
}

/// One `<item>` of a feed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEntry {
    pub elements: Vec<FeedElement>,
}

impl FeedEntry {
    /// First direct child element with this name
    pub fn element(&self, name: &str) -> Option<&FeedElement> {
        self.elements.iter().find(|e| e.name == name)
    }
}

/// The record union the template engine iterates over
#[derive(Debug, Clone, Copy)]
pub enum Record<'a> {
    Tree(&'a Item),
    Row(&'a QueryRow),
    Feed(&'a FeedEntry),
}
