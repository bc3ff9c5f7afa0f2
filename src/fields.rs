//! Field resolution
//!
//! Turns one field of one record into display text. Every lookup is isolated:
//! a failure is logged and degrades to an empty string.

use anyhow::{anyhow, Result};
use tracing::{debug, error};

use crate::logic::errors::{classify_error, format_error_message};
use crate::model::{FeedEntry, FieldValue, Item, QueryRow, Record};
use crate::store::{ContentStore, LinkResolver, MediaResolver};

pub const DISPLAY_NAME_FIELD: &str = "DisplayName";
pub const ENCLOSURE_ELEMENT: &str = "enclosure";

#[derive(Clone, Copy)]
pub struct FieldResolver<'a> {
    store: &'a dyn ContentStore,
    links: &'a dyn LinkResolver,
    media: &'a dyn MediaResolver,
}

impl<'a> FieldResolver<'a> {
    pub fn new(
        store: &'a dyn ContentStore,
        links: &'a dyn LinkResolver,
        media: &'a dyn MediaResolver,
    ) -> Self {
        Self { store, links, media }
    }

    /// Display text of `field` on `record`, empty on any failure
    pub fn resolve_field(&self, record: Record<'_>, field: &str) -> String {
        let result = match record {
            Record::Tree(item) => self.tree_field(item, field),
            Record::Row(row) => Ok(row_field(row, field)),
            Record::Feed(entry) => Ok(feed_field(entry, field)),
        };

        match result {
            Ok(value) => {
                debug!(operation = "resolve_field", field, value = %value, "resolved");
                value
            }
            Err(e) => {
                error!(
                    operation = "resolve_field",
                    field,
                    error_type = classify_error(&e).as_str(),
                    "{}",
                    format_error_message(&e)
                );
                String::new()
            }
        }
    }

    /// Resolve every field in order
    pub fn resolve_all(&self, record: Record<'_>, fields: &[String]) -> Vec<String> {
        fields.iter().map(|f| self.resolve_field(record, f)).collect()
    }

    /// Navigable URL for tree records; other sources have none
    pub fn navigable_url(&self, record: Record<'_>) -> Option<String> {
        match record {
            Record::Tree(item) => Some(self.links.item_url(item)),
            _ => None,
        }
    }

    fn tree_field(&self, item: &Item, field: &str) -> Result<String> {
        if field == DISPLAY_NAME_FIELD {
            return Ok(item.display_name.clone());
        }

        match item.field(field) {
            None => Ok(String::new()),
            Some(FieldValue::Text(text)) => Ok(text.clone()),
            Some(FieldValue::ExternalLink(url)) => Ok(url.clone()),
            Some(FieldValue::InternalLink(target)) => {
                let target_item = self
                    .store
                    .item(target)
                    .ok_or_else(|| anyhow!("Link target '{}' of item '{}' not found", target, item.id))?;
                Ok(self.links.item_url(target_item))
            }
            Some(FieldValue::Image(Some(media_id))) => Ok(self.media.media_url(media_id)),
            Some(FieldValue::Image(None)) => Ok(String::new()),
        }
    }
}

fn row_field(row: &QueryRow, field: &str) -> String {
    row.get(field).unwrap_or("").to_string()
}

fn feed_field(entry: &FeedEntry, field: &str) -> String {
    let Some(element) = entry.element(field) else {
        return String::new();
    };

    if field == ENCLOSURE_ELEMENT {
        return element.attributes.get("url").cloned().unwrap_or_default();
    }
    element.text.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FeedElement;
    use crate::store::MemoryStore;
    use std::collections::BTreeMap;

    const SITE: &str = r#"
items:
  - id: content
    name: Content
    children:
      - id: home
        name: Home
        display_name: Welcome
        fields:
          Title: Home page
          Partner:
            external_link: https://partner.example
          Next:
            internal_link: news
          Broken:
            internal_link: gone
          Hero:
            image: hero-image
          Missing image:
            image: ~
        children:
          - id: news
            name: News
"#;

    fn resolve(store: &MemoryStore, id: &str, field: &str) -> String {
        let resolver = FieldResolver::new(store, store, store);
        resolver.resolve_field(Record::Tree(store.item(id).unwrap()), field)
    }

    #[test]
    fn test_tree_display_name() {
        let store = MemoryStore::from_yaml(SITE).unwrap();
        assert_eq!(resolve(&store, "home", "DisplayName"), "Welcome");
    }

    #[test]
    fn test_tree_text_and_missing() {
        let store = MemoryStore::from_yaml(SITE).unwrap();
        assert_eq!(resolve(&store, "home", "Title"), "Home page");
        assert_eq!(resolve(&store, "home", "Nope"), "");
    }

    #[test]
    fn test_tree_links() {
        let store = MemoryStore::from_yaml(SITE).unwrap();
        assert_eq!(resolve(&store, "home", "Partner"), "https://partner.example");
        assert_eq!(resolve(&store, "home", "Next"), "/news");
        // Dangling internal link degrades to empty
        assert_eq!(resolve(&store, "home", "Broken"), "");
    }

    #[test]
    fn test_tree_images() {
        let store = MemoryStore::from_yaml(SITE).unwrap();
        assert_eq!(resolve(&store, "home", "Hero"), "/-/media/hero-image");
        assert_eq!(resolve(&store, "home", "Missing image"), "");
    }

    #[test]
    fn test_row_fields() {
        let store = MemoryStore::default();
        let resolver = FieldResolver::new(&store, &store, &store);
        let row = QueryRow {
            columns: vec!["Name".to_string()],
            values: vec!["Ada".to_string()],
        };
        assert_eq!(resolver.resolve_field(Record::Row(&row), "Name"), "Ada");
        assert_eq!(resolver.resolve_field(Record::Row(&row), "0"), "Ada");
        assert_eq!(resolver.resolve_field(Record::Row(&row), "5"), "");
        assert_eq!(resolver.navigable_url(Record::Row(&row)), None);
    }

    #[test]
    fn test_feed_fields() {
        let store = MemoryStore::default();
        let resolver = FieldResolver::new(&store, &store, &store);
        let entry = FeedEntry {
            elements: vec![
                FeedElement {
                    name: "title".to_string(),
                    text: "T".to_string(),
                    attributes: BTreeMap::new(),
                },
                FeedElement {
                    name: "enclosure".to_string(),
                    text: "ignored".to_string(),
                    attributes: BTreeMap::from([("url".to_string(), "https://x/a.mp3".to_string())]),
                },
            ],
        };
        let fields = vec!["title".to_string(), "link".to_string(), "enclosure".to_string()];
        assert_eq!(
            resolver.resolve_all(Record::Feed(&entry), &fields),
            vec!["T", "", "https://x/a.mp3"]
        );
    }

    #[test]
    fn test_feed_enclosure_without_url() {
        let store = MemoryStore::default();
        let resolver = FieldResolver::new(&store, &store, &store);
        let entry = FeedEntry {
            elements: vec![FeedElement {
                name: "enclosure".to_string(),
                ..Default::default()
            }],
        };
        assert_eq!(resolver.resolve_field(Record::Feed(&entry), "enclosure"), "");
    }
}
