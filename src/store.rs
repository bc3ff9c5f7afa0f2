//! Content tree collaborators
//!
//! The renderer only sees the tree through `ContentStore`, `LinkResolver` and
//! `MediaResolver`. `MemoryStore` implements all three over a site description
//! loaded from YAML, which is what the CLI and the tests use.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::model::{FieldValue, Item};

pub trait ContentStore {
    /// The ambient item the page is being rendered for
    fn context_item(&self) -> Option<&Item>;

    /// Look up an item by id or full path
    fn item(&self, id: &str) -> Option<&Item>;

    fn children(&self, item: &Item) -> Vec<&Item> {
        item.children.iter().filter_map(|id| self.item(id)).collect()
    }

    fn parent(&self, item: &Item) -> Option<&Item> {
        item.parent.as_deref().and_then(|id| self.item(id))
    }
}

pub trait LinkResolver {
    /// Navigable URL of an item, empty if it cannot be reached
    fn item_url(&self, item: &Item) -> String;
}

pub trait MediaResolver {
    fn media_url(&self, media_id: &str) -> String;
}

const DEFAULT_MEDIA_PREFIX: &str = "/-/media";

#[derive(Debug, Deserialize)]
struct SiteFile {
    #[serde(default)]
    context: Option<String>,
    #[serde(default = "default_media_prefix")]
    media_prefix: String,
    #[serde(default)]
    items: Vec<ItemSpec>,
}

fn default_media_prefix() -> String {
    DEFAULT_MEDIA_PREFIX.to_string()
}

#[derive(Debug, Deserialize)]
struct ItemSpec {
    id: String,
    name: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    template: String,
    #[serde(default)]
    template_id: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    fields: BTreeMap<String, FieldSpec>,
    #[serde(default)]
    children: Vec<ItemSpec>,
}

/// Plain strings are text fields; typed fields use a single-key map
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FieldSpec {
    Plain(String),
    Typed(FieldValue),
}

impl From<FieldSpec> for FieldValue {
    fn from(spec: FieldSpec) -> Self {
        match spec {
            FieldSpec::Plain(text) => FieldValue::Text(text),
            FieldSpec::Typed(value) => value,
        }
    }
}

/// In-memory content tree
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: HashMap<String, Item>,
    paths: HashMap<String, String>,
    context: Option<String>,
    media_prefix: String,
}

impl MemoryStore {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read site file {}", path.display()))?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        let site: SiteFile = serde_yaml::from_str(text).context("Failed to parse site file")?;

        let mut store = MemoryStore {
            items: HashMap::new(),
            paths: HashMap::new(),
            context: site.context,
            media_prefix: site.media_prefix,
        };
        for spec in site.items {
            store.insert(spec, None, "")?;
        }

        if let Some(context) = &store.context {
            if !store.items.contains_key(context) {
                bail!("Context item '{}' is not in the site file", context);
            }
        }

        Ok(store)
    }

    /// Override the ambient context item
    pub fn set_context(&mut self, id: impl Into<String>) {
        self.context = Some(id.into());
    }

    fn insert(&mut self, spec: ItemSpec, parent: Option<&str>, parent_path: &str) -> Result<()> {
        if self.items.contains_key(&spec.id) {
            bail!("Duplicate item id '{}'", spec.id);
        }

        let path = format!("{}/{}", parent_path, spec.name.to_lowercase());
        let children: Vec<String> = spec.children.iter().map(|c| c.id.clone()).collect();
        let item = Item {
            id: spec.id.clone(),
            display_name: spec.display_name.unwrap_or_else(|| spec.name.clone()),
            name: spec.name,
            template_id: spec.template_id,
            template_name: spec.template,
            url: spec.url,
            fields: spec.fields.into_iter().map(|(k, v)| (k, v.into())).collect(),
            parent: parent.map(str::to_string),
            children,
        };

        self.paths.insert(path.clone(), spec.id.clone());
        self.items.insert(spec.id.clone(), item);

        for child in spec.children {
            self.insert(child, Some(&spec.id), &path)?;
        }
        Ok(())
    }
}

impl ContentStore for MemoryStore {
    fn context_item(&self) -> Option<&Item> {
        self.context.as_deref().and_then(|id| self.items.get(id))
    }

    fn item(&self, id: &str) -> Option<&Item> {
        self.items.get(id).or_else(|| {
            self.paths
                .get(&id.trim_end_matches('/').to_lowercase())
                .and_then(|id| self.items.get(id))
        })
    }
}

impl LinkResolver for MemoryStore {
    /// Explicit `url`, otherwise the lower-cased names below the site start
    /// item (the first item under `content`), spaces as dashes
    fn item_url(&self, item: &Item) -> String {
        if let Some(url) = &item.url {
            return url.clone();
        }

        let mut segments = Vec::new();
        let mut current = Some(item);
        while let Some(node) = current {
            if node.key() == "content" {
                // Drop the site start item
                segments.pop();
                segments.reverse();
                return format!("/{}", segments.join("/"));
            }
            segments.push(node.name.to_lowercase().replace(' ', "-"));
            current = self.parent(node);
        }

        String::new()
    }
}

impl MediaResolver for MemoryStore {
    fn media_url(&self, media_id: &str) -> String {
        format!("{}/{}", self.media_prefix.trim_end_matches('/'), media_id)
    }
}
