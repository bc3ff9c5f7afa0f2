use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Prefix every settings key is looked up under
pub const CONFIG_KEY: &str = "ListRenderer";

pub const DEFAULT_BREADCRUMB_DATA_SOURCE: &str = "{5F7C869E-C630-4027-B0FF-407275D7F1B8}";
pub const DEFAULT_DATA_TOKEN: &str = "{Data}";
pub const DEFAULT_ITEM_FORMAT: &str = "<li id=\"{1}\">{0}</li>";
pub const DEFAULT_DATA_SOURCE_TEMPLATE_ID: &str = "{F997B3CF-6CDE-404D-9921-8A3A8B70C9F6}";

pub trait SettingsStore {
    fn get_setting(&self, key: &str, default: &str) -> String;
}

/// Flat `key: value` settings file
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct YamlSettings {
    values: HashMap<String, String>,
}

impl YamlSettings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings {}", path.display()))?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).context("Failed to parse settings")
    }
}

impl SettingsStore for YamlSettings {
    fn get_setting(&self, key: &str, default: &str) -> String {
        self.values.get(key).cloned().unwrap_or_else(|| default.to_string())
    }
}

/// Parameter key names and literal defaults, read once per renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSettings {
    pub fields_key: String,
    pub templates_excluded_key: String,
    pub templates_included_key: String,
    pub list_format_key: String,
    pub item_format_key: String,
    pub separator_key: String,
    pub other_text_key: String,
    pub breadcrumb_data_source: String,
    pub data_token: String,
    pub item_format_default: String,
    pub data_source_template_id: String,
    /// Use the item format when no separator is configured
    pub separator_falls_back_to_item_format: bool,
}

impl RenderSettings {
    pub fn from_store(store: &dyn SettingsStore) -> Self {
        let get = |name: &str, default: &str| get_setting(store, name, default);

        Self {
            fields_key: get("FieldsPropertyKey", "Fields"),
            templates_excluded_key: get("TemplatesExcludedPropertyKey", "Templates Excluded"),
            templates_included_key: get("TemplatesIncludedPropertyKey", "Templates Included"),
            list_format_key: get("ListFormatPropertyKey", "List Format"),
            item_format_key: get("ItemFormatPropertyKey", "Item Format"),
            separator_key: get("SeparatorPropertyKey", "Separator"),
            other_text_key: get("OtherTextPropertyKey", "Other Text"),
            breadcrumb_data_source: get("BreadcrumbDataSourceKey", DEFAULT_BREADCRUMB_DATA_SOURCE),
            data_token: get("DataFormatTokenKey", DEFAULT_DATA_TOKEN),
            item_format_default: get("ItemFormatDefault", DEFAULT_ITEM_FORMAT),
            data_source_template_id: get("DataSourceTemplateId", DEFAULT_DATA_SOURCE_TEMPLATE_ID),
            separator_falls_back_to_item_format: get("SeparatorFallsBackToItemFormat", "0") == "1",
        }
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self::from_store(&YamlSettings::default())
    }
}

fn get_setting(store: &dyn SettingsStore, name: &str, default: &str) -> String {
    let key = format!("{}.{}", CONFIG_KEY, name);
    debug!(key = %key, default, "get_setting: started");
    let value = store.get_setting(&key, default);
    info!(key = %key, value = %value, "get_setting");
    value
}

/// Rendering parameters parsed from a URL-encoded blob
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    values: HashMap<String, String>,
}

impl Parameters {
    /// Parse `key=value&key=value`; `+` decodes to a space and repeated keys
    /// are joined with `,`
    ///
    /// # Examples
    /// ```
    /// use listrender::config::Parameters;
    ///
    /// let params = Parameters::parse("id=nav&Item%20Format=%3Cli%3E%7B0%7D%3C%2Fli%3E&Fields=Title&Fields=Url");
    /// assert_eq!(params.get("id"), Some("nav"));
    /// assert_eq!(params.get("Item Format"), Some("<li>{0}</li>"));
    /// assert_eq!(params.get("Fields"), Some("Title,Url"));
    /// ```
    pub fn parse(blob: &str) -> Self {
        let mut values: HashMap<String, String> = HashMap::new();

        for pair in blob.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = decode(key);
            let value = decode(value);
            values
                .entry(key)
                .and_modify(|existing| {
                    existing.push(',');
                    existing.push_str(&value);
                })
                .or_insert(value);
        }

        Self { values }
    }

    /// Value for `key`, treating empty values as absent
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}
