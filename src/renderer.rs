//! Render orchestration
//!
//! `Renderer` resolves the parameters of one request into a `RenderPass`,
//! picks the adapter for the data source and returns the markup. It never
//! fails: anything that goes wrong is logged and yields empty output.

use tracing::{debug, info};

use crate::api::FeedFetcher;
use crate::config::{Parameters, RenderSettings};
use crate::db::RelationalDriver;
use crate::fields::FieldResolver;
use crate::logic::filters::{split_list, TemplateFilter};
use crate::logic::tokens::TokenContext;
use crate::model::Item;
use crate::sources::{feed, query, tree, RenderPass};
use crate::store::{ContentStore, LinkResolver, MediaResolver};
use crate::template::{normalize_list_format, ListTemplate};

const CONTROL_ID_KEY: &str = "id";

/// External services a render pass reads from
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub store: &'a dyn ContentStore,
    pub links: &'a dyn LinkResolver,
    pub media: &'a dyn MediaResolver,
    pub driver: &'a dyn RelationalDriver,
    pub feeds: &'a dyn FeedFetcher,
}

/// What the hosting page supplies for one list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderRequest {
    /// Host-assigned instance id, for logging
    pub unique_id: String,
    /// URL-encoded parameter blob
    pub parameters: String,
    pub data_source: String,
    pub css_class: String,
}

/// Which adapter a data source selects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    Feed,
    Query,
    Tree,
}

pub struct Renderer<'a> {
    settings: RenderSettings,
    host: Collaborators<'a>,
}

impl<'a> Renderer<'a> {
    pub fn new(settings: RenderSettings, host: Collaborators<'a>) -> Self {
        Self { settings, host }
    }

    /// Render one list; empty output on any failure
    pub fn render(&self, request: &RenderRequest) -> String {
        debug!(unique_id = %request.unique_id, "render: started");

        let pass = self.prepare(request);
        let resolver = FieldResolver::new(self.host.store, self.host.links, self.host.media);

        let output = match self.mode(&pass.data_source) {
            (SourceMode::Feed, _) => feed::render(&pass, self.host.feeds, &resolver),
            (SourceMode::Query, Some(acting)) => {
                query::render(&pass, acting, self.host.store, self.host.driver, &resolver)
            }
            (_, acting) => tree::render(&pass, acting, self.host.store, self.host.links, &resolver),
        };

        info!(
            unique_id = %request.unique_id,
            parameters = %request.parameters,
            "render: {} bytes",
            output.len()
        );
        output
    }

    /// Resolve parameters and templates for one request
    pub fn prepare(&self, request: &RenderRequest) -> RenderPass {
        let settings = &self.settings;
        let params = Parameters::parse(&request.parameters);
        let tokens = TokenContext::new(
            params.get(CONTROL_ID_KEY).unwrap_or(""),
            request.css_class.as_str(),
        );

        let item_format = tokens.substitute_tokens(
            params
                .get(&settings.item_format_key)
                .unwrap_or(settings.item_format_default.as_str()),
        );
        let separator = match params.get(&settings.separator_key) {
            Some(separator) => tokens.substitute_tokens(separator),
            None if settings.separator_falls_back_to_item_format => item_format.clone(),
            None => String::new(),
        };
        let list_format = normalize_list_format(
            params.get(&settings.list_format_key),
            &tokens,
            &settings.data_token,
        );

        RenderPass {
            data_source: request.data_source.clone(),
            fields: split_list(params.get(&settings.fields_key)),
            filter: TemplateFilter::new(
                split_list(params.get(&settings.templates_excluded_key)),
                split_list(params.get(&settings.templates_included_key)),
            ),
            template: ListTemplate {
                item_format,
                separator,
                list_format,
                data_token: settings.data_token.clone(),
            },
            other_text: params.get(&settings.other_text_key) == Some("1"),
            breadcrumb: !request.data_source.is_empty()
                && request.data_source == settings.breadcrumb_data_source,
            tokens,
        }
    }

    /// The item a non-feed data source resolves to
    ///
    /// Empty or breadcrumb data sources act on the context item; anything else
    /// is looked up in the store.
    pub fn acting_item(&self, data_source: &str) -> Option<&'a Item> {
        let item = if data_source.is_empty() || data_source == self.settings.breadcrumb_data_source {
            self.host.store.context_item()
        } else {
            self.host.store.item(data_source)
        };

        debug!(
            data_source,
            item = item.map(|i| i.id.as_str()).unwrap_or("null"),
            "acting_item"
        );
        item
    }

    fn mode(&self, data_source: &str) -> (SourceMode, Option<&'a Item>) {
        if data_source.starts_with("http") {
            return (SourceMode::Feed, None);
        }

        let acting = self.acting_item(data_source);
        match acting {
            Some(item) if item.template_id == self.settings.data_source_template_id => {
                (SourceMode::Query, acting)
            }
            _ => (SourceMode::Tree, acting),
        }
    }
}
