use anyhow::Result;
use tracing::{error, info};

use super::RenderPass;
use crate::api::{parse_feed, FeedFetcher};
use crate::fields::FieldResolver;
use crate::logic::errors::{classify_error, format_error_message};
use crate::logic::filters::{fields_or_default, SourceKind};
use crate::model::{FeedEntry, Record};

fn load_entries(fetcher: &dyn FeedFetcher, url: &str) -> Result<Vec<FeedEntry>> {
    let xml = fetcher.fetch(url)?;
    parse_feed(&xml)
}

/// Render the `<item>` entries of the feed at the data source URL
pub fn render(pass: &RenderPass, fetcher: &dyn FeedFetcher, resolver: &FieldResolver<'_>) -> String {
    let entries = match load_entries(fetcher, &pass.data_source) {
        Ok(entries) => entries,
        Err(e) => {
            error!(
                operation = "render_feed",
                data_source = %pass.data_source,
                error_type = classify_error(&e).as_str(),
                "{}",
                format_error_message(&e)
            );
            return String::new();
        }
    };

    let fields = fields_or_default(pass.fields.clone(), SourceKind::Feed);
    let records: Vec<Record> = entries.iter().map(Record::Feed).collect();
    let output = pass.template.render_list(&records, &fields, resolver, false);

    info!(data_source = %pass.data_source, entries = entries.len(), "render_feed");
    output
}
