//! Source adapters
//!
//! - tree: child lists and breadcrumb paths over the content tree
//! - query: rows of a relational query described by a data source item
//! - feed: `<item>` entries of a remote XML feed

pub mod feed;
pub mod query;
pub mod tree;

use crate::logic::filters::TemplateFilter;
use crate::logic::tokens::TokenContext;
use crate::template::ListTemplate;

/// Everything resolved from the parameters before any adapter runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPass {
    pub data_source: String,
    pub tokens: TokenContext,
    /// Fields as supplied; adapters inject their own defaults
    pub fields: Vec<String>,
    pub filter: TemplateFilter,
    pub template: ListTemplate,
    pub other_text: bool,
    pub breadcrumb: bool,
}
