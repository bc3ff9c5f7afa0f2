use tracing::{debug, error};

use super::RenderPass;
use crate::fields::FieldResolver;
use crate::logic::filters::{fields_or_default, SourceKind, TemplateFilter};
use crate::logic::format::{format_positional, FormatError};
use crate::model::{Item, Record};
use crate::store::{ContentStore, LinkResolver};
use crate::template::LINK_TOKEN;

const TITLE_FIELD: &str = "Title";

/// Children of `parent` that are navigable, titled and allowed by `filter`
pub fn child_items<'s>(
    store: &'s dyn ContentStore,
    links: &dyn LinkResolver,
    parent: &Item,
    filter: &TemplateFilter,
) -> Vec<&'s Item> {
    store
        .children(parent)
        .into_iter()
        .filter(|child| {
            filter.allows_child(&child.template_name)
                && !links.item_url(child).is_empty()
                && !child.raw_field(TITLE_FIELD).is_empty()
        })
        .collect()
}

/// Ancestors of `current`, root first
///
/// The walk starts at the parent and stops at the `content` root, at the top
/// of the tree, or at the first ancestor `filter` rejects. A parent named
/// `Content` yields an empty path.
pub fn breadcrumb_path<'s>(
    store: &'s dyn ContentStore,
    current: &Item,
    filter: &TemplateFilter,
) -> Vec<&'s Item> {
    let mut path = Vec::new();
    let Some(mut ancestor) = store.parent(current) else {
        return path;
    };
    if ancestor.name == "Content" {
        return path;
    }

    while ancestor.key() != "content" && filter.allows_ancestor(&ancestor.template_name) {
        path.push(ancestor);
        match store.parent(ancestor) {
            Some(next) => ancestor = next,
            None => break,
        }
    }

    path.reverse();
    path
}

/// Render the child list, or the breadcrumb path in breadcrumb mode
pub fn render(
    pass: &RenderPass,
    acting: Option<&Item>,
    store: &dyn ContentStore,
    links: &dyn LinkResolver,
    resolver: &FieldResolver<'_>,
) -> String {
    let Some(acting) = acting else {
        debug!(data_source = %pass.data_source, "render_tree: no acting item");
        return String::new();
    };

    let fields = fields_or_default(pass.fields.clone(), SourceKind::Tree);
    let items = if pass.breadcrumb {
        breadcrumb_path(store, acting, &pass.filter)
    } else {
        child_items(store, links, acting, &pass.filter)
    };
    debug!(item = %acting.id, count = items.len(), breadcrumb = pass.breadcrumb, "render_tree");

    let records: Vec<Record> = items.into_iter().map(Record::Tree).collect();
    let mut body = pass
        .template
        .render_items(&records, &fields, resolver, pass.breadcrumb);

    if pass.other_text {
        match other_text_entry(&pass.template.item_format, &pass.tokens.control_id) {
            Ok(entry) => body.push_str(&entry),
            Err(e) => error!(operation = "other_text", "{}", e),
        }
    }

    if pass.breadcrumb {
        body.push_str(&resolver.resolve_field(Record::Tree(acting), TITLE_FIELD));
    }

    pass.template.wrap(&body)
}

/// Extra "Other" entry with a free-text input; it has no item, so `{Link}` is blank
fn other_text_entry(item_format: &str, control_id: &str) -> Result<String, FormatError> {
    let entry = format_positional(&item_format.replace(LINK_TOKEN, ""), &["Other", "Other"])?;
    Ok(entry.replace(
        "</li>",
        &format!("<br/><input type=\"text\" id=\"{}-other-text\"/></li>", control_id),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    const SITE: &str = r#"
context: page
items:
  - id: root
    name: sitecore
    template: Root
    children:
      - id: content
        name: content
        template: Main section
        children:
          - id: home
            name: Home
            template: Page
            fields:
              Title: Home
            children:
              - id: folder
                name: Folder
                template: Folder
                fields:
                  Title: Folder
                children:
                  - id: page
                    name: Page
                    template: Page
                    fields:
                      Title: Page
              - id: untitled
                name: Untitled
                template: Page
              - id: hidden
                name: Hidden
                template: Page
                url: ""
                fields:
                  Title: Hidden
"#;

    fn ids(items: &[&Item]) -> Vec<String> {
        items.iter().map(|i| i.id.clone()).collect()
    }

    #[test]
    fn test_child_items_require_url_and_title() {
        let store = MemoryStore::from_yaml(SITE).unwrap();
        let home = store.item("home").unwrap();
        let children = child_items(&store, &store, home, &TemplateFilter::default());
        assert_eq!(ids(&children), vec!["folder"]);
    }

    #[test]
    fn test_child_items_exclude_filter() {
        let store = MemoryStore::from_yaml(SITE).unwrap();
        let home = store.item("home").unwrap();
        let filter = TemplateFilter::new(vec!["Folder".to_string()], vec![]);
        assert!(child_items(&store, &store, home, &filter).is_empty());
    }

    #[test]
    fn test_breadcrumb_path_root_first() {
        let store = MemoryStore::from_yaml(SITE).unwrap();
        let page = store.item("page").unwrap();
        let path = breadcrumb_path(&store, page, &TemplateFilter::default());
        assert_eq!(ids(&path), vec!["home", "folder"]);
    }

    #[test]
    fn test_breadcrumb_stops_at_rejected_ancestor() {
        let store = MemoryStore::from_yaml(SITE).unwrap();
        let page = store.item("page").unwrap();
        let filter = TemplateFilter::new(vec!["Folder".to_string()], vec![]);
        assert!(breadcrumb_path(&store, page, &filter).is_empty());
    }

    #[test]
    fn test_breadcrumb_parent_named_content() {
        let yaml = "items:\n  - id: c\n    name: Content\n    children:\n      - id: h\n        name: Home\n";
        let store = MemoryStore::from_yaml(yaml).unwrap();
        let home = store.item("h").unwrap();
        assert!(breadcrumb_path(&store, home, &TemplateFilter::default()).is_empty());
    }

    #[test]
    fn test_breadcrumb_without_content_root_stops_at_top() {
        let yaml = "items:\n  - id: a\n    name: A\n    children:\n      - id: b\n        name: B\n        children:\n          - id: c\n            name: C\n";
        let store = MemoryStore::from_yaml(yaml).unwrap();
        let leaf = store.item("c").unwrap();
        assert_eq!(ids(&breadcrumb_path(&store, leaf, &TemplateFilter::default())), vec!["a", "b"]);
    }

    #[test]
    fn test_other_text_entry() {
        let entry = other_text_entry("<li id=\"{1}\">{0}</li>", "nav").unwrap();
        assert_eq!(
            entry,
            "<li id=\"Other\">Other<br/><input type=\"text\" id=\"nav-other-text\"/></li>"
        );
    }

    #[test]
    fn test_other_text_entry_with_link_token() {
        let entry = other_text_entry("<li><a href=\"{Link}\">{0}</a></li>", "nav").unwrap();
        assert_eq!(
            entry,
            "<li><a href=\"\">Other</a><br/><input type=\"text\" id=\"nav-other-text\"/></li>"
        );
    }
}
