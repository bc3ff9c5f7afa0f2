//! Template-name filtering and field list defaults

/// Source a field list is resolved for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Tree,
    Query,
    Feed,
}

/// Split a comma-separated parameter into its entries
///
/// An empty value yields an empty list; entries are kept verbatim.
pub fn split_list(value: Option<&str>) -> Vec<String> {
    match value {
        Some(v) if !v.is_empty() => v.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

/// Field list to resolve, falling back to the per-source default when empty
///
/// # Examples
/// ```
/// use listrender::logic::filters::{fields_or_default, SourceKind};
///
/// assert_eq!(fields_or_default(vec![], SourceKind::Tree), vec!["DisplayName"]);
/// assert_eq!(fields_or_default(vec![], SourceKind::Query), vec!["*"]);
/// assert_eq!(fields_or_default(vec![], SourceKind::Feed), vec!["title", "link"]);
/// ```
pub fn fields_or_default(fields: Vec<String>, source: SourceKind) -> Vec<String> {
    if !fields.is_empty() {
        return fields;
    }

    let defaults: &[&str] = match source {
        SourceKind::Tree => &["DisplayName"],
        SourceKind::Query => &["*"],
        SourceKind::Feed => &["title", "link"],
    };
    defaults.iter().map(|f| f.to_string()).collect()
}

/// Include/exclude policy over template names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateFilter {
    pub excluded: Vec<String>,
    pub included: Vec<String>,
}

impl TemplateFilter {
    pub fn new(excluded: Vec<String>, included: Vec<String>) -> Self {
        Self { excluded, included }
    }

    /// Policy for child records
    ///
    /// A child passes when it is outside a non-empty exclude list, or inside a
    /// non-empty include list. With both lists empty every child passes.
    pub fn allows_child(&self, template_name: &str) -> bool {
        if self.excluded.is_empty() && self.included.is_empty() {
            return true;
        }

        let excluded_ok = !self.excluded.is_empty() && !self.contains(&self.excluded, template_name);
        let included_ok = !self.included.is_empty() && self.contains(&self.included, template_name);
        excluded_ok || included_ok
    }

    /// Policy for breadcrumb ancestors
    ///
    /// An ancestor passes when it is outside the exclude list (if any) and
    /// inside the include list (if any).
    pub fn allows_ancestor(&self, template_name: &str) -> bool {
        let excluded_ok = self.excluded.is_empty() || !self.contains(&self.excluded, template_name);
        let included_ok = self.included.is_empty() || self.contains(&self.included, template_name);
        excluded_ok && included_ok
    }

    fn contains(&self, list: &[String], template_name: &str) -> bool {
        list.iter().any(|t| t == template_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_split_list() {
        assert!(split_list(None).is_empty());
        assert!(split_list(Some("")).is_empty());
        assert_eq!(split_list(Some("Title,Url")), names(&["Title", "Url"]));
        // Entries are not trimmed
        assert_eq!(split_list(Some("Title, Url")), names(&["Title", " Url"]));
    }

    #[test]
    fn test_fields_or_default_keeps_supplied() {
        let fields = names(&["Title"]);
        assert_eq!(fields_or_default(fields.clone(), SourceKind::Feed), fields);
    }

    #[test]
    fn test_child_filter_both_empty_passes() {
        let filter = TemplateFilter::default();
        assert!(filter.allows_child("Page"));
    }

    #[test]
    fn test_child_filter_exclude_only() {
        let filter = TemplateFilter::new(names(&["Folder"]), vec![]);
        assert!(filter.allows_child("Page"));
        assert!(!filter.allows_child("Folder"));
    }

    #[test]
    fn test_child_filter_include_only() {
        let filter = TemplateFilter::new(vec![], names(&["Page"]));
        assert!(filter.allows_child("Page"));
        assert!(!filter.allows_child("Folder"));
    }

    #[test]
    fn test_child_filter_either_clause_admits() {
        // Not excluded is enough, even when absent from the include list
        let filter = TemplateFilter::new(names(&["Folder"]), names(&["Page"]));
        assert!(filter.allows_child("Article"));
        assert!(filter.allows_child("Page"));
        assert!(!filter.allows_child("Folder"));

        // Included wins over excluded
        let filter = TemplateFilter::new(names(&["Page"]), names(&["Page"]));
        assert!(filter.allows_child("Page"));
    }

    #[test]
    fn test_ancestor_filter() {
        let filter = TemplateFilter::default();
        assert!(filter.allows_ancestor("Anything"));

        let filter = TemplateFilter::new(names(&["Folder"]), vec![]);
        assert!(!filter.allows_ancestor("Folder"));
        assert!(filter.allows_ancestor("Page"));

        // Both clauses must hold for ancestors
        let filter = TemplateFilter::new(names(&["Folder"]), names(&["Page"]));
        assert!(!filter.allows_ancestor("Article"));
        assert!(filter.allows_ancestor("Page"));
    }
}
