//! Named token substitution
//!
//! Replaces the instance-level tokens `{Id}` and `{CssClass}` in any template
//! string. Substitution is literal and single-pass: substituted text is never
//! re-scanned, and unknown tokens are left untouched.

pub const ID_TOKEN: &str = "{Id}";
pub const CSS_CLASS_TOKEN: &str = "{CssClass}";

/// Values bound to the named tokens for one render pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenContext {
    pub control_id: String,
    pub css_class: String,
}

impl TokenContext {
    pub fn new(control_id: impl Into<String>, css_class: impl Into<String>) -> Self {
        Self {
            control_id: control_id.into(),
            css_class: css_class.into(),
        }
    }

    /// Substitute `{Id}` and `{CssClass}` in `template`
    ///
    /// # Examples
    /// ```
    /// use listrender::logic::tokens::TokenContext;
    ///
    /// let tokens = TokenContext::new("x", "y");
    /// assert_eq!(tokens.substitute_tokens("{Id}-{CssClass}"), "x-y");
    /// assert_eq!(tokens.substitute_tokens("{Other}"), "{Other}");
    /// ```
    pub fn substitute_tokens(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let tail = &rest[start..];
            if let Some(after) = tail.strip_prefix(ID_TOKEN) {
                out.push_str(&self.control_id);
                rest = after;
            } else if let Some(after) = tail.strip_prefix(CSS_CLASS_TOKEN) {
                out.push_str(&self.css_class);
                rest = after;
            } else {
                out.push('{');
                rest = &tail[1..];
            }
        }
        out.push_str(rest);

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute_both_tokens() {
        let tokens = TokenContext::new("x", "y");
        assert_eq!(tokens.substitute_tokens("{Id}-{CssClass}"), "x-y");
    }

    #[test]
    fn test_substitute_repeated_tokens() {
        let tokens = TokenContext::new("nav", "menu");
        assert_eq!(
            tokens.substitute_tokens("<ul id=\"{Id}\" class=\"{CssClass}\" data-id=\"{Id}\">"),
            "<ul id=\"nav\" class=\"menu\" data-id=\"nav\">"
        );
    }

    #[test]
    fn test_substitute_is_case_sensitive() {
        let tokens = TokenContext::new("x", "y");
        assert_eq!(tokens.substitute_tokens("{id}{CSSCLASS}"), "{id}{CSSCLASS}");
    }

    #[test]
    fn test_substitute_leaves_positional_placeholders() {
        let tokens = TokenContext::new("x", "y");
        assert_eq!(tokens.substitute_tokens("<li id=\"{1}\">{0}</li>"), "<li id=\"{1}\">{0}</li>");
    }

    #[test]
    fn test_substitute_is_not_recursive() {
        // A control id that looks like a token must not be expanded again
        let tokens = TokenContext::new("{CssClass}", "y");
        assert_eq!(tokens.substitute_tokens("{Id}"), "{CssClass}");
    }

    #[test]
    fn test_substitute_empty_values() {
        let tokens = TokenContext::default();
        assert_eq!(tokens.substitute_tokens("<ul id=\"{Id}\">"), "<ul id=\"\">");
    }

    #[test]
    fn test_substitute_no_tokens() {
        let tokens = TokenContext::new("x", "y");
        assert_eq!(tokens.substitute_tokens(""), "");
        assert_eq!(tokens.substitute_tokens("plain"), "plain");
    }
}
