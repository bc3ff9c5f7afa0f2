//! Business Logic
//!
//! Pure functions behind the renderer that can be unit tested in isolation:
//! - errors: Error classification for log context
//! - filters: Template include/exclude policy and field list defaults
//! - format: Positional `{n}` template formatting
//! - tokens: `{Id}` / `{CssClass}` substitution

pub mod errors;
pub mod filters;
pub mod format;
pub mod tokens;
