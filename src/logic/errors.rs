use anyhow::Error;

use crate::logic::format::FormatError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    Network,    // DNS, refused, timeout
    HttpStatus, // Non-2xx feed response
    Database,   // Open, prepare, step
    Xml,        // Malformed feed document
    Format,     // Bad item/separator template
    Other,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Network => "network",
            ErrorType::HttpStatus => "http_status",
            ErrorType::Database => "database",
            ErrorType::Xml => "xml",
            ErrorType::Format => "format",
            ErrorType::Other => "other",
        }
    }
}

/// Classify an error by walking its chain for a known source type
pub fn classify_error(error: &Error) -> ErrorType {
    for cause in error.chain() {
        if let Some(reqwest_err) = cause.downcast_ref::<reqwest::Error>() {
            if reqwest_err.status().is_some() {
                return ErrorType::HttpStatus;
            }
            return ErrorType::Network;
        }
        if cause.downcast_ref::<rusqlite::Error>().is_some() {
            return ErrorType::Database;
        }
        if cause.downcast_ref::<quick_xml::Error>().is_some() {
            return ErrorType::Xml;
        }
        if cause.downcast_ref::<FormatError>().is_some() {
            return ErrorType::Format;
        }
    }

    ErrorType::Other
}

/// Root cause of an error, for log lines
pub fn format_error_message(error: &Error) -> String {
    error.root_cause().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_format_error() {
        let err: Error = FormatError::Malformed(3).into();
        assert_eq!(classify_error(&err), ErrorType::Format);
    }

    #[test]
    fn test_classify_format_error_under_context() {
        let err = Error::from(FormatError::UnbalancedBrace(0)).context("Failed to format record");
        assert_eq!(classify_error(&err), ErrorType::Format);
    }

    #[test]
    fn test_classify_database_error() {
        let err: Error = rusqlite::Error::InvalidQuery.into();
        assert_eq!(classify_error(&err.context("Failed to execute query")), ErrorType::Database);
    }

    #[test]
    fn test_classify_other_error() {
        let err = anyhow::anyhow!("some random error");
        assert_eq!(classify_error(&err), ErrorType::Other);
    }

    #[test]
    fn test_format_shows_root_cause() {
        let inner = anyhow::anyhow!("tcp connect error");
        let outer = inner.context("Failed to fetch feed");
        assert_eq!(format_error_message(&outer), "tcp connect error");
    }

    #[test]
    fn test_format_preserves_simple_errors() {
        let err = anyhow::anyhow!("custom error message");
        assert_eq!(format_error_message(&err), "custom error message");
    }
}
