//! Resource URIs for table schemas
//!
//! Every user table is addressable as `sqlite://<table>/schema`.

use std::fmt;
use std::str::FromStr;

use crate::error::ContextError;

/// URI scheme used for schema resources
pub const SCHEME: &str = "sqlite";

/// Trailing path segment every schema URI ends with
pub const SCHEMA_SEGMENT: &str = "schema";

/// Identifier of one table's schema resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceUri {
    table: String,
}

impl ResourceUri {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn into_table(self) -> String {
        self.table
    }
}

impl fmt::Display for ResourceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}/{}", SCHEME, self.table, SCHEMA_SEGMENT)
    }
}

impl FromStr for ResourceUri {
    type Err = ContextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ContextError::InvalidResourceIdentifier(s.to_string());

        let rest = s
            .strip_prefix(SCHEME)
            .and_then(|r| r.strip_prefix("://"))
            .ok_or_else(invalid)?;

        let mut segments: Vec<&str> = rest.split('/').collect();
        let literal = segments.pop().ok_or_else(invalid)?;
        let table = segments.pop().ok_or_else(invalid)?;

        if literal != SCHEMA_SEGMENT || table.is_empty() {
            return Err(invalid());
        }

        Ok(Self::new(table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_err(s: &str) -> ContextError {
        s.parse::<ResourceUri>().unwrap_err()
    }

    #[test]
    fn test_build() {
        assert_eq!(ResourceUri::new("users").to_string(), "sqlite://users/schema");
    }

    #[test]
    fn test_round_trip() {
        for table in ["users", "order_items", "Mixed Case", "ünïcödé"] {
            let uri = ResourceUri::new(table).to_string();
            let parsed: ResourceUri = uri.parse().unwrap();
            assert_eq!(parsed.table(), table);
        }
    }

    #[test]
    fn test_wrong_trailing_segment() {
        assert!(matches!(
            parse_err("sqlite://users/bogus"),
            ContextError::InvalidResourceIdentifier(uri) if uri == "sqlite://users/bogus"
        ));
    }

    #[test]
    fn test_too_few_segments() {
        assert!(matches!(
            parse_err("sqlite://schema"),
            ContextError::InvalidResourceIdentifier(_)
        ));
    }

    #[test]
    fn test_empty_table_segment() {
        assert!(matches!(
            parse_err("sqlite:///schema"),
            ContextError::InvalidResourceIdentifier(_)
        ));
    }

    #[test]
    fn test_wrong_scheme() {
        assert!(matches!(
            parse_err("postgres://users/schema"),
            ContextError::InvalidResourceIdentifier(_)
        ));
        assert!(matches!(
            parse_err("users/schema"),
            ContextError::InvalidResourceIdentifier(_)
        ));
    }

    #[test]
    fn test_uses_last_two_segments() {
        let parsed: ResourceUri = "sqlite://main/users/schema".parse().unwrap();
        assert_eq!(parsed.table(), "users");
    }
}
