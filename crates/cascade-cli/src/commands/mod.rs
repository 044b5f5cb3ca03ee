//! CLI command implementations.

pub mod repl;
pub mod stats;
pub mod tree;
pub mod value;

// Re-export submodules for convenience
pub use repl::ReplArgs;
pub use stats::StatsArgs;
pub use tree::TreeArgs;
pub use value::ValueArgs;

use cascade_core::batch::ValuationQuery;
use cascade_core::types::Date;

use crate::error::{CliError, CliResult};

/// Parses a date string in YYYY-MM-DD format.
pub fn parse_date(s: &str) -> CliResult<Date> {
    Date::parse(s).map_err(|_| CliError::InvalidDate(s.trim().to_string()))
}

/// Parses an `investorId;YYYY-MM-DD` line.
pub fn parse_query(line: &str) -> CliResult<ValuationQuery> {
    let invalid = || CliError::InvalidQuery(line.to_string());

    let (owner, date) = line.split_once(';').ok_or_else(invalid)?;
    let owner = owner.trim();
    if owner.is_empty() {
        return Err(invalid());
    }
    let date = Date::parse(date).map_err(|_| invalid())?;

    Ok(ValuationQuery::new(owner, date))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2020-01-15").unwrap().to_string(), "2020-01-15");
        assert!(matches!(parse_date("15.01.2020"), Err(CliError::InvalidDate(_))));
    }

    #[test]
    fn test_parse_query() {
        let query = parse_query("Investor1;2019-12-31").unwrap();
        assert_eq!(query.owner.as_str(), "Investor1");
        assert_eq!(query.date.to_string(), "2019-12-31");

        let query = parse_query(" Investor1 ; 2019-12-31 ").unwrap();
        assert_eq!(query.owner.as_str(), "Investor1");
    }

    #[test]
    fn test_parse_query_rejects_malformed_lines() {
        for line in ["Investor1", "Investor1;", ";2019-12-31", "Investor1;2019/12/31"] {
            assert!(
                matches!(parse_query(line), Err(CliError::InvalidQuery(_))),
                "{line}"
            );
        }
    }
}
