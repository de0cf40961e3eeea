//! Fetch type selection.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How the rows of a query are handed back to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FetchType {
    /// Output all rows
    #[serde(alias = "fetch")]
    Fetch,
    /// Output the first row
    #[serde(alias = "fetch_one", alias = "fetch-one")]
    FetchOne,
    /// Store all rows to a file and output its URI
    #[default]
    #[serde(alias = "store")]
    Store,
    /// Output the row count only
    #[serde(alias = "none")]
    None,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid fetch type: '{0}'. Expected one of FETCH, FETCH_ONE, STORE, NONE")]
pub struct ParseFetchTypeError(String);

impl std::str::FromStr for FetchType {
    type Err = ParseFetchTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace('-', "_").as_str() {
            "FETCH" => Ok(Self::Fetch),
            "FETCH_ONE" => Ok(Self::FetchOne),
            "STORE" => Ok(Self::Store),
            "NONE" => Ok(Self::None),
            _ => Err(ParseFetchTypeError(s.to_string())),
        }
    }
}

impl std::fmt::Display for FetchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fetch => write!(f, "FETCH"),
            Self::FetchOne => write!(f, "FETCH_ONE"),
            Self::Store => write!(f, "STORE"),
            Self::None => write!(f, "NONE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_store() {
        assert_eq!(FetchType::default(), FetchType::Store);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("FETCH".parse::<FetchType>().unwrap(), FetchType::Fetch);
        assert_eq!("fetch_one".parse::<FetchType>().unwrap(), FetchType::FetchOne);
        assert_eq!("fetch-one".parse::<FetchType>().unwrap(), FetchType::FetchOne);
        assert_eq!(" store ".parse::<FetchType>().unwrap(), FetchType::Store);
        assert_eq!("None".parse::<FetchType>().unwrap(), FetchType::None);
        assert!("FETCH_ALL".parse::<FetchType>().is_err());
    }

    #[test]
    fn test_display_matches_from_str() {
        for fetch_type in [
            FetchType::Fetch,
            FetchType::FetchOne,
            FetchType::Store,
            FetchType::None,
        ] {
            assert_eq!(
                fetch_type.to_string().parse::<FetchType>().unwrap(),
                fetch_type
            );
        }
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_string(&FetchType::FetchOne).unwrap(),
            "\"FETCH_ONE\""
        );
        let parsed: FetchType = serde_json::from_str("\"fetch_one\"").unwrap();
        assert_eq!(parsed, FetchType::FetchOne);
    }
}
