use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Where the host tool finds the plugin: a module, optionally followed by
/// `:symbol`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct EntryPoint {
    pub module: String,
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntryPointError {
    #[error("entry point is empty")]
    Empty,
    #[error("entry point `{0}` has an empty module")]
    EmptyModule(String),
    #[error("entry point `{0}` has an empty symbol")]
    EmptySymbol(String),
}

impl FromStr for EntryPoint {
    type Err = EntryPointError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(EntryPointError::Empty);
        }

        let (module, symbol) = match raw.split_once(':') {
            Some((module, symbol)) => (module, Some(symbol)),
            None => (raw, None),
        };

        if module.is_empty() {
            return Err(EntryPointError::EmptyModule(raw.to_string()));
        }
        if symbol.is_some_and(str::is_empty) {
            return Err(EntryPointError::EmptySymbol(raw.to_string()));
        }

        Ok(Self {
            module: module.to_string(),
            symbol: symbol.map(str::to_string),
        })
    }
}

impl TryFrom<String> for EntryPoint {
    type Error = EntryPointError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.symbol {
            Some(symbol) => write!(f, "{}:{symbol}", self.module),
            None => f.write_str(&self.module),
        }
    }
}
