//! Search queries: ordered `field -> search string` pairs.
//!
//! Deserializes from either a JSON object (tagged search) or a JSON array of
//! strings (untagged search, each string naming its own field).

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Ordered field names with the text each field should contain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawQuery")]
pub struct SearchQuery {
    fields: Vec<(String, String)>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawQuery {
    Terms(Vec<String>),
    Fields(Map<String, Value>),
}

impl TryFrom<RawQuery> for SearchQuery {
    type Error = Error;

    fn try_from(raw: RawQuery) -> Result<Self> {
        match raw {
            RawQuery::Terms(terms) => Ok(Self::from_terms(terms)),
            RawQuery::Fields(map) => map
                .into_iter()
                .map(|(field, value)| match value {
                    Value::String(text) => Ok((field, text)),
                    Value::Number(n) => Ok((field, n.to_string())),
                    other => Err(Error::InvalidQuery(format!(
                        "search string for field '{field}' must be text, got {other}"
                    ))),
                })
                .collect::<Result<Vec<_>>>()
                .map(|fields| Self { fields }),
        }
    }
}

impl SearchQuery {
    /// Tagged query from `(field, search)` pairs, order preserved.
    #[must_use]
    pub fn from_fields<F, S>(fields: impl IntoIterator<Item = (F, S)>) -> Self
    where
        F: Into<String>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(|(f, s)| (f.into(), s.into())).collect(),
        }
    }

    /// Untagged query; every search string is also its field name.
    #[must_use]
    pub fn from_terms<S: Into<String>>(terms: impl IntoIterator<Item = S>) -> Self {
        Self {
            fields: terms
                .into_iter()
                .map(|term| {
                    let term = term.into();
                    (term.clone(), term)
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// The search strings, in field order.
    #[must_use]
    pub fn terms(&self) -> Vec<&str> {
        self.fields.iter().map(|(_, search)| search.as_str()).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for SearchQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.fields.iter().map(|(f, s)| (f, s)))
    }
}
