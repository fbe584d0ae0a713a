use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Website {
    pub url: String,
    pub name: String,
    /// Two-letter language code, e.g. `en`.
    pub language: String,
    /// Two-letter country code, e.g. `us`.
    pub country: String,
}

impl Website {
    pub fn new(
        url: impl Into<String>,
        name: impl Into<String>,
        language: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
            language: language.into(),
            country: country.into(),
        }
    }
}
