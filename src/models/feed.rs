use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    pub url: String,
    pub name: String,
    pub website: String,
}

impl Feed {
    pub fn new(url: impl Into<String>, website: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
            website: website.into(),
        }
    }
}
