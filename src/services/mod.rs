mod extractor;
mod http;
mod mercury;
mod readability;

pub use extractor::{build_extractor, ContentExtractor};
pub use http::{HttpClient, Response, CONNECTION_FAILURE_STATUS};
pub use mercury::{MercuryExtractor, MERCURY_PARSER_NAME};
pub use readability::{ReadabilityServer, READABILITY_PARSER_NAME};
