use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid {section} pattern \"{pattern}\": {source}")]
    InvalidPattern {
        section: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
