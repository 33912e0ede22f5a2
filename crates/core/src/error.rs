/// Errors raised by domain-level validation.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid id: '{0}'")]
    InvalidId(String),

    #[error("Unknown {vocabulary} tag: '{tag}'")]
    UnknownTag {
        vocabulary: &'static str,
        tag: String,
    },

    #[error("Unknown criterion: '{0}'")]
    UnknownCriterion(String),

    #[error("Collation unavailable for locale '{locale}': {reason}")]
    Collation { locale: String, reason: String },
}
