//! Parsing error types
//!
//! Markup that simply does not match is never an error here; these cover
//! selector configuration problems only.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParsingError {
    #[error("Invalid CSS selector: {selector} - {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("No valid selectors compiled for '{cascade}': {errors}")]
    NoValidSelectors { cascade: String, errors: String },

    #[error("Selector list '{cascade}' must not be empty")]
    EmptySelectorList { cascade: String },
}

impl ParsingError {
    pub fn invalid_selector(selector: &str, reason: &str) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type ParsingResult<T> = Result<T, ParsingError>;
