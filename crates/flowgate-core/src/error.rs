//! Dispatcher error types

use thiserror::Error;

use crate::provider::ProviderError;

/// Message shown for failures the user cannot act on.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// Errors raised inside screen handlers.
///
/// These never leave the dispatcher: every variant becomes a soft error in
/// the encrypted reply.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// A data provider call failed
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// A form value is missing or unusable
    #[error("invalid `{field}`: {message}")]
    InvalidInput {
        /// Request data key
        field: &'static str,
        /// User-facing explanation
        message: &'static str,
    },
}

impl DispatchError {
    pub(crate) const fn invalid(field: &'static str, message: &'static str) -> Self {
        Self::InvalidInput { field, message }
    }

    /// True for failures caused by the request or business rules, as opposed
    /// to infrastructure.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput { .. }
                | Self::Provider(ProviderError::Validation(_) | ProviderError::NotFound { .. })
        )
    }

    /// Text safe to show in the Flow UI.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidInput { message, .. } => (*message).to_string(),
            Self::Provider(ProviderError::Validation(message)) => message.clone(),
            Self::Provider(ProviderError::NotFound { entity, .. }) => {
                let mut chars = entity.chars();
                let capitalized: String =
                    chars.next().map(|c| c.to_ascii_uppercase()).into_iter().chain(chars).collect();
                format!("{capitalized} not found")
            },
            Self::Provider(ProviderError::Unavailable(_) | ProviderError::Timeout(_)) => {
                GENERIC_FAILURE.to_string()
            },
        }
    }
}
