//! Unified error type for session-level operations.
//!
//! Store mutations never fail with an error; they report through
//! notifications and `MutationOutcome`. This type covers setup and the
//! operations that do return `Result`.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::forms::{FormError, ValidationError};
use crate::identity::IdentityError;
use crate::stores::CheckoutUnavailable;

/// Application-level error type for the storefront client.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Identity file could not be read or written.
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Backend request failed.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// Add-plant form was rejected.
    #[error("{0}")]
    Form(#[from] FormError),

    #[error(transparent)]
    Checkout(#[from] CheckoutUnavailable),
}

impl AppError {
    /// Whether this error should be reported to error tracking. Failures
    /// caused by user input or by the stubbed checkout are not.
    #[must_use]
    pub const fn is_reportable(&self) -> bool {
        match self {
            Self::Config(_)
            | Self::Identity(_)
            | Self::Api(_)
            | Self::Form(FormError::Submit(_)) => true,
            Self::Form(FormError::Validation(_)) | Self::Checkout(_) => false,
        }
    }
}

/// Whether a type-erased error should be reported to error tracking.
///
/// Recognizes `AppError` and each error it wraps; anything else is
/// reported.
#[must_use]
pub fn is_reportable(error: &(dyn std::error::Error + 'static)) -> bool {
    if let Some(e) = error.downcast_ref::<AppError>() {
        return e.is_reportable();
    }
    if let Some(e) = error.downcast_ref::<FormError>() {
        return !matches!(e, FormError::Validation(_));
    }
    !(error.is::<ValidationError>() || error.is::<CheckoutUnavailable>())
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
