use thiserror::Error;
use time::Duration;

#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Debug, Default, Hash)]
pub struct PositiveDuration(Duration);

impl PositiveDuration {
    #[must_use]
    pub fn new(duration: Duration) -> Option<Self> {
        duration.is_positive().then_some(Self(duration))
    }

    #[must_use]
    pub fn get(&self) -> Duration {
        self.0
    }

    #[must_use]
    pub fn whole_seconds(&self) -> i64 {
        self.0.whole_seconds()
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The duration is not positive: {0}")]
pub struct NonPositiveDurationError(Duration);

impl TryFrom<Duration> for PositiveDuration {
    type Error = NonPositiveDurationError;

    fn try_from(value: Duration) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(NonPositiveDurationError(value))
    }
}

/// A single rejected input field. The display text is what clients see.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Error)]
pub enum FieldError {
    #[error("The {field} field is required.")]
    Required { field: &'static str },
    #[error("The {field} field must not be greater than {max} characters.")]
    TooLong { field: &'static str, max: usize },
    #[error("The {field} field must be at least {min} characters.")]
    TooShort { field: &'static str, min: usize },
    #[error("The {field} field must be a valid email address.")]
    InvalidEmail { field: &'static str },
    #[error("The selected {field} is invalid.")]
    NotAllowed { field: &'static str, value: String },
    #[error("The {field} has already been taken.")]
    Taken { field: &'static str },
}

impl FieldError {
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            FieldError::Required { field }
            | FieldError::TooLong { field, .. }
            | FieldError::TooShort { field, .. }
            | FieldError::InvalidEmail { field }
            | FieldError::NotAllowed { field, .. }
            | FieldError::Taken { field } => field,
        }
    }
}

/// Rejects blank text and text longer than `max` characters (if given).
pub fn required_text(
    field: &'static str,
    value: String,
    max: Option<usize>,
) -> Result<String, FieldError> {
    if value.trim().is_empty() {
        return Err(FieldError::Required { field });
    }

    match max {
        Some(max) if value.chars().count() > max => Err(FieldError::TooLong { field, max }),
        _ => Ok(value),
    }
}
