use inkwell_common::util::FieldError;
use std::collections::BTreeMap;
use thiserror::Error;

/// Field-level validation failures, collected so that clients see all of them at once.
#[derive(Clone, Eq, PartialEq, Debug, Default, Error)]
#[error("Validation failed for fields {:?}", .0.keys().collect::<Vec<_>>())]
pub struct ValidationErrors(BTreeMap<&'static str, Vec<String>>);

impl ValidationErrors {
    pub fn add(&mut self, error: &FieldError) {
        self.0
            .entry(error.field())
            .or_default()
            .push(error.to_string());
    }

    /// Records the error, if any, and hands back the valid value.
    pub fn check<T>(&mut self, result: Result<T, FieldError>) -> Option<T> {
        result.map_err(|err| self.add(&err)).ok()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn into_fields(self) -> BTreeMap<&'static str, Vec<String>> {
        self.0
    }
}

impl From<FieldError> for ValidationErrors {
    fn from(value: FieldError) -> Self {
        let mut errors = Self::default();
        errors.add(&value);
        errors
    }
}
