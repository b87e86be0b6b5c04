//! Import wizard steps.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The five steps of a contact import, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStep {
    Upload,
    Mapping,
    Review,
    Importing,
    Complete,
}

impl ImportStep {
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Upload => Some(Self::Mapping),
            Self::Mapping => Some(Self::Review),
            Self::Review => Some(Self::Importing),
            Self::Importing => Some(Self::Complete),
            Self::Complete => None,
        }
    }

    pub fn previous(self) -> Option<Self> {
        match self {
            Self::Upload => None,
            Self::Mapping => Some(Self::Upload),
            Self::Review => Some(Self::Mapping),
            Self::Importing => Some(Self::Review),
            Self::Complete => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Upload => "Upload",
            Self::Mapping => "Field Mapping",
            Self::Review => "Review Duplicates",
            Self::Importing => "Importing",
            Self::Complete => "Complete",
        }
    }
}

/// Validate a step transition.
///
/// Only a single step forward or back is allowed, and a finished import
/// cannot be re-entered.
pub fn validate_transition(from: ImportStep, to: ImportStep) -> Result<(), CoreError> {
    if from.next() == Some(to) || from.previous() == Some(to) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Cannot move from '{}' to '{}'",
            from.label(),
            to.label()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_and_back_one_step() {
        assert!(validate_transition(ImportStep::Upload, ImportStep::Mapping).is_ok());
        assert!(validate_transition(ImportStep::Review, ImportStep::Mapping).is_ok());
        assert!(validate_transition(ImportStep::Importing, ImportStep::Review).is_ok());
    }

    #[test]
    fn skipping_steps_is_rejected() {
        assert!(validate_transition(ImportStep::Upload, ImportStep::Review).is_err());
        assert!(validate_transition(ImportStep::Mapping, ImportStep::Mapping).is_err());
    }

    #[test]
    fn complete_is_terminal() {
        assert_eq!(ImportStep::Complete.next(), None);
        assert!(validate_transition(ImportStep::Complete, ImportStep::Importing).is_err());
    }
}
