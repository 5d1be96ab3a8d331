//! Client-side field checks run before a payload is turned into a request.
//!
//! Lengths are counted in `char`s so a multi-byte title is measured the way
//! a user types it.

use thiserror::Error;

use crate::types::{CreateTodo, UpdateTodo};

pub const TITLE_MAX_CHARS: usize = 255;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title is required")]
    EmptyTitle,

    #[error("title is {len} characters, at most {max} allowed")]
    TitleTooLong { len: usize, max: usize },

    #[error("description is {len} characters, at most {max} allowed")]
    DescriptionTooLong { len: usize, max: usize },
}

pub(crate) fn check_title(title: &str) -> Result<(), ValidationError> {
    let len = title.chars().count();
    if len == 0 {
        return Err(ValidationError::EmptyTitle);
    }
    if len > TITLE_MAX_CHARS {
        return Err(ValidationError::TitleTooLong {
            len,
            max: TITLE_MAX_CHARS,
        });
    }
    Ok(())
}

pub(crate) fn check_description(description: &str) -> Result<(), ValidationError> {
    let len = description.chars().count();
    if len > DESCRIPTION_MAX_CHARS {
        return Err(ValidationError::DescriptionTooLong {
            len,
            max: DESCRIPTION_MAX_CHARS,
        });
    }
    Ok(())
}

impl CreateTodo {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_title(&self.title)?;
        if let Some(description) = &self.description {
            check_description(description)?;
        }
        Ok(())
    }
}

impl UpdateTodo {
    /// Same checks as [`CreateTodo::validate`], applied to present fields only.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(title) = &self.title {
            check_title(title)?;
        }
        if let Some(description) = &self.description {
            check_description(description)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_title_is_rejected() {
        let err = CreateTodo::new("", None).validate().unwrap_err();
        assert_eq!(err, ValidationError::EmptyTitle);
    }

    #[test]
    fn title_bounds_are_inclusive() {
        assert!(CreateTodo::new("x".repeat(255), None).validate().is_ok());
        let err = CreateTodo::new("x".repeat(256), None).validate().unwrap_err();
        assert_eq!(err, ValidationError::TitleTooLong { len: 256, max: 255 });
    }

    #[test]
    fn title_length_counts_chars_not_bytes() {
        // 255 two-byte characters.
        assert!(CreateTodo::new("é".repeat(255), None).validate().is_ok());
    }

    #[test]
    fn description_limit() {
        assert!(CreateTodo::new("t", Some("d".repeat(1000))).validate().is_ok());
        let err = CreateTodo::new("t", Some("d".repeat(1001)))
            .validate()
            .unwrap_err();
        assert!(matches!(err, ValidationError::DescriptionTooLong { len: 1001, .. }));
    }

    #[test]
    fn update_checks_only_present_fields() {
        assert!(UpdateTodo::default().validate().is_ok());
        let update = UpdateTodo {
            completed: Some(true),
            ..Default::default()
        };
        assert!(update.validate().is_ok());

        let update = UpdateTodo {
            title: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(update.validate().unwrap_err(), ValidationError::EmptyTitle);
    }
}
