//! Add/edit form state and its inline field messages.
//!
//! Validation failures stay on the form: a draft only turns into a request
//! payload once every field passes.

use crate::types::{CreateTodo, Todo, UpdateTodo};
use crate::validate::{check_description, check_title, ValidationError};

/// Editable title/description pair backing the add and edit forms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoDraft {
    pub title: String,
    pub description: String,
}

/// Per-field messages, `None` when the field is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}

fn field_message(err: ValidationError) -> String {
    match err {
        ValidationError::EmptyTitle => "Title is required".to_string(),
        ValidationError::TitleTooLong { max, .. } => {
            format!("Title must be less than {max} characters")
        }
        ValidationError::DescriptionTooLong { max, .. } => {
            format!("Description must be less than {max} characters")
        }
    }
}

impl TodoDraft {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    /// Prefilled draft for editing `todo`.
    pub fn from_todo(todo: &Todo) -> Self {
        Self {
            title: todo.title.clone(),
            description: todo.description.clone().unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> FieldErrors {
        FieldErrors {
            title: check_title(&self.title).err().map(field_message),
            description: check_description(&self.description).err().map(field_message),
        }
    }

    /// An empty description is left out of the create payload.
    pub fn into_create(self) -> Result<CreateTodo, FieldErrors> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(errors);
        }
        let description = (!self.description.is_empty()).then_some(self.description);
        Ok(CreateTodo::new(self.title, description))
    }

    /// The edit form owns both fields, so both are always sent, which lets a
    /// user clear a description.
    pub fn into_update(self) -> Result<UpdateTodo, FieldErrors> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(UpdateTodo {
            title: Some(self.title),
            description: Some(self.description),
            completed: None,
        })
    }

    pub fn reset(&mut self) {
        self.title.clear();
        self.description.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn empty_draft_reports_title_required() {
        let errors = TodoDraft::default().validate();
        assert_eq!(errors.title.as_deref(), Some("Title is required"));
        assert!(errors.description.is_none());
    }

    #[test]
    fn both_fields_reported_together() {
        let draft = TodoDraft::new("t".repeat(256), "d".repeat(1001));
        let errors = draft.validate();
        assert_eq!(
            errors.title.as_deref(),
            Some("Title must be less than 255 characters")
        );
        assert_eq!(
            errors.description.as_deref(),
            Some("Description must be less than 1000 characters")
        );
    }

    #[test]
    fn into_create_drops_empty_description() {
        let create = TodoDraft::new("Walk dog", "").into_create().unwrap();
        assert_eq!(create.title, "Walk dog");
        assert!(create.description.is_none());
        assert!(!create.completed);
    }

    #[test]
    fn into_update_sends_both_fields() {
        let now = Utc::now();
        let todo = Todo {
            id: Uuid::nil(),
            title: "Old".to_string(),
            description: Some("notes".to_string()),
            completed: true,
            created_at: now,
            updated_at: now,
        };
        let mut draft = TodoDraft::from_todo(&todo);
        assert_eq!(draft.description, "notes");
        draft.description.clear();
        let update = draft.into_update().unwrap();
        assert_eq!(update.title.as_deref(), Some("Old"));
        assert_eq!(update.description.as_deref(), Some(""));
        assert!(update.completed.is_none());
    }

    #[test]
    fn invalid_draft_does_not_produce_payload() {
        assert!(TodoDraft::new("", "x").into_create().is_err());
        assert!(TodoDraft::new("", "x").into_update().is_err());
    }

    #[test]
    fn reset_clears_fields() {
        let mut draft = TodoDraft::new("a", "b");
        draft.reset();
        assert_eq!(draft, TodoDraft::default());
    }
}
