//! List-view filtering shared by every presentation layer.
//!
//! The status filter is applied server-side through [`ListParams`]; the
//! search term only narrows the page that was already fetched.

use crate::types::{ListParams, Todo, TodoList};

pub const DEFAULT_PAGE_SIZE: u32 = 50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl StatusFilter {
    /// Value of the server-side `completed` query parameter.
    pub fn as_completed(&self) -> Option<bool> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Pending => Some(false),
            StatusFilter::Completed => Some(true),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Pending => "pending",
            StatusFilter::Completed => "completed",
        }
    }
}

/// Case-insensitive substring match on title or description.
pub fn matches_search(todo: &Todo, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    todo.title.to_lowercase().contains(&needle)
        || todo
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(&needle))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    pub filter: StatusFilter,
    pub search: String,
    pub limit: u32,
    pub offset: u32,
}

impl Default for ListView {
    fn default() -> Self {
        Self {
            filter: StatusFilter::All,
            search: String::new(),
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl ListView {
    /// Collection key for the page this view shows. The search term is not
    /// part of it.
    pub fn params(&self) -> ListParams {
        ListParams {
            completed: self.filter.as_completed(),
            limit: Some(self.limit),
            offset: Some(self.offset),
        }
    }

    pub fn visible<'a>(&self, list: &'a TodoList) -> Vec<&'a Todo> {
        list.todos
            .iter()
            .filter(|todo| matches_search(todo, &self.search))
            .collect()
    }

    pub fn empty_message(&self) -> String {
        if !self.search.is_empty() {
            return "No todos match your search".to_string();
        }
        match self.filter {
            StatusFilter::All => "No todos yet. Create your first one!".to_string(),
            other => format!("No {} todos", other.label()),
        }
    }
}

pub fn summary(count: usize) -> String {
    if count == 1 {
        "1 todo".to_string()
    } else {
        format!("{count} todos")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn todo(title: &str, description: Option<&str>) -> Todo {
        let now = Utc::now();
        Todo {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: description.map(str::to_string),
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_description() {
        let t = todo("Buy Milk", Some("From the CORNER shop"));
        assert!(matches_search(&t, "milk"));
        assert!(matches_search(&t, "corner"));
        assert!(!matches_search(&t, "bread"));
        assert!(matches_search(&t, ""));
        assert!(!matches_search(&todo("Walk", None), "shop"));
    }

    #[test]
    fn params_follow_filter() {
        let mut view = ListView::default();
        assert_eq!(view.params(), ListParams::page(50, 0));
        view.filter = StatusFilter::Pending;
        assert_eq!(view.params().completed, Some(false));
        view.filter = StatusFilter::Completed;
        view.search = "ignored by the key".to_string();
        assert_eq!(view.params(), ListParams::page(50, 0).with_completed(Some(true)));
    }

    #[test]
    fn visible_applies_search_to_fetched_page() {
        let list = TodoList {
            todos: vec![todo("Learn Rust", None), todo("Buy milk", None)],
            total: 2,
            limit: 50,
            offset: 0,
        };
        let view = ListView {
            search: "RUST".to_string(),
            ..Default::default()
        };
        let visible = view.visible(&list);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "Learn Rust");
    }

    #[test]
    fn empty_messages() {
        let mut view = ListView::default();
        assert_eq!(view.empty_message(), "No todos yet. Create your first one!");
        view.filter = StatusFilter::Pending;
        assert_eq!(view.empty_message(), "No pending todos");
        view.search = "x".to_string();
        assert_eq!(view.empty_message(), "No todos match your search");
    }

    #[test]
    fn summary_pluralizes() {
        assert_eq!(summary(0), "0 todos");
        assert_eq!(summary(1), "1 todo");
        assert_eq!(summary(3), "3 todos");
    }
}
