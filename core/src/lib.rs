//! Synchronous API client core for the todo service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The caller executes the
//! actual HTTP round-trip, making the core fully deterministic and testable.
//!
//! # Design
//! - `TodoClient` is stateless, it holds only `base_url`.
//! - Each operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - Payload validation runs inside `build_*`; an invalid todo never
//!   reaches the wire.
//! - Form drafts and list-view filtering live here too, so any front end
//!   shares the same rules.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod error;
pub mod form;
pub mod http;
pub mod types;
pub mod validate;
pub mod view;

pub use client::TodoClient;
pub use error::ApiError;
pub use form::{FieldErrors, TodoDraft};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{
    CreateTodo, ErrorBody, HealthStatus, ListParams, ToggleCompletion, Todo, TodoList, UpdateTodo,
};
pub use validate::ValidationError;
pub use view::{ListView, StatusFilter};
