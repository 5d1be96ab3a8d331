//! Full lifecycle test against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises every core client
//! operation over real HTTP using ureq. Validates that the core's request
//! building and response parsing work end-to-end with the actual server.

use todo_core::{
    ApiError, CreateTodo, HttpMethod, HttpResponse, ListParams, TodoClient, UpdateTodo,
};

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`, letting the core
/// client handle status interpretation.
fn execute(req: todo_core::HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut response = match (req.method, req.body) {
        (HttpMethod::Get, _) => agent.get(&req.path).call(),
        (HttpMethod::Delete, _) => agent.delete(&req.path).call(),
        (HttpMethod::Post, Some(body)) => {
            agent.post(&req.path).content_type("application/json").send(body.as_bytes())
        }
        (HttpMethod::Post, None) => agent.post(&req.path).send_empty(),
        (HttpMethod::Put, Some(body)) => {
            agent.put(&req.path).content_type("application/json").send(body.as_bytes())
        }
        (HttpMethod::Put, None) => agent.put(&req.path).send_empty(),
        (HttpMethod::Patch, Some(body)) => {
            agent.patch(&req.path).content_type("application/json").send(body.as_bytes())
        }
        (HttpMethod::Patch, None) => agent.patch(&req.path).send_empty(),
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    HttpResponse {
        status,
        headers: Vec::new(),
        body,
    }
}

/// Start a mock server on a random port and return a client pointed at it.
fn start_server() -> TodoClient {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    TodoClient::new(&format!("http://{addr}"))
}

#[test]
fn crud_lifecycle() {
    let client = start_server();

    // Step 1: health and an empty list.
    let health = client.parse_health_check(execute(client.build_health_check())).unwrap();
    assert_eq!(health.status, "ok");

    let req = client.build_list_todos(&ListParams::default());
    let list = client.parse_list_todos(execute(req)).unwrap();
    assert!(list.todos.is_empty(), "expected empty list");
    assert_eq!(list.total, 0);

    // Step 2: create a todo.
    let create_input = CreateTodo::new("Integration test", Some("from ureq".to_string()));
    let req = client.build_create_todo(&create_input).unwrap();
    let created = client.parse_create_todo(execute(req)).unwrap();
    assert_eq!(created.title, "Integration test");
    assert_eq!(created.description.as_deref(), Some("from ureq"));
    assert!(!created.completed);
    assert_eq!(created.created_at, created.updated_at);
    let id = created.id;

    // Step 3: get the created todo.
    let fetched = client.parse_get_todo(execute(client.build_get_todo(id))).unwrap();
    assert_eq!(fetched, created);

    // Step 4: update title only.
    let update_input = UpdateTodo {
        title: Some("Updated title".to_string()),
        ..Default::default()
    };
    let req = client.build_update_todo(id, &update_input).unwrap();
    let updated = client.parse_update_todo(execute(req)).unwrap();
    assert_eq!(updated.title, "Updated title");
    assert_eq!(updated.description.as_deref(), Some("from ureq"));
    assert!(!updated.completed);
    assert!(updated.updated_at > updated.created_at);

    // Step 5: update completed, then read it back.
    let update_input = UpdateTodo {
        completed: Some(true),
        ..Default::default()
    };
    let req = client.build_update_todo(id, &update_input).unwrap();
    client.parse_update_todo(execute(req)).unwrap();
    let fetched = client.parse_get_todo(execute(client.build_get_todo(id))).unwrap();
    assert!(fetched.completed);
    assert!(fetched.updated_at > fetched.created_at);

    // Step 6: set completion back to false through PATCH.
    let req = client.build_toggle_completion(id, false).unwrap();
    let toggled = client.parse_toggle_completion(execute(req)).unwrap();
    assert!(!toggled.completed);
    assert!(toggled.updated_at > fetched.updated_at);

    // Step 7: list, filtered both ways.
    let req = client.build_list_todos(&ListParams::default().with_completed(Some(false)));
    assert_eq!(client.parse_list_todos(execute(req)).unwrap().total, 1);
    let req = client.build_list_todos(&ListParams::default().with_completed(Some(true)));
    assert_eq!(client.parse_list_todos(execute(req)).unwrap().total, 0);

    // Step 8: delete.
    client.parse_delete_todo(execute(client.build_delete_todo(id))).unwrap();

    // Step 9: get after delete: should be NotFound.
    let err = client.parse_get_todo(execute(client.build_get_todo(id))).unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));

    // Step 10: delete again: should be NotFound.
    let err = client.parse_delete_todo(execute(client.build_delete_todo(id))).unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));

    // Step 11: list: should be empty again.
    let req = client.build_list_todos(&ListParams::default());
    let list = client.parse_list_todos(execute(req)).unwrap();
    assert!(list.todos.is_empty(), "expected empty list after delete");
}

#[test]
fn pagination_window() {
    let client = start_server();
    for i in 0..5 {
        let req = client
            .build_create_todo(&CreateTodo::new(format!("todo {i}"), None))
            .unwrap();
        client.parse_create_todo(execute(req)).unwrap();
    }

    let req = client.build_list_todos(&ListParams::page(2, 0));
    let page = client.parse_list_todos(execute(req)).unwrap();
    assert_eq!(page.todos.len(), 2);
    assert_eq!(page.total, 5);

    let req = client.build_list_todos(&ListParams::page(2, 4));
    let page = client.parse_list_todos(execute(req)).unwrap();
    assert_eq!(page.todos.len(), 1);
}

#[test]
fn server_side_validation_message_is_kept() {
    let client = start_server();

    // Bypass client-side validation to see what the server says.
    let req = todo_core::HttpRequest {
        method: HttpMethod::Post,
        path: format!("{}/todos", client.base_url()),
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: Some(r#"{"title":""}"#.to_string()),
    };
    let err = client.parse_create_todo(execute(req)).unwrap_err();
    assert!(matches!(err, ApiError::RequestFailed { status: Some(400), .. }));
    assert_eq!(err.server_message(), Some("Title is required"));
}
