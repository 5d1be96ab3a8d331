//! The synchronization layer front ends talk to.
//!
//! Reads go through the query caches. Mutations hit the server first and
//! only a confirmed success invalidates cached views; nothing is applied
//! optimistically, so a failure leaves the caches exactly as they were.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use todo_core::{
    ApiError, CreateTodo, HealthStatus, HttpRequest, HttpResponse, ListParams, Todo, TodoClient,
    TodoList, UpdateTodo,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::cache::{EntryState, QueryCache};
use crate::config::{ConfigError, SyncConfig};
use crate::notify::{self, MutationKind, Notification, Notifier};
use crate::transport::{ReqwestTransport, Transport};

/// One application instance's view of the remote todo collection.
///
/// Created with [`TodoStore::new`] or [`TodoStore::connect`] and released
/// with [`TodoStore::teardown`]. Each instance owns its caches; there is no
/// process-global state.
pub struct TodoStore {
    client: TodoClient,
    transport: Arc<dyn Transport>,
    lists: QueryCache<ListParams, TodoList>,
    items: QueryCache<Uuid, Todo>,
    notifier: Arc<dyn Notifier>,
}

impl TodoStore {
    pub fn new(
        config: &SyncConfig,
        transport: Arc<dyn Transport>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            client: TodoClient::new(&config.base_url),
            transport,
            lists: QueryCache::new(config.stale_after),
            items: QueryCache::new(config.stale_after),
            notifier,
        }
    }

    /// Builds a store over a [`ReqwestTransport`].
    pub fn connect(config: &SyncConfig, notifier: Arc<dyn Notifier>) -> Result<Self, ConfigError> {
        let transport = ReqwestTransport::new(config)?;
        info!(base_url = %config.base_url, "todo store connected");
        Ok(Self::new(config, Arc::new(transport), notifier))
    }

    pub fn client(&self) -> &TodoClient {
        &self.client
    }

    /// Drops every cached view. Fetches still in flight finish but their
    /// results are discarded.
    pub async fn teardown(self) {
        self.lists.clear().await;
        self.items.clear().await;
        info!("todo store torn down");
    }

    fn list_fetcher(
        &self,
        params: ListParams,
    ) -> impl FnOnce() -> BoxFuture<'static, Result<TodoList, ApiError>> {
        let client = self.client.clone();
        let transport = Arc::clone(&self.transport);
        move || {
            async move {
                let response = transport.execute(client.build_list_todos(&params)).await?;
                client.parse_list_todos(response)
            }
            .boxed()
        }
    }

    fn item_fetcher(
        &self,
        id: Uuid,
    ) -> impl FnOnce() -> BoxFuture<'static, Result<Todo, ApiError>> {
        let client = self.client.clone();
        let transport = Arc::clone(&self.transport);
        move || {
            async move {
                let response = transport.execute(client.build_get_todo(id)).await?;
                client.parse_get_todo(response)
            }
            .boxed()
        }
    }

    // ---------------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------------

    pub async fn list(&self, params: ListParams) -> Result<TodoList, ApiError> {
        self.lists.fetch(params, self.list_fetcher(params)).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Todo, ApiError> {
        self.items.fetch(id, self.item_fetcher(id)).await
    }

    /// Manual retry for a collection view, including one in `Errored`.
    pub async fn refetch_list(&self, params: ListParams) -> Result<TodoList, ApiError> {
        self.lists.refetch(params, self.list_fetcher(params)).await
    }

    pub async fn refetch(&self, id: Uuid) -> Result<Todo, ApiError> {
        self.items.refetch(id, self.item_fetcher(id)).await
    }

    pub async fn list_state(&self, params: &ListParams) -> EntryState {
        self.lists.state(params).await
    }

    pub async fn item_state(&self, id: &Uuid) -> EntryState {
        self.items.state(id).await
    }

    /// Last fetched page for `params`, without touching the network.
    pub async fn cached_list(&self, params: &ListParams) -> Option<TodoList> {
        self.lists.peek(params).await
    }

    /// Liveness probe. Not cached.
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        let response = self.transport.execute(self.client.build_health_check()).await?;
        self.client.parse_health_check(response)
    }

    // ---------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------

    /// Invalid input is returned as `ApiError::Validation` before any
    /// request is sent and without a notification.
    pub async fn create(&self, input: CreateTodo) -> Result<Todo, ApiError> {
        let request = self.client.build_create_todo(&input)?;
        let result = self.send(request, TodoClient::parse_create_todo).await;
        self.settle(MutationKind::Create, None, result, |_| {
            notify::created_message().to_string()
        })
        .await
    }

    pub async fn update(&self, id: Uuid, input: UpdateTodo) -> Result<Todo, ApiError> {
        let request = self.client.build_update_todo(id, &input)?;
        let result = self.send(request, TodoClient::parse_update_todo).await;
        self.settle(MutationKind::Update, Some(id), result, |_| {
            notify::updated_message().to_string()
        })
        .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        let request = self.client.build_delete_todo(id);
        let result = self.send(request, TodoClient::parse_delete_todo).await;
        self.settle(MutationKind::Delete, Some(id), result, |_| {
            notify::deleted_message().to_string()
        })
        .await
    }

    /// Sets the completion flag to `completed`.
    pub async fn set_completion(&self, id: Uuid, completed: bool) -> Result<Todo, ApiError> {
        let request = self.client.build_toggle_completion(id, completed)?;
        let result = self.send(request, TodoClient::parse_toggle_completion).await;
        self.settle(MutationKind::Toggle, Some(id), result, |todo| {
            notify::toggled_message(todo.completed)
        })
        .await
    }

    /// Flips `todo.completed` as this client last saw it. A concurrent
    /// writer may already have changed it on the server.
    pub async fn toggle(&self, todo: &Todo) -> Result<Todo, ApiError> {
        self.set_completion(todo.id, !todo.completed).await
    }

    async fn send<T>(
        &self,
        request: HttpRequest,
        parse: fn(&TodoClient, HttpResponse) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let response = self.transport.execute(request).await?;
        parse(&self.client, response)
    }

    async fn settle<T>(
        &self,
        kind: MutationKind,
        record: Option<Uuid>,
        result: Result<T, ApiError>,
        success_message: impl FnOnce(&T) -> String,
    ) -> Result<T, ApiError> {
        match &result {
            Ok(value) => {
                self.lists.invalidate_all().await;
                if let Some(id) = record {
                    self.items.invalidate(&id).await;
                }
                info!(kind = kind.as_str(), ?record, "mutation succeeded");
                self.notifier.notify(Notification::success(success_message(value)));
            }
            Err(err) => {
                warn!(kind = kind.as_str(), ?record, "mutation failed: {err}");
                self.notifier.notify(Notification::failure(kind, err));
            }
        }
        result
    }
}
