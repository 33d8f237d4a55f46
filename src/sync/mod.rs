pub mod rest;

use std::future::Future;

use thiserror::Error;

use crate::core::task::{Category, NewTask, Task, TaskId};

/// Any failure talking to the task store. The task list reduces all of
/// these to a log line; the variants exist for the log and for tests.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("task store returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid task store URL: {0}")]
    InvalidUrl(String),
}

/// The remote task store as consumed by the client.
pub trait TaskStore {
    /// `GET /tasks`
    fn list_tasks(&self) -> impl Future<Output = Result<Vec<Task>, StoreError>> + Send;

    /// `POST /tasks`, returning the stored task with its assigned id.
    fn create_task(&self, new: &NewTask) -> impl Future<Output = Result<Task, StoreError>> + Send;

    /// `DELETE /tasks/{id}`
    fn delete_task(&self, id: &TaskId) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// `PATCH /tasks/{id}` with `{category}`
    fn update_category(
        &self,
        id: &TaskId,
        category: Category,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// `PATCH /tasks/{id}/completed` with `{completed}`
    fn update_completed(
        &self,
        id: &TaskId,
        completed: bool,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
