use crate::core::task::{Category, NewTask, Task, TaskId};
use crate::sync::{StoreError, TaskStore};

/// Everything the task list reacts to: user intents, and the completions of
/// the requests those intents issued.
#[derive(Debug)]
pub enum Message {
    // Sync
    Load,
    Loaded(Result<Vec<Task>, StoreError>),

    // Add form
    InputChanged(String),
    CategorySelected(Category),
    Submit,
    Created(Result<Task, StoreError>),

    // Task actions
    Delete(TaskId),
    Deleted(TaskId, Result<(), StoreError>),
    SetCategory(TaskId, Category),
    CategoryUpdated(TaskId, Category, Result<(), StoreError>),
    ToggleCompleted(TaskId, bool),
    CompletedUpdated(TaskId, bool, Result<(), StoreError>),

    // Category menu
    OpenMenu(TaskId),
    CloseMenu,
}

/// A call to issue against the task store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    ListTasks,
    CreateTask(NewTask),
    DeleteTask(TaskId),
    UpdateCategory(TaskId, Category),
    UpdateCompleted(TaskId, bool),
}

impl Request {
    /// Run the call and wrap its outcome in the matching completion message.
    pub async fn perform<S: TaskStore>(self, store: &S) -> Message {
        match self {
            Self::ListTasks => Message::Loaded(store.list_tasks().await),
            Self::CreateTask(new) => Message::Created(store.create_task(&new).await),
            Self::DeleteTask(id) => {
                let result = store.delete_task(&id).await;
                Message::Deleted(id, result)
            }
            Self::UpdateCategory(id, category) => {
                let result = store.update_category(&id, category).await;
                Message::CategoryUpdated(id, category, result)
            }
            Self::UpdateCompleted(id, completed) => {
                let result = store.update_completed(&id, completed).await;
                Message::CompletedUpdated(id, completed, result)
            }
        }
    }
}
