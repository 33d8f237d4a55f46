use futures::stream::{FuturesUnordered, StreamExt};

use crate::config::InboxConfig;
use crate::core::task::{Category, TaskId};
use crate::core::task_list::TaskList;
use crate::message::Message;
use crate::sync::rest::RestClient;
use crate::sync::{StoreError, TaskStore};

/// Pairs a `TaskList` with the store its requests go to.
pub struct Inbox<S> {
    list: TaskList,
    store: S,
}

impl Inbox<RestClient> {
    pub fn from_config(config: &InboxConfig) -> Result<Self, StoreError> {
        let store = RestClient::new(&config.base_url)?;
        log::debug!("Task store at {}", store.base_url());
        Ok(Self::new(TaskList::new(config.sync_policy), store))
    }
}

impl<S: TaskStore> Inbox<S> {
    pub fn new(list: TaskList, store: S) -> Self {
        Self { list, store }
    }

    pub fn list(&self) -> &TaskList {
        &self.list
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Handle one message and wait for the request it issues, if any.
    pub async fn dispatch(&mut self, message: Message) {
        let mut next = Some(message);
        while let Some(message) = next.take() {
            if let Some(request) = self.list.update(message) {
                next = Some(request.perform(&self.store).await);
            }
        }
    }

    /// Handle every message up front, then run the resulting requests
    /// concurrently. Completions are applied in the order they arrive.
    pub async fn dispatch_all(&mut self, messages: impl IntoIterator<Item = Message>) {
        let store = &self.store;
        let mut in_flight = FuturesUnordered::new();
        for message in messages {
            if let Some(request) = self.list.update(message) {
                in_flight.push(request.perform(store));
            }
        }
        log::debug!("{} requests in flight", in_flight.len());

        while let Some(completion) = in_flight.next().await {
            if let Some(request) = self.list.update(completion) {
                in_flight.push(request.perform(store));
            }
        }
    }

    pub async fn load(&mut self) {
        self.dispatch(Message::Load).await;
    }

    /// Fill in the add form and submit it.
    pub async fn create(&mut self, text: &str, category: Category) {
        self.list.update(Message::InputChanged(text.to_string()));
        self.list.update(Message::CategorySelected(category));
        self.dispatch(Message::Submit).await;
    }

    pub async fn delete(&mut self, id: TaskId) {
        self.dispatch(Message::Delete(id)).await;
    }

    pub async fn update_category(&mut self, id: TaskId, category: Category) {
        self.dispatch(Message::SetCategory(id, category)).await;
    }

    pub async fn toggle_completed(&mut self, id: TaskId, completed: bool) {
        self.dispatch(Message::ToggleCompleted(id, completed)).await;
    }
}
