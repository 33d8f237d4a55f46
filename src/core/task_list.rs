use crate::config::{SyncPolicy, UpdatePolicy};
use crate::core::task::{Category, NewTask, Task, TaskId};
use crate::message::{Message, Request};

/// Local mirror of the remote task collection plus the add-form state.
///
/// `update` never touches the network: it mutates local state and hands back
/// the request (if any) the caller should perform. The request's completion
/// comes back in as another `Message`, so several calls can be outstanding at
/// once and their completions applied in whatever order they arrive.
#[derive(Debug, Clone, Default)]
pub struct TaskList {
    tasks: Vec<Task>,
    input: String,
    selected_category: Category,
    /// The task whose category menu is open, if any.
    open_menu: Option<TaskId>,
    policy: SyncPolicy,
    last_error: Option<String>,
}

impl TaskList {
    pub fn new(policy: SyncPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn selected_category(&self) -> Category {
        self.selected_category
    }

    pub fn open_menu(&self) -> Option<&TaskId> {
        self.open_menu.as_ref()
    }

    pub fn is_menu_open(&self, id: &TaskId) -> bool {
        self.open_menu.as_ref() == Some(id)
    }

    pub fn policy(&self) -> SyncPolicy {
        self.policy
    }

    /// The most recent failed store call, as logged.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn update(&mut self, message: Message) -> Option<Request> {
        match message {
            Message::Load => return Some(Request::ListTasks),

            Message::Loaded(Ok(tasks)) => {
                log::info!("Loaded {} tasks", tasks.len());
                self.tasks = tasks;
                self.open_menu = None;
            }

            Message::Loaded(Err(e)) => self.record_failure("load tasks", &e),

            Message::InputChanged(value) => {
                self.input = value;
            }

            Message::CategorySelected(category) => {
                self.selected_category = category;
            }

            Message::Submit => match NewTask::new(&self.input, self.selected_category) {
                Some(new) => return Some(Request::CreateTask(new)),
                None => log::debug!("Ignoring blank task input"),
            },

            Message::Created(Ok(task)) => {
                log::info!("Created task {} in {}", task.id, task.category);
                self.tasks.push(task);
                self.input.clear();
            }

            Message::Created(Err(e)) => self.record_failure("create task", &e),

            Message::Delete(id) => return Some(Request::DeleteTask(id)),

            Message::Deleted(id, Ok(())) => {
                let before = self.tasks.len();
                self.tasks.retain(|t| t.id != id);
                if self.tasks.len() == before {
                    log::debug!("Deleted task {} was not in the local list", id);
                }
                if self.is_menu_open(&id) {
                    self.open_menu = None;
                }
            }

            Message::Deleted(id, Err(e)) => {
                self.record_failure(&format!("delete task {}", id), &e)
            }

            Message::SetCategory(id, category) => {
                if self.is_menu_open(&id) {
                    self.open_menu = None;
                }
                if self.policy.category == UpdatePolicy::Optimistic {
                    self.modify_task(&id, |task| task.category = category);
                }
                return Some(Request::UpdateCategory(id, category));
            }

            Message::CategoryUpdated(id, category, Ok(())) => {
                if self.policy.category == UpdatePolicy::Confirmed {
                    self.modify_task(&id, |task| task.category = category);
                }
            }

            Message::CategoryUpdated(id, _, Err(e)) => {
                self.record_failure(&format!("update category of task {}", id), &e)
            }

            Message::ToggleCompleted(id, completed) => {
                if self.policy.completion == UpdatePolicy::Optimistic {
                    self.modify_task(&id, |task| task.completed = completed);
                }
                return Some(Request::UpdateCompleted(id, completed));
            }

            Message::CompletedUpdated(id, completed, Ok(())) => {
                if self.policy.completion == UpdatePolicy::Confirmed {
                    self.modify_task(&id, |task| task.completed = completed);
                }
            }

            Message::CompletedUpdated(id, _, Err(e)) => {
                self.record_failure(&format!("update completion of task {}", id), &e)
            }

            Message::OpenMenu(id) => {
                self.open_menu = Some(id);
            }

            Message::CloseMenu => {
                self.open_menu = None;
            }
        }

        None
    }

    fn modify_task(&mut self, id: &TaskId, f: impl FnOnce(&mut Task)) {
        match self.tasks.iter_mut().find(|t| &t.id == id) {
            Some(task) => f(task),
            None => log::debug!("Task {} is not in the local list", id),
        }
    }

    /// Failures never roll back local state and are never retried.
    fn record_failure(&mut self, action: &str, error: &dyn std::error::Error) {
        log::error!("Failed to {}: {}", action, error);
        self.last_error = Some(format!("{}: {}", action, error));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::StoreError;

    fn server_error() -> StoreError {
        StoreError::Status {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            body: "boom".to_string(),
        }
    }

    fn loaded(tasks: Vec<Task>) -> TaskList {
        let mut list = TaskList::default();
        assert_eq!(list.update(Message::Load), Some(Request::ListTasks));
        assert_eq!(list.update(Message::Loaded(Ok(tasks))), None);
        list
    }

    fn sample() -> TaskList {
        loaded(vec![
            Task::new(TaskId::number(1), "Buy milk", Category::NextActions),
            Task::new(TaskId::number(2), "Hear back from landlord", Category::WaitingFor),
            Task::new(TaskId::number(3), "Learn the cello", Category::SomedayMaybe),
        ])
    }

    fn ids(list: &TaskList) -> Vec<TaskId> {
        list.tasks().iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn load_replaces_with_store_order_and_closed_menu() {
        let mut list = sample();
        list.update(Message::OpenMenu(TaskId::number(2)));

        list.update(Message::Loaded(Ok(vec![
            Task::new(TaskId::number(9), "Nine", Category::WaitingFor),
            Task::new(TaskId::number(4), "Four", Category::NextActions),
        ])));
        assert_eq!(ids(&list), vec![TaskId::number(9), TaskId::number(4)]);
        assert_eq!(list.open_menu(), None);
    }

    #[test]
    fn load_single_item() {
        let task: Task =
            serde_json::from_str(r#"{"id":1,"text":"Buy milk","category":"Next Actions"}"#)
                .unwrap();
        let list = loaded(vec![task]);
        assert_eq!(list.tasks().len(), 1);
        let only = &list.tasks()[0];
        assert_eq!(only.text, "Buy milk");
        assert!(!only.completed);
        assert!(!list.is_menu_open(&only.id));
    }

    #[test]
    fn failed_load_keeps_previous_state() {
        let mut list = sample();
        list.update(Message::Loaded(Err(server_error())));
        assert_eq!(list.tasks().len(), 3);
        assert!(list.last_error().unwrap().contains("load tasks"));

        let mut fresh = TaskList::default();
        fresh.update(Message::Loaded(Err(server_error())));
        assert!(fresh.tasks().is_empty());
    }

    #[test]
    fn blank_submit_sends_nothing() {
        let mut list = sample();
        list.update(Message::InputChanged("  ".to_string()));
        list.update(Message::CategorySelected(Category::WaitingFor));
        assert_eq!(list.update(Message::Submit), None);
        assert_eq!(list.tasks().len(), 3);
        assert_eq!(list.input(), "  ");
    }

    #[test]
    fn submit_sends_trimmed_text_and_selected_category() {
        let mut list = TaskList::default();
        list.update(Message::InputChanged("  Call Bob ".to_string()));
        list.update(Message::CategorySelected(Category::WaitingFor));
        assert_eq!(
            list.update(Message::Submit),
            Some(Request::CreateTask(NewTask {
                text: "Call Bob".to_string(),
                category: Category::WaitingFor,
            }))
        );
        // Nothing is added until the store answers.
        assert!(list.tasks().is_empty());
        assert_eq!(list.input(), "  Call Bob ");
    }

    #[test]
    fn created_task_is_appended_and_input_cleared() {
        let mut list = sample();
        list.update(Message::InputChanged("Call Bob".to_string()));
        list.update(Message::Submit);
        let created = Task::new(TaskId::number(7), "Call Bob", Category::WaitingFor);
        list.update(Message::Created(Ok(created.clone())));

        assert_eq!(list.tasks().len(), 4);
        assert_eq!(list.tasks().last(), Some(&created));
        assert_eq!(list.input(), "");
    }

    #[test]
    fn failed_create_keeps_input() {
        let mut list = sample();
        list.update(Message::InputChanged("Call Bob".to_string()));
        list.update(Message::Submit);
        list.update(Message::Created(Err(server_error())));

        assert_eq!(list.tasks().len(), 3);
        assert_eq!(list.input(), "Call Bob");
    }

    #[test]
    fn delete_waits_for_success() {
        let mut list = sample();
        let id = TaskId::number(2);
        assert_eq!(
            list.update(Message::Delete(id.clone())),
            Some(Request::DeleteTask(id.clone()))
        );
        assert_eq!(list.tasks().len(), 3);

        list.update(Message::Deleted(id.clone(), Ok(())));
        assert_eq!(ids(&list), vec![TaskId::number(1), TaskId::number(3)]);
    }

    #[test]
    fn failed_delete_keeps_item() {
        let mut list = sample();
        list.update(Message::Delete(TaskId::number(3)));
        list.update(Message::Deleted(TaskId::number(3), Err(server_error())));
        assert!(list.get(&TaskId::number(3)).is_some());
        assert_eq!(list.tasks().len(), 3);
    }

    #[test]
    fn delete_closes_menu_of_removed_task() {
        let mut list = sample();
        list.update(Message::OpenMenu(TaskId::number(1)));
        list.update(Message::Deleted(TaskId::number(1), Ok(())));
        assert_eq!(list.open_menu(), None);
    }

    #[test]
    fn category_change_is_optimistic_by_default() {
        let mut list = sample();
        let id = TaskId::number(1);
        list.update(Message::OpenMenu(id.clone()));
        assert_eq!(
            list.update(Message::SetCategory(id.clone(), Category::SomedayMaybe)),
            Some(Request::UpdateCategory(id.clone(), Category::SomedayMaybe))
        );
        assert_eq!(list.get(&id).unwrap().category, Category::SomedayMaybe);
        assert_eq!(list.open_menu(), None);

        // No rollback on failure.
        list.update(Message::CategoryUpdated(
            id.clone(),
            Category::SomedayMaybe,
            Err(server_error()),
        ));
        assert_eq!(list.get(&id).unwrap().category, Category::SomedayMaybe);
        assert!(list.last_error().is_some());
    }

    #[test]
    fn completion_waits_for_success_by_default() {
        let mut list = sample();
        let id = TaskId::number(2);
        assert_eq!(
            list.update(Message::ToggleCompleted(id.clone(), true)),
            Some(Request::UpdateCompleted(id.clone(), true))
        );
        assert!(!list.get(&id).unwrap().completed);

        list.update(Message::CompletedUpdated(id.clone(), true, Err(server_error())));
        assert!(!list.get(&id).unwrap().completed);

        list.update(Message::CompletedUpdated(id.clone(), true, Ok(())));
        assert!(list.get(&id).unwrap().completed);
    }

    #[test]
    fn uniform_confirmed_policy_gates_category() {
        let mut list = TaskList::new(SyncPolicy::uniform(UpdatePolicy::Confirmed));
        list.update(Message::Loaded(Ok(vec![Task::new(TaskId::number(1), "a", Category::NextActions)])));
        let id = TaskId::number(1);

        list.update(Message::SetCategory(id.clone(), Category::WaitingFor));
        assert_eq!(list.get(&id).unwrap().category, Category::NextActions);
        list.update(Message::CategoryUpdated(id.clone(), Category::WaitingFor, Ok(())));
        assert_eq!(list.get(&id).unwrap().category, Category::WaitingFor);
    }

    #[test]
    fn uniform_optimistic_policy_applies_completion_immediately() {
        let mut list = TaskList::new(SyncPolicy::uniform(UpdatePolicy::Optimistic));
        list.update(Message::Loaded(Ok(vec![Task::new(TaskId::number(1), "a", Category::NextActions)])));
        let id = TaskId::number(1);

        list.update(Message::ToggleCompleted(id.clone(), true));
        assert!(list.get(&id).unwrap().completed);
        list.update(Message::CompletedUpdated(id.clone(), true, Err(server_error())));
        assert!(list.get(&id).unwrap().completed);
    }

    #[test]
    fn racing_updates_touch_only_their_own_field() {
        let mut list = sample();
        let id = TaskId::number(1);
        list.update(Message::SetCategory(id.clone(), Category::WaitingFor));
        list.update(Message::ToggleCompleted(id.clone(), true));

        // Completion lands first, category call fails afterwards.
        list.update(Message::CompletedUpdated(id.clone(), true, Ok(())));
        list.update(Message::CategoryUpdated(
            id.clone(),
            Category::WaitingFor,
            Err(server_error()),
        ));

        let task = list.get(&id).unwrap();
        assert!(task.completed);
        assert_eq!(task.category, Category::WaitingFor);
    }

    #[test]
    fn unknown_id_still_issues_request() {
        let mut list = sample();
        let ghost = TaskId::from("ghost");
        assert_eq!(
            list.update(Message::SetCategory(ghost.clone(), Category::WaitingFor)),
            Some(Request::UpdateCategory(ghost, Category::WaitingFor))
        );
        assert_eq!(list.tasks().len(), 3);
    }

    #[test]
    fn only_one_menu_open_at_a_time() {
        let mut list = sample();
        list.update(Message::OpenMenu(TaskId::number(1)));
        list.update(Message::OpenMenu(TaskId::number(3)));
        assert!(!list.is_menu_open(&TaskId::number(1)));
        assert!(list.is_menu_open(&TaskId::number(3)));
        list.update(Message::CloseMenu);
        assert_eq!(list.open_menu(), None);
    }
}
