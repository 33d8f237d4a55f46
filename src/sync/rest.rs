use reqwest::{Client, Response, Url};

use super::{StoreError, TaskStore};
use crate::core::task::{Category, CategoryPatch, CompletedPatch, NewTask, Task, TaskId};

/// HTTP client for the `/tasks` REST store.
#[derive(Debug, Clone)]
pub struct RestClient {
    base_url: Url,
    http: Client,
}

impl RestClient {
    pub fn new(base_url: &str) -> Result<Self, StoreError> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| StoreError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::InvalidUrl(base_url.to_string()));
        }
        let http = Client::builder().build()?;
        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base URL, keeping any prefix it carries.
    /// Each segment is percent-encoded on its own, so ids cannot escape `/tasks/`.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn task_url(&self, id: &TaskId) -> Result<Url, StoreError> {
        self.endpoint(&["tasks", id.to_string().as_str()])
    }
}

/// Turn a non-2xx response into `StoreError::Status`, keeping the body for the log.
async fn check_status(resp: Response) -> Result<Response, StoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(StoreError::Status { status, body })
}

impl TaskStore for RestClient {
    async fn list_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let url = self.endpoint(&["tasks"])?;
        log::debug!("GET {}", url);
        let resp = check_status(self.http.get(url).send().await?).await?;
        let text = resp.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn create_task(&self, new: &NewTask) -> Result<Task, StoreError> {
        let url = self.endpoint(&["tasks"])?;
        log::debug!("POST {} ({:?}, {})", url, new.text, new.category);
        let resp = check_status(self.http.post(url).json(new).send().await?).await?;
        let text = resp.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn delete_task(&self, id: &TaskId) -> Result<(), StoreError> {
        let url = self.task_url(id)?;
        log::debug!("DELETE {}", url);
        check_status(self.http.delete(url).send().await?).await?;
        Ok(())
    }

    async fn update_category(&self, id: &TaskId, category: Category) -> Result<(), StoreError> {
        let url = self.task_url(id)?;
        log::debug!("PATCH {} category={}", url, category);
        let body = CategoryPatch { category };
        check_status(self.http.patch(url).json(&body).send().await?).await?;
        Ok(())
    }

    async fn update_completed(&self, id: &TaskId, completed: bool) -> Result<(), StoreError> {
        let url = self.endpoint(&["tasks", id.to_string().as_str(), "completed"])?;
        log::debug!("PATCH {} completed={}", url, completed);
        let body = CompletedPatch { completed };
        check_status(self.http.patch(url).json(&body).send().await?).await?;
        Ok(())
    }
}
