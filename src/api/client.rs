//! Synchronous client for the task service
//!
//! One agent per process; connections are reused across calls. Reads
//! always hit the service (nothing is cached client-side) and no
//! timeouts are set beyond the library defaults.

use serde::de::DeserializeOwned;

use super::error::{ApiError, ApiOperation};
use crate::domain::{Task, TaskCreate, TaskState, TaskUpdate};

/// Client for the remote task service
#[derive(Debug, Clone)]
pub struct ApiClient {
    agent: ureq::Agent,
    base_url: String,
}

impl ApiClient {
    /// Creates a client for the given base URL (trailing slashes are
    /// trimmed)
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            agent: ureq::AgentBuilder::new().build(),
            base_url,
        }
    }

    /// The base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, op: ApiOperation, path: &str) -> Result<ureq::Response, ApiError> {
        self.agent
            .get(&self.url(path))
            .set("Accept", "application/json")
            .call()
            .map_err(|err| ApiError::from_ureq(op, err))
    }

    fn post_empty(&self, op: ApiOperation, path: &str) -> Result<ureq::Response, ApiError> {
        self.agent
            .post(&self.url(path))
            .set("Accept", "application/json")
            .call()
            .map_err(|err| ApiError::from_ureq(op, err))
    }

    fn delete(&self, op: ApiOperation, path: &str) -> Result<ureq::Response, ApiError> {
        self.agent
            .delete(&self.url(path))
            .set("Accept", "application/json")
            .call()
            .map_err(|err| ApiError::from_ureq(op, err))
    }

    /// Fetches all tasks
    pub fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        let op = ApiOperation::ListTasks;
        decode(op, self.get(op, "/tasks")?)
    }

    /// Fetches a single task
    pub fn get_task(&self, id: i64) -> Result<Task, ApiError> {
        let op = ApiOperation::GetTask;
        decode(op, self.get(op, &format!("/tasks/{}", id))?)
    }

    /// Creates a task; the service assigns the id and timestamps
    pub fn create_task(&self, body: &TaskCreate) -> Result<Task, ApiError> {
        let op = ApiOperation::CreateTask;
        let response = self
            .agent
            .post(&self.url("/tasks"))
            .set("Accept", "application/json")
            .send_json(body)
            .map_err(|err| ApiError::from_ureq(op, err))?;
        decode(op, response)
    }

    /// Partially updates a task; absent fields stay unchanged
    pub fn update_task(&self, id: i64, body: &TaskUpdate) -> Result<Task, ApiError> {
        let op = ApiOperation::UpdateTask;
        let response = self
            .agent
            .request("PATCH", &self.url(&format!("/tasks/{}", id)))
            .set("Accept", "application/json")
            .send_json(body)
            .map_err(|err| ApiError::from_ureq(op, err))?;
        decode(op, response)
    }

    /// Deletes a task
    pub fn delete_task(&self, id: i64) -> Result<(), ApiError> {
        self.delete(ApiOperation::DeleteTask, &format!("/tasks/{}", id))?;
        Ok(())
    }

    /// Moves a task to a new workflow state
    pub fn set_task_state(&self, id: i64, state: TaskState) -> Result<Task, ApiError> {
        let op = ApiOperation::SetTaskState;
        let path = format!("/tasks/{}/state/{}", id, state.wire_name());
        decode(op, self.post_empty(op, &path)?)
    }

    /// Adds a blocker edge: `blocker_id` must complete before `task_id`
    pub fn add_blocker(&self, task_id: i64, blocker_id: i64) -> Result<(), ApiError> {
        let path = format!("/dependencies/{}/blockers/{}", task_id, blocker_id);
        self.post_empty(ApiOperation::AddBlocker, &path)?;
        Ok(())
    }

    /// Removes a blocker edge
    pub fn remove_blocker(&self, task_id: i64, blocker_id: i64) -> Result<(), ApiError> {
        let path = format!("/dependencies/{}/blockers/{}", task_id, blocker_id);
        self.delete(ApiOperation::RemoveBlocker, &path)?;
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(op: ApiOperation, response: ureq::Response) -> Result<T, ApiError> {
    response
        .into_json::<T>()
        .map_err(|source| ApiError::Decode { op, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_trimmed() {
        let client = ApiClient::new("https://api.example.test///");
        assert_eq!(client.base_url(), "https://api.example.test");
    }

    #[test]
    fn url_joins_paths() {
        let client = ApiClient::new("https://api.example.test");
        assert_eq!(client.url("/tasks/7"), "https://api.example.test/tasks/7");
    }
}
