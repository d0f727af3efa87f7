use std::future::Future;

use crate::models::Project;

/// Durable storage of the full project list. There is no per-record API:
/// callers always hand over, and get back, the whole list.
pub trait ProjectRepository {
    /// All stored projects, in the order they were last saved. Empty if nothing was saved.
    fn load(&self) -> impl Future<Output = anyhow::Result<Vec<Project>>> + Send;
    /// Replace the stored set with `projects` in one transaction.
    fn save_all(&self, projects: &[Project]) -> impl Future<Output = anyhow::Result<()>> + Send;
}
