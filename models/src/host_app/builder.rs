use crate::error::model_error::ModelError;
use crate::host_app::BUILD_UPLOAD_FOLDER;
use crate::{ErrorLocation, HostAppConfig};

use std::panic::Location;

/// Builder for validated [`HostAppConfig`] values of a recognized build URL.
///
/// Derives `workspace_id` as `{project_id}-{task_id}` and fills the fixed
/// upload folder.
#[derive(Debug, Default)]
pub struct HostAppConfigBuilder {
    base_url: Option<String>,
    user_id: Option<String>,
    project_id: Option<String>,
    task_id: Option<String>,
}

impl HostAppConfigBuilder {
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_task_id(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }

    /// Build the config with validation.
    #[track_caller]
    pub fn build(self) -> Result<HostAppConfig, ModelError> {
        let base_url = required(self.base_url, "Base URL")?;

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ModelError::Validation {
                message: format!("Invalid base URL format: {base_url}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let user_id = required(self.user_id, "User ID")?;
        let project_id = required(self.project_id, "Project ID")?;
        let task_id = required(self.task_id, "Task ID")?;
        let workspace_id = format!("{project_id}-{task_id}");

        Ok(HostAppConfig {
            user_id: Some(user_id),
            project_id: Some(project_id),
            task_id: Some(task_id),
            workspace_id: Some(workspace_id),
            upload_folder: Some(String::from(BUILD_UPLOAD_FOLDER)),
            base_url: Some(base_url),
            is_valid_build_url: true,
        })
    }
}

#[track_caller]
fn required(value: Option<String>, field: &str) -> Result<String, ModelError> {
    match value {
        None => Err(ModelError::validation(format!("{field} is required"))),
        Some(value) if value.is_empty() => {
            Err(ModelError::validation(format!("{field} cannot be empty")))
        }
        Some(value) => Ok(value),
    }
}
