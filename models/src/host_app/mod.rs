//! Identifiers of the hosted build the app was served from.

pub mod builder;

use serde::Serialize;

/// Upload folder used by every recognized build deployment.
pub const BUILD_UPLOAD_FOLDER: &str = "resources";

/// Host application identifiers parsed from the page URL.
///
/// Only URLs of the form `{base}/builds/{user}/{project}/{task}/dist...`
/// carry identifiers; everything else produces [`HostAppConfig::unrecognized`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HostAppConfig {
    pub user_id: Option<String>,
    pub project_id: Option<String>,
    pub task_id: Option<String>,
    pub workspace_id: Option<String>,
    pub upload_folder: Option<String>,
    pub base_url: Option<String>,
    pub is_valid_build_url: bool,
}

impl HostAppConfig {
    pub fn unrecognized() -> Self {
        Self::default()
    }
}
