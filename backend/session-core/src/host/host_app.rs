//! Build identifiers encoded in the page URL.

use models::{HostAppConfig, HostAppConfigBuilder};

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

/// `{base}/builds/{user}/{project}/{task}/dist...`
static BUILD_URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(https?://[^/]+)/builds/([^/]+)/([^/]+)/([^/]+)/dist")
        .expect("build URL pattern is a valid regex")
});

/// Parse host identifiers out of `url`.
///
/// Any URL that is not a build URL yields [`HostAppConfig::unrecognized`].
pub fn parse_host_app_config(url: &str) -> HostAppConfig {
    let Some(captures) = BUILD_URL_PATTERN.captures(url) else {
        debug!("Page URL is not a build URL: {url}");
        return HostAppConfig::unrecognized();
    };

    let result = HostAppConfigBuilder::default()
        .with_base_url(&captures[1])
        .with_user_id(&captures[2])
        .with_project_id(&captures[3])
        .with_task_id(&captures[4])
        .build();

    match result {
        Ok(config) => config,
        Err(e) => {
            warn!("Build URL matched but produced an invalid config: {e}");
            HostAppConfig::unrecognized()
        }
    }
}
