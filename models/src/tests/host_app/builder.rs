use crate::{HostAppConfigBuilder, ModelError};

/// **VALUE**: Verifies the derived fields of a recognized build URL.
///
/// **WHY THIS MATTERS**: `workspace_id` is not part of the URL, it is composed
/// from project and task. Downstream requests address the workspace with it.
///
/// **BUG THIS CATCHES**: Would catch a swapped join order or a missing
/// upload folder default.
#[test]
fn given_all_fields_when_building_then_derives_workspace_and_upload_folder() {
    // GIVEN: Builder with every component
    let builder = HostAppConfigBuilder::default()
        .with_base_url("https://apps.example.com")
        .with_user_id("u1")
        .with_project_id("p1")
        .with_task_id("t1");

    // WHEN: Building
    let config = builder.build().expect("valid config");

    // THEN: Derived fields are filled
    assert_eq!(config.workspace_id.as_deref(), Some("p1-t1"));
    assert_eq!(config.upload_folder.as_deref(), Some("resources"));
    assert_eq!(config.base_url.as_deref(), Some("https://apps.example.com"));
    assert!(config.is_valid_build_url);
}

/// **VALUE**: Verifies that a missing identifier is rejected.
///
/// **BUG THIS CATCHES**: Would catch a builder that silently produces a
/// "valid build" config with holes in it.
#[test]
fn given_missing_task_id_when_building_then_returns_validation_error() {
    // GIVEN: Builder without task id
    let builder = HostAppConfigBuilder::default()
        .with_base_url("https://apps.example.com")
        .with_user_id("u1")
        .with_project_id("p1");

    // WHEN: Building
    let result = builder.build();

    // THEN: Validation error names the field
    match result {
        Err(ModelError::Validation { message, .. }) => {
            assert_eq!(message, "Task ID is required");
        }
        Ok(config) => panic!("expected validation error, got {:?}", config),
    }
}

#[test]
fn given_empty_user_id_when_building_then_returns_validation_error() {
    let result = HostAppConfigBuilder::default()
        .with_base_url("https://apps.example.com")
        .with_user_id("")
        .with_project_id("p1")
        .with_task_id("t1")
        .build();

    match result {
        Err(ModelError::Validation { message, .. }) => {
            assert_eq!(message, "User ID cannot be empty");
        }
        Ok(config) => panic!("expected validation error, got {:?}", config),
    }
}

#[test]
fn given_non_http_base_url_when_building_then_returns_validation_error() {
    let result = HostAppConfigBuilder::default()
        .with_base_url("ftp://apps.example.com")
        .with_user_id("u1")
        .with_project_id("p1")
        .with_task_id("t1")
        .build();

    assert!(result.is_err(), "Only http(s) base URLs are accepted");
}
