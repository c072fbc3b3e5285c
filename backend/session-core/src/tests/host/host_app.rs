use crate::host::parse_host_app_config;

/// **VALUE**: Verifies identifiers are pulled out of a build URL.
///
/// **WHY THIS MATTERS**: The embedding page encodes user, project and task in its path.
///
/// **BUG THIS CATCHES**: Would catch swapped capture groups or a wrong workspace id format.
#[test]
fn given_build_url_when_parsing_then_extracts_identifiers() {
    // GIVEN: A build URL with a query string
    let url = "https://host.example:8443/builds/u-1/p-2/t-3/dist/index.html?auth_token=abc";

    // WHEN: Parsing it
    let config = parse_host_app_config(url);

    // THEN: Every identifier is set
    assert!(config.is_valid_build_url);
    assert_eq!(config.base_url.as_deref(), Some("https://host.example:8443"));
    assert_eq!(config.user_id.as_deref(), Some("u-1"));
    assert_eq!(config.project_id.as_deref(), Some("p-2"));
    assert_eq!(config.task_id.as_deref(), Some("t-3"));
    assert_eq!(config.workspace_id.as_deref(), Some("p-2-t-3"));
    assert_eq!(config.upload_folder.as_deref(), Some("resources"));
}

/// **VALUE**: Verifies non-build URLs are reported as unrecognized.
///
/// **BUG THIS CATCHES**: Would catch partial matches filling in some identifiers.
#[test]
fn given_non_build_url_when_parsing_then_returns_unrecognized() {
    // GIVEN: URLs missing the dist segment, using another scheme, or unrelated
    let urls = [
        "https://host.example/builds/u/p/t",
        "ftp://host.example/builds/u/p/t/dist",
        "https://host.example/jobs",
        "about:blank",
    ];

    // WHEN/THEN: None are recognized
    for url in urls {
        let config = parse_host_app_config(url);
        assert!(!config.is_valid_build_url, "{url} should not be a build URL");
        assert!(config.user_id.is_none());
        assert!(config.workspace_id.is_none());
    }
}
