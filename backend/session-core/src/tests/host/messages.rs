use crate::host::{HostMessage, OriginPolicy};

use serde_json::json;

/// **VALUE**: Verifies a well-formed auth token message yields its token.
///
/// **BUG THIS CATCHES**: Would catch matching on the wrong discriminator field.
#[test]
fn given_auth_token_message_when_reading_token_then_returns_it() {
    // GIVEN: A message in the host's auth token format
    let message = HostMessage::new(
        "https://host.example",
        json!({"type": "CREAO_AUTH_TOKEN", "token": "pushed"}),
    );

    // WHEN: Extracting the token
    let token = message.auth_token().expect("token should be present");

    // THEN: It is the pushed value
    assert_eq!(token.as_str(), "pushed");
}

/// **VALUE**: Verifies unrelated or malformed messages are ignored.
///
/// **WHY THIS MATTERS**: The host window carries plenty of traffic that is not for us.
///
/// **BUG THIS CATCHES**: Would catch accepting empty tokens, non-string tokens or other types.
#[test]
fn given_other_messages_when_reading_token_then_returns_none() {
    // GIVEN: A spread of payloads that are not valid auth token messages
    let payloads = [
        json!({"type": "RESIZE", "token": "abc"}),
        json!({"type": "CREAO_AUTH_TOKEN"}),
        json!({"type": "CREAO_AUTH_TOKEN", "token": ""}),
        json!({"type": "CREAO_AUTH_TOKEN", "token": 42}),
        json!("CREAO_AUTH_TOKEN"),
        json!(null),
    ];

    // WHEN/THEN: None yield a token
    for payload in payloads {
        let message = HostMessage::new("https://host.example", payload.clone());
        assert!(message.auth_token().is_none(), "{payload} should be ignored");
    }
}

#[test]
fn given_json_line_when_deserializing_then_builds_host_message() {
    // GIVEN: The line format the binary reads from stdin
    let line = r#"{"origin": "https://host.example", "data": {"type": "CREAO_AUTH_TOKEN", "token": "t"}}"#;

    // WHEN: Deserializing
    let message: HostMessage = serde_json::from_str(line).expect("line should parse");

    // THEN: Origin and token are available
    assert_eq!(message.origin, "https://host.example");
    assert_eq!(message.auth_token().map(|t| t.as_str().to_owned()).as_deref(), Some("t"));
}

/// **VALUE**: Verifies an empty allow-list accepts every origin.
///
/// **BUG THIS CATCHES**: Would catch an unconfigured deployment silently rejecting all pushes.
#[test]
fn given_no_configured_origins_when_building_policy_then_any_origin_is_permitted() {
    // GIVEN: No origins, or only blank entries
    let empty = OriginPolicy::from_allowed(&[]);
    let blank = OriginPolicy::from_allowed(&[String::from("  ")]);

    // WHEN/THEN
    assert_eq!(empty, OriginPolicy::AnyOrigin);
    assert_eq!(blank, OriginPolicy::AnyOrigin);
    assert!(empty.permits("https://anything.example"));
}

/// **VALUE**: Verifies allow-list matching tolerates case and a trailing slash.
///
/// **BUG THIS CATCHES**: Would catch prefix matching that lets `https://host.example.evil` through.
#[test]
fn given_allow_list_when_checking_origins_then_only_listed_origins_pass() {
    // GIVEN: One allowed origin written with a trailing slash
    let policy = OriginPolicy::from_allowed(&[String::from("https://Host.example/")]);

    // WHEN/THEN
    assert!(policy.permits("https://host.example"));
    assert!(policy.permits("HTTPS://HOST.EXAMPLE/"));
    assert!(!policy.permits("https://host.example.evil"));
    assert!(!policy.permits("http://host.example"));
}
