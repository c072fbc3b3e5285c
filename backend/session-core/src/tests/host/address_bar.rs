use crate::host::address_bar::{query_param, without_query_param};
use crate::host::{AddressBar, InMemoryAddressBar};

use url::Url;

fn url(raw: &str) -> Url {
    Url::parse(raw).expect("test URL should parse")
}

/// **VALUE**: Verifies the bootstrap parameter is read from the query string.
///
/// **BUG THIS CATCHES**: Would catch treating an empty `auth_token=` as a token.
#[test]
fn given_query_with_param_when_reading_then_returns_value_only_if_non_empty() {
    // GIVEN: URLs with a value, an empty value and no parameter
    let with_value = url("https://app.example/?auth_token=abc&tab=jobs");
    let empty = url("https://app.example/?auth_token=");
    let missing = url("https://app.example/?tab=jobs");

    // WHEN/THEN
    assert_eq!(query_param(&with_value, "auth_token").as_deref(), Some("abc"));
    assert!(query_param(&empty, "auth_token").is_none());
    assert!(query_param(&missing, "auth_token").is_none());
}

/// **VALUE**: Verifies only the named parameter is stripped.
///
/// **WHY THIS MATTERS**: Other query parameters belong to the page and must survive.
///
/// **BUG THIS CATCHES**: Would catch clearing the whole query or reordering the rest.
#[test]
fn given_other_params_when_stripping_then_keeps_them() {
    // GIVEN: A URL with the token between two other parameters
    let original = url("https://app.example/jobs?tab=open&auth_token=abc&sort=date#top");

    // WHEN: Removing the token parameter
    let stripped = without_query_param(&original, "auth_token");

    // THEN: Everything else is intact
    assert_eq!(stripped.as_str(), "https://app.example/jobs?tab=open&sort=date#top");
}

/// **VALUE**: Verifies an emptied query drops the `?`.
///
/// **BUG THIS CATCHES**: Would catch leaving a dangling `?` in the visible address.
#[test]
fn given_only_param_when_stripping_then_drops_question_mark() {
    // GIVEN: The token is the only parameter
    let original = url("https://app.example/jobs?auth_token=abc");

    // WHEN: Removing it
    let stripped = without_query_param(&original, "auth_token");

    // THEN: No query remains
    assert_eq!(stripped.as_str(), "https://app.example/jobs");
}

/// **VALUE**: Verifies `replace_url` does not add a history entry while `navigate` does.
///
/// **BUG THIS CATCHES**: Would catch a bootstrap strip that lets "back" return to the token URL.
#[test]
fn given_in_memory_bar_when_replacing_then_history_length_is_unchanged() {
    // GIVEN: A bar at a URL
    let bar = InMemoryAddressBar::parse("https://app.example/?auth_token=abc").expect("parse");

    // WHEN: Replacing, then navigating
    bar.replace_url(url("https://app.example/"));
    let after_replace = bar.history_len();
    bar.navigate(url("https://app.example/jobs"));

    // THEN: Only navigate grows history
    assert_eq!(after_replace, 1);
    assert_eq!(bar.history_len(), 2);
    assert_eq!(bar.current_url().as_str(), "https://app.example/jobs");
}
