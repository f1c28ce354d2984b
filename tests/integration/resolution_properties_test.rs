//! Property tests for draft resolution
//!
//! Resolution is pure, so these run without a server.

use proptest::prelude::*;
use rest_composer::auth::AuthSpec;
use rest_composer::executor::{resolve_headers, ResolvedRequest};
use rest_composer::models::{Header, HttpMethod, RequestDraft};

fn any_method() -> impl Strategy<Value = HttpMethod> {
    prop::sample::select(HttpMethod::ALL.to_vec())
}

fn header_rows() -> impl Strategy<Value = Vec<Header>> {
    prop::collection::vec(
        ("[A-Za-z-]{0,8}", "[a-z0-9 ]{0,8}").prop_map(|(k, v)| Header::new(k, v)),
        0..8,
    )
}

proptest! {
    #[test]
    fn body_is_sent_only_for_body_methods(method in any_method(), body in ".{0,32}") {
        let draft = RequestDraft::new(method, "https://example.com").with_body(body.clone());
        let resolved = ResolvedRequest::from_draft(&draft);

        if matches!(method, HttpMethod::GET | HttpMethod::DELETE) {
            prop_assert_eq!(resolved.body, None);
        } else {
            prop_assert_eq!(resolved.body, Some(body));
        }
    }

    #[test]
    fn bearer_yields_exactly_one_authorization(rows in header_rows(), token in "[A-Za-z0-9]{1,16}") {
        let mut rows = rows;
        rows.push(Header::new("AUTHORIZATION", "Basic old"));
        let headers = resolve_headers(&rows, &AuthSpec::bearer(token.clone()));

        prop_assert_eq!(headers.count_ignore_case("authorization"), 1);
        let expected = format!("Bearer {}", token);
        prop_assert_eq!(headers.get_ignore_case("authorization"), Some(expected.as_str()));
    }

    #[test]
    fn resolved_headers_skip_blank_rows_and_keep_last_value(rows in header_rows()) {
        let headers = resolve_headers(&rows, &AuthSpec::None);

        for (key, value) in headers.iter() {
            prop_assert!(!key.is_empty());
            prop_assert!(!value.is_empty());
            let last = rows
                .iter()
                .rev()
                .find(|row| row.key == *key && !row.value.is_empty())
                .map(|row| row.value.as_str());
            prop_assert_eq!(Some(value.as_str()), last);
        }

        let distinct_keys = rows
            .iter()
            .filter(|row| !row.is_blank())
            .map(|row| row.key.as_str())
            .collect::<std::collections::HashSet<_>>();
        prop_assert_eq!(headers.len(), distinct_keys.len());
    }

    #[test]
    fn blank_urls_are_detected(spaces in "[ \t]{0,6}") {
        let draft = RequestDraft::new(HttpMethod::GET, spaces);
        prop_assert!(draft.has_blank_url());
    }
}
