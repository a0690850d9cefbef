use super::*;

#[test]
fn request_serde_roundtrips_with_type_tag() {
    let req = Request::Ping;
    let json = serde_json::to_string(&req).unwrap();
    assert_eq!(json, r#"{"type":"Ping"}"#);
    let back: Request = serde_json::from_str(&json).unwrap();
    assert_eq!(back, req);
}

#[test]
fn suggest_and_history_are_queries_others_are_not() {
    assert!(Request::Ping.is_query());
    assert!(Request::GetStatus.is_query());
    assert!(Request::Suggest {
        session_id: "s".into(),
        cwd: "/".into(),
        shell: "bash".into(),
        prefix: "".into(),
        version: None,
        max_results: 5,
    }
    .is_query());
    assert!(!Request::SessionEnd { session_id: "s".into() }.is_query());
}

#[test]
fn error_helper_sets_structured_code() {
    let resp = Response::error(E_INVALID_REQUEST, "missing session_id");
    match resp {
        Response::Error { code, message } => {
            assert_eq!(code.as_deref(), Some(E_INVALID_REQUEST));
            assert_eq!(message, "missing session_id");
        }
        _ => panic!("expected Error variant"),
    }
}

#[test]
fn response_serde_roundtrips() {
    let resp = Response::Pong;
    let json = serde_json::to_string(&resp).unwrap();
    let back: Response = serde_json::from_str(&json).unwrap();
    assert_eq!(back, resp);
}
