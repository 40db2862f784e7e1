use super::*;

// =============================================================================
// decode_response
// =============================================================================

#[test]
fn decode_current_profile() {
    let body = r#"{"data":{"currentProfile":{"gid":"g1","name":"Ann","email":"a@x.com","role":5}}}"#;
    let data: CurrentProfileData = decode_response(Operation::CurrentProfile, 200, body).unwrap();
    let profile = data.current_profile.unwrap();
    assert_eq!(profile.gid, "g1");
    assert_eq!(profile.role, 5);
}

#[test]
fn decode_ok_false_update_is_still_data() {
    let body = r#"{"data":{"profileUpdate":{"ok":false,"user":{"gid":"g1","name":null,"email":"a@x.com","role":1}}}}"#;
    let data: ProfileUpdateData = decode_response(Operation::ProfileUpdate, 200, body).unwrap();
    assert!(!data.profile_update.ok);
    assert_eq!(data.profile_update.user.unwrap().role, 1);
}

#[test]
fn decode_graphql_errors() {
    let body = r#"{"errors":[{"message":"first"},{"message":"second"}]}"#;
    let err = decode_response::<CurrentProfileData>(Operation::CurrentProfile, 200, body).unwrap_err();
    match err {
        ApiError::Graphql(messages) => assert_eq!(messages, vec!["first", "second"]),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn decode_missing_data() {
    let err = decode_response::<CurrentProfileData>(Operation::CurrentProfile, 200, "{}").unwrap_err();
    assert!(matches!(err, ApiError::MissingData("currentProfile")));
}

#[test]
fn decode_bad_status_with_graphql_errors() {
    let body = r#"{"errors":[{"message":"Only admin can change user roles"}]}"#;
    let err = decode_response::<ProfileUpdateData>(Operation::ProfileUpdate, 400, body).unwrap_err();
    match err {
        ApiError::Status { status, messages } => {
            assert_eq!(status, 400);
            assert_eq!(messages, vec!["Only admin can change user roles"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn decode_bad_status_with_plain_text() {
    let err = decode_response::<CurrentProfileData>(Operation::CurrentProfile, 403, "Malformed auth: None\n").unwrap_err();
    match err {
        ApiError::Status { status, messages } => {
            assert_eq!(status, 403);
            assert_eq!(messages, vec!["Malformed auth: None"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn decode_bad_status_with_empty_body() {
    let err = decode_response::<CurrentProfileData>(Operation::CurrentProfile, 502, "").unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 502, ref messages } if messages.is_empty()));
}

#[test]
fn decode_garbage_body() {
    let err = decode_response::<CurrentProfileData>(Operation::CurrentProfile, 200, "<html>").unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

// =============================================================================
// construction
// =============================================================================

#[test]
fn from_config_uses_configured_endpoint() {
    let client = GraphqlProfileClient::from_config(&ClientConfig::default());
    assert_eq!(client.endpoint(), "http://localhost:8080/graphql");
}

#[test]
fn status_error_display_joins_messages() {
    let err = ApiError::Status { status: 400, messages: vec!["a".to_owned(), "b".to_owned()] };
    assert_eq!(err.to_string(), "server responded 400: a; b");
}
