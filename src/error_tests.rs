use super::*;

#[test]
fn http_status_mapping() {
    assert_eq!(AppError::user(ErrorCode::InvalidQuery, "oops").http_status(), 400);
    assert_eq!(AppError::not_found(ErrorCode::MessageNotFound, "missing").http_status(), 404);
    assert_eq!(AppError::auth(ErrorCode::Unauthorized, "no").http_status(), 401);
    assert_eq!(AppError::internal("panic").http_status(), 500);
}

#[test]
fn message_id_required_is_a_request_error() {
    let e = AppError::message_id_required();
    assert_eq!(e.http_status(), 400);
    assert_eq!(e.message(), "messageId is required");
    assert_eq!(e.code(), ErrorCode::MessageIdRequired);
    assert_eq!(e.to_string(), "message_id_required: messageId is required");
}

#[test]
fn codes_round_trip_through_their_wire_names() {
    for code in [ErrorCode::UserNotFound, ErrorCode::InvalidEmail, ErrorCode::WrongCredentials, ErrorCode::UnknownFeed] {
        let wire = serde_json::to_value(code).unwrap();
        assert_eq!(wire.as_str(), Some(code.as_str()));
        assert_eq!(ErrorCode::parse(code.as_str()), Some(code));
    }
    assert_eq!(ErrorCode::parse("no_such_code"), None);
}

#[tokio::test]
async fn into_response_carries_status_message_and_code() {
    let resp = AppError::not_found(ErrorCode::MessageNotFound, "Message not found").into_response();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(v["statusCode"], 404);
    assert_eq!(v["error"], "Not Found");
    assert_eq!(v["message"], "Message not found");
    assert_eq!(v["code"], "message_not_found");
}
