use rollclaim_core::config::EmptyReportPolicy;
use rollclaim_core::ClaimMessage;
use rollclaim_services::{InspectClient, InspectError, InspectView, ViewUpdate};

use crate::*;

#[tokio::test]
async fn test_inspect_returns_first_report_as_text() {
    let mock = InspectMock::default();
    let list = ClaimMessage::get_claim_list().encode().unwrap();
    mock.respond(
        &list,
        vec![
            text_report(r#"[{"id":"bafk1","status":"open","value":250000}]"#),
            text_report("ignored"),
        ],
    );
    let url = mock.start().await.unwrap();

    let client = InspectClient::new(LOCAL_CHAIN_ID, &url);
    let text = client
        .inspect(&ClaimMessage::get_claim_list())
        .await
        .unwrap();
    assert_eq!(
        text.as_deref(),
        Some(r#"[{"id":"bafk1","status":"open","value":250000}]"#)
    );

    let claims: Vec<rollclaim_core::model::ClaimSummary> =
        serde_json::from_str(&text.unwrap()).unwrap();
    assert_eq!(claims[0].value, 250_000);

    // The server saw the encoded message, percent-decoded from the path.
    assert_eq!(mock.seen(), [r#"{"action":"getClaimList"}"#]);
}

#[tokio::test]
async fn test_inspect_without_reports_is_none() {
    let mock = InspectMock::default();
    let url = mock.start().await.unwrap();

    let client = InspectClient::new(LOCAL_CHAIN_ID, &url);
    let message = ClaimMessage::show_claim("bafkmissing").unwrap();
    assert_eq!(client.inspect(&message).await.unwrap(), None);

    // A polling view keeps what it showed unless told to clear.
    let mut view = InspectView::new(EmptyReportPolicy::Retain);
    view.apply(Some("previous".into()));
    assert_eq!(view.apply(client.inspect(&message).await.unwrap()), ViewUpdate::Retained);
    assert_eq!(view.shown(), Some("previous"));
}

#[tokio::test]
async fn test_inspect_uses_active_chain_from_config() {
    let mock = InspectMock::default();
    let user = ClaimMessage::show_user("0xabc").unwrap().encode().unwrap();
    mock.respond(&user, vec![text_report(r#"{"totalClaims":1}"#)]);
    let url = mock.start().await.unwrap();

    let config = config_for("http://127.0.0.1:1", &url);
    let client = InspectClient::from_config(&config).unwrap();
    let text = client
        .inspect(&ClaimMessage::show_user("0xabc").unwrap())
        .await
        .unwrap();
    assert_eq!(text.as_deref(), Some(r#"{"totalClaims":1}"#));
}

#[tokio::test]
async fn test_inspect_http_error_is_transport_error() {
    let mock = InspectMock::default();
    let url = mock.start().await.unwrap();

    // No route under this base path.
    let client = InspectClient::new(LOCAL_CHAIN_ID, &format!("{url}/elsewhere"));
    let err = client
        .inspect(&ClaimMessage::get_claim_list())
        .await
        .unwrap_err();
    assert!(matches!(err, InspectError::Transport(_)));
}

#[tokio::test]
async fn test_inspect_without_endpoint_is_aborted() {
    let config = config_for("http://127.0.0.1:1", "");
    let client = InspectClient::from_config(&config).unwrap();
    let err = client
        .inspect(&ClaimMessage::get_claim_list())
        .await
        .unwrap_err();
    assert!(matches!(err, InspectError::NoEndpoint(_)));
}
