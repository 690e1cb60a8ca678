use std::io::Write;

use serde_json::{json, Value};
use tokio::task::JoinHandle;

use widget_inbox::config::ServerConfig;
use widget_inbox::identity::hmac::sign_subscriber_id;
use widget_inbox::server::{build_state, serve, AppState};
use widget_inbox::storage::seed::{demo_fixture, DEMO_APP_IDENTIFIER, DEMO_SUBSCRIBER_ID};

struct Server {
    base: String,
    state: AppState,
    handle: JoinHandle<()>,
}

impl Drop for Server {
    fn drop(&mut self) { self.handle.abort(); }
}

// Start the widget app on an ephemeral localhost port.
async fn start(config: ServerConfig) -> Server {
    let state = build_state(&config).expect("build state");
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind 127.0.0.1:0");
    let port = listener.local_addr().unwrap().port();
    let st = state.clone();
    let handle = tokio::spawn(async move {
        if let Err(e) = serve(listener, st).await {
            eprintln!("widget server task error: {e:?}");
        }
    });
    Server { base: format!("http://127.0.0.1:{port}"), state, handle }
}

impl Server {
    fn url(&self, path: &str) -> String { format!("{}/widgets{}", self.base, path) }

    async fn login(&self, client: &reqwest::Client) -> String {
        let resp = client
            .post(self.url("/session/initialize"))
            .json(&json!({ "subscriberId": DEMO_SUBSCRIBER_ID, "applicationIdentifier": DEMO_APP_IDENTIFIER }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let v: Value = resp.json().await.unwrap();
        v["token"].as_str().expect("token").to_string()
    }
}

async fn get_json(client: &reqwest::Client, url: &str, token: &str) -> (u16, Value) {
    let resp = client.get(url).bearer_auth(token).send().await.unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap_or(Value::Null))
}

async fn post_json(client: &reqwest::Client, url: &str, token: &str, body: Value) -> (u16, Value) {
    let resp = client.post(url).bearer_auth(token).json(&body).send().await.unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap_or(Value::Null))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn liveness_and_unauthorized_requests() {
    let srv = start(ServerConfig::default()).await;
    let client = reqwest::Client::new();
    let body = client.get(format!("{}/", srv.base)).send().await.unwrap().text().await.unwrap();
    assert_eq!(body, "widget ok");

    let resp = client.get(srv.url("/notifications/feed")).send().await.unwrap();
    assert_eq!(resp.status(), 401);
    let v: Value = resp.json().await.unwrap();
    assert_eq!(v["code"], "unauthorized");
    assert_eq!(v["statusCode"], 401);

    let (status, _) = get_json(&client, &srv.url("/organization"), "made-up-token").await;
    assert_eq!(status, 401);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn feed_counts_and_mark_flow() {
    let srv = start(ServerConfig::default()).await;
    let client = reqwest::Client::new();
    let token = srv.login(&client).await;

    let (status, feed) = get_json(&client, &srv.url("/notifications/feed?page=0"), &token).await;
    assert_eq!(status, 200);
    assert_eq!(feed["totalCount"], 3);
    assert_eq!(feed["pageSize"], 10);
    assert_eq!(feed["hasMore"], false);
    assert_eq!(feed["data"][0]["_id"], "msg_demo_3");

    let (_, c) = get_json(&client, &srv.url("/notifications/count"), &token).await;
    assert_eq!(c, json!({"count": 1}));
    let (_, c) = get_json(&client, &srv.url("/notifications/unseen?seen=false&feedIdentifier=general&feedIdentifier=billing"), &token).await;
    assert_eq!(c, json!({"count": 2}));

    let (status, marked) = post_json(
        &client,
        &srv.url("/messages/markAs"),
        &token,
        json!({"messageId": ["msg_demo_1"], "mark": {"read": true}}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(marked[0]["read"], true);
    assert_eq!(marked[0]["seen"], true);

    let (status, err) = post_json(&client, &srv.url("/messages/markAs"), &token, json!({"mark": {"seen": true}})).await;
    assert_eq!(status, 400);
    assert_eq!(err["message"], "messageId is required");

    let (status, read) = post_json(&client, &srv.url("/messages/msg_demo_3/read"), &token, Value::Null).await;
    assert_eq!(status, 200);
    assert_eq!(read.as_array().map(|a| a.len()), Some(1));

    let (status, _) = post_json(&client, &srv.url("/messages/unknown/seen"), &token, Value::Null).await;
    assert_eq!(status, 404);

    let (_, c) = get_json(&client, &srv.url("/notifications/unread?read=false"), &token).await;
    assert_eq!(c, json!({"count": 1}));
    let (status, c) = post_json(&client, &srv.url("/messages/read"), &token, json!({})).await;
    assert_eq!(status, 200);
    assert_eq!(c, json!({"count": 1}));
    let (_, c) = post_json(&client, &srv.url("/messages/seen"), &token, json!({"feedId": "general"})).await;
    assert_eq!(c, json!({"count": 0}));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn remove_actions_preferences_and_usage() {
    let srv = start(ServerConfig::default()).await;
    let client = reqwest::Client::new();
    let token = srv.login(&client).await;

    let resp = client.delete(srv.url("/messages/msg_demo_2")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let resp = client.delete(srv.url("/messages/msg_demo_2")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(resp.status(), 404);

    let (status, m) = post_json(
        &client,
        &srv.url("/messages/msg_demo_1/actions/primary"),
        &token,
        json!({"status": "done", "payload": {"choice": "yes"}}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(m["cta"]["action"]["status"], "done");
    assert_eq!(m["cta"]["action"]["result"], json!({"payload": {"choice": "yes"}, "type": "primary"}));

    let (status, _) = post_json(&client, &srv.url("/messages/msg_demo_1/actions/primary"), &token, json!({"status": "maybe"})).await;
    assert_eq!(status, 400);

    let (_, org) = get_json(&client, &srv.url("/organization"), &token).await;
    assert_eq!(org["_id"], "org_demo");

    let (_, prefs) = get_json(&client, &srv.url("/preferences"), &token).await;
    assert_eq!(prefs.as_array().map(|a| a.len()), Some(1));
    assert_eq!(prefs[0]["template"]["_id"], "tpl_welcome");

    let resp = client
        .patch(srv.url("/preferences/tpl_welcome"))
        .bearer_auth(&token)
        .json(&json!({"channel": {"type": "email", "enabled": false}}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let item: Value = resp.json().await.unwrap();
    assert_eq!(item["preference"]["channels"]["email"], false);
    assert_eq!(item["preference"]["enabled"], true);

    let resp = client
        .patch(srv.url("/preferences/tpl_security"))
        .bearer_auth(&token)
        .json(&json!({"enabled": false}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let (status, v) = post_json(&client, &srv.url("/usage/log"), &token, json!({"name": "Open Widget", "payload": {"x": 1}})).await;
    assert_eq!(status, 200);
    assert_eq!(v, json!({"success": true}));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn revoked_token_is_rejected() {
    let srv = start(ServerConfig::default()).await;
    let client = reqwest::Client::new();
    let token = srv.login(&client).await;
    let (status, _) = get_json(&client, &srv.url("/notifications/count"), &token).await;
    assert_eq!(status, 200);
    assert!(srv.state.sessions.logout(&token));
    let (status, _) = get_json(&client, &srv.url("/notifications/count"), &token).await;
    assert_eq!(status, 401);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn fixture_file_with_hmac_protected_environment() {
    let mut fixture = demo_fixture();
    fixture.environments[0].widget.notification_center_encryption = true;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(serde_json::to_string(&fixture).unwrap().as_bytes()).unwrap();

    let config = ServerConfig { data_file: Some(file.path().to_path_buf()), ..ServerConfig::default() };
    let srv = start(config).await;
    let client = reqwest::Client::new();

    let (status, err) = post_json(
        &client,
        &srv.url("/session/initialize"),
        "",
        json!({"subscriberId": DEMO_SUBSCRIBER_ID, "applicationIdentifier": DEMO_APP_IDENTIFIER, "hmacHash": "00ff"}),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(err["code"], "invalid_hmac");

    let hash = sign_subscriber_id("demo-api-key", DEMO_SUBSCRIBER_ID);
    let (status, v) = post_json(
        &client,
        &srv.url("/session/initialize"),
        "",
        json!({"subscriberId": DEMO_SUBSCRIBER_ID, "applicationIdentifier": DEMO_APP_IDENTIFIER, "hmacHash": hash}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(v["profile"]["subscriberId"], DEMO_SUBSCRIBER_ID);
}
