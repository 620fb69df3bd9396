//! OktaClient Tests
//!
//! Tests for:
//! - Token header on management calls
//! - Profile fallbacks when listing users
//! - Idempotent membership writes
//! - Deactivate-then-delete for users
//! - Primary authentication outcomes

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hrm_directory::{
    reconcile, DirectoryClient, DirectoryError, NewGroup, NewUser, OktaClient, OktaConfig,
};

const TOKEN: &str = "test-api-token";

fn client_for(server: &MockServer) -> OktaClient {
    OktaClient::new(
        OktaConfig::new(server.uri(), TOKEN).with_timeout(Duration::from_secs(2)),
    )
    .unwrap()
}

#[test]
fn test_missing_configuration_is_rejected() {
    let result = OktaClient::new(OktaConfig::new("", TOKEN));
    assert!(matches!(result, Err(DirectoryError::Configuration { .. })));

    let result = OktaClient::new(OktaConfig::new("https://example.okta.com", ""));
    assert!(matches!(result, Err(DirectoryError::Configuration { .. })));
}

#[tokio::test]
async fn test_list_users_sends_token_and_applies_fallbacks() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users"))
        .and(header("Authorization", "SSWS test-api-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "00u1",
                "profile": { "firstName": "Ada", "lastName": "Lovelace", "email": "ada@example.com" }
            },
            {
                "id": "00u2",
                "profile": {
                    "displayName": "Grace Hopper",
                    "title": "Engineering",
                    "login": "grace@example.com"
                }
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let users = client_for(&server).list_users().await.unwrap();

    assert_eq!(users.len(), 2);
    assert_eq!(users[0].display_name, "Ada Lovelace");
    assert_eq!(users[0].title, "No Title");
    assert_eq!(users[0].login, "ada@example.com");
    assert_eq!(users[1].display_name, "Grace Hopper");
    assert_eq!(users[1].title, "Engineering");
}

#[tokio::test]
async fn test_error_status_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/groups"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let err = client_for(&server).list_groups().await.unwrap_err();
    assert_eq!(err.http_status(), Some(403));
}

#[tokio::test]
async fn test_get_missing_group_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/groups/00gmissing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client_for(&server).get_group("00gmissing").await.unwrap_err();
    assert!(matches!(err, DirectoryError::NotFound { .. }));
}

#[tokio::test]
async fn test_unknown_user_and_group_are_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users/00umissing/groups"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/groups/00gmissing/users"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/users/00umissing/lifecycle/deactivate"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/groups/00gmissing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let errors = [
        client.groups_for_user("00umissing").await.unwrap_err(),
        client.group_members("00gmissing").await.unwrap_err(),
        client.delete_user("00umissing").await.unwrap_err(),
        client.delete_group("00gmissing").await.unwrap_err(),
    ];
    for err in errors {
        assert!(matches!(err, DirectoryError::NotFound { .. }), "got {:?}", err);
    }
}

#[tokio::test]
async fn test_create_user_posts_profile_and_password() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/users"))
        .and(query_param("activate", "true"))
        .and(body_json(json!({
            "profile": {
                "firstName": "Ada",
                "lastName": "Lovelace",
                "email": "ada@example.com",
                "login": "ada@example.com",
                "displayName": "Ada Lovelace"
            },
            "credentials": { "password": { "value": "s3cret" } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "00unew" })))
        .expect(1)
        .mount(&server)
        .await;

    let id = client_for(&server)
        .create_user(&NewUser {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password: "s3cret".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(id, "00unew");
}

#[tokio::test]
async fn test_create_group_uses_name_as_description() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/groups"))
        .and(body_json(json!({ "profile": { "name": "Ops", "description": "Ops" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "00gops" })))
        .expect(1)
        .mount(&server)
        .await;

    let id = client_for(&server)
        .create_group(&NewGroup { name: "Ops".to_string() })
        .await
        .unwrap();

    assert_eq!(id, "00gops");
}

#[tokio::test]
async fn test_add_member_is_a_put() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/groups/00g1/users/00u1"))
        .and(header("Authorization", "SSWS test-api-token"))
        .respond_with(ResponseTemplate::new(204))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.add_member("00u1", "00g1").await.unwrap();
    client.add_member("00u1", "00g1").await.unwrap();
}

#[tokio::test]
async fn test_remove_absent_member_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/groups/00g1/users/00u1"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server).remove_member("00u1", "00g1").await.unwrap();
}

#[tokio::test]
async fn test_remove_member_server_error_fails() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/groups/00g1/users/00u1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client_for(&server).remove_member("00u1", "00g1").await.unwrap_err();
    assert_eq!(err.http_status(), Some(500));
}

#[tokio::test]
async fn test_delete_user_deactivates_first() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/users/00u1/lifecycle/deactivate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/users/00u1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server).delete_user("00u1").await.unwrap();
}

#[tokio::test]
async fn test_delete_user_stops_when_deactivation_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/users/00u1/lifecycle/deactivate"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/users/00u1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    assert!(client_for(&server).delete_user("00u1").await.is_err());
}

#[tokio::test]
async fn test_find_user_by_login_searches_profile() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users"))
        .and(query_param("search", "profile.login eq \"ada@example.com\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "00u1", "profile": { "login": "ada@example.com", "displayName": "Ada" } }
        ])))
        .mount(&server)
        .await;

    let user = client_for(&server)
        .find_user_by_login("ada@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.id, "00u1");
}

#[tokio::test]
async fn test_find_user_by_login_escapes_quotes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users"))
        .and(query_param("search", r#"profile.login eq "a\"b@example.com""#))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let user = client_for(&server)
        .find_user_by_login("a\"b@example.com")
        .await
        .unwrap();
    assert!(user.is_none());
}

#[tokio::test]
async fn test_authenticate_accepts_only_ok() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/authn"))
        .and(body_json(json!({ "username": "ada@example.com", "password": "right" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "SUCCESS" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/authn"))
        .and(body_json(json!({ "username": "ada@example.com", "password": "wrong" })))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.authenticate("ada@example.com", "right").await);
    assert!(!client.authenticate("ada@example.com", "wrong").await);
}

#[tokio::test]
async fn test_authenticate_unreachable_is_false() {
    let client = OktaClient::new(
        OktaConfig::new("http://127.0.0.1:1", TOKEN).with_timeout(Duration::from_millis(500)),
    )
    .unwrap();

    assert!(!client.authenticate("ada@example.com", "pw").await);
}

#[tokio::test]
async fn test_reconcile_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users/00u1/groups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "00gA", "profile": { "name": "A" } },
            { "id": "00gB", "profile": { "name": "B" } }
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/groups/00gC/users/00u1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/groups/00gA/users/00u1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let desired = ["00gB", "00gC"].iter().map(|s| s.to_string()).collect();
    let report = reconcile(&client_for(&server), "00u1", &desired).await.unwrap();

    assert_eq!(report.added, vec!["00gC".to_string()]);
    assert_eq!(report.removed, vec!["00gA".to_string()]);
}

#[tokio::test]
async fn test_reconcile_lookup_failure_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users/00u1/groups"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let desired = ["00gC"].iter().map(|s| s.to_string()).collect();
    assert!(reconcile(&client_for(&server), "00u1", &desired).await.is_err());
}
