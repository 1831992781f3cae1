//! Route tests for the user administration endpoints

#[cfg(test)]
mod tests {
    use crate::config::AppConfig;
    use crate::routes::create_router;
    use crate::state::AppState;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use crate::repositories::{InMemoryMerchantStore, InMemoryUserStore, UserStore};
    use pos_shared::{CreateUserRequest, NewUser};
    use std::sync::Arc;
    use proptest::prelude::*;
    use rstest::rstest;
    use serde_json::{json, Value};
    use tokio_util::sync::CancellationToken;
    use tower::ServiceExt;

    const MERCHANT: i64 = 1;
    const ADMIN_EMAIL: &str = "owner@shop.test";
    const ADMIN_PASSWORD: &str = "owner-password";

    /// In-memory app with one admin user; returns the router and a bearer header
    async fn app_with_admin() -> (Router, String) {
        let state = AppState::in_memory(AppConfig::default());
        let cancel = CancellationToken::new();
        state
            .user_admin()
            .create_user(
                &cancel,
                MERCHANT,
                CreateUserRequest {
                    email: ADMIN_EMAIL.to_string(),
                    password: ADMIN_PASSWORD.to_string(),
                    first_name: "Owner".to_string(),
                    last_name: None,
                },
            )
            .await
            .unwrap();

        let issued = state
            .auth()
            .login(&cancel, ADMIN_EMAIL, ADMIN_PASSWORD)
            .await
            .unwrap();
        (create_router(state), format!("Bearer {}", issued.token))
    }

    /// In-memory app and a token minted directly, without hashing work
    fn app_with_token() -> (Router, String) {
        let state = AppState::in_memory(AppConfig::default());
        let issued = state.jwt().issue(1, ADMIN_EMAIL, MERCHANT).unwrap();
        (create_router(state), format!("Bearer {}", issued.token))
    }

    async fn call(
        app: &Router,
        method: &str,
        uri: &str,
        auth: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder.header("Authorization", auth);
        }
        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_login_returns_bearer_token() {
        let (app, _) = app_with_admin().await;

        let (status, body) = call(
            &app,
            "POST",
            "/api/login",
            None,
            Some(json!({"email": ADMIN_EMAIL, "password": ADMIN_PASSWORD})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tokenType"], "Bearer");
        assert!(body["accessToken"].as_str().is_some_and(|t| !t.is_empty()));
        assert!(body["tokenExpiresIn"].is_string());
    }

    #[rstest]
    #[case(json!({"email": "", "password": "x"}))]
    #[case(json!({"email": "a@b.co", "password": ""}))]
    #[case(json!({"email": "a@b.co"}))]
    #[tokio::test]
    async fn test_login_rejects_incomplete_body(#[case] body: Value) {
        let (app, _) = app_with_admin().await;

        let (status, body) = call(&app, "POST", "/api/login", None, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_PARAMETERS");
    }

    #[tokio::test]
    async fn test_create_get_delete_flow() {
        let (app, auth) = app_with_admin().await;

        let (status, body) = call(
            &app,
            "POST",
            "/api/users",
            Some(&auth),
            Some(json!({
                "email": "cashier@shop.test",
                "password": "cashier-pass",
                "firstname": "Cash",
                "lastname": "Ier",
                "merchantID": 999
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let user = &body["user"];
        assert_eq!(user["email"], "cashier@shop.test");
        assert_eq!(user["merchantID"], MERCHANT);
        assert_eq!(user["firstname"], "Cash");
        assert!(user.get("password_hash").is_none());
        assert!(user.get("password").is_none());
        let id = user["id"].as_i64().unwrap();

        let uri = format!("/api/users/{}", id);
        let (status, fetched) = call(&app, "GET", &uri, Some(&auth), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["id"], id);

        let (status, _) = call(&app, "DELETE", &uri, Some(&auth), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = call(&app, "DELETE", &uri, Some(&auth), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "USER_NOT_FOUND");

        let (status, _) = call(&app, "GET", &uri, Some(&auth), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let (app, auth) = app_with_admin().await;
        let body = json!({
            "email": ADMIN_EMAIL,
            "password": "another-pass",
            "firstname": "Again"
        });

        let (status, body) = call(&app, "POST", "/api/users", Some(&auth), Some(body)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "EMAIL_NOT_UNIQUE");
    }

    #[tokio::test]
    async fn test_create_validation_messages() {
        let (app, auth) = app_with_admin().await;

        let (status, body) = call(
            &app,
            "POST",
            "/api/users",
            Some(&auth),
            Some(json!({"email": "x@y.z", "password": "short", "firstname": "X"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("at least 8 characters"));
    }

    #[tokio::test]
    async fn test_list_echoes_page_and_counts_merchant_users() {
        let (app, auth) = app_with_admin().await;

        for i in 0..3 {
            let (status, _) = call(
                &app,
                "POST",
                "/api/users",
                Some(&auth),
                Some(json!({
                    "email": format!("staff{}@shop.test", i),
                    "password": "staff-password",
                    "firstname": "Staff"
                })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, body) = call(&app, "GET", "/api/users?limit=2&page=4", Some(&auth), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["page"], 4);
        assert_eq!(body["totalData"], 4);
        let users = body["users"].as_array().unwrap();
        assert_eq!(users.len(), 2);

        let last = users[1]["id"].as_i64().unwrap();
        let (_, next) = call(
            &app,
            "GET",
            &format!("/api/users?limit=2&lastID={}", last),
            Some(&auth),
            None,
        )
        .await;
        let next_ids: Vec<i64> = next["users"]
            .as_array()
            .unwrap()
            .iter()
            .map(|u| u["id"].as_i64().unwrap())
            .collect();
        assert_eq!(next_ids.len(), 2);
        assert!(next_ids.iter().all(|id| *id > last));
        assert_eq!(next["page"], 1);
    }

    #[tokio::test]
    async fn test_non_numeric_user_id_is_bad_request() {
        let (app, auth) = app_with_token();

        let (status, body) = call(&app, "GET", "/api/users/abc", Some(&auth), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_PARAMETERS");
    }

    #[tokio::test]
    async fn test_oversized_limit_is_clamped_not_rejected() {
        let users = InMemoryUserStore::new();
        let cancel = CancellationToken::new();
        for i in 0..120 {
            users
                .create(
                    &cancel,
                    NewUser {
                        merchant_id: MERCHANT,
                        email: format!("clerk{}@shop.test", i),
                        password_hash: "unused".to_string(),
                        first_name: "Clerk".to_string(),
                        last_name: None,
                    },
                )
                .await
                .unwrap();
        }
        let state = AppState::with_stores(
            AppConfig::default(),
            Arc::new(users),
            Arc::new(InMemoryMerchantStore::new()),
        );
        let issued = state.jwt().issue(1, "clerk0@shop.test", MERCHANT).unwrap();
        let app = create_router(state);
        let auth = format!("Bearer {}", issued.token);

        let (status, body) = call(&app, "GET", "/api/users?limit=500", Some(&auth), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["users"].as_array().unwrap().len(), 100);
        assert_eq!(body["totalData"], 120);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        /// Property: malformed or negative paging parameters are rejected with 400
        #[test]
        fn prop_bad_paging_parameters_return_400(
            query in prop_oneof![
                "[a-z]{1,8}".prop_map(|s| format!("limit={}", s)),
                (-10_000i64..1).prop_map(|n| format!("limit={}", n)),
                (-10_000i64..0).prop_map(|n| format!("lastID={}", n)),
                "[a-z]{1,8}".prop_map(|s| format!("lastID={}", s)),
                "[a-z]{1,8}".prop_map(|s| format!("page={}", s)),
            ]
        ) {
            let (app, auth) = app_with_token();
            let status = tokio_test::block_on(async {
                call(&app, "GET", &format!("/api/users?{}", query), Some(&auth), None).await.0
            });

            prop_assert_eq!(status, StatusCode::BAD_REQUEST);
        }
    }
}
