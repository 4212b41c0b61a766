// src/routes.rs

use axum::{
    extract::FromRef,
    middleware as axum_middleware,
    response::Redirect,
    routing::{get, post, put},
    Router,
};

use crate::{
    config::AppState,
    docs,
    handlers::{self, crud},
    middleware::auth::session_guard,
    services::{
        call_center_service::AgentService,
        nichos_service::CategoryService,
        page::CrudPage,
        perfiles_service::{LocationsPage, ProfilesPage},
        tecnicos_service::TechnicianService,
    },
};

/// As rotas de uma página CRUD: lista, linha de criação e edição em linha.
pub fn crud_routes<P>() -> Router<AppState>
where
    P: CrudPage + FromRef<AppState>,
{
    Router::new()
        .route("/"
               ,get(crud::get_page::<P>)
               .post(crud::submit_create::<P>)
        )
        .route("/draft", put(crud::stage_create::<P>))
        .route("/edit"
               ,put(crud::stage_edit::<P>)
               .delete(crud::cancel_edit::<P>)
        )
        .route("/edit/save", post(crud::save_edit::<P>))
        .route("/{id}"
               ,put(crud::update_record::<P>)
               .delete(crud::remove_record::<P>)
        )
        .route("/{id}/edit", post(crud::begin_edit::<P>))
}

pub fn build_router(app_state: AppState) -> Router {
    // Rotas públicas
    let public_routes = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/login", get(handlers::auth::login_page))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/session", get(handlers::auth::get_session))
        .route("/api-docs/openapi.json", get(docs::openapi_json));

    let tecnicos_routes = crud_routes::<TechnicianService>()
        .route("/{id}/password", put(handlers::tecnicos::set_password))
        .route("/{id}/password/reset", post(handlers::tecnicos::reset_password));

    let perfiles_routes = Router::new()
        .nest("/locations", crud_routes::<LocationsPage>())
        .nest("/profiles", crud_routes::<ProfilesPage>())
        .route("/active-location"
               ,get(handlers::perfiles::get_active_location)
               .put(handlers::perfiles::set_active_location)
        );

    // Tudo o que passa pelo guard de sessão
    let protected_routes = Router::new()
        .route("/", get(|| async { Redirect::to("/api/dashboard") }))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/me", get(handlers::auth::get_me))
        .route("/api/dashboard", get(handlers::dashboard::get_dashboard))
        .nest("/api/nichos", crud_routes::<CategoryService>())
        .nest("/api/tecnicos", tecnicos_routes)
        .nest("/api/call-center", crud_routes::<AgentService>())
        .nest("/api/perfiles-gmb", perfiles_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            session_guard,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        tests::{test_config, test_state, ADMIN_EMAIL, ADMIN_PASSWORD},
        AppState,
    };
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn send(
        app_state: &AppState,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value, Option<String>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = build_router(app_state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json, location)
    }

    async fn login(app_state: &AppState) -> String {
        let (status, body, _) = send(
            app_state,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn guarded_routes_wait_while_the_session_is_loading() {
        let app_state = AppState::new(test_config()).await.unwrap();

        let request = Request::builder().uri("/api/nichos").body(Body::empty()).unwrap();
        let response = build_router(app_state).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "1");
    }

    #[tokio::test]
    async fn anonymous_visitors_are_sent_to_login() {
        let app_state = test_state().await;

        let (status, _, location) = send(&app_state, Method::GET, "/api/dashboard", None, None).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location.as_deref(), Some("/login"));

        // As rotas públicas continuam abertas
        let (status, body, _) = send(&app_state, Method::GET, "/api/auth/session", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["loading"], false);
        assert!(body["user"].is_null());
    }

    #[tokio::test]
    async fn login_opens_the_console_for_the_session_token() {
        let app_state = test_state().await;
        let token = login(&app_state).await;

        let (status, body, _) = send(&app_state, Method::GET, "/api/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], ADMIN_EMAIL);

        let (_, _, location) = send(&app_state, Method::GET, "/", Some(&token), None).await;
        assert_eq!(location.as_deref(), Some("/api/dashboard"));

        // Um token que não é o da sessão atual não passa
        let (status, _, location) =
            send(&app_state, Method::GET, "/api/auth/me", Some("outro"), None).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location.as_deref(), Some("/login"));
    }

    #[tokio::test]
    async fn logout_closes_the_console_again() {
        let app_state = test_state().await;
        let token = login(&app_state).await;

        let (status, _, _) = send(&app_state, Method::POST, "/api/auth/logout", Some(&token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _, _) = send(&app_state, Method::GET, "/api/nichos", Some(&token), None).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn bad_login_payloads_and_credentials_are_rejected() {
        let app_state = test_state().await;

        let (status, body, _) = send(
            &app_state,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "no-es-un-email", "password": "123" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["details"]["email"].is_array());

        let (status, _, _) = send(
            &app_state,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": ADMIN_EMAIL, "password": "equivocada" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn nichos_page_create_edit_and_delete() {
        let app_state = test_state().await;
        let token = login(&app_state).await;
        let token = Some(token.as_str());

        let (status, body, _) = send(&app_state, Method::GET, "/api/nichos", token, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["records"].as_array().unwrap().len(), 7);
        assert!(body["editing"].is_null());

        // Linha de criação vazia: erro de validação, nada é gravado
        let (status, _, _) = send(&app_state, Method::POST, "/api/nichos", token, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, draft, _) = send(
            &app_state,
            Method::PUT,
            "/api/nichos/draft",
            token,
            Some(json!({ "name": "Fontaneros" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(draft["name"], "Fontaneros");

        let (status, created, _) = send(&app_state, Method::POST, "/api/nichos", token, None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["id"], 8);

        // Edição em linha
        let (status, editing, _) =
            send(&app_state, Method::POST, "/api/nichos/8/edit", token, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(editing["id"], 8);

        send(&app_state, Method::PUT, "/api/nichos/edit", token, Some(json!({ "name": "Electricistas" }))).await;
        let (status, saved, _) =
            send(&app_state, Method::POST, "/api/nichos/edit/save", token, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(saved["name"], "Electricistas");

        let (status, _, _) = send(&app_state, Method::DELETE, "/api/nichos/8", token, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, body, _) = send(&app_state, Method::GET, "/api/nichos", token, None).await;
        assert_eq!(body["records"].as_array().unwrap().len(), 7);
    }

    #[tokio::test]
    async fn save_without_an_open_edit_is_a_conflict() {
        let app_state = test_state().await;
        let token = login(&app_state).await;

        let (status, _, _) =
            send(&app_state, Method::POST, "/api/call-center/edit/save", Some(&token), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn technicians_cannot_point_at_unknown_nichos() {
        let app_state = test_state().await;
        let token = login(&app_state).await;

        let (status, body, _) = send(
            &app_state,
            Method::PUT,
            "/api/tecnicos/1",
            Some(&token),
            Some(json!({ "nichos": [1, 99] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["details"]["nichos"].is_array());

        let (status, _, _) =
            send(&app_state, Method::PUT, "/api/tecnicos/42", Some(&token), Some(json!({}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn technician_password_cannot_target_the_admin_account() {
        let app_state = test_state().await;
        let token = login(&app_state).await;
        let token = Some(token.as_str());

        let (status, _, _) = send(
            &app_state,
            Method::PUT,
            "/api/tecnicos/1",
            token,
            Some(json!({ "email": ADMIN_EMAIL })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _, _) = send(
            &app_state,
            Method::PUT,
            "/api/tecnicos/1/password",
            token,
            Some(json!({ "password": "tomada123" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _, _) =
            send(&app_state, Method::POST, "/api/tecnicos/1/password/reset", token, None).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn profiles_follow_the_active_location() {
        let app_state = test_state().await;
        let token = login(&app_state).await;
        let token = Some(token.as_str());

        let (_, body, _) =
            send(&app_state, Method::GET, "/api/perfiles-gmb/active-location", token, None).await;
        assert_eq!(body["activeLocation"]["name"], "Madrid");

        let (status, body, _) = send(
            &app_state,
            Method::PUT,
            "/api/perfiles-gmb/active-location",
            token,
            Some(json!({ "locationId": 2 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["activeLocation"]["id"], 2);

        let (status, page, _) =
            send(&app_state, Method::GET, "/api/perfiles-gmb/profiles", token, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["partition"], 2);

        let (status, _, _) = send(
            &app_state,
            Method::PUT,
            "/api/perfiles-gmb/active-location",
            token,
            Some(json!({ "locationId": 99 })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn dashboard_and_docs_are_served() {
        let app_state = test_state().await;
        let token = login(&app_state).await;

        let (status, body, _) =
            send(&app_state, Method::GET, "/api/dashboard", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["chart"]["datasets"][0]["data"][0], 65);

        let (status, body, _) = send(&app_state, Method::GET, "/api-docs/openapi.json", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/api/auth/login"].is_object());
    }
}
