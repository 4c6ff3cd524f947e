//! Diet service routes

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::{
    WithRejection,
    cookie::{Cookie, CookieJar},
};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{
    config::SessionConfig,
    error::{ApiError, ApiResult},
    middleware::session_middleware,
    models::{
        CreateSessionRequest, MealFields, MealListResponse, MealRequest, NewUser,
        RegisterUserRequest, User, UserResponse,
    },
    state::AppState,
    validation::validate_email,
};

/// Create the router for the diet service
pub fn create_router(state: AppState) -> Router {
    let meal_routes = Router::new()
        .route("/meals", post(create_meal).get(list_meals))
        .route("/meals/metrics", get(get_metrics))
        .route(
            "/meals/:id",
            get(get_meal).put(update_meal).delete(delete_meal),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/users", post(register_user))
        .route("/users/session", post(create_session))
        .merge(meal_routes)
        .with_state(state)
}

fn session_cookie(config: &SessionConfig, token: String) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), token))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::seconds(config.max_age_seconds))
        .build()
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "diet-service"
    }))
}

/// Register a new user and start its first session
pub async fn register_user(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(payload), _): WithRejection<Json<RegisterUserRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let new_user = NewUser::try_from(payload)?;

    let (user, token) = state.session_manager.register(new_user).await?;
    info!("Registered user {}", user.id);

    let jar = jar.add(session_cookie(&state.session_config, token));
    Ok((StatusCode::CREATED, jar, Json(UserResponse::from(user))))
}

/// Start a new session for an existing user, replacing the previous one
pub async fn create_session(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(payload), _): WithRejection<Json<CreateSessionRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    validate_email(&payload.email).map_err(ApiError::Validation)?;

    let token = state.session_manager.create_session(&payload.email).await?;
    info!("Session renewed for {}", payload.email);

    let jar = jar.add(session_cookie(&state.session_config, token));
    Ok((jar, Json(json!({"message": "Session created"}))))
}

/// Record a meal
pub async fn create_meal(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    WithRejection(Json(payload), _): WithRejection<Json<MealRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let fields = MealFields::try_from(payload)?;
    let meal = state.meal_ledger.create(&user, fields).await?;

    Ok((StatusCode::CREATED, Json(meal)))
}

/// List the user's meals, most recent first
pub async fn list_meals(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> ApiResult<impl IntoResponse> {
    let meals = state.meal_ledger.list(&user).await?;

    Ok(Json(MealListResponse { meals }))
}

/// Get one of the user's meals
pub async fn get_meal(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let meal = state.meal_ledger.get(&user, id).await?;

    Ok(Json(meal))
}

/// Replace the editable fields of one of the user's meals
pub async fn update_meal(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(payload), _): WithRejection<Json<MealRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let fields = MealFields::try_from(payload)?;
    let meal = state.meal_ledger.update(&user, id, fields).await?;

    Ok(Json(meal))
}

/// Delete one of the user's meals
pub async fn delete_meal(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    state.meal_ledger.delete(&user, id).await?;
    info!("User {} deleted meal {}", user.id, id);

    Ok(Json(json!({"message": "Meal deleted"})))
}

/// Adherence metrics for the user
pub async fn get_metrics(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> ApiResult<impl IntoResponse> {
    let metrics = state.adherence_engine.snapshot(&user).await?;

    Ok(Json(metrics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::memory::MemoryStore;
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, header},
    };
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    struct TestResponse {
        status: StatusCode,
        session_cookie: Option<String>,
        body: Value,
    }

    fn app() -> Router {
        let store = Arc::new(MemoryStore::new());
        create_router(AppState::new(
            store.clone(),
            store,
            SessionConfig::default(),
        ))
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let session_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            session_cookie,
            body,
        }
    }

    async fn register(app: &Router, email: &str) -> String {
        let response = send(
            app,
            Method::POST,
            "/users",
            None,
            Some(json!({"name": "John Doe", "email": email})),
        )
        .await;
        assert_eq!(response.status, StatusCode::CREATED);
        response.session_cookie.expect("session cookie")
    }

    async fn post_meal(app: &Router, cookie: &str, name: &str, date: &str, on_diet: bool) -> Value {
        let response = send(
            app,
            Method::POST,
            "/meals",
            Some(cookie),
            Some(json!({
                "name": name,
                "description": format!("{name} description"),
                "date": date,
                "isOnDiet": on_diet,
            })),
        )
        .await;
        assert_eq!(response.status, StatusCode::CREATED);
        response.body
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = send(&app(), Method::GET, "/health", None, None).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["status"], "ok");
    }

    #[tokio::test]
    async fn test_register_sets_session_cookie() {
        let app = app();
        let cookie = register(&app, "john.doe@example.com").await;
        assert!(cookie.starts_with("sessionId="));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let app = app();
        register(&app, "john.doe@example.com").await;

        let response = send(
            &app,
            Method::POST,
            "/users",
            None,
            Some(json!({"name": "John Doe", "email": "john.doe@example.com"})),
        )
        .await;
        assert_eq!(response.status, StatusCode::CONFLICT);
        assert_eq!(response.body["error"], "User already exists");
        assert!(response.session_cookie.is_none());
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_payloads() {
        let app = app();

        let response = send(
            &app,
            Method::POST,
            "/users",
            None,
            Some(json!({"name": "John Doe", "email": "not-an-email"})),
        )
        .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);

        let response = send(&app, Method::POST, "/users", None, Some(json!({"name": "John"}))).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_meals_require_session() {
        let app = app();

        let response = send(&app, Method::GET, "/meals", None, None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.body["error"], "Invalid or expired session");

        let response = send(&app, Method::GET, "/meals/metrics", Some("sessionId=bogus"), None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_session_rotates_cookie() {
        let app = app();
        let first = register(&app, "john.doe@example.com").await;

        let response = send(
            &app,
            Method::POST,
            "/users/session",
            None,
            Some(json!({"email": "john.doe@example.com"})),
        )
        .await;
        assert_eq!(response.status, StatusCode::OK);
        let second = response.session_cookie.expect("session cookie");
        assert_ne!(first, second);

        let stale = send(&app, Method::GET, "/meals", Some(&first), None).await;
        assert_eq!(stale.status, StatusCode::UNAUTHORIZED);
        let fresh = send(&app, Method::GET, "/meals", Some(&second), None).await;
        assert_eq!(fresh.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_session_unknown_email() {
        let response = send(
            &app(),
            Method::POST,
            "/users/session",
            None,
            Some(json!({"email": "nobody@example.com"})),
        )
        .await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.body["error"], "User does not exist");
    }

    #[tokio::test]
    async fn test_get_and_update_meal() {
        let app = app();
        let cookie = register(&app, "john.doe@example.com").await;
        let meal = post_meal(&app, &cookie, "Meal 1", "2024-01-01 01:40:32", true).await;
        let uri = format!("/meals/{}", meal["id"].as_str().unwrap());

        let fetched = send(&app, Method::GET, &uri, Some(&cookie), None).await;
        assert_eq!(fetched.status, StatusCode::OK);
        assert_eq!(fetched.body["name"], "Meal 1");
        assert_eq!(fetched.body["description"], "Meal 1 description");
        assert_eq!(fetched.body["date"], "2024-01-01T01:40:32Z");
        assert_eq!(fetched.body["isOnDiet"], true);

        let updated = send(
            &app,
            Method::PUT,
            &uri,
            Some(&cookie),
            Some(json!({
                "name": "Meal 2",
                "description": "Description 2",
                "date": "2024-01-01 01:40:32",
                "isOnDiet": false,
            })),
        )
        .await;
        assert_eq!(updated.status, StatusCode::OK);
        assert_eq!(updated.body["name"], "Meal 2");
        assert_eq!(updated.body["isOnDiet"], false);
        assert_eq!(updated.body["id"], meal["id"]);
        assert_eq!(updated.body["createdAt"], meal["createdAt"]);
    }

    #[tokio::test]
    async fn test_other_users_meal_is_isolated() {
        let app = app();
        let owner = register(&app, "owner@example.com").await;
        let intruder = register(&app, "intruder@example.com").await;
        let meal = post_meal(&app, &owner, "Meal 1", "2024-01-01", true).await;
        let uri = format!("/meals/{}", meal["id"].as_str().unwrap());

        let read = send(&app, Method::GET, &uri, Some(&intruder), None).await;
        assert_eq!(read.status, StatusCode::NOT_FOUND);

        let update = send(
            &app,
            Method::PUT,
            &uri,
            Some(&intruder),
            Some(json!({"name": "Mine", "description": "", "date": "2024-01-02", "isOnDiet": false})),
        )
        .await;
        assert_eq!(update.status, StatusCode::FORBIDDEN);

        let delete = send(&app, Method::DELETE, &uri, Some(&intruder), None).await;
        assert_eq!(delete.status, StatusCode::FORBIDDEN);

        let listed = send(&app, Method::GET, "/meals", Some(&intruder), None).await;
        assert_eq!(listed.body["meals"], json!([]));

        let still_there = send(&app, Method::GET, &uri, Some(&owner), None).await;
        assert_eq!(still_there.status, StatusCode::OK);
        assert_eq!(still_there.body["name"], "Meal 1");
    }

    #[tokio::test]
    async fn test_invalid_meal_id_is_rejected() {
        let app = app();
        let cookie = register(&app, "john.doe@example.com").await;

        let response = send(&app, Method::GET, "/meals/not-a-uuid", Some(&cookie), None).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_end_to_end_scenario() {
        let app = app();
        let cookie = register(&app, "e@x.com").await;

        post_meal(&app, &cookie, "Breakfast", "2024-01-01 08:00:00", true).await;
        post_meal(&app, &cookie, "Dinner", "2024-01-01 20:00:00", false).await;

        let listed = send(&app, Method::GET, "/meals", Some(&cookie), None).await;
        assert_eq!(listed.status, StatusCode::OK);
        let meals = listed.body["meals"].as_array().unwrap().clone();
        assert_eq!(meals.len(), 2);
        assert_eq!(meals[0]["name"], "Dinner");
        assert_eq!(meals[1]["name"], "Breakfast");

        let uri = format!("/meals/{}", meals[0]["id"].as_str().unwrap());
        let deleted = send(&app, Method::DELETE, &uri, Some(&cookie), None).await;
        assert_eq!(deleted.status, StatusCode::OK);
        assert_eq!(deleted.body["message"], "Meal deleted");

        let listed = send(&app, Method::GET, "/meals", Some(&cookie), None).await;
        assert_eq!(listed.body["meals"].as_array().unwrap().len(), 1);

        let metrics = send(&app, Method::GET, "/meals/metrics", Some(&cookie), None).await;
        assert_eq!(metrics.status, StatusCode::OK);
        assert_eq!(metrics.body["totalMeals"], 1);
        assert_eq!(metrics.body["onDietCount"], 1);
        assert_eq!(metrics.body["adherencePercentage"], "100.00%");
    }

    #[tokio::test]
    async fn test_metrics_for_ten_on_diet_meals() {
        let app = app();
        let cookie = register(&app, "john.doe@example.com").await;

        for i in 0..10 {
            post_meal(&app, &cookie, &format!("Meal {}", i + 1), "2024-01-01 01:40:32", true).await;
        }

        let metrics = send(&app, Method::GET, "/meals/metrics", Some(&cookie), None).await;
        assert_eq!(
            metrics.body,
            json!({
                "totalMeals": 10,
                "onDietCount": 10,
                "offDietCount": 0,
                "bestStreak": 10,
                "currentStreak": 10,
                "adherencePercentage": "100.00%",
            })
        );
    }

    #[tokio::test]
    async fn test_metrics_with_no_meals() {
        let app = app();
        let cookie = register(&app, "john.doe@example.com").await;

        let metrics = send(&app, Method::GET, "/meals/metrics", Some(&cookie), None).await;
        assert_eq!(metrics.body["totalMeals"], 0);
        assert_eq!(metrics.body["adherencePercentage"], "0.00%");
    }
}
