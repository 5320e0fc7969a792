//! End-to-end tests for the chat front-end
//!
//! The router runs against a stub booking API on an ephemeral port. The
//! deployment checks read the compose file and Dockerfiles from the repo.

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use axum::{
        body::Body,
        extract::{Path, Query, State},
        http::{Method, Request, StatusCode},
        routing::{delete, get, post},
        Json, Router,
    };
    use chrono::{DateTime, Utc};
    use serde::Deserialize;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::{Config, Settings};
    use crate::{build_router, AppState};

    #[derive(Debug, Deserialize)]
    struct AvailabilityQuery {
        start_time: String,
        end_time: String,
    }

    /// A booking API with one known event, `evt1`
    fn stub_backend() -> Router {
        Router::new()
            .route("/", get(|| async { Json(json!({"message": "API is live."})) }))
            .route(
                "/availability",
                get(|| async {
                    Json(json!({
                        "busy_slots": [{"start": "2025-03-14T10:00:00Z", "end": "2025-03-14T11:00:00Z", "summary": "Standup"}],
                        "next_page_token": null,
                        "time_zone": "UTC"
                    }))
                }),
            )
            .route(
                "/suggest-slots",
                get(|| async {
                    Json(json!({"suggestions": [
                        {"start": "2025-03-17T09:00:00+00:00", "end": "2025-03-17T10:00:00+00:00", "duration_minutes": 60}
                    ]}))
                }),
            )
            .route(
                "/events",
                post(|| async {
                    Json(json!({"event_id": "evt2", "status": "scheduled", "html_link": null}))
                }),
            )
            .route(
                "/events/:id",
                get(|Path(id): Path<String>| async move {
                    if id != "evt1" {
                        return Err((StatusCode::NOT_FOUND, Json(json!({"error": "Not found"}))));
                    }
                    Ok(Json(json!({
                        "summary": "Standup",
                        "start": {"dateTime": "2025-03-14T10:00:00Z", "timeZone": "UTC"},
                        "end": {"dateTime": "2025-03-14T11:00:00Z", "timeZone": "UTC"},
                        "status": "confirmed",
                        "attendees": [{"email": "ana@example.com"}],
                        "htmlLink": null
                    })))
                })
                .merge(delete(|Path(id): Path<String>| async move {
                    Json(json!({"status": "cancelled", "event_id": id}))
                })),
            )
    }

    fn config(backend_url: String) -> Config {
        Config {
            port: 8501,
            backend_url,
            static_dir: PathBuf::from("/nonexistent"),
            backend_timeout: Duration::from_secs(5),
            settings: Settings::default(),
        }
    }

    async fn app_with(backend: Router) -> Router {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, backend).await.unwrap();
        });

        build_router(AppState::new(config(format!("http://{}", addr))).unwrap())
    }

    async fn app() -> Router {
        app_with(stub_backend()).await
    }

    fn offline_app() -> Router {
        build_router(AppState::new(config("http://127.0.0.1:1".to_string())).unwrap())
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn index_falls_back_to_embedded_page() {
        let response = offline_app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let page = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(page.contains("Calendar Assistant"));
        assert!(page.contains("Next Week"));
        assert!(page.contains("offset_days="));
        assert!(page.contains(r#"id="timezone""#));
    }

    #[tokio::test]
    async fn health_reports_backend_state() {
        let (status, body) = send(&app().await, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["backend"], "up");

        let (status, body) = send(&offline_app(), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["backend"], "down");
    }

    #[tokio::test]
    async fn chat_books_through_the_form() {
        let app = app().await;

        let (status, first) = send(
            &app,
            Method::POST,
            "/chat",
            Some(json!({"message": "I need to book a meeting"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["reply"]["needs_followup"], true);
        let session_id = first["session_id"].as_str().unwrap().to_string();

        let mut last = Value::Null;
        for answer in ["Roadmap", "2030-01-07", "3pm", "45", "none"] {
            let (status, body) = send(
                &app,
                Method::POST,
                "/chat",
                Some(json!({"session_id": session_id, "message": answer})),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["session_id"], session_id.as_str());
            last = body;
        }
        assert_eq!(last["reply"]["needs_confirmation"], true);
        assert_eq!(
            last["reply"]["booking_details"]["start_time"],
            "2030-01-07T15:00:00Z"
        );
        assert_eq!(
            last["reply"]["booking_details"]["end_time"],
            "2030-01-07T15:45:00Z"
        );

        let (_, confirmed) = send(
            &app,
            Method::POST,
            "/chat",
            Some(json!({"session_id": session_id, "message": "confirm"})),
        )
        .await;
        assert!(confirmed["reply"]["output"]
            .as_str()
            .unwrap()
            .contains("evt2"));
    }

    #[tokio::test]
    async fn empty_chat_message_is_rejected() {
        let (status, _) = send(
            &offline_app(),
            Method::POST,
            "/chat",
            Some(json!({"message": "   "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn schedule_lists_busy_slots() {
        let (status, body) = send(&app().await, Method::GET, "/schedule?days=7", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["backend_available"], true);
        assert_eq!(body["busy_slots"][0]["summary"], "Standup");
    }

    #[tokio::test]
    async fn schedule_is_empty_when_backend_is_down() {
        let (status, body) = send(&offline_app(), Method::GET, "/schedule", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["backend_available"], false);
        assert!(body["busy_slots"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn schedule_rejects_out_of_range_days() {
        let (status, _) = send(&offline_app(), Method::GET, "/schedule?days=0", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) =
            send(&offline_app(), Method::GET, "/schedule?offset_days=-1", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn schedule_for_next_week_starts_seven_days_out() {
        let seen = Arc::new(Mutex::new(None));
        let backend = Router::new()
            .route("/", get(|| async { "ok" }))
            .route(
                "/availability",
                get(
                    |State(seen): State<Arc<Mutex<Option<AvailabilityQuery>>>>,
                     Query(query): Query<AvailabilityQuery>| async move {
                        *seen.lock().unwrap() = Some(query);
                        Json(json!({"busy_slots": [], "next_page_token": null, "time_zone": "UTC"}))
                    },
                ),
            )
            .with_state(seen.clone());
        let app = app_with(backend).await;

        let (status, body) = send(&app, Method::GET, "/schedule?days=7&offset_days=7", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["backend_available"], true);

        let query = seen.lock().unwrap().take().unwrap();
        let from = DateTime::parse_from_rfc3339(&query.start_time).unwrap();
        let until = DateTime::parse_from_rfc3339(&query.end_time).unwrap();
        let lead = from.with_timezone(&Utc) - Utc::now();
        assert!(lead > chrono::Duration::days(6) && lead <= chrono::Duration::days(7));
        assert_eq!(until - from, chrono::Duration::days(7));
    }

    #[tokio::test]
    async fn slots_for_a_day() {
        let (status, body) = send(
            &app().await,
            Method::GET,
            "/slots?date=2025-03-17&duration_minutes=60",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["date"], "2025-03-17");
        assert_eq!(body["suggestions"].as_array().unwrap().len(), 1);

        let (status, _) = send(&app().await, Method::GET, "/slots?date=17/03/2025", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn slots_reject_oversized_duration() {
        let app = app().await;
        for duration in ["0", "1441", "1000000000000", "9223372036854775807"] {
            let (status, body) = send(
                &app,
                Method::GET,
                &format!("/slots?date=2025-03-17&duration_minutes={}", duration),
                None,
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", duration);
            assert_eq!(body["error"], "Bad request");
        }
    }

    #[tokio::test]
    async fn event_lookup_and_cancel_are_proxied() {
        let app = app().await;

        let (status, body) = send(&app, Method::GET, "/events/evt1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"], "Standup");
        assert_eq!(body["start"]["dateTime"], "2025-03-14T10:00:00Z");
        assert_eq!(body["attendees"][0]["email"], "ana@example.com");

        let (status, _) = send(&app, Method::GET, "/events/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, Method::DELETE, "/events/evt1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "cancelled");
    }
}

#[cfg(test)]
mod deployment {
    use std::path::PathBuf;

    fn repo_file(name: &str) -> String {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("..").join(name);
        std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("reading {}: {}", path.display(), e))
    }

    fn compose() -> serde_yml::Value {
        serde_yml::from_str(&repo_file("docker-compose.yml")).unwrap()
    }

    fn ports(service: &serde_yml::Value) -> Vec<(String, String)> {
        service["ports"]
            .as_sequence()
            .unwrap()
            .iter()
            .map(|p| {
                let (host, container) = p.as_str().unwrap().split_once(':').unwrap();
                (host.to_string(), container.to_string())
            })
            .collect()
    }

    #[test]
    fn services_map_ports_one_to_one() {
        let compose = compose();
        let backend = &compose["services"]["backend"];
        let frontend = &compose["services"]["frontend"];

        assert_eq!(ports(backend), vec![("8000".to_string(), "8000".to_string())]);
        assert_eq!(ports(frontend), vec![("8501".to_string(), "8501".to_string())]);
    }

    #[test]
    fn frontend_points_at_backend_service() {
        let compose = compose();
        let env: Vec<&str> = compose["services"]["frontend"]["environment"]
            .as_sequence()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();

        assert!(env.contains(&"BACKEND_URL=http://backend:8000"));
        assert!(env.contains(&"STATIC_DIR=/app/static"));
    }

    #[test]
    fn build_contexts_and_mounts() {
        let compose = compose();
        let backend = &compose["services"]["backend"];
        let frontend = &compose["services"]["frontend"];

        assert_eq!(backend["build"]["context"].as_str(), Some("."));
        assert_eq!(backend["build"]["target"].as_str(), Some("backend"));
        assert_eq!(frontend["build"]["context"].as_str(), Some("./frontend"));

        let mounts = |service: &serde_yml::Value| -> Vec<String> {
            service["volumes"]
                .as_sequence()
                .unwrap()
                .iter()
                .filter_map(|v| v.as_str())
                .map(|v| v.split(':').next().unwrap_or_default().to_string())
                .collect()
        };
        assert_eq!(mounts(backend), vec!["./backend", "./.env"]);
        assert_eq!(mounts(frontend), vec!["./frontend"]);
    }

    #[test]
    fn dockerfiles_expose_service_ports() {
        let backend = repo_file("Dockerfile");
        assert!(backend.contains("AS backend"));
        assert!(backend.contains("EXPOSE 8000"));

        let frontend = repo_file("frontend/Dockerfile");
        assert!(frontend.contains("EXPOSE 8501"));
        assert!(frontend.contains("ENV PORT=8501"));
        assert!(frontend.contains("ENV STATIC_DIR=/app/static"));
    }
}
