use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use freshlens::api::AppState;
use freshlens::classifier::{Classifier, ClassifierError, LabelMap, PRODUCE_GROUPS};
use freshlens::config::Config;
use freshlens::models::image::ImageStatus;
use http_body_util::BodyExt;
use image::DynamicImage;
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "freshlens-test-boundary";

/// Fixed distribution: banana leans fresh, everything else shares the rest.
struct FixedClassifier {
    labels: LabelMap,
}

impl FixedClassifier {
    fn new() -> Self {
        let labels = PRODUCE_GROUPS
            .iter()
            .flat_map(|g| [g.fresh_label.to_string(), g.rotten_label.to_string()])
            .collect();
        Self {
            labels: LabelMap::from_labels(labels),
        }
    }
}

impl Classifier for FixedClassifier {
    fn labels(&self) -> &LabelMap {
        &self.labels
    }

    fn probabilities(&self, _image: &DynamicImage) -> Result<Vec<f32>, ClassifierError> {
        let n = self.labels.len();
        let mut probs = vec![0.3 / (n - 2) as f32; n];
        probs[self.labels.index_of("Fresh Banana(s)").unwrap()] = 0.6;
        probs[self.labels.index_of("Rotten Banana(s)").unwrap()] = 0.1;
        Ok(probs)
    }
}

struct BrokenClassifier(LabelMap);

impl Classifier for BrokenClassifier {
    fn labels(&self) -> &LabelMap {
        &self.0
    }

    fn probabilities(&self, _image: &DynamicImage) -> Result<Vec<f32>, ClassifierError> {
        Err(ClassifierError::Inference("graph exploded".to_string()))
    }
}

fn test_config() -> Config {
    let id = uuid::Uuid::new_v4();
    let db_path = std::env::temp_dir().join(format!("freshlens-api-test-{id}.db"));
    let uploads = std::env::temp_dir().join(format!("freshlens-api-media-{id}"));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.general.uploads_path = uploads.display().to_string();
    config.server.secure_cookies = false;
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config
}

async fn spawn_with(config: Config, classifier: Arc<dyn Classifier>) -> (Router, Arc<AppState>) {
    let state = freshlens::api::create_app_state_with_classifier(config, classifier, None)
        .await
        .expect("Failed to create app state");
    (freshlens::api::router(state.clone()), state)
}

async fn spawn_app() -> (Router, Arc<AppState>) {
    spawn_with(test_config(), Arc::new(FixedClassifier::new())).await
}

fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(16, 16, image::Rgb([200, 180, 40]));
    let mut out = std::io::Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

fn multipart_body(image: Option<&[u8]>, produce_type: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(bytes) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"apple.png\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    if let Some(kind) = produce_type {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"produce_type\"\r\n\r\n{kind}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn predict_request(body: Vec<u8>, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/predict")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body)).unwrap()
}

fn json_request(
    method: &str,
    uri: &str,
    body: &serde_json::Value,
    cookie: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref());
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn session_cookie(response: &axum::response::Response) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

async fn signup(app: &Router, username: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/signup",
            &serde_json::json!({ "username": username, "password": "secret123", "email": "a@b.c" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    session_cookie(&response).expect("signup sets a session cookie")
}

async fn seeded_image(state: &AppState, user_id: Option<i32>) -> i32 {
    let produce = state
        .store
        .get_or_create_produce("apple", "fruit")
        .await
        .unwrap();
    state
        .store
        .create_image(produce.id, user_id, ImageStatus::Analyzed)
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_predict_with_produce_type() {
    let (app, state) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(predict_request(
            multipart_body(Some(&png_bytes()), Some("banana")),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["predictions"].as_array().unwrap().len(), 3);
    assert_eq!(body["data"]["predictions"][0]["label"], "Fresh Banana(s)");
    assert_eq!(body["data"]["segmented"]["produce_type"], "banana");
    assert_eq!(body["data"]["segmented"]["status"], "Fresh");

    let image_id = i32::try_from(body["data"]["image_id"].as_i64().unwrap()).unwrap();
    let image = state.store.get_image(image_id).await.unwrap().unwrap();
    assert_eq!(image.status, ImageStatus::Analyzed);
    assert!(image.image_path.unwrap().starts_with("uploads/"));

    let analysis = state.store.latest_analysis(image_id).await.unwrap().unwrap();
    let score = analysis.freshness_score.unwrap();
    assert!((0..=100).contains(&score));
    assert_eq!(score, 60);
    assert_eq!(analysis.freshness_label.as_deref(), Some("good"));
    assert!((analysis.confidence_score.unwrap() - 0.6).abs() < 1e-6);
}

#[tokio::test]
async fn test_predict_without_produce_type() {
    let (app, state) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(predict_request(multipart_body(Some(&png_bytes()), None), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body["data"].get("segmented").is_none());

    let image_id = i32::try_from(body["data"]["image_id"].as_i64().unwrap()).unwrap();
    let analysis = state.store.latest_analysis(image_id).await.unwrap().unwrap();
    assert_eq!(analysis.freshness_score, None);
    assert_eq!(analysis.freshness_label, None);
    assert_eq!(
        analysis.defects_detected.unwrap().as_array().unwrap().len(),
        3
    );

    let image = state.store.get_image(image_id).await.unwrap().unwrap();
    let produce = state.store.get_produce(image.produce_id).await.unwrap().unwrap();
    assert_eq!(produce.name, "unspecified");
    assert_eq!(produce.category, "unknown");
}

#[tokio::test]
async fn test_predict_rejects_bad_uploads() {
    let (app, _) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(predict_request(multipart_body(None, Some("apple")), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);

    let response = app
        .clone()
        .oneshot(predict_request(
            multipart_body(Some(b"fake-image-content"), None),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(predict_request(
            multipart_body(Some(&png_bytes()), Some("durian")),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(get_request("/api/predict", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_inference_failure_resets_image() {
    let labels = FixedClassifier::new().labels;
    let (app, state) = spawn_with(test_config(), Arc::new(BrokenClassifier(labels))).await;

    let response = app
        .clone()
        .oneshot(predict_request(multipart_body(Some(&png_bytes()), None), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let produce = state
        .store
        .get_or_create_produce("unspecified", "unknown")
        .await
        .unwrap();
    let image = state.store.get_image(1).await.unwrap().unwrap();
    assert_eq!(image.produce_id, produce.id);
    assert_eq!(image.status, ImageStatus::Pending);
}

#[tokio::test]
async fn test_anonymous_feedback_uses_session_key() {
    let (app, state) = spawn_app().await;
    let image_id = seeded_image(&state, None).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/feedback",
            &serde_json::json!({ "image_id": image_id, "helpful": "Yes", "explanation": "spot on" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response).expect("anonymous visitor gets a session");

    let body = body_json(response).await;
    let feedback_id = i32::try_from(body["data"]["feedback_id"].as_i64().unwrap()).unwrap();
    let feedback = state.store.get_feedback(feedback_id).await.unwrap().unwrap();

    assert_eq!(feedback.user_id, None);
    assert_eq!(feedback.is_helpful, Some(true));
    assert_eq!(feedback.explanation.as_deref(), Some("spot on"));
    let session_key = feedback.session_key.expect("session key recorded");
    assert!(!session_key.is_empty() && session_key.len() <= 40);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/feedback",
            &serde_json::json!({ "image_id": image_id.to_string(), "helpful": "nah" }),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let all = state.store.list_feedback_for_image(image_id).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[1].session_key.as_deref(), Some(session_key.as_str()));
    assert_eq!(all[1].is_helpful, Some(false));
    assert_eq!(all[1].explanation, None);
}

#[tokio::test]
async fn test_authenticated_feedback_links_user() {
    let (app, state) = spawn_app().await;
    let cookie = signup(&app, "alice").await;
    let image_id = seeded_image(&state, None).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/feedback",
            &serde_json::json!({ "image_id": image_id, "helpful": false }),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let feedback_id = i32::try_from(body["data"]["feedback_id"].as_i64().unwrap()).unwrap();
    let feedback = state.store.get_feedback(feedback_id).await.unwrap().unwrap();

    let user = state.store.get_user_by_username("alice").await.unwrap().unwrap();
    assert_eq!(feedback.user_id, Some(user.id));
    assert_eq!(feedback.session_key, None);
    assert_eq!(feedback.is_helpful, Some(false));
}

#[tokio::test]
async fn test_feedback_form_body() {
    let (app, state) = spawn_app().await;
    let image_id = seeded_image(&state, None).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/feedback")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(format!("image_id={image_id}&helpful=1")))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let all = state.store.list_feedback_for_image(image_id).await.unwrap();
    assert_eq!(all[0].is_helpful, Some(true));
}

#[tokio::test]
async fn test_feedback_errors() {
    let (app, state) = spawn_app().await;

    for image_id in [serde_json::json!(9999), serde_json::json!("abc")] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/feedback",
                &serde_json::json!({ "image_id": image_id, "helpful": true }),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/feedback")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let image_id = seeded_image(&state, None).await;
    state.store.soft_delete_image(image_id).await.unwrap();
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/feedback",
            &serde_json::json!({ "image_id": image_id }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_auth_flow() {
    let (app, _) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(get_request("/api/auth/me", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let cookie = signup(&app, "bob").await;

    let response = app
        .clone()
        .oneshot(get_request("/api/auth/me", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["username"], "bob");

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/signup",
            &serde_json::json!({ "username": "bob", "password": "another1" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/signup",
            &serde_json::json!({ "username": "carol", "password": "12345" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            &serde_json::json!({ "username": "bob", "password": "wrong-password" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            &serde_json::json!({ "username": "", "password": "" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            &serde_json::json!({ "username": "bob", "password": "secret123" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let login_cookie = session_cookie(&response).unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/logout")
                .header(header::COOKIE, &login_cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get_request("/api/auth/me", Some(&login_cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_instruction_popup() {
    let (app, _) = spawn_app().await;
    let cookie = signup(&app, "dora").await;

    let response = app
        .clone()
        .oneshot(get_request("/api/instruction-popup", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["data"]["hide"], false);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/instruction-popup/hide",
            &serde_json::json!({ "hide": true }),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get_request("/api/instruction-popup", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["data"]["hide"], true);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/instruction-popup/hide")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("nope"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Anonymous visitors keep the flag in their session.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/instruction-popup/hide",
            &serde_json::json!({ "hide": true }),
            None,
        ))
        .await
        .unwrap();
    let anon_cookie = session_cookie(&response).unwrap();

    let response = app
        .clone()
        .oneshot(get_request("/api/instruction-popup", Some(&anon_cookie)))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["data"]["hide"], true);
}

#[tokio::test]
async fn test_produce_and_reviews() {
    let (app, _) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(get_request("/api/produce/groups", None))
        .await
        .unwrap();
    let groups = body_json(response).await;
    assert_eq!(groups["data"].as_array().unwrap().len(), 9);

    let response = app
        .clone()
        .oneshot(get_request("/api/produce", None))
        .await
        .unwrap();
    let produce = body_json(response).await;
    let apple_id = produce["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["name"] == "apple")
        .map(|p| p["id"].as_i64().unwrap())
        .unwrap();

    let review = serde_json::json!({ "produce_id": apple_id, "rating": 4, "comment": "crunchy" });

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/reviews", &review, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let cookie = signup(&app, "erin").await;

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/reviews", &review, Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/reviews",
            &serde_json::json!({ "produce_id": apple_id, "rating": 6 }),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/reviews",
            &serde_json::json!({ "produce_id": 9999, "rating": 3 }),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/produce/{apple_id}/reviews"), None))
        .await
        .unwrap();
    let reviews = body_json(response).await;
    assert_eq!(reviews["data"].as_array().unwrap().len(), 1);
    assert_eq!(reviews["data"][0]["rating"], 4);
}

#[tokio::test]
async fn test_image_history_and_delete() {
    let (app, state) = spawn_app().await;
    let cookie = signup(&app, "frank").await;

    let response = app
        .clone()
        .oneshot(predict_request(
            multipart_body(Some(&png_bytes()), Some("apple")),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let image_id = body_json(response).await["data"]["image_id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(get_request("/api/images", Some(&cookie)))
        .await
        .unwrap();
    let images = body_json(response).await;
    assert_eq!(images["data"].as_array().unwrap().len(), 1);
    assert_eq!(images["data"][0]["status"], "analyzed");
    assert_eq!(images["data"][0]["analysis"]["freshness_label"], "bad");

    let image_url = images["data"][0]["image_url"].as_str().unwrap().to_string();
    let response = app
        .clone()
        .oneshot(get_request(&image_url, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let stranger = signup(&app, "grace").await;
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/images/{image_id}"))
                .header(header::COOKIE, &stranger)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/images/{image_id}"))
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/images/{image_id}"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(get_request("/api/images/not-a-number", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let id = i32::try_from(image_id).unwrap();
    assert!(state.store.get_image(id).await.unwrap().unwrap().deleted);
}

#[tokio::test]
async fn test_health_and_pages() {
    let (app, _) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(get_request("/api/system/health", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["database"], true);
    assert_eq!(body["data"]["model_classes"], 18);

    for page in ["/", "/what-is-foodlens"] {
        let response = app.clone().oneshot(get_request(page, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{page}");
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("text/html"));
    }

    let response = app
        .clone()
        .oneshot(get_request("/missing-page", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let mut config = test_config();
    config.server.max_upload_bytes = 1024;
    let (app, _) = spawn_with(config, Arc::new(FixedClassifier::new())).await;

    let body = multipart_body(Some(&vec![0u8; 4096]), None);
    let len = body.len();
    let mut request = predict_request(body, None);
    request
        .headers_mut()
        .insert(header::CONTENT_LENGTH, len.to_string().parse().unwrap());

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_storage_failure_resets_image() {
    let mut config = test_config();
    // A regular file where the uploads directory should be.
    let blocker = std::env::temp_dir().join(format!("freshlens-blocker-{}", uuid::Uuid::new_v4()));
    std::fs::write(&blocker, b"not a directory").unwrap();
    config.general.uploads_path = blocker.display().to_string();
    let (app, state) = spawn_with(config, Arc::new(FixedClassifier::new())).await;

    let response = app
        .clone()
        .oneshot(predict_request(
            multipart_body(Some(&png_bytes()), Some("banana")),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["success"], false);

    let image = state.store.get_image(1).await.unwrap().unwrap();
    assert_eq!(image.status, ImageStatus::Pending);
    assert!(state.store.latest_analysis(1).await.unwrap().is_none());

    std::fs::remove_file(blocker).ok();
}

#[tokio::test]
async fn test_oversized_body_without_length_is_rejected() {
    let mut config = test_config();
    config.server.max_upload_bytes = 1024;
    let (app, _) = spawn_with(config, Arc::new(FixedClassifier::new())).await;

    let mut request = predict_request(multipart_body(Some(&vec![0u8; 4096]), None), None);
    request.headers_mut().remove(header::CONTENT_LENGTH);
    request
        .headers_mut()
        .insert(header::TRANSFER_ENCODING, "chunked".parse().unwrap());
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_json(response).await["success"], false);

    let padding = "x".repeat(4096);
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/feedback",
            &serde_json::json!({ "image_id": 1, "explanation": padding }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_popup_hide_defaults_to_true() {
    let (app, _) = spawn_app().await;
    let cookie = signup(&app, "hana").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/instruction-popup/hide",
            &serde_json::json!({}),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["hide"], true);

    let response = app
        .clone()
        .oneshot(get_request("/api/instruction-popup", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["data"]["hide"], true);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/instruction-popup/hide",
            &serde_json::json!({ "hide": false }),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["data"]["hide"], false);
}

#[tokio::test]
async fn test_image_detail_respects_owner() {
    let (app, _) = spawn_app().await;
    let owner = signup(&app, "iris").await;
    let stranger = signup(&app, "jack").await;

    let response = app
        .clone()
        .oneshot(predict_request(
            multipart_body(Some(&png_bytes()), Some("apple")),
            Some(&owner),
        ))
        .await
        .unwrap();
    let owned_id = body_json(response).await["data"]["image_id"].as_i64().unwrap();
    let owned_uri = format!("/api/images/{owned_id}");

    let response = app
        .clone()
        .oneshot(get_request(&owned_uri, Some(&owner)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["id"], owned_id);

    for cookie in [Some(stranger.as_str()), None] {
        let response = app
            .clone()
            .oneshot(get_request(&owned_uri, cookie))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    let response = app
        .clone()
        .oneshot(predict_request(multipart_body(Some(&png_bytes()), None), None))
        .await
        .unwrap();
    let anonymous_id = body_json(response).await["data"]["image_id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/images/{anonymous_id}"), Some(&stranger)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
