use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use fitplan_api::{build_router, ApiState};
use fitplan_core::{meal_pool, FoodType, Goal};
use fitplan_ml::{Classifier, LabelEncoder, ModelError, ModelRegistry, Scaler};
use fitplan_observability::AppMetrics;
use fitplan_router::PlanRouter;
use fitplan_tests::{demo_app, post_predict, send};
use serde_json::{json, Value};
use tower::ServiceExt;

fn strings(value: &Value) -> Vec<String> {
    value
        .as_array()
        .expect("array field")
        .iter()
        .map(|item| item.as_str().expect("string entry").to_string())
        .collect()
}

fn assert_meals_from(plan: &Value, pool: &[&str]) {
    let meals = strings(&plan["example_meals"]);
    let unique: HashSet<_> = meals.iter().collect();
    assert_eq!(meals.len(), 4);
    assert_eq!(unique.len(), 4);
    assert!(meals.iter().all(|meal| pool.contains(&meal.as_str())));
}

#[tokio::test]
async fn health_reports_loaded_experts() {
    let app = demo_app().expect("app should build");

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, request).await.unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["models_loaded"], json!(["cut", "bulk", "maintain"]));
    assert_eq!(body["metrics"]["requests_total"], 0);
}

#[tokio::test]
async fn predict_returns_a_complete_cut_plan() {
    let app = demo_app().expect("app should build");

    let (status, plan) = post_predict(
        app,
        json!({
            "age": 30,
            "weight": 70,
            "height": 175,
            "goal": "cut",
            "gender": "male",
            "activity": "moderate"
        }),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(plan["title"], "cut lean preservation (AI Personalized)");
    assert_eq!(plan["confidence"], 100.0);
    assert_eq!(plan["model_type"], "KNN Classification");
    assert_eq!(
        plan["diet_strategy"],
        "Balanced calorie and structured hypertrophy approach. Maintain high protein intake. Adjust calories according to cut."
    );
    assert_eq!(
        strings(&plan["workout_split"]),
        [
            "Day 1: Full Body + Cardio",
            "Day 2: HIIT Conditioning",
            "Day 3: Upper Body Strength",
            "Day 4: Cardio Endurance",
            "Day 5: Lower Body + Core",
        ]
    );
    assert_meals_from(&plan, meal_pool(Goal::Cut, FoodType::Nonveg));

    let explanation = plan["explanation"].as_str().unwrap();
    assert!(explanation.starts_with("KNN classifier routed request to 'CUT' expert model."));
    assert!(explanation.contains("strategy cluster 'cut lean preservation'"));
    assert!(explanation.contains("BMI classification: Normal range."));
    assert!(explanation.contains("Age group: adult."));
    assert!(explanation.contains("High activity pattern detected."));
}

#[tokio::test]
async fn older_heavier_profile_gets_senior_tuning() {
    let app = demo_app().expect("app should build");

    let (status, plan) = post_predict(
        app,
        json!({
            "age": "45",
            "weight": "95",
            "height": 175,
            "goal": "CUT",
            "gender": "female",
            "activity": "Sedentary",
            "food_type": "keto"
        }),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(plan["title"], "cut fat loss cardio (AI Personalized)");
    assert!(plan["workout_strategy"]
        .as_str()
        .unwrap()
        .ends_with(". Reduced joint stress and added mobility work."));

    let explanation = plan["explanation"].as_str().unwrap();
    assert!(explanation.contains("BMI classification: Obese range."));
    assert!(explanation.contains("Age group: senior."));
    assert!(explanation.contains("Low activity level detected."));

    // keto is not a known preference, so the nonveg pool is used
    assert_meals_from(&plan, meal_pool(Goal::Cut, FoodType::Nonveg));
}

#[tokio::test]
async fn vegan_bulk_uses_the_vegan_pool() {
    let app = demo_app().expect("app should build");

    let (status, plan) = post_predict(
        app,
        json!({
            "age": 22,
            "weight": 60,
            "height": 180,
            "goal": "bulk",
            "gender": "Male",
            "activity": "very_active",
            "food_type": "vegan"
        }),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(plan["title"], "bulk power strength (AI Personalized)");
    assert_eq!(
        strings(&plan["workout_split"]),
        [
            "Day 1: Chest & Triceps",
            "Day 2: Back & Biceps",
            "Day 3: Rest",
            "Day 4: Legs (Heavy)",
            "Day 5: Shoulders & Arms",
        ]
    );
    assert_meals_from(&plan, meal_pool(Goal::Bulk, FoodType::Vegan));

    let confidence = plan["confidence"].as_f64().unwrap();
    assert!((0.0..=100.0).contains(&confidence));
}

#[tokio::test]
async fn invalid_goal_is_a_bad_request() {
    let app = demo_app().expect("app should build");

    let (status, body) = post_predict(
        app,
        json!({
            "age": 30, "weight": 70, "height": 175,
            "goal": "invalid", "gender": "male", "activity": "active"
        }),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid goal provided"));
}

#[tokio::test]
async fn unknown_gender_is_unprocessable() {
    let app = demo_app().expect("app should build");

    let (status, body) = post_predict(
        app,
        json!({
            "age": 30, "weight": 70, "height": 175,
            "goal": "maintain", "gender": "unspecified", "activity": "active"
        }),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "unknown gender value 'Unspecified'");
}

#[tokio::test]
async fn missing_and_malformed_fields_are_rejected() {
    let app = demo_app().expect("app should build");

    let (status, body) = post_predict(
        app.clone(),
        json!({ "weight": 70, "height": 175, "goal": "cut", "gender": "male", "activity": "active" }),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("age"));

    let (status, _) = post_predict(
        app.clone(),
        json!({ "age": 30, "weight": "lots", "height": 175, "goal": "cut", "gender": "male", "activity": "active" }),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(app, request).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("error").is_some());
}

#[tokio::test]
async fn oversized_body_is_a_json_payload_too_large() {
    let app = demo_app().expect("app should build");

    let body = format!(r#"{{"goal": "cut", "padding": "{}"}}"#, "x".repeat(20 * 1024));
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header("content-type", "application/json")
        .header("content-length", body.len())
        .body(Body::from(body))
        .unwrap();
    let (status, body) = send(app, request).await.unwrap();

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"], "request body exceeds 16384 bytes");
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let app = demo_app().expect("app should build");

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert!(response.headers().contains_key("x-request-id"));
}

struct PassThrough;

impl Scaler for PassThrough {
    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, ModelError> {
        Ok(features.to_vec())
    }
}

struct CountingClassifier {
    calls: Arc<AtomicUsize>,
}

impl Classifier for CountingClassifier {
    fn predict(&self, _features: &[f64]) -> Result<usize, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(0)
    }

    fn predict_proba(&self, _features: &[f64]) -> Result<Vec<f64>, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![0.75, 0.25])
    }
}

fn counting_app(calls: Arc<AtomicUsize>) -> axum::Router {
    let encoder = |name: &str, classes: &[&str]| {
        Arc::new(LabelEncoder::new(
            name,
            classes.iter().map(|c| c.to_string()).collect(),
        ))
    };
    let mut registry = ModelRegistry::new(
        encoder("plan", &["steady_recomp"]),
        encoder("gender", &["Female", "Male"]),
        encoder("activity", &["Active", "Sedentary"]),
    );
    for goal in Goal::ALL {
        registry = registry.with_expert(
            goal,
            Arc::new(PassThrough),
            Arc::new(CountingClassifier {
                calls: calls.clone(),
            }),
        );
    }

    build_router(ApiState {
        router: PlanRouter::new(Arc::new(registry), AppMetrics::shared()),
        allowed_origins: Arc::new(Vec::new()),
    })
}

#[tokio::test]
async fn invalid_goal_does_not_invoke_any_model() {
    let calls = Arc::new(AtomicUsize::new(0));
    let app = counting_app(calls.clone());

    let (status, _) = post_predict(
        app.clone(),
        json!({
            "age": 30, "weight": 70, "height": 175,
            "goal": "shred", "gender": "male", "activity": "active"
        }),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let (status, plan) = post_predict(
        app,
        json!({
            "age": 30, "weight": 70, "height": 175,
            "goal": "maintain", "gender": "male", "activity": "active"
        }),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(plan["title"], "steady recomp (AI Personalized)");
    assert_eq!(plan["confidence"], 75.0);
    assert_eq!(
        strings(&plan["workout_split"]),
        [
            "Day 1: Upper Body",
            "Day 2: Lower Body",
            "Day 3: Cardio / Sport",
            "Day 4: Upper Hypertrophy",
            "Day 5: Lower Hypertrophy",
        ]
    );
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
