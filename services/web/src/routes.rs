use crate::infra::AppState;
use crate::page::{self, Outcome};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::{Extension, Form, Json};
use credit_risk::risk::{prediction_router, ApplicantForm, RiskPredictor};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) fn with_page_routes(predictor: Arc<RiskPredictor>) -> axum::Router {
    prediction_router(predictor)
        .route("/", axum::routing::get(form_page).post(submit_form))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn form_page() -> Html<String> {
    Html(page::render(&ApplicantForm::default(), None))
}

pub(crate) async fn submit_form(
    Extension(state): Extension<AppState>,
    Form(form): Form<ApplicantForm>,
) -> impl IntoResponse {
    let outcome = form
        .parse()
        .map_err(|err| err.to_string())
        .and_then(|record| state.predictor.predict(&record).map_err(|err| err.to_string()));

    match outcome {
        Ok(prediction) => {
            info!(verdict = ?prediction.verdict, "form prediction rendered");
            let html = page::render(&form, Some(&Outcome::Verdict(prediction.verdict)));
            (StatusCode::OK, Html(html))
        }
        Err(reason) => {
            warn!(%reason, "form prediction failed");
            let html = page::render(&form, Some(&Outcome::Failure(reason)));
            (StatusCode::UNPROCESSABLE_ENTITY, Html(html))
        }
    }
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::testing::app_state;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn app(ready: bool) -> axum::Router {
        let state = app_state(ready);
        with_page_routes(state.predictor.clone()).layer(Extension(state))
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        String::from_utf8(bytes.to_vec()).expect("utf8 body")
    }

    fn form_request(body: &str) -> Request<Body> {
        Request::post("/")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .expect("request builds")
    }

    const DEFAULT_FORM: &str = "age=30&sex=male&job=1&housing=own&saving_accounts=little\
        &checking_account=little&duration=12&credit_amount=100";

    #[tokio::test]
    async fn form_page_renders_defaults_without_outcome() {
        let response = app(true)
            .oneshot(Request::get("/").body(Body::empty()).expect("request builds"))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains(page::TITLE));
        assert!(html.contains(page::ACTION));
        assert!(!html.contains("Predicted Credit Risk"));
    }

    #[tokio::test]
    async fn submitting_the_form_shows_good_verdict() {
        let response = app(true)
            .oneshot(form_request(DEFAULT_FORM))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("outcome success"));
        assert!(html.contains("<strong>GOOD</strong>"));
    }

    #[tokio::test]
    async fn submitting_a_long_loan_shows_bad_verdict_and_keeps_values() {
        let body = DEFAULT_FORM.replace("duration=12", "duration=36");
        let response = app(true)
            .oneshot(form_request(&body))
            .await
            .expect("router responds");

        let html = body_text(response).await;
        assert!(html.contains("outcome error"));
        assert!(html.contains("<strong>BAD</strong>"));
        assert!(html.contains("value=\"36\""));
    }

    #[tokio::test]
    async fn unknown_category_shows_failure_state() {
        let body = DEFAULT_FORM.replace("sex=male", "sex=other");
        let response = app(true)
            .oneshot(form_request(&body))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = body_text(response).await;
        assert!(html.contains("Unable to predict credit risk"));
        assert!(!html.contains("Predicted Credit Risk is"));
    }

    #[tokio::test]
    async fn out_of_bounds_age_shows_failure_state() {
        let body = DEFAULT_FORM.replace("age=30", "age=81");
        let response = app(true)
            .oneshot(form_request(&body))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = body_text(response).await;
        assert!(html.contains("Age must be between 18 and 80, got 81"));
        assert!(html.contains("value=\"81\""));
    }

    #[tokio::test]
    async fn json_prediction_route_is_mounted() {
        let payload = json!({
            "age": 30, "sex": "male", "job": 1, "housing": "own",
            "saving_accounts": "little", "checking_account": "little",
            "duration": 12, "credit_amount": 100
        });
        let response = app(true)
            .oneshot(
                Request::post("/api/v1/predict")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("\"risk\":\"good\""));
    }

    #[tokio::test]
    async fn readiness_reflects_startup_flag() {
        let response = app(false)
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request builds"))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = app(true)
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request builds"))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_and_metrics_respond() {
        let response = app(true)
            .oneshot(Request::get("/health").body(Body::empty()).expect("request builds"))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);

        let response = app(true)
            .oneshot(Request::get("/metrics").body(Body::empty()).expect("request builds"))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; version=0.0.4"
        );
    }
}
