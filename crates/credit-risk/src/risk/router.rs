use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Serialize;
use serde_json::json;
use tracing::warn;

use super::applicant::ApplicantRecord;
use super::encoding::FeatureVector;
use super::predictor::{Prediction, RiskPredictor, RiskVerdict};

/// JSON body returned for a successful prediction.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionView {
    pub label: i64,
    pub risk: RiskVerdict,
    pub message: String,
    pub features: FeatureVector,
}

impl From<Prediction> for PredictionView {
    fn from(prediction: Prediction) -> Self {
        Self {
            label: prediction.verdict.label(),
            risk: prediction.verdict,
            message: prediction.verdict.message(),
            features: prediction.features,
        }
    }
}

/// Router builder exposing the JSON prediction endpoint.
pub fn prediction_router(predictor: Arc<RiskPredictor>) -> Router {
    Router::new()
        .route("/api/v1/predict", post(predict_handler))
        .with_state(predictor)
}

pub(crate) async fn predict_handler(
    State(predictor): State<Arc<RiskPredictor>>,
    payload: Result<axum::Json<ApplicantRecord>, JsonRejection>,
) -> Response {
    let record = match payload {
        Ok(axum::Json(record)) => record,
        Err(rejection) => {
            let payload = json!({
                "error": rejection.body_text(),
            });
            return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
        }
    };

    match predictor.predict(&record) {
        Ok(prediction) => {
            let view = PredictionView::from(prediction);
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => {
            warn!(%error, "prediction failed");
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
