use actix_cors::Cors;
use actix_web::{error::InternalError, web, App, HttpRequest, HttpResponse, HttpServer};
use catmatch_core::{CategoryId, Error, PredictionResult};
use catmatch_predictor::CategoryPredictor;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

const SERVICE_NAME: &str = "catmatch";

#[derive(Deserialize)]
struct PredictRequest {
    #[serde(rename = "type", default = "default_query_type")]
    query_type: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    descriptions: Option<Vec<String>>,
}

fn default_query_type() -> String {
    "single".to_string()
}

/// Wire shape of one prediction, keeping the keys existing clients read.
#[derive(Serialize)]
struct PredictionView<'a> {
    original_query: &'a str,
    used_query: &'a str,
    synonym: &'a str,
    #[serde(rename = "Predicted Cat ID")]
    predicted_category_id: Option<&'a CategoryId>,
    #[serde(rename = "Predicted Cat Name")]
    predicted_category_name: &'a str,
    #[serde(rename = "Confidence Score")]
    confidence_score: f32,
    spelling_suggestions: &'a [String],
}

impl<'a> From<&'a PredictionResult> for PredictionView<'a> {
    fn from(r: &'a PredictionResult) -> Self {
        Self {
            original_query: &r.original_query,
            used_query: &r.used_query,
            synonym: &r.used_query,
            predicted_category_id: r.predicted_category_id.as_ref(),
            predicted_category_name: &r.predicted_category_name,
            confidence_score: r.confidence_score,
            spelling_suggestions: &r.spelling_suggestions,
        }
    }
}

#[derive(Serialize)]
struct SingleResponse<'a> {
    success: bool,
    #[serde(rename = "type")]
    query_type: &'static str,
    result: PredictionView<'a>,
}

#[derive(Serialize)]
struct MultipleResponse<'a> {
    success: bool,
    #[serde(rename = "type")]
    query_type: &'static str,
    results: Vec<PredictionView<'a>>,
}

#[derive(Default)]
struct ApiStats {
    requests_total: AtomicU64,
    predictions_total: AtomicU64,
    failed_predictions_total: AtomicU64,
}

impl ApiStats {
    fn record(&self, results: &[PredictionResult]) {
        let failed = results.iter().filter(|r| r.is_unknown()).count() as u64;
        self.predictions_total
            .fetch_add(results.len() as u64, Ordering::Relaxed);
        self.failed_predictions_total
            .fetch_add(failed, Ordering::Relaxed);
    }
}

/// Shared state handed to every handler
pub struct AppState {
    predictor: Arc<CategoryPredictor>,
    stats: ApiStats,
}

impl AppState {
    pub fn new(predictor: Arc<CategoryPredictor>) -> Self {
        Self {
            predictor,
            stats: ApiStats::default(),
        }
    }
}

pub struct RestApi;

impl RestApi {
    pub async fn start(predictor: Arc<CategoryPredictor>, port: u16) -> std::io::Result<()> {
        let state = web::Data::new(AppState::new(predictor));

        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(state.clone())
                .configure(Self::configure)
        })
        .bind(("0.0.0.0", port))?
        .run()
        .await
    }

    /// Register routes and the JSON error handler.
    pub fn configure(cfg: &mut web::ServiceConfig) {
        let json_config = web::JsonConfig::default().error_handler(|err, _req| {
            let body = serde_json::json!({
                "error": format!("Invalid request body: {}", err),
                "success": false,
            });
            InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
        });

        cfg.app_data(json_config)
            .route("/predict", web::post().to(predict))
            .route("/health", web::get().to(health))
            .route("/metrics", web::get().to(metrics));
    }
}

fn client_ip(req: &HttpRequest) -> String {
    req.connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string()
}

fn elapsed_ms(started: Instant) -> f64 {
    (started.elapsed().as_secs_f64() * 100_000.0).round() / 100.0
}

fn error_response(query_type: &str, client_ip: &str, started: Instant, e: &Error) -> HttpResponse {
    let (status, message) = match e {
        Error::Validation(msg) => (actix_web::http::StatusCode::BAD_REQUEST, msg.clone()),
        other => (
            actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("Prediction failed: {}", other),
        ),
    };

    warn!(
        event_type = "ml_prediction",
        query_type,
        client_ip,
        processing_time_ms = elapsed_ms(started),
        success = false,
        error = %message,
        "prediction rejected"
    );

    HttpResponse::build(status).json(serde_json::json!({
        "error": message,
        "success": false,
    }))
}

async fn predict(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<PredictRequest>,
) -> HttpResponse {
    let started = Instant::now();
    let client_ip = client_ip(&req);
    let body = body.into_inner();
    state.stats.requests_total.fetch_add(1, Ordering::Relaxed);

    info!(
        event_type = "prediction_request",
        query_type = %body.query_type,
        client_ip = %client_ip,
        "prediction requested"
    );

    match body.query_type.as_str() {
        "single" => {
            let description = body.description.unwrap_or_default();
            let result = match state.predictor.predict_single(&description).await {
                Ok(result) => result,
                Err(e) => return error_response("single", &client_ip, started, &e),
            };
            state.stats.record(std::slice::from_ref(&result));

            info!(
                event_type = "ml_prediction",
                query_type = "single",
                client_ip = %client_ip,
                processing_time_ms = elapsed_ms(started),
                success = true,
                predicted_category = %result.predicted_category_name,
                category_id = ?result.predicted_category_id,
                confidence_score = result.confidence_score,
                original_query = %result.original_query,
                "prediction served"
            );

            HttpResponse::Ok().json(SingleResponse {
                success: true,
                query_type: "single",
                result: PredictionView::from(&result),
            })
        }
        "multiple" => {
            let descriptions = body.descriptions.unwrap_or_default();
            let results = match state.predictor.predict_batch(&descriptions).await {
                Ok(results) => results,
                Err(e) => return error_response("multiple", &client_ip, started, &e),
            };
            state.stats.record(&results);

            let avg_confidence = if results.is_empty() {
                0.0
            } else {
                results.iter().map(|r| r.confidence_score).sum::<f32>() / results.len() as f32
            };
            info!(
                event_type = "ml_prediction",
                query_type = "multiple",
                client_ip = %client_ip,
                processing_time_ms = elapsed_ms(started),
                success = true,
                num_predictions = results.len(),
                avg_confidence,
                "batch prediction served"
            );

            HttpResponse::Ok().json(MultipleResponse {
                success: true,
                query_type: "multiple",
                results: results.iter().map(PredictionView::from).collect(),
            })
        }
        other => {
            let e = Error::Validation("Invalid query type".to_string());
            error_response(other, &client_ip, started, &e)
        }
    }
}

async fn health(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    let client_ip = client_ip(&req);
    let predictor = Arc::clone(&state.predictor);
    let timestamp = chrono::Utc::now().to_rfc3339();

    match actix_web::rt::spawn(async move { predictor.self_test().await }).await {
        Ok(operational) => {
            info!(event_type = "health_check", status = "healthy", operational, client_ip = %client_ip);
            HttpResponse::Ok().json(serde_json::json!({
                "status": "healthy",
                "message": "Category matcher is running",
                "timestamp": timestamp,
                "predictor_status": if operational { "operational" } else { "warning" },
            }))
        }
        Err(e) => {
            error!(event_type = "health_check_failed", error = %e, client_ip = %client_ip);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "status": "unhealthy",
                "error": e.to_string(),
                "timestamp": timestamp,
            }))
        }
    }
}

async fn metrics(state: web::Data<AppState>) -> HttpResponse {
    let stats = &state.stats;
    HttpResponse::Ok().json(serde_json::json!({
        "service": SERVICE_NAME,
        "status": "running",
        "host": gethostname::gethostname().to_string_lossy(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "catalog_size": state.predictor.catalog().len(),
        "embedding_model": state.predictor.model_name(),
        "requests_total": stats.requests_total.load(Ordering::Relaxed),
        "predictions_total": stats.predictions_total.load(Ordering::Relaxed),
        "failed_predictions_total": stats.failed_predictions_total.load(Ordering::Relaxed),
    }))
}
