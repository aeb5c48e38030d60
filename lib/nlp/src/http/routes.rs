// SPDX-FileCopyrightText: Copyright (c) 2025-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use prometheus::{Encoder, TextEncoder};
use tower_http::trace::TraceLayer;

use crate::metrics;
use crate::protocols::{
    BatchRequest, BatchResponse, CategoriesResponse, ClassifyRequest, ClassifyResponse,
    ErrorResponse, HealthResponse,
};
use crate::service::ClassificationService;

/// Text classified by the health check
pub const HEALTH_PROBE_TEXT: &str = "Live jazz concert in the park this weekend";

type AppState = Arc<ClassificationService>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/classify", post(classify_handler))
        .route("/batch", post(batch_handler))
        .route("/categories", get(categories_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn error_response(endpoint: &'static str, status: StatusCode, detail: String) -> Response {
    metrics::REQUESTS
        .with_label_values(&[endpoint, status.as_str()])
        .inc();
    (status, Json(ErrorResponse { detail })).into_response()
}

fn ok_response<T: serde::Serialize>(endpoint: &'static str, body: T) -> Response {
    metrics::REQUESTS
        .with_label_values(&[endpoint, StatusCode::OK.as_str()])
        .inc();
    (StatusCode::OK, Json(body)).into_response()
}

async fn classify_handler(
    State(state): State<AppState>,
    Json(request): Json<ClassifyRequest>,
) -> Response {
    match state
        .bridge()
        .try_classify(request.text, request.threshold)
        .await
    {
        Ok(categories) => ok_response("classify", ClassifyResponse { categories }),
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Classification error");
            error_response("classify", StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}"))
        }
    }
}

async fn batch_handler(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> Response {
    let total = request.events.len();
    tracing::info!(total, threshold = request.threshold, "Received batch request");

    match state
        .dispatcher()
        .dispatch(request.events, request.threshold)
        .await
    {
        Ok(results) => ok_response("batch", BatchResponse { results }),
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), total, "Batch classification error");
            error_response("batch", StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}"))
        }
    }
}

async fn categories_handler(State(state): State<AppState>) -> Response {
    ok_response(
        "categories",
        CategoriesResponse {
            categories: state.categories().to_vec(),
        },
    )
}

async fn health_handler(State(state): State<AppState>) -> Response {
    match state.bridge().try_classify(HEALTH_PROBE_TEXT, 0.0).await {
        Ok(_) => ok_response(
            "health",
            HealthResponse {
                status: "healthy".to_string(),
                config: state.health_config(),
            },
        ),
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Health check failed");
            error_response(
                "health",
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("health check failed: {e:#}"),
            )
        }
    }
}

async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();

    let mut families = prometheus::gather();
    match metrics::pool_metric_families(state.bridge().pool().metrics()) {
        Ok(pool) => families.extend(pool),
        Err(e) => tracing::error!("Failed to collect compute pool metrics: {}", e),
    }

    match encoder.encode(&families, &mut buffer) {
        Ok(()) => match String::from_utf8(buffer) {
            Ok(response) => (StatusCode::OK, response),
            Err(e) => {
                tracing::error!("Failed to encode metrics as UTF-8: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to encode metrics as UTF-8".to_string(),
                )
            }
        },
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to encode metrics".to_string(),
            )
        }
    }
}
