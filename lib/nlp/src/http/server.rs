// SPDX-FileCopyrightText: Copyright (c) 2025-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use derive_builder::Builder;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use super::routes;
use crate::service::ClassificationService;

#[derive(Builder)]
#[builder(pattern = "owned")]
pub struct HttpService {
    service: Arc<ClassificationService>,

    #[builder(setter(into), default = "String::from(\"0.0.0.0\")")]
    host: String,

    #[builder(default = "8000")]
    port: u16,
}

impl HttpService {
    pub fn builder() -> HttpServiceBuilder {
        HttpServiceBuilder::default()
    }

    pub fn service(&self) -> &Arc<ClassificationService> {
        &self.service
    }

    pub fn router(&self) -> Router {
        routes::router(self.service.clone())
    }

    /// Bind the configured address and serve until `cancel_token` fires.
    pub async fn run(self, cancel_token: CancellationToken) -> Result<()> {
        let address = format!("{}:{}", self.host, self.port);
        tracing::debug!("Starting HTTP server on: {}", address);

        let listener = match TcpListener::bind(&address).await {
            Ok(listener) => listener,
            Err(e) => {
                tracing::error!("Failed to bind to address {}: {}", address, e);
                return Err(anyhow::anyhow!("Failed to bind to address {}: {}", address, e));
            }
        };

        self.serve(listener, cancel_token).await
    }

    /// Serve on an already bound listener until `cancel_token` fires.
    pub async fn serve(self, listener: TcpListener, cancel_token: CancellationToken) -> Result<()> {
        let actual_address = listener.local_addr()?;
        tracing::info!(address = %actual_address, "HTTP server listening");

        let app = self.router();
        let observer = cancel_token.child_token();
        axum::serve(listener, app)
            .with_graceful_shutdown(observer.cancelled_owned())
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                anyhow::anyhow!("HTTP server error: {}", e)
            })?;

        tracing::info!("HTTP server shut down");
        Ok(())
    }
}
