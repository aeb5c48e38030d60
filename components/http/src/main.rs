// SPDX-FileCopyrightText: Copyright (c) 2025-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use figment::providers::{Format, Serialized, Toml};

use wanderto_nlp::http::HttpService;
use wanderto_nlp::{ClassificationService, ServiceConfig};
use wanderto_runtime::{CancellationToken, ErrorContext, Result, error, logging};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Host for the HTTP service; overrides HOST
    #[arg(long)]
    host: Option<String>,

    /// Port number for the HTTP service; overrides PORT
    #[arg(short, long)]
    port: Option<u16>,

    /// Additional TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();
    validate_args(&args)?;

    let config = load_config(&args).context("invalid service configuration")?;
    tracing::info!(
        host = %config.host,
        port = config.port,
        backend = %config.backend,
        model = %config.model_name,
        device = %config.device,
        max_workers = config.max_workers,
        max_batch_size = config.max_batch_size,
        "Starting classification service"
    );

    let (host, port) = (config.host.clone(), config.port);
    let service = Arc::new(ClassificationService::from_config(config)?);

    let http_service = HttpService::builder()
        .service(service)
        .host(host)
        .port(port)
        .build()?;

    let cancel_token = CancellationToken::new();
    let shutdown = cancel_token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received shutdown signal"),
            Err(e) => tracing::error!("Failed to listen for shutdown signal: {}", e),
        }
        shutdown.cancel();
    });

    http_service.run(cancel_token).await
}

fn load_config(args: &Args) -> Result<ServiceConfig> {
    let mut figment = ServiceConfig::figment();
    if let Some(path) = &args.config {
        figment = figment.merge(Toml::file(path));
    }
    if let Some(host) = &args.host {
        figment = figment.merge(Serialized::default("host", host));
    }
    if let Some(port) = args.port {
        figment = figment.merge(Serialized::default("port", port));
    }
    Ok(ServiceConfig::extract_from(figment)?)
}

fn validate_args(args: &Args) -> Result<()> {
    if let Some(path) = &args.config
        && !path.is_file()
    {
        return Err(error!("Config file {} does not exist", path.display()));
    }

    if let Some(host) = &args.host
        && host.trim().is_empty()
    {
        return Err(error!("Host must not be empty"));
    }

    Ok(())
}
