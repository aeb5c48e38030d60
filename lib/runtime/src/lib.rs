// SPDX-FileCopyrightText: Copyright (c) 2025-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! WanderTO runtime
//!
//! Process plumbing shared by the WanderTO services: logging setup,
//! environment helpers, and the compute pool that keeps blocking inference
//! off the async request loop.

pub use anyhow::{
    Context as ErrorContext, Error, Ok as OK, Result, anyhow as error, bail as raise,
};

pub mod compute;
pub mod config;
pub mod logging;

pub use compute::{ComputeConfig, ComputeHandle, ComputeMetrics, ComputePool};
pub use tokio_util::sync::CancellationToken;
