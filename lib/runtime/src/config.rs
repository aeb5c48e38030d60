// SPDX-FileCopyrightText: Copyright (c) 2025-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Environment switches read by the runtime.

/// Set to a truthy value to emit logs as JSON lines
pub const LOGGING_JSONL_ENV: &str = "WANDERTO_LOGGING_JSONL";

/// Set to a truthy value to strip ANSI colour codes from readable logs
pub const DISABLE_ANSI_LOGGING_ENV: &str = "WANDERTO_DISABLE_ANSI_LOGGING";

/// Set to a truthy value to stamp logs in the local timezone instead of UTC
pub const USE_LOCAL_TZ_ENV: &str = "WANDERTO_LOG_USE_LOCAL_TZ";

/// Check if a string is truthy.
///
/// Accepts `1`, `true`, `on` and `yes`, case-insensitively.
pub fn is_truthy(val: &str) -> bool {
    matches!(
        val.trim().to_lowercase().as_str(),
        "1" | "true" | "on" | "yes"
    )
}

/// Check if the environment variable `env` is set to a truthy value
pub fn env_is_truthy(env: &str) -> bool {
    match std::env::var(env) {
        Ok(val) => is_truthy(val.as_str()),
        Err(_) => false,
    }
}

pub fn jsonl_logging_enabled() -> bool {
    env_is_truthy(LOGGING_JSONL_ENV)
}

pub fn disable_ansi_logging() -> bool {
    env_is_truthy(DISABLE_ANSI_LOGGING_ENV)
}

pub fn use_local_timezone() -> bool {
    env_is_truthy(USE_LOCAL_TZ_ENV)
}

/// Number of processing units the process may use, never less than 1
pub fn available_cores() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
