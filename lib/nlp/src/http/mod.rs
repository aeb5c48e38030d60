// SPDX-FileCopyrightText: Copyright (c) 2025-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! HTTP surface
//!
//! | Method | Path          | Body                                   |
//! |--------|---------------|----------------------------------------|
//! | POST   | `/classify`   | `{text, threshold?}`                   |
//! | POST   | `/batch`      | `{events: [{id, text, threshold?}], threshold?}` |
//! | GET    | `/categories` |                                        |
//! | GET    | `/health`     |                                        |
//! | GET    | `/metrics`    |                                        |

pub mod routes;
pub mod server;

pub use routes::router;
pub use server::{HttpService, HttpServiceBuilder};
