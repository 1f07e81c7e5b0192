// Copyright 2026 Gatefetch Contributors
// SPDX-License-Identifier: Apache-2.0

//! Gatefetch library — the gated-navigation fetch flow.
//!
//! Exposes the core modules for integration testing.

pub mod browser;
pub mod capture;
pub mod cli;
pub mod error;
pub mod fetch;
pub mod gate;
pub mod stealth;
pub mod variant;
