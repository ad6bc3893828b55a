//! Payroll Engine library crate.
//!
//! This crate exposes the payroll computation engine and API
//! components as reusable modules.  External applications may depend
//! on the `payroll_engine` crate and call into `engine::recompute`
//! directly, drive an editable `draft::PayrollDraft`, or embed the API
//! via `api::build_router`.

pub mod models;
pub mod keys;
pub mod validation;
pub mod engine;
pub mod draft;
pub mod components;
pub mod config;
pub mod api;
