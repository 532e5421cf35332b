//! Post administration back office: a declarative post resource served over axum.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
