//! Test Module
//!
//! Integration test suite for the EchoDesk backend.
//!
//! ## Test Categories
//! - `brain_tests`: scorer, summarizer, and router properties
//! - `pipeline_tests`: orchestration, fallback policy, stepwise execution
//! - `report_tests`: aggregation invariants and report shape
//! - `loader_tests`: file ingestion and field-alias resolution

pub mod pipeline_tests;
