//! SitePulse Core - Domain types, ports and configuration
//!
//! This crate contains the host-independent core of the telemetry aggregator:
//! - **Domain entities** - `Session`, `SessionLog`, `EventEnvelope`, `PageView`, `EventCategory`
//! - **Port definitions** - Traits for adapters: `IAnalyticsSink`, `IArtifactTarget`, `IClock`
//! - **Configuration** - YAML-backed settings with validation and a builder
//!
//! # Architecture
//!
//! The domain module holds plain data and the classification rules.
//! Ports define the trait interfaces that the telemetry crate and hosts
//! implement. Nothing here performs I/O except configuration loading.

pub mod config;
pub mod domain;
pub mod ports;
