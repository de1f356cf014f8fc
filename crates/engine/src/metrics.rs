// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Prometheus metric surface.

use prometheus::{Encoder, GaugeVec, IntGauge, IntGaugeVec, Opts, Registry, TextEncoder};

/// All exported gauges, registered against one registry.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub backup_last_success: IntGaugeVec,
    pub backup_last_epoch: IntGaugeVec,
    pub backup_duration: GaugeVec,
    pub jobs_running: IntGauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let backup_last_success = IntGaugeVec::new(
            Opts::new(
                "ops_backup_last_success",
                "Whether the last backup for an app succeeded (1) or not (0)",
            ),
            &["app"],
        )?;
        registry.register(Box::new(backup_last_success.clone()))?;

        let backup_last_epoch = IntGaugeVec::new(
            Opts::new(
                "ops_backup_last_epoch",
                "Unix time of the last successful backup per app",
            ),
            &["app"],
        )?;
        registry.register(Box::new(backup_last_epoch.clone()))?;

        let backup_duration = GaugeVec::new(
            Opts::new(
                "ops_backup_duration_seconds",
                "Duration of the last backup per app",
            ),
            &["app"],
        )?;
        registry.register(Box::new(backup_duration.clone()))?;

        let jobs_running = IntGauge::new("ops_jobs_running", "Jobs currently running")?;
        registry.register(Box::new(jobs_running.clone()))?;

        Ok(Self {
            registry,
            backup_last_success,
            backup_last_epoch,
            backup_duration,
            jobs_running,
        })
    }

    /// Stamp a successful backup for one app.
    pub fn record_backup_success(&self, app: &str, epoch_secs: i64, duration_secs: f64) {
        self.backup_last_success.with_label_values(&[app]).set(1);
        self.backup_last_epoch
            .with_label_values(&[app])
            .set(epoch_secs);
        self.backup_duration
            .with_label_values(&[app])
            .set(duration_secs);
    }

    /// Text exposition for `GET /metrics`.
    pub fn render(&self) -> String {
        let mut buf = Vec::new();
        let encoder = TextEncoder::new();
        if encoder.encode(&self.registry.gather(), &mut buf).is_err() {
            return String::new();
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
