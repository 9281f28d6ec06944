//! Chart data for the results view, and the contract with the charting component.
//!
//! Drawing is not done here. A `ChartBackend` is handed over through a
//! one-shot load notification; the results view waits for it with a bound
//! and carries on without charts when it does not arrive.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::oneshot;
use tracing::{error, info, instrument};

use crate::domain::ResultRecord;
use crate::error::ChartError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Doughnut,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub data: Vec<u32>,
    #[serde(rename = "backgroundColor")]
    pub colors: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub id: &'static str,
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

/// Seconds spent per question, one bar each.
pub fn time_chart(r: &ResultRecord) -> ChartSpec {
    ChartSpec {
        id: "timeChart",
        kind: ChartKind::Bar,
        labels: (1..=r.detail.len()).map(|i| format!("Q{i}")).collect(),
        datasets: vec![Dataset {
            label: Some("Seconds spent".into()),
            data: r.detail.iter().map(|d| d.time_spent_seconds).collect(),
            colors: vec!["#2563eb"],
        }],
    }
}

/// Correct / wrong / unanswered split.
pub fn accuracy_chart(r: &ResultRecord) -> ChartSpec {
    ChartSpec {
        id: "accuracyChart",
        kind: ChartKind::Doughnut,
        labels: vec!["Correct".into(), "Wrong".into(), "Unanswered".into()],
        datasets: vec![Dataset {
            label: None,
            data: vec![r.correct_count as u32, r.incorrect_count as u32, r.unanswered_count as u32],
            colors: vec!["#22c55e", "#ef4444", "#eab308"],
        }],
    }
}

/// Something that can present chart specs.
pub trait ChartBackend: Send {
    fn draw(&mut self, charts: &[ChartSpec]) -> Result<(), ChartError>;
}

/// Pending charting component. Resolves once whoever loads it calls `ChartReady::ready`.
pub struct ChartLoader {
    rx: oneshot::Receiver<Box<dyn ChartBackend>>,
}

/// Load-side half of the notification. Dropping it without `ready` means the load failed.
pub struct ChartReady {
    tx: oneshot::Sender<Box<dyn ChartBackend>>,
}

impl ChartReady {
    pub fn ready(self, backend: Box<dyn ChartBackend>) {
        // The results view may already have given up waiting.
        let _ = self.tx.send(backend);
    }
}

pub fn chart_channel() -> (ChartReady, ChartLoader) {
    let (tx, rx) = oneshot::channel();
    (ChartReady { tx }, ChartLoader { rx })
}

impl ChartLoader {
    /// Wait at most `limit` for the backend.
    pub async fn wait(self, limit: Duration) -> Result<Box<dyn ChartBackend>, ChartError> {
        match tokio::time::timeout(limit, self.rx).await {
            Ok(Ok(backend)) => Ok(backend),
            Ok(Err(_)) => Err(ChartError::Unavailable),
            Err(_) => Err(ChartError::TimedOut(limit)),
        }
    }
}

/// Wait for charts and draw both. Every failure is logged and swallowed.
#[instrument(level = "info", skip_all, fields(attempt = %record.attempt_id))]
pub async fn render_charts(loader: ChartLoader, limit: Duration, record: &ResultRecord) -> bool {
    let mut backend = match loader.wait(limit).await {
        Ok(b) => b,
        Err(e) => {
            error!(target: "charts", error = %e, "Charting unavailable; results shown without charts");
            return false;
        }
    };
    match backend.draw(&[time_chart(record), accuracy_chart(record)]) {
        Ok(()) => {
            info!(target: "charts", "Charts rendered");
            true
        }
        Err(e) => {
            error!(target: "charts", error = %e, "Chart backend failed");
            false
        }
    }
}

/// Writes chart specs as JSON for an external renderer.
pub struct JsonChartExport {
    path: PathBuf,
}

impl JsonChartExport {
    /// Spawn the load: make sure the target directory exists, then report ready.
    pub fn spawn_load(path: impl Into<PathBuf>) -> ChartLoader {
        let path = path.into();
        let (ready, loader) = chart_channel();
        tokio::spawn(async move {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                if let Err(e) = tokio::fs::create_dir_all(parent).await {
                    error!(target: "charts", path = %path.display(), error = %e, "Cannot prepare chart export directory");
                    return;
                }
            }
            ready.ready(Box::new(JsonChartExport { path }));
        });
        loader
    }
}

impl ChartBackend for JsonChartExport {
    fn draw(&mut self, charts: &[ChartSpec]) -> Result<(), ChartError> {
        let json = serde_json::to_vec_pretty(charts).map_err(|e| ChartError::Backend(e.to_string()))?;
        std::fs::write(&self.path, json).map_err(|e| ChartError::Backend(format!("{}: {}", self.path.display(), e)))
    }
}
