use std::sync::Arc;

use clipmeter_core::{AnalysisResult, ConfigError, ControlState, Outcome, PipelineConfig};
use engine_logging::{engine_info, engine_warn};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::control::{PipelineControl, SignatureLimit};
use crate::{Analyzer, ChangeMonitor, TextSource, TokenCounter};

/// Change monitor and analyzer running as two tasks joined by bounded queues.
pub struct Pipeline {
    results: mpsc::Receiver<Outcome<AnalysisResult>>,
    control: PipelineControl,
    tasks: Vec<JoinHandle<()>>,
}

impl Pipeline {
    /// Validates `config` and spawns both stages on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn start(
        config: PipelineConfig,
        source: Arc<dyn TextSource>,
        counter: Arc<dyn TokenCounter>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let signature_limit = SignatureLimit::new(config.signature_limit);
        let analyzer = Analyzer::new(config.cache_capacity, counter, signature_limit.clone())?;

        let (snapshot_tx, snapshot_rx) = mpsc::channel(config.queue_capacity);
        let (result_tx, result_rx) = mpsc::channel(config.queue_capacity);
        let (signal_tx, signal_rx) = mpsc::channel(1);
        let (state_tx, state_rx) = watch::channel(ControlState::Running);

        let monitor = ChangeMonitor::new(source, config.poll_interval, state_tx);
        let tasks = vec![
            tokio::spawn(monitor.run(snapshot_tx, signal_rx)),
            tokio::spawn(analyzer.run(snapshot_rx, result_tx)),
        ];

        engine_info!(
            "pipeline started interval={:?} signature_limit={} cache_capacity={} queue_capacity={}",
            config.poll_interval,
            config.signature_limit,
            config.cache_capacity,
            config.queue_capacity
        );

        Ok(Self {
            results: result_rx,
            control: PipelineControl::new(signal_tx, state_rx, signature_limit),
            tasks,
        })
    }

    /// Next result; `None` once both stages have stopped.
    pub async fn recv(&mut self) -> Option<Outcome<AnalysisResult>> {
        self.results.recv().await
    }

    pub fn try_recv(&mut self) -> Option<Outcome<AnalysisResult>> {
        self.results.try_recv().ok()
    }

    pub fn control(&self) -> PipelineControl {
        self.control.clone()
    }

    /// Closes the result stream and waits for both stages to wind down.
    pub async fn shutdown(self) {
        let Self {
            results,
            control,
            tasks,
        } = self;
        drop(results);
        drop(control);
        for task in tasks {
            if let Err(err) = task.await {
                engine_warn!("pipeline task ended abnormally: {}", err);
            }
        }
        engine_info!("pipeline stopped");
    }
}
