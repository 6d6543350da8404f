use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use clipmeter_core::{ConfigError, ControlSignal, ControlState};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("pipeline has stopped")]
pub struct PipelineClosed;

/// Signature length shared between the control handle and the analyzer.
#[derive(Debug, Clone)]
pub struct SignatureLimit(Arc<AtomicUsize>);

impl SignatureLimit {
    pub fn new(limit: usize) -> Self {
        Self(Arc::new(AtomicUsize::new(limit)))
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }

    pub fn set(&self, limit: usize) -> Result<(), ConfigError> {
        if limit == 0 {
            return Err(ConfigError::ZeroSignatureLimit);
        }
        self.0.store(limit, Ordering::Relaxed);
        Ok(())
    }
}

/// One control signal together with the slot its applied state is reported on.
#[derive(Debug)]
pub struct ControlRequest {
    signal: ControlSignal,
    applied: oneshot::Sender<ControlState>,
}

impl ControlRequest {
    pub fn new(signal: ControlSignal) -> (Self, oneshot::Receiver<ControlState>) {
        let (applied, receiver) = oneshot::channel();
        (Self { signal, applied }, receiver)
    }

    pub fn signal(&self) -> ControlSignal {
        self.signal
    }

    /// Reports the state this request moved the monitor to.
    pub fn acknowledge(self, state: ControlState) {
        // The requester may have given up waiting.
        let _ = self.applied.send(state);
    }
}

/// Cloneable handle for steering a running pipeline.
#[derive(Debug, Clone)]
pub struct PipelineControl {
    signals: mpsc::Sender<ControlRequest>,
    state: watch::Receiver<ControlState>,
    signature_limit: SignatureLimit,
}

impl PipelineControl {
    pub(crate) fn new(
        signals: mpsc::Sender<ControlRequest>,
        state: watch::Receiver<ControlState>,
        signature_limit: SignatureLimit,
    ) -> Self {
        Self {
            signals,
            state,
            signature_limit,
        }
    }

    /// Flips between running and paused.
    ///
    /// Resolves once the change monitor has applied this particular signal,
    /// with the state it moved to, even when other handles toggle
    /// concurrently. On resume the monitor has already re-read its baseline by
    /// then.
    pub async fn toggle(&self) -> Result<ControlState, PipelineClosed> {
        let (request, applied) = ControlRequest::new(ControlSignal::Toggle);
        self.signals
            .send(request)
            .await
            .map_err(|_| PipelineClosed)?;
        applied.await.map_err(|_| PipelineClosed)
    }

    /// State last applied by the change monitor.
    pub fn state(&self) -> ControlState {
        *self.state.borrow()
    }

    pub fn is_paused(&self) -> bool {
        self.state().is_paused()
    }

    pub fn signature_limit(&self) -> usize {
        self.signature_limit.get()
    }

    /// Changes the signature length used for texts analyzed from now on.
    pub fn set_signature_limit(&self, limit: usize) -> Result<(), ConfigError> {
        self.signature_limit.set(limit)
    }
}

#[cfg(test)]
mod tests {
    use super::SignatureLimit;
    use clipmeter_core::ConfigError;

    #[test]
    fn signature_limit_is_shared_between_clones() {
        let limit = SignatureLimit::new(60);
        let other = limit.clone();
        other.set(40).unwrap();
        assert_eq!(limit.get(), 40);
    }

    #[test]
    fn zero_signature_limit_is_rejected() {
        let limit = SignatureLimit::new(60);
        assert_eq!(limit.set(0), Err(ConfigError::ZeroSignatureLimit));
        assert_eq!(limit.get(), 60);
    }
}
