use std::sync::Arc;
use std::time::Duration;

use clipmeter_core::{ChangeDetector, ControlState, Outcome, TextSnapshot};
use engine_logging::{engine_debug, engine_info, engine_warn};
use tokio::sync::{mpsc, watch};
use tokio::time::{self, Interval, MissedTickBehavior};

use crate::control::ControlRequest;
use crate::{SourceError, TextSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Continue,
    Stop,
}

/// How a source read ended.
enum Reading {
    Text(Result<String, SourceError>),
    /// A control request arrived first; the read was abandoned.
    Interrupted(ControlRequest),
    /// Nobody listens downstream any more.
    Closed,
}

/// Polls a [`TextSource`] and emits the readings that count as changes.
///
/// Control requests are always checked first, including while a read is in
/// flight and while a snapshot is waiting for room downstream, so a pause
/// takes effect even when the source hangs or the consumer is backed up. A
/// read or hand-off interrupted by a control request is abandoned; the
/// baseline read on resume supersedes it.
pub struct ChangeMonitor {
    source: Arc<dyn TextSource>,
    poll_interval: Duration,
    detector: ChangeDetector,
    state: ControlState,
    published: watch::Sender<ControlState>,
}

impl ChangeMonitor {
    pub fn new(
        source: Arc<dyn TextSource>,
        poll_interval: Duration,
        published: watch::Sender<ControlState>,
    ) -> Self {
        Self {
            source,
            poll_interval,
            detector: ChangeDetector::new(),
            state: ControlState::Running,
            published,
        }
    }

    /// Runs until `output` closes, or until paused with every control handle gone.
    pub async fn run(
        mut self,
        output: mpsc::Sender<Outcome<TextSnapshot>>,
        mut control: mpsc::Receiver<ControlRequest>,
    ) {
        let mut control_open = true;
        engine_info!("change monitor started interval={:?}", self.poll_interval);

        let mut step = match self.read(&output, &mut control, &mut control_open).await {
            Reading::Text(text) => {
                self.rebase(text);
                Step::Continue
            }
            Reading::Interrupted(request) => {
                self.apply(request, &output, &mut control, &mut control_open)
                    .await
            }
            Reading::Closed => Step::Stop,
        };

        let mut ticker = time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while step == Step::Continue {
            step = match self.state {
                ControlState::Running => {
                    self.running(&mut ticker, &output, &mut control, &mut control_open)
                        .await
                }
                ControlState::Paused => {
                    self.paused(&mut ticker, &output, &mut control, &mut control_open)
                        .await
                }
            };
        }
        engine_info!("change monitor stopped");
    }

    async fn running(
        &mut self,
        ticker: &mut Interval,
        output: &mpsc::Sender<Outcome<TextSnapshot>>,
        control: &mut mpsc::Receiver<ControlRequest>,
        control_open: &mut bool,
    ) -> Step {
        tokio::select! {
            biased;
            request = control.recv(), if *control_open => match request {
                Some(request) => self.apply(request, output, control, control_open).await,
                None => {
                    *control_open = false;
                    Step::Continue
                }
            },
            _ = output.closed() => Step::Stop,
            _ = ticker.tick() => match self.read(output, control, control_open).await {
                Reading::Text(text) => match self.observe(text) {
                    Some(item) => self.push(item, output, control, control_open).await,
                    None => Step::Continue,
                },
                Reading::Interrupted(request) => {
                    engine_debug!("control request during read, read abandoned");
                    self.apply(request, output, control, control_open).await
                }
                Reading::Closed => Step::Stop,
            },
        }
    }

    async fn paused(
        &mut self,
        ticker: &mut Interval,
        output: &mpsc::Sender<Outcome<TextSnapshot>>,
        control: &mut mpsc::Receiver<ControlRequest>,
        control_open: &mut bool,
    ) -> Step {
        if !*control_open {
            engine_warn!("change monitor paused with no control handle left");
            return Step::Stop;
        }
        tokio::select! {
            biased;
            request = control.recv() => match request {
                Some(request) => self.apply(request, output, control, control_open).await,
                None => {
                    *control_open = false;
                    Step::Continue
                }
            },
            _ = output.closed() => Step::Stop,
            // Ticks are drained while paused.
            _ = ticker.tick() => Step::Continue,
        }
    }

    async fn push(
        &mut self,
        item: Outcome<TextSnapshot>,
        output: &mpsc::Sender<Outcome<TextSnapshot>>,
        control: &mut mpsc::Receiver<ControlRequest>,
        control_open: &mut bool,
    ) -> Step {
        loop {
            tokio::select! {
                biased;
                request = control.recv(), if *control_open => match request {
                    Some(request) => {
                        engine_debug!("control request while pushing, snapshot dropped");
                        return self.apply(request, output, control, control_open).await;
                    }
                    None => *control_open = false,
                },
                permit = output.reserve() => {
                    return match permit {
                        Ok(permit) => {
                            permit.send(item);
                            Step::Continue
                        }
                        Err(_) => Step::Stop,
                    };
                }
            }
        }
    }

    /// Reads the source, giving up as soon as a control request arrives or
    /// the output closes.
    async fn read(
        &self,
        output: &mpsc::Sender<Outcome<TextSnapshot>>,
        control: &mut mpsc::Receiver<ControlRequest>,
        control_open: &mut bool,
    ) -> Reading {
        let mut read = self.source.read_text();
        loop {
            tokio::select! {
                biased;
                request = control.recv(), if *control_open => match request {
                    Some(request) => return Reading::Interrupted(request),
                    None => *control_open = false,
                },
                _ = output.closed() => return Reading::Closed,
                text = &mut read => return Reading::Text(text),
            }
        }
    }

    fn observe(&mut self, text: Result<String, SourceError>) -> Option<Outcome<TextSnapshot>> {
        match text {
            Ok(text) => self.detector.observe(text).map(Ok),
            Err(err) => {
                engine_warn!("text source read failed: {}", err);
                Some(Err(err.into()))
            }
        }
    }

    /// Applies `request`, and any request that interrupts the baseline read
    /// a resume needs.
    async fn apply(
        &mut self,
        mut request: ControlRequest,
        output: &mpsc::Sender<Outcome<TextSnapshot>>,
        control: &mut mpsc::Receiver<ControlRequest>,
        control_open: &mut bool,
    ) -> Step {
        loop {
            let next = self.state.apply(request.signal());
            if next == ControlState::Running {
                match self.read(output, control, control_open).await {
                    Reading::Text(text) => self.rebase(text),
                    Reading::Interrupted(interrupting) => {
                        engine_debug!("control request during baseline read");
                        self.settle(next, request);
                        request = interrupting;
                        continue;
                    }
                    Reading::Closed => return Step::Stop,
                }
            }
            self.settle(next, request);
            return Step::Continue;
        }
    }

    fn settle(&mut self, next: ControlState, request: ControlRequest) {
        match next {
            ControlState::Paused => engine_info!("change monitor paused"),
            ControlState::Running => engine_info!("change monitor resumed"),
        }
        self.state = next;
        self.published.send_replace(next);
        request.acknowledge(next);
    }

    fn rebase(&mut self, text: Result<String, SourceError>) {
        match text {
            Ok(text) => self.detector.reset(Some(text)),
            Err(err) => {
                engine_warn!("baseline read failed: {}", err);
                self.detector.reset(None);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use clipmeter_core::{ControlSignal, ControlState};
    use tokio::sync::{mpsc, watch};
    use tokio::time::timeout;

    use super::ChangeMonitor;
    use crate::control::ControlRequest;
    use crate::{SourceError, TextSource};

    struct FixedSource(&'static str);

    #[async_trait]
    impl TextSource for FixedSource {
        async fn read_text(&self) -> Result<String, SourceError> {
            Ok(self.0.to_string())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stops_when_paused_and_every_control_handle_is_gone() {
        let (state_tx, state_rx) = watch::channel(ControlState::Running);
        let (output_tx, mut output_rx) = mpsc::channel(5);
        let (control_tx, control_rx) = mpsc::channel(1);
        let monitor = ChangeMonitor::new(
            Arc::new(FixedSource("steady")),
            Duration::from_millis(10),
            state_tx,
        );
        let task = tokio::spawn(monitor.run(output_tx, control_rx));

        let (request, applied) = ControlRequest::new(ControlSignal::Toggle);
        control_tx.send(request).await.unwrap();
        assert_eq!(applied.await.unwrap(), ControlState::Paused);
        assert_eq!(*state_rx.borrow(), ControlState::Paused);

        drop(control_tx);
        timeout(Duration::from_secs(5), task)
            .await
            .expect("monitor stops once it can never resume")
            .unwrap();
        assert!(output_rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn keeps_running_without_control_handles() {
        let (state_tx, _state_rx) = watch::channel(ControlState::Running);
        let (output_tx, mut output_rx) = mpsc::channel(5);
        let (control_tx, control_rx) = mpsc::channel::<ControlRequest>(1);
        let monitor = ChangeMonitor::new(
            Arc::new(FixedSource("steady")),
            Duration::from_millis(10),
            state_tx,
        );
        let task = tokio::spawn(monitor.run(output_tx, control_rx));
        drop(control_tx);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!task.is_finished());
        assert!(output_rx.try_recv().is_err());

        drop(output_rx);
        timeout(Duration::from_secs(5), task)
            .await
            .expect("monitor stops once its output closes")
            .unwrap();
    }
}
