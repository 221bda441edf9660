//! Build Coordinator
//!
//! Serial execution queue for build commands. One build runs at a time;
//! requests submitted while a build is active are queued FIFO and drained
//! as builds finish. A failed build clears everything behind it, a killed
//! build lets the queue continue.

use std::collections::VecDeque;
use std::process::Stdio;
use std::sync::{Arc, Weak};

use droidant_core::events::{BuildResult, Event, EventBus};
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Invoked exactly once when a build reaches a terminal state.
pub type DoneCallback = Box<dyn FnOnce(BuildResult) + Send + 'static>;

/// One unit of work for the coordinator: a shell command plus bookkeeping.
pub struct BuildRequest {
    /// Human-readable label, usually the target name. Carried into events.
    pub label: String,
    /// Full shell command, run through `sh -c`.
    pub command: String,
    /// Echo output lines at info level as they arrive.
    pub verbose: bool,
    /// Completion callback.
    pub on_done: Option<DoneCallback>,
}

impl BuildRequest {
    /// New request running `command` for the target named `label`.
    pub fn new(label: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            command: command.into(),
            verbose: false,
            on_done: None,
        }
    }

    /// Echo output while the build runs.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Completion callback.
    pub fn with_callback(mut self, on_done: DoneCallback) -> Self {
        self.on_done = Some(on_done);
        self
    }
}

struct ActiveBuild {
    cancel: CancellationToken,
}

#[derive(Default)]
struct CoordState {
    running: bool,
    queue: VecDeque<BuildRequest>,
    active: Option<ActiveBuild>,
}

/// Serial build queue.
///
/// The spawned worker task is the only place a build transitions back to
/// idle; `kill` merely requests cancellation and the worker observes it.
pub struct BuildCoordinator {
    state: Mutex<CoordState>,
    events: Arc<EventBus>,
    me: Weak<BuildCoordinator>,
}

impl BuildCoordinator {
    /// Create a coordinator publishing to `events`.
    pub fn new(events: Arc<EventBus>) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            state: Mutex::new(CoordState::default()),
            events,
            me: me.clone(),
        })
    }

    /// Whether a build is currently executing.
    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    /// Number of requests waiting behind the active build.
    pub fn queued(&self) -> usize {
        self.state.lock().queue.len()
    }

    /// Submit a request. Runs immediately when idle, otherwise queues it.
    pub fn submit(&self, request: BuildRequest) {
        let dispatch = {
            let mut state = self.state.lock();
            if state.running {
                debug!("build in progress, queueing {}", request.label);
                self.events.emit(Event::BuildQueued {
                    target: request.label.clone(),
                });
                state.queue.push_back(request);
                None
            } else {
                state.running = true;
                Some(request)
            }
        };
        if let Some(request) = dispatch {
            self.dispatch(request);
        }
    }

    /// Request cancellation of the active build. The worker task observes
    /// the token, kills the child, and continues with the queue.
    pub fn kill(&self) {
        let state = self.state.lock();
        if let Some(active) = &state.active {
            info!("killing active build");
            active.cancel.cancel();
        }
    }

    fn dispatch(&self, request: BuildRequest) {
        let BuildRequest {
            label,
            command,
            verbose,
            on_done,
        } = request;

        // a stale in-flight process must not outlive its successor
        if let Some(stale) = self.state.lock().active.take() {
            stale.cancel.cancel();
        }

        debug!("starting build {}: {}", label, command);
        let spawned = Command::new("sh")
            .arg("-c")
            .arg(&command)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();

        let child = match spawned {
            Ok(child) => child,
            Err(e) => {
                error!("failed to spawn build command: {}", e);
                self.events.emit(Event::Error {
                    message: format!("failed to start build {}: {}", label, e),
                });
                if let Some(on_done) = on_done {
                    on_done(BuildResult::Failed);
                }
                self.finish(BuildResult::Failed);
                return;
            }
        };

        let cancel = CancellationToken::new();
        self.state.lock().active = Some(ActiveBuild {
            cancel: cancel.clone(),
        });
        self.events.emit(Event::BuildStarted {
            target: label.clone(),
        });

        // submit/dispatch run on callers that may not outlive the build
        let Some(coordinator) = self.me.upgrade() else {
            return;
        };
        tokio::spawn(coordinator.wait(label, child, cancel, verbose, on_done));
    }

    async fn wait(
        self: Arc<Self>,
        label: String,
        mut child: tokio::process::Child,
        cancel: CancellationToken,
        verbose: bool,
        on_done: Option<DoneCallback>,
    ) {
        let mut log = String::new();

        if let Some(stdout) = child.stdout.take() {
            let mut lines = BufReader::new(stdout).lines();
            loop {
                tokio::select! {
                    line = lines.next_line() => match line {
                        Ok(Some(line)) => {
                            if verbose {
                                info!("{}", line);
                            }
                            log.push_str(&line);
                            log.push('\n');
                        }
                        _ => break,
                    },
                    _ = cancel.cancelled() => break,
                }
            }
        }

        let status = loop {
            if cancel.is_cancelled() {
                let _ = child.start_kill();
                break child.wait().await;
            }
            tokio::select! {
                status = child.wait() => break status,
                _ = cancel.cancelled() => {}
            }
        };

        if let Some(mut stderr) = child.stderr.take() {
            let mut remainder = String::new();
            if stderr.read_to_string(&mut remainder).await.is_ok() && !remainder.is_empty() {
                log.push_str(&remainder);
            }
        }

        let result = if cancel.is_cancelled() {
            BuildResult::Killed
        } else {
            match status {
                Ok(status) if status.success() => BuildResult::Succeeded,
                Ok(_) => BuildResult::Failed,
                Err(e) => {
                    error!("failed waiting for build process: {}", e);
                    BuildResult::Failed
                }
            }
        };

        if !log.is_empty() {
            info!("build output for {}:\n{}", label, log.trim_end());
        }
        info!("build {} finished: {:?}", label, result);
        self.events.emit(Event::BuildFinished {
            target: label,
            result,
        });
        if let Some(on_done) = on_done {
            on_done(result);
        }
        self.finish(result);
    }

    fn finish(&self, result: BuildResult) {
        let next = {
            let mut state = self.state.lock();
            state.running = false;
            state.active = None;
            if result == BuildResult::Failed && !state.queue.is_empty() {
                info!("build failed, dropping {} queued request(s)", state.queue.len());
                state.queue.clear();
            }
            match state.queue.pop_front() {
                Some(next) => {
                    state.running = true;
                    Some(next)
                }
                None => None,
            }
        };
        if let Some(next) = next {
            self.dispatch(next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    fn coordinator() -> Arc<BuildCoordinator> {
        BuildCoordinator::new(Arc::new(EventBus::new()))
    }

    fn tracked(
        label: &str,
        command: &str,
        tx: mpsc::Sender<(String, BuildResult)>,
    ) -> BuildRequest {
        let label_owned = label.to_string();
        BuildRequest::new(label, command).with_callback(Box::new(move |result| {
            let _ = tx.send((label_owned, result));
        }))
    }

    async fn recv(
        rx: &mpsc::Receiver<(String, BuildResult)>,
    ) -> Option<(String, BuildResult)> {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
        loop {
            if let Ok(done) = rx.try_recv() {
                return Some(done);
            }
            if tokio::time::Instant::now() > deadline {
                return None;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_builds_run_in_submission_order() {
        let coordinator = coordinator();
        let (tx, rx) = mpsc::channel();

        coordinator.submit(tracked("a", "sleep 0.2", tx.clone()));
        coordinator.submit(tracked("b", "true", tx.clone()));
        coordinator.submit(tracked("c", "true", tx));

        assert!(coordinator.is_running());
        assert_eq!(coordinator.queued(), 2);

        for expected in ["a", "b", "c"] {
            let (label, result) = recv(&rx).await.unwrap();
            assert_eq!(label, expected);
            assert_eq!(result, BuildResult::Succeeded);
        }
        assert!(!coordinator.is_running());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_failure_clears_queue() {
        let coordinator = coordinator();
        let (tx, rx) = mpsc::channel();

        coordinator.submit(tracked("fails", "exit 1", tx.clone()));
        coordinator.submit(tracked("dropped", "true", tx));

        let (label, result) = recv(&rx).await.unwrap();
        assert_eq!(label, "fails");
        assert_eq!(result, BuildResult::Failed);

        // dropped request never runs
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(rx.try_recv().is_err());
        assert!(!coordinator.is_running());
        assert_eq!(coordinator.queued(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_kill_starts_next_queued() {
        let coordinator = coordinator();
        let (tx, rx) = mpsc::channel();

        coordinator.submit(tracked("long", "sleep 30", tx.clone()));
        coordinator.submit(tracked("next", "true", tx));

        tokio::time::sleep(Duration::from_millis(200)).await;
        coordinator.kill();

        let (label, result) = recv(&rx).await.unwrap();
        assert_eq!(label, "long");
        assert_eq!(result, BuildResult::Killed);

        let (label, result) = recv(&rx).await.unwrap();
        assert_eq!(label, "next");
        assert_eq!(result, BuildResult::Succeeded);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_spawn_runs_immediately_when_idle() {
        let coordinator = coordinator();
        let (tx, rx) = mpsc::channel();

        coordinator.submit(tracked("only", "true", tx));
        let (label, result) = recv(&rx).await.unwrap();
        assert_eq!(label, "only");
        assert_eq!(result, BuildResult::Succeeded);
        assert!(!coordinator.is_running());
    }
}
