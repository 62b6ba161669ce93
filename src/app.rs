use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::dashboard::{Command, Dashboard};
use crate::event::AppEvent;
use crate::pipeline::{self, Pipeline};
use crate::tui::handle_key;

/// Application state
///
/// Owns the dashboard and the single event channel every worker reports on.
pub struct App {
    dashboard: Dashboard,
    sender: UnboundedSender<AppEvent>,
    receiver: UnboundedReceiver<AppEvent>,
    /// Worker tasks running the steps of each row
    workers: Vec<JoinHandle<()>>,
}

impl App {
    /// Create a new App instance
    pub fn new(dashboard: Dashboard) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            dashboard,
            sender,
            receiver,
            workers: Vec::new(),
        }
    }

    /// Sender for events coming from outside the event loop
    pub fn sender(&self) -> UnboundedSender<AppEvent> {
        self.sender.clone()
    }

    /// Spawn one worker per started row
    pub fn spawn_workers(&mut self, pipeline: Arc<Pipeline>) {
        for (index, row) in self.dashboard.rows().iter().enumerate() {
            if row.active_task().is_none() {
                continue;
            }
            let worker = pipeline::run_row(
                Arc::clone(&pipeline),
                index,
                row.clone(),
                self.sender.clone(),
            );
            self.workers.push(tokio::spawn(worker));
        }
        debug!(workers = self.workers.len(), "workers spawned");
    }

    /// Wait for the next event
    pub async fn next_event(&mut self) -> Option<AppEvent> {
        self.receiver.recv().await
    }

    /// Apply every event already queued, without waiting
    pub fn poll_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.receiver.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Apply one event
    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => handle_key(self, key),
            AppEvent::Resize { width, height } => self.dashboard.resize(width, height),
            AppEvent::Tick => self.dashboard.tick(),
            AppEvent::TaskResult(result) => self.dashboard.handle_task_result(result),
        }
    }

    /// Abort every worker; their child processes are killed on drop
    pub fn kill_all(&mut self) {
        for worker in self.workers.drain(..) {
            worker.abort();
        }
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.dashboard.should_quit()
    }

    /// Set quit flag
    pub fn quit(&mut self) {
        self.dashboard.apply(Command::Quit);
    }

    /// Get dashboard reference
    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    /// Get mutable dashboard reference
    pub fn dashboard_mut(&mut self) -> &mut Dashboard {
        &mut self.dashboard
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{RowStatus, TaskStatus};
    use crate::event::TaskResult;
    use crate::pipeline::{parse_step, parse_target};
    use std::time::Duration;

    fn pipeline(steps: &[&str], targets: &[&str]) -> Arc<Pipeline> {
        let steps = steps.iter().map(|s| parse_step(s).unwrap()).collect();
        let targets = targets.iter().map(|t| parse_target(t).unwrap()).collect();
        Arc::new(Pipeline::new(steps, targets).unwrap())
    }

    fn app_for(pipeline: &Pipeline) -> App {
        let dashboard = Dashboard::builder()
            .task_columns(pipeline.task_columns())
            .prefix_columns(pipeline.prefix_columns())
            .rows(pipeline.row_specs())
            .build()
            .unwrap();
        App::new(dashboard)
    }

    #[test]
    fn app_new_initializes_correctly() {
        let pipeline = pipeline(&["build=true"], &["web", "api"]);
        let app = app_for(&pipeline);

        assert_eq!(app.dashboard().rows().len(), 2);
        assert!(!app.should_quit());
        assert!(app.workers.is_empty());
    }

    #[test]
    fn app_quit_sets_flag() {
        let pipeline = pipeline(&["build=true"], &["web"]);
        let mut app = app_for(&pipeline);

        app.quit();
        assert!(app.should_quit());
    }

    #[test]
    fn app_handle_event_dispatches_by_kind() {
        let pipeline = pipeline(&["build=true"], &["web"]);
        let mut app = app_for(&pipeline);

        app.handle_event(AppEvent::Resize {
            width: 100,
            height: 40,
        });
        assert_eq!(app.dashboard().terminal_size(), (100, 40));

        let frame = app.dashboard().spinner_frame();
        app.handle_event(AppEvent::Tick);
        assert_ne!(app.dashboard().spinner_frame(), frame);

        app.handle_event(TaskResult::success(0).into());
        assert_eq!(app.dashboard().rows()[0].status(), RowStatus::Success);
    }

    #[test]
    fn app_poll_events_drains_queue() {
        let pipeline = pipeline(&["build=true", "test=true"], &["web"]);
        let mut app = app_for(&pipeline);

        let sender = app.sender();
        sender.send(TaskResult::success(0).into()).unwrap();
        sender.send(TaskResult::warning(0).into()).unwrap();

        assert_eq!(app.poll_events(), 2);
        assert_eq!(app.poll_events(), 0);
        assert_eq!(app.dashboard().rows()[0].status(), RowStatus::Warning);
    }

    #[tokio::test]
    async fn app_workers_report_every_step() {
        let pipeline = pipeline(
            &["build=echo built {app}", "test=exit 1", "deploy=true"],
            &["web", "api"],
        );
        let mut app = app_for(&pipeline);

        app.spawn_workers(Arc::clone(&pipeline));
        assert_eq!(app.workers.len(), 2);

        while !app.dashboard().is_finished() {
            let event = tokio::time::timeout(Duration::from_secs(10), app.next_event())
                .await
                .expect("worker result in time")
                .expect("channel open");
            app.handle_event(event);
        }

        for row in app.dashboard().rows() {
            assert_eq!(row.status(), RowStatus::Failure);
            let statuses: Vec<_> = row.tasks().iter().map(|t| t.status()).collect();
            assert_eq!(
                statuses,
                vec![TaskStatus::Success, TaskStatus::Failure, TaskStatus::Skip]
            );
        }
        let payload = app.dashboard().rows()[1].tasks()[0]
            .output()
            .map(|o| o.payload.clone());
        assert_eq!(payload.as_deref(), Some("built api"));
    }

    #[tokio::test]
    async fn app_kill_all_aborts_workers() {
        let pipeline = pipeline(&["build=sleep 10"], &["web"]);
        let mut app = app_for(&pipeline);

        app.spawn_workers(Arc::clone(&pipeline));
        assert_eq!(app.workers.len(), 1);

        app.kill_all();
        assert!(app.workers.is_empty());
    }
}
