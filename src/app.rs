//! Session state: the presentation state plus everything the terminal
//! session owns around it (selection, the live subscription, export jobs).

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::NaiveDate;
use ratatui::widgets::ListState;
use tracing::{info, warn};

use crate::deal::Deal;
use crate::error::ExportError;
use crate::export::{default_file_name, write_document, DocumentGenerator};
use crate::feed::{subscribe, FeedMsg, SnapshotSource, Subscription};
use crate::state::PresentationState;

/// Progress of the most recent export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportStatus {
    Running,
    Done(PathBuf),
    Failed(String),
}

pub struct App {
    pub state: PresentationState,
    /// List selection state for scrolling.
    pub list_state: ListState,
    /// Whether the user has requested to quit.
    pub quit: bool,
    pub export_status: Option<ExportStatus>,
    subscription: Option<Subscription>,
    generator: Arc<dyn DocumentGenerator>,
    export_dir: PathBuf,
    export_rx: Option<Receiver<Result<PathBuf, ExportError>>>,
}

impl App {
    pub fn new(
        state: PresentationState,
        generator: Arc<dyn DocumentGenerator>,
        export_dir: PathBuf,
    ) -> Self {
        Self {
            state,
            list_state: ListState::default(),
            quit: false,
            export_status: None,
            subscription: None,
            generator,
            export_dir,
            export_rx: None,
        }
    }

    // -- feed ----------------------------------------------------------------

    /// Start following `source`.  Any existing subscription is released
    /// first, so two pollers never deliver into the same session.
    pub fn subscribe(&mut self, source: Box<dyn SnapshotSource>, interval: Duration) {
        self.unsubscribe();
        self.subscription = Some(subscribe(source, interval));
    }

    pub fn unsubscribe(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }

    /// Release the subscription at the end of the session without waiting
    /// for a fetch in flight, so quitting never stalls on the network.
    pub fn shutdown(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.detach();
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.as_ref().is_some_and(Subscription::is_active)
    }

    /// Process every pending delivery, each as of `today`.
    pub fn drain_feed(&mut self, today: NaiveDate) {
        let mut pending = Vec::new();
        if let Some(subscription) = &self.subscription {
            while let Some(msg) = subscription.try_next() {
                pending.push(msg);
            }
        }
        for msg in pending {
            self.apply_feed(msg, today);
        }
    }

    pub fn apply_feed(&mut self, msg: FeedMsg, today: NaiveDate) {
        self.state.apply(msg, today);
        self.clamp_selection();
    }

    /// Keep the selection on screen after the list changed size.
    fn clamp_selection(&mut self) {
        let len = self.state.deals().len();
        let selected = match self.list_state.selected() {
            _ if len == 0 => None,
            Some(i) => Some(i.min(len - 1)),
            None => Some(0),
        };
        self.list_state.select(selected);
    }

    // -- navigation ----------------------------------------------------------

    pub fn select_next(&mut self) {
        let len = self.state.deals().len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(len - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.state.deals().is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if !self.state.deals().is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        let len = self.state.deals().len();
        if len > 0 {
            self.list_state.select(Some(len - 1));
        }
    }

    pub fn selected_deal(&self) -> Option<&Deal> {
        self.list_state
            .selected()
            .and_then(|i| self.state.deals().get(i))
    }

    // -- actions -------------------------------------------------------------

    pub fn cycle_language(&mut self) {
        self.state.cycle_language();
        info!(language = self.state.language().code(), "language changed");
    }

    /// Open the selected deal's preferred link in the browser.
    pub fn open_selected(&self) {
        let Some(link) = self.selected_deal().and_then(Deal::preferred_link) else {
            return;
        };
        if let Err(e) = webbrowser::open(link) {
            warn!(link, error = %e, "could not open browser");
        }
    }

    /// Export the list currently on screen on a worker thread.
    ///
    /// Ignored while a previous export is still running.  The result is
    /// picked up by [`poll_export`](Self::poll_export).
    pub fn start_export(&mut self, today: NaiveDate) {
        if self.export_rx.is_some() {
            return;
        }
        let request = self.state.export_request(today);
        let generator = Arc::clone(&self.generator);
        let path = default_file_name(&self.export_dir, today, generator.extension());
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = write_document(generator.as_ref(), &request, &path);
            // The app may have quit in the meantime.
            let _ = tx.send(result);
        });

        self.export_rx = Some(rx);
        self.export_status = Some(ExportStatus::Running);
    }

    /// Collect the result of a finished export, if there is one.
    pub fn poll_export(&mut self) {
        let Some(rx) = &self.export_rx else {
            return;
        };
        let status = match rx.try_recv() {
            Ok(Ok(path)) => ExportStatus::Done(path),
            Ok(Err(e)) => {
                warn!(error = %e, "export failed");
                ExportStatus::Failed(e.to_string())
            }
            Err(mpsc::TryRecvError::Empty) => return,
            Err(mpsc::TryRecvError::Disconnected) => {
                ExportStatus::Failed("export worker stopped".into())
            }
        };
        self.export_status = Some(status);
        self.export_rx = None;
    }
}
