use std::sync::Arc;

use tokio::sync::mpsc;

use seekcore_bridge::{Bridge, BridgeError};
use seekcore_config::{PanelConfig, SettingsRecord};
use seekcore_entry::FileEntry;
use seekcore_query::{QueryCoordinator, QueryEffect, ResponseOutcome, SearchRequest};
use seekcore_session::{SessionEffect, SettingsEdit, SettingsSession};

pub mod view;

pub use view::{PanelView, ResultTab};

#[derive(Debug)]
pub enum PanelEvent {
    SearchFinished {
        sequence: u64,
        result: Result<Vec<FileEntry>, BridgeError>,
    },
    DebounceElapsed {
        ticket: u64,
    },
    SettingsLoaded {
        epoch: u64,
        result: Result<SettingsRecord, BridgeError>,
    },
    SettingsSaved {
        epoch: u64,
        result: Result<String, BridgeError>,
    },
}

// Must be used from within a tokio runtime.
pub struct Panel<B: Bridge> {
    bridge: Arc<B>,
    config: PanelConfig,
    query: QueryCoordinator,
    settings: SettingsSession,
    tab: ResultTab,
    events: mpsc::UnboundedSender<PanelEvent>,
}

impl<B: Bridge> Panel<B> {
    pub fn new(bridge: Arc<B>, config: PanelConfig) -> (Self, mpsc::UnboundedReceiver<PanelEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let query = QueryCoordinator::new(config.min_query_len, config.debounce());
        let panel = Self {
            bridge,
            config,
            query,
            settings: SettingsSession::default(),
            tab: ResultTab::default(),
            events,
        };
        (panel, receiver)
    }

    pub fn query(&self) -> &QueryCoordinator {
        &self.query
    }

    pub fn settings(&self) -> &SettingsSession {
        &self.settings
    }

    pub fn tab(&self) -> ResultTab {
        self.tab
    }

    pub fn view(&self) -> PanelView {
        view::build(&self.query, &self.settings, self.tab, self.config.max_results)
    }

    pub fn query_changed(&mut self, text: impl Into<String>) {
        let effect = self.query.on_query_changed(text);
        self.run_query_effect(effect);
    }

    pub fn commit(&mut self) {
        let effect = self.query.on_commit();
        self.run_query_effect(Some(effect));
    }

    pub fn open_file(&self, path: &str) {
        self.run_query_effect(Some(self.query.on_open_file(path)));
    }

    pub fn open_result(&self, index: usize) -> bool {
        let path = view::visible_entries(self.query.results(), self.tab, self.config.max_results)
            .nth(index)
            .map(|entry| entry.path.clone());
        match path {
            Some(path) => {
                self.open_file(&path);
                true
            }
            None => false,
        }
    }

    pub fn set_tab(&mut self, tab: ResultTab) {
        self.tab = tab;
    }

    pub fn open_settings(&mut self) {
        let effect = self.settings.open();
        self.run_session_effect(effect);
    }

    pub fn edit_settings(&mut self, edit: SettingsEdit) -> bool {
        self.settings.edit(edit)
    }

    pub fn save_settings(&mut self) {
        let effect = self.settings.save();
        self.run_session_effect(effect);
    }

    pub fn cancel_settings(&mut self) -> bool {
        self.settings.cancel()
    }

    pub fn handle(&mut self, event: PanelEvent) {
        match event {
            PanelEvent::SearchFinished { sequence, result } => {
                if let ResponseOutcome::Accepted { count } =
                    self.query.on_search_response(sequence, result)
                {
                    tracing::debug!(sequence, count, "results updated");
                }
            }
            PanelEvent::DebounceElapsed { ticket } => {
                let effect = self.query.on_debounce_elapsed(ticket);
                self.run_query_effect(effect);
            }
            PanelEvent::SettingsLoaded { epoch, result } => self.settings.on_loaded(epoch, result),
            PanelEvent::SettingsSaved { epoch, result } => self.settings.on_saved(epoch, result),
        }
    }

    fn run_query_effect(&self, effect: Option<QueryEffect>) {
        match effect {
            Some(QueryEffect::Search(request)) => self.spawn_search(request),
            Some(QueryEffect::ScheduleSearch { ticket, delay }) => {
                let events = self.events.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = events.send(PanelEvent::DebounceElapsed { ticket });
                });
            }
            Some(QueryEffect::OpenFile(path)) => {
                let bridge = Arc::clone(&self.bridge);
                tokio::spawn(async move {
                    if let Err(error) = bridge.open_file(&path).await {
                        tracing::warn!(%path, %error, "open_file failed");
                    }
                });
            }
            None => {}
        }
    }

    fn spawn_search(&self, request: SearchRequest) {
        tracing::debug!(sequence = request.sequence, query = %request.query, "issuing search");
        let bridge = Arc::clone(&self.bridge);
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = bridge.search(&request.query).await;
            let event = PanelEvent::SearchFinished {
                sequence: request.sequence,
                result,
            };
            if events.send(event).is_err() {
                tracing::debug!(sequence = request.sequence, "panel gone; dropping search reply");
            }
        });
    }

    fn run_session_effect(&self, effect: Option<SessionEffect>) {
        let bridge = Arc::clone(&self.bridge);
        let events = self.events.clone();
        match effect {
            Some(SessionEffect::ReadSettings { epoch }) => {
                tokio::spawn(async move {
                    let result = bridge.read_settings().await;
                    let _ = events.send(PanelEvent::SettingsLoaded { epoch, result });
                });
            }
            Some(SessionEffect::WriteSettings { epoch, record }) => {
                tokio::spawn(async move {
                    let result = bridge.write_settings(&record).await;
                    let _ = events.send(PanelEvent::SettingsSaved { epoch, result });
                });
            }
            None => {}
        }
    }
}
