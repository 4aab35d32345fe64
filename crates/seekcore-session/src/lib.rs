use std::path::PathBuf;

use seekcore_bridge::BridgeError;
use seekcore_config::SettingsRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalState {
    Closed,
    Loading,
    Editing,
    Saving,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SettingsEdit {
    Hotkey(String),
    RootDir(PathBuf),
    SearchTimeout(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEffect {
    ReadSettings { epoch: u64 },
    WriteSettings { epoch: u64, record: SettingsRecord },
}

#[derive(Debug, Clone)]
pub struct SettingsSession {
    state: ModalState,
    draft: SettingsRecord,
    last_error: Option<String>,
    last_known: Option<SettingsRecord>,
    epoch: u64,
}

impl Default for SettingsSession {
    fn default() -> Self {
        Self {
            state: ModalState::Closed,
            draft: SettingsRecord::default(),
            last_error: None,
            last_known: None,
            epoch: 0,
        }
    }
}

impl SettingsSession {
    pub fn state(&self) -> ModalState {
        self.state
    }

    pub fn draft(&self) -> &SettingsRecord {
        &self.draft
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.state != ModalState::Closed
    }

    pub fn open(&mut self) -> Option<SessionEffect> {
        if self.state != ModalState::Closed {
            tracing::debug!(state = ?self.state, "settings already open");
            return None;
        }

        self.epoch += 1;
        self.state = ModalState::Loading;
        self.draft = SettingsRecord::default();
        self.last_error = None;
        tracing::info!(epoch = self.epoch, "loading settings");
        Some(SessionEffect::ReadSettings { epoch: self.epoch })
    }

    pub fn on_loaded(&mut self, epoch: u64, result: Result<SettingsRecord, BridgeError>) {
        if epoch != self.epoch || self.state != ModalState::Loading {
            tracing::debug!(epoch, current = self.epoch, "dropping settings read for a closed session");
            return;
        }

        match result {
            Ok(record) => {
                self.last_known = Some(record.clone());
                self.draft = record;
                self.last_error = None;
            }
            Err(error) => {
                tracing::warn!(%error, "settings read failed; editing fallback values");
                self.draft = self.last_known.clone().unwrap_or_default();
                self.last_error = Some(format!("Could not load settings: {error}"));
            }
        }
        self.state = ModalState::Editing;
    }

    pub fn edit(&mut self, edit: SettingsEdit) -> bool {
        if self.state != ModalState::Editing {
            tracing::debug!(state = ?self.state, ?edit, "ignoring settings edit");
            return false;
        }

        match edit {
            SettingsEdit::Hotkey(hotkey) => self.draft.hotkey = hotkey,
            SettingsEdit::RootDir(root_dir) => self.draft.root_dir = root_dir,
            SettingsEdit::SearchTimeout(seconds) => self.draft.search_timeout = seconds,
        }
        true
    }

    pub fn save(&mut self) -> Option<SessionEffect> {
        if self.state != ModalState::Editing {
            tracing::debug!(state = ?self.state, "ignoring settings save");
            return None;
        }

        if let Err(error) = self.draft.validate() {
            self.last_error = Some(error.to_string());
            return None;
        }

        self.state = ModalState::Saving;
        self.last_error = None;
        tracing::info!(epoch = self.epoch, "saving settings");
        Some(SessionEffect::WriteSettings {
            epoch: self.epoch,
            record: self.draft.clone(),
        })
    }

    pub fn on_saved(&mut self, epoch: u64, result: Result<String, BridgeError>) {
        if epoch != self.epoch || self.state != ModalState::Saving {
            tracing::debug!(epoch, current = self.epoch, "dropping unexpected settings write reply");
            return;
        }

        match result {
            Ok(message) if message.is_empty() => {
                tracing::info!(epoch, "settings saved");
                self.last_known = Some(self.draft.clone());
                self.close();
            }
            Ok(message) => {
                tracing::info!(epoch, %message, "backend rejected settings");
                self.last_error = Some(message);
                self.state = ModalState::Editing;
            }
            Err(error) => {
                tracing::warn!(%error, "settings write failed; keeping draft");
                self.last_error = Some(format!("Could not save settings: {error}"));
                self.state = ModalState::Editing;
            }
        }
    }

    pub fn cancel(&mut self) -> bool {
        match self.state {
            ModalState::Loading | ModalState::Editing => {
                self.close();
                true
            }
            ModalState::Saving => {
                tracing::debug!("ignoring cancel while saving");
                false
            }
            ModalState::Closed => false,
        }
    }

    fn close(&mut self) {
        self.state = ModalState::Closed;
        self.draft = SettingsRecord::default();
        self.last_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend_record() -> SettingsRecord {
        SettingsRecord {
            hotkey: "Ctrl+Space".to_string(),
            root_dir: PathBuf::from("/home/user/docs"),
            search_timeout: 5.0,
        }
    }

    fn read_epoch(effect: Option<SessionEffect>) -> u64 {
        match effect {
            Some(SessionEffect::ReadSettings { epoch }) => epoch,
            other => panic!("expected a read, got {other:?}"),
        }
    }

    fn editing_session() -> (SettingsSession, u64) {
        let mut session = SettingsSession::default();
        let epoch = read_epoch(session.open());
        session.on_loaded(epoch, Ok(backend_record()));
        (session, epoch)
    }

    #[test]
    fn open_loads_draft_from_backend() {
        let mut session = SettingsSession::default();
        let epoch = read_epoch(session.open());
        assert_eq!(session.state(), ModalState::Loading);

        session.on_loaded(epoch, Ok(backend_record()));
        assert_eq!(session.state(), ModalState::Editing);
        assert_eq!(session.draft(), &backend_record());
        assert_eq!(session.last_error(), None);
    }

    #[test]
    fn cancel_then_open_refetches_instead_of_reusing_edits() {
        let (mut session, first) = editing_session();
        assert!(session.edit(SettingsEdit::Hotkey("Alt+F".to_string())));
        assert!(session.cancel());
        assert_eq!(session.state(), ModalState::Closed);

        let second = read_epoch(session.open());
        assert_ne!(first, second);
        assert_eq!(session.draft(), &SettingsRecord::default());

        session.on_loaded(second, Ok(backend_record()));
        assert_eq!(session.draft().hotkey, "Ctrl+Space");
    }

    #[test]
    fn failed_load_still_opens_an_editable_form() {
        let mut session = SettingsSession::default();
        let epoch = read_epoch(session.open());
        session.on_loaded(epoch, Err(BridgeError::Unavailable("refused".to_string())));

        assert_eq!(session.state(), ModalState::Editing);
        assert_eq!(session.draft(), &SettingsRecord::default());
        assert!(session.last_error().unwrap().contains("refused"));
        assert!(session.edit(SettingsEdit::Hotkey("Ctrl+K".to_string())));
    }

    #[test]
    fn failed_load_falls_back_to_last_known_record() {
        let (mut session, _) = editing_session();
        session.cancel();

        let epoch = read_epoch(session.open());
        session.on_loaded(epoch, Err(BridgeError::Unavailable("gone".to_string())));
        assert_eq!(session.draft(), &backend_record());
        assert!(session.last_error().is_some());
    }

    #[test]
    fn invalid_timeout_blocks_save_without_backend_call() {
        let (mut session, _) = editing_session();
        session.edit(SettingsEdit::SearchTimeout(-1.0));

        assert_eq!(session.save(), None);
        assert_eq!(session.state(), ModalState::Editing);
        assert_eq!(
            session.last_error(),
            Some("Search timeout must be a positive number of seconds.")
        );
    }

    #[test]
    fn backend_rejection_keeps_draft_for_retry() {
        let (mut session, _) = editing_session();
        session.edit(SettingsEdit::RootDir(PathBuf::from("/does/not/exist")));
        let Some(SessionEffect::WriteSettings { epoch, record }) = session.save() else {
            panic!("valid draft must be written");
        };
        assert_eq!(session.state(), ModalState::Saving);
        assert_eq!(record.root_dir, PathBuf::from("/does/not/exist"));

        session.on_saved(epoch, Ok("invalid root directory".to_string()));
        assert_eq!(session.state(), ModalState::Editing);
        assert_eq!(session.draft(), &record);
        assert_eq!(session.last_error(), Some("invalid root directory"));
    }

    #[test]
    fn empty_reply_closes_the_session() {
        let (mut session, _) = editing_session();
        let Some(SessionEffect::WriteSettings { epoch, .. }) = session.save() else {
            panic!("valid draft must be written");
        };
        session.on_saved(epoch, Ok(String::new()));
        assert_eq!(session.state(), ModalState::Closed);
        assert!(!session.is_open());
    }

    #[test]
    fn transport_failure_on_save_preserves_draft() {
        let (mut session, _) = editing_session();
        session.edit(SettingsEdit::Hotkey("Ctrl+Shift+Alt+Space".to_string()));
        let Some(SessionEffect::WriteSettings { epoch, .. }) = session.save() else {
            panic!("valid draft must be written");
        };

        session.on_saved(epoch, Err(BridgeError::Unavailable("reset".to_string())));
        assert_eq!(session.state(), ModalState::Editing);
        assert_eq!(session.draft().hotkey, "Ctrl+Shift+Alt+Space");
        assert!(session.last_error().unwrap().contains("reset"));
    }

    #[test]
    fn saving_ignores_edits_opens_and_second_saves() {
        let (mut session, _) = editing_session();
        let Some(SessionEffect::WriteSettings { .. }) = session.save() else {
            panic!("valid draft must be written");
        };

        assert!(!session.edit(SettingsEdit::Hotkey("Ctrl+Q".to_string())));
        assert_eq!(session.open(), None);
        assert_eq!(session.save(), None);
        assert!(!session.cancel());
        assert_eq!(session.state(), ModalState::Saving);
        assert_eq!(session.draft().hotkey, "Ctrl+Space");
    }

    #[test]
    fn edits_before_load_completes_are_ignored() {
        let mut session = SettingsSession::default();
        let epoch = read_epoch(session.open());
        assert!(!session.edit(SettingsEdit::Hotkey("Ctrl+Q".to_string())));
        session.on_loaded(epoch, Ok(backend_record()));
        assert_eq!(session.draft(), &backend_record());
    }

    #[test]
    fn late_load_for_cancelled_session_is_dropped() {
        let mut session = SettingsSession::default();
        let stale = read_epoch(session.open());
        assert!(session.cancel());

        let fresh = read_epoch(session.open());
        session.on_loaded(
            stale,
            Ok(SettingsRecord {
                hotkey: "Old+Key".to_string(),
                ..backend_record()
            }),
        );
        assert_eq!(session.state(), ModalState::Loading);

        session.on_loaded(fresh, Ok(backend_record()));
        assert_eq!(session.draft(), &backend_record());
    }
}
