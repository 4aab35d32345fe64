use std::fmt;

use seekcore_entry::{FileEntry, FileKind};
use seekcore_query::QueryCoordinator;
use seekcore_session::{ModalState, SettingsSession};

pub const EMPTY_HINT: &str = "Start searching to find!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultTab {
    #[default]
    All,
    Documents,
    Images,
}

impl ResultTab {
    pub const ALL: [ResultTab; 3] = [ResultTab::All, ResultTab::Documents, ResultTab::Images];

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Documents => "Documents",
            Self::Images => "Images",
        }
    }

    pub fn admits(self, kind: FileKind) -> bool {
        match self {
            Self::All => true,
            Self::Documents => kind == FileKind::Document,
            Self::Images => kind == FileKind::Image,
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "all" => Some(Self::All),
            "doc" | "docs" | "documents" => Some(Self::Documents),
            "img" | "images" => Some(Self::Images),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub kind: FileKind,
    pub name: String,
    pub short_path: String,
    pub path: String,
}

impl From<&FileEntry> for ResultRow {
    fn from(entry: &FileEntry) -> Self {
        Self {
            kind: entry.kind,
            name: entry.name.clone(),
            short_path: shorten_path(&entry.path),
            path: entry.path.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SettingsView {
    pub state: ModalState,
    pub hotkey: String,
    pub root_dir: String,
    pub search_timeout: f64,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelView {
    pub query: String,
    pub tab: ResultTab,
    pub rows: Vec<ResultRow>,
    pub settings: Option<SettingsView>,
}

pub fn visible_entries<'a>(
    results: &'a [FileEntry],
    tab: ResultTab,
    max_results: usize,
) -> impl Iterator<Item = &'a FileEntry> + 'a {
    results
        .iter()
        .filter(move |entry| tab.admits(entry.kind))
        .take(max_results)
}

pub fn build(
    query: &QueryCoordinator,
    settings: &SettingsSession,
    tab: ResultTab,
    max_results: usize,
) -> PanelView {
    let settings_view = settings.is_open().then(|| {
        let draft = settings.draft();
        SettingsView {
            state: settings.state(),
            hotkey: draft.hotkey.clone(),
            root_dir: draft.root_dir.display().to_string(),
            search_timeout: draft.search_timeout,
            error: settings.last_error().map(str::to_string),
        }
    });

    PanelView {
        query: query.query().to_string(),
        tab,
        rows: visible_entries(query.results(), tab, max_results)
            .map(ResultRow::from)
            .collect(),
        settings: settings_view,
    }
}

/// `C:\Users\me\docs\report.docx` becomes `.../docs/report.docx`.
pub fn shorten_path(path: &str) -> String {
    let parts: Vec<&str> = path
        .split(['\\', '/'])
        .filter(|part| !part.is_empty())
        .collect();
    let tail = &parts[parts.len().saturating_sub(2)..];
    format!(".../{}", tail.join("/"))
}

impl fmt::Display for PanelView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "> {}", self.query)?;

        let tabs: Vec<String> = ResultTab::ALL
            .iter()
            .map(|tab| {
                if *tab == self.tab {
                    format!("[{}]", tab.label())
                } else {
                    tab.label().to_string()
                }
            })
            .collect();
        writeln!(f, "{}", tabs.join(" "))?;

        if self.rows.is_empty() {
            writeln!(f, "  {EMPTY_HINT}")?;
        }
        for (index, row) in self.rows.iter().enumerate() {
            writeln!(
                f,
                "{index:>3} [{}] {}  {}",
                row.kind.wire_tag(),
                row.name,
                row.short_path
            )?;
        }

        if let Some(settings) = &self.settings {
            writeln!(f, "-- settings ({:?}) --", settings.state)?;
            if settings.state == ModalState::Loading {
                writeln!(f, "  loading...")?;
            } else {
                writeln!(f, "  hotkey:         {}", settings.hotkey)?;
                writeln!(f, "  root_dir:       {}", settings.root_dir)?;
                writeln!(f, "  search_timeout: {}", settings.search_timeout)?;
            }
            if let Some(error) = &settings.error {
                writeln!(f, "  error: {error}")?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortens_windows_and_unix_paths() {
        assert_eq!(
            shorten_path("C:\\Users\\me\\docs\\report.docx"),
            ".../docs/report.docx"
        );
        assert_eq!(shorten_path("/home/user/photos/cat.png"), ".../photos/cat.png");
        assert_eq!(shorten_path("notes.md"), ".../notes.md");
        assert_eq!(shorten_path(""), ".../");
    }

    #[test]
    fn tabs_filter_by_kind() {
        let results = vec![
            FileEntry::new("a", "/a.pdf", FileKind::Document),
            FileEntry::new("b", "/b.png", FileKind::Image),
            FileEntry::new("c", "/c", FileKind::Directory),
        ];

        let names = |tab: ResultTab| {
            visible_entries(&results, tab, 10)
                .map(|entry| entry.name.as_str())
                .collect::<Vec<_>>()
        };
        assert_eq!(names(ResultTab::All), ["a", "b", "c"]);
        assert_eq!(names(ResultTab::Documents), ["a"]);
        assert_eq!(names(ResultTab::Images), ["b"]);
    }

    #[test]
    fn display_cap_limits_rows() {
        let results: Vec<FileEntry> = (0..5)
            .map(|i| FileEntry::new(format!("f{i}"), format!("/f{i}"), FileKind::Generic))
            .collect();
        assert_eq!(visible_entries(&results, ResultTab::All, 3).count(), 3);
    }

    #[test]
    fn tab_names_parse_loosely() {
        assert_eq!(ResultTab::parse(" Docs "), Some(ResultTab::Documents));
        assert_eq!(ResultTab::parse("images"), Some(ResultTab::Images));
        assert_eq!(ResultTab::parse("video"), None);
    }

    #[test]
    fn empty_view_shows_hint() {
        let view = build(
            &QueryCoordinator::default(),
            &SettingsSession::default(),
            ResultTab::All,
            10,
        );
        let text = view.to_string();
        assert!(text.contains(EMPTY_HINT));
        assert!(text.contains("[All] Documents Images"));
        assert!(view.settings.is_none());
    }
}
