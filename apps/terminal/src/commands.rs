use std::path::PathBuf;

use seekcore_session::SettingsEdit;
use seekpanel::ResultTab;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Input {
    Query(String),
    Commit,
    Open(usize),
    Tab(ResultTab),
    Settings,
    Set(SettingsEdit),
    Save,
    Cancel,
    Help,
    Exit,
    Invalid(String),
}

pub(crate) struct CommandMenuItem {
    pub(crate) command: &'static str,
    pub(crate) description: &'static str,
}

pub(crate) const COMMANDS: [CommandMenuItem; 8] = [
    CommandMenuItem {
        command: "/open N",
        description: "Open result N of the current tab",
    },
    CommandMenuItem {
        command: "/tab all|docs|images",
        description: "Switch result tab",
    },
    CommandMenuItem {
        command: "/settings",
        description: "Open the settings dialog",
    },
    CommandMenuItem {
        command: "/set hotkey|root|timeout VALUE",
        description: "Edit a settings field",
    },
    CommandMenuItem {
        command: "/save",
        description: "Save settings",
    },
    CommandMenuItem {
        command: "/cancel",
        description: "Discard settings changes",
    },
    CommandMenuItem {
        command: "/help",
        description: "Show this list",
    },
    CommandMenuItem {
        command: "/exit",
        description: "Quit",
    },
];

/// Plain text replaces the query, an empty line searches now, and `/`
/// directives drive everything else. `//` escapes a literal leading slash.
pub(crate) fn parse_input(line: &str) -> Input {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Input::Commit;
    }

    if let Some(literal) = line.strip_prefix("//") {
        return Input::Query(format!("/{literal}"));
    }

    if !line.starts_with('/') {
        return Input::Query(line.to_string());
    }

    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    match head.to_ascii_lowercase().as_str() {
        "/open" => match rest.parse::<usize>() {
            Ok(index) => Input::Open(index),
            Err(_) => Input::Invalid(format!("Not a result number: '{rest}'")),
        },
        "/tab" => match ResultTab::parse(rest) {
            Some(tab) => Input::Tab(tab),
            None => Input::Invalid(format!("Unknown tab: '{rest}'")),
        },
        "/settings" => Input::Settings,
        "/set" => parse_set(rest),
        "/save" => Input::Save,
        "/cancel" => Input::Cancel,
        "/help" => Input::Help,
        "/exit" | "/quit" => Input::Exit,
        other => Input::Invalid(format!("Unknown command: {other}")),
    }
}

fn parse_set(rest: &str) -> Input {
    let (field, value) = match rest.split_once(char::is_whitespace) {
        Some((field, value)) => (field, value.trim()),
        None => (rest, ""),
    };

    match field.to_ascii_lowercase().as_str() {
        "hotkey" => Input::Set(SettingsEdit::Hotkey(value.to_string())),
        "root" | "root_dir" => Input::Set(SettingsEdit::RootDir(PathBuf::from(value))),
        "timeout" | "search_timeout" => match value.parse::<f64>() {
            Ok(seconds) => Input::Set(SettingsEdit::SearchTimeout(seconds)),
            Err(_) => Input::Invalid(format!("Timeout must be a number of seconds, got '{value}'")),
        },
        _ => Input::Invalid(format!("Unknown settings field: '{field}'")),
    }
}
