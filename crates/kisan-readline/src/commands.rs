//! REPL command parsing.

use std::path::PathBuf;

/// Slash commands with their usage and help text, in help order.
pub const COMMANDS: &[(&str, &str, &str)] = &[
    ("/image", "/image <path>", "Attach a photo to your next question"),
    ("/lang", "/lang <code>", "Change the answer language (e.g. en, hi, mr)"),
    ("/history", "/history", "Show your recent questions"),
    ("/history html", "/history html <path>", "Save your recent questions as HTML"),
    ("/history clear", "/history clear", "Forget all saved questions"),
    ("/listen", "/listen", "Dictate a question with your voice"),
    ("/speak", "/speak", "Read the last answer aloud"),
    ("/escalate", "/escalate", "Ask a human expert about the last answer"),
    ("/locate", "/locate", "Look up your approximate location"),
    ("/help", "/help", "Show this help"),
];

/// Subcommands accepted after `/history`.
pub const HISTORY_SUBCOMMANDS: &[&str] = &["html", "clear"];

/// Language codes offered for `/lang`. Others are accepted too.
pub const LANGUAGE_CODES: &[&str] = &["en", "hi", "mr", "bn", "gu", "kn", "pa", "ta", "te"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text: submit it as a question.
    Ask(String),
    /// `None` shows the image currently queued.
    Image(Option<PathBuf>),
    /// `None` shows the current language.
    Language(Option<String>),
    History,
    HistoryHtml(PathBuf),
    HistoryClear,
    Listen,
    Speak,
    Escalate,
    Locate,
    Help,
    Quit,
    /// A known command used incorrectly; carries the usage line.
    Usage(&'static str),
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();

        if trimmed == "quit" || trimmed == "exit" {
            return Self::Quit;
        }
        if !trimmed.starts_with('/') {
            return Self::Ask(trimmed.to_string());
        }

        let (name, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (trimmed, ""),
        };

        match name {
            "/image" => Self::Image(non_empty(rest).map(path_arg)),
            "/lang" => Self::Language(non_empty(rest).map(str::to_string)),
            "/history" => parse_history(rest),
            "/listen" => Self::Listen,
            "/speak" => Self::Speak,
            "/escalate" => Self::Escalate,
            "/locate" => Self::Locate,
            "/help" | "/?" => Self::Help,
            "/quit" | "/exit" => Self::Quit,
            other => Self::Unknown(other.to_string()),
        }
    }
}

fn parse_history(rest: &str) -> Command {
    let (sub, arg) = match rest.split_once(char::is_whitespace) {
        Some((sub, arg)) => (sub, arg.trim()),
        None => (rest, ""),
    };

    match sub {
        "" => Command::History,
        "clear" => Command::HistoryClear,
        "html" => match non_empty(arg) {
            Some(path) => Command::HistoryHtml(path_arg(path)),
            None => Command::Usage("/history html <path>"),
        },
        _ => Command::Usage("/history [html <path> | clear]"),
    }
}

/// Undoes the `\ ` escaping the filename completer inserts.
fn path_arg(s: &str) -> PathBuf {
    PathBuf::from(s.replace("\\ ", " "))
}

fn non_empty(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}
