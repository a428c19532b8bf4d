use std::borrow::Cow::{self, Borrowed, Owned};

use colored::Colorize;
use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::{Hint, Hinter};
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use crate::commands::{COMMANDS, Command, HISTORY_SUBCOMMANDS, LANGUAGE_CODES};

/// What the word under the cursor is, inside a slash command.
#[derive(Debug, PartialEq, Eq)]
enum Slot<'a> {
    /// The command name itself.
    Name(&'a str),
    /// A file path argument.
    Path,
    /// A word from a fixed list, starting at byte `start`.
    Word {
        start: usize,
        prefix: &'a str,
        words: &'static [&'static str],
    },
    None,
}

fn slot(line: &str) -> Slot<'_> {
    if !line.starts_with('/') {
        return Slot::None;
    }
    let Some((name, rest)) = line.split_once(' ') else {
        return Slot::Name(line);
    };
    let start = name.len() + 1;

    match name {
        "/image" => Slot::Path,
        "/lang" if !rest.contains(' ') => Slot::Word {
            start,
            prefix: rest,
            words: LANGUAGE_CODES,
        },
        "/history" => match rest.split_once(' ') {
            None => Slot::Word {
                start,
                prefix: rest,
                words: HISTORY_SUBCOMMANDS,
            },
            Some(("html", _)) => Slot::Path,
            Some(_) => Slot::None,
        },
        _ => Slot::None,
    }
}

fn pairs<'a>(words: impl Iterator<Item = &'a str>, prefix: &str) -> Vec<Pair> {
    words
        .filter(|word| word.starts_with(prefix))
        .map(|word| Pair {
            display: word.to_string(),
            replacement: word.to_string(),
        })
        .collect()
}

/// Inline hint taken from a command's usage line.
///
/// Literal text can be accepted with the right arrow; placeholders such as
/// `<path>` are only displayed.
#[derive(Debug, PartialEq, Eq)]
pub struct UsageHint {
    display: String,
    insertable: usize,
}

impl Hint for UsageHint {
    fn display(&self) -> &str {
        &self.display
    }

    fn completion(&self) -> Option<&str> {
        (self.insertable > 0).then(|| &self.display[..self.insertable])
    }
}

/// Rustyline helper for the Kisan prompt.
///
/// Completes command names, `/history` subcommands, `/lang` codes, and file
/// paths for `/image` and `/history html`.
pub struct CliHelper {
    names: Vec<&'static str>,
    files: FilenameCompleter,
}

impl CliHelper {
    pub fn new() -> Self {
        Self {
            names: COMMANDS
                .iter()
                .map(|(name, _, _)| *name)
                .filter(|name| !name.contains(' '))
                .collect(),
            files: FilenameCompleter::new(),
        }
    }

    fn candidates(&self, line: &str, pos: usize) -> rustyline::Result<(usize, Vec<Pair>)> {
        match slot(&line[..pos]) {
            Slot::Name(prefix) => Ok((0, pairs(self.names.iter().copied(), prefix))),
            Slot::Path => self.files.complete_path(line, pos),
            Slot::Word {
                start,
                prefix,
                words,
            } => Ok((start, pairs(words.iter().copied(), prefix))),
            Slot::None => Ok((pos, Vec::new())),
        }
    }

    fn usage_hint(&self, line: &str) -> Option<UsageHint> {
        if !line.starts_with('/') || COMMANDS.iter().any(|(_, usage, _)| *usage == line) {
            return None;
        }

        let usage = COMMANDS
            .iter()
            .map(|(_, usage, _)| *usage)
            .find(|usage| usage.starts_with(line) && usage.len() > line.len())?;
        let rest = &usage[line.len()..];

        Some(UsageHint {
            display: rest.to_string(),
            insertable: rest.find('<').unwrap_or(rest.len()),
        })
    }
}

impl Default for CliHelper {
    fn default() -> Self {
        Self::new()
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        self.candidates(line, pos)
    }
}

impl Highlighter for CliHelper {
    /// Known command names in cyan, unknown ones in red, arguments untouched.
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if !line.starts_with('/') {
            return Borrowed(line);
        }

        let (name, rest) = line.split_at(line.find(' ').unwrap_or(line.len()));
        if !matches!(Command::parse(name), Command::Unknown(_)) {
            Owned(format!("{}{}", name.bright_cyan(), rest))
        } else if self.names.iter().any(|known| known.starts_with(name)) {
            Borrowed(line)
        } else {
            Owned(format!("{}{}", name.red(), rest))
        }
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Owned(hint.bright_black().to_string())
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = UsageHint;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<UsageHint> {
        if pos < line.len() {
            return None;
        }
        self.usage_hint(line)
    }
}

impl Validator for CliHelper {}
