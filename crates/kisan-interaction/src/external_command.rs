//! Helpers for collaborators backed by external programs.

/// Checks whether `program` can be found on PATH.
///
/// Uses `which` on Unix/macOS or `where` on Windows. Paths containing a
/// separator are checked directly.
pub fn is_available(program: &str) -> bool {
    if program.contains(std::path::MAIN_SEPARATOR) {
        return std::path::Path::new(program).exists();
    }

    #[cfg(unix)]
    let check_cmd = "which";
    #[cfg(windows)]
    let check_cmd = "where";

    std::process::Command::new(check_cmd)
        .arg(program)
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// A configured command line, split into program and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
}

impl CommandSpec {
    /// Builds a spec from `[program, args...]`. Returns `None` for an empty list.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        if program.trim().is_empty() {
            return None;
        }
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments with `{lang}` replaced by the language code.
    pub fn args_for(&self, language: &str) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.replace("{lang}", language))
            .collect()
    }

    pub fn to_command(&self, language: &str) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(self.args_for(language));
        cmd
    }
}
