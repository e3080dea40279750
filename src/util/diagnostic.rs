//! Fatal-error reports for the terminal.
//!
//! A report names what failed and what it failed for (a project, a package
//! requirement or a file on disk), followed by the facts gathered along the
//! way and any fixes worth trying.

use std::fmt;
use std::path::PathBuf;

use crate::core::descriptor::ProjectName;

/// Fixes shared by more than one error.
pub mod suggestions {
    pub const NO_PROJECT: &str =
        "Run sdkgraph from a directory containing a .csproj file, or pass -C <dir>";

    pub const RESTORE: &str = "Run `dotnet restore` to regenerate obj/project.assets.json";

    pub const RUNTIME_DIRS: &str =
        "Point --dotnet-root / --mono-root (or [runtime] in config.toml) at your installation";

    pub const PIN_VERSION: &str = "Pin the package to an exact version, e.g. [1.2.3]";
}

/// What a diagnostic is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    Project(ProjectName),
    Package { name: String, requirement: String },
    Path(PathBuf),
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Project(name) => write!(f, "project {}", name),
            Subject::Package { name, requirement } => write!(f, "package {} {}", name, requirement),
            Subject::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub message: String,
    pub subject: Option<Subject>,
    pub notes: Vec<String>,
    pub suggestions: Vec<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            subject: None,
            notes: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn about(mut self, subject: Subject) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn suggest(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Render for the terminal, one `help:` line per suggestion.
    pub fn format(&self, color: bool) -> String {
        let label = |ansi: &str, text: &str| {
            if color {
                format!("\x1b[1;{}m{}\x1b[0m", ansi, text)
            } else {
                text.to_string()
            }
        };

        let mut out = format!("{}: {}\n", label("31", "error"), self.message);
        if let Some(subject) = &self.subject {
            out.push_str(&format!("  --> {}\n", subject));
        }
        for note in &self.notes {
            out.push_str(&format!("  = {}\n", note));
        }
        let help = label("32", "help");
        for suggestion in &self.suggestions {
            out.push_str(&format!("{}: {}\n", help, suggestion));
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(false))
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}
