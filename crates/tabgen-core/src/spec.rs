//! Declarative CLI definition model
//!
//! A [`CommandSpec`] describes one command: its options, its positional
//! arguments, and any nested subcommands. Definitions are usually loaded
//! from a YAML or JSON file, or snapshotted from a live `clap::Command`
//! by the `tabgen-clap` adapter. The model is a read-only input to script
//! generation; nothing here executes or validates a real command line.
//!
//! Example definition file:
//! ```yaml
//! name: greeter
//! help: Greet people
//! options:
//!   - flags: ["-h", "--help"]
//!     kind: terminal
//!     help: show this help message and exit
//! commands:
//!   - name: send
//!     aliases: [post]
//!     positionals:
//!       - name: recipient
//!         candidates: { choices: [world, mars] }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpecError {
    #[error("failed to read definition: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse definition: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to parse definition: {0}")]
    Json(#[from] serde_json::Error),
}

/// How many command-line words an argument consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Arity {
    /// Exactly one word.
    #[default]
    One,
    /// At most one word; completion is still offered at the slot.
    Optional,
    /// Any number of words; the slot never saturates.
    ZeroOrMore,
    /// Like `ZeroOrMore`, but at least one word is expected.
    OneOrMore,
    /// Swallows the rest of the line, option-like words included.
    Remainder,
}

impl Arity {
    /// Whether acquisition can ever roll over to the next slot.
    pub fn is_unbounded(self) -> bool {
        matches!(self, Arity::ZeroOrMore | Arity::OneOrMore | Arity::Remainder)
    }

    /// Marker stored in the bash `_nargs` tables. `None` means the
    /// default single-word arity; `Optional` counts as one word since
    /// completion is offered at the slot either way.
    pub fn bash_nargs(self) -> Option<&'static str> {
        match self {
            Arity::One | Arity::Optional => None,
            Arity::ZeroOrMore => Some("*"),
            Arity::OneOrMore => Some("+"),
            Arity::Remainder => Some("..."),
        }
    }
}

/// Behavioural class of an argument. Every backend matches on this
/// exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArgKind {
    /// Switch; consumes no value words.
    Flag,
    /// Consumes value words according to its arity.
    #[default]
    Value,
    /// May be repeated or accumulate values.
    Multi,
    /// Help/version-like: once seen, nothing further is acquired on the
    /// line.
    Terminal,
}

/// Where completion candidates for an argument's value come from.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Candidates {
    /// Free-form value, nothing to offer.
    #[default]
    None,
    /// Closed set of literal choices.
    Choices(Vec<String>),
    /// Existing file paths.
    File,
    /// Existing directory paths.
    Dir,
    /// Target-shell name mapped to a shell-native completion expression:
    /// a function name for bash, a completion action for zsh, a command
    /// whose output lists candidate words for tcsh.
    Custom(BTreeMap<String, String>),
}

impl Candidates {
    /// Custom expression for `shell`, if one was provided. A missing
    /// entry degrades to "no extra candidates", never an error.
    pub fn custom_for(&self, shell: &str) -> Option<&str> {
        match self {
            Candidates::Custom(map) => map.get(shell).map(String::as_str),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Candidates::None)
    }
}

/// An optional (flag-introduced) argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opt {
    /// Every spelling of this option, e.g. `["-o", "--output"]`. The
    /// spellings are offered as alternatives, never as separate options.
    pub flags: Vec<String>,

    #[serde(default)]
    pub kind: ArgKind,

    #[serde(default)]
    pub arity: Arity,

    #[serde(default, with = "serde_yaml::with::singleton_map")]
    pub candidates: Candidates,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,

    /// Excluded from every candidate list.
    #[serde(default)]
    pub hidden: bool,
}

impl Opt {
    /// Whether this option consumes value words. `Multi` with the
    /// default arity and nothing to complete is read as a counting flag
    /// (`-v -v -v`), not a value option.
    pub fn consumes_value(&self) -> bool {
        match self.kind {
            ArgKind::Flag | ArgKind::Terminal => false,
            ArgKind::Value => true,
            ArgKind::Multi => self.arity != Arity::One || !self.candidates.is_none(),
        }
    }
}

/// A positional argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Positional {
    pub name: String,

    #[serde(default)]
    pub arity: Arity,

    #[serde(default, with = "serde_yaml::with::singleton_map")]
    pub candidates: Candidates,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,

    /// Offered no candidates, but still occupies its slot for arity
    /// tracking.
    #[serde(default)]
    pub hidden: bool,
}

/// One command node: a program or a subcommand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandSpec {
    /// The literal command token. May contain characters that are
    /// illegal in shell identifiers; the namer folds them.
    pub name: String,

    /// Additional tokens that resolve to this same command.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,

    /// Traversable when typed, but never offered as a candidate.
    #[serde(default)]
    pub hidden: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<Opt>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub positionals: Vec<Positional>,

    /// Subcommands. Aliases live on the child itself, so each child is
    /// a single node no matter how many tokens reach it.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<CommandSpec>,
}

impl CommandSpec {
    /// A bare command with no arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            help: None,
            hidden: false,
            options: Vec::new(),
            positionals: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// Load a definition from `path`. JSON for a `.json` extension,
    /// YAML otherwise.
    pub fn load(path: &Path) -> Result<Self, SpecError> {
        let contents = std::fs::read_to_string(path)?;
        if path.extension().is_some_and(|ext| ext == "json") {
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(serde_yaml::from_str(&contents)?)
        }
    }
}
