//! Per-shell completion-script generators
//!
//! Each backend renders the same [`Walk`](crate::walk::Walk) through
//! shell-native mechanisms: bash replays the typed words through
//! per-node variable tables, zsh drives the completion system's
//! `_arguments`/`_describe` DSL, tcsh flattens everything into one
//! global pattern table. The [`Registry`] is the explicit shell-name to
//! generator lookup; an unknown name fails immediately with the
//! supported set spelled out.

pub mod bash;
pub mod tcsh;
pub mod zsh;

use std::collections::BTreeMap;

use thiserror::Error;

use crate::spec::CommandSpec;
use crate::walk::{self, Walk, WalkError};

#[derive(Debug, Error)]
pub enum GenError {
    #[error("unsupported shell `{requested}` (supported: {supported})")]
    UnsupportedShell {
        requested: String,
        supported: String,
    },

    #[error(transparent)]
    Walk(#[from] WalkError),

    #[error("template rendering failed: {0}")]
    Template(#[from] minijinja::Error),
}

/// Options for a single generation request.
#[derive(Debug, Clone, Default)]
pub struct GenOptions {
    /// Program name the script is registered under (default: the root
    /// command's name).
    pub prog: Option<String>,

    /// Root identifier prefix (default: `_tabgen_<prog>`).
    pub root_prefix: Option<String>,

    /// Literal text spliced into the script between marker comments.
    pub preamble: Option<String>,
}

pub type GeneratorFn = fn(&Walk, &GenOptions) -> Result<String, GenError>;

/// Immutable shell-name to generator lookup table, constructed once and
/// passed around by reference.
pub struct Registry {
    generators: BTreeMap<&'static str, GeneratorFn>,
}

impl Registry {
    /// The built-in backends: bash, tcsh, zsh.
    pub fn builtin() -> Self {
        let mut generators: BTreeMap<&'static str, GeneratorFn> = BTreeMap::new();
        generators.insert("bash", bash::render as GeneratorFn);
        generators.insert("tcsh", tcsh::render as GeneratorFn);
        generators.insert("zsh", zsh::render as GeneratorFn);
        Self { generators }
    }

    /// Shell names this registry can generate for, sorted.
    pub fn supported(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.generators.keys().copied()
    }

    /// Compile `spec` into a completion script for `shell`.
    pub fn generate(
        &self,
        shell: &str,
        spec: &CommandSpec,
        opts: &GenOptions,
    ) -> Result<String, GenError> {
        let Some(generator) = self.generators.get(shell) else {
            return Err(GenError::UnsupportedShell {
                requested: shell.to_string(),
                supported: self.supported().collect::<Vec<_>>().join(", "),
            });
        };
        let walk = walk::walk(spec, opts.prog.as_deref(), opts.root_prefix.as_deref())?;
        generator(&walk, opts)
    }
}
