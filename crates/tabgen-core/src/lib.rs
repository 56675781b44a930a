//! tabgen-core — compile CLI definitions into shell completion scripts
//!
//! The pipeline is a pure function of its inputs: a [`CommandSpec`] tree
//! is flattened by the [`walk`] module into shell-agnostic per-node
//! records, one of the [`backend`] generators renders those records
//! through the target shell's native completion mechanisms, and the
//! assembler splices the result into a fixed skeleton. Nothing is
//! cached between calls and no shell is ever executed.
//!
//! ```
//! use tabgen_core::{CommandSpec, GenOptions};
//!
//! let spec = CommandSpec::new("greeter");
//! let script = tabgen_core::generate(&spec, "bash", &GenOptions::default()).unwrap();
//! assert!(script.ends_with("complete -o filenames -F _tabgen_greeter greeter\n"));
//! ```

mod assemble;
pub mod backend;
pub mod escape;
pub mod ident;
pub mod spec;
pub mod walk;

pub use backend::{GenError, GenOptions, Registry};
pub use spec::{ArgKind, Arity, Candidates, CommandSpec, Opt, Positional, SpecError};

/// Compile `spec` into a completion script for `shell` using the
/// built-in backends.
pub fn generate(spec: &CommandSpec, shell: &str, opts: &GenOptions) -> Result<String, GenError> {
    Registry::builtin().generate(shell, spec, opts)
}
