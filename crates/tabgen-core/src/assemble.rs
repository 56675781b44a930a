//! Script assembly
//!
//! Pure MiniJinja substitution of generator fragments into fixed
//! per-shell skeletons. Placeholders are named and filled with
//! pre-escaped text by the backends; no shell is ever executed here.

use minijinja::Environment;

pub(crate) const BASH_TEMPLATE: &str = include_str!("templates/bash.tpl");
pub(crate) const ZSH_TEMPLATE: &str = include_str!("templates/zsh.tpl");
pub(crate) const TCSH_TEMPLATE: &str = include_str!("templates/tcsh.tpl");

/// Render `template` under `name` with the given context.
pub(crate) fn assemble<S: serde::Serialize>(
    name: &'static str,
    template: &'static str,
    ctx: S,
) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.set_keep_trailing_newline(true);
    env.add_template(name, template)?;
    env.get_template(name)?.render(ctx)
}

/// Wrap a user preamble in marker comments so it can be located in the
/// emitted script. An absent or empty preamble yields nothing at all,
/// markers included.
pub(crate) fn preamble_block(preamble: Option<&str>) -> String {
    match preamble {
        None | Some("") => String::new(),
        Some(text) => format!(
            "\n# Custom preamble\n{}\n# End custom preamble\n",
            text.trim_end()
        ),
    }
}
