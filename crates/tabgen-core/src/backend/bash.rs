//! bash backend
//!
//! Emits one variable table per command node (child tokens, option
//! strings, per-slot choice lists, custom compgen hooks, non-default
//! arities) plus a fixed runtime that replays the already-typed words
//! through those tables: child token switches node, known option string
//! switches the current action, a saturated arity advances the
//! positional slot. Candidates come from the state the replay lands in.

use std::iter::once;

use crate::assemble::{BASH_TEMPLATE, assemble, preamble_block};
use crate::escape::sh_single_quote;
use crate::ident::fold;
use crate::spec::{ArgKind, Candidates};
use crate::walk::{Node, Walk};

use super::{GenError, GenOptions};

pub fn render(walk: &Walk, opts: &GenOptions) -> Result<String, GenError> {
    let mut groups = Vec::new();
    for node in &walk.nodes {
        let lines = node_tables(walk, node);
        if !lines.is_empty() {
            groups.push(lines.join("\n"));
        }
    }

    let script = assemble(
        "bash",
        BASH_TEMPLATE,
        minijinja::context! {
            prog => &walk.prog,
            root => &walk.root_prefix,
            tables => groups.join("\n\n"),
            preamble => preamble_block(opts.preamble.as_deref()),
        },
    )?;
    Ok(script)
}

fn node_tables(walk: &Walk, node: &Node) -> Vec<String> {
    let mut lines = Vec::new();

    if !node.recognized_tokens.is_empty() {
        lines.push(format!(
            "{}_subparsers={}",
            node.ident,
            sh_single_quote(&node.recognized_tokens.join(" "))
        ));
    }

    let option_strings: Vec<&str> = node
        .options
        .iter()
        .flat_map(|opt| opt.flags.iter().map(String::as_str))
        .collect();
    if !option_strings.is_empty() {
        lines.push(format!(
            "{}_option_strings={}",
            node.ident,
            sh_single_quote(&option_strings.join(" "))
        ));
    }

    // every recognized token, alias or primary, routes to the child's
    // shared table set
    for child in &node.children {
        let target = &walk.nodes[child.node].ident;
        for token in once(&child.name).chain(&child.aliases) {
            lines.push(format!(
                "{}_{}_target={}",
                node.ident,
                fold(token),
                sh_single_quote(target)
            ));
        }
    }

    for slot in &node.slots {
        let action = format!("{}_pos_{}", node.ident, slot.index);
        action_vars(
            &mut lines,
            &action,
            &slot.candidates,
            slot.arity.bash_nargs(),
            false,
        );
    }

    for opt in &node.options {
        let nargs = if opt.consumes_value {
            opt.arity.bash_nargs()
        } else {
            Some("0")
        };
        for flag in &opt.flags {
            let action = format!("{}_{}", node.ident, fold(flag));
            action_vars(
                &mut lines,
                &action,
                &opt.candidates,
                nargs,
                opt.kind == ArgKind::Terminal,
            );
        }
    }

    lines
}

fn action_vars(
    lines: &mut Vec<String>,
    action: &str,
    candidates: &Candidates,
    nargs: Option<&str>,
    terminal: bool,
) {
    match candidates {
        Candidates::None => {}
        Candidates::Choices(choices) => {
            if !choices.is_empty() {
                lines.push(format!(
                    "{action}_choices={}",
                    sh_single_quote(&choices.join(" "))
                ));
            }
        }
        Candidates::File => lines.push(format!("{action}_COMPGEN=_tabgen_compgen_files")),
        Candidates::Dir => lines.push(format!("{action}_COMPGEN=_tabgen_compgen_dirs")),
        Candidates::Custom(_) => {
            if let Some(expr) = candidates.custom_for("bash") {
                lines.push(format!("{action}_COMPGEN={}", sh_single_quote(expr)));
            }
        }
    }
    if let Some(marker) = nargs {
        lines.push(format!("{action}_nargs={}", sh_single_quote(marker)));
    }
    if terminal {
        lines.push(format!("{action}_terminal=1"));
    }
}
