//! tcsh backend
//!
//! tcsh has no function namespacing, so the whole tree flattens into one
//! global `complete` statement: a union of all long flags behind `c/--/`,
//! a union of all short flags behind `c/-/`, and a word-position table
//! for positionals. A position reachable under more than one command
//! prefix gets a backquote-evaluated conditional over `$COMMAND_LINE`
//! that picks the candidate set at completion time.
//!
//! Flat-table limits, by construction: positions are assigned assuming
//! one word per earlier slot, so an optional or unbounded slot ends
//! position assignment down its branch; file and directory hints inside
//! a conflicting position group degrade to nothing; hidden commands,
//! terminal options and remainder slots are not representable here.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::assemble::{TCSH_TEMPLATE, assemble, preamble_block};
use crate::escape::{sh_single_quote, tcsh_pattern, tcsh_word};
use crate::spec::{Arity, Candidates};
use crate::walk::Walk;

use super::{GenError, GenOptions};

#[derive(Debug, Clone, PartialEq)]
enum Action {
    Words(Vec<String>),
    File,
    Dir,
    Cmd(String),
}

#[derive(Debug, Clone)]
struct PosEntry {
    /// `(word position, accepted tokens)` pairs identifying the command
    /// prefix this entry applies under. Empty for root positionals.
    conds: Vec<(usize, Vec<String>)>,
    action: Action,
}

pub fn render(walk: &Walk, opts: &GenOptions) -> Result<String, GenError> {
    let mut positions: BTreeMap<usize, Vec<PosEntry>> = BTreeMap::new();
    collect(walk, 0, 1, Vec::new(), &mut positions);

    let mut entries = Vec::new();
    for (pos, group) in &positions {
        if let Some(entry) = render_position(*pos, group) {
            entries.push(entry);
        }
    }

    let (doubles, singles) = option_sets(walk);
    if !doubles.is_empty() {
        let words: Vec<String> = doubles.iter().map(|w| tcsh_word(w)).collect();
        entries.push(sh_single_quote(&tcsh_pattern(
            "c",
            "--",
            &format!("({})", words.join(" ")),
        )));
    }
    if !singles.is_empty() {
        let words: Vec<String> = singles.iter().map(|w| tcsh_word(w)).collect();
        entries.push(sh_single_quote(&tcsh_pattern(
            "c",
            "-",
            &format!("({})", words.join(" ")),
        )));
    }

    let statement = if entries.is_empty() {
        format!("complete {}", walk.prog)
    } else {
        format!("complete {} \\\n  {}", walk.prog, entries.join(" \\\n  "))
    };

    let script = assemble(
        "tcsh",
        TCSH_TEMPLATE,
        minijinja::context! {
            prog => &walk.prog,
            statement => statement,
            preamble => preamble_block(opts.preamble.as_deref()),
        },
    )?;
    Ok(script)
}

fn collect(
    walk: &Walk,
    index: usize,
    mut pos: usize,
    conds: Vec<(usize, Vec<String>)>,
    positions: &mut BTreeMap<usize, Vec<PosEntry>>,
) {
    let node = &walk.nodes[index];
    for slot in &node.slots {
        if slot.dispatch {
            let tokens: Vec<String> = node.child_tokens.iter().map(|t| tcsh_word(t)).collect();
            if !tokens.is_empty() {
                positions.entry(pos).or_default().push(PosEntry {
                    conds: conds.clone(),
                    action: Action::Words(tokens),
                });
            }
            for child in node.children.iter().filter(|c| !c.hidden) {
                let mut child_conds = conds.clone();
                let mut accepted = vec![tcsh_word(&child.name)];
                accepted.extend(child.aliases.iter().map(|a| tcsh_word(a)));
                child_conds.push((pos, accepted));
                collect(walk, child.node, pos + 1, child_conds, positions);
            }
            return;
        }

        if !slot.hidden {
            let action = match &slot.candidates {
                Candidates::None => None,
                Candidates::Choices(choices) => {
                    Some(Action::Words(choices.iter().map(|c| tcsh_word(c)).collect()))
                }
                Candidates::File => Some(Action::File),
                Candidates::Dir => Some(Action::Dir),
                Candidates::Custom(_) => slot
                    .candidates
                    .custom_for("tcsh")
                    .map(|cmd| Action::Cmd(cmd.to_string())),
            };
            if let Some(action) = action {
                positions.entry(pos).or_default().push(PosEntry {
                    conds: conds.clone(),
                    action,
                });
            }
        }

        if slot.arity != Arity::One {
            // later positions are ambiguous from here on
            debug!(slot = %slot.name, "stopping position assignment at non-unit arity");
            return;
        }
        pos += 1;
    }
}

fn render_position(pos: usize, group: &[PosEntry]) -> Option<String> {
    let first = &group[0];
    if group.iter().all(|e| e.action == first.action) {
        return Some(unconditional(pos, &first.action));
    }

    let mut clauses = Vec::new();
    for entry in group {
        let command = match &entry.action {
            Action::Words(words) => format!("echo {}", words.join(" ")),
            Action::Cmd(cmd) => cmd.clone(),
            Action::File | Action::Dir => {
                debug!(pos, "path hint dropped from conflicting tcsh position group");
                continue;
            }
        };
        if entry.conds.is_empty() {
            clauses.push(command);
        } else {
            clauses.push(format!("if ({}) {}", condition(&entry.conds), command));
        }
    }
    if clauses.is_empty() {
        return None;
    }

    let body = format!("`set w=($COMMAND_LINE) ; {}`", clauses.join(" ; "));
    Some(sh_single_quote(&tcsh_pattern("p", &pos.to_string(), &body)))
}

fn unconditional(pos: usize, action: &Action) -> String {
    let sel = pos.to_string();
    let pattern = match action {
        Action::Words(words) => tcsh_pattern("p", &sel, &format!("({})", words.join(" "))),
        Action::File => tcsh_pattern("p", &sel, "f"),
        Action::Dir => tcsh_pattern("p", &sel, "d"),
        Action::Cmd(cmd) => tcsh_pattern("p", &sel, &format!("`{cmd}`")),
    };
    sh_single_quote(&pattern)
}

/// `$COMMAND_LINE` words are 1-based with the program name first, so the
/// token at argument position `p` is `$w[p + 1]`.
fn condition(conds: &[(usize, Vec<String>)]) -> String {
    let max_index = conds.iter().map(|(p, _)| p + 1).max().unwrap_or(1);
    let mut parts = vec![format!("$#w >= {max_index}")];
    for (p, tokens) in conds {
        let checks: Vec<String> = tokens
            .iter()
            .map(|t| format!("\"$w[{}]\" == \"{}\"", p + 1, t))
            .collect();
        if checks.len() == 1 {
            parts.extend(checks);
        } else {
            parts.push(format!("({})", checks.join(" || ")));
        }
    }
    parts.join(" && ")
}

fn option_sets(walk: &Walk) -> (BTreeSet<String>, BTreeSet<String>) {
    let mut doubles = BTreeSet::new();
    let mut singles = BTreeSet::new();
    for node in &walk.nodes {
        for opt in &node.options {
            for flag in &opt.flags {
                if let Some(rest) = flag.strip_prefix("--") {
                    doubles.insert(rest.to_string());
                } else if let Some(rest) = flag.strip_prefix('-') {
                    singles.insert(rest.to_string());
                }
            }
        }
    }
    // without this sentinel the shell appends a space after completing
    // `-`, making `--…` unreachable
    if singles.is_empty() && !doubles.is_empty() {
        singles.insert("-".to_string());
    }
    (doubles, singles)
}
