//! Shell-agnostic traversal of a definition tree
//!
//! [`walk`] flattens a [`CommandSpec`] into per-node records that the
//! shell backends render. Each node is visited exactly once; aliases
//! contribute extra tokens to the parent's lists but never a second
//! visit. Identifier collisions (paths, child tokens, or option
//! spellings that fold to the same name) fail here, before any script
//! text is produced.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::debug;

use crate::ident;
use crate::spec::{ArgKind, Arity, Candidates, CommandSpec};

#[derive(Debug, Error)]
pub enum WalkError {
    #[error("commands `{first}` and `{second}` both fold to identifier `{ident}`")]
    IdentCollision {
        first: String,
        second: String,
        ident: String,
    },

    #[error("tokens `{first}` and `{second}` under `{node}` both fold to `{ident}`")]
    TokenCollision {
        node: String,
        first: String,
        second: String,
        ident: String,
    },

    #[error("option spellings `{first}` and `{second}` on `{node}` both fold to `{ident}`")]
    OptionCollision {
        node: String,
        first: String,
        second: String,
        ident: String,
    },
}

/// One option of a node.
#[derive(Debug, Clone)]
pub struct OptionInfo {
    pub flags: Vec<String>,
    pub kind: ArgKind,
    pub arity: Arity,
    pub candidates: Candidates,
    /// First line of the help text, unescaped.
    pub help: String,
    pub consumes_value: bool,
}

/// One positional slot of a node, in acquisition order.
#[derive(Debug, Clone)]
pub struct Slot {
    pub index: usize,
    pub name: String,
    pub arity: Arity,
    pub candidates: Candidates,
    pub help: String,
    /// Occupies the slot but offers nothing.
    pub hidden: bool,
    /// The slot that selects a subcommand; its candidates are the
    /// visible child tokens.
    pub dispatch: bool,
}

/// A child command; aliases share the referenced node.
#[derive(Debug, Clone)]
pub struct ChildRef {
    pub name: String,
    pub aliases: Vec<String>,
    pub help: String,
    pub hidden: bool,
    /// Index into [`Walk::nodes`].
    pub node: usize,
}

/// Everything a backend needs to render one command node.
#[derive(Debug, Clone, Default)]
pub struct Node {
    /// Command tokens from the program name down to this node.
    pub path: Vec<String>,
    pub ident: String,
    pub help: String,
    pub children: Vec<ChildRef>,
    /// Tokens offered as subcommand candidates: visible children and
    /// their aliases, declaration order.
    pub child_tokens: Vec<String>,
    /// Tokens the runtime descends on. Includes hidden children, which
    /// are traversable but never offered.
    pub recognized_tokens: Vec<String>,
    pub options: Vec<OptionInfo>,
    pub slots: Vec<Slot>,
}

impl Node {
    /// Positional slots excluding the dispatch slot.
    pub fn own_slots(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter().filter(|s| !s.dispatch)
    }

    /// Whether any non-dispatch slot never saturates.
    pub fn has_unbounded_slot(&self) -> bool {
        self.own_slots().any(|s| s.arity.is_unbounded())
    }
}

/// Flattened preorder walk of a definition tree. `nodes[0]` is the root.
#[derive(Debug, Clone)]
pub struct Walk {
    pub prog: String,
    pub root_prefix: String,
    pub nodes: Vec<Node>,
}

impl Walk {
    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }
}

/// Flatten `spec`, assigning collision-checked identifiers under
/// `root_prefix` (default `_tabgen_<prog>`).
pub fn walk(
    spec: &CommandSpec,
    prog: Option<&str>,
    root_prefix: Option<&str>,
) -> Result<Walk, WalkError> {
    let prog = prog.unwrap_or(&spec.name).to_string();
    let root_prefix = root_prefix
        .map(str::to_string)
        .unwrap_or_else(|| ident::root_prefix(&prog));

    let mut nodes = Vec::new();
    let mut seen = BTreeMap::new();
    recurse(spec, vec![prog.clone()], &root_prefix, &mut nodes, &mut seen)?;

    Ok(Walk {
        prog,
        root_prefix,
        nodes,
    })
}

fn recurse(
    spec: &CommandSpec,
    path: Vec<String>,
    root_prefix: &str,
    nodes: &mut Vec<Node>,
    seen: &mut BTreeMap<String, String>,
) -> Result<usize, WalkError> {
    let node_ident = ident::shell_ident(root_prefix, &path[1..]);
    let display_path = path.join(" ");
    if let Some(first) = seen.insert(node_ident.clone(), display_path.clone()) {
        return Err(WalkError::IdentCollision {
            first,
            second: display_path,
            ident: node_ident,
        });
    }
    debug!(node = %display_path, ident = %node_ident, "walking");

    let index = nodes.len();
    nodes.push(Node::default());

    let mut options = Vec::new();
    let mut option_idents: BTreeMap<String, String> = BTreeMap::new();
    for opt in &spec.options {
        if opt.hidden {
            debug!(node = %display_path, flags = ?opt.flags, "skipping hidden option");
            continue;
        }
        for flag in &opt.flags {
            let folded = ident::fold(flag);
            if let Some(first) = option_idents.insert(folded.clone(), flag.clone()) {
                if first != *flag {
                    return Err(WalkError::OptionCollision {
                        node: display_path,
                        first,
                        second: flag.clone(),
                        ident: folded,
                    });
                }
            }
        }
        options.push(OptionInfo {
            flags: opt.flags.clone(),
            kind: opt.kind,
            arity: opt.arity,
            candidates: opt.candidates.clone(),
            help: first_line(opt.help.as_deref()),
            consumes_value: opt.consumes_value(),
        });
    }

    let mut slots = Vec::new();
    for pos in &spec.positionals {
        slots.push(Slot {
            index: slots.len(),
            name: pos.name.clone(),
            arity: pos.arity,
            candidates: if pos.hidden {
                Candidates::None
            } else {
                pos.candidates.clone()
            },
            help: first_line(pos.help.as_deref()),
            hidden: pos.hidden,
            dispatch: false,
        });
    }

    let mut children = Vec::new();
    let mut child_tokens = Vec::new();
    let mut recognized_tokens = Vec::new();
    let mut token_idents: BTreeMap<String, String> = BTreeMap::new();
    for child in &spec.commands {
        for token in std::iter::once(&child.name).chain(&child.aliases) {
            let folded = ident::fold(token);
            if let Some(first) = token_idents.insert(folded.clone(), token.clone()) {
                return Err(WalkError::TokenCollision {
                    node: display_path.clone(),
                    first,
                    second: token.clone(),
                    ident: folded,
                });
            }
            recognized_tokens.push(token.clone());
            if !child.hidden {
                child_tokens.push(token.clone());
            }
        }

        let mut child_path = path.clone();
        child_path.push(child.name.clone());
        let child_index = recurse(child, child_path, root_prefix, nodes, seen)?;
        children.push(ChildRef {
            name: child.name.clone(),
            aliases: child.aliases.clone(),
            help: first_line(child.help.as_deref()),
            hidden: child.hidden,
            node: child_index,
        });
    }

    if !children.is_empty() {
        slots.push(Slot {
            index: slots.len(),
            name: "command".into(),
            arity: Arity::One,
            candidates: Candidates::Choices(child_tokens.clone()),
            help: String::new(),
            hidden: false,
            dispatch: true,
        });
    }

    nodes[index] = Node {
        path,
        ident: node_ident,
        help: first_line(spec.help.as_deref()),
        children,
        child_tokens,
        recognized_tokens,
        options,
        slots,
    };

    Ok(index)
}

fn first_line(help: Option<&str>) -> String {
    help.and_then(|h| h.lines().next())
        .map(|l| l.trim().to_string())
        .unwrap_or_default()
}
