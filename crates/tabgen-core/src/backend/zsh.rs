//! zsh backend
//!
//! Emits, per command node, an `_arguments` specification array (option
//! specs with brace alternation for multiple spellings, `(- :)` for
//! terminal options, `*` for repeatable ones, escaped descriptions and
//! value actions), a `_describe` function for child commands, and a
//! dispatch function that shifts the word list into the chosen child's
//! context. Registration is conditional on how the script was loaded:
//! sourced scripts call `compdef`, autoloaded ones run the entry point
//! directly.

use std::iter::once;

use crate::assemble::{ZSH_TEMPLATE, assemble, preamble_block};
use crate::escape::{sh_single_quote, zsh_escape};
use crate::ident::fold;
use crate::spec::{ArgKind, Arity, Candidates};
use crate::walk::{Node, OptionInfo, Slot, Walk};

use super::{GenError, GenOptions};

pub fn render(walk: &Walk, opts: &GenOptions) -> Result<String, GenError> {
    let mut fragments = Vec::new();
    emit_node(walk, 0, &mut fragments);

    let script = assemble(
        "zsh",
        ZSH_TEMPLATE,
        minijinja::context! {
            prog => &walk.prog,
            root => &walk.root_prefix,
            fragments => fragments.join("\n\n"),
            preamble => preamble_block(opts.preamble.as_deref()),
        },
    )?;
    Ok(script)
}

fn emit_node(walk: &Walk, index: usize, fragments: &mut Vec<String>) {
    let node = &walk.nodes[index];
    // `*:::` dispatch cannot coexist with an unbounded positional of the
    // node itself; the children become unreachable for completion then
    let dispatch = !node.children.is_empty() && !node.has_unbounded_slot();

    if dispatch {
        fragments.push(commands_fn(node));
    }
    fragments.push(options_array(node, dispatch));
    fragments.push(node_fn(walk, node, dispatch));

    if dispatch {
        for child in &node.children {
            emit_node(walk, child.node, fragments);
        }
    }
}

fn commands_fn(node: &Node) -> String {
    let mut entries = Vec::new();
    for child in node.children.iter().filter(|c| !c.hidden) {
        for token in once(&child.name).chain(&child.aliases) {
            entries.push(format!(
                "    \"{}:{}\"",
                zsh_escape(token).replace(':', "\\:"),
                zsh_escape(&child.help)
            ));
        }
    }

    let label = sh_single_quote(&format!("{} commands", node.path.join(" ")));
    format!(
        "{ident}_commands() {{\n  local _commands=(\n{entries}\n  )\n\n  _describe {label} _commands\n}}",
        ident = node.ident,
        entries = entries.join("\n"),
    )
}

fn options_array(node: &Node, dispatch: bool) -> String {
    let mut specs = Vec::new();
    for opt in &node.options {
        specs.push(option_spec(opt));
    }
    for slot in node.own_slots() {
        specs.push(slot_spec(slot));
    }
    if dispatch {
        specs.push(format!("\": :{}_commands\"", node.ident));
        specs.push(format!("\"*::: :->{}\"", state_tag(node)));
    }

    if specs.is_empty() {
        format!("{}_options=()", node.ident)
    } else {
        let body = specs
            .iter()
            .map(|s| format!("  {s}"))
            .collect::<Vec<_>>()
            .join("\n");
        format!("{}_options=(\n{}\n)", node.ident, body)
    }
}

fn option_spec(opt: &OptionInfo) -> String {
    let prefix = match opt.kind {
        ArgKind::Terminal => "(- :)",
        ArgKind::Multi => "*",
        ArgKind::Flag | ArgKind::Value => "",
    };
    let help = if opt.help.is_empty() {
        String::new()
    } else {
        format!("[{}]", zsh_escape(&opt.help))
    };
    let value = if opt.consumes_value {
        format!(":{}:{}", value_name(opt), zsh_action(&opt.candidates))
    } else {
        String::new()
    };

    if opt.flags.len() > 1 {
        let mut spec = String::new();
        if !prefix.is_empty() {
            spec.push_str(&format!("\"{prefix}\""));
        }
        spec.push_str(&format!("{{{}}}", opt.flags.join(",")));
        let rest = format!("{help}{value}");
        if !rest.is_empty() {
            spec.push_str(&format!("\"{rest}\""));
        }
        spec
    } else {
        format!("\"{}{}{}{}\"", prefix, opt.flags[0], help, value)
    }
}

fn slot_spec(slot: &Slot) -> String {
    if slot.hidden {
        // consumes its position, offers nothing
        return "\": :\"".into();
    }
    let lead = match slot.arity {
        Arity::One => ":",
        Arity::Optional => "::",
        Arity::ZeroOrMore | Arity::OneOrMore | Arity::Remainder => "*:",
    };
    let message = if slot.help.is_empty() {
        zsh_escape(&slot.name)
    } else {
        zsh_escape(&slot.help)
    };
    format!("\"{lead}{message}:{}\"", zsh_action(&slot.candidates))
}

fn zsh_action(candidates: &Candidates) -> String {
    match candidates {
        Candidates::None => String::new(),
        Candidates::Choices(choices) => {
            let words: Vec<String> = choices.iter().map(|c| zsh_escape(c)).collect();
            format!("({})", words.join(" "))
        }
        Candidates::File => "_files".into(),
        Candidates::Dir => "_files -/".into(),
        Candidates::Custom(_) => candidates.custom_for("zsh").unwrap_or_default().to_string(),
    }
}

fn node_fn(walk: &Walk, node: &Node, dispatch: bool) -> String {
    if !dispatch {
        return format!(
            "{ident}() {{\n  _arguments -s ${ident}_options\n}}",
            ident = node.ident
        );
    }

    // $line index of the dispatch slot: after the node's own positionals
    let command_index = node.own_slots().count() + 1;
    let mut arms = Vec::new();
    for child in &node.children {
        let pattern = once(&child.name)
            .chain(&child.aliases)
            .map(|t| case_token(t))
            .collect::<Vec<_>>()
            .join("|");
        arms.push(format!(
            "        {pattern}) {} ;;",
            walk.nodes[child.node].ident
        ));
    }

    format!(
        "{ident}() {{\n  local context state line curcontext=\"$curcontext\"\n\n  _arguments -C -s ${ident}_options\n\n  case $state in\n    {tag})\n      words=($line[{idx}] \"${{words[@]}}\")\n      (( CURRENT += 1 ))\n      curcontext=\"${{curcontext%:*:*}}:{ident}-$line[{idx}]:\"\n      case $line[{idx}] in\n{arms}\n      esac\n      ;;\n  esac\n}}",
        ident = node.ident,
        tag = state_tag(node),
        idx = command_index,
        arms = arms.join("\n"),
    )
}

fn state_tag(node: &Node) -> String {
    fold(node.path.last().map(String::as_str).unwrap_or("args"))
}

fn case_token(token: &str) -> String {
    let safe = token
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '+'));
    if safe {
        token.to_string()
    } else {
        sh_single_quote(token)
    }
}

fn value_name(opt: &OptionInfo) -> String {
    opt.flags
        .iter()
        .max_by_key(|f| f.len())
        .map(|f| f.trim_start_matches('-').to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{CommandSpec, Opt, Positional};
    use crate::walk;

    fn render_spec(spec: &CommandSpec) -> String {
        let walk = walk::walk(spec, None, None).unwrap();
        render(&walk, &GenOptions::default()).unwrap()
    }

    fn greeter() -> CommandSpec {
        CommandSpec {
            help: Some("Greet people".into()),
            options: vec![Opt {
                flags: vec!["-h".into(), "--help".into()],
                kind: ArgKind::Terminal,
                arity: Arity::One,
                candidates: Candidates::None,
                help: Some("show this help message and exit".into()),
                hidden: false,
            }],
            commands: vec![CommandSpec {
                aliases: vec!["xsend".into(), "ysend".into()],
                help: Some("Send a greeting".into()),
                positionals: vec![Positional {
                    name: "recipient".into(),
                    arity: Arity::One,
                    candidates: Candidates::Custom(
                        [
                            ("bash".to_string(), "_pick_recipient".to_string()),
                            ("zsh".to_string(), "_recipients".to_string()),
                        ]
                        .into(),
                    ),
                    help: None,
                    hidden: false,
                }],
                ..CommandSpec::new("send")
            }],
            ..CommandSpec::new("greeter")
        }
    }

    #[test]
    fn test_header_and_footer() {
        let script = render_spec(&greeter());
        assert!(script.starts_with("#compdef greeter\n"));
        assert!(script.contains("compdef _tabgen_greeter -N greeter"));
        assert!(script.contains("_tabgen_greeter \"$@\""));
    }

    #[test]
    fn test_terminal_option_spec() {
        let script = render_spec(&greeter());
        assert!(script.contains("\"(- :)\"{-h,--help}\"[show this help message and exit]\""));
    }

    #[test]
    fn test_describe_lists_aliases_once_each() {
        let script = render_spec(&greeter());
        assert!(script.contains("\"send:Send a greeting\""));
        assert!(script.contains("\"xsend:Send a greeting\""));
        assert!(script.contains("\"ysend:Send a greeting\""));
        // one options array for the child, not one per alias
        assert_eq!(script.matches("_tabgen_greeter_send_options=(").count(), 1);
        assert!(!script.contains("_tabgen_greeter_xsend_options"));
    }

    #[test]
    fn test_alias_case_arm_routes_to_shared_function() {
        let script = render_spec(&greeter());
        assert!(script.contains("send|xsend|ysend) _tabgen_greeter_send ;;"));
    }

    #[test]
    fn test_custom_zsh_action() {
        let script = render_spec(&greeter());
        assert!(script.contains("\":recipient:_recipients\""));
    }

    #[test]
    fn test_custom_without_zsh_entry_degrades() {
        let spec = CommandSpec {
            positionals: vec![Positional {
                name: "thing".into(),
                arity: Arity::One,
                candidates: Candidates::Custom([("bash".to_string(), "_fn".to_string())].into()),
                help: None,
                hidden: false,
            }],
            ..CommandSpec::new("tool")
        };
        let script = render_spec(&spec);
        assert!(script.contains("\":thing:\""));
    }

    #[test]
    fn test_choices_and_paths() {
        let spec = CommandSpec {
            options: vec![
                Opt {
                    flags: vec!["--shell".into()],
                    kind: ArgKind::Value,
                    arity: Arity::One,
                    candidates: Candidates::Choices(vec!["bash".into(), "zsh".into()]),
                    help: Some("target shell".into()),
                    hidden: false,
                },
                Opt {
                    flags: vec!["-o".into(), "--output".into()],
                    kind: ArgKind::Value,
                    arity: Arity::One,
                    candidates: Candidates::Dir,
                    help: None,
                    hidden: false,
                },
            ],
            ..CommandSpec::new("tool")
        };
        let script = render_spec(&spec);
        assert!(script.contains("\"--shell[target shell]:shell:(bash zsh)\""));
        assert!(script.contains("{-o,--output}\":output:_files -/\""));
    }

    #[test]
    fn test_multi_option_marker() {
        let spec = CommandSpec {
            options: vec![Opt {
                flags: vec!["-v".into(), "--verbose".into()],
                kind: ArgKind::Multi,
                arity: Arity::One,
                candidates: Candidates::None,
                help: Some("increase verbosity".into()),
                hidden: false,
            }],
            ..CommandSpec::new("tool")
        };
        let script = render_spec(&spec);
        assert!(script.contains("\"*\"{-v,--verbose}\"[increase verbosity]\""));
    }

    #[test]
    fn test_hidden_positional_consumes_silently() {
        let spec = CommandSpec {
            positionals: vec![
                Positional {
                    name: "secret".into(),
                    arity: Arity::One,
                    candidates: Candidates::Choices(vec!["x".into()]),
                    help: None,
                    hidden: true,
                },
                Positional {
                    name: "visible".into(),
                    arity: Arity::One,
                    candidates: Candidates::Choices(vec!["one".into()]),
                    help: None,
                    hidden: false,
                },
            ],
            ..CommandSpec::new("tool")
        };
        let script = render_spec(&spec);
        let array_start = script.find("_tabgen_tool_options=(").unwrap();
        let array = &script[array_start..];
        let hidden_at = array.find("\": :\"").unwrap();
        let visible_at = array.find("\":visible:(one)\"").unwrap();
        assert!(hidden_at < visible_at, "hidden slot keeps its position");
        assert!(!script.contains("(x)"));
    }

    #[test]
    fn test_unbounded_slot_disables_dispatch() {
        let spec = CommandSpec {
            positionals: vec![Positional {
                name: "files".into(),
                arity: Arity::ZeroOrMore,
                candidates: Candidates::File,
                help: None,
                hidden: false,
            }],
            commands: vec![CommandSpec::new("sub")],
            ..CommandSpec::new("tool")
        };
        let script = render_spec(&spec);
        assert!(script.contains("\"*:files:_files\""));
        assert!(!script.contains("_tabgen_tool_commands"));
        assert!(!script.contains("->tool"));
    }

    #[test]
    fn test_help_escaping() {
        let spec = CommandSpec {
            options: vec![Opt {
                flags: vec!["--fmt".into()],
                kind: ArgKind::Value,
                arity: Arity::One,
                candidates: Candidates::None,
                help: Some("format [default: json] `raw`".into()),
                hidden: false,
            }],
            ..CommandSpec::new("tool")
        };
        let script = render_spec(&spec);
        assert!(script.contains(r"[format \[default\: json\] \`raw\`]"));
    }

    #[test]
    fn test_idempotent() {
        assert_eq!(render_spec(&greeter()), render_spec(&greeter()));
    }
}
