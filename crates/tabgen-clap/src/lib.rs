//! tabgen-clap — snapshot a live `clap::Command` into a tabgen
//! definition
//!
//! The adapter only reads clap's public introspection surface
//! (subcommands, aliases, argument actions, value ranges, possible
//! values, value hints), so any derive- or builder-built CLI can feed
//! the generator. Custom per-shell completion expressions have no home
//! in clap's model; attach them by argument id through [`Hooks`].
//!
//! Pass a *built* command (`cmd.build()`), otherwise clap's implicit
//! help and version arguments are missing from the snapshot.

use std::collections::BTreeMap;

use clap::{Arg, ArgAction, Command, ValueHint};
use tabgen_core::spec::{ArgKind, Arity, Candidates, CommandSpec, Opt, Positional};

/// Per-shell custom completion expressions, keyed by argument id.
#[derive(Debug, Clone, Default)]
pub struct Hooks {
    by_arg: BTreeMap<String, BTreeMap<String, String>>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `expr` as the `shell` completion for the argument with
    /// `id` (its clap id, anywhere in the tree).
    pub fn with(
        mut self,
        id: impl Into<String>,
        shell: impl Into<String>,
        expr: impl Into<String>,
    ) -> Self {
        self.by_arg
            .entry(id.into())
            .or_default()
            .insert(shell.into(), expr.into());
        self
    }

    fn get(&self, id: &str) -> Option<&BTreeMap<String, String>> {
        self.by_arg.get(id)
    }
}

/// Snapshot `cmd` into a definition tree.
pub fn from_command(cmd: &Command) -> CommandSpec {
    from_command_with(cmd, &Hooks::default())
}

/// Snapshot `cmd`, attaching the given custom completion hooks.
pub fn from_command_with(cmd: &Command, hooks: &Hooks) -> CommandSpec {
    let mut spec = CommandSpec::new(cmd.get_name());
    spec.aliases = cmd.get_visible_aliases().map(str::to_string).collect();
    spec.help = cmd.get_about().map(|about| about.to_string());
    spec.hidden = cmd.is_hide_set();

    for arg in cmd.get_arguments() {
        if arg.is_positional() {
            spec.positionals.push(Positional {
                name: arg.get_id().to_string(),
                arity: arity(arg),
                candidates: candidates(arg, hooks),
                help: help(arg),
                hidden: arg.is_hide_set(),
            });
        } else {
            spec.options.push(Opt {
                flags: flags(arg),
                kind: kind(arg),
                arity: arity(arg),
                candidates: candidates(arg, hooks),
                help: help(arg),
                hidden: arg.is_hide_set(),
            });
        }
    }

    for sub in cmd.get_subcommands() {
        spec.commands.push(from_command_with(sub, hooks));
    }

    spec
}

fn flags(arg: &Arg) -> Vec<String> {
    let mut flags = Vec::new();
    if let Some(shorts) = arg.get_short_and_visible_aliases() {
        flags.extend(shorts.into_iter().map(|c| format!("-{c}")));
    }
    if let Some(longs) = arg.get_long_and_visible_aliases() {
        flags.extend(longs.into_iter().map(|l| format!("--{l}")));
    }
    flags
}

fn kind(arg: &Arg) -> ArgKind {
    match arg.get_action() {
        ArgAction::Help | ArgAction::HelpShort | ArgAction::HelpLong | ArgAction::Version => {
            ArgKind::Terminal
        }
        ArgAction::Count | ArgAction::Append => ArgKind::Multi,
        ArgAction::SetTrue | ArgAction::SetFalse => ArgKind::Flag,
        ArgAction::Set => ArgKind::Value,
        _ => {
            if takes_values(arg) {
                ArgKind::Value
            } else {
                ArgKind::Flag
            }
        }
    }
}

fn arity(arg: &Arg) -> Arity {
    if arg.is_trailing_var_arg_set() || arg.is_last_set() {
        return Arity::Remainder;
    }
    let Some(range) = arg.get_num_args() else {
        return Arity::One;
    };
    let min = range.min_values();
    let max = range.max_values();
    if max == usize::MAX {
        if min == 0 { Arity::ZeroOrMore } else { Arity::OneOrMore }
    } else if min == 0 && max == 1 {
        Arity::Optional
    } else {
        Arity::One
    }
}

fn takes_values(arg: &Arg) -> bool {
    arg.get_num_args().map(|r| r.max_values() > 0).unwrap_or(false)
}

fn candidates(arg: &Arg, hooks: &Hooks) -> Candidates {
    if let Some(map) = hooks.get(arg.get_id().as_str()) {
        return Candidates::Custom(map.clone());
    }

    let choices: Vec<String> = arg
        .get_possible_values()
        .iter()
        .filter(|pv| !pv.is_hide_set())
        .map(|pv| pv.get_name().to_string())
        .collect();
    if !choices.is_empty() {
        return Candidates::Choices(choices);
    }

    match arg.get_value_hint() {
        ValueHint::AnyPath | ValueHint::FilePath | ValueHint::ExecutablePath => Candidates::File,
        ValueHint::DirPath => Candidates::Dir,
        _ => Candidates::None,
    }
}

fn help(arg: &Arg) -> Option<String> {
    arg.get_help().map(|h| h.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{Arg, ArgAction, Command, ValueHint};

    fn demo() -> Command {
        let mut cmd = Command::new("demo")
            .about("Demo tool")
            .arg(
                Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .action(ArgAction::Count)
                    .help("increase verbosity"),
            )
            .arg(
                Arg::new("shell")
                    .long("shell")
                    .value_parser(["bash", "zsh", "tcsh"]),
            )
            .arg(
                Arg::new("outdir")
                    .short('o')
                    .long("outdir")
                    .value_hint(ValueHint::DirPath),
            )
            .subcommand(
                Command::new("send")
                    .about("Send things")
                    .visible_alias("post")
                    .arg(Arg::new("target")),
            )
            .subcommand(Command::new("debug").hide(true));
        cmd.build();
        cmd
    }

    #[test]
    fn test_snapshot_shape() {
        let spec = from_command(&demo());
        assert_eq!(spec.name, "demo");
        assert_eq!(spec.help.as_deref(), Some("Demo tool"));
        assert_eq!(spec.commands.len(), 3, "send, debug and the help subcommand");
        assert_eq!(spec.commands[0].name, "send");
        assert_eq!(spec.commands[0].aliases, vec!["post"]);
        assert!(spec.commands[1].hidden);
    }

    #[test]
    fn test_implicit_help_is_terminal() {
        let spec = from_command(&demo());
        let help = spec
            .options
            .iter()
            .find(|o| o.flags.contains(&"--help".to_string()))
            .expect("built command carries --help");
        assert_eq!(help.kind, ArgKind::Terminal);
        assert!(help.flags.contains(&"-h".to_string()));
    }

    #[test]
    fn test_count_action_is_multi_counting_flag() {
        let spec = from_command(&demo());
        let verbose = spec
            .options
            .iter()
            .find(|o| o.flags.contains(&"--verbose".to_string()))
            .unwrap();
        assert_eq!(verbose.kind, ArgKind::Multi);
        assert!(!verbose.consumes_value());
    }

    #[test]
    fn test_possible_values_become_choices() {
        let spec = from_command(&demo());
        let shell = spec
            .options
            .iter()
            .find(|o| o.flags.contains(&"--shell".to_string()))
            .unwrap();
        assert_eq!(
            shell.candidates,
            Candidates::Choices(vec!["bash".into(), "zsh".into(), "tcsh".into()])
        );
        assert_eq!(shell.kind, ArgKind::Value);
    }

    #[test]
    fn test_dir_hint() {
        let spec = from_command(&demo());
        let outdir = spec
            .options
            .iter()
            .find(|o| o.flags.contains(&"--outdir".to_string()))
            .unwrap();
        assert_eq!(outdir.candidates, Candidates::Dir);
    }

    #[test]
    fn test_positional_snapshot() {
        let spec = from_command(&demo());
        let send = &spec.commands[0];
        assert_eq!(send.positionals.len(), 1);
        assert_eq!(send.positionals[0].name, "target");
        assert_eq!(send.positionals[0].arity, Arity::One);
    }

    #[test]
    fn test_hooks_attach_by_id() {
        let hooks = Hooks::new()
            .with("target", "bash", "_pick_target")
            .with("target", "zsh", "_targets");
        let spec = from_command_with(&demo(), &hooks);
        let target = &spec.commands[0].positionals[0];
        assert_eq!(target.candidates.custom_for("bash"), Some("_pick_target"));
        assert_eq!(target.candidates.custom_for("zsh"), Some("_targets"));
        assert_eq!(target.candidates.custom_for("tcsh"), None);
    }

    #[test]
    fn test_generates_through_core() {
        let spec = from_command(&demo());
        let script =
            tabgen_core::generate(&spec, "bash", &tabgen_core::GenOptions::default()).unwrap();
        assert!(script.contains("complete -o filenames -F _tabgen_demo demo"));
        assert!(script.contains("_tabgen_demo_send_target="));
    }
}
