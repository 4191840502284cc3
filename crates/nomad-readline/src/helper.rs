use std::borrow::Cow::{self, Borrowed, Owned};

use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use crate::command::{COMMANDS, CommandSpec};

/// rustyline helper for slash commands: completes names, hints the
/// arguments still missing, and marks unknown commands.
#[derive(Clone)]
pub struct CliHelper {
    commands: &'static [CommandSpec],
}

impl CliHelper {
    pub fn new() -> Self {
        Self { commands: COMMANDS }
    }

    /// Placeholders for the arguments not typed yet.
    fn remaining_args(spec: &CommandSpec, typed_args: &str) -> Option<String> {
        let typed = typed_args.split_whitespace().count();
        let ends_with_space = typed_args.is_empty() || typed_args.ends_with(' ');
        let remaining: Vec<&str> = spec
            .args
            .split_whitespace()
            .skip(if ends_with_space { typed } else { typed + 1 })
            .collect();
        if remaining.is_empty() {
            return None;
        }
        let lead = if ends_with_space { "" } else { " " };
        Some(format!("{lead}{}", remaining.join(" ")))
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if !line.starts_with('/') || line.contains(' ') {
            return Ok((0, vec![]));
        }

        let candidates = self
            .commands
            .iter()
            .filter(|spec| spec.name.starts_with(line))
            .map(|spec| Pair {
                display: format!("{:<9} {}", spec.name, spec.summary),
                replacement: if spec.args.is_empty() {
                    spec.name.to_string()
                } else {
                    format!("{} ", spec.name)
                },
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if !line.starts_with('/') {
            return Borrowed(line);
        }
        let (name, rest) = line.split_at(line.find(' ').unwrap_or(line.len()));
        let name = if CommandSpec::find(name).is_some() {
            name.bright_cyan()
        } else {
            name.red()
        };
        Owned(format!("{name}{rest}"))
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Owned(hint.bright_black().to_string())
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        if pos < line.len() || !line.starts_with('/') {
            return None;
        }

        match line.split_once(' ') {
            // Still typing the name: finish it and show its arguments
            None => {
                let spec = self
                    .commands
                    .iter()
                    .find(|spec| spec.name.starts_with(line))?;
                let rest = &spec.name[line.len()..];
                if spec.args.is_empty() {
                    (!rest.is_empty()).then(|| rest.to_string())
                } else {
                    Some(format!("{rest} {}", spec.args))
                }
            }
            Some((name, typed_args)) => {
                Self::remaining_args(CommandSpec::find(name)?, typed_args)
            }
        }
    }
}

impl Validator for CliHelper {}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> &'static CommandSpec {
        CommandSpec::find("/plan").unwrap()
    }

    #[test]
    fn test_hint_lists_missing_arguments() {
        let rename = CommandSpec::find("/rename").unwrap();
        assert_eq!(
            CliHelper::remaining_args(rename, "").as_deref(),
            Some("<n> <title>")
        );
        assert_eq!(
            CliHelper::remaining_args(rename, "2 ").as_deref(),
            Some("<title>")
        );
        assert_eq!(CliHelper::remaining_args(rename, "2 Bali"), None);
    }

    #[test]
    fn test_hint_while_typing_an_argument() {
        assert_eq!(
            CliHelper::remaining_args(plan(), "1").as_deref(),
            Some(" [days] [low|medium|high]")
        );
        assert_eq!(
            CliHelper::remaining_args(plan(), "1 10 ").as_deref(),
            Some("[low|medium|high]")
        );
    }

    #[test]
    fn test_usage_joins_name_and_arguments() {
        assert_eq!(CommandSpec::find("/favs").unwrap().usage(), "/favs");
        assert_eq!(
            CommandSpec::find("/login").unwrap().usage(),
            "/login <email> <password>"
        );
        assert!(CommandSpec::find("/nope").is_none());
    }
}
