//! Builtin command handlers
//!
//! Every handler takes the argument words (command name already stripped)
//! and a `HandlerEnv`, and returns the text to print or a `CommandError`.

pub mod fs_commands;
pub mod system_commands;

use crate::context::ExecutionContext;
use crate::error::CommandError;
use crate::registry::{Builtin, CommandRegistry};
use crate::system_stats::SystemStats;

pub type HandlerResult = Result<String, CommandError>;

/// What a handler may touch while running
pub struct HandlerEnv<'a> {
    pub ctx: &'a mut ExecutionContext,
    pub stats: &'a dyn SystemStats,
    pub registry: &'a CommandRegistry,
}

/// Run a builtin against the environment
pub fn run(builtin: Builtin, args: &[String], env: &mut HandlerEnv<'_>) -> HandlerResult {
    match builtin {
        Builtin::Ls => fs_commands::ls(args, env),
        Builtin::Cd => fs_commands::cd(args, env),
        Builtin::Pwd => fs_commands::pwd(args, env),
        Builtin::Mkdir => fs_commands::mkdir(args, env),
        Builtin::Rmdir => fs_commands::rmdir(args, env),
        Builtin::Rm => fs_commands::rm(args, env),
        Builtin::Cp => fs_commands::cp(args, env),
        Builtin::Mv => fs_commands::mv(args, env),
        Builtin::Cat => fs_commands::cat(args, env),
        Builtin::Echo => fs_commands::echo(args, env),
        Builtin::Touch => fs_commands::touch(args, env),
        Builtin::Find => fs_commands::find(args, env),
        Builtin::Grep => fs_commands::grep(args, env),
        Builtin::Ps => system_commands::ps(args, env),
        Builtin::Top => system_commands::top(args, env),
        Builtin::Df => system_commands::df(args, env),
        Builtin::Whoami => system_commands::whoami(args, env),
        Builtin::Date => system_commands::date(args, env),
        Builtin::Clear => system_commands::clear(args, env),
        Builtin::History => system_commands::history(args, env),
        Builtin::Help => system_commands::help(args, env),
        Builtin::Exit => system_commands::exit(args, env),
    }
}

/// Short flags and operands, e.g. `-la foo` -> ({'l','a'}, ["foo"])
pub(crate) struct ParsedArgs<'a> {
    pub flags: Vec<char>,
    pub operands: Vec<&'a str>,
}

impl ParsedArgs<'_> {
    pub fn has(&self, flag: char) -> bool {
        self.flags.contains(&flag)
    }
}

pub(crate) fn parse_args(args: &[String]) -> ParsedArgs<'_> {
    let mut flags = Vec::new();
    let mut operands = Vec::new();
    for arg in args {
        match arg.strip_prefix('-') {
            Some(rest) if !rest.is_empty() => flags.extend(rest.chars()),
            _ => operands.push(arg.as_str()),
        }
    }
    ParsedArgs { flags, operands }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_combined_flags() {
        let args = words(&["-la", "docs"]);
        let parsed = parse_args(&args);
        assert!(parsed.has('l'));
        assert!(parsed.has('a'));
        assert_eq!(parsed.operands, vec!["docs"]);
    }

    #[test]
    fn test_lone_dash_is_operand() {
        let args = words(&["-"]);
        let parsed = parse_args(&args);
        assert!(parsed.flags.is_empty());
        assert_eq!(parsed.operands, vec!["-"]);
    }
}
