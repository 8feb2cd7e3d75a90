//! Session and system builtins: ps, top, df, whoami, date, clear, history, help, exit

use super::{HandlerEnv, HandlerResult};
use crate::error::CommandError;
use chrono::Local;

/// Output of `exit`; the front end terminates the session when it sees it
pub const EXIT_SENTINEL: &str = "exit";

/// ANSI: clear screen, cursor home
pub const CLEAR_SEQUENCE: &str = "\x1b[2J\x1b[H";

pub fn ps(_args: &[String], env: &mut HandlerEnv<'_>) -> HandlerResult {
    Ok(env.stats.processes())
}

pub fn top(_args: &[String], env: &mut HandlerEnv<'_>) -> HandlerResult {
    Ok(env.stats.system_info())
}

pub fn df(_args: &[String], env: &mut HandlerEnv<'_>) -> HandlerResult {
    Ok(env.stats.disk_usage())
}

pub fn whoami(_args: &[String], env: &mut HandlerEnv<'_>) -> HandlerResult {
    let user = env
        .ctx
        .env_var("USER")
        .or_else(|| env.ctx.env_var("USERNAME"))
        .unwrap_or("unknown");
    Ok(user.to_string())
}

pub fn date(_args: &[String], _env: &mut HandlerEnv<'_>) -> HandlerResult {
    Ok(Local::now().format("%a %b %d %H:%M:%S %Z %Y").to_string())
}

pub fn clear(_args: &[String], _env: &mut HandlerEnv<'_>) -> HandlerResult {
    Ok(CLEAR_SEQUENCE.to_string())
}

pub fn history(_args: &[String], env: &mut HandlerEnv<'_>) -> HandlerResult {
    let lines: Vec<String> = env
        .ctx
        .history()
        .iter()
        .enumerate()
        .map(|(i, line)| format!("{:4}  {}", i + 1, line))
        .collect();
    Ok(lines.join("\n"))
}

pub fn help(args: &[String], env: &mut HandlerEnv<'_>) -> HandlerResult {
    if let Some(name) = args.first() {
        let builtin = env
            .registry
            .lookup(name)
            .ok_or_else(|| CommandError::usage("help", format!("no help for '{}'", name)))?;
        return Ok(format!("{}\n  {}", builtin.usage(), builtin.description()));
    }

    Ok(format!(
        "Available commands:\n  {}",
        env.registry.names().join("  ")
    ))
}

pub fn exit(_args: &[String], _env: &mut HandlerEnv<'_>) -> HandlerResult {
    Ok(EXIT_SENTINEL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ExecutionContext;
    use crate::registry::CommandRegistry;
    use crate::system_stats::FixedStats;
    use std::collections::HashMap;

    fn with_env<T>(ctx: &mut ExecutionContext, f: impl FnOnce(&mut HandlerEnv<'_>) -> T) -> T {
        let stats = FixedStats {
            processes: "PID NAME".to_string(),
            system_info: "System Information:".to_string(),
            disk_usage: "Filesystem Size".to_string(),
        };
        let registry = CommandRegistry::new();
        let mut env = HandlerEnv {
            ctx,
            stats: &stats,
            registry: &registry,
        };
        f(&mut env)
    }

    fn context() -> ExecutionContext {
        let dir = std::env::temp_dir();
        ExecutionContext::new(Some(dir.clone()), Some(dir))
    }

    #[test]
    fn test_stats_passthrough() {
        let mut ctx = context();
        with_env(&mut ctx, |env| {
            assert_eq!(ps(&[], env).unwrap(), "PID NAME");
            assert_eq!(top(&[], env).unwrap(), "System Information:");
            assert_eq!(df(&[], env).unwrap(), "Filesystem Size");
        });
    }

    #[test]
    fn test_whoami_reads_snapshot() {
        let mut env_vars = HashMap::new();
        env_vars.insert("USER".to_string(), "ada".to_string());
        let mut ctx = context().with_environment(env_vars);
        with_env(&mut ctx, |env| assert_eq!(whoami(&[], env).unwrap(), "ada"));

        let mut ctx = context().with_environment(HashMap::new());
        with_env(&mut ctx, |env| assert_eq!(whoami(&[], env).unwrap(), "unknown"));
    }

    #[test]
    fn test_history_numbering() {
        let mut ctx = context();
        ctx.record("ls");
        ctx.record("pwd");
        with_env(&mut ctx, |env| {
            assert_eq!(history(&[], env).unwrap(), "   1  ls\n   2  pwd");
        });
    }

    #[test]
    fn test_help_lists_and_describes() {
        let mut ctx = context();
        with_env(&mut ctx, |env| {
            let out = help(&[], env).unwrap();
            assert!(out.starts_with("Available commands:"));
            assert!(out.contains("grep"));

            let out = help(&["rm".to_string()], env).unwrap();
            assert!(out.starts_with("rm [-r|-rf] [-f] <path>..."));

            assert!(help(&["nope".to_string()], env).is_err());
        });
    }

    #[test]
    fn test_exit_and_clear() {
        let mut ctx = context();
        with_env(&mut ctx, |env| {
            assert_eq!(exit(&[], env).unwrap(), "exit");
            assert_eq!(clear(&[], env).unwrap(), CLEAR_SEQUENCE);
        });
    }
}
