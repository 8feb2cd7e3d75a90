//! Filesystem builtins: ls, cd, pwd, mkdir, rmdir, rm, cp, mv, cat, echo, touch, find, grep
//! All paths are resolved against the session's current directory, never the process cwd.

use super::{parse_args, HandlerEnv, HandlerResult};
use crate::context::ExecutionContext;
use crate::error::{CommandError, FsErrorKind};
use chrono::{DateTime, Local};
use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;
use walkdir::WalkDir;

pub fn ls(args: &[String], env: &mut HandlerEnv<'_>) -> HandlerResult {
    let parsed = parse_args(args);
    let show_hidden = parsed.has('a');
    let long_format = parsed.has('l');

    let shown = parsed.operands.first().copied().unwrap_or(".");
    let path = env.ctx.resolve(shown);

    let metadata = fs::metadata(&path)
        .map_err(|e| CommandError::io("ls", format!("cannot access '{}'", shown), &e))?;
    if !metadata.is_dir() {
        return Ok(file_name_of(&path));
    }

    let entries = fs::read_dir(&path)
        .map_err(|e| CommandError::io("ls", format!("cannot open directory '{}'", shown), &e))?;

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| show_hidden || !name.starts_with('.'))
        .collect();
    names.sort();

    if !long_format {
        return Ok(names.join("  "));
    }

    let mut lines = Vec::with_capacity(names.len());
    for name in &names {
        let item = path.join(name);
        // Dangling symlinks still get a row
        let meta = fs::metadata(&item)
            .or_else(|_| fs::symlink_metadata(&item))
            .map_err(|e| CommandError::io("ls", format!("cannot access '{}'", name), &e))?;
        lines.push(long_entry(name, &meta));
    }
    Ok(lines.join("\n"))
}

pub fn cd(args: &[String], env: &mut HandlerEnv<'_>) -> HandlerResult {
    let target = args.first().map(String::as_str).unwrap_or("~");
    env.ctx.change_directory(target)?;
    Ok(String::new())
}

pub fn pwd(_args: &[String], env: &mut HandlerEnv<'_>) -> HandlerResult {
    Ok(env.ctx.cwd_string())
}

pub fn mkdir(args: &[String], env: &mut HandlerEnv<'_>) -> HandlerResult {
    let parsed = parse_args(args);
    if parsed.operands.is_empty() {
        return Err(CommandError::usage("mkdir", "missing operand"));
    }
    let allow_existing = parsed.has('p');

    for dir in &parsed.operands {
        let path = env.ctx.resolve(dir);
        let subject = format!("cannot create directory '{}'", dir);

        if path.exists() {
            if allow_existing && path.is_dir() {
                continue;
            }
            return Err(CommandError::fs("mkdir", subject, FsErrorKind::AlreadyExists));
        }

        fs::create_dir_all(&path).map_err(|e| CommandError::io("mkdir", subject, &e))?;
    }
    Ok(String::new())
}

pub fn rmdir(args: &[String], env: &mut HandlerEnv<'_>) -> HandlerResult {
    if args.is_empty() {
        return Err(CommandError::usage("rmdir", "missing operand"));
    }

    for dir in args {
        let path = env.ctx.resolve(dir);
        guard_removal("rmdir", dir, &path, env.ctx)?;
        fs::remove_dir(&path)
            .map_err(|e| CommandError::io("rmdir", format!("failed to remove '{}'", dir), &e))?;
    }
    Ok(String::new())
}

pub fn rm(args: &[String], env: &mut HandlerEnv<'_>) -> HandlerResult {
    if args.is_empty() {
        return Err(CommandError::usage("rm", "missing operand"));
    }
    let parsed = parse_args(args);
    let recursive = parsed.has('r') || parsed.has('R');
    let force = parsed.has('f');

    for name in &parsed.operands {
        let path = env.ctx.resolve(name);
        let subject = format!("cannot remove '{}'", name);

        if path.parent().is_none() {
            return Err(CommandError::usage("rm", "refusing to remove '/'"));
        }
        guard_removal("rm", name, &path, env.ctx)?;

        let meta = match fs::symlink_metadata(&path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if force {
                    continue;
                }
                return Err(CommandError::fs("rm", subject, FsErrorKind::NotFound));
            }
            Err(e) => return Err(CommandError::io("rm", subject, &e)),
        };

        let result = if meta.is_dir() {
            if !recursive {
                return Err(CommandError::fs("rm", subject, FsErrorKind::IsADirectory));
            }
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        result.map_err(|e| CommandError::io("rm", subject, &e))?;
    }
    Ok(String::new())
}

pub fn cp(args: &[String], env: &mut HandlerEnv<'_>) -> HandlerResult {
    let parsed = parse_args(args);
    let (src_arg, dst_arg) = two_operands("cp", &parsed.operands)?;

    let source = env.ctx.resolve(src_arg);
    let mut dest = env.ctx.resolve(dst_arg);

    let meta = fs::metadata(&source)
        .map_err(|e| CommandError::io("cp", format!("cannot stat '{}'", src_arg), &e))?;

    if dest.is_dir() {
        if let Some(name) = source.file_name() {
            dest = dest.join(name);
        }
    }

    if is_same_file(&source, &dest) {
        return Err(CommandError::usage(
            "cp",
            format!("'{}' and '{}' are the same file", src_arg, dst_arg),
        ));
    }

    if meta.is_dir() {
        if dest.starts_with(&source) {
            return Err(CommandError::usage(
                "cp",
                format!("cannot copy a directory, '{}', into itself", src_arg),
            ));
        }
        if dest.exists() {
            return Err(CommandError::fs(
                "cp",
                format!("cannot create directory '{}'", dst_arg),
                FsErrorKind::AlreadyExists,
            ));
        }
        copy_tree(&source, &dest)
            .map_err(|e| CommandError::io("cp", format!("cannot copy '{}'", src_arg), &e))?;
    } else {
        fs::copy(&source, &dest)
            .map_err(|e| CommandError::io("cp", format!("cannot copy '{}'", src_arg), &e))?;
    }
    Ok(String::new())
}

pub fn mv(args: &[String], env: &mut HandlerEnv<'_>) -> HandlerResult {
    let parsed = parse_args(args);
    let (src_arg, dst_arg) = two_operands("mv", &parsed.operands)?;

    let source = env.ctx.resolve(src_arg);
    let mut dest = env.ctx.resolve(dst_arg);

    let meta = fs::symlink_metadata(&source)
        .map_err(|e| CommandError::io("mv", format!("cannot stat '{}'", src_arg), &e))?;

    if dest.is_dir() {
        if let Some(name) = source.file_name() {
            dest = dest.join(name);
        }
    }

    let subject = format!("cannot move '{}' to '{}'", src_arg, dst_arg);
    match fs::rename(&source, &dest) {
        Ok(()) => {}
        Err(e) if is_cross_device(&e) => {
            let moved = if meta.is_dir() {
                copy_tree(&source, &dest).and_then(|_| fs::remove_dir_all(&source))
            } else {
                fs::copy(&source, &dest).and_then(|_| fs::remove_file(&source))
            };
            moved.map_err(|e| CommandError::io("mv", subject, &e))?;
        }
        Err(e) => return Err(CommandError::io("mv", subject, &e)),
    }
    Ok(String::new())
}

pub fn cat(args: &[String], env: &mut HandlerEnv<'_>) -> HandlerResult {
    if args.is_empty() {
        return Err(CommandError::usage("cat", "missing file operand"));
    }

    let mut output = Vec::with_capacity(args.len());
    for name in args {
        let path = env.ctx.resolve(name);
        let content = fs::read_to_string(&path).map_err(|e| CommandError::io("cat", name.as_str(), &e))?;
        output.push(content);
    }
    Ok(output.join("\n"))
}

pub fn echo(args: &[String], _env: &mut HandlerEnv<'_>) -> HandlerResult {
    Ok(args.join(" "))
}

pub fn touch(args: &[String], env: &mut HandlerEnv<'_>) -> HandlerResult {
    if args.is_empty() {
        return Err(CommandError::usage("touch", "missing file operand"));
    }

    for name in args {
        let path = env.ctx.resolve(name);
        let subject = format!("cannot touch '{}'", name);

        let result = if path.exists() {
            fs::File::open(&path).and_then(|file| file.set_modified(SystemTime::now()))
        } else {
            fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map(|_| ())
        };
        result.map_err(|e| CommandError::io("touch", subject, &e))?;
    }
    Ok(String::new())
}

/// How `find` filters entry names
enum NameFilter {
    Any,
    Substring(String),
    Glob(glob::Pattern),
}

impl NameFilter {
    fn from_pattern(pattern: &str) -> Self {
        if pattern == "*" {
            NameFilter::Any
        } else {
            NameFilter::Substring(pattern.to_string())
        }
    }

    fn matches(&self, name: &str) -> bool {
        match self {
            NameFilter::Any => true,
            NameFilter::Substring(s) => name.contains(s.as_str()),
            NameFilter::Glob(p) => p.matches(name),
        }
    }
}

pub fn find(args: &[String], env: &mut HandlerEnv<'_>) -> HandlerResult {
    let mut positional: Vec<&str> = Vec::new();
    let mut glob_filter = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "-name" {
            let raw = iter
                .next()
                .ok_or_else(|| CommandError::usage("find", "missing argument to '-name'"))?;
            let pattern = glob::Pattern::new(raw)
                .map_err(|e| CommandError::usage("find", format!("invalid pattern '{}': {}", raw, e)))?;
            glob_filter = Some(NameFilter::Glob(pattern));
        } else {
            positional.push(arg.as_str());
        }
    }

    let (root_arg, filter) = match (positional.as_slice(), glob_filter) {
        ([], filter) => (".", filter.unwrap_or(NameFilter::Any)),
        ([only], Some(filter)) => (*only, filter),
        ([only], None) => {
            if env.ctx.resolve(only).exists() {
                (*only, NameFilter::Any)
            } else {
                (".", NameFilter::from_pattern(only))
            }
        }
        ([root, pattern, ..], filter) => (*root, filter.unwrap_or_else(|| NameFilter::from_pattern(pattern))),
    };

    let root = env.ctx.resolve(root_arg);
    if !root.exists() {
        return Err(CommandError::fs("find", format!("'{}'", root_arg), FsErrorKind::NotFound));
    }

    let results: Vec<String> = WalkDir::new(&root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| filter.matches(&entry.file_name().to_string_lossy()))
        .map(|entry| entry.path().display().to_string())
        .collect();

    Ok(results.join("\n"))
}

pub fn grep(args: &[String], env: &mut HandlerEnv<'_>) -> HandlerResult {
    let ignore_case = args.first().map(|a| a == "-i").unwrap_or(false);
    let rest = if ignore_case { &args[1..] } else { args };

    if rest.len() < 2 {
        return Err(CommandError::usage("grep", "missing pattern or file"));
    }
    let pattern = if ignore_case {
        rest[0].to_lowercase()
    } else {
        rest[0].clone()
    };

    let mut results = Vec::new();
    for name in &rest[1..] {
        let path = env.ctx.resolve(name);
        let content = fs::read_to_string(&path).map_err(|e| CommandError::io("grep", name.as_str(), &e))?;

        for (idx, line) in content.lines().enumerate() {
            let hit = if ignore_case {
                line.to_lowercase().contains(&pattern)
            } else {
                line.contains(&pattern)
            };
            if hit {
                results.push(format!("{}:{}:{}", name, idx + 1, line));
            }
        }
    }
    Ok(results.join("\n"))
}

fn two_operands<'a>(command: &'static str, operands: &[&'a str]) -> Result<(&'a str, &'a str), CommandError> {
    match operands {
        [] => Err(CommandError::usage(command, "missing file operand")),
        [only] => Err(CommandError::usage(
            command,
            format!("missing destination file operand after '{}'", only),
        )),
        [src, dst] => Ok((*src, *dst)),
        [_, _, extra, ..] => Err(CommandError::usage(command, format!("extra operand '{}'", extra))),
    }
}

/// Refuse `.`/`..` operands and anything that contains the session's directory
fn guard_removal(
    command: &'static str,
    operand: &str,
    path: &Path,
    ctx: &ExecutionContext,
) -> Result<(), CommandError> {
    let last = operand.trim_end_matches('/').rsplit('/').next().unwrap_or(operand);
    if last == "." || last == ".." {
        return Err(CommandError::usage(
            command,
            format!("refusing to remove '.' or '..' directory: skipping '{}'", operand),
        ));
    }
    if ctx.current_directory().starts_with(path) {
        return Err(CommandError::usage(
            command,
            format!("refusing to remove '{}': contains the current directory", operand),
        ));
    }
    Ok(())
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn copy_tree(source: &Path, dest: &Path) -> io::Result<()> {
    for entry in WalkDir::new(source) {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

// EXDEV: rename across filesystems
fn is_cross_device(err: &io::Error) -> bool {
    err.raw_os_error() == Some(18)
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn long_entry(name: &str, meta: &fs::Metadata) -> String {
    let kind = if meta.is_dir() { 'd' } else { '-' };
    let modified: DateTime<Local> = meta
        .modified()
        .map(DateTime::from)
        .unwrap_or_else(|_| Local::now());

    format!(
        "{}{} {:>8} {} {}",
        kind,
        permission_string(meta),
        meta.len(),
        modified.format("%b %d %H:%M"),
        name
    )
}

#[cfg(unix)]
fn permission_string(meta: &fs::Metadata) -> String {
    use std::os::unix::fs::PermissionsExt;
    let mode = meta.permissions().mode();
    let mut out = String::with_capacity(9);
    for shift in [6, 3, 0] {
        let bits = (mode >> shift) & 0o7;
        out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    out
}

#[cfg(not(unix))]
fn permission_string(meta: &fs::Metadata) -> String {
    if meta.permissions().readonly() {
        "r--r--r--".to_string()
    } else {
        "rw-rw-rw-".to_string()
    }
}
