//! ExecutionContext - per-session mutable state
//! - Keeps the current working directory, the history log and an environment snapshot
//! - `change_directory` is the only way the working directory moves

use crate::config::TerminalConfig;
use crate::error::{CommandError, FsErrorKind};
use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Session state owned by exactly one session
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    cwd: PathBuf,
    home: PathBuf,
    history: Vec<String>,
    history_limit: Option<usize>,
    environment: HashMap<String, String>,
    mirror_process_cwd: bool,
}

impl ExecutionContext {
    /// Create a new context
    /// - initial: starting directory (defaults to home, then the process cwd)
    /// - home: directory `~` expands to (defaults to the user's home)
    pub fn new(initial: Option<PathBuf>, home: Option<PathBuf>) -> Self {
        let home = home
            .or_else(dirs::home_dir)
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("/"));
        let home = home.canonicalize().unwrap_or(home);

        let cwd = initial
            .filter(|p| p.is_dir())
            .or_else(|| Some(home.clone()).filter(|p| p.is_dir()))
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("/"));
        let cwd = cwd.canonicalize().unwrap_or(cwd);

        Self {
            cwd,
            home,
            history: Vec::new(),
            history_limit: None,
            environment: std::env::vars().collect(),
            mirror_process_cwd: false,
        }
    }

    /// Build a context from configuration
    pub fn from_config(config: &TerminalConfig) -> Self {
        Self::new(
            config.initial_directory.clone(),
            config.home_directory.clone(),
        )
        .with_history_limit(config.history_limit)
        .with_process_cwd_mirroring(config.mirror_process_cwd)
    }

    /// Replace the environment snapshot
    pub fn with_environment(mut self, environment: HashMap<String, String>) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_history_limit(mut self, limit: Option<usize>) -> Self {
        self.history_limit = limit;
        self
    }

    /// Also move the OS process cwd on every successful `cd`
    pub fn with_process_cwd_mirroring(mut self, enabled: bool) -> Self {
        self.mirror_process_cwd = enabled;
        self
    }

    pub fn current_directory(&self) -> &Path {
        &self.cwd
    }

    pub fn cwd_string(&self) -> String {
        self.cwd.display().to_string()
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Append a raw input line, dropping the oldest entry when capped
    pub fn record(&mut self, line: &str) {
        self.history.push(line.to_string());
        if let Some(limit) = self.history_limit {
            if self.history.len() > limit {
                let excess = self.history.len() - limit;
                self.history.drain(..excess);
            }
        }
    }

    pub fn environment(&self) -> &HashMap<String, String> {
        &self.environment
    }

    pub fn env_var(&self, name: &str) -> Option<&str> {
        self.environment.get(name).map(String::as_str)
    }

    /// Resolve a user-supplied path: `~` expansion, relative to cwd, `.`/`..` folded
    pub fn resolve(&self, target: &str) -> PathBuf {
        let expanded = if target == "~" {
            self.home.clone()
        } else if let Some(rest) = target.strip_prefix("~/") {
            self.home.join(rest)
        } else {
            PathBuf::from(target)
        };

        let absolute = if expanded.is_absolute() {
            expanded
        } else {
            self.cwd.join(expanded)
        };

        normalize_path(&absolute)
    }

    /// Change directory with validation.
    /// On failure the current directory is left untouched.
    pub fn change_directory(&mut self, target: &str) -> Result<PathBuf, CommandError> {
        let resolved = self.resolve(target);

        let metadata = fs::metadata(&resolved).map_err(|e| CommandError::io("cd", target, &e))?;
        if !metadata.is_dir() {
            return Err(CommandError::fs("cd", target, FsErrorKind::NotADirectory));
        }

        // Stat through the directory itself: needs search (x) permission, not read
        fs::metadata(resolved.join(".")).map_err(|e| CommandError::io("cd", target, &e))?;

        if self.mirror_process_cwd {
            std::env::set_current_dir(&resolved).map_err(|e| CommandError::io("cd", target, &e))?;
        }

        self.cwd = resolved.clone();
        Ok(resolved)
    }
}

/// Lexically fold `.` and `..` segments (no symlink resolution)
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(p) => out.push(p.as_os_str()),
            Component::RootDir => out.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(part) => out.push(part),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn context_in(dir: &Path) -> ExecutionContext {
        ExecutionContext::new(Some(dir.to_path_buf()), Some(dir.to_path_buf()))
    }

    #[test]
    fn test_context_basic() {
        let dir = tempdir().unwrap();
        let ctx = context_in(dir.path());

        assert_eq!(ctx.current_directory(), dir.path().canonicalize().unwrap());
        assert!(ctx.history().is_empty());
    }

    #[test]
    fn test_missing_initial_directory_falls_back_to_home() {
        let home = tempdir().unwrap();
        let ctx = ExecutionContext::new(
            Some(home.path().join("does-not-exist")),
            Some(home.path().to_path_buf()),
        );
        assert_eq!(ctx.current_directory(), home.path().canonicalize().unwrap());
    }

    #[test]
    fn test_cd_to_parent() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("child")).unwrap();
        let mut ctx = context_in(&dir.path().join("child"));

        ctx.change_directory("..").unwrap();
        assert_eq!(ctx.current_directory(), dir.path().canonicalize().unwrap());
    }

    #[test]
    fn test_cd_home_expansion() {
        let home = tempdir().unwrap();
        std::fs::create_dir(home.path().join("docs")).unwrap();
        let start = tempdir().unwrap();
        let mut ctx = ExecutionContext::new(
            Some(start.path().to_path_buf()),
            Some(home.path().to_path_buf()),
        );

        ctx.change_directory("~/docs").unwrap();
        assert!(ctx.current_directory().ends_with("docs"));

        ctx.change_directory("~").unwrap();
        assert_eq!(ctx.current_directory(), home.path().canonicalize().unwrap());
    }

    #[test]
    fn test_failed_cd_leaves_state_unchanged() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("file.txt"), "x").unwrap();
        let mut ctx = context_in(dir.path());
        let before = ctx.cwd_string();

        let err = ctx.change_directory("missing").unwrap_err();
        assert_eq!(err.fs_kind(), Some(&FsErrorKind::NotFound));
        assert_eq!(ctx.cwd_string(), before);

        let err = ctx.change_directory("file.txt").unwrap_err();
        assert_eq!(err.fs_kind(), Some(&FsErrorKind::NotADirectory));
        assert_eq!(ctx.cwd_string(), before);
    }

    #[cfg(unix)]
    fn set_mode(path: &Path, mode: u32) {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_cd_permission_denied() {
        let dir = tempdir().unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        set_mode(&locked, 0o000);

        // Privileged users bypass directory permissions
        if fs::metadata(locked.join(".")).is_ok() {
            set_mode(&locked, 0o755);
            return;
        }

        let mut ctx = context_in(dir.path());
        let before = ctx.cwd_string();
        let err = ctx.change_directory("locked").unwrap_err();
        assert_eq!(err.fs_kind(), Some(&FsErrorKind::PermissionDenied));
        assert_eq!(err.to_string(), "cd: locked: Permission denied");
        assert_eq!(ctx.cwd_string(), before);

        // Readable but not searchable
        set_mode(&locked, 0o444);
        let err = ctx.change_directory("locked").unwrap_err();
        assert_eq!(err.fs_kind(), Some(&FsErrorKind::PermissionDenied));

        set_mode(&locked, 0o755);
    }

    #[cfg(unix)]
    #[test]
    fn test_cd_search_only_directory() {
        let dir = tempdir().unwrap();
        let search_only = dir.path().join("search_only");
        fs::create_dir(&search_only).unwrap();
        set_mode(&search_only, 0o111);

        let mut ctx = context_in(dir.path());
        let moved = ctx.change_directory("search_only");
        set_mode(&search_only, 0o755);

        assert!(moved.unwrap().ends_with("search_only"));
    }

    #[test]
    fn test_history_limit() {
        let dir = tempdir().unwrap();
        let mut ctx = context_in(dir.path()).with_history_limit(Some(2));
        ctx.record("one");
        ctx.record("two");
        ctx.record("three");
        assert_eq!(ctx.history(), &["two".to_string(), "three".to_string()]);
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("/a/b/../c/./d")), PathBuf::from("/a/c/d"));
        assert_eq!(normalize_path(Path::new("/../..")), PathBuf::from("/"));
    }
}
