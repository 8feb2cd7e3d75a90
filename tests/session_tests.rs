// nlterm_core/tests/session_tests.rs
// End-to-end sessions over a temporary directory

use nlterm_core::{Session, TerminalConfig};
use std::path::Path;
use tempfile::tempdir;

fn config_for(dir: &Path) -> TerminalConfig {
    let mut config = TerminalConfig::default();
    config.initial_directory = Some(dir.to_path_buf());
    config.home_directory = Some(dir.to_path_buf());
    // Keep the remote backend out of tests regardless of the host environment
    config.remote.api_key = None;
    config.remote.api_key_env = "NLTERM_TEST_NO_SUCH_KEY".to_string();
    config
}

#[tokio::test]
async fn directory_walkthrough() {
    let dir = tempdir().unwrap();
    let mut session = Session::new(&config_for(dir.path()));
    assert!(!session.status().remote_available);

    let resp = session.submit("mkdir sub").await;
    assert_eq!((resp.output.as_str(), resp.exit_code), ("", 0));

    let resp = session.submit("ls").await;
    assert_eq!(resp.output, "sub");

    let resp = session.submit("cd sub").await;
    assert_eq!(resp.exit_code, 0);
    let resp = session.submit("pwd").await;
    assert!(resp.output.ends_with("/sub"), "pwd was {}", resp.output);

    let before = session.status().current_directory;
    let resp = session.submit("cd missing").await;
    assert_eq!(resp.exit_code, 1);
    assert_eq!(resp.output, "cd: missing: No such file or directory");
    assert_eq!(session.status().current_directory, before);

    let resp = session.submit("frobnicate").await;
    assert_eq!(resp.output, "Command not found: frobnicate");
    assert_eq!(resp.exit_code, 1);

    assert_eq!(session.status().history_len, 6);
}

#[tokio::test]
async fn natural_language_file_lifecycle() {
    let dir = tempdir().unwrap();
    let mut session = Session::new(&config_for(dir.path()));

    let resp = session.submit("create a new file called notes.txt").await;
    assert_eq!(resp.exit_code, 0);
    assert!(resp.interpretation.is_natural_language);
    assert!(dir.path().join("notes.txt").is_file());

    std::fs::write(dir.path().join("notes.txt"), "alpha\nbeta\n").unwrap();
    let resp = session.submit("show me the contents of notes.txt").await;
    assert_eq!(resp.output, "alpha\nbeta\n");

    let resp = session.submit("copy notes.txt to backup.txt").await;
    assert_eq!(resp.exit_code, 0);
    assert!(dir.path().join("backup.txt").is_file());

    let resp = session.submit("delete the file notes.txt").await;
    assert_eq!(resp.exit_code, 0);
    assert!(!dir.path().join("notes.txt").exists());

    let history = session.context().history();
    assert_eq!(
        history,
        &[
            "touch notes.txt".to_string(),
            "cat notes.txt".to_string(),
            "cp notes.txt backup.txt".to_string(),
            "rm notes.txt".to_string(),
        ]
    );
}

#[tokio::test]
async fn home_and_parent_navigation() {
    let dir = tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("a/b")).unwrap();
    let mut session = Session::new(&config_for(dir.path()));
    let home = session.status().current_directory;

    session.submit("cd a/b").await;
    assert!(session.status().current_directory.ends_with("/a/b"));

    let resp = session.submit("go up one level").await;
    assert_eq!(resp.interpretation.resolved_command.as_deref(), Some("cd .."));
    assert!(session.status().current_directory.ends_with("/a"));

    session.submit("go to home directory").await;
    assert_eq!(session.status().current_directory, home);
}

#[tokio::test]
async fn strict_mode_reports_misses() {
    let dir = tempdir().unwrap();
    let mut config = config_for(dir.path());
    config.lenient_interpretation = false;
    let mut session = Session::new(&config);

    let resp = session.submit("sing me a song").await;
    assert_eq!(resp.exit_code, 1);
    assert_eq!(resp.output, "Could not interpret: sing me a song");
    assert_eq!(session.status().history_len, 0);
}

#[tokio::test]
async fn history_limit_drops_oldest() {
    let dir = tempdir().unwrap();
    let mut config = config_for(dir.path());
    config.history_limit = Some(2);
    let mut session = Session::new(&config);

    for line in ["echo one", "echo two", "echo three"] {
        session.submit(line).await;
    }
    assert_eq!(
        session.context().history(),
        &["echo two".to_string(), "echo three".to_string()]
    );

    let resp = session.submit("history").await;
    assert!(resp.output.contains("echo three"));
    assert!(!resp.output.contains("echo one"));
}

#[tokio::test]
async fn copying_a_file_onto_itself_keeps_its_content() {
    let dir = tempdir().unwrap();
    let notes = dir.path().join("notes.txt");
    std::fs::write(&notes, "precious data").unwrap();
    let mut session = Session::new(&config_for(dir.path()));

    let resp = session.submit("cp notes.txt .").await;
    assert_eq!(resp.exit_code, 1);
    assert_eq!(resp.output, "cp: 'notes.txt' and '.' are the same file");

    let resp = session.submit("copy notes.txt to notes.txt").await;
    assert_eq!(resp.interpretation.resolved_command.as_deref(), Some("cp notes.txt notes.txt"));
    assert_eq!(resp.exit_code, 1);

    assert_eq!(std::fs::read_to_string(&notes).unwrap(), "precious data");
}

#[tokio::test]
async fn removing_the_working_directory_is_refused() {
    let dir = tempdir().unwrap();
    std::fs::create_dir(dir.path().join("work")).unwrap();
    let mut session = Session::new(&config_for(dir.path()));
    session.submit("cd work").await;

    for line in ["rm -r .", "rm -rf ..", "rm -r ~", "rmdir ."] {
        let resp = session.submit(line).await;
        assert_eq!(resp.exit_code, 1, "{}", line);
        assert!(resp.output.contains("refusing to remove"), "{}: {}", line, resp.output);
    }

    let resp = session.submit("ls").await;
    assert_eq!(resp.exit_code, 0);
    assert!(dir.path().join("work").is_dir());
}

#[tokio::test]
async fn multi_word_names_stay_one_file() {
    let dir = tempdir().unwrap();
    let mut session = Session::new(&config_for(dir.path()));

    let resp = session.submit("create a file called my notes.txt").await;
    assert_eq!(resp.exit_code, 0);
    assert!(dir.path().join("my notes.txt").is_file());
    assert!(!dir.path().join("my").exists());
}
