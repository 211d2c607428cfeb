//! Terminal tab: sessions, history and command dispatch

use std::collections::VecDeque;
use std::path::Path;

use chrono::{DateTime, Local};
use uuid::Uuid;

use crate::core::{BridgeResult, TerminalOutput};

/// Commands kept per session
pub const HISTORY_LIMIT: usize = 100;

/// Candidates offered by tab completion
pub const COMPLETIONS: &[&str] = &[
    "cd",
    "clear",
    "pwd",
    "ls",
    "ls -la",
    "docker ps",
    "docker ps -a",
    "docker images",
    "docker volume ls",
    "docker network ls",
    "docker system df",
    "docker stats --no-stream",
    "docker compose ps",
    "docker compose up -d",
    "docker compose down",
    "docker version",
    "docker info",
];

/// Bounded command history with an Up/Down cursor
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: VecDeque<String>,
    /// Index into `entries` while browsing, `None` when editing a fresh draft
    cursor: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: &str) {
        self.cursor = None;
        if command.trim().is_empty() {
            return;
        }
        self.entries.push_back(command.to_string());
        while self.entries.len() > HISTORY_LIMIT {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Step toward older commands, stopping at the oldest
    pub fn up(&mut self) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        let next = match self.cursor {
            None => self.entries.len() - 1,
            Some(i) => i.saturating_sub(1),
        };
        self.cursor = Some(next);
        self.entries.get(next).map(String::as_str)
    }

    /// Step toward newer commands. Past the newest the draft is empty again.
    pub fn down(&mut self) -> Option<&str> {
        let current = self.cursor?;
        if current + 1 < self.entries.len() {
            self.cursor = Some(current + 1);
            self.entries.get(current + 1).map(String::as_str)
        } else {
            self.cursor = None;
            Some("")
        }
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = None;
    }
}

/// Parsed terminal input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalCommand {
    Cd(Option<String>),
    Pwd,
    Clear,
    Docker(Vec<String>),
    Shell(String),
}

pub fn parse_command(line: &str) -> Option<TerminalCommand> {
    let line = line.trim();
    let mut words = line.split_whitespace();
    let command = match words.next()? {
        "cd" => TerminalCommand::Cd(words.next().map(str::to_string)),
        "pwd" => TerminalCommand::Pwd,
        "clear" => TerminalCommand::Clear,
        // Only `docker <args>` goes to the docker CLI; a bare `docker` runs in the shell
        "docker" if words.clone().next().is_some() => {
            TerminalCommand::Docker(words.map(str::to_string).collect())
        }
        _ => TerminalCommand::Shell(line.to_string()),
    };
    Some(command)
}

/// Resolve a `cd` argument against the session directory
pub fn resolve_path(cwd: &str, target: &str) -> String {
    if target.starts_with('/') || target.starts_with('~') {
        target.to_string()
    } else {
        Path::new(cwd).join(target).to_string_lossy().into_owned()
    }
}

/// Apply prefix completion. Returns the completed text on a unique match.
pub fn complete(draft: &str) -> Option<&'static str> {
    if draft.is_empty() {
        return None;
    }
    let mut matches = COMPLETIONS.iter().filter(|c| c.starts_with(draft));
    match (matches.next(), matches.next()) {
        (Some(only), None) => Some(only),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct TerminalEntry {
    pub id: Uuid,
    pub command: String,
    pub output: Option<TerminalOutput>,
    pub timestamp: DateTime<Local>,
    pub executing: bool,
}

impl TerminalEntry {
    fn new(command: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            command: command.to_string(),
            output: None,
            timestamp: Local::now(),
            executing: false,
        }
    }

    pub fn finished(command: &str, output: TerminalOutput) -> Self {
        Self {
            output: Some(output),
            ..Self::new(command)
        }
    }
}

/// Work a submitted line needs from the bridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalRequest {
    ChangeDirectory {
        session: Uuid,
        entry: Uuid,
        path: String,
    },
    Execute {
        session: Uuid,
        entry: Uuid,
        command: String,
        cwd: String,
    },
    Docker {
        session: Uuid,
        entry: Uuid,
        args: Vec<String>,
        cwd: String,
    },
}

#[derive(Debug, Clone)]
pub struct TerminalSession {
    pub id: Uuid,
    pub title: String,
    pub cwd: String,
    pub entries: Vec<TerminalEntry>,
    pub history: History,
    pub draft: String,
}

impl TerminalSession {
    pub fn new(title: impl Into<String>, cwd: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            cwd: cwd.into(),
            entries: Vec::new(),
            history: History::new(),
            draft: String::new(),
        }
    }

    /// A session is executing while any entry awaits its result
    pub fn is_executing(&self) -> bool {
        self.entries.iter().any(|e| e.executing)
    }

    pub fn type_char(&mut self, c: char) {
        self.draft.push(c);
        self.history.reset_cursor();
    }

    pub fn backspace(&mut self) {
        self.draft.pop();
        self.history.reset_cursor();
    }

    pub fn history_up(&mut self) {
        if let Some(command) = self.history.up() {
            self.draft = command.to_string();
        }
    }

    pub fn history_down(&mut self) {
        if let Some(command) = self.history.down() {
            self.draft = command.to_string();
        }
    }

    pub fn complete(&mut self) -> bool {
        match complete(&self.draft) {
            Some(completed) => {
                self.draft = completed.to_string();
                true
            }
            None => false,
        }
    }

    /// Submit the draft. Built-ins finish locally; everything else becomes a
    /// request. Nothing is accepted while a command is running.
    pub fn submit(&mut self) -> Option<TerminalRequest> {
        if self.is_executing() {
            return None;
        }
        let line = std::mem::take(&mut self.draft);
        let command = parse_command(&line)?;
        let line = line.trim().to_string();
        self.history.push(&line);

        match command {
            TerminalCommand::Clear => {
                self.entries.clear();
                None
            }
            TerminalCommand::Pwd => {
                let output = TerminalOutput::local(format!("{}\n", self.cwd));
                self.entries.push(TerminalEntry::finished(&line, output));
                None
            }
            TerminalCommand::Cd(None) => {
                let output = TerminalOutput::local_error("cd: missing directory argument\n");
                self.entries.push(TerminalEntry::finished(&line, output));
                None
            }
            TerminalCommand::Cd(Some(target)) => {
                let entry = self.start_entry(&line);
                Some(TerminalRequest::ChangeDirectory {
                    session: self.id,
                    entry,
                    path: resolve_path(&self.cwd, &target),
                })
            }
            TerminalCommand::Docker(args) => {
                let entry = self.start_entry(&line);
                Some(TerminalRequest::Docker {
                    session: self.id,
                    entry,
                    args,
                    cwd: self.cwd.clone(),
                })
            }
            TerminalCommand::Shell(command) => {
                let entry = self.start_entry(&line);
                Some(TerminalRequest::Execute {
                    session: self.id,
                    entry,
                    command,
                    cwd: self.cwd.clone(),
                })
            }
        }
    }

    fn start_entry(&mut self, line: &str) -> Uuid {
        let mut entry = TerminalEntry::new(line);
        entry.executing = true;
        let id = entry.id;
        self.entries.push(entry);
        id
    }

    fn entry_mut(&mut self, id: Uuid) -> Option<&mut TerminalEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    /// Result of `execute_command` or `execute_docker_command`
    pub fn finish_command(&mut self, entry: Uuid, result: BridgeResult<TerminalOutput>) {
        if let Some(entry) = self.entry_mut(entry) {
            entry.executing = false;
            entry.output = Some(result.unwrap_or_else(|e| TerminalOutput::local_error(format!("{}\n", e))));
        }
    }

    /// Result of `change_directory`
    pub fn finish_cd(&mut self, entry: Uuid, result: BridgeResult<String>) {
        let output = match result {
            Ok(path) => {
                self.cwd = path;
                TerminalOutput::local("")
            }
            Err(e) => TerminalOutput::local_error(format!("{}\n", e)),
        };
        if let Some(entry) = self.entry_mut(entry) {
            entry.executing = false;
            entry.output = Some(output);
        }
    }
}

/// The set of open terminal sessions
#[derive(Debug, Clone)]
pub struct TerminalTabs {
    sessions: Vec<TerminalSession>,
    active: usize,
    opened: usize,
}

impl TerminalTabs {
    pub fn new(cwd: impl Into<String>) -> Self {
        Self {
            sessions: vec![TerminalSession::new("Terminal 1", cwd)],
            active: 0,
            opened: 1,
        }
    }

    pub fn sessions(&self) -> &[TerminalSession] {
        &self.sessions
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> &TerminalSession {
        &self.sessions[self.active]
    }

    pub fn active_mut(&mut self) -> &mut TerminalSession {
        &mut self.sessions[self.active]
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut TerminalSession> {
        self.sessions.iter_mut().find(|s| s.id == id)
    }

    /// Open a session in `cwd` and make it active
    pub fn open(&mut self, cwd: impl Into<String>) -> Uuid {
        self.opened += 1;
        let session = TerminalSession::new(format!("Terminal {}", self.opened), cwd);
        let id = session.id;
        self.sessions.push(session);
        self.active = self.sessions.len() - 1;
        id
    }

    /// Close a session. The last remaining session cannot be closed.
    pub fn close(&mut self, id: Uuid) -> bool {
        if self.sessions.len() <= 1 {
            return false;
        }
        let Some(index) = self.sessions.iter().position(|s| s.id == id) else {
            return false;
        };
        self.sessions.remove(index);

        if index < self.active || (index == self.active && self.active > 0) {
            self.active -= 1;
        }
        self.active = self.active.min(self.sessions.len() - 1);
        true
    }

    pub fn close_active(&mut self) -> bool {
        let id = self.active().id;
        self.close(id)
    }

    pub fn next(&mut self) {
        self.active = (self.active + 1) % self.sessions.len();
    }

    pub fn previous(&mut self) {
        self.active = (self.active + self.sessions.len() - 1) % self.sessions.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BridgeError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_history_keeps_most_recent_hundred() {
        let mut history = History::new();
        for i in 0..150 {
            history.push(&format!("echo {}", i));
        }
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history.entries().next(), Some("echo 50"));

        let mut seen = Vec::new();
        for _ in 0..HISTORY_LIMIT {
            seen.push(history.up().map(str::to_string).unwrap());
        }
        let expected: Vec<String> = (50..150).rev().map(|i| format!("echo {}", i)).collect();
        assert_eq!(seen, expected);

        // Stops at the oldest
        assert_eq!(history.up(), Some("echo 50"));
    }

    #[test]
    fn test_history_down_returns_to_empty_draft() {
        let mut history = History::new();
        history.push("ls");
        history.push("pwd");

        assert_eq!(history.down(), None);
        assert_eq!(history.up(), Some("pwd"));
        assert_eq!(history.up(), Some("ls"));
        assert_eq!(history.down(), Some("pwd"));
        assert_eq!(history.down(), Some(""));
        assert_eq!(history.cursor(), None);
    }

    #[test]
    fn test_typing_resets_cursor() {
        let mut session = TerminalSession::new("t", "/");
        session.history.push("ls");
        session.history_up();
        assert_eq!(session.draft, "ls");
        session.type_char('x');
        assert_eq!(session.history.cursor(), None);
        assert_eq!(session.draft, "lsx");
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("  "), None);
        assert_eq!(parse_command("cd"), Some(TerminalCommand::Cd(None)));
        assert_eq!(
            parse_command("cd src"),
            Some(TerminalCommand::Cd(Some("src".into())))
        );
        assert_eq!(
            parse_command("docker ps -a"),
            Some(TerminalCommand::Docker(vec!["ps".into(), "-a".into()]))
        );
        assert_eq!(
            parse_command("dockerd --help"),
            Some(TerminalCommand::Shell("dockerd --help".into()))
        );
    }

    #[test]
    fn test_builtins_stay_local() {
        let mut session = TerminalSession::new("t", "/srv");

        session.draft = "pwd".into();
        assert_eq!(session.submit(), None);
        assert_eq!(session.entries[0].output.as_ref().unwrap().stdout, "/srv\n");

        session.draft = "cd".into();
        assert_eq!(session.submit(), None);
        let output = session.entries[1].output.as_ref().unwrap();
        assert_eq!(output.stderr, "cd: missing directory argument\n");
        assert!(!output.success);

        session.draft = "clear".into();
        assert_eq!(session.submit(), None);
        assert!(session.entries.is_empty());
        assert_eq!(session.history.len(), 3);
    }

    #[test]
    fn test_cd_round_trip() {
        let mut session = TerminalSession::new("t", "/srv");
        session.draft = "cd app".into();
        let request = session.submit().unwrap();
        let TerminalRequest::ChangeDirectory { entry, path, .. } = request else {
            panic!("expected cd request");
        };
        assert_eq!(path, "/srv/app");
        assert!(session.is_executing());

        session.finish_cd(entry, Ok("/srv/app".into()));
        assert_eq!(session.cwd, "/srv/app");
        assert!(!session.is_executing());

        session.draft = "cd nope".into();
        let Some(TerminalRequest::ChangeDirectory { entry, .. }) = session.submit() else {
            panic!("expected cd request");
        };
        session.finish_cd(entry, Err(BridgeError::new("cd: nope: No such file or directory")));
        assert_eq!(session.cwd, "/srv/app");
    }

    #[test]
    fn test_submit_refused_while_executing() {
        let mut session = TerminalSession::new("t", "/");
        session.draft = "sleep 5".into();
        assert!(session.submit().is_some());
        session.draft = "ls".into();
        assert_eq!(session.submit(), None);
        assert_eq!(session.draft, "ls");
    }

    #[test]
    fn test_docker_prefix_dispatch() {
        let mut session = TerminalSession::new("t", "/work");
        session.draft = "docker ps -a".into();
        match session.submit().unwrap() {
            TerminalRequest::Docker { args, cwd, .. } => {
                assert_eq!(args, vec!["ps", "-a"]);
                assert_eq!(cwd, "/work");
            }
            other => panic!("unexpected request {:?}", other),
        }
    }

    #[test]
    fn test_bare_docker_runs_in_shell() {
        assert_eq!(
            parse_command("docker"),
            Some(TerminalCommand::Shell("docker".into()))
        );
        assert_eq!(
            parse_command("  docker  "),
            Some(TerminalCommand::Shell("docker".into()))
        );

        let mut session = TerminalSession::new("t", "/work");
        session.draft = "docker".into();
        match session.submit().unwrap() {
            TerminalRequest::Execute { command, cwd, .. } => {
                assert_eq!(command, "docker");
                assert_eq!(cwd, "/work");
            }
            other => panic!("unexpected request {:?}", other),
        }
    }

    #[test]
    fn test_completion_requires_unique_match() {
        assert_eq!(complete("pw"), Some("pwd"));
        assert_eq!(complete("docker p"), None);
        assert_eq!(complete("docker vo"), Some("docker volume ls"));
        assert_eq!(complete("zzz"), None);
        assert_eq!(complete(""), None);
    }

    #[test]
    fn test_close_rules() {
        let mut tabs = TerminalTabs::new("/");
        let first = tabs.active().id;
        assert!(!tabs.close(first));

        let second = tabs.open("/");
        let third = tabs.open("/");
        assert_eq!(tabs.active().id, third);

        assert!(tabs.close(third));
        assert_eq!(tabs.active().id, second);

        tabs.next();
        assert_eq!(tabs.active().id, first);
        assert!(tabs.close(first));
        assert_eq!(tabs.active().id, second);
        assert_eq!(tabs.sessions().len(), 1);
    }

    #[test]
    fn test_closing_earlier_session_keeps_active() {
        let mut tabs = TerminalTabs::new("/");
        let first = tabs.active().id;
        let second = tabs.open("/");
        assert!(tabs.close(first));
        assert_eq!(tabs.active().id, second);
    }
}
