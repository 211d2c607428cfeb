//! Log and exec overlays fed by pushed bridge events

use std::collections::VecDeque;

use crate::bridge::{EventHub, StreamEvent, Subscription, Topic};

const MAX_LINES: usize = 5000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamKind {
    Logs,
    /// `shell` is unknown until `start_container_shell` answers
    Exec { shell: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamLine {
    pub text: String,
    pub is_error: bool,
}

#[derive(Debug)]
pub struct StreamView {
    pub kind: StreamKind,
    pub container_id: String,
    pub container_name: String,
    pub lines: VecDeque<StreamLine>,
    /// Lines scrolled up from the bottom; 0 follows new output
    pub scroll_offset: usize,
    pub ended: bool,
    /// Exec input line
    pub input: String,
    /// Exec command awaiting its `exec-ended` event
    pub running: bool,
    subscriptions: Vec<Subscription>,
}

impl StreamView {
    /// Subscribe to the log topics of a container
    pub fn logs(hub: &EventHub, container_id: &str, container_name: &str) -> Self {
        let id = container_id.to_string();
        let subscriptions = vec![
            hub.subscribe(Topic::LogStream(id.clone())),
            hub.subscribe(Topic::LogStreamError(id.clone())),
            hub.subscribe(Topic::LogStreamEnded(id)),
        ];
        Self::with(StreamKind::Logs, container_id, container_name, subscriptions)
    }

    /// Subscribe to the exec topics of a container
    pub fn exec(hub: &EventHub, container_id: &str, container_name: &str) -> Self {
        let id = container_id.to_string();
        let subscriptions = vec![
            hub.subscribe(Topic::ExecOutput(id.clone())),
            hub.subscribe(Topic::ExecError(id.clone())),
            hub.subscribe(Topic::ExecEnded(id)),
        ];
        Self::with(
            StreamKind::Exec { shell: None },
            container_id,
            container_name,
            subscriptions,
        )
    }

    fn with(
        kind: StreamKind,
        container_id: &str,
        container_name: &str,
        subscriptions: Vec<Subscription>,
    ) -> Self {
        Self {
            kind,
            container_id: container_id.to_string(),
            container_name: container_name.to_string(),
            lines: VecDeque::with_capacity(MAX_LINES),
            scroll_offset: 0,
            ended: false,
            input: String::new(),
            running: false,
            subscriptions,
        }
    }

    pub fn is_logs(&self) -> bool {
        self.kind == StreamKind::Logs
    }

    pub fn shell(&self) -> Option<&str> {
        match &self.kind {
            StreamKind::Exec { shell } => shell.as_deref(),
            StreamKind::Logs => None,
        }
    }

    pub fn set_shell(&mut self, shell: String) {
        if let StreamKind::Exec { shell: slot } = &mut self.kind {
            *slot = Some(shell);
        }
    }

    pub fn push_line(&mut self, text: impl Into<String>, is_error: bool) {
        if self.lines.len() >= MAX_LINES {
            self.lines.pop_front();
        }
        self.lines.push_back(StreamLine {
            text: text.into(),
            is_error,
        });
    }

    /// Add a block of text, one line per `\n`
    pub fn push_text(&mut self, text: &str, is_error: bool) {
        for line in text.lines() {
            self.push_line(line, is_error);
        }
    }

    /// Drain queued events from every subscription; returns how many applied
    pub fn poll(&mut self) -> usize {
        let events: Vec<StreamEvent> = self
            .subscriptions
            .iter_mut()
            .flat_map(|sub| sub.drain())
            .collect();
        let count = events.len();
        for event in events {
            self.apply(event);
        }
        count
    }

    pub fn apply(&mut self, event: StreamEvent) {
        if event.topic.container_id() != self.container_id {
            return;
        }
        match event.topic {
            Topic::LogStream(_) | Topic::ExecOutput(_) => self.push_text(&event.payload, false),
            Topic::LogStreamError(_) | Topic::ExecError(_) => self.push_text(&event.payload, true),
            Topic::LogStreamEnded(_) => {
                self.ended = true;
                self.push_line("[log stream ended]", false);
            }
            Topic::ExecEnded(_) => {
                self.running = false;
                if !event.payload.is_empty() && event.payload != "0" {
                    self.push_line(format!("[exit code {}]", event.payload), true);
                }
            }
        }
    }

    /// The command line sent for one exec input line
    pub fn exec_command(&self, line: &str) -> Option<Vec<String>> {
        let shell = self.shell()?;
        Some(vec![shell.to_string(), "-c".to_string(), line.to_string()])
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_offset = (self.scroll_offset + lines).min(self.lines.len());
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    pub fn is_following(&self) -> bool {
        self.scroll_offset == 0
    }

    /// Unsubscribes by dropping every subscription
    pub fn close(self) -> String {
        self.container_id
    }
}
