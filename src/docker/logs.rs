//! Container log retrieval

use bollard::container::{LogOutput, LogsOptions};
use futures::{Stream, StreamExt};
use tracing::debug;

use crate::core::DockerError;
use crate::docker::{DockerClient, DockerResult};

/// A single log line from a container
#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,
    pub message: String,
    pub is_stderr: bool,
}

impl LogLine {
    /// Parse one chunk of engine output. Returns `None` for stdin echoes.
    pub fn from_output(output: LogOutput) -> Option<Self> {
        let (raw, is_stderr) = match output {
            LogOutput::StdOut { message } | LogOutput::Console { message } => {
                (String::from_utf8_lossy(&message).into_owned(), false)
            }
            LogOutput::StdErr { message } => (String::from_utf8_lossy(&message).into_owned(), true),
            LogOutput::StdIn { .. } => return None,
        };

        let (timestamp, message) = split_timestamp(raw.trim_end());
        Some(Self {
            timestamp,
            message: message.to_string(),
            is_stderr,
        })
    }

    /// Render as `HH:MM:SS message`
    pub fn render(&self) -> String {
        match self.timestamp {
            Some(ts) => format!("{} {}", ts.format("%H:%M:%S"), self.message),
            None => self.message.clone(),
        }
    }
}

/// Split a leading RFC 3339 timestamp (added with `timestamps=true`) off a line
fn split_timestamp(line: &str) -> (Option<chrono::DateTime<chrono::Utc>>, &str) {
    let Some((head, rest)) = line.split_once(' ') else {
        return (None, line);
    };
    match chrono::DateTime::parse_from_rfc3339(head) {
        Ok(ts) => (Some(ts.with_timezone(&chrono::Utc)), rest),
        Err(_) => (None, line),
    }
}

fn logs_options(tail: Option<usize>, follow: bool) -> LogsOptions<String> {
    LogsOptions {
        stdout: true,
        stderr: true,
        timestamps: true,
        follow,
        tail: tail.map(|n| n.to_string()).unwrap_or_else(|| "all".to_string()),
        ..Default::default()
    }
}

impl DockerClient {
    /// Fetch the last `tail` lines of logs from a container
    pub async fn fetch_logs(&self, id: &str, tail: usize) -> DockerResult<Vec<LogLine>> {
        debug!("Fetching last {} log lines for container {}", tail, id);

        let mut stream = self.inner().logs(id, Some(logs_options(Some(tail), false)));
        let mut lines = Vec::new();

        while let Some(result) = stream.next().await {
            let output = result
                .map_err(|e| DockerError::Container(format!("Failed to read logs: {}", e)))?;
            lines.extend(LogLine::from_output(output));
        }

        debug!("Fetched {} log lines", lines.len());
        Ok(lines)
    }

    /// Follow new log output from now on
    pub fn follow_logs(&self, id: &str) -> impl Stream<Item = DockerResult<LogLine>> + '_ {
        let options = LogsOptions::<String> {
            since: chrono::Utc::now().timestamp(),
            ..logs_options(None, true)
        };

        self.inner().logs(id, Some(options)).filter_map(|result| async move {
            match result {
                Ok(output) => LogLine::from_output(output).map(Ok),
                Err(e) => Some(Err(DockerError::Container(format!(
                    "Failed to read logs: {}",
                    e
                )))),
            }
        })
    }
}
