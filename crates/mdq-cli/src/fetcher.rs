//! Fetcher that shells out to a configured retrieval command.
//!
//! The command template comes from `fetch_command` in config.toml;
//! `{url}`, `{output_dir}`, `{format}`, `{quality}` and `{proxy}` are
//! substituted (shell-quoted) per item and the result runs under `sh -c`.
//! Contract with the tool: print the downloaded file's path as the last
//! non-empty stdout line. `{proxy}` expands to `''` when no proxy is
//! selected for the dispatch.

use mdq_core::checksum;
use mdq_core::control::SkipSignal;
use mdq_core::fetcher::{FetchError, FetchRequest, FetchedMedia, Fetcher};
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;

/// Poll interval for child exit and skip requests.
const POLL: Duration = Duration::from_millis(100);

pub struct CommandFetcher {
    template: String,
}

impl CommandFetcher {
    pub fn new(template: String) -> Self {
        Self { template }
    }

    fn render(&self, request: &FetchRequest) -> String {
        let proxy = request.proxy.as_deref().unwrap_or("");
        self.template
            .replace("{url}", &shell_quote(&request.url))
            .replace("{output_dir}", &shell_quote(&request.output_dir))
            .replace("{format}", &shell_quote(&request.format))
            .replace("{quality}", &shell_quote(&request.quality))
            .replace("{proxy}", &shell_quote(proxy))
    }
}

fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Collect a child stream's lines on a helper thread so the pipe never
/// fills up while the parent polls for exit.
fn drain<R: Read + Send + 'static>(stream: Option<R>) -> std::thread::JoinHandle<Vec<String>> {
    std::thread::spawn(move || {
        let mut lines = Vec::new();
        if let Some(stream) = stream {
            for line in BufReader::new(stream).lines().map_while(Result::ok) {
                lines.push(line);
            }
        }
        lines
    })
}

impl Fetcher for CommandFetcher {
    fn fetch(&self, request: &FetchRequest, skip: &SkipSignal) -> Result<FetchedMedia, FetchError> {
        let command = self.render(request);
        tracing::debug!(%command, "spawning fetch command");

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| FetchError::Failed(format!("spawn fetch command: {e}")))?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(e) => return Err(FetchError::Failed(format!("wait for fetch command: {e}"))),
            }
            if skip.is_requested() {
                tracing::info!("skip requested, killing fetch command");
                let _ = child.kill();
                let _ = child.wait();
                return Err(FetchError::Skipped);
            }
            std::thread::sleep(POLL);
        };

        let stdout_lines = stdout.join().unwrap_or_default();
        let stderr_lines = stderr.join().unwrap_or_default();

        if !status.success() {
            let detail = stderr_lines.last().cloned().unwrap_or_default();
            return Err(FetchError::Failed(format!(
                "fetch command exited with {status}: {detail}"
            )));
        }

        let path: PathBuf = stdout_lines
            .iter()
            .rev()
            .find(|l| !l.trim().is_empty())
            .map(|l| l.trim().into())
            .ok_or_else(|| FetchError::Failed("fetch command printed no output path".into()))?;

        let meta = std::fs::metadata(&path)
            .map_err(|e| FetchError::Failed(format!("stat {}: {e}", path.display())))?;
        let hash = checksum::sha256_path(&path).ok();

        Ok(FetchedMedia {
            path,
            size_bytes: meta.len(),
            hash,
            uploader: None,
            upload_date: None,
            source_id: None,
        })
    }
}
