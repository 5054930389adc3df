//! Delivery of signal tokens to polybar.

use std::io;
use std::os::unix::fs::FileTypeExt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use log::{debug, warn};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::net::unix::pipe;
use tokio::process::Command;

use crate::config::{SinkConfig, SinkKind};
use crate::error::App;

const IPC_FILE_PREFIX: &str = "polybar_mqueue";
const IPC_WRITE_TIMEOUT: Duration = Duration::from_secs(1);

#[allow(async_fn_in_trait)]
pub trait Sink {
    /// Delivers a single token.
    async fn send(&mut self, token: &str) -> Result<(), App>;
}

/// Runs `polybar-msg action <token>`.
#[derive(Debug, Clone)]
pub struct PolybarMsgSink {
    program: String,
}

impl PolybarMsgSink {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for PolybarMsgSink {
    fn default() -> Self {
        Self::new("polybar-msg")
    }
}

impl Sink for PolybarMsgSink {
    async fn send(&mut self, token: &str) -> Result<(), App> {
        debug!("Sending '{token}' via {}", self.program);
        let status = Command::new(&self.program)
            .arg("action")
            .arg(token)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| App::delivery(token, e))?;
        if status.success() {
            Ok(())
        } else {
            Err(App::delivery(token, format!("{} exited with {status}", self.program)))
        }
    }
}

/// Writes `action:<token>` into every polybar ipc file found in a directory.
/// Every file is tried; the first failure is reported once all have been.
#[derive(Debug, Clone)]
pub struct IpcFileSink {
    dir: PathBuf,
}

impl IpcFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    async fn ipc_paths(&self) -> Result<Vec<PathBuf>, App> {
        let mut paths = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry
                .file_name()
                .to_string_lossy()
                .starts_with(IPC_FILE_PREFIX)
            {
                paths.push(entry.path());
            }
        }
        paths.sort();
        Ok(paths)
    }
}

impl Sink for IpcFileSink {
    async fn send(&mut self, token: &str) -> Result<(), App> {
        let paths = self
            .ipc_paths()
            .await
            .map_err(|e| App::delivery(token, e))?;
        if paths.is_empty() {
            return Err(App::delivery(
                token,
                format!("no polybar ipc file in {}", self.dir.display()),
            ));
        }
        let line = format!("action:{token}\n");
        let mut failure = None;
        for path in paths {
            debug!("Writing '{token}' to {}", path.display());
            let written =
                tokio::time::timeout(IPC_WRITE_TIMEOUT, write_action(&path, line.as_bytes()))
                    .await
                    .unwrap_or_else(|_| {
                        Err(io::Error::new(io::ErrorKind::TimedOut, "polybar is not reading"))
                    });
            if let Err(e) = written {
                warn!("Could not write '{token}' to {}: {e}", path.display());
                if failure.is_none() {
                    failure = Some(format!("{}: {e}", path.display()));
                }
            }
        }
        match failure {
            Some(reason) => Err(App::delivery(token, reason)),
            None => Ok(()),
        }
    }
}

/// Writes one complete action line. Polybar's queues are fifos; opening one
/// that has no reader left fails with ENXIO instead of waiting for a reader.
/// Returns only once the bytes have reached the file.
async fn write_action(path: &Path, line: &[u8]) -> io::Result<()> {
    let metadata = tokio::fs::metadata(path).await?;
    if metadata.file_type().is_fifo() {
        let mut sender = pipe::OpenOptions::new().open_sender(path)?;
        sender.write_all(line).await?;
        sender.flush().await
    } else {
        let mut file = OpenOptions::new().append(true).open(path).await?;
        file.write_all(line).await?;
        file.flush().await
    }
}

/// The sink selected in the config file.
#[derive(Debug, Clone)]
pub enum PolybarSink {
    Msg(PolybarMsgSink),
    IpcFile(IpcFileSink),
}

impl PolybarSink {
    pub fn from_config(config: &SinkConfig) -> Self {
        match config.kind {
            SinkKind::PolybarMsg => PolybarSink::Msg(PolybarMsgSink::default()),
            SinkKind::IpcFile => PolybarSink::IpcFile(IpcFileSink::new(config.ipc_dir.clone())),
        }
    }
}

impl Sink for PolybarSink {
    async fn send(&mut self, token: &str) -> Result<(), App> {
        match self {
            PolybarSink::Msg(sink) => sink.send(token).await,
            PolybarSink::IpcFile(sink) => sink.send(token).await,
        }
    }
}

/// Sends `tokens` one at a time, in order, pausing `delay` between them.
/// Stops at the first token that cannot be delivered.
pub async fn deliver<S: Sink>(sink: &mut S, tokens: &[&str], delay: Duration) -> Result<(), App> {
    for (index, token) in tokens.iter().enumerate() {
        if index > 0 {
            tokio::time::sleep(delay).await;
        }
        if let Err(e) = sink.send(token).await {
            warn!("Signal delivery stopped after {index} of {} tokens", tokens.len());
            return Err(e);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        sent: Vec<String>,
        fail_on: Option<&'static str>,
    }

    impl Sink for Recorder {
        async fn send(&mut self, token: &str) -> Result<(), App> {
            if self.fail_on == Some(token) {
                return Err(App::delivery(token, "unavailable"));
            }
            self.sent.push(token.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn delivers_in_order() {
        let mut sink = Recorder::default();
        deliver(&mut sink, &["a", "b", "c"], Duration::ZERO).await.unwrap();
        assert_eq!(sink.sent, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn stops_at_first_failure() {
        let mut sink = Recorder {
            fail_on: Some("b"),
            ..Recorder::default()
        };
        let err = deliver(&mut sink, &["a", "b", "c"], Duration::ZERO)
            .await
            .unwrap_err();
        assert!(matches!(err, App::SinkDelivery { ref token, .. } if token == "b"));
        assert_eq!(sink.sent, vec!["a"]);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_between_tokens() {
        let mut sink = Recorder::default();
        let started = tokio::time::Instant::now();
        deliver(&mut sink, &["a", "b", "c"], Duration::from_millis(10))
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_millis(20));
        assert_eq!(sink.sent.len(), 3);
    }

    #[tokio::test]
    async fn failing_program_is_a_delivery_error() {
        let mut sink = PolybarMsgSink::new("false");
        let err = sink.send("#spotify.hook.0").await.unwrap_err();
        assert!(matches!(err, App::SinkDelivery { .. }));

        let mut sink = PolybarMsgSink::new("spotify-polybar-no-such-program");
        assert!(sink.send("#spotify.hook.0").await.is_err());

        let mut sink = PolybarMsgSink::new("true");
        sink.send("#spotify.hook.0").await.unwrap();
    }

    #[tokio::test]
    async fn ipc_files_receive_actions() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("polybar_mqueue.100");
        let second = dir.path().join("polybar_mqueue.200");
        std::fs::write(&first, "").unwrap();
        std::fs::write(&second, "").unwrap();
        std::fs::write(dir.path().join("unrelated"), "").unwrap();

        let mut sink = IpcFileSink::new(dir.path());
        sink.send("#next.hook.1").await.unwrap();
        sink.send("#next.hook.0").await.unwrap();

        for path in [&first, &second] {
            assert_eq!(
                std::fs::read_to_string(path).unwrap(),
                "action:#next.hook.1\naction:#next.hook.0\n"
            );
        }
        assert_eq!(
            std::fs::read_to_string(dir.path().join("unrelated")).unwrap(),
            ""
        );
    }

    #[tokio::test]
    async fn no_ipc_file_is_a_delivery_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = IpcFileSink::new(dir.path());
        let err = sink.send("#next.hook.1").await.unwrap_err();
        assert!(matches!(err, App::SinkDelivery { .. }));
    }

    fn make_fifo(path: &Path) {
        let status = std::process::Command::new("mkfifo").arg(path).status().unwrap();
        assert!(status.success());
    }

    #[tokio::test]
    async fn stale_fifo_fails_fast_and_live_files_still_get_the_action() {
        let dir = tempfile::tempdir().unwrap();
        let stale = dir.path().join("polybar_mqueue.99999");
        let live = dir.path().join("polybar_mqueue.100");
        make_fifo(&stale);
        std::fs::write(&live, "").unwrap();

        let mut sink = IpcFileSink::new(dir.path());
        let sent = tokio::time::timeout(Duration::from_secs(3), sink.send("#spotify.hook.1"))
            .await
            .expect("send must not wait for a reader");
        let err = sent.unwrap_err();
        assert!(
            matches!(err, App::SinkDelivery { ref reason, .. } if reason.contains("polybar_mqueue.99999"))
        );
        assert_eq!(
            std::fs::read_to_string(&live).unwrap(),
            "action:#spotify.hook.1\n"
        );
    }

    #[tokio::test]
    async fn fifo_with_reader_receives_the_action() {
        use tokio::io::AsyncReadExt;

        let dir = tempfile::tempdir().unwrap();
        let queue = dir.path().join("polybar_mqueue.4242");
        make_fifo(&queue);
        let mut receiver = pipe::OpenOptions::new().open_receiver(&queue).unwrap();

        let mut sink = IpcFileSink::new(dir.path());
        sink.send("#playpause.hook.2").await.unwrap();

        let mut received = String::new();
        tokio::time::timeout(Duration::from_secs(3), receiver.read_to_string(&mut received))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(received, "action:#playpause.hook.2\n");
    }
}
