//! `connect`: drive one session per endpoint from an interactive console.

use std::io::{BufRead, BufReader, IsTerminal, Write};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use url::Url;

use enginelink_core::{LogHub, LogLine, LogSink};
use enginelink_protocol::RequestIds;

use crate::config::ClientConfig;
use crate::console::{self, Command, HELP};
use crate::error::ClientResult;
use crate::files::LocalFileStore;
use crate::identity;
use crate::session::{Session, SessionEvent};
use crate::websocket::WebSocketTransport;

/// Prints hub lines to stdout, colored when stdout is a terminal.
struct ConsoleSink {
    color: bool,
}

impl ConsoleSink {
    fn new() -> Self {
        Self {
            color: std::io::stdout().is_terminal(),
        }
    }
}

impl LogSink for ConsoleSink {
    fn receive(&self, line: &LogLine) {
        let mut stdout = std::io::stdout().lock();
        let _ = if self.color {
            let enginelink_core::Rgb(r, g, b) = line.color;
            writeln!(stdout, "\x1b[38;2;{r};{g};{b}m{}\x1b[0m", line.text)
        } else {
            writeln!(stdout, "{}", line.text)
        };
    }
}

struct Worker {
    label: String,
    commands: mpsc::UnboundedSender<Command>,
    task: JoinHandle<()>,
}

/// Resolves the endpoints to connect to.
pub fn endpoints(config: &ClientConfig, requested: &[String]) -> ClientResult<Vec<Url>> {
    if requested.is_empty() {
        return Ok(vec![config.connection.url()?]);
    }
    requested.iter().map(|e| config.connection.url_for(e)).collect()
}

fn label(url: &Url) -> String {
    match url.port() {
        Some(port) => format!("{}:{}", url.host_str().unwrap_or_default(), port),
        None => url.host_str().unwrap_or_default().to_string(),
    }
}

/// Forwards lines from `reader` on a plain thread. The channel closes at
/// end of input; a read that never returns leaves the thread behind
/// without holding up process exit.
fn spawn_line_reader<R>(reader: R) -> mpsc::UnboundedReceiver<String>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    debug!(error = %e, "input closed");
                    break;
                }
            };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

pub async fn run(config: &ClientConfig, requested: &[String]) -> ClientResult<()> {
    config.validate()?;
    let urls = endpoints(config, requested)?;

    let hub = LogHub::new();
    let console_sink = hub.subscribe(Arc::new(ConsoleSink::new()));
    let ids = Arc::new(RequestIds::new());
    let me = identity::local_identity(&config.identity);
    debug!(identity = %identity::describe(&me), "local identity");

    let workers: Vec<Worker> = urls
        .into_iter()
        .map(|url| {
            let label = label(&url);
            let log = hub.scoped(label.clone());
            let session = Session::new(
                url,
                WebSocketTransport::new(),
                LocalFileStore,
                Arc::clone(&ids),
                log.clone(),
            )
            .with_identity(me.clone())
            .with_codec(config.transfer.codec())
            .with_download_dir(config.transfer.download_dir());
            let (tx, rx) = mpsc::unbounded_channel();
            Worker {
                label,
                commands: tx,
                task: tokio::spawn(drive(session, rx, log)),
            }
        })
        .collect();

    if workers.len() > 1 {
        for (index, worker) in workers.iter().enumerate() {
            hub.plain(format!("@{} {}", index + 1, worker.label));
        }
    }
    hub.plain("type 'help' for commands");

    let mut lines = spawn_line_reader(BufReader::new(std::io::stdin()));
    loop {
        let line = tokio::select! {
            line = lines.recv() => line,
            _ = tokio::signal::ctrl_c() => break,
        };
        let Some(line) = line else { break };
        let parsed = match console::parse_line(&line) {
            Ok(Some(parsed)) => parsed,
            Ok(None) => continue,
            Err(e) => {
                hub.error(e.to_string());
                continue;
            }
        };
        match parsed.command {
            Command::Quit => break,
            Command::Help => {
                HELP.lines().for_each(|l| hub.plain(l));
                continue;
            }
            _ => {}
        }
        let targets: Vec<&Worker> = match parsed.target {
            Some(index) => match workers.get(index) {
                Some(worker) => vec![worker],
                None => {
                    hub.error(format!("no session @{}", index + 1));
                    continue;
                }
            },
            None => workers.iter().collect(),
        };
        for worker in targets {
            if worker.commands.send(parsed.command.clone()).is_err() {
                warn!(session = %worker.label, "session task has stopped");
            }
        }
    }

    for worker in workers {
        drop(worker.commands);
        if let Err(e) = worker.task.await {
            warn!(session = %worker.label, error = %e, "session task failed");
        }
    }
    hub.unsubscribe(console_sink);
    Ok(())
}

async fn drive(
    mut session: Session<WebSocketTransport, LocalFileStore>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    log: LogHub,
) {
    session.open();
    loop {
        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else { break };
                if !console::execute(&mut session, &command) {
                    let state = session.state();
                    log.warning(format!("not sent: {} ({state})", name(&command)));
                }
            }
            Some(event) = session.next_event() => report(&log, &event),
        }
    }
    session.close();
}

fn report(log: &LogHub, event: &SessionEvent) {
    if let SessionEvent::ScreenShot(shot) = event {
        log.plain(format!(
            "screenshot: {} bytes at {}",
            shot.image_data.len(),
            shot.date_time
        ));
    }
}

fn name(command: &Command) -> &'static str {
    match command {
        Command::Open => "open",
        Command::Close => "close",
        Command::ScreenShot { .. } => "screenshot",
        Command::Stop => "stop",
        Command::Files { .. } => "files",
        Command::Download { .. } => "download",
        Command::Upload { .. } => "upload",
        Command::Text(_) => "text",
        Command::Bind(_) => "bind",
        Command::Move(_) => "move",
        Command::Help => "help",
        Command::Quit => "quit",
    }
}
