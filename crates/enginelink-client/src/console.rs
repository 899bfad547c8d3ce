//! Interactive console commands.
//!
//! One command per line. A leading `@N` sends the command to session N
//! (1-based) only; otherwise it goes to every session.

use enginelink_protocol::DirectoryType;

use crate::error::{ClientError, ClientResult};
use crate::files::FileStore;
use crate::session::{MoveDirection, Session};
use crate::transport::Transport;

/// Usage shown by `help`.
pub const HELP: &str = "\
commands:
  open                          connect (or reconnect)
  close                         disconnect
  screenshot [interval]         capture once, or every <interval> seconds
  stop                          stop automatic capture
  files <dir> [path]            list a remote directory
  download <dir> <path>         fetch a remote file into the download directory
  upload <dir> <local-path>     send a local file
  text <words..>                send free text
  bind <name>                   bind a game object for move commands
  move up|down|left|right       nudge the bound game object
  help                          show this help
  quit                          exit
dirs: data, streaming-assets, persistent-data, temporary-cache
prefix a command with @N to target session N only";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Open,
    Close,
    ScreenShot { interval: Option<f32> },
    Stop,
    Files {
        directory: DirectoryType,
        path: String,
    },
    Download {
        directory: DirectoryType,
        path: String,
    },
    Upload {
        directory: DirectoryType,
        path: String,
    },
    Text(String),
    Bind(String),
    Move(MoveDirection),
    Help,
    Quit,
}

/// A parsed console line.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// Zero-based session index, if the line targets one session.
    pub target: Option<usize>,
    pub command: Command,
}

/// Parses one line. Blank lines yield `None`.
pub fn parse_line(input: &str) -> ClientResult<Option<Line>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }

    let (target, rest) = match input.strip_prefix('@') {
        Some(tagged) => {
            let (index, rest) = split_word(tagged);
            let index: usize = index
                .parse()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| invalid(format!("bad session number: @{}", index)))?;
            (Some(index - 1), rest.trim_start())
        }
        None => (None, input),
    };

    let (word, args) = split_word(rest);
    let args = args.trim();
    let command = match word {
        "open" => Command::Open,
        "close" => Command::Close,
        "screenshot" => Command::ScreenShot {
            interval: parse_interval(args)?,
        },
        "stop" => Command::Stop,
        "files" => {
            let (directory, path) = directory_and_path(args, false)?;
            Command::Files { directory, path }
        }
        "download" => {
            let (directory, path) = directory_and_path(args, true)?;
            Command::Download { directory, path }
        }
        "upload" => {
            let (directory, path) = directory_and_path(args, true)?;
            Command::Upload { directory, path }
        }
        "text" => Command::Text(args.to_string()),
        "bind" => Command::Bind(args.to_string()),
        "move" => Command::Move(parse_direction(args)?),
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        "" => return Err(invalid("missing command")),
        other => return Err(invalid(format!("unknown command: {}", other))),
    };
    Ok(Some(Line { target, command }))
}

fn split_word(text: &str) -> (&str, &str) {
    text.split_once(char::is_whitespace).unwrap_or((text, ""))
}

fn invalid(msg: impl Into<String>) -> ClientError {
    ClientError::InvalidCommand(msg.into())
}

fn parse_interval(args: &str) -> ClientResult<Option<f32>> {
    if args.is_empty() {
        return Ok(None);
    }
    match args.parse::<f32>() {
        Ok(seconds) if seconds > 0.0 && seconds.is_finite() => Ok(Some(seconds)),
        _ => {
            let reason = format!("interval must be a positive number of seconds: {args}");
            Err(invalid(reason))
        }
    }
}

fn directory_and_path(args: &str, path_required: bool) -> ClientResult<(DirectoryType, String)> {
    let (name, path) = split_word(args);
    if name.is_empty() {
        return Err(invalid("missing directory type"));
    }
    let directory = DirectoryType::from_name(name)
        .ok_or_else(|| invalid(format!("unknown directory type: {}", name)))?;
    let path = path.trim();
    if path_required && path.is_empty() {
        return Err(invalid("missing path"));
    }
    Ok((directory, path.to_string()))
}

fn parse_direction(args: &str) -> ClientResult<MoveDirection> {
    match args {
        "up" => Ok(MoveDirection::Up),
        "down" => Ok(MoveDirection::Down),
        "left" => Ok(MoveDirection::Left),
        "right" => Ok(MoveDirection::Right),
        other => {
            let reason = format!("move expects up, down, left or right: {other}");
            Err(invalid(reason))
        }
    }
}

/// Runs a session-level command. Returns `false` if nothing was sent.
///
/// `Help` and `Quit` belong to the console itself and are no-ops here.
pub fn execute<T: Transport, F: FileStore>(session: &mut Session<T, F>, command: &Command) -> bool {
    match command {
        Command::Open => {
            session.open();
            true
        }
        Command::Close => {
            session.close();
            true
        }
        Command::ScreenShot { interval } => session.request_screenshot(*interval),
        Command::Stop => session.stop_screenshots(),
        Command::Files { directory, path } => session.request_file_list(*directory, path),
        Command::Download { directory, path } => session.download(*directory, path),
        Command::Upload { directory, path } => session.upload(*directory, path),
        Command::Text(text) => session.send_text(text),
        Command::Bind(name) => session.bind_game_object(name),
        Command::Move(direction) => session.move_game_object(*direction),
        Command::Help | Command::Quit => false,
    }
}
