//! One connection to one engine.
//!
//! A [`Session`] owns its transport and processes transport events one
//! at a time through [`Session::handle`]. On connect it queries the
//! engine's identity and pushes its own; afterwards every decoded text
//! frame is routed to the handler for its variant. Nothing that arrives
//! can fail the session: undecodable frames are dropped and logged.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};
use url::Url;

use enginelink_core::LogHub;
use enginelink_protocol::{
    ConnectGameObjectRequest, ConnectionInformation, DirectoryType, FileList, FileListRequest,
    FileMessage, FileUploadRequest, LogMessage, LogType, Message, MessageCodec, MoveGameObject,
    RequestIds, RequestMessage, ScreenShot, ScreenShotRequest, TextMessage,
};

use crate::correlation::{PendingRequests, download_file_name};
use crate::error::ClientError;
use crate::files::FileStore;
use crate::identity;
use crate::transport::{ConnectionState, Transport, TransportEvent};

/// Distance a bound object moves per step.
pub const MOVE_STEP: f32 = 0.1;

/// Direction for [`Session::move_game_object`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
    Left,
    Right,
}

impl MoveDirection {
    /// `(x, y)` offset of one step.
    pub fn offset(self) -> (f32, f32) {
        match self {
            Self::Up => (0.0, MOVE_STEP),
            Self::Down => (0.0, -MOVE_STEP),
            Self::Left => (-MOVE_STEP, 0.0),
            Self::Right => (MOVE_STEP, 0.0),
        }
    }
}

/// What a handled transport event meant for the application.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Connected,
    Disconnected,
    RemoteLog(LogMessage),
    RemoteInfo(ConnectionInformation),
    FileList(FileList),
    FileReceived { request_id: i32, path: PathBuf },
    ScreenShot(ScreenShot),
}

/// A connection to one engine endpoint.
pub struct Session<T, F> {
    url: Url,
    transport: T,
    files: F,
    codec: MessageCodec,
    ids: Arc<RequestIds>,
    identity: ConnectionInformation,
    download_dir: PathBuf,
    log: LogHub,
    state: ConnectionState,
    announced: bool,
    pending: PendingRequests,
    remote: Option<ConnectionInformation>,
    manipulate_target: Option<i32>,
}

impl<T: Transport, F: FileStore> Session<T, F> {
    pub fn new(url: Url, transport: T, files: F, ids: Arc<RequestIds>, log: LogHub) -> Self {
        Self {
            url,
            transport,
            files,
            codec: MessageCodec::new(),
            ids,
            identity: ConnectionInformation::default(),
            download_dir: PathBuf::from("."),
            log,
            state: ConnectionState::Disconnected,
            announced: false,
            pending: PendingRequests::new(),
            remote: None,
            manipulate_target: None,
        }
    }

    /// Identity pushed to the engine on connect.
    #[must_use]
    pub fn with_identity(mut self, identity: ConnectionInformation) -> Self {
        self.identity = identity;
        self
    }

    #[must_use]
    pub fn with_codec(mut self, codec: MessageCodec) -> Self {
        self.codec = codec;
        self
    }

    /// Directory received files are written to.
    #[must_use]
    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected && self.transport.is_open()
    }

    /// Identity reported by the engine, once it has answered.
    pub fn remote(&self) -> Option<&ConnectionInformation> {
        self.remote.as_ref()
    }

    pub fn pending_downloads(&self) -> usize {
        self.pending.len()
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Starts connecting, dropping any previous connection first.
    pub fn open(&mut self) {
        self.close();
        debug!(url = %self.url, "opening session");
        self.transport.open(&self.url);
    }

    /// Closes the connection. Safe to call any number of times.
    pub fn close(&mut self) {
        self.transport.close();
        self.on_disconnected();
    }

    /// Waits for the next transport event that means something to the
    /// application.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        loop {
            let event = self.transport.next_event().await?;
            if let Some(event) = self.handle(event) {
                return Some(event);
            }
        }
    }

    /// Applies one transport event.
    pub fn handle(&mut self, event: TransportEvent) -> Option<SessionEvent> {
        match event {
            TransportEvent::StateChanged(state) => {
                self.log.info(format!("state changed: {}", state));
                if state == ConnectionState::Connecting {
                    self.log.info(format!("connecting: {}", self.endpoint()));
                }
                self.state = state;
                None
            }
            TransportEvent::Connected => {
                self.state = ConnectionState::Connected;
                self.announced = true;
                info!(url = %self.url, "session connected");
                self.log.info(format!("WebSocket connected: {}", self.endpoint()));
                let query: Message = RequestMessage::connection_information(&self.ids).into();
                self.send(&query);
                let identity: Message = self.identity.clone().into();
                self.send(&identity);
                Some(SessionEvent::Connected)
            }
            TransportEvent::AboutToClose => {
                self.state = ConnectionState::Closing;
                debug!(url = %self.url, "connection about to close");
                None
            }
            TransportEvent::Disconnected => {
                let was_announced = self.announced;
                self.on_disconnected();
                was_announced.then_some(SessionEvent::Disconnected)
            }
            TransportEvent::Error(detail) => {
                let err = ClientError::Transport(detail);
                debug!(url = %self.url, error = %err, "socket error");
                self.log.error(err.to_string());
                None
            }
            TransportEvent::Text(text) => match self.codec.decode(&text) {
                Ok(message) => self.dispatch(message),
                Err(e) => {
                    debug!(url = %self.url, error = %e, "dropping undecodable message");
                    self.log.error(format!("dropped message: {}", e));
                    None
                }
            },
            TransportEvent::Binary(data) => {
                self.log.error(format!(
                    "binary message received but not supported (length={})",
                    data.len()
                ));
                None
            }
        }
    }

    fn on_disconnected(&mut self) {
        self.state = ConnectionState::Disconnected;
        let discarded = self.pending.clear();
        if discarded > 0 {
            warn!(url = %self.url, discarded, "discarding unanswered downloads");
        }
        if self.announced {
            self.announced = false;
            info!(url = %self.url, "session disconnected");
            self.log.info(format!("WebSocket disconnected: {}", self.endpoint()));
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "address={}, port={}",
            self.url.host_str().unwrap_or_default(),
            self.url.port_or_known_default().unwrap_or_default()
        )
    }

    fn dispatch(&mut self, message: Message) -> Option<SessionEvent> {
        match message {
            Message::Log(log) => Some(self.on_log(log)),
            Message::ConnectionInformation(info) => Some(self.on_connection_information(info)),
            Message::FileList(list) => Some(self.on_file_list(list)),
            Message::File(file) => self.on_file(file),
            Message::ScreenShot(shot) => Some(SessionEvent::ScreenShot(shot)),
            other => {
                let reason = format!("unknown text message received: {}", other.type_key());
                self.log.error(reason);
                None
            }
        }
    }

    fn on_log(&self, entry: LogMessage) -> SessionEvent {
        let line = format!("[{}] {}", entry.time, entry.text);
        match entry.log_type {
            LogType::Log => self.log.info(line),
            LogType::Warning => self.log.warning(line),
            LogType::Error | LogType::Exception => self.log.error(line),
            LogType::Assert | LogType::Invalid | LogType::Other(_) => self.log.plain(line),
        }
        SessionEvent::RemoteLog(entry)
    }

    fn on_connection_information(&mut self, info: ConnectionInformation) -> SessionEvent {
        self.log.info(format!("connected to {}", identity::describe(&info)));
        self.remote = Some(info.clone());
        SessionEvent::RemoteInfo(info)
    }

    fn on_file_list(&self, list: FileList) -> SessionEvent {
        self.log.info(format!("file list: directory={}", list.directory));
        self.log.info(format!("directories: {}", list.directories.len()));
        for (index, directory) in list.directories.iter().enumerate() {
            self.log.info(format!("  [{}] {}", index, directory));
        }
        self.log.info(format!("files: {}", list.files.len()));
        for (index, file) in list.files.iter().enumerate() {
            self.log.info(format!("  [{}] {}", index, file));
        }
        SessionEvent::FileList(list)
    }

    fn on_file(&mut self, file: FileMessage) -> Option<SessionEvent> {
        let Some(remote_path) = self.pending.resolve(file.request_id) else {
            let err = ClientError::UnmatchedRequestId(file.request_id);
            debug!(url = %self.url, request_id = file.request_id, "unmatched file reply");
            self.log.error(err.to_string());
            return None;
        };

        let path = self
            .download_dir
            .join(download_file_name(&remote_path, file.request_id));
        if let Err(e) = self.files.write_file(&path, &file.data) {
            self.log
                .error(format!("failed to write {}: {}", path.display(), e));
            return None;
        }
        self.log.info(format!("file received: {}", path.display()));
        Some(SessionEvent::FileReceived {
            request_id: file.request_id,
            path,
        })
    }

    /// Encodes and sends one message. Fails fast when not connected.
    pub fn send(&mut self, message: &Message) -> bool {
        if !self.transport.is_open() {
            let err = ClientError::TransportNotOpen;
            debug!(url = %self.url, type_key = message.type_key(), error = %err, "send skipped");
            return false;
        }
        match self.codec.encode(message) {
            Ok(text) => self.transport.send_text(text),
            Err(e) => {
                self.log
                    .error(format!("failed to encode {}: {}", message.type_key(), e));
                false
            }
        }
    }

    /// Captures once, or every `interval` seconds.
    pub fn request_screenshot(&mut self, interval: Option<f32>) -> bool {
        let request = ScreenShotRequest::start(&self.ids, interval);
        self.send(&request.into())
    }

    pub fn stop_screenshots(&mut self) -> bool {
        let request = ScreenShotRequest::stop(&self.ids);
        self.send(&request.into())
    }

    pub fn request_file_list(&mut self, directory: DirectoryType, path: &str) -> bool {
        let request = FileListRequest::new(&self.ids, directory, normalize(path));
        self.send(&request.into())
    }

    /// Asks the engine for one of its files and remembers where the
    /// reply should go.
    pub fn download(&mut self, directory: DirectoryType, path: &str) -> bool {
        let path = normalize(path);
        if path.is_empty() {
            self.log
                .warning("specify the file relative to the chosen directory type");
            return false;
        }
        let request = FileUploadRequest::new(&self.ids, directory, path.clone());
        let request_id = request.request_id();
        let sent = self.send(&request.into());
        if sent {
            self.pending.insert(request_id, path);
        }
        sent
    }

    /// Pushes a local file to the engine.
    pub fn upload(&mut self, directory: DirectoryType, local_path: &str) -> bool {
        let local_path = normalize(local_path);
        if local_path.is_empty() {
            self.log.warning("specify the file as a full local path");
            return false;
        }
        if !self.files.exists(Path::new(&local_path)) {
            self.log.error(format!(
                "{} does not exist or is not accessible",
                local_path
            ));
            self.log.warning("specify the file as a full local path");
            return false;
        }
        let data = match self.files.read_file(Path::new(&local_path)) {
            Ok(data) => data,
            Err(e) => {
                self.log
                    .error(format!("failed to read {}: {}", local_path, e));
                return false;
            }
        };
        let message: Message = FileMessage::unsolicited(directory, local_path, data).into();
        self.send(&message)
    }

    pub fn send_text(&mut self, text: &str) -> bool {
        if text.is_empty() {
            self.log.warning("enter the text to send");
            return false;
        }
        self.send(&TextMessage::new(text).into())
    }

    /// Binds a scene object by name; later moves target it.
    pub fn bind_game_object(&mut self, name: &str) -> bool {
        if name.is_empty() {
            self.log.warning("enter the name of the game object to bind");
            return false;
        }
        let request = ConnectGameObjectRequest::new(&self.ids, name);
        let request_id = request.request_id();
        let sent = self.send(&request.into());
        if sent {
            self.manipulate_target = Some(request_id);
        }
        sent
    }

    pub fn move_game_object(&mut self, direction: MoveDirection) -> bool {
        let Some(target) = self.manipulate_target else {
            self.log.warning("no game object bound; bind one first");
            return false;
        };
        let (x, y) = direction.offset();
        self.send(
            &MoveGameObject {
                manipulate_target: target,
                x,
                y,
                z: 0.0,
            }
            .into(),
        )
    }
}

fn normalize(path: &str) -> String {
    path.trim().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    use enginelink_core::{LogLevel, LogLine, LogSink};
    use enginelink_protocol::{ImageData, Registry, SocketMessage};

    #[derive(Default)]
    struct FakeTransport {
        open: bool,
        opened: Vec<Url>,
        closes: usize,
        sent: Vec<String>,
        queued: VecDeque<TransportEvent>,
    }

    impl Transport for FakeTransport {
        fn open(&mut self, url: &Url) {
            self.opened.push(url.clone());
        }

        fn close(&mut self) {
            self.open = false;
            self.closes += 1;
        }

        fn is_open(&self) -> bool {
            self.open
        }

        fn send_text(&mut self, text: String) -> bool {
            if !self.open {
                return false;
            }
            self.sent.push(text);
            true
        }

        async fn next_event(&mut self) -> Option<TransportEvent> {
            self.queued.pop_front()
        }
    }

    #[derive(Clone, Default)]
    struct MemoryFiles(Arc<Mutex<HashMap<PathBuf, Vec<u8>>>>);

    impl MemoryFiles {
        fn get(&self, path: &Path) -> Option<Vec<u8>> {
            self.0.lock().unwrap().get(path).cloned()
        }

        fn count(&self) -> usize {
            self.0.lock().unwrap().len()
        }
    }

    impl FileStore for MemoryFiles {
        fn read_file(&self, path: &Path) -> std::io::Result<Vec<u8>> {
            self.get(path)
                .ok_or_else(|| std::io::Error::from(std::io::ErrorKind::NotFound))
        }

        fn write_file(&self, path: &Path, data: &[u8]) -> std::io::Result<()> {
            self.0
                .lock()
                .unwrap()
                .insert(path.to_path_buf(), data.to_vec());
            Ok(())
        }

        fn exists(&self, path: &Path) -> bool {
            self.0.lock().unwrap().contains_key(path)
        }
    }

    #[derive(Default)]
    struct Lines(Mutex<Vec<(LogLevel, String)>>);

    impl Lines {
        fn texts(&self) -> Vec<String> {
            self.0
                .lock()
                .unwrap()
                .iter()
                .map(|(_, t)| t.clone())
                .collect()
        }

        fn at(&self, level: LogLevel) -> Vec<String> {
            self.0
                .lock()
                .unwrap()
                .iter()
                .filter(|(l, _)| *l == level)
                .map(|(_, t)| t.clone())
                .collect()
        }
    }

    impl LogSink for Lines {
        fn receive(&self, line: &LogLine) {
            self.0.lock().unwrap().push((line.level, line.text.clone()));
        }
    }

    struct Harness {
        session: Session<FakeTransport, MemoryFiles>,
        files: MemoryFiles,
        lines: Arc<Lines>,
    }

    fn harness() -> Harness {
        let hub = LogHub::new();
        let lines = Arc::new(Lines::default());
        hub.subscribe(lines.clone());
        let files = MemoryFiles::default();
        let identity = ConnectionInformation {
            application_name: "enginelink".into(),
            uuid: "uuid-1".into(),
            device_name: "bench".into(),
            device_model: "linux/x86_64".into(),
            ..ConnectionInformation::default()
        };
        let session = Session::new(
            Url::parse("ws://127.0.0.1:5637/WebSocketApp/takahashi_kenji").unwrap(),
            FakeTransport::default(),
            files.clone(),
            Arc::new(RequestIds::new()),
            hub,
        )
        .with_identity(identity)
        .with_download_dir("/downloads");
        Harness {
            session,
            files,
            lines,
        }
    }

    fn connected() -> Harness {
        let mut h = harness();
        h.session.open();
        h.session.transport.open = true;
        h.session.handle(TransportEvent::Connected);
        h.session.transport.sent.clear();
        h
    }

    fn engine_codec() -> MessageCodec {
        MessageCodec::new().with_registry(Registry::Engine)
    }

    fn sent(h: &Harness) -> Vec<Message> {
        h.session
            .transport
            .sent
            .iter()
            .map(|text| engine_codec().decode(text).unwrap())
            .collect()
    }

    fn incoming(message: impl Into<Message>) -> TransportEvent {
        let text = MessageCodec::new()
            .with_registry(Registry::All)
            .encode(&message.into())
            .unwrap();
        TransportEvent::Text(text)
    }

    #[test]
    fn connect_runs_the_handshake() {
        let mut h = harness();
        h.session.open();
        h.session.transport.open = true;

        assert_eq!(
            h.session.handle(TransportEvent::Connected),
            Some(SessionEvent::Connected)
        );
        assert!(h.session.is_connected());

        let sent = sent(&h);
        assert_eq!(sent.len(), 2);
        let Message::Request(query) = &sent[0] else {
            panic!("expected a request, got {:?}", sent[0]);
        };
        assert_eq!(query.header.request, "SocketConnectionInformationMessage");
        assert_eq!(query.request_id(), 0);
        let Message::ConnectionInformation(me) = &sent[1] else {
            panic!("expected identity, got {:?}", sent[1]);
        };
        assert_eq!(me.request_id, -1);
        assert_eq!(me.device_name, "bench");
    }

    #[test]
    fn send_fails_fast_when_not_open() {
        let mut h = harness();
        assert!(!h.session.send_text("hello"));
        assert!(!h.session.request_screenshot(None));
        assert!(h.session.transport.sent.is_empty());
    }

    #[test]
    fn remote_logs_map_to_levels() {
        let mut h = connected();
        let event = h.session.handle(incoming(LogMessage {
            log_type: LogType::Warning,
            time: "12:00:00".into(),
            text: "hello".into(),
            stack_trace: String::new(),
        }));

        assert!(matches!(event, Some(SessionEvent::RemoteLog(_))));
        assert_eq!(h.lines.at(LogLevel::Warning), vec!["[12:00:00] hello"]);

        h.session.handle(incoming(LogMessage {
            log_type: LogType::Exception,
            time: "12:00:01".into(),
            text: "boom".into(),
            stack_trace: "at Main()".into(),
        }));
        assert_eq!(h.lines.at(LogLevel::Error), vec!["[12:00:01] boom"]);
    }

    #[test]
    fn download_reply_lands_in_download_dir() {
        let mut h = connected();
        let remote = "save\\slot1\\game.dat";
        assert!(h.session.download(DirectoryType::PersistentData, remote));

        let Message::FileUploadRequest(request) = &sent(&h)[0] else {
            panic!("expected a file upload request");
        };
        assert_eq!(request.target_path, "save/slot1/game.dat");
        assert_eq!(request.directory_type, DirectoryType::PersistentData);
        assert_eq!(h.session.pending_downloads(), 1);

        let reply = FileMessage {
            request_id: request.request_id(),
            directory_type: DirectoryType::PersistentData,
            target_path: "save/slot1/game.dat".into(),
            data: b"saved".to_vec(),
        };
        let event = h.session.handle(incoming(reply));

        let expected = PathBuf::from("/downloads/game.dat");
        assert_eq!(
            event,
            Some(SessionEvent::FileReceived {
                request_id: request.request_id(),
                path: expected.clone(),
            })
        );
        assert_eq!(h.files.get(&expected).as_deref(), Some(&b"saved"[..]));
        assert_eq!(h.session.pending_downloads(), 0);
    }

    #[test]
    fn unmatched_file_reply_writes_nothing() {
        let mut h = connected();
        let event = h.session.handle(incoming(FileMessage {
            request_id: 99,
            directory_type: DirectoryType::Data,
            target_path: "x.txt".into(),
            data: b"x".to_vec(),
        }));

        assert_eq!(event, None);
        assert_eq!(h.files.count(), 0);
        let errors = h.lines.at(LogLevel::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("RequestID=99"), "{errors:?}");
    }

    #[test]
    fn empty_download_path_is_rejected() {
        let mut h = connected();
        assert!(!h.session.download(DirectoryType::Data, "  "));
        assert!(h.session.transport.sent.is_empty());
        assert_eq!(h.lines.at(LogLevel::Warning).len(), 1);
    }

    #[test]
    fn about_to_close_marks_the_session_closing() {
        let mut h = connected();
        assert_eq!(h.session.handle(TransportEvent::AboutToClose), None);
        assert_eq!(h.session.state(), ConnectionState::Closing);
        assert!(h.lines.at(LogLevel::Error).is_empty());
    }

    #[test]
    fn transport_errors_are_logged_once() {
        let mut h = connected();
        let event = h.session.handle(TransportEvent::Error("boom".into()));
        assert_eq!(event, None);
        let errors = h.lines.at(LogLevel::Error);
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert!(errors[0].contains("boom"), "{errors:?}");
        assert_eq!(h.session.state(), ConnectionState::Connected);
        assert!(h.session.is_connected());
    }

    #[test]
    fn binary_frames_are_reported_not_parsed() {
        let mut h = connected();
        let event = h.session.handle(TransportEvent::Binary(vec![1, 2, 3]));
        assert_eq!(event, None);
        let errors = h.lines.at(LogLevel::Error);
        assert!(errors[0].contains("length=3"), "{errors:?}");
        assert_eq!(h.session.state(), ConnectionState::Connected);
    }

    #[test]
    fn bad_frames_are_dropped() {
        let mut h = connected();
        let garbage = TransportEvent::Text("garbage".into());
        assert_eq!(h.session.handle(garbage), None);
        let unknown = TransportEvent::Text("SocketMystery,-,e30=".into());
        assert_eq!(h.session.handle(unknown), None);
        assert_eq!(h.lines.at(LogLevel::Error).len(), 2);
        assert!(h.session.is_connected());
    }

    #[test]
    fn admitted_but_unhandled_variants_are_reported() {
        let mut h = connected();
        h.session.codec = MessageCodec::new().with_registry(Registry::All);
        assert_eq!(h.session.handle(incoming(ImageData::default())), None);
        let expected = format!("unknown text message received: {}", ImageData::TYPE_KEY);
        assert_eq!(h.lines.at(LogLevel::Error), vec![expected]);
    }

    #[test]
    fn remote_identity_is_remembered() {
        let mut h = connected();
        let info = ConnectionInformation {
            request_id: 0,
            application_name: "Game".into(),
            uuid: "u".into(),
            device_name: "Pixel".into(),
            device_model: "Pixel 7".into(),
        };
        let event = h.session.handle(incoming(info.clone()));
        assert_eq!(event, Some(SessionEvent::RemoteInfo(info.clone())));
        assert_eq!(h.session.remote(), Some(&info));
        let expected = "connected to device[Pixel(Pixel 7)] application[Game]".to_string();
        assert!(h.lines.texts().contains(&expected));
    }

    #[test]
    fn file_lists_are_logged_in_order() {
        let mut h = connected();
        let start = h.lines.texts().len();
        h.session.handle(incoming(FileList {
            request_id: 1,
            directory: "/data".into(),
            files: vec!["x.txt".into()],
            directories: vec!["a".into(), "b".into()],
        }));
        assert_eq!(
            h.lines.texts()[start..],
            [
                "file list: directory=/data",
                "directories: 2",
                "  [0] a",
                "  [1] b",
                "files: 1",
                "  [0] x.txt",
            ]
        );
    }

    #[test]
    fn disconnect_discards_pending_and_logs_once() {
        let mut h = connected();
        h.session.download(DirectoryType::Data, "a.txt");
        h.session.transport.open = false;

        assert_eq!(
            h.session.handle(TransportEvent::Disconnected),
            Some(SessionEvent::Disconnected)
        );
        assert_eq!(h.session.pending_downloads(), 0);
        assert_eq!(h.session.handle(TransportEvent::Disconnected), None);
        h.session.close();
        h.session.close();

        let disconnects = h
            .lines
            .texts()
            .iter()
            .filter(|t| t.starts_with("WebSocket disconnected"))
            .count();
        assert_eq!(disconnects, 1);
        assert_eq!(h.session.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn close_releases_the_transport() {
        let mut h = connected();
        h.session.close();
        assert!(!h.session.transport.open);
        assert!(!h.session.send_text("late"));
        h.session.close();
        assert_eq!(h.session.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn moves_need_a_bound_object() {
        let mut h = connected();
        assert!(!h.session.move_game_object(MoveDirection::Up));
        assert_eq!(h.lines.at(LogLevel::Warning).len(), 1);

        assert!(h.session.bind_game_object("Player"));
        assert!(h.session.move_game_object(MoveDirection::Left));

        let sent = sent(&h);
        let Message::ConnectGameObjectRequest(bind) = &sent[0] else {
            panic!("expected a bind request");
        };
        assert_eq!(bind.game_object_name, "Player");
        assert_eq!(
            sent[1],
            Message::MoveGameObject(MoveGameObject {
                manipulate_target: bind.request_id(),
                x: -MOVE_STEP,
                y: 0.0,
                z: 0.0,
            })
        );
    }

    #[test]
    fn screenshot_requests() {
        let mut h = connected();
        assert!(h.session.request_screenshot(Some(1.5)));
        assert!(h.session.stop_screenshots());

        let sent = sent(&h);
        let Message::ScreenShotRequest(start) = &sent[0] else {
            panic!("expected a screenshot request");
        };
        assert!(!start.stop);
        assert_eq!(start.interval, 1.5);
        let Message::ScreenShotRequest(stop) = &sent[1] else {
            panic!("expected a screenshot request");
        };
        assert!(stop.stop);
        assert_eq!(stop.interval, -1.0);
        assert!(stop.header.request_id > start.header.request_id);
    }

    #[test]
    fn uploads_read_through_the_file_store() {
        let mut h = connected();
        assert!(!h.session.upload(DirectoryType::Data, "C:\\missing.bin"));
        assert_eq!(h.lines.at(LogLevel::Error).len(), 1);

        h.files
            .write_file(Path::new("C:/tools/cheat.json"), b"{}")
            .unwrap();
        let local = "C:\\tools\\cheat.json";
        assert!(h.session.upload(DirectoryType::TemporaryCache, local));

        let sent = sent(&h);
        assert_eq!(
            sent,
            vec![Message::File(FileMessage {
                request_id: -1,
                directory_type: DirectoryType::TemporaryCache,
                target_path: "C:/tools/cheat.json".into(),
                data: b"{}".to_vec(),
            })]
        );
    }

    #[test]
    fn empty_text_is_not_sent() {
        let mut h = connected();
        assert!(!h.session.send_text(""));
        assert!(h.session.send_text("hi"));
        assert_eq!(sent(&h), vec![Message::Text(TextMessage::new("hi"))]);
    }

    #[test]
    fn connecting_state_logs_the_endpoint() {
        let mut h = harness();
        h.session
            .handle(TransportEvent::StateChanged(ConnectionState::Connecting));
        assert_eq!(h.session.state(), ConnectionState::Connecting);
        assert!(h
            .lines
            .texts()
            .contains(&"connecting: address=127.0.0.1, port=5637".to_string()));
    }

    #[tokio::test]
    async fn next_event_skips_quiet_events() {
        let mut h = harness();
        h.session.open();
        h.session.transport.open = true;
        h.session.transport.queued.extend([
            TransportEvent::StateChanged(ConnectionState::Connecting),
            TransportEvent::StateChanged(ConnectionState::Connected),
            TransportEvent::Connected,
        ]);

        assert_eq!(h.session.next_event().await, Some(SessionEvent::Connected));
        assert_eq!(h.session.next_event().await, None);
        assert_eq!(h.session.transport.opened.len(), 1);
    }
}
