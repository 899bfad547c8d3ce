//! Concrete message variants and their body contract.
//!
//! Each variant is a plain value type implementing [`SocketMessage`]: a
//! type key fixed at the type level plus symmetric field writers and
//! readers. Request variants embed a [`RequestHeader`], whose id is
//! drawn from a shared [`RequestIds`] at construction time.

use crate::body::Body;
use crate::error::ProtocolResult;
use crate::request_id::RequestIds;
use crate::types::{DirectoryType, LogType};

/// Request id used by messages that answer no request.
pub const UNSOLICITED_REQUEST_ID: i32 = -1;

/// Body contract shared by every variant.
pub trait SocketMessage: Sized {
    /// Wire name, used both as the envelope type key and `_messageType`.
    const TYPE_KEY: &'static str;

    /// Writes this variant's own fields, after `_messageType`.
    fn write_fields(&self, body: &mut Body);

    /// Reads this variant's own fields. Any missing or mistyped field
    /// fails the whole read.
    fn read_fields(body: &Body) -> ProtocolResult<Self>;

    fn to_body(&self) -> Body {
        let mut body = Body::with_type(Self::TYPE_KEY);
        self.write_fields(&mut body);
        body
    }

    fn from_body(body: &Body) -> ProtocolResult<Self> {
        body.message_type()?;
        Self::read_fields(body)
    }
}

/// `_text`: free-form text shown by the engine.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextMessage {
    pub text: String,
}

impl TextMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl SocketMessage for TextMessage {
    const TYPE_KEY: &'static str = "SockeTextMessage";

    fn write_fields(&self, body: &mut Body) {
        body.put_str("_text", &self.text);
    }

    fn read_fields(body: &Body) -> ProtocolResult<Self> {
        Ok(Self {
            text: body.string("_text")?,
        })
    }
}

/// Fields common to every request: what is asked for and its id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestHeader {
    pub request: String,
    pub request_id: i32,
}

impl RequestHeader {
    /// Labels a request and assigns it the next id.
    pub fn issue(ids: &RequestIds, request: impl Into<String>) -> Self {
        Self {
            request: request.into(),
            request_id: ids.next(),
        }
    }

    fn write(&self, body: &mut Body) {
        body.put_str("_request", &self.request);
        body.put_i32("_requestId", self.request_id);
    }

    fn read(body: &Body) -> ProtocolResult<Self> {
        Ok(Self {
            request: body.string("_request")?,
            request_id: body.i32("_requestId")?,
        })
    }
}

/// A bare request, e.g. the connection-information query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestMessage {
    pub header: RequestHeader,
}

impl RequestMessage {
    pub fn new(ids: &RequestIds, request: impl Into<String>) -> Self {
        Self {
            header: RequestHeader::issue(ids, request),
        }
    }

    /// Asks the engine to describe itself.
    pub fn connection_information(ids: &RequestIds) -> Self {
        Self::new(ids, ConnectionInformation::TYPE_KEY)
    }

    pub fn request_id(&self) -> i32 {
        self.header.request_id
    }
}

impl SocketMessage for RequestMessage {
    const TYPE_KEY: &'static str = "SocketRequestMessage";

    fn write_fields(&self, body: &mut Body) {
        self.header.write(body);
    }

    fn read_fields(body: &Body) -> ProtocolResult<Self> {
        Ok(Self {
            header: RequestHeader::read(body)?,
        })
    }
}

/// Starts or stops screen capture on the engine.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScreenShotRequest {
    pub header: RequestHeader,
    pub stop: bool,
    /// Seconds between automatic captures; `-1` for a single shot.
    pub interval: f32,
}

impl ScreenShotRequest {
    /// Captures once, or every `interval` seconds when given.
    pub fn start(ids: &RequestIds, interval: Option<f32>) -> Self {
        Self {
            header: RequestHeader::issue(ids, Self::TYPE_KEY),
            stop: false,
            interval: interval.unwrap_or(-1.0),
        }
    }

    pub fn stop(ids: &RequestIds) -> Self {
        Self {
            header: RequestHeader::issue(ids, Self::TYPE_KEY),
            stop: true,
            interval: -1.0,
        }
    }
}

impl SocketMessage for ScreenShotRequest {
    const TYPE_KEY: &'static str = "SocketScreenShotRequestMessage";

    fn write_fields(&self, body: &mut Body) {
        self.header.write(body);
        body.put_bool("_stop", self.stop);
        body.put_f32("_interval", self.interval);
    }

    fn read_fields(body: &Body) -> ProtocolResult<Self> {
        Ok(Self {
            header: RequestHeader::read(body)?,
            stop: body.bool("_stop")?,
            interval: body.f32("_interval")?,
        })
    }
}

/// Asks for the listing of a remote directory.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileListRequest {
    pub header: RequestHeader,
    pub directory_type: DirectoryType,
    pub target_path: String,
}

impl FileListRequest {
    pub fn new(
        ids: &RequestIds,
        directory_type: DirectoryType,
        target_path: impl Into<String>,
    ) -> Self {
        Self {
            header: RequestHeader::issue(ids, Self::TYPE_KEY),
            directory_type,
            target_path: target_path.into(),
        }
    }
}

impl SocketMessage for FileListRequest {
    const TYPE_KEY: &'static str = "SocketFileListRequestMessage";

    fn write_fields(&self, body: &mut Body) {
        self.header.write(body);
        body.put_i32("_directoryType", self.directory_type.ordinal());
        body.put_str("_targetPath", &self.target_path);
    }

    fn read_fields(body: &Body) -> ProtocolResult<Self> {
        Ok(Self {
            header: RequestHeader::read(body)?,
            directory_type: body.i32("_directoryType")?.into(),
            target_path: body.string("_targetPath")?,
        })
    }
}

/// Asks the engine to send one of its files back.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileUploadRequest {
    pub header: RequestHeader,
    pub directory_type: DirectoryType,
    pub target_path: String,
}

impl FileUploadRequest {
    pub fn new(
        ids: &RequestIds,
        directory_type: DirectoryType,
        target_path: impl Into<String>,
    ) -> Self {
        Self {
            header: RequestHeader::issue(ids, Self::TYPE_KEY),
            directory_type,
            target_path: target_path.into(),
        }
    }

    pub fn request_id(&self) -> i32 {
        self.header.request_id
    }
}

impl SocketMessage for FileUploadRequest {
    const TYPE_KEY: &'static str = "SocketFileUploadRequestMessage";

    fn write_fields(&self, body: &mut Body) {
        self.header.write(body);
        body.put_i32("_directoryType", self.directory_type.ordinal());
        body.put_str("_targetPath", &self.target_path);
    }

    fn read_fields(body: &Body) -> ProtocolResult<Self> {
        Ok(Self {
            header: RequestHeader::read(body)?,
            directory_type: body.i32("_directoryType")?.into(),
            target_path: body.string("_targetPath")?,
        })
    }
}

/// Binds a scene object by name so later move messages target it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConnectGameObjectRequest {
    pub header: RequestHeader,
    pub game_object_name: String,
}

impl ConnectGameObjectRequest {
    pub fn new(ids: &RequestIds, game_object_name: impl Into<String>) -> Self {
        Self {
            header: RequestHeader::issue(ids, Self::TYPE_KEY),
            game_object_name: game_object_name.into(),
        }
    }

    pub fn request_id(&self) -> i32 {
        self.header.request_id
    }
}

impl SocketMessage for ConnectGameObjectRequest {
    const TYPE_KEY: &'static str = "SocketConnectGameObjectRequestMessage";

    fn write_fields(&self, body: &mut Body) {
        self.header.write(body);
        body.put_str("_gameObjectName", &self.game_object_name);
    }

    fn read_fields(body: &Body) -> ProtocolResult<Self> {
        Ok(Self {
            header: RequestHeader::read(body)?,
            game_object_name: body.string("_gameObjectName")?,
        })
    }
}

/// One line of the engine's log.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogMessage {
    pub log_type: LogType,
    pub time: String,
    pub text: String,
    pub stack_trace: String,
}

impl SocketMessage for LogMessage {
    const TYPE_KEY: &'static str = "SocketLogMessage";

    fn write_fields(&self, body: &mut Body) {
        body.put_i32("_logType", self.log_type.ordinal());
        body.put_str("_time", &self.time);
        body.put_str("_log", &self.text);
        body.put_str("_stackTrace", &self.stack_trace);
    }

    fn read_fields(body: &Body) -> ProtocolResult<Self> {
        Ok(Self {
            log_type: body.i32("_logType")?.into(),
            time: body.string("_time")?,
            text: body.string("_log")?,
            stack_trace: body.string("_stackTrace")?,
        })
    }
}

/// Identity of one side of the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInformation {
    pub request_id: i32,
    pub application_name: String,
    pub uuid: String,
    pub device_name: String,
    pub device_model: String,
}

impl Default for ConnectionInformation {
    fn default() -> Self {
        Self {
            request_id: UNSOLICITED_REQUEST_ID,
            application_name: String::new(),
            uuid: String::new(),
            device_name: String::new(),
            device_model: String::new(),
        }
    }
}

impl SocketMessage for ConnectionInformation {
    const TYPE_KEY: &'static str = "SocketConnectionInformationMessage";

    fn write_fields(&self, body: &mut Body) {
        body.put_i32("_requestId", self.request_id);
        body.put_str("_applicationName", &self.application_name);
        body.put_str("_uuid", &self.uuid);
        body.put_str("_deviceName", &self.device_name);
        body.put_str("_deviceModel", &self.device_model);
    }

    fn read_fields(body: &Body) -> ProtocolResult<Self> {
        Ok(Self {
            request_id: body.i32("_requestId")?,
            application_name: body.string("_applicationName")?,
            uuid: body.string("_uuid")?,
            device_name: body.string("_deviceName")?,
            device_model: body.string("_deviceModel")?,
        })
    }
}

/// Listing of a remote directory.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileList {
    pub request_id: i32,
    pub directory: String,
    pub files: Vec<String>,
    pub directories: Vec<String>,
}

impl SocketMessage for FileList {
    const TYPE_KEY: &'static str = "SocketFileListMessage";

    fn write_fields(&self, body: &mut Body) {
        body.put_i32("_requestId", self.request_id);
        body.put_str("_directory", &self.directory);
        body.put_list("_files", &self.files);
        body.put_list("_directories", &self.directories);
    }

    fn read_fields(body: &Body) -> ProtocolResult<Self> {
        Ok(Self {
            request_id: body.i32("_requestId")?,
            directory: body.string("_directory")?,
            files: body.list("_files")?,
            directories: body.list("_directories")?,
        })
    }
}

/// File content in either direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMessage {
    pub request_id: i32,
    pub directory_type: DirectoryType,
    pub target_path: String,
    pub data: Vec<u8>,
}

impl FileMessage {
    /// A file pushed to the engine without a preceding request.
    pub fn unsolicited(
        directory_type: DirectoryType,
        target_path: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            request_id: UNSOLICITED_REQUEST_ID,
            directory_type,
            target_path: target_path.into(),
            data,
        }
    }
}

impl SocketMessage for FileMessage {
    const TYPE_KEY: &'static str = "SocketFileMessage";

    fn write_fields(&self, body: &mut Body) {
        body.put_i32("_requestId", self.request_id);
        body.put_i32("_directoryType", self.directory_type.ordinal());
        body.put_str("_targetPath", &self.target_path);
        body.put_bytes("_data", &self.data);
    }

    fn read_fields(body: &Body) -> ProtocolResult<Self> {
        Ok(Self {
            request_id: body.i32("_requestId")?,
            directory_type: body.i32("_directoryType")?.into(),
            target_path: body.string("_targetPath")?,
            data: body.bytes("_data")?,
        })
    }
}

/// Raw encoded image bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImageData {
    pub image_data: Vec<u8>,
}

impl SocketMessage for ImageData {
    const TYPE_KEY: &'static str = "SocketImageDataMessage";

    fn write_fields(&self, body: &mut Body) {
        body.put_bytes("_imageData", &self.image_data);
    }

    fn read_fields(body: &Body) -> ProtocolResult<Self> {
        Ok(Self {
            image_data: body.bytes("_imageData")?,
        })
    }
}

/// A captured frame answering a screenshot request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScreenShot {
    pub image_data: Vec<u8>,
    pub request_id: i32,
    pub date_time: String,
}

impl SocketMessage for ScreenShot {
    const TYPE_KEY: &'static str = "SocketScreenShotMessage";

    fn write_fields(&self, body: &mut Body) {
        body.put_bytes("_imageData", &self.image_data);
        body.put_i32("_requestId", self.request_id);
        body.put_str("_dateTime", &self.date_time);
    }

    fn read_fields(body: &Body) -> ProtocolResult<Self> {
        Ok(Self {
            image_data: body.bytes("_imageData")?,
            request_id: body.i32("_requestId")?,
            date_time: body.string("_dateTime")?,
        })
    }
}

/// Nudges the bound scene object. Not answered.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MoveGameObject {
    pub manipulate_target: i32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl SocketMessage for MoveGameObject {
    const TYPE_KEY: &'static str = "SocketMoveGameObjectMessage";

    fn write_fields(&self, body: &mut Body) {
        body.put_i32("_manipulateTarget", self.manipulate_target);
        body.put_f32("_x", self.x);
        body.put_f32("_y", self.y);
        body.put_f32("_z", self.z);
    }

    fn read_fields(body: &Body) -> ProtocolResult<Self> {
        Ok(Self {
            manipulate_target: body.i32("_manipulateTarget")?,
            x: body.f32("_x")?,
            y: body.f32("_y")?,
            z: body.f32("_z")?,
        })
    }
}
