//! The closed set of message variants and which side accepts which.

use std::fmt;

use crate::body::Body;
use crate::error::{ProtocolError, ProtocolResult};
use crate::message::*;

macro_rules! messages {
    ($($variant:ident($ty:ty)),+ $(,)?) => {
        /// Any message that can travel over the socket.
        #[derive(Debug, Clone, PartialEq)]
        pub enum Message {
            $($variant($ty),)+
        }

        /// Discriminant of [`Message`], one per type key.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum MessageKind {
            $($variant,)+
        }

        impl MessageKind {
            pub const ALL: &'static [MessageKind] = &[$(MessageKind::$variant,)+];

            pub const fn type_key(self) -> &'static str {
                match self {
                    $(Self::$variant => <$ty as SocketMessage>::TYPE_KEY,)+
                }
            }

            pub fn from_type_key(type_key: &str) -> Option<Self> {
                match type_key {
                    $(key if key == <$ty as SocketMessage>::TYPE_KEY => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl Message {
            pub fn kind(&self) -> MessageKind {
                match self {
                    $(Self::$variant(_) => MessageKind::$variant,)+
                }
            }

            pub fn to_body(&self) -> Body {
                match self {
                    $(Self::$variant(inner) => inner.to_body(),)+
                }
            }

            /// Builds the variant named by `kind` from its body.
            pub fn from_body(kind: MessageKind, body: &Body) -> ProtocolResult<Self> {
                match kind {
                    $(MessageKind::$variant => <$ty>::from_body(body).map(Self::$variant),)+
                }
            }
        }

        $(
            impl From<$ty> for Message {
                fn from(inner: $ty) -> Self {
                    Self::$variant(inner)
                }
            }
        )+
    };
}

messages! {
    Text(TextMessage),
    Request(RequestMessage),
    ScreenShotRequest(ScreenShotRequest),
    FileListRequest(FileListRequest),
    FileUploadRequest(FileUploadRequest),
    ConnectGameObjectRequest(ConnectGameObjectRequest),
    Log(LogMessage),
    ConnectionInformation(ConnectionInformation),
    FileList(FileList),
    File(FileMessage),
    ImageData(ImageData),
    ScreenShot(ScreenShot),
    MoveGameObject(MoveGameObject),
}

impl Message {
    pub fn type_key(&self) -> &'static str {
        self.kind().type_key()
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_key())
    }
}

/// Which type keys a receiving side knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Registry {
    /// What the inspection client receives from an engine.
    #[default]
    Client,
    /// What an engine receives from a client.
    Engine,
    /// Every variant.
    All,
}

impl Registry {
    pub fn accepts(self, kind: MessageKind) -> bool {
        use MessageKind as K;
        match self {
            Self::All => true,
            Self::Client => matches!(
                kind,
                K::Log | K::ConnectionInformation | K::FileList | K::File | K::ScreenShot
            ),
            Self::Engine => matches!(
                kind,
                K::Text
                    | K::Request
                    | K::ScreenShotRequest
                    | K::FileListRequest
                    | K::FileUploadRequest
                    | K::ConnectGameObjectRequest
                    | K::ConnectionInformation
                    | K::File
                    | K::MoveGameObject
                    | K::ImageData
            ),
        }
    }

    /// Maps a type key to a kind this registry accepts.
    pub fn resolve(self, type_key: &str) -> ProtocolResult<MessageKind> {
        MessageKind::from_type_key(type_key)
            .filter(|kind| self.accepts(*kind))
            .ok_or_else(|| ProtocolError::UnknownMessageType(type_key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_keys_are_unique_and_resolvable() {
        for kind in MessageKind::ALL {
            assert_eq!(MessageKind::from_type_key(kind.type_key()), Some(*kind));
        }
        let mut keys: Vec<_> = MessageKind::ALL.iter().map(|k| k.type_key()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), MessageKind::ALL.len());
    }

    #[test]
    fn historical_text_key_is_kept() {
        assert_eq!(MessageKind::Text.type_key(), "SockeTextMessage");
        assert_eq!(MessageKind::from_type_key("SocketTextMessage"), None);
    }

    #[test]
    fn client_registry_admits_only_replies() {
        let accepted: Vec<_> = MessageKind::ALL
            .iter()
            .copied()
            .filter(|k| Registry::Client.accepts(*k))
            .collect();
        assert_eq!(
            accepted,
            vec![
                MessageKind::Log,
                MessageKind::ConnectionInformation,
                MessageKind::FileList,
                MessageKind::File,
                MessageKind::ScreenShot,
            ]
        );
        assert!(matches!(
            Registry::Client.resolve("SocketMoveGameObjectMessage"),
            Err(ProtocolError::UnknownMessageType(key)) if key == "SocketMoveGameObjectMessage"
        ));
    }

    #[test]
    fn engine_and_all_registries() {
        assert!(Registry::Engine.accepts(MessageKind::MoveGameObject));
        assert!(!Registry::Engine.accepts(MessageKind::Log));
        assert!(!Registry::Engine.accepts(MessageKind::ScreenShot));
        assert!(MessageKind::ALL.iter().all(|k| Registry::All.accepts(*k)));
        assert!(Registry::All.resolve("NoSuchMessage").is_err());
    }
}
