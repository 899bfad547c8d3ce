//! `decode`: print what an envelope carries.

use enginelink_protocol::{Envelope, Registry};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Decodes `text` with every variant registered and renders its body.
pub fn render(config: &ClientConfig, text: &str) -> ClientResult<String> {
    let text = text.trim();
    let envelope = Envelope::parse(text)?;
    let message = config
        .transfer
        .codec()
        .with_registry(Registry::All)
        .decode(text)?;
    let body = serde_json::to_string_pretty(message.to_body().as_map())
        .map_err(|e| ClientError::Protocol(e.into()))?;
    let flag = if envelope.compressed { "gzip" } else { "plain" };
    let size = envelope.payload.len();
    let title = format!("# {} ({flag}, {size} bytes)", message.type_key());
    Ok(format!("{title}\n{body}"))
}

pub fn run(config: &ClientConfig, text: &str) -> ClientResult<()> {
    println!("{}", render(config, text)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use enginelink_protocol::ProtocolError;

    #[test]
    fn renders_the_body() {
        let text = "SocketLogMessage,-,eyJfbWVzc2FnZVR5cGUiOiJTb2NrZXRMb2dNZXNzYWdlIiwiX2xvZ1R5cGUiOjMsIl90aW1lIjoiMTI6MDA6MDAiLCJfbG9nIjoiaGVsbG8iLCJfc3RhY2tUcmFjZSI6IiJ9";
        let rendered = render(&ClientConfig::default(), text).unwrap();
        insta::assert_snapshot!(rendered, @r#"
        # SocketLogMessage (plain, 99 bytes)
        {
          "_messageType": "SocketLogMessage",
          "_logType": 3,
          "_time": "12:00:00",
          "_log": "hello",
          "_stackTrace": ""
        }
        "#);
    }

    #[test]
    fn outbound_variants_decode_too() {
        let body = br#"{"_messageType":"SockeTextMessage","_text":"hi"}"#;
        let text = format!(
            "SockeTextMessage,-,{}",
            enginelink_protocol::codec::encode_base64(body)
        );
        let rendered = render(&ClientConfig::default(), &text).unwrap();
        assert!(rendered.contains("\"_text\": \"hi\""));
    }

    #[test]
    fn malformed_input_is_an_error() {
        assert!(matches!(
            render(&ClientConfig::default(), "nonsense"),
            Err(ClientError::Protocol(ProtocolError::MalformedEnvelope { .. }))
        ));
    }
}
