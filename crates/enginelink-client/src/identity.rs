//! Local identity announced to engines.

use enginelink_protocol::{ConnectionInformation, UNSOLICITED_REQUEST_ID};
use uuid::Uuid;

use crate::config::IdentitySettings;

/// Application name used when none is configured.
pub const DEFAULT_APPLICATION_NAME: &str = "enginelink";

/// Builds the identity this process pushes on every connect.
///
/// Call once per process: the UUID is freshly generated on each call.
pub fn local_identity(settings: &IdentitySettings) -> ConnectionInformation {
    ConnectionInformation {
        request_id: UNSOLICITED_REQUEST_ID,
        application_name: settings
            .application_name
            .clone()
            .unwrap_or_else(|| DEFAULT_APPLICATION_NAME.to_string()),
        uuid: Uuid::new_v4().to_string(),
        device_name: settings.device_name.clone().unwrap_or_else(host_name),
        device_model: settings.device_model.clone().unwrap_or_else(device_model),
    }
}

fn host_name() -> String {
    match hostname::get() {
        Ok(name) => name.to_string_lossy().into_owned(),
        Err(e) => {
            tracing::debug!(error = %e, "could not read host name");
            "unknown".to_string()
        }
    }
}

fn device_model() -> String {
    format!("{}/{}", std::env::consts::OS, std::env::consts::ARCH)
}

/// One-line description of a peer.
pub fn describe(info: &ConnectionInformation) -> String {
    format!(
        "device[{}({})] application[{}]",
        info.device_name, info.device_model, info.application_name
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_come_from_the_host() {
        let info = local_identity(&IdentitySettings::default());
        assert_eq!(info.request_id, -1);
        assert_eq!(info.application_name, DEFAULT_APPLICATION_NAME);
        assert!(info.device_model.contains(std::env::consts::OS));
        assert!(!info.device_name.is_empty());
        assert!(Uuid::parse_str(&info.uuid).is_ok());
    }

    #[test]
    fn settings_override_detection() {
        let settings = IdentitySettings {
            application_name: Some("inspector".into()),
            device_name: Some("bench-pc".into()),
            device_model: Some("custom".into()),
        };
        let info = local_identity(&settings);
        assert_eq!(
            describe(&info),
            "device[bench-pc(custom)] application[inspector]"
        );
    }

    #[test]
    fn each_call_gets_a_new_uuid() {
        let settings = IdentitySettings::default();
        let first = local_identity(&settings);
        let second = local_identity(&settings);
        assert_ne!(first.uuid, second.uuid);
    }
}
