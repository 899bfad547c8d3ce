//! Side table of requests awaiting a reply.

use std::collections::HashMap;

/// Remote paths of downloads still waiting for their file, keyed by
/// request id.
#[derive(Debug, Default)]
pub struct PendingRequests {
    downloads: HashMap<i32, String>,
}

impl PendingRequests {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, request_id: i32, remote_path: impl Into<String>) {
        self.downloads.insert(request_id, remote_path.into());
    }

    /// Takes the entry for `request_id`; a reply resolves at most once.
    pub fn resolve(&mut self, request_id: i32) -> Option<String> {
        self.downloads.remove(&request_id)
    }

    /// Drops every entry and returns how many there were.
    pub fn clear(&mut self) -> usize {
        let count = self.downloads.len();
        self.downloads.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.downloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.downloads.is_empty()
    }
}

/// Local file name for a downloaded remote path: its last component.
pub fn download_file_name(remote_path: &str, request_id: i32) -> String {
    match remote_path.rsplit('/').next() {
        Some(name) if !name.is_empty() && name != "." && name != ".." => name.to_string(),
        _ => format!("download-{}", request_id),
    }
}
