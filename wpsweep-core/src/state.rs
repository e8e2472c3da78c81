use crate::data::WpUser;
use std::collections::BTreeSet;
use tokio::sync::Mutex;

/// Scan-wide accumulators written by concurrently running probes.
#[derive(Debug, Default)]
pub struct ScanState {
    sensitive_files: Mutex<BTreeSet<String>>,
    users: Mutex<Vec<WpUser>>,
    version: Mutex<Option<String>>,
}

impl ScanState {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_sensitive_file(&self, url: impl Into<String>) {
        self.sensitive_files.lock().await.insert(url.into());
    }

    /// Merge users, skipping ids already recorded.
    pub async fn record_users(&self, users: &[WpUser]) {
        let mut known = self.users.lock().await;
        for user in users {
            if !known.iter().any(|u| u.id == user.id) {
                known.push(user.clone());
            }
        }
    }

    /// Keep the first version any probe reports.
    pub async fn set_version(&self, version: &str) {
        let mut current = self.version.lock().await;
        if current.is_none() {
            *current = Some(version.to_string());
        }
    }

    pub async fn sensitive_files(&self) -> Vec<String> {
        self.sensitive_files.lock().await.iter().cloned().collect()
    }

    pub async fn users(&self) -> Vec<WpUser> {
        self.users.lock().await.clone()
    }

    pub async fn version(&self) -> Option<String> {
        self.version.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_concurrent_writers() {
        let state = Arc::new(ScanState::new());

        let mut handles = Vec::new();
        for worker in 0..16 {
            let state = state.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..25 {
                    state
                        .add_sensitive_file(format!("http://example.test/{}/{}", worker, i))
                        .await;
                }
                state
                    .record_users(&[WpUser {
                        id: worker % 4,
                        name: format!("user{}", worker % 4),
                        slug: format!("user{}", worker % 4),
                    }])
                    .await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(state.sensitive_files().await.len(), 16 * 25);
        assert_eq!(state.users().await.len(), 4);
    }

    #[tokio::test]
    async fn test_first_version_wins() {
        let state = ScanState::new();
        assert_eq!(state.version().await, None);
        state.set_version("6.4.2").await;
        state.set_version("5.0").await;
        assert_eq!(state.version().await.as_deref(), Some("6.4.2"));
    }
}
