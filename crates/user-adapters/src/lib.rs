//! Adapters for the external User service.
//!
//! `HttpUserDirectory` consults the real service and degrades every failure
//! to "not found"; `NullUserDirectory` stands in when no service is
//! configured.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tracing::{debug, warn};

use domains::{UserDirectory, UserProfile};

/// Reported as `service` in activity notifications.
const SERVICE_NAME: &str = "peblob-api";

/// HTTP client over `GET /users/{id}` and `POST /users/{id}/activity`.
///
/// Timeout expiry counts as a transport failure; no error ever crosses this
/// boundary.
pub struct HttpUserDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl HttpUserDirectory {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    fn user_url(&self, user_id: &str) -> String {
        format!("{}/users/{user_id}", self.base_url)
    }
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    async fn exists(&self, user_id: &str) -> bool {
        match self.client.get(self.user_url(user_id)).send().await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                warn!(user_id, error = %err, "user existence check failed, treating as absent");
                false
            }
        }
    }

    async fn profile(&self, user_id: &str) -> Option<UserProfile> {
        let response = match self.client.get(self.user_url(user_id)).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(user_id, error = %err, "profile fetch failed");
                return None;
            }
        };
        if !response.status().is_success() {
            return None;
        }
        match response.json::<UserProfile>().await {
            Ok(profile) => Some(profile),
            Err(err) => {
                warn!(user_id, error = %err, "profile payload has an unexpected shape");
                None
            }
        }
    }

    async fn notify_activity(&self, user_id: &str, action: &str, details: Option<String>) {
        let body = json!({
            "action": action,
            "service": SERVICE_NAME,
            "timestamp": Utc::now().to_rfc3339(),
            "details": details,
        });
        let url = format!("{}/activity", self.user_url(user_id));
        match self.client.post(url).json(&body).send().await {
            Ok(response) if !response.status().is_success() => {
                warn!(
                    user_id,
                    action,
                    status = %response.status(),
                    "activity notification rejected"
                );
            }
            Ok(_) => {}
            Err(err) => {
                warn!(user_id, action, error = %err, "activity notification dropped");
            }
        }
    }
}

/// Directory used when no User service is configured: every user is absent
/// and notifications are dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullUserDirectory;

#[async_trait]
impl UserDirectory for NullUserDirectory {
    fn can_verify(&self) -> bool {
        false
    }

    async fn exists(&self, _user_id: &str) -> bool {
        false
    }

    async fn profile(&self, _user_id: &str) -> Option<UserProfile> {
        None
    }

    async fn notify_activity(&self, user_id: &str, action: &str, _details: Option<String>) {
        debug!(user_id, action, "no user service configured, notification dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Nothing listens on port 9; every call is a transport failure.
    fn unreachable_directory() -> HttpUserDirectory {
        HttpUserDirectory::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap()
    }

    #[tokio::test]
    async fn transport_failure_degrades_exists_to_false() {
        assert!(!unreachable_directory().exists("u1").await);
    }

    #[tokio::test]
    async fn transport_failure_degrades_profile_to_none() {
        assert!(unreachable_directory().profile("u1").await.is_none());
    }

    #[tokio::test]
    async fn notify_activity_swallows_transport_failures() {
        unreachable_directory()
            .notify_activity("u1", "peblob.created", Some("size 3".into()))
            .await;
    }

    #[tokio::test]
    async fn notify_activity_swallows_error_statuses() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 2048];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(b"HTTP/1.1 503 Service Unavailable\r\ncontent-length: 0\r\n\r\n")
                .await;
        });

        let directory =
            HttpUserDirectory::new(format!("http://{addr}"), Duration::from_secs(1)).unwrap();
        directory
            .notify_activity("u1", "peblob.created", None)
            .await;
    }

    #[test]
    fn null_directory_cannot_verify() {
        assert!(!NullUserDirectory.can_verify());
        assert!(unreachable_directory().can_verify());
    }

    #[tokio::test]
    async fn base_url_trailing_slash_is_normalized() {
        let directory =
            HttpUserDirectory::new("http://localhost:3001/", Duration::from_secs(1)).unwrap();
        assert_eq!(directory.user_url("abc"), "http://localhost:3001/users/abc");
    }

    struct HalfKnownDirectory;

    #[async_trait]
    impl UserDirectory for HalfKnownDirectory {
        async fn exists(&self, user_id: &str) -> bool {
            user_id.starts_with("known")
        }

        async fn profile(&self, user_id: &str) -> Option<UserProfile> {
            self.exists(user_id).await.then(|| UserProfile {
                id: user_id.to_owned(),
                email: format!("{user_id}@example.com"),
                username: user_id.to_owned(),
                created_at: "2025-07-24T10:30:00Z".to_owned(),
                is_active: true,
            })
        }

        async fn notify_activity(&self, _: &str, _: &str, _: Option<String>) {}
    }

    #[tokio::test]
    async fn profiles_keeps_input_order_and_omits_unresolved() {
        let ids = vec![
            "known-b".to_owned(),
            "ghost".to_owned(),
            "known-a".to_owned(),
        ];
        let profiles = HalfKnownDirectory.profiles(&ids).await;
        let usernames: Vec<_> = profiles.iter().map(|p| p.username.as_str()).collect();
        assert_eq!(usernames, vec!["known-b", "known-a"]);
    }
}
