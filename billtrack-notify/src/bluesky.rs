//! Bluesky posting via the AT Protocol XRPC surface.
//!
//! Long alerts are posted as reply threads: the first segment is the root,
//! each later segment replies to its predecessor.

use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::compose::split_post;
use crate::error::NotifyError;

#[derive(Debug, Clone, Deserialize)]
struct SessionTokens {
    #[serde(rename = "accessJwt")]
    access_jwt: String,
    did: String,
}

/// A created record's address, used to chain replies.
#[derive(Debug, Clone, Deserialize)]
struct RecordRef {
    uri: String,
    cid: String,
}

pub struct BlueskyPoster {
    agent: ureq::Agent,
    service: String,
    identifier: String,
    password: String,
}

impl BlueskyPoster {
    pub fn new(
        service: impl Into<String>,
        identifier: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        BlueskyPoster {
            agent: ureq::AgentBuilder::new()
                .timeout(std::time::Duration::from_secs(30))
                .build(),
            service: service.into(),
            identifier: identifier.into(),
            password: password.into(),
        }
    }

    /// Post `text`, splitting into a reply thread when it exceeds the
    /// per-post limit.
    pub fn post(&self, text: &str) -> Result<(), NotifyError> {
        let segments = split_post(text);
        if segments.is_empty() {
            return Ok(());
        }
        let session = self.login()?;
        let mut root: Option<RecordRef> = None;
        let mut parent: Option<RecordRef> = None;
        for segment in segments {
            let created = self.create_post(&session, &segment, root.as_ref(), parent.as_ref())?;
            if root.is_none() {
                root = Some(created.clone());
            }
            parent = Some(created);
        }
        Ok(())
    }

    fn login(&self) -> Result<SessionTokens, NotifyError> {
        let url = format!("{}/xrpc/com.atproto.server.createSession", self.service);
        let response = self
            .agent
            .post(&url)
            .send_json(json!({
                "identifier": self.identifier,
                "password": self.password,
            }))
            .map_err(|err| match err {
                ureq::Error::Status(code, _) => {
                    NotifyError::Auth(format!("createSession returned HTTP {code}"))
                }
                other => NotifyError::Transport(other.to_string()),
            })?;
        let body: Value = response
            .into_json()
            .map_err(|e| NotifyError::Transport(format!("malformed session body: {e}")))?;
        serde_json::from_value(body)
            .map_err(|_| NotifyError::Auth("session body missing accessJwt/did".into()))
    }

    fn create_post(
        &self,
        session: &SessionTokens,
        text: &str,
        root: Option<&RecordRef>,
        parent: Option<&RecordRef>,
    ) -> Result<RecordRef, NotifyError> {
        let mut record = json!({
            "$type": "app.bsky.feed.post",
            "text": text,
            "createdAt": Utc::now().to_rfc3339(),
        });
        if let (Some(root), Some(parent)) = (root, parent) {
            record["reply"] = json!({
                "root": { "uri": root.uri, "cid": root.cid },
                "parent": { "uri": parent.uri, "cid": parent.cid },
            });
        }

        let url = format!("{}/xrpc/com.atproto.repo.createRecord", self.service);
        let response = self
            .agent
            .post(&url)
            .set("Authorization", &format!("Bearer {}", session.access_jwt))
            .send_json(json!({
                "repo": session.did,
                "collection": "app.bsky.feed.post",
                "record": record,
            }))
            .map_err(|err| match err {
                ureq::Error::Status(code, _) => {
                    NotifyError::Rejected(format!("createRecord returned HTTP {code}"))
                }
                other => NotifyError::Transport(other.to_string()),
            })?;
        let body: Value = response
            .into_json()
            .map_err(|e| NotifyError::Transport(format!("malformed record body: {e}")))?;
        serde_json::from_value(body)
            .map_err(|_| NotifyError::Rejected("createRecord body missing uri/cid".into()))
    }
}
