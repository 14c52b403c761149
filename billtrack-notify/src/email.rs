//! Email digests via the MailerSend REST API.

use serde_json::json;

use crate::error::NotifyError;

const MAILERSEND_ENDPOINT: &str = "https://api.mailersend.com/v1/email";

pub struct Mailer {
    agent: ureq::Agent,
    endpoint: String,
    api_key: String,
    from: String,
}

impl Mailer {
    pub fn new(api_key: impl Into<String>, from: impl Into<String>) -> Self {
        Mailer {
            agent: ureq::AgentBuilder::new()
                .timeout(std::time::Duration::from_secs(30))
                .build(),
            endpoint: MAILERSEND_ENDPOINT.to_string(),
            api_key: api_key.into(),
            from: from.into(),
        }
    }

    #[cfg(test)]
    fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Send one plain-text email to `recipients`. An empty recipient list
    /// is a no-op, not an error.
    pub fn send(
        &self,
        recipients: &[String],
        subject: &str,
        body: &str,
    ) -> Result<(), NotifyError> {
        if recipients.is_empty() {
            return Ok(());
        }
        let to: Vec<_> = recipients
            .iter()
            .map(|email| json!({ "email": email }))
            .collect();
        self.agent
            .post(&self.endpoint)
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(json!({
                "from": { "email": self.from },
                "to": to,
                "subject": subject,
                "text": body,
            }))
            .map_err(|err| match err {
                ureq::Error::Status(401 | 403, _) => {
                    NotifyError::Auth("mail API key rejected".into())
                }
                ureq::Error::Status(code, _) => {
                    NotifyError::Rejected(format!("mail API returned HTTP {code}"))
                }
                other => NotifyError::Transport(other.to_string()),
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_recipient_list_is_a_noop() {
        let mailer = Mailer::new("key", "bot@example.test").with_endpoint("http://192.0.2.1:9");
        mailer.send(&[], "subject", "body").expect("no-op");
    }

    #[test]
    fn dead_endpoint_is_a_transport_error() {
        let mailer = Mailer::new("key", "bot@example.test").with_endpoint("http://192.0.2.1:9");
        let recipients = vec!["a@example.test".to_string()];
        match mailer.send(&recipients, "subject", "body") {
            Err(NotifyError::Transport(_)) => {}
            other => panic!("expected transport error, got {other:?}"),
        }
    }
}
