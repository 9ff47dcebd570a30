//! Notification mail dispatch
//!
//! Holds transport configuration and exposes the three operations: the
//! low-level `send`, and `notify` / `reset` built on top of it. Stateless
//! between calls aside from configuration; concurrent calls share only the
//! transport.

use std::sync::Arc;

use island_email::{
    Delivery, EmailError, MockTransport, Outgoing, SmtpConfig, SmtpTransport, Transport,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compose::{compose, Wording};
use crate::event::{Event, Recipient};
use crate::templates::{self, Template};
use crate::tokens::{TokenError, TokenStore};

/// Errors from dispatch operations
#[derive(Error, Debug)]
pub enum NotifyError {
    /// `notify` and `reset` build absolute links; they refuse to run
    /// without a base URI
    #[error("base URI required")]
    BaseUriRequired,

    #[error("no mail transport configured")]
    TransportUnavailable,

    /// The event shape yielded no subject; carries the offending action
    /// tag for diagnostics
    #[error("no subject for event shape: {0}")]
    InvalidSubject(String),

    #[error("template render failed: {0}")]
    Render(#[from] tera::Error),

    #[error("no token store configured")]
    TokenStoreRequired,

    #[error(transparent)]
    TokenCreation(#[from] TokenError),

    #[error("delivery failed: {0}")]
    Delivery(#[from] EmailError),
}

/// Mailer construction options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MailerConfig {
    /// SMTP settings; omit together with `mock` to construct a mailer
    /// whose sends fail with `TransportUnavailable`
    #[serde(default)]
    pub smtp: Option<SmtpConfig>,
    /// Sender address for all outgoing mail
    pub from: String,
    /// Absolute base for links in mail bodies, e.g. `https://island.io`
    #[serde(default)]
    pub base_uri: Option<String>,
    /// Replace SMTP delivery with a log-only transport
    #[serde(default)]
    pub mock: bool,
    /// Subject wording variant
    #[serde(default)]
    pub wording: Wording,
}

/// Notification email dispatcher
pub struct Mailer {
    transport: Option<Arc<dyn Transport>>,
    templates: tera::Tera,
    from: String,
    base_uri: Option<String>,
    wording: Wording,
    tokens: Option<Arc<dyn TokenStore>>,
}

impl Mailer {
    /// Build a mailer from configuration.
    ///
    /// The transport choice (SMTP or mock) happens here, once; `send`
    /// never reconnects or re-decides.
    pub fn new(config: MailerConfig) -> Result<Self, NotifyError> {
        let transport: Option<Arc<dyn Transport>> = if config.mock {
            Some(Arc::new(MockTransport::new()))
        } else {
            match &config.smtp {
                Some(smtp) => Some(Arc::new(SmtpTransport::connect(smtp)?)),
                None => None,
            }
        };

        Ok(Self {
            transport,
            templates: templates::registry()?,
            from: config.from,
            base_uri: config.base_uri,
            wording: config.wording,
            tokens: None,
        })
    }

    /// Wire the token-minting collaborator used by `reset`
    pub fn with_token_store(mut self, tokens: Arc<dyn TokenStore>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Replace the transport; lets tests capture deliveries
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Send a message, optionally rendering a template body first.
    ///
    /// The transport check runs before any rendering, so a misconfigured
    /// mailer never renders. With `template.html` set, the rendered body
    /// becomes the HTML alternative and any plain `text` is preserved;
    /// otherwise it replaces the text body. The transport result is
    /// forwarded unchanged.
    pub async fn send(
        &self,
        mut outgoing: Outgoing,
        template: Option<Template>,
    ) -> Result<Delivery, NotifyError> {
        let Some(transport) = &self.transport else {
            return Err(NotifyError::TransportUnavailable);
        };

        if let Some(template) = template {
            let rendered = self.templates.render(&template.name, &template.locals)?;
            if template.html {
                outgoing.html = Some(rendered);
            } else {
                outgoing.text = Some(rendered);
            }
        }

        transport.deliver(&outgoing).await.map_err(NotifyError::from)
    }

    /// Send a notification email for `event` to `recipient`.
    ///
    /// Fails with `InvalidSubject` for unrecognized event shapes, before
    /// any template render.
    pub async fn notify(
        &self,
        recipient: &Recipient,
        event: &Event,
        body: &str,
    ) -> Result<Delivery, NotifyError> {
        let base_uri = self.base_uri.as_deref().ok_or(NotifyError::BaseUriRequired)?;

        let Some(composed) = compose(event, &recipient.id, self.wording) else {
            return Err(NotifyError::InvalidSubject(format!(
                "{:?}",
                event.action.kind
            )));
        };

        let mut locals = tera::Context::new();
        locals.insert("body", body);
        locals.insert("url", &format!("{}{}", base_uri, composed.path));
        locals.insert("settings_url", &format!("{}/settings", base_uri));

        let delivery = self
            .send(
                Outgoing {
                    to: recipient.mailbox(),
                    from: self.from.clone(),
                    subject: composed.subject,
                    text: Some(body.to_string()),
                    html: None,
                },
                Some(Template {
                    name: templates::NOTIFICATION.to_string(),
                    html: true,
                    locals,
                }),
            )
            .await?;

        log::info!(
            "Notification email sent to {} ({:?})",
            recipient.primary_email,
            event.action.kind
        );

        Ok(delivery)
    }

    /// Send a password-reset email carrying a freshly minted one-time
    /// token.
    ///
    /// Token-store failures surface unchanged; no mail goes out without a
    /// token.
    pub async fn reset(&self, member: &Recipient) -> Result<Delivery, NotifyError> {
        let base_uri = self.base_uri.as_deref().ok_or(NotifyError::BaseUriRequired)?;
        let tokens = self.tokens.as_ref().ok_or(NotifyError::TokenStoreRequired)?;

        let token = tokens.create_token(&member.id).await?;
        let reset_url = format!("{}/reset?t={}", base_uri, token);

        let mut locals = tera::Context::new();
        locals.insert("name", &member.display_name);
        locals.insert("url", &reset_url);

        let delivery = self
            .send(
                Outgoing {
                    to: member.mailbox(),
                    from: self.from.clone(),
                    subject: self.wording.reset_subject().to_string(),
                    text: Some(format!("Reset your password: {}", reset_url)),
                    html: None,
                },
                Some(Template {
                    name: templates::RESET.to_string(),
                    html: true,
                    locals,
                }),
            )
            .await?;

        log::info!("Password reset email sent to {}", member.primary_email);

        Ok(delivery)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Action, ActionKind, Target, TargetKind};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Transport that records every delivery
    #[derive(Default)]
    struct CaptureTransport {
        sent: Mutex<Vec<Outgoing>>,
    }

    #[async_trait::async_trait]
    impl Transport for CaptureTransport {
        async fn deliver(&self, email: &Outgoing) -> Result<Delivery, EmailError> {
            self.sent.lock().unwrap().push(email.clone());
            Ok(Delivery {
                to: email.to.clone(),
            })
        }
    }

    /// Token store that mints a fixed token and counts calls
    #[derive(Default)]
    struct FixedTokens {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl TokenStore for FixedTokens {
        async fn create_token(&self, _member_id: &str) -> Result<String, TokenError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("tok123".to_string())
        }
    }

    struct FailingTokens;

    #[async_trait::async_trait]
    impl TokenStore for FailingTokens {
        async fn create_token(&self, _member_id: &str) -> Result<String, TokenError> {
            Err(TokenError("db down".to_string()))
        }
    }

    fn recipient() -> Recipient {
        Recipient {
            id: "recipient1".to_string(),
            display_name: "Cooper Roberts".to_string(),
            primary_email: "cooper@example.com".to_string(),
        }
    }

    fn comment_event() -> Event {
        Event {
            subscriber_id: "recipient1".to_string(),
            action: Action {
                actor_id: "actor1".to_string(),
                actor_name: "Tester".to_string(),
                kind: ActionKind::Comment,
                slug: "tester".to_string(),
                gravatar_hash: None,
                body: None,
            },
            target: Some(Target {
                owner_id: "owner1".to_string(),
                owner_name: "Cooper Roberts".to_string(),
                name: "Test post".to_string(),
                slug: "test/test".to_string(),
                kind: TargetKind::Post,
            }),
        }
    }

    fn unknown_event() -> Event {
        let mut event = comment_event();
        event.action.kind = ActionKind::Unknown;
        event
    }

    fn mailer_with(capture: Arc<CaptureTransport>) -> Mailer {
        Mailer::new(MailerConfig {
            from: "Island <robot@island.io>".to_string(),
            base_uri: Some("https://island.io".to_string()),
            ..Default::default()
        })
        .unwrap()
        .with_transport(capture)
    }

    #[tokio::test]
    async fn test_notify_requires_base_uri() {
        let capture = Arc::new(CaptureTransport::default());
        let mailer = Mailer::new(MailerConfig {
            from: "robot@island.io".to_string(),
            ..Default::default()
        })
        .unwrap()
        .with_transport(capture.clone());

        let err = mailer
            .notify(&recipient(), &comment_event(), "Nice line!")
            .await
            .unwrap_err();
        assert!(matches!(err, NotifyError::BaseUriRequired));
        assert!(capture.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_notify_sends_subject_link_and_body() {
        let capture = Arc::new(CaptureTransport::default());
        let mailer = mailer_with(capture.clone());

        mailer
            .notify(&recipient(), &comment_event(), "Nice line!")
            .await
            .unwrap();

        let sent = capture.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "Cooper Roberts <cooper@example.com>");
        assert_eq!(sent[0].from, "Island <robot@island.io>");
        assert_eq!(
            sent[0].subject,
            "Tester also commented on Cooper Roberts's post \"Test post\""
        );
        assert_eq!(sent[0].text.as_deref(), Some("Nice line!"));

        let html = sent[0].html.as_deref().unwrap();
        assert!(html.contains("Nice line!"));
        assert!(html.contains("https://island.io/test/test"));
        assert!(html.contains("https://island.io/settings"));
    }

    #[tokio::test]
    async fn test_notify_with_empty_body() {
        let capture = Arc::new(CaptureTransport::default());
        let mailer = mailer_with(capture.clone());

        mailer
            .notify(&recipient(), &comment_event(), "")
            .await
            .unwrap();

        let sent = capture.sent.lock().unwrap();
        assert_eq!(sent[0].text.as_deref(), Some(""));
        assert!(sent[0].html.is_some());
    }

    #[tokio::test]
    async fn test_notify_unknown_event_short_circuits() {
        let capture = Arc::new(CaptureTransport::default());
        let tokens = Arc::new(FixedTokens::default());
        let mailer = mailer_with(capture.clone()).with_token_store(tokens.clone());

        let err = mailer
            .notify(&recipient(), &unknown_event(), "Nice line!")
            .await
            .unwrap_err();
        assert!(matches!(err, NotifyError::InvalidSubject(_)));
        assert!(capture.sent.lock().unwrap().is_empty());
        assert_eq!(tokens.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_subject_names_the_offending_shape() {
        let capture = Arc::new(CaptureTransport::default());
        let mailer = mailer_with(capture.clone());

        let err = mailer
            .notify(&recipient(), &unknown_event(), "")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "no subject for event shape: Unknown");

        // A recognized action missing its target reports its tag too
        let mut event = comment_event();
        event.target = None;
        let err = mailer.notify(&recipient(), &event, "").await.unwrap_err();
        assert_eq!(err.to_string(), "no subject for event shape: Comment");
        assert!(capture.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_without_transport_fails_before_render() {
        let mailer = Mailer::new(MailerConfig {
            from: "robot@island.io".to_string(),
            base_uri: Some("https://island.io".to_string()),
            ..Default::default()
        })
        .unwrap();

        // An unregistered template name would fail the render; the
        // transport check must win.
        let err = mailer
            .send(
                Outgoing {
                    to: "cooper@example.com".to_string(),
                    from: "robot@island.io".to_string(),
                    subject: "Test".to_string(),
                    text: None,
                    html: None,
                },
                Some(Template {
                    name: "missing.html".to_string(),
                    html: true,
                    locals: tera::Context::new(),
                }),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, NotifyError::TransportUnavailable));
    }

    #[tokio::test]
    async fn test_send_unknown_template_fails_before_delivery() {
        let capture = Arc::new(CaptureTransport::default());
        let mailer = mailer_with(capture.clone());

        let err = mailer
            .send(
                Outgoing {
                    to: "cooper@example.com".to_string(),
                    from: "robot@island.io".to_string(),
                    subject: "Test".to_string(),
                    text: None,
                    html: None,
                },
                Some(Template {
                    name: "missing.html".to_string(),
                    html: true,
                    locals: tera::Context::new(),
                }),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, NotifyError::Render(_)));
        assert!(capture.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_without_template_passes_through() {
        let capture = Arc::new(CaptureTransport::default());
        let mailer = mailer_with(capture.clone());

        mailer
            .send(
                Outgoing {
                    to: "cooper@example.com".to_string(),
                    from: "robot@island.io".to_string(),
                    subject: "Raw".to_string(),
                    text: Some("raw text".to_string()),
                    html: None,
                },
                None,
            )
            .await
            .unwrap();

        let sent = capture.sent.lock().unwrap();
        assert_eq!(sent[0].subject, "Raw");
        assert_eq!(sent[0].text.as_deref(), Some("raw text"));
        assert!(sent[0].html.is_none());
    }

    #[tokio::test]
    async fn test_send_non_html_template_replaces_text() {
        let capture = Arc::new(CaptureTransport::default());
        let mailer = mailer_with(capture.clone());

        let mut locals = tera::Context::new();
        locals.insert("name", "Cooper Roberts");
        locals.insert("url", "https://island.io/reset?t=tok123");

        mailer
            .send(
                Outgoing {
                    to: "cooper@example.com".to_string(),
                    from: "robot@island.io".to_string(),
                    subject: "Test".to_string(),
                    text: Some("replaced".to_string()),
                    html: None,
                },
                Some(Template {
                    name: templates::RESET.to_string(),
                    html: false,
                    locals,
                }),
            )
            .await
            .unwrap();

        let sent = capture.sent.lock().unwrap();
        assert!(sent[0].html.is_none());
        assert!(sent[0].text.as_deref().unwrap().contains("Cooper Roberts"));
    }

    #[tokio::test]
    async fn test_mock_config_sends_without_smtp() {
        let mailer = Mailer::new(MailerConfig {
            from: "robot@island.io".to_string(),
            base_uri: Some("https://island.io".to_string()),
            mock: true,
            ..Default::default()
        })
        .unwrap();

        let delivery = mailer
            .notify(&recipient(), &comment_event(), "Nice line!")
            .await
            .unwrap();
        assert_eq!(delivery.to, "Cooper Roberts <cooper@example.com>");
    }

    #[tokio::test]
    async fn test_reset_requires_base_uri_before_token_mint() {
        let tokens = Arc::new(FixedTokens::default());
        let mailer = Mailer::new(MailerConfig {
            from: "robot@island.io".to_string(),
            mock: true,
            ..Default::default()
        })
        .unwrap()
        .with_token_store(tokens.clone());

        let err = mailer.reset(&recipient()).await.unwrap_err();
        assert!(matches!(err, NotifyError::BaseUriRequired));
        assert_eq!(tokens.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_reset_requires_token_store() {
        let capture = Arc::new(CaptureTransport::default());
        let mailer = mailer_with(capture.clone());

        let err = mailer.reset(&recipient()).await.unwrap_err();
        assert!(matches!(err, NotifyError::TokenStoreRequired));
        assert!(capture.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reset_mints_token_and_links() {
        let capture = Arc::new(CaptureTransport::default());
        let tokens = Arc::new(FixedTokens::default());
        let mailer = mailer_with(capture.clone()).with_token_store(tokens.clone());

        mailer.reset(&recipient()).await.unwrap();

        assert_eq!(tokens.calls.load(Ordering::SeqCst), 1);
        let sent = capture.sent.lock().unwrap();
        assert_eq!(sent[0].subject, "Island Password Reset");
        assert_eq!(
            sent[0].text.as_deref(),
            Some("Reset your password: https://island.io/reset?t=tok123")
        );
        assert!(sent[0]
            .html
            .as_deref()
            .unwrap()
            .contains("https://island.io/reset?t=tok123"));
    }

    #[tokio::test]
    async fn test_reset_surfaces_token_failure() {
        let capture = Arc::new(CaptureTransport::default());
        let mailer = mailer_with(capture.clone()).with_token_store(Arc::new(FailingTokens));

        let err = mailer.reset(&recipient()).await.unwrap_err();
        assert!(matches!(err, NotifyError::TokenCreation(_)));
        assert!(capture.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reset_plain_wording_subject() {
        let capture = Arc::new(CaptureTransport::default());
        let mailer = Mailer::new(MailerConfig {
            from: "robot@island.io".to_string(),
            base_uri: Some("https://island.io".to_string()),
            wording: Wording::Plain,
            ..Default::default()
        })
        .unwrap()
        .with_transport(capture.clone())
        .with_token_store(Arc::new(FixedTokens::default()));

        mailer.reset(&recipient()).await.unwrap();
        assert_eq!(capture.sent.lock().unwrap()[0].subject, "Password Reset");
    }
}
