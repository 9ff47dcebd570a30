//! Island notification mail
//!
//! Given a recipient and a domain event (comment, endorsement, follow
//! request, mention, ...), derives a subject line and link, renders an
//! HTML body, and hands the message to the SMTP transport in
//! `island-email`.
//!
//! # Example
//!
//! ```ignore
//! use island_notify::{Mailer, MailerConfig};
//!
//! let mailer = Mailer::new(MailerConfig {
//!     smtp: Some(smtp_config),
//!     from: "Island <robot@island.io>".into(),
//!     base_uri: Some("https://island.io".into()),
//!     ..Default::default()
//! })?;
//!
//! mailer.notify(&recipient, &event, "Nice line!").await?;
//! ```
//!
//! Nothing is retried or queued; every failure surfaces to the caller.

pub mod compose;
pub mod event;
mod mailer;
pub mod templates;
pub mod tokens;

pub use compose::{compose, Composed, Wording};
pub use event::{Action, ActionKind, Event, ProblemType, Recipient, Target, TargetKind};
pub use mailer::{Mailer, MailerConfig, NotifyError};
pub use templates::Template;
pub use tokens::{TokenError, TokenStore};
