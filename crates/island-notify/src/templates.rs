//! Email template registry
//!
//! The two HTML bodies this component sends, embedded at compile time and
//! rendered through tera. The notification template takes `body`, `url`,
//! `settings_url`; the reset template takes `name`, `url`.

use tera::Tera;

/// Template id for notification mail
pub const NOTIFICATION: &str = "notification.html";
/// Template id for password-reset mail
pub const RESET: &str = "reset.html";

/// A template reference plus its locals, passed to `Mailer::send`
#[derive(Debug, Clone)]
pub struct Template {
    /// Registered template name; rendering an unknown name fails before
    /// any delivery is attempted
    pub name: String,
    /// Attach the rendered body as an HTML alternative instead of
    /// replacing the text body
    pub html: bool,
    pub locals: tera::Context,
}

/// Build the registry with both embedded templates
pub(crate) fn registry() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        (NOTIFICATION, include_str!("../templates/notification.html")),
        (RESET, include_str!("../templates/reset.html")),
    ])?;
    Ok(tera)
}
