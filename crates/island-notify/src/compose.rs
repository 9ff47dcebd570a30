//! Subject and link derivation
//!
//! Pure decision logic: inspects an event's action/target shape and derives
//! a human-readable subject line and a relative link path. Every
//! unrecognized shape is a detectable `None`, never a malformed subject.

use crate::event::{ActionKind, Event, ProblemType, Target, TargetKind};
use serde::{Deserialize, Serialize};

/// Branding variant for subject wording.
///
/// One deployment appends " on Island" to follow and mention subjects;
/// another omits it. Configured explicitly rather than hard-coded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Wording {
    /// No brand suffix
    Plain,
    /// Suffix " on Island" where the branded wording uses it
    #[default]
    Branded,
}

impl Wording {
    fn brand_suffix(self) -> &'static str {
        match self {
            Wording::Plain => "",
            Wording::Branded => " on Island",
        }
    }

    /// Subject line for password-reset mail
    pub(crate) fn reset_subject(self) -> &'static str {
        match self {
            Wording::Plain => "Password Reset",
            Wording::Branded => "Island Password Reset",
        }
    }
}

/// A derived subject line and link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composed {
    pub subject: String,
    /// Relative to the configured base URI, starts with `/`
    pub path: String,
}

/// Derive the subject and link for `event` as seen by `recipient_id`.
///
/// Returns `None` when the action kind is unrecognized, or the action is
/// missing the target it needs; the caller must fail rather than send a
/// blank-subject email.
pub fn compose(event: &Event, recipient_id: &str, wording: Wording) -> Option<Composed> {
    let action = &event.action;

    match action.kind {
        ActionKind::Comment => {
            let target = event.target.as_ref()?;
            let kind_phrase = match target.kind {
                TargetKind::Post => Some("post"),
                TargetKind::Tick { .. } => Some("effort on"),
                _ => None,
            };
            Some(Composed {
                subject: ownership_subject(
                    &action.actor_id,
                    &action.actor_name,
                    recipient_id,
                    target,
                    "commented on",
                    kind_phrase,
                ),
                path: format!("/{}", target.slug),
            })
        }

        ActionKind::Note => {
            let target = event.target.as_ref()?;
            Some(Composed {
                subject: ownership_subject(
                    &action.actor_id,
                    &action.actor_name,
                    recipient_id,
                    target,
                    "wrote a note on",
                    Some(target.kind.noun()),
                ),
                path: format!("/{}", target.slug),
            })
        }

        ActionKind::Hangten => {
            let target = event.target.as_ref()?;
            Some(Composed {
                subject: hangten_subject(&action.actor_name, target),
                path: format!("/{}", target.slug),
            })
        }

        ActionKind::Request => Some(Composed {
            subject: format!(
                "{} wants to follow you{}",
                action.actor_name,
                wording.brand_suffix()
            ),
            path: format!("/{}", action.slug),
        }),

        ActionKind::Accept => Some(Composed {
            subject: format!(
                "You are now following {}{}",
                action.actor_name,
                wording.brand_suffix()
            ),
            path: format!("/{}", action.slug),
        }),

        ActionKind::Follow => Some(Composed {
            subject: format!("{} is now following you", action.actor_name),
            path: format!("/{}", action.slug),
        }),

        ActionKind::Mention => {
            let target = event.target.as_ref()?;
            Some(Composed {
                subject: format!(
                    "{} mentioned you{}",
                    action.actor_name,
                    wording.brand_suffix()
                ),
                path: format!("/{}", target.slug),
            })
        }

        ActionKind::Unknown => None,
    }
}

/// Shared ownership wording for comment and note subjects.
///
/// An actor on their own content reads "their"; the recipient owning the
/// content reads "your"; anyone else's content names the owner. "also"
/// marks the cases where the recipient is a fellow commenter rather than
/// the owner. Exactly one branch applies.
fn ownership_subject(
    actor_id: &str,
    actor_name: &str,
    recipient_id: &str,
    target: &Target,
    base_verb: &str,
    kind_phrase: Option<&str>,
) -> String {
    let (owner, verb) = if actor_id == target.owner_id {
        ("their".to_string(), format!("also {}", base_verb))
    } else if recipient_id == target.owner_id {
        ("your".to_string(), base_verb.to_string())
    } else {
        (
            format!("{}'s", target.owner_name),
            format!("also {}", base_verb),
        )
    };

    let mut subject = format!("{} {} {}", actor_name, verb, owner);
    if let Some(phrase) = kind_phrase {
        subject.push(' ');
        subject.push_str(phrase);
    }
    if !target.name.is_empty() {
        subject.push_str(" \"");
        subject.push_str(&target.name);
        subject.push('"');
    }
    subject
}

/// "{actor} gave you a bump for {what}[ {name}][ in {area}]."
fn hangten_subject(actor_name: &str, target: &Target) -> String {
    let kind_phrase = match &target.kind {
        TargetKind::Post => "your post",
        TargetKind::Tick { .. } => "your effort on",
        TargetKind::Crag { parent_name, .. } => {
            if parent_name.is_some() {
                "adding the sector"
            } else {
                "adding the crag"
            }
        }
        TargetKind::Ascent { problem_type, .. } => match problem_type {
            ProblemType::Boulder => "adding the boulder problem",
            ProblemType::Route => "adding the route",
        },
    };

    let mut subject = format!("{} gave you a bump for {}", actor_name, kind_phrase);
    if !target.name.is_empty() {
        subject.push(' ');
        subject.push_str(&target.name);
    }
    if let Some(area) = target.parent_name().or_else(|| target.location()) {
        subject.push_str(" in ");
        subject.push_str(area);
    }
    subject.push('.');
    subject
}
