//! Notification event model
//!
//! Events arrive from the feed service as JSON. The target shape is a
//! tagged variant per kind, so optional fields like a crag's parent or an
//! ascent's problem type are pattern matches rather than presence checks.

use serde::{Deserialize, Serialize};

/// Who receives the email
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub id: String,
    pub display_name: String,
    pub primary_email: String,
}

impl Recipient {
    /// `Display Name <addr>` form for the To: header
    pub fn mailbox(&self) -> String {
        format!("{} <{}>", self.display_name, self.primary_email)
    }
}

/// What the actor did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Comment,
    /// Endorsement of another member's content
    Hangten,
    /// Follow request sent
    Request,
    /// Follow request accepted
    Accept,
    Follow,
    Mention,
    /// Comment variant used on tick pages
    Note,
    /// Any tag this version does not recognize; composes to no subject
    #[serde(other)]
    Unknown,
}

/// The action half of an event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub actor_id: String,
    pub actor_name: String,
    #[serde(rename = "type")]
    pub kind: ActionKind,
    /// Actor profile slug, linked for follow-shaped actions
    #[serde(default)]
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gravatar_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// The content an action happened on
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub owner_id: String,
    pub owner_name: String,
    /// Content title; may be empty
    #[serde(default)]
    pub name: String,
    pub slug: String,
    #[serde(flatten)]
    pub kind: TargetKind,
}

impl Target {
    /// Parent area name, for kinds that can have one
    pub fn parent_name(&self) -> Option<&str> {
        match &self.kind {
            TargetKind::Crag { parent_name, .. } | TargetKind::Ascent { parent_name, .. } => {
                parent_name.as_deref()
            }
            _ => None,
        }
    }

    /// Free-form location, for kinds that carry one
    pub fn location(&self) -> Option<&str> {
        match &self.kind {
            TargetKind::Tick { location }
            | TargetKind::Crag { location, .. }
            | TargetKind::Ascent { location, .. } => location.as_deref(),
            TargetKind::Post => None,
        }
    }
}

/// Per-kind target fields, tagged by the target `type`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TargetKind {
    Post,
    /// A logged climbing effort
    Tick {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        location: Option<String>,
    },
    /// A climbing location; sectors carry their parent crag
    Crag {
        #[serde(
            default,
            rename = "parentName",
            skip_serializing_if = "Option::is_none"
        )]
        parent_name: Option<String>,
        #[serde(
            default,
            rename = "parentSlug",
            skip_serializing_if = "Option::is_none"
        )]
        parent_slug: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        location: Option<String>,
    },
    /// A route or boulder problem
    Ascent {
        #[serde(rename = "problemType")]
        problem_type: ProblemType,
        #[serde(
            default,
            rename = "parentName",
            skip_serializing_if = "Option::is_none"
        )]
        parent_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        location: Option<String>,
    },
}

impl TargetKind {
    /// Plain noun for this kind of content
    pub fn noun(&self) -> &'static str {
        match self {
            TargetKind::Post => "post",
            TargetKind::Tick { .. } => "tick",
            TargetKind::Crag { .. } => "crag",
            TargetKind::Ascent { .. } => "ascent",
        }
    }
}

/// Ascent classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProblemType {
    Boulder,
    Route,
}

/// A domain event delivered to a subscriber
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub subscriber_id: String,
    pub action: Action,
    /// Absent for events whose action carries its own link (follow shapes)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Target>,
}
