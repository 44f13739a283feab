//! Channel type definitions, parsing, and subscribe permissions.

use uuid::Uuid;

use civicwatch_entity::user::UserRole;

/// Typed channel identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelType {
    /// Public aggregate updates: new issues, status changes, engagement.
    Feed,
    /// Per-issue engagement and comment events.
    Issue(Uuid),
    /// Personal channel: private notifications.
    User(Uuid),
    /// Staff-only events (new submissions for triage).
    Admin,
}

impl ChannelType {
    /// Parses a channel string into a typed channel.
    pub fn parse(channel: &str) -> Option<Self> {
        match channel.splitn(2, ':').collect::<Vec<_>>().as_slice() {
            ["feed"] => Some(ChannelType::Feed),
            ["issue", id] => Uuid::parse_str(id).ok().map(ChannelType::Issue),
            ["user", id] => Uuid::parse_str(id).ok().map(ChannelType::User),
            ["admin"] => Some(ChannelType::Admin),
            _ => None,
        }
    }

    /// Converts back to the wire channel name.
    pub fn to_channel_name(&self) -> String {
        match self {
            ChannelType::Feed => "feed".to_string(),
            ChannelType::Issue(id) => format!("issue:{id}"),
            ChannelType::User(id) => format!("user:{id}"),
            ChannelType::Admin => "admin".to_string(),
        }
    }

    /// Whether the given user may subscribe to this channel.
    ///
    /// Personal channels are owner-only; the admin channel requires a
    /// staff role. Feed and issue channels are public.
    pub fn can_subscribe(&self, user_id: Uuid, role: UserRole) -> bool {
        match self {
            ChannelType::Feed | ChannelType::Issue(_) => true,
            ChannelType::User(owner) => *owner == user_id,
            ChannelType::Admin => role.is_staff(),
        }
    }
}
