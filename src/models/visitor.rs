/// Who is behind a request: a signed-in user or an anonymous session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visitor {
    User { id: i32, username: String },
    Anonymous { session_key: String },
}

impl Visitor {
    #[must_use]
    pub const fn user_id(&self) -> Option<i32> {
        match self {
            Self::User { id, .. } => Some(*id),
            Self::Anonymous { .. } => None,
        }
    }

    #[must_use]
    pub fn session_key(&self) -> Option<&str> {
        match self {
            Self::User { .. } => None,
            Self::Anonymous { session_key } => Some(session_key),
        }
    }
}
