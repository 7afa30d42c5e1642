//! Public profile view of a user, as seen by another (possibly anonymous)
//! actor.

use crate::domain::user::{User, Username};

/// A user's public face plus the viewer's follow relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub username: Username,
    pub bio: String,
    pub image: Option<String>,
    pub following: bool,
}

impl Profile {
    /// Build a profile for `user` from the viewer's perspective.
    pub fn of(user: &User, following: bool) -> Self {
        Self {
            username: user.username.clone(),
            bio: user.bio.clone(),
            image: user.image.clone(),
            following,
        }
    }
}
