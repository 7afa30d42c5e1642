//! Domain event types published by the service layer after successful
//! mutations.

use serde::Serialize;
use uuid::Uuid;

use super::bus::DomainEvent;

macro_rules! domain_event {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $(pub $field:ident : $ty:ty),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            $(pub $field: $ty),+
        }

        impl DomainEvent for $name {
            fn name(&self) -> &'static str {
                stringify!($name)
            }

            fn payload(&self) -> serde_json::Value {
                serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
            }

            fn as_any(&self) -> &dyn std::any::Any {
                self
            }
        }
    };
}

domain_event! {
    /// A new account completed registration.
    pub struct UserRegistered {
        pub user_id: Uuid,
        pub username: String,
        pub email: String,
    }
}

domain_event! {
    /// A user presented valid credentials and received a token.
    pub struct UserLoggedIn {
        pub user_id: Uuid,
        pub email: String,
    }
}

domain_event! {
    /// A user started following another user.
    pub struct UserFollowed {
        pub follower_id: Uuid,
        pub followee_id: Uuid,
    }
}

domain_event! {
    /// A user stopped following another user.
    pub struct UserUnfollowed {
        pub follower_id: Uuid,
        pub followee_id: Uuid,
    }
}

domain_event! {
    /// An article was created.
    pub struct ArticleCreated {
        pub article_id: Uuid,
        pub author_id: Uuid,
        pub slug: String,
    }
}

domain_event! {
    /// An article's content or tags changed.
    pub struct ArticleUpdated {
        pub article_id: Uuid,
        pub author_id: Uuid,
        pub updated_fields: Vec<String>,
    }
}

domain_event! {
    /// An article was permanently removed.
    pub struct ArticleDeleted {
        pub article_id: Uuid,
        pub author_id: Uuid,
    }
}

domain_event! {
    /// A user added an article to their favorites.
    pub struct ArticleFavorited {
        pub article_id: Uuid,
        pub user_id: Uuid,
    }
}

domain_event! {
    /// A user removed an article from their favorites.
    pub struct ArticleUnfavorited {
        pub article_id: Uuid,
        pub user_id: Uuid,
    }
}

domain_event! {
    /// A comment was posted on an article.
    pub struct CommentAdded {
        pub comment_id: Uuid,
        pub article_id: Uuid,
        pub author_id: Uuid,
    }
}

domain_event! {
    /// A comment was removed from an article.
    pub struct CommentDeleted {
        pub comment_id: Uuid,
        pub article_id: Uuid,
        pub author_id: Uuid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_matches_type() {
        let event = ArticleFavorited {
            article_id: Uuid::nil(),
            user_id: Uuid::nil(),
        };
        assert_eq!(event.name(), "ArticleFavorited");
    }

    #[test]
    fn payload_uses_camel_case_keys() {
        let event = UserRegistered {
            user_id: Uuid::nil(),
            username: "jake".to_owned(),
            email: "jake@example.com".to_owned(),
        };
        let payload = event.payload();
        assert_eq!(payload["username"], "jake");
        assert!(payload.get("userId").is_some());
    }
}
