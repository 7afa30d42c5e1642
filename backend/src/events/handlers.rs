//! Default event handler registrations.
//!
//! Handlers here are side-channel only: audit lines, notification stubs, and
//! in-process engagement counters. None of them participate in correctness;
//! a failing handler is logged by the bus and otherwise ignored.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::info;

use super::bus::EventBus;
use super::domain::{
    ArticleCreated, ArticleDeleted, ArticleFavorited, ArticleUnfavorited, CommentAdded,
    UserFollowed, UserLoggedIn, UserRegistered,
};

/// Process-lifetime engagement tallies fed by favorite/unfavorite events.
#[derive(Debug, Default)]
pub struct EngagementCounters {
    favorites: AtomicU64,
    unfavorites: AtomicU64,
}

impl EngagementCounters {
    /// Favorites recorded since startup.
    pub fn favorites(&self) -> u64 {
        self.favorites.load(Ordering::Relaxed)
    }

    /// Unfavorites recorded since startup.
    pub fn unfavorites(&self) -> u64 {
        self.unfavorites.load(Ordering::Relaxed)
    }
}

/// Register the application's default handlers.
///
/// Called exactly once during startup, before the server accepts requests.
/// Returns the counters handle so callers can surface the tallies.
pub fn register_default_handlers(bus: &mut EventBus) -> Arc<EngagementCounters> {
    bus.subscribe::<UserRegistered, _>(|event| {
        info!(
            user_id = %event.user_id,
            username = %event.username,
            "welcome notification queued"
        );
        Ok(())
    });

    bus.subscribe::<UserLoggedIn, _>(|event| {
        // Security audit trail; a SIEM forwarder would hang off this line.
        info!(target: "security", user_id = %event.user_id, "login recorded");
        Ok(())
    });

    bus.subscribe::<UserFollowed, _>(|event| {
        info!(
            follower_id = %event.follower_id,
            followee_id = %event.followee_id,
            "follow notification queued"
        );
        Ok(())
    });

    bus.subscribe::<ArticleCreated, _>(|event| {
        info!(
            article_id = %event.article_id,
            slug = %event.slug,
            "notifying author followers of new article"
        );
        Ok(())
    });

    bus.subscribe::<ArticleDeleted, _>(|event| {
        info!(article_id = %event.article_id, "article removed from search index");
        Ok(())
    });

    bus.subscribe::<CommentAdded, _>(|event| {
        info!(
            comment_id = %event.comment_id,
            article_id = %event.article_id,
            "comment notification queued"
        );
        Ok(())
    });

    let counters = Arc::new(EngagementCounters::default());

    let favorites = Arc::clone(&counters);
    bus.subscribe_async::<ArticleFavorited, _>(move |event| {
        let counters = Arc::clone(&favorites);
        let article_id = event.article_id;
        Box::pin(async move {
            counters.favorites.fetch_add(1, Ordering::Relaxed);
            info!(article_id = %article_id, "favorite recorded for analytics");
            Ok(())
        })
    });

    let unfavorites = Arc::clone(&counters);
    bus.subscribe_async::<ArticleUnfavorited, _>(move |event| {
        let counters = Arc::clone(&unfavorites);
        let article_id = event.article_id;
        Box::pin(async move {
            counters.unfavorites.fetch_add(1, Ordering::Relaxed);
            info!(article_id = %article_id, "unfavorite recorded for analytics");
            Ok(())
        })
    });

    counters
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[tokio::test]
    async fn counters_track_favorite_events() {
        let mut bus = EventBus::new();
        let counters = register_default_handlers(&mut bus);

        let favorited = ArticleFavorited {
            article_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
        };
        bus.publish_async(&favorited).await;
        bus.publish_async(&favorited).await;
        bus.publish_async(&ArticleUnfavorited {
            article_id: favorited.article_id,
            user_id: favorited.user_id,
        })
        .await;

        assert_eq!(counters.favorites(), 2);
        assert_eq!(counters.unfavorites(), 1);
    }

    #[test]
    fn registration_covers_login_audit() {
        let mut bus = EventBus::new();
        register_default_handlers(&mut bus);
        assert_eq!(bus.subscriber_counts::<UserLoggedIn>().0, 1);
    }
}
