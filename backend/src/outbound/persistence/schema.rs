//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations under `migrations/` exactly.
//! They are used by Diesel for compile-time query validation and type-safe
//! SQL generation; regenerate with `diesel print-schema` after a migration
//! changes the schema.

diesel::table! {
    /// Registered user accounts.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        email -> Varchar,
        password_hash -> Varchar,
        bio -> Text,
        image -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Follow edges between users.
    followers (follower_id, followee_id) {
        follower_id -> Uuid,
        followee_id -> Uuid,
    }
}

diesel::table! {
    /// Published articles. Tags live inline as a text array, matching the
    /// API's tagList field.
    articles (id) {
        id -> Uuid,
        slug -> Varchar,
        title -> Varchar,
        description -> Text,
        body -> Text,
        tag_list -> Array<Text>,
        author_id -> Uuid,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Favorite edges between users and articles.
    article_favorites (user_id, article_id) {
        user_id -> Uuid,
        article_id -> Uuid,
    }
}

diesel::table! {
    /// Comments attached to articles.
    comments (id) {
        id -> Uuid,
        body -> Text,
        article_id -> Uuid,
        author_id -> Uuid,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(articles -> users (author_id));
diesel::joinable!(comments -> articles (article_id));
diesel::joinable!(article_favorites -> articles (article_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    followers,
    articles,
    article_favorites,
    comments,
);
