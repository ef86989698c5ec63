//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Accounts and their credential material.
    users (id) {
        id -> Uuid,
        name -> Varchar,
        email -> Text,
        phone -> Varchar,
        address -> Varchar,
        avatar_id -> Varchar,
        avatar_url -> Text,
        role -> Varchar,
        password_hash -> Text,
        /// SHA-256 hex digest of the live refresh token.
        refresh_token_digest -> Nullable<Varchar>,
        /// SHA-256 hex digest of the pending password-reset token.
        reset_token_digest -> Nullable<Varchar>,
        reset_token_expires_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Restaurant listings. `rating` and `rating_count` are written only by
    /// the review adapter.
    restaurants (id) {
        id -> Uuid,
        owner_id -> Uuid,
        name -> Varchar,
        email -> Text,
        contact -> Varchar,
        address -> Varchar,
        city -> Varchar,
        postal_code -> Varchar,
        latitude -> Float8,
        longitude -> Float8,
        categories -> Array<Text>,
        opening_time -> Time,
        closing_time -> Time,
        status -> Varchar,
        logo_id -> Varchar,
        logo_url -> Text,
        rating -> Float8,
        rating_count -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Menu items; deleting a restaurant cascades here.
    menu_items (id) {
        id -> Uuid,
        restaurant_id -> Uuid,
        name -> Varchar,
        description -> Varchar,
        price -> Float8,
        category -> Varchar,
        is_available -> Bool,
        image_id -> Varchar,
        image_url -> Text,
        rating -> Float8,
        rating_count -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Reviews. Exactly one of `restaurant_id` and `menu_item_id` is set.
    reviews (id) {
        id -> Uuid,
        author_id -> Uuid,
        restaurant_id -> Nullable<Uuid>,
        menu_item_id -> Nullable<Uuid>,
        rating -> Int2,
        review -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(restaurants -> users (owner_id));
diesel::joinable!(menu_items -> restaurants (restaurant_id));
diesel::joinable!(reviews -> users (author_id));

diesel::allow_tables_to_appear_in_same_query!(users, restaurants, menu_items, reviews);
