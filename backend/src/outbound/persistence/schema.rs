//! Diesel table definitions for the PostgreSQL schema.
//!
//! These must match `backend/migrations` exactly; `diesel print-schema`
//! regenerates them from a migrated database.

diesel::table! {
    /// Registered photographers.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        email -> Nullable<Varchar>,
        /// Argon2 PHC string.
        password_hash -> Text,
        first_name -> Varchar,
        last_name -> Varchar,
        bio -> Varchar,
        /// Remote asset identifier of the profile picture.
        avatar -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Photography projects; removed with their owner.
    projects (id) {
        id -> Uuid,
        owner_id -> Uuid,
        title -> Varchar,
        description -> Text,
        start_date -> Date,
        target_end -> Nullable<Date>,
        cover -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Photos; removed with their project.
    photos (id) {
        id -> Uuid,
        project_id -> Uuid,
        title -> Varchar,
        caption -> Text,
        image -> Text,
        byte_size -> Nullable<Int8>,
        content_type -> Nullable<Varchar>,
        width -> Nullable<Int4>,
        height -> Nullable<Int4>,
        exif -> Nullable<Jsonb>,
        featured -> Bool,
        needs_attention -> Bool,
        display_order -> Int4,
        uploaded_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(projects -> users (owner_id));
diesel::joinable!(photos -> projects (project_id));

diesel::allow_tables_to_appear_in_same_query!(users, projects, photos);
