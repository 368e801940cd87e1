//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.
//!
//! # Maintenance
//!
//! When migrations change the schema, this file should be regenerated or
//! manually updated to reflect those changes. The `diesel print-schema`
//! command can generate these definitions from a live database.

diesel::table! {
    /// User accounts table.
    ///
    /// The `id` column is the primary key (UUID v4); `email` carries a unique
    /// index so duplicate signups surface as unique violations.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Display name (3 to 32 characters).
        name -> Varchar,
        /// Lowercased email address, unique.
        email -> Varchar,
        /// bcrypt hash of the account password.
        password_hash -> Varchar,
        /// Avatar location on the image host.
        avatar -> Nullable<Varchar>,
        /// Authorisation role in snake case.
        role -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Recipes table.
    ///
    /// Rows are removed with their author via `ON DELETE CASCADE`.
    recipes (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Author; foreign key to `users.id`.
        user_id -> Uuid,
        title -> Varchar,
        description -> Nullable<Text>,
        /// Ingredient lines in display order.
        ingredients -> Array<Text>,
        instructions -> Text,
        cook_time_minutes -> Nullable<Int4>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(recipes -> users (user_id));
diesel::allow_tables_to_appear_in_same_query!(recipes, users);
