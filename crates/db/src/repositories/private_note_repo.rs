//! Repository for the `private_notes` table.
//!
//! Every statement here filters by `author_id`. That is the privacy
//! invariant: there is no code path that reads another user's notes, and no
//! method signature that could be called without an author.

use hourbank_core::types::DbId;
use sqlx::PgPool;

use crate::models::private_note::{CreatePrivateNote, PrivateNote, UpdatePrivateNote};

/// Column list for `private_notes` queries.
const COLUMNS: &str = "id, author_id, subject_id, tag_slug, note, created_at, updated_at";

/// Provides author-scoped CRUD for private notes.
pub struct PrivateNoteRepo;

impl PrivateNoteRepo {
    /// Create a note, returning the full row.
    pub async fn create(
        pool: &PgPool,
        author_id: DbId,
        input: &CreatePrivateNote,
    ) -> Result<PrivateNote, sqlx::Error> {
        let query = format!(
            "INSERT INTO private_notes (author_id, subject_id, tag_slug, note) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PrivateNote>(&query)
            .bind(author_id)
            .bind(input.subject_id)
            .bind(&input.tag_slug)
            .bind(input.note.as_deref())
            .fetch_one(pool)
            .await
    }

    /// List the author's notes, optionally restricted to one subject.
    pub async fn list_for_author(
        pool: &PgPool,
        author_id: DbId,
        subject_id: Option<DbId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PrivateNote>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM private_notes \
             WHERE author_id = $1 AND ($2::bigint IS NULL OR subject_id = $2) \
             ORDER BY created_at DESC \
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, PrivateNote>(&query)
            .bind(author_id)
            .bind(subject_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// The author's most recent note about a subject, if any. Used at the
    /// presentation boundary to annotate worked-with summaries.
    pub async fn latest_for_subject(
        pool: &PgPool,
        author_id: DbId,
        subject_id: DbId,
    ) -> Result<Option<PrivateNote>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM private_notes \
             WHERE author_id = $1 AND subject_id = $2 \
             ORDER BY created_at DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, PrivateNote>(&query)
            .bind(author_id)
            .bind(subject_id)
            .fetch_optional(pool)
            .await
    }

    /// Update one of the author's own notes.
    ///
    /// Returns the updated row, or `None` when the note does not exist *or*
    /// belongs to someone else -- callers cannot distinguish the two, by
    /// design.
    pub async fn update(
        pool: &PgPool,
        author_id: DbId,
        note_id: DbId,
        input: &UpdatePrivateNote,
    ) -> Result<Option<PrivateNote>, sqlx::Error> {
        let query = format!(
            "UPDATE private_notes \
             SET tag_slug = COALESCE($3, tag_slug), \
                 note = COALESCE($4, note), \
                 updated_at = NOW() \
             WHERE id = $1 AND author_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PrivateNote>(&query)
            .bind(note_id)
            .bind(author_id)
            .bind(input.tag_slug.as_deref())
            .bind(input.note.as_deref())
            .fetch_optional(pool)
            .await
    }

    /// Delete one of the author's own notes.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(
        pool: &PgPool,
        author_id: DbId,
        note_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM private_notes WHERE id = $1 AND author_id = $2")
            .bind(note_id)
            .bind(author_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
