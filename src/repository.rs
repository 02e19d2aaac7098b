use crate::models::{Comment, CommentFeedback, Post, PostFeedback, User, current_unix_timestamp};
use async_trait::async_trait;
use sqlx::{SqlitePool, query_builder::QueryBuilder};
use std::sync::Arc;

/// Repository Trait
///
/// Abstract contract for all persistence operations, so handlers interact
/// with the data layer without knowing the implementation behind it and
/// tests can substitute an in-memory store.
///
/// **Send + Sync + async_trait** make the trait object (`Arc<dyn Repository>`)
/// shareable across axum's asynchronous task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn get_user(&self, id: &str) -> sqlx::Result<Option<User>>;
    async fn create_user(&self, user: &User) -> sqlx::Result<()>;
    async fn list_users(&self, offset: i64, limit: i64) -> sqlx::Result<Vec<User>>;
    async fn count_users(&self) -> sqlx::Result<i64>;

    // --- Posts ---
    async fn get_post(&self, id: i64) -> sqlx::Result<Option<Post>>;
    async fn create_post(&self, title: &str, content: &str, user_id: &str) -> sqlx::Result<Post>;
    // Overwrites title/content/updated_at of an existing row.
    async fn update_post(&self, post: &Post) -> sqlx::Result<()>;
    // Returns false when no row had the id.
    async fn delete_post(&self, id: i64) -> sqlx::Result<bool>;
    async fn list_posts(&self, offset: i64, limit: i64) -> sqlx::Result<Vec<Post>>;
    async fn count_posts(&self) -> sqlx::Result<i64>;

    // --- Comments ---
    async fn get_comment(&self, id: i64) -> sqlx::Result<Option<Comment>>;
    async fn create_comment(
        &self,
        post_id: i64,
        content: &str,
        user_id: &str,
    ) -> sqlx::Result<Comment>;
    async fn update_comment(&self, comment: &Comment) -> sqlx::Result<()>;
    async fn delete_comment(&self, id: i64) -> sqlx::Result<bool>;
    async fn list_comments(
        &self,
        post_id: Option<i64>,
        offset: i64,
        limit: i64,
    ) -> sqlx::Result<Vec<Comment>>;
    async fn count_comments(&self, post_id: Option<i64>) -> sqlx::Result<i64>;

    // --- Post feedback ---
    async fn get_post_feedback(&self, id: i64) -> sqlx::Result<Option<PostFeedback>>;
    /// Atomic create-or-update for the (post, user) pair; the returned flag
    /// is true when a fresh row was inserted.
    async fn upsert_post_feedback(
        &self,
        post_id: i64,
        user_id: &str,
        like: bool,
    ) -> sqlx::Result<(PostFeedback, bool)>;
    async fn delete_post_feedback(&self, id: i64) -> sqlx::Result<bool>;
    async fn list_post_feedbacks(
        &self,
        post_id: Option<i64>,
        offset: i64,
        limit: i64,
    ) -> sqlx::Result<Vec<PostFeedback>>;
    async fn count_post_feedbacks(&self, post_id: Option<i64>) -> sqlx::Result<i64>;

    // --- Comment feedback (mirror of post feedback) ---
    async fn get_comment_feedback(&self, id: i64) -> sqlx::Result<Option<CommentFeedback>>;
    async fn upsert_comment_feedback(
        &self,
        comment_id: i64,
        user_id: &str,
        like: bool,
    ) -> sqlx::Result<(CommentFeedback, bool)>;
    async fn delete_comment_feedback(&self, id: i64) -> sqlx::Result<bool>;
    async fn list_comment_feedbacks(
        &self,
        comment_id: Option<i64>,
        offset: i64,
        limit: i64,
    ) -> sqlx::Result<Vec<CommentFeedback>>;
    async fn count_comment_feedbacks(&self, comment_id: Option<i64>) -> sqlx::Result<i64>;
}

/// The concrete type used to share the persistence layer across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

/// SqliteRepository
///
/// Concrete implementation of the `Repository` trait backed by SQLite.
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates all tables if absent. Run once at startup before the server
    /// accepts traffic. The UNIQUE pairs on the feedback tables back the
    /// atomic upsert in `upsert_*_feedback`.
    pub async fn create_schema(pool: &SqlitePool) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user (
                id         TEXT PRIMARY KEY,
                name       TEXT NOT NULL,
                password   TEXT NOT NULL,
                role       TEXT NOT NULL DEFAULT 'COMMON',
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS post (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                title      TEXT NOT NULL,
                content    TEXT NOT NULL,
                user_id    TEXT NOT NULL REFERENCES user (id),
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS comment (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                post_id    INTEGER NOT NULL REFERENCES post (id),
                user_id    TEXT NOT NULL REFERENCES user (id),
                content    TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS feedback_post (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                post_id    INTEGER NOT NULL REFERENCES post (id),
                user_id    TEXT NOT NULL REFERENCES user (id),
                "like"     INTEGER NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                UNIQUE (post_id, user_id)
            )
            "#,
        )
        .execute(pool)
        .await?;
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS feedback_comment (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                comment_id INTEGER NOT NULL REFERENCES comment (id),
                user_id    TEXT NOT NULL REFERENCES user (id),
                "like"     INTEGER NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                UNIQUE (comment_id, user_id)
            )
            "#,
        )
        .execute(pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl Repository for SqliteRepository {
    async fn get_user(&self, id: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            "SELECT id, name, password, role, created_at, updated_at FROM user WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_user(&self, user: &User) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user (id, name, password, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.password)
        .bind(user.role)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_users(&self, offset: i64, limit: i64) -> sqlx::Result<Vec<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, password, role, created_at, updated_at
            FROM user ORDER BY id ASC LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn count_users(&self) -> sqlx::Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM user")
            .fetch_one(&self.pool)
            .await
    }

    /// Single post with its author's name joined in.
    async fn get_post(&self, id: i64) -> sqlx::Result<Option<Post>> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT p.id, p.title, p.content, p.user_id, p.created_at, p.updated_at,
                   u.name AS user_name
            FROM post p JOIN user u ON p.user_id = u.id
            WHERE p.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_post(&self, title: &str, content: &str, user_id: &str) -> sqlx::Result<Post> {
        let now = current_unix_timestamp();
        sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO post (title, content, user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, title, content, user_id, created_at, updated_at
            "#,
        )
        .bind(title)
        .bind(content)
        .bind(user_id)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_post(&self, post: &Post) -> sqlx::Result<()> {
        sqlx::query("UPDATE post SET title = ?, content = ?, updated_at = ? WHERE id = ?")
            .bind(&post.title)
            .bind(&post.content)
            .bind(post.updated_at)
            .bind(post.id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_post(&self, id: i64) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM post WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Ordered by primary key ascending before slicing, so pagination is
    /// stable across calls absent concurrent writes.
    async fn list_posts(&self, offset: i64, limit: i64) -> sqlx::Result<Vec<Post>> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT p.id, p.title, p.content, p.user_id, p.created_at, p.updated_at,
                   u.name AS user_name
            FROM post p JOIN user u ON p.user_id = u.id
            ORDER BY p.id ASC LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn count_posts(&self) -> sqlx::Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM post")
            .fetch_one(&self.pool)
            .await
    }

    async fn get_comment(&self, id: i64) -> sqlx::Result<Option<Comment>> {
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT c.id, c.post_id, c.user_id, c.content, c.created_at, c.updated_at,
                   u.name AS user_name
            FROM comment c JOIN user u ON c.user_id = u.id
            WHERE c.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_comment(
        &self,
        post_id: i64,
        content: &str,
        user_id: &str,
    ) -> sqlx::Result<Comment> {
        let now = current_unix_timestamp();
        sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comment (post_id, user_id, content, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, post_id, user_id, content, created_at, updated_at
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .bind(content)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_comment(&self, comment: &Comment) -> sqlx::Result<()> {
        sqlx::query("UPDATE comment SET content = ?, updated_at = ? WHERE id = ?")
            .bind(&comment.content)
            .bind(comment.updated_at)
            .bind(comment.id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_comment(&self, id: i64) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM comment WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Optional post filter via QueryBuilder-bound parameters, never string
    /// interpolation.
    async fn list_comments(
        &self,
        post_id: Option<i64>,
        offset: i64,
        limit: i64,
    ) -> sqlx::Result<Vec<Comment>> {
        let mut builder: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new(
            r#"
            SELECT c.id, c.post_id, c.user_id, c.content, c.created_at, c.updated_at,
                   u.name AS user_name
            FROM comment c JOIN user u ON c.user_id = u.id
            "#,
        );
        if let Some(post_id) = post_id {
            builder.push(" WHERE c.post_id = ");
            builder.push_bind(post_id);
        }
        builder.push(" ORDER BY c.id ASC LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);
        builder
            .build_query_as::<Comment>()
            .fetch_all(&self.pool)
            .await
    }

    async fn count_comments(&self, post_id: Option<i64>) -> sqlx::Result<i64> {
        let mut builder: QueryBuilder<sqlx::Sqlite> =
            QueryBuilder::new("SELECT COUNT(*) FROM comment");
        if let Some(post_id) = post_id {
            builder.push(" WHERE post_id = ");
            builder.push_bind(post_id);
        }
        let row: (i64,) = builder.build_query_as().fetch_one(&self.pool).await?;
        Ok(row.0)
    }

    async fn get_post_feedback(&self, id: i64) -> sqlx::Result<Option<PostFeedback>> {
        sqlx::query_as::<_, PostFeedback>(
            r#"
            SELECT f.id, f.post_id, f.user_id, f."like", f.created_at, f.updated_at,
                   u.name AS user_name
            FROM feedback_post f JOIN user u ON f.user_id = u.id
            WHERE f.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Insert-or-nothing first, then update on conflict. The UNIQUE
    /// (post_id, user_id) constraint guarantees concurrent toggles collapse
    /// onto the same row instead of racing a check-then-act pair.
    async fn upsert_post_feedback(
        &self,
        post_id: i64,
        user_id: &str,
        like: bool,
    ) -> sqlx::Result<(PostFeedback, bool)> {
        let now = current_unix_timestamp();
        let inserted = sqlx::query_as::<_, PostFeedback>(
            r#"
            INSERT INTO feedback_post (post_id, user_id, "like", created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (post_id, user_id) DO NOTHING
            RETURNING id, post_id, user_id, "like", created_at, updated_at
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .bind(like)
        .bind(now)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(feedback) = inserted {
            return Ok((feedback, true));
        }

        let updated = sqlx::query_as::<_, PostFeedback>(
            r#"
            UPDATE feedback_post SET "like" = ?, updated_at = ?
            WHERE post_id = ? AND user_id = ?
            RETURNING id, post_id, user_id, "like", created_at, updated_at
            "#,
        )
        .bind(like)
        .bind(now)
        .bind(post_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;

        Ok((updated, false))
    }

    async fn delete_post_feedback(&self, id: i64) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM feedback_post WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_post_feedbacks(
        &self,
        post_id: Option<i64>,
        offset: i64,
        limit: i64,
    ) -> sqlx::Result<Vec<PostFeedback>> {
        let mut builder: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new(
            r#"
            SELECT f.id, f.post_id, f.user_id, f."like", f.created_at, f.updated_at,
                   u.name AS user_name
            FROM feedback_post f JOIN user u ON f.user_id = u.id
            "#,
        );
        if let Some(post_id) = post_id {
            builder.push(" WHERE f.post_id = ");
            builder.push_bind(post_id);
        }
        builder.push(" ORDER BY f.id ASC LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);
        builder
            .build_query_as::<PostFeedback>()
            .fetch_all(&self.pool)
            .await
    }

    async fn count_post_feedbacks(&self, post_id: Option<i64>) -> sqlx::Result<i64> {
        let mut builder: QueryBuilder<sqlx::Sqlite> =
            QueryBuilder::new("SELECT COUNT(*) FROM feedback_post");
        if let Some(post_id) = post_id {
            builder.push(" WHERE post_id = ");
            builder.push_bind(post_id);
        }
        let row: (i64,) = builder.build_query_as().fetch_one(&self.pool).await?;
        Ok(row.0)
    }

    async fn get_comment_feedback(&self, id: i64) -> sqlx::Result<Option<CommentFeedback>> {
        sqlx::query_as::<_, CommentFeedback>(
            r#"
            SELECT f.id, f.comment_id, f.user_id, f."like", f.created_at, f.updated_at,
                   u.name AS user_name
            FROM feedback_comment f JOIN user u ON f.user_id = u.id
            WHERE f.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn upsert_comment_feedback(
        &self,
        comment_id: i64,
        user_id: &str,
        like: bool,
    ) -> sqlx::Result<(CommentFeedback, bool)> {
        let now = current_unix_timestamp();
        let inserted = sqlx::query_as::<_, CommentFeedback>(
            r#"
            INSERT INTO feedback_comment (comment_id, user_id, "like", created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (comment_id, user_id) DO NOTHING
            RETURNING id, comment_id, user_id, "like", created_at, updated_at
            "#,
        )
        .bind(comment_id)
        .bind(user_id)
        .bind(like)
        .bind(now)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(feedback) = inserted {
            return Ok((feedback, true));
        }

        let updated = sqlx::query_as::<_, CommentFeedback>(
            r#"
            UPDATE feedback_comment SET "like" = ?, updated_at = ?
            WHERE comment_id = ? AND user_id = ?
            RETURNING id, comment_id, user_id, "like", created_at, updated_at
            "#,
        )
        .bind(like)
        .bind(now)
        .bind(comment_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;

        Ok((updated, false))
    }

    async fn delete_comment_feedback(&self, id: i64) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM feedback_comment WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_comment_feedbacks(
        &self,
        comment_id: Option<i64>,
        offset: i64,
        limit: i64,
    ) -> sqlx::Result<Vec<CommentFeedback>> {
        let mut builder: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new(
            r#"
            SELECT f.id, f.comment_id, f.user_id, f."like", f.created_at, f.updated_at,
                   u.name AS user_name
            FROM feedback_comment f JOIN user u ON f.user_id = u.id
            "#,
        );
        if let Some(comment_id) = comment_id {
            builder.push(" WHERE f.comment_id = ");
            builder.push_bind(comment_id);
        }
        builder.push(" ORDER BY f.id ASC LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);
        builder
            .build_query_as::<CommentFeedback>()
            .fetch_all(&self.pool)
            .await
    }

    async fn count_comment_feedbacks(&self, comment_id: Option<i64>) -> sqlx::Result<i64> {
        let mut builder: QueryBuilder<sqlx::Sqlite> =
            QueryBuilder::new("SELECT COUNT(*) FROM feedback_comment");
        if let Some(comment_id) = comment_id {
            builder.push(" WHERE comment_id = ");
            builder.push_bind(comment_id);
        }
        let row: (i64,) = builder.build_query_as().fetch_one(&self.pool).await?;
        Ok(row.0)
    }
}
