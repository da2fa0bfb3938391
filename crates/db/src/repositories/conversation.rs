use chrono::{SecondsFormat, Utc};
use sqlx::Row;

use vendy_core::domain::message::{ChatTurn, MessageRole};
use vendy_core::domain::user::ChatUser;

use super::{ConversationRepository, RepositoryError};
use crate::DbPool;

pub struct SqlConversationRepository {
    pool: DbPool,
}

impl SqlConversationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ConversationRepository for SqlConversationRepository {
    async fn append(
        &self,
        user: &ChatUser,
        role: MessageRole,
        content: &str,
        produto_id: Option<i64>,
    ) -> Result<(), RepositoryError> {
        // Fixed-width timestamps keep the (timestamp, id) sort key stable
        // under lexicographic comparison.
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO users (user_id, first_name, username, last_interaction)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                last_interaction = excluded.last_interaction,
                first_name = COALESCE(users.first_name, excluded.first_name),
                username = COALESCE(users.username, excluded.username)
            "#,
        )
        .bind(user.id)
        .bind(user.first_name.as_deref())
        .bind(user.username.as_deref())
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO messages (user_id, role, content, produto_id, timestamp) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(user.id)
        .bind(role.as_str())
        .bind(content)
        .bind(produto_id)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn recent(&self, user_id: i64, limit: i64) -> Result<Vec<ChatTurn>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT role, content
            FROM messages
            WHERE user_id = ?
            ORDER BY timestamp DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await?;

        let mut turns = rows
            .into_iter()
            .map(|row| {
                let role: String = row.try_get("role")?;
                let role = role
                    .parse::<MessageRole>()
                    .map_err(|err| RepositoryError::Decode(err.to_string()))?;
                Ok(ChatTurn::new(role, row.try_get::<String, _>("content")?))
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;

        // Fetched newest-first for the LIMIT, replayed oldest-first.
        turns.reverse();
        Ok(turns)
    }
}

#[cfg(test)]
mod tests {
    use sqlx::Row;

    use vendy_core::domain::message::MessageRole;
    use vendy_core::domain::user::ChatUser;

    use crate::repositories::{ConversationRepository, SqlConversationRepository};
    use crate::{connect_with_settings, migrations, DbPool};

    async fn conversation_pool() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        pool
    }

    fn user_fixture() -> ChatUser {
        ChatUser::with_names(42, Some("Ana".to_string()), Some("ana_vendas".to_string()))
    }

    #[tokio::test]
    async fn append_then_recent_round_trips_in_chronological_order() {
        let pool = conversation_pool().await;
        let repo = SqlConversationRepository::new(pool);
        let user = user_fixture();

        repo.append(&user, MessageRole::User, "hello", None).await.expect("append user turn");
        repo.append(&user, MessageRole::Assistant, "oi!", None)
            .await
            .expect("append assistant turn");

        let turns = repo.recent(user.id, 6).await.expect("recent");

        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, MessageRole::User);
        assert_eq!(turns[0].content, "hello");
        assert_eq!(turns[1].role, MessageRole::Assistant);
        assert_eq!(turns[1].content, "oi!");
    }

    #[tokio::test]
    async fn recent_keeps_only_the_newest_limit_turns() {
        let pool = conversation_pool().await;
        let repo = SqlConversationRepository::new(pool);
        let user = user_fixture();

        for index in 0..8 {
            repo.append(&user, MessageRole::User, &format!("msg {index}"), None)
                .await
                .expect("append");
        }

        let turns = repo.recent(user.id, 6).await.expect("recent");

        assert_eq!(turns.len(), 6);
        assert_eq!(turns.first().map(|turn| turn.content.as_str()), Some("msg 2"));
        assert_eq!(turns.last().map(|turn| turn.content.as_str()), Some("msg 7"));
    }

    #[tokio::test]
    async fn upsert_fills_profile_fields_only_when_previously_null() {
        let pool = conversation_pool().await;
        let repo = SqlConversationRepository::new(pool.clone());

        let anonymous = ChatUser::new(7);
        repo.append(&anonymous, MessageRole::User, "primeiro", None).await.expect("append");

        let named = ChatUser::with_names(7, Some("Bruno".to_string()), None);
        repo.append(&named, MessageRole::User, "segundo", None).await.expect("append");

        let renamed = ChatUser::with_names(7, Some("Outro".to_string()), None);
        repo.append(&renamed, MessageRole::User, "terceiro", None).await.expect("append");

        let row = sqlx::query("SELECT first_name, username FROM users WHERE user_id = 7")
            .fetch_one(&pool)
            .await
            .expect("load user row");

        assert_eq!(row.get::<Option<String>, _>("first_name").as_deref(), Some("Bruno"));
        assert_eq!(row.get::<Option<String>, _>("username"), None);
    }

    #[tokio::test]
    async fn every_append_refreshes_last_interaction() {
        let pool = conversation_pool().await;
        let repo = SqlConversationRepository::new(pool.clone());
        let user = user_fixture();

        repo.append(&user, MessageRole::User, "primeiro", None).await.expect("append");
        let first: String = sqlx::query("SELECT last_interaction FROM users WHERE user_id = ?")
            .bind(user.id)
            .fetch_one(&pool)
            .await
            .expect("load user")
            .get("last_interaction");

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        repo.append(&user, MessageRole::Assistant, "segundo", None).await.expect("append");
        let second: String = sqlx::query("SELECT last_interaction FROM users WHERE user_id = ?")
            .bind(user.id)
            .fetch_one(&pool)
            .await
            .expect("load user")
            .get("last_interaction");

        assert!(second >= first, "last_interaction should move forward");
        let message_count: i64 = sqlx::query("SELECT COUNT(*) AS count FROM messages")
            .fetch_one(&pool)
            .await
            .expect("count messages")
            .get("count");
        assert_eq!(message_count, 2, "user upsert must not duplicate message rows");
    }

    #[tokio::test]
    async fn related_product_id_is_persisted_with_the_message() {
        let pool = conversation_pool().await;
        sqlx::query(
            "INSERT INTO produtos (sku, produto, capacidade, preco_base, desconto_max) \
             VALUES ('ACAI-1KG', 'Açaí Premium 1KG', '1KG', '50.00', '10')",
        )
        .execute(&pool)
        .await
        .expect("insert product");
        let produto_id: i64 = sqlx::query("SELECT id FROM produtos WHERE sku = 'ACAI-1KG'")
            .fetch_one(&pool)
            .await
            .expect("load product id")
            .get("id");

        let repo = SqlConversationRepository::new(pool.clone());
        repo.append(&user_fixture(), MessageRole::Assistant, "resposta", Some(produto_id))
            .await
            .expect("append");

        let stored: Option<i64> = sqlx::query("SELECT produto_id FROM messages LIMIT 1")
            .fetch_one(&pool)
            .await
            .expect("load message")
            .get("produto_id");
        assert_eq!(stored, Some(produto_id));
    }

    #[tokio::test]
    async fn recent_for_an_unknown_user_is_empty() {
        let pool = conversation_pool().await;
        let repo = SqlConversationRepository::new(pool);

        let turns = repo.recent(999, 6).await.expect("recent");

        assert!(turns.is_empty());
    }
}
