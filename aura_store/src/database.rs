use async_trait::async_trait;
use aura_core::{Message, MessageStore, NewMessage, Sender};
use aura_entities::messages;
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Schema, Set, TransactionTrait,
};
use tracing::{debug, info};

fn is_table_already_exists_error(err: &DbErr) -> bool {
    err.to_string().contains("table") && err.to_string().contains("already exists")
}

fn limit_to_u64(limit: usize) -> u64 {
    u64::try_from(limit).unwrap_or(u64::MAX)
}

fn message_from_model(model: messages::Model) -> anyhow::Result<Message> {
    let timestamp = DateTime::<Utc>::from_timestamp_micros(model.timestamp_us).ok_or_else(|| {
        anyhow::anyhow!(
            "Stored timestamp out of range for message {}: {}",
            model.id,
            model.timestamp_us
        )
    })?;

    Ok(Message {
        id: model.id,
        conversation_id: model.conversation_id,
        sender: Sender::from_label(&model.sender),
        text: model.text,
        timestamp,
        sentiment: model.sentiment,
    })
}

async fn insert_message<C>(conn: &C, message: NewMessage) -> anyhow::Result<i64>
where
    C: ConnectionTrait + Sync,
{
    let model = messages::ActiveModel {
        conversation_id: Set(message.conversation_id.clone()),
        sender: Set(message.sender.as_str().to_string()),
        text: Set(message.text),
        timestamp_us: Set(message.timestamp.timestamp_micros()),
        sentiment: Set(message.sentiment),
        ..Default::default()
    };

    let inserted = messages::Entity::insert(model).exec(conn).await?;

    debug!(
        "Added {} message {} to conversation: {}",
        message.sender, inserted.last_insert_id, message.conversation_id
    );
    Ok(inserted.last_insert_id)
}

/// Message store backed by a sea-orm connection (sqlite or postgres).
pub struct DatabaseMessageStore {
    db: DatabaseConnection,
}

impl DatabaseMessageStore {
    /// Connect to `database_url` and make sure the `messages` table exists.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        info!("Connecting to database for DatabaseMessageStore");
        let db = Database::connect(database_url).await?;
        Self::from_connection(db).await
    }

    /// Wrap an existing connection, creating the schema if needed.
    pub async fn from_connection(db: DatabaseConnection) -> anyhow::Result<Self> {
        let backend = db.get_database_backend();
        let schema = Schema::new(backend);
        let stmt = schema.create_table_from_entity(messages::Entity);
        match db
            .execute_unprepared(&backend.build(&stmt).to_string())
            .await
        {
            Ok(_) => {}
            Err(e) if is_table_already_exists_error(&e) => {
                info!("Table already exists, skipping creation");
            }
            Err(e) => return Err(e.into()),
        }

        info!("DatabaseMessageStore initialized");
        Ok(Self { db })
    }

    /// Get a reference to the database connection.
    #[must_use]
    pub const fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Check that the database still answers.
    pub async fn ping(&self) -> anyhow::Result<()> {
        self.db.ping().await?;
        Ok(())
    }

    /// Close the underlying pool.
    pub async fn close(self) -> anyhow::Result<()> {
        self.db.close().await?;
        info!("DatabaseMessageStore closed");
        Ok(())
    }
}

#[async_trait]
impl MessageStore for DatabaseMessageStore {
    async fn insert(&self, message: NewMessage) -> anyhow::Result<i64> {
        insert_message(&self.db, message).await
    }

    async fn insert_exchange(
        &self,
        user: NewMessage,
        assistant: NewMessage,
    ) -> anyhow::Result<(i64, i64)> {
        // Dropping the transaction without commit rolls back the user row.
        let txn = self.db.begin().await?;
        let user_id = insert_message(&txn, user).await?;
        let assistant_id = insert_message(&txn, assistant).await?;
        txn.commit().await?;
        Ok((user_id, assistant_id))
    }

    async fn query_recent(
        &self,
        conversation_id: &str,
        limit: usize,
    ) -> anyhow::Result<Vec<Message>> {
        messages::Entity::find()
            .filter(messages::Column::ConversationId.eq(conversation_id))
            .order_by_desc(messages::Column::TimestampUs)
            .order_by_desc(messages::Column::Id)
            .limit(limit_to_u64(limit))
            .all(&self.db)
            .await?
            .into_iter()
            .map(message_from_model)
            .collect()
    }

    async fn count(&self, conversation_id: &str) -> anyhow::Result<u64> {
        let count = messages::Entity::find()
            .filter(messages::Column::ConversationId.eq(conversation_id))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    async fn recent_scored_user_messages(
        &self,
        conversation_id: &str,
        limit: usize,
    ) -> anyhow::Result<Vec<Message>> {
        messages::Entity::find()
            .filter(messages::Column::ConversationId.eq(conversation_id))
            .filter(messages::Column::Sender.eq(Sender::User.as_str()))
            .filter(messages::Column::Sentiment.is_not_null())
            .order_by_desc(messages::Column::TimestampUs)
            .order_by_desc(messages::Column::Id)
            .limit(limit_to_u64(limit))
            .all(&self.db)
            .await?
            .into_iter()
            .map(message_from_model)
            .collect()
    }
}
