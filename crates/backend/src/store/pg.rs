use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{Text, Uuid as SqlUuid};
use diesel::upsert::excluded;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use diesel_async::pooled_connection::deadpool::Object;
use shared_types::{CalendarEvent, Chat, ChatMessage, ChatSummary, JsonWrapper};
use uuid::Uuid;

use super::{
    AccountRepository, ChatPatch, ChatRepository, GoogleTokens, NewChat, StoreError, StoreResult,
};
use crate::db::DbPool;
use crate::models::{ChatChangeset, ChatRow, ChatSummaryRow, GoogleAccountRow, NewChatRow};

/// Postgres-backed store (diesel-async over a deadpool pool).
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

// Appends are done in SQL so concurrent writers don't drop each other's
// entries. Columns hold JSON arrays as TEXT.
const APPEND_MESSAGES_SQL: &str = "UPDATE chats \
     SET messages = (messages::jsonb || $1::jsonb)::text, updated_at = NOW() \
     WHERE id = $2 AND user_id = $3 \
     RETURNING id, user_id, title, messages, calendar_events, created_at, updated_at";

const APPEND_EVENTS_SQL: &str = "UPDATE chats \
     SET calendar_events = (calendar_events::jsonb || $1::jsonb)::text, updated_at = NOW() \
     WHERE id = $2 AND user_id = $3 \
     RETURNING id, user_id, title, messages, calendar_events, created_at, updated_at";

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> StoreResult<Object<AsyncPgConnection>> {
        Ok(self.pool.get().await?)
    }

    async fn append_json(
        &self,
        sql: &'static str,
        payload: String,
        user: &str,
        chat_id: Uuid,
    ) -> StoreResult<Option<ChatRow>> {
        let mut conn = self.conn().await?;
        let row = diesel::sql_query(sql)
            .bind::<Text, _>(payload)
            .bind::<SqlUuid, _>(chat_id)
            .bind::<Text, _>(user)
            .get_result::<ChatRow>(&mut conn)
            .await
            .optional()?;
        Ok(row)
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> StoreResult<String> {
    serde_json::to_string(value)
        .map_err(|e| StoreError::Database(diesel::result::Error::SerializationError(Box::new(e))))
}

#[async_trait]
impl ChatRepository for PgStore {
    async fn list_summaries(&self, user: &str) -> StoreResult<Vec<ChatSummary>> {
        use crate::schema::chats::dsl::*;

        let mut conn = self.conn().await?;
        let rows = chats
            .filter(user_id.eq(user))
            .order_by(updated_at.desc())
            .select(ChatSummaryRow::as_select())
            .load::<ChatSummaryRow>(&mut conn)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_full(&self, user: &str) -> StoreResult<Vec<Chat>> {
        use crate::schema::chats::dsl::*;

        let mut conn = self.conn().await?;
        let rows = chats
            .filter(user_id.eq(user))
            .order_by(updated_at.desc())
            .select(ChatRow::as_select())
            .load::<ChatRow>(&mut conn)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create(&self, user: &str, new_chat: NewChat) -> StoreResult<Chat> {
        use crate::schema::chats::dsl::*;

        let mut conn = self.conn().await?;
        let row = diesel::insert_into(chats)
            .values(NewChatRow {
                user_id: user,
                title: new_chat.resolved_title(),
                messages: JsonWrapper::new(new_chat.messages),
                calendar_events: JsonWrapper::new(new_chat.calendar_events),
            })
            .returning(ChatRow::as_returning())
            .get_result::<ChatRow>(&mut conn)
            .await?;

        Ok(row.into())
    }

    async fn get(&self, user: &str, chat_id: Uuid) -> StoreResult<Option<Chat>> {
        use crate::schema::chats::dsl::*;

        let mut conn = self.conn().await?;
        let row = chats
            .filter(id.eq(chat_id))
            .filter(user_id.eq(user))
            .select(ChatRow::as_select())
            .first::<ChatRow>(&mut conn)
            .await
            .optional()?;

        Ok(row.map(Into::into))
    }

    async fn update(
        &self,
        user: &str,
        chat_id: Uuid,
        patch: ChatPatch,
    ) -> StoreResult<Option<Chat>> {
        use crate::schema::chats::dsl::*;

        let changes = ChatChangeset {
            title: patch.effective_title().map(str::to_string),
            messages: patch.messages.map(JsonWrapper::new),
            calendar_events: patch.calendar_events.map(JsonWrapper::new),
            updated_at: Utc::now(),
        };

        let mut conn = self.conn().await?;
        let row = diesel::update(chats.filter(id.eq(chat_id)).filter(user_id.eq(user)))
            .set(&changes)
            .returning(ChatRow::as_returning())
            .get_result::<ChatRow>(&mut conn)
            .await
            .optional()?;

        Ok(row.map(Into::into))
    }

    async fn append_message(
        &self,
        user: &str,
        chat_id: Uuid,
        message: ChatMessage,
    ) -> StoreResult<Option<ChatMessage>> {
        let payload = to_json(&[&message])?;
        let row = self
            .append_json(APPEND_MESSAGES_SQL, payload, user, chat_id)
            .await?;
        Ok(row.map(|_| message))
    }

    async fn push_events(
        &self,
        user: &str,
        chat_id: Uuid,
        events: Vec<CalendarEvent>,
    ) -> StoreResult<Option<Chat>> {
        let payload = to_json(&events)?;
        let row = self
            .append_json(APPEND_EVENTS_SQL, payload, user, chat_id)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn delete(&self, user: &str, chat_id: Uuid) -> StoreResult<bool> {
        use crate::schema::chats::dsl::*;

        let mut conn = self.conn().await?;
        let deleted = diesel::delete(chats.filter(id.eq(chat_id)).filter(user_id.eq(user)))
            .execute(&mut conn)
            .await?;

        Ok(deleted > 0)
    }

    async fn list_all(&self, limit: i64) -> StoreResult<Vec<Chat>> {
        use crate::schema::chats::dsl::*;

        let mut conn = self.conn().await?;
        let rows = chats
            .order_by(created_at.asc())
            .limit(limit)
            .select(ChatRow::as_select())
            .load::<ChatRow>(&mut conn)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.conn().await?;
        diesel::sql_query("SELECT 1").execute(&mut conn).await?;
        Ok(())
    }
}

#[async_trait]
impl AccountRepository for PgStore {
    async fn upsert_tokens(&self, user_email: &str, tokens: GoogleTokens) -> StoreResult<()> {
        use crate::schema::google_accounts::dsl::*;

        let mut conn = self.conn().await?;
        diesel::insert_into(google_accounts)
            .values((
                email.eq(user_email),
                access_token.eq(&tokens.access_token),
                refresh_token.eq(&tokens.refresh_token),
                expires_at.eq(tokens.expires_at),
                updated_at.eq(Utc::now()),
            ))
            .on_conflict(email)
            .do_update()
            .set((
                access_token.eq(excluded(access_token)),
                // Google omits the refresh token after the first consent.
                refresh_token.eq(diesel::dsl::sql::<diesel::sql_types::Nullable<Text>>(
                    "COALESCE(EXCLUDED.refresh_token, google_accounts.refresh_token)",
                )),
                expires_at.eq(excluded(expires_at)),
                updated_at.eq(excluded(updated_at)),
            ))
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    async fn get_tokens(&self, user_email: &str) -> StoreResult<Option<GoogleTokens>> {
        use crate::schema::google_accounts::dsl::*;

        let mut conn = self.conn().await?;
        let row = google_accounts
            .filter(email.eq(user_email))
            .select(GoogleAccountRow::as_select())
            .first::<GoogleAccountRow>(&mut conn)
            .await
            .optional()?;

        Ok(row.map(Into::into))
    }

    async fn update_access_token(
        &self,
        user_email: &str,
        new_access_token: &str,
        new_expires_at: Option<DateTime<Utc>>,
    ) -> StoreResult<bool> {
        use crate::schema::google_accounts::dsl::*;

        let mut conn = self.conn().await?;
        let updated = diesel::update(google_accounts.filter(email.eq(user_email)))
            .set((
                access_token.eq(new_access_token),
                expires_at.eq(new_expires_at),
                updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .await?;

        Ok(updated > 0)
    }
}
