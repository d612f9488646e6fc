use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared_types::{CalendarEvent, Chat, ChatMessage, ChatSummary};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    AccountRepository, ChatPatch, ChatRepository, GoogleTokens, NewChat, StoreResult,
};

/// Process-local store used when no database is configured.
#[derive(Default)]
pub struct MemoryStore {
    chats: RwLock<HashMap<Uuid, Chat>>,
    accounts: RwLock<HashMap<String, GoogleTokens>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(chats: &mut [Chat]) {
    chats.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}

fn owned_by<'a>(
    chats: &'a mut HashMap<Uuid, Chat>,
    user_id: &str,
    id: Uuid,
) -> Option<&'a mut Chat> {
    chats.get_mut(&id).filter(|c| c.user_id == user_id)
}

#[async_trait]
impl ChatRepository for MemoryStore {
    async fn list_summaries(&self, user_id: &str) -> StoreResult<Vec<ChatSummary>> {
        let chats = self.list_full(user_id).await?;
        Ok(chats.iter().map(ChatSummary::from).collect())
    }

    async fn list_full(&self, user_id: &str) -> StoreResult<Vec<Chat>> {
        let mut chats: Vec<Chat> = self
            .chats
            .read()
            .await
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut chats);
        Ok(chats)
    }

    async fn create(&self, user_id: &str, new_chat: NewChat) -> StoreResult<Chat> {
        let now = Utc::now();
        let chat = Chat {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            title: new_chat.resolved_title(),
            messages: new_chat.messages,
            calendar_events: new_chat.calendar_events,
            created_at: now,
            updated_at: now,
        };
        self.chats.write().await.insert(chat.id, chat.clone());
        Ok(chat)
    }

    async fn get(&self, user_id: &str, id: Uuid) -> StoreResult<Option<Chat>> {
        Ok(self
            .chats
            .read()
            .await
            .get(&id)
            .filter(|c| c.user_id == user_id)
            .cloned())
    }

    async fn update(
        &self,
        user_id: &str,
        id: Uuid,
        patch: ChatPatch,
    ) -> StoreResult<Option<Chat>> {
        let mut chats = self.chats.write().await;
        Ok(owned_by(&mut chats, user_id, id).map(|chat| {
            patch.apply(chat, Utc::now());
            chat.clone()
        }))
    }

    async fn append_message(
        &self,
        user_id: &str,
        id: Uuid,
        message: ChatMessage,
    ) -> StoreResult<Option<ChatMessage>> {
        let mut chats = self.chats.write().await;
        Ok(owned_by(&mut chats, user_id, id).map(|chat| {
            chat.messages.push(message.clone());
            chat.updated_at = Utc::now();
            message
        }))
    }

    async fn push_events(
        &self,
        user_id: &str,
        id: Uuid,
        events: Vec<CalendarEvent>,
    ) -> StoreResult<Option<Chat>> {
        let mut chats = self.chats.write().await;
        Ok(owned_by(&mut chats, user_id, id).map(|chat| {
            chat.calendar_events.extend(events);
            chat.updated_at = Utc::now();
            chat.clone()
        }))
    }

    async fn delete(&self, user_id: &str, id: Uuid) -> StoreResult<bool> {
        let mut chats = self.chats.write().await;
        if owned_by(&mut chats, user_id, id).is_some() {
            chats.remove(&id);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn list_all(&self, limit: i64) -> StoreResult<Vec<Chat>> {
        let limit = usize::try_from(limit).unwrap_or(0);
        let mut chats: Vec<Chat> = self.chats.read().await.values().cloned().collect();
        chats.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        chats.truncate(limit);
        Ok(chats)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl AccountRepository for MemoryStore {
    async fn upsert_tokens(&self, email: &str, tokens: GoogleTokens) -> StoreResult<()> {
        let mut accounts = self.accounts.write().await;
        let refresh_token = tokens.refresh_token.or_else(|| {
            accounts
                .get(email)
                .and_then(|existing| existing.refresh_token.clone())
        });
        accounts.insert(
            email.to_string(),
            GoogleTokens {
                refresh_token,
                ..tokens
            },
        );
        Ok(())
    }

    async fn get_tokens(&self, email: &str) -> StoreResult<Option<GoogleTokens>> {
        Ok(self.accounts.read().await.get(email).cloned())
    }

    async fn update_access_token(
        &self,
        email: &str,
        access_token: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> StoreResult<bool> {
        let mut accounts = self.accounts.write().await;
        match accounts.get_mut(email) {
            Some(tokens) => {
                tokens.access_token = access_token.to_string();
                tokens.expires_at = expires_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::Role;

    const ALICE: &str = "alice@example.com";
    const BOB: &str = "bob@example.com";

    #[tokio::test]
    async fn chats_are_scoped_to_their_owner() {
        let store = MemoryStore::new();
        let chat = store.create(ALICE, NewChat::default()).await.unwrap();

        assert!(store.get(BOB, chat.id).await.unwrap().is_none());
        assert!(store
            .update(BOB, chat.id, ChatPatch::rename("mine now"))
            .await
            .unwrap()
            .is_none());
        assert!(!store.delete(BOB, chat.id).await.unwrap());
        assert!(store.list_summaries(BOB).await.unwrap().is_empty());

        assert!(store.get(ALICE, chat.id).await.unwrap().is_some());
        assert!(store.delete(ALICE, chat.id).await.unwrap());
        assert!(store.get(ALICE, chat.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn listing_is_newest_first() {
        let store = MemoryStore::new();
        let first = store.create(ALICE, NewChat::default()).await.unwrap();
        let second = store.create(ALICE, NewChat::default()).await.unwrap();

        store
            .append_message(ALICE, first.id, ChatMessage::new(Role::User, "bump"))
            .await
            .unwrap();

        let ids: Vec<Uuid> = store
            .list_summaries(ALICE)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn refresh_token_survives_access_token_update() {
        let store = MemoryStore::new();
        store
            .upsert_tokens(
                ALICE,
                GoogleTokens {
                    access_token: "a1".into(),
                    refresh_token: Some("r1".into()),
                    expires_at: None,
                },
            )
            .await
            .unwrap();
        store
            .upsert_tokens(
                ALICE,
                GoogleTokens {
                    access_token: "a2".into(),
                    refresh_token: None,
                    expires_at: None,
                },
            )
            .await
            .unwrap();

        let tokens = store.get_tokens(ALICE).await.unwrap().unwrap();
        assert_eq!(tokens.access_token, "a2");
        assert_eq!(tokens.refresh_token.as_deref(), Some("r1"));
    }

    #[tokio::test]
    async fn access_token_update_needs_an_account() {
        let store = MemoryStore::new();
        let expires = Utc::now() + chrono::Duration::hours(1);
        assert!(!store.update_access_token(BOB, "x", Some(expires)).await.unwrap());

        store
            .upsert_tokens(
                BOB,
                GoogleTokens {
                    access_token: "old".into(),
                    refresh_token: Some("r".into()),
                    expires_at: None,
                },
            )
            .await
            .unwrap();
        assert!(store.update_access_token(BOB, "new", Some(expires)).await.unwrap());

        let tokens = store.get_tokens(BOB).await.unwrap().unwrap();
        assert_eq!(tokens.access_token, "new");
        assert_eq!(tokens.refresh_token.as_deref(), Some("r"));
        assert_eq!(tokens.expires_at, Some(expires));
    }
}
