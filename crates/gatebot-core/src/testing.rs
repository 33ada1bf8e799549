//! In-memory port implementations shared by the unit tests.

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;

use crate::{
    access::{AccessEntry, Comparator, Tier},
    audit::LogEntry,
    domain::{ChatId, MessageId, MessageRef, TeleUser, UserId},
    errors::Error,
    messaging::{port::MessagingPort, types::InlineKeyboard},
    ports::{AccessStore, AuditLog, WhitelistStore},
    Result,
};

#[derive(Default)]
pub struct MemoryAudit {
    rows: Mutex<Vec<LogEntry>>,
}

impl MemoryAudit {
    pub fn entries(&self) -> Vec<LogEntry> {
        self.rows.lock().unwrap().clone()
    }

    pub fn causes(&self) -> Vec<String> {
        self.entries().into_iter().map(|e| e.cause).collect()
    }
}

#[async_trait]
impl AuditLog for MemoryAudit {
    async fn record(&self, entry: LogEntry) {
        self.rows.lock().unwrap().push(entry);
    }
}

#[derive(Default)]
pub struct MemoryWhitelist {
    ids: Mutex<Vec<String>>,
    offline: bool,
}

impl MemoryWhitelist {
    pub fn with(ids: &[&str]) -> Self {
        Self {
            ids: Mutex::new(ids.iter().map(|s| s.to_string()).collect()),
            offline: false,
        }
    }

    pub fn offline() -> Self {
        Self {
            ids: Mutex::default(),
            offline: true,
        }
    }

    pub fn ids(&self) -> Vec<String> {
        self.ids.lock().unwrap().clone()
    }

    fn check(&self) -> Result<()> {
        if self.offline {
            return Err(Error::Database("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl WhitelistStore for MemoryWhitelist {
    async fn list(&self) -> Result<Vec<String>> {
        self.check()?;
        Ok(self.ids())
    }

    async fn add(&self, chat_id: &str) -> Result<bool> {
        self.check()?;
        let mut ids = self.ids.lock().unwrap();
        if ids.iter().any(|id| id == chat_id) {
            return Ok(false);
        }
        ids.push(chat_id.to_string());
        Ok(true)
    }

    async fn remove(&self, chat_id: &str) -> Result<()> {
        self.check()?;
        self.ids.lock().unwrap().retain(|id| id != chat_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryAccess {
    entries: Mutex<Vec<AccessEntry>>,
}

impl MemoryAccess {
    pub fn with(rows: &[(&str, Tier)]) -> Self {
        let entries = rows
            .iter()
            .map(|(id, tier)| AccessEntry {
                user: TeleUser {
                    tele_id: id.to_string(),
                    tele_name: format!("user{id}"),
                    tele_tag: String::new(),
                },
                access: *tier,
            })
            .collect();
        Self {
            entries: Mutex::new(entries),
        }
    }

    pub fn ids(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.user.tele_id.clone())
            .collect()
    }

    pub fn tier_of(&self, tele_id: &str) -> Option<Tier> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.user.tele_id == tele_id)
            .map(|e| e.access)
    }
}

#[async_trait]
impl AccessStore for MemoryAccess {
    async fn list(&self, comparator: Comparator, tier: Tier) -> Result<Vec<String>> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| comparator.matches(e.access, tier))
            .map(|e| e.user.tele_id.clone())
            .collect())
    }

    async fn add(&self, user: &TeleUser, tier: Tier) -> Result<bool> {
        let mut entries = self.entries.lock().unwrap();
        if entries.iter().any(|e| e.user.tele_id == user.tele_id) {
            return Ok(false);
        }
        entries.push(AccessEntry {
            user: user.clone(),
            access: tier,
        });
        Ok(true)
    }

    async fn delete(&self, tele_id: &str) -> Result<()> {
        self.entries
            .lock()
            .unwrap()
            .retain(|e| e.user.tele_id != tele_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeMessenger {
    next_id: Mutex<i32>,
    texts: Mutex<Vec<(ChatId, String)>>,
    keyboards: Mutex<Vec<(ChatId, String, InlineKeyboard)>>,
    deletes: Mutex<Vec<MessageRef>>,
    answers: Mutex<Vec<String>>,
    titles: HashMap<i64, String>,
    fail_sends: bool,
}

impl FakeMessenger {
    pub fn failing_sends() -> Self {
        Self {
            fail_sends: true,
            ..Default::default()
        }
    }

    pub fn with_title(mut self, chat_id: i64, title: &str) -> Self {
        self.titles.insert(chat_id, title.to_string());
        self
    }

    fn alloc(&self, chat_id: ChatId) -> MessageRef {
        let mut guard = self.next_id.lock().unwrap();
        *guard += 1;
        MessageRef {
            chat_id,
            message_id: MessageId(*guard),
        }
    }

    pub fn texts(&self) -> Vec<(ChatId, String)> {
        self.texts.lock().unwrap().clone()
    }

    pub fn keyboards(&self) -> Vec<(ChatId, String, InlineKeyboard)> {
        self.keyboards.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> Vec<MessageRef> {
        self.deletes.lock().unwrap().clone()
    }

    pub fn answers(&self) -> Vec<String> {
        self.answers.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagingPort for FakeMessenger {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef> {
        if self.fail_sends {
            return Err(Error::External("telegram error: chat not found".to_string()));
        }
        self.texts.lock().unwrap().push((chat_id, text.to_string()));
        Ok(self.alloc(chat_id))
    }

    async fn send_inline_keyboard(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: InlineKeyboard,
    ) -> Result<MessageRef> {
        if self.fail_sends {
            return Err(Error::External("telegram error: chat not found".to_string()));
        }
        self.keyboards
            .lock()
            .unwrap()
            .push((chat_id, text.to_string(), keyboard));
        Ok(self.alloc(chat_id))
    }

    async fn delete_message(&self, msg: MessageRef) -> Result<()> {
        self.deletes.lock().unwrap().push(msg);
        Ok(())
    }

    async fn answer_callback_query(&self, callback_id: &str, _text: Option<&str>) -> Result<()> {
        self.answers.lock().unwrap().push(callback_id.to_string());
        Ok(())
    }

    async fn chat_title(&self, chat_id: ChatId) -> Result<String> {
        self.titles
            .get(&chat_id.0)
            .cloned()
            .ok_or_else(|| Error::External(format!("telegram error: chat {chat_id} not found")))
    }

    async fn user_display_name(&self, user_id: UserId) -> Result<String> {
        Ok(format!("User {user_id}"))
    }
}
