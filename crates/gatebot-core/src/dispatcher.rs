//! Chat command and inline-button handling.
//!
//! Stateless between events: every command or callback re-reads the tier
//! sets from the access store before acting. Failures of the database or the
//! chat platform are logged and swallowed; nothing is retried.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    access::{Authorizer, Comparator, RemoveOutcome, Tier},
    audit::{denied_callback, denied_command, LogEntry, CAUSE_WRONG_CALL},
    domain::{ChatId, TeleUser, UserId},
    gate::{GateOutcome, MessageGate, ACCESS_DENIED_TEXT},
    messaging::{
        port::MessagingPort,
        types::{CallbackQuery, Command, InlineButton, InlineKeyboard},
    },
    ports::{AccessStore, AuditLog, WhitelistStore},
    Result,
};

// ============== Callback payloads ==============

pub const CB_CANCEL: &str = "cancel";
pub const CB_LIST_GROUPS: &str = "list_groups";
pub const CB_LIST_ACCESS: &str = "list_access";
pub const CB_NONE: &str = "none";
pub const DELETE_CHAT_PREFIX: &str = "delete_ch_";
pub const DELETE_ACCESS_PREFIX: &str = "delete_ac_";

const WRONG_CALL_TEXT: &str = "Wrong call";
const DELETE_LABEL: &str = "Delete";
const CANCEL_LABEL: &str = "Cancel";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Callback {
    Cancel,
    ListGroups,
    ListAccess,
    DeleteChat(String),
    DeleteAccess(String),
    Unknown(String),
}

impl Callback {
    pub fn parse(data: &str) -> Self {
        match data {
            CB_CANCEL => return Callback::Cancel,
            CB_LIST_GROUPS => return Callback::ListGroups,
            CB_LIST_ACCESS => return Callback::ListAccess,
            _ => {}
        }
        if let Some(id) = data.strip_prefix(DELETE_CHAT_PREFIX) {
            return Callback::DeleteChat(id.to_string());
        }
        if let Some(id) = data.strip_prefix(DELETE_ACCESS_PREFIX) {
            return Callback::DeleteAccess(id.to_string());
        }
        Callback::Unknown(data.to_string())
    }
}

// ============== Dispatcher ==============

/// The three persistence capabilities the dispatcher is composed from.
#[derive(Clone)]
pub struct Stores {
    pub audit: Arc<dyn AuditLog>,
    pub whitelist: Arc<dyn WhitelistStore>,
    pub access: Arc<dyn AccessStore>,
}

#[derive(Clone)]
pub struct AdminDispatcher {
    stores: Stores,
    messenger: Arc<dyn MessagingPort>,
    gate: MessageGate,
    authorizer: Authorizer,
}

impl AdminDispatcher {
    pub fn new(stores: Stores, messenger: Arc<dyn MessagingPort>, authorizer: Authorizer) -> Self {
        let gate = MessageGate::new(
            stores.whitelist.clone(),
            stores.audit.clone(),
            messenger.clone(),
        );
        Self {
            stores,
            messenger,
            gate,
            authorizer,
        }
    }

    /// Handle a `/command`. Unknown commands are ignored.
    pub async fn handle_command(&self, cmd: Command) {
        let res = match cmd.name.as_str() {
            "menu" => self.show_menu(&cmd).await,
            "add" => self.add_chat(&cmd).await,
            "send" => self.relay(&cmd).await,
            "grant" => self.grant(&cmd).await,
            other => {
                debug!(command = other, "ignoring unknown command");
                Ok(())
            }
        };
        if let Err(e) = res {
            warn!(command = %cmd.name, chat_id = %cmd.chat_id, error = %e, "command failed");
        }
    }

    /// Handle an inline-button press. The callback query is always answered.
    pub async fn handle_callback(&self, q: CallbackQuery) {
        let res = match Callback::parse(&q.data) {
            Callback::Cancel => self.cancel(&q).await,
            Callback::ListGroups => {
                let outcome = self.list_groups(&q).await;
                self.then_cancel(&q, outcome).await
            }
            Callback::ListAccess => {
                let outcome = self.list_access(&q).await;
                self.then_cancel(&q, outcome).await
            }
            Callback::DeleteChat(id) => {
                let outcome = self.remove_chat(&q, &id).await;
                self.then_cancel(&q, outcome).await
            }
            Callback::DeleteAccess(id) => {
                let outcome = self.remove_access(&q, &id).await;
                self.then_cancel(&q, outcome).await
            }
            Callback::Unknown(_) => {
                self.refuse(q.chat_id, WRONG_CALL_TEXT, CAUSE_WRONG_CALL)
                    .await
            }
        };
        if let Err(e) = res {
            warn!(data = %q.data, chat_id = %q.chat_id, error = %e, "callback failed");
        }

        if let Err(e) = self.messenger.answer_callback_query(&q.callback_id, None).await {
            debug!(error = %e, "failed to answer callback query");
        }
    }

    // ============== Tier checks ==============

    async fn is_registered(&self, user_id: UserId) -> Result<bool> {
        let ids = self
            .stores
            .access
            .list(Comparator::AtLeast, Tier::OWNER)
            .await?;
        Ok(ids.contains(&user_id.key()))
    }

    async fn is_super_admin(&self, user_id: UserId) -> Result<bool> {
        let ids = self
            .stores
            .access
            .list(Comparator::AtMost, Tier::SUPER_ADMIN)
            .await?;
        Ok(ids.contains(&user_id.key()))
    }

    async fn is_owner(&self, user_id: UserId) -> Result<bool> {
        let ids = self
            .stores
            .access
            .list(Comparator::AtMost, Tier::OWNER)
            .await?;
        Ok(ids.contains(&user_id.key()))
    }

    /// Reply with `text` and append an audit row, even if the reply fails.
    async fn refuse(&self, chat_id: ChatId, text: &str, cause: &str) -> Result<()> {
        let sent = self.messenger.send_text(chat_id, text).await;
        self.stores.audit.record(LogEntry::now(chat_id, cause)).await;
        sent.map(|_| ())
    }

    async fn deny(&self, chat_id: ChatId, cause: &str) -> Result<()> {
        self.refuse(chat_id, ACCESS_DENIED_TEXT, cause).await
    }

    // ============== Commands ==============

    async fn show_menu(&self, cmd: &Command) -> Result<()> {
        if !self.is_registered(cmd.user_id).await? {
            return self.deny(cmd.chat_id, &denied_command("menu")).await;
        }

        let mut keyboard = InlineKeyboard::new().button("Chats", CB_LIST_GROUPS);
        if self.is_super_admin(cmd.user_id).await? {
            keyboard = keyboard.button("Access", CB_LIST_ACCESS);
        }
        keyboard = keyboard.button(CANCEL_LABEL, CB_CANCEL);

        self.messenger
            .send_inline_keyboard(cmd.chat_id, "Menu", keyboard)
            .await?;
        Ok(())
    }

    async fn add_chat(&self, cmd: &Command) -> Result<()> {
        if !self.is_registered(cmd.user_id).await? {
            return self.deny(cmd.chat_id, &denied_command("add")).await;
        }

        let inserted = self.stores.whitelist.add(&cmd.chat_id.key()).await?;
        let reply = if inserted {
            info!(chat_id = %cmd.chat_id, by = %cmd.user_id, "chat whitelisted");
            "Chat added!"
        } else {
            "Chat is already whitelisted"
        };
        self.messenger.send_text(cmd.chat_id, reply).await?;
        Ok(())
    }

    async fn relay(&self, cmd: &Command) -> Result<()> {
        if !self.is_registered(cmd.user_id).await? {
            return self.deny(cmd.chat_id, &denied_command("send")).await;
        }

        let Some((target, text)) = parse_relay_args(&cmd.args) else {
            self.messenger
                .send_text(cmd.chat_id, "Usage: /send <chat_id> <text>")
                .await?;
            return Ok(());
        };

        let reply = match self.gate.send(target, text).await? {
            GateOutcome::Delivered => "Delivered",
            GateOutcome::Denied => "Chat is not whitelisted",
        };
        self.messenger.send_text(cmd.chat_id, reply).await?;
        Ok(())
    }

    async fn grant(&self, cmd: &Command) -> Result<()> {
        if !self.is_super_admin(cmd.user_id).await? {
            return self.deny(cmd.chat_id, &denied_command("grant")).await;
        }

        let tier = match cmd.args.trim() {
            "" => Tier::ADMIN,
            raw => match Tier::parse(raw) {
                Some(t) => t,
                None => {
                    self.messenger
                        .send_text(cmd.chat_id, "Usage: /grant [admin|super]")
                        .await?;
                    return Ok(());
                }
            },
        };

        let granter = if self.is_owner(cmd.user_id).await? {
            Tier::OWNER
        } else {
            Tier::SUPER_ADMIN
        };
        if tier == Tier::OWNER || !granter.outranks_or_equals(tier) {
            return self.deny(cmd.chat_id, &denied_command("grant")).await;
        }

        let Some(target) = &cmd.reply_to else {
            self.messenger
                .send_text(
                    cmd.chat_id,
                    "Reply to a message of the user you want to grant access to.",
                )
                .await?;
            return Ok(());
        };

        let user = TeleUser::new(
            target.user_id,
            &target.first_name,
            target.username.as_deref(),
        );
        let reply = if self.stores.access.add(&user, tier).await? {
            info!(tele_id = %user.tele_id, tier = %tier, by = %cmd.user_id, "access granted");
            format!("Granted {} access to {}", tier.label(), user.tele_name)
        } else {
            format!("{} already has access", user.tele_name)
        };
        self.messenger.send_text(cmd.chat_id, &reply).await?;
        Ok(())
    }

    // ============== Callbacks ==============

    async fn cancel(&self, q: &CallbackQuery) -> Result<()> {
        let Some(msg) = q.message else {
            return Ok(());
        };
        self.messenger.delete_message(msg).await
    }

    /// Every menu action ends by removing the menu it was started from.
    async fn then_cancel(&self, q: &CallbackQuery, outcome: Result<()>) -> Result<()> {
        if let Err(e) = outcome {
            warn!(data = %q.data, error = %e, "menu action failed");
        }
        self.cancel(q).await
    }

    async fn list_groups(&self, q: &CallbackQuery) -> Result<()> {
        let ids = self.stores.whitelist.list().await?;

        let mut keyboard = InlineKeyboard::new();
        for id in ids {
            let title = match ChatId::parse(&id) {
                Some(chat_id) => self
                    .messenger
                    .chat_title(chat_id)
                    .await
                    .unwrap_or_else(|e| {
                        warn!(chat_id = %id, error = %e, "failed to fetch chat title");
                        id.clone()
                    }),
                None => id.clone(),
            };
            keyboard = keyboard.row(vec![
                InlineButton::new(title, CB_NONE),
                InlineButton::new(DELETE_LABEL, format!("{DELETE_CHAT_PREFIX}{id}")),
            ]);
        }
        keyboard = keyboard.button(CANCEL_LABEL, CB_CANCEL);

        self.messenger
            .send_inline_keyboard(q.chat_id, "Chat list:", keyboard)
            .await?;
        Ok(())
    }

    async fn list_access(&self, q: &CallbackQuery) -> Result<()> {
        let ids = self
            .stores
            .access
            .list(Comparator::AtMost, Tier::SUPER_ADMIN)
            .await?;

        let mut keyboard = InlineKeyboard::new();
        for id in ids {
            let name = match id.trim().parse::<i64>() {
                Ok(n) => self
                    .messenger
                    .user_display_name(UserId(n))
                    .await
                    .unwrap_or_else(|e| {
                        warn!(tele_id = %id, error = %e, "failed to fetch user name");
                        id.clone()
                    }),
                Err(_) => id.clone(),
            };
            keyboard = keyboard.row(vec![
                InlineButton::new(name, CB_NONE),
                InlineButton::new(DELETE_LABEL, format!("{DELETE_ACCESS_PREFIX}{id}")),
            ]);
        }
        keyboard = keyboard.button(CANCEL_LABEL, CB_CANCEL);

        self.messenger
            .send_inline_keyboard(q.chat_id, "Admin list:", keyboard)
            .await?;
        Ok(())
    }

    async fn remove_chat(&self, q: &CallbackQuery, chat_id: &str) -> Result<()> {
        if !self.is_registered(q.user_id).await? {
            return self.deny(q.chat_id, &denied_callback(&q.data)).await;
        }
        self.stores.whitelist.remove(chat_id).await?;
        info!(chat_id, by = %q.user_id, "chat removed from whitelist");
        Ok(())
    }

    async fn remove_access(&self, q: &CallbackQuery, tele_id: &str) -> Result<()> {
        let acting = self.authorizer.resolve(q.user_id);
        match self.stores.access.remove(&acting, tele_id).await? {
            RemoveOutcome::Removed => {
                info!(tele_id, by = %acting, "access removed");
                Ok(())
            }
            RemoveOutcome::Denied => self.deny(q.chat_id, &denied_callback(&q.data)).await,
        }
    }
}

fn parse_relay_args(args: &str) -> Option<(ChatId, &str)> {
    let mut parts = args.trim().splitn(2, char::is_whitespace);
    let target = ChatId::parse(parts.next()?)?;
    let text = parts.next()?.trim();
    if text.is_empty() {
        return None;
    }
    Some((target, text))
}
