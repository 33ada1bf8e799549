use std::sync::Arc;

use teloxide::{
    dispatching::{Dispatcher, UpdateHandler},
    dptree,
    prelude::*,
};
use tracing::{info, warn};

use gatebot_core::{
    config::Config,
    dispatcher::{AdminDispatcher, Stores},
    messaging::port::MessagingPort,
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<AdminDispatcher>,
}

fn schema() -> UpdateHandler<teloxide::RequestError> {
    dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message))
}

pub async fn run_polling(cfg: Arc<Config>, stores: Stores) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    match bot.get_me().await {
        Ok(me) => info!(username = %me.username(), "gatebot started"),
        Err(e) => warn!(error = %e, "get_me failed; continuing with polling"),
    }

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let dispatcher = Arc::new(AdminDispatcher::new(
        stores,
        messenger,
        cfg.access_authorizer.clone(),
    ));

    let state = Arc::new(AppState { dispatcher });

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    info!("gatebot stopped");
    Ok(())
}
