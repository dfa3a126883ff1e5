//! Telegram 传输：长轮询接收，分片发送
//!
//! 核心引擎只要求「把文本发到聊天 X」与「收到 (聊天, 文本)」；本模块用
//! teloxide 的显式 Dispatcher 承担这两件事，并实现会话超时通知的出口。
//! 发送统一走按行切分，保证每个分片都是独立合法的 Markdown。

use std::sync::Arc;

use async_trait::async_trait;
use teloxide::dispatching::UpdateFilterExt;
use teloxide::dptree;
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use teloxide::types::ParseMode;

use crate::format;
use crate::session::TimeoutNotifier;

/// 菜单超时提醒文案
const TIMEOUT_TEXT: &str =
    "⏳ No reply received in time.\nSend a new query like `b Patel Frisco` if needed!";

/// 处理入站消息所需的共享状态
pub struct BotState {
    pub desk: Arc<crate::dispatch::Dispatcher>,
    pub max_message_len: usize,
}

/// 会话超时通知的 Telegram 出口
pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl TimeoutNotifier for TelegramNotifier {
    async fn notify_timeout(&self, chat: crate::session::ChatId) {
        if let Err(e) = self
            .bot
            .send_message(ChatId(chat), TIMEOUT_TEXT)
            .parse_mode(ParseMode::Markdown)
            .await
        {
            tracing::warn!(chat, error = %e, "failed to send timeout notice");
        }
    }
}

/// 按行分片发送一条（可能超长的）回复
async fn send_chunked(bot: &Bot, chat: ChatId, text: &str, max_len: usize) {
    for chunk in format::split_message(text, max_len) {
        if let Err(e) = bot
            .send_message(chat, chunk)
            .parse_mode(ParseMode::Markdown)
            .await
        {
            tracing::error!(chat = chat.0, error = %e, "failed to send reply");
        }
    }
}

async fn message_handler(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let chat = msg.chat.id;
    tracing::debug!(chat = chat.0, text, "message received");

    for reply in state.desk.handle(chat.0, text).await {
        send_chunked(&bot, chat, &reply, state.max_message_len).await;
    }
    Ok(())
}

/// 校验机器人身份后以长轮询启动，阻塞直至停止
pub async fn run(bot: Bot, state: Arc<BotState>) -> anyhow::Result<()> {
    match bot.get_me().await {
        Ok(me) => tracing::info!(
            "Bot authenticated: @{} (ID: {})",
            me.username.as_deref().unwrap_or("unknown"),
            me.id
        ),
        Err(e) => anyhow::bail!("Bot authentication failed: {}", e),
    }

    // 清掉可能残留的 webhook，确保长轮询生效
    if let Err(e) = bot.delete_webhook().await {
        tracing::warn!(error = %e, "failed to delete webhook (continuing)");
    }

    let handler = dptree::entry().branch(Update::filter_message().endpoint(message_handler));

    tracing::info!("starting dispatcher with long polling");
    teloxide::dispatching::Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .default_handler(|upd| async move {
            tracing::trace!("unhandled update: {:?}", upd);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("Error in update handler"))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    tracing::warn!("dispatcher stopped");
    Ok(())
}
