//! Walkdesk 主程序
//!
//! 环境变量:
//! - TELEGRAM_TOKEN: Telegram Bot API 令牌
//! - GPG_PASSPHRASE: 花名册对称解密口令
//! - SHEETS_ACCESS_TOKEN: Google Sheets API 访问令牌
//!
//! 其余配置见 config/default.toml（可用 WALKDESK__* 环境变量覆盖）。
//! 启动: cargo run

use std::sync::Arc;
use std::time::Duration;

use teloxide::Bot;

use walkdesk::dispatch::Dispatcher;
use walkdesk::roster::RecordStore;
use walkdesk::session::PendingStore;
use walkdesk::sheet::SheetsClient;
use walkdesk::telegram::{BotState, TelegramNotifier};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    walkdesk::observability::init();

    let cfg = walkdesk::config::load_config(None)?;

    let token = std::env::var("TELEGRAM_TOKEN").expect("TELEGRAM_TOKEN must be set");
    let passphrase = std::env::var("GPG_PASSPHRASE").expect("GPG_PASSPHRASE must be set");
    let sheets_token =
        std::env::var("SHEETS_ACCESS_TOKEN").expect("SHEETS_ACCESS_TOKEN must be set");

    if cfg.sheet.spreadsheet_id.is_empty() {
        anyhow::bail!(
            "sheet.spreadsheet_id must be configured (config/default.toml or WALKDESK__SHEET__SPREADSHEET_ID)"
        );
    }

    // 启动期装载花名册：解密失败即终止，不带着空花名册上线
    let records =
        walkdesk::roster::load_encrypted(&cfg.roster.encrypted_path, &passphrase).await?;
    tracing::info!(
        records = records.len(),
        path = %cfg.roster.encrypted_path.display(),
        "roster loaded"
    );

    let sheets = Arc::new(SheetsClient::new(
        sheets_token,
        cfg.sheet.spreadsheet_id.clone(),
        cfg.sheet.worksheet.clone(),
        cfg.sheet.pickup_column.clone(),
    ));

    let store = Arc::new(RecordStore::new(records, sheets.clone()));

    let bot = Bot::new(token);
    let notifier = Arc::new(TelegramNotifier::new(bot.clone()));
    let pending = PendingStore::new(Duration::from_secs(cfg.session.ttl_secs), notifier);

    let desk = Arc::new(Dispatcher::new(store, pending, sheets));
    let state = Arc::new(BotState {
        desk,
        max_message_len: cfg.telegram.max_message_len,
    });

    walkdesk::telegram::run(bot, state).await
}
