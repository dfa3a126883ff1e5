//! 动作分发器：每聊天的 Idle / AwaitingChoice 状态机
//!
//! 每条入站消息独立处理：先做惰性过期检查（过期会话视同不存在），再按当前
//! 状态解释文本：挂起菜单下的纯数字是消解回复；新的合法触发查询静默顶替
//! 挂起菜单；其余文本在挂起态回错误提示、在空闲态保持沉默。
//! 变更类动作在匹配前刷新记录仓库（须看到实时取件状态），每次消解恰好写汇一次，
//! 后写覆盖先写，失败上报不回滚。

mod command;

use std::sync::Arc;

use crate::format;
use crate::matcher::{self, Candidate, MatchVia};
use crate::roster::RecordStore;
use crate::session::{ActionKind, ChatId, PendingStore, Resolution};
use crate::sheet::PickupSink;

pub use command::Command;

pub struct Dispatcher {
    records: Arc<RecordStore>,
    pending: Arc<PendingStore>,
    sink: Arc<dyn PickupSink>,
}

impl Dispatcher {
    pub fn new(
        records: Arc<RecordStore>,
        pending: Arc<PendingStore>,
        sink: Arc<dyn PickupSink>,
    ) -> Self {
        Self {
            records,
            pending,
            sink,
        }
    }

    /// 处理一条入站文本，返回要发回该聊天的消息（可能为空 = 沉默）
    pub async fn handle(&self, chat: ChatId, raw: &str) -> Vec<String> {
        // 多行输入折叠为单行
        let text = raw.replace('\n', " ").trim().to_string();
        if text.is_empty() {
            return Vec::new();
        }

        let command = Command::parse(&text);

        if self.pending.get_if_live(chat).await.is_some() {
            if text.chars().all(|c| c.is_ascii_digit()) {
                return self.handle_choice(chat, &text).await;
            }
            if command.is_some() {
                // 新查询顶替：静默丢弃挂起菜单，按空闲态继续
                self.pending.clear(chat).await;
            } else {
                return vec![
                    "❗ Please reply with a number from the list, or send a new query."
                        .to_string(),
                ];
            }
        }

        match command {
            None => Vec::new(),
            Some(Command::Help) => vec![format::HELP_TEXT.to_string()],
            Some(Command::BagLookup(bag)) => self.handle_bag(&bag).await,
            Some(Command::Query { action, name, city }) => {
                self.handle_query(chat, action, &name, city.as_deref()).await
            }
        }
    }

    async fn handle_choice(&self, chat: ChatId, digits: &str) -> Vec<String> {
        let Ok(index) = digits.parse::<usize>() else {
            return vec!["❗ Invalid number. Please try again.".to_string()];
        };

        match self.pending.resolve(chat, index).await {
            Resolution::Chosen { candidate, action } => self.perform(&candidate, action).await,
            Resolution::OutOfRange { .. } => {
                vec!["❗ Invalid number. Please try again.".to_string()]
            }
            // 会话恰在此刻消失：数字不是触发词，按未识别的新查询静默处理
            Resolution::NoSession => Vec::new(),
        }
    }

    async fn handle_query(
        &self,
        chat: ChatId,
        action: ActionKind,
        name: &str,
        city: Option<&str>,
    ) -> Vec<String> {
        // 变更类动作须看到实时取件状态；查看用现有快照
        if action.is_mutating() {
            if let Err(e) = self.records.refresh().await {
                tracing::warn!(error = %e, "sheet refresh failed before mutating query");
                return vec![format!("❌ Could not refresh the sheet: {}", e)];
            }
        }

        let snapshot = self.records.snapshot().await;
        let mut candidates = matcher::search(name, city, &snapshot);

        match candidates.len() {
            0 => vec![format!(
                "❌ No matches found for *{}* in *{}*.\n🔍 Try another family member or spelling.",
                name,
                city.unwrap_or("any city"),
            )],
            1 => {
                let candidate = candidates.remove(0);
                self.perform(&candidate, action).await
            }
            _ => {
                let menu = format::menu(&candidates, action);
                self.pending.put(chat, candidates, action).await;
                vec![menu]
            }
        }
    }

    async fn handle_bag(&self, bag: &str) -> Vec<String> {
        let snapshot = self.records.snapshot().await;
        match snapshot.iter().find(|r| r.bag_no.as_deref() == Some(bag)) {
            Some(record) => vec![format::detail(&Candidate {
                record: record.clone(),
                via: MatchVia::Direct,
            })],
            None => vec![format!("❌ No record with bag number *{}*.", bag)],
        }
    }

    /// 对选定候选执行动作：查看只渲染；变更类恰好写汇一次
    async fn perform(&self, candidate: &Candidate, action: ActionKind) -> Vec<String> {
        let (value, phrase) = match action {
            ActionKind::View => return vec![format::detail(candidate)],
            ActionKind::MarkPickup => ("Yes", "marked for pickup"),
            ActionKind::UnmarkPickup => ("", "removed from pickup"),
            ActionKind::CheckInNoPickup => ("No", "checked in (no pickup)"),
        };

        match self.sink.write_pickup(&candidate.record, value).await {
            Ok(()) => {
                tracing::info!(
                    name = %candidate.record.full_name(),
                    value,
                    "pickup column updated"
                );
                vec![format!("✅ *{}* {}.", candidate.record.full_name(), phrase)]
            }
            Err(e) => {
                tracing::error!(error = %e, "pickup write failed");
                vec![format!(
                    "❌ Sheet update failed: {}\nThe pickup status was NOT changed.",
                    e
                )]
            }
        }
    }
}
