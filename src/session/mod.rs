//! 待选会话存储：每个聊天至多一个待消解的候选菜单
//!
//! put 冻结候选列表并调度一个延时超时任务；任务不被取消，到点后用创建时间戳
//! 相等作守卫：会话已被消解、被新查询顶替或已过期时，晚到的触发是空操作。
//! 这保证每个会话至多发出一次超时通知（单飞）。
//! 过期检查在每次访问前惰性进行：超过 TTL 的会话视同不存在。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::{sleep_until, Duration, Instant};

use crate::matcher::Candidate;

/// 会话键：Telegram 聊天 ID
pub type ChatId = i64;

/// 菜单挂起的动作类型；数字回复到达时据此决定只展示还是写回表格
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// 查看详情
    View,
    /// 标记取件（写 "Yes"）
    MarkPickup,
    /// 撤销取件（写空值）
    UnmarkPickup,
    /// 已到场但未取件（写 "No"）
    CheckInNoPickup,
}

impl ActionKind {
    pub fn is_mutating(self) -> bool {
        !matches!(self, ActionKind::View)
    }
}

/// 超时通知出口：由传输层实现（测试用 mock）
#[async_trait]
pub trait TimeoutNotifier: Send + Sync {
    async fn notify_timeout(&self, chat: ChatId);
}

/// 一个挂起的会话：冻结候选列表 + 动作 + 创建时间戳（兼作版本号）
#[derive(Debug, Clone)]
pub struct Pending {
    pub candidates: Vec<Candidate>,
    pub action: ActionKind,
    pub created: Instant,
}

/// 数字回复的消解结果
#[derive(Debug)]
pub enum Resolution {
    /// 有效选择：会话已清除，返回冻结列表中的候选
    Chosen {
        candidate: Candidate,
        action: ActionKind,
    },
    /// 序号越界：会话保留，允许重试
    OutOfRange { count: usize },
    /// 无存活会话（已消解 / 被顶替 / 过期）
    NoSession,
}

pub struct PendingStore {
    entries: RwLock<HashMap<ChatId, Pending>>,
    ttl: Duration,
    notifier: Arc<dyn TimeoutNotifier>,
}

impl PendingStore {
    pub fn new(ttl: Duration, notifier: Arc<dyn TimeoutNotifier>) -> Arc<Self> {
        Arc::new(Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            notifier,
        })
    }

    /// 创建会话（静默顶替同一聊天的旧会话）并调度超时任务
    pub async fn put(self: &Arc<Self>, chat: ChatId, candidates: Vec<Candidate>, action: ActionKind) {
        let created = Instant::now();
        self.entries.write().await.insert(
            chat,
            Pending {
                candidates,
                action,
                created,
            },
        );

        let store = Arc::clone(self);
        let deadline = created + self.ttl;
        tokio::spawn(async move {
            sleep_until(deadline).await;
            store.fire(chat, created).await;
        });
    }

    /// 存活会话（副本）；过期条目就地清除并视同不存在
    pub async fn get_if_live(&self, chat: ChatId) -> Option<Pending> {
        let mut entries = self.entries.write().await;
        match entries.get(&chat) {
            Some(pending) if pending.created.elapsed() > self.ttl => {
                entries.remove(&chat);
                None
            }
            Some(pending) => Some(pending.clone()),
            None => None,
        }
    }

    /// 用 1 起始的序号消解会话。消解始终针对菜单发出时冻结的列表。
    pub async fn resolve(&self, chat: ChatId, index: usize) -> Resolution {
        let mut entries = self.entries.write().await;

        let count = match entries.get(&chat) {
            None => return Resolution::NoSession,
            Some(pending) if pending.created.elapsed() > self.ttl => {
                entries.remove(&chat);
                return Resolution::NoSession;
            }
            Some(pending) => pending.candidates.len(),
        };

        if index == 0 || index > count {
            return Resolution::OutOfRange { count };
        }

        match entries.remove(&chat) {
            Some(pending) => {
                let action = pending.action;
                match pending.candidates.into_iter().nth(index - 1) {
                    Some(candidate) => Resolution::Chosen { candidate, action },
                    None => Resolution::NoSession,
                }
            }
            None => Resolution::NoSession,
        }
    }

    pub async fn clear(&self, chat: ChatId) {
        self.entries.write().await.remove(&chat);
    }

    /// 超时触发：仅当条目仍是调度时的那一个（时间戳相等）才清除并通知
    async fn fire(&self, chat: ChatId, expected: Instant) {
        let timed_out = {
            let mut entries = self.entries.write().await;
            match entries.get(&chat) {
                Some(pending) if pending.created == expected => {
                    entries.remove(&chat);
                    true
                }
                _ => false,
            }
        };

        if timed_out {
            tracing::debug!(chat, "pending session timed out");
            self.notifier.notify_timeout(chat).await;
        }
    }
}
