//! Walkdesk - 活动登记台 Telegram 机器人
//!
//! 对着固定花名册回答「这个人是谁、有什么（随行人数、衣服、袋号、取件状态）」，
//! 多个命中时给编号菜单、在限时窗口内等数字回复消解，并把取件状态写回共享表格。
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **dispatch**: 动作分发器（Idle / AwaitingChoice 状态机与命令解析）
//! - **format**: 回复渲染（详情、编号菜单、长消息按行切分）
//! - **matcher**: 前缀匹配器（直接匹配 + 家庭回退，两级优先）
//! - **observability**: tracing 初始化
//! - **roster**: 花名册（记录类型、GPG 装载、内存仓库）
//! - **session**: 待选会话存储（冻结候选列表 + TTL 超时单飞）
//! - **sheet**: Google Sheets 源/汇
//! - **telegram**: Telegram 长轮询传输

pub mod config;
pub mod dispatch;
pub mod format;
pub mod matcher;
pub mod observability;
pub mod roster;
pub mod session;
pub mod sheet;
pub mod telegram;
