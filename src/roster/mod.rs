//! 花名册：记录类型、加密装载、内存仓库
//!
//! 启动时从 GPG 对称加密的 JSON 装载一次；运行期按需从在线表格刷新
//! （见 sheet 模块）。装载失败是致命错误（没有花名册就没有可答的查询）。

mod decrypt;
mod record;
mod store;

use thiserror::Error;

pub use decrypt::{load_encrypted, parse_rows};
pub use record::{
    PickupStatus, Record, ShirtCount, COL_ATTENDEES, COL_BAG_NO, COL_CITY, COL_FAMILY,
    COL_FIRST_NAME, COL_LAST_NAME, COL_PICKUP, SHIRT_SIZES,
};
pub use store::RecordStore;

/// 花名册装载错误（解密 / IO / JSON）
#[derive(Error, Debug)]
pub enum RosterError {
    #[error("GPG decryption failed: {0}")]
    Decrypt(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Roster JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
