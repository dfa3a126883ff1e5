//! 记录仓库：读多写少的内存快照，可从在线表格整体刷新
//!
//! snapshot() 返回 Arc 快照，刷新只做整体替换；已冻结在会话里的候选列表
//! 持有自己的记录副本，刷新永远不会触碰它们。

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::sheet::{RosterSource, SheetError};

use super::record::Record;

pub struct RecordStore {
    records: RwLock<Arc<Vec<Record>>>,
    source: Arc<dyn RosterSource>,
}

impl RecordStore {
    pub fn new(initial: Vec<Record>, source: Arc<dyn RosterSource>) -> Self {
        Self {
            records: RwLock::new(Arc::new(initial)),
            source,
        }
    }

    /// 当前快照（廉价 Arc 克隆）
    pub async fn snapshot(&self) -> Arc<Vec<Record>> {
        self.records.read().await.clone()
    }

    /// 从外部源整体刷新，返回新记录数；失败时保留旧快照
    pub async fn refresh(&self) -> Result<usize, SheetError> {
        let fresh = self.source.fetch().await?;
        let count = fresh.len();
        *self.records.write().await = Arc::new(fresh);
        tracing::debug!(records = count, "record store refreshed");
        Ok(count)
    }
}
