//! 匹配器：姓名/城市查询 → 有序候选列表
//!
//! 纯函数，两级优先：
//! 1. 直接匹配：查询名是注册人名、姓或 "名 姓" 的大小写无关前缀；
//! 2. 家庭回退：仅对无直接匹配的记录，用同一前缀规则逐条测试家庭成员文本，
//!    取首个命中条目作为来源标注。
//! 只要整个过滤集里存在任一直接匹配，家庭匹配全部丢弃（两级优先，不做混合打分）。
//! 城市参数存在时按大小写无关前缀过滤记录；结果按名（小写）稳定排序，保证可复现。

use crate::roster::Record;

/// 候选的匹配来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchVia {
    /// 注册人本名命中
    Direct,
    /// 经家庭成员条目命中，携带命中的原文
    Family { entry: String },
}

/// 一次查询产出的候选：记录副本 + 来源标注
///
/// 候选持有记录的克隆，冻结进会话后不随仓库刷新变化。
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub record: Record,
    pub via: MatchVia,
}

impl Candidate {
    pub fn family_entry(&self) -> Option<&str> {
        match &self.via {
            MatchVia::Family { entry } => Some(entry),
            MatchVia::Direct => None,
        }
    }
}

/// 执行查询。`city` 为 None 时不限城市。
pub fn search(name: &str, city: Option<&str>, records: &[Record]) -> Vec<Candidate> {
    let name = name.to_lowercase();
    let city = city.map(str::to_lowercase);

    let mut direct = Vec::new();
    let mut family = Vec::new();

    for record in records {
        if let Some(ref city) = city {
            if !record.city.to_lowercase().starts_with(city.as_str()) {
                continue;
            }
        }

        let first = record.first_name.to_lowercase();
        let last = record.last_name.to_lowercase();
        let full = format!("{} {}", first, last);

        if first.starts_with(&name) || last.starts_with(&name) || full.starts_with(&name) {
            direct.push(Candidate {
                record: record.clone(),
                via: MatchVia::Direct,
            });
            continue;
        }

        if let Some(entry) = record
            .family_entries()
            .find(|entry| entry.to_lowercase().starts_with(&name))
        {
            family.push(Candidate {
                record: record.clone(),
                via: MatchVia::Family {
                    entry: entry.to_string(),
                },
            });
        }
    }

    let mut result = if direct.is_empty() { family } else { direct };
    result.sort_by_key(|c| c.record.first_name.to_lowercase());
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{COL_CITY, COL_FAMILY, COL_FIRST_NAME, COL_LAST_NAME};

    fn record(first: &str, last: &str, city: &str, family: &str) -> Record {
        let mut row = serde_json::Map::new();
        row.insert(COL_FIRST_NAME.to_string(), first.into());
        row.insert(COL_LAST_NAME.to_string(), last.into());
        row.insert(COL_CITY.to_string(), city.into());
        row.insert(COL_FAMILY.to_string(), family.into());
        Record::from_json_row(&row)
    }

    fn roster() -> Vec<Record> {
        vec![
            record("Kunj", "Patel", "Addison", "Hema Patel\nRiya Patel"),
            record("Hem", "Shah", "Frisco", ""),
            record("Anita", "Desai", "Addison", "Kunal Desai, Meera Desai"),
        ]
    }

    #[test]
    fn test_direct_prefix_on_first_last_full() {
        let records = roster();

        assert_eq!(search("kun", None, &records).len(), 1);
        assert_eq!(search("pat", None, &records).len(), 1);
        assert_eq!(search("kunj pat", None, &records).len(), 1);
    }

    #[test]
    fn test_city_prefix_filter_excludes_everything() {
        let records = roster();
        // 城市前缀不命中时无论姓名如何结果为空
        assert!(search("Kunj", Some("Dallas"), &records).is_empty());
        assert_eq!(search("Kunj", Some("Add"), &records).len(), 1);
    }

    #[test]
    fn test_family_fallback_only_without_direct() {
        let records = roster();

        let hits = search("Riya", None, &records);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].family_entry(), Some("Riya Patel"));
        assert_eq!(hits[0].record.first_name, "Kunj");
    }

    #[test]
    fn test_direct_match_discards_family_matches() {
        // "Kun" 直接命中 Kunj Patel，同时是 Anita 家的 "Kunal Desai" 前缀；
        // 优先法则要求家庭命中整体丢弃
        let hits = search("Kun", None, &roster());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].via, MatchVia::Direct);
    }

    #[test]
    fn test_comma_delimited_family_entries() {
        let hits = search("Meera", None, &roster());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].family_entry(), Some("Meera Desai"));
    }

    #[test]
    fn test_no_match_returns_empty() {
        assert!(search("Zed", None, &roster()).is_empty());
    }

    #[test]
    fn test_result_sorted_by_first_name() {
        let records = vec![
            record("Zara", "Patel", "Addison", ""),
            record("Amit", "Patel", "Addison", ""),
        ];
        let hits = search("Patel", None, &records);
        assert_eq!(hits[0].record.first_name, "Amit");
        assert_eq!(hits[1].record.first_name, "Zara");
    }

    #[test]
    fn test_deterministic_for_same_snapshot() {
        let records = roster();
        assert_eq!(search("Pat", Some("Add"), &records), search("Pat", Some("Add"), &records));
    }
}
