//! 登记记录类型：从表格行一次性转换为强类型 Record
//!
//! 源数据是按表头键名的扁平字符串行（加密花名册 JSON 与在线表格共用同一表头）；
//! 所有宽松解析（人数、衣服数量、取件状态）只在装载时发生一次，之后各处按类型访问。

use serde_json::{Map, Value};

/// 表头列名（花名册 JSON 与在线表格一致）
pub const COL_FIRST_NAME: &str = "Registrant First Name";
pub const COL_LAST_NAME: &str = "Registrant Last Name";
pub const COL_CITY: &str = "City";
pub const COL_ATTENDEES: &str = "Attendees";
pub const COL_FAMILY: &str = "Additional Family Members";
pub const COL_BAG_NO: &str = "Bag No.";
pub const COL_PICKUP: &str = "Pickup";

/// 衣服尺码列，按展示顺序
pub const SHIRT_SIZES: [&str; 9] = [
    "SM", "MD", "LG", "XL", "XXL", "Y-LG", "Y-MD", "Y-SM", "Y-XS",
];

/// 取件状态（表格 Pickup 列的三态）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupStatus {
    /// 列为空：尚未处理
    Unset,
    Yes,
    No,
}

impl PickupStatus {
    fn parse(cell: &str) -> Self {
        match cell.trim().to_lowercase().as_str() {
            "yes" | "y" => PickupStatus::Yes,
            "no" | "n" => PickupStatus::No,
            _ => PickupStatus::Unset,
        }
    }

    pub fn display(self) -> &'static str {
        match self {
            PickupStatus::Unset => "—",
            PickupStatus::Yes => "Yes",
            PickupStatus::No => "No",
        }
    }
}

/// 某尺码的订购数量（仅保留非零项）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShirtCount {
    pub size: &'static str,
    pub count: u32,
}

/// 一条登记记录
///
/// 除 Pickup 列外引擎视角下不可变；Pickup 只经由 sink 写回，内存副本在下次
/// refresh 时跟进。
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub first_name: String,
    pub last_name: String,
    pub city: String,
    /// 人数，源数据缺失或无法解析时为 None（展示为 "?"）
    pub attendees: Option<u32>,
    /// 家庭成员自由文本块（换行或逗号分隔的子条目）
    pub family_members: String,
    /// 非零尺码数量，按 SHIRT_SIZES 顺序
    pub shirts: Vec<ShirtCount>,
    pub bag_no: Option<String>,
    pub pickup: PickupStatus,
}

impl Record {
    /// 从一行扁平 JSON 对象转换；缺失字段取默认值，不会失败
    pub fn from_json_row(row: &Map<String, Value>) -> Record {
        let attendees_raw = text_field(row, COL_ATTENDEES);
        let bag_raw = text_field(row, COL_BAG_NO);

        let shirts = SHIRT_SIZES
            .iter()
            .filter_map(|&size| {
                let count = count_field(row, size);
                (count > 0).then_some(ShirtCount { size, count })
            })
            .collect();

        Record {
            first_name: text_field(row, COL_FIRST_NAME).trim().to_string(),
            last_name: text_field(row, COL_LAST_NAME).trim().to_string(),
            city: text_field(row, COL_CITY).trim().to_string(),
            attendees: attendees_raw.trim().parse().ok(),
            family_members: text_field(row, COL_FAMILY).trim().to_string(),
            shirts,
            bag_no: {
                let bag = bag_raw.trim();
                (!bag.is_empty()).then(|| bag.to_string())
            },
            pickup: PickupStatus::parse(&text_field(row, COL_PICKUP)),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn attendees_display(&self) -> String {
        self.attendees
            .map(|n| n.to_string())
            .unwrap_or_else(|| "?".to_string())
    }

    pub fn total_shirts(&self) -> u32 {
        self.shirts.iter().map(|s| s.count).sum()
    }

    /// 家庭成员子条目：按换行与逗号切分，去空白、去空项，保持源顺序
    pub fn family_entries(&self) -> impl Iterator<Item = &str> {
        self.family_members
            .split(['\n', ','])
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
    }
}

/// 取字符串字段；数字单元格转为十进制文本
fn text_field(row: &Map<String, Value>, key: &str) -> String {
    match row.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// 取数量字段；无法解析按 0 处理
fn count_field(row: &Map<String, Value>, key: &str) -> u32 {
    match row.get(key) {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0) as u32,
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}
