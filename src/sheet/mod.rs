//! 在线表格源/汇：Google Sheets v4 REST
//!
//! 两个窄接口：RosterSource 提供整表刷新快照，PickupSink 写回 Pickup 列
//! 单元格。写回按 (名, 姓, 城市) 对照表格自身行序定位，取首个命中行；
//! 尽力而为、非事务：并发的外部编辑不设防护，失败上报且不重试。

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::roster::{Record, COL_CITY, COL_FIRST_NAME, COL_LAST_NAME};

/// 表格读写错误
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Sheets API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Sheet has no header row")]
    EmptySheet,

    #[error("Column '{0}' not found in sheet header")]
    MissingColumn(String),

    #[error("No sheet row matching '{0}'")]
    RowNotFound(String),
}

/// 记录刷新源
#[async_trait]
pub trait RosterSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Record>, SheetError>;
}

/// 取件状态写回汇
#[async_trait]
pub trait PickupSink: Send + Sync {
    /// 对匹配 (名, 姓, 城市) 的首行写入 Pickup 单元格；后写覆盖先写
    async fn write_pickup(&self, record: &Record, value: &str) -> Result<(), SheetError>;
}

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// values get/update 的响应/请求体
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

pub struct SheetsClient {
    http: reqwest::Client,
    token: String,
    spreadsheet_id: String,
    worksheet: String,
    pickup_column: String,
}

impl SheetsClient {
    pub fn new(
        token: String,
        spreadsheet_id: String,
        worksheet: String,
        pickup_column: String,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            token,
            spreadsheet_id,
            worksheet,
            pickup_column,
        }
    }

    /// 整表读取：表头行 + 数据行
    async fn read_all(&self) -> Result<(Vec<String>, Vec<Vec<Value>>), SheetError> {
        let url = format!(
            "{}/{}/values/{}",
            SHEETS_API_BASE, self.spreadsheet_id, self.worksheet
        );
        let resp = self.http.get(&url).bearer_auth(&self.token).send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(SheetError::Api { status, body });
        }

        let range: ValueRange = resp.json().await?;
        let mut rows = range.values.into_iter();
        let header = match rows.next() {
            Some(cells) => cells.iter().map(cell_text).collect(),
            None => return Err(SheetError::EmptySheet),
        };
        Ok((header, rows.collect()))
    }

    fn column_index(header: &[String], name: &str) -> Result<usize, SheetError> {
        header
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| SheetError::MissingColumn(name.to_string()))
    }
}

#[async_trait]
impl RosterSource for SheetsClient {
    async fn fetch(&self) -> Result<Vec<Record>, SheetError> {
        let (header, rows) = self.read_all().await?;

        let records = rows
            .iter()
            .map(|cells| {
                let row: Map<String, Value> = header
                    .iter()
                    .zip(cells.iter())
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect();
                Record::from_json_row(&row)
            })
            .collect();
        Ok(records)
    }
}

#[async_trait]
impl PickupSink for SheetsClient {
    async fn write_pickup(&self, record: &Record, value: &str) -> Result<(), SheetError> {
        let (header, rows) = self.read_all().await?;

        let pickup_col = Self::column_index(&header, &self.pickup_column)?;
        let first_col = Self::column_index(&header, COL_FIRST_NAME)?;
        let last_col = Self::column_index(&header, COL_LAST_NAME)?;
        let city_col = Self::column_index(&header, COL_CITY)?;

        // 首个命中行获胜（键不保证唯一，沿用表格行序）
        let row_offset = rows
            .iter()
            .position(|cells| {
                row_text(cells, first_col) == record.first_name
                    && row_text(cells, last_col) == record.last_name
                    && row_text(cells, city_col) == record.city
            })
            .ok_or_else(|| SheetError::RowNotFound(record.full_name()))?;

        // 表头占第 1 行，数据从第 2 行起
        let cell = format!("{}{}", column_letters(pickup_col), row_offset + 2);
        let url = format!(
            "{}/{}/values/{}!{}?valueInputOption=RAW",
            SHEETS_API_BASE, self.spreadsheet_id, self.worksheet, cell
        );

        let resp = self
            .http
            .put(&url)
            .bearer_auth(&self.token)
            .json(&json!({ "values": [[value]] }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(SheetError::Api { status, body });
        }

        tracing::info!(cell = %cell, value, "pickup cell updated");
        Ok(())
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn row_text(cells: &[Value], index: usize) -> String {
    cells.get(index).map(cell_text).unwrap_or_default().trim().to_string()
}

/// 0 起始列号 → A1 列字母（0 → A，26 → AA）
fn column_letters(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letters(0), "A");
        assert_eq!(column_letters(7), "H");
        assert_eq!(column_letters(25), "Z");
        assert_eq!(column_letters(26), "AA");
        assert_eq!(column_letters(27), "AB");
        assert_eq!(column_letters(51), "AZ");
        assert_eq!(column_letters(52), "BA");
    }

    #[test]
    fn test_column_index_trims_header() {
        let header = vec!["City ".to_string(), "Pickup".to_string()];
        assert_eq!(SheetsClient::column_index(&header, "City").unwrap(), 0);
        assert!(matches!(
            SheetsClient::column_index(&header, "Bag No."),
            Err(SheetError::MissingColumn(_))
        ));
    }
}
