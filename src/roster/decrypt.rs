//! 花名册解密装载：gpg 对称解密 + JSON 行解析
//!
//! 口令经 stdin（--passphrase-fd 0）传给 gpg，不落命令行；解密或解析失败
//! 由调用方（main）视为致命错误终止启动。

use std::path::Path;
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::record::Record;
use super::RosterError;

/// 解密 *.json.gpg 并解析为记录集
pub async fn load_encrypted(path: &Path, passphrase: &str) -> Result<Vec<Record>, RosterError> {
    let mut child = Command::new("gpg")
        .args([
            "--batch",
            "--yes",
            "--quiet",
            "--pinentry-mode",
            "loopback",
            "--passphrase-fd",
            "0",
            "--decrypt",
        ])
        .arg(path)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(passphrase.as_bytes()).await?;
        stdin.write_all(b"\n").await?;
    }

    let output = child.wait_with_output().await?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(RosterError::Decrypt(stderr));
    }

    parse_rows(&output.stdout)
}

/// 解析明文 JSON（扁平对象数组）为记录集
pub fn parse_rows(plaintext: &[u8]) -> Result<Vec<Record>, RosterError> {
    let rows: Vec<serde_json::Map<String, serde_json::Value>> =
        serde_json::from_slice(plaintext)?;
    Ok(rows.iter().map(Record::from_json_row).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rows() {
        let json = br#"[
            {"Registrant First Name": "Kunj", "Registrant Last Name": "Patel",
             "City": "Addison", "Attendees": "4"},
            {"Registrant First Name": "Hem", "Registrant Last Name": "Shah",
             "City": "Frisco", "Attendees": 2}
        ]"#;

        let records = parse_rows(json).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].full_name(), "Kunj Patel");
        assert_eq!(records[1].attendees, Some(2));
    }

    #[test]
    fn test_parse_rows_rejects_malformed() {
        assert!(matches!(
            parse_rows(b"{\"not\": \"an array\"}"),
            Err(RosterError::Parse(_))
        ));
    }
}
