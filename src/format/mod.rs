//! 回复渲染：单人详情、编号菜单、按行切分长消息
//!
//! 输出为 Telegram 传统 Markdown。切分只在行边界进行，保证每个分片都是
//! 独立合法的标记文本。

use crate::matcher::Candidate;
use crate::session::ActionKind;

/// /help、/format 与 `b format` 的使用说明
pub const HELP_TEXT: &str = "🛠️ *Available Commands*\n\n\
📘 *Check Registration* (`b ...`)\n\
- `b FirstName City`\n\
- `b FirstName LastName City`\n\
- `b LastName City`\n\
- `b FirstName` _(any city)_\n\
- `b Kun add` _(partial match)_\n\
- `b 123` _(bag number)_\n\n\
📦 *Mark Pickup* (`p ...`)\n\
- same shapes as `b`\n\n\
🚫 *Undo Pickup* (`p remove ...`)\n\
- e.g. `p remove Kunj Patel Addison`\n\n\
🙋 *Check In Without Pickup* (`c ...`)\n\
- same shapes as `b`\n\n\
✉️ When a numbered list appears, reply with just the number.";

/// 单候选详情
pub fn detail(candidate: &Candidate) -> String {
    let record = &candidate.record;
    let family = record.family_members.trim();

    let mut out = format!(
        "✅ *{}* is registered.\n\
📍 *City:* {}\n\
👥 *Attendees:* {}\n\
👨‍👩‍👧 *Family Members:*\n{}",
        record.full_name(),
        if record.city.is_empty() { "Unknown" } else { &record.city },
        record.attendees_display(),
        if family.is_empty() { "None" } else { family },
    );

    if record.shirts.is_empty() {
        out.push_str("\n\n👕 *T-Shirts Ordered:* None");
    } else {
        out.push_str("\n\n👕 *T-Shirts Ordered:*\n");
        for shirt in &record.shirts {
            out.push_str(&format!("- {}: {}\n", shirt.size, shirt.count));
        }
        out.push_str(&format!("\n📦 *Total T-Shirts:* {}", record.total_shirts()));
    }

    out.push_str(&format!(
        "\n🎒 *Bag No.:* {}",
        record.bag_no.as_deref().unwrap_or("N/A")
    ));
    out.push_str(&format!("\n🚚 *Pickup:* {}", record.pickup.display()));

    if let Some(entry) = candidate.family_entry() {
        out.push_str(&format!("\n🧑‍🤝‍🧑 *Matched via family member:* *{}*", entry));
    }

    out
}

/// 多候选编号菜单（1 起始），尾部提示按动作措辞
pub fn menu(candidates: &[Candidate], action: ActionKind) -> String {
    let mut out = format!("🔎 *Found {} possible matches:*\n\n", candidates.len());

    for (i, candidate) in candidates.iter().enumerate() {
        let record = &candidate.record;
        let note = candidate
            .family_entry()
            .map(|entry| format!(" _(via family: {})_", entry))
            .unwrap_or_default();
        out.push_str(&format!(
            "{}. *{}* — {} attendees – {}{}\n",
            i + 1,
            record.full_name(),
            record.attendees_display(),
            if record.city.is_empty() { "?" } else { &record.city },
            note,
        ));
    }

    let instruction = match action {
        ActionKind::View => "see full details",
        ActionKind::MarkPickup => "mark pickup",
        ActionKind::UnmarkPickup => "remove pickup",
        ActionKind::CheckInNoPickup => "check in",
    };
    out.push_str(&format!("\n✉️ *Reply with the number to {}.*", instruction));
    out
}

/// 按行切分超长消息；单行永不从中截断（超长单行独占一个分片）
pub fn split_message(text: &str, max_len: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in text.trim().split('\n') {
        if !current.is_empty() && current.len() + line.len() + 1 > max_len {
            chunks.push(current.trim_end().to_string());
            current = String::new();
        }
        current.push_str(line);
        current.push('\n');
    }
    if !current.trim().is_empty() {
        chunks.push(current.trim_end().to_string());
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::MatchVia;
    use crate::roster::{Record, COL_ATTENDEES, COL_CITY, COL_FIRST_NAME, COL_LAST_NAME};

    fn candidate(first: &str, last: &str, city: &str, attendees: &str) -> Candidate {
        let mut row = serde_json::Map::new();
        row.insert(COL_FIRST_NAME.to_string(), first.into());
        row.insert(COL_LAST_NAME.to_string(), last.into());
        row.insert(COL_CITY.to_string(), city.into());
        row.insert(COL_ATTENDEES.to_string(), attendees.into());
        Candidate {
            record: Record::from_json_row(&row),
            via: MatchVia::Direct,
        }
    }

    #[test]
    fn test_detail_contains_identity_and_attendees() {
        let text = detail(&candidate("Kunj", "Patel", "Addison", "4"));
        assert!(text.contains("Kunj Patel"));
        assert!(text.contains("*Attendees:* 4"));
        assert!(text.contains("*City:* Addison"));
        assert!(text.contains("*T-Shirts Ordered:* None"));
        assert!(text.contains("*Bag No.:* N/A"));
    }

    #[test]
    fn test_detail_family_provenance_annotation() {
        let mut c = candidate("Kunj", "Patel", "Addison", "4");
        c.via = MatchVia::Family {
            entry: "Riya Patel".to_string(),
        };
        assert!(detail(&c).contains("Matched via family member:* *Riya Patel*"));
    }

    #[test]
    fn test_menu_numbering_and_instruction() {
        let candidates = vec![
            candidate("Amit", "Patel", "Addison", "2"),
            candidate("Zara", "Patel", "Addison", "3"),
        ];
        let text = menu(&candidates, ActionKind::MarkPickup);
        assert!(text.contains("Found 2 possible matches"));
        assert!(text.contains("1. *Amit Patel*"));
        assert!(text.contains("2. *Zara Patel*"));
        assert!(text.contains("Reply with the number to mark pickup."));
    }

    #[test]
    fn test_split_respects_line_boundaries() {
        let text = "aaaa\nbbbb\ncccc\ndddd";
        let chunks = split_message(text, 10);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.len() <= 10);
            // 每个分片由完整的行组成
            for line in chunk.split('\n') {
                assert!(text.contains(line));
            }
        }
        assert_eq!(chunks.join("\n"), text);
    }

    #[test]
    fn test_split_short_message_single_chunk() {
        assert_eq!(split_message("hello\nworld", 4000), vec!["hello\nworld"]);
    }

    #[test]
    fn test_split_oversize_line_kept_whole() {
        let long = "x".repeat(50);
        let chunks = split_message(&format!("short\n{}", long), 10);
        assert_eq!(chunks, vec!["short".to_string(), long]);
    }
}
