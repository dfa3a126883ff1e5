//! 入站文本解析：触发前缀 → 命令
//!
//! 触发词（大小写无关）：`b` 查询、`p` 标记取件、`p remove` 撤销、`c` 到场未取件。
//! 前缀后的最后一个 token 在有两个及以上 token 时作为城市，否则只按姓名、不限
//! 城市。`b` 后单个纯数字 token 是袋号直查。非触发文本返回 None（机器人保持沉默）。

use crate::session::ActionKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 使用说明（/start、/help、/format、`b format`，以及光杆触发词）
    Help,
    /// 姓名/城市查询
    Query {
        action: ActionKind,
        name: String,
        city: Option<String>,
    },
    /// 袋号直查（绕过匹配器）
    BagLookup(String),
}

impl Command {
    pub fn parse(text: &str) -> Option<Command> {
        let trimmed = text.trim();
        let lower = trimmed.to_lowercase();

        if matches!(lower.as_str(), "/start" | "/help" | "/format" | "b format") {
            return Some(Command::Help);
        }

        let (action, rest) = if lower == "b" || lower.starts_with("b ") {
            (ActionKind::View, &trimmed[1..])
        } else if lower == "p remove" || lower.starts_with("p remove ") {
            (ActionKind::UnmarkPickup, &trimmed[8..])
        } else if lower == "p" || lower.starts_with("p ") {
            (ActionKind::MarkPickup, &trimmed[1..])
        } else if lower == "c" || lower.starts_with("c ") {
            (ActionKind::CheckInNoPickup, &trimmed[1..])
        } else {
            return None;
        };

        let tokens: Vec<&str> = rest.split_whitespace().collect();
        match tokens.as_slice() {
            // 光杆触发词：格式错误，回以使用说明
            [] => Some(Command::Help),
            [single] if action == ActionKind::View
                && single.chars().all(|c| c.is_ascii_digit()) =>
            {
                Some(Command::BagLookup((*single).to_string()))
            }
            [name] => Some(Command::Query {
                action,
                name: (*name).to_string(),
                city: None,
            }),
            [name @ .., city] => Some(Command::Query {
                action,
                name: name.join(" "),
                city: Some((*city).to_string()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_name_and_city() {
        assert_eq!(
            Command::parse("b Kunj Addison"),
            Some(Command::Query {
                action: ActionKind::View,
                name: "Kunj".to_string(),
                city: Some("Addison".to_string()),
            })
        );
    }

    #[test]
    fn test_multiword_name_last_token_is_city() {
        assert_eq!(
            Command::parse("b Kunj Patel Addison"),
            Some(Command::Query {
                action: ActionKind::View,
                name: "Kunj Patel".to_string(),
                city: Some("Addison".to_string()),
            })
        );
    }

    #[test]
    fn test_single_token_is_city_unscoped() {
        assert_eq!(
            Command::parse("p Kunj"),
            Some(Command::Query {
                action: ActionKind::MarkPickup,
                name: "Kunj".to_string(),
                city: None,
            })
        );
    }

    #[test]
    fn test_remove_modifier() {
        assert_eq!(
            Command::parse("p remove Kunj Patel Addison"),
            Some(Command::Query {
                action: ActionKind::UnmarkPickup,
                name: "Kunj Patel".to_string(),
                city: Some("Addison".to_string()),
            })
        );
    }

    #[test]
    fn test_checkin_prefix() {
        assert_eq!(
            Command::parse("c Hem Frisco"),
            Some(Command::Query {
                action: ActionKind::CheckInNoPickup,
                name: "Hem".to_string(),
                city: Some("Frisco".to_string()),
            })
        );
    }

    #[test]
    fn test_case_insensitive_trigger_preserves_operand_case() {
        assert_eq!(
            Command::parse("B KUNJ McKinney"),
            Some(Command::Query {
                action: ActionKind::View,
                name: "KUNJ".to_string(),
                city: Some("McKinney".to_string()),
            })
        );
    }

    #[test]
    fn test_bag_number_lookup() {
        assert_eq!(Command::parse("b 123"), Some(Command::BagLookup("123".to_string())));
        // 袋号直查仅限查询前缀；`p 123` 仍是姓名查询
        assert_eq!(
            Command::parse("p 123"),
            Some(Command::Query {
                action: ActionKind::MarkPickup,
                name: "123".to_string(),
                city: None,
            })
        );
    }

    #[test]
    fn test_help_forms() {
        assert_eq!(Command::parse("/help"), Some(Command::Help));
        assert_eq!(Command::parse("/format"), Some(Command::Help));
        assert_eq!(Command::parse("/start"), Some(Command::Help));
        assert_eq!(Command::parse("b format"), Some(Command::Help));
        assert_eq!(Command::parse("b"), Some(Command::Help));
        assert_eq!(Command::parse("p  "), Some(Command::Help));
    }

    #[test]
    fn test_non_trigger_text_ignored() {
        assert_eq!(Command::parse("hello there"), None);
        assert_eq!(Command::parse("2"), None);
        assert_eq!(Command::parse("bKunj"), None);
        assert_eq!(Command::parse(""), None);
    }
}
