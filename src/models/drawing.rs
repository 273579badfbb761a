use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 玩家（报名者）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Player {
    /// 玩家名称
    pub name: String,
    /// 报名次数，每次对应一次掷骰，必须为正整数
    pub entries: i64,
}

/// 奖品，列表顺序即名次顺序
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Prize {
    pub name: String,
}

/// 单个玩家的抽奖结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WinnerRecord {
    /// 玩家名称
    pub player: String,
    /// 最高点数（成绩）
    pub highest_roll: u32,
    /// 所有掷骰结果，按掷出顺序
    pub all_rolls: Vec<u32>,
    /// 奖品名称，未获奖为 "no prize"
    pub prize: String,
    /// 名次，从 1 开始
    pub rank: u32,
}

/// 一次已完成的抽奖记录（创建后不可修改）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Drawing {
    pub id: String,
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub players: Vec<Player>,
    pub prizes: Vec<Prize>,
    pub winners: Vec<WinnerRecord>,
}

impl Drawing {
    pub fn total_entries(&self) -> i64 {
        self.players.iter().map(|p| p.entries).sum()
    }
}

/// 抽奖列表摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DrawingSummary {
    pub id: String,
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub player_count: usize,
    pub prize_count: usize,
}

impl From<&Drawing> for DrawingSummary {
    fn from(d: &Drawing) -> Self {
        DrawingSummary {
            id: d.id.clone(),
            name: d.name.clone(),
            timestamp: d.timestamp,
            player_count: d.players.len(),
            prize_count: d.prizes.len(),
        }
    }
}

/// 创建抽奖请求
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateDrawingRequest {
    /// 抽奖名称，例如 "December 2024 Monthly Drawing"
    pub name: String,
    pub players: Vec<Player>,
    pub prizes: Vec<Prize>,
}

/// 创建抽奖响应
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreateDrawingResponse {
    pub id: String,
    /// 只读分享链接
    pub url: String,
    pub drawing: Drawing,
}

/// 按 id 查询（`GET /api/drawings?id=...`）
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DrawingQuery {
    pub id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_drawing_json_shape() {
        let drawing = Drawing {
            id: "1733050000000".into(),
            name: "December".into(),
            timestamp: "2024-12-01T10:00:00.000Z".parse().unwrap(),
            players: vec![Player {
                name: "Alice".into(),
                entries: 2,
            }],
            prizes: vec![Prize {
                name: "Gold".into(),
            }],
            winners: vec![WinnerRecord {
                player: "Alice".into(),
                highest_roll: 999,
                all_rolls: vec![10, 999],
                prize: "Gold".into(),
                rank: 1,
            }],
        };

        let value = serde_json::to_value(&drawing).unwrap();
        assert_eq!(value["players"], json!([{ "name": "Alice", "entries": 2 }]));
        assert_eq!(value["prizes"], json!([{ "name": "Gold" }]));
        assert_eq!(
            value["winners"],
            json!([{
                "player": "Alice",
                "highestRoll": 999,
                "allRolls": [10, 999],
                "prize": "Gold",
                "rank": 1
            }])
        );
        assert_eq!(value["timestamp"], json!("2024-12-01T10:00:00Z"));
    }

    #[test]
    fn test_parse_legacy_record() {
        let raw = r#"{
            "id": "1733050000000",
            "timestamp": "2024-12-01T10:00:00.000Z",
            "name": "December",
            "players": [{"name": "Bob", "entries": 1}],
            "prizes": [{"name": "Gold"}],
            "winners": [{"player": "Bob", "highestRoll": 700, "allRolls": [700], "prize": "Gold", "rank": 1}]
        }"#;
        let drawing: Drawing = serde_json::from_str(raw).unwrap();
        assert_eq!(drawing.winners[0].highest_roll, 700);
        assert_eq!(drawing.total_entries(), 1);

        let summary = DrawingSummary::from(&drawing);
        assert_eq!(summary.player_count, 1);
        assert_eq!(summary.prize_count, 1);
    }
}
