//! 统计事件（抽奖完成 / 抽奖被查看）
//!
//! 事件发送失败不影响业务请求，默认实现只写结构化日志。

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum DrawingEvent {
    #[serde(rename = "Drawing Conducted", rename_all = "camelCase")]
    Conducted {
        drawing_id: String,
        drawing_name: String,
        player_count: usize,
        prize_count: usize,
        total_entries: i64,
    },
    #[serde(rename = "Drawing Viewed", rename_all = "camelCase")]
    Viewed {
        drawing_id: String,
        drawing_name: String,
        player_count: usize,
        prize_count: usize,
    },
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: DrawingEvent);
}

/// 写入 `analytics` target 的日志
#[derive(Debug, Clone, Default)]
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn emit(&self, event: DrawingEvent) {
        match serde_json::to_string(&event) {
            Ok(line) => log::info!(target: "analytics", "{line}"),
            Err(e) => log::warn!(target: "analytics", "Failed to serialize event: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_json() {
        let event = DrawingEvent::Conducted {
            drawing_id: "abc".into(),
            drawing_name: "December".into(),
            player_count: 3,
            prize_count: 2,
            total_entries: 9,
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "event": "Drawing Conducted",
                "drawingId": "abc",
                "drawingName": "December",
                "playerCount": 3,
                "prizeCount": 2,
                "totalEntries": 9
            })
        );
    }
}
