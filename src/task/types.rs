use serde::{Deserialize, Serialize};

/// 任务状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

/// 任务事件（用于广播）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskEvent {
    Queued { id: u64, name: String },
    Started { id: u64 },
    Completed { id: u64 },
    Failed { id: u64, error: String },
}

impl TaskEvent {
    pub fn id(&self) -> u64 {
        match self {
            TaskEvent::Queued { id, .. }
            | TaskEvent::Started { id }
            | TaskEvent::Completed { id }
            | TaskEvent::Failed { id, .. } => *id,
        }
    }

    pub fn status(&self) -> TaskStatus {
        match self {
            TaskEvent::Queued { .. } => TaskStatus::Pending,
            TaskEvent::Started { .. } => TaskStatus::Running,
            TaskEvent::Completed { .. } => TaskStatus::Completed,
            TaskEvent::Failed { .. } => TaskStatus::Failed,
        }
    }
}

/// 队列计数快照
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueueStats {
    pub concurrency: usize,
    pub pending: usize,
    pub running: usize,
    pub completed: u64,
    pub failed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = TaskEvent::Failed { id: 3, error: "boom".to_string() };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "failed");
        assert_eq!(json["id"], 3);
        assert_eq!(event.status(), TaskStatus::Failed);
        assert_eq!(event.id(), 3);
    }
}
