//! 存储变更广播。
//!
//! 每个写操作在提交后发出一条 `StoreEvent`，订阅端据此重新拉取快照。

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// 发生变更的集合。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreCollection {
    Users,
    Groups,
    Challenges,
    Assignments,
}

/// 变更类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

/// 单条存储变更事件。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreEvent {
    pub collection: StoreCollection,
    pub entity_id: String,
    pub kind: ChangeKind,
}

/// 基于 `tokio::broadcast` 的变更广播器。
#[derive(Debug, Clone)]
pub struct ChangeBroadcaster {
    sender: broadcast::Sender<StoreEvent>,
}

impl ChangeBroadcaster {
    /// 创建变更广播器。
    ///
    /// `capacity` 表示内部广播队列容量。
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// 广播一条变更。没有订阅者时事件被丢弃。
    pub fn emit(&self, event: StoreEvent) {
        let _ = self.sender.send(event);
    }

    /// 订阅变更流。
    pub fn subscribe(&self) -> ChangeStream {
        ChangeStream {
            receiver: self.sender.subscribe(),
        }
    }
}

/// 变更接收流包装器。
#[derive(Debug)]
pub struct ChangeStream {
    receiver: broadcast::Receiver<StoreEvent>,
}

impl ChangeStream {
    /// 异步接收下一条变更。
    pub async fn recv(&mut self) -> Result<StoreEvent> {
        Ok(self.receiver.recv().await?)
    }

    /// 非阻塞尝试接收一条变更。
    pub fn try_recv(&mut self) -> Result<StoreEvent> {
        Ok(self.receiver.try_recv()?)
    }
}

#[cfg(test)]
mod tests {
    use super::{ChangeBroadcaster, ChangeKind, StoreCollection, StoreEvent};

    #[tokio::test]
    async fn subscribers_receive_emitted_events() {
        let broadcaster = ChangeBroadcaster::new(16);
        let mut stream = broadcaster.subscribe();

        broadcaster.emit(StoreEvent {
            collection: StoreCollection::Groups,
            entity_id: "g-1".to_string(),
            kind: ChangeKind::Created,
        });

        let event = stream.recv().await.expect("event should arrive");
        assert_eq!(event.collection, StoreCollection::Groups);
        assert_eq!(event.entity_id, "g-1");
        assert_eq!(event.kind, ChangeKind::Created);
    }

    #[test]
    fn try_recv_on_idle_stream_is_an_error() {
        let broadcaster = ChangeBroadcaster::new(16);
        let mut stream = broadcaster.subscribe();

        assert!(stream.try_recv().is_err());
    }

    #[test]
    fn events_emitted_without_subscribers_are_dropped() {
        let broadcaster = ChangeBroadcaster::new(16);

        broadcaster.emit(StoreEvent {
            collection: StoreCollection::Users,
            entity_id: "u-1".to_string(),
            kind: ChangeKind::Deleted,
        });

        let mut late = broadcaster.subscribe();
        assert!(late.try_recv().is_err());
    }
}
