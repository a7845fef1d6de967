//! WebSocket 实时订阅处理器。
//!
//! 客户端按视图订阅；服务端先推送完整快照，相关集合变更后重新查询并
//! 再次推送。对同一视图重复订阅会替换旧订阅，过滤条件变化不会留下
//! 重复监听；连接断开时全部订阅随之销毁。

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use academia_code_core::domain::{AccessScope, GroupId};
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::state::AppState;
use super::{ApiError, assignments, caller_scope, challenges, dashboard, groups, users};
use crate::watch::{StoreCollection, StoreEvent};

/// 可订阅的视图。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewName {
    Groups,
    Users,
    Challenges,
    Assignments,
    Dashboard,
}

/// 客户端发送的 WebSocket 消息。
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// 订阅视图；同视图的旧订阅被替换。
    Subscribe {
        view: ViewName,
        caller: String,
        #[serde(default)]
        group_id: Option<String>,
    },
    /// 取消订阅。
    Unsubscribe { view: ViewName },
}

/// 服务端发送的 WebSocket 消息。
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// 视图完整快照。
    Snapshot {
        view: ViewName,
        data: serde_json::Value,
    },
    /// 订阅已取消。
    Unsubscribed { view: ViewName },
    /// 错误消息。
    Error { message: String },
}

struct Subscription {
    scope: AccessScope,
    group_id: Option<GroupId>,
}

/// Axum WebSocket 升级 handler。
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    info!("new WebSocket connection request");
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let (out_tx, mut out_rx) = mpsc::channel::<ServerMessage>(64);
    info!("WebSocket connection established");

    let writer_task = tokio::spawn(async move {
        while let Some(server_msg) = out_rx.recv().await {
            match serde_json::to_string(&server_msg) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(err) => {
                    error!(error = %err, "failed to serialize WebSocket message");
                    break;
                }
            }
        }
    });

    let mut subscriptions: HashMap<ViewName, Subscription> = HashMap::new();
    let mut changes = state.changes.subscribe();

    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(client_msg) => {
                                if handle_client_message(&state, &mut subscriptions, &out_tx, client_msg)
                                    .await
                                    .is_err()
                                {
                                    break;
                                }
                            }
                            Err(err) => {
                                if send(&out_tx, ServerMessage::Error {
                                    message: format!("invalid message: {err}"),
                                })
                                .await
                                .is_err()
                                {
                                    break;
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        warn!(error = %err, "WebSocket receive error");
                        break;
                    }
                }
            }
            event = changes.recv() => {
                match event {
                    Ok(event) => {
                        if push_affected_snapshots(&state, &subscriptions, &out_tx, &event)
                            .await
                            .is_err()
                        {
                            break;
                        }
                    }
                    Err(err) => {
                        warn!(error = %err, "change stream receive failed");
                        let _ = send(&out_tx, ServerMessage::Error {
                            message: format!("change stream error: {err}"),
                        })
                        .await;
                        break;
                    }
                }
            }
        }
    }

    drop(out_tx);
    if let Err(err) = writer_task.await {
        warn!(error = %err, "WebSocket writer task exited with join error");
    }

    info!("WebSocket connection closed");
}

async fn send(out_tx: &mpsc::Sender<ServerMessage>, msg: ServerMessage) -> Result<(), ()> {
    out_tx.send(msg).await.map_err(|_| ())
}

async fn handle_client_message(
    state: &AppState,
    subscriptions: &mut HashMap<ViewName, Subscription>,
    out_tx: &mpsc::Sender<ServerMessage>,
    msg: ClientMessage,
) -> Result<(), ()> {
    match msg {
        ClientMessage::Subscribe {
            view,
            caller,
            group_id,
        } => {
            let scope = match caller_scope(state, &caller).await {
                Ok(scope) => scope,
                Err(err) => {
                    return send(out_tx, ServerMessage::Error {
                        message: err.message().to_string(),
                    })
                    .await;
                }
            };
            let group_id = match group_id.as_deref().map(GroupId::from_str).transpose() {
                Ok(group_id) => group_id,
                Err(_) => {
                    return send(out_tx, ServerMessage::Error {
                        message: "invalid group_id".to_string(),
                    })
                    .await;
                }
            };

            // 插入即替换：同视图旧的监听被丢弃，不会重复推送。
            subscriptions.insert(view, Subscription { scope, group_id });
            let subscription = &subscriptions[&view];

            match view_snapshot(state, view, subscription).await {
                Ok(data) => send(out_tx, ServerMessage::Snapshot { view, data }).await,
                Err(err) => {
                    send(out_tx, ServerMessage::Error {
                        message: err.message().to_string(),
                    })
                    .await
                }
            }
        }
        ClientMessage::Unsubscribe { view } => {
            subscriptions.remove(&view);
            send(out_tx, ServerMessage::Unsubscribed { view }).await
        }
    }
}

async fn push_affected_snapshots(
    state: &AppState,
    subscriptions: &HashMap<ViewName, Subscription>,
    out_tx: &mpsc::Sender<ServerMessage>,
    event: &StoreEvent,
) -> Result<(), ()> {
    for (view, subscription) in subscriptions {
        if !view_watches(*view, event.collection) {
            continue;
        }

        match view_snapshot(state, *view, subscription).await {
            Ok(data) => send(out_tx, ServerMessage::Snapshot { view: *view, data }).await?,
            Err(err) => {
                send(out_tx, ServerMessage::Error {
                    message: err.message().to_string(),
                })
                .await?;
            }
        }
    }

    Ok(())
}

/// 视图关心的集合。作业视图内嵌挑战摘要，所以也监听挑战集合。
fn view_watches(view: ViewName, collection: StoreCollection) -> bool {
    match view {
        ViewName::Groups => collection == StoreCollection::Groups,
        ViewName::Users => collection == StoreCollection::Users,
        ViewName::Challenges => collection == StoreCollection::Challenges,
        ViewName::Assignments => {
            collection == StoreCollection::Assignments || collection == StoreCollection::Challenges
        }
        ViewName::Dashboard => true,
    }
}

async fn view_snapshot(
    state: &AppState,
    view: ViewName,
    subscription: &Subscription,
) -> Result<serde_json::Value, ApiError> {
    let value = match view {
        ViewName::Groups => {
            let mut rows = groups::list_for_scope(state, &subscription.scope).await?;
            if let Some(group_id) = subscription.group_id {
                let wanted = group_id.to_string();
                rows.retain(|row| row.id == wanted);
            }
            to_value(rows)?
        }
        ViewName::Users => {
            let mut rows = users::list_for_scope(state, &subscription.scope).await?;
            if let Some(group_id) = subscription.group_id {
                let wanted = group_id.to_string();
                rows.retain(|row| row.group_id.as_deref() == Some(wanted.as_str()));
            }
            to_value(rows)?
        }
        ViewName::Challenges => to_value(challenges::list_all(state).await?)?,
        ViewName::Assignments => to_value(
            assignments::list_for_scope(state, &subscription.scope, subscription.group_id).await?,
        )?,
        ViewName::Dashboard => to_value(dashboard::build(state, &subscription.scope).await?)?,
    };

    Ok(value)
}

fn to_value<T: Serialize>(data: T) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(data).map_err(|err| ApiError::internal(err.into()))
}

#[cfg(test)]
mod tests {
    use super::{ClientMessage, ServerMessage, ViewName, view_watches};
    use crate::watch::StoreCollection;

    #[test]
    fn subscribe_message_parses_with_optional_filter() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"subscribe","view":"assignments","caller":"3f1d9a90-9f5c-4f6e-9e4e-6c9f6d2a1b2c"}"#,
        )
        .expect("subscribe should parse");

        match msg {
            ClientMessage::Subscribe { view, group_id, .. } => {
                assert_eq!(view, ViewName::Assignments);
                assert!(group_id.is_none());
            }
            other => panic!("expected Subscribe, got: {other:?}"),
        }
    }

    #[test]
    fn snapshot_message_serializes_with_snake_case_tag() {
        let msg = ServerMessage::Snapshot {
            view: ViewName::Groups,
            data: serde_json::json!([]),
        };

        let json = serde_json::to_string(&msg).expect("message should serialize");
        assert!(json.contains("\"type\":\"snapshot\""));
        assert!(json.contains("\"view\":\"groups\""));
    }

    #[test]
    fn assignment_view_also_watches_challenges() {
        assert!(view_watches(ViewName::Assignments, StoreCollection::Challenges));
        assert!(view_watches(ViewName::Assignments, StoreCollection::Assignments));
        assert!(!view_watches(ViewName::Groups, StoreCollection::Assignments));
        assert!(view_watches(ViewName::Dashboard, StoreCollection::Groups));
    }
}
