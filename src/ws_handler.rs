use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_ws::AggregatedMessage;
use futures_util::StreamExt as _;
use tokio::sync::mpsc;

use crate::session_server::SessionServerHandle;

/// 监考端的websocket连接
///
/// 连接只做转发: 协调器推送的消息发给监考端，监考端除了ping
/// 不需要发送任何业务消息。转发对提交路径是完全异步的，卡住
/// 的连接不会阻塞其他学生提交。
pub async fn ws(
    req: HttpRequest,
    stream: web::Payload,
    session_server: web::Data<SessionServerHandle>,
) -> Result<HttpResponse, Error> {
    let (res, mut ws_session, stream) = actix_ws::handle(&req, stream)?;

    let mut stream = stream
        .aggregate_continuations()
        // aggregate continuation frames up to 1MiB
        .max_continuation_size(2_usize.pow(20));

    // 协调器通过这条管道把消息推给本连接
    let (conn_tx, mut conn_rx) = mpsc::unbounded_channel();
    let session_server = session_server.get_ref().clone();

    actix_web::rt::spawn(async move {
        let conn_id = session_server.connect(conn_tx).await;

        loop {
            tokio::select! {
                notification = conn_rx.recv() => {
                    let Some(notification) = notification else { break };
                    let text = match serde_json::to_string(&notification) {
                        Ok(text) => text,
                        Err(e) => {
                            log::error!("序列化推送消息失败: {}", e);
                            continue;
                        }
                    };
                    if ws_session.text(text).await.is_err() {
                        break;
                    }
                }

                msg = stream.next() => {
                    match msg {
                        Some(Ok(AggregatedMessage::Ping(bytes))) => {
                            if ws_session.pong(&bytes).await.is_err() {
                                break;
                            }
                        }
                        Some(Ok(AggregatedMessage::Close(_))) | None => break,
                        // 监考端不需要发送业务消息
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            log::error!("websocket连接出错: {}", e);
                            break;
                        }
                    }
                }
            }
        }

        session_server.disconnect(conn_id);
        let _ = ws_session.close(None).await;
    });

    Ok(res)
}
