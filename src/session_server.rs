use std::collections::HashMap;
use std::io;

use rand::random;
use tokio::sync::{mpsc, oneshot};

use crate::csv_log;
use crate::error::SubmissionError;
use crate::session::{Session, SubmissionRecord};
use crate::structs::awl_type::{ConnId, Pseudo};
use crate::structs::submit::Notification;

#[derive(Debug)]
enum Command {
    Connect {
        conn_tx: mpsc::UnboundedSender<Notification>,
        res_tx: oneshot::Sender<ConnId>,
    },

    Disconnect {
        conn: ConnId,
    },

    Register {
        pseudo: Pseudo,
        res_tx: oneshot::Sender<Result<(), SubmissionError>>,
    },

    Submit {
        pseudo: Pseudo,
        answers: Vec<char>,
        source_address: String,
        res_tx: oneshot::Sender<Result<SubmissionRecord, SubmissionError>>,
    },
}

/// 会话协调器，唯一会修改会话状态的地方
///
/// 命令循环同时是本场会话的临界区: 记录提交和随后的广播在
/// 同一次循环里完成，同一昵称的查重和写入不会产生竞争。
#[derive(Debug)]
pub struct SessionServer {
    /// 连接ID和消息发送管道的键值对
    observers: HashMap<ConnId, mpsc::UnboundedSender<Notification>>,

    /// 本场答题的全部状态
    session: Session,

    /// 已接受提交的落盘路径
    csv_path: String,

    /// 接收命令的管道
    cmd_rx: mpsc::UnboundedReceiver<Command>,
}

impl SessionServer {
    pub fn new(session: Session, csv_path: String) -> (SessionServer, SessionServerHandle) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        (
            SessionServer {
                observers: HashMap::new(),
                session,
                csv_path,
                cmd_rx,
            },
            SessionServerHandle { cmd_tx },
        )
    }

    fn connect(&mut self, conn_tx: mpsc::UnboundedSender<Notification>) -> ConnId {
        let id = random::<ConnId>();
        // 接入时先推送当前人数快照，中途加入的监考端不会看到跳变
        let _ = conn_tx.send(Notification::CountUpdate {
            count: self.session.current_count(),
        });
        self.observers.insert(id, conn_tx);
        id
    }

    fn disconnect(&mut self, conn: ConnId) {
        self.observers.remove(&conn);
    }

    /// 记录一次提交并按固定顺序广播结果
    fn submit(
        &mut self,
        pseudo: Pseudo,
        answers: Vec<char>,
        source_address: String,
    ) -> Result<SubmissionRecord, SubmissionError> {
        // 被拒绝的提交只返回给提交者本人，不会出现在广播里
        let record = self
            .session
            .record_submission(&pseudo, answers, source_address)?
            .clone();

        // 落盘失败只记录日志，绝不回滚已经接受的提交
        if let Err(e) = csv_log::append_submission(&self.csv_path, &record) {
            log::error!("写入提交记录{}失败: {}", self.csv_path, e);
        }

        self.broadcast(Notification::CountUpdate {
            count: self.session.current_count(),
        });
        self.broadcast(Notification::StudentResult {
            pseudo: record.pseudo.clone(),
            per_question_correct: record.per_question_correct.clone(),
        });
        if self.session.take_completion() {
            log::info!("所有学生均已提交");
            self.broadcast(Notification::SessionComplete {});
        }
        Ok(record)
    }

    /// 把消息推送给所有监考端，失效的连接直接移除
    fn broadcast(&mut self, notification: Notification) {
        self.observers
            .retain(|_, conn_tx| conn_tx.send(notification.clone()).is_ok());
    }

    pub async fn run(mut self) -> io::Result<()> {
        while let Some(cmd) = self.cmd_rx.recv().await {
            match cmd {
                Command::Connect { conn_tx, res_tx } => {
                    let conn_id = self.connect(conn_tx);
                    let _ = res_tx.send(conn_id);
                }

                Command::Disconnect { conn } => {
                    self.disconnect(conn);
                }

                Command::Register { pseudo, res_tx } => {
                    let _ = res_tx.send(self.session.register(&pseudo));
                }

                Command::Submit { pseudo, answers, source_address, res_tx } => {
                    let result = self.submit(pseudo, answers, source_address);
                    let _ = res_tx.send(result);
                }
            }
        }

        Ok(())
    }
}

/// 协调器的句柄，HTTP层和websocket层通过它发送命令
#[derive(Debug, Clone)]
pub struct SessionServerHandle {
    cmd_tx: mpsc::UnboundedSender<Command>,
}

impl SessionServerHandle {
    /// 监考端接入，返回连接ID
    pub async fn connect(&self, conn_tx: mpsc::UnboundedSender<Notification>) -> ConnId {
        let (res_tx, res_rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Connect { conn_tx, res_tx })
            .unwrap();

        // unwrap: session server does not drop our response channel
        res_rx.await.unwrap()
    }

    /// 断开连接并从协调器注销
    pub fn disconnect(&self, conn: ConnId) {
        // unwrap: session server should not have been dropped
        self.cmd_tx.send(Command::Disconnect { conn }).unwrap();
    }

    /// 预留昵称
    pub async fn register(&self, pseudo: Pseudo) -> Result<(), SubmissionError> {
        let (res_tx, res_rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Register { pseudo, res_tx })
            .unwrap();

        // unwrap: session server does not drop our response channel
        res_rx.await.unwrap()
    }

    /// 提交答卷
    pub async fn submit(
        &self,
        pseudo: Pseudo,
        answers: Vec<char>,
        source_address: String,
    ) -> Result<SubmissionRecord, SubmissionError> {
        let (res_tx, res_rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Submit { pseudo, answers, source_address, res_tx })
            .unwrap();

        // unwrap: session server does not drop our response channel
        res_rx.await.unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;
    use std::sync::Arc;

    const DOC: &str = "测试问卷\n\n\n1. 第一题\na) one\nb) two$true$\n\n2. 第二题\na) x$true$\nb) y\n";

    fn test_session(expected_count: Option<usize>) -> Session {
        let quiz = Arc::new(parser::parse(DOC).unwrap());
        Session::new(quiz, expected_count)
    }

    fn temp_csv() -> String {
        std::env::temp_dir()
            .join(format!("quizroom_server_test_{}.csv", random::<u64>()))
            .to_string_lossy()
            .into_owned()
    }

    fn spawn_server(expected_count: Option<usize>) -> (SessionServerHandle, String) {
        let csv_path = temp_csv();
        let (server, handle) = SessionServer::new(test_session(expected_count), csv_path.clone());
        tokio::spawn(server.run());
        (handle, csv_path)
    }

    #[tokio::test]
    async fn observer_gets_snapshot_then_ordered_updates() {
        let (handle, csv_path) = spawn_server(Some(1));
        let (conn_tx, mut conn_rx) = mpsc::unbounded_channel();
        handle.connect(conn_tx).await;

        // 接入时先收到人数快照
        assert_eq!(conn_rx.recv().await, Some(Notification::CountUpdate { count: 0 }));

        let record = handle
            .submit("s1".to_string(), vec!['b', 'a'], "127.0.0.1".to_string())
            .await
            .unwrap();
        assert_eq!(record.per_question_correct, vec![true, true]);

        // 固定顺序: 人数、单人结果、完成
        assert_eq!(conn_rx.recv().await, Some(Notification::CountUpdate { count: 1 }));
        assert_eq!(
            conn_rx.recv().await,
            Some(Notification::StudentResult {
                pseudo: "s1".to_string(),
                per_question_correct: vec![true, true],
            })
        );
        assert_eq!(conn_rx.recv().await, Some(Notification::SessionComplete {}));

        let _ = std::fs::remove_file(&csv_path);
    }

    #[tokio::test]
    async fn rejected_submission_is_not_broadcast() {
        let (handle, csv_path) = spawn_server(None);
        let (conn_tx, mut conn_rx) = mpsc::unbounded_channel();
        handle.connect(conn_tx).await;
        assert_eq!(conn_rx.recv().await, Some(Notification::CountUpdate { count: 0 }));

        handle
            .submit("s1".to_string(), vec!['b', 'a'], "127.0.0.1".to_string())
            .await
            .unwrap();
        let err = handle
            .submit("s1".to_string(), vec!['a', 'a'], "127.0.0.1".to_string())
            .await
            .unwrap_err();
        assert_eq!(err, SubmissionError::AlreadySubmitted("s1".to_string()));

        // 只有第一次提交产生了广播
        assert_eq!(conn_rx.recv().await, Some(Notification::CountUpdate { count: 1 }));
        assert_eq!(
            conn_rx.recv().await,
            Some(Notification::StudentResult {
                pseudo: "s1".to_string(),
                per_question_correct: vec![true, true],
            })
        );
        assert!(conn_rx.try_recv().is_err());

        let _ = std::fs::remove_file(&csv_path);
    }

    #[tokio::test]
    async fn completion_fires_only_on_the_transition() {
        let (handle, csv_path) = spawn_server(Some(2));
        let (conn_tx, mut conn_rx) = mpsc::unbounded_channel();
        handle.connect(conn_tx).await;
        assert_eq!(conn_rx.recv().await, Some(Notification::CountUpdate { count: 0 }));

        for pseudo in ["s1", "s2", "s3"] {
            handle
                .submit(pseudo.to_string(), vec!['b', 'a'], "127.0.0.1".to_string())
                .await
                .unwrap();
        }

        let mut notifications = Vec::new();
        while let Ok(notification) = conn_rx.try_recv() {
            notifications.push(notification);
        }
        let completions = notifications
            .iter()
            .filter(|n| matches!(n, Notification::SessionComplete {}))
            .count();
        assert_eq!(completions, 1);
        // 完成消息正好出现在第二个人的结果之后
        assert_eq!(
            notifications[3],
            Notification::StudentResult {
                pseudo: "s2".to_string(),
                per_question_correct: vec![true, true],
            }
        );
        assert_eq!(notifications[4], Notification::SessionComplete {});
        // 迟到的提交仍被接受和广播
        assert_eq!(notifications[5], Notification::CountUpdate { count: 3 });

        let _ = std::fs::remove_file(&csv_path);
    }

    #[tokio::test]
    async fn submissions_are_written_to_csv() {
        let (handle, csv_path) = spawn_server(None);
        handle
            .submit("s1".to_string(), vec!['b', 'a'], "10.0.0.1:9999".to_string())
            .await
            .unwrap();
        let contents = std::fs::read_to_string(&csv_path).unwrap();
        assert_eq!(contents, "s1,b,a,10.0.0.1:9999\n");
        let _ = std::fs::remove_file(&csv_path);
    }
}
