//! 进度通道 - 基础设施层
//!
//! 后台批阅任务与观察者之间唯一共享的资源。
//!
//! - 单生产者 / 单消费者，`ProgressSender` 不实现 Clone
//! - 发送永不阻塞（无界队列），接收端非阻塞轮询
//! - 按发送顺序交付；`Finished` 只会被交付一次，之后接收端只返回 `Closed`

use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::warn;

use crate::error::AppError;
use crate::models::{BatchSummary, ProgressEvent};

/// 创建一对进度通道端点
pub fn progress_channel() -> (ProgressSender, ProgressReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        ProgressSender { tx },
        ProgressReceiver {
            rx,
            finished: false,
        },
    )
}

/// 生产者端
#[derive(Debug)]
pub struct ProgressSender {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ProgressSender {
    /// 发送事件，观察者已退出时返回 `AppError::ChannelClosed`
    pub fn send(&self, event: ProgressEvent) -> Result<(), AppError> {
        self.tx.send(event).map_err(|_| AppError::ChannelClosed)
    }

    /// 发送一条进度文本
    pub fn progress(&self, message: impl Into<String>) -> Result<(), AppError> {
        self.send(ProgressEvent::InProgress(message.into()))
    }
}

/// 一次非阻塞接收的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TryReceive {
    /// 收到下一个事件
    Event(ProgressEvent),
    /// 暂时没有新事件
    Empty,
    /// 已交付 `Finished`，不会再有事件
    Closed,
}

/// 消费者端
#[derive(Debug)]
pub struct ProgressReceiver {
    rx: mpsc::UnboundedReceiver<ProgressEvent>,
    finished: bool,
}

impl ProgressReceiver {
    /// 非阻塞地取出下一个事件
    ///
    /// 生产者在未发送 `Finished` 的情况下退出时，补发一个带错误说明的 `Finished`
    pub fn try_receive(&mut self) -> TryReceive {
        if self.finished {
            return TryReceive::Closed;
        }

        match self.rx.try_recv() {
            Ok(event) => {
                if event.is_terminal() {
                    self.finish();
                }
                TryReceive::Event(event)
            }
            Err(TryRecvError::Empty) => TryReceive::Empty,
            Err(TryRecvError::Disconnected) => {
                warn!("⚠️ 后台任务未报告完成状态就已退出");
                self.finish();
                TryReceive::Event(ProgressEvent::Finished(BatchSummary::fault(
                    "后台批阅任务意外退出，未报告完成状态",
                )))
            }
        }
    }

    /// 是否已经交付过 `Finished`
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn finish(&mut self) {
        self.finished = true;
        self.rx.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_and_single_terminal_event() {
        let (tx, mut rx) = progress_channel();
        assert_eq!(rx.try_receive(), TryReceive::Empty);

        tx.progress("第一条").unwrap();
        tx.progress("第二条").unwrap();
        tx.send(ProgressEvent::Finished(BatchSummary::nothing_to_do()))
            .unwrap();

        assert_eq!(
            rx.try_receive(),
            TryReceive::Event(ProgressEvent::InProgress("第一条".to_string()))
        );
        assert_eq!(
            rx.try_receive(),
            TryReceive::Event(ProgressEvent::InProgress("第二条".to_string()))
        );
        assert!(matches!(
            rx.try_receive(),
            TryReceive::Event(ProgressEvent::Finished(_))
        ));
        assert!(rx.is_finished());
        assert_eq!(rx.try_receive(), TryReceive::Closed);
    }

    #[test]
    fn test_events_after_finished_are_never_delivered() {
        let (tx, mut rx) = progress_channel();
        tx.send(ProgressEvent::Finished(BatchSummary::nothing_to_do()))
            .unwrap();
        let _ = tx.progress("迟到的消息");

        assert!(matches!(
            rx.try_receive(),
            TryReceive::Event(ProgressEvent::Finished(_))
        ));
        assert_eq!(rx.try_receive(), TryReceive::Closed);
        assert!(tx.progress("再来一条").is_err());
    }

    #[test]
    fn test_dropped_sender_synthesizes_finished() {
        let (tx, mut rx) = progress_channel();
        tx.progress("处理中").unwrap();
        drop(tx);

        assert!(matches!(
            rx.try_receive(),
            TryReceive::Event(ProgressEvent::InProgress(_))
        ));
        match rx.try_receive() {
            TryReceive::Event(ProgressEvent::Finished(summary)) => assert!(summary.is_fault()),
            other => panic!("应该收到补发的 Finished，实际: {:?}", other),
        }
        assert_eq!(rx.try_receive(), TryReceive::Closed);
    }

    #[test]
    fn test_send_fails_when_receiver_dropped() {
        let (tx, rx) = progress_channel();
        drop(rx);
        assert!(matches!(tx.progress("无人接收"), Err(AppError::ChannelClosed)));
    }
}
