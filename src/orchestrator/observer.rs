//! 进度观察者
//!
//! 在调用方自己的任务中按固定间隔轮询进度通道，从不等待后台任务本身

use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::infrastructure::{ProgressReceiver, TryReceive};
use crate::models::{BatchSummary, ProgressEvent};

/// 轮询进度直到收到 `Finished`
///
/// 每个间隔取空当前积压的事件并依次交给 `on_event`，收到 `Finished` 后立即停止轮询
pub async fn observe<F>(
    mut receiver: ProgressReceiver,
    poll_interval: Duration,
    mut on_event: F,
) -> BatchSummary
where
    F: FnMut(&ProgressEvent),
{
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        loop {
            match receiver.try_receive() {
                TryReceive::Event(event) => {
                    on_event(&event);
                    if let ProgressEvent::Finished(summary) = event {
                        return summary;
                    }
                }
                TryReceive::Empty => break,
                TryReceive::Closed => {
                    return BatchSummary::fault("进度通道已关闭");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::progress_channel;

    #[tokio::test]
    async fn test_observer_sees_events_in_order_and_stops() {
        let (tx, rx) = progress_channel();

        let producer = tokio::spawn(async move {
            for i in 0..5 {
                tx.progress(format!("消息 {}", i)).unwrap();
                tokio::time::sleep(Duration::from_millis(3)).await;
            }
            tx.send(ProgressEvent::Finished(BatchSummary::nothing_to_do()))
                .unwrap();
            // Finished 之后的事件不会被观察到
            let _ = tx.progress("多余的消息");
        });

        let mut seen = Vec::new();
        let summary = observe(rx, Duration::from_millis(10), |event| {
            seen.push(event.clone())
        })
        .await;
        producer.await.unwrap();

        assert!(summary.is_empty_input());
        assert_eq!(seen.len(), 6);
        for (i, event) in seen.iter().take(5).enumerate() {
            assert_eq!(event, &ProgressEvent::InProgress(format!("消息 {}", i)));
        }
        assert!(seen[5].is_terminal());
    }
}
