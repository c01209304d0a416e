//! Shared fixtures for the sticky integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use motion_common::{ChannelId, MessageId};
use motion_sticky::{
    ChannelLockTable, GatewayError, MessageGateway, RenderedSticky, StickyEngine, StickyStore,
    ThemeSource,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Delete(ChannelId, MessageId),
    Publish(ChannelId, RenderedSticky),
}

/// In-memory messaging platform that tracks which messages are live.
#[derive(Default)]
pub struct FakeGateway {
    next_id: AtomicU64,
    live: Mutex<HashSet<(ChannelId, MessageId)>>,
    calls: Mutex<Vec<Call>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    pub fail_publish: AtomicBool,
    pub hang_publish: AtomicBool,
    pub publish_delay: Mutex<Option<Duration>>,
    /// When set, publish signals `entered` and waits for `proceed`.
    pub gate: Mutex<Option<(Arc<Notify>, Arc<Notify>)>>,
}

impl FakeGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicU64::new(1000),
            ..Self::default()
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn publish_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Publish(..)))
            .count()
    }

    pub fn delete_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Delete(..)))
            .count()
    }

    pub fn live_in(&self, channel: ChannelId) -> Vec<MessageId> {
        let mut ids: Vec<_> = self
            .live
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| *c == channel)
            .map(|(_, m)| *m)
            .collect();
        ids.sort();
        ids
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Pretend a moderator removed the message by hand.
    pub fn vanish(&self, channel: ChannelId, message: MessageId) {
        self.live.lock().unwrap().remove(&(channel, message));
    }
}

#[async_trait]
impl MessageGateway for FakeGateway {
    async fn delete_message(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> Result<(), GatewayError> {
        self.calls.lock().unwrap().push(Call::Delete(channel, message));
        if self.live.lock().unwrap().remove(&(channel, message)) {
            Ok(())
        } else {
            Err(GatewayError::NotFound)
        }
    }

    async fn publish_message(
        &self,
        channel: ChannelId,
        sticky: &RenderedSticky,
    ) -> Result<MessageId, GatewayError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Publish(channel, sticky.clone()));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = *self.publish_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let gate = self.gate.lock().unwrap().clone();
        if let Some((entered, proceed)) = gate {
            entered.notify_one();
            proceed.notified().await;
        }
        if self.hang_publish.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if self.fail_publish.load(Ordering::SeqCst) {
            return Err(GatewayError::failure("Missing Permissions"));
        }

        let id = MessageId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.live.lock().unwrap().insert((channel, id));
        Ok(id)
    }
}

pub struct FixedColor(pub u32);

impl ThemeSource for FixedColor {
    fn presentation_color(&self) -> u32 {
        self.0
    }
}

pub struct Harness {
    pub dir: tempfile::TempDir,
    pub gateway: Arc<FakeGateway>,
    pub store: Arc<StickyStore>,
    pub engine: Arc<StickyEngine>,
}

pub fn harness() -> Harness {
    harness_with_timeout(Duration::from_secs(5))
}

pub fn harness_with_timeout(timeout: Duration) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let gateway = FakeGateway::new();
    let store = Arc::new(StickyStore::new(dir.path().join("stickyMessages.json")));
    let engine = Arc::new(StickyEngine::new(
        Arc::clone(&store),
        ChannelLockTable::new(),
        gateway.clone(),
        Arc::new(FixedColor(0x58_65_F2)),
        timeout,
    ));
    Harness {
        dir,
        gateway,
        store,
        engine,
    }
}
