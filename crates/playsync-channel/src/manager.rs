//! Push-channel lifecycle management.
//!
//! At most one live channel exists at any time. The slot (state + reader
//! abort handle) is guarded by a generation counter so a `close` that
//! lands while a connect is still in flight wins: the late stream is
//! discarded instead of resurrecting a channel the caller tore down.

use std::sync::Arc;

use futures::StreamExt;
use metrics::counter;
use parking_lot::Mutex;
use playsync_core::{PushEvent, Result, SyncError};
use tokio::task::AbortHandle;
use tracing::{debug, warn};

use crate::dispatch::PushDispatcher;
use crate::transport::{FrameStream, PushTransport};

/// Observable channel lifecycle state.
///
/// Connecting is indistinguishable from Open here: `ensure_open` claims
/// the slot before the transport handshake so concurrent calls stay
/// idempotent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelState {
    /// No channel; eligible for `ensure_open`.
    Absent,
    /// A channel is live (or being established).
    Open,
    /// Torn down by `close` or a terminal transport error; eligible for
    /// `ensure_open`.
    Closed,
}

struct Slot {
    state: ChannelState,
    reader: Option<AbortHandle>,
    generation: u64,
}

/// Owns the single push-channel connection and its reconnect/teardown
/// policy.
///
/// The manager never retries on its own: reconnection is opportunistic,
/// driven by external re-init calls (visibility regain, reload, initial
/// load). No channel simply means degraded to refresh-on-demand until
/// the next such call.
pub struct PushChannelManager {
    transport: Arc<dyn PushTransport>,
    dispatcher: Arc<PushDispatcher>,
    slot: Arc<Mutex<Slot>>,
}

impl PushChannelManager {
    /// Manager over a transport and an event dispatcher. The channel
    /// starts Absent; call [`Self::ensure_open`] to connect.
    pub fn new(transport: Arc<dyn PushTransport>, dispatcher: Arc<PushDispatcher>) -> Self {
        Self {
            transport,
            dispatcher,
            slot: Arc::new(Mutex::new(Slot {
                state: ChannelState::Absent,
                reader: None,
                generation: 0,
            })),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ChannelState {
        self.slot.lock().state
    }

    /// Open a channel unless one is already live. Idempotent.
    ///
    /// Construction failures are fully handled here — logged, slot left
    /// Absent for the next attempt — and returned only for callers that
    /// want to observe them; they are never user-visible.
    pub async fn ensure_open(&self) -> Result<()> {
        let generation = {
            let mut slot = self.slot.lock();
            if slot.state == ChannelState::Open {
                debug!("push channel already open");
                return Ok(());
            }
            slot.generation += 1;
            slot.state = ChannelState::Open;
            slot.generation
        };

        match self.transport.connect().await {
            Ok(frames) => {
                let mut slot = self.slot.lock();
                if slot.generation != generation || slot.state != ChannelState::Open {
                    debug!("channel torn down during connect, discarding stream");
                    return Ok(());
                }
                let reader = tokio::spawn(read_loop(
                    frames,
                    Arc::clone(&self.dispatcher),
                    Arc::clone(&self.slot),
                    generation,
                ));
                slot.reader = Some(reader.abort_handle());
                debug!("push channel open");
                Ok(())
            }
            Err(e) => {
                let mut slot = self.slot.lock();
                if slot.generation == generation {
                    slot.state = ChannelState::Absent;
                    slot.reader = None;
                }
                warn!(error = %e, "push channel connect failed");
                Err(e)
            }
        }
    }

    /// Tear down the channel and clear the slot. Idempotent.
    pub fn close(&self) {
        let mut slot = self.slot.lock();
        slot.generation += 1;
        if let Some(reader) = slot.reader.take() {
            reader.abort();
        }
        if slot.state != ChannelState::Closed {
            debug!("push channel closed");
        }
        slot.state = ChannelState::Closed;
    }
}

/// Consume frames until the stream ends or errors, dispatching each event
/// synchronously in arrival order. Malformed frames are dropped; they must
/// never kill the channel.
async fn read_loop(
    mut frames: FrameStream,
    dispatcher: Arc<PushDispatcher>,
    slot: Arc<Mutex<Slot>>,
    generation: u64,
) {
    loop {
        match frames.next().await {
            Some(Ok(frame)) => match PushEvent::parse(&frame.kind, &frame.data) {
                Ok(event) => dispatcher.dispatch(&event),
                Err(SyncError::UnknownEventKind(kind)) => {
                    debug!(kind, "ignoring unknown push event kind");
                }
                Err(e) => {
                    warn!(error = %e, "dropping malformed push frame");
                    counter!("playsync_push_frames_dropped_total").increment(1);
                }
            },
            Some(Err(e)) => {
                warn!(error = %e, "push channel terminal error");
                break;
            }
            None => {
                debug!("push channel ended");
                break;
            }
        }
    }

    // Clear the slot so the next ensure_open opens fresh — unless a newer
    // generation already owns it.
    let mut slot = slot.lock();
    if slot.generation == generation {
        slot.state = ChannelState::Closed;
        slot.reader = None;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use playsync_core::RegionKind;
    use playsync_core::testutil::FakeViewDriver;

    use super::*;
    use crate::dispatch::RemoteValueSink;
    use crate::transport::PushFrame;

    enum Script {
        Frames(Vec<Result<PushFrame>>),
        Pending,
        Fail(&'static str),
    }

    struct FakeTransport {
        connects: AtomicUsize,
        scripts: Mutex<VecDeque<Script>>,
    }

    impl FakeTransport {
        fn new(scripts: Vec<Script>) -> Arc<Self> {
            Arc::new(Self {
                connects: AtomicUsize::new(0),
                scripts: Mutex::new(scripts.into()),
            })
        }

        fn connect_count(&self) -> usize {
            self.connects.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PushTransport for FakeTransport {
        async fn connect(&self) -> Result<FrameStream> {
            let _ = self.connects.fetch_add(1, Ordering::SeqCst);
            match self.scripts.lock().pop_front().unwrap_or(Script::Pending) {
                Script::Frames(frames) => Ok(Box::pin(futures::stream::iter(frames))),
                Script::Pending => Ok(Box::pin(futures::stream::pending())),
                Script::Fail(msg) => Err(SyncError::ChannelConnect(msg.into())),
            }
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        volumes: Mutex<Vec<u32>>,
        positions: Mutex<Vec<u64>>,
    }

    impl RemoteValueSink for RecordingSink {
        fn volume_changed(&self, percent: u32) {
            self.volumes.lock().push(percent);
        }
        fn position_changed(&self, millis: u64) {
            self.positions.lock().push(millis);
        }
    }

    fn frame(kind: &str, data: &str) -> Result<PushFrame> {
        Ok(PushFrame {
            kind: kind.into(),
            data: data.into(),
        })
    }

    fn manager_with(
        transport: Arc<FakeTransport>,
        driver: Arc<FakeViewDriver>,
    ) -> (PushChannelManager, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = Arc::new(PushDispatcher::new(driver, sink.clone()));
        (PushChannelManager::new(transport, dispatcher), sink)
    }

    async fn wait_for_state(manager: &PushChannelManager, state: ChannelState) {
        for _ in 0..1000 {
            if manager.state() == state {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("channel never reached {state:?}");
    }

    #[tokio::test]
    async fn ensure_open_is_idempotent() {
        let transport = FakeTransport::new(vec![Script::Pending]);
        let (manager, _sink) = manager_with(transport.clone(), Arc::new(FakeViewDriver::new()));

        manager.ensure_open().await.unwrap();
        manager.ensure_open().await.unwrap();

        assert_eq!(transport.connect_count(), 1);
        assert_eq!(manager.state(), ChannelState::Open);
    }

    #[tokio::test]
    async fn events_dispatch_in_arrival_order() {
        let transport = FakeTransport::new(vec![Script::Frames(vec![
            frame("volume", "42"),
            frame("position", "1000"),
            frame("status", "play"),
        ])]);
        let driver = Arc::new(FakeViewDriver::new().with_element("#controls", Some(RegionKind::Status)));
        let (manager, sink) = manager_with(transport, driver.clone());

        manager.ensure_open().await.unwrap();
        wait_for_state(&manager, ChannelState::Closed).await;

        assert_eq!(*sink.volumes.lock(), vec![42]);
        assert_eq!(*sink.positions.lock(), vec![1000]);
        assert_eq!(driver.triggers().len(), 1);
    }

    #[tokio::test]
    async fn malformed_and_unknown_frames_do_not_kill_the_channel() {
        let transport = FakeTransport::new(vec![Script::Frames(vec![
            frame("volume", "not-a-number"),
            frame("telemetry", "{}"),
            frame("volume", "55"),
        ])]);
        let (manager, sink) = manager_with(transport, Arc::new(FakeViewDriver::new()));

        manager.ensure_open().await.unwrap();
        wait_for_state(&manager, ChannelState::Closed).await;

        // The later frame still dispatched
        assert_eq!(*sink.volumes.lock(), vec![55]);
    }

    #[tokio::test]
    async fn terminal_error_clears_the_slot_for_reopen() {
        let transport = FakeTransport::new(vec![
            Script::Frames(vec![Err(SyncError::ChannelClosed)]),
            Script::Pending,
        ]);
        let (manager, _sink) = manager_with(transport.clone(), Arc::new(FakeViewDriver::new()));

        manager.ensure_open().await.unwrap();
        wait_for_state(&manager, ChannelState::Closed).await;

        // Next external re-init opens a fresh channel
        manager.ensure_open().await.unwrap();
        assert_eq!(transport.connect_count(), 2);
        assert_eq!(manager.state(), ChannelState::Open);
    }

    #[tokio::test]
    async fn connect_failure_leaves_absent() {
        let transport = FakeTransport::new(vec![Script::Fail("refused"), Script::Pending]);
        let (manager, _sink) = manager_with(transport.clone(), Arc::new(FakeViewDriver::new()));

        assert!(manager.ensure_open().await.is_err());
        assert_eq!(manager.state(), ChannelState::Absent);

        // Eligible for the next attempt
        manager.ensure_open().await.unwrap();
        assert_eq!(manager.state(), ChannelState::Open);
        assert_eq!(transport.connect_count(), 2);
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let transport = FakeTransport::new(vec![Script::Pending]);
        let (manager, _sink) = manager_with(transport, Arc::new(FakeViewDriver::new()));

        manager.ensure_open().await.unwrap();
        manager.close();
        manager.close();
        assert_eq!(manager.state(), ChannelState::Closed);
    }

    #[tokio::test]
    async fn close_then_reopen_connects_again() {
        let transport = FakeTransport::new(vec![Script::Pending, Script::Pending]);
        let (manager, _sink) = manager_with(transport.clone(), Arc::new(FakeViewDriver::new()));

        manager.ensure_open().await.unwrap();
        manager.close();
        manager.ensure_open().await.unwrap();

        assert_eq!(transport.connect_count(), 2);
        assert_eq!(manager.state(), ChannelState::Open);
    }

    #[tokio::test]
    async fn reload_event_reloads_the_page() {
        let transport = FakeTransport::new(vec![Script::Frames(vec![frame("reload", "")])]);
        let driver = Arc::new(FakeViewDriver::new());
        let (manager, _sink) = manager_with(transport, driver.clone());

        manager.ensure_open().await.unwrap();
        wait_for_state(&manager, ChannelState::Closed).await;
        assert_eq!(driver.reload_count(), 1);
    }

    #[tokio::test]
    async fn notification_frames_reach_the_region() {
        let transport = FakeTransport::new(vec![Script::Frames(vec![frame(
            "warn",
            "<div>rate limited</div>",
        )])]);
        let driver = Arc::new(FakeViewDriver::new());
        let (manager, _sink) = manager_with(transport, driver.clone());

        manager.ensure_open().await.unwrap();
        wait_for_state(&manager, ChannelState::Closed).await;

        let notes = driver.notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].body, "<div>rate limited</div>");
        assert!(notes[0].status.is_none());
    }
}
