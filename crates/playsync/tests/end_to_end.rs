//! End-to-end scenarios across the coordinator, registry, channel, and
//! range controls, with a scripted transport and fake view driver playing
//! the parts of the server and the UI framework.

#![allow(missing_docs)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use playsync::{
    ChannelState, Coordinator, FrameStream, PushEvent, PushTransport, RangeSurface, RegionTarget,
    RemoteValueSink, Settings, SyncError,
};
use playsync_core::testutil::FakeViewDriver;
use playsync_core::ViewDriver;
use tokio_util::sync::CancellationToken;

struct PendingTransport;

#[async_trait]
impl PushTransport for PendingTransport {
    async fn connect(&self) -> Result<FrameStream, SyncError> {
        Ok(Box::pin(futures::stream::pending()))
    }
}

#[derive(Default)]
struct RecordingSurface {
    fills: Mutex<Vec<f64>>,
    commits: Mutex<Vec<u64>>,
}

impl RecordingSurface {
    fn last_fill(&self) -> Option<f64> {
        self.fills.lock().last().copied()
    }
}

impl RangeSurface for RecordingSurface {
    fn set_fill_percent(&self, percent: f64) {
        self.fills.lock().push(percent);
    }
    fn set_transitions_enabled(&self, _enabled: bool) {}
    fn commit_change(&self, value: u64) {
        self.commits.lock().push(value);
    }
}

struct Harness {
    coordinator: Coordinator,
    driver: Arc<FakeViewDriver>,
    progress: Arc<RecordingSurface>,
}

fn harness(driver: FakeViewDriver) -> Harness {
    let driver = Arc::new(driver);
    let progress = Arc::new(RecordingSurface::default());
    let volume = Arc::new(RecordingSurface::default());
    let coordinator = Coordinator::new(
        driver.clone(),
        Arc::new(PendingTransport),
        progress.clone(),
        volume,
        &Settings::default(),
    );
    Harness {
        coordinator,
        driver,
        progress,
    }
}

#[tokio::test(start_paused = true)]
async fn duplicate_request_supersedes_then_completes_cleanly() {
    let h = harness(FakeViewDriver::new().with_element("#list", None));
    let registry = h.coordinator.registry();

    // Request A to /tracks targeting #list starts; the framework shows
    // its loading indicator.
    let key_a = registry.key_for(Some("#list".into()), Some("/tracks"));
    let cancel_a = CancellationToken::new();
    h.driver.set_loading(true);
    registry.on_before_request(key_a.clone(), cancel_a.clone());

    // 100ms later, request B for the same key starts.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let cancel_b = CancellationToken::new();
    registry.on_before_request(key_a.clone(), cancel_b.clone());

    assert!(cancel_a.is_cancelled());
    assert!(!cancel_b.is_cancelled());
    assert_eq!(registry.active_count(), 1);

    // B completes normally at 500ms.
    tokio::time::sleep(Duration::from_millis(400)).await;
    registry.on_after_request(&key_a);
    h.driver.set_loading(false);

    assert_eq!(registry.active_count(), 0);
    assert!(!h.driver.loading_active());

    // Well past the watchdog deadline: no synthesized failure for either
    // attempt.
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert!(h.driver.notifications().is_empty());
}

#[tokio::test(start_paused = true)]
async fn abandoned_request_surfaces_exactly_one_timeout() {
    let h = harness(FakeViewDriver::new());
    let registry = h.coordinator.registry();

    let key = registry.key_for(None, Some("/tracks"));
    registry.on_before_request(key, CancellationToken::new());

    tokio::time::sleep(Duration::from_secs(31)).await;

    let notes = h.driver.notifications();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].status, Some(408));
    assert!(notes[0].body.contains("/tracks"));
    assert!(notes[0].body.contains("30s"));
    assert_eq!(registry.active_count(), 0);
}

#[tokio::test]
async fn plain_link_click_cancels_everything_and_closes_the_channel() {
    let h = harness(FakeViewDriver::new());
    h.coordinator.startup().await;
    assert_eq!(h.coordinator.channel().state(), ChannelState::Open);

    let registry = h.coordinator.registry();
    let token = CancellationToken::new();
    registry.on_before_request(
        registry.key_for(Some("#list".into()), Some("/tracks")),
        token.clone(),
    );

    assert!(registry.on_link_click("/library", false));

    assert!(token.is_cancelled());
    assert_eq!(registry.active_count(), 0);
    assert_eq!(h.coordinator.channel().state(), ChannelState::Closed);
}

#[tokio::test]
async fn detached_swap_target_is_vetoed_without_a_notification() {
    let h = harness(FakeViewDriver::new().with_element("#list", None));
    let registry = h.coordinator.registry();

    h.driver.set_loading(true);
    h.driver.detach(&"#list".into());

    let decision = registry.intercept_swap(&RegionTarget::Element("#list".into()), "/tracks");

    assert_eq!(decision, playsync::SwapDecision::Veto);
    assert!(!h.driver.loading_active());
    assert!(h.driver.notifications().is_empty());
}

#[tokio::test]
async fn drag_suppresses_remote_position_until_pointer_up() {
    let h = harness(FakeViewDriver::new());
    let controls = h.coordinator.controls();
    controls.set_track_duration_millis(Some(200_000));

    // Idle: remote position renders.
    controls.position_changed(50_000);
    assert_eq!(h.progress.last_fill(), Some(25.0));

    // Mid-gesture: a remote position arrives and must not move the fill.
    controls.progress_pointer_down(0.8);
    assert_eq!(h.progress.last_fill(), Some(80.0));
    controls.position_changed(10_000);
    assert_eq!(h.progress.last_fill(), Some(80.0));

    // Pointer-up commits once and resyncs to the local value.
    assert_eq!(controls.progress_pointer_up(), Some(160_000));
    assert_eq!(h.progress.last_fill(), Some(80.0));
    assert_eq!(*h.progress.commits.lock(), vec![160_000]);

    // The next remote event resynchronizes.
    controls.position_changed(170_000);
    assert_eq!(h.progress.last_fill(), Some(85.0));
}

#[tokio::test]
async fn push_events_drive_the_whole_pipeline() {
    // A scripted transport that replays a server session, then ends.
    struct ScriptedTransport;

    #[async_trait]
    impl PushTransport for ScriptedTransport {
        async fn connect(&self) -> Result<FrameStream, SyncError> {
            let frames = vec![
                Ok(playsync::PushFrame {
                    kind: "volume".into(),
                    data: "70".into(),
                }),
                Ok(playsync::PushFrame {
                    kind: "error".into(),
                    data: "<div>playback failed</div>".into(),
                }),
            ];
            Ok(Box::pin(futures::stream::iter(frames)))
        }
    }

    let driver = Arc::new(FakeViewDriver::new());
    let volume = Arc::new(RecordingSurface::default());
    let coordinator = Coordinator::new(
        driver.clone(),
        Arc::new(ScriptedTransport),
        Arc::new(RecordingSurface::default()),
        volume.clone(),
        &Settings::default(),
    );

    coordinator.startup().await;
    // The scripted stream ends, closing the channel — a deterministic
    // barrier for "all frames dispatched".
    for _ in 0..1000 {
        if coordinator.channel().state() == ChannelState::Closed {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(coordinator.channel().state(), ChannelState::Closed);

    assert_eq!(volume.last_fill(), Some(70.0));
    let notes = driver.notifications();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].body, "<div>playback failed</div>");

    // Sanity: PushEvent parsing matches what the dispatcher consumed.
    assert!(matches!(
        PushEvent::parse("volume", "70"),
        Ok(PushEvent::Volume { percent: 70 })
    ));
}
