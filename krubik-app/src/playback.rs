//! Timed stepping through a solution.
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use log::{debug, trace};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Where the engine is in its sequence.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PlaybackState {
    /// Nothing played since the moves were loaded.
    Idle,
    Playing,
    Paused,
}

impl Default for PlaybackState {
    fn default() -> Self {
        PlaybackState::Idle
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
        })
    }
}

/// The loaded moves and the position in them.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PlaybackSnapshot {
    pub moves: Arc<[String]>,
    /// Index of the active move. Always 0 when there are no moves.
    pub index: usize,
    pub state: PlaybackState,
}

impl Default for PlaybackSnapshot {
    fn default() -> Self {
        PlaybackSnapshot {
            moves: Arc::from(Vec::new()),
            index: 0,
            state: PlaybackState::Idle,
        }
    }
}

impl PlaybackSnapshot {
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// The active move, if there are any moves.
    pub fn current(&self) -> Option<&str> {
        self.moves.get(self.index).map(String::as_str)
    }

    /// Whether the last move is active and nothing is playing.
    pub fn is_finished(&self) -> bool {
        !self.is_empty()
            && self.index + 1 >= self.len()
            && self.state != PlaybackState::Playing
    }
}

struct Engine {
    snapshot: PlaybackSnapshot,
    // Identifies the current timer. Bumped whenever a timer is started or
    // cancelled so a stale timer finds a mismatch.
    run: u64,
}

struct Inner {
    // Lock order: engine, then timer.
    engine: Mutex<Engine>,
    timer: Mutex<Option<JoinHandle<()>>>,
    tx: watch::Sender<PlaybackSnapshot>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Inner {
    fn publish(&self, engine: &Engine) {
        self.tx.send_replace(engine.snapshot.clone());
    }

    fn cancel_timer(&self) {
        if let Some(timer) = lock(&self.timer).take() {
            timer.abort();
        }
    }

    /// One timer tick. Returns false once the timer should stop.
    fn advance(&self, run: u64) -> bool {
        let mut engine = lock(&self.engine);
        if engine.run != run || engine.snapshot.state != PlaybackState::Playing {
            return false;
        }
        let snapshot = &mut engine.snapshot;
        if snapshot.index + 1 >= snapshot.len() {
            snapshot.index = snapshot.len().saturating_sub(1);
            snapshot.state = PlaybackState::Paused;
            debug!("Playback reached the last of {} moves", snapshot.len());
            self.publish(&engine);
            return false;
        }
        snapshot.index += 1;
        trace!("Playback at move {}", snapshot.index);
        self.publish(&engine);
        true
    }
}

async fn tick_loop(inner: Weak<Inner>, run: u64, period: Duration) {
    let mut ticks = time::interval_at(Instant::now() + period, period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticks.tick().await;
        let inner = match inner.upgrade() {
            Some(inner) => inner,
            None => return,
        };
        if !inner.advance(run) {
            return;
        }
    }
}

/// Steps through a move sequence on a fixed interval. Timers run on the
/// ambient tokio runtime, so `play` must be called from within one.
pub struct Playback {
    inner: Arc<Inner>,
    interval: Duration,
}

impl Playback {
    pub fn new(interval: Duration) -> Self {
        let (tx, _) = watch::channel(PlaybackSnapshot::default());
        Playback {
            inner: Arc::new(Inner {
                engine: Mutex::new(Engine {
                    snapshot: PlaybackSnapshot::default(),
                    run: 0,
                }),
                timer: Mutex::new(None),
                tx,
            }),
            interval,
        }
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        lock(&self.inner.engine).snapshot.clone()
    }

    /// Receive every change to the snapshot.
    pub fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.inner.tx.subscribe()
    }

    /// Replace the moves, rewinding to the first one and stopping any timer.
    pub fn load(&self, moves: Vec<String>) {
        let mut engine = lock(&self.inner.engine);
        engine.run += 1;
        engine.snapshot = PlaybackSnapshot {
            moves: Arc::from(moves),
            index: 0,
            state: PlaybackState::Idle,
        };
        debug!("Loaded {} moves for playback", engine.snapshot.len());
        self.inner.cancel_timer();
        self.inner.publish(&engine);
    }

    /// Start stepping. Does nothing without moves or while already playing.
    pub fn play(&self) {
        let mut engine = lock(&self.inner.engine);
        if engine.snapshot.is_empty() || engine.snapshot.state == PlaybackState::Playing {
            return;
        }
        engine.run += 1;
        engine.snapshot.state = PlaybackState::Playing;
        let timer = tokio::spawn(tick_loop(
            Arc::downgrade(&self.inner),
            engine.run,
            self.interval,
        ));
        if let Some(old) = lock(&self.inner.timer).replace(timer) {
            old.abort();
        }
        debug!(
            "Playing from move {} every {:?}",
            engine.snapshot.index, self.interval
        );
        self.inner.publish(&engine);
    }

    /// Stop stepping, keeping the current move.
    pub fn pause(&self) {
        let mut engine = lock(&self.inner.engine);
        if engine.snapshot.state != PlaybackState::Playing {
            return;
        }
        engine.run += 1;
        engine.snapshot.state = PlaybackState::Paused;
        self.inner.cancel_timer();
        self.inner.publish(&engine);
    }

    pub fn toggle(&self) {
        let playing = lock(&self.inner.engine).snapshot.state == PlaybackState::Playing;
        if playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Whether a timer task is still alive.
    pub fn is_running(&self) -> bool {
        lock(&self.inner.timer)
            .as_ref()
            .map_or(false, |timer| !timer.is_finished())
    }
}

impl Drop for Playback {
    fn drop(&mut self) {
        self.inner.cancel_timer();
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::sleep;

    use super::*;

    const INTERVAL: Duration = Duration::from_millis(750);

    fn moves(list: &[&str]) -> Vec<String> {
        list.iter().map(|m| m.to_string()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn plays_to_the_end_and_stops() {
        crate::setup();

        let playback = Playback::new(INTERVAL);
        playback.load(moves(&["R", "U", "R'"]));
        assert_eq!(playback.snapshot().state, PlaybackState::Idle);

        playback.play();
        assert_eq!(playback.snapshot().index, 0);
        assert_eq!(playback.snapshot().state, PlaybackState::Playing);

        sleep(Duration::from_millis(760)).await;
        assert_eq!(playback.snapshot().index, 1);
        assert_eq!(playback.snapshot().current(), Some("U"));

        sleep(Duration::from_millis(1540)).await;
        let snapshot = playback.snapshot();
        assert_eq!(snapshot.index, 2);
        assert_eq!(snapshot.state, PlaybackState::Paused);
        assert!(snapshot.is_finished());
        assert!(!playback.is_running());

        sleep(INTERVAL * 4).await;
        assert_eq!(playback.snapshot().index, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_keeps_position() {
        let playback = Playback::new(INTERVAL);
        playback.load(moves(&["R", "U", "F", "D"]));
        playback.play();
        sleep(Duration::from_millis(800)).await;
        playback.pause();
        assert_eq!(playback.snapshot().index, 1);
        assert_eq!(playback.snapshot().state, PlaybackState::Paused);

        sleep(INTERVAL * 3).await;
        assert_eq!(playback.snapshot().index, 1);

        playback.toggle();
        assert_eq!(playback.snapshot().state, PlaybackState::Playing);
        sleep(Duration::from_millis(760)).await;
        assert_eq!(playback.snapshot().index, 2);
        playback.toggle();
        assert_eq!(playback.snapshot().state, PlaybackState::Paused);
    }

    #[tokio::test(start_paused = true)]
    async fn play_is_idempotent() {
        let playback = Playback::new(INTERVAL);
        playback.load(moves(&["R", "U", "F", "D", "L"]));
        playback.play();
        sleep(Duration::from_millis(400)).await;
        playback.play();
        sleep(Duration::from_millis(400)).await;
        // One timer: a second one would have restarted the period or doubled the steps.
        assert_eq!(playback.snapshot().index, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn load_rewinds_and_cancels() {
        let playback = Playback::new(INTERVAL);
        playback.load(moves(&["R", "U", "F"]));
        playback.play();
        sleep(Duration::from_millis(800)).await;

        playback.load(moves(&["B", "L"]));
        let snapshot = playback.snapshot();
        assert_eq!(snapshot.index, 0);
        assert_eq!(snapshot.state, PlaybackState::Idle);
        assert_eq!(snapshot.current(), Some("B"));

        sleep(INTERVAL * 3).await;
        assert_eq!(playback.snapshot().index, 0);
        assert!(!playback.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn empty_moves_never_play() {
        let playback = Playback::new(INTERVAL);
        playback.load(Vec::new());
        playback.play();
        let snapshot = playback.snapshot();
        assert_eq!(snapshot.state, PlaybackState::Idle);
        assert_eq!(snapshot.current(), None);
        assert!(!snapshot.is_finished());
        assert!(!playback.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn playing_from_last_move_stops_next_tick() {
        let playback = Playback::new(INTERVAL);
        playback.load(moves(&["R"]));
        playback.play();
        assert_eq!(playback.snapshot().state, PlaybackState::Playing);
        sleep(Duration::from_millis(760)).await;
        let snapshot = playback.snapshot();
        assert_eq!(snapshot.index, 0);
        assert_eq!(snapshot.state, PlaybackState::Paused);
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_follow_ticks() {
        let playback = Playback::new(INTERVAL);
        let mut rx = playback.subscribe();
        playback.load(moves(&["R", "U"]));
        playback.play();

        rx.changed().await.unwrap();
        let mut seen = vec![rx.borrow_and_update().clone()];
        while seen.last().map(|s| s.state) != Some(PlaybackState::Paused) {
            rx.changed().await.unwrap();
            seen.push(rx.borrow_and_update().clone());
        }
        assert_eq!(seen.last().unwrap().index, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_closes_channel() {
        let playback = Playback::new(INTERVAL);
        let mut rx = playback.subscribe();
        playback.load(moves(&["R", "U"]));
        playback.play();
        drop(playback);
        rx.borrow_and_update();
        assert!(rx.changed().await.is_err());
    }
}
