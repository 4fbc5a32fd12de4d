//! point-run: two runners race to the end of a track over a loopback
//! session provider.
//!
//! Each runner drives its own coordinator. Once the session starts they
//! trade JSON position updates on a fixed tick; the first to reach the
//! finish announces it and closes the session.

mod loopback;
mod race;

use std::time::Duration;

use matchkit::prelude::*;
use matchkit::telemetry;
use rand::Rng;
use tokio::sync::mpsc;
use tokio::time::{self, Interval, MissedTickBehavior};

use crate::loopback::LoopbackHub;
use crate::race::{Race, RaceMessage, TRACK_LEN};

/// How one runner's race ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub me: PeerHandle,
    pub winner: Option<PeerHandle>,
    pub end: EndReason,
}

enum Wake {
    Session(Option<SessionEvent>),
    Tick,
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(t) => {
            t.tick().await;
        }
        None => std::future::pending().await,
    }
}

fn send(
    handle: &CoordinatorHandle,
    msg: &RaceMessage,
    channel: Channel,
) -> Result<(), MatchkitError> {
    match msg.encode() {
        Ok(bytes) => handle.send_data(Recipient::All, bytes, channel)?,
        Err(e) => tracing::warn!(error = %e, "could not encode message"),
    }
    Ok(())
}

/// Runs one runner until its session ends.
///
/// `stride` picks how far the runner moves each tick.
pub async fn run_player(
    handle: CoordinatorHandle,
    me: PeerHandle,
    name: String,
    mut stride: impl FnMut() -> u32,
    tick: Duration,
) -> Result<Outcome, MatchkitError> {
    let (observer, mut events) = mpsc::unbounded_channel();
    handle.find_match(2, 2, observer)?;

    let mut race = Race::new(TRACK_LEN);
    let mut position = 0;
    let mut ticker: Option<Interval> = None;

    loop {
        let wake = tokio::select! {
            event = events.recv() => Wake::Session(event),
            () = next_tick(&mut ticker) => Wake::Tick,
        };

        match wake {
            Wake::Session(None) => {
                return Err(CoordinatorError::Unavailable.into());
            }
            Wake::Session(Some(SessionEvent::Started(snapshot))) => {
                let rivals: Vec<String> = snapshot
                    .roster
                    .iter()
                    .flat_map(|r| r.iter())
                    .filter(|(h, _)| **h != me)
                    .map(|(_, id)| id.alias.clone())
                    .collect();
                tracing::info!(%me, ?rivals, "race started");

                let hello = RaceMessage::Hello { name: name.clone() };
                send(&handle, &hello, Channel::Reliable)?;
                let mut t = time::interval(tick);
                t.set_missed_tick_behavior(MissedTickBehavior::Delay);
                ticker = Some(t);
            }
            Wake::Session(Some(SessionEvent::Data { peer, bytes })) => {
                match RaceMessage::decode(&bytes) {
                    Ok(RaceMessage::Hello { name }) => {
                        tracing::info!(%peer, %name, "rival says hello");
                    }
                    Ok(RaceMessage::Advance { position }) => {
                        race.advance(peer, position);
                    }
                    Ok(RaceMessage::Finished { winner }) => {
                        tracing::info!(
                            %me,
                            %winner,
                            position = race.position(me),
                            "rival finished first"
                        );
                        race.finish(winner);
                        ticker = None;
                        handle.close()?;
                    }
                    Err(e) => {
                        tracing::warn!(%peer, error = %e, "undecodable message");
                    }
                }
            }
            Wake::Session(Some(SessionEvent::Ended(end))) => {
                return Ok(Outcome {
                    me,
                    winner: race.winner(),
                    end,
                });
            }
            Wake::Tick => {
                position += stride();
                let update = RaceMessage::Advance { position };
                send(&handle, &update, Channel::Unreliable)?;
                if race.advance(me, position) == Some(me) {
                    tracing::info!(%me, position, "crossed the finish line");
                    let done = RaceMessage::Finished { winner: me };
                    send(&handle, &done, Channel::Reliable)?;
                    ticker = None;
                    handle.close()?;
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init();

    let hub = LoopbackHub::new();
    let runners = [(PeerHandle(1), "alice"), (PeerHandle(2), "bob")];

    let mut tasks = Vec::new();
    for (peer, name) in runners {
        let handle = CoordinatorBuilder::new()
            .search_timeout(Duration::from_secs(10))
            .assembly_timeout(Duration::from_secs(5))
            .spawn_with(|events| hub.join(peer, name, events));
        handle.authenticate()?;

        tasks.push(tokio::spawn(run_player(
            handle,
            peer,
            name.to_string(),
            || rand::rng().random_range(1..=3),
            Duration::from_millis(100),
        )));
    }

    for task in tasks {
        let outcome = task.await??;
        match outcome.winner {
            Some(winner) if winner == outcome.me => {
                tracing::info!(me = %outcome.me, end = %outcome.end, "won the race");
            }
            Some(winner) => {
                tracing::info!(
                    me = %outcome.me,
                    %winner,
                    end = %outcome.end,
                    "lost the race"
                );
            }
            None => {
                tracing::info!(me = %outcome.me, end = %outcome.end, "race abandoned");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner(hub: &LoopbackHub, peer: u64, name: &str) -> CoordinatorHandle {
        let peer = PeerHandle(peer);
        CoordinatorBuilder::new()
            .spawn_with(|events| hub.join(peer, name, events))
    }

    #[tokio::test(start_paused = true)]
    async fn test_faster_runner_wins_and_both_sessions_close() {
        let hub = LoopbackHub::new();
        let fast = runner(&hub, 1, "hare");
        let slow = runner(&hub, 2, "tortoise");
        let tick = Duration::from_millis(50);

        let fast_task = tokio::spawn(run_player(
            fast,
            PeerHandle(1),
            "hare".into(),
            || 4,
            tick,
        ));
        let slow_task = tokio::spawn(run_player(
            slow,
            PeerHandle(2),
            "tortoise".into(),
            || 1,
            tick,
        ));

        let fast = fast_task.await.unwrap().unwrap();
        let slow = slow_task.await.unwrap().unwrap();

        assert_eq!(fast.winner, Some(PeerHandle(1)));
        assert_eq!(slow.winner, Some(PeerHandle(1)));
        assert_eq!(fast.end, EndReason::Closed);
        assert_eq!(slow.end, EndReason::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lone_runner_times_out() {
        let hub = LoopbackHub::new();
        let handle = CoordinatorBuilder::new()
            .search_timeout(Duration::from_secs(3))
            .spawn_with(|events| hub.join(PeerHandle(1), "solo", events));

        let tick = Duration::from_millis(50);
        let outcome =
            run_player(handle, PeerHandle(1), "solo".into(), || 1, tick)
                .await
                .unwrap();

        assert_eq!(outcome.end, EndReason::TimedOut);
        assert_eq!(outcome.winner, None);
    }
}
