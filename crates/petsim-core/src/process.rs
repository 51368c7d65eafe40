//! The periodic background processes: one Decay Process per live pet and
//! the single global Quest Process.
//!
//! Both follow the same shape. Wait one interval or until shutdown, check
//! the stop flag at the tick boundary, then run one tick against the
//! registry. A tick never runs partially: the stop flag is only consulted
//! between ticks, and each tick is one registry critical section.

use std::sync::Arc;
use std::time::Duration;

use petsim_types::{PetId, PetStat};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::registry::{DecayOutcome, Registry, RegistryError};
use crate::shutdown::ShutdownSignal;

/// Why a background process stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessExit {
    /// Shutdown was requested.
    Shutdown,
    /// The registry was closed under the process.
    RegistryClosed,
    /// The pet died of the given stat. Decay only.
    PetDied(PetId, PetStat),
    /// The pet was no longer registered. Decay only.
    PetGone(PetId),
}

/// A timer that fires every `period`, first one `period` from now.
fn periodic(period: Duration) -> tokio::time::Interval {
    let start = Instant::now().checked_add(period).unwrap_or_else(Instant::now);
    let mut ticker = tokio::time::interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

/// Wait for the next tick. Returns `false` if shutdown came first.
async fn next_tick(ticker: &mut tokio::time::Interval, shutdown: &ShutdownSignal) -> bool {
    tokio::select! {
        biased;
        () = shutdown.wait() => false,
        _ = ticker.tick() => !shutdown.is_requested(),
    }
}

/// Run a pet's Decay Process until it dies, the registry closes, or
/// shutdown is requested.
pub async fn run_decay(
    pet_id: PetId,
    registry: Arc<Registry>,
    shutdown: Arc<ShutdownSignal>,
    interval: Duration,
) -> ProcessExit {
    let mut ticker = periodic(interval);
    debug!(%pet_id, ?interval, "Decay process started");

    let exit = loop {
        if !next_tick(&mut ticker, &shutdown).await {
            break ProcessExit::Shutdown;
        }

        match registry.decay_pet(pet_id).await {
            Ok(DecayOutcome::Alive) => {}
            Ok(DecayOutcome::Died(stat)) => break ProcessExit::PetDied(pet_id, stat),
            Ok(DecayOutcome::Gone) => break ProcessExit::PetGone(pet_id),
            Err(RegistryError::Closed) => break ProcessExit::RegistryClosed,
            Err(err) => warn!(%pet_id, error = %err, "Decay tick failed"),
        }
    };

    debug!(%pet_id, ?exit, "Decay process stopped");
    exit
}

/// Run the Quest Process until the registry closes or shutdown is
/// requested.
pub async fn run_quests(
    registry: Arc<Registry>,
    shutdown: Arc<ShutdownSignal>,
    interval: Duration,
) -> ProcessExit {
    let mut ticker = periodic(interval);
    info!(?interval, "Quest process started");
    let mut ticks: u64 = 0;

    let exit = loop {
        if !next_tick(&mut ticker, &shutdown).await {
            break ProcessExit::Shutdown;
        }

        ticks = ticks.saturating_add(1);
        match registry.advance_quests().await {
            Ok(completions) if !completions.is_empty() => {
                debug!(tick = ticks, completed = completions.len(), "Quests completed");
            }
            Ok(_) => {}
            Err(RegistryError::Closed) => break ProcessExit::RegistryClosed,
            Err(err) => warn!(tick = ticks, error = %err, "Quest tick failed"),
        }
    };

    info!(ticks, ?exit, "Quest process stopped");
    exit
}
