//! Internal job state machine.
//!
//! `Idle -> Fetching -> Succeeded | Failed`, plus `-> Succeeded` through local
//! data injection. Each fetch carries a generation number; results and
//! progress tagged with a stale generation are dropped. Each terminal
//! transition bumps the revision, so a fan-out overtaken by a newer terminal
//! state stops delivering.

use std::time::Instant;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use filesvc_core::{FileError, JobStatus};
use tokio_util::sync::CancellationToken;

use super::subscription::{Delivery, Listener, Subscriber};
use crate::progress::ProgressThrottle;

/// Bookkeeping for the one fetch a job may have in flight.
#[derive(Debug)]
pub(crate) struct ActiveFetch {
    pub(crate) generation: u64,
    pub(crate) progress: Option<f32>,
    pub(crate) cancel: CancellationToken,
    throttle: ProgressThrottle,
}

#[derive(Debug)]
pub(crate) enum JobState {
    Idle,
    Fetching(ActiveFetch),
    Succeeded(Bytes),
    Failed(FileError),
}

impl JobState {
    pub(crate) fn status(&self) -> JobStatus {
        match self {
            Self::Idle => JobStatus::Idle,
            Self::Fetching(active) => JobStatus::Fetching {
                progress: active.progress,
            },
            Self::Succeeded(data) => JobStatus::Succeeded { bytes: data.len() },
            Self::Failed(error) => JobStatus::Failed {
                error: error.clone(),
            },
        }
    }

    /// What a newly attached subscriber should be told, in priority order.
    pub(crate) fn replay(&self) -> Replay {
        match self {
            Self::Succeeded(data) => Replay::Success(data.clone()),
            Self::Failed(error) => Replay::Error(error.clone()),
            Self::Fetching(ActiveFetch {
                progress: Some(fraction),
                ..
            }) => Replay::Progress(*fraction),
            Self::Fetching(_) | Self::Idle => Replay::Nothing,
        }
    }

    pub(crate) const fn generation(&self) -> Option<u64> {
        match self {
            Self::Fetching(active) => Some(active.generation),
            _ => None,
        }
    }
}

/// State replayed synchronously to a new subscriber.
#[derive(Debug)]
pub(crate) enum Replay {
    Success(Bytes),
    Error(FileError),
    Progress(f32),
    Nothing,
}

impl Replay {
    pub(crate) fn deliver(&self, listener: &Listener) {
        match self {
            Self::Success(data) => listener.success(data),
            Self::Error(error) => listener.error(error),
            Self::Progress(fraction) => listener.progress(*fraction),
            Self::Nothing => {}
        }
    }
}

/// Everything behind a job's state lock.
pub(crate) struct JobInner {
    pub(crate) state: JobState,
    pub(crate) subscribers: Vec<Subscriber>,
    pub(crate) last_subscribed_at: Option<DateTime<Utc>>,
    next_generation: u64,
    revision: u64,
}

impl JobInner {
    pub(crate) const fn new() -> Self {
        Self {
            state: JobState::Idle,
            subscribers: Vec::new(),
            last_subscribed_at: None,
            next_generation: 1,
            revision: 0,
        }
    }

    /// Enter a terminal state, returning the new revision.
    pub(crate) fn settle(&mut self, state: JobState) -> (JobState, u64) {
        self.revision += 1;
        (std::mem::replace(&mut self.state, state), self.revision)
    }

    pub(crate) const fn revision(&self) -> u64 {
        self.revision
    }

    /// Move `Idle -> Fetching`, returning the new fetch's generation and token.
    ///
    /// Returns `None` when the job is not idle; this check-and-set is the only
    /// place a fetch can be started.
    pub(crate) fn begin_fetch(
        &mut self,
        throttle: ProgressThrottle,
    ) -> Option<(u64, CancellationToken)> {
        if !matches!(self.state, JobState::Idle) {
            return None;
        }
        let generation = self.next_generation;
        self.next_generation += 1;
        let cancel = CancellationToken::new();
        self.state = JobState::Fetching(ActiveFetch {
            generation,
            progress: None,
            cancel: cancel.clone(),
            throttle,
        });
        Some((generation, cancel))
    }

    /// Record a progress report; returns whether it should be fanned out.
    pub(crate) fn record_progress(&mut self, generation: u64, fraction: f32) -> bool {
        match &mut self.state {
            JobState::Fetching(active) if active.generation == generation => {
                active.progress = Some(fraction);
                active.throttle.admit(fraction, Instant::now())
            }
            _ => false,
        }
    }

    pub(crate) fn deliveries(&self) -> Vec<Delivery> {
        self.subscribers.iter().map(|s| s.delivery.clone()).collect()
    }

    pub(crate) fn progress_deliveries(&self) -> Vec<Delivery> {
        self.subscribers
            .iter()
            .filter(|s| s.delivery.listener().wants_progress())
            .map(|s| s.delivery.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_fetch_only_from_idle() {
        let mut inner = JobInner::new();
        let (first, _) = inner.begin_fetch(ProgressThrottle::disabled()).unwrap();
        assert_eq!(inner.state.generation(), Some(first));
        assert!(inner.begin_fetch(ProgressThrottle::disabled()).is_none());

        inner.state = JobState::Idle;
        let (second, _) = inner.begin_fetch(ProgressThrottle::disabled()).unwrap();
        assert!(second > first);
    }

    #[test]
    fn test_replay_priority() {
        assert!(matches!(
            JobState::Succeeded(Bytes::from_static(b"D")).replay(),
            Replay::Success(_)
        ));
        assert!(matches!(
            JobState::Failed(FileError::EmptyResponse).replay(),
            Replay::Error(FileError::EmptyResponse)
        ));
        assert!(matches!(JobState::Idle.replay(), Replay::Nothing));

        let mut inner = JobInner::new();
        let (generation, _) = inner.begin_fetch(ProgressThrottle::disabled()).unwrap();
        assert!(matches!(inner.state.replay(), Replay::Nothing));
        assert!(inner.record_progress(generation, 0.3));
        assert!(matches!(inner.state.replay(), Replay::Progress(f) if (f - 0.3).abs() < f32::EPSILON));
    }

    #[test]
    fn test_stale_progress_is_ignored() {
        let mut inner = JobInner::new();
        let (generation, _) = inner.begin_fetch(ProgressThrottle::disabled()).unwrap();
        assert!(!inner.record_progress(generation + 1, 0.5));
        assert_eq!(inner.state.status(), JobStatus::Fetching { progress: None });
    }

    #[test]
    fn test_settle_bumps_revision() {
        let mut inner = JobInner::new();
        inner.begin_fetch(ProgressThrottle::disabled()).unwrap();
        let (previous, first) = inner.settle(JobState::Failed(FileError::EmptyResponse));
        assert!(matches!(previous, JobState::Fetching(_)));
        let (_, second) = inner.settle(JobState::Succeeded(Bytes::from_static(b"D")));
        assert_eq!(second, first + 1);
        assert_eq!(inner.revision(), second);
        assert_eq!(inner.state.generation(), None);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            JobState::Succeeded(Bytes::from_static(b"abc")).status(),
            JobStatus::Succeeded { bytes: 3 }
        );
        assert_eq!(JobState::Idle.status(), JobStatus::Idle);
    }
}
