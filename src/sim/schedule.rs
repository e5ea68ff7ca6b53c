//! Deferred one-shot tasks keyed to match time
//!
//! Tasks are plain data; the match state interprets them when they come
//! due. Nothing here can be cancelled, so every task re-checks its own
//! preconditions when it runs.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use super::player::PlayerId;

/// Work to run at a later tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduledTask {
    /// Let go of a shot after the jump wind-up
    ReleaseShot { shooter: PlayerId },
    /// End an on-fire streak; ignored if the player re-ignited since
    ExtinguishFire { player: PlayerId, generation: u32 },
    /// After an AI shot settles, hand a loose ball to the other side
    AiShotFollowUp { shooter: PlayerId },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Entry {
    fire_at_ms: u64,
    seq: u64,
    task: ScheduledTask,
}

// BinaryHeap is a max-heap: earliest (time, seq) must compare greatest
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .fire_at_ms
            .cmp(&self.fire_at_ms)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-queue of scheduled tasks. Equal fire times run in scheduling order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scheduler {
    queue: BinaryHeap<Entry>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `task` to run `delay_ms` after `now_ms`
    pub fn schedule(&mut self, now_ms: u64, delay_ms: u64, task: ScheduledTask) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Entry {
            fire_at_ms: now_ms.saturating_add(delay_ms),
            seq,
            task,
        });
    }

    /// Pop the next task whose time has come
    pub fn pop_due(&mut self, now_ms: u64) -> Option<ScheduledTask> {
        if self.queue.peek()?.fire_at_ms > now_ms {
            return None;
        }
        self.queue.pop().map(|entry| entry.task)
    }

    /// When the earliest pending task fires
    pub fn next_due(&self) -> Option<u64> {
        self.queue.peek().map(|entry| entry.fire_at_ms)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release(id: usize) -> ScheduledTask {
        ScheduledTask::ReleaseShot {
            shooter: PlayerId(id),
        }
    }

    #[test]
    fn test_runs_in_time_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(0, 1500, release(2));
        scheduler.schedule(0, 350, release(1));
        assert_eq!(scheduler.next_due(), Some(350));

        assert_eq!(scheduler.pop_due(349), None);
        assert_eq!(scheduler.pop_due(350), Some(release(1)));
        assert_eq!(scheduler.pop_due(1000), None);
        assert_eq!(scheduler.pop_due(2000), Some(release(2)));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_equal_times_are_fifo() {
        let mut scheduler = Scheduler::new();
        for id in 0..5 {
            scheduler.schedule(100, 0, release(id));
        }
        let order: Vec<_> = std::iter::from_fn(|| scheduler.pop_due(100)).collect();
        assert_eq!(order, (0..5).map(release).collect::<Vec<_>>());
    }

    #[test]
    fn test_survives_json_snapshot() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(10, 5, release(3));
        scheduler.schedule(
            10,
            1,
            ScheduledTask::ExtinguishFire {
                player: PlayerId(0),
                generation: 2,
            },
        );
        let json = serde_json::to_string(&scheduler).unwrap();
        let mut restored: Scheduler = serde_json::from_str(&json).unwrap();
        assert!(matches!(
            restored.pop_due(11),
            Some(ScheduledTask::ExtinguishFire { generation: 2, .. })
        ));
        assert_eq!(restored.pop_due(15), Some(release(3)));
        assert!(restored.is_empty());
    }
}
