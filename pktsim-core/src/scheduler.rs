//! The discrete event engine.
//!
//! [`EventScheduler`] keeps the timeline of future events and the single
//! clock of a simulation run. Events are popped in time order; events due
//! at the same time are popped in the order they were scheduled. The
//! event payload is never compared, it can be any type.

use crate::{
    error::{ArgumentError, StateError},
    time::SimTime,
};
use core::cmp::Reverse;
use std::{
    cmp::Ordering,
    collections::{BinaryHeap, HashSet},
    fmt,
    time::Duration,
};

/// Identity of a scheduled event, used to [cancel] it.
///
/// [cancel]: EventScheduler::cancel
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// no run in progress
    Idle,
    /// events are being drained
    Running,
}

pub struct EventScheduler<E> {
    now: SimTime,
    queue: BinaryHeap<Reverse<Scheduled<E>>>,
    /// events scheduled and neither processed nor cancelled
    pending: HashSet<EventId>,
    next_sequence: u64,
    state: SchedulerState,
}

struct Scheduled<E> {
    time: SimTime,
    /// insertion sequence, doubles as the [`EventId`]
    sequence: u64,
    event: E,
}

impl<E> PartialEq for Scheduled<E> {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.sequence == other.sequence
    }
}

impl<E> Eq for Scheduled<E> {}

impl<E> PartialOrd for Scheduled<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for Scheduled<E> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .cmp(&other.time)
            .then(self.sequence.cmp(&other.sequence))
    }
}

impl<E> EventScheduler<E> {
    pub fn new() -> Self {
        Self {
            now: SimTime::ZERO,
            queue: BinaryHeap::new(),
            pending: HashSet::new(),
            next_sequence: 0,
            state: SchedulerState::Idle,
        }
    }

    /// the current time of the simulation clock
    #[inline]
    pub fn now(&self) -> SimTime {
        self.now
    }

    #[inline]
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state == SchedulerState::Running
    }

    /// number of events still to process
    #[inline]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// time at which the next pending event is due
    #[inline]
    pub fn next_time(&self) -> Option<SimTime> {
        self.queue.peek().map(|Reverse(scheduled)| scheduled.time)
    }

    /// Schedule `event` to happen `delay` after the current time.
    pub fn schedule(&mut self, delay: Duration, event: E) -> EventId {
        self.insert(self.now + delay, event)
    }

    /// Schedule `event` to happen at `time`.
    ///
    /// # Errors
    ///
    /// [`ArgumentError::InThePast`] if `time` is before the current time.
    pub fn schedule_at(&mut self, time: SimTime, event: E) -> Result<EventId, ArgumentError> {
        if time < self.now {
            return Err(ArgumentError::InThePast {
                at: time,
                now: self.now,
            });
        }
        Ok(self.insert(time, event))
    }

    fn insert(&mut self, time: SimTime, event: E) -> EventId {
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let id = EventId(sequence);
        self.pending.insert(id);
        self.queue.push(Reverse(Scheduled {
            time,
            sequence,
            event,
        }));

        log::trace!("scheduled event {id} at {time}");
        id
    }

    /// Cancel a pending event.
    ///
    /// Returns `false` if the event was already processed, already
    /// cancelled or never existed.
    pub fn cancel(&mut self, id: EventId) -> bool {
        let cancelled = self.pending.remove(&id);
        if cancelled {
            log::trace!("cancelled event {id}");
            self.discard_cancelled();
        }
        cancelled
    }

    /// drop cancelled events from the head of the queue so that
    /// [`next_time`](Self::next_time) always reports a live event
    fn discard_cancelled(&mut self) {
        while let Some(Reverse(head)) = self.queue.peek() {
            if self.pending.contains(&EventId(head.sequence)) {
                break;
            }
            self.queue.pop();
        }
    }

    /// Idle → Running
    ///
    /// # Errors
    ///
    /// [`StateError::AlreadyRunning`] if a run is already in progress.
    pub fn start(&mut self) -> Result<(), StateError> {
        match self.state {
            SchedulerState::Running => Err(StateError::AlreadyRunning),
            SchedulerState::Idle => {
                self.state = SchedulerState::Running;
                Ok(())
            }
        }
    }

    /// Running → Idle
    pub fn stop(&mut self) {
        self.state = SchedulerState::Idle;
    }

    /// Pop the next event due at or before `stop` (any event if `stop` is
    /// `None`) and move the clock to its time.
    ///
    /// The clock does not move when there is no such event.
    pub fn pop_until(&mut self, stop: Option<SimTime>) -> Option<(SimTime, EventId, E)> {
        let time = self.next_time()?;
        if stop.is_some_and(|stop| time > stop) {
            return None;
        }

        let Reverse(Scheduled {
            time,
            sequence,
            event,
        }) = self.queue.pop()?;
        let id = EventId(sequence);

        debug_assert!(time >= self.now, "event {id} is scheduled in the past");
        self.pending.remove(&id);
        self.now = time;
        self.discard_cancelled();

        Some((time, id, event))
    }

    /// Process every event due at or before `stop` (until the queue is
    /// empty if `stop` is `None`).
    ///
    /// The `handler` receives the scheduler so it can schedule new
    /// events. Returns the number of processed events.
    ///
    /// ```
    /// # use pktsim_core::scheduler::EventScheduler;
    /// # use std::time::Duration;
    /// let mut scheduler = EventScheduler::new();
    /// scheduler.schedule(Duration::ZERO, "X");
    /// scheduler.schedule(Duration::ZERO, "Y");
    ///
    /// let mut order = Vec::new();
    /// scheduler
    ///     .run_until(None, |_, _, event| order.push(event))
    ///     .unwrap();
    /// assert_eq!(order, ["X", "Y"]);
    /// ```
    ///
    /// # Errors
    ///
    /// [`StateError::AlreadyRunning`] if called while a run is in progress,
    /// for example from inside a handler.
    pub fn run_until<F>(
        &mut self,
        stop: Option<SimTime>,
        mut handler: F,
    ) -> Result<u64, StateError>
    where
        F: FnMut(&mut Self, SimTime, E),
    {
        self.start()?;

        let mut processed = 0;
        while let Some((time, _, event)) = self.pop_until(stop) {
            handler(self, time, event);
            processed += 1;
        }

        self.stop();
        Ok(processed)
    }
}

impl<E> Default for EventScheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventScheduler<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventScheduler")
            .field("now", &self.now)
            .field("pending", &self.pending.len())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
