//! Fixed pool of phase-synchronized workers.
//!
//! The driver publishes one task per worker per phase and then arrives at
//! the shared barrier; each worker runs its task and arrives as well, so
//! a phase ends when all `N + 1` parties meet. Between phases workers
//! park on a per-slot readiness flag. The pool is driven by exactly one
//! thread; a poison command shuts the workers down.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Barrier;
use std::thread::{self, Scope, Thread};

use parking_lot::Mutex;

type Task<'env> = Box<dyn FnOnce() + Send + 'env>;

enum Command<'env> {
    Run(Task<'env>),
    Stop,
}

struct Slot<'env> {
    command: Mutex<Option<Command<'env>>>,
    ready: AtomicBool,
    handle: Mutex<Option<Thread>>,
}

pub struct WorkerPool<'env> {
    slots: Vec<Slot<'env>>,
    barrier: Barrier,
}

impl<'env> WorkerPool<'env> {
    pub fn new(num_workers: usize) -> Self {
        assert!(num_workers >= 1, "worker pool needs at least one worker");
        let slots = (0..num_workers)
            .map(|_| Slot {
                command: Mutex::new(None),
                ready: AtomicBool::new(false),
                handle: Mutex::new(None),
            })
            .collect();
        WorkerPool {
            slots,
            barrier: Barrier::new(num_workers + 1),
        }
    }

    pub fn num_workers(&self) -> usize {
        self.slots.len()
    }

    /// Spawns the workers into `scope`. Call once, before any `push`.
    pub fn spawn_workers<'scope>(&'scope self, scope: &'scope Scope<'scope, 'env>) {
        for tid in 0..self.slots.len() {
            let pool = self;
            let handle = scope.spawn(move || pool.worker_loop(tid));
            *self.slots[tid].handle.lock() = Some(handle.thread().clone());
        }
    }

    fn worker_loop(&self, tid: usize) {
        let slot = &self.slots[tid];
        loop {
            while !slot.ready.swap(false, Ordering::Acquire) {
                thread::park();
            }
            let command = slot.command.lock().take();
            match command {
                Some(Command::Run(task)) => {
                    task();
                    self.barrier.wait();
                }
                Some(Command::Stop) | None => return,
            }
        }
    }

    fn publish(&self, tid: usize, command: Command<'env>) {
        let slot = &self.slots[tid];
        *slot.command.lock() = Some(command);
        slot.ready.store(true, Ordering::Release);
        if let Some(thread) = slot.handle.lock().as_ref() {
            thread.unpark();
        }
    }

    /// Hands worker `tid` its task for the current phase.
    pub fn push<F>(&self, tid: usize, task: F)
    where
        F: FnOnce() + Send + 'env,
    {
        self.publish(tid, Command::Run(Box::new(task)));
    }

    /// Driver-side barrier arrival; returns once every worker has
    /// finished the task it was pushed this phase.
    pub fn wait(&self) {
        self.barrier.wait();
    }

    /// Sends the poison command to every worker. The workers exit without
    /// touching the barrier, so call this only between phases.
    pub fn stop(&self) {
        for tid in 0..self.slots.len() {
            self.publish(tid, Command::Stop);
        }
    }
}
