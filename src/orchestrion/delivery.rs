//! Timed delivery on a dedicated thread.
//!
//! A [`DeliveryWorker`] owns one thread and the receiving end of an unbounded
//! channel. Producers push entries stamped with a fire time; the thread sleeps
//! until each entry is due and hands it to the callback. Shutting down drops
//! the sender, so the thread delivers everything still queued before exiting.

use std::io;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, warn};

/// An event and the moment it should be delivered. `None` means right away.
#[derive(Debug, Clone, PartialEq)]
pub struct Scheduled<T> {
    pub fire_at: Option<Instant>,
    pub event: T,
}

impl<T> Scheduled<T> {
    pub fn now(event: T) -> Self {
        Self {
            fire_at: None,
            event,
        }
    }

    pub fn at(fire_at: Instant, event: T) -> Self {
        Self {
            fire_at: Some(fire_at),
            event,
        }
    }
}

pub struct DeliveryWorker<T> {
    name: &'static str,
    tx: Option<Sender<Scheduled<T>>>,
    handle: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> DeliveryWorker<T> {
    pub fn spawn<F>(name: &'static str, deliver: F) -> io::Result<Self>
    where
        F: Fn(T) + Send + 'static,
    {
        let (tx, rx) = unbounded();
        let handle = thread::Builder::new()
            .name(format!("orchestrion-{name}"))
            .spawn(move || run(rx, deliver))?;

        debug!("{name} delivery thread started");
        Ok(Self {
            name,
            tx: Some(tx),
            handle: Some(handle),
        })
    }

    pub fn post(&self, entry: Scheduled<T>) {
        self.post_all([entry]);
    }

    /// Queue several entries, keeping their order.
    pub fn post_all(&self, entries: impl IntoIterator<Item = Scheduled<T>>) {
        let Some(tx) = &self.tx else {
            warn!("{} delivery thread is shut down, dropping events", self.name);
            return;
        };
        for entry in entries {
            if tx.send(entry).is_err() {
                warn!("{} delivery thread is gone, dropping events", self.name);
                return;
            }
        }
    }
}

impl<T> DeliveryWorker<T> {
    /// Deliver what is queued, then stop the thread. Idempotent.
    pub fn shutdown(&mut self) {
        drop(self.tx.take());
        let Some(handle) = self.handle.take() else {
            return;
        };
        if handle.join().is_err() {
            warn!("{} delivery thread panicked", self.name);
        }
        debug!("{} delivery thread stopped", self.name);
    }
}

impl<T> Drop for DeliveryWorker<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run<T, F: Fn(T)>(rx: Receiver<Scheduled<T>>, deliver: F) {
    while let Ok(entry) = rx.recv() {
        if let Some(fire_at) = entry.fire_at {
            let now = Instant::now();
            if fire_at > now {
                thread::sleep(fire_at - now);
            }
        }
        deliver(entry.event);
    }
}
