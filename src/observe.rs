//! Subscribable current value shared between adapters and views.

use tokio::sync::watch;

/// A value that views can read or subscribe to, and only its owner mutates.
#[derive(Debug)]
pub struct Observable<T> {
    tx: watch::Sender<T>,
}

impl<T: Clone> Observable<T> {
    /// Create an observable holding `initial`.
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Snapshot of the current value.
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Receiver notified on every change.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }

    /// Replace the value and notify subscribers. Returns the previous value.
    pub fn set(&self, value: T) -> T {
        self.tx.send_replace(value)
    }

    /// Mutate in place; subscribers are notified only when `f` returns true.
    pub fn update_if(&self, f: impl FnOnce(&mut T) -> bool) -> bool {
        self.tx.send_if_modified(f)
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl<T: Clone + Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_see_updates() {
        let value = Observable::new(1u32);
        let mut rx = value.subscribe();
        assert_eq!(value.subscriber_count(), 1);

        assert_eq!(value.set(2), 1);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 2);

        assert!(!value.update_if(|v| *v > 5));
        assert!(!rx.has_changed().unwrap());

        assert!(value.update_if(|v| {
            *v += 5;
            true
        }));
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), 7);
        assert_eq!(value.get(), 7);
    }

    #[test]
    fn dropping_receiver_unsubscribes() {
        let value: Observable<Option<String>> = Observable::default();
        let rx = value.subscribe();
        drop(rx);
        assert_eq!(value.subscriber_count(), 0);
        value.set(Some("still works".into()));
        assert_eq!(value.get().as_deref(), Some("still works"));
    }
}
