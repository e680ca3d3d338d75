use std::sync::Arc;

use burberry::{async_trait, ActionSubmitter, Strategy};
use dashmap::DashMap;
use eyre::Result;
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::info;

use crate::{
    router::Router,
    types::{Action, Event},
};

/// One async lock per user. Events of the same user run one at a time.
#[derive(Clone, Default)]
pub struct UserLocks(Arc<DashMap<u64, Arc<Mutex<()>>>>);

impl UserLocks {
    fn get(&self, user: u64) -> Arc<Mutex<()>> {
        self.0.entry(user).or_default().clone()
    }

    /// Drops locks nobody is holding or waiting on. Returns how many remain.
    pub fn prune(&self) -> usize {
        self.0.retain(|_, lock| Arc::strong_count(lock) > 1);
        self.0.len()
    }
}

pub struct BotStrategy {
    router: Arc<Router>,
    locks: UserLocks,
}

impl BotStrategy {
    pub fn new(router: Router, locks: UserLocks) -> Self {
        Self {
            router: Arc::new(router),
            locks,
        }
    }

    fn dispatch(&self, event: Event, submitter: Arc<dyn ActionSubmitter<Action>>) -> JoinHandle<()> {
        let lock = self.locks.get(event.user_id());
        let router = Arc::clone(&self.router);
        tokio::spawn(async move {
            let _turn = lock.lock().await;
            router.handle(event, submitter.as_ref()).await;
        })
    }
}

#[async_trait]
impl Strategy<Event, Action> for BotStrategy {
    fn name(&self) -> &str {
        "BotStrategy"
    }

    async fn sync_state(&mut self, _submitter: Arc<dyn ActionSubmitter<Action>>) -> Result<()> {
        info!("bot strategy ready");
        Ok(())
    }

    async fn process_event(&mut self, event: Event, submitter: Arc<dyn ActionSubmitter<Action>>) {
        // detached: a slow or panicking handler only affects its own user
        let _ = self.dispatch(event, submitter);
    }
}

#[cfg(test)]
mod tests {
    use hedgy_store::UserStore;

    use super::*;
    use crate::{
        testkit::{RecordingSubmitter, TestBed},
        types::{ChatUser, IncomingMessage},
    };

    fn start_from(user: u64) -> Event {
        Event::Message(IncomingMessage {
            chat_id: user as i64,
            message_id: 1,
            from: ChatUser { id: user, username: None },
            text: "/start".to_string(),
        })
    }

    #[tokio::test]
    async fn same_user_events_are_serialized() {
        let bed = TestBed::new();
        let strategy = BotStrategy::new(bed.router(), UserLocks::default());
        let out = Arc::new(RecordingSubmitter::default());

        let handles: Vec<_> = (0..8).map(|_| strategy.dispatch(start_from(7), out.clone())).collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let welcomes: Vec<_> = out
            .take()
            .into_iter()
            .filter_map(|a| match a {
                Action::Send(m) => Some(m.text),
                _ => None,
            })
            .collect();
        assert_eq!(welcomes.len(), 8);
        assert_eq!(welcomes.iter().filter(|t| t.contains("Welcome to HedgyBot")).count(), 1);
        assert_eq!(bed.store.user_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn idle_locks_are_pruned() {
        let locks = UserLocks::default();
        let held = locks.get(1);
        let _ = locks.get(2);
        assert_eq!(locks.prune(), 1);
        drop(held);
        assert_eq!(locks.prune(), 0);
    }
}
