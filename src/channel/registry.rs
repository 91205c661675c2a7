//! Action registry: command identifier -> handler.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::command::CommandId;

/// Callback invoked with a message payload.
///
/// Handlers run on the listener's worker thread and should be short and
/// idempotent: one logical write can be delivered more than once.
pub type Handler = Arc<dyn Fn(&str) -> anyhow::Result<()> + Send + Sync>;

/// Command → handler map. Last registration for a name wins.
#[derive(Default)]
pub struct ActionRegistry {
    actions: RwLock<FxHashMap<CommandId, Handler>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store (or replace) the handler for `id`.
    ///
    /// Returns `true` if an earlier handler was replaced.
    pub fn register(&self, id: CommandId, handler: Handler) -> bool {
        self.actions.write().insert(id, handler).is_some()
    }

    /// Handler for `id`, cloned out so the lock is not held while it runs.
    pub fn get(&self, id: &CommandId) -> Option<Handler> {
        self.actions.read().get(id).cloned()
    }

    pub fn contains(&self, id: &CommandId) -> bool {
        self.actions.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.actions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.read().is_empty()
    }

    /// Registered command names, sorted.
    pub fn commands(&self) -> Vec<CommandId> {
        let mut names: Vec<_> = self.actions.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("commands", &self.commands())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(counter: &Arc<AtomicUsize>) -> Handler {
        let counter = Arc::clone(counter);
        Arc::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    #[test]
    fn test_register_and_get() {
        let registry = ActionRegistry::new();
        let hits = Arc::new(AtomicUsize::new(0));
        assert!(!registry.register(CommandId::new("set_search"), counting(&hits)));

        let handler = registry.get(&CommandId::new("SET_SEARCH")).unwrap();
        handler("x").unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(registry.get(&CommandId::new("SET_REPLACE")).is_none());
    }

    #[test]
    fn test_last_registration_wins() {
        let registry = ActionRegistry::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        registry.register(CommandId::new("GOTO"), counting(&first));
        assert!(registry.register(CommandId::new("goto"), counting(&second)));
        assert_eq!(registry.len(), 1);

        registry.get(&CommandId::new("Goto")).unwrap()("").unwrap();
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_commands_sorted() {
        let registry = ActionRegistry::new();
        let hits = Arc::new(AtomicUsize::new(0));
        registry.register(CommandId::new("VS_PROJECT"), counting(&hits));
        registry.register(CommandId::new("SET_SEARCH"), counting(&hits));

        let names: Vec<_> = registry
            .commands()
            .iter()
            .map(|c| c.as_str().to_string())
            .collect();
        assert_eq!(names, ["SET_SEARCH", "VS_PROJECT"]);
        assert!(registry.contains(&CommandId::new("vs_project")));
        assert!(!registry.is_empty());
    }
}
