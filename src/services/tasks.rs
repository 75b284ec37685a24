use gpui::{Context, Task};
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

/// One pending UI-thread callback per key. Scheduling again for the same key
/// drops, and thereby cancels, the previous task.
pub struct DelayedTasks<K, E: 'static> {
    tasks: HashMap<K, Task<()>>,
    _entity: std::marker::PhantomData<E>,
}

impl<K: Copy + Eq + Hash + 'static, E: 'static> DelayedTasks<K, E> {
    pub fn new() -> Self {
        Self {
            tasks: HashMap::new(),
            _entity: std::marker::PhantomData,
        }
    }

    pub fn schedule<F>(&mut self, key: K, delay: Duration, cx: &mut Context<E>, job: F)
    where
        F: 'static + FnOnce(&mut E, &mut Context<E>),
    {
        let task = cx.spawn(async move |entity, cx| {
            cx.background_executor().timer(delay).await;
            let _ = entity.update(cx, |view, cx| job(view, cx));
        });
        self.tasks.insert(key, task);
    }

    pub fn cancel_all(&mut self) {
        self.tasks.clear();
    }
}
