//! Text transforms applied to a store file right before it is written.

use std::fmt;

/// A transform receiving the full file text and returning the new full text.
pub type WriteCallback = Box<dyn Fn(String) -> String>;

/// Ordered list of [`WriteCallback`]s.
///
/// Callbacks run in registration order, so the first one registered ends up
/// innermost and the most recently registered one wraps everything else.
#[derive(Default)]
pub struct WriteCallbackChain {
    callbacks: Vec<WriteCallback>,
}

impl WriteCallbackChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, callback: F)
    where
        F: Fn(String) -> String + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    pub fn clear(&mut self) {
        self.callbacks.clear();
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Run `text` through every callback.
    pub fn apply(&self, text: String) -> String {
        self.callbacks
            .iter()
            .fold(text, |text, callback| callback(text))
    }
}

impl fmt::Debug for WriteCallbackChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteCallbackChain")
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}
