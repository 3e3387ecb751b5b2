//! Synchronous subscriber lists.

use std::fmt;

type Handler<T> = Box<dyn FnMut(&T) + Send>;

/// Ordered list of subscribers invoked synchronously in registration order.
pub struct Handlers<T> {
    handlers: Vec<Handler<T>>,
}

impl<T> Handlers<T> {
    /// Creates an empty handler list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Appends a handler to the end of the list.
    pub fn subscribe<F>(&mut self, handler: F)
    where
        F: FnMut(&T) + Send + 'static,
    {
        self.handlers.push(Box::new(handler));
    }

    /// Invokes every handler with `value`, first subscriber first.
    pub fn emit(&mut self, value: &T) {
        for handler in &mut self.handlers {
            handler(value);
        }
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handler is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<T> Default for Handlers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Handlers<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handlers")
            .field("len", &self.handlers.len())
            .finish()
    }
}
