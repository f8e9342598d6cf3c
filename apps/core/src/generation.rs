use std::cell::Cell;
use std::rc::Rc;

/// Shared counter identifying the current user selection. Every selection
/// change advances it; work tagged with an older value is stale.
#[derive(Debug, Clone, Default)]
pub struct Generations {
    counter: Rc<Cell<u64>>,
}

impl Generations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u64 {
        self.counter.get()
    }

    /// Starts a new selection and returns its token.
    pub fn advance(&self) -> SelectionToken {
        let next = self.counter.get() + 1;
        self.counter.set(next);
        self.token()
    }

    /// Token for the selection that is current right now.
    pub fn token(&self) -> SelectionToken {
        SelectionToken {
            generation: self.counter.get(),
            counter: Rc::clone(&self.counter),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SelectionToken {
    generation: u64,
    counter: Rc<Cell<u64>>,
}

impl SelectionToken {
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self) -> bool {
        self.counter.get() == self.generation
    }

    pub fn is_stale(&self) -> bool {
        !self.is_current()
    }
}
