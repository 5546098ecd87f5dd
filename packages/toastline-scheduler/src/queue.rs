use std::cell::RefCell;
use std::collections::VecDeque;

/// A FIFO queue of deferred closures.
///
/// Used to run user callbacks after internal state borrows have been
/// released. Single-threaded, hence `RefCell<VecDeque>`.
#[derive(Default)]
pub struct TaskQueue {
    queue: RefCell<VecDeque<Box<dyn FnOnce()>>>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self {
            queue: RefCell::new(VecDeque::new()),
        }
    }

    pub fn push(&self, task: Box<dyn FnOnce()>) {
        self.queue.borrow_mut().push_back(task);
    }

    pub fn pop(&self) -> Option<Box<dyn FnOnce()>> {
        self.queue.borrow_mut().pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    /// Runs tasks until the queue is empty, including tasks pushed while draining.
    pub fn drain(&self) {
        while let Some(task) = self.pop() {
            task();
        }
    }
}
