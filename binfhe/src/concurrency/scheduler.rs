/// A unit of work; receives the index of the worker running it.
pub type Task = Box<dyn FnOnce(usize) + Send + 'static>;

/// The task scheduler service. Tasks run in no particular order.
pub trait Scheduler: Send + Sync {
    fn submit(&self, task: Task);

    /// Blocks until every submitted task, including tasks submitted by
    /// running tasks, has finished.
    fn drain(&self);

    fn workers(&self) -> usize;
}
