//! The reversible operation contract.

use cartokit_core::HistoryError;

/// A reversible edit.
///
/// Tasks are built holding both their before and after state and are applied
/// by the caller right away. The history then calls [`undo`](Task::undo) and
/// [`apply`](Task::apply) alternately, any number of times.
pub trait Task {
    /// Makes the after-state live.
    fn apply(&mut self);

    /// Makes the before-state live.
    fn undo(&mut self);

    /// Short label for menus and logs.
    fn description(&self) -> &str;
}

impl<T: Task + ?Sized> Task for Box<T> {
    fn apply(&mut self) {
        (**self).apply();
    }

    fn undo(&mut self) {
        (**self).undo();
    }

    fn description(&self) -> &str {
        (**self).description()
    }
}

/// Several tasks recorded as one history entry.
///
/// Applied in order, undone in reverse order.
pub struct BatchTask {
    description: String,
    tasks: Vec<Box<dyn Task>>,
}

impl BatchTask {
    pub fn new(
        description: impl Into<String>,
        tasks: Vec<Box<dyn Task>>,
    ) -> Result<Self, HistoryError> {
        let description = description.into();
        if tasks.is_empty() {
            return Err(HistoryError::EmptyOperation {
                operation: description,
            });
        }
        Ok(Self { description, tasks })
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl Task for BatchTask {
    fn apply(&mut self) {
        for task in self.tasks.iter_mut() {
            task.apply();
        }
    }

    fn undo(&mut self) {
        for task in self.tasks.iter_mut().rev() {
            task.undo();
        }
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Push {
        log: Rc<RefCell<Vec<String>>>,
        name: &'static str,
    }

    impl Task for Push {
        fn apply(&mut self) {
            self.log.borrow_mut().push(format!("apply {}", self.name));
        }

        fn undo(&mut self) {
            self.log.borrow_mut().push(format!("undo {}", self.name));
        }

        fn description(&self) -> &str {
            self.name
        }
    }

    #[test]
    fn test_batch_undoes_in_reverse() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut batch = BatchTask::new(
            "both",
            vec![
                Box::new(Push { log: log.clone(), name: "a" }),
                Box::new(Push { log: log.clone(), name: "b" }),
            ],
        )
        .unwrap();

        batch.apply();
        batch.undo();
        assert_eq!(
            *log.borrow(),
            vec!["apply a", "apply b", "undo b", "undo a"]
        );
        assert_eq!(batch.description(), "both");
    }

    #[test]
    fn test_empty_batch_rejected() {
        assert!(matches!(
            BatchTask::new("nothing", Vec::new()),
            Err(HistoryError::EmptyOperation { .. })
        ));
    }
}
