use crate::error::DocsError;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Executes tasks in parallel with a specified concurrency limit
///
/// Each task runs in its own tokio task, so a panic in one of them is
/// reported as an error in that task's slot while the others complete.
pub struct ParallelProcessor {
    semaphore: Arc<Semaphore>,
}

impl ParallelProcessor {
    /// Creates a new parallel processor; a limit of zero is treated as one
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Runs `tasks` and returns their results in input order
    pub async fn process<F, T>(&self, tasks: Vec<F>) -> Vec<Result<T, DocsError>>
    where
        F: Future<Output = Result<T, DocsError>> + Send + 'static,
        T: Send + 'static,
    {
        let mut handles = Vec::with_capacity(tasks.len());

        for task in tasks {
            let semaphore = Arc::clone(&self.semaphore);
            handles.push(tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| DocsError::Processing(format!("worker pool closed: {}", e)))?;
                task.await
            }));
        }

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            results.push(match handle.await {
                Ok(result) => result,
                Err(e) => Err(DocsError::Processing(format!("task failed: {}", e))),
            });
        }
        results
    }
}
