use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;

use crate::foundation::error::{TipmaskError, TipmaskResult};
use crate::session::preview::PreviewEngine;
use crate::shape::registry::Shape;

/// How a batch reacts when one of its items fails.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BatchPolicy {
    /// The first failing item (by input index) fails the whole batch; no outputs are returned.
    #[default]
    AllOrNothing,
    /// Every item reports its own result.
    PerItem,
}

impl fmt::Display for BatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BatchPolicy::AllOrNothing => "all-or-nothing",
            BatchPolicy::PerItem => "per-item",
        })
    }
}

impl FromStr for BatchPolicy {
    type Err = TipmaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "all-or-nothing" => Ok(BatchPolicy::AllOrNothing),
            "per-item" => Ok(BatchPolicy::PerItem),
            other => Err(TipmaskError::validation(format!(
                "unknown batch policy '{other}'"
            ))),
        }
    }
}

/// Options for [`PreviewEngine::generate_batch`].
#[derive(Clone, Debug, Default)]
pub struct BatchOpts {
    pub policy: BatchPolicy,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
}

/// Per-input outcomes of a batch, in input order.
#[derive(Debug)]
pub struct BatchReport {
    pub items: Vec<TipmaskResult<Vec<u8>>>,
}

impl BatchReport {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|r| r.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.items.len() - self.succeeded()
    }
}

impl PreviewEngine {
    /// Run [`PreviewEngine::generate_preview`] for every input against the same shape.
    ///
    /// Items run in parallel on a dedicated thread pool and share nothing but the engine. Under
    /// [`BatchPolicy::AllOrNothing`] the lowest-index failure is returned as
    /// [`TipmaskError::Batch`] and successful outputs are discarded; under
    /// [`BatchPolicy::PerItem`] the report carries one result per input.
    #[tracing::instrument(skip(self, inputs), fields(items = inputs.len(), policy = %opts.policy))]
    pub fn generate_batch<B>(
        &self,
        shape: Shape,
        inputs: &[B],
        opts: &BatchOpts,
    ) -> TipmaskResult<BatchReport>
    where
        B: AsRef<[u8]> + Sync,
    {
        let pool = build_thread_pool(opts.threads)?;

        let items: Vec<TipmaskResult<Vec<u8>>> = pool.install(|| {
            inputs
                .par_iter()
                .map(|bytes| self.generate_preview(shape, bytes.as_ref()))
                .collect()
        });

        for (index, item) in items.iter().enumerate() {
            if let Err(e) = item {
                tracing::warn!(index, error = %e, "batch item failed");
            }
        }

        let report = BatchReport { items };
        tracing::info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            "batch finished"
        );

        match opts.policy {
            BatchPolicy::PerItem => Ok(report),
            BatchPolicy::AllOrNothing => {
                let mut outputs = Vec::with_capacity(report.items.len());
                for (index, item) in report.items.into_iter().enumerate() {
                    outputs.push(Ok(item.map_err(|e| TipmaskError::batch(index, e))?));
                }
                Ok(BatchReport { items: outputs })
            }
        }
    }
}

fn build_thread_pool(threads: Option<usize>) -> TipmaskResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(TipmaskError::validation(
            "batch 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build rayon thread pool: {e}").into())
}

#[cfg(test)]
#[path = "../../tests/unit/session/batch.rs"]
mod tests;
