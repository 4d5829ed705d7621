//! Surveys over many random neuron groups.
//!
//! Every survey turns its groups into [`GroupTask`]s, runs them through
//! [`run_tasks`] and folds the [`GroupOutcome`]s into its result:
//!
//! - [`DivergenceSurvey`]: DJS of each model against the observed words
//! - [`IsingParameterSurvey`]: fitted biases and couplings
//! - [`InformationSurvey`]: `I2` versus `IN`
//! - [`EntropyScaling`]: `S1` and `IN` versus group size
//!
//! Tasks are independent. With more tasks than the configured threshold they
//! run on the shared thread pool; results always come back in submission
//! order, and the first failure aborts the survey with its group index.

mod archive;
mod divergence;
mod information;
mod parameters;
mod task;

pub use divergence::DivergenceSurvey;
pub use information::{EntropyScaling, InformationSurvey, ScalingPoint};
pub use parameters::IsingParameterSurvey;
pub use task::{run_group_task, GroupOutcome, GroupTask};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::time::Instant;
use tracing::info;

use crate::error::Result;

/// Run `tasks`, in parallel when there are more than `parallel_threshold`.
///
/// Output order matches input order. Fails fast on the first failing task,
/// tagging the error with that task's group index.
pub fn run_tasks(tasks: &[GroupTask], parallel_threshold: usize) -> Result<Vec<GroupOutcome>> {
    let start = Instant::now();
    let parallel = cfg!(feature = "parallel") && tasks.len() > parallel_threshold;
    info!(ngroups = tasks.len(), parallel, "survey started");

    let run = |task: &GroupTask| run_group_task(task).map_err(|e| e.in_group(task.group));

    #[cfg(feature = "parallel")]
    let outcomes = if parallel {
        crate::thread_pool::install(|| tasks.par_iter().map(run).collect::<Result<Vec<_>>>())
    } else {
        tasks.iter().map(run).collect::<Result<Vec<_>>>()
    };

    #[cfg(not(feature = "parallel"))]
    let outcomes = tasks.iter().map(run).collect::<Result<Vec<_>>>();

    let outcomes = outcomes?;
    info!(
        ngroups = outcomes.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "survey finished"
    );
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::CodeMatrix;
    use crate::config::IsingConfig;
    use crate::error::NetstateError;
    use crate::types::ModelKind;

    fn tasks(n: usize) -> Vec<GroupTask> {
        (0..n)
            .map(|group| {
                let rows = vec![
                    (0..8).map(|j| ((j + group) % 2) as u8).collect(),
                    (0..8).map(|j| ((j / 2 + group) % 2) as u8).collect(),
                ];
                GroupTask {
                    group,
                    ids: vec![0, 1],
                    codes: CodeMatrix::from_rows(vec![0, 1], (0..8).collect(), rows).unwrap(),
                    models: vec![ModelKind::Independent],
                    coupled: None,
                    ising: IsingConfig::default(),
                }
            })
            .collect()
    }

    #[test]
    fn test_results_in_submission_order() {
        let tasks = tasks(12);
        let outcomes = run_tasks(&tasks, 0).unwrap();
        let order: Vec<usize> = outcomes.iter().map(|o| o.group).collect();
        assert_eq!(order, (0..12).collect::<Vec<_>>());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let tasks = tasks(8);
        let parallel = run_tasks(&tasks, 0).unwrap();
        let sequential = run_tasks(&tasks, usize::MAX).unwrap();
        for (a, b) in parallel.iter().zip(&sequential) {
            assert_eq!(a.observed, b.observed);
            assert_eq!(a.independent, b.independent);
        }
    }

    #[test]
    fn test_failure_carries_group_index() {
        let mut tasks = tasks(7);
        tasks[4].ising.max_bits = 1;
        // Sequential, then forced onto the pool.
        for threshold in [usize::MAX, 0] {
            let err = run_tasks(&tasks, threshold).unwrap_err();
            match err {
                NetstateError::GroupFailed { group, source } => {
                    assert_eq!(group, 4, "threshold {threshold}");
                    assert!(matches!(*source, NetstateError::TooManyBits { .. }));
                }
                other => panic!("unexpected error at threshold {threshold}: {other}"),
            }
        }
    }
}
