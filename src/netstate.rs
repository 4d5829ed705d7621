//! Main `Netstate` entry point and builder.

use std::ops::RangeInclusive;

use rand::Rng;
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::debug;

use crate::codes::{build_codes, check_bits, CodeMatrix};
use crate::config::Config;
use crate::distribution::{empirical_distribution, independent_from_codes, Distribution};
use crate::error::{NetstateError, Result};
use crate::ising::{fit_ising_codes, IsingFit};
use crate::metrics::{conditional_activity, djs_between, spike_count_pmf, InformationSummary};
use crate::optimize::Algorithm;
use crate::population::{pairs_in_range, SpikeSource};
use crate::result::{CellCheck, Scatter, SpikeCountPmf};
use crate::sampling::{counter_rng_seed, seeded_rng, SubgroupSampler};
use crate::survey::{
    run_group_task, run_tasks, DivergenceSurvey, EntropyScaling, GroupOutcome, GroupTask,
    InformationSurvey, IsingParameterSurvey, ScalingPoint,
};
use crate::types::{ModelKind, NeuronId, SpatialRange, SpikeTrain, TimeWindow, Timestamp};

/// Random streams derived from the configured seed.
const SHUFFLE_STREAM: u64 = 0;
const SAMPLING_STREAM: u64 = 1;
const CHECK_CELL_STREAM: u64 = 2;
const SCALING_STREAM_BASE: u64 = 1 << 32;

/// Population-code analyses of one spike source over a set of time windows.
///
/// Use the builder methods to configure, then call an analysis. Every call
/// rebuilds its codes from the source; nothing is cached between calls.
///
/// # Example
///
/// ```ignore
/// use netstate::{Netstate, Population, TimeWindow, ModelKind};
///
/// let population: Population = load_population();
/// let survey = Netstate::new(&population)
///     .windows(vec![TimeWindow::new(0, 600_000_000)])
///     .word_len(10)
///     .seed(7)
///     .divergence_survey(100, &ModelKind::ALL, None, "indep vs ising")?;
///
/// println!("{:?}", survey.log_ratios);
/// ```
pub struct Netstate<'a, S: SpikeSource + ?Sized> {
    source: &'a S,
    windows: Vec<TimeWindow>,
    neurons: Option<Vec<NeuronId>>,
    config: Config,
}

impl<'a, S: SpikeSource + ?Sized> Netstate<'a, S> {
    /// Analyze `source` with the default configuration and no windows.
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            windows: Vec::new(),
            neurons: None,
            config: Config::default(),
        }
    }

    /// Time windows codes are built over, in order.
    pub fn windows(mut self, windows: Vec<TimeWindow>) -> Self {
        self.windows = windows;
        self
    }

    /// Restrict surveys to these neurons instead of every neuron in the source.
    pub fn neurons(mut self, ids: Vec<NeuronId>) -> Self {
        self.neurons = Some(ids);
        self
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Set the bin width.
    pub fn tres(mut self, tres: Timestamp) -> Self {
        self.config.code.tres = tres;
        self
    }

    /// Set the bin phase in degrees.
    pub fn phase(mut self, degrees: f64) -> Self {
        self.config.code.phase = degrees;
        self
    }

    /// Set the number of neurons per survey group.
    pub fn word_len(mut self, n: usize) -> Self {
        self.config.code.word_len = n;
        self
    }

    /// Set the Ising minimizer.
    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.config.ising.algorithm = algorithm;
        self
    }

    /// Set a deterministic seed for sampling and shuffling.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.survey.seed = Some(seed);
        self
    }

    /// Shuffle every neuron's code before analysis.
    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.config.survey.shuffle = shuffle;
        self
    }

    /// Surveys with more groups than this run in parallel.
    pub fn parallel_threshold(mut self, n: usize) -> Self {
        self.config.survey.parallel_threshold = n;
        self
    }

    /// Get the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Time windows in use.
    pub fn time_windows(&self) -> &[TimeWindow] {
        &self.windows
    }

    /// Neurons surveys draw from.
    pub fn population(&self) -> Vec<NeuronId> {
        self.neurons
            .clone()
            .unwrap_or_else(|| self.source.neuron_ids())
    }

    fn stream_rng(&self, stream: u64) -> Xoshiro256PlusPlus {
        seeded_rng(self.config.survey.seed.map(|s| counter_rng_seed(s, stream)))
    }

    fn raw_codes(&self, ids: &[NeuronId]) -> Result<CodeMatrix> {
        self.config.validate()?;
        let empty = SpikeTrain::empty();
        let trains: Vec<(NeuronId, &SpikeTrain)> = ids
            .iter()
            .map(|&id| {
                let train = self.source.spikes(id).unwrap_or_else(|| {
                    debug!(neuron = id, "neuron missing from source; using a silent placeholder");
                    &empty
                });
                (id, train)
            })
            .collect();
        build_codes(&trains, &self.windows, &self.config.code)
    }

    /// Code matrix for `ids`, rows in the given order.
    ///
    /// Ids the source does not know get an all-zero row. Shuffled when the
    /// configuration asks for it.
    pub fn codes(&self, ids: &[NeuronId]) -> Result<CodeMatrix> {
        let mut codes = self.raw_codes(ids)?;
        if self.config.survey.shuffle {
            codes.shuffle_rows(&mut self.stream_rng(SHUFFLE_STREAM));
        }
        Ok(codes)
    }

    /// Observed word distribution of `ids`.
    pub fn observed(&self, ids: &[NeuronId]) -> Result<Distribution> {
        empirical_distribution(&self.codes(ids)?, self.config.ising.max_bits)
    }

    /// Independent-model distribution of `ids`.
    pub fn independent(&self, ids: &[NeuronId]) -> Result<Distribution> {
        independent_from_codes(&self.codes(ids)?, self.config.ising.max_bits)
    }

    fn coupled_pairs(
        &self,
        ids: &[NeuronId],
        range: Option<&SpatialRange>,
    ) -> Result<Option<Vec<(usize, usize)>>> {
        range
            .map(|r| pairs_in_range(self.source, ids, r))
            .transpose()
    }

    /// Fit an Ising model to `ids`.
    ///
    /// With a `range`, only pairs whose distance lies strictly inside it get
    /// a free coupling, and every pair's distance must be known.
    pub fn ising(&self, ids: &[NeuronId], range: Option<SpatialRange>) -> Result<IsingFit> {
        check_bits(ids.len(), self.config.ising.max_bits)?;
        let coupled = self.coupled_pairs(ids, range.as_ref())?;
        fit_ising_codes(&self.codes(ids)?, coupled.as_deref(), &self.config.ising)
    }

    /// Entropies `S1`, `S2` and `SN` of `ids`.
    pub fn information(&self, ids: &[NeuronId]) -> Result<InformationSummary> {
        let outcome = self.evaluate(ids, &ModelKind::ALL, None)?;
        let independent = outcome.expected(ModelKind::Independent);
        let ising = outcome.expected(ModelKind::Ising);
        match (independent, ising) {
            (Some(indep), Some(ising)) => Ok(InformationSummary::new(indep, ising, &outcome.observed)),
            _ => Err(NetstateError::MismatchedInput("models were not evaluated".into())),
        }
    }

    fn evaluate(
        &self,
        ids: &[NeuronId],
        models: &[ModelKind],
        range: Option<&SpatialRange>,
    ) -> Result<GroupOutcome> {
        let task = GroupTask {
            group: 0,
            ids: ids.to_vec(),
            codes: self.codes(ids)?,
            models: models.to_vec(),
            coupled: self.coupled_pairs(ids, range)?,
            ising: self.config.ising,
        };
        run_group_task(&task)
    }

    /// Observed versus expected probability of every word, per model.
    ///
    /// `range` restricts the Ising couplings as in [`ising`](Self::ising).
    pub fn scatter(
        &self,
        ids: &[NeuronId],
        models: &[ModelKind],
        range: Option<SpatialRange>,
    ) -> Result<Scatter> {
        let outcome = self.evaluate(ids, models, range.as_ref())?;
        let mut expected = Vec::with_capacity(models.len());
        let mut djs = Vec::with_capacity(models.len());
        for &model in models {
            let dist = outcome
                .expected(model)
                .ok_or_else(|| NetstateError::MismatchedInput(format!("model {model} missing")))?;
            djs.push(djs_between(&outcome.observed, dist)?);
            expected.push(dist.clone());
        }
        Ok(Scatter {
            ids: ids.to_vec(),
            observed: outcome.observed,
            models: models.to_vec(),
            expected,
            djs,
        })
    }

    /// PMF of the number of co-active neurons, observed and shuffled.
    pub fn spike_count_pmf(&self, ids: &[NeuronId]) -> Result<SpikeCountPmf> {
        let codes = self.raw_codes(ids)?;
        let mut shuffled = codes.clone();
        shuffled.shuffle_rows(&mut self.stream_rng(SHUFFLE_STREAM));
        Ok(SpikeCountPmf {
            ids: ids.to_vec(),
            observed: spike_count_pmf(&codes),
            shuffled: spike_count_pmf(&shuffled),
        })
    }

    /// Activity of `cell` given how many of `k` other cells are active,
    /// averaged over up to `nsamples` distinct `k`-subsets of `others`.
    pub fn check_cell(
        &self,
        cell: NeuronId,
        others: &[NeuronId],
        k: usize,
        nsamples: usize,
    ) -> Result<CellCheck> {
        if others.contains(&cell) {
            return Err(NetstateError::MismatchedInput(format!(
                "cell {cell} is also listed among the other cells"
            )));
        }
        let mut ids = vec![cell];
        ids.extend_from_slice(others);
        let codes = self.codes(&ids)?;

        let sampler = SubgroupSampler::new(others.to_vec())?;
        let subsets = sampler.sample(k, nsamples, &mut self.stream_rng(CHECK_CELL_STREAM))?;
        let tables = subsets
            .iter()
            .map(|subset| {
                let rows = subset
                    .iter()
                    .map(|&id| {
                        codes
                            .index_of(id)
                            .map(|i| codes.row(i))
                            .ok_or(NetstateError::UnknownNeuron(id))
                    })
                    .collect::<Result<Vec<&[u8]>>>()?;
                conditional_activity(codes.row(0), &rows)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(CellCheck::from_tables(cell, subsets, &tables))
    }

    /// Left edges of bins where exactly `on_ids` (a subset of `ids`) are active.
    pub fn word_times(&self, ids: &[NeuronId], on_ids: &[NeuronId]) -> Result<Vec<Timestamp>> {
        self.codes(ids)?.word_times(on_ids)
    }

    /// Left edges of bins where every neuron in `ids` is active.
    pub fn sync_times(&self, ids: &[NeuronId]) -> Result<Vec<Timestamp>> {
        Ok(self.codes(ids)?.sync_times())
    }

    fn sample_groups<R: Rng>(
        &self,
        population: &[NeuronId],
        nbits: usize,
        ngroups: usize,
        rng: &mut R,
    ) -> Result<Vec<Vec<NeuronId>>> {
        check_bits(nbits, self.config.ising.max_bits)?;
        SubgroupSampler::new(population.to_vec())?.sample(nbits, ngroups, rng)
    }

    fn group_tasks(
        &self,
        codes: &CodeMatrix,
        groups: &[Vec<NeuronId>],
        models: &[ModelKind],
        range: Option<&SpatialRange>,
    ) -> Result<Vec<GroupTask>> {
        let use_range = range.filter(|_| models.contains(&ModelKind::Ising));
        groups
            .iter()
            .enumerate()
            .map(|(group, ids)| -> Result<GroupTask> {
                Ok(GroupTask {
                    group,
                    ids: ids.clone(),
                    codes: codes.select(ids)?,
                    models: models.to_vec(),
                    coupled: self.coupled_pairs(ids, use_range)?,
                    ising: self.config.ising,
                })
            })
            .collect()
    }

    /// Sample `ngroups` groups of `word_len` neurons and run `models` on each.
    fn survey_outcomes(
        &self,
        ngroups: usize,
        models: &[ModelKind],
        range: Option<&SpatialRange>,
    ) -> Result<(usize, Vec<GroupOutcome>)> {
        let population = self.population();
        let nbits = self.config.code.word_len;
        let groups = self.sample_groups(
            &population,
            nbits,
            ngroups,
            &mut self.stream_rng(SAMPLING_STREAM),
        )?;
        let codes = self.codes(&population)?;
        let tasks = self.group_tasks(&codes, &groups, models, range)?;
        let outcomes = run_tasks(&tasks, self.config.survey.parallel_threshold)?;
        Ok((population.len(), outcomes))
    }

    /// DJS of each model against the observed words of `ngroups` random
    /// groups of `word_len` neurons.
    ///
    /// With exactly two models the per-group `log10` DJS ratio of the second
    /// to the first is also reported. Asking for more groups than there are
    /// distinct groups returns every group once.
    pub fn divergence_survey(
        &self,
        ngroups: usize,
        models: &[ModelKind],
        range: Option<SpatialRange>,
        title: impl Into<String>,
    ) -> Result<DivergenceSurvey> {
        if models.is_empty() {
            return Err(NetstateError::InvalidConfig("no models to compare".into()));
        }
        let (nneurons, outcomes) = self.survey_outcomes(ngroups, models, range.as_ref())?;
        DivergenceSurvey::collect(
            title.into(),
            models.to_vec(),
            self.config.code.word_len,
            nneurons,
            range,
            self.windows.clone(),
            &outcomes,
        )
    }

    /// Fitted Ising parameters of `ngroups` random groups.
    pub fn ising_parameter_survey(&self, ngroups: usize) -> Result<IsingParameterSurvey> {
        let (_, outcomes) = self.survey_outcomes(ngroups, &[ModelKind::Ising], None)?;
        IsingParameterSurvey::collect(self.config.code.word_len, &outcomes)
    }

    /// `I2` versus `IN` over `ngroups` random groups.
    pub fn information_survey(&self, ngroups: usize) -> Result<InformationSurvey> {
        let (_, outcomes) = self.survey_outcomes(ngroups, &ModelKind::ALL, None)?;
        InformationSurvey::collect(self.config.code.word_len, self.config.code.tres, &outcomes)
    }

    /// `S1` and `IN` for each group size in `sizes`, each over up to
    /// `max_samples` distinct groups.
    pub fn entropy_scaling(
        &self,
        sizes: RangeInclusive<usize>,
        max_samples: usize,
    ) -> Result<EntropyScaling> {
        let population = self.population();
        let codes = self.codes(&population)?;
        let mut points = Vec::new();
        for n in sizes {
            let mut rng = self.stream_rng(SCALING_STREAM_BASE + n as u64);
            let groups = self.sample_groups(&population, n, max_samples, &mut rng)?;
            let tasks = self.group_tasks(&codes, &groups, &[ModelKind::Independent], None)?;
            let outcomes = run_tasks(&tasks, self.config.survey.parallel_threshold)?;
            points.push(ScalingPoint::collect(n, self.config.code.tres, &outcomes)?);
        }
        Ok(EntropyScaling {
            tres: self.config.code.tres,
            points,
        })
    }
}
