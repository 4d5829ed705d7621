//! End-to-end scenarios through the `Netstate` entry point.

mod common;

use common::{correlated_population, independent_population, window, TRES};
use netstate::{
    Config, ModelKind, Netstate, NetstateError, Population, SpatialRange, SpikeTrain, TimeWindow,
};

/// A fires in bin 0 only, B in bin 1 only, C in both.
fn three_neurons() -> Population {
    Population::new()
        .with_neuron(1, SpikeTrain::new(vec![100]))
        .with_neuron(2, SpikeTrain::new(vec![TRES + 100]))
        .with_neuron(3, SpikeTrain::new(vec![100, TRES + 100]))
}

#[test]
fn three_neuron_words() {
    let pop = three_neurons();
    let ns = Netstate::new(&pop).windows(window(2));

    let codes = ns.codes(&[1, 2, 3]).unwrap();
    assert_eq!(codes.row(0), &[1, 0]);
    assert_eq!(codes.row(1), &[0, 1]);
    assert_eq!(codes.row(2), &[1, 1]);
    assert_eq!(codes.words().unwrap(), vec![5, 6]);

    let observed = ns.observed(&[1, 2, 3]).unwrap();
    assert_eq!(observed.len(), 8);
    for (w, &p) in observed.probabilities().iter().enumerate() {
        let expected = if w == 5 || w == 6 { 0.5 } else { 0.0 };
        assert_eq!(p, expected, "word {}", w);
    }
}

#[test]
fn row_order_sets_bit_significance() {
    let pop = three_neurons();
    let ns = Netstate::new(&pop).windows(window(2));
    // C as bit 0, A as bit 2: bin 0 = C + A = 1 + 4, bin 1 = C + B = 1 + 2
    assert_eq!(ns.codes(&[3, 2, 1]).unwrap().words().unwrap(), vec![5, 3]);
}

#[test]
fn word_and_sync_times() {
    let pop = three_neurons();
    let ns = Netstate::new(&pop).windows(window(2));

    assert_eq!(ns.word_times(&[1, 2, 3], &[1, 3]).unwrap(), vec![0]);
    assert_eq!(ns.word_times(&[1, 2, 3], &[2, 3]).unwrap(), vec![TRES]);
    assert_eq!(ns.sync_times(&[1, 3]).unwrap(), vec![0]);
    assert!(ns.sync_times(&[1, 2]).unwrap().is_empty());
    assert!(ns.word_times(&[1, 2], &[3]).is_err());
}

#[test]
fn missing_neuron_is_silent_row() {
    let pop = three_neurons();
    let ns = Netstate::new(&pop).windows(window(2));
    let codes = ns.codes(&[1, 99]).unwrap();
    assert_eq!(codes.row(1), &[0, 0]);
    assert_eq!(codes.neuron_ids(), &[1, 99]);
}

#[test]
fn empty_inputs() {
    let pop = three_neurons();
    let ns = Netstate::new(&pop);
    assert_eq!(ns.codes(&[1, 2]).unwrap().nbins(), 0);
    assert!(ns.observed(&[1, 2]).is_err());

    let ns = ns.windows(window(2));
    assert_eq!(ns.codes(&[]).unwrap().nneurons(), 0);
}

#[test]
fn windows_concatenate_in_order() {
    let pop = three_neurons();
    let ns = Netstate::new(&pop).windows(vec![
        TimeWindow::new(TRES, 2 * TRES),
        TimeWindow::new(0, TRES),
    ]);
    let codes = ns.codes(&[1, 2, 3]).unwrap();
    assert_eq!(codes.bin_edges(), &[TRES, 0]);
    assert_eq!(codes.words().unwrap(), vec![6, 5]);
}

#[test]
fn independent_half_probability_neurons() {
    let pop = independent_population(2, 20_000, 0.5, 11);
    let ns = Netstate::new(&pop).windows(window(20_000));

    let observed = ns.observed(&[1, 2]).unwrap();
    for &p in observed.probabilities() {
        assert!((p - 0.25).abs() < 0.02, "observed {}", p);
    }

    let independent = ns.independent(&[1, 2]).unwrap();
    for &p in independent.probabilities() {
        assert!((p - 0.25).abs() < 0.02);
    }
    assert!((independent.total() - 1.0).abs() < 1e-12);
}

#[test]
fn ising_beats_independent_on_correlated_data() {
    let pop = correlated_population(5, 5_000, 3);
    let ns = Netstate::new(&pop)
        .windows(window(5_000))
        .with_config(Config::quick());

    let scatter = ns.scatter(&[1, 2, 3, 4, 5], &ModelKind::ALL, None).unwrap();
    let (indep, ising) = (scatter.djs[0], scatter.djs[1]);
    assert!(ising < indep, "ising {} vs indep {}", ising, indep);
    assert_eq!(scatter.points(ModelKind::Ising).unwrap().len(), 32);

    let info = ns.information(&[1, 2, 3, 4, 5]).unwrap();
    assert!(info.multi_information() > 0.0);
    assert!(info.pairwise_information() >= -1e-6);
    assert!(info.pairwise_information() <= info.multi_information() + 1e-6);
}

#[test]
fn spatially_restricted_ising() {
    let pop = correlated_population(4, 2_000, 5);
    let ns = Netstate::new(&pop)
        .windows(window(2_000))
        .with_config(Config::quick());

    // Neurons 10 apart on a line: only adjacent pairs are inside (5, 15).
    let range = SpatialRange::new(5.0, 15.0).unwrap();
    let fit = ns.ising(&[1, 2, 3, 4], Some(range)).unwrap();
    let pairs: Vec<(usize, usize)> = fit.couplings.iter().map(|c| (c.i, c.j)).collect();
    assert_eq!(pairs, vec![(0, 1), (1, 2), (2, 3)]);
    assert_eq!(fit.coupling(0, 2), 0.0);

    let full = ns.ising(&[1, 2, 3, 4], None).unwrap();
    assert_eq!(full.couplings.len(), 6);
}

#[test]
fn restricted_fit_needs_distances() {
    let pop = independent_population(3, 100, 0.3, 1);
    let ns = Netstate::new(&pop).windows(window(100));
    let range = SpatialRange::new(0.0, 100.0).unwrap();
    let err = ns.ising(&[1, 2, 3], Some(range)).unwrap_err();
    assert!(matches!(err, NetstateError::MissingDistance { a: 1, b: 2 }));
}

#[test]
fn invalid_range_rejected() {
    assert!(matches!(
        SpatialRange::new(10.0, 10.0),
        Err(NetstateError::InvalidRange { .. })
    ));
}

#[test]
fn too_many_bits_rejected() {
    let pop = independent_population(20, 10, 0.5, 2);
    let ns = Netstate::new(&pop).windows(window(10));
    let ids: Vec<u32> = (1..=20).collect();
    assert!(matches!(
        ns.ising(&ids, None),
        Err(NetstateError::TooManyBits { bits: 20, .. })
    ));
    assert!(ns.observed(&ids).is_err());
}

#[test]
fn spike_count_pmf_preserves_mean_activity() {
    let pop = correlated_population(6, 3_000, 9);
    let ns = Netstate::new(&pop).windows(window(3_000)).seed(4);
    let pmf = ns.spike_count_pmf(&[1, 2, 3, 4, 5, 6]).unwrap();

    assert_eq!(pmf.observed.len(), 7);
    let mean = |p: &[f64]| p.iter().enumerate().map(|(k, v)| k as f64 * v).sum::<f64>();
    assert!((pmf.observed.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    assert!((pmf.shuffled.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    assert!((mean(&pmf.observed) - mean(&pmf.shuffled)).abs() < 1e-9);
    // Shared drive makes many-neuron bins rarer once it is shuffled away.
    assert!(pmf.observed[4..].iter().sum::<f64>() > pmf.shuffled[4..].iter().sum::<f64>());
}

#[test]
fn check_cell_averages_over_capped_subsets() {
    let pop = correlated_population(5, 2_000, 21);
    let ns = Netstate::new(&pop).windows(window(2_000)).seed(8);
    let check = ns.check_cell(1, &[2, 3, 4, 5], 2, 100).unwrap();

    assert_eq!(check.subsets.len(), 6);
    assert_eq!(check.mean.len(), 3);
    for m in 0..3 {
        let total = check.mean.on[m] + check.mean.off[m];
        assert!(total == 0.0 || (total - 1.0).abs() < 1e-12);
    }
    // The cell is more likely on when more of the others are on.
    assert!(check.mean.on[2] > check.mean.on[0]);

    assert!(ns.check_cell(1, &[1, 2], 1, 1).is_err());
}

#[test]
fn phase_shifts_bins() {
    let pop = Population::new().with_neuron(1, SpikeTrain::new(vec![TRES / 4]));
    let ns = Netstate::new(&pop).windows(window(2)).phase(180.0);
    let codes = ns.codes(&[1]).unwrap();
    // Edges at TRES/2 only; the spike before the first edge is dropped.
    assert_eq!(codes.bin_edges(), &[TRES / 2, 3 * TRES / 2]);
    assert_eq!(codes.row(0), &[0, 0]);
}
