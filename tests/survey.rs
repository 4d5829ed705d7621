//! Survey behavior: sampling, determinism, parallel dispatch and archives.

mod common;

use common::{correlated_population, independent_population, window};
use netstate::{Config, DivergenceSurvey, ModelKind, Netstate, NetstateError, Population};
use tempfile::TempDir;

fn quick(pop: &Population, nbins: usize) -> Netstate<'_, Population> {
    Netstate::new(pop)
        .windows(window(nbins))
        .with_config(Config::quick())
}

#[test]
fn seeded_surveys_repeat() {
    let pop = correlated_population(8, 1_000, 1);
    let ns = quick(&pop, 1_000).word_len(3).seed(99);

    let a = ns.divergence_survey(6, &ModelKind::ALL, None, "a").unwrap();
    let b = ns.divergence_survey(6, &ModelKind::ALL, None, "a").unwrap();
    assert_eq!(a.groups, b.groups);
    assert_eq!(a.djs, b.djs);

    let other = quick(&pop, 1_000)
        .word_len(3)
        .seed(100)
        .divergence_survey(6, &ModelKind::ALL, None, "a")
        .unwrap();
    assert_ne!(a.groups, other.groups);
}

#[test]
fn parallel_and_sequential_agree() {
    let pop = correlated_population(7, 800, 2);
    let ns_par = quick(&pop, 800).word_len(3).seed(5).parallel_threshold(0);
    let ns_seq = quick(&pop, 800)
        .word_len(3)
        .seed(5)
        .parallel_threshold(usize::MAX);

    let a = ns_par.divergence_survey(10, &ModelKind::ALL, None, "par").unwrap();
    let b = ns_seq.divergence_survey(10, &ModelKind::ALL, None, "seq").unwrap();
    assert_eq!(a.groups, b.groups);
    assert_eq!(a.djs, b.djs);
}

#[test]
fn survey_caps_at_distinct_groups() {
    let pop = correlated_population(6, 500, 3);
    let survey = quick(&pop, 500)
        .word_len(3)
        .seed(1)
        .divergence_survey(1_000, &ModelKind::ALL, None, "capped")
        .unwrap();

    assert_eq!(survey.ngroups, 20);
    assert_eq!(survey.groups.len(), 20);
    assert_eq!(survey.nneurons, 6);
    let mut groups = survey.groups.clone();
    groups.sort();
    groups.dedup();
    assert_eq!(groups.len(), 20);
}

#[test]
fn log_ratios_only_for_two_models() {
    let pop = correlated_population(6, 1_000, 4);
    let ns = quick(&pop, 1_000).word_len(4).seed(2);

    let two = ns.divergence_survey(5, &ModelKind::ALL, None, "two").unwrap();
    assert_eq!(two.log_ratios.len(), 5);
    for (g, ratio) in two.log_ratios.iter().enumerate() {
        let expected = (two.djs[g][1] / two.djs[g][0]).log10();
        assert!((ratio - expected).abs() < 1e-12 || (ratio.is_nan() && expected.is_nan()));
    }

    let one = ns
        .divergence_survey(5, &[ModelKind::Independent], None, "one")
        .unwrap();
    assert!(one.log_ratios.is_empty());
    assert_eq!(one.djs[0].len(), 1);
    assert_eq!(one.model_djs(ModelKind::Independent).unwrap().len(), 5);
    assert!(one.model_djs(ModelKind::Ising).is_none());

    assert!(matches!(
        ns.divergence_survey(5, &[], None, "none"),
        Err(NetstateError::InvalidConfig(_))
    ));
}

#[test]
fn archive_round_trip_keeps_special_values() {
    let pop = correlated_population(5, 600, 6);
    let mut survey = quick(&pop, 600)
        .word_len(3)
        .seed(3)
        .divergence_survey(4, &ModelKind::ALL, None, "archived")
        .unwrap();
    survey.log_ratios[0] = f64::NAN;
    survey.log_ratios[1] = f64::NEG_INFINITY;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("survey.json");
    survey.save(&path).unwrap();
    let loaded = DivergenceSurvey::load(&path).unwrap();

    assert_eq!(loaded.title, "archived");
    assert_eq!(loaded.groups, survey.groups);
    assert_eq!(loaded.windows, survey.windows);
    assert!(loaded.log_ratios[0].is_nan());
    assert_eq!(loaded.log_ratios[1], f64::NEG_INFINITY);
    for (a, b) in loaded.djs.iter().flatten().zip(survey.djs.iter().flatten()) {
        assert!((a - b).abs() <= 1e-15 * b.abs().max(1.0));
    }

    assert!(DivergenceSurvey::load(dir.path().join("missing.json")).is_err());
}

#[test]
fn information_survey_bounds() {
    let pop = correlated_population(6, 3_000, 7);
    let survey = quick(&pop, 3_000)
        .word_len(4)
        .seed(4)
        .information_survey(5)
        .unwrap();

    assert_eq!(survey.summaries.len(), 5);
    for s in &survey.summaries {
        assert!(s.multi_information() > 0.0);
        assert!(s.pairwise_information() >= -1e-6);
        assert!(s.pairwise_information() <= s.multi_information() + 1e-6);
    }
    let rates = survey.multi_information_rates();
    let per_bin = survey.summaries[0].multi_information();
    assert!((rates[0] - per_bin * 1e6 / survey.tres as f64).abs() < 1e-9);
    assert_eq!(survey.pairwise_fractions().len(), 5);
}

#[test]
fn entropy_scaling_points() {
    let pop = correlated_population(5, 1_000, 8);
    let scaling = quick(&pop, 1_000)
        .seed(6)
        .entropy_scaling(1..=3, 4)
        .unwrap();

    assert_eq!(scaling.sizes(), vec![1, 2, 3]);
    // Five singletons exist but only four were asked for; C(5, 2) = 10 > 4.
    assert!(scaling.points.iter().all(|p| p.nsamples == 4));
    assert!(scaling.points[0].multi_information.mean.abs() < 1e-9);

    let all = quick(&pop, 1_000).seed(6).entropy_scaling(5..=5, 10).unwrap();
    assert_eq!(all.points[0].nsamples, 1);
    assert!(all.points[0].s1.mean > scaling.points[0].s1.mean);
}

#[test]
fn ising_parameter_survey_shapes() {
    let pop = correlated_population(6, 2_000, 9);
    let survey = quick(&pop, 2_000)
        .word_len(4)
        .seed(7)
        .ising_parameter_survey(3)
        .unwrap();

    assert_eq!(survey.groups.len(), 3);
    assert!(survey.h.iter().all(|h| h.len() == 4));
    assert!(survey.j.iter().all(|j| j.len() == 6));
    assert_eq!(survey.all_j().len(), 18);
    // Shared drive: couplings are mostly positive.
    let positive = survey.all_j().iter().filter(|&&j| j > 0.0).count();
    assert!(positive > 9);
    assert!((0.0..=1.0).contains(&survey.convergence_rate()));
}

#[test]
fn survey_rejects_oversized_groups() {
    let pop = correlated_population(3, 100, 10);
    let ns = quick(&pop, 100).word_len(4);
    assert!(ns.divergence_survey(1, &ModelKind::ALL, None, "x").is_err());
}

#[test]
fn restricted_survey_limits_couplings() {
    let pop = correlated_population(6, 1_000, 11);
    let range = netstate::SpatialRange::new(0.0, 15.0).unwrap();
    let ns = quick(&pop, 1_000).word_len(3).seed(12);
    let survey = ns
        .divergence_survey(4, &ModelKind::ALL, Some(range), "near")
        .unwrap();
    assert_eq!(survey.range, Some(range));
    assert_eq!(survey.djs.len(), 4);
}

#[test]
fn default_config_fits_report_convergence() {
    for (label, pop) in [
        ("correlated", correlated_population(8, 20_000, 13)),
        ("independent", independent_population(8, 20_000, 0.2, 13)),
    ] {
        let survey = Netstate::new(&pop)
            .windows(window(20_000))
            .word_len(6)
            .seed(21)
            .ising_parameter_survey(8)
            .unwrap();
        assert!(
            survey.convergence_rate() >= 0.75,
            "{} convergence rate {}",
            label,
            survey.convergence_rate()
        );
    }
}
