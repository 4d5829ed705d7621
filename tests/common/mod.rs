//! Synthetic spike data shared by the integration tests.

#![allow(dead_code)]

use netstate::{NeuronId, Population, SpikeTrain, TimeWindow, Timestamp, DEFAULT_TRES};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

pub const TRES: Timestamp = DEFAULT_TRES;

/// One window covering `nbins` default-width bins.
pub fn window(nbins: usize) -> Vec<TimeWindow> {
    vec![TimeWindow::new(0, nbins as Timestamp * TRES)]
}

/// `nneurons` neurons with ids `1..=nneurons` driven by a shared hidden
/// state: in a bin where the drive is on each neuron fires with
/// probability 0.6, otherwise 0.05. Neurons sit 10 units apart on a line.
pub fn correlated_population(nneurons: usize, nbins: usize, seed: u64) -> Population {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut spikes: Vec<Vec<Timestamp>> = vec![Vec::new(); nneurons];
    for bin in 0..nbins {
        let drive = rng.random_bool(0.2);
        let p = if drive { 0.6 } else { 0.05 };
        for train in spikes.iter_mut() {
            if rng.random_bool(p) {
                train.push(bin as Timestamp * TRES + rng.random_range(0..TRES));
            }
        }
    }

    spikes
        .into_iter()
        .enumerate()
        .fold(Population::new(), |pop, (i, times)| {
            let id = i as NeuronId + 1;
            pop.with_neuron(id, SpikeTrain::new(times))
                .with_position(id, 10.0 * i as f64, 0.0)
        })
}

/// `nneurons` independent neurons firing with probability `p` per bin.
pub fn independent_population(nneurons: usize, nbins: usize, p: f64, seed: u64) -> Population {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    (0..nneurons).fold(Population::new(), |pop, i| {
        let times = (0..nbins)
            .filter(|_| rng.random_bool(p))
            .map(|bin| bin as Timestamp * TRES + TRES / 2)
            .collect();
        pop.with_neuron(i as NeuronId + 1, SpikeTrain::new(times))
    })
}
