//! Randomised sweeps over ring arithmetic and spin landing

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use rp_reel::{
    MachineController, POSITION_EPSILON, Reel, SpinRequest, SpinScheduler, SpinTarget, SymbolRing,
};

fn ring_of_len(n: usize) -> SymbolRing {
    SymbolRing::new((0..n).map(|i| char::from_u32(0x100 + i as u32).unwrap())).unwrap()
}

#[test]
fn distance_forward_round_trips_for_every_pair() {
    for n in 1..=30 {
        let ring = ring_of_len(n);
        for a in 0..n {
            assert_eq!(ring.distance_forward(a as f64, a), 0.0);
            for b in 0..n {
                let d = ring.distance_forward(a as f64, b);
                assert!((0.0..n as f64).contains(&d), "n={n} a={a} b={b} d={d}");
                assert_eq!(d.fract(), 0.0);
                assert_eq!(ring.normalize(a as f64 + d), b as f64);
            }
        }
    }
}

#[test]
fn scheduled_total_lands_on_target() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let ring = Arc::new(SymbolRing::alphabet_with('#').unwrap());
    let n = ring.len();

    for _ in 0..2_000 {
        let mut reel = Reel::new(Arc::clone(&ring), 0);
        reel.advance(rng.random::<f64>() * 100.0);

        let scheduler = SpinScheduler::new(rng.random_range(0.5..20.0)).unwrap();
        let target = rng.random_range(0..n);
        let duration = rng.random_range(0.0..12.0);
        let request = SpinRequest::default().with_reel(ring.symbols()[target], duration);

        let plan = scheduler.schedule(std::slice::from_ref(&reel), &request).unwrap();
        let landing = ring.normalize(reel.position() + plan[0].total_distance);
        let error = (landing - target as f64).abs().min(n as f64 - (landing - target as f64).abs());
        assert!(error < 1e-6, "landing {landing} target {target}");
        assert!(plan[0].extra_distance >= 0.0 && plan[0].extra_distance < n as f64);
    }
}

#[test]
fn machine_finishes_exactly_under_variable_frames() {
    let mut rng = StdRng::seed_from_u64(42);
    let letters = Arc::new(SymbolRing::alphabet());

    for _ in 0..200 {
        let mut machine = MachineController::new(SpinScheduler::new(9.0).unwrap());
        for _ in 0..5 {
            machine.add_reel(Arc::clone(&letters));
        }

        let targets: Vec<SpinTarget> = (0..5)
            .map(|_| SpinTarget::Fraction(rng.random::<f64>()))
            .collect();
        let durations: Vec<f64> = (0..5).map(|_| rng.random_range(0.0..6.0)).collect();
        let plan = machine
            .spin_to(&SpinRequest::new(targets, durations))
            .unwrap();

        let mut completions = 0;
        let mut guard = 0;
        loop {
            // jittery frame times, occasionally a very long stall
            let elapsed = if rng.random_bool(0.02) {
                rng.random_range(0.5..3.0)
            } else {
                rng.random_range(0.001..0.03)
            };
            let report = machine.tick(elapsed);
            assert!(machine.remaining().iter().all(|&r| r >= 0.0));
            if report.is_completed() {
                completions += 1;
            }
            if !machine.is_spinning() {
                break;
            }
            guard += 1;
            assert!(guard < 100_000);
        }
        assert_eq!(completions, 1);

        for (reel, entry) in machine.reels().iter().zip(&plan) {
            assert!((reel.position() - entry.target_index as f64).abs() < POSITION_EPSILON);
            assert_eq!(reel.current_display_index(), entry.target_index);
        }
    }
}
