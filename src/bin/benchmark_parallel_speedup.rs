//! Resolve one matchup grid sequentially and once in parallel, then print timings and speedup.
//!
//! Usage: cargo run --release --bin benchmark_parallel_speedup [models]

use std::time::Instant;

use mathhammer::combat::{
    plan_matchups, Attacker, Defender, ModifierSet, RerollPolicy, WeaponModifiers, WeaponProfile,
};
use mathhammer::config::EngineConfig;
use mathhammer::parallel::{resolve_batch, resolve_sequential, WorkerPool};

fn weapons() -> Vec<WeaponProfile> {
    let attacks = ["2", "D6", "2D6", "D6+2", "3D3"];
    let damage = ["1", "2", "D3", "D6", "D6+1"];
    let mut weapons = Vec::new();
    for (i, attacks) in attacks.iter().enumerate() {
        for (j, damage) in damage.iter().enumerate() {
            weapons.push(WeaponProfile {
                name: format!("weapon_{i}_{j}"),
                attacks: attacks.to_string(),
                skill: 3,
                strength: 4 + (i as u32),
                armor_penetration: j as u32 % 3,
                damage: damage.to_string(),
                modifiers: WeaponModifiers {
                    sustained_hits: (i % 2) as u32,
                    lethal_hits: j % 2 == 0,
                    devastating_wounds: j == 4,
                    ..WeaponModifiers::default()
                },
            });
        }
    }
    weapons
}

fn defenders() -> Vec<Defender> {
    [(3, 5, None), (4, 3, None), (5, 3, Some(4)), (8, 2, Some(4)), (10, 2, None)]
        .iter()
        .enumerate()
        .map(|(i, &(toughness, save, invulnerable_save))| Defender {
            name: format!("defender_{i}"),
            toughness,
            save,
            invulnerable_save,
        })
        .collect()
}

fn main() {
    let models = std::env::args()
        .nth(1)
        .and_then(|raw| raw.parse::<u32>().ok())
        .unwrap_or(10);

    let attackers = vec![Attacker {
        name: "squad".to_string(),
        models,
        weapons: weapons(),
    }];
    let defenders = defenders();
    let modifiers = ModifierSet {
        reroll_hits: RerollPolicy::Ones,
        ..ModifierSet::default()
    };
    let config = EngineConfig::from_env();

    let matchups = match plan_matchups(&attackers, &defenders) {
        Ok(matchups) => matchups,
        Err(err) => {
            eprintln!("failed to plan matchups: {err}");
            std::process::exit(1);
        }
    };
    let n = matchups.len();
    println!("Resolution: {n} matchups ({models} models per attacker)");
    println!();

    let t0 = Instant::now();
    let results_seq = resolve_sequential(&matchups, &modifiers, &config);
    let elapsed_seq = t0.elapsed();
    let seq_ms = elapsed_seq.as_secs_f64() * 1000.0;
    println!(
        "Sequential:  {:.2} ms  ({:.1} matchups/s)",
        seq_ms,
        n as f64 / elapsed_seq.as_secs_f64()
    );

    let t0 = Instant::now();
    let pool = WorkerPool::with_workers(config.workers);
    let results_par = match resolve_batch(&matchups, &modifiers, &config, &pool) {
        Ok(results) => results,
        Err(err) => {
            eprintln!("parallel resolution failed: {err}");
            std::process::exit(1);
        }
    };
    let elapsed_par = t0.elapsed();
    let par_ms = elapsed_par.as_secs_f64() * 1000.0;
    println!(
        "Parallel:    {:.2} ms  ({:.1} matchups/s)",
        par_ms,
        n as f64 / elapsed_par.as_secs_f64()
    );

    println!();
    println!("Speedup:     {:.2}x faster (parallel vs sequential)", seq_ms / par_ms);

    assert_eq!(results_seq, results_par, "parallel results diverged from sequential");
    println!("(Results match sequential vs parallel)");
}
