//! tstab Benchmark Suite
//!
//! Performance targets:
//!   rule_chain_single_evaluation ....... < 1μs
//!   resolved_empty_tick ................ < 100ns
//!   full_frame_200_players ............. < 0.5ms

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tstab_core::collaborators::RoomTopology;
use tstab_core::rules::RuleEvaluator;
use tstab_core::types::{BlockPos, EntityId};
use tstab_core::{TemporalStabilityBehavior, TickContext, TraitSet, TstabConfig};
use tstab_host::bridge::{ClassCatalog, GridWorld, StatSheet};
use tstab_host::components::StabilityComponent;
use tstab_host::config::HostConfig;
use tstab_host::systems::StabilitySystem;

const CLASSES: &str = r#"[
    {"code": "miner", "traits": ["shelteredstone", "agoraphobia"]},
    {"code": "delver", "traits": ["claustrophobicblessed"]},
    {"code": "hermit", "traits": ["agoraphobia"]},
    {"code": "tailor", "traits": ["silvertongue"]}
]"#;

/// A 32×32 surface slice with random sun levels and scattered rooms.
fn random_world(rng: &mut StdRng) -> GridWorld {
    let mut world = GridWorld::new();
    for x in 0..32 {
        for z in 0..32 {
            let pos = BlockPos::new(x, 64, z);
            world.set_light(pos, rng.gen_range(0..=20), rng.gen_range(0..=15));
            if rng.gen_bool(0.3) {
                world.set_room(
                    pos,
                    RoomTopology::new(rng.gen_range(0..3), rng.gen_range(0..6), rng.gen_range(0..12)),
                );
            }
        }
    }
    world
}

/// Benchmark: one pass of the rule chain with every trait set.
fn bench_rule_chain(c: &mut Criterion) {
    let evaluator = RuleEvaluator::default();
    let mut world = GridWorld::new();
    world.set_light(BlockPos::new(0, 64, 0), 15, 0);
    let stats = StatSheet::with_defaults();

    c.bench_function("rule_chain_single_evaluation", |b| {
        b.iter(|| {
            let mut velocity = -0.01;
            let eval = evaluator.evaluate(
                black_box(TraitSet::all()),
                &mut velocity,
                black_box(BlockPos::new(0, 64, 0)),
                &world,
                &stats,
            );
            black_box(eval.ok());
        });
    });
}

/// Benchmark: the fast path for a class with no stability traits.
fn bench_resolved_empty(c: &mut Criterion) {
    let classes = ClassCatalog::from_json(CLASSES).expect("catalog");
    let world = GridWorld::new();
    let stats = StatSheet::with_defaults();
    let mut behavior = TemporalStabilityBehavior::new(EntityId::new(), &TstabConfig::default());
    let mut velocity = 0.0;

    // Resolve first: 25 ticks at 20 Hz passes the 1s throttle.
    for _ in 0..25 {
        let mut ctx = TickContext {
            class_code: Some("tailor"),
            position: BlockPos::default(),
            velocity: &mut velocity,
            classes: &classes,
            environment: &world,
            stats: &stats,
        };
        behavior.on_tick(0.05, &mut ctx).expect("tick");
    }

    c.bench_function("resolved_empty_tick", |b| {
        b.iter(|| {
            let mut ctx = TickContext {
                class_code: Some("tailor"),
                position: BlockPos::default(),
                velocity: &mut velocity,
                classes: &classes,
                environment: &world,
                stats: &stats,
            };
            black_box(behavior.on_tick(black_box(0.05), &mut ctx).ok());
        });
    });
}

/// Benchmark: full frame with 200 resolved players (target: < 0.5ms).
fn bench_full_frame(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0x7_57AB);
    let world = random_world(&mut rng);
    let classes = ClassCatalog::from_json(CLASSES).expect("catalog");
    let system = StabilitySystem::new(HostConfig::default());
    let codes = ["miner", "delver", "hermit", "tailor"];

    let mut players: Vec<StabilityComponent> = (0..200)
        .map(|_| {
            let class = codes[rng.gen_range(0..codes.len())];
            let mut p = StabilityComponent::new_player(EntityId::new(), &system.config().core)
                .with_class(class);
            p.position = BlockPos::new(rng.gen_range(0..32), 64, rng.gen_range(0..32));
            p.velocity = rng.gen_range(-0.1..0.1);
            p
        })
        .collect();

    for _ in 0..25 {
        system.tick_all(&mut players, 0.05, &classes, &world);
    }

    c.bench_function("full_frame_200_players", |b| {
        b.iter(|| {
            let summary = system.tick_all(black_box(&mut players), 0.05, &classes, &world);
            black_box(summary);
        });
    });
}

criterion_group!(benches, bench_rule_chain, bench_resolved_empty, bench_full_frame,);
criterion_main!(benches);
