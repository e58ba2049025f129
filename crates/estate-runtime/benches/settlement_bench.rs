use criterion::{criterion_group, criterion_main, Criterion};
use estate_core::{SeededRandom, SimConfig};
use estate_market::PropertyGenerator;
use estate_runtime::Simulation;
use rust_decimal::Decimal;

fn bench_settlement(c: &mut Criterion) {
    let mut cfg = SimConfig::default();
    cfg.starting_wallet = Decimal::new(10_000_000, 0);
    let mut sim = Simulation::from_config(&cfg);
    let ids = sim
        .populate(
            &PropertyGenerator::from_config(&cfg),
            &cfg.zones,
            &mut SeededRandom::new(cfg.rng_seed),
        )
        .unwrap();
    for id in ids.iter().step_by(2) {
        let p = sim.portfolio().property(*id).unwrap();
        let (price, down) = (p.list_price(), p.minimum_down_payment);
        sim.purchase(*id, price, down).unwrap();
    }
    c.bench_function("settle_period", |b| {
        b.iter(|| {
            let _ = sim.advance_period();
        })
    });
}

criterion_group!(benches, bench_settlement);
criterion_main!(benches);
