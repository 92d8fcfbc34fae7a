use std::hint::black_box;
use std::time::Duration;

use alloy::primitives::Address;
use bigdecimal::BigDecimal;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use sailroute::route::finder::{direct_routes, indirect_routes, intermediary_tokens};
use sailroute::route::{encode_path, PoolRef, TokenRef};
use sailroute::utils::constants::FEE_TIERS;

fn generate_random_address() -> Address {
    let mut bytes = [0u8; 20];
    fastrand::fill(&mut bytes);
    Address::from(bytes)
}

fn generate_tokens(token_count: usize) -> Vec<TokenRef> {
    (0..token_count)
        .map(|i| {
            let symbol = format!("TKN{i}");
            TokenRef::new(generate_random_address(), &symbol, &symbol, 18)
        })
        .collect()
}

fn generate_pool(token0: &TokenRef, token1: &TokenRef) -> PoolRef {
    PoolRef {
        id: generate_random_address(),
        token0: token0.clone(),
        token1: token1.clone(),
        fee_tier: FEE_TIERS[fastrand::usize(..FEE_TIERS.len())],
        // Roughly one in ten pools is drained
        liquidity: if fastrand::u8(..10) == 0 { 0 } else { fastrand::u128(1..u128::from(u64::MAX)) },
        token0_price: Some(BigDecimal::from(fastrand::u32(1..10_000))),
        token1_price: Some(BigDecimal::from(fastrand::u32(1..10_000))),
        total_value_locked_usd: BigDecimal::from(fastrand::u64(..1_000_000_000)),
    }
}

/// Pools pairing `token_in` and `token_out` each with random tokens from `tokens`,
/// the shape the index returns for the two sides of an indirect search.
fn generate_benchmark_pools(
    pool_count: usize,
    token_in: &TokenRef,
    token_out: &TokenRef,
    tokens: &[TokenRef],
) -> (Vec<PoolRef>, Vec<PoolRef>) {
    let side = |anchor: &TokenRef| {
        (0..pool_count)
            .map(|_| generate_pool(anchor, &tokens[fastrand::usize(..tokens.len())]))
            .collect::<Vec<_>>()
    };
    (side(token_in), side(token_out))
}

fn bench_direct_routes(c: &mut Criterion) {
    let mut group = c.benchmark_group("direct_routes");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(5));

    let tokens = generate_tokens(2);
    for pool_count in [4_usize, 16, 64] {
        let pools: Vec<PoolRef> = (0..pool_count)
            .map(|_| generate_pool(&tokens[0], &tokens[1]))
            .collect();

        group.throughput(criterion::Throughput::Elements(pool_count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(pool_count), &pools, |b, pools| {
            b.iter_batched(
                || pools.clone(),
                |p| black_box(direct_routes(p)),
                criterion::BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_indirect_routes(c: &mut Criterion) {
    let mut group = c.benchmark_group("indirect_routes");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(5));

    for pool_count in [100_usize, 500, 1000] {
        // A token universe a fifth the size of each side keeps the overlap realistic
        let tokens = generate_tokens((pool_count / 5).max(10));
        let endpoints = generate_tokens(2);
        let (pools0, pools1) =
            generate_benchmark_pools(pool_count, &endpoints[0], &endpoints[1], &tokens);

        group.throughput(criterion::Throughput::Elements(pool_count as u64 * 2));
        group.bench_with_input(
            BenchmarkId::from_parameter(pool_count),
            &(pools0, pools1),
            |b, (pools0, pools1)| {
                b.iter(|| {
                    let intermediaries = intermediary_tokens(pools0, pools1);
                    black_box(indirect_routes(pools0, pools1, &intermediaries))
                });
            },
        );
    }
    group.finish();
}

fn bench_encode_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_path");

    for hops in [1_usize, 2, 4] {
        let tokens: Vec<Address> = (0..=hops).map(|_| generate_random_address()).collect();
        let fees: Vec<u32> = (0..hops)
            .map(|_| FEE_TIERS[fastrand::usize(..FEE_TIERS.len())])
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(hops), &(tokens, fees), |b, (t, f)| {
            b.iter(|| black_box(encode_path(t, f)));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_direct_routes,
    bench_indirect_routes,
    bench_encode_path
);
criterion_main!(benches);
