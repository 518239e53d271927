use criterion::{criterion_group, criterion_main, Criterion};
use docdex_core::tokenizer::tokenize;

fn bench_tokenize(c: &mut Criterion) {
    let text = "Border Gateway Protocol (BGP) is used for routing between autonomous systems.\n\
                router bgp 65001\n neighbor 192.168.1.2 remote-as 65002\n"
        .repeat(200);
    c.bench_function("tokenize_config_guide", |b| b.iter(|| tokenize(&text)));
}

criterion_group!(benches, bench_tokenize);
criterion_main!(benches);
