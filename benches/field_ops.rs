use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use pmersenne_field::field::FieldElement;
use pmersenne_field::rng::Csprng;

fn bench_field<const D: usize, const N: u32, const C: u64>(c: &mut Criterion, label: &str, seed: [u8; 32]) {
    let mut rng = Csprng::from_seed(seed);
    let a = FieldElement::<D, N, C>::random(&mut rng);
    let b = FieldElement::<D, N, C>::random(&mut rng);

    c.bench_function(&format!("{label} add"), |bench| {
        bench.iter(|| black_box(a).add(&black_box(b)))
    });
    c.bench_function(&format!("{label} mul"), |bench| {
        bench.iter(|| black_box(a).mul(&black_box(b)))
    });
    c.bench_function(&format!("{label} square"), |bench| {
        bench.iter(|| black_box(a).square())
    });
    c.bench_function(&format!("{label} inv"), |bench| {
        bench.iter(|| black_box(a).inv())
    });
    c.bench_function(&format!("{label} normalize"), |bench| {
        bench.iter(|| {
            let mut x = black_box(a);
            x.normalize();
            x
        })
    });
}

pub fn bench_fields(c: &mut Criterion) {
    bench_field::<4, 222, 117>(c, "2^222-117", [1u8; 32]);
    bench_field::<5, 255, 19>(c, "2^255-19", [2u8; 32]);
}

criterion_group!(benches, bench_fields);
criterion_main!(benches);
