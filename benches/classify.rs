use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ndarray::Array1;

use sat_relax::core::classify::{Classifier, Mode};
use sat_relax::core::cnf::Cnf;
use sat_relax::core::encoder::{encode, DEFAULT_ENCODER_OPTIONS};
use sat_relax::core::options::DEFAULT_OPTIONS;

const EQUIVALENCE: &str = "(a|!b)&(!a|b)";
const ALL_PAIRS: &str = "(a|b)&(!a|!b)&(a|!b)&(!a|b)";
const CHAIN: &str = "(a|b|!c)&(a|!b|c)&(b|a|!c)&(c)&(!b)&(a2|b2|!c2)&(!a2|b2|!c2)&(b2|a2|!c2)&(c2)&(!b2)";

fn my_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("Classifier");
    let classifier = Classifier::new(DEFAULT_OPTIONS);
    for (name, text) in [("equivalence", EQUIVALENCE), ("all-pairs", ALL_PAIRS), ("chain", CHAIN)] {
        let cnf = Cnf::parse(text).unwrap();
        group.bench_with_input(name, &cnf, |b, cnf| {
            b.iter(|| classifier.classify_cnf(black_box(cnf), Mode::FindModel))
        });
    }
    group.finish();

    let cnf = Cnf::parse(CHAIN).unwrap();
    let (objective, index) = encode(&cnf, &DEFAULT_ENCODER_OPTIONS);
    let x = Array1::from_elem(index.len(), 0.5);
    c.bench_function("Relaxation eval", |b| b.iter(|| objective.eval(black_box(x.view()))));
}

criterion_group!(benches, my_benches);
criterion_main!(benches);
