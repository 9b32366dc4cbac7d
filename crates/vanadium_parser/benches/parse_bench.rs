//! Parser throughput benchmarks.
//!
//! Run with: cargo bench -p vanadium_parser

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vanadium_parser::parse;

const SOURCE: &str = r#"
module Bench {
    import from Types all;
    type component Main { var integer counter; timer t; }
    type record Msg { integer id, charstring payload optional }
    template Msg t_msg(integer p_id) := { id := p_id, payload := omit }
    function f_step(inout integer x) runs on Main return integer {
        for (var integer i := 0; i < 10; i := i + 1) { x := x + i * 2; }
        return x;
    }
    testcase tc_main() runs on Main {
        counter := f_step(counter);
        if (counter > 100) { setverdict(pass) } else { setverdict(fail) }
    }
    control { execute(tc_main()); }
}
"#;

fn bench_parse(c: &mut Criterion) {
    let big: String = (0..50).map(|i| SOURCE.replace("Bench", &format!("Bench{i}"))).collect();
    c.bench_function("parse_module", |b| b.iter(|| parse(black_box(SOURCE))));
    c.bench_function("parse_50_modules", |b| b.iter(|| parse(black_box(&big))));
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
