// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for label compilation in the rollmark-label crate.

use chrono::NaiveDate;
use criterion::{Criterion, black_box, criterion_group, criterion_main};

use rollmark_core::types::PackagingRecord;
use rollmark_label::compile;

/// Benchmark compiling a fully populated record to a ZPL program.
///
/// This is the per-print hot path: a print request compiles the record
/// fresh every time, so compilation cost lands between the operator's key
/// press and the first byte on the wire.
fn bench_compile_full_record(c: &mut Criterion) {
    let record = PackagingRecord {
        date: "2026-03-14".into(),
        roll_no: "R-1042".into(),
        width: "450".into(),
        film: "23".into(),
        coat_colors: "18".into(),
        style: "Gloss".into(),
        length: "1200".into(),
        net_weight: "10.40".into(),
        core_weight: "2.15".into(),
        gross_weight: String::new(),
        operator: "A. Rao".into(),
    };
    let now = NaiveDate::from_ymd_opt(2026, 3, 14)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap();

    c.bench_function("compile full record", |b| {
        b.iter(|| {
            let doc = compile(black_box(&record), black_box(now));
            black_box(doc.zpl.len());
        });
    });
}

criterion_group!(benches, bench_compile_full_record);
criterion_main!(benches);
