use std::sync::Arc;

use arrow::{
    array::{Int64Array, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use coldb::{Constraint, FilterOp, Order, RowMap, ScalarValueRef, Table, TableOptions};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

const NAMES: [&str; 8] = [
    "main", "render", "draw", "idle", "io", "gc", "layout", "paint",
];

fn build_table(rows: usize) -> Table {
    let mut rng = fastrand::Rng::with_seed(rows as u64);
    let ts: Vec<i64> = (0..rows as i64).map(|row| row * 10).collect();
    let dur: Vec<Option<i64>> = (0..rows)
        .map(|_| (rng.u8(0..10) > 0).then(|| rng.i64(0..1_000)))
        .collect();
    let name: Vec<&str> = (0..rows).map(|_| NAMES[rng.usize(0..NAMES.len())]).collect();

    let schema = Schema::new(vec![
        Field::new("ts", DataType::Int64, false),
        Field::new("dur", DataType::Int64, true),
        Field::new("name", DataType::Utf8, false),
    ]);
    let batch = RecordBatch::try_new(
        Arc::new(schema),
        vec![
            Arc::new(Int64Array::from(ts)),
            Arc::new(Int64Array::from(dur)),
            Arc::new(StringArray::from(name)),
        ],
    )
    .unwrap();
    Table::from_record_batch(
        "slice",
        &batch,
        TableOptions::default().sorted_columns(["ts"]),
    )
    .unwrap()
}

fn filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");

    for rows in [1 << 10, 1 << 16] {
        let table = build_table(rows);
        let ts = table.column("ts").unwrap();
        let dur = table.column("dur").unwrap();
        let name = table.column("name").unwrap();

        group.bench_with_input(BenchmarkId::new("sorted_range", rows), &rows, |b, _| {
            b.iter(|| {
                let mut rm = RowMap::all(table.row_count());
                ts.filter_into(FilterOp::GreaterOrEqual, ScalarValueRef::Int64(5_000), &mut rm);
                rm
            })
        });
        group.bench_with_input(BenchmarkId::new("nullable_scan", rows), &rows, |b, _| {
            b.iter(|| {
                let mut rm = RowMap::all(table.row_count());
                dur.filter_into(FilterOp::LessThan, ScalarValueRef::Float64(250.5), &mut rm);
                rm
            })
        });
        group.bench_with_input(BenchmarkId::new("string_scan", rows), &rows, |b, _| {
            b.iter(|| {
                let mut rm = RowMap::all(table.row_count());
                name.filter_into(FilterOp::Equal, ScalarValueRef::Utf8("draw"), &mut rm);
                rm
            })
        });
        group.bench_with_input(BenchmarkId::new("table", rows), &rows, |b, _| {
            b.iter(|| {
                table
                    .filter(&[
                        Constraint::is_not_null("dur"),
                        Constraint::new("name", FilterOp::NotEqual, "idle"),
                    ])
                    .unwrap()
            })
        });
    }

    group.finish();
}

fn sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort");

    for rows in [1 << 10, 1 << 16] {
        let table = build_table(rows);
        let dur = table.column("dur").unwrap();

        group.bench_with_input(BenchmarkId::new("nullable_desc", rows), &rows, |b, _| {
            b.iter(|| {
                let mut out: Vec<u32> = (0..table.row_count()).collect();
                dur.stable_sort(true, &mut out);
                out
            })
        });
        group.bench_with_input(BenchmarkId::new("table_two_keys", rows), &rows, |b, _| {
            b.iter(|| {
                table
                    .sort(&[Order::asc("name"), Order::desc("dur")])
                    .unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, filter, sort);
criterion_main!(benches);
