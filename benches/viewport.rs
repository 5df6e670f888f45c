//! Benchmarks for viewport computation and frame composition.
//!
//! Run with: cargo bench
//!
//! Results are saved to `target/criterion/` with HTML reports.
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::collections::HashMap;
use std::rc::Rc;

use gridview::config::{DefaultColumnOptions, RowHeight};
use gridview::layout::{compute_viewport, resolve_columns, RowOffsets, ScrollMetrics, ViewportOptions};
use gridview::{Column, ColumnWidth, DataGrid, GridConfig, JsonRow};

const COLUMNS: usize = 50;

fn columns() -> Vec<Column<JsonRow>> {
    (0..COLUMNS)
        .map(|i| {
            let column = Column::new(format!("c{i}"), format!("Column {i}"))
                .with_width(ColumnWidth::Px(80.0 + (i % 5) as f32 * 20.0));
            if i < 2 {
                column.frozen()
            } else {
                column
            }
        })
        .collect()
}

fn rows(n: usize) -> Vec<JsonRow> {
    (0..n)
        .map(|r| {
            (0..COLUMNS)
                .map(|c| (format!("c{c}"), serde_json::json!(r * COLUMNS + c)))
                .collect()
        })
        .collect()
}

/// Viewport lookup at several scroll depths, uniform and variable heights
fn bench_compute_viewport(c: &mut Criterion) {
    let count = 100_000;
    let columns: Vec<_> = columns().into_iter().map(Rc::new).collect();
    let layout = resolve_columns(&columns, 1200.0, &DefaultColumnOptions::default(), &HashMap::new())
        .expect("valid columns");

    let uniform = RowOffsets::uniform(35.0, count);
    let variable = RowOffsets::from_heights((0..count).map(|i| 24.0 + (i % 7) as f32 * 6.0));

    let mut group = c.benchmark_group("compute_viewport");
    for (name, offsets) in [("uniform", &uniform), ("variable", &variable)] {
        for depth in [0.0_f32, 0.5, 0.99] {
            let metrics = ScrollMetrics::new(
                offsets.total_height() * depth,
                layout.total_width * depth / 2.0,
                1200.0,
                800.0,
            );
            group.bench_with_input(
                BenchmarkId::new(name, format!("{depth}")),
                &metrics,
                |b, metrics| {
                    b.iter(|| {
                        compute_viewport(
                            black_box(metrics),
                            offsets,
                            &layout,
                            ViewportOptions::default(),
                        )
                    });
                },
            );
        }
    }
    group.finish();
}

/// Building the offset table for per-row heights
fn bench_row_offsets(c: &mut Criterion) {
    let mut group = c.benchmark_group("row_offsets");
    for count in [1_000_usize, 100_000] {
        let rows: Vec<usize> = (0..count).collect();
        let height: RowHeight<usize> = RowHeight::PerRow(Rc::new(|_: &usize, i: usize| 24.0 + (i % 3) as f32 * 8.0));
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &rows, |b, rows| {
            b.iter(|| RowOffsets::compute(black_box(rows), &height));
        });
    }
    group.finish();
}

/// Full frame composition for a scrolled grid
fn bench_render(c: &mut Criterion) {
    let mut grid: DataGrid<JsonRow> =
        DataGrid::new(columns(), GridConfig::default()).expect("valid grid");
    grid.set_rows(rows(10_000));
    grid.resize(1200.0, 800.0);
    grid.handle_scroll(120_000.0, 600.0);

    c.bench_function("render_frame", |b| b.iter(|| black_box(grid.render())));
}

criterion_group!(benches, bench_compute_viewport, bench_row_offsets, bench_render);

criterion_main!(benches);
