//! Benchmarks for statement construction.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use terrane_query::prelude::*;

fn select_statement() -> SelectStatement {
    let index = TableDescriptor::new("SpatialIndex", "idx");
    let mut builder = SelectStatementBuilder::new(index).unwrap();
    builder.select_property(Some("idx"), "Id");
    builder.select_property(Some("idx"), "Name");
    builder.select_spatial(Some("idx"), "Footprint");
    builder
        .comparison(
            Some("idx"),
            "Source",
            CompareOp::In,
            "USGS,NOAA,Esri".into(),
            SqlParamType::NVarChar,
        )
        .unwrap();
    builder.add_order_by(Some("idx"), "Name", SortOrder::Asc);
    builder.build().unwrap()
}

fn bench_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("select");

    group.bench_function("standard_with_in_and_spatial", |b| {
        b.iter(|| black_box(select_statement()))
    });

    group.bench_function("paged_rewrite", |b| {
        b.iter(|| {
            let index = TableDescriptor::new("SpatialIndex", "idx");
            let mut builder = SelectStatementBuilder::paged(index, 26, 50).unwrap();
            builder.select_property(Some("idx"), "Id");
            builder.select_property(Some("idx"), "Name");
            builder.add_order_by(Some("idx"), "Name", SortOrder::Asc);
            black_box(builder.build().unwrap())
        })
    });

    group.finish();
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");

    group.bench_function("hundred_row_insert", |b| {
        b.iter(|| {
            let mut builder = InsertStatementBuilder::new();
            builder.set_table("SpatialIndex");
            builder.add_column("Id", SqlParamType::BigInt).unwrap();
            builder.add_column("Name", SqlParamType::NVarChar).unwrap();
            builder.end_columns().unwrap();
            for i in 0..100i64 {
                let mut row = Row::new();
                row.insert("Id".into(), i.into());
                row.insert("Name".into(), format!("quad-{}", i).into());
                builder.add_row(&row, None).unwrap();
            }
            black_box(builder.build().unwrap())
        })
    });

    group.finish();
}

fn bench_where_clause(c: &mut Criterion) {
    let mut group = c.benchmark_group("where_clause");

    group.bench_function("in_list_expansion", |b| {
        b.iter(|| {
            let mut params = ParameterMap::new();
            let mut clause = WhereClause::new();
            clause
                .comparison(
                    &mut params,
                    Some("idx"),
                    "Source",
                    CompareOp::In,
                    "A,B,C,D,E,F,G,H".into(),
                    SqlParamType::NVarChar,
                )
                .unwrap();
            black_box(clause.render())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_select, bench_insert, bench_where_clause);
criterion_main!(benches);
