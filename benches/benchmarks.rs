// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use issue_insight::{
    IssueFilter, IssueRecord, IssueTable, RecordingPlotter, analyze, average_close_time,
    average_close_time_by_label, filter_issues, label_distribution, monthly_counts, parse_records,
};

const LABELS: [&str; 5] = ["kind/bug", "status/triage", "area/docs", "ci", "feature"];

fn generate_records(count: usize,) -> Vec<IssueRecord,>
{
    (0..count)
        .map(|i| {
            let day = i % 28 + 1;
            let month = i % 12 + 1;
            let record = IssueRecord::new(format!("user{}", i % 17), format!("2024-{month:02}-{day:02}"),)
                .with_labels([LABELS[i % LABELS.len()], LABELS[(i + 2) % LABELS.len()],],);
            if i % 3 == 0 {
                record
            } else {
                record.with_closed_at(format!("2025-{month:02}-{day:02}T12:00:00Z"),)
            }
        },)
        .collect()
}

fn generate_table(count: usize,) -> IssueTable
{
    IssueTable::from_records(generate_records(count,),).expect("valid table",)
}

fn benchmark_table_construction(c: &mut Criterion,)
{
    let records = generate_records(1_000,);

    c.bench_function("from_records_1000", |b| {
        b.iter(|| IssueTable::from_records(black_box(records.clone(),),).expect("valid table",),)
    },);
}

fn benchmark_json_decoding(c: &mut Criterion,)
{
    let json = serde_json::to_string(&generate_records(1_000,),).expect("serializable records",);

    c.bench_function("parse_records_1000", |b| {
        b.iter(|| parse_records(black_box(&json,),).expect("parse failed",),)
    },);
}

fn benchmark_filtering(c: &mut Criterion,)
{
    let table = generate_table(5_000,);
    let by_label = IssueFilter::new().label("status/triage",);
    let by_both = IssueFilter::new().creator("user3",).label("kind/bug",);

    c.bench_function("filter_label_5000", |b| {
        b.iter(|| black_box(filter_issues(&table, black_box(&by_label,),).len(),),)
    },);
    c.bench_function("filter_creator_and_label_5000", |b| {
        b.iter(|| black_box(filter_issues(&table, black_box(&by_both,),).len(),),)
    },);
}

fn benchmark_metrics(c: &mut Criterion,)
{
    let table = generate_table(5_000,);

    c.bench_function("average_close_time_5000", |b| {
        b.iter(|| black_box(average_close_time(black_box(&table,),),),)
    },);
    c.bench_function("average_close_time_by_label_5000", |b| {
        b.iter(|| black_box(average_close_time_by_label(black_box(&table,),),),)
    },);
    c.bench_function("label_distribution_5000", |b| {
        b.iter(|| black_box(label_distribution(black_box(&table,),),),)
    },);
    c.bench_function("monthly_counts_5000", |b| {
        b.iter(|| black_box(monthly_counts(black_box(&table,),),),)
    },);
}

fn benchmark_full_analysis(c: &mut Criterion,)
{
    let table = generate_table(5_000,);

    c.bench_function("analyze_5000", |b| {
        b.iter(|| {
            let mut plotter = RecordingPlotter::new();
            let report = analyze(&table, &table, &mut plotter,).expect("analysis failed",);
            black_box(report.lines.len(),)
        },)
    },);
}

criterion_group!(
    benches,
    benchmark_table_construction,
    benchmark_json_decoding,
    benchmark_filtering,
    benchmark_metrics,
    benchmark_full_analysis
);
criterion_main!(benches);
