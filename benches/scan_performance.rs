//! Performance benchmarks for ledger scans

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use course_ledger::store::book::RatingBook;
use course_ledger::store::ledger::{InMemoryLedger, RatingLedger};
use course_ledger::types::Rating;
use std::sync::Arc;

const RECORDS: usize = 10_000;
const COURSES: usize = 100;

fn create_populated_book() -> RatingBook {
    let ledger = Arc::new(InMemoryLedger::new("r"));

    // Seed the ledger directly; distinct senders need no scan-for-update
    for i in 0..RECORDS {
        let sender = format!("user-{}.test", i);
        let course = format!("course-{}", i % COURSES);
        ledger
            .push(Rating::new(sender, course, (i % 5) as f64, ""))
            .expect("Failed to seed rating");
    }

    RatingBook::new(ledger)
}

fn bench_add_rating_update_scan(c: &mut Criterion) {
    let book = create_populated_book();

    // Updating the last-inserted pair forces a full scan
    let sender = format!("user-{}.test", RECORDS - 1);
    let course = format!("course-{}", (RECORDS - 1) % COURSES);

    c.bench_function("add_rating_update_full_scan", |b| {
        b.iter(|| {
            book.add_rating(black_box(&sender), black_box(&course), 5.0, "updated")
                .unwrap()
        })
    });
}

fn bench_average_rating(c: &mut Criterion) {
    let book = create_populated_book();

    c.bench_function("average_rating_scan", |b| {
        b.iter(|| book.average_rating(black_box("course-7")).unwrap())
    });
}

fn bench_has_user_rated_miss(c: &mut Criterion) {
    let book = create_populated_book();

    c.bench_function("has_user_rated_miss_scan", |b| {
        b.iter(|| {
            book.has_user_rated(black_box("course-7"), black_box("nobody.test"))
                .unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_add_rating_update_scan,
    bench_average_rating,
    bench_has_user_rated_miss
);
criterion_main!(benches);
