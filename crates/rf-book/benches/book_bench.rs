//! Book append and filter benchmarks

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rf_book::{Book, EventFilter, EventKind, SymbolView, Verbosity};

fn reveal() -> EventKind {
    EventKind::Reveal {
        board: (0..5)
            .map(|_| (0..3).map(|_| SymbolView::named("L1")).collect())
            .collect(),
        game_type: "baseGame".into(),
        anticipation: vec![0; 5],
        padding_positions: None,
    }
}

fn bench_append(c: &mut Criterion) {
    let mut book = Book::new(1, "basegame");

    c.bench_function("book_append_round", |b| {
        b.iter(|| {
            book.reset(1, "basegame");
            for i in 0..10u32 {
                book.add_event(black_box(reveal())).ok();
                book.add_event(EventKind::UpdateFreeSpins { amount: i, total: 10 }).ok();
                book.add_event(EventKind::SetTotalWin { amount: 100 }).ok();
            }
        })
    });
}

fn bench_filter(c: &mut Criterion) {
    let mut book = Book::new(1, "basegame");
    for i in 0..100u32 {
        book.add_event(reveal()).ok();
        book.add_event(EventKind::UpdateFreeSpins { amount: i, total: 100 }).ok();
        book.add_event(EventKind::SetWin { amount: 10, win_level: 2 }).ok();
    }
    let filter = EventFilter {
        verbosity: Verbosity::Standard,
        ..Default::default()
    };

    c.bench_function("filter_300_events", |b| {
        b.iter(|| filter.filter_events(black_box(&book.events)))
    });
}

criterion_group!(benches, bench_append, bench_filter);
criterion_main!(benches);
