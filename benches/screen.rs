//! Screen benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use vtscreen::core::Screen;
use vtscreen::Terminal;

fn bench_screen_print(c: &mut Criterion) {
    let mut group = c.benchmark_group("screen");

    let text = "Hello, World! ".repeat(100);
    group.throughput(Throughput::Bytes(text.len() as u64));

    group.bench_function("write_rune", |b| {
        b.iter(|| {
            let mut screen = Screen::new(80, 24, 1000);
            for ch in text.chars() {
                screen.write_rune(ch);
            }
            black_box(screen)
        })
    });

    group.finish();
}

fn bench_screen_scroll(c: &mut Criterion) {
    let mut group = c.benchmark_group("screen");

    // Scrolling with history capture
    group.bench_function("scroll", |b| {
        b.iter(|| {
            let mut screen = Screen::new(80, 24, 1000);
            for i in 0..100 {
                for ch in format!("Line {}: Some text content here", i).chars() {
                    screen.write_rune(ch);
                }
                screen.carriage_return();
                screen.line_feed();
            }
            black_box(screen)
        })
    });

    // Scrolling inside a region, as a pager or editor does
    group.bench_function("scroll_region", |b| {
        let mut screen = Screen::new(80, 24, 0);
        screen.set_scroll_region(2, 21);
        b.iter(|| {
            screen.scroll_up(black_box(1));
            screen.scroll_down(black_box(1));
        })
    });

    group.finish();
}

fn bench_screen_resize(c: &mut Criterion) {
    let mut group = c.benchmark_group("screen");

    group.bench_function("resize", |b| {
        b.iter(|| {
            let mut screen = Screen::new(80, 24, 1000);
            for ch in "Hello, World!".repeat(100).chars() {
                screen.write_rune(ch);
            }
            screen.resize(120, 40);
            screen.resize(80, 24);
            screen.resize(132, 50);
            black_box(screen)
        })
    });

    group.finish();
}

fn bench_terminal_full_redraw(c: &mut Criterion) {
    let mut group = c.benchmark_group("screen");

    // A full repaint, as when an editor opens
    let mut input = String::new();
    for row in 1..=24 {
        input.push_str(&format!("\x1b[{};1H\x1b[3{}m", row, row % 8));
        input.push_str(&"X".repeat(80));
    }
    group.throughput(Throughput::Bytes(input.len() as u64));

    group.bench_function("full_redraw", |b| {
        let mut term = Terminal::new(80, 24);
        b.iter(|| term.parse(black_box(input.as_bytes())))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_screen_print,
    bench_screen_scroll,
    bench_screen_resize,
    bench_terminal_full_redraw
);

criterion_main!(benches);
