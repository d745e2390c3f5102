use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use syscall_core::{compile, execute, parser::tokenizer::tokenize_all, Command};

const FORMAT: &str =
    "show (the) emoticon {name} (for {duration} seconds) in [color, colour] {color}";
const CALL: &str = "show the emoticon 'smile' for 3.2 seconds in colour {name: 'Red'}";

fn commands(count: usize) -> Vec<Command> {
    let mut commands: Vec<Command> = (0..count)
        .map(|i| Command::parse(format!("filler_{}", i), &format!("filler {} {{x}}", i)).unwrap())
        .collect();
    commands.push(Command::parse("show_emoticon", FORMAT).unwrap());
    commands
}

fn bench_compile(c: &mut Criterion) {
    c.bench_function("compile", |b| b.iter(|| compile(black_box(FORMAT)).unwrap()));
}

fn bench_tokenize(c: &mut Criterion) {
    let input = vec![CALL; 16].join("; ");
    c.bench_function("tokenize_16_calls", |b| {
        b.iter(|| tokenize_all(black_box(&input)).unwrap())
    });
}

fn bench_execute(c: &mut Criterion) {
    let mut group = c.benchmark_group("execute");

    for size in [1, 10, 100, 1000] {
        let set = commands(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| execute(black_box(CALL), &set))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compile, bench_tokenize, bench_execute);
criterion_main!(benches);
