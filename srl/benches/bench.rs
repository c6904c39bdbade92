use criterion::{Criterion, black_box, criterion_group, criterion_main};
use srl::{Builder, compile, parse};

const EMAIL_QUERY: &str = r#"begin with, any of (digit, letter, one of "._%+-") once or more,
    literally "@", any of (digit, letter, one of ".-") once or more,
    literally ".", letter at least 2 times, must end, case insensitive"#;

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_email_query", |b| {
        b.iter(|| black_box(parse(black_box(EMAIL_QUERY))))
    });
}

fn bench_chain(c: &mut Criterion) {
    c.bench_function("chain_phone_number", |b| {
        b.iter(|| {
            let mut query = Builder::new();
            query
                .literally("+")
                .digit()
                .between(1, 3)
                .literally(" ")
                .digit()
                .between(3, 4)
                .literally("-")
                .digit()
                .once_or_more()
                .must_end();
            black_box(query.get())
        })
    });
}

fn bench_compile(c: &mut Criterion) {
    c.bench_function("compile_email_query", |b| {
        b.iter(|| black_box(compile(black_box(EMAIL_QUERY))))
    });
}

fn bench_matching(c: &mut Criterion) {
    let pattern = compile(EMAIL_QUERY).unwrap();

    c.bench_function("email_match", |b| {
        b.iter(|| black_box(pattern.matches(black_box("super-He4vy.add+ress@top-Le.ve1.domains"))))
    });
}

fn bench_find_all(c: &mut Criterion) {
    let pattern = compile("digit once or more").unwrap();
    let input = "abc 123 def 456 ghi 789 jkl 012 mno 345 pqr 678 stu 901";

    c.bench_function("find_all_numbers", |b| {
        b.iter(|| black_box(pattern.find_all(black_box(input))))
    });
}

fn bench_substitute(c: &mut Criterion) {
    let pattern = compile(
        r#"capture (any character once or more), whitespace,
           capture (digit once or more), literally ", ", capture (digit once or more)"#,
    )
    .unwrap();

    c.bench_function("substitute_date", |b| {
        b.iter(|| black_box(pattern.substitute(r"\1 1, \3", black_box("April 15, 2003"))))
    });
}

criterion_group!(
    benches,
    bench_parse,
    bench_chain,
    bench_compile,
    bench_matching,
    bench_find_all,
    bench_substitute
);
criterion_main!(benches);
