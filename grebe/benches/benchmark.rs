use criterion::{black_box, criterion_group, criterion_main, Criterion};
use grebe::grammar::Grammar;
use grebe::token::Token;
use grebe::{lexer, meta};
use lazy_static::lazy_static;

const META_GRAMMAR: &str = include_str!("../tests/test_files/meta.gram");
const EXPR_GRAMMAR: &str = include_str!("../tests/test_files/expr.gram");

lazy_static! {
    static ref META_TOKENS: Vec<Token> = lexer::tokenize(META_GRAMMAR).unwrap();
    static ref META_PARSER: Grammar = {
        let tree = meta::parse_source(META_GRAMMAR).unwrap();
        Grammar::compile(&tree).unwrap().grammar
    };
}

pub fn compile_grammar(c: &mut Criterion) {
    let meta_tree = meta::parse_source(META_GRAMMAR).unwrap();
    c.bench_function("compile meta-grammar", |b| {
        b.iter(|| Grammar::compile(black_box(&meta_tree)).unwrap())
    });

    let expr_tree = meta::parse_source(EXPR_GRAMMAR).unwrap();
    c.bench_function("compile expression grammar", |b| {
        b.iter(|| Grammar::compile(black_box(&expr_tree)).unwrap())
    });
}

pub fn front_end(c: &mut Criterion) {
    c.bench_function("tokenize meta-grammar", |b| {
        b.iter(|| lexer::tokenize(black_box(META_GRAMMAR)).unwrap())
    });
    c.bench_function("front-end parse meta-grammar", |b| {
        b.iter(|| meta::parse(black_box(META_TOKENS.clone())).unwrap())
    });
}

pub fn self_parse(c: &mut Criterion) {
    c.bench_function("parse meta-grammar with its own parser", |b| {
        b.iter(|| META_PARSER.parse(black_box(META_TOKENS.clone())).unwrap())
    });
}

criterion_group!(benches, compile_grammar, front_end, self_parse);
criterion_main!(benches);
