//! Benchmarks for the document analyses
//!
//! Documents are synthetic: a fixed cast of characters scattered through
//! filler words, with a sprinkling of lexicon words and modifiers.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use enlace::{
    analysis_emotion, build_network, extract_characters, Chapter, CharacterSet, Document,
    EmotionConfig, EmotionLexicon, EntityBoundary, NetworkConfig, Token,
};

const CAST: &[&str] = &["Anne", "Diana", "Gilbert", "Marilla", "Matthew", "Rachel"];
const FILLER: &[&str] = &["walked", "to", "the", "orchard", "and", "happy", "very", "sad"];

const LEXICON: &str = "happy joy 1\nhappy trust 1\nsad sadness 1\norchard anticipation 1\n";

/// Build a document of `chapters` chapters with `tokens` tokens each
fn synthetic_document(chapters: usize, tokens: usize) -> Document {
    let chapters = (0..chapters)
        .map(|c| {
            Chapter::new(
                (0..tokens)
                    .map(|i| {
                        let seed = (i * 7 + c * 13) % 23;
                        let token = if seed < CAST.len() {
                            Token::new(CAST[seed], i)
                                .with_tag("NNP")
                                .with_entity("PERSON", EntityBoundary::Begin)
                        } else {
                            let word = FILLER[seed % FILLER.len()];
                            // "very" modifies the next token, within the same sentence
                            if word == "very" && (i + 1) % 20 != 0 && i + 1 < tokens {
                                Token::new(word, i).with_dep("advmod", i + 1)
                            } else {
                                Token::new(word, i)
                            }
                        };
                        token.in_sentence(i / 20)
                    })
                    .collect(),
            )
        })
        .collect();

    Document::new(chapters).expect("synthetic document is valid")
}

fn bench_extract_characters(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_characters");

    for chapters in [10, 50] {
        let doc = synthetic_document(chapters, 2_000);
        group.throughput(Throughput::Elements(doc.token_count() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(chapters), &doc, |b, doc| {
            b.iter(|| extract_characters(black_box(doc)));
        });
    }

    group.finish();
}

fn bench_build_network(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_network");
    let doc = synthetic_document(20, 2_000);
    let characters = CharacterSet::new(CAST);
    group.throughput(Throughput::Elements(doc.token_count() as u64));

    for window in [5, 15, 50] {
        group.bench_with_input(BenchmarkId::new("window", window), &window, |b, &window| {
            b.iter(|| {
                build_network(
                    black_box(&doc),
                    black_box(&characters),
                    NetworkConfig { window_size: window },
                )
            });
        });
    }

    group.finish();
}

fn bench_emotions(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis_emotion");
    let doc = synthetic_document(20, 2_000);
    let lexicon = EmotionLexicon::parse(LEXICON).expect("lexicon parses");
    group.throughput(Throughput::Elements(doc.token_count() as u64));

    group.bench_function("per_chapter", |b| {
        b.iter(|| analysis_emotion(black_box(&doc), &lexicon, EmotionConfig::default()));
    });

    group.bench_function("whole_book", |b| {
        let config = EmotionConfig {
            per_chapter: false,
            ..Default::default()
        };
        b.iter(|| analysis_emotion(black_box(&doc), &lexicon, config.clone()));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_extract_characters,
    bench_build_network,
    bench_emotions
);
criterion_main!(benches);
