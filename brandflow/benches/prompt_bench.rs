//! Benchmarks for prompt rendering and stage text parsing.

use brandflow::context::ToneSelection;
use brandflow::pipeline::extract_image_prompt;
use brandflow::prompts::{briefing_prompt, extract_landmarks, image_prompt_prompt};
use brandflow::testing::{coffee_shop_context, ENHANCEMENT_TEXT, IMAGE_PROMPT_TEXT};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn render_benchmark(c: &mut Criterion) {
    let context = coffee_shop_context();

    c.bench_function("briefing_prompt", |b| {
        b.iter(|| briefing_prompt(black_box(&context)));
    });

    c.bench_function("image_prompt_prompt", |b| {
        b.iter(|| {
            image_prompt_prompt(
                black_box(ENHANCEMENT_TEXT),
                ToneSelection::WatercolorArt,
                &context.location,
                &context.deliverables,
            )
        });
    });
}

fn parse_benchmark(c: &mut Criterion) {
    c.bench_function("extract_image_prompt", |b| {
        b.iter(|| extract_image_prompt(black_box(IMAGE_PROMPT_TEXT)));
    });

    c.bench_function("extract_landmarks", |b| {
        b.iter(|| extract_landmarks(black_box(ENHANCEMENT_TEXT)));
    });
}

criterion_group!(benches, render_benchmark, parse_benchmark);
criterion_main!(benches);
