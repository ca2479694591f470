//! Benchmarks for the resolution cache and audio track selection.
//!
//! Measures lookup latency on a populated cache, the cost of the expiry
//! sweep that follows every insert, and track selection over large format
//! lists.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use std::time::Duration;
use sw_core::ManualClock;
use sw_youtube::formats::select_audio_url;
use sw_youtube::{cache_key, ExtractedMedia, MediaFormat, ResolutionCache};

const TTL: Duration = Duration::from_secs(3600);

fn populated(entries: usize) -> (ResolutionCache, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let cache = ResolutionCache::new(TTL, clock.clone());
    for i in 0..entries {
        cache.put(
            cache_key(&format!("video{i:06}")),
            format!("https://cdn.example/{i}.m4a"),
            format!("Track {i}"),
            Some(180),
        );
    }
    (cache, clock)
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_lookup");

    for entries in [100, 10_000] {
        let (cache, _) = populated(entries);
        let hit = cache_key("video000042");
        let miss = cache_key("absent");

        group.bench_with_input(BenchmarkId::new("hit", entries), &hit, |b, key| {
            b.iter(|| black_box(cache.get(key)));
        });
        group.bench_with_input(BenchmarkId::new("miss", entries), &miss, |b, key| {
            b.iter(|| black_box(cache.get(key)));
        });
    }

    group.finish();
}

fn bench_evict(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_evict_expired");

    for entries in [100, 10_000] {
        // Nothing expired: the common case after a put.
        let (cache, _) = populated(entries);
        group.bench_function(BenchmarkId::new("none_expired", entries), |b| {
            b.iter(|| black_box(cache.evict_expired()));
        });

        // Everything expired: the sweep empties the cache.
        group.bench_function(BenchmarkId::new("all_expired", entries), |b| {
            b.iter_batched(
                || {
                    let (cache, clock) = populated(entries);
                    clock.advance(TTL);
                    cache
                },
                |cache| black_box(cache.evict_expired()),
                criterion::BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn bench_selection(c: &mut Criterion) {
    // Typical yt-dlp output: many video-only formats before the audio ones.
    let mut formats: Vec<MediaFormat> = (0..60)
        .map(|i| MediaFormat {
            format_id: Some(i.to_string()),
            url: Some(format!("https://cdn.example/v{i}")),
            acodec: Some("none".into()),
            vcodec: Some("avc1".into()),
            ext: Some("mp4".into()),
        })
        .collect();
    formats.push(MediaFormat {
        format_id: Some("251".into()),
        url: Some("https://cdn.example/a251".into()),
        acodec: Some("opus".into()),
        vcodec: Some("none".into()),
        ext: Some("webm".into()),
    });
    let media = ExtractedMedia {
        formats,
        ..Default::default()
    };

    c.bench_function("select_audio_url", |b| {
        b.iter(|| black_box(select_audio_url(&media)));
    });
}

criterion_group!(benches, bench_lookup, bench_evict, bench_selection);
criterion_main!(benches);
