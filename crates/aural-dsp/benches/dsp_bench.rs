use aural_codec::AudioBuffer;
use aural_dsp::{convolve_same, effects, Ear, FilterCoefficients};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn sine(len: usize) -> Vec<f32> {
    (0..len).map(|i| (i as f32 * 0.013).sin()).collect()
}

fn bench_convolve(c: &mut Criterion) {
    let signal = sine(96_000); // one second at the dataset rate
    let mut group = c.benchmark_group("convolve_same");
    for taps in [64usize, 256, 1024] {
        let ir = sine(taps);
        group.bench_with_input(BenchmarkId::from_parameter(taps), &ir, |b, ir| {
            b.iter(|| convolve_same(black_box(&signal), black_box(ir)).unwrap());
        });
    }
    group.finish();
}

fn bench_filter(c: &mut Criterion) {
    let coeffs = FilterCoefficients::butterworth_lowpass(2, 1_000.0, 48_000).unwrap();
    let signal = sine(48_000);
    c.bench_function("butterworth_apply_1s", |b| {
        b.iter(|| coeffs.apply(black_box(&signal)));
    });
}

fn bench_delay(c: &mut Criterion) {
    let buffer = AudioBuffer::stereo(sine(96_000), sine(96_000), 96_000).unwrap();
    c.bench_function("delay_1s", |b| {
        b.iter(|| effects::delay(black_box(&buffer), Ear::Right, 0.001).unwrap());
    });
}

criterion_group!(benches, bench_convolve, bench_filter, bench_delay);
criterion_main!(benches);
