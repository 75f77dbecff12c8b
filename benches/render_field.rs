use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use multibrot::FractalField;

fn bench_field_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("field_update");

    for (width, height) in [(160, 120), (320, 240)] {
        let mut field = FractalField::new(width, height).unwrap();
        field.set_max_iterations(256).unwrap();

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", width, height)),
            &(),
            |b, _| {
                b.iter(|| {
                    // Toggling the mode re-dirties the field, so every
                    // iteration pays for a full recomputation and the two
                    // recurrence seedings alternate.
                    field.set_julia(!field.is_julia());
                    field.update();
                    field.completed_generation()
                });
            },
        );
    }

    group.finish();
}

fn bench_noop_update(c: &mut Criterion) {
    let mut field = FractalField::new(320, 240).unwrap();
    field.update();

    c.bench_function("field_update_clean", |b| {
        b.iter(|| {
            field.update();
            field.completed_generation()
        });
    });
}

criterion_group!(benches, bench_field_update, bench_noop_update);
criterion_main!(benches);
