use criterion::{criterion_group, criterion_main, Criterion};

use models::project;
use sea_orm::ColumnTrait;
use service::pagination::PageParams;
use service::repository::{FilterSortSpec, Predicate};
use service::services::{ProjectFilter, ProjectSpec};

fn bench_spec(c: &mut Criterion) {
    let spec = ProjectSpec {
        page: PageParams::new(3, 25),
        filter: ProjectFilter {
            name: Some("retrofit".into()),
            customer: Some("Acme".into()),
            min_budget: Some(1_000),
            ..Default::default()
        },
    };

    c.bench_function("project_spec_build_predicate", |b| {
        b.iter(|| spec.build_predicate());
    });

    let predicate: Predicate<project::Entity> = Predicate::all_of([
        Predicate::when(project::Column::Customer.eq("Acme")),
        Predicate::when(project::Column::Budget.gte(1_000)),
    ]);
    c.bench_function("predicate_fingerprint", |b| {
        b.iter(|| predicate.fingerprint());
    });
}

criterion_group!(benches, bench_spec);
criterion_main!(benches);
