use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use chrono::{Duration, Utc};
use vidstream_auth::{BcryptHasher, Hs256TokenCodec, PasswordHasher, Subject, TokenCodec};
use vidstream_core::{Plan, SessionId, UserId};

fn subject() -> Subject {
    Subject {
        user_id: UserId::new(),
        email: "bench@example.com".to_string(),
        plan: Plan::Standard,
    }
}

/// Sign + verify cost per request (the renewal hot path does one of each).
fn bench_token_issue_verify(c: &mut Criterion) {
    let codec = Hs256TokenCodec::new("bench-secret");
    let subject = subject();
    let now = Utc::now();

    c.bench_function("token_issue", |b| {
        b.iter(|| {
            codec
                .issue(black_box(&subject), SessionId::new(), Duration::minutes(15), now)
                .unwrap()
        })
    });

    let issued = codec
        .issue(&subject, SessionId::new(), Duration::minutes(15), now)
        .unwrap();
    c.bench_function("token_verify", |b| {
        b.iter(|| codec.verify(black_box(&issued.token), now).unwrap())
    });
}

/// bcrypt verification cost by work factor, to pick `BCRYPT_COST`.
fn bench_password_verify(c: &mut Criterion) {
    let mut group = c.benchmark_group("password_verify");
    group.sample_size(10);

    for cost in [4u32, 8, 10, 12] {
        let hasher = BcryptHasher::new(cost);
        let hash = hasher.hash("correct horse battery").unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(cost), &hash, |b, hash| {
            b.iter(|| hasher.verify(black_box("correct horse battery"), hash))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_token_issue_verify, bench_password_verify);
criterion_main!(benches);
