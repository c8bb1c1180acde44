use criterion::{Criterion, black_box, criterion_group, criterion_main};

use ledgeriq_scoring::{
    CustomerRiskInput, CustomerScoreInput, ScoringConfig,
    customer::{customer_risk_tier, customer_score, customer_tier},
};

fn bench_customer_scoring(c: &mut Criterion) {
    let config = ScoringConfig::default();
    let inputs: Vec<CustomerScoreInput> = (0..1_000)
        .map(|i| CustomerScoreInput {
            total_revenue: (i as f64) * 731.0,
            payment_rate: (i % 101) as f64,
            invoice_count: (i % 40) as u64,
            avg_payment_days: (i % 90) as f64,
            lifetime_months: (i % 120) as f64,
        })
        .collect();

    c.bench_function("customer_score_1k", |b| {
        b.iter(|| {
            for input in &inputs {
                let score = customer_score(black_box(input), &config);
                black_box(customer_tier(score, input.total_revenue, &config));
            }
        })
    });

    c.bench_function("customer_risk_tier_1k", |b| {
        b.iter(|| {
            for input in &inputs {
                let risk = CustomerRiskInput {
                    payment_rate: input.payment_rate,
                    overdue_count: input.invoice_count / 4,
                    avg_payment_days: input.avg_payment_days,
                    overdue_amount: input.total_revenue / 10.0,
                };
                black_box(customer_risk_tier(black_box(&risk), &config));
            }
        })
    });
}

criterion_group!(benches, bench_customer_scoring);
criterion_main!(benches);
