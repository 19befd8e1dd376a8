use intl_datetime::{datetime::DateTimeStyle, state::FixedEnv, validation::DateTimeValidator};

pub(crate) fn bench(c: &mut criterion::Criterion) {
    c.bench_function("validate_datetime_cached", |b| {
        let mut validator = DateTimeValidator::with_env(FixedEnv::new("en_US", "UTC"));
        validator.set_date_format(DateTimeStyle::Full);
        b.iter(|| validator.is_valid_str("Tuesday, June 3, 2014"))
    });
    c.bench_function("validate_datetime_rebuilt", |b| {
        let mut validator = DateTimeValidator::with_env(FixedEnv::new("en_US", "UTC"));
        b.iter(|| {
            validator.set_date_format(DateTimeStyle::Full);
            validator.is_valid_str("Tuesday, June 3, 2014")
        })
    });
}
