use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const FIRST_YEAR: i32 = 1960;
const LAST_YEAR: i32 = 2023;

/// One emitter trajectory: exponential growth up to a peak year, a second
/// rate afterwards. Years before `from` stay empty, which mimics countries
/// that only started reporting partway through the range.
struct Profile {
    name: &'static str,
    code: &'static str,
    base: f64,
    rate_before: f64,
    peak: i32,
    rate_after: f64,
    from: i32,
}

#[rustfmt::skip]
static PROFILES: [Profile; 12] = [
    Profile { name: "China",          code: "CHN", base:  780.0, rate_before:  0.058, peak: 2012, rate_after: -0.010, from: 1960 },
    Profile { name: "United States",  code: "USA", base: 2890.0, rate_before:  0.016, peak: 2005, rate_after: -0.012, from: 1960 },
    Profile { name: "India",          code: "IND", base:  120.0, rate_before:  0.052, peak: 2030, rate_after:  0.000, from: 1960 },
    Profile { name: "Russia",         code: "RUS", base: 2180.0, rate_before: -0.035, peak: 1998, rate_after:  0.004, from: 1992 },
    Profile { name: "Japan",          code: "JPN", base:  230.0, rate_before:  0.041, peak: 1996, rate_after: -0.008, from: 1960 },
    Profile { name: "Germany",        code: "DEU", base:  810.0, rate_before:  0.012, peak: 1979, rate_after: -0.012, from: 1960 },
    Profile { name: "United Kingdom", code: "GBR", base:  580.0, rate_before:  0.004, peak: 1971, rate_after: -0.010, from: 1960 },
    Profile { name: "Brazil",         code: "BRA", base:   47.0, rate_before:  0.048, peak: 2014, rate_after: -0.010, from: 1960 },
    Profile { name: "Indonesia",      code: "IDN", base:   25.0, rate_before:  0.058, peak: 2030, rate_after:  0.000, from: 1965 },
    Profile { name: "South Korea",    code: "KOR", base:   13.0, rate_before:  0.075, peak: 2018, rate_after: -0.004, from: 1960 },
    Profile { name: "Saudi Arabia",   code: "SAU", base:    3.0, rate_before:  0.100, peak: 2015, rate_after: -0.005, from: 1960 },
    Profile { name: "Kazakhstan",     code: "KAZ", base:  235.0, rate_before: -0.045, peak: 1999, rate_after:  0.025, from: 1992 },
];

/// Minimal deterministic PRNG (splitmix64)
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        SimpleRng { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E3779B97F4A7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform in [-1, 1)
    fn jitter(&mut self) -> f64 {
        self.next_f64() * 2.0 - 1.0
    }
}

fn trajectory(profile: &Profile, years: &[i32], rng: &mut SimpleRng) -> Vec<Option<f64>> {
    let mut values = Vec::with_capacity(years.len());
    let mut level = profile.base;

    for &year in years {
        if year < profile.from {
            values.push(None);
            continue;
        }
        if year > profile.from {
            let rate = if year <= profile.peak {
                profile.rate_before
            } else {
                profile.rate_after
            };
            level *= 1.0 + rate + rng.jitter() * 0.008;
        }
        values.push(Some((level * 10.0).round() / 10.0));
    }

    values
}

fn write_csv(path: &str, years: &[i32], rows: &[(&Profile, Vec<Option<f64>>)]) {
    let mut writer = csv::Writer::from_path(path).expect("Failed to create CSV file");

    let mut header: Vec<String> =
        vec!["Country/Region".into(), "Code".into(), "Source".into()];
    header.extend(years.iter().map(|y| y.to_string()));
    writer.write_record(&header).expect("Failed to write CSV header");

    for (profile, values) in rows {
        let mut record: Vec<String> = vec![
            profile.name.to_string(),
            profile.code.to_string(),
            "Synthetic".to_string(),
        ];
        record.extend(values.iter().map(|v| match v {
            Some(x) => format!("{x:.1}"),
            None => String::new(),
        }));
        writer.write_record(&record).expect("Failed to write CSV row");
    }

    writer.flush().expect("Failed to flush CSV");
}

fn write_parquet(path: &str, years: &[i32], rows: &[(&Profile, Vec<Option<f64>>)]) {
    let mut fields = vec![
        Field::new("Country/Region", DataType::Utf8, false),
        Field::new("Code", DataType::Utf8, false),
    ];
    fields.extend(
        years
            .iter()
            .map(|y| Field::new(y.to_string(), DataType::Float64, true)),
    );
    let schema = Arc::new(Schema::new(fields));

    let names = StringArray::from(rows.iter().map(|(p, _)| p.name).collect::<Vec<_>>());
    let codes = StringArray::from(rows.iter().map(|(p, _)| p.code).collect::<Vec<_>>());

    let mut columns: Vec<ArrayRef> = vec![Arc::new(names), Arc::new(codes)];
    for index in 0..years.len() {
        let column: Float64Array = rows.iter().map(|(_, values)| values[index]).collect();
        columns.push(Arc::new(column));
    }

    let batch =
        RecordBatch::try_new(schema.clone(), columns).expect("Failed to create RecordBatch");

    let file = std::fs::File::create(path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");
}

fn main() {
    let mut rng = SimpleRng::new(42);
    let years: Vec<i32> = (FIRST_YEAR..=LAST_YEAR).collect();

    let rows: Vec<(&Profile, Vec<Option<f64>>)> = PROFILES
        .iter()
        .map(|profile| (profile, trajectory(profile, &years, &mut rng)))
        .collect();

    write_csv("emissions_sample.csv", &years, &rows);
    write_parquet("emissions_sample.parquet", &years, &rows);

    println!(
        "Wrote {} countries x {} years to emissions_sample.csv / emissions_sample.parquet",
        rows.len(),
        years.len()
    );
}
