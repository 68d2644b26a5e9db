use std::sync::Arc;

use anyhow::Context;
use arrow::array::{ArrayRef, Float64Builder, Int64Builder, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const SELLERS: [&str; 4] = ["ИП Иванов", "ИП Петрова", "ИП Сидоров", "ИП Кузнецова"];

/// Category and its products with base price.
const CATALOG: [(&str, &[(&str, f64)]); 4] = [
    ("Одежда", &[("Футболка", 1200.0), ("Худи", 3400.0), ("Джинсы", 4100.0)]),
    ("Обувь", &[("Кеды", 3900.0), ("Ботинки", 7600.0)]),
    ("Аксессуары", &[("Ремень", 900.0), ("Кепка", 750.0), ("Шарф", 1100.0)]),
    ("Дом", &[("Плед", 2300.0), ("Кружка", 450.0)]),
];

const HEADER: [&str; 6] = [
    "ИП",
    "Товар",
    "Категория",
    "Себестоимость",
    "Базовая цена",
    "Продажа шт",
];

/// One generated sales line. `None` cells are written as "N/A".
struct Line {
    seller: &'static str,
    product: &'static str,
    category: &'static str,
    cost: Option<f64>,
    price: f64,
    quantity: Option<i64>,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }
}

fn generate_lines(rng: &mut SimpleRng, count: usize) -> Vec<Line> {
    (0..count)
        .map(|_| {
            let seller = SELLERS[rng.below(SELLERS.len())];
            let (category, products) = CATALOG[rng.below(CATALOG.len())];
            let (product, base) = products[rng.below(products.len())];

            // ±15 % around the base price, rounded to whole roubles
            let price = (base * (0.85 + 0.3 * rng.next_f64())).round();
            let cost = (price * (0.45 + 0.25 * rng.next_f64())).round();
            let quantity = 1 + rng.below(12) as i64;

            // A few damaged cells, as in real marketplace exports
            Line {
                seller,
                product,
                category,
                cost: (rng.next_f64() > 0.04).then_some(cost),
                price,
                quantity: (rng.next_f64() > 0.03).then_some(quantity),
            }
        })
        .collect()
}

fn na<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

/// CSV with a title row above the header, so the header row has to be picked.
fn write_csv(path: &str, lines: &[Line]) -> anyhow::Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("creating {path}"))?;

    writer.write_record(["Отчёт о продажах за период"])?;
    writer.write_record(HEADER)?;
    for line in lines {
        writer.write_record([
            line.seller.to_string(),
            line.product.to_string(),
            line.category.to_string(),
            na(line.cost),
            line.price.to_string(),
            na(line.quantity),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &str, lines: &[Line]) -> anyhow::Result<()> {
    let strings = |f: fn(&Line) -> &str| -> ArrayRef {
        Arc::new(StringArray::from(lines.iter().map(f).collect::<Vec<_>>()))
    };

    let mut cost = Float64Builder::with_capacity(lines.len());
    let mut price = Float64Builder::with_capacity(lines.len());
    let mut quantity = Int64Builder::with_capacity(lines.len());
    for line in lines {
        cost.append_option(line.cost);
        price.append_value(line.price);
        quantity.append_option(line.quantity);
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new(HEADER[0], DataType::Utf8, false),
        Field::new(HEADER[1], DataType::Utf8, false),
        Field::new(HEADER[2], DataType::Utf8, false),
        Field::new(HEADER[3], DataType::Float64, true),
        Field::new(HEADER[4], DataType::Float64, false),
        Field::new(HEADER[5], DataType::Int64, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            strings(|l| l.seller),
            strings(|l| l.product),
            strings(|l| l.category),
            Arc::new(cost.finish()),
            Arc::new(price.finish()),
            Arc::new(quantity.finish()),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let mut rng = SimpleRng::new(42);
    let lines = generate_lines(&mut rng, 400);

    write_csv("sample_sales.csv", &lines)?;
    write_parquet("sample_sales.parquet", &lines)?;

    println!(
        "Wrote {} sales lines for {} sellers to sample_sales.csv and sample_sales.parquet",
        lines.len(),
        SELLERS.len()
    );
    Ok(())
}
