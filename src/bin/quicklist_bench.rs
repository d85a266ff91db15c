use std::time::Instant;

use clap::Parser;
use hdrhistogram::Histogram;
use redis_quicklist::{QuickList, QuickListConfig, Result, Where};
use tracing::info;

#[derive(Parser, Clone)]
struct BenchmarkConfig {
    /// Config file with `list_max_ziplist_size` and `list_compress_depth`
    #[arg(long)]
    pub config: Option<String>,
    /// Overrides the configured fill
    #[arg(short, long, allow_negative_numbers = true)]
    pub fill: Option<i32>,
    /// Overrides the configured compress depth
    #[arg(short = 'c', long)]
    pub compress: Option<i32>,
    #[arg(short, long, default_value_t = 100000)]
    pub requests: u32,
    #[arg(short, long, default_value_t = 3)]
    pub data_size: u32,
    #[arg(short, long, num_args = 1..)]
    pub tests: Vec<String>,
}

fn gen_benchmark_data(count: u32) -> Vec<u8> {
    let mut state: u32 = 1234;
    let mut data = Vec::with_capacity(count as usize);

    for _ in 0..count {
        state = state.wrapping_mul(1103515245).wrapping_add(12345);
        data.push(b'0' + ((state >> 16) & 63) as u8);
    }
    data
}

fn test_is_selected(tests: &[String], name: &str) -> bool {
    tests.is_empty() || tests.iter().any(|t| t == name)
}

fn build_list(config: &BenchmarkConfig) -> QuickList {
    let mut list_config = QuickListConfig::new(config.config.as_deref());
    if let Some(fill) = config.fill {
        list_config.list_max_ziplist_size = fill;
    }
    if let Some(compress) = config.compress {
        list_config.list_compress_depth = compress;
    }
    list_config.build()
}

fn filled_list(config: &BenchmarkConfig, data: &[u8]) -> QuickList {
    let mut quicklist = build_list(config);
    for _ in 0..config.requests {
        quicklist.push_tail(data);
    }
    quicklist
}

fn run(name: &str, config: &BenchmarkConfig, mut op: impl FnMut(u32)) -> Result<()> {
    println!("======{}======", name.to_uppercase());
    let mut hist = Histogram::<u64>::new_with_bounds(1, 3_600_000_000, 3)?;

    let st = Instant::now();
    for i in 0..config.requests {
        let op_start = Instant::now();
        op(i);
        hist.record(op_start.elapsed().as_nanos().max(1) as u64)?;
    }
    let elapsed = st.elapsed().as_secs_f64();

    println!(" {} operations completed in {:.3} seconds", config.requests, elapsed);
    println!(" Summary:");
    println!(
        "     Throughput summary: {:.2} operations per second",
        config.requests as f64 / elapsed
    );
    println!("     Latency summary (nsec): ");
    println!("               {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}", "avg", "min", "p50", "p95", "p99", "max");
    println!(
        "               {:>8.0} {:>8} {:>8} {:>8} {:>8} {:>8}",
        hist.mean(),
        hist.min(),
        hist.value_at_quantile(0.5),
        hist.value_at_quantile(0.95),
        hist.value_at_quantile(0.99),
        hist.max()
    );
    Ok(())
}

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt::try_init();
    let config = BenchmarkConfig::parse();
    let data = gen_benchmark_data(config.data_size);
    let tests = &config.tests;

    if test_is_selected(tests, "push") {
        let mut quicklist = build_list(&config);
        run("push", &config, |i| {
            let place = if i % 2 == 0 { Where::Head } else { Where::Tail };
            quicklist.push(&data, place);
        })?;
        info!(nodes = quicklist.len(), entries = quicklist.count(), "push done");
    }
    if test_is_selected(tests, "pop") {
        let mut quicklist = filled_list(&config, &data);
        run("pop", &config, |_| {
            let _ = quicklist.pop(Where::Head);
        })?;
    }
    if test_is_selected(tests, "index") {
        let mut quicklist = filled_list(&config, &data);
        let count = (quicklist.count() as i64).max(1);
        run("index", &config, |i| {
            let _ = quicklist.get((i as i64 * 7919) % count);
        })?;
    }
    if test_is_selected(tests, "insert") {
        let mut quicklist = filled_list(&config, &data);
        run("insert", &config, |i| {
            let idx = (i as i64 * 7919) % (quicklist.count() as i64).max(1);
            if let Some(entry) = quicklist.index(idx) {
                quicklist.insert_after(Some(&entry), &data);
            }
        })?;
        info!(nodes = quicklist.len(), entries = quicklist.count(), "insert done");
    }
    if test_is_selected(tests, "rotate") {
        let mut quicklist = filled_list(&config, &data);
        run("rotate", &config, |_| quicklist.rotate())?;
    }

    Ok(())
}
