use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use timetrie_core::{DigestTrie, TrieConfig};

/// 2021-08-05T00:00:00Z
const BASE_MILLIS: u64 = 1_628_121_600_000;
const STEP_MILLIS: u64 = 7_919;

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct Output {
    implementation: &'static str,
    workload: String,
    timestamp: String,
    name: String,
    total_ops: u64,
    duration_ms: f64,
    ops_per_sec: f64,
    extra: Extra,
    source_file: Option<String>,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct Extra {
    count: u64,
    nodes: usize,
    insert_ms: f64,
    branch_point_ms: f64,
    branch_point: Option<String>,
}

type BenchResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

struct Args {
    count: u64,
    out: Option<PathBuf>,
}

impl Args {
    fn parse() -> BenchResult<Self> {
        let mut args = Args {
            count: 10_000,
            out: None,
        };
        for arg in env::args().skip(1) {
            match arg.split_once('=') {
                Some(("--count", n)) => args.count = n.parse()?,
                Some(("--out", path)) => args.out = Some(PathBuf::from(path)),
                _ => return Err(format!("unrecognised argument `{arg}`").into()),
            }
        }
        Ok(args)
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

fn main() -> BenchResult<()> {
    let Args { count, out } = Args::parse()?;

    let mut local = DigestTrie::new(TrieConfig::default())?;
    let mut peer = DigestTrie::new(TrieConfig::default())?;

    let start = Instant::now();
    for i in 0..count {
        let id = format!("record-{i}");
        let ts = BASE_MILLIS + i * STEP_MILLIS;
        local.insert(&id, ts)?;
        // The peer misses every 1000th record.
        if i % 1_000 != 999 {
            peer.insert(&id, ts)?;
        }
    }
    let insert_ms = elapsed_ms(start);

    let start = Instant::now();
    let outcome = local.branch_point(&peer)?;
    let branch_point_ms = elapsed_ms(start);

    let duration_ms = insert_ms + branch_point_ms;
    let total_ops = count * 2 + 1;
    let name = format!("insert-branch-point-{count}");
    let report = Output {
        implementation: "core-arena",
        workload: name.clone(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        name,
        total_ops,
        duration_ms,
        ops_per_sec: if duration_ms > 0.0 {
            total_ops as f64 / duration_ms * 1000.0
        } else {
            f64::INFINITY
        },
        extra: Extra {
            count,
            nodes: local.node_count(),
            insert_ms,
            branch_point_ms,
            branch_point: outcome.datetime().map(|at| at.to_rfc3339()),
        },
        source_file: out.as_ref().map(|p| p.display().to_string()),
    };

    let json = serde_json::to_string_pretty(&report)?;
    if let Some(path) = &out {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, &json)?;
    }
    println!("{json}");
    Ok(())
}
