//! 规则评估服务入口
//!
//! 读取配置，初始化日志，从规则文件装配引擎，然后把标准输入
//! （或参数指定的文件）里的 JSON Lines 记录逐条评估，评估报告
//! 以 JSON Lines 形式写到标准输出。

use anyhow::{Context, Result};
use logic_engine::config::EngineConfig;
use logic_engine::{telemetry, LogicEngine, Rule};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use tracing::{info, warn};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = EngineConfig::load("logic-engine").unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {}", e);
        EngineConfig::default()
    });
    telemetry::init(&config.log)?;

    info!("Starting logic-engine...");

    let engine = LogicEngine::new();
    if let Some(path) = &config.rules_file {
        match load_rules_from_file(path, &engine) {
            Ok(count) => info!("Loaded {} rules from {}", count, path),
            Err(e) => warn!(
                "Failed to load rules from {}: {}, starting with empty store",
                path, e
            ),
        }
    }

    let input: Box<dyn BufRead> = match std::env::args().nth(1) {
        Some(path) => Box::new(BufReader::new(
            File::open(&path).with_context(|| format!("无法打开记录文件 {}", path))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut evaluated = 0usize;
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(&line) {
            Ok(record) => {
                let report = engine.evaluate(record);
                println!("{}", serde_json::to_string(&report)?);
                evaluated += 1;
            }
            Err(e) => warn!(error = %e, "跳过无法解析的记录"),
        }
    }

    info!("Evaluation complete, {} records processed", evaluated);
    Ok(())
}

/// 从 JSON 文件加载规则数组
///
/// 单条非法规则跳过并告警，其余规则照常加载。
fn load_rules_from_file(path: &str, engine: &LogicEngine) -> Result<usize> {
    let text = std::fs::read_to_string(path)?;
    let values: Vec<serde_json::Value> = serde_json::from_str(&text)?;

    let mut loaded = 0usize;
    for value in values {
        match serde_json::from_value::<Rule>(value.clone()) {
            Ok(rule) => match engine.add_rule(rule) {
                Ok(label) => {
                    info!(rule = %label, "Rule loaded");
                    loaded += 1;
                }
                Err(e) => warn!(error = %e, "Failed to load rule"),
            },
            Err(e) => warn!(error = %e, rule_json = %value, "Failed to parse rule"),
        }
    }
    Ok(loaded)
}
