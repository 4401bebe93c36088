//! End-to-end pipeline runs: sources → matcher → report → export.

use prediction_aggregator::config::{AppConfig, OutputConfig, PipelineConfig};
use prediction_aggregator::engine::matcher::match_batches;
use prediction_aggregator::engine::pipeline::Pipeline;
use prediction_aggregator::export;
use prediction_aggregator::sources::RecordSource;

use crate::mock_source::MockSource;

fn pipeline(sources: &[&MockSource]) -> Pipeline {
    let boxed: Vec<Box<dyn RecordSource>> = sources.iter().map(|s| s.boxed()).collect();
    Pipeline::new(boxed, &PipelineConfig::default())
}

fn market_sources() -> (MockSource, MockSource, MockSource) {
    let polymarket = MockSource::with_names(
        "polymarket",
        &[
            ("US Presidential Election 2028", 0.45),
            ("Fed Rate Cut March", 0.61),
            ("Bitcoin above 100k", 0.30),
        ],
    );
    let kalshi = MockSource::with_names(
        "kalshi",
        &[
            ("2028 US Presidential Election", 0.47),
            ("Fed Rate Cut in March", 0.63),
            ("Unrelated Sports Bet", 0.12),
        ],
    );
    let predictit = MockSource::with_names(
        "predictit",
        &[
            ("Presidential Election 2028", 0.44),
            ("Bitcoin above 100k by June", 0.28),
        ],
    );
    (polymarket, kalshi, predictit)
}

#[tokio::test]
async fn test_three_markets_end_to_end() {
    let (polymarket, kalshi, predictit) = market_sources();
    let run = pipeline(&[&polymarket, &kalshi, &predictit]).run().await.unwrap();

    assert_eq!(run.records_collected, 8);
    let total: usize = run.entities.iter().map(|e| e.matches().len()).sum();
    assert_eq!(total, 8);

    let names: Vec<&str> = run.entities.iter().map(|e| e.name()).collect();
    assert_eq!(
        names,
        vec![
            "US Presidential Election 2028",
            "Fed Rate Cut March",
            "Bitcoin above 100k",
            "Unrelated Sports Bet",
        ]
    );

    let election: Vec<(&str, f64)> = run.entities[0]
        .matches()
        .iter()
        .map(|m| (m.source.as_str(), m.confidence))
        .collect();
    assert_eq!(
        election,
        vec![("polymarket", 1.0), ("kalshi", 1.0), ("predictit", 0.95)]
    );
    assert_eq!(run.entities[1].matches()[1].confidence, 0.92);
    assert_eq!(run.entities[2].matches()[1].confidence, 0.82);

    assert_eq!(run.stats.products_matched, 4);
    assert_eq!(run.stats.sources, 3);
    assert_eq!(run.stats.data_points, 28);

    for s in [&polymarket, &kalshi, &predictit] {
        assert_eq!(s.fetch_count(), 1);
    }
}

#[tokio::test]
async fn test_runs_are_deterministic() {
    let (polymarket, kalshi, predictit) = market_sources();
    let p = pipeline(&[&polymarket, &kalshi, &predictit]);
    let first = p.run().await.unwrap();
    let second = p.run().await.unwrap();

    assert_eq!(first.entities, second.entities);
    assert_eq!(first.table, second.table);
    assert_ne!(first.run_id, second.run_id);
}

#[tokio::test]
async fn test_source_order_changes_canonical_name() {
    let (polymarket, kalshi, _) = market_sources();
    let run = pipeline(&[&kalshi, &polymarket]).run().await.unwrap();
    assert_eq!(run.entities[0].name(), "2028 US Presidential Election");
    assert_eq!(run.table.sources, vec!["kalshi", "polymarket"]);
}

#[tokio::test]
async fn test_pipeline_matches_direct_matcher() {
    let (polymarket, kalshi, predictit) = market_sources();
    let run = pipeline(&[&polymarket, &kalshi, &predictit]).run().await.unwrap();

    let mut batches = Vec::new();
    for s in [&polymarket, &kalshi, &predictit] {
        batches.push(s.fetch_batch().await.unwrap());
    }
    assert_eq!(run.entities, match_batches(&batches));
}

#[tokio::test]
async fn test_failing_source_aborts_run() {
    let (polymarket, kalshi, predictit) = market_sources();
    kalshi.set_error("connection refused");

    let p = pipeline(&[&polymarket, &kalshi, &predictit]);
    let err = p.run().await.unwrap_err();
    assert!(format!("{err:#}").contains("connection refused"));
    assert_eq!(predictit.fetch_count(), 0);

    kalshi.clear_error();
    assert!(p.run().await.is_ok());
}

#[tokio::test]
async fn test_empty_sources_produce_empty_output() {
    let empty = MockSource::with_names("polymarket", &[]);
    let run = pipeline(&[&empty]).run().await.unwrap();
    assert!(run.entities.is_empty());
    assert_eq!(run.table.columns(), vec!["Product Name"]);
}

#[tokio::test]
async fn test_default_config_run_and_export() {
    let mut dir = std::env::temp_dir();
    dir.push(format!("aggregator_it_{}", uuid::Uuid::new_v4()));
    let output = OutputConfig {
        dir: dir.clone(),
        ..OutputConfig::default()
    };

    let cfg = AppConfig::default().resolve_with(|_| None).unwrap();
    let run = Pipeline::from_config(&cfg).run().await.unwrap();
    let written = export::write_outputs(&run, &output).unwrap();

    let csv = std::fs::read_to_string(&written.csv).unwrap();
    assert_eq!(
        csv,
        "Product Name,polymarket Price,polymarket Confidence,kalshi Price,kalshi Confidence,predictit Price,predictit Confidence\n\
         US Presidential Election 2028,0.45,1.0,0.47,1.0,0.44,1.0\n"
    );

    export::delete_outputs(&output).unwrap();
    std::fs::remove_dir_all(&dir).unwrap();
}
