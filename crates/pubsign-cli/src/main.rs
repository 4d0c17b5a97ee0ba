use std::sync::Arc;

use pubsign_core::app::StatusCounts;
use pubsign_core::domain::{NewResource, Status};
use pubsign_core::impls::InMemoryStore;
use pubsign_core::{PipelineBuilder, PipelineConfig, PipelineController};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn print_counts(label: &str, counts: &StatusCounts) {
    println!("{label}:");
    for status in Status::RESET_ORDER {
        let c = counts.get(status);
        println!(
            "  {:<12} publishing={} signing={}",
            status.to_string(),
            c.publishing,
            c.signing
        );
    }
    println!("  errors       {}", counts.errors);
}

/// 1 件の resource を publish まで進める（途中で 2 回失敗させる）
async fn walk_publish(pipeline: &PipelineController) -> Result<(), Box<dyn std::error::Error>> {
    let repo = pipeline.repository();
    let id = repo.insert(NewResource::new("publish").with_person(0)).await?;
    repo.set_status(&id, Status::Publishing, None).await?;

    for (attempt, title) in [(1, "timeout"), (2, "upstream returned 502")] {
        let failure = serde_json::json!({ "error": { "errors": [ { "title": title } ] } });
        pipeline.errors().record_retry(&id, &failure, attempt).await?;
    }

    for resource in pipeline.resources_by_status(Status::Retry).await? {
        println!(
            "retrying: id={} track={} hash={} error={:?}",
            resource.id, resource.track, resource.content_hash, resource.has_error
        );
    }

    repo.set_status(&id, Status::Published, Some("<p>decision list</p>".to_string()))
        .await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // (A) 設定と store を用意
    let config = match std::env::var("PUBSIGN_CONFIG") {
        Ok(path) => PipelineConfig::from_path(path)?,
        Err(_) => PipelineConfig::default(),
    };
    let store = Arc::new(InMemoryStore::new());
    let pipeline = PipelineBuilder::new(store.clone()).config(config).build()?;

    // (B) 両 track に resource を投入
    walk_publish(&pipeline).await?;
    let sign_id = pipeline
        .repository()
        .insert(NewResource::new("sign").with_person(1))
        .await?;
    pipeline.repository().set_status(&sign_id, Status::Failed, None).await?;
    pipeline.repository().insert_random().await?;

    // (C) 現状を表示
    print_counts("before reset", &pipeline.status_counts().await?);
    for error in pipeline.errors().list_errors().await? {
        println!(
            "current error: origin={} count={} message={}",
            error.origin, error.count, error.message
        );
    }

    // (D) 全消去
    let report = pipeline.full_reset().await?;
    info!(
        resources = report.resources_attempted,
        errors = report.errors_attempted,
        "reset done"
    );
    print_counts("after reset", &pipeline.status_counts().await?);
    println!(
        "store: resources={} errors={}",
        store.resource_count().await,
        store.error_count().await
    );

    report.into_result()?;
    Ok(())
}
