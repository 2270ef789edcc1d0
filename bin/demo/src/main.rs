mod loader;
mod subgraphs;

use std::sync::Arc;

use hive_stitching_composition::compose;
use hive_stitching_config::load_config;
use hive_stitching_executor::{DelegatingExecutor, SubschemaExecutorMap};
use hive_stitching_internal::logging::init_logging;
use serde_json::Map;
use tracing::info;

const DEMO_QUERY: &str = r#"
query Demo {
  getCredential(id: "valid-credential-id") {
    _id
    name
    client {
      name
      tenantCode
    }
  }
  getWhatever
}
"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::var("STITCHING_CONFIG_FILE_PATH").ok();
    let config = load_config(config_path)?;
    let _log_guard = init_logging(&config.log)?;

    let schema_dir = loader::schema_dir();
    let subschemas = vec![
        subgraphs::feeds(&loader::read_schema(&schema_dir, "feeds")?)?,
        subgraphs::model(&loader::read_schema(&schema_dir, "model")?)?,
    ];

    let supergraph = compose(&subschemas)?;
    println!("{}", supergraph.sdl());

    let executors = SubschemaExecutorMap::from_subschemas(&subschemas, &config.transport)?;
    let executor = DelegatingExecutor::new(Arc::new(supergraph), executors);

    info!("running the demo query");
    let response = executor.run(DEMO_QUERY, Some("Demo"), Map::new()).await;

    if !response.errors.is_empty() {
        eprintln!("{}", serde_json::to_string_pretty(&response.errors)?);
    }
    println!("{}", serde_json::to_string_pretty(&response.data)?);

    Ok(())
}
