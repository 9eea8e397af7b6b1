use crate::core::Pipeline;
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::monitor::SystemMonitor;

pub struct ExplorerEngine<P: Pipeline> {
    pipeline: P,
    #[cfg(feature = "cli")]
    monitor: Option<SystemMonitor>,
}

impl<P: Pipeline> ExplorerEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            #[cfg(feature = "cli")]
            monitor: None,
        }
    }

    #[cfg(feature = "cli")]
    pub fn new_with_monitoring(pipeline: P, enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: enabled.then(SystemMonitor::new),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Fetching bird tracking records...");
        let rows = self.pipeline.extract().await?;
        tracing::info!("Fetched {} records", rows.len());
        self.log_stage_stats("extract");

        tracing::info!("Rendering species groups...");
        let result = self.pipeline.transform(rows).await?;
        tracing::info!(
            "Rendered {} species groups for {} birds",
            result.species.len(),
            result.birds.len()
        );
        self.log_stage_stats("transform");

        tracing::info!("Writing output...");
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.log_stage_stats("load");

        Ok(output_path)
    }

    #[cfg(feature = "cli")]
    fn log_stage_stats(&self, stage: &str) {
        if let Some(monitor) = &self.monitor {
            if let Some(stats) = monitor.get_stats() {
                tracing::info!(
                    "[{}] cpu: {:.1}%, memory: {} MB (peak {} MB), elapsed: {:.2?}",
                    stage,
                    stats.cpu_usage,
                    stats.memory_usage_mb,
                    stats.peak_memory_mb,
                    stats.elapsed_time
                );
            }
        }
    }

    #[cfg(not(feature = "cli"))]
    fn log_stage_stats(&self, _stage: &str) {}
}
