use crate::core::{query, render};
use crate::core::{BirdRecord, ConfigProvider, Pipeline, RenderResult, SqlResponse, Storage};
use crate::utils::error::{ExplorerError, Result};
use reqwest::Client;

const PAGE_FILE: &str = "birds.html";
const CSV_FILE: &str = "birds.csv";
const JSON_FILE: &str = "birds.json";

pub struct SelectPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: Client,
}

impl<S: Storage, C: ConfigProvider> SelectPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self {
            storage,
            config,
            client: Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for SelectPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<BirdRecord>> {
        let url = query::sql_api_url(self.config.api_endpoint())?;

        tracing::debug!("Making API request to: {}", url);
        let response = self.client.get(url).send().await?;

        tracing::debug!("API response status: {}", response.status());
        let response = response.error_for_status()?;

        let body: SqlResponse = response.json().await?;
        Ok(body.rows)
    }

    async fn transform(&self, rows: Vec<BirdRecord>) -> Result<RenderResult> {
        // 排序、分組、產生標記
        let birds = render::sort_birds(rows);
        let species = render::species_in_order(&birds);
        let select_html = render::render_opt_groups(&birds)?;

        let csv_output = birds_to_csv(&birds)?;
        let json_output = serde_json::to_string_pretty(&birds)?;

        tracing::debug!(
            "Rendered {} options across {} species groups",
            birds.len(),
            species.len()
        );

        Ok(RenderResult {
            birds,
            species,
            select_html,
            csv_output,
            json_output,
        })
    }

    async fn load(&self, result: RenderResult) -> Result<String> {
        let container_id = self.config.container_id();

        // 附加到既有頁面，沒有頁面就先建立骨架
        let page = match self.storage.read_file(PAGE_FILE).await {
            Ok(bytes) => String::from_utf8(bytes).map_err(|e| ExplorerError::ProcessingError {
                message: format!("page file is not valid UTF-8: {}", e),
            })?,
            Err(_) => render::empty_page(container_id),
        };

        let page = render::append_to_container(&page, container_id, &result.select_html)?;
        self.storage.write_file(PAGE_FILE, page.as_bytes()).await?;
        tracing::debug!("Appended {} species groups to {}", result.species.len(), PAGE_FILE);

        for format in self.config.output_formats() {
            match format.as_str() {
                // 頁面已寫出
                "html" => {}
                "csv" => {
                    self.storage
                        .write_file(CSV_FILE, result.csv_output.as_bytes())
                        .await?;
                }
                "json" => {
                    self.storage
                        .write_file(JSON_FILE, result.json_output.as_bytes())
                        .await?;
                }
                other => tracing::warn!("Skipping unknown output format: {}", other),
            }
        }

        Ok(format!("{}/{}", self.config.output_path(), PAGE_FILE))
    }
}

fn birds_to_csv(birds: &[BirdRecord]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(query::TRACKING_COLUMNS)?;
    for bird in birds {
        writer.serialize(bird)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExplorerError::ProcessingError {
            message: format!("CSV buffer error: {}", e),
        })?;
    String::from_utf8(bytes).map_err(|e| ExplorerError::ProcessingError {
        message: format!("CSV output is not valid UTF-8: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                ExplorerError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        api_endpoint: String,
        output_path: String,
        container_id: String,
        output_formats: Vec<String>,
    }

    impl MockConfig {
        fn new(api_endpoint: String) -> Self {
            Self {
                api_endpoint,
                output_path: "test_output".to_string(),
                container_id: "select-bird".to_string(),
                output_formats: vec!["html".to_string(), "csv".to_string(), "json".to_string()],
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn api_endpoint(&self) -> &str {
            &self.api_endpoint
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn container_id(&self) -> &str {
            &self.container_id
        }

        fn output_formats(&self) -> &[String] {
            &self.output_formats
        }
    }

    fn bird(scientific_name: &str, bird_name: &str) -> BirdRecord {
        BirdRecord {
            bird_name: bird_name.to_string(),
            device_info_serial: "1".to_string(),
            sex: "male".to_string(),
            scientific_name: scientific_name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_extract_parses_rows() {
        let server = MockServer::start();
        let mock_data = serde_json::json!({
            "rows": [
                {"bird_name": "Eric", "device_info_serial": "851",
                 "sex": "male", "scientific_name": "Larus fuscus"},
                {"bird_name": "Nico", "device_info_serial": "784",
                 "sex": "male", "scientific_name": "Larus fuscus"}
            ],
            "time": 0.006,
            "total_rows": 2
        });

        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v2/sql")
                .query_param("q", query::TRACKING_QUERY);
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(mock_data);
        });

        let pipeline = SelectPipeline::new(MockStorage::new(), MockConfig::new(server.base_url()));
        let rows = pipeline.extract().await.unwrap();

        api_mock.assert();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].bird_name, "Eric");
        assert_eq!(rows[1].device_info_serial, "784");
    }

    #[tokio::test]
    async fn test_extract_http_error_is_surfaced() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/api/v2/sql");
            then.status(500);
        });

        let pipeline = SelectPipeline::new(MockStorage::new(), MockConfig::new(server.base_url()));
        let result = pipeline.extract().await;

        api_mock.assert();
        assert!(matches!(result, Err(ExplorerError::ApiError(_))));
    }

    #[tokio::test]
    async fn test_extract_malformed_body_is_surfaced() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/api/v2/sql");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"rows": "not-an-array"}));
        });

        let pipeline = SelectPipeline::new(MockStorage::new(), MockConfig::new(server.base_url()));
        let result = pipeline.extract().await;

        api_mock.assert();
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_transform_sorts_groups_and_exports() {
        let pipeline = SelectPipeline::new(
            MockStorage::new(),
            MockConfig::new("http://test.com".to_string()),
        );

        let result = pipeline
            .transform(vec![bird("B", "y"), bird("A", "x")])
            .await
            .unwrap();

        assert_eq!(result.birds[0].bird_name, "x");
        assert_eq!(result.species, vec!["A", "B"]);
        assert_eq!(
            result.select_html,
            "<optgroup label=\"A\"><option value=\"0\">x</option></optgroup>\
             <optgroup label=\"B\"><option value=\"1\">y</option></optgroup>"
        );

        let csv_lines: Vec<&str> = result.csv_output.lines().collect();
        assert_eq!(csv_lines[0], "bird_name,device_info_serial,sex,scientific_name");
        assert!(csv_lines[1].starts_with("x,"));
        assert!(csv_lines[2].starts_with("y,"));

        let parsed: Vec<BirdRecord> = serde_json::from_str(&result.json_output).unwrap();
        assert_eq!(parsed, result.birds);
    }

    #[tokio::test]
    async fn test_transform_with_empty_rows() {
        let pipeline = SelectPipeline::new(
            MockStorage::new(),
            MockConfig::new("http://test.com".to_string()),
        );

        let result = pipeline.transform(Vec::new()).await.unwrap();

        assert!(result.birds.is_empty());
        assert!(result.species.is_empty());
        assert!(result.select_html.is_empty());
        assert_eq!(result.csv_output.lines().count(), 1);
        assert_eq!(result.json_output, "[]");
    }

    fn render_result(select_html: &str) -> RenderResult {
        RenderResult {
            birds: vec![bird("A", "x")],
            species: vec!["A".to_string()],
            select_html: select_html.to_string(),
            csv_output: "bird_name,device_info_serial,sex,scientific_name\nx,1,male,A\n"
                .to_string(),
            json_output: "[]".to_string(),
        }
    }

    #[tokio::test]
    async fn test_load_creates_page_with_fragment() {
        let storage = MockStorage::new();
        let pipeline = SelectPipeline::new(
            storage.clone(),
            MockConfig::new("http://test.com".to_string()),
        );

        let fragment = "<optgroup label=\"A\"><option value=\"0\">x</option></optgroup>";
        let output_path = pipeline.load(render_result(fragment)).await.unwrap();

        assert_eq!(output_path, "test_output/birds.html");
        let page =
            String::from_utf8(storage.get_file("birds.html").await.unwrap()).unwrap();
        assert!(page.contains(&format!("<select id=\"select-bird\">{}</select>", fragment)));
    }

    #[tokio::test]
    async fn test_load_twice_appends_second_copy() {
        let storage = MockStorage::new();
        let pipeline = SelectPipeline::new(
            storage.clone(),
            MockConfig::new("http://test.com".to_string()),
        );

        let fragment = "<optgroup label=\"A\"><option value=\"0\">x</option></optgroup>";
        pipeline.load(render_result(fragment)).await.unwrap();
        pipeline.load(render_result(fragment)).await.unwrap();

        let page =
            String::from_utf8(storage.get_file("birds.html").await.unwrap()).unwrap();
        assert_eq!(page.matches("<optgroup label=\"A\">").count(), 2);
    }

    #[tokio::test]
    async fn test_load_writes_requested_exports() {
        let storage = MockStorage::new();
        let pipeline = SelectPipeline::new(
            storage.clone(),
            MockConfig::new("http://test.com".to_string()),
        );

        pipeline.load(render_result("")).await.unwrap();

        let csv = String::from_utf8(storage.get_file("birds.csv").await.unwrap()).unwrap();
        assert!(csv.starts_with("bird_name,device_info_serial,sex,scientific_name"));
        assert!(storage.get_file("birds.json").await.is_some());
    }

    #[tokio::test]
    async fn test_load_errors_when_container_missing() {
        let storage = MockStorage::new();
        storage
            .write_file("birds.html", b"<html><body></body></html>")
            .await
            .unwrap();

        let pipeline = SelectPipeline::new(
            storage,
            MockConfig::new("http://test.com".to_string()),
        );

        let result = pipeline.load(render_result("<optgroup></optgroup>")).await;
        assert!(matches!(
            result,
            Err(ExplorerError::ProcessingError { .. })
        ));
    }

    #[test]
    fn test_csv_export_round_trips_through_reader() {
        let birds = vec![bird("Larus fuscus", "Eric"), bird("Anser anser", "Nele")];
        let csv_output = birds_to_csv(&birds).unwrap();

        let mut reader = csv::Reader::from_reader(csv_output.as_bytes());
        let parsed: Vec<BirdRecord> = reader
            .deserialize()
            .collect::<std::result::Result<_, _>>()
            .unwrap();
        assert_eq!(parsed, birds);
    }
}
