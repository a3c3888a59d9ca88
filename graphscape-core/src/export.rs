// Export generation for processed graphs

use graphscape_engine::PipelineOutput;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExportFormat {
    Json,
    Summary,
}

impl ExportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(ExportFormat::Json),
            "summary" | "text" => Some(ExportFormat::Summary),
            _ => None,
        }
    }
}

/// The full pipeline output as pretty JSON: metadata, nodes, edges, format
/// and algorithm_used.
pub fn generate_json_export(output: &PipelineOutput) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(output)
}

pub fn generate_summary(output: &PipelineOutput, source: &str) -> String {
    let mut report = String::new();

    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report.push_str("              GRAPHSCAPE PROCESSING SUMMARY\n");
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    report.push_str(&format!("Source:        {}\n", source));
    report.push_str(&format!("Generated:     {}\n", chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")));
    report.push_str(&format!("Format:        {}\n", output.format.as_str()));
    report.push_str(&format!("Algorithm:     {}\n\n", output.algorithm_used));

    let metadata = &output.metadata;
    report.push_str(&format!("Nodes:         {}\n", metadata.node_count));
    report.push_str(&format!("Edges:         {}\n", metadata.edge_count));
    report.push_str(&format!("Density:       {:.4}\n", metadata.density));
    report.push_str(&format!(
        "Connected:     {}\n",
        if metadata.is_connected { "yes" } else { "no" }
    ));
    report.push_str(&format!("Avg degree:    {:.2}\n", metadata.avg_degree));

    if !metadata.columns.is_empty() {
        report.push_str(&format!("Columns:       {}\n", metadata.columns.join(", ")));
    }

    report.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report
}

pub fn save_export(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
