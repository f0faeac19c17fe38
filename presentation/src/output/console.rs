//! Console output formatter for tool listings and call results

use colored::Colorize;
use skybit_domain::tool::{RiskLevel, ToolDefinition, ToolSpec};

use crate::server::ToolResponse;

/// Formats gateway data for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the tool catalogue, one block per tool
    pub fn format_tools(spec: &ToolSpec) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Registered Tools"));
        output.push('\n');

        for tool in spec.all() {
            output.push_str(&Self::format_tool(tool));
        }

        let high_risk = spec.high_risk_tools().count();
        output.push_str(&format!(
            "\n{} {} tools, {} high-risk\n",
            "Total:".cyan().bold(),
            spec.len(),
            high_risk
        ));
        output
    }

    fn format_tool(tool: &ToolDefinition) -> String {
        let risk = match tool.risk_level {
            RiskLevel::Low => "low".green(),
            RiskLevel::High => "high".red().bold(),
        };
        let mut output = format!(
            "\n{} [{}]\n  {}\n",
            tool.name.yellow().bold(),
            risk,
            tool.description
        );
        for param in &tool.parameters {
            let marker = if param.required { "*" } else { " " };
            output.push_str(&format!(
                "    {}{} ({}) {}\n",
                marker,
                param.name.cyan(),
                param.param_type,
                param.description.dimmed()
            ));
        }
        output
    }

    /// Format a response envelope as pretty JSON
    pub fn format_response(response: &ToolResponse) -> String {
        serde_json::to_string_pretty(response).unwrap_or_else(|_| "{}".to_string())
    }

    fn header(title: &str) -> String {
        format!("{}\n{}", title.cyan().bold(), "=".repeat(title.len()).cyan())
    }
}
