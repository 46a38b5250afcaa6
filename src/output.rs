//! Shared output formatting for tasktogo CLI commands.

use serde::Serialize;

use crate::error::Result;

pub const SCHEMA_VERSION: &str = "tasktogo.v1";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

#[derive(Debug, Clone)]
pub struct HumanOutput {
    header: String,
    summary: Vec<(String, String)>,
    details: Vec<String>,
    warnings: Vec<String>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            summary: Vec::new(),
            details: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn push_summary(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.summary.push((key.into(), value.into()));
    }

    pub fn push_detail(&mut self, value: impl Into<String>) {
        self.details.push(value.into());
    }

    pub fn push_warning(&mut self, value: impl Into<String>) {
        self.warnings.push(value.into());
    }
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        let warnings = human.map(|h| h.warnings.clone()).unwrap_or_default();

        #[derive(Serialize)]
        struct Envelope<'a, T: Serialize> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            data: &'a T,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            warnings: Vec<String>,
        }

        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "success",
            data,
            warnings,
        };

        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if options.quiet {
        return Ok(());
    }

    if let Some(human) = human {
        println!("{}", format_human(human));
    }

    Ok(())
}

pub fn emit_error(command: &str, err: &crate::error::Error, json: bool) -> Result<()> {
    let hint = error_hint(err);
    if json {
        #[derive(Serialize)]
        struct ErrorBody<'a> {
            message: &'a str,
            code: i32,
            kind: &'static str,
            #[serde(skip_serializing_if = "Option::is_none")]
            details: Option<serde_json::Value>,
        }

        #[derive(Serialize)]
        struct Envelope<'a> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            error: ErrorBody<'a>,
            #[serde(skip_serializing_if = "Option::is_none")]
            hint: Option<&'static str>,
        }

        let message = err.to_string();
        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "error",
            error: ErrorBody {
                message: &message,
                code: err.exit_code(),
                kind: error_kind(err),
                details: err.details(),
            },
            hint,
        };

        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    eprintln!("error: {err}");
    if let Some(hint) = hint {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

pub fn format_human(output: &HumanOutput) -> String {
    let mut lines = Vec::new();
    lines.push(output.header.clone());

    push_summary(&mut lines, &output.summary);
    push_section(&mut lines, "Details", &output.details);
    push_section(&mut lines, "Warnings", &output.warnings);

    lines.join("\n")
}

pub fn infer_command_name_from_args() -> String {
    let mut args = std::env::args().skip(1);
    let mut command = None;
    let mut subcommand = None;

    while let Some(arg) = args.next() {
        if arg.starts_with('-') {
            continue;
        }
        command = Some(arg);
        break;
    }

    let command = match command {
        Some(cmd) => cmd,
        None => return "tasktogo".to_string(),
    };

    if matches!(command.as_str(), "task" | "category" | "priority") {
        for arg in args {
            if arg.starts_with('-') {
                continue;
            }
            subcommand = Some(arg);
            break;
        }
    }

    if let Some(sub) = subcommand {
        format!("{command} {sub}")
    } else {
        command
    }
}

fn error_kind(err: &crate::error::Error) -> &'static str {
    match err.exit_code() {
        2 => "user_error",
        3 => "refused",
        _ => "operation_failed",
    }
}

fn error_hint(err: &crate::error::Error) -> Option<&'static str> {
    use crate::error::Error;

    match err {
        Error::TaskNotFound(_) => Some("tasktogo task list"),
        Error::CategoryNotFound(_) => Some("tasktogo category list"),
        Error::PriorityNotFound(_) => Some("tasktogo priority list"),
        Error::ImageNotFound(_) => Some("tasktogo task show <id>"),
        Error::InvalidConfig(_) => Some("fix config.toml then retry"),
        Error::InvalidSnapshot(_) => Some("tasktogo export to see the expected shape"),
        _ => None,
    }
}

fn push_summary(lines: &mut Vec<String>, summary: &[(String, String)]) {
    if summary.is_empty() {
        return;
    }

    lines.push(String::new());
    lines.push("Summary:".to_string());
    for (key, value) in summary {
        if value.is_empty() {
            lines.push(format!("- {key}"));
        } else {
            lines.push(format!("- {key}: {value}"));
        }
    }
}

fn push_section(lines: &mut Vec<String>, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }

    lines.push(String::new());
    lines.push(format!("{title}:"));
    for item in items {
        lines.push(format!("- {item}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_sections_render_in_order() {
        let mut human = HumanOutput::new("Added task");
        human.push_summary("id", "t-1");
        human.push_detail("due: today");
        human.push_warning("1 orphaned task repaired");

        let text = format_human(&human);
        assert!(text.starts_with("Added task"));
        let summary_at = text.find("Summary:").unwrap();
        let details_at = text.find("Details:").unwrap();
        let warnings_at = text.find("Warnings:").unwrap();
        assert!(summary_at < details_at && details_at < warnings_at);
    }

    #[test]
    fn empty_sections_are_omitted() {
        let human = HumanOutput::new("Done");
        assert_eq!(format_human(&human), "Done");
    }
}
