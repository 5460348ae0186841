//! Plain-text rendering of a finished plan, shared by the CLI and the export
//! endpoint.

use crate::models::{LearningPlan, Provenance, Topic};
use std::fmt::Write;

const RULE_WIDTH: usize = 60;

/// Renders `plan` as a printable document. Fallback sections are marked.
pub fn render_text(plan: &LearningPlan) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    let _ = writeln!(out, "PERSONALIZED LEARNING PLAN");
    let _ = writeln!(out, "Topic: {}", plan.topic);
    let _ = writeln!(
        out,
        "Generated: {}",
        plan.generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(out, "{}\n", rule);

    for entry in &plan.modules {
        let module = &entry.module;
        let _ = writeln!(out, "MODULE {}: {}", module.index, module.title);
        if !module.description.is_empty() {
            let _ = writeln!(out, "  {}", module.description);
        }
        match (&entry.resources_source, entry.resources.is_empty()) {
            (Provenance::Fallback { reason }, _) => {
                let _ = writeln!(out, "  [fallback] No resources found ({})", reason);
            }
            (Provenance::Agent, true) => {
                let _ = writeln!(out, "  (No resources found)");
            }
            (Provenance::Agent, false) => {
                for res in &entry.resources {
                    let _ = writeln!(out, "  * {}", res.title);
                    let _ = writeln!(out, "    {}", res.url);
                    if !res.note.is_empty() {
                        let _ = writeln!(out, "    {}", res.note);
                    }
                }
            }
        }
        out.push('\n');
    }

    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "RECOMMENDED CAPSTONE PROJECT:");
    let _ = writeln!(out, "{}", rule);
    if let Provenance::Fallback { reason } = &plan.project.source {
        let _ = writeln!(out, "[fallback] {}", reason);
    }
    let _ = writeln!(out, "{}", plan.project.idea.title);
    let _ = writeln!(out, "{}", plan.project.idea.description);

    let degraded = plan.degraded_sections();
    if !degraded.is_empty() {
        let _ = writeln!(out, "\nNote: fallback content used for {}.", degraded.join(", "));
    }
    out
}

/// Download name for an exported plan, e.g. `learning_plan_Learn_Rust.txt`.
pub fn export_file_name(topic: &Topic) -> String {
    let slug: String = topic
        .as_str()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("learning_plan_{}.txt", slug)
}

impl std::fmt::Display for LearningPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&render_text(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Module, ModulePlan, ProjectIdea, ProjectSection, Resource};
    use chrono::{TimeZone, Utc};

    fn plan(project_source: Provenance) -> LearningPlan {
        LearningPlan {
            topic: Topic::new("Learn Python").unwrap(),
            modules: vec![
                ModulePlan {
                    module: Module {
                        index: 1,
                        title: "Basics".to_string(),
                        description: "Syntax and types".to_string(),
                    },
                    resources: vec![Resource {
                        title: "Tutorial".to_string(),
                        url: "https://docs.python.org/3/tutorial/".to_string(),
                        note: "Official walkthrough.".to_string(),
                    }],
                    resources_source: Provenance::Agent,
                },
                ModulePlan {
                    module: Module {
                        index: 2,
                        title: "Pandas".to_string(),
                        description: String::new(),
                    },
                    resources: vec![],
                    resources_source: Provenance::Fallback {
                        reason: "no valid resource URLs found".to_string(),
                    },
                },
            ],
            project: ProjectSection {
                idea: ProjectIdea {
                    title: "Sales dashboard".to_string(),
                    description: "Analyze a CSV of sales.".to_string(),
                },
                source: project_source,
            },
            generated_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_render_lists_modules_and_marks_fallback() {
        let text = render_text(&plan(Provenance::Agent));
        assert!(text.starts_with("PERSONALIZED LEARNING PLAN\nTopic: Learn Python\n"));
        assert!(text.contains("Generated: 2024-05-01 12:30 UTC"));
        assert!(text.contains("MODULE 1: Basics\n  Syntax and types\n  * Tutorial\n"));
        assert!(text.contains("MODULE 2: Pandas\n  [fallback] No resources found"));
        assert!(text.contains("Sales dashboard\nAnalyze a CSV of sales.\n"));
        assert!(text.contains("fallback content used for resources for module 2."));
        assert!(text.find("MODULE 1").unwrap() < text.find("MODULE 2").unwrap());
    }

    #[test]
    fn test_render_marks_placeholder_project() {
        let text = render_text(&plan(Provenance::Fallback {
            reason: "timed out".to_string(),
        }));
        assert!(text.contains("RECOMMENDED CAPSTONE PROJECT:\n"));
        assert!(text.contains("[fallback] timed out\nSales dashboard"));
        assert!(text.contains("module 2, capstone project."));
    }

    #[test]
    fn test_export_file_name_replaces_separators() {
        let topic = Topic::new("Learn C++ / Qt").unwrap();
        assert_eq!(export_file_name(&topic), "learning_plan_Learn_C_____Qt.txt");
        let topic = Topic::new("Rust").unwrap();
        assert_eq!(export_file_name(&topic), "learning_plan_Rust.txt");
    }
}
