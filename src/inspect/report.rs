//! Inspect report types and terminal formatting.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::model::{AnnotationSet, Canvas, LanguageEntry};

const BOX_WIDTH: usize = 59;

/// The result of inspecting a manifest. Serializes to the full projection.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectReport {
    pub id: Option<String>,
    pub label: Option<String>,
    /// Presentation API version of the source document.
    pub version: Option<String>,
    pub summary: SummarySection,
    /// Canvas count per painted media kind.
    pub media: Vec<MediaCount>,
    pub start_canvas: Option<String>,
    pub canvases: Vec<Canvas>,
    pub annotation_sets: Vec<AnnotationSet>,
    pub languages: Vec<LanguageEntry>,
    /// Raw table-of-contents ranges.
    pub structures: Vec<Value>,
    #[serde(skip)]
    pub(crate) bar_width: usize,
}

/// Summary counts for the manifest.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarySection {
    pub canvases: usize,
    pub canvases_with_media: usize,
    pub annotations: usize,
    pub annotation_sets: usize,
    pub languages: usize,
    /// Ranges at any depth of the table of contents.
    pub ranges: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MediaCount {
    pub kind: String,
    pub count: usize,
}

/// The result of inspecting a collection.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionReport {
    pub id: Option<String>,
    pub label: Option<String>,
    pub version: Option<String>,
    pub members: Vec<MemberEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MemberEntry {
    pub id: Option<String>,
    pub kind: String,
    pub label: Option<String>,
}

impl fmt::Display for InspectReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "╭─────────────────────────────────────────────────────────────╮")?;
        writeln!(f, "│                  Manifest Inspection Report                 │")?;
        writeln!(f, "╰─────────────────────────────────────────────────────────────╯")?;
        writeln!(f)?;

        self.fmt_summary(f)?;
        writeln!(f)?;
        self.fmt_media(f)?;
        writeln!(f)?;
        self.fmt_sets(f)?;
        writeln!(f)?;
        self.fmt_languages(f)?;

        Ok(())
    }
}

impl InspectReport {
    fn fmt_summary(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.summary;

        box_top(f, "Summary")?;
        if let Some(label) = &self.label {
            box_line(f, &format!("Label:         {}", truncate_label(label, 40)))?;
        }
        if let Some(version) = &self.version {
            box_line(f, &format!("Presentation:  {version}"))?;
        }
        box_line(f, "")?;
        box_line(f, &format!("Canvases:      {:>8}", format_number(s.canvases)))?;
        box_line(f, &format!("Annotations:   {:>8}", format_number(s.annotations)))?;
        box_line(f, &format!("Sets:          {:>8}", format_number(s.annotation_sets)))?;
        if s.ranges > 0 {
            box_line(f, &format!("Ranges:        {:>8}", format_number(s.ranges)))?;
        }
        box_line(f, "")?;
        box_line(
            f,
            &format!(
                "With media:    {:>8} of {} ({})",
                format_number(s.canvases_with_media),
                format_number(s.canvases),
                fmt_percent(s.canvases_with_media, s.canvases)
            ),
        )?;
        if let Some(start) = &self.start_canvas {
            box_line(f, &format!("Start canvas:  {}", truncate_label(start, 40)))?;
        }
        box_bottom(f)
    }

    fn fmt_media(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        box_top(f, "Painted media")?;
        if self.media.is_empty() {
            box_line(f, "No canvases found.")?;
        } else {
            let max_count = self.media.iter().map(|m| m.count).max().unwrap_or(1);
            for entry in &self.media {
                let bar = render_bar(entry.count, max_count, self.bar_width);
                box_line(
                    f,
                    &format!(
                        "{:<10} {:>7} {:>6}  {}",
                        entry.kind,
                        format_number(entry.count),
                        fmt_percent(entry.count, self.summary.canvases),
                        bar
                    ),
                )?;
            }
        }
        box_bottom(f)
    }

    fn fmt_sets(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        box_top(f, &format!("Annotation sets ({})", self.annotation_sets.len()))?;
        if self.annotation_sets.is_empty() {
            box_line(f, "No annotation sets found.")?;
        }
        for set in &self.annotation_sets {
            let name = set.label.as_deref().unwrap_or(&set.id);
            box_line(f, &truncate_label(name, 52))?;
            if let Some(creator) = &set.creator {
                box_line(f, &format!("  by {}", truncate_label(creator, 48)))?;
            }
        }
        box_bottom(f)
    }

    fn fmt_languages(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        box_top(f, &format!("Languages ({})", self.languages.len()))?;
        if self.languages.is_empty() {
            box_line(f, "No language-tagged values.")?;
        }
        for language in &self.languages {
            box_line(f, &format!("{:<6} {}", language.code, language.name))?;
        }
        box_bottom(f)
    }
}

impl fmt::Display for CollectionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = match &self.label {
            Some(label) => format!("Collection: {}", truncate_label(label, 40)),
            None => "Collection".to_string(),
        };
        box_top(f, &title)?;
        if let Some(version) = &self.version {
            box_line(f, &format!("Presentation:  {version}"))?;
        }
        box_line(f, &format!("Members:       {:>8}", format_number(self.members.len())))?;
        box_line(f, "")?;
        for member in &self.members {
            let name = member
                .label
                .as_deref()
                .or(member.id.as_deref())
                .unwrap_or("(unnamed)");
            box_line(f, &format!("{:<10} {}", member.kind, truncate_label(name, 42)))?;
        }
        box_bottom(f)
    }
}

fn box_top(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    let rule = "─".repeat(BOX_WIDTH.saturating_sub(title.chars().count() + 3));
    writeln!(f, "┌─ {title} {rule}┐")?;
    box_line(f, "")
}

fn box_line(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    let padding = (BOX_WIDTH - 3).saturating_sub(text.chars().count());
    writeln!(f, "│   {text}{}│", " ".repeat(padding))
}

fn box_bottom(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    box_line(f, "")?;
    writeln!(f, "└{}┘", "─".repeat(BOX_WIDTH))
}

/// Format a number with thousands separators.
fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Format a percentage, handling zero denominators.
fn fmt_percent(numerator: usize, denominator: usize) -> String {
    if denominator == 0 {
        "n/a".to_string()
    } else {
        format!("{:.1}%", (numerator as f64 / denominator as f64) * 100.0)
    }
}

/// Render a horizontal bar using Unicode block characters.
fn render_bar(count: usize, max_count: usize, width: usize) -> String {
    if max_count == 0 || width == 0 {
        return String::new();
    }
    let filled = ((count * width) / max_count).min(width);
    "█".repeat(filled) + &"░".repeat(width - filled)
}

/// Truncate a label to fit in the display column.
fn truncate_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        label.to_string()
    } else {
        let kept: String = label.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}
