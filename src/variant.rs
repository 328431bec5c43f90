//! Variant Generator - one transformer, two template conventions
//!
//! Section style wraps every LOD block in an animation scope and injects a
//! static offset. Placeholder style replaces an offset token in place.

use serde::{Deserialize, Serialize};

use crate::template::Template;

pub const ANIM_BEGIN: &str = "ANIM_begin\n";
pub const ANIM_END: &str = "ANIM_end\n";
pub const ROTATE_180: &str = "    ANIM_rotate 0 1 0 180 180 0 1 no_ref\n";

pub const DEFAULT_EPSILON: f64 = 0.03;

/// Height and orientation of one variant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VariantParams {
    pub height: f64,
    #[serde(default)]
    pub mirrored: bool,
}

impl VariantParams {
    pub fn new(height: f64, mirrored: bool) -> Self {
        Self { height, mirrored }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum VariantStyle {
    Section(SectionRules),
    Placeholder(PlaceholderRules),
}

impl Default for VariantStyle {
    fn default() -> Self {
        Self::Section(SectionRules::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SectionRules {
    pub section_marker: String,
    pub exclude_begin: String,
    pub exclude_end: String,
    pub rename_from: String,
    pub rename_to: String,
    pub baseline: f64,
    pub epsilon: f64,
    pub precision: usize,
}

impl Default for SectionRules {
    fn default() -> Self {
        Self {
            section_marker: "LOD".to_string(),
            exclude_begin: "# NO-openSAM_begin".to_string(),
            exclude_end: "# NO-openSAM_end".to_string(),
            rename_from: "AutoDGS".to_string(),
            rename_to: "opensam".to_string(),
            baseline: 0.0,
            epsilon: DEFAULT_EPSILON,
            precision: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlaceholderRules {
    pub placeholder: String,
    pub baseline: f64,
    pub epsilon: f64,
    pub precision: usize,
}

impl Default for PlaceholderRules {
    fn default() -> Self {
        Self {
            placeholder: "$DH".to_string(),
            baseline: 5.0,
            epsilon: DEFAULT_EPSILON,
            precision: 4,
        }
    }
}

/// Output of a transform, lines with their terminators
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedLines(Vec<String>);

impl GeneratedLines {
    pub fn lines(&self) -> &[String] {
        &self.0
    }

    pub fn to_text(&self) -> String {
        self.0.concat()
    }

    /// Number of lines containing `needle`
    pub fn count_containing(&self, needle: &str) -> usize {
        self.0.iter().filter(|l| l.contains(needle)).count()
    }

    fn push(&mut self, line: impl Into<String>) {
        self.0.push(line.into());
    }
}

impl VariantStyle {
    pub fn transform(&self, template: &Template, params: &VariantParams) -> GeneratedLines {
        match self {
            Self::Section(rules) => inject_sections(rules, template, params),
            Self::Placeholder(rules) => substitute_placeholder(rules, template, params),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Section(_) => "section",
            Self::Placeholder(_) => "placeholder",
        }
    }
}

// An empty token never matches; `str::contains("")` would match every line.
fn has_token(line: &str, token: &str) -> bool {
    !token.is_empty() && line.contains(token)
}

fn is_comment(line: &str) -> bool {
    line.starts_with('#')
}

fn inject_sections(rules: &SectionRules, template: &Template, params: &VariantParams) -> GeneratedLines {
    let delta = params.height - rules.baseline;
    let mut out = GeneratedLines(Vec::with_capacity(template.len() + 16));
    let mut first_section = true;
    let mut excluded: i32 = 0;

    for raw in template.lines() {
        if has_token(raw, &rules.exclude_end) {
            excluded -= 1;
            continue;
        } else if has_token(raw, &rules.exclude_begin) {
            excluded += 1;
        }

        if excluded > 0 {
            continue;
        }

        let line = if rules.rename_from.is_empty() {
            raw.clone()
        } else {
            raw.replace(&rules.rename_from, &rules.rename_to)
        };

        if !has_token(&line, &rules.section_marker) {
            out.push(line);
            continue;
        }

        if !first_section {
            out.push(ANIM_END);
        }
        first_section = false;

        let mirror = params.mirrored && !is_comment(&line);
        let mut line = line;
        if !line.ends_with('\n') {
            line.push('\n');
        }
        out.push(line);
        out.push(ANIM_BEGIN);
        if mirror {
            out.push(ROTATE_180);
        }
        if delta.abs() > rules.epsilon {
            out.push(format!(
                "    ANIM_trans\t   0.0000    {d:.p$}    0.0000\t   0.0000    {d:.p$}    0.0000\t0 0\tno_ref\n",
                d = delta,
                p = rules.precision,
            ));
        }
    }

    // close the last section
    out.push("\n");
    out.push(ANIM_END);
    out
}

fn substitute_placeholder(
    rules: &PlaceholderRules,
    template: &Template,
    params: &VariantParams,
) -> GeneratedLines {
    let offset = params.height - rules.baseline;
    let noop = offset.abs() <= rules.epsilon;
    let value = format!("{:.*}", rules.precision, offset);
    let mut out = GeneratedLines(Vec::with_capacity(template.len() + 4));

    for line in template.lines() {
        if !has_token(line, &rules.placeholder) {
            out.push(line.as_str());
            continue;
        }

        if params.mirrored && !is_comment(line) {
            out.push(ROTATE_180);
        }
        if noop {
            continue;
        }
        out.push(line.replace(&rules.placeholder, &value));
    }

    out
}
