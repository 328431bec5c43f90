//! Build Pipeline - single entry point for a library build
//!
//! Order is fixed: per family OBJ variants then AGP descriptors, then
//! textures, then the library check. The check is advisory and never fails a build.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use chrono::{DateTime, Utc};

use crate::agp::{self, AgpRotation};
use crate::hashing::{compute_build_hash, sha256_hex};
use crate::manifest::ManifestCheck;
use crate::recipe::{Recipe, RecipeError, VariantFamily};
use crate::template::{Template, TemplateCache, TemplateError};
use crate::variant::{GeneratedLines, VariantParams, VariantStyle};
use crate::TOOL_VERSION;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Recipe(#[from] RecipeError),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy texture {from} to {to}: {source}")]
    CopyTexture {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Texture path has no file name: {0}")]
    TextureName(PathBuf),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Obj,
    Agp,
}

impl FileKind {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Obj => "obj",
            Self::Agp => "agp",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedFile {
    /// Relative to the library root, e.g. `dgs/Safedock-T2-24_3.0m.obj`
    pub path: String,
    pub kind: FileKind,
    pub height: f64,
    pub mirrored: bool,
    pub sha256: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopiedTexture {
    pub source: PathBuf,
    pub dest: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildReport {
    pub recipe: String,
    pub tool_version: String,
    pub created_at: DateTime<Utc>,
    pub target_dir: PathBuf,
    pub build_hash: String,
    pub files: Vec<GeneratedFile>,
    pub textures: Vec<CopiedTexture>,
    #[serde(default)]
    pub manifest: Option<ManifestCheck>,
    #[serde(default)]
    pub manifest_error: Option<String>,
}

impl BuildReport {
    /// `None` when the check was skipped or could not run
    pub fn library_complete(&self) -> Option<bool> {
        self.manifest.as_ref().map(ManifestCheck::is_complete)
    }

    /// What the operator sees on stdout
    pub fn operator_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.files.iter().map(|f| f.path.clone()).collect();
        lines.extend(
            self.textures
                .iter()
                .map(|t| format!("Copied: '{}'", t.dest.display())),
        );
        if let Some(check) = &self.manifest {
            lines.extend(check.report_lines());
        }
        if let Some(err) = &self.manifest_error {
            lines.push(format!("Library check skipped: {}", err));
        }
        lines
    }
}

/// Transform one template without touching the filesystem
pub fn generate(template: &Template, style: &VariantStyle, params: VariantParams) -> GeneratedLines {
    style.transform(template, &params)
}

/// Load a template and transform it
pub fn render_variant(
    template_path: &Path,
    style: &VariantStyle,
    params: VariantParams,
) -> Result<GeneratedLines, BuildError> {
    let template = Template::load(template_path)?;
    Ok(generate(&template, style, params))
}

pub struct BuildPipeline {
    recipe: Recipe,
    templates: TemplateCache,
    check_library: bool,
}

impl BuildPipeline {
    pub fn new(recipe: Recipe) -> Self {
        Self {
            recipe,
            templates: TemplateCache::new(),
            check_library: true,
        }
    }

    /// Skip the library check at the end of a build
    pub fn without_check(mut self) -> Self {
        self.check_library = false;
        self
    }

    /// Seed the template cache, e.g. with in-memory templates
    pub fn with_template(mut self, template: Template) -> Self {
        self.templates.register(template);
        self
    }

    pub fn build(&mut self) -> Result<BuildReport, BuildError> {
        self.recipe.validate()?;

        let out_dir = self.recipe.output_dir();
        fs::create_dir_all(&out_dir).map_err(|source| BuildError::Write {
            path: out_dir.clone(),
            source,
        })?;

        tracing::info!(
            recipe = %self.recipe.name,
            out_dir = %out_dir.display(),
            families = self.recipe.families.len(),
            "building variants"
        );

        let subdir = self.recipe.output_subdir.as_str();
        let mut files = vec![];

        for family in &self.recipe.families {
            let template = self.templates.load(&family.template)?;
            files.extend(write_objects(&out_dir, subdir, family, template)?);
            files.extend(write_descriptors(&out_dir, subdir, family)?);
        }

        let textures = copy_textures(&self.recipe.textures, &out_dir)?;

        let (manifest, manifest_error) = if self.check_library {
            match ManifestCheck::run(&self.recipe.target_dir, &self.recipe.manifest) {
                Ok(check) => (Some(check), None),
                Err(e) => {
                    tracing::warn!(error = %e, "library check could not run");
                    (None, Some(e.to_string()))
                }
            }
        } else {
            (None, None)
        };

        let build_hash = compute_build_hash(&self.recipe.name, TOOL_VERSION, files.as_slice())?;
        tracing::info!(files = files.len(), textures = textures.len(), %build_hash, "build finished");

        Ok(BuildReport {
            recipe: self.recipe.name.clone(),
            tool_version: TOOL_VERSION.to_string(),
            created_at: Utc::now(),
            target_dir: self.recipe.target_dir.clone(),
            build_hash,
            files,
            textures,
            manifest,
            manifest_error,
        })
    }
}

fn write_objects(
    out_dir: &Path,
    subdir: &str,
    family: &VariantFamily,
    template: &Template,
) -> Result<Vec<GeneratedFile>, BuildError> {
    let plain = family.heights.iter().map(|&h| VariantParams::new(h, false));
    let turned = family.mirrored_heights.iter().map(|&h| VariantParams::new(h, true));

    tracing::debug!(
        family = %format!("{}{}", family.base_name, family.suffix),
        style = family.style.name(),
        template = %template.source.display(),
        "generating objects"
    );

    plain
        .chain(turned)
        .map(|params| {
            let lines = generate(template, &family.style, params);
            let name = family.file_name(params.height, params.mirrored, FileKind::Obj.extension());
            write_output(out_dir, subdir, &name, FileKind::Obj, params, &lines.to_text())
        })
        .collect()
}

fn write_descriptors(
    out_dir: &Path,
    subdir: &str,
    family: &VariantFamily,
) -> Result<Vec<GeneratedFile>, BuildError> {
    let mut files = vec![];
    for mirrored in [false, true] {
        for &height in &family.agp_heights {
            let object = family.file_name(height, false, FileKind::Obj.extension());
            let text = agp::descriptor(&object, AgpRotation::from_mirrored(mirrored));
            let name = family.file_name(height, mirrored, FileKind::Agp.extension());
            let params = VariantParams::new(height, mirrored);
            files.push(write_output(out_dir, subdir, &name, FileKind::Agp, params, &text)?);
        }
    }
    Ok(files)
}

fn write_output(
    out_dir: &Path,
    subdir: &str,
    name: &str,
    kind: FileKind,
    params: VariantParams,
    contents: &str,
) -> Result<GeneratedFile, BuildError> {
    let path = out_dir.join(name);
    fs::write(&path, contents).map_err(|source| BuildError::Write {
        path: path.clone(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = contents.len(), "wrote variant");

    Ok(GeneratedFile {
        path: format!("{}/{}", subdir, name),
        kind,
        height: params.height,
        mirrored: params.mirrored,
        sha256: sha256_hex(contents.as_bytes()),
    })
}

fn copy_textures(textures: &[PathBuf], out_dir: &Path) -> Result<Vec<CopiedTexture>, BuildError> {
    textures
        .iter()
        .map(|source| {
            let name = source
                .file_name()
                .ok_or_else(|| BuildError::TextureName(source.clone()))?;
            let dest = out_dir.join(name);
            fs::copy(source, &dest).map_err(|e| BuildError::CopyTexture {
                from: source.clone(),
                to: dest.clone(),
                source: e,
            })?;
            tracing::debug!(dest = %dest.display(), "copied texture");
            Ok(CopiedTexture { source: source.clone(), dest })
        })
        .collect()
}
