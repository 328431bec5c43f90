//! Build recipes - which variants exist and where they go
//!
//! A recipe is a JSON contract. Relative paths in a recipe file are resolved
//! against the directory holding it.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::manifest::DEFAULT_MANIFEST;
use crate::variant::VariantStyle;
use crate::{MIN_RECIPE_VERSION, TOOL_VERSION};

#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("Failed to read recipe {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid recipe JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid version string '{0}'")]
    InvalidVersion(String),

    #[error("Recipe requires tool >= {required}, current is {current}")]
    ToolTooOld { required: String, current: String },

    #[error("Recipe version {0} is older than the oldest supported {1}")]
    RecipeTooOld(String, String),

    #[error("Invalid recipe: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub name: String,
    pub recipe_version: String,
    #[serde(default = "default_tool_min_version")]
    pub tool_min_version: String,
    pub target_dir: PathBuf,
    #[serde(default = "default_output_subdir")]
    pub output_subdir: String,
    #[serde(default = "default_manifest")]
    pub manifest: String,
    #[serde(default)]
    pub textures: Vec<PathBuf>,
    pub families: Vec<VariantFamily>,
}

fn default_tool_min_version() -> String { MIN_RECIPE_VERSION.to_string() }
fn default_output_subdir() -> String { "dgs".to_string() }
fn default_manifest() -> String { DEFAULT_MANIFEST.to_string() }

/// One template and the heights generated from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantFamily {
    pub base_name: String,
    /// Appended after the height, e.g. `_pole`
    #[serde(default)]
    pub suffix: String,
    pub template: PathBuf,
    #[serde(default)]
    pub style: VariantStyle,
    /// Plain OBJ variants
    #[serde(default)]
    pub heights: Vec<f64>,
    /// `_180` OBJ variants
    #[serde(default)]
    pub mirrored_heights: Vec<f64>,
    /// Heights that get both a plain and a `_180` AGP
    #[serde(default)]
    pub agp_heights: Vec<f64>,
}

impl VariantFamily {
    /// `Safedock-T2-24_3.5m_pole`
    pub fn stem(&self, height: f64) -> String {
        format!("{}_{:.1}m{}", self.base_name, height, self.suffix)
    }

    pub fn file_name(&self, height: f64, mirrored: bool, ext: &str) -> String {
        let turn = if mirrored { "_180" } else { "" };
        format!("{}{}.{}", self.stem(height), turn, ext)
    }
}

const SAFEDOCK_HEIGHTS: [f64; 10] = [2.5, 3.0, 3.5, 4.0, 4.5, 5.0, 5.5, 6.0, 6.5, 7.0];
const SAFEDOCK_POLE_HEIGHTS: [f64; 7] = [2.5, 3.0, 3.5, 4.0, 4.5, 5.0, 6.0];

impl Recipe {
    pub fn load(path: &Path) -> Result<Self, RecipeError> {
        let content = fs::read_to_string(path).map_err(|source| RecipeError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut recipe: Recipe = serde_json::from_str(&content)?;
        if let Some(dir) = path.parent() {
            recipe.resolve_relative_to(dir);
        }
        recipe.validate()?;
        Ok(recipe)
    }

    /// The Safedock T2-24 library build, paths relative to the working directory
    pub fn safedock_t2_24() -> Self {
        let src = Path::new("../../AutoDGS/DGSs-Safedock-T2-24");
        let with_zero = |heights: &[f64]| {
            let mut all = vec![0.0];
            all.extend_from_slice(heights);
            all
        };

        Self {
            name: "Safedock-T2-24".to_string(),
            recipe_version: "1.0.0".to_string(),
            tool_min_version: default_tool_min_version(),
            target_dir: PathBuf::from("../openSAM-pkg/openSAM_Library"),
            output_subdir: default_output_subdir(),
            manifest: default_manifest(),
            textures: vec![
                src.join("Safedock-T2-24.png"),
                src.join("Safedock-T2-24_LIT.png"),
            ],
            families: vec![
                VariantFamily {
                    base_name: "Safedock-T2-24".to_string(),
                    suffix: String::new(),
                    template: src.join("Safedock-T2-24.obj"),
                    style: VariantStyle::default(),
                    heights: with_zero(&SAFEDOCK_HEIGHTS),
                    mirrored_heights: SAFEDOCK_HEIGHTS.to_vec(),
                    agp_heights: SAFEDOCK_HEIGHTS.to_vec(),
                },
                VariantFamily {
                    base_name: "Safedock-T2-24".to_string(),
                    suffix: "_pole".to_string(),
                    template: src.join("Safedock-T2-24-pole.obj"),
                    style: VariantStyle::default(),
                    heights: with_zero(&SAFEDOCK_POLE_HEIGHTS),
                    mirrored_heights: SAFEDOCK_POLE_HEIGHTS.to_vec(),
                    agp_heights: SAFEDOCK_POLE_HEIGHTS.to_vec(),
                },
            ],
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.target_dir.join(&self.output_subdir)
    }

    /// Check versions and the shape of every family
    pub fn validate(&self) -> Result<(), RecipeError> {
        let parse = |v: &str| {
            semver::Version::parse(v).map_err(|_| RecipeError::InvalidVersion(v.to_string()))
        };
        let tool = parse(TOOL_VERSION)?;
        let required = parse(&self.tool_min_version)?;
        if tool < required {
            return Err(RecipeError::ToolTooOld {
                required: self.tool_min_version.clone(),
                current: TOOL_VERSION.to_string(),
            });
        }
        if parse(&self.recipe_version)? < parse(MIN_RECIPE_VERSION)? {
            return Err(RecipeError::RecipeTooOld(
                self.recipe_version.clone(),
                MIN_RECIPE_VERSION.to_string(),
            ));
        }

        if self.output_subdir.trim().is_empty() {
            return Err(RecipeError::Invalid("outputSubdir must not be empty".into()));
        }
        if self.families.is_empty() {
            return Err(RecipeError::Invalid("no variant families".into()));
        }
        for family in &self.families {
            if family.base_name.trim().is_empty() {
                return Err(RecipeError::Invalid("family with empty baseName".into()));
            }
            let all = family
                .heights
                .iter()
                .chain(&family.mirrored_heights)
                .chain(&family.agp_heights);
            for h in all {
                if !h.is_finite() {
                    return Err(RecipeError::Invalid(format!(
                        "{}: height {} is not a number",
                        family.base_name, h
                    )));
                }
            }
        }
        Ok(())
    }

    fn resolve_relative_to(&mut self, dir: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = dir.join(&*p);
            }
        };
        resolve(&mut self.target_dir);
        self.textures.iter_mut().for_each(resolve);
        for family in &mut self.families {
            resolve(&mut family.template);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_names() {
        let recipe = Recipe::safedock_t2_24();
        let dock = &recipe.families[0];
        let pole = &recipe.families[1];
        assert_eq!(dock.file_name(0.0, false, "obj"), "Safedock-T2-24_0.0m.obj");
        assert_eq!(dock.file_name(3.0, true, "agp"), "Safedock-T2-24_3.0m_180.agp");
        assert_eq!(pole.file_name(4.5, true, "obj"), "Safedock-T2-24_4.5m_pole_180.obj");
    }

    #[test]
    fn test_builtin_recipe_shape() {
        let recipe = Recipe::safedock_t2_24();
        recipe.validate().unwrap();
        assert_eq!(recipe.families[0].heights.len(), 11);
        assert_eq!(recipe.families[0].heights[0], 0.0);
        assert_eq!(recipe.families[1].mirrored_heights.len(), 7);
        assert_eq!(recipe.output_dir(), Path::new("../openSAM-pkg/openSAM_Library/dgs"));
    }

    #[test]
    fn test_load_resolves_paths_and_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recipe.json");
        fs::write(
            &path,
            r#"{
                "name": "test",
                "recipeVersion": "1.0.0",
                "targetDir": "out",
                "families": [
                    { "baseName": "Sign", "template": "sign.obj", "heights": [3] }
                ]
            }"#,
        )
        .unwrap();

        let recipe = Recipe::load(&path).unwrap();
        assert_eq!(recipe.target_dir, dir.path().join("out"));
        assert_eq!(recipe.families[0].template, dir.path().join("sign.obj"));
        assert_eq!(recipe.output_subdir, "dgs");
        assert_eq!(recipe.manifest, "library.txt");
        assert_eq!(recipe.families[0].style, VariantStyle::default());
    }

    #[test]
    fn test_future_tool_version_rejected() {
        let mut recipe = Recipe::safedock_t2_24();
        recipe.tool_min_version = "99.0.0".to_string();
        assert!(matches!(recipe.validate(), Err(RecipeError::ToolTooOld { .. })));

        recipe.tool_min_version = "one".to_string();
        assert!(matches!(recipe.validate(), Err(RecipeError::InvalidVersion(_))));
    }

    #[test]
    fn test_empty_output_subdir_rejected() {
        let mut recipe = Recipe::safedock_t2_24();
        recipe.output_subdir = String::new();
        assert!(matches!(recipe.validate(), Err(RecipeError::Invalid(_))));
    }

    #[test]
    fn test_empty_families_rejected() {
        let mut recipe = Recipe::safedock_t2_24();
        recipe.families.clear();
        assert!(matches!(recipe.validate(), Err(RecipeError::Invalid(_))));
    }
}
