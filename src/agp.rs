//! AGP placement descriptors
//!
//! Each generated OBJ gets a small draped-object wrapper so it can be placed
//! from a scenery library.

use serde::{Deserialize, Serialize};

/// Rotation code written to the `ROTATION` line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgpRotation {
    Normal,
    Mirrored,
}

impl AgpRotation {
    pub fn from_mirrored(mirrored: bool) -> Self {
        if mirrored { Self::Mirrored } else { Self::Normal }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Normal => 0,
            Self::Mirrored => 2,
        }
    }
}

impl Default for AgpRotation {
    fn default() -> Self {
        Self::Normal
    }
}

/// Render the descriptor for `object_name` (an OBJ file name next to the AGP)
pub fn descriptor(object_name: &str, rotation: AgpRotation) -> String {
    format!(
        "A
1000
AG_POINT

TEXTURE ../blank/blank.png
TEXTURE_SCALE 5 5
TEXTURE_WIDTH 10
HIDE_TILES

OBJECT {object_name}

TILE -5 -5 5 5
ROTATION {code}
ANCHOR_PT 0.0 0.0
OBJ_DRAPED 0 0 0 0
",
        code = rotation.code(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_name_interpolated() {
        let agp = descriptor("Safedock-T2-24_3.5m.obj", AgpRotation::Normal);
        assert!(agp.starts_with("A\n1000\nAG_POINT\n"));
        assert!(agp.contains("\nOBJECT Safedock-T2-24_3.5m.obj\n"));
        assert!(agp.contains("\nROTATION 0\n"));
        assert!(agp.ends_with("OBJ_DRAPED 0 0 0 0\n"));
    }

    #[test]
    fn test_mirrored_rotation_code() {
        let normal = descriptor("x.obj", AgpRotation::Normal);
        let mirrored = descriptor("x.obj", AgpRotation::from_mirrored(true));
        assert!(mirrored.contains("\nROTATION 2\n"));
        // nothing else differs
        assert_eq!(normal.replace("ROTATION 0", "ROTATION 2"), mirrored);
    }
}
