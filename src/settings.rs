//! This module handles a TOML settings file.

use std::fs::File;
use std::io::prelude::*;
use toml;

const DEFAULT_BUILD_COMMAND: &str = "make";
const DEFAULT_IMAGE_WIDTH: u32 = 3200;
const DEFAULT_IMAGE_HEIGHT: u32 = 1760;

error_chain! {
    foreign_links {
        TOMLError(toml::de::Error);
        Io(::std::io::Error);
    }

    errors {
        /// A structurally valid parameter file with nonsensical values.
        Validation(msg: String) {
            description("invalid settings")
            display("invalid settings: {}", msg)
        }
    }
}

/// Structure that holds settings, which are defined externally in a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub simulation: SimulationSettings,
    pub sampling: SamplingSettings,
    #[serde(default)]
    pub image: ImageSettings,
    pub fields: Vec<FieldSpec>,
}

/// Holds everything concerning the external simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationSettings {
    /// Working directory of the external run; snapshot files appear here.
    pub directory: String,
    /// Shell command that builds and executes the simulation.
    #[serde(default = "default_build_command")]
    pub build_command: String,
    /// Number of snapshot frames the run produces (frame indices `0..total_frames`).
    pub total_frames: usize,
}

/// Shape of the panel grid; its capacity is the number of sampled frames.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SamplingSettings {
    pub rows: usize,
    pub columns: usize,
}

impl SamplingSettings {
    /// Number of panels in the grid.
    pub fn capacity(&self) -> usize {
        self.rows * self.columns
    }
}

/// Fixed pixel resolution shared by all composites of a run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ImageSettings {
    #[serde(default = "default_image_width")]
    pub width: u32,
    #[serde(default = "default_image_height")]
    pub height: u32,
}

impl Default for ImageSettings {
    fn default() -> ImageSettings {
        ImageSettings {
            width: DEFAULT_IMAGE_WIDTH,
            height: DEFAULT_IMAGE_HEIGHT,
        }
    }
}

/// One entry of the field registry: which quantity to sweep and how to draw it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    /// Hierarchical field key as stored in the snapshot, e.g. `"Electric Field/Ex"`.
    pub key: String,
    pub mode: RenderMode,
}

/// Rendering path of a panel. The field's array rank decides which one is legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderMode {
    /// 1D series drawn against its index.
    Line,
    /// 2D data drawn as a cell raster; 3D data contributes its `[.., .., 0]` slice.
    Image,
}

impl RenderMode {
    /// Whether an array of the given rank can be drawn in this mode.
    pub fn accepts_rank(self, rank: usize) -> bool {
        match self {
            RenderMode::Line => rank == 1,
            RenderMode::Image => rank == 2 || rank == 3,
        }
    }
}

fn default_build_command() -> String {
    DEFAULT_BUILD_COMMAND.to_string()
}

fn default_image_width() -> u32 {
    DEFAULT_IMAGE_WIDTH
}

fn default_image_height() -> u32 {
    DEFAULT_IMAGE_HEIGHT
}

impl Settings {
    /// Rejects geometry a run could never work with.
    fn validate(&self) -> Result<()> {
        if self.simulation.total_frames == 0 {
            bail!(ErrorKind::Validation(
                "'simulation.total_frames' must be positive".to_string()
            ));
        }
        if self.sampling.rows == 0 || self.sampling.columns == 0 {
            bail!(ErrorKind::Validation(
                "'sampling.rows' and 'sampling.columns' must be positive".to_string()
            ));
        }
        if self.sampling.capacity() < 2 {
            bail!(ErrorKind::Validation(
                "the panel grid must hold at least two frames".to_string()
            ));
        }
        if self.image.width == 0 || self.image.height == 0 {
            bail!(ErrorKind::Validation(
                "'image.width' and 'image.height' must be positive".to_string()
            ));
        }
        Ok(())
    }
}

/// Reads the content of a file `filename` into a string and returns it.
fn read_from_file(filename: &str) -> Result<String> {
    let mut f = File::open(filename)?;
    let mut content = String::new();
    f.read_to_string(&mut content)?;

    Ok(content)
}

/// Reads the content of a file `param_file`, that should point to a valid TOML
/// file, and parses it. Then returns the deserialized data in form of a
/// Settings struct.
pub fn read_parameter_file(param_file: &str) -> Result<Settings> {
    // read .toml file into string
    let toml_string = read_from_file(param_file)
        .chain_err(|| format!("unable to read parameter file '{}'", param_file))?;

    let settings: Settings = toml::from_str(&toml_string)?;
    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_settings() {
        // anchored to the crate root; other tests may move the process
        // working directory around
        let settings =
            read_parameter_file(concat!(env!("CARGO_MANIFEST_DIR"), "/test/parameter.toml"))
                .unwrap();

        assert_eq!(settings.simulation.directory, "twostream");
        assert_eq!(settings.simulation.build_command, "make");
        assert_eq!(settings.simulation.total_frames, 101);
        assert_eq!(settings.sampling.rows, 3);
        assert_eq!(settings.sampling.columns, 5);
        assert_eq!(settings.sampling.capacity(), 15);
        assert_eq!(settings.image.width, 3200);
        assert_eq!(settings.image.height, 1760);
        assert_eq!(settings.fields.len(), 7);
        assert_eq!(settings.fields[0].key, "Electric Field/Ex");
        assert_eq!(settings.fields[0].mode, RenderMode::Line);
        assert_eq!(settings.fields[5].key, "dist_fn/x_px/Right");
        assert_eq!(settings.fields[5].mode, RenderMode::Image);
    }

    #[test]
    fn default_build_command_and_resolution() {
        let toml_str = r#"
            [simulation]
            directory = "run"
            total_frames = 101

            [sampling]
            rows = 3
            columns = 5

            [[fields]]
            key = "Current/Jx"
            mode = "Line"
        "#;

        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.simulation.build_command, "make");
        assert_eq!(settings.image.width, 3200);
        assert_eq!(settings.image.height, 1760);
    }

    #[test]
    fn rejects_empty_grid() {
        let toml_str = r#"
            [simulation]
            directory = "run"
            total_frames = 101

            [sampling]
            rows = 0
            columns = 5

            [[fields]]
            key = "Current/Jx"
            mode = "Line"
        "#;

        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn mode_rank_compatibility() {
        assert!(RenderMode::Line.accepts_rank(1));
        assert!(!RenderMode::Line.accepts_rank(2));
        assert!(RenderMode::Image.accepts_rank(2));
        assert!(RenderMode::Image.accepts_rank(3));
        assert!(!RenderMode::Image.accepts_rank(1));
        assert!(!RenderMode::Image.accepts_rank(4));
    }
}
