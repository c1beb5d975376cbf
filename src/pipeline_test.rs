use super::*;
use crate::errors::ErrorKind;
use crate::settings::{
    FieldSpec, ImageSettings, RenderMode, SamplingSettings, Settings, SimulationSettings,
};
use crate::snapshot::{Header, Snapshot};
use ndarray::{ArrayD, IxDyn};
use std::collections::BTreeMap;
use std::env;
use std::fs;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = env::temp_dir().join(format!(
        "snapshotsweep_pipeline_{}_{}",
        name,
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_run(dir: &Path, total_frames: usize) {
    for frame in 0..total_frames {
        let mut fields = BTreeMap::new();
        fields.insert(
            "Derived/Charge_Density".to_string(),
            ArrayD::from_shape_fn(IxDyn(&[10]), |i| frame as f64 + i[0] as f64),
        );
        fields.insert(
            "dist_fn/x_px/Right".to_string(),
            ArrayD::from_shape_fn(IxDyn(&[5, 4, 2]), |i| (frame + i[0] * i[1]) as f64),
        );

        let snapshot = Snapshot {
            header: Header {
                time: frame as f64 * 1e-4,
                step: frame,
            },
            fields,
        };
        snapshot.write(dir, frame).unwrap();
    }
}

fn test_settings(total_frames: usize, fields: Vec<FieldSpec>) -> Settings {
    Settings {
        simulation: SimulationSettings {
            directory: "unused".to_string(),
            build_command: "true".to_string(),
            total_frames,
        },
        sampling: SamplingSettings { rows: 3, columns: 5 },
        image: ImageSettings {
            width: 1000,
            height: 550,
        },
        fields,
    }
}

fn reference_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec {
            key: "Derived/Charge_Density".to_string(),
            mode: RenderMode::Line,
        },
        FieldSpec {
            key: "dist_fn/x_px/Right".to_string(),
            mode: RenderMode::Image,
        },
    ]
}

#[test]
fn full_sweep_writes_one_composite_per_key() {
    let snapshots = scratch_dir("sweep_in");
    let outputs = scratch_dir("sweep_out");
    write_run(&snapshots, 101);

    let settings = test_settings(101, reference_fields());
    let pipeline = EvolutionPipeline::new(&settings, &snapshots, &outputs).unwrap();

    let written = pipeline.run().unwrap();
    assert_eq!(written.len(), 2);
    assert!(outputs.join("Derived_Charge_Density.png").exists());
    assert!(outputs.join("dist_fn_x_px_Right.png").exists());

    // a second run reproduces exactly the same file set
    pipeline.run().unwrap();
    let mut names: Vec<String> = fs::read_dir(&outputs)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec!["Derived_Charge_Density.png", "dist_fn_x_px_Right.png"]
    );
}

#[test]
fn missing_key_fails_before_rendering() {
    let snapshots = scratch_dir("missing_key_in");
    let outputs = scratch_dir("missing_key_out");
    write_run(&snapshots, 101);

    let mut fields = reference_fields();
    fields.push(FieldSpec {
        key: "Electric Field/Ex".to_string(),
        mode: RenderMode::Line,
    });

    let settings = test_settings(101, fields);
    let pipeline = EvolutionPipeline::new(&settings, &snapshots, &outputs).unwrap();

    let err = pipeline.run().unwrap_err();
    match err.kind() {
        ErrorKind::FieldNotFound(key, frame) => {
            assert_eq!(key, "Electric Field/Ex");
            assert_eq!(*frame, 0);
        }
        other => panic!("unexpected error: {:?}", other),
    }

    // registry validation happens before any composite is drawn
    assert_eq!(fs::read_dir(&outputs).unwrap().count(), 0);
}

#[test]
fn wrong_mode_fails_before_rendering() {
    let snapshots = scratch_dir("wrong_mode_in");
    let outputs = scratch_dir("wrong_mode_out");
    write_run(&snapshots, 101);

    let fields = vec![FieldSpec {
        key: "Derived/Charge_Density".to_string(),
        mode: RenderMode::Image,
    }];

    let settings = test_settings(101, fields);
    let pipeline = EvolutionPipeline::new(&settings, &snapshots, &outputs).unwrap();

    let err = pipeline.run().unwrap_err();
    match err.kind() {
        ErrorKind::ShapeMismatch(key, mode, rank) => {
            assert_eq!(key, "Derived/Charge_Density");
            assert_eq!(*mode, RenderMode::Image);
            assert_eq!(*rank, 1);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(fs::read_dir(&outputs).unwrap().count(), 0);
}

#[test]
fn truncated_run_fails_with_missing_frame() {
    let snapshots = scratch_dir("truncated_in");
    let outputs = scratch_dir("truncated_out");
    // settings promise 200 frames but the run only produced 101
    write_run(&snapshots, 101);

    let settings = test_settings(200, reference_fields());
    let pipeline = EvolutionPipeline::new(&settings, &snapshots, &outputs).unwrap();

    let err = pipeline.run().unwrap_err();
    match err.kind() {
        // stride 14 over 200 frames first leaves the produced range at frame 112
        ErrorKind::FrameNotFound(frame) => assert_eq!(*frame, 112),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn short_run_fails_with_insufficient_frames() {
    let snapshots = scratch_dir("short_in");
    let outputs = scratch_dir("short_out");
    write_run(&snapshots, 10);

    let settings = test_settings(10, reference_fields());
    let pipeline = EvolutionPipeline::new(&settings, &snapshots, &outputs).unwrap();

    let err = pipeline.run().unwrap_err();
    match err.kind() {
        ErrorKind::InsufficientFrames(capacity, _) => assert_eq!(*capacity, 15),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn rejects_duplicate_keys() {
    let snapshots = scratch_dir("dup_in");
    let outputs = scratch_dir("dup_out");

    let mut fields = reference_fields();
    fields.push(fields[0].clone());

    let settings = test_settings(101, fields);
    assert!(EvolutionPipeline::new(&settings, &snapshots, &outputs).is_err());
}

#[test]
fn rejects_empty_registry() {
    let snapshots = scratch_dir("empty_in");
    let outputs = scratch_dir("empty_out");

    let settings = test_settings(101, Vec::new());
    assert!(EvolutionPipeline::new(&settings, &snapshots, &outputs).is_err());
}
