use super::*;
use crate::layout::LayoutElement;

const MINIMAL: &str = r#"{
    "canvas": {"width": 320, "height": 180},
    "fps": {"num": 30, "den": 1},
    "duration_secs": 3.0,
    "tracks": [
        {"id": "main", "lyrics": [[0.5, "hello"], [1.5, "world"]]}
    ]
}"#;

fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "lyricmv_project_{tag}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0)
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn minimal_project_fills_defaults() {
    let p = Project::from_json(MINIMAL).unwrap();
    let def = p.def();
    assert_eq!(def.layout, VerticalStackStrategy::default());
    assert_eq!(def.wrap, WrapPolicy::None);
    assert_eq!(def.background, None);
    let t = &def.tracks[0];
    assert_eq!(t.priority, 0);
    assert!(t.flexible);
    assert_eq!(t.style, Style::default());
    assert_eq!(t.mode, DisplayMode::default());
    assert_eq!(p.duration_frames(), 90);
    assert_eq!(p.frame_range().len_frames(), 90);
}

#[test]
fn full_track_definition_parses() {
    let json = r##"{
        "canvas": {"width": 1280, "height": 720},
        "fps": {"num": 30000, "den": 1001},
        "duration_secs": 10,
        "layout": {"spacing": 30, "start_y": 40},
        "wrap": {"kind": "chars", "max_width": 900},
        "tracks": [
            {
                "id": "lead",
                "priority": 1,
                "flexible": false,
                "style": {"font_size": 64, "font_color": "#ff0000", "glow_enabled": true},
                "mode": {"kind": "enhanced_preview", "preview_y_offset": 100},
                "lyrics": [[1, "a\nb"]]
            }
        ]
    }"##;
    let p = Project::from_json(json).unwrap();
    let def = p.def();
    assert_eq!(def.layout.spacing, 30);
    assert_eq!(def.layout.start_y, Some(40));
    assert_eq!(def.wrap, WrapPolicy::Chars { max_width: 900 });
    let t = &def.tracks[0];
    assert!(!t.flexible);
    assert_eq!(t.style.font_size, 64);
    assert!(t.style.glow_enabled);
    match t.mode {
        DisplayMode::EnhancedPreview(params) => {
            assert_eq!(params.preview_y_offset, 100);
            assert_eq!(params.current_y_offset, -50);
        }
        other => panic!("unexpected mode {other:?}"),
    }
    assert_eq!(p.duration_frames(), 300);

    let tracks = p.build_tracks().unwrap();
    assert_eq!(tracks[0].priority(), 1);
    assert!(!tracks[0].is_flexible());
    assert_eq!(tracks[0].max_lines(), 2);
}

#[test]
fn malformed_projects_are_rejected() {
    let unknown = MINIMAL.replace("\"duration_secs\"", "\"colour\": 1, \"duration_secs\"");
    assert!(matches!(
        Project::from_json(&unknown).unwrap_err(),
        LyricError::Validation(_)
    ));

    let bad_mode = MINIMAL.replace(
        "\"id\": \"main\",",
        "\"id\": \"main\", \"mode\": {\"kind\": \"karaoke_style\"},",
    );
    assert!(Project::from_json(&bad_mode).is_err());

    let zero = MINIMAL.replace("\"duration_secs\": 3.0", "\"duration_secs\": 0");
    assert!(Project::from_json(&zero).is_err());

    let no_tracks = r#"{"canvas":{"width":2,"height":2},"fps":{"num":1,"den":1},
        "duration_secs":1,"tracks":[]}"#;
    assert!(Project::from_json(no_tracks).is_err());

    let zero_canvas = MINIMAL.replace("\"width\": 320", "\"width\": 0");
    assert!(matches!(
        Project::from_json(&zero_canvas).unwrap_err(),
        LyricError::Config(_)
    ));
}

#[test]
fn duplicate_track_ids_are_config_errors() {
    let json = MINIMAL.replace(
        "\"tracks\": [",
        "\"tracks\": [{\"id\": \"main\", \"lyrics\": []},",
    );
    let err = Project::from_json(&json).unwrap_err();
    assert!(matches!(err, LyricError::Config(_)), "{err}");
}

#[test]
fn tracks_are_bounded_by_duration() {
    let json = MINIMAL.replace("[1.5, \"world\"]", "[1.5, \"world\"], [4.0, \"late\"]");
    let p = Project::from_json(&json).unwrap();
    let tracks = p.build_tracks().unwrap();
    let entries = tracks[0].entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].end(), 3.0);
}

#[test]
fn draft_build_renders_frames() {
    let p = Project::from_json(MINIMAL).unwrap();
    let mut scene = p.build(TextBackend::Draft).unwrap();
    assert_eq!(scene.tracks.len(), 1);
    assert!(!scene.layout.has_conflicts);
    assert!(scene.layout.position("main").is_some());
    // Both lines were rasterized up front.
    assert_eq!(scene.cache.stats().rasterizations, 2);

    let lit = scene
        .renderer
        .render_frame(1.0)
        .unwrap()
        .data
        .iter()
        .any(|&b| b != 0);
    assert!(lit);
    assert!(scene.renderer.render_frame(0.0).unwrap().data.iter().all(|&b| b == 0));
    assert_eq!(scene.cache.stats().rasterizations, 2);
}

#[test]
fn font_backend_needs_a_font() {
    let p = Project::from_json(MINIMAL).unwrap();
    let err = p.build(TextBackend::Font).unwrap_err();
    assert!(matches!(err, LyricError::Config(_)), "{err}");

    let missing = MINIMAL.replace("\"tracks\"", "\"font\": \"no/such/font.ttf\", \"tracks\"");
    let err = Project::from_json(&missing)
        .unwrap()
        .build(TextBackend::Font)
        .unwrap_err();
    assert!(err.to_string().contains("font.ttf"), "{err}");
}

#[test]
fn paths_resolve_relative_to_project_file() {
    let dir = temp_dir("paths");
    image::save_buffer_with_format(
        dir.join("bg.png"),
        &[0, 0, 255].repeat(320 * 180),
        320,
        180,
        image::ColorType::Rgb8,
        image::ImageFormat::Png,
    )
    .unwrap();
    let json = MINIMAL.replace(
        "\"tracks\"",
        r#""background": "bg.png",
        "background_treatment": {"brightness": 1.0, "contrast": 1.0, "blur_sigma": 0.0},
        "tracks""#,
    );
    std::fs::write(dir.join("project.json"), json).unwrap();

    let p = Project::from_path(dir.join("project.json")).unwrap();
    assert_eq!(p.resolve(Path::new("bg.png")), dir.join("bg.png"));
    let mut scene = p.build(TextBackend::Draft).unwrap();
    let frame = scene.renderer.render_frame(0.0).unwrap();
    assert_eq!(frame.pixel(0, 0), [0, 0, 255]);
    assert_eq!(frame.pixel(319, 179), [0, 0, 255]);

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn missing_project_file_is_reported() {
    let err = Project::from_path("/definitely/not/here.json").unwrap_err();
    assert!(err.to_string().contains("here.json"));
}
