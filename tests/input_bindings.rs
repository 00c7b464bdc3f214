use cube_morph::config::ScrollConfig;
use cube_morph::input::{Input, InputEvent, WheelDelta};
use std::io::Write;
use tempfile::NamedTempFile;
use winit::keyboard::{Key, NamedKey};

fn press(input: &mut Input, key: Key) {
    input.push(InputEvent::Key { key, pressed: true });
}

#[test]
fn remapped_scroll_controls_override_defaults() {
    let mut temp = NamedTempFile::new().expect("temp input config");
    write!(temp, r#"{{"bindings":{{"page_down":["n"],"jump_start":["g"]}}}}"#).expect("write remap config");

    let mut input = Input::from_config(temp.path(), &ScrollConfig::default(), (1000, 500));
    assert_eq!(input.progress(), 0.0, "no events yet");

    press(&mut input, Key::Character("n".into()));
    // one page step is 450 px of a 2000 px scroll range
    assert!((input.progress() - 0.225).abs() < 1e-5, "custom key pages down");

    press(&mut input, Key::Named(NamedKey::PageDown));
    assert!((input.progress() - 0.225).abs() < 1e-5, "default key no longer fires when remapped");

    press(&mut input, Key::Named(NamedKey::End));
    assert_eq!(input.progress(), 1.0, "untouched actions keep their defaults");

    press(&mut input, Key::Character("g".into()));
    assert_eq!(input.progress(), 0.0);
}

#[test]
fn missing_bindings_file_uses_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut input = Input::from_config(dir.path().join("input.json"), &ScrollConfig::default(), (800, 600));
    press(&mut input, Key::Named(NamedKey::End));
    assert_eq!(input.progress(), 1.0);
    press(&mut input, Key::Named(NamedKey::Escape));
    assert!(input.take_quit_requested());
}

#[test]
fn scroll_progress_tracks_wheel_and_resize() {
    let scroll = ScrollConfig { pages: 3.0, line_height_px: 10.0, page_step: 0.9 };
    let mut input = Input::new(&scroll, (800, 500));
    input.push(InputEvent::Wheel { delta: WheelDelta::Lines(-50.0) });
    assert!((input.progress() - 0.5).abs() < 1e-5);

    input.push(InputEvent::Resized { width: 800, height: 1000 });
    assert!((input.progress() - 0.25).abs() < 1e-5, "offset survives, range grows");

    input.push(InputEvent::Resized { width: 800, height: 100 });
    assert_eq!(input.progress(), 1.0, "offset clamps to the shrunken range");
}
