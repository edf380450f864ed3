use rust_photo_slideshow::config::{CanvasSize, PlaylistSettings};
use rust_photo_slideshow::error::{Error, PlaylistError};
use rust_photo_slideshow::events::NotificationLevel;
use rust_photo_slideshow::playlist::{
    LaunchTarget, PlaylistLoader, SlideId, resolve_playlist_path,
};
use std::fs;
use tempfile::tempdir;

#[test]
fn skips_comments_blanks_and_malformed_entries() {
    let load = PlaylistLoader::parse_str("a.jpg|100x100+0+0\n\n#comment\nb.jpg|bad");
    assert_eq!(load.playlist.len(), 1);
    let slide = load.playlist.iter().next().unwrap();
    assert_eq!(slide.filename, "a.jpg");
    assert_eq!(slide.geometry, "100x100+0+0");
    assert_eq!(slide.id, SlideId::from_name("a.jpg"));

    match load.warnings.as_slice() {
        [PlaylistError::Parse { line, entry }] => {
            assert_eq!(*line, 4);
            assert_eq!(entry, "b.jpg|bad");
        }
        other => panic!("unexpected warnings: {other:?}"),
    }
    let note = load.notification().unwrap();
    assert_eq!(note.level, NotificationLevel::Warning);
    assert_eq!(note.heading, "Invalid playlist entries");
}

#[test]
fn identity_is_stable_across_loads() {
    let text = "2019/dolomites.jpg|4000x1500+0+250\nparis.jpg|3000x2000+0+0\n";
    let first = PlaylistLoader::parse_str(text);
    let second = PlaylistLoader::parse_str(text);
    assert_eq!(first.playlist.order(), second.playlist.order());
    assert_eq!(
        first.playlist.order()[0].to_string(),
        SlideId::from_name("2019/dolomites.jpg").to_string()
    );
}

#[test]
fn keeps_file_order_and_windows_line_endings() {
    let load = PlaylistLoader::parse_str("c.jpg|1x1+0+0\r\na.jpg|1x1+0+0\r\nb.jpg|1x1+0+0\r\n");
    let names: Vec<_> = load
        .playlist
        .iter()
        .map(|slide| slide.filename.clone())
        .collect();
    assert_eq!(names, ["c.jpg", "a.jpg", "b.jpg"]);
    assert!(load.warnings.is_empty());
}

#[test]
fn missing_file_is_an_empty_playlist_with_warning() {
    let tmp = tempdir().unwrap();
    let load = PlaylistLoader::load(&tmp.path().join("playlist.m3u"));
    assert!(load.playlist.is_empty());
    assert!(matches!(
        load.warnings.as_slice(),
        [PlaylistError::Missing { .. }]
    ));
    assert_eq!(load.notification().unwrap().heading, "Empty playlist");
}

#[test]
fn empty_file_is_an_empty_playlist_with_warning() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("playlist.m3u");
    fs::write(&path, "# nothing yet\n").unwrap();
    let load = PlaylistLoader::load(&path);
    assert!(load.playlist.is_empty());
    assert!(load.warnings.is_empty());
    assert_eq!(load.notification().unwrap().heading, "Empty playlist");
}

#[test]
fn prefers_ratio_specific_playlist() {
    let tmp = tempdir().unwrap();
    let settings = PlaylistSettings::default();
    let canvas = CanvasSize::new(1920, 1080);

    let fallback = tmp.path().join("playlist.m3u");
    assert_eq!(resolve_playlist_path(tmp.path(), &settings, canvas), fallback);

    let preferred = tmp.path().join("playlist_16x9.m3u");
    fs::write(&preferred, "a.jpg|1x1+0+0\n").unwrap();
    assert_eq!(
        resolve_playlist_path(tmp.path(), &settings, canvas),
        preferred
    );
}

#[test]
fn literal_suffix_overrides_canvas_ratio() {
    let tmp = tempdir().unwrap();
    let settings = PlaylistSettings {
        suffix: "3x2".into(),
        ..PlaylistSettings::default()
    };
    let preferred = tmp.path().join("playlist_3x2.m3u");
    fs::write(&preferred, "").unwrap();
    assert_eq!(
        resolve_playlist_path(tmp.path(), &settings, CanvasSize::new(1920, 1080)),
        preferred
    );
}

#[test]
fn launch_target_from_file_or_directory() {
    let tmp = tempdir().unwrap();
    let settings = PlaylistSettings::default();
    let canvas = CanvasSize::new(1024, 768);

    let custom = tmp.path().join("holidays.m3u");
    fs::write(&custom, "a.jpg|1x1+0+0\n").unwrap();
    let target = LaunchTarget::resolve(&custom, &settings, canvas).unwrap();
    assert_eq!(target.directory, tmp.path());
    assert_eq!(target.playlist, custom);

    let target = LaunchTarget::resolve(tmp.path(), &settings, canvas).unwrap();
    assert_eq!(target.directory, tmp.path());
    assert_eq!(target.playlist, tmp.path().join("playlist.m3u"));
}

#[test]
fn missing_directory_is_fatal() {
    let tmp = tempdir().unwrap();
    let gone = tmp.path().join("gone");
    let err = LaunchTarget::resolve(&gone, &PlaylistSettings::default(), CanvasSize::default())
        .unwrap_err();
    assert!(matches!(err, Error::MissingDirectory(path) if path == gone));
}
