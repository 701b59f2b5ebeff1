use flow_shade::{
    TextureError,
    resources::texture::{MAX_TEXTURE_SLOTS, RegistryState, TextureRegistry},
};

use crate::common::test_utils::{BackendEvent, Fixtures, RecordingBackend};

mod common;

#[test]
fn loads_get_sequential_slots_and_resolve_by_tag() {
    flow_shade::init_logger();
    let fixtures = Fixtures::new("sequential");
    let (backend, events) = RecordingBackend::new();
    let mut registry = TextureRegistry::new(backend);

    let wood = registry.load(fixtures.rgb("wood.png", 8, 4), "wood").unwrap();
    let glass = registry
        .load(fixtures.rgba("glass.png", 2, 2, [10, 20, 30, 128]), "glass")
        .unwrap();

    assert_eq!((wood, glass), (0, 1));
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.state(), RegistryState::Loaded);
    assert_eq!(registry.resolve_slot("glass"), Some(1));
    assert_eq!(registry.resolve_id("wood").map(|t| t.tag.as_str()), Some("wood"));
    assert_eq!(registry.resolve_slot("steel"), None);
    assert!(registry.resolve_id("steel").is_none());

    assert_eq!(
        events.borrow()[0],
        BackendEvent::Create {
            id: 1,
            tag: "wood".to_string(),
            width: 8,
            height: 4,
            mips: 4,
        }
    );
}

#[test]
fn failed_loads_leave_the_registry_untouched() {
    let fixtures = Fixtures::new("failures");
    let (backend, events) = RecordingBackend::new();
    let mut registry = TextureRegistry::new(backend);
    registry.load(fixtures.rgb("ok.png", 2, 2), "ok").unwrap();

    let gray = registry.load(fixtures.gray("gray.png"), "gray").unwrap_err();
    assert!(matches!(gray, TextureError::UnsupportedChannels { channels: 1, .. }));

    let garbage = registry.load(fixtures.garbage("broken.png"), "broken").unwrap_err();
    assert!(matches!(garbage, TextureError::Decode { .. }));

    let missing = registry.load(fixtures.path("missing.png"), "missing").unwrap_err();
    assert!(matches!(missing, TextureError::Io { .. }));

    let duplicate = registry.load(fixtures.rgb("other.png", 2, 2), "ok").unwrap_err();
    assert!(matches!(duplicate, TextureError::DuplicateTag { slot: 0, .. }));

    assert_eq!(registry.len(), 1);
    assert_eq!(events.borrow().len(), 1);
    // the next successful load still gets the next slot
    assert_eq!(registry.load(fixtures.rgb("next.png", 2, 2), "next").unwrap(), 1);
}

#[test]
fn images_beyond_the_device_limit_are_rejected() {
    let fixtures = Fixtures::new("too_large");
    let (backend, events) = RecordingBackend::with_max_dimension(8);
    let mut registry = TextureRegistry::new(backend);
    registry.load(fixtures.rgb("fits.png", 8, 8), "fits").unwrap();

    let wide = registry.load(fixtures.rgb("wide.png", 9, 1), "wide").unwrap_err();
    assert!(matches!(
        wide,
        TextureError::TooLarge {
            width: 9,
            height: 1,
            max: 8,
            ..
        }
    ));
    let tall = registry
        .load(fixtures.rgba("tall.png", 1, 9, [0, 0, 0, 255]), "tall")
        .unwrap_err();
    assert!(matches!(tall, TextureError::TooLarge { height: 9, .. }));

    assert_eq!(registry.len(), 1);
    assert_eq!(registry.state(), RegistryState::Loaded);
    assert_eq!(registry.resolve_slot("wide"), None);
    assert_eq!(events.borrow().len(), 1);
    assert_eq!(registry.load(fixtures.rgb("next.png", 2, 2), "next").unwrap(), 1);
}

#[test]
fn seventeenth_texture_is_rejected_before_any_io() {
    let fixtures = Fixtures::new("capacity");
    let (backend, events) = RecordingBackend::new();
    let mut registry = TextureRegistry::new(backend);
    let path = fixtures.rgb("tile.png", 1, 1);

    for slot in 0..MAX_TEXTURE_SLOTS {
        assert_eq!(registry.load(&path, &format!("tile{}", slot)).unwrap(), slot);
    }

    // the path does not exist, so reaching I/O would give an Io error
    let err = registry
        .load(fixtures.path("never-read.png"), "one-too-many")
        .unwrap_err();
    assert!(matches!(err, TextureError::CapacityExceeded { capacity: 16, .. }));
    assert_eq!(registry.len(), MAX_TEXTURE_SLOTS);
    assert_eq!(events.borrow().len(), MAX_TEXTURE_SLOTS);
}

#[test]
fn bind_all_binds_every_slot_and_is_idempotent() {
    let fixtures = Fixtures::new("bind");
    let (backend, events) = RecordingBackend::new();
    let mut registry = TextureRegistry::new(backend);
    registry.load(fixtures.rgb("a.png", 1, 1), "a").unwrap();
    registry.load(fixtures.rgb("b.png", 1, 1), "b").unwrap();

    registry.bind_all();
    registry.bind_all();

    let binds: Vec<_> = events
        .borrow()
        .iter()
        .filter(|e| matches!(e, BackendEvent::Bind { .. }))
        .cloned()
        .collect();
    assert_eq!(
        binds,
        vec![
            BackendEvent::Bind { slot: 0, id: 1 },
            BackendEvent::Bind { slot: 1, id: 2 },
            BackendEvent::Bind { slot: 0, id: 1 },
            BackendEvent::Bind { slot: 1, id: 2 },
        ]
    );
    assert_eq!(registry.state(), RegistryState::Bound);
}

#[test]
fn lifecycle_follows_load_bind_release() {
    let fixtures = Fixtures::new("lifecycle");
    let (backend, _events) = RecordingBackend::new();
    let mut registry = TextureRegistry::new(backend);
    assert_eq!(registry.state(), RegistryState::Empty);

    registry.bind_all();
    assert_eq!(registry.state(), RegistryState::Bound);
    assert!(registry.is_empty());

    registry.load(fixtures.rgb("a.png", 1, 1), "a").unwrap();
    assert_eq!(registry.state(), RegistryState::Loaded);
    registry.bind_all();
    assert_eq!(registry.state(), RegistryState::Bound);
    registry.load(fixtures.rgb("b.png", 1, 1), "b").unwrap();
    assert_eq!(registry.state(), RegistryState::Loaded);

    registry.release_all();
    assert_eq!(registry.state(), RegistryState::Empty);
    assert!(registry.is_empty());
}

#[test]
fn release_all_is_idempotent_and_slots_restart() {
    let fixtures = Fixtures::new("release");
    let (backend, events) = RecordingBackend::new();
    let mut registry = TextureRegistry::new(backend);
    registry.load(fixtures.rgb("a.png", 1, 1), "a").unwrap();
    registry.load(fixtures.rgb("b.png", 1, 1), "b").unwrap();

    registry.release_all();
    registry.release_all();

    let releases = events
        .borrow()
        .iter()
        .filter(|e| matches!(e, BackendEvent::Release { .. }))
        .count();
    assert_eq!(releases, 2);
    assert_eq!(registry.resolve_slot("a"), None);
    assert_eq!(registry.load(fixtures.rgb("c.png", 1, 1), "c").unwrap(), 0);
}

#[test]
fn dropping_the_registry_releases_its_textures() {
    let fixtures = Fixtures::new("drop");
    let (backend, events) = RecordingBackend::new();
    {
        let mut registry = TextureRegistry::new(backend);
        registry.load(fixtures.rgb("a.png", 1, 1), "a").unwrap();
        registry.bind_all();
    }

    assert_eq!(
        events.borrow().last(),
        Some(&BackendEvent::Release { slot: 0, id: 1 })
    );
}

#[test]
fn load_all_skips_failures_and_binds() {
    let fixtures = Fixtures::new("load_all");
    let (backend, _events) = RecordingBackend::new();
    let mut registry = TextureRegistry::new(backend);
    let entries = [
        (fixtures.rgb("floor.png", 4, 4), "floor"),
        (fixtures.gray("mask.png"), "mask"),
        (fixtures.rgba("screen.png", 4, 2, [0, 0, 0, 255]), "screen"),
    ];

    let loaded = registry.load_all(&entries);

    assert_eq!(loaded, 2);
    assert_eq!(registry.state(), RegistryState::Bound);
    assert_eq!(registry.resolve_slot("screen"), Some(1));
    assert_eq!(registry.resolve_slot("mask"), None);
    assert!(fixtures.dir().exists());
}
