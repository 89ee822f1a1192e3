use super::*;

fn canvas() -> Canvas {
    Canvas::new(CanvasBounds { width: 360.0, height: 500.0 })
}

fn note(text: &str) -> ItemPayload {
    ItemPayload::Note {
        text: text.to_owned(),
        color: NOTE_COLORS[0].to_owned(),
        emoji: None,
        font_size: None,
        text_color: None,
    }
}

#[test]
fn create_note_defaults_to_120_square() {
    let mut canvas = canvas();
    let item = canvas.create_item(NewItem::new(note("hello"))).unwrap();
    assert!((item.size.width - 120.0).abs() < f64::EPSILON);
    assert!((item.size.height - 120.0).abs() < f64::EPSILON);
    assert_eq!(canvas.len(), 1);
}

#[test]
fn create_sticker_defaults_to_60_square() {
    let mut canvas = canvas();
    let item = canvas
        .create_item(NewItem::new(ItemPayload::Sticker {
            source: StickerSource::Bundled("sun".into()),
        }))
        .unwrap();
    assert!((item.size.width - 60.0).abs() < f64::EPSILON);
    assert!((item.size.height - 60.0).abs() < f64::EPSILON);
}

#[test]
fn create_item_honors_caller_position_and_size() {
    let mut canvas = canvas();
    let item = canvas
        .create_item(
            NewItem::new(ItemPayload::Photo { url: "https://cdn.example/p.jpg".into() })
                .at(Position { x: 105.0, y: 200.0 })
                .sized(Size { width: 150.0, height: 100.0 }),
        )
        .unwrap();
    assert!((item.position.x - 105.0).abs() < f64::EPSILON);
    assert!((item.position.y - 200.0).abs() < f64::EPSILON);
    assert!((item.size.width - 150.0).abs() < f64::EPSILON);
}

#[test]
fn random_placement_stays_inside_bounds() {
    let mut canvas = canvas();
    for _ in 0..50 {
        let item = canvas.create_item(NewItem::new(note("n"))).unwrap();
        assert!(item.position.x >= 0.0);
        assert!(item.position.y >= 0.0);
        assert!(item.position.x <= 360.0 - 120.0);
        assert!(item.position.y <= 500.0 - 120.0);
    }
}

#[test]
fn oversized_item_falls_back_to_fixed_offset() {
    let mut canvas = Canvas::new(CanvasBounds { width: 100.0, height: 100.0 });
    let item = canvas
        .create_item(NewItem::new(note("big")).sized(Size { width: 400.0, height: 400.0 }))
        .unwrap();
    assert!((item.position.x - 10.0).abs() < f64::EPSILON);
    assert!((item.position.y - 10.0).abs() < f64::EPSILON);
}

#[test]
fn empty_note_text_is_rejected() {
    let mut canvas = canvas();
    let result = canvas.create_item(NewItem::new(note("   ")));
    assert!(matches!(result.unwrap_err(), ValidationError::EmptyContent));
    assert!(canvas.is_empty());
}

#[test]
fn off_palette_note_color_is_rejected() {
    let mut canvas = canvas();
    let payload = ItemPayload::Note {
        text: "hi".into(),
        color: "#123456".into(),
        emoji: None,
        font_size: None,
        text_color: None,
    };
    let result = canvas.create_item(NewItem::new(payload));
    assert!(matches!(
        result.unwrap_err(),
        ValidationError::ColorOutsidePalette(c) if c == "#123456"
    ));
}

#[test]
fn empty_photo_url_is_rejected() {
    let mut canvas = canvas();
    let result = canvas.create_item(NewItem::new(ItemPayload::Photo { url: String::new() }));
    assert!(matches!(result.unwrap_err(), ValidationError::EmptyContent));
}

#[test]
fn move_item_replaces_position_only() {
    let mut canvas = canvas();
    let item = canvas.create_item(NewItem::new(note("n"))).unwrap();
    canvas.move_item(item.id, Position { x: 42.0, y: 84.0 }).unwrap();

    let moved = &canvas.items()[0];
    assert!((moved.position.x - 42.0).abs() < f64::EPSILON);
    assert!((moved.position.y - 84.0).abs() < f64::EPSILON);
    assert_eq!(moved.size, item.size);
    assert_eq!(moved.payload, item.payload);
}

#[test]
fn move_missing_item_is_not_found() {
    let mut canvas = canvas();
    let result = canvas.move_item(Uuid::new_v4(), Position { x: 0.0, y: 0.0 });
    assert!(matches!(result.unwrap_err(), ValidationError::ItemNotFound(_)));
}

#[test]
fn resize_floors_both_extents_at_30() {
    let mut canvas = canvas();
    let item = canvas.create_item(NewItem::new(note("n"))).unwrap();
    canvas.resize_item(item.id, Size { width: 4.0, height: -20.0 }).unwrap();

    let resized = &canvas.items()[0];
    assert!((resized.size.width - MIN_ITEM_EXTENT).abs() < f64::EPSILON);
    assert!((resized.size.height - MIN_ITEM_EXTENT).abs() < f64::EPSILON);
}

#[test]
fn resize_above_floor_is_applied_verbatim() {
    let mut canvas = canvas();
    let item = canvas.create_item(NewItem::new(note("n"))).unwrap();
    canvas.resize_item(item.id, Size { width: 200.0, height: 90.0 }).unwrap();

    let resized = &canvas.items()[0];
    assert!((resized.size.width - 200.0).abs() < f64::EPSILON);
    assert!((resized.size.height - 90.0).abs() < f64::EPSILON);
}

#[test]
fn delete_last_item_leaves_empty_list() {
    let mut canvas = canvas();
    let item = canvas.create_item(NewItem::new(note("only"))).unwrap();
    canvas.delete_item(item.id).unwrap();
    assert!(canvas.is_empty());

    let result = canvas.delete_item(item.id);
    assert!(matches!(result.unwrap_err(), ValidationError::ItemNotFound(_)));
}

#[test]
fn mutation_sequence_yields_adds_minus_deletes_with_latest_geometry() {
    let mut canvas = canvas();
    let a = canvas.create_item(NewItem::new(note("a"))).unwrap();
    let b = canvas.create_item(NewItem::new(note("b"))).unwrap();
    let c = canvas
        .create_item(NewItem::new(ItemPayload::Sticker {
            source: StickerSource::Remote("https://cdn.example/s.png".into()),
        }))
        .unwrap();

    canvas.move_item(b.id, Position { x: 1.0, y: 2.0 }).unwrap();
    canvas.move_item(b.id, Position { x: 3.0, y: 4.0 }).unwrap();
    canvas.resize_item(c.id, Size { width: 75.0, height: 80.0 }).unwrap();
    canvas.delete_item(a.id).unwrap();

    let ids: Vec<Uuid> = canvas.items().iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![b.id, c.id]);

    let b_now = &canvas.items()[0];
    assert!((b_now.position.x - 3.0).abs() < f64::EPSILON);
    assert!((b_now.position.y - 4.0).abs() < f64::EPSILON);

    let c_now = &canvas.items()[1];
    assert!((c_now.size.width - 75.0).abs() < f64::EPSILON);
    assert!((c_now.size.height - 80.0).abs() < f64::EPSILON);
}

// =============================================================================
// STORAGE RECORDS
// =============================================================================

#[test]
fn record_serializes_every_field_with_explicit_nulls() {
    let mut canvas = canvas();
    let item = canvas
        .create_item(NewItem::new(ItemPayload::Photo { url: "https://cdn.example/p.jpg".into() }))
        .unwrap();

    let value = serde_json::to_value(item.to_record()).unwrap();
    let obj = value.as_object().unwrap();
    for key in ["id", "type", "content", "position", "size", "color", "emoji", "fontSize", "textColor"] {
        assert!(obj.contains_key(key), "missing field {key}");
    }
    assert!(obj["color"].is_null());
    assert!(obj["emoji"].is_null());
    assert!(obj["fontSize"].is_null());
    assert!(obj["textColor"].is_null());
    assert_eq!(obj["type"], "image");
}

#[test]
fn note_record_round_trips_all_styling() {
    let item = CanvasItem {
        id: Uuid::new_v4(),
        payload: ItemPayload::Note {
            text: "hello".into(),
            color: NOTE_COLORS[2].to_owned(),
            emoji: Some("🌼".into()),
            font_size: Some(20.0),
            text_color: Some("#3a6073".into()),
        },
        position: Position { x: 10.0, y: 10.0 },
        size: Size { width: 120.0, height: 120.0 },
    };

    let restored = CanvasItem::from_record(&item.to_record()).unwrap();
    assert_eq!(restored.id, item.id);
    assert_eq!(restored.payload, item.payload);
    assert_eq!(restored.position, item.position);
    assert_eq!(restored.size, item.size);
}

#[test]
fn bundled_sticker_round_trips_through_asset_prefix() {
    let item = CanvasItem {
        id: Uuid::new_v4(),
        payload: ItemPayload::Sticker { source: StickerSource::Bundled("rainbow".into()) },
        position: Position { x: 0.0, y: 0.0 },
        size: Size { width: 60.0, height: 60.0 },
    };

    let record = item.to_record();
    assert_eq!(record.content, "asset://rainbow");

    let restored = CanvasItem::from_record(&record).unwrap();
    assert_eq!(restored.payload, item.payload);
}

#[test]
fn unknown_record_kind_is_rejected() {
    let record = ItemRecord {
        id: Uuid::new_v4().to_string(),
        kind: "hologram".into(),
        content: "x".into(),
        position: Position { x: 0.0, y: 0.0 },
        size: Size { width: 10.0, height: 10.0 },
        color: None,
        emoji: None,
        font_size: None,
        text_color: None,
    };
    let result = CanvasItem::from_record(&record);
    assert!(matches!(result.unwrap_err(), ValidationError::UnknownKind(k) if k == "hologram"));
}

#[test]
fn unparseable_record_id_gets_a_fresh_one() {
    let record = ItemRecord {
        id: "legacy-local-id".into(),
        kind: "text".into(),
        content: "hi".into(),
        position: Position { x: 5.0, y: 5.0 },
        size: Size { width: 120.0, height: 120.0 },
        color: None,
        emoji: None,
        font_size: None,
        text_color: None,
    };
    let restored = CanvasItem::from_record(&record).unwrap();
    // A fresh UUID, not a parse failure — and the rest survives.
    assert!(matches!(restored.payload, ItemPayload::Note { ref text, .. } if text == "hi"));
}

#[test]
fn note_record_without_color_falls_back_to_palette_default() {
    let record = ItemRecord {
        id: Uuid::new_v4().to_string(),
        kind: "text".into(),
        content: "hi".into(),
        position: Position { x: 0.0, y: 0.0 },
        size: Size { width: 120.0, height: 120.0 },
        color: None,
        emoji: None,
        font_size: None,
        text_color: None,
    };
    let restored = CanvasItem::from_record(&record).unwrap();
    assert!(matches!(
        restored.payload,
        ItemPayload::Note { ref color, .. } if color == NOTE_COLORS[0]
    ));
}
