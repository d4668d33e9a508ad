//! Scripted pointer-event sequences across the whole engine.

use easel_core::{
    EditorEngine, Element, ElementKind, Interaction, Modifiers, Point, Rect, Tool,
};

fn rect(engine: &mut EditorEngine, x: f32, y: f32, w: f32, h: f32) -> easel_core::ElementId {
    engine
        .scene
        .add(Element::new(ElementKind::Rectangle).with_bounds(Rect::new(x, y, w, h)))
}

fn frame(engine: &mut EditorEngine, x: f32, y: f32, w: f32, h: f32) -> easel_core::ElementId {
    engine.scene.add(
        Element::new(ElementKind::Frame {
            children: Vec::new(),
        })
        .with_bounds(Rect::new(x, y, w, h)),
    )
}

/// Count of simultaneously active gesture flags. The sum type makes more
/// than one impossible, but a scripted sequence still proves no transition
/// leaks state across gestures.
fn active_states(engine: &EditorEngine) -> usize {
    usize::from(engine.interaction().is_active())
}

#[test]
fn single_active_interaction_through_mixed_script() {
    let mut engine = EditorEngine::new();
    let a = rect(&mut engine, 10.0, 10.0, 50.0, 50.0);
    frame(&mut engine, 300.0, 300.0, 200.0, 200.0);

    let script: Vec<(&str, Point)> = vec![
        ("down", Point::new(20.0, 20.0)),
        ("move", Point::new(60.0, 60.0)),
        ("down", Point::new(400.0, 400.0)), // ignored mid-drag
        ("move", Point::new(320.0, 320.0)),
        ("up", Point::new(320.0, 320.0)),
        ("down", Point::new(700.0, 700.0)), // empty space: marquee
        ("move", Point::new(760.0, 760.0)),
        ("up", Point::new(760.0, 760.0)),
    ];

    for (phase, p) in script {
        match phase {
            "down" => engine.pointer_down(p, Modifiers::default()),
            "move" => engine.pointer_move(p),
            _ => engine.pointer_up(p, Modifiers::default()),
        }
        assert!(active_states(&engine) <= 1);
    }

    assert_eq!(engine.interaction(), Interaction::Idle);
    // The drag ended inside the frame, so `a` was reparented.
    assert!(engine.scene.get(a).expect("a").parent.is_some());
}

#[test]
fn drag_through_two_frames_keeps_bidirectional_invariant() {
    let mut engine = EditorEngine::new();
    let left = frame(&mut engine, 0.0, 0.0, 200.0, 200.0);
    let right = frame(&mut engine, 400.0, 0.0, 200.0, 200.0);
    let el = rect(&mut engine, 250.0, 50.0, 40.0, 40.0);

    engine.pointer_down(Point::new(260.0, 60.0), Modifiers::default());
    for x in [200.0, 100.0, 50.0, 300.0, 450.0, 500.0] {
        engine.pointer_move(Point::new(x, 60.0));

        for f in [left, right] {
            let children: Vec<_> = engine.scene.get(f).expect("frame").children().to_vec();
            let members: Vec<_> = engine
                .scene
                .elements()
                .filter(|e| e.parent == Some(f))
                .map(|e| e.id)
                .collect();
            assert_eq!(
                children.len(),
                members.len(),
                "frame child list out of sync mid-drag"
            );
            assert!(members.iter().all(|id| children.contains(id)));
        }
    }
    engine.pointer_up(Point::new(500.0, 60.0), Modifiers::default());

    assert_eq!(engine.scene.get(el).expect("el").parent, Some(right));
    // World position tracks the pointer, not the changing parents.
    let world = engine.scene.world_position(el).expect("world");
    assert!((world.x - 490.0).abs() < 1e-3);
    assert!((world.y - 50.0).abs() < 1e-3);
}

#[test]
fn marquee_exact_hit_set_with_half_open_rule() {
    let mut engine = EditorEngine::new();
    let inside = rect(&mut engine, 20.0, 20.0, 30.0, 30.0);
    let overlapping = rect(&mut engine, 90.0, 90.0, 40.0, 40.0);
    let edge_touching = rect(&mut engine, 100.0, 0.0, 30.0, 30.0);
    let outside = rect(&mut engine, 400.0, 400.0, 30.0, 30.0);

    engine.pointer_down(Point::new(10.0, 10.0), Modifiers::default());
    engine.pointer_move(Point::new(100.0, 100.0));
    engine.pointer_up(Point::new(100.0, 100.0), Modifiers::default());

    assert!(engine.selection.contains(inside));
    assert!(engine.selection.contains(overlapping));
    assert!(!engine.selection.contains(edge_touching));
    assert!(!engine.selection.contains(outside));
}

#[test]
fn shift_click_builds_additive_selection_then_drags_both() {
    let mut engine = EditorEngine::new();
    let a = rect(&mut engine, 0.0, 0.0, 50.0, 50.0);
    let b = rect(&mut engine, 100.0, 0.0, 50.0, 50.0);

    engine.pointer_down(Point::new(10.0, 10.0), Modifiers::default());
    engine.pointer_up(Point::new(10.0, 10.0), Modifiers::default());
    engine.pointer_down(Point::new(110.0, 10.0), Modifiers::shift());
    engine.pointer_move(Point::new(130.0, 30.0));
    engine.pointer_up(Point::new(130.0, 30.0), Modifiers::default());

    assert!(engine.selection.contains(a));
    assert!(engine.selection.contains(b));
    assert!((engine.scene.get(a).expect("a").x - 20.0).abs() < 1e-4);
    assert!((engine.scene.get(b).expect("b").x - 120.0).abs() < 1e-4);
}

#[test]
fn create_frame_then_drag_rect_inside_then_marquee_selects_child_world_bounds() {
    let mut engine = EditorEngine::new();

    engine.set_tool(Tool::Frame);
    engine.pointer_down(Point::new(200.0, 200.0), Modifiers::default());
    engine.pointer_move(Point::new(500.0, 400.0));
    engine.pointer_up(Point::new(500.0, 400.0), Modifiers::default());
    assert_eq!(engine.tool(), Tool::Select);
    let frame_id = engine.selection.ids()[0];

    engine.set_tool(Tool::Rectangle);
    engine.pointer_down(Point::new(20.0, 20.0), Modifiers::default());
    engine.pointer_move(Point::new(80.0, 80.0));
    engine.pointer_up(Point::new(80.0, 80.0), Modifiers::default());
    let rect_id = engine.selection.ids()[0];

    // Drag it into the frame.
    engine.pointer_down(Point::new(50.0, 50.0), Modifiers::default());
    engine.pointer_move(Point::new(300.0, 300.0));
    engine.pointer_up(Point::new(300.0, 300.0), Modifiers::default());
    assert_eq!(engine.scene.get(rect_id).expect("rect").parent, Some(frame_id));

    // A marquee over its world position still finds it.
    engine.pointer_down(Point::new(600.0, 600.0), Modifiers::default());
    engine.pointer_up(Point::new(600.0, 600.0), Modifiers::default());
    assert!(engine.selection.is_empty());

    // Start in empty space left of the frame so this is a marquee, not a
    // drag of the frame itself.
    engine.pointer_down(Point::new(150.0, 150.0), Modifiers::default());
    engine.pointer_move(Point::new(350.0, 350.0));
    engine.pointer_up(Point::new(350.0, 350.0), Modifiers::default());
    assert!(engine.selection.contains(rect_id));
}

#[test]
fn zoomed_viewport_gestures_operate_in_world_space() {
    let mut engine = EditorEngine::new();
    let id = rect(&mut engine, 100.0, 100.0, 60.0, 60.0);
    engine.wheel_zoom(Point::new(0.0, 0.0), 2.0);
    assert!((engine.viewport.zoom - 2.0).abs() < 1e-4);

    // Element at world (100,100) sits at screen (200,200) under zoom 2.
    engine.pointer_down(Point::new(210.0, 210.0), Modifiers::default());
    assert!(engine.selection.contains(id));
    engine.pointer_move(Point::new(250.0, 210.0));
    engine.pointer_up(Point::new(250.0, 210.0), Modifiers::default());
    assert!((engine.scene.get(id).expect("el").x - 120.0).abs() < 1e-4);
}
