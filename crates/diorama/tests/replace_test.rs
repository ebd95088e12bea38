//! Integration tests for replacing shapes.

use float_cmp::assert_approx_eq;

use diorama::{
    Modeling, ReplaceOptions,
    command::Phase,
    config::AppConfig,
    geometry::{Bounds, Point},
    identifier::Id,
    model::{ConnectionDescriptor, Diagram, Shape, ShapeDescriptor},
    services::{RuleAction, RuleContext},
};

fn id(name: &str) -> Id {
    Id::new(name)
}

fn add(diagram: &mut Diagram, shape: Shape, parent: &str) {
    diagram.add_shape(shape, id(parent), None).unwrap();
}

fn task(name: &str, x: f32, y: f32) -> Shape {
    Shape::new(id(name), "task", Bounds::new(x, y, 100.0, 100.0))
}

fn replacement(name: &str, width: f32, height: f32) -> ShapeDescriptor {
    ShapeDescriptor::new().with_id(name).with_size(width, height)
}

fn base_diagram() -> Diagram {
    let mut diagram = Diagram::new(id("root"));
    add(
        &mut diagram,
        Shape::new(id("parent"), "subProcess", Bounds::new(100.0, 100.0, 300.0, 300.0)),
        "root",
    );
    add(&mut diagram, task("originalShape", 110.0, 110.0), "parent");
    diagram
}

fn fixture() -> Modeling {
    Modeling::from_diagram(base_diagram(), &AppConfig::default())
}

/// `originalShape` connected to `targetShape` inside `parent`.
fn connected_fixture() -> Modeling {
    let mut modeling = fixture();
    modeling
        .create_shape(
            &ShapeDescriptor::new()
                .with_id("targetShape")
                .at(290.0, 110.0)
                .with_size(100.0, 100.0),
            id("parent"),
        )
        .unwrap();
    modeling
        .create_connection(
            id("originalShape"),
            id("targetShape"),
            &ConnectionDescriptor::new(vec![Point::new(210.0, 160.0), Point::new(290.0, 160.0)])
                .with_id("connection"),
            Some(id("parent")),
        )
        .unwrap();
    modeling
}

#[test]
fn test_replace_adds_new_shape_and_removes_old() {
    let mut modeling = fixture();

    let new = modeling
        .replace_element(
            id("originalShape"),
            &replacement("replacement", 200.0, 200.0),
            ReplaceOptions::default(),
        )
        .unwrap();

    let diagram = modeling.diagram();
    assert_eq!(new, "replacement");
    assert_eq!(diagram.shape(new).unwrap().parent(), Some(id("parent")));
    assert!(!diagram.contains(id("originalShape")));
    diagram.validate().unwrap();
}

#[test]
fn test_replace_carries_custom_attributes() {
    let mut modeling = fixture();

    let new = modeling
        .replace_element(
            id("originalShape"),
            &replacement("replacement", 200.0, 200.0)
                .with_attr("customString", "foobar")
                .with_kind("userTask"),
            ReplaceOptions::default(),
        )
        .unwrap();

    let shape = modeling.diagram().shape(new).unwrap();
    assert_eq!(shape.attr("customString"), Some("foobar"));
    assert_eq!(shape.kind(), "userTask");
}

#[test]
fn test_replace_keeps_position_for_any_size() {
    for (width, height) in [(200.0, 200.0), (200.0, 201.0), (201.0, 200.0), (201.0, 201.0)] {
        let mut modeling = fixture();

        let new = modeling
            .replace_element(
                id("originalShape"),
                &replacement("replacement", width, height),
                ReplaceOptions::default(),
            )
            .unwrap();

        let shape = modeling.diagram().shape(new).unwrap();
        assert_approx_eq!(f32, shape.x(), 110.0);
        assert_approx_eq!(f32, shape.y(), 110.0);
        assert_approx_eq!(f32, shape.width(), width);
        assert_approx_eq!(f32, shape.height(), height);
    }
}

#[test]
fn test_replace_reconnects_start() {
    let mut modeling = connected_fixture();

    let new = modeling
        .replace_element(
            id("originalShape"),
            &replacement("replacement", 120.0, 120.0),
            ReplaceOptions::default(),
        )
        .unwrap();

    let diagram = modeling.diagram();
    assert!(diagram.shape(new).unwrap().outgoing().contains(&id("connection")));
    assert_eq!(diagram.connection(id("connection")).unwrap().source(), new);
    diagram.validate().unwrap();
}

#[test]
fn test_replace_reconnects_end() {
    let mut modeling = connected_fixture();

    let new = modeling
        .replace_element(
            id("targetShape"),
            &replacement("replacement", 80.0, 80.0),
            ReplaceOptions::default(),
        )
        .unwrap();

    let diagram = modeling.diagram();
    assert!(diagram.shape(new).unwrap().incoming().contains(&id("connection")));
    assert_eq!(diagram.connection(id("connection")).unwrap().target(), new);
}

#[test]
fn test_replace_drops_denied_connection() {
    let mut modeling = connected_fixture()
        .with_rules(|action: RuleAction, _: &RuleContext| action != RuleAction::ReconnectEnd);

    let new = modeling
        .replace_element(
            id("targetShape"),
            &replacement("replacement", 80.0, 80.0),
            ReplaceOptions::default(),
        )
        .unwrap();

    let diagram = modeling.diagram();
    assert!(diagram.shape(new).unwrap().incoming().is_empty());
    assert!(!diagram.contains(id("connection")));
    diagram.validate().unwrap();

    modeling.undo().unwrap();
    let diagram = modeling.diagram();
    assert_eq!(diagram.connection(id("connection")).unwrap().target(), id("targetShape"));
    diagram.validate().unwrap();
}

#[test]
fn test_replace_drops_denied_outgoing_connection() {
    let mut modeling = connected_fixture()
        .with_rules(|action: RuleAction, _: &RuleContext| action != RuleAction::ReconnectStart);
    let before = modeling.diagram().to_string();

    let new = modeling
        .replace_element(
            id("originalShape"),
            &replacement("replacement", 80.0, 80.0),
            ReplaceOptions::default(),
        )
        .unwrap();

    let diagram = modeling.diagram();
    assert!(diagram.shape(new).unwrap().outgoing().is_empty());
    assert!(!diagram.contains(id("connection")));
    assert!(diagram.shape(id("targetShape")).unwrap().incoming().is_empty());
    diagram.validate().unwrap();

    modeling.undo().unwrap();
    let diagram = modeling.diagram();
    assert_eq!(diagram.to_string(), before);
    assert_eq!(diagram.connection(id("connection")).unwrap().source(), id("originalShape"));
    diagram.validate().unwrap();
}

#[test]
fn test_replace_asks_rules_with_new_endpoints() {
    let mut modeling = connected_fixture();
    modeling
        .create_shape(
            &ShapeDescriptor::new()
                .with_id("downstream")
                .at(290.0, 250.0)
                .with_size(100.0, 100.0),
            id("parent"),
        )
        .unwrap();
    modeling
        .create_connection(
            id("targetShape"),
            id("downstream"),
            &ConnectionDescriptor::new(vec![Point::new(340.0, 210.0), Point::new(340.0, 250.0)])
                .with_id("onward"),
            Some(id("parent")),
        )
        .unwrap();

    let asked = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    let seen = std::rc::Rc::clone(&asked);
    let mut modeling = modeling.with_rules(move |action: RuleAction, context: &RuleContext| {
        seen.borrow_mut().push((action, *context));
        true
    });

    let new = modeling
        .replace_element(
            id("targetShape"),
            &replacement("replacement", 80.0, 80.0),
            ReplaceOptions::default(),
        )
        .unwrap();

    assert_eq!(
        *asked.borrow(),
        [
            (
                RuleAction::ReconnectEnd,
                RuleContext {
                    source: id("originalShape"),
                    target: new,
                    connection: id("connection"),
                },
            ),
            (
                RuleAction::ReconnectStart,
                RuleContext {
                    source: new,
                    target: id("downstream"),
                    connection: id("onward"),
                },
            ),
        ]
    );
    let diagram = modeling.diagram();
    assert_eq!(diagram.connection(id("connection")).unwrap().target(), new);
    assert_eq!(diagram.connection(id("onward")).unwrap().source(), new);
    diagram.validate().unwrap();
}

#[test]
fn test_replace_adopts_children() {
    let mut modeling = connected_fixture();

    let new = modeling
        .replace_element(id("parent"), &replacement("replacement", 300.0, 300.0), ReplaceOptions::default())
        .unwrap();

    let diagram = modeling.diagram();
    let children = diagram.children(new).unwrap();
    for child in ["originalShape", "targetShape", "connection"] {
        assert!(children.contains(&id(child)), "missing child {child}");
        assert_eq!(diagram.element(id(child)).unwrap().parent(), Some(new));
    }
    assert!(diagram.shape(id("originalShape")).unwrap().outgoing().contains(&id("connection")));
    assert!(diagram.shape(id("targetShape")).unwrap().incoming().contains(&id("connection")));
    diagram.validate().unwrap();
}

#[test]
fn test_replace_moves_children_as_one_batch() {
    let mut modeling = connected_fixture();
    let moved = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    let seen = std::rc::Rc::clone(&moved);
    modeling.add_listener(move |event, _| {
        if event.is("elements.move", Phase::PostExecuted) {
            seen.borrow_mut().push(event.targets.len());
        }
    });

    modeling
        .replace_element(id("parent"), &replacement("replacement", 300.0, 300.0), ReplaceOptions::default())
        .unwrap();

    assert_eq!(*moved.borrow(), [3]);
}

#[test]
fn test_replace_without_moving_children_removes_them() {
    let mut modeling = connected_fixture();

    let new = modeling
        .replace_element(
            id("parent"),
            &replacement("replacement", 300.0, 300.0),
            ReplaceOptions {
                move_children: false,
            },
        )
        .unwrap();

    let diagram = modeling.diagram();
    assert!(diagram.children(new).unwrap().is_empty());
    assert!(!diagram.contains(id("originalShape")));
    assert!(!diagram.contains(id("connection")));

    modeling.undo().unwrap();
    assert_eq!(modeling.diagram().children(id("parent")).unwrap().len(), 3);
}

#[test]
fn test_replace_takes_over_host() {
    let mut diagram = base_diagram();
    add(&mut diagram, task("boundary", 180.0, 180.0), "parent");
    diagram.set_host(id("boundary"), Some(id("originalShape"))).unwrap();
    let mut modeling = Modeling::from_diagram(diagram, &AppConfig::default());

    let new = modeling
        .replace_element(id("boundary"), &replacement("newBoundary", 36.0, 36.0), ReplaceOptions::default())
        .unwrap();

    let diagram = modeling.diagram();
    assert_eq!(diagram.shape(new).unwrap().host(), Some(id("originalShape")));
    assert!(diagram.shape(id("originalShape")).unwrap().attachers().contains(&new));
    diagram.validate().unwrap();
}

/// A collapsed container whose hidden children spill over its bounds.
fn collapsed_fixture() -> Modeling {
    let mut diagram = base_diagram();
    add(
        &mut diagram,
        Shape::new(id("collapsedShape"), "subProcess", Bounds::new(500.0, 100.0, 300.0, 300.0))
            .with_collapsed(true),
        "root",
    );
    add(&mut diagram, task("hiddenContainedChild", 650.0, 110.0).with_hidden(true), "collapsedShape");
    add(&mut diagram, task("hiddenOverlappingChild", 450.0, 50.0).with_hidden(true), "collapsedShape");
    add(&mut diagram, task("hiddenOutOfBoundsChild", 825.0, 425.0).with_hidden(true), "collapsedShape");
    add(&mut diagram, task("stillHiddenChild", 375.0, 250.0).with_hidden(true), "collapsedShape");
    Modeling::from_diagram(diagram, &AppConfig::default())
}

/// An expanded container with one visible and one hidden child.
fn expanded_fixture() -> Modeling {
    let mut diagram = base_diagram();
    add(
        &mut diagram,
        Shape::new(id("expandedShape"), "subProcess", Bounds::new(100.0, 500.0, 300.0, 300.0)),
        "root",
    );
    add(&mut diagram, task("shownChildShape", 110.0, 510.0), "expandedShape");
    add(&mut diagram, task("hiddenChildShape", 110.0, 510.0).with_hidden(true), "expandedShape");
    Modeling::from_diagram(diagram, &AppConfig::default())
}

fn all_hidden(modeling: &Modeling, shape: Id, hidden: bool) -> bool {
    let diagram = modeling.diagram();
    diagram
        .children(shape)
        .unwrap()
        .into_iter()
        .all(|child| diagram.element(child).unwrap().is_hidden() == hidden)
}

fn expand() -> ShapeDescriptor {
    replacement("expanded", 300.0, 300.0).with_collapsed(false)
}

#[test]
fn test_replace_expanding_shows_children() {
    let mut modeling = collapsed_fixture();
    let original = modeling.diagram().children(id("collapsedShape")).unwrap();

    let new = modeling
        .replace_element(id("collapsedShape"), &expand(), ReplaceOptions::default())
        .unwrap();

    assert_eq!(modeling.diagram().children(new).unwrap(), original);
    assert!(all_hidden(&modeling, new, false));
}

#[test]
fn test_replace_expanding_accommodates_visible_children() {
    let mut modeling = collapsed_fixture();

    let new = modeling
        .replace_element(id("collapsedShape"), &expand(), ReplaceOptions::default())
        .unwrap();

    let diagram = modeling.diagram();
    let expanded = diagram.shape(new).unwrap();
    let overlapping = diagram.shape(id("hiddenOverlappingChild")).unwrap();
    let out_of_bounds = diagram.shape(id("hiddenOutOfBoundsChild")).unwrap();
    assert!(expanded.x() < overlapping.x());
    assert!(expanded.y() < overlapping.y());
    assert!(expanded.bounds().max_x() > out_of_bounds.bounds().max_x());
    assert!(expanded.bounds().max_y() > out_of_bounds.bounds().max_y());
}

#[test]
fn test_replace_expanding_ignores_child_hidden_again_after_execute() {
    let mut modeling = collapsed_fixture();
    modeling.add_listener(|event, diagram| {
        if event.is("shape.replace", Phase::Executed) {
            diagram.set_hidden(Id::new("stillHiddenChild"), true).unwrap();
        }
    });

    let new = modeling
        .replace_element(id("collapsedShape"), &expand(), ReplaceOptions::default())
        .unwrap();

    let diagram = modeling.diagram();
    assert!(diagram.shape(new).unwrap().x() > diagram.shape(id("stillHiddenChild")).unwrap().x());
}

#[test]
fn test_undo_replace_expanding_hides_children_and_restores_size() {
    let mut modeling = collapsed_fixture();
    let original = modeling.diagram().children(id("collapsedShape")).unwrap();
    let old = modeling.diagram().shape(id("collapsedShape")).unwrap().bounds();
    modeling
        .replace_element(id("collapsedShape"), &expand(), ReplaceOptions::default())
        .unwrap();

    modeling.undo().unwrap();

    let diagram = modeling.diagram();
    assert_eq!(diagram.children(id("collapsedShape")).unwrap(), original);
    assert!(all_hidden(&modeling, id("collapsedShape"), true));
    assert_eq!(diagram.shape(id("collapsedShape")).unwrap().bounds(), old);
    assert!(!diagram.contains(id("expanded")));
    diagram.validate().unwrap();
}

#[test]
fn test_replace_collapsing_hides_children() {
    let mut modeling = expanded_fixture();
    let original = modeling.diagram().children(id("expandedShape")).unwrap();

    let new = modeling
        .replace_element(
            id("expandedShape"),
            &replacement("collapsed", 300.0, 300.0).with_collapsed(true),
            ReplaceOptions::default(),
        )
        .unwrap();

    assert_eq!(modeling.diagram().children(new).unwrap(), original);
    assert!(all_hidden(&modeling, new, true));
}

#[test]
fn test_undo_replace_collapsing_restores_each_child() {
    let mut modeling = expanded_fixture();
    modeling
        .replace_element(
            id("expandedShape"),
            &replacement("collapsed", 300.0, 300.0).with_collapsed(true),
            ReplaceOptions::default(),
        )
        .unwrap();

    modeling.undo().unwrap();

    let diagram = modeling.diagram();
    assert!(!diagram.shape(id("shownChildShape")).unwrap().is_hidden());
    assert!(diagram.shape(id("hiddenChildShape")).unwrap().is_hidden());
}

#[test]
fn test_redo_replace_collapsing_resnapshots_moved_children() {
    let mut modeling = expanded_fixture();
    let before = modeling.diagram().to_string();
    modeling
        .replace_element(
            id("expandedShape"),
            &replacement("collapsed", 300.0, 300.0).with_collapsed(true),
            ReplaceOptions::default(),
        )
        .unwrap();
    let collapsed = modeling.diagram().to_string();

    modeling.undo().unwrap();
    modeling.redo().unwrap();
    assert_eq!(modeling.diagram().to_string(), collapsed);
    assert!(all_hidden(&modeling, id("collapsed"), true));

    modeling.undo().unwrap();
    let diagram = modeling.diagram();
    assert_eq!(diagram.to_string(), before);
    assert!(!diagram.shape(id("shownChildShape")).unwrap().is_hidden());
    assert!(diagram.shape(id("hiddenChildShape")).unwrap().is_hidden());
}

#[test]
fn test_replace_collapsed_with_collapsed_keeps_children_hidden() {
    let mut modeling = collapsed_fixture();

    let new = modeling
        .replace_element(
            id("collapsedShape"),
            &replacement("replacement", 200.0, 200.0).with_collapsed(true),
            ReplaceOptions::default(),
        )
        .unwrap();

    assert_eq!(modeling.diagram().children(new).unwrap().len(), 4);
    assert!(all_hidden(&modeling, new, true));
}

#[test]
fn test_replace_expanded_with_expanded_keeps_visibility() {
    let mut modeling = expanded_fixture();

    modeling
        .replace_element(
            id("expandedShape"),
            &replacement("replacement", 200.0, 200.0).with_expanded(true),
            ReplaceOptions::default(),
        )
        .unwrap();

    let diagram = modeling.diagram();
    assert!(!diagram.shape(id("shownChildShape")).unwrap().is_hidden());
    assert!(diagram.shape(id("hiddenChildShape")).unwrap().is_hidden());
}

#[test]
fn test_undo_replace_restores_original() {
    let mut modeling = connected_fixture();
    let before = modeling.diagram().to_string();

    modeling
        .replace_element(
            id("originalShape"),
            &replacement("replacement", 200.0, 200.0),
            ReplaceOptions::default(),
        )
        .unwrap();
    modeling.undo().unwrap();

    let diagram = modeling.diagram();
    assert_approx_eq!(f32, diagram.shape(id("originalShape")).unwrap().width(), 100.0);
    assert!(!diagram.contains(id("replacement")));
    assert_eq!(diagram.to_string(), before);
    diagram.validate().unwrap();
}

#[test]
fn test_two_replaces_undo_redo() {
    let mut modeling = connected_fixture();

    modeling
        .replace_element(
            id("originalShape"),
            &replacement("replacement", 200.0, 200.0),
            ReplaceOptions::default(),
        )
        .unwrap();
    modeling
        .replace_element(
            id("replacement"),
            &replacement("replacement2", 280.0, 280.0),
            ReplaceOptions::default(),
        )
        .unwrap();
    let after = modeling.diagram().to_string();

    modeling.undo().unwrap();
    modeling.undo().unwrap();
    modeling.redo().unwrap();
    modeling.redo().unwrap();

    let diagram = modeling.diagram();
    assert_approx_eq!(f32, diagram.shape(id("replacement2")).unwrap().width(), 280.0);
    assert_eq!(diagram.to_string(), after);
    diagram.validate().unwrap();
}
