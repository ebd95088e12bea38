//! Property tests for undo and redo of collapse and replace sequences.

use proptest::prelude::*;

use diorama::{
    Modeling, ReplaceOptions,
    config::AppConfig,
    geometry::Bounds,
    identifier::Id,
    model::{Diagram, Shape, ShapeDescriptor},
};

// ===================
// Strategies
// ===================

#[derive(Debug, Clone, Copy)]
enum Op {
    Toggle,
    Replace { collapsed: bool },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Toggle),
        any::<bool>().prop_map(|collapsed| Op::Replace { collapsed }),
    ]
}

fn fixture(collapsed: bool, hidden: &[bool]) -> Modeling {
    let mut diagram = Diagram::new(Id::new("root"));
    let container = Shape::new(Id::new("container"), "subProcess", Bounds::new(100.0, 100.0, 400.0, 300.0))
        .with_collapsed(collapsed);
    diagram.add_shape(container, Id::new("root"), None).unwrap();

    for (i, &hidden) in hidden.iter().enumerate() {
        let offset = i as f32 * 60.0;
        let child = Shape::new(
            Id::with_prefix("child", i),
            "task",
            Bounds::new(120.0 + offset, 130.0 + offset / 2.0, 50.0, 40.0),
        )
        .with_hidden(hidden);
        diagram.add_shape(child, Id::new("container"), None).unwrap();
    }
    Modeling::from_diagram(diagram, &AppConfig::default())
}

/// The single container under the root; replace swaps it for a new one.
fn container(modeling: &Modeling) -> Id {
    let diagram = modeling.diagram();
    diagram.children(diagram.root()).unwrap()[0]
}

fn apply(modeling: &mut Modeling, op: Op) {
    let shape = container(modeling);
    match op {
        Op::Toggle => modeling.toggle_collapse(shape).unwrap(),
        Op::Replace { collapsed } => {
            let descriptor = ShapeDescriptor::new()
                .with_kind("subProcess")
                .with_collapsed(collapsed);
            modeling
                .replace_element(shape, &descriptor, ReplaceOptions::default())
                .unwrap();
        }
    }
}

fn hidden_flags(modeling: &Modeling) -> Vec<bool> {
    let diagram = modeling.diagram();
    diagram
        .children(container(modeling))
        .unwrap()
        .into_iter()
        .map(|child| diagram.element(child).unwrap().is_hidden())
        .collect()
}

// ===================
// Property Test Functions
// ===================

fn check_collapse_undo_restores_hidden_flags(hidden: Vec<bool>) -> Result<(), TestCaseError> {
    let mut modeling = fixture(false, &hidden);

    apply(&mut modeling, Op::Toggle);
    prop_assert!(hidden_flags(&modeling).iter().all(|hidden| *hidden));

    prop_assert!(modeling.undo().unwrap());
    prop_assert_eq!(hidden_flags(&modeling), hidden);
    Ok(())
}

fn check_undo_all_restores_initial_state(
    collapsed: bool,
    hidden: Vec<bool>,
    ops: Vec<Op>,
) -> Result<(), TestCaseError> {
    let mut modeling = fixture(collapsed, &hidden);
    let initial = modeling.diagram().to_string();

    for &op in &ops {
        apply(&mut modeling, op);
        prop_assert!(modeling.diagram().validate().is_ok());
    }
    let last = modeling.diagram().to_string();

    for _ in &ops {
        prop_assert!(modeling.undo().unwrap());
    }
    prop_assert!(!modeling.can_undo());
    prop_assert_eq!(modeling.diagram().to_string(), initial);
    prop_assert!(modeling.diagram().validate().is_ok());

    for _ in &ops {
        prop_assert!(modeling.redo().unwrap());
    }
    prop_assert_eq!(modeling.diagram().to_string(), last);
    prop_assert!(modeling.diagram().validate().is_ok());
    Ok(())
}

// ===================
// Proptest Wrappers
// ===================

proptest! {
    #[test]
    fn collapse_undo_restores_hidden_flags(hidden in prop::collection::vec(any::<bool>(), 0..6)) {
        check_collapse_undo_restores_hidden_flags(hidden)?;
    }

    #[test]
    fn undo_all_restores_initial_state(
        collapsed in any::<bool>(),
        hidden in prop::collection::vec(any::<bool>(), 0..6),
        ops in prop::collection::vec(op_strategy(), 1..6),
    ) {
        check_undo_all_restores_initial_state(collapsed, hidden, ops)?;
    }
}
