//! Container child management: ordering invariants, reorder vs add,
//! cross-container moves, removal policies, traversal and the factory.

use std::cell::RefCell;
use std::rc::Rc;

use mullion::{
    ComponentConfig, ComponentId, Control, Error, EventDetail, EventKind, Tree, TransitionOptions,
    TypeEntry,
};

fn rendered_container(tree: &mut Tree) -> ComponentId {
    let ct = tree.container(ComponentConfig::new());
    let body = tree.body();
    tree.render(ct, body, None).unwrap();
    ct
}

#[test]
fn items_and_index_of_agree() {
    let mut tree = Tree::new();
    let ct = rendered_container(&mut tree);
    let a = tree.component(ComponentConfig::new());
    let b = tree.component(ComponentConfig::new());
    let c = tree.component(ComponentConfig::new());
    tree.add_all(ct, vec![a.into(), b.into(), c.into()]).unwrap();

    assert_eq!(tree.items(ct), &[a, b, c]);
    for (i, &child) in tree.items(ct).to_vec().iter().enumerate() {
        assert_eq!(tree.index_of(ct, child), Some(i));
        assert_eq!(tree.item_at(ct, i), Some(child));
        assert_eq!(tree.parent_of(child), Some(ct));
    }
    assert_eq!(tree.item_count(ct), 3);
}

#[test]
fn insert_clamps_the_index() {
    let mut tree = Tree::new();
    let ct = rendered_container(&mut tree);
    let a = tree.component(ComponentConfig::new());
    let b = tree.component(ComponentConfig::new());
    tree.add(ct, a).unwrap();
    tree.insert_item(ct, 99, b).unwrap();
    assert_eq!(tree.items(ct), &[a, b]);
}

#[test]
fn reinsert_is_a_reorder_not_an_add() {
    let mut tree = Tree::new();
    let ct = rendered_container(&mut tree);
    let a = tree.component(ComponentConfig::new());
    let b = tree.component(ComponentConfig::new());
    let c = tree.component(ComponentConfig::new());
    tree.add_all(ct, vec![a.into(), b.into(), c.into()]).unwrap();

    let adds = Rc::new(RefCell::new(0));
    let reorders = Rc::new(RefCell::new(Vec::new()));
    {
        let adds = adds.clone();
        tree.observe(ct, EventKind::Add, move |_| *adds.borrow_mut() += 1);
    }
    {
        let reorders = reorders.clone();
        tree.observe(ct, EventKind::Reorder, move |event| {
            if let EventDetail::Reordered { from, to, .. } = event.detail {
                reorders.borrow_mut().push((from, to));
            }
        });
    }

    tree.insert_item(ct, 0, c).unwrap();
    assert_eq!(tree.items(ct), &[c, a, b]);
    assert_eq!(*adds.borrow(), 0);
    assert_eq!(reorders.borrow().as_slice(), &[(2, 0)]);
}

#[test]
fn a_child_lives_in_at_most_one_container() {
    let mut tree = Tree::new();
    let ct1 = rendered_container(&mut tree);
    let ct2 = rendered_container(&mut tree);
    let child = tree.component(ComponentConfig::new());

    tree.add(ct1, child).unwrap();
    assert_eq!(tree.parent_of(child), Some(ct1));

    // The move detaches from the first owner, non-destructively.
    tree.add(ct2, child).unwrap();
    assert_eq!(tree.parent_of(child), Some(ct2));
    assert!(tree.items(ct1).is_empty());
    assert_eq!(tree.items(ct2), &[child]);
    assert!(!tree.is_destroyed(child));
}

#[test]
fn before_add_veto_abandons_the_add() {
    let mut tree = Tree::new();
    let ct = rendered_container(&mut tree);
    tree.on(ct, EventKind::BeforeAdd, |_| Control::Veto);
    let child = tree.component(ComponentConfig::new());
    let added = tree.add(ct, child).unwrap();
    assert_eq!(added, None);
    assert!(tree.items(ct).is_empty());
    assert_eq!(tree.parent_of(child), None);
}

#[test]
fn before_remove_veto_keeps_the_child() {
    let mut tree = Tree::new();
    let ct = rendered_container(&mut tree);
    let child = tree.component(ComponentConfig::new());
    tree.add(ct, child).unwrap();
    tree.on(ct, EventKind::BeforeRemove, |_| Control::Veto);
    assert!(!tree.remove(ct, child, None).unwrap());
    assert_eq!(tree.items(ct), &[child]);
}

#[test]
fn remove_detaches_the_surface_even_when_kept_alive() {
    let mut tree = Tree::new();
    let ct = rendered_container(&mut tree);
    let child = tree.component(ComponentConfig::new());
    tree.add(ct, child).unwrap();
    let el = tree.element(child).unwrap();
    assert!(tree.dom().is_connected(el));

    tree.remove(ct, child, Some(false)).unwrap();
    assert!(!tree.is_destroyed(child));
    assert!(tree.dom().exists(el));
    assert_eq!(tree.dom().parent(el), None);
    assert_eq!(tree.parent_of(child), None);
}

#[test]
fn remove_destroys_by_default() {
    let mut tree = Tree::new();
    let ct = rendered_container(&mut tree);
    let child = tree.component(ComponentConfig::new());
    tree.add(ct, child).unwrap();
    tree.remove(ct, child, None).unwrap();
    assert!(tree.is_destroyed(child));
}

#[test]
fn keep_removed_children_policy_overrides_the_default() {
    let mut tree = Tree::new();
    let ct = tree.container(ComponentConfig::new().keep_removed_children());
    let body = tree.body();
    tree.render(ct, body, None).unwrap();
    let child = tree.component(ComponentConfig::new());
    tree.add(ct, child).unwrap();
    tree.remove(ct, child, None).unwrap();
    assert!(!tree.is_destroyed(child));
}

#[test]
fn remove_all_empties_the_container_with_one_layout_pass() {
    let mut tree = Tree::new();
    let ct = rendered_container(&mut tree);
    for _ in 0..3 {
        tree.add(ct, ComponentConfig::new()).unwrap();
    }
    let passes = Rc::new(RefCell::new(0));
    {
        let passes = passes.clone();
        tree.observe(ct, EventKind::AfterLayout, move |_| *passes.borrow_mut() += 1);
    }
    let removed = tree.remove_all(ct, None).unwrap();
    assert_eq!(removed.len(), 3);
    assert!(tree.items(ct).is_empty());
    assert_eq!(*passes.borrow(), 1);
}

#[test]
fn batched_add_runs_one_layout_pass() {
    let mut tree = Tree::new();
    let ct = rendered_container(&mut tree);
    let passes = Rc::new(RefCell::new(0));
    {
        let passes = passes.clone();
        tree.observe(ct, EventKind::AfterLayout, move |_| *passes.borrow_mut() += 1);
    }
    tree.add_all(
        ct,
        vec![
            ComponentConfig::new().into(),
            ComponentConfig::new().into(),
            ComponentConfig::new().into(),
        ],
    )
    .unwrap();
    assert_eq!(*passes.borrow(), 1);
    assert_eq!(tree.item_count(ct), 3);
}

#[test]
fn container_destroy_recursively_destroys_children() {
    let mut tree = Tree::new();
    let outer = rendered_container(&mut tree);
    let inner = tree.container(ComponentConfig::new());
    let leaf = tree.component(ComponentConfig::new());
    tree.add(outer, inner).unwrap();
    tree.add(inner, leaf).unwrap();

    tree.destroy(outer);
    assert!(tree.is_destroyed(outer));
    assert!(tree.is_destroyed(inner));
    assert!(tree.is_destroyed(leaf));
}

#[test]
fn acceptance_check_rejects_incompatible_children() {
    let mut tree = Tree::new();
    tree.register_ctype("panel", TypeEntry::extends("container").container())
        .unwrap();
    let ct = tree.container(ComponentConfig::new().with_accepts("panel"));
    let body = tree.body();
    tree.render(ct, body, None).unwrap();

    let plain = tree.component(ComponentConfig::new());
    let err = tree.add(ct, plain).unwrap_err();
    assert!(matches!(err, Error::IncompatibleChild { .. }));

    let panel = tree
        .create(ComponentConfig::new().with_ctype("panel"))
        .unwrap();
    assert!(tree.add(ct, panel).unwrap().is_some());
}

#[test]
fn descriptors_resolve_through_the_factory() {
    let mut tree = Tree::new();
    tree.register_ctype(
        "labelled",
        TypeEntry::new().with_configure(|config| {
            config.classes.push("labelled".to_string());
        }),
    )
    .unwrap();
    let ct = rendered_container(&mut tree);
    let added = tree
        .add(ct, ComponentConfig::new().with_ctype("labelled"))
        .unwrap()
        .expect("descriptor resolved");
    assert_eq!(tree.ctype(added), Some("labelled"));
    let el = tree.element(added).unwrap();
    assert!(tree.dom().has_class(el, "labelled"));
}

#[test]
fn unknown_descriptor_types_degrade_to_none() {
    let mut tree = Tree::new();
    let ct = rendered_container(&mut tree);
    let added = tree
        .add(ct, ComponentConfig::new().with_ctype("never-registered"))
        .unwrap();
    assert_eq!(added, None);
    assert!(tree.items(ct).is_empty());
}

#[test]
fn default_ctype_applies_to_untyped_descriptors() {
    let mut tree = Tree::new();
    tree.register_ctype("chip", TypeEntry::new()).unwrap();
    let ct = tree.container(ComponentConfig::new().with_default_ctype("chip"));
    let body = tree.body();
    tree.render(ct, body, None).unwrap();
    let added = tree.add(ct, ComponentConfig::new()).unwrap().unwrap();
    assert_eq!(tree.ctype(added), Some("chip"));
}

#[test]
fn cascade_prunes_branches_but_not_siblings() {
    let mut tree = Tree::new();
    let root = tree.container(ComponentConfig::new());
    let pruned = tree.container(ComponentConfig::new().with_item_id("pruned"));
    let hidden_leaf = tree.component(ComponentConfig::new());
    let sibling = tree.component(ComponentConfig::new().with_item_id("sibling"));
    tree.add(root, pruned).unwrap();
    tree.add(pruned, hidden_leaf).unwrap();
    tree.add(root, sibling).unwrap();

    let mut visited = Vec::new();
    tree.cascade(root, |id| {
        visited.push(id);
        tree.item_id(id) != Some("pruned")
    });
    assert!(visited.contains(&root));
    assert!(visited.contains(&pruned));
    assert!(visited.contains(&sibling));
    assert!(!visited.contains(&hidden_leaf));
}

#[test]
fn find_by_item_id_walks_the_subtree() {
    let mut tree = Tree::new();
    let root = tree.container(ComponentConfig::new());
    let inner = tree.container(ComponentConfig::new());
    let leaf = tree.component(ComponentConfig::new().with_item_id("needle"));
    tree.add(root, inner).unwrap();
    tree.add(inner, leaf).unwrap();

    assert_eq!(tree.find_by_item_id(root, "needle"), Some(leaf));
    assert_eq!(tree.find_by_item_id(root, "missing"), None);
}

#[test]
fn find_by_ctype_honors_the_lineage() {
    let mut tree = Tree::new();
    tree.register_ctype("panel", TypeEntry::extends("container").container())
        .unwrap();
    let root = tree.container(ComponentConfig::new());
    let panel = tree.create(ComponentConfig::new().with_ctype("panel")).unwrap();
    let plain = tree.component(ComponentConfig::new());
    tree.add_all(root, vec![panel.into(), plain.into()]).unwrap();

    assert_eq!(tree.find_by_ctype(root, "panel"), vec![panel]);
    // Every node extends "component", including the root itself.
    assert_eq!(tree.find_by_ctype(root, "component").len(), 3);
}

#[test]
fn replacing_the_layout_detaches_children_and_notifies() {
    let mut tree = Tree::new();
    let ct = rendered_container(&mut tree);
    let child = tree.component(ComponentConfig::new());
    tree.add(ct, child).unwrap();
    let el = tree.element(child).unwrap();
    assert!(tree.dom().is_connected(el));

    let replaced = Rc::new(RefCell::new(0));
    {
        let replaced = replaced.clone();
        tree.observe(ct, EventKind::LayoutReplaced, move |_| {
            *replaced.borrow_mut() += 1;
        });
    }
    tree.set_layout(ct, Box::new(mullion::HBoxLayout::new())).unwrap();
    assert_eq!(*replaced.borrow(), 1);
    assert_eq!(tree.dom().parent(el), None);

    // The next pass re-places the child under the new strategy.
    tree.perform_layout(ct).unwrap();
    assert!(tree.dom().is_connected(el));
}

#[test]
fn hidden_containers_defer_layout_until_shown() {
    let mut tree = Tree::new();
    let ct = tree.container(ComponentConfig::new().hidden());
    let body = tree.body();
    tree.render(ct, body, None).unwrap();
    let child = tree.component(ComponentConfig::new());
    tree.add(ct, child).unwrap();
    // Hidden at render: the pass is pending, the child untouched.
    assert!(!tree.is_rendered(child));

    tree.show(ct, TransitionOptions::default());
    assert!(tree.is_rendered(child));
}

#[test]
fn container_ops_on_plain_components_are_fatal() {
    let mut tree = Tree::new();
    let plain = tree.component(ComponentConfig::new());
    let child = tree.component(ComponentConfig::new());
    assert!(matches!(tree.add(plain, child), Err(Error::NotAContainer)));
    assert!(matches!(
        tree.remove(plain, child, None),
        Err(Error::NotAContainer)
    ));
}
