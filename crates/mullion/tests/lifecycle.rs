//! Component lifecycle: render idempotence, synchronous visibility,
//! animation exclusion, mask buffering, destroy semantics.

use std::cell::RefCell;
use std::rc::Rc;

use mullion::{
    AnimationSpec, ComponentConfig, EventKind, ManualEngine, MaskConfig, Tree, TransitionOptions,
};

fn recorded(tree: &mut Tree, id: mullion::ComponentId, kinds: &[EventKind]) -> Rc<RefCell<Vec<EventKind>>> {
    let record: Rc<RefCell<Vec<EventKind>>> = Rc::default();
    for &kind in kinds {
        let sink = record.clone();
        tree.observe(id, kind, move |event| sink.borrow_mut().push(event.kind));
    }
    record
}

#[test]
fn second_render_performs_zero_dom_operations() {
    let mut tree = Tree::new();
    let id = tree.component(ComponentConfig::new().with_width(100));
    let body = tree.body();
    tree.render(id, body, None).unwrap();

    let before = tree.dom().mutations();
    tree.render(id, body, None).unwrap();
    tree.render(id, body, Some(mullion::InsertPos::At(0))).unwrap();
    assert_eq!(tree.dom().mutations(), before);
}

#[test]
fn render_moves_a_surface_that_is_elsewhere() {
    let mut tree = Tree::new();
    let id = tree.component(ComponentConfig::new());
    let body = tree.body();
    let other = tree.dom_mut().create_element("div");
    tree.dom_mut().append(body, other);

    tree.render(id, other, None).unwrap();
    let el = tree.element(id).unwrap();
    assert_eq!(tree.dom().parent(el), Some(other));

    tree.render(id, body, None).unwrap();
    assert_eq!(tree.dom().parent(el), Some(body));
}

#[test]
fn hidden_flag_is_synchronous_even_with_animation() {
    let (engine, _control) = ManualEngine::new();
    let mut tree = Tree::with_engine(Box::new(engine));
    let id = tree.component(ComponentConfig::new());
    let body = tree.body();
    tree.render(id, body, None).unwrap();

    tree.hide(id, TransitionOptions::animated(AnimationSpec::fade(200)));
    // The logical state flipped before the animation finished.
    assert!(tree.is_hidden(id));
    assert!(tree.has_running_animation(id));
    // The surface is still on screen while the animation runs.
    let el = tree.element(id).unwrap();
    assert_eq!(tree.dom().style(el, "display"), None);
}

#[test]
fn show_during_hide_animation_forces_exactly_one_after_hide() {
    let (engine, control) = ManualEngine::new();
    let mut tree = Tree::with_engine(Box::new(engine));
    let id = tree.component(ComponentConfig::new());
    let body = tree.body();
    tree.render(id, body, None).unwrap();

    let record = recorded(
        &mut tree,
        id,
        &[
            EventKind::AfterHide,
            EventKind::ShowBegin,
            EventKind::Show,
            EventKind::AfterShow,
        ],
    );

    tree.hide(id, TransitionOptions::animated(AnimationSpec::fade(200)));
    tree.show(id, TransitionOptions::animated(AnimationSpec::fade(200)));

    // The forced hide completion lands before the show sequence begins.
    assert_eq!(
        record.borrow().as_slice(),
        &[EventKind::AfterHide, EventKind::ShowBegin, EventKind::Show]
    );
    assert!(!tree.is_hidden(id));
    assert!(tree.has_running_animation(id));
    assert_eq!(control.running(), 1);

    control.complete_all();
    tree.pump_animations();
    assert!(!tree.has_running_animation(id));
    assert_eq!(
        record.borrow().as_slice(),
        &[
            EventKind::AfterHide,
            EventKind::ShowBegin,
            EventKind::Show,
            EventKind::AfterShow
        ]
    );
}

#[test]
fn animated_hide_applies_the_style_at_completion() {
    let (engine, control) = ManualEngine::new();
    let mut tree = Tree::with_engine(Box::new(engine));
    let id = tree.component(ComponentConfig::new());
    let body = tree.body();
    tree.render(id, body, None).unwrap();

    tree.hide(id, TransitionOptions::animated(AnimationSpec::slide(150)));
    let el = tree.element(id).unwrap();
    assert_eq!(tree.dom().style(el, "display"), None);

    control.complete_all();
    tree.pump_animations();
    assert_eq!(tree.dom().style(el, "display"), Some("none"));
}

#[test]
fn before_hide_veto_leaves_state_unchanged() {
    let mut tree = Tree::new();
    let id = tree.component(ComponentConfig::new());
    let body = tree.body();
    tree.render(id, body, None).unwrap();

    tree.on(id, EventKind::BeforeHide, |_| mullion::Control::Veto);
    assert!(!tree.hide(id, TransitionOptions::default()));
    assert!(!tree.is_hidden(id));
}

#[test]
fn show_and_hide_are_noops_in_the_target_state() {
    let mut tree = Tree::new();
    let id = tree.component(ComponentConfig::new());
    assert!(!tree.show(id, TransitionOptions::default()));
    assert!(tree.hide(id, TransitionOptions::default()));
    assert!(!tree.hide(id, TransitionOptions::default()));
}

#[test]
fn unrendered_show_hide_only_flips_the_flag() {
    let mut tree = Tree::new();
    let id = tree.component(ComponentConfig::new());
    tree.hide(id, TransitionOptions::default());
    assert!(tree.is_hidden(id));
    assert!(tree.element(id).is_none());
    tree.show(id, TransitionOptions::default());
    assert!(!tree.is_hidden(id));
    assert!(tree.element(id).is_none());
}

#[test]
fn mask_before_render_is_buffered_and_flushed() {
    let mut tree = Tree::new();
    let id = tree.component(ComponentConfig::new().with_height(50));
    tree.mask(id, MaskConfig::new().with_message("Loading..."));
    assert!(!tree.is_masked(id));

    let body = tree.body();
    tree.render(id, body, None).unwrap();
    // The buffered request flushed immediately after render.
    assert!(tree.is_masked(id));
    let el = tree.element(id).unwrap();
    let overlay = tree.dom().children(el).last().copied().unwrap();
    assert!(tree.dom().has_class(overlay, "mull-mask"));
    assert_eq!(tree.dom().text(overlay), Some("Loading..."));
}

#[test]
fn mask_while_hidden_waits_for_the_next_show() {
    let mut tree = Tree::new();
    let id = tree.component(ComponentConfig::new());
    let body = tree.body();
    tree.render(id, body, None).unwrap();
    tree.hide(id, TransitionOptions::default());

    tree.mask(id, MaskConfig::new());
    assert!(!tree.is_masked(id));

    tree.show(id, TransitionOptions::default());
    assert!(tree.is_masked(id));
}

#[test]
fn hiding_a_masked_component_suspends_the_overlay() {
    let mut tree = Tree::new();
    let id = tree.component(ComponentConfig::new());
    let body = tree.body();
    tree.render(id, body, None).unwrap();
    tree.mask(id, MaskConfig::new());
    assert!(tree.is_masked(id));

    tree.hide(id, TransitionOptions::default());
    assert!(!tree.is_masked(id));
    tree.show(id, TransitionOptions::default());
    assert!(tree.is_masked(id));
}

#[test]
fn un_mask_drops_buffered_requests_too() {
    let mut tree = Tree::new();
    let id = tree.component(ComponentConfig::new());
    tree.mask(id, MaskConfig::new());
    tree.un_mask(id);
    let body = tree.body();
    tree.render(id, body, None).unwrap();
    assert!(!tree.is_masked(id));
}

#[test]
fn destroy_twice_fires_destroy_once() {
    let mut tree = Tree::new();
    let id = tree.component(ComponentConfig::new());
    let body = tree.body();
    tree.render(id, body, None).unwrap();
    let el = tree.element(id).unwrap();

    let record = recorded(&mut tree, id, &[EventKind::Destroy]);
    assert!(tree.destroy(id));
    assert!(!tree.destroy(id));
    assert_eq!(record.borrow().len(), 1);
    assert!(tree.is_destroyed(id));
    // The surface and every reference to it are gone.
    assert!(!tree.dom().exists(el));
    assert!(tree.element(id).is_none());
}

#[test]
fn before_destroy_veto_keeps_the_component() {
    let mut tree = Tree::new();
    let id = tree.component(ComponentConfig::new());
    tree.on(id, EventKind::BeforeDestroy, |_| mullion::Control::Veto);
    assert!(!tree.destroy(id));
    assert!(!tree.is_destroyed(id));
}

#[test]
fn destroy_during_animation_force_completes_it() {
    let (engine, control) = ManualEngine::new();
    let mut tree = Tree::with_engine(Box::new(engine));
    let id = tree.component(ComponentConfig::new());
    let body = tree.body();
    tree.render(id, body, None).unwrap();

    let record = recorded(&mut tree, id, &[EventKind::AfterHide, EventKind::Destroy]);
    tree.hide(id, TransitionOptions::animated(AnimationSpec::fade(500)));
    tree.destroy(id);

    assert_eq!(
        record.borrow().as_slice(),
        &[EventKind::AfterHide, EventKind::Destroy]
    );
    assert_eq!(control.running(), 0);
    assert!(tree.is_destroyed(id));
}

#[test]
fn operations_on_destroyed_components_are_absorbed() {
    let mut tree = Tree::new();
    let id = tree.component(ComponentConfig::new());
    tree.destroy(id);

    let body = tree.body();
    assert!(tree.render(id, body, None).is_ok());
    assert!(!tree.show(id, TransitionOptions::default()));
    assert!(!tree.hide(id, TransitionOptions::default()));
    tree.mask(id, MaskConfig::new());
    assert!(!tree.is_masked(id));
}
