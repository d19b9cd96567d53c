use std::any::Any;
use std::cell::Cell;
use std::rc::Rc;

use oxbow_primitives::mock::{AsciiTranslator, MockHost};
use oxbow_primitives::{ActionData, KeyEvent, KeyTranslator, Keycode, ModMask};
use oxbow_registry::{
	ActionDispatcher, ActionRegistry, InputVerdict, InteractiveHooks, Progress,
};
use pretty_assertions::assert_eq;

use crate::{BindError, Keyboard, KeyboardConfig, ResetScope};

#[derive(Default)]
struct Calls {
	runs: Cell<u32>,
}

fn bump(opts: &mut dyn Any) {
	let calls = opts.downcast_ref::<Rc<Calls>>().expect("options are a call counter");
	calls.runs.set(calls.runs.get() + 1);
}

fn setup_calls(payload: Option<&dyn Any>) -> Box<dyn Any> {
	Box::new(payload.and_then(|p| p.downcast_ref::<Rc<Calls>>()).cloned().unwrap_or_default())
}

fn run_plain(_data: &ActionData, opts: &mut dyn Any) -> Progress {
	bump(opts);
	Progress::Completed
}

fn cycle_input(_initial: ModMask, _event: &KeyEvent, _opts: &mut dyn Any) -> InputVerdict {
	InputVerdict::Stop
}

fn setup_cycle(payload: Option<&dyn Any>, hooks: &mut InteractiveHooks) -> Box<dyn Any> {
	hooks.input = Some(cycle_input);
	setup_calls(payload)
}

fn run_cycle(_data: &ActionData, opts: &mut dyn Any) -> Progress {
	bump(opts);
	Progress::InProgress
}

fn registry() -> ActionRegistry {
	let mut reg = ActionRegistry::new();
	reg.register("Focus", Some(setup_calls), None, run_plain).unwrap();
	reg.register_interactive("Cycle", Some(setup_cycle), None, run_cycle).unwrap();
	reg
}

fn press(token: &str) -> KeyEvent {
	let key = AsciiTranslator.chord(token).unwrap();
	KeyEvent::press(key.keycode, key.mods)
}

fn release(token: &str) -> KeyEvent {
	let key = AsciiTranslator.chord(token).unwrap();
	KeyEvent::release(key.keycode, key.mods)
}

fn grabbed(host: &MockHost) -> Vec<(Keycode, ModMask)> {
	let mut chords = host.display.grabbed_chords(host.translator.lock_masks());
	chords.sort_by_key(|(kc, _)| kc.0);
	chords
}

#[test]
fn chain_walk_dispatches_the_leaf() {
	let mut host = MockHost::default();
	let mut dispatcher = ActionDispatcher::new(registry());
	let mut kb = Keyboard::default();
	let calls = Rc::new(Calls::default());
	let act = dispatcher.registry.parse_instance("Focus", Some(&calls)).unwrap();

	kb.bind(&["W-t", "x"], act, &host.services()).unwrap();
	kb.startup(false, &mut host.services());

	assert!(kb.key_event(&mut dispatcher, &press("W-t"), None, &mut host.services()));
	assert!(kb.in_chain());
	assert_eq!(kb.chain_labels(), ["W-t"]);
	assert_eq!(host.popup.shown.last().map(|(t, _)| t.as_str()), Some("W-t"));
	assert_eq!(host.timers.scheduled.len(), 1);

	assert!(kb.key_event(&mut dispatcher, &press("x"), None, &mut host.services()));
	assert_eq!(calls.runs.get(), 1);
	assert!(!kb.in_chain());
	assert!(!host.popup.visible);
}

#[test]
fn unmatched_key_leaves_the_chain_in_place() {
	let mut host = MockHost::default();
	let mut dispatcher = ActionDispatcher::new(registry());
	let mut kb = Keyboard::default();
	let act = dispatcher.registry.build_instance("Focus").unwrap();

	kb.bind(&["W-t", "x"], act, &host.services()).unwrap();
	kb.startup(false, &mut host.services());
	kb.key_event(&mut dispatcher, &press("W-t"), None, &mut host.services());

	assert!(!kb.key_event(&mut dispatcher, &press("z"), None, &mut host.services()));
	assert!(kb.in_chain());
	assert_eq!(kb.chain_labels(), ["W-t"]);
}

#[test]
fn chain_position_grabs_exactly_its_frontier() {
	let mut host = MockHost::default();
	let mut dispatcher = ActionDispatcher::new(registry());
	let mut kb = Keyboard::default();

	let a = dispatcher.registry.build_instance("Focus").unwrap();
	let b = dispatcher.registry.build_instance("Focus").unwrap();
	kb.bind(&["W-t", "x"], a, &host.services()).unwrap();
	kb.bind(&["W-f"], b, &host.services()).unwrap();
	kb.startup(false, &mut host.services());

	// Idle: the two top-level chords, no reset hotkey.
	assert_eq!(
		grabbed(&host),
		[(Keycode('f' as u32), ModMask::MOD4), (Keycode('t' as u32), ModMask::MOD4)]
	);

	// Mid-chain: the continuation plus the reset hotkey, nothing else.
	kb.key_event(&mut dispatcher, &press("W-t"), None, &mut host.services());
	assert_eq!(
		grabbed(&host),
		[(Keycode('g' as u32), ModMask::CONTROL), (Keycode('x' as u32), ModMask::empty())]
	);
}

#[test]
fn full_reset_unwinds_past_chroots() {
	let mut host = MockHost::default();
	let mut dispatcher = ActionDispatcher::new(registry());
	let mut kb = Keyboard::default();
	let act = dispatcher.registry.build_instance("Focus").unwrap();

	kb.bind(&["a", "b", "c"], act, &host.services()).unwrap();
	kb.add_chroot(&["a", "b"], &host.services()).unwrap();
	kb.startup(false, &mut host.services());

	kb.key_event(&mut dispatcher, &press("a"), None, &mut host.services());
	kb.key_event(&mut dispatcher, &press("b"), None, &mut host.services());
	assert_eq!(kb.chain_labels(), ["a", "b"]);

	assert!(kb.key_event(&mut dispatcher, &press("C-g"), None, &mut host.services()));
	assert!(!kb.in_chain());
}

#[test]
fn weak_reset_stops_at_the_nearest_chroot() {
	let mut host = MockHost::default();
	let mut dispatcher = ActionDispatcher::new(registry());
	let config = KeyboardConfig { reset_scope: ResetScope::Nearest, ..KeyboardConfig::default() };
	let mut kb = Keyboard::new(config);
	let act = dispatcher.registry.build_instance("Focus").unwrap();

	kb.bind(&["a", "b", "c"], act, &host.services()).unwrap();
	kb.add_chroot(&["a", "b"], &host.services()).unwrap();
	kb.startup(false, &mut host.services());

	kb.key_event(&mut dispatcher, &press("a"), None, &mut host.services());
	kb.key_event(&mut dispatcher, &press("b"), None, &mut host.services());

	// The reset lands on the chroot itself: still a modal layer.
	assert!(kb.key_event(&mut dispatcher, &press("C-g"), None, &mut host.services()));
	assert!(kb.in_chain());
	assert_eq!(kb.chain_labels(), ["a", "b"]);
}

#[test]
fn break_reset_passes_through_counted_chroots() {
	let mut host = MockHost::default();
	let mut dispatcher = ActionDispatcher::new(registry());
	let config = KeyboardConfig { reset_scope: ResetScope::Break(1), ..KeyboardConfig::default() };
	let mut kb = Keyboard::new(config);
	let act = dispatcher.registry.build_instance("Focus").unwrap();

	kb.bind(&["a", "b", "c"], act, &host.services()).unwrap();
	kb.add_chroot(&["a"], &host.services()).unwrap();
	kb.add_chroot(&["a", "b"], &host.services()).unwrap();
	kb.startup(false, &mut host.services());

	kb.key_event(&mut dispatcher, &press("a"), None, &mut host.services());
	kb.key_event(&mut dispatcher, &press("b"), None, &mut host.services());

	// Breaks out of the inner chroot and stops at the outer one.
	kb.key_event(&mut dispatcher, &press("C-g"), None, &mut host.services());
	assert_eq!(kb.chain_labels(), ["a"]);
}

#[test]
fn timer_resets_and_stale_ids_are_ignored() {
	let mut host = MockHost::default();
	let mut dispatcher = ActionDispatcher::new(registry());
	let mut kb = Keyboard::default();
	let act = dispatcher.registry.build_instance("Focus").unwrap();

	kb.bind(&["a", "b", "c"], act, &host.services()).unwrap();
	kb.startup(false, &mut host.services());

	kb.key_event(&mut dispatcher, &press("a"), None, &mut host.services());
	let stale = host.timers.scheduled.last().map(|(id, _)| *id).unwrap();
	kb.key_event(&mut dispatcher, &press("b"), None, &mut host.services());
	let current = host.timers.scheduled.last().map(|(id, _)| *id).unwrap();
	assert!(host.timers.cancelled.contains(&stale));

	// A callback from the superseded timer must not unwind the chain.
	kb.on_timeout(stale, &mut host.services());
	assert_eq!(kb.chain_labels(), ["a", "b"]);

	kb.on_timeout(current, &mut host.services());
	assert!(!kb.in_chain());

	// Already consumed: firing again is a no-op.
	kb.on_timeout(current, &mut host.services());
	assert!(!kb.in_chain());
}

#[test]
fn timeout_honours_chroot_boundaries() {
	let mut host = MockHost::default();
	let mut dispatcher = ActionDispatcher::new(registry());
	let mut kb = Keyboard::default();
	let act = dispatcher.registry.build_instance("Focus").unwrap();

	kb.bind(&["a", "b", "c"], act, &host.services()).unwrap();
	kb.add_chroot(&["a"], &host.services()).unwrap();
	kb.startup(false, &mut host.services());

	kb.key_event(&mut dispatcher, &press("a"), None, &mut host.services());
	kb.key_event(&mut dispatcher, &press("b"), None, &mut host.services());
	let current = host.timers.scheduled.last().map(|(id, _)| *id).unwrap();

	kb.on_timeout(current, &mut host.services());
	assert_eq!(kb.chain_labels(), ["a"]);
}

#[test]
fn conflicting_binds_fail_and_mutate_nothing() {
	let mut host = MockHost::default();
	let mut dispatcher = ActionDispatcher::new(registry());
	let mut kb = Keyboard::default();
	let calls = Rc::new(Calls::default());
	let first = dispatcher.registry.parse_instance("Focus", Some(&calls)).unwrap();
	let second = dispatcher.registry.build_instance("Focus").unwrap();

	kb.bind(&["a"], first, &host.services()).unwrap();
	assert_eq!(
		kb.bind(&["a", "b"], Rc::clone(&second), &host.services()),
		Err(BindError::Conflict)
	);
	kb.startup(false, &mut host.services());

	// The earlier binding still fires; the failed one left no trace.
	kb.key_event(&mut dispatcher, &press("a"), None, &mut host.services());
	assert_eq!(calls.runs.get(), 1);
	assert!(!kb.in_chain());

	// And the same conflict in the other order.
	let mut kb = Keyboard::default();
	kb.bind(&["a", "b"], second, &host.services()).unwrap();
	let third = dispatcher.registry.build_instance("Focus").unwrap();
	assert_eq!(kb.bind(&["a"], third, &host.services()), Err(BindError::Conflict));
}

#[test]
fn shadowed_bind_reports_the_discard() {
	let mut host = MockHost::default();
	let dispatcher = ActionDispatcher::new(registry());
	let mut kb = Keyboard::default();
	let a = dispatcher.registry.build_instance("Focus").unwrap();
	let b = dispatcher.registry.build_instance("Focus").unwrap();

	kb.bind(&["a", "b"], a, &host.services()).unwrap();
	assert_eq!(kb.bind(&["a", "c"], b, &host.services()), Err(BindError::Shadowed));
}

#[test]
fn duplicate_path_merges_onto_one_leaf() {
	let mut host = MockHost::default();
	let mut dispatcher = ActionDispatcher::new(registry());
	let mut kb = Keyboard::default();
	let calls = Rc::new(Calls::default());
	let a = dispatcher.registry.parse_instance("Focus", Some(&calls)).unwrap();
	let b = dispatcher.registry.parse_instance("Focus", Some(&calls)).unwrap();

	kb.bind(&["W-t"], a, &host.services()).unwrap();
	kb.bind(&["W-t"], b, &host.services()).unwrap();
	kb.startup(false, &mut host.services());

	kb.key_event(&mut dispatcher, &press("W-t"), None, &mut host.services());
	assert_eq!(calls.runs.get(), 2);
}

#[test]
fn rebind_transplants_the_same_instances() {
	let mut host = MockHost::default();
	let mut dispatcher = ActionDispatcher::new(registry());
	let mut kb = Keyboard::default();
	let calls = Rc::new(Calls::default());
	let act = dispatcher.registry.parse_instance("Focus", Some(&calls)).unwrap();

	kb.bind(&["a", "b", "c"], Rc::clone(&act), &host.services()).unwrap();
	kb.add_chroot(&["a", "b"], &host.services()).unwrap();
	kb.startup(false, &mut host.services());

	kb.rebind(&mut host.services());
	// One handle here, one in the tree: the instance was moved, not rebuilt.
	assert_eq!(Rc::strong_count(&act), 2);

	kb.key_event(&mut dispatcher, &press("a"), None, &mut host.services());
	kb.key_event(&mut dispatcher, &press("b"), None, &mut host.services());
	kb.key_event(&mut dispatcher, &press("c"), None, &mut host.services());
	assert_eq!(calls.runs.get(), 1);
	// The chroot flag survived: dispatch reset to it, not the root.
	assert_eq!(kb.chain_labels(), ["a", "b"]);
}

#[test]
fn releases_only_touch_passive_accounting() {
	let mut host = MockHost::default();
	let mut dispatcher = ActionDispatcher::new(registry());
	let mut kb = Keyboard::default();
	let act = dispatcher.registry.build_instance("Focus").unwrap();

	kb.bind(&["a", "b"], act, &host.services()).unwrap();
	kb.startup(false, &mut host.services());
	kb.key_event(&mut dispatcher, &press("a"), None, &mut host.services());
	assert_eq!(host.grabs.passive_count(), 1);

	assert!(!kb.key_event(&mut dispatcher, &release("a"), None, &mut host.services()));
	assert_eq!(host.grabs.passive_count(), 0);
	assert_eq!(kb.chain_labels(), ["a"]);
}

#[test]
fn bare_chroot_leaf_enters_a_modal_layer() {
	let mut host = MockHost::default();
	let mut dispatcher = ActionDispatcher::new(registry());
	let mut kb = Keyboard::default();

	kb.add_chroot(&["m"], &host.services()).unwrap();
	kb.startup(false, &mut host.services());

	assert!(kb.key_event(&mut dispatcher, &press("m"), None, &mut host.services()));
	assert!(kb.in_chain());
	assert_eq!(kb.chain_labels(), ["m"]);
	// Modal layers do not time out.
	assert_eq!(host.timers.scheduled.len(), 0);
}

#[test]
fn interactive_leaf_keeps_the_chain_position() {
	let mut host = MockHost::default();
	let mut dispatcher = ActionDispatcher::new(registry());
	let mut kb = Keyboard::default();
	let calls = Rc::new(Calls::default());
	let act = dispatcher.registry.parse_instance("Cycle", Some(&calls)).unwrap();

	kb.bind(&["a", "c"], act, &host.services()).unwrap();
	kb.startup(false, &mut host.services());

	kb.key_event(&mut dispatcher, &press("a"), None, &mut host.services());
	assert!(kb.key_event(&mut dispatcher, &press("c"), None, &mut host.services()));
	assert_eq!(calls.runs.get(), 1);
	assert!(dispatcher.interactive_active());
	// The chain stays where it was so the final chord can repeat.
	assert_eq!(kb.chain_labels(), ["a"]);
}

#[test]
fn multi_chord_path_round_trips_its_labels() {
	let mut host = MockHost::default();
	let mut dispatcher = ActionDispatcher::new(registry());
	let mut kb = Keyboard::default();
	let act = dispatcher.registry.build_instance("Focus").unwrap();

	kb.bind(&["C-x", "C-s", "Return"], act, &host.services()).unwrap();
	kb.startup(false, &mut host.services());

	kb.key_event(&mut dispatcher, &press("C-x"), None, &mut host.services());
	kb.key_event(&mut dispatcher, &press("C-s"), None, &mut host.services());
	assert_eq!(kb.chain_labels(), ["C-x", "C-s"]);
	assert_eq!(host.popup.shown.last().map(|(t, _)| t.as_str()), Some("C-x - C-s"));
}

#[test]
fn unknown_reset_token_degrades_gracefully() {
	let mut host = MockHost::default();
	let mut dispatcher = ActionDispatcher::new(registry());
	let config =
		KeyboardConfig { reset_binding: "NoSuchKey".to_owned(), ..KeyboardConfig::default() };
	let mut kb = Keyboard::new(config);
	let act = dispatcher.registry.build_instance("Focus").unwrap();

	kb.bind(&["a", "b"], act, &host.services()).unwrap();
	kb.startup(false, &mut host.services());

	// Chains still work; the default reset chord is just an ordinary miss.
	kb.key_event(&mut dispatcher, &press("a"), None, &mut host.services());
	assert!(!kb.key_event(&mut dispatcher, &press("C-g"), None, &mut host.services()));
	assert!(kb.in_chain());
}
